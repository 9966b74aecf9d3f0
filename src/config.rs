use eyre::{Result, WrapErr, eyre};
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scenario_path: Option<PathBuf>, // built-in sample scenario when unset
    pub dollar_per_point: Option<Decimal>, // overrides the scenario's point valuation
    pub output_format: OutputFormat,
}

impl Config {
    /// Reads the process environment. `.env` is loaded once by the binary, before logging starts.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` uses the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let scenario_path = lookup("SCENARIO_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let dollar_per_point = match lookup("DOLLAR_PER_POINT") {
            Some(raw) => {
                let value = Decimal::from_str(raw.trim())
                    .wrap_err_with(|| format!("Invalid DOLLAR_PER_POINT value {raw:?}"))?;
                if value <= Decimal::ZERO {
                    return Err(eyre!("DOLLAR_PER_POINT must be positive, got {value}"));
                }
                Some(value)
            }
            None => None,
        };

        let output_format = match lookup("OUTPUT_FORMAT") {
            Some(raw) => OutputFormat::from_str(&raw)
                .ok_or_else(|| eyre!("Invalid OUTPUT_FORMAT value {raw:?} (must be 'table' or 'json')"))?,
            None => OutputFormat::Table,
        };

        Ok(Config {
            scenario_path,
            dollar_per_point,
            output_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.scenario_path, None);
        assert_eq!(cfg.dollar_per_point, None);
        assert_eq!(cfg.output_format, OutputFormat::Table);
    }

    #[test]
    fn reads_every_key() {
        let cfg = Config::from_lookup(lookup(&[
            ("SCENARIO_PATH", "data/scenario.json"),
            ("DOLLAR_PER_POINT", "0.0125"),
            ("OUTPUT_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(cfg.scenario_path, Some(PathBuf::from("data/scenario.json")));
        assert_eq!(cfg.dollar_per_point, Some(dec!(0.0125)));
        assert_eq!(cfg.output_format, OutputFormat::Json);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("DOLLAR_PER_POINT", "abc")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DOLLAR_PER_POINT", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("OUTPUT_FORMAT", "csv")])).is_err());
    }

    #[test]
    fn load_reads_the_process_environment() {
        // SAFETY: no other test reads OUTPUT_FORMAT from the process environment
        unsafe { env::set_var("OUTPUT_FORMAT", "json") };
        let cfg = Config::load();
        unsafe { env::remove_var("OUTPUT_FORMAT") };
        assert_eq!(cfg.unwrap().output_format, OutputFormat::Json);
    }

    #[test]
    fn blank_scenario_path_is_unset() {
        let cfg = Config::from_lookup(lookup(&[("SCENARIO_PATH", "  ")])).unwrap();
        assert_eq!(cfg.scenario_path, None);
    }
}
