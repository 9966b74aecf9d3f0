use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use rust_decimal::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::projection::engine;
use crate::projection::types::{
    CardConfig, CardYearBreakdown, PortfolioPoint, ProjectionInput, ProjectionPoint, RewardType, SpendRow,
    WaivedYearSet, WelcomeBonus,
};
use crate::validation::{self, ValidationError};

pub const DEFAULT_YEARS: usize = 5;
pub const DEFAULT_CATEGORY: &str = "Generic";
pub const DEFAULT_DOLLAR_PER_POINT: Decimal = dec!(0.017);
const DEFAULT_ANNUAL_SPEND: Decimal = dec!(6000);

/// Editable projection configuration. Every edit keeps the input valid, so
/// projections never see a configuration the engine cannot handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Scenario {
    input: ProjectionInput,
}

impl Default for Scenario {
    /// Five years of 6000 generic spend, first year's fee waived, no cards
    fn default() -> Self {
        let spend_rows = (0..DEFAULT_YEARS)
            .map(|year| SpendRow::new(year).with_spend(DEFAULT_CATEGORY, DEFAULT_ANNUAL_SPEND))
            .collect();
        Self {
            input: ProjectionInput {
                years: DEFAULT_YEARS,
                spend_rows,
                cards: Vec::new(),
                waived_years: [0].into_iter().collect(),
                dollar_per_point: DEFAULT_DOLLAR_PER_POINT,
            },
        }
    }
}

impl Scenario {
    pub fn new(input: ProjectionInput) -> Result<Self, ValidationError> {
        validation::validate(&input)?;
        Ok(Self { input })
    }

    #[instrument(skip(json))]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let input: ProjectionInput = serde_json::from_str(json).wrap_err("Failed to parse scenario JSON")?;
        Ok(Self::new(input)?)
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display(), on_close = true))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(file = %path.display(), "Loading scenario from file");
        let file_content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Self::from_json_str(&file_content)?;
        info!(
            years = scenario.input.years,
            cards = scenario.input.cards.len(),
            spend_rows = scenario.input.spend_rows.len(),
            "Scenario loaded from file"
        );
        Ok(scenario)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.input).wrap_err("Failed to serialize scenario")
    }

    pub fn input(&self) -> &ProjectionInput {
        &self.input
    }

    pub fn cards(&self) -> &[CardConfig] {
        &self.input.cards
    }

    // --- Card edits ---

    /// Adds a card with no rates and no bonuses
    pub fn add_card(
        &mut self,
        name: &str,
        reward_type: RewardType,
        annual_fee: Decimal,
    ) -> Result<&mut CardConfig, ValidationError> {
        self.add_card_config(CardConfig::new(name.trim(), reward_type, annual_fee))
    }

    pub fn add_card_config(&mut self, card: CardConfig) -> Result<&mut CardConfig, ValidationError> {
        validation::validate_card(&card)?;
        if self.input.card(&card.name).is_some() {
            return Err(ValidationError::DuplicateCard(card.name));
        }
        debug!(card = %card.name, reward_type = %card.reward_type, annual_fee = %card.annual_fee, "Card added");
        self.input.cards.push(card);
        let index = self.input.cards.len() - 1;
        Ok(&mut self.input.cards[index])
    }

    /// Drops the card entirely; later projections are computed from the remaining cards only
    pub fn remove_card(&mut self, name: &str) -> Result<CardConfig, ValidationError> {
        let index = self
            .input
            .cards
            .iter()
            .position(|card| card.name == name)
            .ok_or_else(|| ValidationError::UnknownCard(name.to_string()))?;
        debug!(card = %name, "Card removed");
        Ok(self.input.cards.remove(index))
    }

    pub fn set_rate(&mut self, card: &str, category: &str, rate: Decimal) -> Result<(), ValidationError> {
        validation::check_rate(card, category, rate)?;
        self.card_mut(card)?.rates_by_category.insert(category.to_string(), rate);
        Ok(())
    }

    pub fn add_bonus(&mut self, card: &str, bonus: WelcomeBonus) -> Result<(), ValidationError> {
        validation::check_bonus(card, &bonus)?;
        self.card_mut(card)?.welcome_bonuses.push(bonus);
        Ok(())
    }

    fn card_mut(&mut self, name: &str) -> Result<&mut CardConfig, ValidationError> {
        self.input
            .cards
            .iter_mut()
            .find(|card| card.name == name)
            .ok_or_else(|| ValidationError::UnknownCard(name.to_string()))
    }

    // --- Spend and horizon edits ---

    /// Sets one category's spend for a year (0-based), creating the row if needed
    pub fn update_spend(&mut self, year: usize, category: &str, amount: Decimal) -> Result<(), ValidationError> {
        if year >= self.input.years {
            return Err(ValidationError::SpendRowOutOfRange { year, years: self.input.years });
        }
        validation::check_spend(year, category, amount)?;
        let index = match self.input.spend_rows.iter().position(|row| row.year == year) {
            Some(index) => index,
            None => {
                self.input.spend_rows.push(SpendRow::new(year));
                self.input.spend_rows.len() - 1
            }
        };
        self.input.spend_rows[index].spend_by_category.insert(category.to_string(), amount);
        Ok(())
    }

    /// Flips whether the fee is waived in `year` (0-based). Returns the new state.
    pub fn toggle_waived(&mut self, year: usize) -> Result<bool, ValidationError> {
        if year >= self.input.years {
            return Err(ValidationError::WaivedYearOutOfRange { year, years: self.input.years });
        }
        if self.input.waived_years.remove(&year) {
            Ok(false)
        } else {
            self.input.waived_years.insert(year);
            Ok(true)
        }
    }

    pub fn waived_years(&self) -> &WaivedYearSet {
        &self.input.waived_years
    }

    /// Changes the horizon. Rows and waivers at or past the new horizon are dropped;
    /// added years start with no spend.
    pub fn set_years(&mut self, years: usize) -> Result<(), ValidationError> {
        validation::check_years(years)?;
        self.input.years = years;
        self.input.spend_rows.retain(|row| row.year < years);
        self.input.waived_years.retain(|&year| year < years);
        Ok(())
    }

    pub fn set_dollar_per_point(&mut self, dollar_per_point: Decimal) -> Result<(), ValidationError> {
        validation::check_dollar_per_point(dollar_per_point)?;
        self.input.dollar_per_point = dollar_per_point;
        Ok(())
    }

    // --- Projections ---

    pub fn project(&self) -> Vec<ProjectionPoint> {
        self.input.project()
    }

    pub fn portfolio(&self) -> Vec<PortfolioPoint> {
        self.input.portfolio()
    }

    pub fn breakdown(&self) -> Vec<Vec<CardYearBreakdown>> {
        engine::project_breakdown(&self.input)
    }
}
