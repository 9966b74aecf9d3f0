use dotenvy::dotenv;
use rust_decimal::prelude::*;
use tracing::{info, instrument};

use card_roi_projection::config::{self, OutputFormat};
use card_roi_projection::logging;
use card_roi_projection::projection::types::{RewardType, WelcomeBonus};
use card_roi_projection::report::ProjectionReport;
use card_roi_projection::scenario::{DEFAULT_CATEGORY, Scenario};

#[instrument(name = "roi_projection_main")]
fn main() -> eyre::Result<()> {
    // Load environment variables from .env file, if present
    dotenv().ok();

    // Initialize logging
    if let Err(e) = logging::init_logging(env!("CARGO_BIN_NAME").to_string()) {
        eprintln!("Failed to initialize logging: {}", e);
        return Err(e);
    }

    let cfg = config::Config::load()?;
    info!(output_format = cfg.output_format.as_str(), "Configuration loaded and logging initialized");

    let mut scenario = match &cfg.scenario_path {
        Some(path) => Scenario::from_json_file(path)?,
        None => {
            info!("SCENARIO_PATH not set, using the built-in sample scenario");
            sample_scenario()?
        }
    };
    if let Some(dollar_per_point) = cfg.dollar_per_point {
        scenario.set_dollar_per_point(dollar_per_point)?;
        info!(dollar_per_point = %dollar_per_point, "Point valuation overridden from config");
    }

    let report = ProjectionReport::new(scenario.project(), scenario.portfolio());
    for (point, combined) in report.points.iter().zip(&report.portfolio) {
        info!(
            year = point.year,
            roi_by_card = ?point.roi_by_card,
            portfolio_roi = %combined.roi,
            "Projection point"
        );
    }

    match cfg.output_format {
        OutputFormat::Table => println!("{}", report.render_table()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Default calculator state with one cashback card and one points card
fn sample_scenario() -> eyre::Result<Scenario> {
    let mut scenario = Scenario::default();

    scenario.add_card("Everyday Cash", RewardType::Cash, dec!(95))?;
    scenario.set_rate("Everyday Cash", DEFAULT_CATEGORY, dec!(0.02))?;
    scenario.add_bonus("Everyday Cash", WelcomeBonus::new(dec!(3000), Decimal::ZERO, dec!(200)))?;

    scenario.add_card("Travel Points", RewardType::Points, dec!(250))?;
    scenario.set_rate("Travel Points", DEFAULT_CATEGORY, dec!(1.5))?;
    scenario.add_bonus("Travel Points", WelcomeBonus::new(dec!(4000), dec!(60000), Decimal::ZERO))?;

    Ok(scenario)
}
