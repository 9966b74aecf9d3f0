use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine;

/// How a card pays out: dollars back per dollar, or points per dollar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    Cash,
    Points,
}

impl RewardType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "cash" | "cashback" => Some(Self::Cash),
            "points" | "point" => Some(Self::Points),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Points => "points",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-time reward granted the first time cumulative spend crosses `spend_threshold`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeBonus {
    pub spend_threshold: Decimal,
    #[serde(default)]
    pub bonus_points: Decimal,
    #[serde(default)]
    pub bonus_cash: Decimal,
}

impl WelcomeBonus {
    pub fn new(spend_threshold: Decimal, bonus_points: Decimal, bonus_cash: Decimal) -> Self {
        Self {
            spend_threshold,
            bonus_points,
            bonus_cash,
        }
    }

    /// Dollar value of the bonus once it fires
    pub fn value(&self, dollar_per_point: Decimal) -> Decimal {
        self.bonus_points * dollar_per_point + self.bonus_cash
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    pub name: String,
    pub reward_type: RewardType,
    #[serde(default)]
    pub rates_by_category: HashMap<String, Decimal>, // cash per dollar or points per dollar, by reward type
    #[serde(default)]
    pub annual_fee: Decimal,
    #[serde(default)]
    pub welcome_bonuses: Vec<WelcomeBonus>,
}

impl CardConfig {
    pub fn new(name: impl Into<String>, reward_type: RewardType, annual_fee: Decimal) -> Self {
        Self {
            name: name.into(),
            reward_type,
            rates_by_category: HashMap::new(),
            annual_fee,
            welcome_bonuses: Vec::new(),
        }
    }

    pub fn with_rate(mut self, category: impl Into<String>, rate: Decimal) -> Self {
        self.rates_by_category.insert(category.into(), rate);
        self
    }

    pub fn with_bonus(mut self, bonus: WelcomeBonus) -> Self {
        self.welcome_bonuses.push(bonus);
        self
    }

    fn rate(&self, category: &str) -> Decimal {
        self.rates_by_category.get(category).copied().unwrap_or(Decimal::ZERO)
    }

    /// Points earned per dollar in `category`; zero for cash cards and unknown categories
    pub fn point_rate(&self, category: &str) -> Decimal {
        match self.reward_type {
            RewardType::Points => self.rate(category),
            RewardType::Cash => Decimal::ZERO,
        }
    }

    /// Dollars returned per dollar in `category`; zero for points cards and unknown categories
    pub fn cash_rate(&self, category: &str) -> Decimal {
        match self.reward_type {
            RewardType::Cash => self.rate(category),
            RewardType::Points => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendRow {
    pub year: usize, // 0-based
    #[serde(default)]
    pub spend_by_category: HashMap<String, Decimal>,
}

impl SpendRow {
    pub fn new(year: usize) -> Self {
        Self {
            year,
            spend_by_category: HashMap::new(),
        }
    }

    pub fn with_spend(mut self, category: impl Into<String>, amount: Decimal) -> Self {
        self.spend_by_category.insert(category.into(), amount);
        self
    }

    pub fn total(&self) -> Decimal {
        self.spend_by_category.values().copied().sum()
    }
}

/// Year indices (0-based, same as `SpendRow::year`) in which no card charges its fee
pub type WaivedYearSet = HashSet<usize>;

/// Everything the engine reads for one projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub years: usize,
    #[serde(default)]
    pub spend_rows: Vec<SpendRow>,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
    #[serde(default)]
    pub waived_years: WaivedYearSet,
    pub dollar_per_point: Decimal,
}

impl ProjectionInput {
    pub fn spend_row(&self, year: usize) -> Option<&SpendRow> {
        self.spend_rows.iter().find(|row| row.year == year)
    }

    pub fn card(&self, name: &str) -> Option<&CardConfig> {
        self.cards.iter().find(|card| card.name == name)
    }

    pub fn project(&self) -> Vec<ProjectionPoint> {
        engine::project(self)
    }

    pub fn portfolio(&self) -> Vec<PortfolioPoint> {
        engine::project_portfolio(self)
    }
}

/// ROI of every card for one projection year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: usize, // 1-based
    pub roi_by_card: BTreeMap<String, Decimal>,
}

/// Components of one card's result in one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardYearBreakdown {
    pub card: String,
    pub points_value: Decimal,
    pub cashback: Decimal,
    pub bonus_value: Decimal,
    pub fee: Decimal,
    pub net: Decimal,
    pub roi: Decimal,
}

/// Combined result of all cards for one projection year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioPoint {
    pub year: usize, // 1-based
    pub spend: Decimal,
    pub net: Decimal,
    pub roi: Decimal,
}
