use serde::Serialize;

use crate::projection::types::{PortfolioPoint, ProjectionPoint};

/// Output handed to the chart layer: per-card series plus the combined series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionReport {
    pub points: Vec<ProjectionPoint>,
    pub portfolio: Vec<PortfolioPoint>,
}

impl ProjectionReport {
    pub fn new(points: Vec<ProjectionPoint>, portfolio: Vec<PortfolioPoint>) -> Self {
        assert_eq!(points.len(), portfolio.len());
        Self { points, portfolio }
    }

    /// Plain-text ROI table, one row per year, one column per card plus the portfolio
    pub fn render_table(&self) -> String {
        let card_names: Vec<&String> = self
            .points
            .first()
            .map(|point| point.roi_by_card.keys().collect())
            .unwrap_or_default();
        let width = card_names.iter().map(|name| name.len()).max().unwrap_or(0).max(9);

        let mut header = format!("{:>4}", "Year");
        for name in &card_names {
            header.push_str(&format!("  {name:>width$}"));
        }
        header.push_str(&format!("  {:>width$}", "Portfolio"));

        let mut lines = vec![header];
        for (point, combined) in self.points.iter().zip(&self.portfolio) {
            let mut line = format!("{:>4}", point.year);
            for name in &card_names {
                let cell = point.roi_by_card.get(*name).map_or("N/A".to_string(), |roi| format!("{roi:.2}%"));
                line.push_str(&format!("  {cell:>width$}"));
            }
            line.push_str(&format!("  {:>width$}", format!("{:.2}%", combined.roi)));
            lines.push(line);
        }
        lines.join("\n")
    }
}
