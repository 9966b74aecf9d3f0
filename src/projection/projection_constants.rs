// --- ROI REPORTING CONSTANTS ---
/// Decimal places kept on every reported ROI percentage
pub const ROI_DECIMAL_PLACES: u32 = 2;
/// ROI is reported as a percentage of the year's spend
pub const PERCENT: i64 = 100;
