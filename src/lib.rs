pub mod config;
pub mod logging;
pub mod projection;
pub mod report;
pub mod scenario;
pub mod validation;
