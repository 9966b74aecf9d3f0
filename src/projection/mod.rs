pub mod engine;
pub mod types;
pub mod reward_model;
pub mod fee_model;
pub mod projection_constants;
