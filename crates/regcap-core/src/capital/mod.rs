pub mod credit_risk;
pub mod leverage;
pub mod loss_absorbency;

pub use credit_risk::{calculate_rwa, irb_risk_weight, sa_risk_weight};
pub use leverage::calculate_leverage_ratio;
pub use loss_absorbency::calculate_mrel;
