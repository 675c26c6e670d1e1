pub mod eve;
pub mod scenarios;

pub use eve::{calculate_irrbb, IrrbbInput};
pub use scenarios::{ShockScenario, TenorBucket};
