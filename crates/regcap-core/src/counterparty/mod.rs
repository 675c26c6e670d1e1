pub mod cva;
pub mod large_exposures;

pub use cva::{calculate_cva_capital, CreditRating, CvaInput};
pub use large_exposures::{calculate_large_exposures, LargeExposuresInput};
