pub mod supervisory_formula;
pub mod tranche;

pub use supervisory_formula::{kssfa, p_parameter, tranche_risk_weight};
pub use tranche::{
    calculate_securitization, compare_securitization_approaches, SecuritizationApproach,
    SecuritizationInput,
};
