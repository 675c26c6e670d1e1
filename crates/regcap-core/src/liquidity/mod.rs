pub mod lcr;
pub mod nsfr;

pub use lcr::{calculate_lcr, LcrInput};
pub use nsfr::{calculate_nsfr, NsfrInput};
