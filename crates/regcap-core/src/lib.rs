pub mod error;
pub mod numeric;
pub mod types;

#[cfg(feature = "securitization")]
pub mod securitization;

#[cfg(feature = "capital")]
pub mod capital;

#[cfg(feature = "liquidity")]
pub mod liquidity;

#[cfg(feature = "counterparty")]
pub mod counterparty;

#[cfg(feature = "interest_rate_risk")]
pub mod interest_rate_risk;

pub use error::RegCapError;
pub use types::*;

pub type RegCapResult<T> = Result<T, RegCapError>;
