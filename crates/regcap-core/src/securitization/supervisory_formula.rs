//! Securitisation supervisory formula (CRR Art. 259-262 / Basel CRE44).
//!
//! Covers:
//! 1. **p-parameter** -- fixed 0.5 under SEC-SA, regression form under SEC-IRBA
//! 2. **KSSFA** -- capital per unit of tranche exposure from the exponential
//!    supervisory formula
//! 3. **Tranche risk weight** -- 1250% below K, KSSFA-based above, floor and cap

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::numeric::{clamp, exp_guarded};
use crate::types::{Rate, Years};

use super::tranche::SecuritizationApproach;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// 1250% risk weight, the reciprocal of the 8% capital ratio.
pub const MAX_RISK_WEIGHT: Decimal = dec!(12.5);
/// Risk-weight floor for STS positions.
pub const STS_RISK_WEIGHT_FLOOR: Decimal = dec!(0.10);
/// Risk-weight floor for non-STS positions.
pub const NON_STS_RISK_WEIGHT_FLOOR: Decimal = dec!(0.15);
/// Fixed p under SEC-SA.
pub const SEC_SA_P: Decimal = dec!(0.5);
/// Lower bound on the SEC-IRBA p-parameter.
pub const MIN_IRBA_P: Decimal = dec!(0.3);
/// Below this exponent magnitude the supervisory formula is treated as
/// degenerate and KSSFA is set to 1.
const DEGENERATE_EXPONENT: Decimal = dec!(0.0001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which branch of the supervisory formula produced a KSSFA value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KssfaBranch {
    /// K <= 0 or p <= 0
    NonPositiveParameters,
    /// detachment <= K: tranche entirely first loss
    FirstLoss,
    /// l >= u: nothing left above the lower bound
    Exhausted,
    /// |a·(u−l)| below 1e-4
    NearDegenerate,
    /// an exponent exceeded the representable range
    OverflowFallback,
    /// closed-form evaluation
    Formula,
}

/// Where a tranche sits relative to the capital threshold K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranchePosition {
    /// detachment <= K
    BelowCapital,
    /// attachment >= K
    AboveCapital,
    /// attachment < K < detachment
    StraddlesCapital,
}

/// Intermediate values of a tranche risk-weight calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheRiskWeight {
    pub position: TranchePosition,
    /// KSSFA(K, attachment, detachment, p); None when below capital
    pub kssfa_attachment: Option<Decimal>,
    /// KSSFA(K, detachment, detachment, p); only for straddling tranches
    pub kssfa_detachment: Option<Decimal>,
    /// Risk weight before floor and cap
    pub unfloored: Rate,
    pub floor: Rate,
    pub risk_weight: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// p-parameter for the supervisory formula.
///
/// SEC-SA uses the fixed 0.5; every other approach uses
/// `max(0.3, 3.56·K − 1.85·K² + 0.55·LGD + 0.07·M)`.
pub fn p_parameter(
    kirb: Rate,
    lgd: Rate,
    maturity: Years,
    approach: SecuritizationApproach,
) -> Decimal {
    match approach {
        SecuritizationApproach::SecSa => SEC_SA_P,
        SecuritizationApproach::SecIrba | SecuritizationApproach::SecErba => {
            irba_p_raw(kirb, lgd, maturity).max(MIN_IRBA_P)
        }
    }
}

/// Unfloored SEC-IRBA p-parameter.
pub fn irba_p_raw(kirb: Rate, lgd: Rate, maturity: Years) -> Decimal {
    dec!(3.56) * kirb - dec!(1.85) * kirb * kirb + dec!(0.55) * lgd + dec!(0.07) * maturity
}

/// KSSFA(K, attachment, detachment, p), always in [0, 1].
pub fn kssfa(k: Rate, attachment: Rate, detachment: Rate, p: Decimal) -> Decimal {
    kssfa_with_branch(k, attachment, detachment, p).0
}

/// KSSFA together with the branch that produced it.
pub fn kssfa_with_branch(
    k: Rate,
    attachment: Rate,
    detachment: Rate,
    p: Decimal,
) -> (Decimal, KssfaBranch) {
    if k <= Decimal::ZERO || p <= Decimal::ZERO {
        return (Decimal::ONE, KssfaBranch::NonPositiveParameters);
    }

    let a = -Decimal::ONE / (p * k);
    let u = detachment - k;
    let l = (attachment - k).max(Decimal::ZERO);

    if u <= Decimal::ZERO {
        return (Decimal::ONE, KssfaBranch::FirstLoss);
    }
    if l >= u {
        return (Decimal::ZERO, KssfaBranch::Exhausted);
    }

    let width_exponent = a * (u - l);
    if width_exponent.abs() < DEGENERATE_EXPONENT {
        return (Decimal::ONE, KssfaBranch::NearDegenerate);
    }

    let (exp_au, exp_al) = match (exp_guarded(a * u), exp_guarded(a * l)) {
        (Some(eu), Some(el)) => (eu, el),
        _ => {
            tracing::debug!(%a, %u, %l, "KSSFA exponent out of range; using fallback 1.0");
            return (Decimal::ONE, KssfaBranch::OverflowFallback);
        }
    };

    let value = (exp_au - exp_al) / width_exponent;
    (clamp(value, Decimal::ZERO, Decimal::ONE), KssfaBranch::Formula)
}

/// Risk-weight floor for a position.
pub fn risk_weight_floor(is_sts: bool) -> Rate {
    if is_sts {
        STS_RISK_WEIGHT_FLOOR
    } else {
        NON_STS_RISK_WEIGHT_FLOOR
    }
}

/// Risk weight of a tranche [attachment, detachment) given capital threshold K.
///
/// The caller guarantees attachment < detachment. For a tranche straddling K
/// the second supervisory-formula term is evaluated on the zero-width interval
/// (detachment, detachment).
pub fn tranche_risk_weight(
    k: Rate,
    attachment: Rate,
    detachment: Rate,
    p: Decimal,
    is_sts: bool,
) -> TrancheRiskWeight {
    let floor = risk_weight_floor(is_sts);
    let thickness = detachment - attachment;

    if detachment <= k {
        return TrancheRiskWeight {
            position: TranchePosition::BelowCapital,
            kssfa_attachment: None,
            kssfa_detachment: None,
            unfloored: MAX_RISK_WEIGHT,
            floor,
            risk_weight: MAX_RISK_WEIGHT,
        };
    }

    let (position, kssfa_attachment, kssfa_detachment, unfloored) = if attachment >= k {
        let ka = kssfa(k, attachment, detachment, p);
        (
            TranchePosition::AboveCapital,
            Some(ka),
            None,
            MAX_RISK_WEIGHT * ka / thickness,
        )
    } else {
        let ka = kssfa(k, attachment, detachment, p);
        let kd = kssfa(k, detachment, detachment, p);
        (
            TranchePosition::StraddlesCapital,
            Some(ka),
            Some(kd),
            MAX_RISK_WEIGHT * (ka - kd) / thickness,
        )
    };

    TrancheRiskWeight {
        position,
        kssfa_attachment,
        kssfa_detachment,
        unfloored,
        floor,
        risk_weight: clamp(unfloored, floor, MAX_RISK_WEIGHT),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
