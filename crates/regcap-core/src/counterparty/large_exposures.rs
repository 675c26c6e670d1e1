//! Large exposures against Tier 1 capital.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RegCapError;
use crate::numeric::{format_percent, format_percent_dp, round_money, round_ratio};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RegCapResult;

/// Exposures at or above this share of Tier 1 are large exposures.
pub const LARGE_EXPOSURE_THRESHOLD: Rate = dec!(0.10);
/// Standard large-exposure limit.
pub const STANDARD_LIMIT: Rate = dec!(0.25);
/// Limit between two G-SIBs.
pub const GSIB_TO_GSIB_LIMIT: Rate = dec!(0.10);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Exposure to a group of connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupExposure {
    pub group_name: String,
    pub gross_exposure: Money,
    #[serde(default)]
    pub collateral: Money,
    #[serde(default)]
    pub guarantees: Money,
    /// Whether the counterparty is itself a G-SIB; defaults to the reporting
    /// bank's own status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_is_gsib: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeExposuresInput {
    pub tier1_capital: Money,
    #[serde(default)]
    pub is_gsib: bool,
    pub exposures: Vec<GroupExposure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureDetail {
    pub group_name: String,
    pub gross_exposure: Money,
    pub collateral: Money,
    pub guarantees: Money,
    pub net_exposure: Money,
    pub percent_of_tier1: Rate,
    pub percent_of_tier1_display: String,
    pub is_large_exposure: bool,
    pub is_breach: bool,
    pub limit: Rate,
    pub limit_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeExposuresOutput {
    pub exposures_detail: Vec<ExposureDetail>,
    pub large_exposures_count: usize,
    pub breaches_count: usize,
    /// Sum of Tier 1 shares over large exposures
    pub total_concentration: Rate,
    pub tier1_capital: Money,
    /// Limit applied to counterparties with no G-SIB override
    pub limit_percent: Rate,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Limit for one exposure: 10% when both sides are G-SIBs, else 25%.
pub fn exposure_limit(bank_is_gsib: bool, counterparty_is_gsib: bool) -> Rate {
    if bank_is_gsib && counterparty_is_gsib {
        GSIB_TO_GSIB_LIMIT
    } else {
        STANDARD_LIMIT
    }
}

/// Large-exposure concentration against Tier 1 (CRR Art. 392/395).
pub fn calculate_large_exposures(
    input: &LargeExposuresInput,
) -> RegCapResult<ComputationOutput<LargeExposuresOutput>> {
    let mut warnings: Vec<String> = Vec::new();

    if input.tier1_capital <= Decimal::ZERO {
        return Err(RegCapError::invalid("tier1_capital", "must be positive"));
    }
    if input.exposures.is_empty() {
        warnings.push("No exposures provided.".into());
    }

    let mut details = Vec::with_capacity(input.exposures.len());
    let mut large_count = 0usize;
    let mut breach_count = 0usize;
    let mut concentration = Decimal::ZERO;

    for exp in &input.exposures {
        validate_exposure(exp)?;

        let net = match exp.collateral.checked_add(exp.guarantees) {
            Some(offsets) => (exp.gross_exposure - offsets).max(Decimal::ZERO),
            None => Decimal::ZERO,
        };
        let pct = net.checked_div(input.tier1_capital).ok_or_else(|| {
            RegCapError::invalid(
                "tier1_capital",
                format!("{}: exposure share exceeds the representable range", exp.group_name),
            )
        })?;
        let limit = exposure_limit(
            input.is_gsib,
            exp.counterparty_is_gsib.unwrap_or(input.is_gsib),
        );

        let is_large = pct >= LARGE_EXPOSURE_THRESHOLD;
        let is_breach = pct > limit;
        if is_large {
            large_count += 1;
            concentration = concentration.checked_add(pct).ok_or_else(|| {
                RegCapError::invalid(
                    "exposures",
                    "total concentration exceeds the representable range",
                )
            })?;
        }
        if is_breach {
            breach_count += 1;
            warnings.push(format!(
                "{}: exposure {} of Tier 1 breaches the {} limit.",
                exp.group_name,
                format_percent(pct),
                format_percent_dp(limit, 0)
            ));
        }

        details.push(ExposureDetail {
            group_name: exp.group_name.clone(),
            gross_exposure: exp.gross_exposure,
            collateral: exp.collateral,
            guarantees: exp.guarantees,
            net_exposure: round_money(net),
            percent_of_tier1: round_ratio(pct),
            percent_of_tier1_display: format_percent(pct),
            is_large_exposure: is_large,
            is_breach,
            limit,
            limit_display: format_percent_dp(limit, 0),
        });
    }

    tracing::debug!(
        exposures = details.len(),
        large = large_count,
        breaches = breach_count,
        "large exposures evaluated"
    );

    let output = LargeExposuresOutput {
        exposures_detail: details,
        large_exposures_count: large_count,
        breaches_count: breach_count,
        total_concentration: round_ratio(concentration),
        tier1_capital: input.tier1_capital,
        limit_percent: exposure_limit(input.is_gsib, input.is_gsib),
    };

    let assumptions = serde_json::json!({
        "large_exposure_threshold": LARGE_EXPOSURE_THRESHOLD.to_string(),
        "standard_limit": STANDARD_LIMIT.to_string(),
        "gsib_to_gsib_limit": GSIB_TO_GSIB_LIMIT.to_string(),
        "net_exposure": "max(0, gross - collateral - guarantees)",
    });

    Ok(with_metadata(
        "Large exposures regime (CRR Art. 392/395)",
        &assumptions,
        warnings,
        output,
    ))
}

fn validate_exposure(exp: &GroupExposure) -> RegCapResult<()> {
    let amounts = [
        ("gross_exposure", exp.gross_exposure),
        ("collateral", exp.collateral),
        ("guarantees", exp.guarantees),
    ];
    for (field, value) in amounts {
        if value < Decimal::ZERO {
            return Err(RegCapError::invalid(
                field,
                format!("{}: cannot be negative", exp.group_name),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposure(name: &str, gross: Decimal, collateral: Decimal) -> GroupExposure {
        GroupExposure {
            group_name: name.into(),
            gross_exposure: gross,
            collateral,
            guarantees: Decimal::ZERO,
            counterparty_is_gsib: None,
        }
    }

    #[test]
    fn test_limit_equality_is_not_breach() {
        let input = LargeExposuresInput {
            tier1_capital: dec!(100),
            is_gsib: false,
            exposures: vec![exposure("Group A", dec!(30), dec!(5))],
        };
        let out = calculate_large_exposures(&input).unwrap();
        let d = &out.result.exposures_detail[0];
        assert_eq!(d.net_exposure, dec!(25));
        assert_eq!(d.percent_of_tier1, dec!(0.25));
        assert!(d.is_large_exposure);
        assert_eq!(d.limit, dec!(0.25));
        assert!(!d.is_breach);
        assert_eq!(d.limit_display, "25%");
        assert_eq!(out.result.breaches_count, 0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_gsib_to_gsib_limit() {
        let input = LargeExposuresInput {
            tier1_capital: dec!(100),
            is_gsib: true,
            exposures: vec![exposure("Other G-SIB", dec!(12), dec!(0))],
        };
        let r = calculate_large_exposures(&input).unwrap().result;
        assert_eq!(r.limit_percent, dec!(0.10));
        assert!(r.exposures_detail[0].is_breach);
        assert_eq!(r.breaches_count, 1);
    }

    #[test]
    fn test_counterparty_override_relaxes_limit() {
        let mut corp = exposure("Corporate", dec!(12), dec!(0));
        corp.counterparty_is_gsib = Some(false);
        let input = LargeExposuresInput {
            tier1_capital: dec!(100),
            is_gsib: true,
            exposures: vec![corp],
        };
        let r = calculate_large_exposures(&input).unwrap().result;
        assert_eq!(r.exposures_detail[0].limit, dec!(0.25));
        assert!(!r.exposures_detail[0].is_breach);
    }

    #[test]
    fn test_net_exposure_floored_and_concentration() {
        let input = LargeExposuresInput {
            tier1_capital: dec!(200),
            is_gsib: false,
            exposures: vec![
                exposure("Secured", dec!(10), dec!(50)),
                exposure("Big", dec!(60), dec!(0)),
                exposure("Medium", dec!(30), dec!(0)),
                exposure("Small", dec!(10), dec!(0)),
            ],
        };
        let r = calculate_large_exposures(&input).unwrap().result;
        assert_eq!(r.exposures_detail[0].net_exposure, Decimal::ZERO);
        assert_eq!(r.large_exposures_count, 2);
        // 0.30 + 0.15
        assert_eq!(r.total_concentration, dec!(0.45));
        assert_eq!(r.breaches_count, 1);
    }

    #[test]
    fn test_tiny_tier1_overflow_is_validation_error() {
        let input = LargeExposuresInput {
            tier1_capital: Decimal::new(1, 28),
            is_gsib: false,
            exposures: vec![exposure("Whale", dec!(10_000_000_000), dec!(0))],
        };
        match calculate_large_exposures(&input) {
            Err(RegCapError::InvalidInput { field, .. }) => assert_eq!(field, "tier1_capital"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_offsets_beyond_range_floor_net_at_zero() {
        let mut secured = exposure("Secured", dec!(10), Decimal::MAX);
        secured.guarantees = Decimal::MAX;
        let input = LargeExposuresInput {
            tier1_capital: dec!(100),
            is_gsib: false,
            exposures: vec![secured],
        };
        let r = calculate_large_exposures(&input).unwrap().result;
        assert_eq!(r.exposures_detail[0].net_exposure, Decimal::ZERO);
        assert!(!r.exposures_detail[0].is_large_exposure);
    }

    #[test]
    fn test_rejects_zero_tier1() {
        let input = LargeExposuresInput {
            tier1_capital: Decimal::ZERO,
            is_gsib: false,
            exposures: vec![],
        };
        assert!(calculate_large_exposures(&input).is_err());
    }
}
