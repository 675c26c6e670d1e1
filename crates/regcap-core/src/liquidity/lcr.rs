//! Liquidity coverage ratio.
//!
//! HQLA is haircut by level, then the Level 2 (40%) and Level 2B (15%) caps
//! are applied in that order. Inflows count up to 75% of outflows. Each cap
//! that fires is recorded in `caps_applied` with the amounts involved.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegCapError;
use crate::numeric::{format_percent_dp, format_percent_or_unbounded, round_money, round_ratio};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RegCapResult;

pub const LCR_MIN_REQUIREMENT: Rate = dec!(1.0);
/// Inflows count up to 75% of outflows.
const INFLOW_CAP_RATIO: Rate = dec!(0.75);

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HqlaLevel {
    Level1,
    Level2A,
    Level2B,
}

impl HqlaLevel {
    /// Standard Basel III haircut.
    pub fn haircut(&self) -> Rate {
        match self {
            Self::Level1 => dec!(0.00),
            Self::Level2A => dec!(0.15),
            Self::Level2B => dec!(0.50),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Level1 => "level1",
            Self::Level2A => "level2a",
            Self::Level2B => "level2b",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutflowCategory {
    /// 5% run-off
    RetailStable,
    /// 10% run-off
    RetailLessStable,
    /// 25% run-off
    WholesaleOperational,
    /// 40% run-off
    WholesaleNonOperational,
    /// 100% run-off
    SecuredFunding,
    /// 100% run-off
    Other,
}

impl OutflowCategory {
    /// Standard Basel III run-off rate for each outflow category.
    pub fn standard_rate(&self) -> Rate {
        match self {
            Self::RetailStable => dec!(0.05),
            Self::RetailLessStable => dec!(0.10),
            Self::WholesaleOperational => dec!(0.25),
            Self::WholesaleNonOperational => dec!(0.40),
            Self::SecuredFunding => dec!(1.00),
            Self::Other => dec!(1.00),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::RetailStable => "retail_stable",
            Self::RetailLessStable => "retail_less_stable",
            Self::WholesaleOperational => "wholesale_operational",
            Self::WholesaleNonOperational => "wholesale_non_operational",
            Self::SecuredFunding => "secured_funding",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InflowCategory {
    Retail,
    Wholesale,
    Other,
}

impl InflowCategory {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Retail => "retail",
            Self::Wholesale => "wholesale",
            Self::Other => "other",
        }
    }
}

/// Composition and inflow caps, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LcrCap {
    /// Level 2 at most 40% of adjusted HQLA
    Level2Total,
    /// Level 2B at most 15% of adjusted HQLA
    Level2B,
    /// Inflows at most 75% of outflows
    Inflows,
}

impl LcrCap {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Level2Total => "L2_cap",
            Self::Level2B => "L2B_cap",
            Self::Inflows => "inflow_cap",
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Aggregated LCR positions. Every amount defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcrInput {
    pub hqla_level1: Money,
    pub hqla_level2a: Money,
    pub hqla_level2b: Money,
    pub retail_deposits_stable: Money,
    pub retail_deposits_less_stable: Money,
    pub wholesale_operational: Money,
    pub wholesale_non_operational: Money,
    pub secured_funding: Money,
    pub other_outflows: Money,
    pub retail_inflows: Money,
    pub wholesale_inflows: Money,
    pub other_inflows: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcrOutput {
    /// None when net outflows are zero (unbounded ratio)
    pub lcr: Option<Rate>,
    pub lcr_percent: String,
    pub compliant: bool,
    pub buffer_to_minimum: Option<Rate>,
    /// Pre-haircut HQLA
    pub hqla_total: Money,
    /// Post-haircut, post-cap HQLA
    pub hqla_adjusted: Money,
    pub total_outflows: Money,
    /// Inflows after the 75% cap
    pub total_inflows: Money,
    pub net_outflows: Money,
    pub hqla_breakdown: BTreeMap<String, Money>,
    pub outflow_breakdown: BTreeMap<String, Money>,
    pub inflow_breakdown: BTreeMap<String, Money>,
    pub caps_applied: BTreeMap<String, String>,
}

/// Adjusted HQLA by level after haircuts and composition caps.
#[derive(Debug, Clone, PartialEq)]
struct AdjustedHqla {
    level1: Money,
    level2a: Money,
    level2b: Money,
}

impl AdjustedHqla {
    fn total(&self) -> Money {
        self.level1 + self.level2a + self.level2b
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Basel III Liquidity Coverage Ratio.
///
/// HQLA is haircut by level, then the 40% Level 2 cap and the 15% Level 2B cap
/// are applied in that order. Net outflows are outflows less inflows capped at
/// 75% of outflows.
pub fn calculate_lcr(input: &LcrInput) -> RegCapResult<ComputationOutput<LcrOutput>> {
    let mut warnings: Vec<String> = Vec::new();
    validate_input(input)?;

    let mut caps_applied: BTreeMap<String, String> = BTreeMap::new();

    let hqla_total = input.hqla_level1 + input.hqla_level2a + input.hqla_level2b;
    let hqla = apply_hqla_caps(
        input.hqla_level1 * (Decimal::ONE - HqlaLevel::Level1.haircut()),
        input.hqla_level2a * (Decimal::ONE - HqlaLevel::Level2A.haircut()),
        input.hqla_level2b * (Decimal::ONE - HqlaLevel::Level2B.haircut()),
        &mut caps_applied,
    );
    let hqla_adjusted = hqla.total();

    // -- Outflows --
    let outflows = [
        (OutflowCategory::RetailStable, input.retail_deposits_stable),
        (OutflowCategory::RetailLessStable, input.retail_deposits_less_stable),
        (OutflowCategory::WholesaleOperational, input.wholesale_operational),
        (OutflowCategory::WholesaleNonOperational, input.wholesale_non_operational),
        (OutflowCategory::SecuredFunding, input.secured_funding),
        (OutflowCategory::Other, input.other_outflows),
    ];
    let mut outflow_breakdown = BTreeMap::new();
    let mut total_outflows = Decimal::ZERO;
    for (category, amount) in outflows {
        let weighted = amount * category.standard_rate();
        total_outflows += weighted;
        outflow_breakdown.insert(category.key().to_string(), round_money(weighted));
    }

    // -- Inflows --
    let inflows = [
        (InflowCategory::Retail, input.retail_inflows),
        (InflowCategory::Wholesale, input.wholesale_inflows),
        (InflowCategory::Other, input.other_inflows),
    ];
    let raw_inflows: Money = inflows.iter().map(|(_, amount)| *amount).sum();
    let inflow_breakdown = inflows
        .iter()
        .map(|(category, amount)| (category.key().to_string(), round_money(*amount)))
        .collect();

    let inflow_cap = total_outflows * INFLOW_CAP_RATIO;
    let total_inflows = if raw_inflows > inflow_cap {
        caps_applied.insert(
            LcrCap::Inflows.key().to_string(),
            format!(
                "Inflows capped at 75% of outflows (raw {:.2} -> capped {:.2})",
                raw_inflows, inflow_cap
            ),
        );
        warnings.push(format!(
            "Inflows capped at 75% of outflows: raw {} -> capped {}",
            round_money(raw_inflows),
            round_money(inflow_cap)
        ));
        inflow_cap
    } else {
        raw_inflows
    };

    let net_outflows = total_outflows - total_inflows;

    // -- Ratio --
    let lcr = if net_outflows > Decimal::ZERO {
        Some(hqla_adjusted / net_outflows)
    } else {
        warnings.push("Net cash outflows are zero; LCR is unbounded.".to_string());
        None
    };
    let compliant = lcr.map_or(true, |ratio| ratio >= LCR_MIN_REQUIREMENT);

    tracing::debug!(
        hqla = %hqla_adjusted,
        net_outflows = %net_outflows,
        caps = caps_applied.len(),
        "LCR calculated"
    );

    let hqla_breakdown = [
        (HqlaLevel::Level1, hqla.level1),
        (HqlaLevel::Level2A, hqla.level2a),
        (HqlaLevel::Level2B, hqla.level2b),
    ]
    .into_iter()
    .map(|(level, amount)| (level.key().to_string(), round_money(amount)))
    .collect();

    let output = LcrOutput {
        lcr: lcr.map(round_ratio),
        lcr_percent: format_percent_or_unbounded(lcr),
        compliant,
        buffer_to_minimum: lcr.map(|ratio| round_ratio(ratio - LCR_MIN_REQUIREMENT)),
        hqla_total: round_money(hqla_total),
        hqla_adjusted: round_money(hqla_adjusted),
        total_outflows: round_money(total_outflows),
        total_inflows: round_money(total_inflows),
        net_outflows: round_money(net_outflows),
        hqla_breakdown,
        outflow_breakdown,
        inflow_breakdown,
        caps_applied,
    };

    let assumptions = serde_json::json!({
        "framework": "Basel III LCR",
        "hqla_haircuts": { "level1": "0%", "level2a": "15%", "level2b": "50%" },
        "caps": {
            "level2_total": "40% of adjusted HQLA",
            "level2b": "15% of adjusted HQLA",
            "inflows": "75% of total outflows"
        },
        "minimum_requirement": "100%"
    });

    Ok(with_metadata(
        "Basel III Liquidity Coverage Ratio (LCR)",
        &assumptions,
        warnings,
        output,
    ))
}

/// Level 2 total cap first, scaling 2A and 2B by one factor; then the Level 2B
/// cap against the already-capped Level 1 + 2A.
fn apply_hqla_caps(
    l1: Money,
    l2a: Money,
    l2b: Money,
    caps_applied: &mut BTreeMap<String, String>,
) -> AdjustedHqla {
    let mut adj_l2a = l2a;
    let mut adj_l2b = l2b;

    // (L2A + L2B) <= 40% of HQLA  =>  (L2A + L2B) <= L1 * 40 / 60
    let l2_total = adj_l2a + adj_l2b;
    let l2_max = l1 * dec!(40) / dec!(60);
    if l2_total > l2_max {
        let factor = l2_max / l2_total;
        adj_l2a *= factor;
        adj_l2b *= factor;
        caps_applied.insert(
            LcrCap::Level2Total.key().to_string(),
            format!(
                "Level 2 capped to 40% (reduced by {})",
                format_percent_dp(Decimal::ONE - factor, 1)
            ),
        );
        tracing::debug!(%l2_total, %l2_max, "level 2 HQLA cap applied");
    }

    // L2B <= 15% of HQLA  =>  L2B <= (L1 + L2A) * 15 / 85
    let l2b_max = (l1 + adj_l2a) * dec!(15) / dec!(85);
    if adj_l2b > l2b_max {
        caps_applied.insert(
            LcrCap::Level2B.key().to_string(),
            format!(
                "Level 2B capped to 15% (reduced from {:.2} to {:.2})",
                adj_l2b, l2b_max
            ),
        );
        tracing::debug!(level2b = %adj_l2b, %l2b_max, "level 2B HQLA cap applied");
        adj_l2b = l2b_max;
    }

    AdjustedHqla {
        level1: l1,
        level2a: adj_l2a,
        level2b: adj_l2b,
    }
}

fn validate_input(input: &LcrInput) -> RegCapResult<()> {
    let fields = [
        ("hqla_level1", input.hqla_level1),
        ("hqla_level2a", input.hqla_level2a),
        ("hqla_level2b", input.hqla_level2b),
        ("retail_deposits_stable", input.retail_deposits_stable),
        ("retail_deposits_less_stable", input.retail_deposits_less_stable),
        ("wholesale_operational", input.wholesale_operational),
        ("wholesale_non_operational", input.wholesale_non_operational),
        ("secured_funding", input.secured_funding),
        ("other_outflows", input.other_outflows),
        ("retail_inflows", input.retail_inflows),
        ("wholesale_inflows", input.wholesale_inflows),
        ("other_inflows", input.other_inflows),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(RegCapError::invalid(field, "cannot be negative"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
