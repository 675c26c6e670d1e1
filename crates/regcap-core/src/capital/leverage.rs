//! Basel III leverage ratio: Tier 1 capital over the total exposure measure,
//! tested against the 3% minimum.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegCapError;
use crate::numeric::{format_percent, round_money, round_ratio};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RegCapResult;

/// Basel III minimum Tier 1 leverage ratio.
pub const MIN_LEVERAGE_RATIO: Rate = dec!(0.03);

const MIN_CCF: Rate = dec!(0.1);
const MAX_CCF: Rate = dec!(1.0);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Components of the leverage exposure measure, as reported in the breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeverageComponent {
    Tier1Capital,
    OnBalance,
    Derivatives,
    Sft,
    OffBalance,
}

impl LeverageComponent {
    pub fn key(&self) -> &'static str {
        match self {
            LeverageComponent::Tier1Capital => "tier1_capital",
            LeverageComponent::OnBalance => "on_balance",
            LeverageComponent::Derivatives => "derivatives",
            LeverageComponent::Sft => "sft",
            LeverageComponent::OffBalance => "off_balance",
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

fn default_ccf() -> Rate {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageInput {
    pub tier1_capital: Money,
    pub on_balance_exposures: Money,
    /// SA-CCR derivative exposure
    #[serde(default)]
    pub derivative_exposures: Money,
    /// Securities financing transactions
    #[serde(default)]
    pub sft_exposures: Money,
    #[serde(default)]
    pub off_balance_items: Money,
    /// Credit conversion factor applied to off-balance items
    #[serde(default = "default_ccf")]
    pub ccf_off_balance: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageOutput {
    pub leverage_ratio: Rate,
    pub leverage_ratio_percent: String,
    pub total_exposure_measure: Money,
    pub compliant: bool,
    pub buffer_to_minimum: Rate,
    pub breakdown: BTreeMap<String, Money>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Tier 1 capital over the total exposure measure (on-balance, derivatives,
/// SFTs and CCF-weighted off-balance items).
pub fn calculate_leverage_ratio(
    input: &LeverageInput,
) -> RegCapResult<ComputationOutput<LeverageOutput>> {
    let mut warnings: Vec<String> = Vec::new();
    validate_input(input)?;

    let off_balance = input.off_balance_items * input.ccf_off_balance;
    let total_exposure = input.on_balance_exposures
        + input.derivative_exposures
        + input.sft_exposures
        + off_balance;

    let ratio = if total_exposure > Decimal::ZERO {
        input.tier1_capital / total_exposure
    } else {
        warnings.push("Total exposure measure is zero; leverage ratio set to zero.".into());
        Decimal::ZERO
    };

    let compliant = ratio >= MIN_LEVERAGE_RATIO;
    if !compliant {
        warnings.push(format!(
            "Leverage ratio {} is below the {} minimum.",
            format_percent(ratio),
            format_percent(MIN_LEVERAGE_RATIO)
        ));
    }

    let breakdown: BTreeMap<String, Money> = [
        (LeverageComponent::Tier1Capital, input.tier1_capital),
        (LeverageComponent::OnBalance, input.on_balance_exposures),
        (LeverageComponent::Derivatives, input.derivative_exposures),
        (LeverageComponent::Sft, input.sft_exposures),
        (LeverageComponent::OffBalance, off_balance),
    ]
    .into_iter()
    .map(|(component, amount)| (component.key().to_string(), round_money(amount)))
    .collect();

    tracing::debug!(%ratio, %total_exposure, compliant, "leverage ratio calculated");

    let output = LeverageOutput {
        leverage_ratio: round_ratio(ratio),
        leverage_ratio_percent: format_percent(ratio),
        total_exposure_measure: round_money(total_exposure),
        compliant,
        buffer_to_minimum: round_ratio(ratio - MIN_LEVERAGE_RATIO),
        breakdown,
    };

    let assumptions = serde_json::json!({
        "minimum_leverage_ratio": MIN_LEVERAGE_RATIO.to_string(),
        "ccf_off_balance": input.ccf_off_balance.to_string(),
    });

    Ok(with_metadata(
        "Basel III leverage ratio (Tier 1 / total exposure measure)",
        &assumptions,
        warnings,
        output,
    ))
}

fn validate_input(input: &LeverageInput) -> RegCapResult<()> {
    if input.tier1_capital <= Decimal::ZERO {
        return Err(RegCapError::invalid("tier1_capital", "must be positive"));
    }
    let amounts = [
        ("on_balance_exposures", input.on_balance_exposures),
        ("derivative_exposures", input.derivative_exposures),
        ("sft_exposures", input.sft_exposures),
        ("off_balance_items", input.off_balance_items),
    ];
    for (field, value) in amounts {
        if value < Decimal::ZERO {
            return Err(RegCapError::invalid(field, "cannot be negative"));
        }
    }
    if input.ccf_off_balance < MIN_CCF || input.ccf_off_balance > MAX_CCF {
        return Err(RegCapError::invalid(
            "ccf_off_balance",
            format!("must be between {} and {}", MIN_CCF, MAX_CCF),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
