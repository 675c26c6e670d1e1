//! MREL against both the RWA and the leverage exposure denominators.
//!
//! Eligible liabilities are summed by instrument class. Only own-funds
//! instruments count towards the subordination test, which is reported
//! separately from the headline requirement.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegCapError;
use crate::numeric::{format_percent, round_money, round_ratio};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RegCapResult;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Instruments counted towards MREL/TLAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibleInstrument {
    Cet1,
    At1,
    Tier2,
    SeniorNonPreferred,
    OtherEligible,
}

impl EligibleInstrument {
    pub fn key(&self) -> &'static str {
        match self {
            EligibleInstrument::Cet1 => "cet1",
            EligibleInstrument::At1 => "at1",
            EligibleInstrument::Tier2 => "tier2",
            EligibleInstrument::SeniorNonPreferred => "senior_non_preferred",
            EligibleInstrument::OtherEligible => "other_eligible",
        }
    }

    /// Own-funds instruments count towards the subordination requirement.
    pub fn is_subordinated(&self) -> bool {
        match self {
            EligibleInstrument::Cet1 | EligibleInstrument::At1 | EligibleInstrument::Tier2 => true,
            EligibleInstrument::SeniorNonPreferred | EligibleInstrument::OtherEligible => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

fn default_mrel_rwa() -> Rate {
    dec!(0.18)
}

fn default_mrel_lem() -> Rate {
    dec!(0.0675)
}

fn default_subordination() -> Rate {
    dec!(0.08)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrelInput {
    pub cet1_capital: Money,
    #[serde(default)]
    pub at1_capital: Money,
    #[serde(default)]
    pub tier2_capital: Money,
    #[serde(default)]
    pub senior_non_preferred: Money,
    #[serde(default)]
    pub other_eligible: Money,
    pub total_rwa: Money,
    /// Leverage exposure measure
    pub leverage_exposure: Money,
    /// Requirement as a share of RWA
    #[serde(default = "default_mrel_rwa")]
    pub mrel_requirement_rwa: Rate,
    /// Requirement as a share of the leverage exposure measure
    #[serde(default = "default_mrel_lem")]
    pub mrel_requirement_lem: Rate,
    #[serde(default = "default_subordination")]
    pub subordination_requirement: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrelOutput {
    pub total_mrel: Money,
    pub mrel_ratio_rwa: Rate,
    pub mrel_ratio_rwa_percent: String,
    pub mrel_ratio_lem: Rate,
    pub mrel_ratio_lem_percent: String,
    pub subordinated_amount: Money,
    pub subordination_ratio: Rate,
    pub subordination_ratio_percent: String,
    pub compliant_rwa: bool,
    pub compliant_lem: bool,
    pub compliant_subordination: bool,
    pub overall_compliant: bool,
    pub buffer_rwa: Rate,
    pub buffer_lem: Rate,
    pub buffer_subordination: Rate,
    pub breakdown: BTreeMap<String, Money>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// MREL against RWA and leverage exposure, plus the subordination test.
pub fn calculate_mrel(input: &MrelInput) -> RegCapResult<ComputationOutput<MrelOutput>> {
    let mut warnings: Vec<String> = Vec::new();
    validate_input(input)?;

    let instruments = [
        (EligibleInstrument::Cet1, input.cet1_capital),
        (EligibleInstrument::At1, input.at1_capital),
        (EligibleInstrument::Tier2, input.tier2_capital),
        (EligibleInstrument::SeniorNonPreferred, input.senior_non_preferred),
        (EligibleInstrument::OtherEligible, input.other_eligible),
    ];

    let total_mrel: Money = instruments.iter().map(|(_, amount)| *amount).sum();
    let subordinated: Money = instruments
        .iter()
        .filter(|(instrument, _)| instrument.is_subordinated())
        .map(|(_, amount)| *amount)
        .sum();

    let ratio_rwa = total_mrel / input.total_rwa;
    let ratio_lem = total_mrel / input.leverage_exposure;
    let subordination_ratio = subordinated / input.total_rwa;

    let compliant_rwa = ratio_rwa >= input.mrel_requirement_rwa;
    let compliant_lem = ratio_lem >= input.mrel_requirement_lem;
    let compliant_subordination = subordination_ratio >= input.subordination_requirement;

    let shortfalls = [
        ("MREL (RWA)", compliant_rwa, ratio_rwa, input.mrel_requirement_rwa),
        ("MREL (LEM)", compliant_lem, ratio_lem, input.mrel_requirement_lem),
        (
            "Subordination",
            compliant_subordination,
            subordination_ratio,
            input.subordination_requirement,
        ),
    ];
    for (label, compliant, ratio, requirement) in shortfalls {
        if !compliant {
            warnings.push(format!(
                "{} ratio {} below requirement {}.",
                label,
                format_percent(ratio),
                format_percent(requirement)
            ));
        }
    }

    let breakdown = instruments
        .iter()
        .map(|(instrument, amount)| (instrument.key().to_string(), round_money(*amount)))
        .collect();

    tracing::debug!(%ratio_rwa, %ratio_lem, %subordination_ratio, "MREL ratios calculated");

    let output = MrelOutput {
        total_mrel: round_money(total_mrel),
        mrel_ratio_rwa: round_ratio(ratio_rwa),
        mrel_ratio_rwa_percent: format_percent(ratio_rwa),
        mrel_ratio_lem: round_ratio(ratio_lem),
        mrel_ratio_lem_percent: format_percent(ratio_lem),
        subordinated_amount: round_money(subordinated),
        subordination_ratio: round_ratio(subordination_ratio),
        subordination_ratio_percent: format_percent(subordination_ratio),
        compliant_rwa,
        compliant_lem,
        compliant_subordination,
        overall_compliant: compliant_rwa && compliant_lem && compliant_subordination,
        buffer_rwa: round_ratio(ratio_rwa - input.mrel_requirement_rwa),
        buffer_lem: round_ratio(ratio_lem - input.mrel_requirement_lem),
        buffer_subordination: round_ratio(subordination_ratio - input.subordination_requirement),
        breakdown,
    };

    let assumptions = serde_json::json!({
        "mrel_requirement_rwa": input.mrel_requirement_rwa.to_string(),
        "mrel_requirement_lem": input.mrel_requirement_lem.to_string(),
        "subordination_requirement": input.subordination_requirement.to_string(),
        "subordinated_instruments": ["cet1", "at1", "tier2"],
    });

    Ok(with_metadata(
        "MREL/TLAC loss-absorbing capacity (BRRD Art. 45 / FSB TLAC)",
        &assumptions,
        warnings,
        output,
    ))
}

fn validate_input(input: &MrelInput) -> RegCapResult<()> {
    let amounts = [
        ("cet1_capital", input.cet1_capital),
        ("at1_capital", input.at1_capital),
        ("tier2_capital", input.tier2_capital),
        ("senior_non_preferred", input.senior_non_preferred),
        ("other_eligible", input.other_eligible),
    ];
    for (field, value) in amounts {
        if value < Decimal::ZERO {
            return Err(RegCapError::invalid(field, "cannot be negative"));
        }
    }
    if input.total_rwa <= Decimal::ZERO {
        return Err(RegCapError::invalid("total_rwa", "must be positive"));
    }
    if input.leverage_exposure <= Decimal::ZERO {
        return Err(RegCapError::invalid("leverage_exposure", "must be positive"));
    }
    let requirements = [
        ("mrel_requirement_rwa", input.mrel_requirement_rwa),
        ("mrel_requirement_lem", input.mrel_requirement_lem),
        ("subordination_requirement", input.subordination_requirement),
    ];
    for (field, value) in requirements {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(RegCapError::invalid(field, "must be between 0 and 1"));
        }
    }
    Ok(())
}
