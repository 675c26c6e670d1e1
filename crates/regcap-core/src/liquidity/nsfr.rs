//! Net stable funding ratio: weighted available over weighted required stable
//! funding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegCapError;
use crate::numeric::{format_percent_or_unbounded, round_money, round_ratio};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::RegCapResult;

pub const NSFR_MIN_REQUIREMENT: Rate = dec!(1.0);

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Available stable funding categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsfCategory {
    CapitalLongTerm,
    StableRetail,
    LessStableDeposits,
    WholesaleShort,
    OtherLiabilities,
}

impl AsfCategory {
    /// Basel III ASF factor.
    pub fn factor(&self) -> Rate {
        match self {
            Self::CapitalLongTerm => dec!(1.00),
            Self::StableRetail => dec!(0.95),
            Self::LessStableDeposits => dec!(0.90),
            Self::WholesaleShort => dec!(0.50),
            Self::OtherLiabilities => dec!(0.00),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::CapitalLongTerm => "capital_long_term",
            Self::StableRetail => "stable_retail",
            Self::LessStableDeposits => "less_stable_deposits",
            Self::WholesaleShort => "wholesale_short",
            Self::OtherLiabilities => "other_liabilities",
        }
    }
}

/// Required stable funding categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsfCategory {
    CashReserves,
    HqlaLevel1,
    HqlaLevel2,
    LoansToFiShort,
    CorporateShort,
    ResidentialMortgages,
    OtherLoansLong,
    NonPerforming,
    OtherAssets,
}

impl RsfCategory {
    /// Basel III RSF factor.
    pub fn factor(&self) -> Rate {
        match self {
            Self::CashReserves => dec!(0.00),
            Self::HqlaLevel1 => dec!(0.05),
            Self::HqlaLevel2 => dec!(0.15),
            Self::LoansToFiShort => dec!(0.10),
            Self::CorporateShort => dec!(0.50),
            Self::ResidentialMortgages => dec!(0.65),
            Self::OtherLoansLong => dec!(0.85),
            Self::NonPerforming => dec!(1.00),
            Self::OtherAssets => dec!(1.00),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::CashReserves => "cash_reserves",
            Self::HqlaLevel1 => "hqla_l1",
            Self::HqlaLevel2 => "hqla_l2",
            Self::LoansToFiShort => "loans_fi_short",
            Self::CorporateShort => "corporate_short",
            Self::ResidentialMortgages => "residential_mortgages",
            Self::OtherLoansLong => "other_loans_long",
            Self::NonPerforming => "npl",
            Self::OtherAssets => "other_assets",
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Balance-sheet positions for the NSFR. Every amount defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NsfrInput {
    // Liabilities and capital
    pub capital_long_term_debt: Money,
    pub stable_retail_deposits: Money,
    pub less_stable_deposits: Money,
    pub wholesale_funding_short: Money,
    pub other_liabilities: Money,
    // Assets
    pub cash_and_reserves: Money,
    pub hqla_level1: Money,
    pub hqla_level2: Money,
    pub loans_to_fi_short: Money,
    pub corporate_loans_short: Money,
    pub residential_mortgages: Money,
    pub other_loans_long: Money,
    pub npl_assets: Money,
    pub other_assets: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsfrOutput {
    /// None when required stable funding is zero (unbounded ratio)
    pub nsfr: Option<Rate>,
    pub nsfr_percent: String,
    pub compliant: bool,
    pub buffer_to_minimum: Option<Rate>,
    pub total_asf: Money,
    pub total_rsf: Money,
    pub asf_breakdown: BTreeMap<String, Money>,
    pub rsf_breakdown: BTreeMap<String, Money>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Basel III Net Stable Funding Ratio: ASF / RSF >= 100%.
pub fn calculate_nsfr(input: &NsfrInput) -> RegCapResult<ComputationOutput<NsfrOutput>> {
    let mut warnings: Vec<String> = Vec::new();

    let funding = [
        (AsfCategory::CapitalLongTerm, input.capital_long_term_debt),
        (AsfCategory::StableRetail, input.stable_retail_deposits),
        (AsfCategory::LessStableDeposits, input.less_stable_deposits),
        (AsfCategory::WholesaleShort, input.wholesale_funding_short),
        (AsfCategory::OtherLiabilities, input.other_liabilities),
    ];
    let requirements = [
        (RsfCategory::CashReserves, input.cash_and_reserves),
        (RsfCategory::HqlaLevel1, input.hqla_level1),
        (RsfCategory::HqlaLevel2, input.hqla_level2),
        (RsfCategory::LoansToFiShort, input.loans_to_fi_short),
        (RsfCategory::CorporateShort, input.corporate_loans_short),
        (RsfCategory::ResidentialMortgages, input.residential_mortgages),
        (RsfCategory::OtherLoansLong, input.other_loans_long),
        (RsfCategory::NonPerforming, input.npl_assets),
        (RsfCategory::OtherAssets, input.other_assets),
    ];

    for (category, amount) in &funding {
        if *amount < Decimal::ZERO {
            return Err(RegCapError::invalid(category.key(), "cannot be negative"));
        }
    }
    for (category, amount) in &requirements {
        if *amount < Decimal::ZERO {
            return Err(RegCapError::invalid(category.key(), "cannot be negative"));
        }
    }

    let mut asf_breakdown = BTreeMap::new();
    let mut total_asf = Decimal::ZERO;
    for (category, amount) in funding {
        let weighted = amount * category.factor();
        total_asf += weighted;
        asf_breakdown.insert(category.key().to_string(), round_money(weighted));
    }

    let mut rsf_breakdown = BTreeMap::new();
    let mut total_rsf = Decimal::ZERO;
    for (category, amount) in requirements {
        let weighted = amount * category.factor();
        total_rsf += weighted;
        rsf_breakdown.insert(category.key().to_string(), round_money(weighted));
    }

    let nsfr = if total_rsf > Decimal::ZERO {
        Some(total_asf / total_rsf)
    } else {
        warnings.push("Required stable funding is zero; NSFR is unbounded.".to_string());
        None
    };
    let compliant = nsfr.map_or(true, |ratio| ratio >= NSFR_MIN_REQUIREMENT);

    tracing::debug!(asf = %total_asf, rsf = %total_rsf, compliant, "NSFR calculated");

    let output = NsfrOutput {
        nsfr: nsfr.map(round_ratio),
        nsfr_percent: format_percent_or_unbounded(nsfr),
        compliant,
        buffer_to_minimum: nsfr.map(|ratio| round_ratio(ratio - NSFR_MIN_REQUIREMENT)),
        total_asf: round_money(total_asf),
        total_rsf: round_money(total_rsf),
        asf_breakdown,
        rsf_breakdown,
    };

    let assumptions = serde_json::json!({
        "framework": "Basel III NSFR",
        "formula": "NSFR = ASF / RSF",
        "minimum_requirement": "100%"
    });

    Ok(with_metadata(
        "Basel III Net Stable Funding Ratio (NSFR)",
        &assumptions,
        warnings,
        output,
    ))
}
