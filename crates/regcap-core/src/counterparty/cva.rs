//! CVA capital under the SA-CVA basic approach.
//!
//! Each counterparty contributes `2.33 · RW · max(1, M) · EAD` less a single
//! name hedge benefit; the per-name charges are aggregated with a 25%
//! supervisory correlation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RegCapError;
use crate::numeric::{checked_product, checked_sum, round_money, round_ratio, sqrt};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::RegCapResult;

const CVA_MULTIPLIER: Decimal = dec!(2.33);
const HEDGE_RECOGNITION: Decimal = dec!(0.5);
const AGGREGATION_CORRELATION: Decimal = dec!(0.25);

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Counterparty credit quality bucket.
///
/// Parsed case-insensitively from strings such as `"bbb"`; unknown ratings are
/// rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CreditRating {
    Aaa,
    Aa,
    A,
    Bbb,
    Bb,
    B,
    Ccc,
    Unrated,
}

impl CreditRating {
    /// SA-CVA risk weight.
    pub fn risk_weight(&self) -> Rate {
        match self {
            CreditRating::Aaa => dec!(0.007),
            CreditRating::Aa => dec!(0.008),
            CreditRating::A => dec!(0.010),
            CreditRating::Bbb => dec!(0.020),
            CreditRating::Bb => dec!(0.030),
            CreditRating::B => dec!(0.050),
            CreditRating::Ccc => dec!(0.100),
            CreditRating::Unrated => dec!(0.100),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditRating::Aaa => "AAA",
            CreditRating::Aa => "AA",
            CreditRating::A => "A",
            CreditRating::Bbb => "BBB",
            CreditRating::Bb => "BB",
            CreditRating::B => "B",
            CreditRating::Ccc => "CCC",
            CreditRating::Unrated => "Unrated",
        }
    }
}

impl TryFrom<String> for CreditRating {
    type Error = RegCapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_uppercase().as_str() {
            "AAA" => Ok(CreditRating::Aaa),
            "AA" => Ok(CreditRating::Aa),
            "A" => Ok(CreditRating::A),
            "BBB" => Ok(CreditRating::Bbb),
            "BB" => Ok(CreditRating::Bb),
            "B" => Ok(CreditRating::B),
            "CCC" => Ok(CreditRating::Ccc),
            "UNRATED" | "NR" => Ok(CreditRating::Unrated),
            _ => Err(RegCapError::invalid(
                "rating",
                format!("unrecognised rating '{}'", value),
            )),
        }
    }
}

impl From<CreditRating> for String {
    fn from(rating: CreditRating) -> Self {
        rating.as_str().to_string()
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyExposure {
    pub name: String,
    pub ead: Money,
    pub rating: CreditRating,
    pub maturity: Years,
    /// Notional of single-name CDS hedges
    #[serde(default)]
    pub hedge_notional: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvaInput {
    pub counterparties: Vec<CounterpartyExposure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyCva {
    pub name: String,
    pub ead: Money,
    pub rating: CreditRating,
    pub risk_weight: Rate,
    pub cva_capital_gross: Money,
    pub hedge_benefit: Money,
    pub cva_capital_net: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvaOutput {
    pub total_cva_capital: Money,
    pub cva_capital_by_counterparty: Vec<CounterpartyCva>,
    pub total_ead: Money,
    pub hedging_benefit: Money,
    /// Total CVA capital over total EAD
    pub aggregate_risk_weight: Rate,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

pub fn calculate_cva_capital(input: &CvaInput) -> RegCapResult<ComputationOutput<CvaOutput>> {
    let mut warnings: Vec<String> = Vec::new();

    if input.counterparties.is_empty() {
        warnings.push("No counterparties provided; CVA capital is zero.".into());
    }

    let mut rows: Vec<CounterpartyCva> = Vec::with_capacity(input.counterparties.len());
    let mut total_ead = Decimal::ZERO;
    let mut total_hedge = Decimal::ZERO;

    for cp in &input.counterparties {
        validate_counterparty(cp)?;

        let rw = cp.rating.risk_weight();
        let discount_factor = cp.maturity.max(Decimal::ONE);
        let gross = checked_product(&[CVA_MULTIPLIER, rw, discount_factor, cp.ead])
            .ok_or_else(|| out_of_range(cp, "ead"))?;
        let hedge = cp.hedge_notional.min(cp.ead) * rw * HEDGE_RECOGNITION;
        let net = (gross - hedge).max(Decimal::ZERO);

        if cp.hedge_notional > cp.ead {
            warnings.push(format!(
                "{}: hedge notional exceeds EAD; hedge recognised up to EAD.",
                cp.name
            ));
        }

        total_ead = total_ead
            .checked_add(cp.ead)
            .ok_or_else(|| out_of_range(cp, "ead"))?;
        total_hedge += hedge;
        rows.push(CounterpartyCva {
            name: cp.name.clone(),
            ead: cp.ead,
            rating: cp.rating,
            risk_weight: rw,
            cva_capital_gross: round_money(gross),
            hedge_benefit: round_money(hedge),
            cva_capital_net: round_money(net),
        });
    }

    // Aggregation runs over the reported (2dp) per-counterparty charges.
    let total_cva = aggregate(&rows).ok_or_else(|| {
        RegCapError::invalid(
            "counterparties",
            "aggregate CVA capital exceeds the representable range",
        )
    })?;

    let aggregate_rw = if total_ead > Decimal::ZERO {
        total_cva / total_ead
    } else {
        Decimal::ZERO
    };

    tracing::debug!(
        counterparties = rows.len(),
        total_cva = %total_cva,
        "CVA capital aggregated"
    );

    let output = CvaOutput {
        total_cva_capital: round_money(total_cva),
        cva_capital_by_counterparty: rows,
        total_ead: round_money(total_ead),
        hedging_benefit: round_money(total_hedge),
        aggregate_risk_weight: round_ratio(aggregate_rw),
    };

    let assumptions = serde_json::json!({
        "multiplier": CVA_MULTIPLIER.to_string(),
        "hedge_recognition": HEDGE_RECOGNITION.to_string(),
        "correlation": AGGREGATION_CORRELATION.to_string(),
        "discount_factor": "max(1, maturity)",
    });

    Ok(with_metadata(
        "SA-CVA basic approach",
        &assumptions,
        warnings,
        output,
    ))
}

/// √((ρ·Σnet)² + (1−ρ)·Σnet²); `None` on overflow.
fn aggregate(rows: &[CounterpartyCva]) -> Option<Money> {
    let sum_net = checked_sum(rows.iter().map(|r| r.cva_capital_net))?;
    let sum_squares = rows
        .iter()
        .map(|r| r.cva_capital_net.checked_mul(r.cva_capital_net))
        .try_fold(Decimal::ZERO, |acc, sq| acc.checked_add(sq?))?;
    let systematic = AGGREGATION_CORRELATION * sum_net;
    let variance = checked_sum([
        systematic.checked_mul(systematic)?,
        (Decimal::ONE - AGGREGATION_CORRELATION) * sum_squares,
    ])?;
    Some(sqrt(variance))
}

fn out_of_range(cp: &CounterpartyExposure, field: &str) -> RegCapError {
    RegCapError::invalid(
        field,
        format!("{}: CVA charge exceeds the representable range", cp.name),
    )
}

fn validate_counterparty(cp: &CounterpartyExposure) -> RegCapResult<()> {
    if cp.ead < Decimal::ZERO {
        return Err(RegCapError::invalid(
            "ead",
            format!("{}: cannot be negative", cp.name),
        ));
    }
    if cp.maturity < Decimal::ZERO {
        return Err(RegCapError::invalid(
            "maturity",
            format!("{}: cannot be negative", cp.name),
        ));
    }
    if cp.hedge_notional < Decimal::ZERO {
        return Err(RegCapError::invalid(
            "hedge_notional",
            format!("{}: cannot be negative", cp.name),
        ));
    }
    Ok(())
}
