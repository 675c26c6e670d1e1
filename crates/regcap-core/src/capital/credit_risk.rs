//! Credit-risk RWA for a single exposure under the Standardised Approach or
//! the foundation IRB risk-weight function (CRE31).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RegCapError;
use crate::numeric::{
    clamp, exp_decay, format_percent, ln, norm_cdf, norm_inv, round_money, round_ratio, sqrt,
};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::RegCapResult;

const CAPITAL_RATIO: Rate = dec!(0.08);
const MAX_RISK_WEIGHT: Rate = dec!(12.5);
/// Supervisory confidence level of the IRB function.
const IRB_CONFIDENCE: Decimal = dec!(0.999);
const MATURITY_PIVOT: Years = dec!(2.5);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureClass {
    Sovereign,
    Institution,
    Corporate,
    Retail,
    Mortgage,
    SmeCorporate,
    Equity,
    Other,
}

impl ExposureClass {
    pub fn key(&self) -> &'static str {
        match self {
            ExposureClass::Sovereign => "sovereign",
            ExposureClass::Institution => "institution",
            ExposureClass::Corporate => "corporate",
            ExposureClass::Retail => "retail",
            ExposureClass::Mortgage => "mortgage",
            ExposureClass::SmeCorporate => "sme_corporate",
            ExposureClass::Equity => "equity",
            ExposureClass::Other => "other",
        }
    }
}

impl fmt::Display for ExposureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreditApproach {
    #[default]
    #[serde(rename = "SA")]
    Standardised,
    #[serde(rename = "IRB")]
    InternalRatings,
}

impl fmt::Display for CreditApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditApproach::Standardised => f.write_str("SA"),
            CreditApproach::InternalRatings => f.write_str("IRB"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RwaInput {
    pub exposure_class: ExposureClass,
    /// Exposure at default
    pub exposure_amount: Money,
    #[serde(default)]
    pub approach: CreditApproach,
    /// Probability of default (IRB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pd: Option<Rate>,
    /// Loss given default (IRB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lgd: Option<Rate>,
    /// Effective maturity in years (IRB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity: Option<Years>,
    /// Manual risk weight, SA only (0 to 12.5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_weight_override: Option<Rate>,
}

/// Intermediate values of the IRB risk-weight function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrbParameters {
    /// Asset correlation R
    pub correlation: Decimal,
    /// Maturity slope b(PD)
    pub maturity_factor: Decimal,
    /// Maturity adjustment MA
    pub maturity_adjustment: Decimal,
    /// Capital requirement K per unit of EAD
    pub capital_k: Decimal,
    pub risk_weight: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RwaOutput {
    pub exposure_class: ExposureClass,
    pub approach: CreditApproach,
    pub risk_weight: Rate,
    pub risk_weight_percent: String,
    pub rwa: Money,
    pub capital_requirement: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irb_parameters: Option<IrbParameters>,
    pub calculation_steps: Vec<String>,
}

// ---------------------------------------------------------------------------
// Risk weights
// ---------------------------------------------------------------------------

/// Standardised Approach risk weight by exposure class.
pub fn sa_risk_weight(class: ExposureClass) -> Rate {
    match class {
        ExposureClass::Sovereign => dec!(0),
        ExposureClass::Institution => dec!(0.20),
        ExposureClass::Corporate => dec!(1.00),
        ExposureClass::Retail => dec!(0.75),
        ExposureClass::Mortgage => dec!(0.35),
        // Corporate weight with the SME supporting factor
        ExposureClass::SmeCorporate => dec!(0.85),
        ExposureClass::Equity => dec!(1.00),
        ExposureClass::Other => dec!(1.00),
    }
}

/// IRB risk weight and its intermediates for PD in (0, 1), LGD in (0, 1]
/// and maturity > 0.
pub fn irb_risk_weight(
    pd: Rate,
    lgd: Rate,
    maturity: Years,
    class: ExposureClass,
) -> RegCapResult<IrbParameters> {
    if pd <= Decimal::ZERO || pd >= Decimal::ONE {
        return Err(RegCapError::invalid("pd", "must be strictly between 0 and 1"));
    }
    if lgd <= Decimal::ZERO || lgd > Decimal::ONE {
        return Err(RegCapError::invalid("lgd", "must be in (0, 1]"));
    }
    if maturity <= Decimal::ZERO {
        return Err(RegCapError::invalid("maturity", "must be positive"));
    }

    let correlation = asset_correlation(pd, class);

    let ln_pd = ln(pd).ok_or_else(|| RegCapError::invalid("pd", "logarithm undefined"))?;
    let slope = dec!(0.11852) - dec!(0.05478) * ln_pd;
    let maturity_factor = slope * slope;
    let maturity_adjustment = (Decimal::ONE + (maturity - MATURITY_PIVOT) * maturity_factor)
        / (Decimal::ONE - dec!(1.5) * maturity_factor);

    let pd_quantile =
        norm_inv(pd).ok_or_else(|| RegCapError::invalid("pd", "normal quantile undefined"))?;
    let confidence_quantile = norm_inv(IRB_CONFIDENCE).ok_or_else(|| {
        RegCapError::InsufficientData("normal quantile at 99.9% unavailable".into())
    })?;

    let one_minus_r = Decimal::ONE - correlation;
    let conditional = sqrt(Decimal::ONE / one_minus_r) * pd_quantile
        + sqrt(correlation / one_minus_r) * confidence_quantile;
    let capital_k = (lgd * norm_cdf(conditional) - lgd * pd) * maturity_adjustment;

    Ok(IrbParameters {
        correlation,
        maturity_factor,
        maturity_adjustment,
        capital_k,
        risk_weight: clamp(MAX_RISK_WEIGHT * capital_k, Decimal::ZERO, MAX_RISK_WEIGHT),
    })
}

/// R = lo·f + hi·(1 − f), f = (1 − e^(−decay·PD)) / (1 − e^(−decay)).
fn asset_correlation(pd: Rate, class: ExposureClass) -> Decimal {
    let (lo, hi, decay) = match class {
        ExposureClass::Retail => (dec!(0.03), dec!(0.16), dec!(35)),
        ExposureClass::Sovereign
        | ExposureClass::Institution
        | ExposureClass::Corporate
        | ExposureClass::Mortgage
        | ExposureClass::SmeCorporate
        | ExposureClass::Equity
        | ExposureClass::Other => (dec!(0.12), dec!(0.24), dec!(50)),
    };
    let f = (Decimal::ONE - exp_decay(decay * pd)) / (Decimal::ONE - exp_decay(decay));
    lo * f + hi * (Decimal::ONE - f)
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

pub fn calculate_rwa(input: &RwaInput) -> RegCapResult<ComputationOutput<RwaOutput>> {
    let mut warnings: Vec<String> = Vec::new();

    if input.exposure_amount < Decimal::ZERO {
        return Err(RegCapError::invalid("exposure_amount", "cannot be negative"));
    }

    let mut steps = vec![format!("Exposure class: {}", input.exposure_class)];

    let (risk_weight, irb_parameters) = match input.approach {
        CreditApproach::Standardised => {
            let rw = match input.risk_weight_override {
                Some(rw) => {
                    if rw < Decimal::ZERO || rw > MAX_RISK_WEIGHT {
                        return Err(RegCapError::invalid(
                            "risk_weight_override",
                            format!("must be between 0 and {}", MAX_RISK_WEIGHT),
                        ));
                    }
                    steps.push(format!("SA risk weight (override): {}", format_percent(rw)));
                    rw
                }
                None => {
                    let rw = sa_risk_weight(input.exposure_class);
                    steps.push(format!("SA risk weight: {}", format_percent(rw)));
                    rw
                }
            };
            (rw, None)
        }
        CreditApproach::InternalRatings => {
            let pd = require(input.pd, "pd")?;
            let lgd = require(input.lgd, "lgd")?;
            let maturity = require(input.maturity, "maturity")?;
            if input.risk_weight_override.is_some() {
                warnings.push("risk_weight_override ignored under IRB.".into());
            }

            let params = irb_risk_weight(pd, lgd, maturity, input.exposure_class)?;
            steps.push(format!(
                "IRB parameters: PD={}, LGD={}, M={}",
                format_percent(pd),
                format_percent(lgd),
                maturity.normalize()
            ));
            steps.push(format!(
                "Correlation R={}, b={}, MA={}",
                round_ratio(params.correlation),
                round_ratio(params.maturity_factor),
                round_ratio(params.maturity_adjustment)
            ));
            steps.push(format!(
                "K={}, IRB risk weight = 12.5 x K = {}",
                round_ratio(params.capital_k),
                format_percent(params.risk_weight)
            ));
            if params.risk_weight >= MAX_RISK_WEIGHT {
                warnings.push("IRB risk weight capped at 1250%.".into());
            }
            (params.risk_weight, Some(params))
        }
    };

    let rwa = input.exposure_amount * risk_weight;
    let capital = rwa * CAPITAL_RATIO;
    steps.push(format!(
        "RWA = {} x {} = {}",
        input.exposure_amount,
        format_percent(risk_weight),
        round_money(rwa)
    ));
    steps.push(format!("Capital requirement = RWA x 8% = {}", round_money(capital)));

    tracing::debug!(
        class = %input.exposure_class,
        approach = %input.approach,
        %risk_weight,
        "credit RWA calculated"
    );

    let output = RwaOutput {
        exposure_class: input.exposure_class,
        approach: input.approach,
        risk_weight: round_ratio(risk_weight),
        risk_weight_percent: format_percent(risk_weight),
        rwa: round_money(rwa),
        capital_requirement: round_money(capital),
        irb_parameters,
        calculation_steps: steps,
    };

    let assumptions = serde_json::json!({
        "approach": input.approach.to_string(),
        "capital_ratio": CAPITAL_RATIO.to_string(),
        "irb_confidence_level": IRB_CONFIDENCE.to_string(),
    });

    Ok(with_metadata(
        "Credit risk RWA (Basel SA table / IRB risk-weight function)",
        &assumptions,
        warnings,
        output,
    ))
}

fn require(value: Option<Decimal>, field: &str) -> RegCapResult<Decimal> {
    value.ok_or_else(|| RegCapError::MissingParameter {
        field: field.into(),
        context: "IRB approach".into(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
