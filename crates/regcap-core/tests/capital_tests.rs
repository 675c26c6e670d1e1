#![cfg(feature = "capital")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use regcap_core::capital::credit_risk::{CreditApproach, ExposureClass, RwaInput};
use regcap_core::capital::leverage::LeverageInput;
use regcap_core::capital::loss_absorbency::MrelInput;
use regcap_core::capital::{calculate_leverage_ratio, calculate_mrel, calculate_rwa};
use regcap_core::RegCapError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Leverage
// ===========================================================================

#[test]
fn test_leverage_from_json_with_defaults() {
    let input: LeverageInput =
        serde_json::from_str(r#"{"tier1_capital": "10", "on_balance_exposures": "200"}"#)
            .unwrap();
    assert_eq!(input.ccf_off_balance, Decimal::ONE);

    let out = calculate_leverage_ratio(&input).unwrap();
    assert_eq!(out.result.leverage_ratio, dec!(0.05));
    assert_eq!(out.result.leverage_ratio_percent, "5.00%");
    assert!(out.result.compliant);
    assert_eq!(out.result.buffer_to_minimum, dec!(0.02));
}

#[test]
fn test_leverage_full_exposure_measure() {
    let input = LeverageInput {
        tier1_capital: dec!(50),
        on_balance_exposures: dec!(1000),
        derivative_exposures: dec!(100),
        sft_exposures: dec!(50),
        off_balance_items: dec!(200),
        ccf_off_balance: dec!(0.5),
    };
    let r = calculate_leverage_ratio(&input).unwrap().result;
    assert_eq!(r.total_exposure_measure, dec!(1250));
    assert_eq!(r.leverage_ratio, dec!(0.04));
    assert_eq!(r.breakdown["off_balance"], dec!(100));
    assert_eq!(r.breakdown["tier1_capital"], dec!(50));
}

#[test]
fn test_leverage_rejects_ccf_out_of_range() {
    let input = LeverageInput {
        tier1_capital: dec!(10),
        on_balance_exposures: dec!(100),
        derivative_exposures: Decimal::ZERO,
        sft_exposures: Decimal::ZERO,
        off_balance_items: dec!(10),
        ccf_off_balance: dec!(1.5),
    };
    match calculate_leverage_ratio(&input) {
        Err(RegCapError::InvalidInput { field, .. }) => assert_eq!(field, "ccf_off_balance"),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

// ===========================================================================
// Credit RWA
// ===========================================================================

#[test]
fn test_irb_corporate_from_json() {
    let input: RwaInput = serde_json::from_str(
        r#"{
            "exposure_class": "corporate",
            "exposure_amount": "1000",
            "approach": "IRB",
            "pd": "0.01",
            "lgd": "0.45",
            "maturity": "2.5"
        }"#,
    )
    .unwrap();
    let r = calculate_rwa(&input).unwrap().result;
    assert_eq!(r.approach, CreditApproach::InternalRatings);
    assert_eq!(r.risk_weight, dec!(0.9232));
    assert_eq!(r.rwa, dec!(923.17));
    assert_eq!(r.capital_requirement, dec!(73.85));
    assert!(r.irb_parameters.is_some());
}

#[test]
fn test_sa_mortgage_defaults_to_standardised() {
    let input: RwaInput =
        serde_json::from_str(r#"{"exposure_class": "mortgage", "exposure_amount": "1000"}"#)
            .unwrap();
    let r = calculate_rwa(&input).unwrap().result;
    assert_eq!(r.approach, CreditApproach::Standardised);
    assert_eq!(r.risk_weight, dec!(0.35));
    assert_eq!(r.rwa, dec!(350));
    assert_eq!(r.capital_requirement, dec!(28));
    assert_eq!(r.irb_parameters, None);
}

#[test]
fn test_irb_without_pd_names_missing_field() {
    let input = RwaInput {
        exposure_class: ExposureClass::Corporate,
        exposure_amount: dec!(1000),
        approach: CreditApproach::InternalRatings,
        pd: None,
        lgd: Some(dec!(0.45)),
        maturity: Some(dec!(2.5)),
        risk_weight_override: None,
    };
    match calculate_rwa(&input) {
        Err(RegCapError::MissingParameter { field, .. }) => assert_eq!(field, "pd"),
        other => panic!("expected MissingParameter, got {:?}", other),
    }
}

// ===========================================================================
// MREL
// ===========================================================================

#[test]
fn test_mrel_cet1_only_fails_rwa_and_lem() {
    let input: MrelInput = serde_json::from_str(
        r#"{"cet1_capital": "100", "total_rwa": "1000", "leverage_exposure": "3000"}"#,
    )
    .unwrap();
    assert_eq!(input.mrel_requirement_rwa, dec!(0.18));

    let out = calculate_mrel(&input).unwrap();
    let r = &out.result;
    assert_eq!(r.mrel_ratio_rwa, dec!(0.1));
    assert_eq!(r.mrel_ratio_lem, dec!(0.0333));
    assert_eq!(r.subordination_ratio, dec!(0.1));
    assert!(!r.compliant_rwa);
    assert!(!r.compliant_lem);
    assert!(r.compliant_subordination);
    assert!(!r.overall_compliant);
    assert_eq!(r.buffer_rwa, dec!(-0.08));
    assert_eq!(out.warnings.len(), 2);
}

#[test]
fn test_mrel_senior_non_preferred_not_subordinated() {
    let input = MrelInput {
        cet1_capital: dec!(60),
        at1_capital: Decimal::ZERO,
        tier2_capital: Decimal::ZERO,
        senior_non_preferred: dec!(140),
        other_eligible: Decimal::ZERO,
        total_rwa: dec!(1000),
        leverage_exposure: dec!(2000),
        mrel_requirement_rwa: dec!(0.18),
        mrel_requirement_lem: dec!(0.0675),
        subordination_requirement: dec!(0.08),
    };
    let r = calculate_mrel(&input).unwrap().result;
    assert_eq!(r.total_mrel, dec!(200));
    assert_eq!(r.subordinated_amount, dec!(60));
    assert!(r.compliant_rwa);
    assert!(r.compliant_lem);
    assert!(!r.compliant_subordination);
    assert!(!r.overall_compliant);
    assert_eq!(calculate_mrel(&input).unwrap(), calculate_mrel(&input).unwrap());
}

// ===========================================================================
// Idempotence
// ===========================================================================

#[test]
fn test_repeat_calls_are_identical() {
    let leverage = LeverageInput {
        tier1_capital: dec!(7),
        on_balance_exposures: dec!(300),
        derivative_exposures: dec!(12.5),
        sft_exposures: Decimal::ZERO,
        off_balance_items: dec!(40),
        ccf_off_balance: dec!(0.2),
    };
    assert_eq!(
        calculate_leverage_ratio(&leverage).unwrap(),
        calculate_leverage_ratio(&leverage).unwrap()
    );

    let rwa = RwaInput {
        exposure_class: ExposureClass::Retail,
        exposure_amount: dec!(250),
        approach: CreditApproach::InternalRatings,
        pd: Some(dec!(0.02)),
        lgd: Some(dec!(0.45)),
        maturity: Some(dec!(1)),
        risk_weight_override: None,
    };
    let first = serde_json::to_string(&calculate_rwa(&rwa).unwrap()).unwrap();
    let second = serde_json::to_string(&calculate_rwa(&rwa).unwrap()).unwrap();
    assert_eq!(first, second);
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_leverage_compliance_matches_ratio(
        tier1 in 1u32..=1_000,
        on_balance in 1u32..=100_000,
    ) {
        let input = LeverageInput {
            tier1_capital: Decimal::from(tier1),
            on_balance_exposures: Decimal::from(on_balance),
            derivative_exposures: Decimal::ZERO,
            sft_exposures: Decimal::ZERO,
            off_balance_items: Decimal::ZERO,
            ccf_off_balance: Decimal::ONE,
        };
        let r = calculate_leverage_ratio(&input).unwrap().result;
        let exact = Decimal::from(tier1) / Decimal::from(on_balance);
        prop_assert_eq!(r.compliant, exact >= dec!(0.03));
    }

    #[test]
    fn prop_irb_risk_weight_bounded(
        pd_bp in 3u32..=9_900,
        lgd_bp in 100u32..=10_000,
        maturity in 1u32..=5,
        retail in any::<bool>(),
    ) {
        let class = if retail { ExposureClass::Retail } else { ExposureClass::Corporate };
        let params = regcap_core::capital::irb_risk_weight(
            Decimal::new(pd_bp as i64, 4),
            Decimal::new(lgd_bp as i64, 4),
            Decimal::from(maturity),
            class,
        )
        .unwrap();
        prop_assert!(params.risk_weight >= Decimal::ZERO);
        prop_assert!(params.risk_weight <= dec!(12.5));
        prop_assert!(params.correlation >= dec!(0.03) && params.correlation <= dec!(0.24));
    }
}
