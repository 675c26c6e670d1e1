#![cfg(feature = "securitization")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use regcap_core::securitization::supervisory_formula::{kssfa, tranche_risk_weight};
use regcap_core::securitization::tranche::OptimalApproach;
use regcap_core::securitization::{
    calculate_securitization, compare_securitization_approaches, p_parameter,
    SecuritizationApproach, SecuritizationInput,
};
use regcap_core::RegCapError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn mezzanine(approach: SecuritizationApproach) -> SecuritizationInput {
    SecuritizationInput {
        kirb: dec!(0.08),
        ksa: Some(dec!(0.10)),
        lgd: dec!(0.40),
        maturity: dec!(4),
        attachment: dec!(0.15),
        detachment: dec!(0.30),
        approach,
        is_sts: false,
        pool_size: Some(dec!(10_000)),
    }
}

/// Fraction from basis points.
fn bp(n: u32) -> Decimal {
    Decimal::new(n as i64, 4)
}

// ===========================================================================
// Worked examples
// ===========================================================================

#[test]
fn test_irba_mezzanine_tranche() {
    let out = calculate_securitization(&mezzanine(SecuritizationApproach::SecIrba)).unwrap();
    let r = &out.result;
    // p = 3.56*0.08 - 1.85*0.0064 + 0.55*0.4 + 0.07*4
    assert_eq!(r.p_parameter, dec!(0.7730));
    // 12.5 * KSSFA / 0.15 = 10.0959...
    assert_eq!(r.risk_weight, dec!(10.0959));
    assert_eq!(r.risk_weight_percent, "1009.59%");
    // tranche 1,500 x 10.0959...
    assert_eq!(r.rwa, Some(dec!(15143.89)));
    assert_eq!(r.inputs.kirb, dec!(0.08));
    assert_eq!(out.methodology, "Securitisation supervisory formula (CRR Art. 259-262)");
}

#[test]
fn test_sec_sa_uses_ksa() {
    let out = calculate_securitization(&mezzanine(SecuritizationApproach::SecSa)).unwrap();
    assert_eq!(out.result.k_value, dec!(0.10));
    assert_eq!(out.result.p_parameter, dec!(0.5));
    assert!(out.warnings.iter().all(|w| !w.contains("KIRB used")));
}

#[test]
fn test_straddling_tranche_risk_weight() {
    let p = p_parameter(dec!(0.04), dec!(0.40), dec!(4), SecuritizationApproach::SecIrba);
    assert_eq!(p, dec!(0.63944));
    let rw = tranche_risk_weight(dec!(0.04), dec!(0.03), dec!(0.50), p, false);
    assert_eq!(rw.risk_weight.round_dp(6), dec!(1.478816));
}

#[test]
fn test_comparison_reports_both_sides() {
    let out = compare_securitization_approaches(&mezzanine(SecuritizationApproach::SecIrba))
        .unwrap();
    let r = &out.result;
    assert_eq!(r.sec_irba.approach, SecuritizationApproach::SecIrba);
    assert_eq!(r.sec_sa.approach, SecuritizationApproach::SecSa);
    assert_eq!(r.sec_sa.k_value, dec!(0.10));
    assert!(r.rw_difference >= Decimal::ZERO);
    assert!(r.capital_savings.is_some());
    let expected = if r.sec_irba.risk_weight < r.sec_sa.risk_weight {
        OptimalApproach::SecIrba
    } else {
        OptimalApproach::SecSa
    };
    assert_eq!(r.optimal_approach, expected);
    let again = compare_securitization_approaches(&mezzanine(SecuritizationApproach::SecIrba))
        .unwrap();
    assert_eq!(again, out);
}

#[test]
fn test_invalid_tranche_rejected_before_calculation() {
    let mut input = mezzanine(SecuritizationApproach::SecIrba);
    input.detachment = dec!(0.15);
    match calculate_securitization(&input) {
        Err(RegCapError::InvalidInput { field, .. }) => assert_eq!(field, "attachment"),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_output_serializes_deterministically() {
    let input = mezzanine(SecuritizationApproach::SecIrba);
    let a = serde_json::to_string(&calculate_securitization(&input).unwrap()).unwrap();
    let b = serde_json::to_string(&calculate_securitization(&input).unwrap()).unwrap();
    assert_eq!(a, b);
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_risk_weight_within_floor_and_cap(
        kirb in 10u32..=5000,
        lgd in 500u32..=9500,
        maturity in 1u32..=10,
        attachment in 0u32..10_000,
        detachment in 1u32..=10_000,
        is_sts in any::<bool>(),
        sa in any::<bool>(),
    ) {
        prop_assume!(attachment < detachment);
        let input = SecuritizationInput {
            kirb: bp(kirb),
            ksa: None,
            lgd: bp(lgd),
            maturity: Decimal::from(maturity),
            attachment: bp(attachment),
            detachment: bp(detachment),
            approach: if sa { SecuritizationApproach::SecSa } else { SecuritizationApproach::SecIrba },
            is_sts,
            pool_size: None,
        };
        let rw = calculate_securitization(&input).unwrap().result.risk_weight;
        let floor = if is_sts { dec!(0.10) } else { dec!(0.15) };
        prop_assert!(rw >= floor, "rw {} below floor {}", rw, floor);
        prop_assert!(rw <= dec!(12.5), "rw {} above cap", rw);
    }

    #[test]
    fn prop_detachment_below_k_is_1250(
        kirb in 10u32..=5000,
        detachment_pct in 1u32..=100,
        attachment_pct in 0u32..100,
        is_sts in any::<bool>(),
    ) {
        let k = bp(kirb);
        let detachment = k * Decimal::new(detachment_pct as i64, 2);
        let attachment = detachment * Decimal::new(attachment_pct as i64, 2);
        let rw = tranche_risk_weight(k, attachment, detachment, dec!(0.5), is_sts);
        prop_assert_eq!(rw.risk_weight, dec!(12.5));
    }

    #[test]
    fn prop_kssfa_non_increasing_in_attachment(
        k in 10u32..=5000,
        p in 3000u32..=30_000,
        detachment in 200u32..=10_000,
        lower_pct in 0u32..100,
        step_pct in 0u32..=100,
    ) {
        // both intervals stay at least 100bp wide, clear of the near-degenerate guard
        let room = detachment - 100;
        let lower = room * lower_pct / 100;
        let higher = lower + (room - lower) * step_pct / 100;
        let (k, p) = (bp(k), bp(p));
        let wide = kssfa(k, bp(lower), bp(detachment), p);
        let narrow = kssfa(k, bp(higher), bp(detachment), p);
        prop_assert!(wide >= Decimal::ZERO && wide <= Decimal::ONE);
        prop_assert!(
            wide + Decimal::new(1, 18) >= narrow,
            "KSSFA({}) = {} < KSSFA({}) = {}", lower, wide, higher, narrow
        );
    }

    #[test]
    fn prop_kssfa_non_decreasing_in_width(
        k in 10u32..=5000,
        p in 3000u32..=30_000,
        detachment in 200u32..=10_000,
        narrow_pct in 0u32..=100,
        extra_pct in 0u32..=100,
    ) {
        // widths measured down from a fixed detachment, at least 100bp each
        let span = detachment - 100;
        let narrow_width = 100 + span * narrow_pct / 100;
        let wide_width = narrow_width + (detachment - narrow_width) * extra_pct / 100;
        let (k, p, d) = (bp(k), bp(p), bp(detachment));
        let narrow = kssfa(k, d - bp(narrow_width), d, p);
        let wide = kssfa(k, d - bp(wide_width), d, p);
        prop_assert!(
            wide + Decimal::new(1, 18) >= narrow,
            "width {}: {} < width {}: {}", wide_width, wide, narrow_width, narrow
        );
    }
}
