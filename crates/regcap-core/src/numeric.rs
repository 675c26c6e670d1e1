//! Numeric primitives shared by every calculator.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`. The transcendental
//! functions are implemented here rather than delegated so that overflow is
//! an explicit, checked outcome and results are bit-reproducible.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const LN_2: Decimal = dec!(0.6931471805599453094172321215);
/// ln(sqrt(2 * pi))
const LN_SQRT_2PI: Decimal = dec!(0.9189385332046727417803297364);
const SQRT_2PI: Decimal = dec!(2.506628274631000502415765285);

/// e^n for n = 0..=60, correctly rounded to 28 significant digits.
const EXP_INTEGER: [Decimal; 61] = [
    dec!(1),
    dec!(2.718281828459045235360287471),
    dec!(7.389056098930650227230427461),
    dec!(20.08553692318766774092852965),
    dec!(54.59815003314423907811026120),
    dec!(148.4131591025766034211155800),
    dec!(403.4287934927351226083871805),
    dec!(1096.633158428458599263720238),
    dec!(2980.957987041728274743592099),
    dec!(8103.083927575384007709996689),
    dec!(22026.46579480671651695790065),
    dec!(59874.14171519781845532648579),
    dec!(162754.7914190039208080052049),
    dec!(442413.3920089205033261027759),
    dec!(1202604.284164776777749236771),
    dec!(3269017.372472110639301855046),
    dec!(8886110.520507872636763023741),
    dec!(24154952.75357529821477543518),
    dec!(65659969.13733051113878650326),
    dec!(178482300.9631872608449100338),
    dec!(485165195.4097902779691068305),
    dec!(1318815734.483214697209998884),
    dec!(3584912846.131591561681159946),
    dec!(9744803446.248902600034632685),
    dec!(26489122129.84347229413916215),
    dec!(72004899337.38587252416135147),
    dec!(195729609428.8387642697763979),
    dec!(532048240601.7986166837473043),
    dec!(1446257064291.475173677047423),
    dec!(3931334297144.042074388620581),
    dec!(10686474581524.46214699046865),
    dec!(29048849665247.42523108568211),
    dec!(78962960182680.69516097802264),
    dec!(214643579785916.0646242977615),
    dec!(583461742527454.8814029027346),
    dec!(1586013452313430.728129644626),
    dec!(4311231547115195.227113422293),
    dec!(11719142372802611.30877293979),
    dec!(31855931757113756.22032867170),
    dec!(86593400423993746.95360693272),
    dec!(235385266837019985.4078999107),
    dec!(639843493530054949.2226634035),
    dec!(1739274941520501047.394681304),
    dec!(4727839468229346561.474457563),
    dec!(12851600114359308275.80929963),
    dec!(34934271057485095348.03479723),
    dec!(94961194206024488745.13364912),
    dec!(258131288619006739623.2858002),
    dec!(701673591209763173865.4715999),
    dec!(1907346572495099690525.099841),
    dec!(5184705528587072464087.453323),
    dec!(14093490824269387964492.14331),
    dec!(38310080007165768493035.69549),
    dec!(104137594330290877971834.7293),
    dec!(283075330327469390044206.3548),
    dec!(769478526514201713818274.5590),
    dec!(2091659496012996153907071.157),
    dec!(5685719999335932222640348.821),
    dec!(15455389355901039303530766.91),
    dec!(42012104037905142549565934.31),
    dec!(114200738981568428366295718.3),
];

/// Exponents below this evaluate to exactly zero.
pub const EXP_UNDERFLOW: Decimal = dec!(-60);
/// Exponents above this cannot be represented and are reported as overflow.
pub const EXP_OVERFLOW: Decimal = dec!(60);

/// Percentage string used for ratios with a non-positive denominator.
pub const UNBOUNDED_PERCENT: &str = "inf%";

/// Beyond |x| > 10 the normal CDF is 0 or 1 to well below Decimal resolution
/// for our purposes.
const CDF_TAIL_CUTOFF: Decimal = dec!(10);

// Acklam's rational approximation for the normal quantile.
const ACKLAM_A: [Decimal; 6] = [
    dec!(-39.69683028665376),
    dec!(220.9460984245205),
    dec!(-275.9285104469687),
    dec!(138.3577518672690),
    dec!(-30.66479806614716),
    dec!(2.506628277459239),
];
const ACKLAM_B: [Decimal; 6] = [
    dec!(-54.47609879822406),
    dec!(161.5858368580409),
    dec!(-155.6989798598866),
    dec!(66.80131188771972),
    dec!(-13.28068155288572),
    dec!(1),
];
const ACKLAM_C: [Decimal; 6] = [
    dec!(-0.007784894002430293),
    dec!(-0.3223964580411365),
    dec!(-2.400758277161838),
    dec!(-2.549732539343734),
    dec!(4.374664141464968),
    dec!(2.938163982698783),
];
const ACKLAM_D: [Decimal; 5] = [
    dec!(0.007784695709041462),
    dec!(0.3224671290700398),
    dec!(2.445134137142996),
    dec!(3.754408661907416),
    dec!(1),
];
const ACKLAM_P_LOW: Decimal = dec!(0.02425);

// ---------------------------------------------------------------------------
// Elementary functions
// ---------------------------------------------------------------------------

/// Saturating exponential.
///
/// Returns `Some(0)` for exponents below [`EXP_UNDERFLOW`] and `None` for
/// exponents above [`EXP_OVERFLOW`]. Callers map `None` to their own
/// documented fallback value.
pub fn exp_guarded(x: Decimal) -> Option<Decimal> {
    if x < EXP_UNDERFLOW {
        return Some(Decimal::ZERO);
    }
    if x > EXP_OVERFLOW {
        return None;
    }
    if x.is_sign_negative() {
        return Some(Decimal::ONE / exp_non_negative(-x));
    }
    Some(exp_non_negative(x))
}

/// e^(-x) for x >= 0. Never overflows; saturates to zero.
pub fn exp_decay(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ONE;
    }
    if -x < EXP_UNDERFLOW {
        return Decimal::ZERO;
    }
    Decimal::ONE / exp_non_negative(x)
}

/// e^x for 0 <= x <= EXP_OVERFLOW, split as e^trunc(x) * e^frac(x) with the
/// integer part read from a table.
fn exp_non_negative(x: Decimal) -> Decimal {
    let whole = x.trunc();
    let frac = x - whole;

    // Taylor series on [0, 1)
    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for k in 1u32..40 {
        term = term * frac / Decimal::from(k);
        if term.is_zero() {
            break;
        }
        sum += term;
    }

    // whole is within 0..=60 by the callers' range checks
    let index = whole.to_usize().unwrap_or(EXP_INTEGER.len() - 1);
    EXP_INTEGER[index.min(EXP_INTEGER.len() - 1)] * sum
}

/// Product of all factors; `None` when an intermediate leaves the Decimal range.
pub fn checked_product(factors: &[Decimal]) -> Option<Decimal> {
    factors
        .iter()
        .try_fold(Decimal::ONE, |acc, factor| acc.checked_mul(*factor))
}

/// Sum of all terms; `None` on overflow.
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(terms: I) -> Option<Decimal> {
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, term| acc.checked_add(term))
}

/// Natural logarithm; `None` for x <= 0.
pub fn ln(x: Decimal) -> Option<Decimal> {
    if x <= Decimal::ZERO {
        return None;
    }

    // Reduce to m in [1, 2] with x = m * 2^k
    let two = dec!(2);
    let mut m = x;
    let mut k: i64 = 0;
    while m > two {
        m /= two;
        k += 1;
    }
    while m < Decimal::ONE {
        m *= two;
        k -= 1;
    }

    // ln(m) = 2 * atanh(z), z = (m - 1) / (m + 1), |z| <= 1/3
    let z = (m - Decimal::ONE) / (m + Decimal::ONE);
    let z2 = z * z;
    let mut power = z;
    let mut sum = z;
    for n in 1u32..80 {
        power *= z2;
        if power.is_zero() {
            break;
        }
        sum += power / Decimal::from(2 * n + 1);
    }

    Some(two * sum + Decimal::from(k) * LN_2)
}

/// Square root, zero for non-positive input.
pub fn sqrt(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    x.sqrt().unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Normal distribution
// ---------------------------------------------------------------------------

/// Standard normal density.
pub fn norm_pdf(x: Decimal) -> Decimal {
    exp_guarded(-(x * x) / dec!(2) - LN_SQRT_2PI).unwrap_or(Decimal::ZERO)
}

/// Standard normal CDF via Marsaglia's series
/// Φ(x) = 1/2 + φ(x) · Σ x^(2n+1) / (2n+1)!!
///
/// The 28-digit Decimal mantissa absorbs the cancellation in the lower tail,
/// giving absolute accuracy far below 1e-15 on [-10, 10].
pub fn norm_cdf(x: Decimal) -> Decimal {
    if x < -CDF_TAIL_CUTOFF {
        return Decimal::ZERO;
    }
    if x > CDF_TAIL_CUTOFF {
        return Decimal::ONE;
    }

    let q = x * x;
    let mut term = x;
    let mut sum = x;
    let mut odd = Decimal::ONE;
    for _ in 0..600 {
        odd += dec!(2);
        term = term * q / odd;
        let next = sum + term;
        if next == sum {
            break;
        }
        sum = next;
    }

    clamp(dec!(0.5) + sum * norm_pdf(x), Decimal::ZERO, Decimal::ONE)
}

/// Standard normal quantile Φ⁻¹(p) for p in (0, 1); `None` outside.
///
/// Acklam's rational approximation (relative error < 1.15e-9) followed by
/// one Halley refinement against [`norm_cdf`], which brings the error below
/// 1e-12 on (1e-10, 1 - 1e-10).
pub fn norm_inv(p: Decimal) -> Option<Decimal> {
    if p <= Decimal::ZERO || p >= Decimal::ONE {
        return None;
    }

    let x0 = acklam(p)?;

    let err = norm_cdf(x0) - p;
    match exp_guarded(x0 * x0 / dec!(2)) {
        Some(growth) => {
            let u = err * SQRT_2PI * growth;
            Some(x0 - u / (Decimal::ONE + x0 * u / dec!(2)))
        }
        None => Some(x0),
    }
}

fn acklam(p: Decimal) -> Option<Decimal> {
    if p < ACKLAM_P_LOW {
        let q = sqrt(dec!(-2) * ln(p)?);
        Some(horner(&ACKLAM_C, q) / horner(&ACKLAM_D, q))
    } else if p <= Decimal::ONE - ACKLAM_P_LOW {
        let q = p - dec!(0.5);
        let r = q * q;
        Some(horner(&ACKLAM_A, r) * q / horner(&ACKLAM_B, r))
    } else {
        let q = sqrt(dec!(-2) * ln(Decimal::ONE - p)?);
        Some(-horner(&ACKLAM_C, q) / horner(&ACKLAM_D, q))
    }
}

fn horner(coeffs: &[Decimal], x: Decimal) -> Decimal {
    coeffs
        .iter()
        .fold(Decimal::ZERO, |acc, &c| acc * x + c)
}

// ---------------------------------------------------------------------------
// Clamp, rounding and formatting policy
// ---------------------------------------------------------------------------

/// Floor then cap.
pub fn clamp(x: Decimal, floor: Decimal, cap: Decimal) -> Decimal {
    x.max(floor).min(cap)
}

/// Ratios are reported to 4 decimals.
pub fn round_ratio(x: Rate) -> Rate {
    normalize_zero(x.round_dp(4))
}

/// Monetary amounts are reported to 2 decimals.
pub fn round_money(x: Money) -> Money {
    normalize_zero(x.round_dp(2))
}

/// "8.00%" style rendering of a fractional ratio.
pub fn format_percent(x: Rate) -> String {
    format_percent_dp(x, 2)
}

/// Percentage rendering with an explicit number of decimals. Ratios too large
/// to scale by 100 render as unbounded.
pub fn format_percent_dp(x: Rate, dp: u32) -> String {
    match x.checked_mul(dec!(100)) {
        Some(scaled) => {
            let pct = normalize_zero(scaled.round_dp(dp));
            format!("{:.*}%", dp as usize, pct)
        }
        None if x.is_sign_negative() => format!("-{}", UNBOUNDED_PERCENT),
        None => UNBOUNDED_PERCENT.to_string(),
    }
}

/// Percentage rendering for ratios that may be unbounded.
pub fn format_percent_or_unbounded(x: Option<Rate>) -> String {
    match x {
        Some(r) => format_percent(r),
        None => UNBOUNDED_PERCENT.to_string(),
    }
}

fn normalize_zero(x: Decimal) -> Decimal {
    if x.is_zero() {
        Decimal::ZERO
    } else {
        x
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_exp_matches_known_values() {
        assert_eq!(exp_guarded(Decimal::ZERO), Some(Decimal::ONE));
        let e1 = exp_guarded(Decimal::ONE).unwrap();
        assert_eq!(e1, dec!(2.718281828459045235360287471));
        let e_neg2 = exp_guarded(dec!(-2)).unwrap();
        assert!(approx_eq(e_neg2, dec!(0.1353352832366126918939994950), Decimal::new(1, 24)));
        let e_half = exp_guarded(dec!(3.5)).unwrap();
        assert!(approx_eq(e_half, dec!(33.11545195869231371137278760), Decimal::new(1, 22)));
    }

    #[test]
    fn test_exp_integer_part_keeps_full_precision() {
        let big = exp_guarded(dec!(59.5)).unwrap();
        assert!(approx_eq(big, dec!(69266249554160951309122631.53), dec!(1)));
        let e7 = exp_guarded(dec!(7)).unwrap();
        assert_eq!(e7, dec!(1096.633158428458599263720238));
        let small = exp_guarded(dec!(-12.25)).unwrap();
        assert!(approx_eq(small, dec!(0.0000047851173921290090896098), Decimal::new(1, 26)));
    }

    #[test]
    fn test_checked_helpers_report_overflow() {
        assert_eq!(checked_product(&[dec!(2.33), dec!(0.1), dec!(10)]), Some(dec!(2.330)));
        assert_eq!(checked_product(&[Decimal::MAX, dec!(2)]), None);
        assert_eq!(checked_sum([dec!(1), dec!(2.5)]), Some(dec!(3.5)));
        assert_eq!(checked_sum([Decimal::MAX, Decimal::MAX]), None);
        assert_eq!(checked_product(&[]), Some(Decimal::ONE));
    }

    #[test]
    fn test_percent_of_huge_ratio_is_unbounded() {
        assert_eq!(format_percent(Decimal::MAX), "inf%");
        assert_eq!(format_percent(Decimal::MIN), "-inf%");
        assert_eq!(format_percent_dp(dec!(0.25), 0), "25%");
    }

    #[test]
    fn test_exp_saturates_below_underflow() {
        assert_eq!(exp_guarded(dec!(-3333)), Some(Decimal::ZERO));
        assert_eq!(exp_decay(dec!(5000)), Decimal::ZERO);
    }

    #[test]
    fn test_exp_reports_overflow() {
        assert_eq!(exp_guarded(dec!(61)), None);
        assert!(exp_guarded(dec!(60)).is_some());
    }

    #[test]
    fn test_exp_decay_agrees_with_guarded() {
        let a = exp_decay(dec!(35) * dec!(0.01));
        let b = exp_guarded(dec!(-0.35)).unwrap();
        assert_eq!(a, b);
        assert_eq!(exp_decay(Decimal::ZERO), Decimal::ONE);
    }

    #[test]
    fn test_ln_known_values() {
        assert_eq!(ln(Decimal::ONE), Some(Decimal::ZERO));
        assert!(approx_eq(ln(dec!(2)).unwrap(), LN_2, Decimal::new(1, 25)));
        assert!(approx_eq(
            ln(dec!(0.01)).unwrap(),
            dec!(-4.605170185988091368035982909),
            Decimal::new(1, 24)
        ));
        assert!(approx_eq(
            ln(dec!(1000)).unwrap(),
            dec!(6.907755278982137052053974364),
            Decimal::new(1, 24)
        ));
    }

    #[test]
    fn test_ln_rejects_non_positive() {
        assert_eq!(ln(Decimal::ZERO), None);
        assert_eq!(ln(dec!(-1)), None);
    }

    #[test]
    fn test_ln_exp_inverse() {
        let x = dec!(1.7);
        let back = ln(exp_guarded(x).unwrap()).unwrap();
        assert!(approx_eq(back, x, Decimal::new(1, 24)));
    }

    #[test]
    fn test_norm_cdf_symmetry_and_center() {
        assert_eq!(norm_cdf(Decimal::ZERO), dec!(0.5));
        let x = dec!(1.3);
        let sum = norm_cdf(x) + norm_cdf(-x);
        assert!(approx_eq(sum, Decimal::ONE, Decimal::new(1, 20)));
    }

    #[test]
    fn test_norm_cdf_known_values() {
        assert!(approx_eq(
            norm_cdf(dec!(1.959963984540054)),
            dec!(0.975),
            Decimal::new(1, 14)
        ));
        assert!(approx_eq(
            norm_cdf(dec!(-2.2)),
            dec!(0.01390344751349859),
            Decimal::new(1, 15)
        ));
        assert_eq!(norm_cdf(dec!(-11)), Decimal::ZERO);
        assert_eq!(norm_cdf(dec!(11)), Decimal::ONE);
    }

    #[test]
    fn test_norm_inv_known_values() {
        assert!(approx_eq(
            norm_inv(dec!(0.999)).unwrap(),
            dec!(3.090232306167813),
            Decimal::new(1, 12)
        ));
        assert!(approx_eq(
            norm_inv(dec!(0.975)).unwrap(),
            dec!(1.959963984540054),
            Decimal::new(1, 12)
        ));
        assert!(approx_eq(
            norm_inv(dec!(0.01)).unwrap(),
            dec!(-2.326347874040841),
            Decimal::new(1, 12)
        ));
        assert!(approx_eq(norm_inv(dec!(0.5)).unwrap(), Decimal::ZERO, Decimal::new(1, 15)));
    }

    #[test]
    fn test_norm_inv_round_trips_through_cdf() {
        for p in [dec!(0.0003), dec!(0.02), dec!(0.3), dec!(0.7), dec!(0.98), dec!(0.9999)] {
            let x = norm_inv(p).unwrap();
            assert!(
                approx_eq(norm_cdf(x), p, Decimal::new(1, 13)),
                "round trip failed for p = {}",
                p
            );
        }
    }

    #[test]
    fn test_norm_inv_domain() {
        assert_eq!(norm_inv(Decimal::ZERO), None);
        assert_eq!(norm_inv(Decimal::ONE), None);
        assert_eq!(norm_inv(dec!(1.2)), None);
    }

    #[test]
    fn test_clamp_floor_then_cap() {
        assert_eq!(clamp(dec!(-1), Decimal::ZERO, Decimal::ONE), Decimal::ZERO);
        assert_eq!(clamp(dec!(2), Decimal::ZERO, Decimal::ONE), Decimal::ONE);
        assert_eq!(clamp(dec!(0.4), Decimal::ZERO, Decimal::ONE), dec!(0.4));
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(0.08)), "8.00%");
        assert_eq!(format_percent(dec!(1.461538)), "146.15%");
        assert_eq!(format_percent(dec!(-0.04)), "-4.00%");
        assert_eq!(format_percent(dec!(-0.000001)), "0.00%");
        assert_eq!(format_percent_dp(dec!(0.25), 0), "25%");
        assert_eq!(format_percent_or_unbounded(None), "inf%");
    }

    #[test]
    fn test_rounding_policy() {
        assert_eq!(round_ratio(dec!(1.461538461)), dec!(1.4615));
        assert_eq!(round_money(dec!(949.999)), dec!(950.00));
    }
}
