//! Prescribed IRRBB interest-rate shock scenarios (BCBS 368) over twelve
//! repricing buckets.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BUCKET_COUNT: usize = 12;

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Repricing time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TenorBucket {
    Overnight,
    M1,
    M3,
    M6,
    Y1,
    Y2,
    Y3,
    Y5,
    Y7,
    Y10,
    Y15,
    Y20Plus,
}

impl TenorBucket {
    pub const ALL: [TenorBucket; BUCKET_COUNT] = [
        TenorBucket::Overnight,
        TenorBucket::M1,
        TenorBucket::M3,
        TenorBucket::M6,
        TenorBucket::Y1,
        TenorBucket::Y2,
        TenorBucket::Y3,
        TenorBucket::Y5,
        TenorBucket::Y7,
        TenorBucket::Y10,
        TenorBucket::Y15,
        TenorBucket::Y20Plus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TenorBucket::Overnight => "ON",
            TenorBucket::M1 => "1M",
            TenorBucket::M3 => "3M",
            TenorBucket::M6 => "6M",
            TenorBucket::Y1 => "1Y",
            TenorBucket::Y2 => "2Y",
            TenorBucket::Y3 => "3Y",
            TenorBucket::Y5 => "5Y",
            TenorBucket::Y7 => "7Y",
            TenorBucket::Y10 => "10Y",
            TenorBucket::Y15 => "15Y",
            TenorBucket::Y20Plus => "20Y+",
        }
    }

    /// Approximate modified duration of a position in this bucket.
    pub fn duration(&self) -> Decimal {
        match self {
            TenorBucket::Overnight => dec!(0.003),
            TenorBucket::M1 => dec!(0.08),
            TenorBucket::M3 => dec!(0.25),
            TenorBucket::M6 => dec!(0.5),
            TenorBucket::Y1 => dec!(1),
            TenorBucket::Y2 => dec!(2),
            TenorBucket::Y3 => dec!(3),
            TenorBucket::Y5 => dec!(5),
            TenorBucket::Y7 => dec!(7),
            TenorBucket::Y10 => dec!(10),
            TenorBucket::Y15 => dec!(15),
            TenorBucket::Y20Plus => dec!(20),
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

const PARALLEL_UP: [i32; BUCKET_COUNT] = [200; BUCKET_COUNT];
const PARALLEL_DOWN: [i32; BUCKET_COUNT] = [-200; BUCKET_COUNT];
const STEEPENER: [i32; BUCKET_COUNT] = [-100, -90, -80, -60, -40, 0, 20, 40, 60, 80, 100, 100];
const FLATTENER: [i32; BUCKET_COUNT] = [100, 90, 80, 60, 40, 0, -20, -40, -60, -80, -100, -100];
const SHORT_UP: [i32; BUCKET_COUNT] = [200, 180, 150, 100, 60, 30, 10, 0, 0, 0, 0, 0];
const SHORT_DOWN: [i32; BUCKET_COUNT] = [-200, -180, -150, -100, -60, -30, -10, 0, 0, 0, 0, 0];

/// Supervisory shock scenario. Declaration order is the evaluation and
/// reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShockScenario {
    ParallelUp,
    ParallelDown,
    Steepener,
    Flattener,
    ShortRatesUp,
    ShortRatesDown,
}

impl ShockScenario {
    pub const ALL: [ShockScenario; 6] = [
        ShockScenario::ParallelUp,
        ShockScenario::ParallelDown,
        ShockScenario::Steepener,
        ShockScenario::Flattener,
        ShockScenario::ShortRatesUp,
        ShockScenario::ShortRatesDown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShockScenario::ParallelUp => "Parallel Up",
            ShockScenario::ParallelDown => "Parallel Down",
            ShockScenario::Steepener => "Steepener",
            ShockScenario::Flattener => "Flattener",
            ShockScenario::ShortRatesUp => "Short Rates Up",
            ShockScenario::ShortRatesDown => "Short Rates Down",
        }
    }

    fn table(&self) -> &'static [i32; BUCKET_COUNT] {
        match self {
            ShockScenario::ParallelUp => &PARALLEL_UP,
            ShockScenario::ParallelDown => &PARALLEL_DOWN,
            ShockScenario::Steepener => &STEEPENER,
            ShockScenario::Flattener => &FLATTENER,
            ShockScenario::ShortRatesUp => &SHORT_UP,
            ShockScenario::ShortRatesDown => &SHORT_DOWN,
        }
    }

    /// Rate shock for a bucket, in basis points.
    pub fn shock_bps(&self, bucket: TenorBucket) -> i32 {
        self.table()[bucket.index()]
    }
}

impl fmt::Display for ShockScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_order_matches_index() {
        for (i, bucket) in TenorBucket::ALL.iter().enumerate() {
            assert_eq!(bucket.index(), i);
        }
        assert_eq!(TenorBucket::Y20Plus.label(), "20Y+");
    }

    #[test]
    fn test_flattener_mirrors_steepener() {
        for bucket in TenorBucket::ALL {
            assert_eq!(
                ShockScenario::Flattener.shock_bps(bucket),
                -ShockScenario::Steepener.shock_bps(bucket)
            );
            assert_eq!(
                ShockScenario::ShortRatesDown.shock_bps(bucket),
                -ShockScenario::ShortRatesUp.shock_bps(bucket)
            );
        }
    }

    #[test]
    fn test_short_rate_shock_fades_out() {
        assert_eq!(ShockScenario::ShortRatesUp.shock_bps(TenorBucket::Overnight), 200);
        assert_eq!(ShockScenario::ShortRatesUp.shock_bps(TenorBucket::Y3), 10);
        assert_eq!(ShockScenario::ShortRatesUp.shock_bps(TenorBucket::Y5), 0);
    }

    #[test]
    fn test_durations_increase() {
        let durations: Vec<Decimal> = TenorBucket::ALL.iter().map(|b| b.duration()).collect();
        assert!(durations.windows(2).all(|w| w[0] < w[1]));
    }
}
