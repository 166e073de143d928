//! Luck percentiles
//!
//! For the dice that have landed, count every equally likely combination of
//! faces and report the share whose sum is at or below the rolled total.
//! Counts grow as the product of face counts, so they are kept as `BigUint`.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::dice::DieType;
use crate::sim::Outcome;

/// Number of face combinations reaching each sum (index = sum)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    counts: Vec<BigUint>,
}

impl Default for Distribution {
    fn default() -> Self {
        Self::identity()
    }
}

impl Distribution {
    /// No dice: one way to reach a sum of zero
    pub fn identity() -> Self {
        Self {
            counts: vec![BigUint::from(1u32)],
        }
    }

    /// Convolve with one fair die of `faces` sides.
    ///
    /// `new[s] = old[s-1] + … + old[s-faces]`, kept as a sliding window so each
    /// bucket costs one addition and one subtraction whatever the face count.
    pub fn add_die(&mut self, faces: u32) {
        let faces = faces as usize;
        let old = std::mem::take(&mut self.counts);
        let mut next = Vec::with_capacity(old.len() + faces);
        next.push(BigUint::zero());
        let mut window = BigUint::zero();
        for s in 1..old.len() + faces {
            if let Some(entering) = old.get(s - 1) {
                window += entering;
            }
            if s > faces {
                if let Some(leaving) = old.get(s - 1 - faces) {
                    window -= leaving;
                }
            }
            next.push(window.clone());
        }
        self.counts = next;
    }

    pub fn max_sum(&self) -> usize {
        self.counts.len().saturating_sub(1)
    }

    pub fn count(&self, sum: usize) -> BigUint {
        self.counts.get(sum).cloned().unwrap_or_default()
    }

    pub fn total(&self) -> BigUint {
        self.counts.iter().sum()
    }

    /// Combinations whose sum is at most `sum`
    pub fn at_most(&self, sum: i64) -> BigUint {
        if sum < 0 {
            return BigUint::zero();
        }
        let end = (sum as usize).saturating_add(1).min(self.counts.len());
        self.counts[..end].iter().sum()
    }

    /// Percent of combinations at or below `observed`, truncated to 2 decimals
    pub fn percentile(&self, observed: i64) -> f64 {
        let total = self.total();
        if total.is_zero() {
            return 0.0;
        }
        let basis_points = self.at_most(observed) * 10_000u32 / total;
        basis_points.to_f64().unwrap_or(0.0) / 100.0
    }
}

/// Exact distribution of the sum of `types`
pub fn distribution(types: &[DieType]) -> Distribution {
    let mut dist = Distribution::identity();
    for t in types {
        dist.add_die(t.face_count());
    }
    dist
}

/// The last distribution built, keyed by the landed types it covers
#[derive(Debug, Clone, Default)]
pub struct LuckMemo {
    types: Vec<DieType>,
    distribution: Distribution,
}

impl LuckMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(&self) -> &[DieType] {
        &self.types
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Bring the memo up to `sorted` (landed types sorted by name).
    ///
    /// When every memoised type is still present the old distribution is
    /// extended with just the newcomers; otherwise it is rebuilt.
    fn update(&mut self, sorted: &[DieType]) {
        let mut matched = 0;
        let mut fresh = Vec::new();
        for &t in sorted {
            if self.types.get(matched) == Some(&t) {
                matched += 1;
            } else {
                fresh.push(t);
            }
        }

        if matched == self.types.len() {
            for t in &fresh {
                self.distribution.add_die(t.face_count());
            }
        } else {
            log::debug!(
                "Luck memo invalidated ({} -> {} dice)",
                self.types.len(),
                sorted.len()
            );
            self.distribution = distribution(sorted);
        }
        self.types = sorted.to_vec();
    }
}

/// Percentile of `observed_total` among all outcomes of the landed dice
/// passing `filter`, or `None` when none of them has landed.
pub fn compute_percentile(
    landed: &[Outcome],
    observed_total: i64,
    filter: impl Fn(DieType) -> bool,
    memo: &mut LuckMemo,
) -> Option<f64> {
    let mut types: Vec<DieType> = landed
        .iter()
        .map(|o| o.kind)
        .filter(|&k| filter(k))
        .collect();
    if types.is_empty() {
        return None;
    }
    types.sort_by_key(|t| t.name());
    memo.update(&types);
    Some(memo.distribution.percentile(observed_total))
}

/// Totals and luck for one published result vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LuckReport {
    /// Sum of every landed die except d20s
    pub total: i64,
    /// Sum of landed d20s, tracked separately
    pub d20_total: i64,
    /// Flat modifier from the request
    pub modifier: i64,
    /// `total + modifier`
    pub final_total: i64,
    /// Percentile of `total` among the landed non-d20 dice
    pub beats: Option<f64>,
    /// Percentile of `d20_total` among the landed d20s
    pub d20_beats: Option<f64>,
    pub landed: usize,
    pub pending: usize,
}

/// Two independent luck series: the d20 pool and everything else
#[derive(Debug, Clone, Default)]
pub struct LuckTracker {
    others: LuckMemo,
    d20: LuckMemo,
}

impl LuckTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.others.reset();
        self.d20.reset();
    }

    /// Memo for everything except d20s
    pub fn others(&self) -> &LuckMemo {
        &self.others
    }

    pub fn d20(&self) -> &LuckMemo {
        &self.d20
    }

    pub fn update(&mut self, results: &[Option<Outcome>], modifier: i64) -> LuckReport {
        let landed: Vec<Outcome> = results.iter().flatten().copied().collect();
        let sum = |pick: &dyn Fn(DieType) -> bool| -> i64 {
            landed
                .iter()
                .filter(|o| pick(o.kind))
                .map(|o| i64::from(o.value))
                .sum()
        };
        let is_d20 = |k: DieType| k == DieType::D20;
        let not_d20 = |k: DieType| k != DieType::D20;

        let total = sum(&not_d20);
        let d20_total = sum(&is_d20);
        LuckReport {
            total,
            d20_total,
            modifier,
            final_total: total + modifier,
            beats: compute_percentile(&landed, total, not_d20, &mut self.others),
            d20_beats: compute_percentile(&landed, d20_total, is_d20, &mut self.d20),
            landed: landed.len(),
            pending: results.len() - landed.len(),
        }
    }
}
