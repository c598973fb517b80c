use crate::helpe::*;

pub const MEMORY_UTILIZATION: &str = "Memory Utilization";
pub const INTERNAL_FRAG: &str = "Internal Fragmentation";
pub const THROUGHPUT: &str = "Throughput";
pub const JOBS_PLACED: &str = "Jobs Placed";
pub const MOST_USED_BLOCK: &str = "Most Used Block";
pub const LEAST_USED_BLOCK: &str = "Least Used Block";
pub const USAGE_THRESHOLD: &str = "Usage Threshold";
pub const HEAVILY_USED: &str = "Heavily Used Blocks";
pub const LIGHTLY_USED: &str = "Lightly Used Blocks";
pub const NEVER_USED: &str = "Never Used Blocks";

/// How often each block has been picked, bucketed.
///
/// Blocks that were never used are kept apart. The rest are split by an
/// *adaptive* threshold: the mean placement count over used blocks,
/// rounded, and never below 1. Reaching the threshold makes a block
/// "heavily used".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageDistribution {
    pub never_used:     Vec<BlockId>,
    pub lightly_used:   Vec<BlockId>,
    pub heavily_used:   Vec<BlockId>,
    pub threshold:      u32,
    /// `(block, count)` with the highest count. Lowest id wins ties.
    pub most_used:      Option<(BlockId, u32)>,
    /// `(block, count)` with the lowest *nonzero* count. Lowest id
    /// wins ties.
    pub least_used:     Option<(BlockId, u32)>,
}

impl UsageDistribution {
    /// Buckets per-block counters, where `counts[i]` belongs to block
    /// `i + 1`.
    pub fn from_counts(counts: &[u32]) -> Self {
        let used: Vec<(BlockId, u32)> = counts.iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, c)| (i + 1, *c))
            .collect();

        let threshold = if used.is_empty() {
            1
        } else {
            let mean = used.iter()
                .map(|(_, c)| *c as f64)
                .sum::<f64>() / used.len() as f64;
            (mean.round() as u32).max(1)
        };

        let mut most_used: Option<(BlockId, u32)> = None;
        let mut least_used: Option<(BlockId, u32)> = None;
        // `used` is in ascending id order, so strict comparisons
        // leave ties to the lowest id.
        for &(id, c) in &used {
            if most_used.map_or(true, |(_, m)| c > m) {
                most_used = Some((id, c));
            }
            if least_used.map_or(true, |(_, l)| c < l) {
                least_used = Some((id, c));
            }
        }

        let (heavily_used, lightly_used): (Vec<BlockId>, Vec<BlockId>) = used.iter()
            .partition_map(|&(id, c)| {
                if c >= threshold {
                    itertools::Either::Left(id)
                } else {
                    itertools::Either::Right(id)
                }
            });

        let never_used = counts.iter()
            .enumerate()
            .filter(|(_, c)| **c == 0)
            .map(|(i, _)| i + 1)
            .collect();

        Self {
            never_used,
            lightly_used,
            heavily_used,
            threshold,
            most_used,
            least_used,
        }
    }
}

/// Everything worth knowing about an [`Engine`]'s history, derived in
/// one pass from its [`Ledger`] and usage counters.
///
/// Percentages are in `[0, 100]`. Any ratio whose denominator is zero
/// is reported as exactly `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub usage:          UsageDistribution,
    /// Memory used at least once over total capacity.
    pub utilization:    f64,
    /// Wasted capacity over capacity handed out, summed over every
    /// placement (a reused block is charged every time).
    pub fragmentation:  f64,
    /// Distinct jobs placed per tick.
    pub throughput:     f64,
    pub jobs_placed:    usize,
    pub placements:     usize,
    pub ledger:         Ledger,
}

impl Statistics {
    pub fn derive(engine: &Engine) -> Self {
        let ledger = *engine.ledger();
        let jobs_placed = engine.jobs().len();

        Self {
            usage:          UsageDistribution::from_counts(engine.usage_counts()),
            utilization:    percentage(ledger.memory_used, ledger.capacity),
            fragmentation:  percentage(
                ledger.fragmentation,
                ledger.fragmentation + ledger.job_memory
            ),
            throughput:     ratio(jobs_placed, ledger.last_tick),
            jobs_placed,
            placements:     engine.history().len(),
            ledger,
        }
    }

    /// String-keyed view, ready to be printed line by line. Key order
    /// is fixed.
    pub fn as_map(&self) -> IndexMap<String, String> {
        let show_block = |b: Option<(BlockId, u32)>| {
            match b {
                Some((id, c))   => format!("#{} ({}x)", id, c),
                None            => String::from("-"),
            }
        };
        let show_ids = |ids: &[BlockId]| {
            if ids.is_empty() {
                String::from("-")
            } else {
                ids.iter().join(", ")
            }
        };

        let mut res = IndexMap::new();
        res.insert(MEMORY_UTILIZATION.to_string(), format!("{:.2}%", self.utilization));
        res.insert(INTERNAL_FRAG.to_string(), format!("{:.2}%", self.fragmentation));
        res.insert(THROUGHPUT.to_string(), format!("{:.3} jobs/tick", self.throughput));
        res.insert(JOBS_PLACED.to_string(), self.jobs_placed.to_string());
        res.insert(MOST_USED_BLOCK.to_string(), show_block(self.usage.most_used));
        res.insert(LEAST_USED_BLOCK.to_string(), show_block(self.usage.least_used));
        res.insert(USAGE_THRESHOLD.to_string(), self.usage.threshold.to_string());
        res.insert(HEAVILY_USED.to_string(), show_ids(&self.usage.heavily_used));
        res.insert(LIGHTLY_USED.to_string(), show_ids(&self.usage.lightly_used));
        res.insert(NEVER_USED.to_string(), show_ids(&self.usage.never_used));

        res
    }
}

/// `num / den * 100`, or `0.0` when `den` is zero.
#[inline(always)]
pub fn percentage(num: usize, den: usize) -> f64 {
    ratio(num, den) * 100.0
}

/// `num / den`, or `0.0` when `den` is zero.
#[inline(always)]
pub fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
