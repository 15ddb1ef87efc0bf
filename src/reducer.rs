//! Stratified, significance-ranked downsampling of a full perspective set.
//!
//! Perspectives are split into three stances by bias, a target size is looked
//! up from the input size, the budget is shared proportionally between the
//! stances, and each stance keeps its most significant members.

use crate::parser::Perspective;
use serde::Serialize;
use tracing::{debug, info};

/// Upper bias bound (exclusive) of the leftist stance.
const LEFTIST_BELOW: f64 = 0.428;
/// Upper bias bound (inclusive) of the common stance.
const COMMON_UP_TO: f64 = 0.571;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Leftist,
    Common,
    Rightist,
}

impl Stance {
    pub const ALL: [Stance; 3] = [Stance::Leftist, Stance::Common, Stance::Rightist];

    /// Order in which ties are broken when the allocation is adjusted.
    const TIE_ORDER: [Stance; 3] = [Stance::Common, Stance::Rightist, Stance::Leftist];

    pub fn of(bias_x: f64) -> Stance {
        if bias_x < LEFTIST_BELOW {
            Stance::Leftist
        } else if bias_x <= COMMON_UP_TO {
            Stance::Common
        } else {
            Stance::Rightist
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Leftist => "leftist",
            Stance::Common => "common",
            Stance::Rightist => "rightist",
        }
    }

    fn idx(self) -> usize {
        match self {
            Stance::Leftist => 0,
            Stance::Common => 1,
            Stance::Rightist => 2,
        }
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StratifiedResult {
    pub leftist: Vec<Perspective>,
    pub common: Vec<Perspective>,
    pub rightist: Vec<Perspective>,
}

impl StratifiedResult {
    pub fn get(&self, stance: Stance) -> &[Perspective] {
        match stance {
            Stance::Leftist => &self.leftist,
            Stance::Common => &self.common,
            Stance::Rightist => &self.rightist,
        }
    }

    fn get_mut(&mut self, stance: Stance) -> &mut Vec<Perspective> {
        match stance {
            Stance::Leftist => &mut self.leftist,
            Stance::Common => &mut self.common,
            Stance::Rightist => &mut self.rightist,
        }
    }

    pub fn len(&self) -> usize {
        self.leftist.len() + self.common.len() + self.rightist.len()
    }

    fn sizes(&self) -> [usize; 3] {
        [self.leftist.len(), self.common.len(), self.rightist.len()]
    }
}

/// Subset size for a set of `n` perspectives. Sizes outside the table are
/// not reduced.
pub fn target_size(n: usize) -> usize {
    let k = match n {
        7..=14 => 6,
        15..=28 => 14,
        29..=77 => 21,
        78..=136 => 28,
        _ => n,
    };
    k.min(n)
}

/// Share `k` slots between pools of the given sizes.
///
/// Proportional shares are rounded half-to-even, then nudged one at a time
/// until they sum to exactly `k`. A pool never gets more than it holds.
/// `k` must not exceed the total pool size.
pub fn allocate(sizes: [usize; 3], k: usize) -> [usize; 3] {
    let n: usize = sizes.iter().sum();
    if n == 0 {
        return [0; 3];
    }

    let mut alloc = sizes.map(|size| {
        let share = (size as f64 / n as f64) * k as f64;
        (share.round_ties_even() as usize).min(size)
    });

    loop {
        let total: usize = alloc.iter().sum();
        if total == k {
            break;
        }

        if total > k {
            let Some(i) = pick(&alloc, |i| alloc[i] > 0, |a, b| a > b) else {
                break;
            };
            alloc[i] -= 1;
        } else {
            let Some(i) = pick(&alloc, |i| alloc[i] < sizes[i], |a, b| a < b) else {
                break;
            };
            alloc[i] += 1;
        }
    }

    alloc
}

/// First eligible index in tie order whose allocation no other eligible
/// allocation beats.
fn pick(
    alloc: &[usize; 3],
    eligible: impl Fn(usize) -> bool,
    beats: impl Fn(usize, usize) -> bool,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for stance in Stance::TIE_ORDER {
        let i = stance.idx();
        if !eligible(i) {
            continue;
        }
        match best {
            Some(b) if !beats(alloc[i], alloc[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Partition perspectives by stance, keeping input order within each pool.
pub fn partition(perspectives: &[Perspective]) -> StratifiedResult {
    let mut pools = StratifiedResult::default();
    for p in perspectives {
        pools.get_mut(Stance::of(p.bias_x)).push(p.clone());
    }
    pools
}

/// Select a representative subset of `perspectives`.
///
/// When the target size equals the input size the pools come back as
/// partitioned. Otherwise each pool is ordered by descending significance
/// (stable, so equal scores keep input order) and cut to its allocation.
pub fn stratify(perspectives: &[Perspective]) -> StratifiedResult {
    let n = perspectives.len();
    let k = target_size(n);
    let mut pools = partition(perspectives);

    if k == n {
        debug!("No reduction for {} perspectives", n);
        return pools;
    }

    let alloc = allocate(pools.sizes(), k);
    for stance in Stance::ALL {
        let pool = pools.get_mut(stance);
        pool.sort_by(|a, b| b.significance_y.total_cmp(&a.significance_y));
        pool.truncate(alloc[stance.idx()]);
    }

    info!(
        "Reduced {} perspectives to {} (leftist {}, common {}, rightist {})",
        n, k, alloc[0], alloc[1], alloc[2]
    );
    pools
}
