//! Batch selection
//!
//! Pure logic: which eligible addresses are still owed a transfer, how many
//! of them to serve today, and in what order. All randomness comes from the
//! injected [`RandomSource`] in a fixed order:
//!
//! 1. one draw in `[min_tx, max_tx]` for the target size;
//! 2. a Fisher–Yates shuffle drawing `j` in `[0, i]` for `i = n-1 down to 1`.
//!
//! No draws are made when there are no candidates.

use shared::{Address, AddressSet, InclusiveRange};
use crate::traits::RandomSource;

/// Result of selecting today's batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every eligible address has been served
    NothingToDo,
    /// Recipients in the order they will be attempted
    Batch {
        recipients: Vec<Address>,
        candidate_count: usize,
    },
}

impl Selection {
    pub fn recipients(&self) -> &[Address] {
        match self {
            Selection::NothingToDo => &[],
            Selection::Batch { recipients, .. } => recipients,
        }
    }
}

/// Eligible addresses not yet served, in eligibility order
///
/// An address in `pending` is offered again even when it is also in `sent`.
pub fn candidates(eligibility: &[Address], sent: &AddressSet, pending: &AddressSet) -> Vec<Address> {
    let mut seen = AddressSet::new();
    eligibility
        .iter()
        .filter(|address| !sent.contains(address) || pending.contains(address))
        .filter(|address| seen.insert((*address).clone()))
        .cloned()
        .collect()
}

/// In-place uniform shuffle driven by `random`
pub fn shuffle<R: RandomSource + ?Sized>(items: &mut [Address], random: &R) {
    for i in (1..items.len()).rev() {
        let j = random.gen_range(0, i as u64) as usize;
        items.swap(i, j);
    }
}

/// Choose today's recipients
pub fn select_batch<R: RandomSource + ?Sized>(
    eligibility: &[Address],
    sent: &AddressSet,
    pending: &AddressSet,
    tx_per_day: InclusiveRange,
    random: &R,
) -> Selection {
    let mut pool = candidates(eligibility, sent, pending);
    if pool.is_empty() {
        return Selection::NothingToDo;
    }

    let candidate_count = pool.len();
    let drawn = random.gen_range(tx_per_day.min(), tx_per_day.max());
    let target = usize::try_from(drawn).unwrap_or(usize::MAX).min(candidate_count);

    shuffle(&mut pool, random);
    pool.truncate(target);

    Selection::Batch {
        recipients: pool,
        candidate_count,
    }
}
