//! Instance selection among matching candidates
//!
//! Active instances win; when none are active the selector degrades to
//! the inactive set rather than reporting nothing, so callers can still
//! reach the last-known address of a possibly-revivable instance.
//! Selection is uniform with no weighting by load, recency, or
//! geography.

use crate::instance::ServiceInstance;
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick one instance from the filtered candidate set
///
/// Uniformly random over the Active candidates, falling back to a
/// uniformly random Inactive candidate, or `None` when the set is
/// empty. The RNG is caller-supplied so tests can seed it.
pub fn select<'a, R: Rng>(
    candidates: &'a [ServiceInstance],
    rng: &mut R,
) -> Option<&'a ServiceInstance> {
    let (active, inactive): (Vec<&ServiceInstance>, Vec<&ServiceInstance>) =
        candidates.iter().partition(|i| i.is_active());

    if let Some(instance) = active.choose(rng).copied() {
        return Some(instance);
    }

    inactive.choose(rng).copied()
}
