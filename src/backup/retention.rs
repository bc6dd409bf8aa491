use super::types::RetentionConfig;
use chrono::{Datelike, NaiveDate};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Compute the snapshot dates to delete for one cycle.
///
/// Each enabled granularity runs independently over the *original* input
/// set, never over another granularity's surviving result:
/// - weekly: snapshots in the current month, bucketed by ISO week number
/// - monthly: snapshots in the current year, bucketed by month
/// - yearly: all snapshots, bucketed by year
///
/// Within a bucket only the chronologically latest snapshot survives.
/// The returned set is the deduplicated union of all flagged dates; it is
/// a pure computation with no filesystem side effects.
pub fn compute_deletions(
    snapshots: &[NaiveDate],
    now: NaiveDate,
    config: &RetentionConfig,
) -> BTreeSet<NaiveDate> {
    let mut doomed = BTreeSet::new();

    if config.delete_weekly_backups {
        let in_current_month = snapshots
            .iter()
            .copied()
            .filter(|d| d.year() == now.year() && d.month() == now.month());
        prune_buckets(in_current_month, |d| d.iso_week().week(), &mut doomed);
    }

    if config.delete_monthly_backups {
        let in_current_year = snapshots.iter().copied().filter(|d| d.year() == now.year());
        prune_buckets(in_current_year, |d| d.month(), &mut doomed);
    }

    if config.delete_yearly_backups {
        prune_buckets(snapshots.iter().copied(), |d| d.year(), &mut doomed);
    }

    doomed
}

/// Keep the latest date per bucket, flag everything it supersedes.
///
/// The kept pointer advances to the most recent date seen so far in each
/// bucket; any previously kept date that turns out not to be the maximum
/// is flagged. Buckets with a single member are untouched.
fn prune_buckets<I, K, F>(dates: I, bucket_key: F, doomed: &mut BTreeSet<NaiveDate>)
where
    I: IntoIterator<Item = NaiveDate>,
    K: Eq + Hash,
    F: Fn(NaiveDate) -> K,
{
    let mut kept: HashMap<K, NaiveDate> = HashMap::new();

    for date in dates {
        match kept.entry(bucket_key(date)) {
            Entry::Occupied(mut occupied) => {
                if date > *occupied.get() {
                    doomed.insert(occupied.insert(date));
                } else {
                    doomed.insert(date);
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(date);
            }
        }
    }
}
