use std::cmp;

/// ProgressTracker remembers, for every peer in the group, the highest seq that peer's
/// application has released via `Done`. Peers we haven't heard from count as having released
/// nothing, so we never assume a higher group-wide floor than we can prove.
pub(crate) struct ProgressTracker {
    me: usize,
    done: Vec<Option<u64>>,
}

impl ProgressTracker {
    pub(crate) fn new(me: usize, num_peers: usize) -> Self {
        ProgressTracker {
            me,
            done: vec![None; num_peers],
        }
    }

    pub(crate) fn local_done(&self) -> Option<u64> {
        self.done[self.me]
    }

    /// Ratchets `peer`'s done horizon forward. Returns true if it moved.
    pub(crate) fn record(&mut self, peer: usize, done: Option<u64>) -> bool {
        let slot = match self.done.get_mut(peer) {
            Some(slot) => slot,
            None => return false,
        };

        match (*slot, done) {
            (_, None) => false,
            (Some(current), Some(new)) if new <= current => false,
            (_, Some(new)) => {
                *slot = Some(new);
                true
            }
        }
    }

    /// Lowest seq that may still be needed by someone in the group.
    pub(crate) fn min(&self) -> u64 {
        self.done
            .iter()
            .map(|done| match done {
                None => 0,
                Some(seq) => seq.saturating_add(1),
            })
            .fold(u64::MAX, cmp::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_min_is_zero() {
        let tracker = ProgressTracker::new(1, 3);
        assert_eq!(0, tracker.min());
        assert_eq!(None, tracker.local_done());
    }

    #[test]
    fn min_requires_every_peer() {
        let mut tracker = ProgressTracker::new(0, 3);
        assert!(tracker.record(0, Some(10)));
        assert!(tracker.record(1, Some(7)));
        assert_eq!(0, tracker.min());

        assert!(tracker.record(2, Some(4)));
        assert_eq!(5, tracker.min());
    }

    #[test]
    fn record_is_monotonic() {
        let mut tracker = ProgressTracker::new(0, 2);
        assert!(tracker.record(1, Some(3)));
        assert!(!tracker.record(1, Some(2)));
        assert!(!tracker.record(1, Some(3)));
        assert!(!tracker.record(1, None));
        assert!(tracker.record(1, Some(4)));

        tracker.record(0, Some(9));
        assert_eq!(5, tracker.min());
    }

    #[test]
    fn done_at_max_seq_does_not_overflow() {
        let mut tracker = ProgressTracker::new(0, 1);
        assert!(tracker.record(0, Some(u64::MAX)));
        assert_eq!(u64::MAX, tracker.min());
    }

    #[test]
    fn unknown_peer_index_is_ignored() {
        let mut tracker = ProgressTracker::new(0, 2);
        assert!(!tracker.record(7, Some(100)));
        assert_eq!(0, tracker.min());
    }
}
