use crate::{AgentId, NearestResult};

/// Number of results a query returns. Fixed by the matcher contract.
pub const K: usize = 5;

fn rank(r: &NearestResult) -> (i64, AgentId) {
    (r.dist2, r.id)
}

/// Bounded selector keeping the `K` best candidates seen so far, ordered
/// ascending by `(dist2, id)`. Candidates losing the comparison against the
/// current worst entry are discarded without shifting anything.
#[derive(Debug, Default)]
pub struct TopK {
    entries: Vec<NearestResult>,
}

impl TopK {
    pub fn new() -> Self {
        TopK {
            entries: Vec::with_capacity(K),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == K
    }

    pub fn add(&mut self, candidate: NearestResult) {
        if self.entries.len() < K {
            self.entries.push(candidate);
            self.bubble_up(self.entries.len() - 1);
            return;
        }

        if rank(&candidate) >= rank(&self.entries[K - 1]) {
            return;
        }

        self.entries[K - 1] = candidate;
        self.bubble_up(K - 1);
    }

    /// Distance of the current worst entry, or `i64::MAX` while fewer than
    /// `K` candidates are held. Pruning on the sentinel is always a no-op,
    /// so callers never cut a search short before the selector fills up.
    pub fn worst_dist2_or_max(&self) -> i64 {
        if self.entries.len() < K {
            i64::MAX
        } else {
            self.entries[K - 1].dist2
        }
    }

    /// Consumes the selector, yielding the held entries ascending by
    /// `(dist2, id)`.
    pub fn into_sorted(self) -> Vec<NearestResult> {
        self.entries
    }

    fn bubble_up(&mut self, mut idx: usize) {
        while idx > 0 && rank(&self.entries[idx]) < rank(&self.entries[idx - 1]) {
            self.entries.swap(idx, idx - 1);
            idx -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridPoint;

    fn result(id: AgentId, dist2: i64) -> NearestResult {
        NearestResult {
            id,
            position: GridPoint::new(0, 0),
            dist2,
        }
    }

    #[test]
    fn test_keeps_everything_under_capacity() {
        let mut top = TopK::new();
        top.add(result(3, 9));
        top.add(result(1, 4));
        top.add(result(2, 16));

        assert_eq!(top.len(), 3);
        assert_eq!(top.worst_dist2_or_max(), i64::MAX);

        let ids: Vec<AgentId> = top.into_sorted().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_replaces_worst_when_full() {
        let mut top = TopK::new();
        for id in 1..=5 {
            top.add(result(id, 10 * id as i64));
        }
        assert!(top.is_full());
        assert_eq!(top.worst_dist2_or_max(), 50);

        // Beats the worst entry, displacing id 5
        top.add(result(9, 15));
        assert_eq!(top.worst_dist2_or_max(), 40);

        // Worse than everything held, discarded
        top.add(result(8, 99));

        let ids: Vec<AgentId> = top.into_sorted().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 9, 2, 3, 4]);
    }

    #[test]
    fn test_equal_distance_breaks_ties_by_id() {
        let mut top = TopK::new();
        top.add(result(7, 4));
        top.add(result(2, 4));
        top.add(result(5, 4));

        let ids: Vec<AgentId> = top.into_sorted().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5, 7]);
    }

    #[test]
    fn test_candidate_tying_the_worst_is_discarded() {
        let mut top = TopK::new();
        for id in 1..=5 {
            top.add(result(id, 10));
        }

        // Same distance, higher id than the worst slot: not strictly better
        top.add(result(6, 10));
        let ids: Vec<AgentId> = top.into_sorted().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        // Same distance, lower id: wins the tie-break
        let mut top = TopK::new();
        for id in 2..=6 {
            top.add(result(id, 10));
        }
        top.add(result(1, 10));
        let ids: Vec<AgentId> = top.into_sorted().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
