use crate::distance::squared_euclidean;
use crate::store::AgentStore;
use crate::top_k::TopK;
use crate::{AgentId, GridPoint, MatcherError, NearestResult};

/// Baseline strategy: every query evaluates every stored agent. O(agents)
/// per query with no pruning, which makes it the oracle the grid-walking
/// strategies are checked against.
#[derive(Debug)]
pub struct FullScanMatcher {
    store: AgentStore,
}

impl FullScanMatcher {
    pub fn new(width: i32, height: i32) -> Result<Self, MatcherError> {
        Ok(FullScanMatcher {
            store: AgentStore::new(width, height)?,
        })
    }

    pub fn upsert_agent(&mut self, id: AgentId, position: GridPoint) -> Result<(), MatcherError> {
        self.store.upsert(id, position)
    }

    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        self.store.remove(id)
    }

    pub fn find_nearest(&self, query: GridPoint) -> Vec<NearestResult> {
        let mut top = TopK::new();
        for (id, position) in self.store.agents() {
            top.add(NearestResult {
                id,
                position,
                dist2: squared_euclidean(query, position),
            });
        }
        top.into_sorted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_all_agents_when_fewer_than_five() {
        let mut matcher = FullScanMatcher::new(10, 10).unwrap();
        matcher.upsert_agent(10, GridPoint::new(1, 1)).unwrap();
        matcher.upsert_agent(20, GridPoint::new(2, 2)).unwrap();
        matcher.upsert_agent(30, GridPoint::new(3, 3)).unwrap();

        let res = matcher.find_nearest(GridPoint::new(0, 0));
        assert_eq!(res.len(), 3);
        assert_eq!(res[0].id, 10);
        assert_eq!(res[0].dist2, 2);
        assert_eq!(res[1].id, 20);
        assert_eq!(res[1].dist2, 8);
        assert_eq!(res[2].id, 30);
        assert_eq!(res[2].dist2, 18);
    }

    #[test]
    fn test_keeps_only_the_five_nearest() {
        let mut matcher = FullScanMatcher::new(20, 20).unwrap();
        for id in 1..=10 {
            matcher
                .upsert_agent(id, GridPoint::new(id as i32, 0))
                .unwrap();
        }

        let res = matcher.find_nearest(GridPoint::new(0, 0));
        let ids: Vec<_> = res.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
