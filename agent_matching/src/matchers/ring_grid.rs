use crate::distance::squared_euclidean;
use crate::store::AgentStore;
use crate::top_k::TopK;
use crate::{AgentId, GridPoint, MatcherError, NearestResult};

use tracing::trace;

/// Expanding-ring strategy: walks the occupancy grid outward from the query
/// cell in square rings and stops once no unvisited cell can beat the current
/// fifth-best candidate. Every cell on a ring sits at Chebyshev radius `r`,
/// so any cell beyond it is at least `(r + 1)^2` away in squared euclidean
/// terms.
#[derive(Debug)]
pub struct RingGridMatcher {
    store: AgentStore,
}

impl RingGridMatcher {
    pub fn new(width: i32, height: i32) -> Result<Self, MatcherError> {
        Ok(RingGridMatcher {
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
        if self.store.is_empty() {
            return top.into_sorted();
        }

        let qx = query.x as i64;
        let qy = query.y as i64;

        for r in 0..=self.coverage_radius(qx, qy) {
            self.visit_ring(qx, qy, r, query, &mut top);

            // Everything stored has been seen already
            if top.len() == self.store.len() {
                break;
            }

            if top.is_full() && r * r > top.worst_dist2_or_max() {
                trace!(radius = r, "ring walk stopped by distance bound");
                break;
            }
        }

        top.into_sorted()
    }

    /// Chebyshev distance from the query cell to the farthest grid corner:
    /// past this radius every cell has been visited, wherever the query sits.
    fn coverage_radius(&self, qx: i64, qy: i64) -> i64 {
        let max_x = self.store.width() as i64 - 1;
        let max_y = self.store.height() as i64 - 1;
        let span_x = qx.abs().max((qx - max_x).abs());
        let span_y = qy.abs().max((qy - max_y).abs());
        span_x.max(span_y)
    }

    /// Visits exactly the cells at Chebyshev radius `r` around the query
    /// cell: top and bottom rows first, then the side columns without the
    /// corners. Out-of-bounds cells are skipped, so no cell is ever touched
    /// twice across rings.
    fn visit_ring(&self, qx: i64, qy: i64, r: i64, query: GridPoint, top: &mut TopK) {
        if r == 0 {
            self.try_cell(qx, qy, query, top);
            return;
        }

        // Top and bottom rows
        for x in (qx - r)..=(qx + r) {
            self.try_cell(x, qy - r, query, top);
            self.try_cell(x, qy + r, query, top);
        }

        // Side columns, corners already covered by the rows
        for y in (qy - r + 1)..=(qy + r - 1) {
            self.try_cell(qx - r, y, query, top);
            self.try_cell(qx + r, y, query, top);
        }
    }

    fn try_cell(&self, x: i64, y: i64, query: GridPoint, top: &mut TopK) {
        if x < 0 || x > i32::MAX as i64 || y < 0 || y > i32::MAX as i64 {
            return;
        }

        let Some(id) = self.store.occupant_of(x as i32, y as i32) else {
            return;
        };
        let Some(position) = self.store.position_of(id) else {
            return;
        };

        top.add(NearestResult {
            id,
            position,
            dist2: squared_euclidean(query, position),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_returns_nothing() {
        let matcher = RingGridMatcher::new(10, 10).unwrap();
        assert!(matcher.find_nearest(GridPoint::new(5, 5)).is_empty());
    }

    #[test]
    fn test_results_are_sorted_by_distance_then_id() {
        let mut matcher = RingGridMatcher::new(5, 5).unwrap();
        matcher.upsert_agent(2, GridPoint::new(1, 0)).unwrap();
        matcher.upsert_agent(1, GridPoint::new(0, 1)).unwrap();

        let res = matcher.find_nearest(GridPoint::new(0, 0));
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].id, 1);
        assert_eq!(res[1].id, 2);
        assert_eq!(res[0].dist2, 1);
        assert_eq!(res[1].dist2, 1);
    }

    #[test]
    fn test_ring_stop_does_not_miss_diagonal_neighbours() {
        // The nearest agent by euclidean distance sits on a larger Chebyshev
        // ring than a farther axis-aligned one only in the other direction;
        // the r^2 bound must keep expanding until it is safe to stop.
        let mut matcher = RingGridMatcher::new(20, 20).unwrap();
        for id in 1..=4 {
            matcher
                .upsert_agent(id, GridPoint::new(10 + id as i32, 10))
                .unwrap();
        }
        matcher.upsert_agent(5, GridPoint::new(10, 15)).unwrap();
        // Beats agent 5 into the fifth slot despite sitting on a diagonal
        matcher.upsert_agent(6, GridPoint::new(13, 13)).unwrap();

        let res = matcher.find_nearest(GridPoint::new(10, 10));
        let ids: Vec<_> = res.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_query_outside_grid_still_sees_all_agents() {
        let mut matcher = RingGridMatcher::new(10, 10).unwrap();
        matcher.upsert_agent(1, GridPoint::new(9, 9)).unwrap();
        matcher.upsert_agent(2, GridPoint::new(0, 0)).unwrap();

        let res = matcher.find_nearest(GridPoint::new(-30, -30));
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].id, 2);
        assert_eq!(res[1].id, 1);
    }
}
