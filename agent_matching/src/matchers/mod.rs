pub mod bucket_grid;
pub mod full_scan;
pub mod ring_grid;

pub use bucket_grid::BucketGridMatcher;
pub use full_scan::FullScanMatcher;
pub use ring_grid::RingGridMatcher;

use crate::{AgentId, GridPoint, MatcherError, NearestResult};

/// The closed set of nearest-agent strategies. All variants expose the same
/// operations and, given the same mutation sequence, return identical results
/// for every query; they differ only in how much of the grid a query visits.
///
/// The strategy is picked at construction and cannot change afterwards.
#[derive(Debug)]
pub enum Matcher {
    FullScan(FullScanMatcher),
    RingGrid(RingGridMatcher),
    BucketGrid(BucketGridMatcher),
}

impl Matcher {
    /// Baseline strategy scanning every agent per query.
    pub fn full_scan(width: i32, height: i32) -> Result<Self, MatcherError> {
        Ok(Matcher::FullScan(FullScanMatcher::new(width, height)?))
    }

    /// Expanding-ring strategy walking grid cells outward from the query.
    pub fn ring_grid(width: i32, height: i32) -> Result<Self, MatcherError> {
        Ok(Matcher::RingGrid(RingGridMatcher::new(width, height)?))
    }

    /// Bucketed spatial-hash strategy walking `bucket_size` x `bucket_size`
    /// regions outward from the query.
    pub fn bucket_grid(width: i32, height: i32, bucket_size: i32) -> Result<Self, MatcherError> {
        Ok(Matcher::BucketGrid(BucketGridMatcher::new(
            width,
            height,
            bucket_size,
        )?))
    }

    pub fn upsert_agent(&mut self, id: AgentId, position: GridPoint) -> Result<(), MatcherError> {
        match self {
            Matcher::FullScan(m) => m.upsert_agent(id, position),
            Matcher::RingGrid(m) => m.upsert_agent(id, position),
            Matcher::BucketGrid(m) => m.upsert_agent(id, position),
        }
    }

    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        match self {
            Matcher::FullScan(m) => m.remove_agent(id),
            Matcher::RingGrid(m) => m.remove_agent(id),
            Matcher::BucketGrid(m) => m.remove_agent(id),
        }
    }

    /// Up to 5 agents nearest to `query`, ascending by `(dist2, id)`.
    pub fn find_nearest(&self, query: GridPoint) -> Vec<NearestResult> {
        match self {
            Matcher::FullScan(m) => m.find_nearest(query),
            Matcher::RingGrid(m) => m.find_nearest(query),
            Matcher::BucketGrid(m) => m.find_nearest(query),
        }
    }
}
