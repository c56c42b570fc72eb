use crate::distance::{squared_distance_to_rect, squared_euclidean};
use crate::store::AgentStore;
use crate::top_k::TopK;
use crate::{AgentId, GridPoint, MatcherError, NearestResult};

use std::collections::HashMap;
use tracing::trace;

/// Edge length, in cells, of one bucket when none is given.
pub const DEFAULT_BUCKET_SIZE: i32 = 32;

/// Bucketed spatial-hash strategy: the grid is partitioned into
/// `bucket_size` x `bucket_size` square buckets and a query walks outward
/// over whole buckets instead of single cells.
///
/// A bucket's interior is not the query cell, so the plain `r^2` stop bound
/// of the cell walk does not carry over. Instead, once five candidates are
/// held, the walk computes the exact point-to-footprint distance of every
/// bucket on the next ring (footprints shrink at the grid edge) and stops
/// when even the nearest of them cannot beat the current fifth-best.
#[derive(Debug)]
pub struct BucketGridMatcher {
    store: AgentStore,
    bucket_size: i32,
    /// (bx, by) -> ids inside the bucket, unordered. Present only while
    /// non-empty.
    buckets: HashMap<(i32, i32), Vec<AgentId>>,
    /// id -> bucket currently holding it.
    agent_bucket: HashMap<AgentId, (i32, i32)>,
}

impl BucketGridMatcher {
    pub fn new(width: i32, height: i32, bucket_size: i32) -> Result<Self, MatcherError> {
        if bucket_size <= 0 {
            return Err(MatcherError::Configuration(format!(
                "bucket size must be positive, got {}",
                bucket_size
            )));
        }

        Ok(BucketGridMatcher {
            store: AgentStore::new(width, height)?,
            bucket_size,
            buckets: HashMap::new(),
            agent_bucket: HashMap::new(),
        })
    }

    pub fn upsert_agent(&mut self, id: AgentId, position: GridPoint) -> Result<(), MatcherError> {
        // The store performs all validation; bucket state is only touched
        // once the position change is committed, so a rejected upsert leaves
        // the bucket maps untouched as well.
        self.store.upsert(id, position)?;
        self.place_in_bucket(id, self.bucket_of(position));
        Ok(())
    }

    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        if let Some(bucket) = self.agent_bucket.remove(&id) {
            self.detach_from_bucket(id, bucket);
        }
        self.store.remove(id)
    }

    pub fn find_nearest(&self, query: GridPoint) -> Vec<NearestResult> {
        let mut top = TopK::new();
        if self.store.is_empty() {
            return top.into_sorted();
        }

        let size = self.bucket_size as i64;
        let qbx = (query.x as i64).div_euclid(size);
        let qby = (query.y as i64).div_euclid(size);

        for r in 0..=self.coverage_radius(qbx, qby) {
            self.visit_bucket_ring(qbx, qby, r, query, &mut top);

            if top.len() == self.store.len() {
                break;
            }

            if top.is_full() {
                // Exact lower bound on anything not visited yet: every
                // unexplored bucket is at least as far as some bucket on the
                // next ring.
                match self.next_ring_lower_bound(qbx, qby, r + 1, query) {
                    Some(bound) if bound > top.worst_dist2_or_max() => {
                        trace!(radius = r, bound, "bucket walk stopped by footprint bound");
                        break;
                    }
                    _ => {}
                }
            }
        }

        top.into_sorted()
    }

    fn bucket_of(&self, position: GridPoint) -> (i32, i32) {
        (position.x / self.bucket_size, position.y / self.bucket_size)
    }

    /// Number of bucket columns / rows covering the grid.
    fn bucket_extent(&self) -> (i64, i64) {
        let size = self.bucket_size as i64;
        let cols = (self.store.width() as i64 + size - 1) / size;
        let rows = (self.store.height() as i64 + size - 1) / size;
        (cols, rows)
    }

    /// Both sides of a relocation in one place: the membership map and the
    /// bucket lists never change independently.
    fn place_in_bucket(&mut self, id: AgentId, bucket: (i32, i32)) {
        if let Some(&old) = self.agent_bucket.get(&id) {
            if old == bucket {
                return;
            }
            self.detach_from_bucket(id, old);
        }
        self.buckets.entry(bucket).or_default().push(id);
        self.agent_bucket.insert(id, bucket);
    }

    fn detach_from_bucket(&mut self, id: AgentId, bucket: (i32, i32)) {
        if let Some(list) = self.buckets.get_mut(&bucket) {
            // Buckets are unordered, so swap-with-last keeps removal O(1)
            if let Some(idx) = list.iter().position(|&a| a == id) {
                list.swap_remove(idx);
            }
            if list.is_empty() {
                self.buckets.remove(&bucket);
            }
        }
    }

    /// Chebyshev distance, in bucket coordinates, from the query bucket to
    /// the farthest corner bucket of the grid.
    fn coverage_radius(&self, qbx: i64, qby: i64) -> i64 {
        let (cols, rows) = self.bucket_extent();
        let span_x = qbx.abs().max((qbx - (cols - 1)).abs());
        let span_y = qby.abs().max((qby - (rows - 1)).abs());
        span_x.max(span_y)
    }

    fn visit_bucket_ring(&self, qbx: i64, qby: i64, r: i64, query: GridPoint, top: &mut TopK) {
        if r == 0 {
            self.try_bucket(qbx, qby, query, top);
            return;
        }

        // Top and bottom rows
        for bx in (qbx - r)..=(qbx + r) {
            self.try_bucket(bx, qby - r, query, top);
            self.try_bucket(bx, qby + r, query, top);
        }

        // Side columns, corners already covered by the rows
        for by in (qby - r + 1)..=(qby + r - 1) {
            self.try_bucket(qbx - r, by, query, top);
            self.try_bucket(qbx + r, by, query, top);
        }
    }

    fn try_bucket(&self, bx: i64, by: i64, query: GridPoint, top: &mut TopK) {
        let (cols, rows) = self.bucket_extent();
        if bx < 0 || bx >= cols || by < 0 || by >= rows {
            return;
        }

        let Some(list) = self.buckets.get(&(bx as i32, by as i32)) else {
            return;
        };
        for &id in list {
            let Some(position) = self.store.position_of(id) else {
                continue;
            };
            top.add(NearestResult {
                id,
                position,
                dist2: squared_euclidean(query, position),
            });
        }
    }

    /// Minimum squared distance from the query point to any bucket on ring
    /// `r` of the walk, using each bucket's real footprint clamped to the
    /// grid. `None` when the ring holds no bucket of the grid at all.
    fn next_ring_lower_bound(&self, qbx: i64, qby: i64, r: i64, query: GridPoint) -> Option<i64> {
        let mut best: Option<i64> = None;
        let mut consider = |bx: i64, by: i64| {
            if let Some(d2) = self.footprint_distance(bx, by, query) {
                best = Some(match best {
                    Some(b) => b.min(d2),
                    None => d2,
                });
            }
        };

        for bx in (qbx - r)..=(qbx + r) {
            consider(bx, qby - r);
            consider(bx, qby + r);
        }
        for by in (qby - r + 1)..=(qby + r - 1) {
            consider(qbx - r, by);
            consider(qbx + r, by);
        }

        best
    }

    fn footprint_distance(&self, bx: i64, by: i64, query: GridPoint) -> Option<i64> {
        let (cols, rows) = self.bucket_extent();
        if bx < 0 || bx >= cols || by < 0 || by >= rows {
            return None;
        }

        let size = self.bucket_size as i64;
        let x0 = bx * size;
        let y0 = by * size;
        // Edge buckets cover less than a full square
        let x1 = (x0 + size - 1).min(self.store.width() as i64 - 1);
        let y1 = (y0 + size - 1).min(self.store.height() as i64 - 1);

        Some(squared_distance_to_rect(query, x0, y0, x1, y1))
    }
}
