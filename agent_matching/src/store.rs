use crate::{AgentId, GridPoint, MatcherError};

use std::collections::HashMap;

/// Authoritative store of agent positions on a bounded `width` x `height`
/// grid, with the invariant that every cell holds at most one agent.
///
/// Occupancy lives in a flat vector indexed by `x * height + y` next to an
/// id -> position map; every operation leaves the two in agreement, error
/// paths included.
#[derive(Debug)]
pub struct AgentStore {
    width: i32,
    height: i32,
    grid: Vec<Option<AgentId>>,
    positions: HashMap<AgentId, GridPoint>,
}

impl AgentStore {
    pub fn new(width: i32, height: i32) -> Result<Self, MatcherError> {
        if width <= 0 || height <= 0 {
            return Err(MatcherError::Configuration(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        Ok(AgentStore {
            width,
            height,
            grid: vec![None; width as usize * height as usize],
            positions: HashMap::new(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of agents currently stored.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn cell_index(&self, x: i32, y: i32) -> usize {
        x as usize * self.height as usize + y as usize
    }

    /// Places `id` at `position`, vacating its previous cell if it already
    /// existed. Fails without touching any state when the position is outside
    /// the grid or the target cell is held by a different agent.
    pub fn upsert(&mut self, id: AgentId, position: GridPoint) -> Result<(), MatcherError> {
        if !self.in_bounds(position.x, position.y) {
            return Err(MatcherError::OutOfBounds {
                x: position.x,
                y: position.y,
                width: self.width,
                height: self.height,
            });
        }

        // Conflict check must precede the vacate below, so a rejected upsert
        // leaves the store exactly as it was.
        let target = self.cell_index(position.x, position.y);
        if let Some(occupant) = self.grid[target] {
            if occupant != id {
                return Err(MatcherError::CellConflict {
                    x: position.x,
                    y: position.y,
                    occupant,
                });
            }
        }

        if let Some(old) = self.positions.get(&id).copied() {
            let old_cell = self.cell_index(old.x, old.y);
            self.grid[old_cell] = None;
        }

        self.grid[target] = Some(id);
        self.positions.insert(id, position);
        Ok(())
    }

    /// Vacates the agent's cell and drops its record. Returns whether the id
    /// was present; removing an unknown id is not an error.
    pub fn remove(&mut self, id: AgentId) -> bool {
        match self.positions.remove(&id) {
            Some(position) => {
                let cell = self.cell_index(position.x, position.y);
                self.grid[cell] = None;
                true
            }
            None => false,
        }
    }

    pub fn position_of(&self, id: AgentId) -> Option<GridPoint> {
        self.positions.get(&id).copied()
    }

    /// Occupant of the given cell; `None` for empty cells and for
    /// out-of-bounds coordinates.
    pub fn occupant_of(&self, x: i32, y: i32) -> Option<AgentId> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.grid[self.cell_index(x, y)]
    }

    pub fn agents(&self) -> impl Iterator<Item = (AgentId, GridPoint)> + '_ {
        self.positions.iter().map(|(id, p)| (*id, *p))
    }
}
