//! Breadth-first path field pointing every tile toward the goal row.

use grid_siege_core::{TileKind, NO_TILE};
use log::debug;

/// Per-tile successor and distance toward the goal row.
///
/// Row zero is the goal: its passthrough tiles have distance zero and no
/// successor. Every other reachable tile stores the index of the neighbour one
/// step closer to the goal. Unreachable and blocked tiles hold [`NO_TILE`] in
/// both fields.
///
/// A full recompute and an incremental ("soft") recompute drive the same
/// search in the same order, so both publish bit-identical fields. While a
/// soft recompute is in flight the previously published fields stay
/// readable.
#[derive(Clone, Debug)]
pub struct PathField {
    width: usize,
    height: usize,
    next: Vec<usize>,
    dist: Vec<usize>,
    search: Search,
    dirty: bool,
    soft_dirty: bool,
    soft_budget: usize,
}

impl PathField {
    /// Creates an unpublished field for a `width` x `height` grid.
    ///
    /// The field starts dirty so the first refresh performs a full search.
    #[must_use]
    pub fn new(width: usize, height: usize, soft_budget: usize) -> Self {
        let count = width.saturating_mul(height);
        Self {
            width,
            height,
            next: vec![NO_TILE; count],
            dist: vec![NO_TILE; count],
            search: Search::default(),
            dirty: true,
            soft_dirty: false,
            soft_budget: soft_budget.max(1),
        }
    }

    /// Reshapes the field, cancelling any search in flight.
    pub fn resize(&mut self, width: usize, height: usize) {
        let count = width.saturating_mul(height);
        self.width = width;
        self.height = height;
        self.next.clear();
        self.next.resize(count, NO_TILE);
        self.dist.clear();
        self.dist.resize(count, NO_TILE);
        self.soft_dirty = false;
        self.dirty = true;
    }

    /// Width of the grid in tiles.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in tiles.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Successor of the tile on its shortest path, or [`NO_TILE`].
    #[must_use]
    pub fn next_tile(&self, index: usize) -> usize {
        self.next.get(index).copied().unwrap_or(NO_TILE)
    }

    /// Breadth-first distance of the tile to the goal row, or [`NO_TILE`].
    #[must_use]
    pub fn dist_tile(&self, index: usize) -> usize {
        self.dist.get(index).copied().unwrap_or(NO_TILE)
    }

    /// Published successors in row-major order.
    #[must_use]
    pub fn next_tiles(&self) -> &[usize] {
        &self.next
    }

    /// Published distances in row-major order.
    #[must_use]
    pub fn dist_tiles(&self) -> &[usize] {
        &self.dist
    }

    /// Reports whether a full recompute is pending.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reports whether an incremental recompute is in flight.
    #[must_use]
    pub fn is_soft_dirty(&self) -> bool {
        self.soft_dirty
    }

    /// Tiles expanded by each [`PathField::refresh`] while a soft search runs.
    #[must_use]
    pub fn soft_budget(&self) -> usize {
        self.soft_budget
    }

    /// Requests a full recompute on the next refresh.
    ///
    /// A soft search already in flight is restarted against `tiles` so its
    /// result reflects the latest occupancy.
    pub fn mark_dirty(&mut self, tiles: &[TileKind]) {
        self.dirty = true;
        if self.soft_dirty {
            self.search.reset(self.width, tiles);
        }
    }

    /// Starts (or restarts) an incremental recompute against `tiles`.
    pub fn mark_soft_dirty(&mut self, tiles: &[TileKind]) {
        self.soft_dirty = true;
        self.search.reset(self.width, tiles);
    }

    /// Performs the per-tick path maintenance.
    ///
    /// A soft search in flight advances by its budget and publishes once
    /// exhausted, which also satisfies any pending full request. Otherwise a
    /// pending full request runs to completion immediately.
    pub fn refresh(&mut self, tiles: &[TileKind]) {
        if self.soft_dirty {
            for _ in 0..self.soft_budget {
                if !self.search.step(self.width, self.height, tiles) {
                    break;
                }
            }
            if self.search.is_exhausted() {
                self.publish();
                self.soft_dirty = false;
                self.dirty = false;
                debug!("soft path search published");
            }
        } else if self.dirty {
            self.recompute_full(tiles);
        }
    }

    /// Runs a complete search against `tiles` and publishes it.
    pub fn recompute_full(&mut self, tiles: &[TileKind]) {
        self.search.reset(self.width, tiles);
        while self.search.step(self.width, self.height, tiles) {}
        self.publish();
        self.dirty = false;
        self.soft_dirty = false;
        debug!(
            "path field recomputed: {} of {} tiles reach the goal",
            self.dist.iter().filter(|&&distance| distance != NO_TILE).count(),
            self.dist.len()
        );
    }

    fn publish(&mut self) {
        std::mem::swap(&mut self.next, &mut self.search.next);
        std::mem::swap(&mut self.dist, &mut self.search.dist);
    }
}

#[derive(Clone, Debug, Default)]
struct Search {
    next: Vec<usize>,
    dist: Vec<usize>,
    open: Vec<usize>,
    cursor: usize,
}

impl Search {
    fn reset(&mut self, width: usize, tiles: &[TileKind]) {
        self.next.clear();
        self.next.resize(tiles.len(), NO_TILE);
        self.dist.clear();
        self.dist.resize(tiles.len(), NO_TILE);
        self.open.clear();
        self.cursor = 0;

        for (index, tile) in tiles.iter().enumerate().take(width) {
            if tile.passthrough() {
                self.dist[index] = 0;
                self.open.push(index);
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.open.len()
    }

    /// Expands a single tile; returns `false` once the frontier is empty.
    fn step(&mut self, width: usize, height: usize, tiles: &[TileKind]) -> bool {
        let Some(&current) = self.open.get(self.cursor) else {
            return false;
        };
        self.cursor += 1;

        let next_distance = self.dist[current] + 1;
        for neighbor in neighbors(current, width, height).into_iter().flatten() {
            let passable = tiles.get(neighbor).map_or(false, |tile| tile.passthrough());
            if !passable || self.dist[neighbor] != NO_TILE {
                continue;
            }
            self.dist[neighbor] = next_distance;
            self.next[neighbor] = current;
            self.open.push(neighbor);
        }
        true
    }
}

/// Orthogonal neighbours in up, right, down, left order.
fn neighbors(index: usize, width: usize, height: usize) -> [Option<usize>; 4] {
    let column = index % width;
    let row = index / width;
    [
        row.checked_sub(1).map(|row| row * width + column),
        (column + 1 < width).then(|| index + 1),
        (row + 1 < height).then(|| index + width),
        column.checked_sub(1).map(|column| row * width + column),
    ]
}
