#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Grid Siege.
//!
//! The [`Board`] owns the tile grid, the entity pools, the path field, the
//! wave queue and the random number generator. Mutations go through the
//! methods on [`Board`]; read access for adapters lives in [`query`].

mod config;
mod effects;
mod navigation;
mod pool;
mod projectiles;
mod render;
mod tick;
mod towers;
mod units;

use grid_siege_core::{
    EffectId, ProjectileId, TargetMode, TileCoord, TileKind, TileRect, TowerId, TowerKind,
    UnitId, UnitKind, NO_TILE,
};
use grid_siege_system_targeting::TargetResolver;
use grid_siege_system_waves::{Wave, WaveQueue};
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use config::{BoardConfig, ConfigError, PathRefresh};
pub use effects::{Effect, EffectKind};
pub use navigation::PathField;
pub use pool::Pool;
pub use projectiles::{Projectile, ProjectileKind};
pub use render::RenderOptions;
pub use towers::Tower;
pub use units::Unit;

/// Reasons a tower footprint cannot be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The footprint covers no tiles.
    #[error("footprint is empty")]
    EmptyFootprint,
    /// Part of the footprint lies outside the board.
    #[error("footprint at ({column}, {row}) leaves the board")]
    OutOfBounds {
        /// Column of the offending origin.
        column: u32,
        /// Row of the offending origin.
        row: u32,
    },
    /// The footprint touches the spawn or cease zone.
    #[error("footprint overlaps a reserved zone")]
    ReservedZone,
    /// A tile of the footprint is already blocked.
    #[error("tile ({column}, {row}) is already occupied")]
    Occupied {
        /// Column of the blocked tile.
        column: u32,
        /// Row of the blocked tile.
        row: u32,
    },
    /// A unit stands on or walks toward a tile of the footprint.
    #[error("unit {unit:?} is in the way")]
    UnitInTheWay {
        /// Offending unit.
        unit: UnitId,
    },
}

/// Aggregate outcome of the most recent tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TickSummary {
    /// Resources dropped by units killed this tick.
    pub resources: u32,
    /// Units that reached the cease zone this tick.
    pub breaches: u32,
    /// Units killed this tick.
    pub kills: u32,
    /// Units spawned this tick, by waves or by splitting.
    pub spawned: u32,
}

/// Tower-defense board simulated one tick at a time.
#[derive(Debug)]
pub struct Board {
    config: BoardConfig,
    columns: u32,
    rows: u32,
    pending_resize: Option<(u32, u32)>,
    tiles: Vec<TileKind>,
    paths: PathField,
    units: Pool<UnitId, Unit>,
    towers: Pool<TowerId, Tower>,
    projectiles: Pool<ProjectileId, Projectile>,
    effects: Pool<EffectId, Effect>,
    waves: WaveQueue,
    resolver: TargetResolver,
    rng: ChaCha8Rng,
    summary: TickSummary,
    spawn_buffer: Vec<UnitKind>,
    pending_launches: u32,
    tick_index: u64,
}

impl Board {
    /// Creates an empty board from a validated configuration.
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let columns = config.columns;
        let rows = config.rows;
        let count = columns as usize * rows as usize;

        Ok(Self {
            columns,
            rows,
            pending_resize: None,
            tiles: vec![TileKind::Empty; count],
            paths: PathField::new(columns as usize, rows as usize, config.soft_path_budget),
            units: Pool::new(),
            towers: Pool::new(),
            projectiles: Pool::new(),
            effects: Pool::new(),
            waves: WaveQueue::new(config.waves.clone()),
            resolver: TargetResolver::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            summary: TickSummary::default(),
            spawn_buffer: Vec::new(),
            pending_launches: 0,
            tick_index: 0,
            config,
        })
    }

    /// Index of the tile at `coord`, if it lies on the board.
    #[must_use]
    pub fn tile_index(&self, coord: TileCoord) -> Option<usize> {
        (coord.column() < self.columns && coord.row() < self.rows)
            .then(|| coord.row() as usize * self.columns as usize + coord.column() as usize)
    }

    /// Coordinate of the tile stored at `index`.
    #[must_use]
    pub fn tile_coord(&self, index: usize) -> TileCoord {
        let columns = self.columns.max(1) as usize;
        TileCoord::new((index % columns) as u32, (index / columns) as u32)
    }

    /// Explains why a footprint cannot be placed, if it cannot.
    pub fn check_placement(&self, rect: TileRect) -> Result<(), PlacementError> {
        let size = rect.size();
        if size.width() == 0 || size.height() == 0 {
            return Err(PlacementError::EmptyFootprint);
        }

        let origin = rect.origin();
        let right = origin.column().checked_add(size.width());
        let bottom = origin.row().checked_add(size.height());
        let inside = matches!(
            (right, bottom),
            (Some(right), Some(bottom)) if right <= self.columns && bottom <= self.rows
        );
        if !inside {
            return Err(PlacementError::OutOfBounds {
                column: origin.column(),
                row: origin.row(),
            });
        }

        let bottom = origin.row() + size.height();
        if origin.row() < self.config.cease_height || bottom > self.spawn_row() {
            return Err(PlacementError::ReservedZone);
        }

        for coord in rect.tiles() {
            let blocked = self
                .tile_index(coord)
                .map_or(true, |index| !self.tiles[index].passthrough());
            if blocked {
                return Err(PlacementError::Occupied {
                    column: coord.column(),
                    row: coord.row(),
                });
            }
        }

        for (id, unit) in self.units.iter() {
            if unit.is_removed() {
                continue;
            }
            let in_the_way = [unit.current_tile, unit.target_tile]
                .into_iter()
                .filter(|&index| index != NO_TILE)
                .any(|index| rect.contains(self.tile_coord(index)));
            if in_the_way {
                return Err(PlacementError::UnitInTheWay { unit: id });
            }
        }

        Ok(())
    }

    /// Reports whether a footprint can be placed.
    #[must_use]
    pub fn can_place_at(&self, rect: TileRect) -> bool {
        self.check_placement(rect).is_ok()
    }

    /// Places a tower and invalidates the path field.
    ///
    /// Callers are expected to have checked the footprint with
    /// [`Board::can_place_at`].
    pub fn insert_tower(
        &mut self,
        kind: TowerKind,
        origin: TileCoord,
        target_mode: TargetMode,
    ) -> TowerId {
        let tower = Tower::new(kind, origin, target_mode);
        debug_assert!(
            self.can_place_at(tower.region()),
            "tower {kind:?} placed on an invalid footprint at {origin:?}"
        );

        self.stamp(tower.region(), TileKind::Block);
        let id = self.towers.push_back(tower);
        self.invalidate_paths();
        info!("placed {kind:?} tower {id:?} at ({}, {})", origin.column(), origin.row());
        id
    }

    /// Removes a tower and frees its tiles.
    pub fn remove_tower(&mut self, id: TowerId) -> Option<Tower> {
        let tower = self.towers.remove(id)?;
        self.stamp(tower.region(), TileKind::Empty);
        self.invalidate_paths();
        info!("removed {:?} tower {id:?}", tower.kind);
        Some(tower)
    }

    /// Removes the tower covering `coord`, if any.
    pub fn remove_tower_at(&mut self, coord: TileCoord) -> Option<Tower> {
        let id = query::tower_at(self, coord)?;
        self.remove_tower(id)
    }

    /// Replaces a tower with its upgraded kind at the same origin.
    ///
    /// Returns the id of the new tower, or `None` when the tower does not
    /// exist or has no upgrade. The target mode carries over.
    pub fn upgrade_tower(&mut self, id: TowerId) -> Option<TowerId> {
        let tower = self.towers.get(id)?;
        let upgraded = tower.kind.upgrade()?;
        let origin = tower.origin;
        let mode = tower.target_mode;

        let _ = self.remove_tower(id)?;
        Some(self.insert_tower(upgraded, origin, mode))
    }

    /// Changes the targeting policy of a tower. Returns `false` if it is gone.
    pub fn set_target_mode(&mut self, id: TowerId, mode: TargetMode) -> bool {
        match self.towers.get_mut(id) {
            Some(tower) => {
                tower.target_mode = mode;
                tower.target = None;
                true
            }
            None => false,
        }
    }

    /// Spawns a unit on a random passthrough tile of the spawn zone.
    ///
    /// Returns `None` when every spawn tile is blocked.
    pub fn spawn_unit(&mut self, kind: UnitKind) -> Option<UnitId> {
        let first = self.spawn_row() as usize * self.columns as usize;
        let open: Vec<usize> = (first..self.tiles.len())
            .filter(|&index| self.tiles[index].passthrough())
            .collect();
        if open.is_empty() {
            warn!("no open spawn tile for {kind:?}");
            return None;
        }

        let index = open[self.rng.gen_range(0..open.len())];
        Some(self.push_unit(kind, index))
    }

    /// Spawns a unit at `coord`, clamped onto the board.
    ///
    /// Returns `None` when the clamped tile is blocked.
    pub fn spawn_unit_at(&mut self, kind: UnitKind, coord: TileCoord) -> Option<UnitId> {
        let clamped = TileCoord::new(
            coord.column().min(self.columns - 1),
            coord.row().min(self.rows - 1),
        );
        if clamped != coord {
            warn!(
                "spawn at ({}, {}) clamped to ({}, {})",
                coord.column(),
                coord.row(),
                clamped.column(),
                clamped.row()
            );
        }

        let index = self.tile_index(clamped)?;
        if !self.tiles[index].passthrough() {
            warn!("cannot spawn {kind:?} on a blocked tile");
            return None;
        }
        Some(self.push_unit(kind, index))
    }

    /// Mutable access to a unit, for scripted scenarios.
    #[must_use]
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id)
    }

    /// Adds a projectile to the board.
    pub fn spawn_projectile(&mut self, projectile: Projectile) -> ProjectileId {
        self.projectiles.push_back(projectile)
    }

    /// Generates and starts the next wave, returning its index.
    pub fn launch_wave(&mut self) -> u32 {
        self.pending_launches = self.pending_launches.saturating_add(1);
        self.waves.launch()
    }

    /// Starts a hand-built wave alongside the generated ones.
    pub fn push_wave(&mut self, wave: Wave) {
        self.pending_launches = self.pending_launches.saturating_add(1);
        self.waves.push(wave);
    }

    /// Requests new board dimensions, applied at the start of the next tick.
    ///
    /// Towers that no longer fit are dropped, as are units standing outside
    /// the new bounds.
    pub fn resize(&mut self, columns: u32, rows: u32) -> Result<(), ConfigError> {
        self.config.validate_dimensions(columns, rows)?;
        self.pending_resize = Some((columns, rows));
        Ok(())
    }

    /// First row of the spawn zone.
    fn spawn_row(&self) -> u32 {
        self.rows.saturating_sub(self.config.spawn_height)
    }

    fn push_unit(&mut self, kind: UnitKind, index: usize) -> UnitId {
        let position = self.tile_coord(index).center();
        self.units.push_back(Unit::new(kind, position, index))
    }

    fn stamp(&mut self, region: TileRect, kind: TileKind) {
        for coord in region.tiles() {
            if let Some(index) = self.tile_index(coord) {
                self.tiles[index] = kind;
            }
        }
    }

    fn invalidate_paths(&mut self) {
        match self.config.path_refresh {
            PathRefresh::Immediate => self.paths.mark_dirty(&self.tiles),
            PathRefresh::Incremental => self.paths.mark_soft_dirty(&self.tiles),
        }
    }
}

/// Read-only views of the board for adapters and tests.
pub mod query {
    use std::ops::Range;

    use grid_siege_core::{EffectId, ProjectileId, TileCoord, TileKind, TowerId, UnitId};
    use grid_siege_system_waves::WaveQueue;

    use super::{Board, BoardConfig, Effect, PathField, Pool, Projectile, TickSummary, Tower, Unit};

    /// Board dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(board: &Board) -> (u32, u32) {
        (board.columns, board.rows)
    }

    /// Configuration the board was created with.
    #[must_use]
    pub fn config(board: &Board) -> &BoardConfig {
        &board.config
    }

    /// Tile kinds in row-major order.
    #[must_use]
    pub fn tiles(board: &Board) -> &[TileKind] {
        &board.tiles
    }

    /// Kind of the tile at `coord`, if it lies on the board.
    #[must_use]
    pub fn tile_kind(board: &Board, coord: TileCoord) -> Option<TileKind> {
        board.tile_index(coord).map(|index| board.tiles[index])
    }

    /// Published path field.
    #[must_use]
    pub fn paths(board: &Board) -> &PathField {
        &board.paths
    }

    /// Live units.
    #[must_use]
    pub fn units(board: &Board) -> &Pool<UnitId, Unit> {
        &board.units
    }

    /// Live towers.
    #[must_use]
    pub fn towers(board: &Board) -> &Pool<TowerId, Tower> {
        &board.towers
    }

    /// Live projectiles.
    #[must_use]
    pub fn projectiles(board: &Board) -> &Pool<ProjectileId, Projectile> {
        &board.projectiles
    }

    /// Live effects.
    #[must_use]
    pub fn effects(board: &Board) -> &Pool<EffectId, Effect> {
        &board.effects
    }

    /// Tower covering `coord`, if any.
    #[must_use]
    pub fn tower_at(board: &Board, coord: TileCoord) -> Option<TowerId> {
        board
            .towers
            .iter()
            .find(|(_, tower)| tower.region().contains(coord))
            .map(|(id, _)| id)
    }

    /// Waves currently spawning.
    #[must_use]
    pub fn waves(board: &Board) -> &WaveQueue {
        &board.waves
    }

    /// Outcome of the most recent tick.
    #[must_use]
    pub fn summary(board: &Board) -> TickSummary {
        board.summary
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(board: &Board) -> u64 {
        board.tick_index
    }

    /// Rows of the spawn zone.
    #[must_use]
    pub fn spawn_zone(board: &Board) -> Range<u32> {
        board.spawn_row()..board.rows
    }

    /// Rows of the cease zone, where units breach.
    #[must_use]
    pub fn cease_zone(board: &Board) -> Range<u32> {
        0..board.config.cease_height.min(board.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_siege_core::TileRectSize;

    fn board(columns: u32, rows: u32) -> Board {
        Board::new(BoardConfig {
            columns,
            rows,
            spawn_height: 1,
            cease_height: 1,
            ..BoardConfig::default()
        })
        .expect("valid config")
    }

    fn single(column: u32, row: u32) -> TileRect {
        TileRect::from_origin_and_size(TileCoord::new(column, row), TileRectSize::new(1, 1))
    }

    #[test]
    fn placement_rejects_zones_bounds_and_occupied_tiles() {
        let mut board = board(5, 6);
        assert_eq!(board.check_placement(single(2, 0)), Err(PlacementError::ReservedZone));
        assert_eq!(board.check_placement(single(2, 5)), Err(PlacementError::ReservedZone));
        assert!(matches!(
            board.check_placement(single(5, 2)),
            Err(PlacementError::OutOfBounds { .. })
        ));

        let _ = board.insert_tower(TowerKind::Mirror, TileCoord::new(2, 2), TargetMode::First);
        assert_eq!(
            board.check_placement(single(2, 2)),
            Err(PlacementError::Occupied { column: 2, row: 2 })
        );
        assert!(board.can_place_at(single(1, 2)));
    }

    #[test]
    fn volter_footprint_must_fit_entirely() {
        let board = board(5, 6);
        let rect = TileRect::from_origin_and_size(TileCoord::new(4, 2), TowerKind::Volter.footprint());
        assert!(matches!(
            board.check_placement(rect),
            Err(PlacementError::OutOfBounds { column: 4, row: 2 })
        ));
    }

    #[test]
    fn units_block_placement_on_their_tiles() {
        let mut board = board(5, 6);
        let unit = board
            .spawn_unit_at(UnitKind::Methane, TileCoord::new(1, 3))
            .expect("open tile");
        assert_eq!(
            board.check_placement(single(1, 3)),
            Err(PlacementError::UnitInTheWay { unit })
        );
    }

    #[test]
    fn tower_lifecycle_flips_tiles() {
        let mut board = board(6, 6);
        let id = board.insert_tower(TowerKind::Volter, TileCoord::new(1, 2), TargetMode::First);
        for coord in [(1, 2), (2, 2), (1, 3), (2, 3)] {
            let coord = TileCoord::new(coord.0, coord.1);
            assert_eq!(query::tile_kind(&board, coord), Some(TileKind::Block));
            assert_eq!(query::tower_at(&board, coord), Some(id));
        }

        let removed = board.remove_tower_at(TileCoord::new(2, 3)).expect("tower present");
        assert_eq!(removed.kind(), TowerKind::Volter);
        assert_eq!(query::tile_kind(&board, TileCoord::new(2, 3)), Some(TileKind::Empty));
        assert!(board.remove_tower(id).is_none());
    }

    #[test]
    fn upgrade_keeps_origin_and_mode() {
        let mut board = board(5, 6);
        let id = board.insert_tower(TowerKind::Sharp, TileCoord::new(3, 2), TargetMode::Farthest);
        let upgraded = board.upgrade_tower(id).expect("sharp upgrades");

        assert!(!query::towers(&board).exist(id));
        let tower = query::towers(&board).get(upgraded).expect("new tower");
        assert_eq!(tower.kind(), TowerKind::Sharp2);
        assert_eq!(tower.origin(), TileCoord::new(3, 2));
        assert_eq!(tower.target_mode(), TargetMode::Farthest);
        assert_eq!(board.upgrade_tower(upgraded), None);
    }

    #[test]
    fn set_target_mode_reports_missing_towers() {
        let mut board = board(5, 6);
        let id = board.insert_tower(TowerKind::Mirror, TileCoord::new(0, 2), TargetMode::First);
        assert!(board.set_target_mode(id, TargetMode::Random));
        assert_eq!(
            query::towers(&board).get(id).map(Tower::target_mode),
            Some(TargetMode::Random)
        );
        let _ = board.remove_tower(id);
        assert!(!board.set_target_mode(id, TargetMode::Closest));
    }

    #[test]
    fn spawn_unit_uses_the_spawn_zone() {
        let mut board = board(5, 6);
        for _ in 0..20 {
            let id = board.spawn_unit(UnitKind::Water).expect("spawn zone is open");
            let unit = query::units(&board).get(id).expect("spawned");
            assert!(query::spawn_zone(&board).contains(&board.tile_coord(unit.current_tile()).row()));
        }
    }

    #[test]
    fn spawn_unit_at_clamps_onto_the_board() {
        let mut board = board(5, 6);
        let id = board
            .spawn_unit_at(UnitKind::Oxygen, TileCoord::new(40, 40))
            .expect("clamped tile is open");
        let unit = query::units(&board).get(id).expect("spawned");
        assert_eq!(board.tile_coord(unit.current_tile()), TileCoord::new(4, 5));
        assert_eq!(unit.position(), TileCoord::new(4, 5).center());
    }

    #[test]
    fn resize_is_validated_and_deferred() {
        let mut board = board(5, 6);
        assert!(board.resize(0, 4).is_err());
        assert_eq!(board.resize(8, 9), Ok(()));
        assert_eq!(query::dimensions(&board), (5, 6));
    }

    #[test]
    fn board_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Board>();
    }
}
