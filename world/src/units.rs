//! Units walking the path field toward the goal row.

use glam::Vec2;
use grid_siege_core::{UnitKind, NO_TILE};

/// Unit state owned by the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub(crate) kind: UnitKind,
    pub(crate) position: Vec2,
    pub(crate) current_tile: usize,
    pub(crate) target_tile: usize,
    pub(crate) speed: f32,
    pub(crate) health: f32,
    pub(crate) life_time: f32,
    pub(crate) to_remove: bool,
    pub(crate) to_die: bool,
}

impl Unit {
    /// Creates a unit with the kind's base stats standing on `tile`.
    #[must_use]
    pub fn new(kind: UnitKind, position: Vec2, tile: usize) -> Self {
        Self {
            kind,
            position,
            current_tile: tile,
            target_tile: NO_TILE,
            speed: kind.speed(),
            health: kind.max_health(),
            life_time: 0.0,
            to_remove: false,
            to_die: false,
        }
    }

    /// Species of the unit.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Position in tile units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Tile the unit currently stands on.
    #[must_use]
    pub fn current_tile(&self) -> usize {
        self.current_tile
    }

    /// Tile the unit walks toward, or [`NO_TILE`] while holding position.
    #[must_use]
    pub fn target_tile(&self) -> usize {
        self.target_tile
    }

    /// Movement speed in tiles per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Seconds the unit has been on the board.
    #[must_use]
    pub fn life_time(&self) -> f32 {
        self.life_time
    }

    /// Reports whether the unit is flagged for the end-of-tick sweep.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.to_remove
    }

    /// Reports whether the unit can still be targeted and damaged.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.to_remove && self.health > 0.0
    }

    /// Overrides the remaining health.
    pub fn set_health(&mut self, health: f32) {
        self.health = health;
    }

    /// Overrides the movement speed. Negative values are treated as zero.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Subtracts damage, returning the amount actually absorbed.
    pub(crate) fn apply_damage(&mut self, amount: f32) -> f32 {
        let absorbed = amount.max(0.0).min(self.health.max(0.0));
        self.health -= amount.max(0.0);
        absorbed
    }
}
