//! Towers stamped onto the board.

use glam::Vec2;
use grid_siege_core::{TargetMode, TileCoord, TileRect, TowerKind, UnitId};

/// Tower state owned by the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    pub(crate) kind: TowerKind,
    pub(crate) origin: TileCoord,
    pub(crate) target_mode: TargetMode,
    pub(crate) target: Option<UnitId>,
    pub(crate) cooldown: f32,
    pub(crate) rotation: f32,
    pub(crate) damage_dealt: f32,
}

impl Tower {
    pub(crate) fn new(kind: TowerKind, origin: TileCoord, target_mode: TargetMode) -> Self {
        Self {
            kind,
            origin,
            target_mode,
            target: None,
            cooldown: 0.0,
            rotation: 0.0,
            damage_dealt: 0.0,
        }
    }

    /// Kind of the tower.
    #[must_use]
    pub fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Top-left tile of the footprint.
    #[must_use]
    pub fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Tiles covered by the tower.
    #[must_use]
    pub fn region(&self) -> TileRect {
        TileRect::from_origin_and_size(self.origin, self.kind.footprint())
    }

    /// Centre of the footprint, where projectiles are launched from.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.region().center()
    }

    /// Targeting policy.
    #[must_use]
    pub fn target_mode(&self) -> TargetMode {
        self.target_mode
    }

    /// Unit the tower is currently aiming at.
    #[must_use]
    pub fn target(&self) -> Option<UnitId> {
        self.target
    }

    /// Seconds until the tower may fire again.
    #[must_use]
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Facing of the turret in radians.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Total damage absorbed by units hit by this tower.
    #[must_use]
    pub fn damage_dealt(&self) -> f32 {
        self.damage_dealt
    }
}
