//! Projectiles launched by towers.

use glam::Vec2;
use grid_siege_core::{ModelKey, TowerId, UnitId};

/// Flight behaviour of a projectile.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectileKind {
    /// Homes on a single unit and vanishes if the unit is gone.
    Seek {
        /// Unit being chased.
        target: UnitId,
    },
    /// Flies in a straight line and pierces up to `power` units.
    Straight {
        /// Unit-length heading.
        direction: Vec2,
        /// Remaining number of units the projectile may hit.
        power: u32,
        /// Collision radius in tiles.
        radius: f32,
        /// Units already struck, never hit twice.
        hits: Vec<UnitId>,
    },
}

/// Projectile state owned by the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub(crate) kind: ProjectileKind,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) life_time: f32,
    pub(crate) from: TowerId,
    pub(crate) to_remove: bool,
}

impl Projectile {
    /// Creates a homing projectile.
    #[must_use]
    pub fn seek(
        from: TowerId,
        position: Vec2,
        target: UnitId,
        damage: f32,
        speed: f32,
        life_time: f32,
    ) -> Self {
        Self {
            kind: ProjectileKind::Seek { target },
            position,
            speed,
            damage,
            life_time,
            from,
            to_remove: false,
        }
    }

    /// Creates a piercing projectile. `direction` is normalised.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn straight(
        from: TowerId,
        position: Vec2,
        direction: Vec2,
        damage: f32,
        speed: f32,
        power: u32,
        radius: f32,
        life_time: f32,
    ) -> Self {
        Self {
            kind: ProjectileKind::Straight {
                direction: direction.normalize_or_zero(),
                power,
                radius,
                hits: Vec::new(),
            },
            position,
            speed,
            damage,
            life_time,
            from,
            to_remove: false,
        }
    }

    /// Flight behaviour.
    #[must_use]
    pub fn kind(&self) -> &ProjectileKind {
        &self.kind
    }

    /// Position in tile units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Damage dealt per hit.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Seconds left before the projectile expires.
    #[must_use]
    pub fn life_time(&self) -> f32 {
        self.life_time
    }

    /// Tower credited with the damage.
    #[must_use]
    pub fn from(&self) -> TowerId {
        self.from
    }

    /// Reports whether the projectile is flagged for the end-of-tick sweep.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.to_remove
    }

    pub(crate) fn model(&self) -> ModelKey {
        match self.kind {
            ProjectileKind::Seek { .. } => ModelKey::SeekProjectile,
            ProjectileKind::Straight { .. } => ModelKey::StraightProjectile,
        }
    }
}
