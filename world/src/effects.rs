//! Short-lived visual effects.

use glam::Vec2;

/// Visual flavour of an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Expanding ring left by a dying unit.
    Burst,
    /// Small flash where a projectile struck.
    Spark,
}

/// Effect state owned by the board.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub(crate) kind: EffectKind,
    pub(crate) position: Vec2,
    pub(crate) age: f32,
    pub(crate) duration: f32,
}

impl Effect {
    pub(crate) fn new(kind: EffectKind, position: Vec2, duration: f32) -> Self {
        Self {
            kind,
            position,
            age: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Visual flavour.
    #[must_use]
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Position in tile units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Completion in the range 0.0..=1.0.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.age / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Reports whether the effect has played out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.age >= self.duration
    }
}
