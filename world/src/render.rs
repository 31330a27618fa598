//! Emission of draw commands describing the board.

use glam::Vec2;
use grid_siege_core::{Color, ModelKey, RenderCommand, RenderSink, NO_TILE};

use crate::{effects::EffectKind, projectiles::ProjectileKind, Board};

const UNIT_SCALE: f32 = 0.45;
const PROJECTILE_SCALE: f32 = 0.2;
const BURST_RADIUS: f32 = 0.6;
const SPARK_RADIUS: f32 = 0.25;

const PATH_COLOR: Color = Color::new(0.3, 0.6, 1.0, 0.6);
const RANGE_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.25);
const BURST_COLOR: Color = Color::new(1.0, 0.55, 0.1, 1.0);
const SPARK_COLOR: Color = Color::new(1.0, 1.0, 0.6, 1.0);

/// Optional overlays emitted alongside the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw an arrow from every reachable tile to its successor.
    pub show_paths: bool,
    /// Draw the range of every tower.
    pub show_ranges: bool,
}

impl Board {
    /// Pushes the draw commands for the current state into `sink`.
    ///
    /// Tiles come first in row-major order, followed by towers, units,
    /// projectiles and effects, each in pool order.
    pub fn render(&self, sink: &mut dyn RenderSink, options: RenderOptions) {
        for (index, kind) in self.tiles.iter().enumerate() {
            sink.push(RenderCommand::Tile {
                coord: self.tile_coord(index),
                kind: *kind,
            });
        }

        if options.show_paths {
            for (index, &next) in self.paths.next_tiles().iter().enumerate() {
                if next == NO_TILE {
                    continue;
                }
                sink.push(RenderCommand::Arrow {
                    from: self.tile_coord(index).center(),
                    to: self.tile_coord(next).center(),
                    color: PATH_COLOR,
                });
            }
        }

        for (_, tower) in self.towers.iter() {
            let center = tower.center();
            sink.push(RenderCommand::Model {
                model: ModelKey::Tower(tower.kind),
                position: center,
                rotation: tower.rotation,
                scale: tower.kind.footprint().width() as f32,
            });
            if options.show_ranges {
                sink.push(RenderCommand::Circle {
                    center,
                    radius: tower.kind.range(),
                    color: RANGE_COLOR,
                });
            }
        }

        for (_, unit) in self.units.iter() {
            let heading = self.heading(unit.position, unit.target_tile);
            sink.push(RenderCommand::Model {
                model: ModelKey::Unit(unit.kind),
                position: unit.position,
                rotation: heading,
                scale: UNIT_SCALE,
            });
        }

        for (_, projectile) in self.projectiles.iter() {
            let rotation = match &projectile.kind {
                ProjectileKind::Straight { direction, .. } => angle(*direction),
                ProjectileKind::Seek { target } => self
                    .units
                    .get(*target)
                    .map(|unit| angle(unit.position - projectile.position))
                    .unwrap_or(0.0),
            };
            sink.push(RenderCommand::Model {
                model: projectile.model(),
                position: projectile.position,
                rotation,
                scale: PROJECTILE_SCALE,
            });
        }

        for (_, effect) in self.effects.iter() {
            let (radius, base) = match effect.kind {
                EffectKind::Burst => (BURST_RADIUS, BURST_COLOR),
                EffectKind::Spark => (SPARK_RADIUS, SPARK_COLOR),
            };
            let progress = effect.progress();
            sink.push(RenderCommand::Circle {
                center: effect.position,
                radius: radius * (0.5 + progress),
                color: Color {
                    alpha: base.alpha * (1.0 - progress),
                    ..base
                },
            });
        }
    }

    fn heading(&self, position: Vec2, target_tile: usize) -> f32 {
        if target_tile == NO_TILE {
            return 0.0;
        }
        angle(self.tile_coord(target_tile).center() - position)
    }
}

fn angle(direction: Vec2) -> f32 {
    direction.y.atan2(direction.x)
}
