//! Fixed-order simulation step.

use std::f32::consts::TAU;

use glam::Vec2;
use grid_siege_core::{Attack, AudioSink, Sound, TileKind, TileRect, TowerId, UnitKind, NO_TILE};
use grid_siege_system_targeting::{Candidate, TargetRequest};
use log::{debug, warn};

use crate::{
    effects::{Effect, EffectKind},
    projectiles::{Projectile, ProjectileKind},
    units::Unit,
    Board, TickSummary,
};

/// Extra reach granted to a seeking projectile when checking for a hit.
const SEEK_HIT_RADIUS: f32 = 0.2;
/// Projectiles live this many times the flight time needed to cross the range.
const PROJECTILE_LIFE_FACTOR: f32 = 2.0;
/// Radians per second a pulse tower spins while idle or firing.
const PULSE_SPIN: f32 = 1.5;

impl Board {
    /// Advances the simulation by `dt` seconds.
    ///
    /// Phases run in a fixed order: pending resize, path refresh, wave
    /// spawns, unit aging and movement, death marking, towers, projectiles,
    /// death resolution, effect aging and finally a single sweep of every
    /// entity flagged for removal. Negative `dt` is treated as zero.
    pub fn update(&mut self, dt: f32, audio: &mut dyn AudioSink) {
        let dt = dt.max(0.0);
        self.tick_index = self.tick_index.saturating_add(1);

        self.apply_pending_resize();
        self.paths.refresh(&self.tiles);
        self.summary = TickSummary::default();

        for _ in 0..std::mem::take(&mut self.pending_launches) {
            audio.play(Sound::WaveLaunched);
        }
        self.advance_waves(dt);

        for (_, unit) in self.units.iter_mut() {
            unit.life_time += dt;
        }
        self.move_units(dt, audio);
        self.mark_deaths();
        self.update_towers(dt, audio);
        self.update_projectiles(dt, audio);
        self.resolve_deaths(audio);
        self.age_effects(dt);
        self.sweep();
    }

    fn apply_pending_resize(&mut self) {
        let Some((columns, rows)) = self.pending_resize.take() else {
            return;
        };
        let old_columns = self.columns as usize;
        debug!(
            "resizing board from {}x{} to {columns}x{rows}",
            self.columns, self.rows
        );

        self.columns = columns;
        self.rows = rows;
        self.tiles.clear();
        self.tiles
            .resize(columns as usize * rows as usize, TileKind::Empty);

        let reindex = |index: usize| -> Option<usize> {
            if index == NO_TILE || old_columns == 0 {
                return None;
            }
            let column = index % old_columns;
            let row = index / old_columns;
            (column < columns as usize && row < rows as usize)
                .then(|| row * columns as usize + column)
        };
        for (_, unit) in self.units.iter_mut() {
            match reindex(unit.current_tile) {
                Some(index) => {
                    unit.current_tile = index;
                    unit.target_tile = reindex(unit.target_tile).unwrap_or(NO_TILE);
                }
                None => unit.to_remove = true,
            }
        }

        let regions: Vec<(TowerId, TileRect)> = self
            .towers
            .iter()
            .map(|(id, tower)| (id, tower.region()))
            .collect();
        for (id, region) in regions {
            if self.check_placement(region).is_ok() {
                self.stamp(region, TileKind::Block);
            } else {
                let _ = self.towers.remove(id);
                warn!("tower {id:?} no longer fits and was removed");
            }
        }

        let bounds = Vec2::new(columns as f32, rows as f32);
        for (_, projectile) in self.projectiles.iter_mut() {
            if !inside(projectile.position, bounds) {
                projectile.to_remove = true;
            }
        }

        self.paths.resize(columns as usize, rows as usize);
    }

    fn advance_waves(&mut self, dt: f32) {
        let mut spawns = std::mem::take(&mut self.spawn_buffer);
        spawns.clear();
        self.waves.advance(dt, &mut spawns);
        for kind in spawns.drain(..) {
            if self.spawn_unit(kind).is_some() {
                self.summary.spawned += 1;
            }
        }
        self.spawn_buffer = spawns;
    }

    fn move_units(&mut self, dt: f32, audio: &mut dyn AudioSink) {
        let columns = self.columns.max(1) as usize;
        let cease = self.config.cease_height as f32;
        let center = |index: usize| {
            Vec2::new((index % columns) as f32 + 0.5, (index / columns) as f32 + 0.5)
        };
        let tiles = &self.tiles;
        let paths = &self.paths;
        // The published field can lag behind placements while a soft pass runs.
        let open_step = |index: usize| {
            let next = paths.next_tile(index);
            let open = tiles.get(next).map_or(false, |tile| tile.passthrough());
            if open {
                next
            } else {
                NO_TILE
            }
        };

        for (_, unit) in self.units.iter_mut() {
            if unit.to_remove {
                continue;
            }

            let next = open_step(unit.current_tile);
            if next != NO_TILE {
                unit.target_tile = next;
            } else if paths.next_tile(unit.current_tile) != NO_TILE
                || !tiles
                    .get(unit.target_tile)
                    .map_or(false, |tile| tile.passthrough())
            {
                unit.target_tile = NO_TILE;
            }

            if unit.target_tile != NO_TILE {
                let goal = center(unit.target_tile);
                let offset = goal - unit.position;
                let distance = offset.length();
                if distance > f32::EPSILON {
                    let step = (unit.speed * dt).min(distance);
                    unit.position += offset / distance * step;
                }

                let last = center(unit.current_tile);
                if unit.position.distance_squared(goal) < unit.position.distance_squared(last) {
                    unit.current_tile = unit.target_tile;
                    unit.target_tile = open_step(unit.current_tile);
                }
            }

            if unit.position.y < cease {
                unit.to_remove = true;
                self.summary.breaches += 1;
                audio.play(Sound::UnitBreached);
            }
        }
    }

    fn mark_deaths(&mut self) {
        for (_, unit) in self.units.iter_mut() {
            if unit.to_remove || unit.health > 0.0 {
                continue;
            }
            unit.to_remove = true;
            unit.to_die = true;
            self.summary.kills += 1;
            self.summary.resources += unit.kind.resource_drop();
        }
    }

    fn update_towers(&mut self, dt: f32, audio: &mut dyn AudioSink) {
        self.pulse_towers(dt);

        let paths = &self.paths;
        self.resolver.prepare(
            self.units
                .iter()
                .filter(|(_, unit)| unit.is_alive())
                .map(|(id, unit)| Candidate {
                    id,
                    position: unit.position,
                    path_distance: paths.dist_tile(unit.current_tile),
                }),
        );

        for (tower_id, tower) in self.towers.iter_mut() {
            let origin = tower.center();
            let range = tower.kind.range();
            let request = TargetRequest::new(origin, range, tower.target_mode);

            let (damage, speed, straight) = match tower.kind.attack() {
                Attack::Pulse { .. } => continue,
                Attack::Seek { damage, speed } => (damage, speed, None),
                Attack::Straight {
                    damage,
                    speed,
                    power,
                    radius,
                } => (damage, speed, Some((power, radius))),
            };

            tower.cooldown = (tower.cooldown - dt).max(0.0);
            let target_valid = tower
                .target
                .and_then(|id| self.units.get(id))
                .map_or(false, |unit| unit.is_alive() && request.covers(unit.position));
            if !target_valid || tower.cooldown <= 0.0 {
                tower.target = self.resolver.resolve(request, &mut self.rng);
            }

            if tower.cooldown > 0.0 {
                continue;
            }
            let Some(target) = tower.target else {
                continue;
            };
            let Some(unit) = self.units.get(target) else {
                continue;
            };

            let aim = unit.position - origin;
            let life_time = range / speed.max(f32::EPSILON) * PROJECTILE_LIFE_FACTOR;
            let projectile = match straight {
                None => Projectile::seek(tower_id, origin, target, damage, speed, life_time),
                Some((power, radius)) => Projectile::straight(
                    tower_id, origin, aim, damage, speed, power, radius, life_time,
                ),
            };
            let _ = self.projectiles.push_back(projectile);

            tower.rotation = aim.y.atan2(aim.x);
            tower.cooldown = tower.kind.cooldown();
            audio.play(Sound::TowerFired(tower.kind));
        }
    }

    /// Continuous attacks land before discrete towers pick their targets.
    fn pulse_towers(&mut self, dt: f32) {
        for (_, tower) in self.towers.iter_mut() {
            let Attack::Pulse { damage_per_second } = tower.kind.attack() else {
                continue;
            };
            let request = TargetRequest::new(tower.center(), tower.kind.range(), tower.target_mode);
            tower.rotation = (tower.rotation + PULSE_SPIN * dt).rem_euclid(TAU);
            for (_, unit) in self.units.iter_mut() {
                if unit.is_alive() && request.covers(unit.position) {
                    tower.damage_dealt += unit.apply_damage(damage_per_second * dt);
                }
            }
        }
    }

    fn update_projectiles(&mut self, dt: f32, audio: &mut dyn AudioSink) {
        let bounds = Vec2::new(self.columns as f32, self.rows as f32);
        let spark = self.config.effect_duration * 0.5;

        for (_, projectile) in self.projectiles.iter_mut() {
            if projectile.to_remove {
                continue;
            }
            projectile.life_time -= dt;
            if projectile.life_time <= 0.0 {
                projectile.to_remove = true;
                continue;
            }

            let step = projectile.speed * dt;
            let dealt = match &mut projectile.kind {
                ProjectileKind::Seek { target } => {
                    let Some(unit) = self.units.get_mut(*target).filter(|unit| unit.is_alive())
                    else {
                        projectile.to_remove = true;
                        continue;
                    };

                    let offset = unit.position - projectile.position;
                    let distance = offset.length();
                    if distance > step + SEEK_HIT_RADIUS {
                        projectile.position += offset / distance * step;
                        continue;
                    }

                    projectile.position = unit.position;
                    projectile.to_remove = true;
                    unit.apply_damage(projectile.damage)
                }
                ProjectileKind::Straight {
                    direction,
                    power,
                    radius,
                    hits,
                } => {
                    projectile.position += *direction * step;
                    if !inside(projectile.position, bounds) {
                        projectile.to_remove = true;
                        continue;
                    }

                    let reach = *radius * *radius;
                    let position = projectile.position;
                    let struck = self.units.iter_mut().find(|(id, unit)| {
                        unit.is_alive()
                            && !hits.contains(id)
                            && unit.position.distance_squared(position) <= reach
                    });
                    let Some((unit_id, unit)) = struck else {
                        continue;
                    };

                    hits.push(unit_id);
                    *power = power.saturating_sub(1);
                    if *power == 0 {
                        projectile.to_remove = true;
                    }
                    unit.apply_damage(projectile.damage)
                }
            };

            if let Some(tower) = self.towers.get_mut(projectile.from) {
                tower.damage_dealt += dealt;
            }
            let _ = self
                .effects
                .push_back(Effect::new(EffectKind::Spark, projectile.position, spark));
            audio.play(Sound::ProjectileHit);
        }
    }

    fn resolve_deaths(&mut self, audio: &mut dyn AudioSink) {
        let dying: Vec<(UnitKind, Vec2, usize)> = self
            .units
            .iter_mut()
            .filter(|(_, unit)| unit.to_die)
            .map(|(_, unit)| {
                unit.to_die = false;
                (unit.kind, unit.position, unit.current_tile)
            })
            .collect();

        for (kind, position, tile) in dying {
            audio.play(Sound::UnitDied(kind));
            let _ = self.effects.push_back(Effect::new(
                EffectKind::Burst,
                position,
                self.config.effect_duration,
            ));

            if let Some((child, count)) = kind.split_on_death() {
                for _ in 0..count {
                    let _ = self.units.push_back(Unit::new(child, position, tile));
                    self.summary.spawned += 1;
                }
            }
        }
    }

    fn age_effects(&mut self, dt: f32) {
        for (_, effect) in self.effects.iter_mut() {
            effect.age += dt;
        }
    }

    fn sweep(&mut self) {
        let _ = self.units.sweep(|unit| unit.to_remove);
        let _ = self.projectiles.sweep(|projectile| projectile.to_remove);
        let _ = self.effects.sweep(Effect::is_expired);
    }
}

fn inside(position: Vec2, bounds: Vec2) -> bool {
    position.x >= 0.0 && position.y >= 0.0 && position.x < bounds.x && position.y < bounds.y
}
