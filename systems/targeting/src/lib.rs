#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects tower targets among the units in range.

use std::cmp::Ordering;

use glam::Vec2;
use grid_siege_core::{TargetMode, UnitId};
use rand::Rng;

/// Unit considered by the resolver, captured once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Identifier of the unit.
    pub id: UnitId,
    /// Position of the unit in tile units.
    pub position: Vec2,
    /// Breadth-first distance from the unit's tile to the goal row.
    pub path_distance: usize,
}

/// Parameters of a single targeting query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetRequest {
    /// Centre of the tower footprint.
    pub origin: Vec2,
    /// Range of the tower in tiles.
    pub range: f32,
    /// Policy used to pick among units in range.
    pub mode: TargetMode,
}

impl TargetRequest {
    /// Creates a new targeting request.
    #[must_use]
    pub const fn new(origin: Vec2, range: f32, mode: TargetMode) -> Self {
        Self {
            origin,
            range,
            mode,
        }
    }

    /// Reports whether a position lies within the requested range.
    #[must_use]
    pub fn covers(&self, position: Vec2) -> bool {
        position.distance_squared(self.origin) <= self.range * self.range
    }
}

/// Targeting system that keeps the per-tick candidate list between queries.
#[derive(Debug, Default)]
pub struct TargetResolver {
    candidates: Vec<Candidate>,
}

impl TargetResolver {
    /// Creates a new resolver with an empty candidate list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the candidate list with the units alive this tick.
    pub fn prepare<I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = Candidate>,
    {
        self.candidates.clear();
        self.candidates.extend(candidates);
    }

    /// Candidates captured by the last call to [`TargetResolver::prepare`].
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Selects a target among the prepared candidates.
    pub fn resolve<R>(&self, request: TargetRequest, rng: &mut R) -> Option<UnitId>
    where
        R: Rng + ?Sized,
    {
        select_target(request, self.candidates.iter().copied(), rng)
    }
}

/// Selects a target for the request among the provided candidates.
///
/// Only units whose squared distance to the origin is at most `range²`
/// qualify. Deterministic policies break ties on the smaller unit id, so the
/// result never depends on candidate order. `Random` performs single-pass
/// reservoir sampling and consumes one RNG draw per qualifying unit.
pub fn select_target<I, R>(request: TargetRequest, candidates: I, rng: &mut R) -> Option<UnitId>
where
    I: IntoIterator<Item = Candidate>,
    R: Rng + ?Sized,
{
    let range_sq = request.range * request.range;
    let in_range = candidates.into_iter().filter_map(|candidate| {
        let distance_sq = candidate.position.distance_squared(request.origin);
        (distance_sq <= range_sq).then_some(Scored {
            id: candidate.id,
            distance_sq,
            path_distance: candidate.path_distance,
        })
    });

    if request.mode == TargetMode::Random {
        return sample_uniform(in_range.map(|scored| scored.id), rng);
    }

    let mut best: Option<Scored> = None;
    for current in in_range {
        match &mut best {
            Some(existing) => {
                if current.precedes(existing, request.mode) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }
    best.map(|scored| scored.id)
}

fn sample_uniform<I, R>(ids: I, rng: &mut R) -> Option<UnitId>
where
    I: Iterator<Item = UnitId>,
    R: Rng + ?Sized,
{
    let mut chosen = None;
    let mut seen: u32 = 0;
    for id in ids {
        seen = seen.saturating_add(1);
        if rng.gen_range(0..seen) == 0 {
            chosen = Some(id);
        }
    }
    chosen
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Scored {
    id: UnitId,
    distance_sq: f32,
    path_distance: usize,
}

impl Scored {
    fn precedes(&self, other: &Self, mode: TargetMode) -> bool {
        let ordering = match mode {
            TargetMode::First => self.path_distance.cmp(&other.path_distance),
            TargetMode::Closest => self.distance_sq.total_cmp(&other.distance_sq),
            TargetMode::Farthest => other.distance_sq.total_cmp(&self.distance_sq),
            TargetMode::Random => Ordering::Equal,
        };

        ordering.then_with(|| self.id.cmp(&other.id)) == Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn candidate(id: u32, x: f32, y: f32, path_distance: usize) -> Candidate {
        Candidate {
            id: UnitId::new(id),
            position: Vec2::new(x, y),
            path_distance,
        }
    }

    #[test]
    fn boundary_distance_is_inclusive() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let request = TargetRequest::new(Vec2::ZERO, 2.0, TargetMode::Closest);
        let picked = select_target(request, [candidate(4, 2.0, 0.0, 3)], &mut rng);
        assert_eq!(picked, Some(UnitId::new(4)));
    }

    #[test]
    fn resolver_reuses_prepared_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut resolver = TargetResolver::new();
        resolver.prepare([candidate(1, 1.0, 0.0, 5), candidate(2, 0.5, 0.0, 9)]);
        assert_eq!(resolver.candidates().len(), 2);

        let request = TargetRequest::new(Vec2::ZERO, 3.0, TargetMode::Closest);
        assert_eq!(resolver.resolve(request, &mut rng), Some(UnitId::new(2)));

        resolver.prepare(std::iter::empty());
        assert_eq!(resolver.resolve(request, &mut rng), None);
    }

    #[test]
    fn request_covers_matches_squared_range() {
        let request = TargetRequest::new(Vec2::new(1.0, 1.0), 1.5, TargetMode::First);
        assert!(request.covers(Vec2::new(2.5, 1.0)));
        assert!(!request.covers(Vec2::new(2.5, 2.5)));
    }
}
