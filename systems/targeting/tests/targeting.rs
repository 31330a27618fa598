use glam::Vec2;
use grid_siege_core::{TargetMode, UnitId};
use grid_siege_system_targeting::{select_target, Candidate, TargetRequest, TargetResolver};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn candidate(id: u32, position: (f32, f32), path_distance: usize) -> Candidate {
    Candidate {
        id: UnitId::new(id),
        position: Vec2::new(position.0, position.1),
        path_distance,
    }
}

fn scenario() -> Vec<Candidate> {
    vec![
        candidate(3, (2.0, 0.0), 7),
        candidate(8, (0.0, 1.0), 4),
        candidate(5, (-2.5, 0.0), 9),
        candidate(11, (0.0, -2.9), 12),
        candidate(2, (9.0, 9.0), 1),
    ]
}

#[test]
fn first_prefers_shortest_path_to_goal() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let request = TargetRequest::new(Vec2::ZERO, 3.0, TargetMode::First);

    let picked = select_target(request, scenario(), &mut rng);

    assert_eq!(
        picked,
        Some(UnitId::new(8)),
        "unit 2 is closer to the goal but out of range"
    );
}

#[test]
fn closest_and_farthest_respect_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let closest = TargetRequest::new(Vec2::ZERO, 3.0, TargetMode::Closest);
    assert_eq!(
        select_target(closest, scenario(), &mut rng),
        Some(UnitId::new(8))
    );

    let farthest = TargetRequest::new(Vec2::ZERO, 3.0, TargetMode::Farthest);
    assert_eq!(
        select_target(farthest, scenario(), &mut rng),
        Some(UnitId::new(11)),
        "farthest must still ignore the unit outside range"
    );
}

#[test]
fn no_unit_in_range_yields_none() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for mode in [
        TargetMode::First,
        TargetMode::Closest,
        TargetMode::Farthest,
        TargetMode::Random,
    ] {
        let request = TargetRequest::new(Vec2::new(-20.0, -20.0), 2.0, mode);
        assert_eq!(select_target(request, scenario(), &mut rng), None, "{mode:?}");
    }
}

#[test]
fn deterministic_modes_repeat_and_ignore_candidate_order() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for mode in [TargetMode::First, TargetMode::Closest, TargetMode::Farthest] {
        let request = TargetRequest::new(Vec2::new(0.5, 0.5), 3.5, mode);
        let forward = select_target(request, scenario(), &mut rng);
        let mut reversed = scenario();
        reversed.reverse();
        for _ in 0..10 {
            assert_eq!(select_target(request, scenario(), &mut rng), forward);
            assert_eq!(select_target(request, reversed.clone(), &mut rng), forward);
        }
    }
}

#[test]
fn equal_metric_prefers_smaller_id() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let units = vec![candidate(20, (1.0, 0.0), 4), candidate(10, (-1.0, 0.0), 4)];

    for mode in [TargetMode::First, TargetMode::Closest, TargetMode::Farthest] {
        let request = TargetRequest::new(Vec2::ZERO, 2.0, mode);
        assert_eq!(
            select_target(request, units.clone(), &mut rng),
            Some(UnitId::new(10)),
            "{mode:?}"
        );
    }
}

#[test]
fn random_mode_is_uniform_over_units_in_range() {
    const TRIALS: usize = 10_000;
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_cafe);
    let mut resolver = TargetResolver::new();
    resolver.prepare(scenario());
    let request = TargetRequest::new(Vec2::ZERO, 3.0, TargetMode::Random);

    let in_range = [3_u32, 8, 5, 11];
    let mut counts = [0_usize; 4];
    for _ in 0..TRIALS {
        let picked = resolver
            .resolve(request, &mut rng)
            .expect("units are in range");
        let slot = in_range
            .iter()
            .position(|id| UnitId::new(*id) == picked)
            .expect("random mode picked a unit outside range");
        counts[slot] += 1;
    }

    let expected = TRIALS as f64 / in_range.len() as f64;
    for (id, count) in in_range.iter().zip(counts) {
        let deviation = (count as f64 - expected).abs() / expected;
        assert!(
            deviation < 0.08,
            "unit {id} picked {count} times, expected about {expected}"
        );
    }
}
