#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-driven wave scheduler that spawns units in bunches.
//!
//! A [`Wave`] is a sequence of bunches. Each bunch spawns its unit counts
//! linearly over a fixed duration and is followed by a fixed pause before the
//! next bunch opens. The wave keeps a monotonic cursor of elapsed simulation
//! time and, on every advance, emits exactly the units needed to bring each
//! spawn count up to `round(total * fraction_elapsed)`.

use grid_siege_core::UnitKind;
use log::info;
use serde::Deserialize;

const SPECIES_CYCLE: [UnitKind; 4] = [
    UnitKind::Methane,
    UnitKind::Water,
    UnitKind::Oxygen,
    UnitKind::Ethane,
];

/// Number of units of one kind spawned by a bunch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BunchEntry {
    /// Kind of unit spawned.
    pub kind: UnitKind,
    /// Total number of units spawned over the bunch duration.
    pub count: u32,
}

impl BunchEntry {
    /// Creates a new bunch entry.
    #[must_use]
    pub const fn new(kind: UnitKind, count: u32) -> Self {
        Self { kind, count }
    }
}

/// Group of unit kinds spawned together over a fixed duration.
#[derive(Clone, Debug, PartialEq)]
pub struct Bunch {
    entries: Vec<BunchEntry>,
    duration: f32,
}

impl Bunch {
    /// Creates a bunch spawning `entries` linearly over `duration` seconds.
    ///
    /// Negative durations are treated as zero, which spawns the whole bunch
    /// as soon as it opens.
    #[must_use]
    pub fn new(entries: Vec<BunchEntry>, duration: f32) -> Self {
        Self {
            entries,
            duration: duration.max(0.0),
        }
    }

    /// Unit kinds and totals spawned by the bunch.
    #[must_use]
    pub fn entries(&self) -> &[BunchEntry] {
        &self.entries
    }

    /// Seconds over which the bunch spawns its units.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Total number of units spawned by the bunch.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}

/// State machine spawning a sequence of bunches separated by pauses.
#[derive(Clone, Debug)]
pub struct Wave {
    index: u32,
    bunches: Vec<Bunch>,
    space: f32,
    cursor: f32,
    spawned: Vec<Vec<u32>>,
}

impl Wave {
    /// Creates a wave that pauses `space` seconds after every bunch.
    #[must_use]
    pub fn new(index: u32, bunches: Vec<Bunch>, space: f32) -> Self {
        let spawned = bunches
            .iter()
            .map(|bunch| vec![0; bunch.entries.len()])
            .collect();
        Self {
            index,
            bunches,
            space: space.max(0.0),
            cursor: 0.0,
            spawned,
        }
    }

    /// Index the wave was generated from.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Bunches composing the wave.
    #[must_use]
    pub fn bunches(&self) -> &[Bunch] {
        &self.bunches
    }

    /// Pause inserted after every bunch, in seconds.
    #[must_use]
    pub fn space(&self) -> f32 {
        self.space
    }

    /// Elapsed simulation time since the wave started.
    #[must_use]
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Units of the given bunch entry spawned so far.
    #[must_use]
    pub fn spawned(&self, bunch: usize, entry: usize) -> u32 {
        self.spawned
            .get(bunch)
            .and_then(|counts| counts.get(entry))
            .copied()
            .unwrap_or(0)
    }

    /// Total units spawned so far across every bunch.
    #[must_use]
    pub fn spawned_total(&self) -> u32 {
        self.spawned.iter().flatten().sum()
    }

    /// Total units the wave spawns once complete.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.bunches.iter().map(Bunch::total).sum()
    }

    /// Reports whether every unit of the wave has been spawned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.spawned_total() >= self.total()
    }

    /// Advances the cursor by `dt` seconds and appends due spawns to `out`.
    ///
    /// Bunches whose window has fully elapsed are topped up to their exact
    /// totals, so a single large step never drops units. The bunch whose
    /// window contains the cursor spawns proportionally and ends the scan.
    pub fn advance(&mut self, dt: f32, out: &mut Vec<UnitKind>) {
        self.cursor += dt.max(0.0);

        let mut running = 0.0;
        for (bunch_index, bunch) in self.bunches.iter().enumerate() {
            let end = running + bunch.duration;
            let fraction = if self.cursor >= end {
                1.0
            } else if self.cursor >= running {
                (self.cursor - running) / bunch.duration
            } else {
                break;
            };

            let counts = &mut self.spawned[bunch_index];
            for (entry, spawned) in bunch.entries.iter().zip(counts.iter_mut()) {
                let target = ((entry.count as f32 * fraction).round() as u32).min(entry.count);
                for _ in *spawned..target {
                    out.push(entry.kind);
                }
                *spawned = (*spawned).max(target);
            }

            if fraction < 1.0 {
                break;
            }
            running = end + self.space;
        }
    }
}

/// Balance knobs used by [`gen_wave`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Unit count of wave zero before the `(1+n)*(1+n/4)` growth.
    pub base_size: f32,
    /// Bunch duration of wave zero before the `sqrt(1+n)` growth.
    pub base_duration: f32,
    /// Share of the wave assigned to the primary species.
    pub primary_share: f32,
    /// Pause between bunches in seconds.
    pub space: f32,
    /// Waves above this index also spawn Propane.
    pub propane_unlock: u32,
    /// Waves above this index also spawn a Butane bunch.
    pub butane_unlock: u32,
    /// Heavy units added per wave past their unlock threshold.
    pub heavy_per_wave: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            base_size: 4.0,
            base_duration: 6.0,
            primary_share: 0.6,
            space: 3.0,
            propane_unlock: 10,
            butane_unlock: 20,
            heavy_per_wave: 0.5,
        }
    }
}

/// Deterministically derives the composition of wave `n`.
#[must_use]
pub fn gen_wave(n: u32, tuning: &WaveTuning) -> Wave {
    let level = n as f32;
    let size = tuning.base_size * (1.0 + level) * (1.0 + level / 4.0);
    let duration = tuning.base_duration * (1.0 + level).sqrt();
    let share = tuning.primary_share.clamp(0.0, 1.0);

    let primary = SPECIES_CYCLE[(n % 4) as usize];
    let secondary = SPECIES_CYCLE[((n + 1) % 4) as usize];
    let primary_count = ((size * share).round() as u32).max(1);
    let secondary_count = ((size * (1.0 - share)).round() as u32).max(1);

    let mut bunches = vec![Bunch::new(
        vec![BunchEntry::new(primary, primary_count)],
        duration,
    )];

    let mut second = vec![BunchEntry::new(secondary, secondary_count)];
    if n > tuning.propane_unlock {
        let extra = heavy_count(n - tuning.propane_unlock, tuning.heavy_per_wave);
        second.push(BunchEntry::new(UnitKind::Propane, extra));
    }
    bunches.push(Bunch::new(second, duration));

    if n > tuning.butane_unlock {
        let extra = heavy_count(n - tuning.butane_unlock, tuning.heavy_per_wave);
        bunches.push(Bunch::new(
            vec![BunchEntry::new(UnitKind::Butane, extra)],
            duration * 0.5,
        ));
    }

    Wave::new(n, bunches, tuning.space)
}

fn heavy_count(waves_past_unlock: u32, per_wave: f32) -> u32 {
    ((waves_past_unlock as f32 * per_wave).ceil() as u32).max(1)
}

/// Queue of generated waves advanced together.
///
/// Launching a wave while another is still spawning lets both run side by
/// side. Waves are dropped once every unit has been spawned.
#[derive(Clone, Debug, Default)]
pub struct WaveQueue {
    active: Vec<Wave>,
    next_index: u32,
    tuning: WaveTuning,
}

impl WaveQueue {
    /// Creates an empty queue that generates waves with the given tuning.
    #[must_use]
    pub fn new(tuning: WaveTuning) -> Self {
        Self {
            active: Vec::new(),
            next_index: 0,
            tuning,
        }
    }

    /// Generates and starts the next wave, returning its index.
    pub fn launch(&mut self) -> u32 {
        let index = self.next_index;
        let wave = gen_wave(index, &self.tuning);
        info!(
            "launching wave {index}: {} units over {} bunches",
            wave.total(),
            wave.bunches().len()
        );
        self.active.push(wave);
        self.next_index = self.next_index.saturating_add(1);
        index
    }

    /// Starts a hand-built wave alongside the generated ones.
    pub fn push(&mut self, wave: Wave) {
        self.active.push(wave);
    }

    /// Advances every active wave and drops the ones that finished.
    pub fn advance(&mut self, dt: f32, out: &mut Vec<UnitKind>) {
        for wave in &mut self.active {
            wave.advance(dt, out);
        }
        self.active.retain(|wave| !wave.is_finished());
    }

    /// Waves still spawning units.
    #[must_use]
    pub fn active(&self) -> &[Wave] {
        &self.active
    }

    /// Reports whether no wave is spawning.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of waves launched so far.
    #[must_use]
    pub fn launched(&self) -> u32 {
        self.next_index
    }
}
