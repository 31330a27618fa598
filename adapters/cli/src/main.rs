#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for Grid Siege.
//!
//! Builds a board from an optional TOML config, places a tower layout,
//! launches waves at a fixed interval and prints what happened.

mod layout;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use grid_siege_core::{AudioSink, Sound};
use grid_siege_rendering::{AsciiBackend, FrameRecorder, RenderingBackend};
use grid_siege_world::{query, Board, PathRefresh, RenderOptions};
use log::info;

use crate::layout::{apply_layout, parse_layout, CliConfig};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "grid-siege", about = "Runs a headless Grid Siege simulation.")]
struct Cli {
    /// TOML file with `[board]` settings and `[[towers]]` entries.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Extra towers as `kind@column,row[:mode]` separated by `;`.
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<String>,
    /// Number of waves to launch.
    #[arg(long, default_value_t = 3)]
    waves: u32,
    /// Seconds between wave launches.
    #[arg(long, default_value_t = 20.0)]
    wave_interval: f32,
    /// Hard limit on simulated seconds.
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,
    /// Fixed timestep in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Overrides the configured RNG seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the configured board width.
    #[arg(long)]
    columns: Option<u32>,
    /// Overrides the configured board height.
    #[arg(long)]
    rows: Option<u32>,
    /// Spreads path recomputation over several ticks.
    #[arg(long)]
    incremental: bool,
    /// Prints the final board as ASCII.
    #[arg(long)]
    ascii: bool,
}

/// Counts sound cues instead of playing them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SoundTally {
    fired: u32,
    hits: u32,
    deaths: u32,
    breaches: u32,
    waves: u32,
}

impl AudioSink for SoundTally {
    fn play(&mut self, sound: Sound) {
        let counter = match sound {
            Sound::TowerFired(_) => &mut self.fired,
            Sound::ProjectileHit => &mut self.hits,
            Sound::UnitDied(_) => &mut self.deaths,
            Sound::UnitBreached => &mut self.breaches,
            Sound::WaveLaunched => &mut self.waves,
        };
        *counter += 1;
    }
}

/// Totals gathered over a whole run.
#[derive(Clone, Debug, Default, PartialEq)]
struct Report {
    ticks: u64,
    seconds: f32,
    waves_launched: u32,
    spawned: u32,
    kills: u32,
    breaches: u32,
    resources: u32,
    sounds: SoundTally,
    towers: Vec<String>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "simulated {:.1}s over {} ticks, {} waves launched",
            self.seconds, self.ticks, self.waves_launched
        )?;
        writeln!(
            f,
            "spawned {} | killed {} | breached {} | resources {}",
            self.spawned, self.kills, self.breaches, self.resources
        )?;
        writeln!(
            f,
            "cues: shots {} | hits {} | deaths {} | breaches {} | waves {}",
            self.sounds.fired,
            self.sounds.hits,
            self.sounds.deaths,
            self.sounds.breaches,
            self.sounds.waves
        )?;
        for tower in &self.towers {
            writeln!(f, "  {tower}")?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let mut board = build_board(&cli, config)?;
    let report = run(&mut board, &cli)?;
    print!("{report}");

    if cli.ascii {
        let mut frame = FrameRecorder::new();
        board.render(&mut frame, RenderOptions::default());
        let mut backend = AsciiBackend::new(io::stdout().lock());
        backend
            .present(frame.commands())
            .context("failed to print the final board")?;
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn build_board(cli: &Cli, config: CliConfig) -> Result<Board> {
    let CliConfig {
        board: mut board_config,
        mut towers,
    } = config;

    if let Some(seed) = cli.seed {
        board_config.seed = seed;
    }
    if let Some(columns) = cli.columns {
        board_config.columns = columns;
    }
    if let Some(rows) = cli.rows {
        board_config.rows = rows;
    }
    if cli.incremental {
        board_config.path_refresh = PathRefresh::Incremental;
    }
    if let Some(layout) = &cli.layout {
        towers.extend(parse_layout(layout).context("invalid --layout")?);
    }

    let mut board = Board::new(board_config).context("invalid board configuration")?;
    let placed = apply_layout(&mut board, &towers).context("failed to place tower layout")?;
    info!("placed {} towers", placed.len());
    Ok(board)
}

fn run(board: &mut Board, cli: &Cli) -> Result<Report> {
    anyhow::ensure!(cli.dt > 0.0, "--dt must be positive, got {}", cli.dt);
    anyhow::ensure!(
        cli.wave_interval >= 0.0,
        "--wave-interval must not be negative, got {}",
        cli.wave_interval
    );

    let mut report = Report::default();
    let mut until_next_wave = 0.0;

    while report.seconds < cli.max_seconds {
        if report.waves_launched < cli.waves && until_next_wave <= 0.0 {
            let _ = board.launch_wave();
            report.waves_launched += 1;
            until_next_wave += cli.wave_interval;
        }

        board.update(cli.dt, &mut report.sounds);
        report.ticks += 1;
        report.seconds += cli.dt;
        until_next_wave -= cli.dt;

        let summary = query::summary(board);
        report.spawned += summary.spawned;
        report.kills += summary.kills;
        report.breaches += summary.breaches;
        report.resources += summary.resources;

        let cleared = report.waves_launched == cli.waves
            && query::waves(board).is_idle()
            && query::units(board).is_empty();
        if cleared {
            break;
        }
    }

    report.towers = query::towers(board)
        .iter()
        .map(|(id, tower)| {
            format!(
                "{id:?} {:?} at ({}, {}) dealt {:.0}",
                tower.kind(),
                tower.origin().column(),
                tower.origin().row(),
                tower.damage_dealt()
            )
        })
        .collect();
    info!("run finished after {} ticks", report.ticks);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("grid-siege").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn flags_override_the_config_file() {
        let cli = cli(&[
            "--seed",
            "9",
            "--columns",
            "10",
            "--incremental",
            "--layout",
            "volter@3,6",
        ]);
        let config: CliConfig = toml::from_str(
            r#"
                [board]
                seed = 1
                rows = 16

                [[towers]]
                kind = "Mirror"
                column = 1
                row = 3
            "#,
        )
        .expect("valid toml");

        let board = build_board(&cli, config).expect("valid board");
        let settings = query::config(&board);
        assert_eq!(settings.seed, 9);
        assert_eq!(query::dimensions(&board), (10, 16));
        assert_eq!(settings.path_refresh, PathRefresh::Incremental);
        assert_eq!(query::towers(&board).len(), 2);
    }

    #[test]
    fn invalid_layout_is_reported_with_context() {
        let cli = cli(&["--layout", "mirror@0,0"]);
        let error = build_board(&cli, CliConfig::default()).expect_err("reserved zone");
        let message = format!("{error:#}");
        assert!(message.contains("failed to place tower layout"), "{message}");
        assert!(message.contains("reserved zone"), "{message}");
    }

    #[test]
    fn run_launches_every_wave_and_stops_once_cleared() {
        let cli = cli(&[
            "--waves",
            "2",
            "--wave-interval",
            "5",
            "--max-seconds",
            "600",
            "--layout",
            "mirror@2,6;mirror@5,8;volter@7,10",
        ]);
        let mut board = build_board(&cli, CliConfig::default()).expect("valid board");
        let report = run(&mut board, &cli).expect("valid timing");

        assert_eq!(report.waves_launched, 2);
        assert_eq!(report.sounds.waves, 2);
        assert!(report.spawned > 0);
        assert_eq!(report.kills + report.breaches, report.spawned);
        assert!(report.seconds < 600.0, "run ended once the board cleared");
        assert_eq!(report.towers.len(), 3);
    }

    #[test]
    fn non_positive_timestep_is_rejected() {
        let cli = cli(&["--dt", "0"]);
        let mut board = build_board(&cli, CliConfig::default()).expect("valid board");
        assert!(run(&mut board, &cli).is_err());
    }

    #[test]
    fn report_lists_totals_and_towers() {
        let report = Report {
            ticks: 60,
            seconds: 1.0,
            waves_launched: 1,
            spawned: 4,
            kills: 3,
            breaches: 1,
            resources: 12,
            sounds: SoundTally {
                fired: 7,
                hits: 5,
                ..SoundTally::default()
            },
            towers: vec!["TowerId(1) Mirror at (2, 6) dealt 100".to_owned()],
        };
        let text = report.to_string();
        assert!(text.contains("60 ticks, 1 waves launched"));
        assert!(text.contains("spawned 4 | killed 3 | breached 1 | resources 12"));
        assert!(text.contains("shots 7 | hits 5 | deaths 0"));
        assert!(text.ends_with("dealt 100\n"));
    }
}
