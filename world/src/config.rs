//! Board configuration and its validation.

use grid_siege_system_waves::WaveTuning;
use serde::Deserialize;
use thiserror::Error;

/// How the board refreshes its path field after the tile layout changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRefresh {
    /// Recompute the whole field at the start of the next tick.
    #[default]
    Immediate,
    /// Spread the recompute over several ticks, keeping the old field live.
    Incremental,
}

/// Tunable parameters of a board.
///
/// Every field has a default, so partial TOML documents deserialize.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Rows at the bottom of the board where units enter.
    pub spawn_height: u32,
    /// Rows at the top of the board where units breach.
    pub cease_height: u32,
    /// Path refresh policy applied after placements and removals.
    pub path_refresh: PathRefresh,
    /// Tiles expanded per tick by an incremental path refresh.
    pub soft_path_budget: usize,
    /// Seed of the board's random number generator.
    pub seed: u64,
    /// Seconds a death burst or hit spark stays visible.
    pub effect_duration: f32,
    /// Balance knobs for generated waves.
    pub waves: WaveTuning,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            rows: 20,
            spawn_height: 2,
            cease_height: 1,
            path_refresh: PathRefresh::Immediate,
            soft_path_budget: 1,
            seed: 0x6a09_e667_f3bc_c908,
            effect_duration: 0.4,
            waves: WaveTuning::default(),
        }
    }
}

/// Reasons a [`BoardConfig`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid would contain no tiles.
    #[error("board must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Requested columns.
        columns: u32,
        /// Requested rows.
        rows: u32,
    },
    /// Either zone is zero rows tall.
    #[error("spawn and cease zones must be at least one row tall")]
    EmptyZone,
    /// The zones leave no buildable rows between them.
    #[error("spawn zone ({spawn}) and cease zone ({cease}) do not fit in {rows} rows")]
    ZonesOverlap {
        /// Spawn zone height.
        spawn: u32,
        /// Cease zone height.
        cease: u32,
        /// Board height.
        rows: u32,
    },
    /// An incremental refresh would never make progress.
    #[error("soft path budget must be positive")]
    ZeroSoftBudget,
}

impl BoardConfig {
    /// Checks the configuration for a board of its own dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_dimensions(self.columns, self.rows)
    }

    /// Checks the configuration against the provided dimensions.
    pub fn validate_dimensions(&self, columns: u32, rows: u32) -> Result<(), ConfigError> {
        if columns == 0 || rows == 0 {
            return Err(ConfigError::EmptyGrid { columns, rows });
        }
        if self.spawn_height == 0 || self.cease_height == 0 {
            return Err(ConfigError::EmptyZone);
        }
        if self.spawn_height.saturating_add(self.cease_height) >= rows {
            return Err(ConfigError::ZonesOverlap {
                spawn: self.spawn_height,
                cease: self.cease_height,
                rows,
            });
        }
        if self.soft_path_budget == 0 {
            return Err(ConfigError::ZeroSoftBudget);
        }
        Ok(())
    }
}
