//! Tower layouts supplied on the command line or in the config file.

use grid_siege_core::{TargetMode, TileCoord, TileRect, TowerId, TowerKind};
use grid_siege_world::{Board, BoardConfig, PlacementError};
use serde::Deserialize;
use thiserror::Error;

/// Separator between tower entries in a layout string.
const ENTRY_DELIMITER: char = ';';
/// Separator between the tower kind and its position.
const POSITION_DELIMITER: char = '@';
/// Separator between the position and the optional target mode.
const MODE_DELIMITER: char = ':';

/// Tower to place before the simulation starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) column: u32,
    pub(crate) row: u32,
    #[serde(default)]
    pub(crate) mode: TargetMode,
}

/// Contents of the optional TOML config file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    pub(crate) board: BoardConfig,
    pub(crate) towers: Vec<TowerPlacement>,
}

/// Errors raised while reading or applying a layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum LayoutError {
    #[error("layout entry '{0}' is missing '@column,row'")]
    MissingPosition(String),
    #[error("unknown tower kind '{0}'")]
    UnknownTowerKind(String),
    #[error("unknown target mode '{0}'")]
    UnknownTargetMode(String),
    #[error("could not parse position '{0}'")]
    InvalidPosition(String),
    #[error("cannot place {kind:?} at ({column}, {row})")]
    Rejected {
        kind: TowerKind,
        column: u32,
        row: u32,
        #[source]
        source: PlacementError,
    },
}

/// Parses `kind@column,row[:mode]` entries separated by `;`.
///
/// Kinds and modes are case-insensitive, e.g. `mirror@2,5;sharp2@6,7:closest`.
pub(crate) fn parse_layout(value: &str) -> Result<Vec<TowerPlacement>, LayoutError> {
    value
        .split(ENTRY_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Result<TowerPlacement, LayoutError> {
    let (kind, rest) = entry
        .split_once(POSITION_DELIMITER)
        .ok_or_else(|| LayoutError::MissingPosition(entry.to_owned()))?;
    let (position, mode) = match rest.split_once(MODE_DELIMITER) {
        Some((position, mode)) => (position, Some(mode)),
        None => (rest, None),
    };

    let kind = parse_kind(kind.trim())?;
    let mode = match mode {
        Some(mode) => parse_mode(mode.trim())?,
        None => TargetMode::default(),
    };
    let (column, row): (u32, u32) = position
        .split_once(',')
        .and_then(|(column, row)| {
            Some((column.trim().parse().ok()?, row.trim().parse().ok()?))
        })
        .ok_or_else(|| LayoutError::InvalidPosition(position.to_owned()))?;

    Ok(TowerPlacement {
        kind,
        column,
        row,
        mode,
    })
}

fn parse_kind(value: &str) -> Result<TowerKind, LayoutError> {
    match value.to_ascii_lowercase().as_str() {
        "mirror" => Ok(TowerKind::Mirror),
        "mirror2" => Ok(TowerKind::Mirror2),
        "sharp" => Ok(TowerKind::Sharp),
        "sharp2" => Ok(TowerKind::Sharp2),
        "volter" => Ok(TowerKind::Volter),
        _ => Err(LayoutError::UnknownTowerKind(value.to_owned())),
    }
}

fn parse_mode(value: &str) -> Result<TargetMode, LayoutError> {
    match value.to_ascii_lowercase().as_str() {
        "first" => Ok(TargetMode::First),
        "closest" => Ok(TargetMode::Closest),
        "farthest" => Ok(TargetMode::Farthest),
        "random" => Ok(TargetMode::Random),
        _ => Err(LayoutError::UnknownTargetMode(value.to_owned())),
    }
}

/// Places every tower, stopping at the first rejected footprint.
pub(crate) fn apply_layout(
    board: &mut Board,
    placements: &[TowerPlacement],
) -> Result<Vec<TowerId>, LayoutError> {
    placements
        .iter()
        .map(|placement| {
            let origin = TileCoord::new(placement.column, placement.row);
            let footprint = TileRect::from_origin_and_size(origin, placement.kind.footprint());
            board
                .check_placement(footprint)
                .map_err(|source| LayoutError::Rejected {
                    kind: placement.kind,
                    column: placement.column,
                    row: placement.row,
                    source,
                })?;
            Ok(board.insert_tower(placement.kind, origin, placement.mode))
        })
        .collect()
}
