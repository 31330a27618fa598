#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Siege simulation.
//!
//! This crate defines the vocabulary connecting the authoritative board, the
//! pure systems (targeting and wave scheduling) and the adapters. Entity
//! handles are plain integer ids that must be revalidated before use, entity
//! kinds are closed enums carrying their balance data, and the board talks to
//! presentation exclusively through the [`AudioSink`] and [`RenderSink`]
//! traits.

use std::hash::Hash;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sentinel tile index meaning "no tile", "unreachable" or "at the goal".
pub const NO_TILE: usize = usize::MAX;

/// Integer handle allocated by an entity pool.
///
/// Handles are weak: they carry no ownership and the referenced entity may be
/// gone by the time the handle is used again.
pub trait EntityId: Copy + Eq + Hash + Ord + std::fmt::Debug {
    /// Builds the handle from its raw numeric representation.
    fn from_raw(raw: u32) -> Self;

    /// Raw numeric representation of the handle.
    fn raw(self) -> u32;
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl EntityId for UnitId {
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl EntityId for TowerId {
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl EntityId for ProjectileId {
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a cosmetic effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u32);

impl EntityId for EffectId {
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Centre of the tile in continuous board space, measured in tiles.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Size of a [`TileRect`] measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRectSize {
    width: u32,
    height: u32,
}

impl TileRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Axis-aligned rectangle expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    origin: TileCoord,
    size: TileRectSize,
}

impl TileRect {
    /// Constructs a rectangle from an origin tile and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: TileCoord, size: TileRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left tile that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole tiles.
    #[must_use]
    pub const fn size(&self) -> TileRectSize {
        self.size
    }

    /// Reports whether the tile lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.column() >= self.origin.column()
            && tile.row() >= self.origin.row()
            && tile.column() - self.origin.column() < self.size.width()
            && tile.row() - self.origin.row() < self.size.height()
    }

    /// Centre of the rectangle in continuous board space.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.origin.column() as f32 + self.size.width() as f32 * 0.5,
            self.origin.row() as f32 + self.size.height() as f32 * 0.5,
        )
    }

    /// Iterates every tile covered by the rectangle in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let origin = self.origin;
        let width = self.size.width();
        let height = self.size.height();
        (0..height).flat_map(move |dy| {
            (0..width).map(move |dx| TileCoord::new(origin.column() + dx, origin.row() + dy))
        })
    }
}

/// Occupancy state of a single board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open ground units may walk across.
    Empty,
    /// Ground covered by a tower footprint.
    Block,
}

impl TileKind {
    /// Reports whether units may path through the tile.
    #[must_use]
    pub const fn passthrough(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Species of mobile units that traverse the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Fast, fragile baseline unit.
    Methane,
    /// Quick light unit, also produced when Oxygen splits.
    Water,
    /// Sturdy unit that splits into two Water on death.
    Oxygen,
    /// Armoured mid-tier unit.
    Ethane,
    /// Heavy unit unlocked in later waves.
    Propane,
    /// Heaviest unit; splits into two Ethane on death.
    Butane,
}

impl UnitKind {
    /// Every unit kind in declaration order.
    pub const ALL: [UnitKind; 6] = [
        Self::Methane,
        Self::Water,
        Self::Oxygen,
        Self::Ethane,
        Self::Propane,
        Self::Butane,
    ];

    /// Movement speed measured in tiles per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Methane => 1.0,
            Self::Water => 1.3,
            Self::Oxygen => 0.9,
            Self::Ethane => 1.1,
            Self::Propane => 0.8,
            Self::Butane => 0.7,
        }
    }

    /// Health a freshly spawned unit starts with.
    #[must_use]
    pub const fn max_health(self) -> f32 {
        match self {
            Self::Methane => 60.0,
            Self::Water => 40.0,
            Self::Oxygen => 120.0,
            Self::Ethane => 150.0,
            Self::Propane => 320.0,
            Self::Butane => 500.0,
        }
    }

    /// Resources granted to the player when the unit is killed.
    #[must_use]
    pub const fn resource_drop(self) -> u32 {
        match self {
            Self::Methane | Self::Water => 1,
            Self::Oxygen => 2,
            Self::Ethane => 3,
            Self::Propane => 5,
            Self::Butane => 8,
        }
    }

    /// Units spawned in place when this unit dies, as `(kind, count)`.
    #[must_use]
    pub const fn split_on_death(self) -> Option<(UnitKind, u32)> {
        match self {
            Self::Oxygen => Some((Self::Water, 2)),
            Self::Butane => Some((Self::Ethane, 2)),
            Self::Methane | Self::Water | Self::Ethane | Self::Propane => None,
        }
    }
}

/// Policy used by a tower to choose among units within range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetMode {
    /// Unit with the shortest remaining path to the goal.
    #[default]
    First,
    /// Unit nearest to the tower.
    Closest,
    /// Unit furthest from the tower while still in range.
    Farthest,
    /// Uniformly random unit in range.
    Random,
}

/// How a tower deals damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Attack {
    /// Fires a homing projectile that hits a single unit.
    Seek {
        /// Damage applied on hit.
        damage: f32,
        /// Projectile speed in tiles per second.
        speed: f32,
    },
    /// Fires a projectile along a fixed direction that pierces several units.
    Straight {
        /// Damage applied to each unit hit.
        damage: f32,
        /// Projectile speed in tiles per second.
        speed: f32,
        /// Number of units the projectile may hit before it is spent.
        power: u32,
        /// Collision radius in tiles.
        radius: f32,
    },
    /// Continuously damages every unit within range.
    Pulse {
        /// Damage applied per second to each unit in range.
        damage_per_second: f32,
    },
}

/// Types of towers that can be constructed on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Basic homing tower.
    Mirror,
    /// Upgraded homing tower with higher fire rate and damage.
    Mirror2,
    /// Piercing tower firing straight bolts.
    Sharp,
    /// Upgraded piercing tower.
    Sharp2,
    /// Rotating splash tower damaging everything around it every tick.
    Volter,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 5] = [
        Self::Mirror,
        Self::Mirror2,
        Self::Sharp,
        Self::Sharp2,
        Self::Volter,
    ];

    /// Footprint of the tower measured in tiles.
    #[must_use]
    pub const fn footprint(self) -> TileRectSize {
        match self {
            Self::Mirror | Self::Mirror2 | Self::Sharp | Self::Sharp2 => TileRectSize::new(1, 1),
            Self::Volter => TileRectSize::new(2, 2),
        }
    }

    /// Targeting range measured in tiles from the footprint centre.
    #[must_use]
    pub const fn range(self) -> f32 {
        match self {
            Self::Mirror => 3.0,
            Self::Mirror2 => 3.5,
            Self::Sharp => 4.0,
            Self::Sharp2 => 4.5,
            Self::Volter => 1.75,
        }
    }

    /// Seconds between consecutive shots. Zero for continuous attacks.
    #[must_use]
    pub const fn cooldown(self) -> f32 {
        match self {
            Self::Mirror => 0.8,
            Self::Mirror2 => 0.5,
            Self::Sharp => 1.5,
            Self::Sharp2 => 1.2,
            Self::Volter => 0.0,
        }
    }

    /// Attack performed by the tower.
    #[must_use]
    pub const fn attack(self) -> Attack {
        match self {
            Self::Mirror => Attack::Seek {
                damage: 20.0,
                speed: 8.0,
            },
            Self::Mirror2 => Attack::Seek {
                damage: 35.0,
                speed: 10.0,
            },
            Self::Sharp => Attack::Straight {
                damage: 50.0,
                speed: 6.0,
                power: 3,
                radius: 0.35,
            },
            Self::Sharp2 => Attack::Straight {
                damage: 70.0,
                speed: 7.0,
                power: 5,
                radius: 0.4,
            },
            Self::Volter => Attack::Pulse {
                damage_per_second: 25.0,
            },
        }
    }

    /// Gold the player pays to construct the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Mirror => 10,
            Self::Mirror2 => 25,
            Self::Sharp => 15,
            Self::Sharp2 => 35,
            Self::Volter => 40,
        }
    }

    /// Kind the tower turns into when upgraded, if any.
    #[must_use]
    pub const fn upgrade(self) -> Option<TowerKind> {
        match self {
            Self::Mirror => Some(Self::Mirror2),
            Self::Sharp => Some(Self::Sharp2),
            Self::Mirror2 | Self::Sharp2 | Self::Volter => None,
        }
    }
}

/// Sound cues emitted by the simulation for an external mixer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    /// A tower launched a projectile.
    TowerFired(TowerKind),
    /// A projectile struck a unit.
    ProjectileHit,
    /// A unit was killed.
    UnitDied(UnitKind),
    /// A unit reached the goal zone.
    UnitBreached,
    /// A new wave was queued.
    WaveLaunched,
}

/// Receiver for sound cues emitted during a tick.
pub trait AudioSink {
    /// Requests playback of the provided sound.
    fn play(&mut self, sound: Sound);
}

impl AudioSink for Vec<Sound> {
    fn play(&mut self, sound: Sound) {
        self.push(sound);
    }
}

/// Audio sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: Sound) {}
}

/// RGBA color used by render commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Model identifiers resolved to meshes or sprites by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKey {
    /// Tower body.
    Tower(TowerKind),
    /// Unit body.
    Unit(UnitKind),
    /// Homing projectile.
    SeekProjectile,
    /// Piercing projectile.
    StraightProjectile,
}

/// Draw primitives emitted by the board, expressed in tile units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderCommand {
    /// Board tile.
    Tile {
        /// Tile being drawn.
        coord: TileCoord,
        /// Occupancy of the tile.
        kind: TileKind,
    },
    /// Instanced model with a transform.
    Model {
        /// Model to draw.
        model: ModelKey,
        /// Centre of the model.
        position: Vec2,
        /// Rotation in radians.
        rotation: f32,
        /// Uniform scale, 1.0 being one tile.
        scale: f32,
    },
    /// Outline or filled circle.
    Circle {
        /// Centre of the circle.
        center: Vec2,
        /// Radius in tiles.
        radius: f32,
        /// Stroke color.
        color: Color,
    },
    /// Directed segment.
    Arrow {
        /// Tail of the arrow.
        from: Vec2,
        /// Head of the arrow.
        to: Vec2,
        /// Stroke color.
        color: Color,
    },
}

/// Receiver for draw commands produced by the board.
pub trait RenderSink {
    /// Queues a draw command.
    fn push(&mut self, command: RenderCommand);
}

impl RenderSink for Vec<RenderCommand> {
    fn push(&mut self, command: RenderCommand) {
        Vec::push(self, command);
    }
}
