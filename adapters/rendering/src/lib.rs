#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rendering contracts and a text backend for Grid Siege adapters.
//!
//! The board pushes [`RenderCommand`]s into any [`RenderSink`]. Adapters
//! collect a frame with [`FrameRecorder`] and hand it to a
//! [`RenderingBackend`], which presents it however it likes.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use grid_siege_core::{ModelKey, RenderCommand, RenderSink, TileKind, TowerKind, UnitKind};
use thiserror::Error;

/// Render sink that keeps every command of the current frame.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    commands: Vec<RenderCommand>,
}

impl FrameRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last clear.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Reports whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops the recorded commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderSink for FrameRecorder {
    fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }
}

/// Presentation layer consuming recorded frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &[RenderCommand]) -> AnyResult<()>;
}

/// Errors raised while rasterising a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// The frame contains no tiles, so the canvas size is unknown.
    #[error("frame contains no tile commands")]
    EmptyFrame,
}

/// Character grid produced from a frame, one glyph per tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiCanvas {
    columns: usize,
    rows: usize,
    glyphs: Vec<char>,
}

impl AsciiCanvas {
    /// Rasterises `frame` in command order, later commands overwriting
    /// earlier ones.
    ///
    /// The canvas is sized by the tile commands. Models and small circles
    /// outside that area are dropped. Arrows and range circles are ignored.
    pub fn rasterize(frame: &[RenderCommand]) -> Result<Self, RenderingError> {
        let (columns, rows) = frame
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Tile { coord, .. } => Some((coord.column(), coord.row())),
                _ => None,
            })
            .fold(None, |extent: Option<(u32, u32)>, (column, row)| {
                let (columns, rows) = extent.unwrap_or((0, 0));
                Some((columns.max(column + 1), rows.max(row + 1)))
            })
            .ok_or(RenderingError::EmptyFrame)?;

        let mut canvas = Self {
            columns: columns as usize,
            rows: rows as usize,
            glyphs: vec![' '; columns as usize * rows as usize],
        };

        for command in frame {
            match *command {
                RenderCommand::Tile { coord, kind } => {
                    let glyph = match kind {
                        TileKind::Empty => '.',
                        TileKind::Block => '#',
                    };
                    canvas.plot(coord.center(), glyph);
                }
                RenderCommand::Model {
                    model, position, ..
                } => canvas.plot(position, model_glyph(model)),
                RenderCommand::Circle { center, radius, .. } if radius < 1.0 => {
                    canvas.plot(center, '+');
                }
                RenderCommand::Circle { .. } | RenderCommand::Arrow { .. } => {}
            }
        }

        Ok(canvas)
    }

    /// Width of the canvas in glyphs.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Height of the canvas in glyphs.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Glyph at the given cell, if it lies on the canvas.
    #[must_use]
    pub fn glyph(&self, column: usize, row: usize) -> Option<char> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.glyphs.get(row * self.columns + column).copied()
    }

    /// Canvas rows joined by newlines.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.glyphs
            .chunks(self.columns.max(1))
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn plot(&mut self, position: Vec2, glyph: char) {
        if position.x < 0.0 || position.y < 0.0 {
            return;
        }
        let column = position.x.floor() as usize;
        let row = position.y.floor() as usize;
        if column < self.columns && row < self.rows {
            self.glyphs[row * self.columns + column] = glyph;
        }
    }
}

fn model_glyph(model: ModelKey) -> char {
    match model {
        ModelKey::Tower(kind) => match kind {
            TowerKind::Mirror => 'M',
            TowerKind::Mirror2 => 'N',
            TowerKind::Sharp => 'S',
            TowerKind::Sharp2 => 'T',
            TowerKind::Volter => 'V',
        },
        ModelKey::Unit(kind) => match kind {
            UnitKind::Methane => 'm',
            UnitKind::Water => 'w',
            UnitKind::Oxygen => 'o',
            UnitKind::Ethane => 'e',
            UnitKind::Propane => 'p',
            UnitKind::Butane => 'b',
        },
        ModelKey::SeekProjectile | ModelKey::StraightProjectile => '*',
    }
}

/// Backend printing every frame as text to a writer.
#[derive(Debug)]
pub struct AsciiBackend<W: Write> {
    out: W,
    frames: usize,
}

impl<W: Write> AsciiBackend<W> {
    /// Creates a backend writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Number of frames presented so far.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn present(&mut self, frame: &[RenderCommand]) -> AnyResult<()> {
        let canvas = AsciiCanvas::rasterize(frame).context("failed to rasterise frame")?;
        writeln!(self.out, "{}", canvas.to_text()).context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")?;
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_siege_core::{Color, TileCoord};

    fn tiles(columns: u32, rows: u32) -> Vec<RenderCommand> {
        (0..rows)
            .flat_map(|row| {
                (0..columns).map(move |column| RenderCommand::Tile {
                    coord: TileCoord::new(column, row),
                    kind: if column == 1 && row == 1 {
                        TileKind::Block
                    } else {
                        TileKind::Empty
                    },
                })
            })
            .collect()
    }

    #[test]
    fn recorder_collects_pushed_commands() {
        let mut recorder = FrameRecorder::new();
        for command in tiles(2, 2) {
            recorder.push(command);
        }
        assert_eq!(recorder.len(), 4);
        recorder.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn canvas_draws_models_over_tiles() {
        let mut frame = tiles(3, 2);
        frame.push(RenderCommand::Model {
            model: ModelKey::Tower(TowerKind::Volter),
            position: Vec2::new(1.5, 1.5),
            rotation: 0.0,
            scale: 2.0,
        });
        frame.push(RenderCommand::Model {
            model: ModelKey::Unit(UnitKind::Water),
            position: Vec2::new(2.2, 0.7),
            rotation: 0.0,
            scale: 0.45,
        });
        frame.push(RenderCommand::Circle {
            center: Vec2::new(0.5, 0.5),
            radius: 4.0,
            color: Color::new(1.0, 1.0, 1.0, 0.25),
        });

        let canvas = AsciiCanvas::rasterize(&frame).expect("frame has tiles");
        assert_eq!((canvas.columns(), canvas.rows()), (3, 2));
        assert_eq!(canvas.to_text(), "..w\n.V.");
        assert_eq!(canvas.glyph(5, 0), None);
    }

    #[test]
    fn frame_without_tiles_is_rejected() {
        let frame = vec![RenderCommand::Arrow {
            from: Vec2::ZERO,
            to: Vec2::ONE,
            color: Color::from_rgb_u8(0, 0, 0),
        }];
        assert_eq!(
            AsciiCanvas::rasterize(&frame),
            Err(RenderingError::EmptyFrame)
        );
    }

    #[test]
    fn backend_writes_one_block_per_frame() {
        let mut backend = AsciiBackend::new(Vec::new());
        backend.present(&tiles(2, 2)).expect("in-memory write");
        backend.present(&tiles(2, 2)).expect("in-memory write");
        assert_eq!(backend.frames(), 2);
        let text = String::from_utf8(backend.into_inner()).expect("utf8");
        assert_eq!(text, "..\n.#\n..\n.#\n");
    }

    #[test]
    fn backend_reports_empty_frames() {
        let mut backend = AsciiBackend::new(Vec::new());
        let error = backend.present(&[]).expect_err("no tiles");
        assert!(format!("{error:#}").contains("no tile commands"));
    }
}
