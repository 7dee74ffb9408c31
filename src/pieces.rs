//! Shape and region definitions, and the reader for puzzle input.
//!
//! Input is a mix of shape blocks and region lines in any order:
//!
//! ```text
//! 0:
//! #.
//! ##
//!
//! 4x4: 1 2
//! ```
//!
//! A shape block starts with `<id>:` and runs until the next header. Glyph
//! rows use `#` for filled and `.` for empty cells; spaces and tabs between
//! cells are ignored. A region line `<W>x<H>: <c0> <c1> ...` demands `ci`
//! copies of shape `i`. Blank lines are ignored everywhere.

use std::io::BufRead;

use crate::error::{CapacityError, Error, ParseError, Result};
use crate::geometry::{Cell, Polyomino};
use crate::grid::{words_for, MAX_BOARD_WORDS};

/// Maximum number of distinct shapes (ids `0..MAX_SHAPES`).
pub const MAX_SHAPES: usize = 128;

/// Maximum number of filled cells in one shape.
pub const MAX_CELLS_PER_SHAPE: usize = 64;

/// Maximum number of region lines in one input.
pub const MAX_REGIONS: usize = 4096;

/// A labelled polyomino with its precomputed orientations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub id: usize,
    pub base: Polyomino,
    /// Distinct orientations, starting with `base`.
    pub orientations: Vec<Polyomino>,
}

impl Shape {
    /// Canonicalises `cells` and enumerates its orientations.
    pub fn new(id: usize, cells: Vec<Cell>) -> Result<Self> {
        let base = Polyomino::new(cells);
        if base.is_empty() {
            return Err(ParseError::EmptyShape { id }.into());
        }
        if base.area() > MAX_CELLS_PER_SHAPE {
            return Err(CapacityError::TooManyCells {
                id,
                max: MAX_CELLS_PER_SHAPE,
            }
            .into());
        }
        let orientations = base.orientations();
        Ok(Self {
            id,
            base,
            orientations,
        })
    }

    /// Parses a glyph block such as `"#.\n##"` into a shape.
    pub fn from_glyphs(id: usize, glyphs: &str) -> Result<Self> {
        let mut builder = ShapeBuilder::new(id, 0);
        for (row, text) in glyphs.lines().enumerate() {
            if !text.trim().is_empty() {
                builder.push_row(row + 1, text)?;
            }
        }
        builder.finish()
    }

    pub fn area(&self) -> usize {
        self.base.area()
    }

    /// Absolute checkerboard imbalance `|black - white|`.
    ///
    /// Rotations and reflections can only swap the two colours, so this is
    /// the same for every orientation.
    pub fn imbalance(&self) -> usize {
        let (black, white) = self.base.colour_counts();
        black.abs_diff(white)
    }

    /// Whether at least one orientation fits inside a `width` x `height` board.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.orientations
            .iter()
            .any(|p| p.width() <= width && p.height() <= height)
    }
}

/// A rectangle and the multiset of shapes that must tile it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub width: usize,
    pub height: usize,
    /// `counts[i]` copies of shape `i`; missing trailing entries are zero.
    pub counts: Vec<usize>,
}

impl Region {
    /// Parses a `<W>x<H>: <c0> <c1> ...` line.
    pub fn parse(line: usize, text: &str) -> Result<Self> {
        let bad = || ParseError::BadRegion {
            line,
            text: text.to_string(),
        };

        let (dims, counts) = text.split_once(':').ok_or_else(bad)?;
        let (width, height) = dims.trim().split_once('x').ok_or_else(bad)?;
        let width: usize = width.parse().map_err(|_| bad())?;
        let height: usize = height.parse().map_err(|_| bad())?;
        if width == 0 || height == 0 {
            return Err(bad().into());
        }

        let cells = width.checked_mul(height).ok_or(CapacityError::BoardTooLarge {
            width,
            height,
            max_words: MAX_BOARD_WORDS,
        })?;
        if words_for(cells) > MAX_BOARD_WORDS {
            return Err(CapacityError::BoardTooLarge {
                width,
                height,
                max_words: MAX_BOARD_WORDS,
            }
            .into());
        }

        let counts = counts
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<usize>, _>>()
            .map_err(|_| bad())?;

        Ok(Self {
            width,
            height,
            counts,
        })
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Demanded copies of shape `shape`.
    pub fn count(&self, shape: usize) -> usize {
        self.counts.get(shape).copied().unwrap_or(0)
    }

    /// Total area of all demanded pieces, saturating on absurd counts.
    pub fn area_sum(&self, shapes: &[Shape]) -> usize {
        shapes.iter().fold(0usize, |sum, shape| {
            sum.saturating_add(self.count(shape.id).saturating_mul(shape.area()))
        })
    }
}

/// A parsed puzzle: a dense shape library plus regions in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Shapes indexed by id.
    pub shapes: Vec<Shape>,
    pub regions: Vec<Region>,
}

impl Puzzle {
    /// Parses puzzle input held in memory.
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = PuzzleReader::default();
        for (index, text) in input.lines().enumerate() {
            reader.line(index + 1, text)?;
        }
        reader.finish()
    }

    /// Parses puzzle input from a line reader.
    pub fn from_reader(input: impl BufRead) -> Result<Self> {
        let mut reader = PuzzleReader::default();
        for (index, text) in input.lines().enumerate() {
            reader.line(index + 1, &text?)?;
        }
        reader.finish()
    }
}

/// Accumulates glyph rows of the shape currently being read.
struct ShapeBuilder {
    id: usize,
    header_line: usize,
    cells: Vec<Cell>,
    rows: i32,
}

impl ShapeBuilder {
    fn new(id: usize, header_line: usize) -> Self {
        Self {
            id,
            header_line,
            cells: Vec::new(),
            rows: 0,
        }
    }

    fn push_row(&mut self, line: usize, text: &str) -> Result<()> {
        let mut x = 0;
        for ch in text.chars() {
            match ch {
                '#' => {
                    if self.cells.len() >= MAX_CELLS_PER_SHAPE {
                        return Err(CapacityError::TooManyCells {
                            id: self.id,
                            max: MAX_CELLS_PER_SHAPE,
                        }
                        .into());
                    }
                    self.cells.push((x, self.rows));
                    x += 1;
                }
                '.' => x += 1,
                ' ' | '\t' => {}
                _ => {
                    return Err(ParseError::InvalidGlyph {
                        line,
                        ch,
                        text: text.to_string(),
                    }
                    .into())
                }
            }
        }
        self.rows += 1;
        Ok(())
    }

    fn finish(self) -> Result<Shape> {
        Shape::new(self.id, self.cells)
    }
}

/// Line-by-line state machine behind `Puzzle::parse`.
#[derive(Default)]
struct PuzzleReader {
    shapes: Vec<Option<Shape>>,
    regions: Vec<(usize, Region)>,
    current: Option<ShapeBuilder>,
}

impl PuzzleReader {
    fn line(&mut self, line: usize, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let Some((head, tail)) = trimmed.split_once(':') else {
            let Some(builder) = self.current.as_mut() else {
                return Err(ParseError::OrphanRow {
                    line,
                    text: text.to_string(),
                }
                .into());
            };
            return builder.push_row(line, text);
        };

        let head = head.trim();
        let is_number = !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit());

        if is_number && tail.trim().is_empty() {
            // out-of-range ids are reported as a capacity error below
            let id = head.parse().unwrap_or(usize::MAX);
            self.commit()?;
            self.start_shape(line, id)
        } else if head.starts_with(|c: char| c.is_ascii_digit()) && head.contains('x') {
            if self.regions.len() >= MAX_REGIONS {
                return Err(CapacityError::TooManyRegions { max: MAX_REGIONS }.into());
            }
            let region = Region::parse(line, trimmed)?;
            self.regions.push((line, region));
            Ok(())
        } else {
            Err(ParseError::BadRegion {
                line,
                text: text.to_string(),
            }
            .into())
        }
    }

    fn start_shape(&mut self, line: usize, id: usize) -> Result<()> {
        if id >= MAX_SHAPES {
            return Err(CapacityError::TooManyShapes {
                id,
                max: MAX_SHAPES,
            }
            .into());
        }
        if matches!(self.shapes.get(id), Some(Some(_))) {
            return Err(ParseError::DuplicateShape { line, id }.into());
        }
        self.current = Some(ShapeBuilder::new(id, line));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let Some(builder) = self.current.take() else {
            return Ok(());
        };
        let id = builder.id;
        let header_line = builder.header_line;
        let shape = builder.finish()?;

        if self.shapes.len() <= id {
            self.shapes.resize(id + 1, None);
        }
        let slot = &mut self.shapes[id];
        if slot.is_some() {
            return Err(ParseError::DuplicateShape {
                line: header_line,
                id,
            }
            .into());
        }
        *slot = Some(shape);
        Ok(())
    }

    fn finish(mut self) -> Result<Puzzle> {
        self.commit()?;
        if self.shapes.is_empty() {
            return Err(ParseError::NoShapes.into());
        }

        let shapes = self
            .shapes
            .into_iter()
            .enumerate()
            .map(|(id, shape)| shape.ok_or(ParseError::MissingShape { id }))
            .collect::<Result<Vec<_>, _>>()?;

        let regions = self
            .regions
            .into_iter()
            .map(|(line, region)| {
                if region.counts.len() > shapes.len() {
                    return Err(Error::from(ParseError::TooManyCounts {
                        line,
                        found: region.counts.len(),
                        shapes: shapes.len(),
                    }));
                }
                Ok(region)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Puzzle { shapes, regions })
    }
}
