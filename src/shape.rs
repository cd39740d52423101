//! Shape and colour definitions.
//!
//! A shape is a named cluster of hex cells given as offsets from an implicit
//! origin. Shapes remember the cells they were created with so that every
//! rotation is taken about the same centroid.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{centroid, rotate_around, Centroid, MAX_COORD, NUM_ROTATIONS};

/// An axial hex coordinate `(q, r)`.
pub type Coord = (i32, i32);

/// A display colour in HSL form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Color {
    /// Grey, the colour of free board cells.
    pub const GRAY: Self = Self::hsl(0, 0, 50);

    pub const fn hsl(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// `count` fully saturated colours with evenly spaced hues.
    pub fn palette(count: usize) -> Vec<Self> {
        (0..count)
            .map(|i| Self::hsl((i * 360 / count) as u16, 100, 50))
            .collect()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::GRAY
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses `hsl(H, S%, L%)`; whitespace and the `%` signs are optional.
    fn from_str(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(text.to_string());

        let inner = text
            .trim()
            .strip_prefix("hsl(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let mut parts = inner.split(',').map(|part| part.trim().trim_end_matches('%'));
        let hue = parts.next().and_then(|p| p.parse::<u16>().ok());
        let saturation = parts.next().and_then(|p| p.parse::<u8>().ok());
        let lightness = parts.next().and_then(|p| p.parse::<u8>().ok());

        match (hue, saturation, lightness, parts.next()) {
            (Some(h), Some(s), Some(l), None) if h < 360 && s <= 100 && l <= 100 => {
                Ok(Self::hsl(h, s, l))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A named, coloured polyhex in one of its six orientations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    name: String,
    color: Color,
    cells: Vec<Coord>,
    base: Vec<Coord>,
    rotation: u8,
}

impl Shape {
    /// Creates a shape, rejecting empty cell lists, repeated cells and
    /// coordinates beyond [`MAX_COORD`].
    pub fn new(name: impl Into<String>, cells: Vec<Coord>, color: Color) -> Result<Self> {
        let name = name.into();
        if cells.is_empty() {
            return Err(Error::InvalidShape {
                name,
                reason: "shape has no cells".to_string(),
            });
        }

        if let Some(&far) = cells
            .iter()
            .find(|(q, r)| q.unsigned_abs().max(r.unsigned_abs()) > MAX_COORD as u32)
        {
            return Err(Error::InvalidShape {
                name,
                reason: format!("cell {far:?} is more than {MAX_COORD} from the origin"),
            });
        }

        let mut seen = FxHashSet::default();
        if let Some(&repeated) = cells.iter().find(|&&cell| !seen.insert(cell)) {
            return Err(Error::InvalidShape {
                name,
                reason: format!("cell {repeated:?} appears more than once"),
            });
        }

        Ok(Self {
            name,
            color,
            base: cells.clone(),
            cells,
            rotation: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Cells of the current orientation.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Number of 60° steps applied since creation (0..=5).
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Centroid of the cells the shape was created with.
    pub fn centroid(&self) -> Centroid {
        centroid(&self.base)
    }

    /// Returns the same shape with a different colour.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Returns the shape rotated 60° clockwise about its centroid.
    ///
    /// Orientations are always derived from the original cells, so six
    /// rotations give back exactly the cells the shape started with.
    pub fn rotate(&self) -> Self {
        let rotation = (self.rotation + 1) % NUM_ROTATIONS;
        Self {
            name: self.name.clone(),
            color: self.color,
            cells: rotate_around(&self.base, &self.centroid(), rotation),
            base: self.base.clone(),
            rotation,
        }
    }
}
