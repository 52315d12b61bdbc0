use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Photometric band of a survey frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    U,
    G,
    R,
    I,
    Z,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::U, Band::G, Band::R, Band::I, Band::Z];

    pub fn as_char(self) -> char {
        match self {
            Band::U => 'u',
            Band::G => 'g',
            Band::R => 'r',
            Band::I => 'i',
            Band::Z => 'z',
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u" => Ok(Band::U),
            "g" => Ok(Band::G),
            "r" => Ok(Band::R),
            "i" => Ok(Band::I),
            "z" => Ok(Band::Z),
            other => Err(format!("unknown filter '{other}', expected one of ugriz")),
        }
    }
}

/// One value per band, in ugriz order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandValues<T> {
    pub u: T,
    pub g: T,
    pub r: T,
    pub i: T,
    pub z: T,
}

impl<T: Copy> BandValues<T> {
    pub fn from_array(values: [T; 5]) -> Self {
        let [u, g, r, i, z] = values;
        Self { u, g, r, i, z }
    }

    pub fn to_array(&self) -> [T; 5] {
        [self.u, self.g, self.r, self.i, self.z]
    }

    #[inline]
    pub fn get(&self, band: Band) -> T {
        match band {
            Band::U => self.u,
            Band::G => self.g,
            Band::R => self.r,
            Band::I => self.i,
            Band::Z => self.z,
        }
    }
}

/// Identifier of one survey frame: run, camera column, filter and field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId {
    pub run: u32,
    pub camcol: u8,
    pub filter: Band,
    pub field: u32,
}

impl FrameId {
    pub fn new(run: u32, camcol: u8, filter: Band, field: u32) -> Self {
        Self {
            run,
            camcol,
            filter,
            field,
        }
    }

    /// Stem used for per-frame files, e.g. `frame-i-002888-1-0139`.
    pub fn frame_stem(&self) -> String {
        format!(
            "frame-{}-{:06}-{}-{:04}",
            self.filter, self.run, self.camcol, self.field
        )
    }

    /// Stem of the catalog covering this frame (shared by all filters).
    pub fn catalog_stem(&self) -> String {
        format!("photoObj-{:06}-{}-{:04}", self.run, self.camcol, self.field)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.run, self.camcol, self.filter, self.field
        )
    }
}

/// Exposure timestamp and linear WCS terms carried by a frame header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameHeader {
    /// TAI exposure timestamp (seconds).
    pub tai: f64,
    /// Reference pixel (CRPIX1, CRPIX2).
    pub crpix: Vector2<f64>,
    /// Reference world coordinate (CRVAL1, CRVAL2).
    pub crval: Vector2<f64>,
    /// Linear transform `[[CD1_1, CD1_2], [CD2_1, CD2_2]]`.
    pub cd: Matrix2<f64>,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            tai: 0.0,
            crpix: Vector2::zeros(),
            crval: Vector2::zeros(),
            cd: Matrix2::identity(),
        }
    }
}

/// Two image-plane points on an accepted line, in pixels.
///
/// The points are projections of the Hough line far enough along its
/// direction to cross the frame; they usually lie outside the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEndpoints {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Which detection pass produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    Bright,
    Dim,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::Bright => f.write_str("bright"),
            PassKind::Dim => f.write_str("dim"),
        }
    }
}

/// One accepted detection on a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub frame: FrameId,
    pub header: FrameHeader,
    pub line: LineEndpoints,
    pub pass: PassKind,
}

impl DetectionResult {
    /// Whitespace-separated result row:
    /// `run camcol filter field tai crpix1 crpix2 crval1 crval2 cd11 cd12 cd21 cd22 x1 y1 x2 y2`.
    pub fn to_row(&self) -> String {
        let h = &self.header;
        format!(
            "{} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            self.frame,
            h.tai,
            h.crpix[0],
            h.crpix[1],
            h.crval[0],
            h.crval[1],
            h.cd[(0, 0)],
            h.cd[(0, 1)],
            h.cd[(1, 0)],
            h.cd[(1, 1)],
            self.line.x1,
            self.line.y1,
            self.line.x2,
            self.line.y2
        )
    }
}
