//! Flexible polyline decoding.
//!
//! Routing services return geometry in the compact flexible-polyline text
//! format: a version, a header word, then zig-zag encoded coordinate deltas,
//! each value split into 5-bit groups with a continuation bit. Decoding
//! happens at the boundary; everything downstream works on [`Polyline`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Coordinate;

/// The only format version this decoder understands.
pub const FORMAT_VERSION: u64 = 1;

const CONTINUATION_BIT: u64 = 0x20;
const PAYLOAD_MASK: u64 = 0x1F;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("stream ended with outstanding continuation bits")]
    TruncatedValue,

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u64),

    #[error("header word missing after format version")]
    MissingHeader,

    #[error("coordinate truncated: latitude without matching longitude or third dimension")]
    PrematureEnd,

    #[error("value overflows 64 bits at position {position}")]
    ValueOverflow { position: usize },
}

/// Meaning of the optional third value in each coordinate tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThirdDimension {
    Absent,
    Level,
    Altitude,
    Elevation,
    Reserved1,
    Reserved2,
    Custom1,
    Custom2,
}

impl ThirdDimension {
    fn from_bits(bits: u64) -> Self {
        match bits & 0x7 {
            0 => ThirdDimension::Absent,
            1 => ThirdDimension::Level,
            2 => ThirdDimension::Altitude,
            3 => ThirdDimension::Elevation,
            4 => ThirdDimension::Reserved1,
            5 => ThirdDimension::Reserved2,
            6 => ThirdDimension::Custom1,
            _ => ThirdDimension::Custom2,
        }
    }
}

/// Parsed header governing the scale of every following delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolylineHeader {
    pub precision: u8,
    pub third_dim: ThirdDimension,
    pub third_dim_precision: u8,
}

impl PolylineHeader {
    fn from_word(word: u64) -> Self {
        Self {
            precision: (word & 0xF) as u8,
            third_dim: ThirdDimension::from_bits(word >> 4),
            third_dim_precision: ((word >> 7) & 0xF) as u8,
        }
    }

    pub fn has_third_dim(&self) -> bool {
        self.third_dim != ThirdDimension::Absent
    }

    fn factor_degree(&self) -> f64 {
        10f64.powi(i32::from(self.precision))
    }

    fn factor_z(&self) -> f64 {
        10f64.powi(i32::from(self.third_dim_precision))
    }
}

fn decode_char(character: char, position: usize) -> Result<u64, DecodeError> {
    let value = match character {
        'A'..='Z' => character as u64 - 'A' as u64,
        'a'..='z' => character as u64 - 'a' as u64 + 26,
        '0'..='9' => character as u64 - '0' as u64 + 52,
        '-' => 62,
        '_' => 63,
        _ => return Err(DecodeError::InvalidCharacter { character, position }),
    };
    Ok(value)
}

fn to_signed(value: u64) -> i64 {
    let half = (value >> 1) as i64;
    if value & 1 == 1 { !half } else { half }
}

/// Splits the character stream into unsigned values at continuation boundaries.
struct UnsignedValues<'a> {
    chars: std::iter::Enumerate<std::str::Chars<'a>>,
}

impl Iterator for UnsignedValues<'_> {
    type Item = Result<u64, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        let mut pending = false;

        for (position, character) in self.chars.by_ref() {
            let value = match decode_char(character, position) {
                Ok(value) => value,
                Err(err) => return Some(Err(err)),
            };
            let payload = value & PAYLOAD_MASK;
            if shift >= u64::BITS || (shift > 0 && payload >> (u64::BITS - shift) != 0) {
                return Some(Err(DecodeError::ValueOverflow { position }));
            }
            result |= payload << shift;
            if value & CONTINUATION_BIT == 0 {
                return Some(Ok(result));
            }
            shift += 5;
            pending = true;
        }

        if pending {
            Some(Err(DecodeError::TruncatedValue))
        } else {
            None
        }
    }
}

/// Lazy, single-pass decoder over one encoded polyline.
///
/// Yields coordinates until the stream is exhausted. After the first error it
/// is fused and only yields `None`.
pub struct Decoder<'a> {
    values: UnsignedValues<'a>,
    header: Option<PolylineHeader>,
    last_lat: i64,
    last_lng: i64,
    last_z: i64,
    done: bool,
}

impl<'a> Decoder<'a> {
    /// Parses the header eagerly. An empty input produces a decoder with no
    /// header that yields nothing.
    pub fn new(encoded: &'a str) -> Result<Self, DecodeError> {
        let mut values = UnsignedValues {
            chars: encoded.chars().enumerate(),
        };

        let header = match values.next() {
            None => None,
            Some(version) => {
                let version = version?;
                if version != FORMAT_VERSION {
                    return Err(DecodeError::UnsupportedVersion(version));
                }
                let word = values.next().ok_or(DecodeError::MissingHeader)??;
                Some(PolylineHeader::from_word(word))
            }
        };

        Ok(Self {
            values,
            done: header.is_none(),
            header,
            last_lat: 0,
            last_lng: 0,
            last_z: 0,
        })
    }

    pub fn header(&self) -> Option<&PolylineHeader> {
        self.header.as_ref()
    }

    fn next_delta(&mut self) -> Result<i64, DecodeError> {
        match self.values.next() {
            Some(value) => value.map(to_signed),
            None => Err(DecodeError::PrematureEnd),
        }
    }

    fn next_coordinate(
        &mut self,
        header: PolylineHeader,
    ) -> Option<Result<Coordinate, DecodeError>> {
        let lat_delta = match self.values.next()? {
            Ok(value) => to_signed(value),
            Err(err) => return Some(Err(err)),
        };

        Some(self.finish_coordinate(header, lat_delta))
    }

    fn finish_coordinate(
        &mut self,
        header: PolylineHeader,
        lat_delta: i64,
    ) -> Result<Coordinate, DecodeError> {
        self.last_lat = self.last_lat.wrapping_add(lat_delta);
        self.last_lng = self.last_lng.wrapping_add(self.next_delta()?);

        let factor = header.factor_degree();
        let coordinate = Coordinate {
            latitude: self.last_lat as f64 / factor,
            longitude: self.last_lng as f64 / factor,
            altitude: None,
        };

        if header.has_third_dim() {
            self.last_z = self.last_z.wrapping_add(self.next_delta()?);
            return Ok(coordinate.with_altitude(self.last_z as f64 / header.factor_z()));
        }
        Ok(coordinate)
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Coordinate, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let header = self.header?;

        let item = self.next_coordinate(header);
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl std::iter::FusedIterator for Decoder<'_> {}

/// Decodes a flexible polyline into a materialized coordinate sequence.
///
/// An empty string decodes to an empty polyline.
pub fn decode(encoded: &str) -> Result<Polyline, DecodeError> {
    let points = Decoder::new(encoded)?.collect::<Result<Vec<_>, _>>()?;
    Ok(Polyline::new(points))
}

/// A route geometry as an ordered sequence of decoded coordinates.
///
/// Order is traversal order. Sequences concatenated from several legs keep
/// their shared join points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends another leg without merging the join point.
    pub fn extend(&mut self, other: Polyline) {
        self.points.extend(other.points);
    }
}

impl FromIterator<Polyline> for Polyline {
    fn from_iter<I: IntoIterator<Item = Polyline>>(legs: I) -> Self {
        let mut joined = Polyline::default();
        for leg in legs {
            joined.extend(leg);
        }
        joined
    }
}
