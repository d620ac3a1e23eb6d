//! Frame log file format structures and record codec
//!
//! Defines the binary layout of one frame record and of the optional file
//! header, with encode/decode functions used by [`FrameLog`](super::FrameLog).
//!
//! ## File Structure
//!
//! 1. **Header** (32 bytes, optional) - magic, format version, header length, layout
//! 2. **Records** - fixed-size frame records back to back, no per-record prefix
//!
//! Legacy logs have no header: the file is nothing but records, and the
//! layout must be supplied by the caller.
//!
//! ## Record Layout
//!
//! All multi-byte fields are little-endian.
//!
//! | field              | size                              |
//! |--------------------|-----------------------------------|
//! | depth samples      | `W*H*2`, row-major u16            |
//! | depth timestamp    | 8, i64                            |
//! | infrared samples   | `W*H*2`, row-major u16            |
//! | infrared timestamp | 8, i64                            |
//! | bodies             | `body_count * (11 + 29 * joints)` |
//! | joint projections  | `body_count * joints * 8`         |
//!
//! Each body is `tracked: u8`, `left_hand_state: u8`, `right_hand_state: u8`,
//! `timestamp: i64`, then per joint `position xyz: 3 x f32`,
//! `orientation xyzw: 4 x f32`, `state: u8`. There is no padding anywhere.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use tracing::{debug, trace};

use crate::types::{
    Body, DepthImage, Frame, FrameLayout, HandState, Joint, Point2, TrackingState, Vector3, Vector4,
};
use crate::{FrameLogError, Result};

/// Magic bytes at offset 0 of a headered log.
pub const MAGIC: [u8; 8] = *b"FRAMELOG";

/// Current header format version.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the version 1 header in bytes.
pub const HEADER_SIZE: usize = 32;

// Later versions may grow the header; anything past this is corruption.
const MAX_HEADER_LEN: u32 = 4096;

/// How a log stores (or does not store) its layout.
///
/// Chosen explicitly by the caller whenever a log is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Self-describing header at the start of the file
    Headered,
    /// Bare records, layout agreed out of band
    Legacy,
    /// Read the header if the magic is present, otherwise treat as legacy.
    /// Writes behave like `Headered`.
    Detect,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Headered => f.write_str("headered"),
            LogFormat::Legacy => f.write_str("legacy"),
            LogFormat::Detect => f.write_str("detect"),
        }
    }
}

/// Self-describing log header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    /// Offset of the first record
    pub header_len: u32,
    pub layout: FrameLayout,
}

impl FileHeader {
    pub fn new(layout: FrameLayout) -> Self {
        Self { version: FORMAT_VERSION, header_len: HEADER_SIZE as u32, layout }
    }

    /// Whether `bytes` begin with the header magic.
    pub fn has_magic(bytes: &[u8]) -> bool {
        bytes.len() >= MAGIC.len() && bytes[..MAGIC.len()] == MAGIC
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..8].copy_from_slice(&MAGIC);
        out[8..12].copy_from_slice(&self.version.to_le_bytes());
        out[12..16].copy_from_slice(&self.header_len.to_le_bytes());
        out[16..20].copy_from_slice(&self.layout.width.to_le_bytes());
        out[20..24].copy_from_slice(&self.layout.height.to_le_bytes());
        out[24..28].copy_from_slice(&self.layout.body_count.to_le_bytes());
        out[28..32].copy_from_slice(&self.layout.joint_count.to_le_bytes());
        out
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// Parse a header from the first [`HEADER_SIZE`] bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(FrameLogError::header(format!(
                "need {} header bytes, have {}",
                HEADER_SIZE,
                data.len()
            )));
        }
        if !Self::has_magic(data) {
            return Err(FrameLogError::header("missing FRAMELOG magic"));
        }

        let header = Self {
            version: parse_u32_le(data, 8)?,
            header_len: parse_u32_le(data, 12)?,
            layout: FrameLayout::new(
                parse_u32_le(data, 16)?,
                parse_u32_le(data, 20)?,
                parse_u32_le(data, 24)?,
                parse_u32_le(data, 28)?,
            ),
        };

        debug!(
            "Parsed frame log header: version={}, header_len={}, layout={}",
            header.version, header.header_len, header.layout
        );
        Ok(header)
    }

    pub fn parse_from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut data = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut data)
            .map_err(|e| FrameLogError::header(format!("failed to read {} header bytes: {}", HEADER_SIZE, e)))?;
        Self::parse(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(FrameLogError::Version { expected: FORMAT_VERSION, found: self.version });
        }
        if self.header_len < HEADER_SIZE as u32 || self.header_len > MAX_HEADER_LEN {
            return Err(FrameLogError::header(format!("header length {} is out of range", self.header_len)));
        }
        self.layout.validate().map_err(|e| match e {
            FrameLogError::Config { details } => FrameLogError::header(details),
            other => other,
        })
    }
}

/// Append the record for `frame` to `out`.
///
/// The caller is responsible for checking the frame against the log layout;
/// the record length follows the frame's own buffers.
pub fn encode_frame(frame: &Frame, out: &mut Vec<u8>) {
    out.reserve(frame.layout().record_size());

    encode_image(&frame.depth, out);
    out.extend_from_slice(&frame.depth_timestamp.to_le_bytes());
    encode_image(&frame.infrared, out);
    out.extend_from_slice(&frame.infrared_timestamp.to_le_bytes());

    for body in &frame.bodies {
        encode_body(body, out);
    }
    for point in frame.joint_projections.iter().flatten() {
        out.extend_from_slice(&point.x.to_le_bytes());
        out.extend_from_slice(&point.y.to_le_bytes());
    }
}

fn encode_image(image: &DepthImage, out: &mut Vec<u8>) {
    for sample in image.samples() {
        out.extend_from_slice(&sample.to_le_bytes());
    }
}

fn encode_body(body: &Body, out: &mut Vec<u8>) {
    out.push(body.tracked as u8);
    out.push(body.left_hand_state as u8);
    out.push(body.right_hand_state as u8);
    out.extend_from_slice(&body.timestamp.to_le_bytes());
    for joint in &body.joints {
        let p = joint.position;
        let o = joint.orientation;
        for v in [p.x, p.y, p.z, o.x, o.y, o.z, o.w] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.push(joint.state as u8);
    }
}

/// Decode one complete record laid out for `layout`.
pub fn decode_frame(data: &[u8], layout: &FrameLayout) -> Result<Frame> {
    let expected = layout.record_size();
    if data.len() != expected {
        return Err(FrameLogError::parse(
            "Frame record",
            format!("record is {} bytes, layout {} needs {}", data.len(), layout, expected),
        ));
    }

    let mut cursor = RecordCursor { data, offset: 0 };
    let joints = layout.joint_count as usize;
    let bodies = layout.body_count as usize;

    let depth = cursor.image(layout)?;
    let depth_timestamp = cursor.i64()?;
    let infrared = cursor.image(layout)?;
    let infrared_timestamp = cursor.i64()?;

    let mut body_list = Vec::with_capacity(bodies);
    for index in 0..bodies {
        body_list.push(cursor.body(index, joints)?);
    }

    let mut joint_projections = Vec::with_capacity(bodies);
    for _ in 0..bodies {
        let mut row = Vec::with_capacity(joints);
        for _ in 0..joints {
            row.push(Point2::new(cursor.f32()?, cursor.f32()?));
        }
        joint_projections.push(row);
    }

    trace!("Decoded {} byte record", cursor.offset);
    Ok(Frame { depth, depth_timestamp, infrared, infrared_timestamp, bodies: body_list, joint_projections })
}

/// Sequential reader over one record's bytes.
struct RecordCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl RecordCursor<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = take_array::<N>(self.data, self.offset)?;
        self.offset += N;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    fn image(&mut self, layout: &FrameLayout) -> Result<DepthImage> {
        let len = layout.image_bytes();
        let bytes = self.data.get(self.offset..self.offset + len).ok_or_else(|| {
            FrameLogError::parse("Image samples", format!("need {} bytes at offset {}", len, self.offset))
        })?;
        self.offset += len;

        let samples = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
        DepthImage::from_samples(layout.width, layout.height, samples)
            .ok_or_else(|| FrameLogError::parse("Image samples", "sample count does not match layout"))
    }

    fn body(&mut self, index: usize, joint_count: usize) -> Result<Body> {
        let tracked = match self.u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(FrameLogError::parse(
                    format!("Body {}", index),
                    format!("tracked flag must be 0 or 1, found {}", other),
                ));
            }
        };
        let left_hand_state = self.hand_state(index, "left")?;
        let right_hand_state = self.hand_state(index, "right")?;
        let timestamp = self.i64()?;

        let mut joints = Vec::with_capacity(joint_count);
        for joint_index in 0..joint_count {
            let position = Vector3 { x: self.f32()?, y: self.f32()?, z: self.f32()? };
            let orientation = Vector4 { x: self.f32()?, y: self.f32()?, z: self.f32()?, w: self.f32()? };
            let raw = self.u8()?;
            let state = TrackingState::from_u8(raw).ok_or_else(|| {
                FrameLogError::parse(
                    format!("Body {} joint {}", index, joint_index),
                    format!("unknown tracking state {}", raw),
                )
            })?;
            joints.push(Joint { position, orientation, state });
        }

        Ok(Body { tracked, joints, left_hand_state, right_hand_state, timestamp })
    }

    fn hand_state(&mut self, index: usize, hand: &str) -> Result<HandState> {
        let raw = self.u8()?;
        HandState::from_u8(raw).ok_or_else(|| {
            FrameLogError::parse(format!("Body {} {} hand", index, hand), format!("unknown hand state {}", raw))
        })
    }
}

/// Safe byte parsing helpers with bounds checking
fn take_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..offset + N).and_then(|s| s.try_into().ok()).ok_or_else(|| {
        FrameLogError::parse(
            "Field parsing",
            format!(
                "Insufficient data at offset {} (need {} bytes, have {})",
                offset,
                N,
                data.len().saturating_sub(offset)
            ),
        )
    })
}

fn parse_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(take_array::<4>(data, offset)?))
}
