//! Snapshot serialization.
//!
//! This module provides the [`Serialize`] trait for writing a [`Snapshot`] in
//! the broadcast format:
//!
//! ```text
//! {"pitch_mapped":12.5,"roll_mapped":0.0,"yaw_mapped":-3.1,"pitch_pulse":1569,"roll_pulse":1500,"yaw_pulse":1483}
//! ```
//!
//! Mapped angles carry exactly one decimal place, pulses are integer microseconds.
//!
//! # Example
//!
//! ```
//! use servo_proto::{PerAxis, Serialize, Snapshot};
//!
//! let snapshot = Snapshot {
//!     mapped: PerAxis::new(36.0, 0.0, 0.0),
//!     pulse: PerAxis::new(1700, 1500, 1500),
//! };
//! let mut buf = [0u8; 256];
//! let len = snapshot.serialize(&mut buf).unwrap();
//! assert!(buf[..len].starts_with(b"{\"pitch_mapped\":36.0,"));
//! ```

use crate::format::{write_i32, write_tenths, MAX_I32_LEN, MAX_TENTHS_LEN};
use crate::types::{Axis, Snapshot};

/// Cursor over an output buffer whose size was checked up front.
struct SerializeBuf<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SerializeBuf<'a> {
    #[inline]
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn write_slice(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    #[inline]
    fn write_str(&mut self, s: &str) {
        self.write_slice(s.as_bytes());
    }

    #[inline]
    fn write_i32(&mut self, value: i32) {
        let mut tmp = [0u8; MAX_I32_LEN];
        let len = write_i32(&mut tmp, value);
        self.write_slice(&tmp[..len]);
    }

    #[inline]
    fn write_tenths(&mut self, value: f32) {
        let mut tmp = [0u8; MAX_TENTHS_LEN];
        let len = write_tenths(&mut tmp, value);
        self.write_slice(&tmp[..len]);
    }

    /// Write `"<axis><suffix>":`, preceded by a comma unless it is the first key.
    #[inline]
    fn write_key(&mut self, axis: Axis, suffix: &str) {
        let open: &[u8] = if self.pos == 1 { b"\"" } else { b",\"" };
        self.write_slice(open);
        self.write_str(axis.name());
        self.write_str(suffix);
        self.write_slice(b"\":");
    }

    #[inline]
    fn finish(self) -> usize {
        self.pos
    }
}

/// Maximum size of a serialized snapshot.
///
/// Breakdown: braces(2) + 6 keys with quotes, colons and commas(86) +
/// 3 tenths(3*13) + 3 pulses(3*11) = 160. We use 168 for safety margin.
pub const MAX_SNAPSHOT_SIZE: usize = 168;

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the serialized message.
    BufferTooSmall,
    /// A write operation failed (for `core::fmt::Write` adapters).
    WriteError,
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

/// Extension trait for serializing outbound messages.
pub trait Serialize {
    /// Serialize to the provided buffer.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is not large enough.
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError>;

    /// Serialize to a `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if `N` is not large enough.
    #[cfg(feature = "heapless")]
    fn serialize_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        let mut vec = heapless::Vec::new();
        vec.resize(N, 0)
            .map_err(|_| SerializeError::BufferTooSmall)?;
        let len = self.serialize(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }

    /// Serialize to a `core::fmt::Write` implementation such as `heapless::String`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the write fails.
    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError>;
}

impl Serialize for Snapshot {
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if buf.len() < MAX_SNAPSHOT_SIZE {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut sb = SerializeBuf::new(buf);
        sb.write_slice(b"{");
        for (axis, &mapped) in self.mapped.iter() {
            sb.write_key(axis, "_mapped");
            sb.write_tenths(mapped);
        }
        for (axis, &pulse) in self.pulse.iter() {
            sb.write_key(axis, "_pulse");
            sb.write_i32(pulse);
        }
        sb.write_slice(b"}");

        Ok(sb.finish())
    }

    fn serialize_fmt<W: core::fmt::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_SNAPSHOT_SIZE];
        let len = self.serialize(&mut buf)?;

        let s = core::str::from_utf8(&buf[..len]).map_err(|_| SerializeError::WriteError)?;
        writer.write_str(s).map_err(|_| SerializeError::WriteError)
    }
}
