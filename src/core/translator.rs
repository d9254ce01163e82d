//! # Translator
//!
//! The façade binding one call surface to one stream and one direction.
//!
//! A caller obtains a [`Translator`] over a stream, then issues `translate_*`
//! calls for each logical field in the exact order used on both sides. In
//! write mode values are encoded onto the stream; in read mode values are
//! decoded and written back into the caller's slot, discarding any initial
//! value. The translator exclusively owns the stream for its lifetime.
//!
//! ## Wire layout
//! Positional and little-endian, with no self-describing tags beyond
//! per-value markers:
//! - bool/u8: 1 byte; i16/i32/u32/i64/f64: fixed-width
//! - strings: null/not-null marker, then a LEB128 length prefix + UTF-8 bytes
//! - durations and timestamps: fixed-width nanosecond integers
//! - objects: null/not-null marker, then their field sequence

use std::io::{Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::core::intern::InternSession;
use crate::core::{Translatable, WireEnum};
use crate::error::{Result, TranslationError};

/// The direction a translator moves data in. One instance handles either
/// all-write or all-read for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Values are encoded onto the stream.
    WriteToStream,
    /// Values are decoded from the stream into the caller's slots.
    ReadFromStream,
}

impl WireEnum for Direction {
    fn to_wire(&self) -> i32 {
        match self {
            Direction::WriteToStream => 0,
            Direction::ReadFromStream => 1,
        }
    }

    fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Direction::WriteToStream),
            1 => Some(Direction::ReadFromStream),
            _ => None,
        }
    }
}

/// Bidirectional codec bound to one stream and one direction.
///
/// Created per operation and released after; [`Translator::into_inner`]
/// returns the stream. The optional interning session is scoped to a single
/// [`Translator::with_interning`] call and is always cleared on scope exit.
#[derive(Debug)]
pub struct Translator<S> {
    direction: Direction,
    stream: S,
    pub(crate) intern: Option<InternSession>,
}

impl<S> Translator<S> {
    /// Creates a translator that encodes values onto `stream`.
    pub fn write_to(stream: S) -> Self {
        Translator {
            direction: Direction::WriteToStream,
            stream,
            intern: None,
        }
    }

    /// Creates a translator that decodes values from `stream`.
    pub fn read_from(stream: S) -> Self {
        Translator {
            direction: Direction::ReadFromStream,
            stream,
            intern: None,
        }
    }

    /// The direction this translator was bound with.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Translator<S> {
    /// Translates a bool (1 byte on the wire).
    pub fn translate_bool(&mut self, value: &mut bool) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.write_raw_bool(*value)?,
            Direction::ReadFromStream => *value = self.read_raw_bool()?,
        }
        Ok(())
    }

    /// Translates a single byte.
    pub fn translate_u8(&mut self, value: &mut u8) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.write_raw_u8(*value)?,
            Direction::ReadFromStream => *value = self.read_raw_u8()?,
        }
        Ok(())
    }

    /// Translates a 16-bit signed integer.
    pub fn translate_i16(&mut self, value: &mut i16) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.stream.write_all(&value.to_le_bytes())?,
            Direction::ReadFromStream => {
                let mut buf = [0u8; 2];
                self.stream.read_exact(&mut buf)?;
                *value = i16::from_le_bytes(buf);
            }
        }
        Ok(())
    }

    /// Translates a 32-bit signed integer.
    pub fn translate_i32(&mut self, value: &mut i32) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.write_raw_i32(*value)?,
            Direction::ReadFromStream => *value = self.read_raw_i32()?,
        }
        Ok(())
    }

    /// Translates a 32-bit unsigned integer (flags and similar).
    pub fn translate_u32(&mut self, value: &mut u32) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.stream.write_all(&value.to_le_bytes())?,
            Direction::ReadFromStream => {
                let mut buf = [0u8; 4];
                self.stream.read_exact(&mut buf)?;
                *value = u32::from_le_bytes(buf);
            }
        }
        Ok(())
    }

    /// Translates a 64-bit signed integer.
    pub fn translate_i64(&mut self, value: &mut i64) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.stream.write_all(&value.to_le_bytes())?,
            Direction::ReadFromStream => {
                let mut buf = [0u8; 8];
                self.stream.read_exact(&mut buf)?;
                *value = i64::from_le_bytes(buf);
            }
        }
        Ok(())
    }

    /// Translates a double-precision float via its bit pattern.
    pub fn translate_f64(&mut self, value: &mut f64) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.stream.write_all(&value.to_bits().to_le_bytes())?,
            Direction::ReadFromStream => {
                let mut buf = [0u8; 8];
                self.stream.read_exact(&mut buf)?;
                *value = f64::from_bits(u64::from_le_bytes(buf));
            }
        }
        Ok(())
    }

    /// Translates a duration as a fixed-width nanosecond count. Durations
    /// beyond the 64-bit nanosecond range fail rather than wrap.
    pub fn translate_duration(&mut self, value: &mut Duration) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => {
                let nanos = u64::try_from(value.as_nanos()).map_err(|_| {
                    TranslationError::OutOfRange("duration exceeds the 64-bit nanosecond range")
                })?;
                self.stream.write_all(&nanos.to_le_bytes())?;
            }
            Direction::ReadFromStream => {
                let mut buf = [0u8; 8];
                self.stream.read_exact(&mut buf)?;
                *value = Duration::from_nanos(u64::from_le_bytes(buf));
            }
        }
        Ok(())
    }

    /// Translates a timestamp as signed nanoseconds relative to the Unix
    /// epoch. Pre-epoch timestamps are representable.
    pub fn translate_timestamp(&mut self, value: &mut SystemTime) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => {
                let nanos = match value.duration_since(UNIX_EPOCH) {
                    Ok(since) => i64::try_from(since.as_nanos()).map_err(|_| {
                        TranslationError::OutOfRange("timestamp too far after the Unix epoch")
                    })?,
                    Err(before) => i64::try_from(before.duration().as_nanos())
                        .map(|nanos| -nanos)
                        .map_err(|_| {
                            TranslationError::OutOfRange("timestamp too far before the Unix epoch")
                        })?,
                };
                self.stream.write_all(&nanos.to_le_bytes())?;
            }
            Direction::ReadFromStream => {
                let mut buf = [0u8; 8];
                self.stream.read_exact(&mut buf)?;
                let nanos = i64::from_le_bytes(buf);
                *value = if nanos >= 0 {
                    UNIX_EPOCH + Duration::from_nanos(nanos as u64)
                } else {
                    UNIX_EPOCH - Duration::from_nanos(nanos.unsigned_abs())
                };
            }
        }
        Ok(())
    }

    /// Translates an enum via its underlying integer representation.
    pub fn translate_enum<E: WireEnum>(&mut self, value: &mut E) -> Result<()> {
        let mut wire = value.to_wire();
        self.translate_i32(&mut wire)?;
        if self.direction == Direction::ReadFromStream {
            *value = E::from_wire(wire)
                .ok_or(TranslationError::UnsupportedType(std::any::type_name::<E>()))?;
        }
        Ok(())
    }

    /// Translates a nullable string. The null marker is distinct from the
    /// length-0 encoding of an empty string, so `None` and `Some("")`
    /// round-trip exactly.
    pub fn translate_string(&mut self, value: &mut Option<String>) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => match value {
                Some(s) => {
                    self.write_raw_bool(true)?;
                    self.write_raw_string(s)?;
                }
                None => self.write_raw_bool(false)?,
            },
            Direction::ReadFromStream => {
                *value = if self.read_raw_bool()? {
                    Some(self.read_raw_string()?)
                } else {
                    None
                };
            }
        }
        Ok(())
    }

    /// Translates a string that is never null on the wire (no marker byte).
    /// Used for fields whose contract guarantees presence.
    pub fn translate_required_string(&mut self, value: &mut String) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => self.write_raw_string(value)?,
            Direction::ReadFromStream => *value = self.read_raw_string()?,
        }
        Ok(())
    }

    /// Translates a nullable byte buffer: an i32 length (-1 for null), then
    /// the raw bytes.
    pub fn translate_bytes(&mut self, value: &mut Option<Vec<u8>>) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => match value {
                Some(bytes) => {
                    self.write_len_marker(Some(bytes.len()))?;
                    self.stream.write_all(bytes)?;
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(len) => {
                        let mut bytes = vec![0u8; len];
                        self.stream.read_exact(&mut bytes)?;
                        Some(bytes)
                    }
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable self-describing object constructed via `Default`
    /// on read: a null/not-null marker, then the object's field sequence.
    pub fn translate_opt<T: Translatable + Default>(&mut self, value: &mut Option<T>) -> Result<()> {
        match self.direction {
            Direction::WriteToStream => match value {
                Some(v) => {
                    self.write_raw_bool(true)?;
                    v.translate(self)?;
                }
                None => self.write_raw_bool(false)?,
            },
            Direction::ReadFromStream => {
                *value = if self.read_raw_bool()? {
                    let mut v = T::default();
                    v.translate(self)?;
                    Some(v)
                } else {
                    None
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable self-describing object constructed via a factory
    /// on read. The factory both constructs the instance and performs the
    /// field translation, mirroring the write side's call to
    /// [`Translatable::translate`].
    pub fn translate_opt_with<T, F>(&mut self, value: &mut Option<T>, factory: F) -> Result<()>
    where
        T: Translatable,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        match self.direction {
            Direction::WriteToStream => match value {
                Some(v) => {
                    self.write_raw_bool(true)?;
                    v.translate(self)?;
                }
                None => self.write_raw_bool(false)?,
            },
            Direction::ReadFromStream => {
                *value = if self.read_raw_bool()? {
                    Some(factory(self)?)
                } else {
                    None
                };
            }
        }
        Ok(())
    }

    // ---- raw wire primitives -------------------------------------------
    //
    // These are the direction-specific halves the public methods dispatch
    // into. They stay crate-private so every caller goes through a single
    // translate method per type.

    pub(crate) fn write_raw_u8(&mut self, value: u8) -> Result<()> {
        self.stream.write_all(&[value])?;
        Ok(())
    }

    pub(crate) fn read_raw_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.stream.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub(crate) fn write_raw_bool(&mut self, value: bool) -> Result<()> {
        self.write_raw_u8(u8::from(value))
    }

    pub(crate) fn read_raw_bool(&mut self) -> Result<bool> {
        match self.read_raw_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(TranslationError::Desync(format!(
                "expected a marker byte of 0 or 1, found {other}"
            ))),
        }
    }

    pub(crate) fn write_raw_i32(&mut self, value: i32) -> Result<()> {
        self.stream.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub(crate) fn read_raw_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.stream.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Writes a LEB128 length or id prefix.
    pub(crate) fn write_raw_varint(&mut self, mut value: u32) -> Result<()> {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.write_raw_u8(byte)?;
            if value == 0 {
                return Ok(());
            }
        }
    }

    pub(crate) fn read_raw_varint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let byte = self.read_raw_u8()?;
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 35 {
                return Err(TranslationError::Desync(
                    "varint prefix overflows 32 bits".to_string(),
                ));
            }
        }
    }

    /// Writes a length-prefixed UTF-8 string payload, no null marker.
    pub(crate) fn write_raw_string(&mut self, value: &str) -> Result<()> {
        let len = u32::try_from(value.len())
            .map_err(|_| TranslationError::OutOfRange("string length exceeds 32 bits"))?;
        self.write_raw_varint(len)?;
        self.stream.write_all(value.as_bytes())?;
        Ok(())
    }

    pub(crate) fn read_raw_string(&mut self) -> Result<String> {
        let len = self.read_raw_varint()? as usize;
        let mut bytes = vec![0u8; len];
        self.stream.read_exact(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Writes the tri-state collection length: -1 for null, else the count.
    pub(crate) fn write_len_marker(&mut self, len: Option<usize>) -> Result<()> {
        let wire = match len {
            Some(count) => i32::try_from(count)
                .map_err(|_| TranslationError::OutOfRange("collection length exceeds 32 bits"))?,
            None => -1,
        };
        self.write_raw_i32(wire)
    }

    pub(crate) fn read_len_marker(&mut self) -> Result<Option<usize>> {
        match self.read_raw_i32()? {
            -1 => Ok(None),
            count if count >= 0 => Ok(Some(count as usize)),
            count => Err(TranslationError::Desync(format!(
                "negative collection length {count}"
            ))),
        }
    }
}
