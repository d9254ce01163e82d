//! # Error Types
//!
//! Error handling for the translation layer.
//!
//! This module defines all error variants that can occur while translating a
//! packet body, from low-level stream I/O failures to protocol desyncs where
//! the reader sees bytes inconsistent with what the write side produced.
//!
//! ## Error Categories
//! - **I/O Errors**: Failures on the underlying stream, propagated unchanged
//! - **Desync Errors**: Markers, lengths, or ids inconsistent with the write side
//! - **Unsupported Types**: A decoded discriminant no registered type accepts
//! - **Range Errors**: Write-side values the wire encoding cannot carry
//! - **Intern Scope Errors**: Illegal nesting of interning scopes
//!
//! A failed translation aborts the in-progress packet. Partial writes and
//! reads are not patched or retried at this layer; the framing layer above
//! must treat a failed translation as a fatal packet.

use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

/// TranslationError is the primary error type for all translation operations.
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The read side encountered bytes inconsistent with the expected wire
    /// layout. This indicates a caller or version bug, not corrupt transport.
    #[error("protocol desync: {0}")]
    Desync(String),

    #[error("invalid UTF-8 in string payload: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// A decoded discriminant that no registered type accepts.
    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),

    /// A write-side value outside the range its wire encoding can carry.
    /// Nothing is encoded; the packet aborts before a corrupted width lands
    /// on the stream.
    #[error("value out of wire range: {0}")]
    OutOfRange(&'static str),

    /// A second interning scope was opened while one is already active.
    /// Interning scopes never nest.
    #[error("an interning scope is already active on this translator")]
    NestedInternScope,
}

/// Type alias for Results using TranslationError
pub type Result<T> = std::result::Result<T, TranslationError>;
