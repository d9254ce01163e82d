//! # Exception Codec
//!
//! Type-preserving serialization of error graphs, including inner-error
//! chains and captured stack descriptions.
//!
//! The set of error kinds that cross the wire with their concrete identity
//! intact is closed and statically registered: a wire name maps back to a
//! [`TransferredErrorKind`] through a fixed table, never a runtime-
//! discoverable plugin point. Any wire name outside that table degrades, for
//! that one frame only, to the [`TransferredErrorKind::Generic`] container
//! preserving message, stack text, and the original type's name; the rest of
//! the chain still reconstructs.

use std::error::Error;
use std::fmt;
use std::io::{Read, Write};

use tracing::warn;

use crate::core::translator::{Direction, Translator};
use crate::error::Result;

/// The closed set of error kinds with a serialization-safe construction
/// path. Everything else travels as [`TransferredErrorKind::Generic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferredErrorKind {
    /// A project file failed validation.
    InvalidProjectFile,
    /// An internal invariant of the build engine was violated.
    InternalError,
    /// The build was aborted before completion.
    BuildAborted,
    /// An I/O failure surfaced from the host process.
    Io,
    /// Degrade container for an unrecognized error type; carries the
    /// original type's wire name.
    Generic(String),
}

/// The statically registered wire names for reconstructable kinds.
const KIND_REGISTRY: &[(&str, TransferredErrorKind)] = &[
    ("build.invalid_project_file", TransferredErrorKind::InvalidProjectFile),
    ("build.internal_error", TransferredErrorKind::InternalError),
    ("build.aborted", TransferredErrorKind::BuildAborted),
    ("io.error", TransferredErrorKind::Io),
];

impl TransferredErrorKind {
    /// The name this kind travels under.
    pub fn wire_name(&self) -> &str {
        match self {
            TransferredErrorKind::Generic(name) => name.as_str(),
            kind => KIND_REGISTRY
                .iter()
                .find(|(_, registered)| registered == kind)
                .map(|(name, _)| *name)
                .unwrap_or("error"),
        }
    }

    /// Resolves a wire name against the registry, degrading unknown names to
    /// [`TransferredErrorKind::Generic`].
    pub fn from_wire_name(name: &str) -> Self {
        match KIND_REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
        {
            Some((_, kind)) => kind.clone(),
            None => {
                warn!(type_name = name, "unrecognized error type degraded to generic container");
                TransferredErrorKind::Generic(name.to_owned())
            }
        }
    }
}

/// One frame of a transferred error graph: kind, message, optional stack
/// description, and a depth-first inner-error chain.
///
/// Implements [`std::error::Error`] with `source()` walking the inner chain,
/// so a reconstructed graph slots into ordinary error reporting on the
/// receiving side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferredError {
    kind: TransferredErrorKind,
    message: String,
    remote_stack: Option<String>,
    inner: Option<Box<TransferredError>>,
}

impl TransferredError {
    pub fn new(kind: TransferredErrorKind, message: impl Into<String>) -> Self {
        TransferredError {
            kind,
            message: message.into(),
            remote_stack: None,
            inner: None,
        }
    }

    /// Attaches the stack description captured where the error was raised.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.remote_stack = Some(stack.into());
        self
    }

    /// Chains an inner error below this frame.
    pub fn with_inner(mut self, inner: TransferredError) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Builds a transferred graph from an arbitrary error chain. A frame
    /// that is already a [`TransferredError`] is spliced in whole; an
    /// [`std::io::Error`] keeps its kind; anything else degrades to the
    /// generic container with its display text.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        if let Some(transferred) = error.downcast_ref::<TransferredError>() {
            return transferred.clone();
        }
        let kind = if error.is::<std::io::Error>() {
            TransferredErrorKind::Io
        } else {
            TransferredErrorKind::Generic("error".to_owned())
        };
        let mut frame = TransferredError::new(kind, error.to_string());
        if let Some(source) = error.source() {
            frame.inner = Some(Box::new(TransferredError::from_error(source)));
        }
        frame
    }

    pub fn kind(&self) -> &TransferredErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn remote_stack(&self) -> Option<&str> {
        self.remote_stack.as_deref()
    }

    pub fn inner(&self) -> Option<&TransferredError> {
        self.inner.as_deref()
    }

    /// Number of frames in the chain, this one included.
    pub fn chain_len(&self) -> usize {
        1 + self.inner.as_ref().map_or(0, |inner| inner.chain_len())
    }
}

impl fmt::Display for TransferredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for TransferredError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner
            .as_ref()
            .map(|inner| inner.as_ref() as &(dyn Error + 'static))
    }
}

impl<S: Read + Write> Translator<S> {
    /// Translates a nullable error graph. The inner-error chain serializes
    /// depth-first and reconstructs in the same order, so chain length and,
    /// where reconstructable, concrete kinds match the original.
    pub fn translate_exception(&mut self, value: &mut Option<TransferredError>) -> Result<()> {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(error) => {
                    self.write_raw_bool(true)?;
                    self.write_error_frame(error)?;
                }
                None => self.write_raw_bool(false)?,
            },
            Direction::ReadFromStream => {
                *value = if self.read_raw_bool()? {
                    Some(self.read_error_frame()?)
                } else {
                    None
                };
            }
        }
        Ok(())
    }

    fn write_error_frame(&mut self, error: &TransferredError) -> Result<()> {
        self.write_raw_string(error.kind.wire_name())?;
        self.write_raw_string(&error.message)?;
        match &error.remote_stack {
            Some(stack) => {
                self.write_raw_bool(true)?;
                self.write_raw_string(stack)?;
            }
            None => self.write_raw_bool(false)?,
        }
        match &error.inner {
            Some(inner) => {
                self.write_raw_bool(true)?;
                self.write_error_frame(inner)?;
            }
            None => self.write_raw_bool(false)?,
        }
        Ok(())
    }

    fn read_error_frame(&mut self) -> Result<TransferredError> {
        let wire_name = self.read_raw_string()?;
        let kind = TransferredErrorKind::from_wire_name(&wire_name);
        let message = self.read_raw_string()?;
        let remote_stack = if self.read_raw_bool()? {
            Some(self.read_raw_string()?)
        } else {
            None
        };
        let inner = if self.read_raw_bool()? {
            Some(Box::new(self.read_error_frame()?))
        } else {
            None
        };
        Ok(TransferredError {
            kind,
            message,
            remote_stack,
            inner,
        })
    }
}
