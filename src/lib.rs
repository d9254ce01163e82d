//! # build-protocol
//!
//! Bidirectional binary translation core for messages exchanged between
//! cooperating build processes.
//!
//! One [`Translator`] binds a call surface to one stream and one direction.
//! Callers issue the same ordered sequence of `translate_*` calls on both
//! sides: the write side encodes, the read side decodes into the caller's
//! slots, and because each type has exactly one translate method the two
//! paths cannot drift apart.
//!
//! ## Features
//! - **Primitive codec**: fixed-width scalars, nullable strings, durations,
//!   timestamps, enums, and a small set of recognized value types
//! - **Collection codec**: vectors, comparer-aware dictionaries, and hash
//!   sets, preserving the null-vs-empty distinction
//! - **Object codec**: factory-based construction plus self-describing field
//!   translation for reference types, including base/derived chaining
//! - **Exception codec**: type-preserving error graphs with inner-error
//!   chains and degrade-on-failure reconstruction
//! - **Interning**: session-scoped string and path deduplication within one
//!   packet
//!
//! ## Example
//! ```rust
//! use std::io::Cursor;
//! use build_protocol::{Result, Translator};
//!
//! fn run() -> Result<()> {
//!     let mut writer = Translator::write_to(Cursor::new(Vec::new()));
//!     let mut count = 3i32;
//!     let mut name = Some("ProjectA".to_string());
//!     writer.translate_i32(&mut count)?;
//!     writer.translate_string(&mut name)?;
//!
//!     let bytes = writer.into_inner().into_inner();
//!     let mut reader = Translator::read_from(Cursor::new(bytes));
//!     let mut count = 0i32;
//!     let mut name = None;
//!     reader.translate_i32(&mut count)?;
//!     reader.translate_string(&mut name)?;
//!
//!     assert_eq!(count, 3);
//!     assert_eq!(name.as_deref(), Some("ProjectA"));
//!     Ok(())
//! }
//! # run().unwrap();
//! ```
//!
//! Transport framing, packet schemas, and process lifecycle are external
//! collaborators; this crate only defines how payloads translate.

pub mod core;
pub mod error;
pub mod protocol;

pub use crate::core::collections::StringDict;
pub use crate::core::comparer::StringComparer;
pub use crate::core::translator::{Direction, Translator};
pub use crate::core::types::{AssemblyIdentity, CultureId, Version};
pub use crate::core::{Translatable, WireEnum};
pub use crate::error::{Result, TranslationError};
pub use crate::protocol::exception::{TransferredError, TransferredErrorKind};
