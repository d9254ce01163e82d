//! # Protocol Layer
//!
//! Wire-level constructs layered on the translation core: the error-graph
//! codec that carries failure chains between cooperating build processes.
//!
//! Transport framing (length/type headers, pipes) and the packet-type
//! registry live outside this crate; this layer only defines how payload
//! constructs serialize.

pub mod exception;
