//! # Interning Session
//!
//! Session-scoped string deduplication for one serialized packet.
//!
//! Inside a packet body a caller may open at most one interning scope via
//! [`Translator::with_interning`]. Within it, the first sighting of a string
//! (under the scope's comparer) travels as a "new" record carrying the raw
//! text and implicitly claiming the next id; every later comparer-equal
//! sighting travels as a "reference" record carrying just that id. On read,
//! repeats resolve to the exact first-seen spelling, which is what
//! canonicalizes casing within the scope.
//!
//! The session is torn down on every scope exit, including failure, so one
//! translator can safely run successive scopes with different comparers.
//! Outside a scope, the intern calls behave exactly like plain string
//! translation: no markers, no table, no stream artifacts.

use std::collections::HashMap;
use std::io::{Read, Write};

use tracing::{debug, trace};

use crate::core::collections::StringDict;
use crate::core::comparer::StringComparer;
use crate::core::translator::{Direction, Translator};
use crate::core::Translatable;
use crate::error::{Result, TranslationError};

/// Record marker: raw string payload follows, id assigned implicitly.
const MARKER_NEW: u8 = 0;
/// Record marker: a previously assigned id follows.
const MARKER_REF: u8 = 1;

/// State for one active interning scope.
///
/// The write side populates `forward` (folded value -> id); the read side
/// populates `reverse` (id -> first-seen spelling). Ids are assigned densely
/// in sighting order on both sides, so they agree without ever being
/// negotiated.
#[derive(Debug)]
pub(crate) struct InternSession {
    comparer: StringComparer,
    forward: HashMap<String, u32>,
    reverse: Vec<String>,
}

/// Outcome of a write-side table probe.
enum Sighting {
    First,
    Repeat(u32),
}

impl InternSession {
    fn with_capacity(comparer: StringComparer, capacity: usize) -> Self {
        InternSession {
            comparer,
            forward: HashMap::with_capacity(capacity),
            reverse: Vec::with_capacity(capacity),
        }
    }

    /// Probes the write-side table, assigning the next id on a first
    /// sighting.
    fn probe(&mut self, value: &str) -> Sighting {
        let folded = self.comparer.fold(value).into_owned();
        if let Some(&id) = self.forward.get(&folded) {
            return Sighting::Repeat(id);
        }
        let id = self.forward.len() as u32;
        self.forward.insert(folded, id);
        Sighting::First
    }

    /// Installs a decoded spelling under the next id on the read side.
    fn install(&mut self, spelling: String) {
        self.reverse.push(spelling);
    }

    /// Resolves an id to the first-seen spelling on the read side.
    fn resolve(&self, id: u32) -> Option<&str> {
        self.reverse.get(id as usize).map(String::as_str)
    }
}

impl<S: Read + Write> Translator<S> {
    /// Runs `body` inside an interning scope with the given comparer and
    /// capacity hint (a sizing hint only).
    ///
    /// Opening a scope while one is active fails with
    /// [`TranslationError::NestedInternScope`] without touching the stream or
    /// the enclosing scope's table. The session is cleared on every exit
    /// path, so a later scope on the same translator starts clean. A scope
    /// whose body makes no intern calls writes and reads nothing.
    pub fn with_interning<F, T>(
        &mut self,
        comparer: StringComparer,
        capacity: usize,
        body: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.intern.is_some() {
            return Err(TranslationError::NestedInternScope);
        }

        debug!(?comparer, capacity, "opening intern scope");
        self.intern = Some(InternSession::with_capacity(comparer, capacity));
        let result = body(self);
        // Torn down unconditionally so a failed body cannot leak table state
        // into the next scope.
        self.intern = None;
        trace!(ok = result.is_ok(), "intern scope closed");
        result
    }

    /// Translates a nullable string through the active interning scope, or
    /// identically to [`Translator::translate_string`] when no scope is
    /// active.
    pub fn intern_string(&mut self, value: &mut Option<String>) -> Result<()> {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(s) => {
                    self.write_raw_bool(true)?;
                    self.write_interned(s)?;
                }
                None => self.write_raw_bool(false)?,
            },
            Direction::ReadFromStream => {
                *value = if self.read_raw_bool()? {
                    Some(self.read_interned()?)
                } else {
                    None
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable path, interning its directory and filename
    /// components independently in the scope's shared table.
    ///
    /// The path splits at the final separator; the directory component keeps
    /// its trailing separator, so read-side reconstruction is plain
    /// concatenation. A component can dedup against an unrelated whole-string
    /// entry and vice versa, regardless of which was encountered first.
    /// Outside a scope this is identical to plain string translation.
    pub fn intern_path(&mut self, value: &mut Option<String>) -> Result<()> {
        if self.intern.is_none() {
            return self.translate_string(value);
        }
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(path) => {
                    self.write_raw_bool(true)?;
                    let (directory, file_name) = split_path(path);
                    self.write_interned(directory)?;
                    self.write_interned(file_name)?;
                }
                None => self.write_raw_bool(false)?,
            },
            Direction::ReadFromStream => {
                *value = if self.read_raw_bool()? {
                    let directory = self.read_interned()?;
                    let file_name = self.read_interned()?;
                    Some(format!("{directory}{file_name}"))
                } else {
                    None
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable vector of strings with each element interned.
    pub fn intern_string_vec(&mut self, value: &mut Option<Vec<String>>) -> Result<()> {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(items) => {
                    self.write_len_marker(Some(items.len()))?;
                    for item in items.iter() {
                        self.write_interned(item)?;
                    }
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(count) => {
                        let mut items = Vec::with_capacity(count);
                        for _ in 0..count {
                            items.push(self.read_interned()?);
                        }
                        Some(items)
                    }
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable string-to-string dictionary with keys and values
    /// interned. The dictionary comparer is independent of the scope's.
    pub fn intern_string_dictionary(
        &mut self,
        value: &mut Option<StringDict<String>>,
        comparer: StringComparer,
    ) -> Result<()> {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(dict) => {
                    self.write_len_marker(Some(dict.len()))?;
                    for (key, entry) in dict.iter() {
                        self.write_interned(key)?;
                        self.write_interned(entry)?;
                    }
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(count) => {
                        let mut dict = StringDict::with_capacity(comparer, count);
                        for _ in 0..count {
                            let key = self.read_interned()?;
                            let entry = self.read_interned()?;
                            dict.insert(key, entry);
                        }
                        Some(dict)
                    }
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable dictionary with interned keys and
    /// factory-constructed values.
    pub fn intern_dictionary_with<V, F>(
        &mut self,
        value: &mut Option<StringDict<V>>,
        comparer: StringComparer,
        mut factory: F,
    ) -> Result<()>
    where
        V: Translatable,
        F: FnMut(&mut Self) -> Result<V>,
    {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(dict) => {
                    self.write_len_marker(Some(dict.len()))?;
                    for (key, entry) in dict.iter_mut() {
                        self.write_interned(key)?;
                        entry.translate(self)?;
                    }
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(count) => {
                        let mut dict = StringDict::with_capacity(comparer, count);
                        for _ in 0..count {
                            let key = self.read_interned()?;
                            let entry = factory(self)?;
                            dict.insert(key, entry);
                        }
                        Some(dict)
                    }
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Writes one intern record for a non-null string: a "new" or
    /// "reference" record inside a scope, the raw string outside one.
    fn write_interned(&mut self, value: &str) -> Result<()> {
        let sighting = match self.intern.as_mut() {
            None => return self.write_raw_string(value),
            Some(session) => session.probe(value),
        };
        match sighting {
            Sighting::First => {
                self.write_raw_u8(MARKER_NEW)?;
                self.write_raw_string(value)?;
            }
            Sighting::Repeat(id) => {
                self.write_raw_u8(MARKER_REF)?;
                self.write_raw_varint(id)?;
            }
        }
        Ok(())
    }

    /// Reads one intern record, installing first sightings and resolving
    /// references to the first-seen spelling.
    fn read_interned(&mut self) -> Result<String> {
        if self.intern.is_none() {
            return self.read_raw_string();
        }
        match self.read_raw_u8()? {
            MARKER_NEW => {
                let spelling = self.read_raw_string()?;
                if let Some(session) = self.intern.as_mut() {
                    session.install(spelling.clone());
                }
                Ok(spelling)
            }
            MARKER_REF => {
                let id = self.read_raw_varint()?;
                match self.intern.as_ref().and_then(|session| session.resolve(id)) {
                    Some(spelling) => Ok(spelling.to_owned()),
                    None => Err(TranslationError::Desync(format!(
                        "intern reference to unassigned id {id}"
                    ))),
                }
            }
            other => Err(TranslationError::Desync(format!(
                "unrecognized intern record marker {other}"
            ))),
        }
    }
}

/// Splits a full path at the final separator. The directory half keeps the
/// separator; a path with no separator is all filename.
fn split_path(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(index) => path.split_at(index + 1),
        None => ("", path),
    }
}
