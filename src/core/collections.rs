//! # Collection Codec
//!
//! Arrays, lists, dictionaries, and hash sets, with the null-vs-empty
//! distinction carried on the wire as a tri-state length marker (-1 for null,
//! otherwise a non-negative element count).
//!
//! Dictionaries are comparer-aware: the caller supplies a [`StringComparer`]
//! on both sides, which picks the dictionary behavior on read. The comparer is
//! never written to the stream.

use std::collections::hash_map::{Entry, HashMap};
use std::collections::HashSet;
use std::hash::Hash;
use std::io::{Read, Write};

use crate::core::comparer::StringComparer;
use crate::core::translator::{Direction, Translator};
use crate::core::Translatable;
use crate::error::Result;

/// String-keyed map honoring a caller-supplied comparer.
///
/// Models a dictionary with pluggable key equality: lookups go through the
/// comparer's fold, while the first-seen spelling of each key is preserved
/// for iteration and re-serialization. Replacing a value keeps the original
/// key spelling.
#[derive(Debug, Clone)]
pub struct StringDict<V> {
    comparer: StringComparer,
    // folded key -> (first-seen spelling, value)
    map: HashMap<String, (String, V)>,
}

impl<V> StringDict<V> {
    /// Creates an empty dictionary with the given comparer.
    pub fn new(comparer: StringComparer) -> Self {
        StringDict {
            comparer,
            map: HashMap::new(),
        }
    }

    /// Creates an empty dictionary pre-sized for `capacity` entries.
    pub fn with_capacity(comparer: StringComparer, capacity: usize) -> Self {
        StringDict {
            comparer,
            map: HashMap::with_capacity(capacity),
        }
    }

    /// The comparer this dictionary was constructed with.
    pub fn comparer(&self) -> StringComparer {
        self.comparer
    }

    /// Inserts a key/value pair, returning the previous value for a
    /// comparer-equal key if any. The first-seen key spelling wins.
    pub fn insert(&mut self, key: String, value: V) -> Option<V> {
        let folded = self.comparer.fold(&key).into_owned();
        match self.map.entry(folded) {
            Entry::Occupied(mut occupied) => {
                Some(std::mem::replace(&mut occupied.get_mut().1, value))
            }
            Entry::Vacant(vacant) => {
                vacant.insert((key, value));
                None
            }
        }
    }

    /// Looks up a value under the comparer.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.map
            .get(self.comparer.fold(key).as_ref())
            .map(|(_, value)| value)
    }

    /// Whether a comparer-equal key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(self.comparer.fold(key).as_ref())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates entries as (first-seen key spelling, value). Order is not
    /// specified and not part of the wire contract.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.map
            .values()
            .map(|(spelling, value)| (spelling.as_str(), value))
    }

    /// Iterates entries with mutable access to the values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.map.values_mut().map(|entry| {
            let (spelling, value) = entry;
            (spelling.as_str(), value)
        })
    }

    /// Iterates the first-seen key spellings.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.values().map(|(spelling, _)| spelling.as_str())
    }
}

impl<S: Read + Write> Translator<S> {
    /// Translates a nullable vector of strings, preserving element order and
    /// the null-vs-empty distinction.
    pub fn translate_string_vec(&mut self, value: &mut Option<Vec<String>>) -> Result<()> {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(items) => {
                    self.write_len_marker(Some(items.len()))?;
                    for item in items.iter() {
                        self.write_raw_string(item)?;
                    }
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(count) => {
                        let mut items = Vec::with_capacity(count);
                        for _ in 0..count {
                            items.push(self.read_raw_string()?);
                        }
                        Some(items)
                    }
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable vector of self-describing elements constructed
    /// via `Default` on read.
    pub fn translate_vec<T>(&mut self, value: &mut Option<Vec<T>>) -> Result<()>
    where
        T: Translatable + Default,
    {
        self.translate_vec_with(value, |translator| {
            let mut element = T::default();
            element.translate(translator)?;
            Ok(element)
        })
    }

    /// Translates a nullable vector of elements requiring an external factory
    /// to construct. The factory is used only on read; it constructs the
    /// element and performs its field translation.
    pub fn translate_vec_with<T, F>(&mut self, value: &mut Option<Vec<T>>, mut factory: F) -> Result<()>
    where
        T: Translatable,
        F: FnMut(&mut Self) -> Result<T>,
    {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(items) => {
                    self.write_len_marker(Some(items.len()))?;
                    for item in items.iter_mut() {
                        item.translate(self)?;
                    }
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(count) => {
                        let mut items = Vec::with_capacity(count);
                        for _ in 0..count {
                            items.push(factory(self)?);
                        }
                        Some(items)
                    }
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Translates a nullable string-to-string dictionary. The comparer is
    /// used to construct the dictionary on read; write-side iteration emits
    /// the first-seen key spellings.
    pub fn translate_string_dictionary(
        &mut self,
        value: &mut Option<StringDict<String>>,
        comparer: StringComparer,
    ) -> Result<()> {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(dict) => {
                    self.write_len_marker(Some(dict.len()))?;
                    for (key, entry) in dict.iter() {
                        self.write_raw_string(key)?;
                        self.write_raw_string(entry)?;
                    }
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(count) => {
                        let mut dict = StringDict::with_capacity(comparer, count);
                        for _ in 0..count {
                            let key = self.read_raw_string()?;
                            let entry = self.read_raw_string()?;
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

    /// Translates a nullable dictionary whose values require an external
    /// factory to construct on read.
    pub fn translate_dictionary_with<V, F>(
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
                        self.write_raw_string(key)?;
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
                            let key = self.read_raw_string()?;
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

    /// Translates a nullable hash set with an allowed null element. The
    /// factory constructs elements on read; `make_set` builds the set with a
    /// capacity hint so callers can pick hasher and sizing.
    pub fn translate_hash_set<T, F, C>(
        &mut self,
        value: &mut Option<HashSet<Option<T>>>,
        mut factory: F,
        make_set: C,
    ) -> Result<()>
    where
        T: Translatable + Eq + Hash,
        F: FnMut(&mut Self) -> Result<T>,
        C: FnOnce(usize) -> HashSet<Option<T>>,
    {
        match self.direction() {
            Direction::WriteToStream => match value {
                Some(set) => {
                    self.write_len_marker(Some(set.len()))?;
                    // Sets only hand out shared references, so drain, write,
                    // and reinsert. Every drained element goes back even when
                    // a write fails, so the caller's set survives an aborted
                    // packet; the first error is surfaced after the loop.
                    let drained: Vec<Option<T>> = set.drain().collect();
                    let mut outcome = Ok(());
                    for mut element in drained {
                        if outcome.is_ok() {
                            outcome = self.write_set_element(&mut element);
                        }
                        set.insert(element);
                    }
                    outcome?;
                }
                None => self.write_len_marker(None)?,
            },
            Direction::ReadFromStream => {
                *value = match self.read_len_marker()? {
                    Some(count) => {
                        let mut set = make_set(count);
                        for _ in 0..count {
                            let element = if self.read_raw_bool()? {
                                Some(factory(self)?)
                            } else {
                                None
                            };
                            set.insert(element);
                        }
                        Some(set)
                    }
                    None => None,
                };
            }
        }
        Ok(())
    }

    /// Writes one set element: a null marker, then the element's fields.
    fn write_set_element<T: Translatable>(&mut self, element: &mut Option<T>) -> Result<()> {
        match element.as_mut() {
            Some(item) => {
                self.write_raw_bool(true)?;
                item.translate(self)
            }
            None => self.write_raw_bool(false),
        }
    }
}
