//! Recognized framework value types.
//!
//! A small closed set of value types the translator understands natively:
//! component versions, culture identifiers, and assembly identities. Each is
//! itself [`Translatable`], so the same field sequence runs on both sides.

use std::fmt;
use std::io::{Read, Write};

use crate::core::translator::Translator;
use crate::core::Translatable;
use crate::error::Result;

/// A four-part component version ("1.2", "1.2.3", or "1.2.3.4").
///
/// Build and revision are optional; on the wire an absent part is the -1
/// sentinel. A revision without a build is not representable, matching the
/// textual forms above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Version {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    /// Parses a dotted version literal with two to four parts.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('.').map(|part| part.parse::<u32>().ok());
        let major = parts.next()??;
        let minor = parts.next()??;
        let build = match parts.next() {
            Some(part) => Some(part?),
            None => None,
        };
        let revision = match parts.next() {
            Some(part) => Some(part?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Version {
            major,
            minor,
            build,
            revision,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}

impl Translatable for Version {
    fn translate<S: Read + Write>(&mut self, translator: &mut Translator<S>) -> Result<()> {
        translator.translate_u32(&mut self.major)?;
        translator.translate_u32(&mut self.minor)?;
        translate_optional_part(translator, &mut self.build)?;
        translate_optional_part(translator, &mut self.revision)?;
        Ok(())
    }
}

/// Moves an optional version part through the i32 codec with -1 as absent.
/// The write-back is an identity in write mode.
fn translate_optional_part<S: Read + Write>(
    translator: &mut Translator<S>,
    part: &mut Option<u32>,
) -> Result<()> {
    let mut wire = part.map_or(-1, |value| value as i32);
    translator.translate_i32(&mut wire)?;
    *part = if wire < 0 { None } else { Some(wire as u32) };
    Ok(())
}

/// A culture (locale) identifier such as "en-US" or "zh-HK".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CultureId {
    name: String,
}

impl CultureId {
    pub fn new(name: impl Into<String>) -> Self {
        CultureId { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CultureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Translatable for CultureId {
    fn translate<S: Read + Write>(&mut self, translator: &mut Translator<S>) -> Result<()> {
        translator.translate_required_string(&mut self.name)
    }
}

/// The identity of a built assembly: name, version, culture, public key
/// token, and identity flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyIdentity {
    pub name: Option<String>,
    pub version: Option<Version>,
    pub culture: Option<CultureId>,
    pub public_key_token: Option<Vec<u8>>,
    pub flags: u32,
}

impl Translatable for AssemblyIdentity {
    fn translate<S: Read + Write>(&mut self, translator: &mut Translator<S>) -> Result<()> {
        translator.translate_string(&mut self.name)?;
        translator.translate_opt(&mut self.version)?;
        translator.translate_opt(&mut self.culture)?;
        translator.translate_bytes(&mut self.public_key_token)?;
        translator.translate_u32(&mut self.flags)?;
        Ok(())
    }
}

impl<S: Read + Write> Translator<S> {
    /// Translates a nullable component version.
    pub fn translate_version(&mut self, value: &mut Option<Version>) -> Result<()> {
        self.translate_opt(value)
    }

    /// Translates a nullable culture identifier.
    pub fn translate_culture(&mut self, value: &mut Option<CultureId>) -> Result<()> {
        self.translate_opt(value)
    }

    /// Translates a nullable assembly identity.
    pub fn translate_assembly_identity(&mut self, value: &mut Option<AssemblyIdentity>) -> Result<()> {
        self.translate_opt(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_forms() {
        assert_eq!(Version::parse("1.2"), Some(Version::new(1, 2)));
        assert_eq!(
            Version::parse("1.2.3"),
            Some(Version {
                major: 1,
                minor: 2,
                build: Some(3),
                revision: None,
            })
        );
        assert_eq!(
            Version::parse("1.2.3.4"),
            Some(Version {
                major: 1,
                minor: 2,
                build: Some(3),
                revision: Some(4),
            })
        );
        assert_eq!(Version::parse("1"), None);
        assert_eq!(Version::parse("1.2.3.4.5"), None);
        assert_eq!(Version::parse("1.x"), None);
    }

    #[test]
    fn test_version_display_roundtrip() {
        for text in ["1.2", "1.2.3", "1.2.3.4"] {
            let version = Version::parse(text).unwrap();
            assert_eq!(version.to_string(), text);
        }
    }
}
