//! SMPTE identifier primitives: universal labels, UUIDs, and UMIDs.
//!
//! These are the fixed-width binary keys used throughout registry metadata:
//! 16-byte AUIDs (a universal label, or a UUID in disguise), plain 16-byte
//! UUIDs used as object identities, and 32-byte UMIDs identifying material
//! packages. Each type carries its canonical URN text form.

use core::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Length in bytes of an AUID or UUID.
pub const AUID_LEN: usize = 16;
/// Length in bytes of a UMID.
pub const UMID_LEN: usize = 32;

/// Index of the version byte within a universal label.
const UL_VERSION_BYTE: usize = 7;

/// Errors produced when constructing identifiers from bytes or text.
#[derive(Debug, Error)]
pub enum IdError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("invalid identifier syntax: {0}")]
    Syntax(String),
}

/// A 16-byte AUID: either a SMPTE universal label or a UUID.
///
/// The high bit of the first byte discriminates the two forms. Universal
/// labels carry a version byte at offset 7 that is ignored when matching a
/// file key against a registry entry; a UUID stored in an AUID has its two
/// 8-byte halves swapped relative to the plain UUID byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Auid([u8; AUID_LEN]);

impl Auid {
    /// Wrap raw bytes without further interpretation.
    pub const fn from_bytes(bytes: [u8; AUID_LEN]) -> Self {
        Auid(bytes)
    }

    /// Raw byte view.
    pub const fn as_bytes(&self) -> &[u8; AUID_LEN] {
        &self.0
    }

    /// True when the value is a universal label rather than a UUID.
    pub const fn is_ul(&self) -> bool {
        self.0[0] & 0x80 == 0
    }

    /// Version byte of a universal label; `None` for UUID-form AUIDs.
    pub fn version(&self) -> Option<u8> {
        self.is_ul().then(|| self.0[UL_VERSION_BYTE])
    }

    /// Copy with the version byte cleared, suitable as a registry key.
    pub fn zero_version(&self) -> Auid {
        let mut bytes = self.0;
        if self.is_ul() {
            bytes[UL_VERSION_BYTE] = 0;
        }
        Auid(bytes)
    }

    /// Bytewise equality that disregards the version byte when both sides
    /// are universal labels.
    pub fn equals_ignore_version(&self, other: &Auid) -> bool {
        self.zero_version().0 == other.zero_version().0
    }

    /// The contained UUID, un-swapping the halves; `None` for labels.
    pub fn as_uuid(&self) -> Option<Uuid> {
        if self.is_ul() {
            return None;
        }
        let mut bytes = [0u8; AUID_LEN];
        bytes[..8].copy_from_slice(&self.0[8..]);
        bytes[8..].copy_from_slice(&self.0[..8]);
        Some(Uuid::from_bytes(bytes))
    }

    /// Store a UUID as an AUID, swapping the halves.
    pub fn from_uuid(uuid: &Uuid) -> Auid {
        let raw = uuid.as_bytes();
        let mut bytes = [0u8; AUID_LEN];
        bytes[..8].copy_from_slice(&raw[8..]);
        bytes[8..].copy_from_slice(&raw[..8]);
        Auid(bytes)
    }
}

impl TryFrom<&[u8]> for Auid {
    type Error = IdError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; AUID_LEN] = value.try_into().map_err(|_| IdError::Length {
            expected: AUID_LEN,
            actual: value.len(),
        })?;
        Ok(Auid(bytes))
    }
}

impl fmt::Display for Auid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(uuid) = self.as_uuid() {
            return fmt::Display::fmt(&uuid, f);
        }
        f.write_str("urn:smpte:ul:")?;
        for (i, chunk) in self.0.chunks(4).enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            for byte in chunk {
                write!(f, "{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Auid {
    type Err = IdError;

    /// Accepts the `urn:smpte:ul:` form, the `urn:uuid:` form, and the
    /// dotted byte form (`06.0E.2B.34.…`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("urn:smpte:ul:") {
            let mut bytes = [0u8; AUID_LEN];
            parse_hex_groups(rest, '.', 4, &mut bytes)?;
            return Ok(Auid(bytes));
        }
        if s.starts_with("urn:uuid:") {
            return Ok(Auid::from_uuid(&s.parse()?));
        }
        if s.contains('.') {
            let mut bytes = [0u8; AUID_LEN];
            parse_hex_groups(s, '.', AUID_LEN, &mut bytes)?;
            return Ok(Auid(bytes));
        }
        Err(IdError::Syntax(s.to_string()))
    }
}

/// A plain 16-byte UUID, the object identity of a metadata group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uuid([u8; AUID_LEN]);

impl Uuid {
    pub const fn from_bytes(bytes: [u8; AUID_LEN]) -> Self {
        Uuid(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; AUID_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Uuid {
    type Error = IdError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; AUID_LEN] = value.try_into().map_err(|_| IdError::Length {
            expected: AUID_LEN,
            actual: value.len(),
        })?;
        Ok(Uuid(bytes))
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("urn:uuid:")?;
        for (i, byte) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Uuid {
    type Err = IdError;

    /// Accepts the hyphenated form with or without the `urn:uuid:` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("urn:uuid:").unwrap_or(s);
        let hex: String = rest.split('-').collect();
        if rest.split('-').count() != 5 || hex.len() != 2 * AUID_LEN {
            return Err(IdError::Syntax(s.to_string()));
        }
        let mut bytes = [0u8; AUID_LEN];
        parse_hex(&hex, &mut bytes).map_err(|_| IdError::Syntax(s.to_string()))?;
        Ok(Uuid(bytes))
    }
}

/// A 32-byte UMID identifying a material package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Umid([u8; UMID_LEN]);

impl Umid {
    pub const fn from_bytes(bytes: [u8; UMID_LEN]) -> Self {
        Umid(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; UMID_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Umid {
    type Error = IdError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; UMID_LEN] = value.try_into().map_err(|_| IdError::Length {
            expected: UMID_LEN,
            actual: value.len(),
        })?;
        Ok(Umid(bytes))
    }
}

impl fmt::Display for Umid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("urn:smpte:umid:")?;
        for (i, chunk) in self.0.chunks(4).enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            for byte in chunk {
                write!(f, "{byte:02x}")?;
            }
        }
        Ok(())
    }
}

/// Parse `count` groups of hex digits separated by `sep` into `out`.
fn parse_hex_groups(s: &str, sep: char, groups: usize, out: &mut [u8]) -> Result<(), IdError> {
    if s.split(sep).count() != groups {
        return Err(IdError::Syntax(s.to_string()));
    }
    let hex: String = s.split(sep).collect();
    if hex.len() != out.len() * 2 {
        return Err(IdError::Syntax(s.to_string()));
    }
    parse_hex(&hex, out).map_err(|_| IdError::Syntax(s.to_string()))
}

fn parse_hex(hex: &str, out: &mut [u8]) -> Result<(), ()> {
    if !hex.is_ascii() || hex.len() != out.len() * 2 {
        return Err(());
    }
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).map_err(|_| ())?;
    }
    Ok(())
}
