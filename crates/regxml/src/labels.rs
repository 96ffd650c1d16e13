//! Well-known registry labels consumed during fragment construction.
//!
//! Byte values follow the SMPTE RA metadata registers. Matching against
//! these constants ignores the version byte, like any other dictionary
//! lookup.

use meta_id::Auid;

/// Item key carrying a group's object identity (`InstanceID`).
pub const INSTANCE_UID: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x02, 0x00, 0x00, 0x00,
    0x00,
]);

/// Property whose value is the two-character byte-order marker.
pub const BYTE_ORDER: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x01, 0x01, 0x01, 0x03, 0x01, 0x02, 0x01, 0x02, 0x00, 0x00,
    0x00,
]);

/// Record type holding a 16-byte identifier (`AUID`).
pub const IDENTIFIER_RECORD: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x01, 0x03, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Fixed-array type that is really a 16-byte UUID.
pub const UUID_ARRAY: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x01, 0x03, 0x03, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Record type holding a 32-byte package identifier (`PackageIDType`).
pub const PACKAGE_ID_RECORD: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x01, 0x03, 0x02, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Record type for a calendar date (`DateStruct`).
pub const DATE_RECORD: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x03, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Record type for a rational number (`Rational`).
pub const RATIONAL_RECORD: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x03, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Record type for a time of day (`TimeStruct`).
pub const TIME_RECORD: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x03, 0x01, 0x06, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Record type for a combined date and time (`TimeStamp`).
pub const TIMESTAMP_RECORD: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x03, 0x01, 0x07, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Record type for a major/minor version pair (`VersionType`).
pub const VERSION_RECORD: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x03, 0x01, 0x03, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Character type encoded as one UTF-16 code unit.
pub const UTF16_CHARACTER: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x01, 0x10, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Character type encoded as one 7-bit character.
pub const ISO7_CHARACTER: Auid = Auid::from_bytes([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01, 0x01, 0x01, 0x10, 0x03, 0x00, 0x00, 0x00, 0x00,
    0x00,
]);

/// Namespace of the fixed metadictionary attributes (`uid`, `actualType`,
/// `byteOrder`).
pub const METADICT_NS: &str = "http://www.smpte-ra.org/schemas/2001-1b/2013/metadict";
