//! Registry metadata dictionary model: definitions and their resolution.
//!
//! A dictionary maps 16-byte identifications to [`Definition`]s — classes,
//! properties, and the closed set of type kinds that govern how a property
//! value is laid out in binary form. Definitions are immutable once added;
//! consumers hold borrowed references for the duration of a build.

use std::collections::HashMap;

use meta_id::Auid;
use thiserror::Error;

/// Errors produced when populating a dictionary.
#[derive(Debug, Error)]
pub enum DictError {
    /// A definition with the same identification was already added.
    #[error("duplicate definition: {0}")]
    Duplicate(Auid),
}

/// Fields common to every definition: identity, XML naming, and namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionInfo {
    /// Registry identification, matched ignoring the version byte.
    pub identification: Auid,
    /// Symbol used as the XML local name.
    pub symbol: String,
    /// Human-readable registry name.
    pub name: String,
    /// Namespace URI the symbol belongs to.
    pub namespace: String,
}

/// Declared storage width of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerSize {
    One,
    Two,
    Four,
    Eight,
}

impl IntegerSize {
    /// Width in bytes.
    pub const fn byte_len(self) -> usize {
        match self {
            IntegerSize::One => 1,
            IntegerSize::Two => 2,
            IntegerSize::Four => 4,
            IntegerSize::Eight => 8,
        }
    }
}

/// A metadata class: groups in a file are instances of classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    pub info: DefinitionInfo,
    pub parent_class: Option<Auid>,
    pub is_concrete: bool,
}

/// A property of a class, referencing the type that decodes its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub info: DefinitionInfo,
    pub type_id: Auid,
    pub is_optional: bool,
}

/// A property published under an alternate symbol; the alias keeps its own
/// naming but decodes through the original property's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAliasDefinition {
    pub info: DefinitionInfo,
    pub original_property: Auid,
}

/// A single UTF-16 code unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterTypeDefinition {
    pub info: DefinitionInfo,
}

/// One entry of an enumeration's value table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationElement {
    pub name: String,
    pub value: i32,
}

/// A one-byte enumeration with a declared value↔name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationTypeDefinition {
    pub info: DefinitionInfo,
    pub elements: Vec<EnumerationElement>,
}

/// An enumeration whose values are registry labels rather than small ints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendibleEnumerationTypeDefinition {
    pub info: DefinitionInfo,
}

/// A fixed-count array of a single element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedArrayTypeDefinition {
    pub info: DefinitionInfo,
    pub element_type: Auid,
    pub element_count: u32,
}

/// A value whose actual type is carried in the value itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectTypeDefinition {
    pub info: DefinitionInfo,
}

/// A fixed-width big-endian integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerTypeDefinition {
    pub info: DefinitionInfo,
    pub size: IntegerSize,
    pub is_signed: bool,
}

/// A value with no registry-described encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueTypeDefinition {
    pub info: DefinitionInfo,
}

/// One member of a record, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMember {
    pub name: String,
    pub type_id: Auid,
}

/// An ordered sequence of named, typed members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTypeDefinition {
    pub info: DefinitionInfo,
    pub members: Vec<RecordMember>,
}

/// An alternate name for another type; values decode exactly as the
/// renamed type's values do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTypeDefinition {
    pub info: DefinitionInfo,
    pub renamed_type: Auid,
}

/// An unordered collection with a count/length header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTypeDefinition {
    pub info: DefinitionInfo,
    pub element_type: Auid,
}

/// A byte stream stored outside the local set; never decoded inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTypeDefinition {
    pub info: DefinitionInfo,
}

/// A string of a declared character type, consuming the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTypeDefinition {
    pub info: DefinitionInfo,
    pub element_type: Auid,
}

/// An owning reference to an instance of a target class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrongReferenceTypeDefinition {
    pub info: DefinitionInfo,
    pub referenced_type: Auid,
}

/// A count-prefixed array of a single element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableArrayTypeDefinition {
    pub info: DefinitionInfo,
    pub element_type: Auid,
}

/// A non-owning reference rendered as identifier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakReferenceTypeDefinition {
    pub info: DefinitionInfo,
    pub referenced_type: Auid,
}

/// A dictionary entry. The set of kinds is closed: value decoding matches
/// exhaustively on this enum, so adding a kind is a compile-time-checked
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Class(ClassDefinition),
    Property(PropertyDefinition),
    PropertyAlias(PropertyAliasDefinition),
    Character(CharacterTypeDefinition),
    Enumeration(EnumerationTypeDefinition),
    ExtendibleEnumeration(ExtendibleEnumerationTypeDefinition),
    FixedArray(FixedArrayTypeDefinition),
    Indirect(IndirectTypeDefinition),
    Integer(IntegerTypeDefinition),
    Opaque(OpaqueTypeDefinition),
    Record(RecordTypeDefinition),
    Rename(RenameTypeDefinition),
    Set(SetTypeDefinition),
    Stream(StreamTypeDefinition),
    String(StringTypeDefinition),
    StrongReference(StrongReferenceTypeDefinition),
    VariableArray(VariableArrayTypeDefinition),
    WeakReference(WeakReferenceTypeDefinition),
}

impl Definition {
    /// Common identity/naming fields of any definition.
    pub fn info(&self) -> &DefinitionInfo {
        match self {
            Definition::Class(d) => &d.info,
            Definition::Property(d) => &d.info,
            Definition::PropertyAlias(d) => &d.info,
            Definition::Character(d) => &d.info,
            Definition::Enumeration(d) => &d.info,
            Definition::ExtendibleEnumeration(d) => &d.info,
            Definition::FixedArray(d) => &d.info,
            Definition::Indirect(d) => &d.info,
            Definition::Integer(d) => &d.info,
            Definition::Opaque(d) => &d.info,
            Definition::Record(d) => &d.info,
            Definition::Rename(d) => &d.info,
            Definition::Set(d) => &d.info,
            Definition::Stream(d) => &d.info,
            Definition::String(d) => &d.info,
            Definition::StrongReference(d) => &d.info,
            Definition::VariableArray(d) => &d.info,
            Definition::WeakReference(d) => &d.info,
        }
    }
}

/// Read-only lookup of definitions by identification, ignoring the version
/// byte. The seam between the dictionary and its consumers: anything that
/// can answer lookups can drive a build.
pub trait DefinitionResolver {
    fn definition(&self, identification: &Auid) -> Option<&Definition>;
}

/// In-memory dictionary keyed by version-normalized identification.
#[derive(Debug, Default)]
pub struct MetaDictionary {
    by_id: HashMap<Auid, Definition>,
}

impl MetaDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; identifications must be unique up to version.
    pub fn add(&mut self, definition: Definition) -> Result<(), DictError> {
        let key = definition.info().identification.zero_version();
        if self.by_id.contains_key(&key) {
            return Err(DictError::Duplicate(definition.info().identification));
        }
        self.by_id.insert(key, definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl DefinitionResolver for MetaDictionary {
    fn definition(&self, identification: &Auid) -> Option<&Definition> {
        self.by_id.get(&identification.zero_version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(byte: u8) -> Auid {
        let mut bytes = [0u8; 16];
        bytes[0] = 0x06;
        bytes[7] = 0x01;
        bytes[15] = byte;
        Auid::from_bytes(bytes)
    }

    fn info(id: Auid, symbol: &str) -> DefinitionInfo {
        DefinitionInfo {
            identification: id,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            namespace: "http://example.com/ns".to_string(),
        }
    }

    #[test]
    fn lookup_ignores_version() {
        let mut dict = MetaDictionary::new();
        dict.add(Definition::Class(ClassDefinition {
            info: info(label(1), "Preface"),
            parent_class: None,
            is_concrete: true,
        }))
        .expect("add class");

        let mut other_version = *label(1).as_bytes();
        other_version[7] = 0x0a;
        let found = dict
            .definition(&Auid::from_bytes(other_version))
            .expect("resolve with differing version");
        assert_eq!(found.info().symbol, "Preface");
        assert!(dict.definition(&label(2)).is_none());
    }

    #[test]
    fn duplicate_identifications_are_rejected() {
        let mut dict = MetaDictionary::new();
        dict.add(Definition::Opaque(OpaqueTypeDefinition {
            info: info(label(3), "Blob"),
        }))
        .expect("first add");
        let err = dict
            .add(Definition::Opaque(OpaqueTypeDefinition {
                info: info(label(3), "BlobAgain"),
            }))
            .unwrap_err();
        assert!(matches!(err, DictError::Duplicate(_)));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn definition_info_is_uniform_across_kinds() {
        let defs = vec![
            Definition::Integer(IntegerTypeDefinition {
                info: info(label(4), "UInt32"),
                size: IntegerSize::Four,
                is_signed: false,
            }),
            Definition::Rename(RenameTypeDefinition {
                info: info(label(5), "PositionType"),
                renamed_type: label(4),
            }),
            Definition::StrongReference(StrongReferenceTypeDefinition {
                info: info(label(6), "StrongRef"),
                referenced_type: label(1),
            }),
        ];
        let symbols: Vec<_> = defs.iter().map(|d| d.info().symbol.as_str()).collect();
        assert_eq!(symbols, ["UInt32", "PositionType", "StrongRef"]);
        assert_eq!(IntegerSize::Eight.byte_len(), 8);
    }
}
