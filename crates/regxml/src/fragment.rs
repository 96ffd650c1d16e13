//! Recursive construction of XML fragments from registered metadata groups.
//!
//! One [`FragmentBuilder`] corresponds to one output document: its object
//! registry and namespace prefix table accumulate across calls, and each
//! call to [`FragmentBuilder::fragment`] turns one root group into one
//! element tree. Decoding descends depth-first through items, type
//! definitions, and strong references, consulting the dictionary resolver
//! and the registry at every step.
//!
//! Two severities of trouble exist. Advisory conditions (unknown class or
//! property, version drift between file and dictionary, dangling strong
//! references, set truncation) are reported through `tracing` and degrade
//! to a skip or an inline comment. Everything else aborts the build of the
//! current root: the caller gets a complete fragment or an error, never a
//! silently truncated tree.

use std::collections::HashMap;

use meta_dict::{
    Definition, DefinitionResolver, EnumerationTypeDefinition, FixedArrayTypeDefinition,
    IntegerTypeDefinition, RecordTypeDefinition, RenameTypeDefinition, SetTypeDefinition,
    StringTypeDefinition, StrongReferenceTypeDefinition, VariableArrayTypeDefinition,
};
use meta_id::{Auid, Uuid};
use thiserror::Error;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Month, Time};
use tracing::{debug, warn};

use crate::group::Group;
use crate::labels;
use crate::tree::Element;
use crate::value::{ShortValue, ValueReader};

const UID_ATTR: &str = "uid";
const ACTUAL_TYPE_ATTR: &str = "actualType";
const BYTE_ORDER_ATTR: &str = "byteOrder";

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CLOCK_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const CLOCK_FORMAT_FRACTION: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// Fatal conditions that abort the build of the current root group.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Short(#[from] ShortValue),
    #[error("unknown byte order marker {0:#06x}")]
    ByteOrder(u16),
    #[error("type {type_id} not found at {symbol}")]
    MissingType { type_id: Auid, symbol: String },
    #[error("aliased property {property_id} not found at {symbol}")]
    MissingAliasedProperty { property_id: Auid, symbol: String },
    #[error("definition {0} is not a property")]
    NotAProperty(String),
    #[error("strong reference type at {0} does not resolve to a class")]
    NotAClass(String),
    #[error("definition {0} cannot appear as a value type")]
    NotAType(String),
    #[error("indirect values have no defined encoding")]
    Indirect,
    #[error("stream values are not decoded")]
    Stream,
    #[error("string element type {0} is not supported")]
    StringElementType(Auid),
    #[error("string arrays are not supported")]
    StringArray,
    #[error("invalid calendar or clock field: {0}")]
    TimeRange(#[from] time::error::ComponentRange),
    #[error("time formatting: {0}")]
    TimeFormat(#[from] time::error::Format),
}

/// Builds XML fragments from groups registered against one dictionary.
pub struct FragmentBuilder<'a> {
    resolver: &'a dyn DefinitionResolver,
    groups: HashMap<Uuid, &'a Group>,
    namespaces: Vec<String>,
}

impl<'a> FragmentBuilder<'a> {
    pub fn new(resolver: &'a dyn DefinitionResolver) -> Self {
        FragmentBuilder {
            resolver,
            groups: HashMap::new(),
            namespaces: Vec::new(),
        }
    }

    /// Register a group under its object identity, making it a possible
    /// strong-reference target. Groups without an instance identifier are
    /// ignored. Duplicate identities are not detected; the latest
    /// registration wins.
    pub fn add_group(&mut self, group: &'a Group) {
        for item in &group.items {
            if !labels::INSTANCE_UID.equals_ignore_version(&item.key) {
                continue;
            }
            match Uuid::try_from(item.value.as_slice()) {
                Ok(identity) => {
                    debug!(identity = %identity, key = %group.key, "registered group");
                    self.groups.insert(identity, group);
                }
                Err(err) => {
                    warn!(key = %group.key, %err, "instance identifier value rejected");
                }
            }
            break;
        }
    }

    /// Look up a registered group by object identity.
    pub fn resolve(&self, identity: &Uuid) -> Option<&'a Group> {
        self.groups.get(identity).copied()
    }

    /// Build one fragment for a root group.
    ///
    /// Returns `Ok(None)` when the group's class is unknown to the
    /// dictionary (reported as an advisory, nothing is produced). The
    /// returned root carries namespace declarations for every prefix this
    /// builder has allocated so far, so prefixes are stable across
    /// fragments built by the same instance.
    pub fn fragment(&mut self, group: &Group) -> Result<Option<Element>, BuildError> {
        let Some(mut root) = self.element_from_group(group)? else {
            return Ok(None);
        };
        for (index, namespace) in self.namespaces.iter().enumerate() {
            root.set_attribute(format!("xmlns:r{index}"), namespace.as_str());
        }
        Ok(Some(root))
    }

    fn lookup(&self, identification: &Auid) -> Option<&'a Definition> {
        let resolver = self.resolver;
        resolver.definition(identification)
    }

    /// Existing prefix for a namespace, or the next `r{n}` in first-seen
    /// order.
    fn prefix_for(&mut self, namespace: &str) -> String {
        if let Some(index) = self.namespaces.iter().position(|ns| ns == namespace) {
            return format!("r{index}");
        }
        self.namespaces.push(namespace.to_string());
        format!("r{}", self.namespaces.len() - 1)
    }

    fn new_element(&mut self, namespace: &str, local: &str) -> Element {
        let prefix = self.prefix_for(namespace);
        Element::new(namespace, prefix, local)
    }

    /// Group stage: resolve the group's class and render one element per
    /// item. Unknown classes and properties degrade to skips.
    fn element_from_group(&mut self, group: &Group) -> Result<Option<Element>, BuildError> {
        let Some(definition) = self.lookup(&group.key) else {
            warn!(key = %group.key, "unknown group identifier");
            return Ok(None);
        };
        check_version(&group.key, definition, "group");

        let info = definition.info();
        let mut elem = self.new_element(&info.namespace, &info.symbol);

        for item in &group.items {
            if labels::INSTANCE_UID.equals_ignore_version(&item.key) {
                let mut reader = ValueReader::new(&item.value);
                let identity = reader.read_uuid()?;
                let prefix = self.prefix_for(labels::METADICT_NS);
                elem.set_attribute(format!("{prefix}:{UID_ATTR}"), identity.to_string());
            } else {
                let Some(itemdef) = self.lookup(&item.key) else {
                    warn!(key = %item.key, "unknown property identifier");
                    continue;
                };
                check_version(&item.key, itemdef, "property");
                let child = self.element_from_item(itemdef, &item.value)?;
                elem.push_element(child);
            }
        }

        Ok(Some(elem))
    }

    /// Item stage: name the element after the property as referenced, then
    /// hand the value to the type rules. The byte-order property bypasses
    /// type dispatch entirely.
    fn element_from_item(
        &mut self,
        definition: &'a Definition,
        value: &[u8],
    ) -> Result<Element, BuildError> {
        let info = definition.info();
        let mut elem = self.new_element(&info.namespace, &info.symbol);
        let mut reader = ValueReader::new(value);

        if info.identification.equals_ignore_version(&labels::BYTE_ORDER) {
            // The marker occupies the leading two bytes of a four-byte
            // field; the trailing bytes are padding but must be present.
            let marker = reader.read_u16()?;
            reader.read_u16()?;
            match marker {
                0x4949 => elem.set_text("BigEndian"),
                0x4D4D => elem.set_text("LittleEndian"),
                other => return Err(BuildError::ByteOrder(other)),
            }
            return Ok(elem);
        }

        let type_id = match definition {
            Definition::Property(property) => property.type_id,
            Definition::PropertyAlias(alias) => {
                // Only the type lookup is redirected; the element keeps the
                // alias's own name.
                let original = self.lookup(&alias.original_property).ok_or_else(|| {
                    BuildError::MissingAliasedProperty {
                        property_id: alias.original_property,
                        symbol: info.symbol.clone(),
                    }
                })?;
                match original {
                    Definition::Property(property) => property.type_id,
                    _ => return Err(BuildError::NotAProperty(info.symbol.clone())),
                }
            }
            _ => return Err(BuildError::NotAProperty(info.symbol.clone())),
        };

        let typedef = self.lookup(&type_id).ok_or_else(|| BuildError::MissingType {
            type_id,
            symbol: info.symbol.clone(),
        })?;
        self.decode_value(&mut elem, &mut reader, typedef)?;
        Ok(elem)
    }

    /// Value stage: dispatch on the kind of the type definition.
    fn decode_value(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        definition: &'a Definition,
    ) -> Result<(), BuildError> {
        match definition {
            Definition::Character(_) => decode_character(elem, reader),
            Definition::Enumeration(d) => decode_enumeration(elem, reader, d),
            Definition::ExtendibleEnumeration(_) => decode_extendible_enumeration(elem, reader),
            Definition::FixedArray(d) => self.decode_fixed_array(elem, reader, d),
            Definition::Indirect(_) => Err(BuildError::Indirect),
            Definition::Integer(d) => decode_integer(elem, reader, d),
            Definition::Opaque(_) => self.decode_opaque(elem),
            Definition::Record(d) => self.decode_record(elem, reader, d),
            Definition::Rename(d) => self.decode_rename(elem, reader, d),
            Definition::Set(d) => self.decode_set(elem, reader, d),
            Definition::Stream(_) => Err(BuildError::Stream),
            Definition::String(d) => decode_string(elem, reader, d),
            Definition::StrongReference(d) => self.decode_strong_reference(elem, reader, d),
            Definition::VariableArray(d) => self.decode_variable_array(elem, reader, d),
            Definition::WeakReference(_) => decode_weak_reference(elem, reader),
            Definition::Class(_) | Definition::Property(_) | Definition::PropertyAlias(_) => {
                Err(BuildError::NotAType(definition.info().symbol.clone()))
            }
        }
    }

    /// Decode `count` consecutive elements of one type from the same
    /// stream. Strong-reference elements splice their target groups
    /// directly into the containing element; every other type gets one
    /// wrapper element per slot, named after the element type.
    fn decode_array_elements(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        typedef: &'a Definition,
        count: u32,
    ) -> Result<(), BuildError> {
        for _ in 0..count {
            if let Definition::StrongReference(strong) = typedef {
                self.decode_strong_reference(elem, reader, strong)?;
            } else {
                let info = typedef.info();
                let mut child = self.new_element(&info.namespace, &info.symbol);
                self.decode_value(&mut child, reader, typedef)?;
                elem.push_element(child);
            }
        }
        Ok(())
    }

    fn decode_fixed_array(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        definition: &'a FixedArrayTypeDefinition,
    ) -> Result<(), BuildError> {
        // A fixed array of 16 octets under this identification is really a
        // UUID; render the canonical string instead of 16 children.
        if definition
            .info
            .identification
            .equals_ignore_version(&labels::UUID_ARRAY)
        {
            elem.set_text(reader.read_uuid()?.to_string());
            return Ok(());
        }
        let typedef = self.element_type(&definition.element_type, &definition.info.symbol)?;
        self.decode_array_elements(elem, reader, typedef, definition.element_count)
    }

    fn decode_opaque(&mut self, elem: &mut Element) -> Result<(), BuildError> {
        // The actual encoding of opaque values is unresolved; emit the
        // fixed placeholder attributes and consume nothing.
        let prefix = self.prefix_for(labels::METADICT_NS);
        elem.set_attribute(format!("{prefix}:{ACTUAL_TYPE_ATTR}"), "");
        elem.set_attribute(format!("{prefix}:{BYTE_ORDER_ATTR}"), "BigEndian");
        Ok(())
    }

    fn decode_record(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        definition: &'a RecordTypeDefinition,
    ) -> Result<(), BuildError> {
        let id = &definition.info.identification;

        if id.equals_ignore_version(&labels::IDENTIFIER_RECORD) {
            elem.set_text(reader.read_auid()?.to_string());
        } else if id.equals_ignore_version(&labels::DATE_RECORD) {
            let date = read_date(reader)?;
            elem.set_text(format!("{}Z", date.format(DATE_FORMAT)?));
        } else if id.equals_ignore_version(&labels::PACKAGE_ID_RECORD) {
            elem.set_text(reader.read_umid()?.to_string());
        } else if id.equals_ignore_version(&labels::RATIONAL_RECORD) {
            let numerator = reader.read_i32()?;
            let denominator = reader.read_i32()?;
            elem.set_text(format!("{numerator}/{denominator}"));
        } else if id.equals_ignore_version(&labels::TIME_RECORD) {
            let time = read_time(reader)?;
            elem.set_text(format!("{}Z", clock_text(time)?));
        } else if id.equals_ignore_version(&labels::TIMESTAMP_RECORD) {
            let date = read_date(reader)?;
            let time = read_time(reader)?;
            elem.set_text(format!(
                "{}T{}Z",
                date.format(DATE_FORMAT)?,
                clock_text(time)?
            ));
        } else if id.equals_ignore_version(&labels::VERSION_RECORD) {
            let major = reader.read_u8()?;
            let minor = reader.read_u8()?;
            elem.set_text(format!("{major}.{minor}"));
        } else {
            // Plain record: one child per member, in declaration order,
            // named after the member and namespaced like the record.
            for member in &definition.members {
                let membertype =
                    self.lookup(&member.type_id)
                        .ok_or_else(|| BuildError::MissingType {
                            type_id: member.type_id,
                            symbol: member.name.clone(),
                        })?;
                let mut child = self.new_element(&definition.info.namespace, &member.name);
                self.decode_value(&mut child, reader, membertype)?;
                elem.push_element(child);
            }
        }
        Ok(())
    }

    fn decode_rename(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        definition: &'a RenameTypeDefinition,
    ) -> Result<(), BuildError> {
        let renamed = self.element_type(&definition.renamed_type, &definition.info.symbol)?;
        self.decode_value(elem, reader, renamed)
    }

    fn decode_set(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        definition: &'a SetTypeDefinition,
    ) -> Result<(), BuildError> {
        let typedef = self.element_type(&definition.element_type, &definition.info.symbol)?;
        match self.decode_set_items(elem, reader, typedef) {
            Err(BuildError::Short(_)) => {
                // Sets tolerate truncation: keep what decoded and leave a
                // marker instead of failing the whole build.
                elem.push_comment(format!(
                    "Value too short for Type {}",
                    typedef.info().symbol
                ));
                Ok(())
            }
            other => other,
        }
    }

    fn decode_set_items(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        typedef: &'a Definition,
    ) -> Result<(), BuildError> {
        let count = reader.read_u32()?;
        let _item_length = reader.read_u32()?;
        self.decode_array_elements(elem, reader, typedef, count)
    }

    fn decode_strong_reference(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        definition: &'a StrongReferenceTypeDefinition,
    ) -> Result<(), BuildError> {
        if !matches!(
            self.lookup(&definition.referenced_type),
            Some(Definition::Class(_))
        ) {
            return Err(BuildError::NotAClass(definition.info.symbol.clone()));
        }

        let identity = reader.read_uuid()?;
        if let Some(target) = self.resolve(&identity) {
            if let Some(child) = self.element_from_group(target)? {
                elem.push_element(child);
            }
        } else {
            warn!(identity = %identity, symbol = %definition.info.symbol, "strong reference target not registered");
            elem.push_comment(format!("Strong Reference {identity} not found"));
        }
        Ok(())
    }

    fn decode_variable_array(
        &mut self,
        elem: &mut Element,
        reader: &mut ValueReader<'_>,
        definition: &'a VariableArrayTypeDefinition,
    ) -> Result<(), BuildError> {
        // The raw octet-string array consumes the whole value with no
        // header and renders as hex.
        if definition.info.symbol == "DataValue" {
            elem.set_text(hex_text(reader.rest()));
            return Ok(());
        }

        let typedef = self.element_type(&definition.element_type, &definition.info.symbol)?;
        let count = reader.read_u32()?;
        let _item_length = reader.read_u32()?;

        let base = self
            .base_definition(typedef)
            .ok_or_else(|| BuildError::MissingType {
                type_id: definition.element_type,
                symbol: definition.info.symbol.clone(),
            })?;
        if matches!(base, Definition::Character(_)) || base.info().name.contains("StringArray") {
            return Err(BuildError::StringArray);
        }

        self.decode_array_elements(elem, reader, typedef, count)
    }

    /// Follow rename links down to the underlying type.
    fn base_definition(&self, definition: &'a Definition) -> Option<&'a Definition> {
        let mut current = definition;
        while let Definition::Rename(rename) = current {
            current = self.lookup(&rename.renamed_type)?;
        }
        Some(current)
    }

    fn element_type(
        &self,
        type_id: &Auid,
        symbol: &str,
    ) -> Result<&'a Definition, BuildError> {
        self.lookup(type_id).ok_or_else(|| BuildError::MissingType {
            type_id: *type_id,
            symbol: symbol.to_string(),
        })
    }
}

/// Advisory check that the file's key version matches the dictionary's.
fn check_version(key: &Auid, definition: &Definition, what: &str) {
    let dictionary = &definition.info().identification;
    if let (Some(file), Some(dict)) = (key.version(), dictionary.version()) {
        if file != dict {
            warn!(
                key = %key,
                dictionary = dict,
                "{what} identifier version differs from the dictionary"
            );
        }
    }
}

fn decode_character(elem: &mut Element, reader: &mut ValueReader<'_>) -> Result<(), BuildError> {
    let unit = reader.read_u16()?;
    let text: String = char::decode_utf16([unit])
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    elem.set_text(text);
    Ok(())
}

fn decode_enumeration(
    elem: &mut Element,
    reader: &mut ValueReader<'_>,
    definition: &EnumerationTypeDefinition,
) -> Result<(), BuildError> {
    let value = i32::from(reader.read_u8()?);
    match definition.elements.iter().find(|e| e.value == value) {
        Some(entry) => elem.set_text(entry.name.as_str()),
        None => {
            warn!(value, symbol = %definition.info.symbol, "enumerator value not in dictionary");
            elem.set_text("ERROR");
        }
    }
    Ok(())
}

fn decode_extendible_enumeration(
    elem: &mut Element,
    reader: &mut ValueReader<'_>,
) -> Result<(), BuildError> {
    // Rendered as the raw label; symbol lookup against a label registry is
    // not attempted.
    elem.set_text(reader.read_auid()?.to_string());
    Ok(())
}

fn decode_integer(
    elem: &mut Element,
    reader: &mut ValueReader<'_>,
    definition: &IntegerTypeDefinition,
) -> Result<(), BuildError> {
    let width = definition.size.byte_len();
    let raw = reader.read_exact(width)?;
    let mut wide = [0u8; 16];
    wide[16 - width..].copy_from_slice(raw);
    let unsigned = u128::from_be_bytes(wide);
    let text = if definition.is_signed {
        let shift = 128 - 8 * width as u32;
        (((unsigned << shift) as i128) >> shift).to_string()
    } else {
        unsigned.to_string()
    };
    elem.set_text(text);
    Ok(())
}

fn decode_string(
    elem: &mut Element,
    reader: &mut ValueReader<'_>,
    definition: &StringTypeDefinition,
) -> Result<(), BuildError> {
    let bytes = reader.rest();
    let mut text: String;
    if definition
        .element_type
        .equals_ignore_version(&labels::UTF16_CHARACTER)
    {
        let units = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        text = char::decode_utf16(units)
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        if bytes.len() % 2 != 0 {
            text.push(char::REPLACEMENT_CHARACTER);
        }
    } else if definition
        .element_type
        .equals_ignore_version(&labels::ISO7_CHARACTER)
    {
        text = bytes
            .iter()
            .map(|&b| {
                if b < 0x80 {
                    b as char
                } else {
                    char::REPLACEMENT_CHARACTER
                }
            })
            .collect();
    } else {
        return Err(BuildError::StringElementType(definition.element_type));
    }
    if text.ends_with('\0') {
        text.pop();
    }
    elem.set_text(text);
    Ok(())
}

fn decode_weak_reference(
    elem: &mut Element,
    reader: &mut ValueReader<'_>,
) -> Result<(), BuildError> {
    // No graph traversal: the target's identifier is the rendered value.
    elem.set_text(reader.read_auid()?.to_string());
    Ok(())
}

fn read_date(reader: &mut ValueReader<'_>) -> Result<Date, BuildError> {
    let year = reader.read_u16()?;
    let month = Month::try_from(reader.read_u8()?)?;
    let day = reader.read_u8()?;
    Ok(Date::from_calendar_date(i32::from(year), month, day)?)
}

fn read_time(reader: &mut ValueReader<'_>) -> Result<Time, BuildError> {
    let hour = reader.read_u8()?;
    let minute = reader.read_u8()?;
    let second = reader.read_u8()?;
    // The fraction byte counts quarter-milliseconds.
    let nanos = u32::from(reader.read_u8()?) * 4_000_000;
    Ok(Time::from_hms_nano(hour, minute, second, nanos)?)
}

fn clock_text(time: Time) -> Result<String, BuildError> {
    let format = if time.nanosecond() == 0 {
        CLOCK_FORMAT
    } else {
        CLOCK_FORMAT_FRACTION
    };
    Ok(time.format(format)?)
}

fn hex_text(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        out.push(HEX[usize::from(byte >> 4)] as char);
        out.push(HEX[usize::from(byte & 0x0f)] as char);
    }
    out
}
