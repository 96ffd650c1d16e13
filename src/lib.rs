//! Facade over the workspace crates: identifier primitives, the metadata
//! dictionary model, and RegXML fragment construction.
//!
//! Most users want [`regxml::FragmentBuilder`]: populate a
//! [`dict::MetaDictionary`] (or any other [`dict::DefinitionResolver`]),
//! register the groups of the metadata set, and build one fragment per
//! root group.

pub use meta_dict as dict;
pub use meta_id as id;
pub use regxml;

pub use regxml::{BuildError, Element, FragmentBuilder, Group, Item};
