//! RegXML fragment construction: decoded KLV metadata sets rendered as
//! namespaced XML element trees, driven by a registry dictionary.
//!
//! The container layer splits a file into [`Group`]s of tagged binary
//! items and registers them with a [`FragmentBuilder`]; the builder then
//! turns each root group into one element tree, recursively following
//! strong references through the object registry and dispatching each
//! value to the decode rule its type kind demands.
//!
//! ```rust
//! use meta_dict::{ClassDefinition, Definition, DefinitionInfo, MetaDictionary};
//! use meta_id::Auid;
//! use regxml::{FragmentBuilder, Group};
//!
//! let class_key = Auid::from_bytes([
//!     0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x01, 0x01, 0x01, 0x01,
//!     0x2f, 0x00,
//! ]);
//! let mut dict = MetaDictionary::new();
//! dict.add(Definition::Class(ClassDefinition {
//!     info: DefinitionInfo {
//!         identification: class_key,
//!         symbol: "Preface".to_string(),
//!         name: "Preface".to_string(),
//!         namespace: "http://www.smpte-ra.org/reg/335/2012".to_string(),
//!     },
//!     parent_class: None,
//!     is_concrete: true,
//! }))
//! .expect("add definition");
//!
//! let group = Group::new(class_key, Vec::new());
//! let mut builder = FragmentBuilder::new(&dict);
//! builder.add_group(&group);
//! let fragment = builder
//!     .fragment(&group)
//!     .expect("decode")
//!     .expect("class is known");
//! assert_eq!(fragment.to_xml_string().expect("serialize"),
//!     "<r0:Preface xmlns:r0=\"http://www.smpte-ra.org/reg/335/2012\"/>");
//! ```

pub mod fragment;
pub mod group;
pub mod labels;
pub mod tree;
pub mod value;

pub use fragment::{BuildError, FragmentBuilder};
pub use group::{Group, Item};
pub use tree::{Attribute, Content, Element, XmlError};
pub use value::{ShortValue, ValueReader};
