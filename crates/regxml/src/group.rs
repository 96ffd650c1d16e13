//! Input model: decoded local sets as delivered by the container layer.

use meta_id::Auid;

/// One tagged item of a group: a key and its raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub key: Auid,
    pub value: Vec<u8>,
}

impl Item {
    pub fn new(key: Auid, value: impl Into<Vec<u8>>) -> Self {
        Item {
            key,
            value: value.into(),
        }
    }
}

/// An ordered set of items representing one metadata object instance.
///
/// Groups are produced and owned by the container layer; fragment
/// construction only borrows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: Auid,
    pub items: Vec<Item>,
}

impl Group {
    pub fn new(key: Auid, items: Vec<Item>) -> Self {
        Group { key, items }
    }
}
