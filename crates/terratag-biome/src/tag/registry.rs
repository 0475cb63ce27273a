//! Tag registry: maps human-readable tag names to [`BiomeTag`] identifiers.

use hashbrown::HashMap;

/// Identifier of one classified characteristic of a location
/// (e.g. "desert", "river_bank").
///
/// `BiomeTag(0)` is reserved and never produced by classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BiomeTag(pub u16);

impl BiomeTag {
    /// The reserved identifier.
    pub const RESERVED: BiomeTag = BiomeTag(0);

    /// Returns `true` for the reserved identifier.
    pub fn is_reserved(self) -> bool {
        self == Self::RESERVED
    }
}

/// Errors that can occur when registering tags.
#[derive(Debug, thiserror::Error)]
pub enum TagRegistryError {
    /// A tag with this name is already registered.
    #[error("duplicate tag name: {0}")]
    DuplicateName(String),

    /// Every identifier in `1..=u16::MAX` is taken.
    #[error("tag identifier space exhausted at {0}")]
    Exhausted(String),
}

/// Stores tag names with O(1) lookup in both directions.
///
/// Identifiers are handed out sequentially starting at 1.
#[derive(Debug, Default)]
pub struct TagRegistry {
    names: Vec<String>,
    name_to_tag: HashMap<String, BiomeTag>,
}

impl TagRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tag name, returning its assigned [`BiomeTag`].
    ///
    /// # Errors
    ///
    /// Returns [`TagRegistryError::DuplicateName`] if the name is already
    /// registered, or [`TagRegistryError::Exhausted`] if no identifier is left.
    pub fn register(&mut self, name: impl Into<String>) -> Result<BiomeTag, TagRegistryError> {
        let name = name.into();
        if self.name_to_tag.contains_key(&name) {
            return Err(TagRegistryError::DuplicateName(name));
        }
        let Ok(id) = u16::try_from(self.names.len() + 1) else {
            return Err(TagRegistryError::Exhausted(name));
        };
        let tag = BiomeTag(id);
        self.name_to_tag.insert(name.clone(), tag);
        self.names.push(name);
        Ok(tag)
    }

    /// Looks up a tag by name.
    pub fn lookup(&self, name: &str) -> Option<BiomeTag> {
        self.name_to_tag.get(name).copied()
    }

    /// Returns the name registered for `tag`, if any.
    pub fn name(&self, tag: BiomeTag) -> Option<&str> {
        let index = usize::from(tag.0).checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }

    /// Iterates `(tag, name)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeTag, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (BiomeTag(i as u16 + 1), name.as_str()))
    }

    /// Returns the number of registered tags.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no tags are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
