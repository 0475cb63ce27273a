//! Biome tags: identifiers, the bounded output set, and the name registry.

mod registry;
mod set;

pub use registry::{BiomeTag, TagRegistry, TagRegistryError};
pub use set::{MAX_TAGS, TagSet};
