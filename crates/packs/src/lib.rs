//! Card pack catalog.
//!
//! The catalog only answers which packs exist; card content belongs to the
//! game engine.

pub mod catalog;

pub use catalog::{ALL_PACKS, PackCatalog, PackInfo, StaticCatalog, UnknownPack};
