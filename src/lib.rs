#![warn(missing_docs)]

//! Minimal Tiled TMX (XML) map decoder.
//!
//! Decodes a `.tmx` document into a typed [`Map`]: tilesets, tile/object/
//! image layers, typed properties and object shapes, with the tile payload
//! accepted in any of Tiled's encodings (inline XML, CSV, base64 raw/gzip/
//! zlib). Asset loading is delegated to a [`MapContext`] implementation;
//! [`PathContext`] is the built-in filesystem one.

mod color;
mod context;
mod error;
mod loader {
    pub mod tmx_loader;
}
mod map;
mod xml;

pub use color::{parse_color, UNKNOWN_COLOR, WHITE};
pub use context::{LoadedTexture, MapContext, PathContext};
pub use error::MapError;
pub use loader::tmx_loader::{decode_tmx_file, decode_tmx_str, parse_point_list};
pub use map::{Layer, LayerKind, Map, Object, Point, Properties, Rect, Tileset, TypedValue};
