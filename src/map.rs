//! The decoded map model.
//!
//! Everything here is plain data: the decoder builds it in one pass and hands
//! it to the caller, which owns it exclusively (including disposal of any
//! opaque asset handles inside).

use std::collections::HashMap;
use std::path::Path;

use crate::context::{LoadedTexture, MapContext, PathContext};
use crate::error::MapError;
use crate::loader::tmx_loader::decode_tmx_file;

/// A decoded Tiled map: tilesets and layers, both in document order.
///
/// Layer order is draw order, so it is preserved across mixed layer kinds.
#[derive(Debug)]
pub struct Map<C: MapContext> {
    /// Tilesets in declaration order. `firstgid` values are expected to be
    /// non-decreasing; the decoder appends without checking or deduplicating.
    pub tilesets: Vec<Tileset<C>>,
    /// All layers in document order, regardless of kind.
    pub layers: Vec<Layer<C>>,
}

impl Map<PathContext> {
    /// Reads and decodes a `.tmx` file, resolving assets relative to it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        decode_tmx_file(path)
    }
}

impl<C: MapContext> Map<C> {
    /// Layers holding a tile grid.
    pub fn pattern_layers(&self) -> impl Iterator<Item = &Layer<C>> {
        self.layers
            .iter()
            .filter(|layer| matches!(layer.kind, LayerKind::Tiles { .. }))
    }

    /// Layers holding a single image.
    pub fn image_layers(&self) -> impl Iterator<Item = &Layer<C>> {
        self.layers
            .iter()
            .filter(|layer| matches!(layer.kind, LayerKind::Image { .. }))
    }

    /// Layers holding freeform objects.
    pub fn object_layers(&self) -> impl Iterator<Item = &Layer<C>> {
        self.layers
            .iter()
            .filter(|layer| matches!(layer.kind, LayerKind::Objects { .. }))
    }
}

/// One `<tileset>` declaration.
#[derive(Debug)]
pub struct Tileset<C: MapContext> {
    /// First global tile id owned by this tileset.
    pub firstgid: u32,
    /// Tileset name, empty if undeclared.
    pub name: String,
    /// Width of one tile in pixels.
    pub tile_width: u32,
    /// Height of one tile in pixels.
    pub tile_height: u32,
    /// Number of tiles, -1 if undeclared.
    pub tile_count: i32,
    /// Tiles per atlas row, -1 if undeclared.
    pub columns: i32,
    /// The loaded atlas texture, opaque to the decoder.
    pub image: LoadedTexture<C::Texture>,
}

/// One layer: the attributes shared by every kind, plus the kind payload.
#[derive(Debug)]
pub struct Layer<C: MapContext> {
    /// Layer name, empty if undeclared.
    pub name: String,
    /// False when the author hid the layer (`visible="0"`).
    pub visible: bool,
    /// Object draw order hint (`topdown`/`index`), empty if undeclared.
    pub draw_order: String,
    /// Packed-ARGB tint, opaque white by default.
    pub tint_color: u32,
    /// Layer opacity in `0.0..=1.0`, 1.0 by default.
    pub opacity: f64,
    /// Horizontal rendering offset in pixels.
    pub offset_x: f64,
    /// Vertical rendering offset in pixels.
    pub offset_y: f64,
    /// Typed custom properties.
    pub properties: Properties<C>,
    /// Kind-specific payload.
    pub kind: LayerKind<C>,
}

/// The kind-specific payload of a layer.
#[derive(Debug)]
pub enum LayerKind<C: MapContext> {
    /// A rectangular grid of gids; `data.len() == width * height`, gid 0 is
    /// an empty cell.
    Tiles {
        /// Grid width in cells.
        width: usize,
        /// Grid height in cells.
        height: usize,
        /// Row-major gids.
        data: Vec<u32>,
    },
    /// A single static image; `None` when the layer declares no image.
    Image {
        /// The loaded bitmap, opaque to the decoder.
        image: Option<C::Bitmap>,
    },
    /// Freeform shapes in document order.
    Objects {
        /// The decoded objects.
        objects: Vec<Object>,
    },
}

/// Axis-aligned bounds of an object, in map pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// A 2D point, relative to its object's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// One shape from an object layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// An axis-aligned rectangle.
    Rect {
        /// Bounds of the rectangle.
        bounds: Rect,
    },
    /// An ellipse inscribed in its bounds.
    Ellipse {
        /// Bounding box of the ellipse.
        bounds: Rect,
    },
    /// An open polyline.
    Polyline {
        /// Bounding box as given by the document.
        bounds: Rect,
        /// Vertices relative to the object origin, untranslated.
        points: Vec<Point>,
    },
    /// A closed polygon.
    Polygon {
        /// Bounding box as given by the document.
        bounds: Rect,
        /// Vertices relative to the object origin, untranslated.
        points: Vec<Point>,
    },
}

impl Object {
    /// The object's bounds, whatever its shape.
    pub fn bounds(&self) -> Rect {
        match self {
            Object::Rect { bounds }
            | Object::Ellipse { bounds }
            | Object::Polyline { bounds, .. }
            | Object::Polygon { bounds, .. } => *bounds,
        }
    }
}

/// A typed custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue<C: MapContext> {
    /// `type="bool"`.
    Bool(bool),
    /// `type="int"`.
    Int(i64),
    /// `type="float"`.
    Float(f64),
    /// `type="text"`, or any unknown discriminator, kept verbatim.
    Str(String),
    /// `type="color"`, packed ARGB.
    Color(u32),
    /// `type="file"`, resolved by the asset context.
    File(C::FileRef),
}

/// String-keyed typed properties with convenience getters.
///
/// Each getter returns `None` when the key is absent *or* holds a different
/// type, so consumers never need to match on [`TypedValue`] themselves.
#[derive(Debug)]
pub struct Properties<C: MapContext>(HashMap<String, TypedValue<C>>);

impl<C: MapContext> Default for Properties<C> {
    fn default() -> Self {
        Properties(HashMap::new())
    }
}

impl<C: MapContext> Properties<C> {
    /// An empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous one under the same name.
    pub fn insert(&mut self, name: String, value: TypedValue<C>) {
        self.0.insert(name, value);
    }

    /// Raw lookup.
    pub fn get(&self, name: &str) -> Option<&TypedValue<C>> {
        self.0.get(name)
    }

    /// Bool property.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(TypedValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Int property.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(TypedValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Float property.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(TypedValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Text property (also the fallback for unknown discriminators).
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(TypedValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Color property, packed ARGB.
    pub fn get_color(&self, name: &str) -> Option<u32> {
        match self.0.get(name) {
            Some(TypedValue::Color(v)) => Some(*v),
            _ => None,
        }
    }

    /// File property, as resolved by the asset context.
    pub fn get_file(&self, name: &str) -> Option<&C::FileRef> {
        match self.0.get(name) {
            Some(TypedValue::File(v)) => Some(v),
            _ => None,
        }
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no properties were declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all properties in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue<C>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
