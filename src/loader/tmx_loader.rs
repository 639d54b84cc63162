// src/loader/tmx_loader.rs
use crate::color::{parse_color, WHITE};
use crate::context::{MapContext, PathContext};
use crate::error::MapError;
use crate::map::{Layer, LayerKind, Map, Object, Point, Properties, Rect, Tileset, TypedValue};
use crate::xml::{self, Element};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Decodes a TMX document from a string, loading referenced assets through
/// `ctx`.
///
/// The walk is a single forward pass over the document; every collaborator
/// call completes before the walk advances, so tilesets and layers end up in
/// exact document order. On any error the partially built map is dropped.
pub fn decode_tmx_str<C: MapContext>(src: &str, ctx: &mut C) -> Result<Map<C>, MapError> {
    let root = xml::parse(src)?;
    decode_document(&root, ctx)
}

/// Reads and decodes a `.tmx` file, resolving assets relative to its
/// directory through a [`PathContext`].
pub fn decode_tmx_file(path: impl AsRef<Path>) -> Result<Map<PathContext>, MapError> {
    let path = path.as_ref();
    if path.extension().and_then(|e| e.to_str()) != Some("tmx") {
        return Err(MapError::InvalidMap(format!(
            "map file must be a TMX file: {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let map_dir = path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let mut ctx = PathContext::new(map_dir);
    decode_tmx_str(&text, &mut ctx)
}

fn decode_document<C: MapContext>(root: &Element, ctx: &mut C) -> Result<Map<C>, MapError> {
    let mut map = Map {
        tilesets: Vec::new(),
        layers: Vec::new(),
    };

    for element in root.children() {
        match element.name() {
            "tileset" => map.tilesets.push(decode_tileset(element, ctx)?),
            "layer" | "objectgroup" | "imagelayer" => {
                map.layers.push(decode_layer(element, ctx)?);
            }
            other => log::debug!("skipping unrecognized element <{other}>"),
        }
    }

    log::debug!(
        "decoded map: {} tilesets, {} layers",
        map.tilesets.len(),
        map.layers.len()
    );
    Ok(map)
}

fn decode_tileset<C: MapContext>(element: &Element, ctx: &mut C) -> Result<Tileset<C>, MapError> {
    let image = element.child("image");
    let source = image.map(|i| i.str("source")).unwrap_or("");
    Ok(Tileset {
        firstgid: element.uint("firstgid", 0),
        name: element.str("name").to_owned(),
        tile_width: element.uint("tilewidth", 0),
        tile_height: element.uint("tileheight", 0),
        tile_count: element.int("tilecount", -1),
        columns: element.int("columns", -1),
        image: ctx.load_texture(source)?,
    })
}

fn decode_layer<C: MapContext>(element: &Element, ctx: &mut C) -> Result<Layer<C>, MapError> {
    let name = element.str("name").to_owned();

    let mut properties = Properties::new();
    if let Some(block) = element.child("properties") {
        for property in block.children_named("property") {
            let raw_value = property.str("rawValue");
            let kind = property.attr("type").unwrap_or("text");
            properties.insert(
                property.str("name").to_owned(),
                parse_typed_property(raw_value, kind, ctx)?,
            );
        }
    }

    let kind = match element.name() {
        "layer" => decode_tile_layer(element, &name)?,
        "imagelayer" => decode_image_layer(element, ctx)?,
        "objectgroup" => decode_object_layer(element)?,
        other => return Err(MapError::InvalidMap(format!("not a layer: <{other}>"))),
    };

    Ok(Layer {
        name,
        visible: element.int("visible", 1) != 0,
        draw_order: element.str("draworder").to_owned(),
        tint_color: element.attr("color").map(parse_color).unwrap_or(WHITE),
        opacity: element.double("opacity", 1.0),
        offset_x: element.double("offsetx", 0.0),
        offset_y: element.double("offsety", 0.0),
        properties,
        kind,
    })
}

/// Coerces one raw property value through its `type` discriminator.
///
/// Numeric coercions are deliberately lenient (0 / 0.0 on garbage): a single
/// bad property must not block an otherwise valid map. File values resolve
/// through the context and *can* fail the decode.
fn parse_typed_property<C: MapContext>(
    raw_value: &str,
    kind: &str,
    ctx: &mut C,
) -> Result<TypedValue<C>, MapError> {
    Ok(match kind {
        "bool" => TypedValue::Bool(raw_value == "true"),
        "color" => TypedValue::Color(parse_color(raw_value)),
        "int" => TypedValue::Int(raw_value.parse().unwrap_or(0)),
        "float" => TypedValue::Float(raw_value.parse().unwrap_or(0.0)),
        "file" => TypedValue::File(ctx.resolve_file(raw_value)?),
        // "text" and any unknown discriminator keep the raw string.
        _ => TypedValue::Str(raw_value.to_owned()),
    })
}

fn decode_tile_layer<C: MapContext>(
    element: &Element,
    name: &str,
) -> Result<LayerKind<C>, MapError> {
    let width = element.uint("width", 0) as usize;
    let height = element.uint("height", 0) as usize;
    let expected = width * height;

    let data = element
        .child("data")
        .ok_or_else(|| MapError::MissingChild {
            element: "layer".to_owned(),
            child: "data".to_owned(),
        })?;

    let tiles = decode_tile_data(data, name, expected)?;
    if tiles.len() != expected {
        return Err(MapError::LayerSizeMismatch {
            layer: name.to_owned(),
            expected,
            actual: tiles.len(),
        });
    }

    Ok(LayerKind::Tiles {
        width,
        height,
        data: tiles,
    })
}

/// Decodes a `<data>` payload into a flat gid grid of exactly `expected`
/// cells (the caller re-checks the count for the inline encodings).
///
/// All four source encodings produce the same canonical `u32` grid, so
/// nothing downstream ever branches on encoding again.
fn decode_tile_data(data: &Element, layer: &str, expected: usize) -> Result<Vec<u32>, MapError> {
    let encoding = data.str("encoding").to_ascii_lowercase();
    let compression = data.str("compression").to_ascii_lowercase();

    match encoding.as_str() {
        "" | "xml" => Ok(data
            .children_named("tile")
            .map(|tile| tile.uint("gid", 0))
            .collect()),
        "csv" => {
            let stripped: String = data
                .text()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            stripped
                .split(',')
                .map(|token| {
                    token.parse::<u32>().map_err(|_| MapError::InvalidGid {
                        layer: layer.to_owned(),
                        token: token.to_owned(),
                    })
                })
                .collect()
        }
        "base64" => {
            let raw = BASE64
                .decode(data.text().trim())
                .map_err(|source| MapError::Base64 { source })?;

            let bytes = match compression.as_str() {
                "" => raw,
                "gzip" => decompress(GzDecoder::new(raw.as_slice()))?,
                "zlib" => decompress(ZlibDecoder::new(raw.as_slice()))?,
                other => {
                    return Err(MapError::UnsupportedCompression {
                        compression: other.to_owned(),
                    })
                }
            };

            if bytes.len() < expected * 4 {
                return Err(MapError::LayerSizeMismatch {
                    layer: layer.to_owned(),
                    expected,
                    actual: bytes.len() / 4,
                });
            }

            // Standard Tiled binary layout: consecutive little-endian u32s.
            Ok(bytes
                .chunks_exact(4)
                .take(expected)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect())
        }
        other => Err(MapError::UnsupportedEncoding {
            encoding: other.to_owned(),
        }),
    }
}

fn decompress(mut decoder: impl Read) -> Result<Vec<u8>, MapError> {
    let mut bytes = Vec::new();
    decoder
        .read_to_end(&mut bytes)
        .map_err(|source| MapError::Decompress { source })?;
    Ok(bytes)
}

fn decode_image_layer<C: MapContext>(
    element: &Element,
    ctx: &mut C,
) -> Result<LayerKind<C>, MapError> {
    // Multiple <image> children: every one is loaded, the last handle wins.
    let mut image = None;
    for img in element.children_named("image") {
        image = Some(ctx.load_bitmap(img.str("source"))?);
    }
    Ok(LayerKind::Image { image })
}

fn decode_object_layer<C: MapContext>(element: &Element) -> Result<LayerKind<C>, MapError> {
    let mut objects = Vec::new();
    for obj in element.children_named("object") {
        let bounds = Rect {
            x: obj.int("x", 0),
            y: obj.int("y", 0),
            width: obj.int("width", 0),
            height: obj.int("height", 0),
        };
        objects.push(decode_object(bounds, obj.children().first())?);
    }
    Ok(LayerKind::Objects { objects })
}

/// Builds an object variant from its bounds and its first shape child, if
/// any. Children past the first are ignored (one shape per object).
fn decode_object(bounds: Rect, shape: Option<&Element>) -> Result<Object, MapError> {
    let Some(shape) = shape else {
        return Ok(Object::Rect { bounds });
    };
    match shape.name() {
        "ellipse" => Ok(Object::Ellipse { bounds }),
        "polyline" => Ok(Object::Polyline {
            bounds,
            points: parse_point_list(shape.str("points")),
        }),
        "polygon" => Ok(Object::Polygon {
            bounds,
            points: parse_point_list(shape.str("points")),
        }),
        other => Err(MapError::UnknownObjectKind {
            kind: other.to_owned(),
        }),
    }
}

/// Parses a `points` attribute (`"x,y x,y ..."`) into a point list.
///
/// Coordinates are flattened across whitespace and comma splits (empty
/// fragments dropped, garbage parsed as 0.0) and then paired in order, so a
/// sloppy list never panics. A dangling odd coordinate becomes `(x, 0.0)`.
pub fn parse_point_list(raw: &str) -> Vec<Point> {
    let coords: Vec<f64> = raw
        .split_whitespace()
        .flat_map(|pair| pair.split(','))
        .filter(|part| !part.is_empty())
        .map(|part| part.trim().parse().unwrap_or(0.0))
        .collect();

    let mut points = Vec::with_capacity(coords.len() / 2 + 1);
    let mut chunks = coords.chunks_exact(2);
    for pair in &mut chunks {
        points.push(Point {
            x: pair[0],
            y: pair[1],
        });
    }
    if let &[x] = chunks.remainder() {
        points.push(Point { x, y: 0.0 });
    }
    points
}
