use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for the TMX decoder.
///
/// Every variant is fatal: the decode aborts and no partial map is returned.
/// Best-effort coercions (numeric properties, point coordinates, color names)
/// never reach this type; they fall back to defaults instead.
#[derive(Debug)]
pub enum MapError {
    /// File I/O error while reading the map document.
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The document is not well-formed XML.
    Xml {
        /// Underlying XML reader error.
        source: quick_xml::Error,
    },
    /// The document is structurally invalid (wrong extension, empty, ...).
    InvalidMap(String),
    /// A required child element is missing.
    MissingChild {
        /// Element that should contain the child.
        element: String,
        /// Name of the missing child element.
        child: String,
    },
    /// A CSV tile payload contained a non-numeric token.
    InvalidGid {
        /// Layer whose payload failed to decode.
        layer: String,
        /// The offending token.
        token: String,
    },
    /// A tile layer's `encoding` attribute is not one of the known values.
    UnsupportedEncoding {
        /// The unrecognized encoding string.
        encoding: String,
    },
    /// A tile layer's `compression` attribute is not none/gzip/zlib.
    UnsupportedCompression {
        /// The unrecognized compression string.
        compression: String,
    },
    /// A layer's decoded tile count does not match width * height.
    LayerSizeMismatch {
        /// Name of the offending layer.
        layer: String,
        /// Expected cell count (width * height).
        expected: usize,
        /// Number of tiles actually decoded.
        actual: usize,
    },
    /// An object's shape child is not rect/ellipse/polyline/polygon.
    UnknownObjectKind {
        /// The unrecognized child element name.
        kind: String,
    },
    /// A base64 tile payload failed to decode.
    Base64 {
        /// Underlying base64 error.
        source: base64::DecodeError,
    },
    /// A gzip/zlib tile payload failed to decompress.
    Decompress {
        /// Underlying decompression error.
        source: io::Error,
    },
    /// A referenced image or file could not be loaded by the asset context.
    AssetLoad {
        /// Source path as referenced by the document.
        path: String,
        /// Description of the failure.
        message: String,
    },
    /// A relative source path escapes the map's own directory.
    PathOutsideMap {
        /// The offending source path.
        path: String,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            MapError::Xml { source } => write!(f, "XML error: {}", source),
            MapError::InvalidMap(msg) => write!(f, "invalid map: {}", msg),
            MapError::MissingChild { element, child } => {
                write!(f, "<{}> is missing its <{}> child", element, child)
            }
            MapError::InvalidGid { layer, token } => {
                write!(f, "layer '{}': invalid gid token '{}'", layer, token)
            }
            MapError::UnsupportedEncoding { encoding } => {
                write!(f, "unhandled tile data encoding '{}'", encoding)
            }
            MapError::UnsupportedCompression { compression } => {
                write!(f, "unhandled tile data compression '{}'", compression)
            }
            MapError::LayerSizeMismatch {
                layer,
                expected,
                actual,
            } => write!(
                f,
                "layer '{}': decoded {} tiles, expected {}",
                layer, actual, expected
            ),
            MapError::UnknownObjectKind { kind } => {
                write!(f, "invalid object kind '{}'", kind)
            }
            MapError::Base64 { source } => write!(f, "base64 decode error: {}", source),
            MapError::Decompress { source } => write!(f, "decompression error: {}", source),
            MapError::AssetLoad { path, message } => {
                write!(f, "failed to load asset '{}': {}", path, message)
            }
            MapError::PathOutsideMap { path } => {
                write!(f, "source path '{}' escapes the map directory", path)
            }
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Xml { source } => Some(source),
            MapError::Base64 { source } => Some(source),
            MapError::Decompress { source } => Some(source),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for MapError {
    fn from(source: quick_xml::Error) -> Self {
        MapError::Xml { source }
    }
}
