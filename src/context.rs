//! The decoder's seam to the outside world: asset loading and path
//! resolution live behind [`MapContext`], so the decode pass never touches
//! the filesystem or a GPU directly.

use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};

use crate::error::MapError;

/// External collaborator interface for everything the decoder references but
/// does not interpret: tileset textures, image-layer bitmaps and file-typed
/// property paths.
///
/// The associated types are opaque handles; the decoder only stores them in
/// the returned map. Any error a method returns aborts the whole decode.
pub trait MapContext {
    /// Handle for a loaded tileset texture.
    type Texture: Debug;
    /// Handle for a loaded image-layer bitmap.
    type Bitmap: Debug;
    /// Handle for a resolved file-typed property.
    type FileRef: Debug + Clone + PartialEq;

    /// Loads a tileset image. `source` is relative to the map document.
    fn load_texture(&mut self, source: &str) -> Result<LoadedTexture<Self::Texture>, MapError>;

    /// Loads an image-layer bitmap. `source` is relative to the map document.
    fn load_bitmap(&mut self, source: &str) -> Result<Self::Bitmap, MapError>;

    /// Resolves a file-typed property value to a reference handle.
    fn resolve_file(&mut self, source: &str) -> Result<Self::FileRef, MapError>;
}

/// A texture handle with the raw pixel dimensions reported by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTexture<T> {
    /// The opaque texture handle.
    pub handle: T,
    /// Raw image width in pixels.
    pub width: u32,
    /// Raw image height in pixels.
    pub height: u32,
}

/// Filesystem-backed [`MapContext`], jailed to the map's own directory.
///
/// Handles are the resolved paths; textures and bitmaps are probed with the
/// `image` crate so that a missing or undecodable file fails the decode, but
/// no pixel data is kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    base: PathBuf,
}

impl PathContext {
    /// A context resolving sources relative to `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        PathContext { base: base.into() }
    }

    /// Resolves `source` inside the jail. Absolute paths and any `..` that
    /// would climb above the base directory are rejected.
    pub fn resolve(&self, source: &str) -> Result<PathBuf, MapError> {
        let relative = Path::new(source);
        if relative.is_absolute() {
            return Err(MapError::PathOutsideMap {
                path: source.to_owned(),
            });
        }
        let mut depth: i32 = 0;
        for component in relative.components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(MapError::PathOutsideMap {
                            path: source.to_owned(),
                        });
                    }
                }
                _ => {
                    return Err(MapError::PathOutsideMap {
                        path: source.to_owned(),
                    })
                }
            }
        }
        Ok(self.base.join(relative))
    }

    fn probe(&self, source: &str) -> Result<(PathBuf, u32, u32), MapError> {
        let path = self.resolve(source)?;
        let (width, height) =
            image::image_dimensions(&path).map_err(|err| MapError::AssetLoad {
                path: source.to_owned(),
                message: err.to_string(),
            })?;
        Ok((path, width, height))
    }
}

impl MapContext for PathContext {
    type Texture = PathBuf;
    type Bitmap = PathBuf;
    type FileRef = PathBuf;

    fn load_texture(&mut self, source: &str) -> Result<LoadedTexture<PathBuf>, MapError> {
        let (handle, width, height) = self.probe(source)?;
        Ok(LoadedTexture {
            handle,
            width,
            height,
        })
    }

    fn load_bitmap(&mut self, source: &str) -> Result<PathBuf, MapError> {
        let (path, _, _) = self.probe(source)?;
        Ok(path)
    }

    fn resolve_file(&mut self, source: &str) -> Result<PathBuf, MapError> {
        self.resolve(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_sources_against_the_base() {
        let ctx = PathContext::new("/maps/forest");
        let path = ctx.resolve("tiles/grass.png").unwrap();
        assert_eq!(path, PathBuf::from("/maps/forest/tiles/grass.png"));
    }

    #[test]
    fn parent_segments_may_not_leave_the_jail() {
        let ctx = PathContext::new("/maps/forest");
        assert!(ctx.resolve("a/../b.png").is_ok());
        assert!(matches!(
            ctx.resolve("../secrets.png"),
            Err(MapError::PathOutsideMap { .. })
        ));
        assert!(matches!(
            ctx.resolve("a/../../secrets.png"),
            Err(MapError::PathOutsideMap { .. })
        ));
    }

    #[test]
    fn absolute_sources_are_rejected() {
        let ctx = PathContext::new("/maps/forest");
        assert!(matches!(
            ctx.resolve("/etc/passwd"),
            Err(MapError::PathOutsideMap { .. })
        ));
    }
}
