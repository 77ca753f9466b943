//! Asset access: shader source text and texture images, read from an asset root.
//!
//! Every asset that is read gets recorded in a content-addressed manifest.
//! The renderer only ever sees decoded data (source strings, RGBA pixels),
//! never file handles.
//!
//! # Layout
//! Paths are relative to the asset root. A leading `/` is accepted and means
//! "from the root", so `/textures/normalMap.png` and `textures/normalMap.png`
//! name the same file.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Content-addressed asset ID computed from the asset bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// What kind of file an asset entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    ShaderSource,
    Texture,
}

/// A manifest entry for an asset that has been read at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub path: String,
    pub kind: AssetKind,
    pub byte_len: u64,
}

/// A decoded texture: tightly packed RGBA8 rows, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// A single opaque pixel of the given colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error in {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("shader source {0} is not valid UTF-8")]
    NotUtf8(String),
    #[error("asset not found: {0:?}")]
    NotFound(AssetId),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    ManifestIo(#[from] std::io::Error),
}

/// Saved form of the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    pub entries: BTreeMap<AssetId, AssetEntry>,
}

/// Reads assets relative to a root directory and tracks what was read.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    root: PathBuf,
    manifest: AssetManifest,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: AssetManifest::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute-ish path for an asset-relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches('/'))
    }

    /// Read a shader stage's source text.
    pub fn read_shader_source(&mut self, relative: &str) -> Result<String, AssetError> {
        let bytes = self.read_bytes(relative)?;
        let source =
            String::from_utf8(bytes).map_err(|_| AssetError::NotUtf8(relative.to_string()))?;
        let id = self.record(relative, AssetKind::ShaderSource, source.as_bytes());
        tracing::debug!(path = relative, ?id, "read shader source");
        Ok(source)
    }

    /// Read and decode an image file into RGBA8 pixels.
    pub fn load_texture_image(&mut self, relative: &str) -> Result<TextureImage, AssetError> {
        let bytes = self.read_bytes(relative)?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Image {
            path: relative.to_string(),
            source,
        })?;
        let id = self.record(relative, AssetKind::Texture, &bytes);
        let rgba = decoded.to_rgba8();
        tracing::debug!(
            path = relative,
            ?id,
            width = rgba.width(),
            height = rgba.height(),
            "decoded texture"
        );
        Ok(TextureImage {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    /// Look up a manifest entry by ID.
    pub fn get(&self, id: AssetId) -> Result<&AssetEntry, AssetError> {
        self.manifest.entries.get(&id).ok_or(AssetError::NotFound(id))
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Number of distinct assets read so far.
    pub fn len(&self) -> usize {
        self.manifest.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.entries.is_empty()
    }

    /// Save the manifest to a JSON file.
    pub fn save_manifest(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self.manifest)?;
        Ok(())
    }

    /// Load a manifest from a JSON file.
    pub fn load_manifest(path: impl AsRef<Path>) -> Result<AssetManifest, AssetError> {
        let file = std::fs::File::open(path)?;
        let manifest: AssetManifest = serde_json::from_reader(file)?;
        Ok(manifest)
    }

    fn read_bytes(&self, relative: &str) -> Result<Vec<u8>, AssetError> {
        std::fs::read(self.resolve(relative)).map_err(|source| AssetError::Io {
            path: relative.to_string(),
            source,
        })
    }

    fn record(&mut self, relative: &str, kind: AssetKind, bytes: &[u8]) -> AssetId {
        let id = content_hash(bytes);
        self.manifest.entries.insert(
            id,
            AssetEntry {
                path: relative.trim_start_matches('/').to_string(),
                kind,
                byte_len: bytes.len() as u64,
            },
        );
        id
    }
}

/// First eight bytes of the SHA-256 digest, little endian.
pub fn content_hash(bytes: &[u8]) -> AssetId {
    let result = Sha256::digest(bytes);
    let mut out = [0u8; 8];
    out.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(out))
}

pub fn crate_info() -> &'static str {
    "waterline-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, bytes: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn reads_shader_source_with_leading_slash() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shaders/bloom/simpleVertex.vert", b"void main() {}");
        let mut lib = AssetLibrary::new(dir.path());

        let src = lib.read_shader_source("/shaders/bloom/simpleVertex.vert").unwrap();
        assert_eq!(src, "void main() {}");
        assert_eq!(lib.len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = AssetLibrary::new(dir.path());
        let err = lib.load_texture_image("/textures/waterDUDV.png").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(lib.is_empty());
    }

    #[test]
    fn garbage_image_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "textures/normalMap.png", b"not a png");
        let mut lib = AssetLibrary::new(dir.path());
        let err = lib.load_texture_image("textures/normalMap.png").unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
    }

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("textures")).unwrap();
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(dir.path().join("textures/waterDUDV.png")).unwrap();

        let mut lib = AssetLibrary::new(dir.path());
        let tex = lib.load_texture_image("/textures/waterDUDV.png").unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.pixels.len(), 3 * 2 * 4);
        assert_eq!(&tex.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn non_utf8_shader_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shaders/bad.frag", &[0xff, 0xfe, 0x00]);
        let mut lib = AssetLibrary::new(dir.path());
        let err = lib.read_shader_source("shaders/bad.frag").unwrap_err();
        assert!(matches!(err, AssetError::NotUtf8(_)));
        assert!(lib.is_empty());
    }

    #[test]
    fn content_addressed_dedup() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.vert", b"same");
        let mut lib = AssetLibrary::new(dir.path());
        lib.read_shader_source("a.vert").unwrap();
        lib.read_shader_source("/a.vert").unwrap();
        assert_eq!(lib.len(), 1);

        let id = content_hash(b"same");
        assert_eq!(lib.get(id).unwrap().path, "a.vert");
    }

    #[test]
    fn manifest_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.frag", b"one");
        write(dir.path(), "b.frag", b"two");
        let mut lib = AssetLibrary::new(dir.path());
        lib.read_shader_source("a.frag").unwrap();
        lib.read_shader_source("b.frag").unwrap();

        let tmp = tempfile::NamedTempFile::new().unwrap();
        lib.save_manifest(tmp.path()).unwrap();
        let loaded = AssetLibrary::load_manifest(tmp.path()).unwrap();
        assert_eq!(loaded.entries.len(), 2);
    }
}
