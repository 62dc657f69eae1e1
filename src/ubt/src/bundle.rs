//! Bundle engine seam.
//!
//! Everything format-sensitive happens behind the [`Bundle`] trait; the
//! only production implementation is [`crate::unity::UnityBundle`], which
//! reads through the `unity_rs` crate and writes through
//! [`crate::unityfs`]. Handlers take `&mut dyn Bundle` so they stay
//! independent of the engine.

use std::io;

use image::RgbaImage;
use thiserror::Error;

use crate::kind::AssetKind;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse bundle: {0}")]
    Parse(String),

    #[error("bundle engine error: {0}")]
    Engine(String),

    #[error("no asset with path_id {path_id} in bundle")]
    MissingAsset { path_id: i64 },

    #[error("{kind} assets cannot be re-imported")]
    UnsupportedReplace { kind: AssetKind },

    #[error("the engine cannot re-encode {kind} assets")]
    UnsupportedEncode { kind: AssetKind },

    #[error("no exportable payload for {kind} (path_id {path_id})")]
    NoPayload { kind: AssetKind, path_id: i64 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BundleError {
    /// Wrap an engine-side failure, keeping only its message.
    pub(crate) fn engine(err: impl std::fmt::Display) -> Self {
        BundleError::Engine(err.to_string())
    }
}

/// Bundle compression used when repacking.
///
/// `--fast` maps to [`Compression::None`]; the default mirrors Unity's
/// LZ4 block packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Lz4,
    None,
}

/// One asset inside a loaded bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub path_id: i64,
    pub kind: AssetKind,
    /// Object name as stored in the bundle, if it has a non-empty one.
    pub name: Option<String>,
}

/// Decoded asset content handed to the export handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    /// Texture2D / Sprite pixels, written as PNG.
    Image(RgbaImage),
    /// TextAsset / Shader script bytes (not guaranteed UTF-8).
    Text(Vec<u8>),
    /// Serialized object dump for typetree-exported kinds.
    TypeTree(serde_json::Value),
    /// Raw media bytes with their conventional extension (wav/ttf/mp4).
    Binary {
        data: Vec<u8>,
        extension: &'static str,
    },
}

/// Edited content pushed back into a bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetReplacement {
    Image(RgbaImage),
    Text(Vec<u8>),
    TypeTree(serde_json::Value),
}

/// A loaded asset bundle.
///
/// Object-safe so command handlers can work on `&mut dyn Bundle` without
/// caring which engine is behind it.
pub trait Bundle {
    /// All supported assets in the bundle, in engine order.
    fn assets(&self) -> &[AssetRecord];

    /// Decode one asset for export.
    fn payload(&mut self, path_id: i64) -> Result<AssetPayload, BundleError>;

    /// Replace one asset's content.
    fn replace(&mut self, path_id: i64, replacement: AssetReplacement)
        -> Result<(), BundleError>;

    /// Whether [`Bundle::replace`] can actually re-encode this kind.
    ///
    /// Some engines decode more kinds than they can serialize back;
    /// handlers consult this before promising a replacement.
    fn supports_replacement(&self, kind: AssetKind) -> bool {
        kind.supports_reimport()
    }

    /// Serialize the (possibly modified) bundle.
    fn pack(&mut self, compression: Compression) -> Result<Vec<u8>, BundleError>;

    /// Unity version the bundle was opened with, when known.
    fn unity_version(&self) -> Option<&str>;
}
