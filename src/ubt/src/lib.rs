//! # ubt
//!
//! Unity asset bundle library - extraction, re-import, and repacking.
//!
//! Bundle parsing and object decoding are delegated to the `unity_rs`
//! crate; repacking splices edited payloads back into the original
//! archive bytes (see [`unityfs`]). This library contributes the
//! orchestration around both:
//! - Enumerate bundle assets and export them per type (images, text,
//!   typetree JSON, audio, fonts, video)
//! - Re-import edited files and repack a new bundle
//! - Verify asset integrity
//! - Emit `.meta.json` sidecars and a `modifications.json` history log
//!
//! ## Example
//!
//! ```no_run
//! use ubt::{extract, Compression, ExtractOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut bundle = ubt::open("character.bundle", None)?;
//! let summary = extract::extract_bundle(
//!     &mut *bundle,
//!     "character.bundle".as_ref(),
//!     "character_extracted".as_ref(),
//!     &ExtractOptions::default(),
//!     |_| {},
//! )?;
//! println!("extracted {} assets", summary.total());
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod extract;
pub mod history;
pub mod kind;
pub mod meta;
pub mod naming;
pub mod repack;
pub mod unity;
pub mod unityfs;
pub mod verify;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
#[doc(inline)]
pub use bundle::{
    AssetPayload, AssetRecord, AssetReplacement, Bundle, BundleError, Compression,
};
#[doc(inline)]
pub use extract::{ExtractOptions, ExtractSummary};
#[doc(inline)]
pub use history::{HistoryError, ModificationEntry, ModificationLog};
#[doc(inline)]
pub use kind::{AssetKind, TypeFilter};
#[doc(inline)]
pub use meta::AssetMeta;
#[doc(inline)]
pub use repack::{Change, RepackOptions};
#[doc(inline)]
pub use verify::{verify_bundle, Issue};
#[doc(inline)]
pub use version::{detect_unity_version, DEFAULT_UNITY_VERSION};

use std::path::Path;

/// Open a bundle file with the `unity_rs` engine.
///
/// `fallback_version` is the Unity version to assume when the bundle does
/// not carry one (see [`version::detect_unity_version`]).
pub fn open(
    path: impl AsRef<Path>,
    fallback_version: Option<&str>,
) -> Result<Box<dyn Bundle>, BundleError> {
    let bundle = unity::UnityBundle::open(path.as_ref(), fallback_version)?;
    Ok(Box::new(bundle))
}
