//! Asset extraction: per-type export dispatch and output layout.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bundle::{AssetPayload, AssetRecord, Bundle, BundleError};
use crate::kind::{AssetKind, TypeFilter};
use crate::meta::{self, AssetMeta};
use crate::naming::{display_name, guess_extension, sanitize_filename};

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Write everything into the output root with `{Kind}_{name}` stems
    /// instead of per-type subfolders.
    pub flat: bool,
    /// Decode and count, but write nothing.
    pub dry_run: bool,
    pub filter: TypeFilter,
}

/// What an extraction pass did.
#[derive(Debug, Default, Clone)]
pub struct ExtractSummary {
    /// Successfully exported assets per kind.
    pub counts: BTreeMap<AssetKind, usize>,
    /// One line per asset: `Kind -> path` or `[ERROR] Kind: message`.
    pub log: Vec<String>,
    pub errors: usize,
}

impl ExtractSummary {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    fn exported(&mut self, kind: AssetKind, prefix: &Path) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.log.push(format!("{} -> {}", kind, prefix.display()));
    }

    fn failed(&mut self, kind: AssetKind, err: &BundleError) {
        self.errors += 1;
        self.log.push(format!("[ERROR] {}: {}", kind, err));
    }
}

/// Extract all matching assets from a bundle.
///
/// `on_asset` is invoked once per bundle object before it is processed,
/// so callers can drive a progress bar. Per-asset failures are recorded
/// in the summary and do not abort the pass.
pub fn extract_bundle(
    bundle: &mut dyn Bundle,
    bundle_path: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
    mut on_asset: impl FnMut(&AssetRecord),
) -> Result<ExtractSummary, BundleError> {
    let source_bundle = file_name(bundle_path);
    let records: Vec<AssetRecord> = bundle.assets().to_vec();
    let mut summary = ExtractSummary::default();

    if !options.dry_run {
        fs::create_dir_all(output_dir)?;
    }

    for record in records {
        on_asset(&record);
        if !options.filter.matches(record.kind) {
            continue;
        }

        let name = display_name(record.name.as_deref(), record.kind, record.path_id);
        let (save_dir, stem) = if options.flat {
            (
                output_dir.to_path_buf(),
                format!("{}_{}", record.kind, name),
            )
        } else {
            (output_dir.join(record.kind.subfolder()), name.clone())
        };
        let prefix = save_dir.join(&stem);

        let payload = match bundle.payload(record.path_id) {
            Ok(payload) => payload,
            Err(err) => {
                summary.failed(record.kind, &err);
                continue;
            }
        };

        if !options.dry_run {
            fs::create_dir_all(&save_dir)?;
            if let Err(err) = write_payload(&prefix, record.kind, &payload) {
                summary.failed(record.kind, &err);
                continue;
            }

            let meta = AssetMeta {
                kind: record.kind,
                path_id: record.path_id,
                name: name.clone(),
                source_bundle: source_bundle.clone(),
                original_path: relative_prefix(output_dir, &prefix),
            };
            if let Err(err) = meta::write_meta(&prefix, &meta) {
                summary.failed(record.kind, &err);
                continue;
            }
        }

        summary.exported(record.kind, &prefix);
    }

    Ok(summary)
}

/// Classic `unpack` layout: `<stem>_extracted/` beside the bundle with
/// `Textures/` and `TextAssets/` only, no sidecars.
pub fn unpack_bundle(
    bundle: &mut dyn Bundle,
    bundle_path: &Path,
    mut on_asset: impl FnMut(&AssetRecord),
) -> Result<(PathBuf, ExtractSummary), BundleError> {
    let output_dir = default_unpack_dir(bundle_path);
    let mut summary = ExtractSummary::default();

    let textures_dir = output_dir.join(AssetKind::Texture2D.classic_subfolder());
    let textassets_dir = output_dir.join(AssetKind::TextAsset.classic_subfolder());
    fs::create_dir_all(&textures_dir)?;
    fs::create_dir_all(&textassets_dir)?;

    let records: Vec<AssetRecord> = bundle.assets().to_vec();
    for record in records {
        on_asset(&record);

        let (dir, fallback) = match record.kind {
            AssetKind::Texture2D => (&textures_dir, format!("texture_{}", record.path_id)),
            AssetKind::TextAsset => (&textassets_dir, format!("textasset_{}", record.path_id)),
            _ => continue,
        };
        let stem = match record.name.as_deref().map(sanitize_filename) {
            Some(clean) if !clean.is_empty() => clean,
            _ => fallback,
        };
        let prefix = dir.join(stem);

        match bundle.payload(record.path_id) {
            Ok(payload) => match write_payload(&prefix, record.kind, &payload) {
                Ok(()) => summary.exported(record.kind, &prefix),
                Err(err) => summary.failed(record.kind, &err),
            },
            Err(err) => summary.failed(record.kind, &err),
        }
    }

    Ok((output_dir, summary))
}

/// `<stem>_extracted` next to the bundle.
pub fn default_unpack_dir(bundle_path: &Path) -> PathBuf {
    let stem = bundle_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string());
    match bundle_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.join(format!("{}_extracted", stem))
        }
        _ => PathBuf::from(format!("{}_extracted", stem)),
    }
}

/// Write one decoded payload, picking the extension by kind.
fn write_payload(
    prefix: &Path,
    kind: AssetKind,
    payload: &AssetPayload,
) -> Result<(), BundleError> {
    match payload {
        AssetPayload::Image(img) => {
            img.save(with_extension(prefix, ".png"))?;
        }
        AssetPayload::Text(content) => {
            let extension = match kind {
                AssetKind::Shader => ".shader",
                _ => guess_extension(content),
            };
            fs::write(with_extension(prefix, extension), content)?;
        }
        AssetPayload::TypeTree(tree) => {
            fs::write(
                with_extension(prefix, ".json"),
                serde_json::to_string_pretty(tree)?,
            )?;
        }
        AssetPayload::Binary { data, extension } => {
            fs::write(with_extension(prefix, extension), data)?;
        }
    }
    Ok(())
}

fn with_extension(prefix: &Path, extension: &str) -> PathBuf {
    let mut os = prefix.as_os_str().to_os_string();
    os.push(extension);
    PathBuf::from(os)
}

fn relative_prefix(output_dir: &Path, prefix: &Path) -> String {
    prefix
        .strip_prefix(output_dir)
        .unwrap_or(prefix)
        .to_string_lossy()
        .into_owned()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
