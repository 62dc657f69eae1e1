//! Re-import of edited files and repacking.
//!
//! Matches files under an extracted tree back to the assets they came
//! from, pushes the edited content through the engine, and leaves writing
//! the new bundle to the caller. Originals are never modified.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bundle::{AssetRecord, AssetReplacement, Bundle, BundleError, Compression};
use crate::kind::{AssetKind, TypeFilter};
use crate::naming::{display_name, TEXT_ASSET_EXTENSIONS};

#[derive(Debug, Clone)]
pub struct RepackOptions {
    pub filter: TypeFilter,
    pub compression: Compression,
    /// Report would-be changes without touching the bundle.
    pub dry_run: bool,
}

impl Default for RepackOptions {
    fn default() -> Self {
        RepackOptions {
            filter: TypeFilter::All,
            compression: Compression::Lz4,
            dry_run: false,
        }
    }
}

/// One asset that was (or would be) replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: AssetKind,
    pub name: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.name)
    }
}

/// Result of matching an extracted tree against a bundle.
#[derive(Debug, Default, Clone)]
pub struct RepackOutcome {
    pub changes: Vec<Change>,
    /// Per-asset failures, skip-and-report style.
    pub errors: Vec<String>,
}

impl RepackOutcome {
    pub fn change_lines(&self) -> Vec<String> {
        self.changes.iter().map(Change::to_string).collect()
    }
}

/// Apply every edited file found under `folder` to the bundle.
///
/// Only Texture2D, TextAsset, and Mesh are re-importable; the extracted
/// tree may use per-type subfolders, the classic `Textures`/`TextAssets`
/// layout, or flat `{Kind}_{name}` stems.
pub fn apply_modified_tree(
    bundle: &mut dyn Bundle,
    folder: &Path,
    options: &RepackOptions,
    mut on_asset: impl FnMut(&AssetRecord),
) -> Result<RepackOutcome, BundleError> {
    let records: Vec<AssetRecord> = bundle.assets().to_vec();
    let mut outcome = RepackOutcome::default();

    for record in records {
        on_asset(&record);
        if !options.filter.matches_reimport(record.kind) {
            continue;
        }

        let stem = display_name(record.name.as_deref(), record.kind, record.path_id);
        let Some(source) = find_edited_file(folder, record.kind, &stem) else {
            continue;
        };

        // An edited file exists; make sure the engine can actually push
        // it back before promising a change (dry-run included).
        if !bundle.supports_replacement(record.kind) {
            outcome.errors.push(format!(
                "{} {}: {}",
                record.kind,
                stem,
                BundleError::UnsupportedEncode { kind: record.kind }
            ));
            continue;
        }

        let replacement = match load_replacement(record.kind, &source) {
            Ok(replacement) => replacement,
            Err(err) => {
                outcome
                    .errors
                    .push(format!("{} {}: {}", record.kind, stem, err));
                continue;
            }
        };

        if !options.dry_run {
            if let Err(err) = bundle.replace(record.path_id, replacement) {
                outcome
                    .errors
                    .push(format!("{} {}: {}", record.kind, stem, err));
                continue;
            }
        }

        outcome.changes.push(Change {
            kind: record.kind,
            name: stem,
        });
    }

    Ok(outcome)
}

/// Default output path for a repacked bundle: `modified_<name>` beside
/// the original.
pub fn default_modified_path(bundle_path: &Path) -> PathBuf {
    let name = bundle_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string());
    match bundle_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.join(format!("modified_{}", name))
        }
        _ => PathBuf::from(format!("modified_{}", name)),
    }
}

/// Locate the edited file for one asset, trying each layout in turn.
fn find_edited_file(folder: &Path, kind: AssetKind, stem: &str) -> Option<PathBuf> {
    let extensions: &[&str] = match kind {
        AssetKind::TextAsset => &TEXT_ASSET_EXTENSIONS,
        AssetKind::Texture2D => &[".png"],
        AssetKind::Mesh => &[".json"],
        _ => return None,
    };

    for prefix in candidate_prefixes(folder, kind, stem) {
        for extension in extensions {
            let mut os = prefix.as_os_str().to_os_string();
            os.push(extension);
            let candidate = PathBuf::from(os);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn candidate_prefixes(folder: &Path, kind: AssetKind, stem: &str) -> Vec<PathBuf> {
    let mut prefixes = vec![folder.join(kind.subfolder()).join(stem)];
    if kind.classic_subfolder() != kind.subfolder() {
        prefixes.push(folder.join(kind.classic_subfolder()).join(stem));
    }
    // Flat layout puts the kind into the stem
    prefixes.push(folder.join(format!("{}_{}", kind, stem)));
    prefixes
}

fn load_replacement(kind: AssetKind, source: &Path) -> Result<AssetReplacement, BundleError> {
    match kind {
        AssetKind::TextAsset => Ok(AssetReplacement::Text(fs::read(source)?)),
        AssetKind::Texture2D => {
            let img = image::open(source)?.to_rgba8();
            Ok(AssetReplacement::Image(img))
        }
        AssetKind::Mesh => {
            let tree = serde_json::from_str(&fs::read_to_string(source)?)?;
            Ok(AssetReplacement::TypeTree(tree))
        }
        other => Err(BundleError::UnsupportedReplace { kind: other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBundle;

    fn sample_bundle() -> FakeBundle {
        FakeBundle::new()
            .with_asset(1, AssetKind::Texture2D, Some("hero"), None)
            .with_asset(2, AssetKind::TextAsset, Some("config"), None)
            .with_asset(3, AssetKind::Mesh, Some("body"), None)
            .with_asset(4, AssetKind::Sprite, Some("icon"), None)
    }

    #[test]
    fn test_repack_text_asset_nested() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        fs::create_dir_all(folder.join("TextAsset")).unwrap();
        fs::write(folder.join("TextAsset/config.txt"), b"hp: 9").unwrap();

        let mut bundle = sample_bundle();
        let outcome =
            apply_modified_tree(&mut bundle, folder, &RepackOptions::default(), |_| {}).unwrap();

        assert_eq!(
            outcome.changes,
            vec![Change {
                kind: AssetKind::TextAsset,
                name: "config".to_string()
            }]
        );
        assert_eq!(outcome.change_lines(), vec!["TextAsset: config"]);
        assert_eq!(
            bundle.replaced,
            vec![(2, AssetReplacement::Text(b"hp: 9".to_vec()))]
        );
    }

    #[test]
    fn test_repack_classic_and_flat_layouts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        // Classic layout for the text asset
        fs::create_dir_all(folder.join("TextAssets")).unwrap();
        fs::write(folder.join("TextAssets/config.json"), b"{}").unwrap();
        // Flat layout for the texture
        FakeBundle::image(2, 2)
            .save(folder.join("Texture2D_hero.png"))
            .unwrap();

        let mut bundle = sample_bundle();
        let outcome =
            apply_modified_tree(&mut bundle, folder, &RepackOptions::default(), |_| {}).unwrap();

        let mut kinds: Vec<_> = outcome.changes.iter().map(|c| c.kind).collect();
        kinds.sort();
        assert_eq!(kinds, vec![AssetKind::Texture2D, AssetKind::TextAsset]);
        assert_eq!(bundle.replaced.len(), 2);
    }

    #[test]
    fn test_repack_mesh_typetree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        fs::create_dir_all(folder.join("Mesh")).unwrap();
        fs::write(folder.join("Mesh/body.json"), b"{\"m_Name\": \"body\"}").unwrap();

        let mut bundle = sample_bundle();
        let outcome =
            apply_modified_tree(&mut bundle, folder, &RepackOptions::default(), |_| {}).unwrap();

        assert_eq!(outcome.changes.len(), 1);
        match &bundle.replaced[0] {
            (3, AssetReplacement::TypeTree(tree)) => {
                assert_eq!(tree["m_Name"], "body");
            }
            other => panic!("unexpected replacement: {:?}", other),
        }
    }

    #[test]
    fn test_repack_filter_and_unsupported_kinds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        fs::create_dir_all(folder.join("TextAsset")).unwrap();
        fs::write(folder.join("TextAsset/config.txt"), b"x").unwrap();
        // A sprite file on disk never matches: sprites are not re-importable
        fs::create_dir_all(folder.join("Sprite")).unwrap();
        fs::write(folder.join("Sprite/icon.png"), b"not read").unwrap();

        let options = RepackOptions {
            filter: TypeFilter::parse(&["Texture2D"]).unwrap(),
            ..RepackOptions::default()
        };
        let mut bundle = sample_bundle();
        let outcome = apply_modified_tree(&mut bundle, folder, &options, |_| {}).unwrap();

        assert!(outcome.changes.is_empty());
        assert!(bundle.replaced.is_empty());
    }

    #[test]
    fn test_repack_dry_run_does_not_touch_bundle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        fs::create_dir_all(folder.join("TextAsset")).unwrap();
        fs::write(folder.join("TextAsset/config.txt"), b"x").unwrap();

        let options = RepackOptions {
            dry_run: true,
            ..RepackOptions::default()
        };
        let mut bundle = sample_bundle();
        let outcome = apply_modified_tree(&mut bundle, folder, &options, |_| {}).unwrap();

        assert_eq!(outcome.changes.len(), 1);
        assert!(bundle.replaced.is_empty());
    }

    #[test]
    fn test_repack_bad_image_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        fs::create_dir_all(folder.join("Texture2D")).unwrap();
        fs::write(folder.join("Texture2D/hero.png"), b"not a png").unwrap();

        let mut bundle = sample_bundle();
        let outcome =
            apply_modified_tree(&mut bundle, folder, &RepackOptions::default(), |_| {}).unwrap();

        assert!(outcome.changes.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Texture2D hero:"));
    }

    #[test]
    fn test_repack_skips_kinds_the_engine_cannot_encode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        fs::create_dir_all(folder.join("Texture2D")).unwrap();
        FakeBundle::image(2, 2)
            .save(folder.join("Texture2D/hero.png"))
            .unwrap();
        fs::create_dir_all(folder.join("TextAsset")).unwrap();
        fs::write(folder.join("TextAsset/config.txt"), b"still works").unwrap();

        let mut bundle = sample_bundle().without_replacement(AssetKind::Texture2D);
        let outcome =
            apply_modified_tree(&mut bundle, folder, &RepackOptions::default(), |_| {}).unwrap();

        // The texture edit is reported, not silently promised
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("cannot re-encode Texture2D"));
        assert_eq!(outcome.change_lines(), vec!["TextAsset: config"]);
        assert_eq!(
            bundle.replaced,
            vec![(2, AssetReplacement::Text(b"still works".to_vec()))]
        );

        // Dry-run gives the same honest answer
        let options = RepackOptions {
            dry_run: true,
            ..RepackOptions::default()
        };
        let mut bundle = sample_bundle().without_replacement(AssetKind::Texture2D);
        let outcome = apply_modified_tree(&mut bundle, folder, &options, |_| {}).unwrap();
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_text_extension_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let folder = temp_dir.path();
        fs::create_dir_all(folder.join("TextAsset")).unwrap();
        fs::write(folder.join("TextAsset/config.txt"), b"txt wins").unwrap();
        fs::write(folder.join("TextAsset/config.json"), b"{}").unwrap();

        let mut bundle = sample_bundle();
        apply_modified_tree(&mut bundle, folder, &RepackOptions::default(), |_| {}).unwrap();

        assert_eq!(
            bundle.replaced,
            vec![(2, AssetReplacement::Text(b"txt wins".to_vec()))]
        );
    }

    #[test]
    fn test_default_modified_path() {
        assert_eq!(
            default_modified_path(Path::new("/assets/a.bundle")),
            PathBuf::from("/assets/modified_a.bundle")
        );
        assert_eq!(
            default_modified_path(Path::new("a.bundle")),
            PathBuf::from("modified_a.bundle")
        );
    }
}
