//! Command handlers, one module per subcommand.

pub mod extract;
pub mod history;
pub mod repack;
pub mod unpack;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ubt::version::VersionSource;
use ubt::{Bundle, TypeFilter};
use walkdir::WalkDir;

/// Extensions treated as Unity bundles when scanning directories.
const BUNDLE_EXTENSIONS: [&str; 3] = ["bundle", "unity3d", "assets"];

pub fn is_bundle_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| BUNDLE_EXTENSIONS.iter().any(|b| e.eq_ignore_ascii_case(b)))
        .unwrap_or(false)
}

/// All bundle files under `dir`, recursively, in a stable order.
pub fn find_bundles(dir: &Path) -> Result<Vec<PathBuf>> {
    anyhow::ensure!(dir.is_dir(), "Directory not found: {}", dir.display());

    let mut bundles: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_bundle_file(path))
        .collect();
    bundles.sort();
    Ok(bundles)
}

/// Detect the Unity version once per invocation, reporting how.
pub fn detected_unity_version() -> String {
    let (version, source) = ubt::detect_unity_version();
    match source {
        VersionSource::Environment => {
            eprintln!("Unity version from UNITY_VERSION: {}", version);
        }
        VersionSource::File(file) => {
            eprintln!("Detected Unity version {} ({})", version, file);
        }
        VersionSource::Fallback => {
            eprintln!("Warning: assuming Unity version {}", version);
        }
    }
    version
}

pub fn open_bundle(path: &Path, version: &str) -> Result<Box<dyn Bundle>> {
    anyhow::ensure!(path.is_file(), "File not found: {}", path.display());
    ubt::open(path, Some(version))
        .with_context(|| format!("Failed to load bundle {}", path.display()))
}

pub fn parse_type_filter(types: &[String]) -> Result<TypeFilter> {
    TypeFilter::parse(types).context("Invalid --type value")
}

pub fn progress_bar(len: u64, message: String) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb
}

/// Bundle file stem for naming output directories.
pub fn bundle_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string())
}
