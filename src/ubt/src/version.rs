//! Unity version detection.
//!
//! Bundles built without a type tree need the engine told which Unity
//! version produced them. The lookup order mirrors common modding setups:
//! an explicit `UNITY_VERSION` environment override, then well-known
//! project files, then a fixed fallback.

use std::fs;
use std::path::Path;

use regex::Regex;

/// Assumed when nothing else matches.
pub const DEFAULT_UNITY_VERSION: &str = "2021.3.36f1";

/// Environment variable that overrides detection.
pub const UNITY_VERSION_ENV: &str = "UNITY_VERSION";

const VERSION_FILES: [&str; 3] = [
    "ProjectSettings/ProjectVersion.txt",
    "unity_version.txt",
    "version.txt",
];

/// Where a detected version came from, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    Environment,
    File(String),
    Fallback,
}

/// Detect the Unity version, checking `UNITY_VERSION` and version files
/// under the current directory.
pub fn detect_unity_version() -> (String, VersionSource) {
    detect_unity_version_in(Path::new("."), std::env::var(UNITY_VERSION_ENV).ok())
}

/// Detection with an explicit base directory and environment override,
/// split out so it stays deterministic under test.
pub fn detect_unity_version_in(
    base: &Path,
    env_override: Option<String>,
) -> (String, VersionSource) {
    if let Some(version) = env_override.filter(|v| !v.trim().is_empty()) {
        return (version, VersionSource::Environment);
    }

    for file in VERSION_FILES {
        let path = base.join(file);
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };
        if let Some(version) = extract_version(&contents) {
            return (version, VersionSource::File(file.to_string()));
        }
    }

    (DEFAULT_UNITY_VERSION.to_string(), VersionSource::Fallback)
}

/// Pull a Unity version out of free-form file contents.
///
/// Prefers year-style versions (`2021.3.36f1`) over bare dotted triples.
pub fn extract_version(contents: &str) -> Option<String> {
    // Unwraps are on literal patterns
    let year_style = Regex::new(r"20\d{2}\.\d+(?:\.\d+(?:[abfp]\d+)?)?").unwrap();
    let dotted = Regex::new(r"\d+\.\d+\.\d+").unwrap();

    year_style
        .find(contents)
        .or_else(|| dotted.find(contents))
        .map(|m| m.as_str().to_string())
}
