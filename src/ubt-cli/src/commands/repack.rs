//! `repack` and `repack-all` command handlers.
//!
//! Originals are never modified; a new bundle is written beside them (or
//! wherever `--output` points) and every successful repack is appended to
//! the modification log.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ubt::history::{self, ModificationEntry, ModificationLog, DEFAULT_LOG_NAME};
use ubt::repack::{apply_modified_tree, default_modified_path, RepackOptions};
use ubt::{extract, Compression};

use super::{
    bundle_stem, detected_unity_version, find_bundles, open_bundle, parse_type_filter,
    progress_bar,
};

pub struct RepackArgs<'a> {
    pub types: &'a [String],
    pub fast: bool,
    pub dry_run: bool,
    pub log: Option<&'a Path>,
}

impl RepackArgs<'_> {
    fn options(&self) -> Result<RepackOptions> {
        Ok(RepackOptions {
            filter: parse_type_filter(self.types)?,
            compression: if self.fast {
                Compression::None
            } else {
                Compression::Lz4
            },
            dry_run: self.dry_run,
        })
    }
}

/// Handle `repack`: one bundle plus its extracted folder.
pub fn repack(
    bundle_path: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
    args: &RepackArgs<'_>,
) -> Result<()> {
    let options = args.options()?;
    let version = detected_unity_version();

    let input_folder = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| extract::default_unpack_dir(bundle_path));
    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_modified_path(bundle_path));

    let changed = repack_one(
        bundle_path,
        &input_folder,
        &output_path,
        &options,
        args.log,
        &version,
    )?;
    if changed == 0 {
        println!("No modifications made");
    }
    Ok(())
}

/// Handle `repack-all`: every bundle in `base_dir` with an extracted tree.
pub fn repack_all(
    base_dir: &Path,
    mod_dir: Option<&Path>,
    out_dir: Option<&Path>,
    args: &RepackArgs<'_>,
) -> Result<()> {
    let options = args.options()?;
    let version = detected_unity_version();
    let out_dir = out_dir.unwrap_or_else(|| Path::new("repacked"));

    // Never pick up our own output from a previous run
    let bundles: Vec<PathBuf> = find_bundles(base_dir)?
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| !n.starts_with("modified_"))
                .unwrap_or(true)
        })
        .collect();
    anyhow::ensure!(
        !bundles.is_empty(),
        "No bundle files found in {}",
        base_dir.display()
    );

    if !options.dry_run {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    }
    let log_path = args
        .log
        .map(Path::to_path_buf)
        .unwrap_or_else(|| out_dir.join(DEFAULT_LOG_NAME));

    let mut repacked = 0usize;
    for bundle_path in &bundles {
        let stem = bundle_stem(bundle_path);
        let input_folder = match mod_dir {
            Some(dir) => dir.join(&stem),
            None => extract::default_unpack_dir(bundle_path),
        };
        if !input_folder.is_dir() {
            eprintln!(
                "Warning: no extracted folder found for {}, skipping",
                bundle_path.display()
            );
            continue;
        }

        let file_name = bundle_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(stem);
        let output_path = out_dir.join(file_name);

        println!("Repacking: {}", bundle_path.display());
        match repack_one(
            bundle_path,
            &input_folder,
            &output_path,
            &options,
            Some(&log_path),
            &version,
        ) {
            Ok(changed) if changed > 0 => repacked += 1,
            Ok(_) => println!("No modifications made"),
            Err(err) => eprintln!("Failed on {}: {:#}", bundle_path.display(), err),
        }
    }

    println!("Created {}/{} modified bundles", repacked, bundles.len());
    Ok(())
}

/// Repack one bundle. Returns the number of assets changed; zero means
/// nothing was written.
fn repack_one(
    bundle_path: &Path,
    input_folder: &Path,
    output_path: &Path,
    options: &RepackOptions,
    log: Option<&Path>,
    version: &str,
) -> Result<usize> {
    anyhow::ensure!(
        input_folder.is_dir(),
        "Extracted folder not found: {}",
        input_folder.display()
    );

    let mut bundle = open_bundle(bundle_path, version)?;

    let pb = progress_bar(
        bundle.assets().len() as u64,
        format!("Processing {}", bundle_path.display()),
    );
    let outcome = apply_modified_tree(&mut *bundle, input_folder, options, |_| pb.inc(1))
        .with_context(|| format!("Failed to re-import into {}", bundle_path.display()))?;
    pb.finish_and_clear();

    for error in &outcome.errors {
        eprintln!("Repack failed for {}", error);
    }
    if outcome.changes.is_empty() {
        return Ok(0);
    }

    if options.dry_run {
        println!("Would repack {} assets:", outcome.changes.len());
        for change in &outcome.changes {
            println!("  - {}", change);
        }
        return Ok(outcome.changes.len());
    }

    let packed = bundle
        .pack(options.compression)
        .with_context(|| format!("Failed to repack {}", bundle_path.display()))?;
    fs::write(output_path, &packed)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    let log_path = log
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_log_path(output_path));
    let entry = ModificationEntry::now(bundle_path, output_path, outcome.change_lines())
        .with_hash(history::hash_bytes(&packed));
    let mut log = ModificationLog::load(&log_path)
        .with_context(|| format!("Failed to read {}", log_path.display()))?;
    log.push(entry);
    log.save(&log_path)
        .with_context(|| format!("Failed to write {}", log_path.display()))?;

    println!(
        "Repacked {} assets into '{}'",
        outcome.changes.len(),
        output_path.display()
    );
    Ok(outcome.changes.len())
}

/// `modifications.json` beside the repacked output.
fn default_log_path(output_path: &Path) -> PathBuf {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(DEFAULT_LOG_NAME),
        _ => PathBuf::from(DEFAULT_LOG_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path() {
        assert_eq!(
            default_log_path(Path::new("/out/modified_a.bundle")),
            PathBuf::from("/out/modifications.json")
        );
        assert_eq!(
            default_log_path(Path::new("modified_a.bundle")),
            PathBuf::from("modifications.json")
        );
    }
}
