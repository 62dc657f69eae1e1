//! `extract` and `extract-all` command handlers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ubt::{ExtractOptions, ExtractSummary};

use super::{
    bundle_stem, detected_unity_version, find_bundles, open_bundle, parse_type_filter,
    progress_bar,
};

pub struct ExtractArgs<'a> {
    pub types: &'a [String],
    pub flat: bool,
    pub dry_run: bool,
}

impl ExtractArgs<'_> {
    fn options(&self) -> Result<ExtractOptions> {
        Ok(ExtractOptions {
            flat: self.flat,
            dry_run: self.dry_run,
            filter: parse_type_filter(self.types)?,
        })
    }
}

/// Handle `extract`: one bundle, filtered, with sidecars.
pub fn extract(
    bundle_path: &Path,
    output: Option<&Path>,
    args: &ExtractArgs<'_>,
    log: Option<&Path>,
) -> Result<()> {
    let options = args.options()?;
    let version = detected_unity_version();
    let mut bundle = open_bundle(bundle_path, &version)?;

    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}_extracted", bundle_stem(bundle_path))));

    let summary = extract_one(&mut *bundle, bundle_path, &output_dir, &options)?;
    print_summary(&summary);

    if let Some(log_path) = log {
        if !options.dry_run {
            fs::write(log_path, summary.log.join("\n"))
                .with_context(|| format!("Failed to write log {}", log_path.display()))?;
            println!("Log written to {}", log_path.display());
        }
    }

    Ok(())
}

/// Handle `extract-all`: every bundle under a directory, sequentially.
/// `log` collects the per-asset lines of every bundle into one file.
pub fn extract_all(
    input_dir: &Path,
    out_base: Option<&Path>,
    args: &ExtractArgs<'_>,
    log: Option<&Path>,
) -> Result<()> {
    let options = args.options()?;
    let version = detected_unity_version();
    let bundles = find_bundles(input_dir)?;
    anyhow::ensure!(
        !bundles.is_empty(),
        "No bundle files found in {}",
        input_dir.display()
    );

    let out_base = out_base.unwrap_or_else(|| Path::new("output"));
    let mut failed = 0usize;
    let mut log_lines = Vec::new();

    for bundle_path in &bundles {
        let output_dir = out_base.join(bundle_stem(bundle_path));
        let result = open_bundle(bundle_path, &version).and_then(|mut bundle| {
            extract_one(&mut *bundle, bundle_path, &output_dir, &options)
        });
        match result {
            Ok(summary) => {
                println!(
                    "{}: {} assets ({} errors)",
                    bundle_path.display(),
                    summary.total(),
                    summary.errors
                );
                log_lines.extend(summary.log);
            }
            Err(err) => {
                failed += 1;
                eprintln!("Failed on {}: {:#}", bundle_path.display(), err);
            }
        }
    }

    println!(
        "Processed {}/{} bundles",
        bundles.len() - failed,
        bundles.len()
    );

    if let Some(log_path) = log {
        if !options.dry_run {
            fs::write(log_path, log_lines.join("\n"))
                .with_context(|| format!("Failed to write log {}", log_path.display()))?;
            println!("Log written to {}", log_path.display());
        }
    }

    Ok(())
}

fn extract_one(
    bundle: &mut dyn ubt::Bundle,
    bundle_path: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<ExtractSummary> {
    let pb = progress_bar(
        bundle.assets().len() as u64,
        format!("Extracting {}", bundle_path.display()),
    );
    let summary = ubt::extract::extract_bundle(bundle, bundle_path, output_dir, options, |_| {
        pb.inc(1);
    })
    .with_context(|| format!("Failed to extract {}", bundle_path.display()))?;
    pb.finish_and_clear();

    for line in summary.log.iter().filter(|l| l.starts_with("[ERROR]")) {
        eprintln!("{}", line);
    }
    Ok(summary)
}

fn print_summary(summary: &ExtractSummary) {
    if summary.counts.is_empty() {
        println!("No matching assets extracted.");
        return;
    }
    println!("Extracted:");
    for (kind, count) in &summary.counts {
        println!("  {}: {}", kind, count);
    }
}
