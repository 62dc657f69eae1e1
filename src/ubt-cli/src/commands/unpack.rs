//! `unpack` command handler: the classic Textures/TextAssets layout.

use std::path::Path;

use anyhow::{Context, Result};
use ubt::extract::unpack_bundle;

use super::{detected_unity_version, open_bundle, progress_bar};

pub fn unpack(bundle_path: &Path) -> Result<()> {
    let version = detected_unity_version();
    let mut bundle = open_bundle(bundle_path, &version)?;

    let pb = progress_bar(
        bundle.assets().len() as u64,
        format!("Extracting {}", bundle_path.display()),
    );
    let (output_dir, summary) = unpack_bundle(&mut *bundle, bundle_path, |_| pb.inc(1))
        .with_context(|| format!("Failed to unpack {}", bundle_path.display()))?;
    pb.finish_and_clear();

    for line in summary.log.iter().filter(|l| l.starts_with("[ERROR]")) {
        eprintln!("{}", line);
    }
    println!(
        "Unpacked {} assets to {}",
        summary.total(),
        output_dir.display()
    );
    Ok(())
}
