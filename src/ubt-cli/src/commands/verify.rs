//! `verify` command handler.

use std::path::Path;

use anyhow::{Context, Result};
use ubt::verify_bundle;

use super::{detected_unity_version, open_bundle, progress_bar};

pub fn verify(bundle_path: &Path) -> Result<()> {
    let version = detected_unity_version();
    let mut bundle = open_bundle(bundle_path, &version)?;

    let total = bundle.assets().len();
    let pb = progress_bar(total as u64, "Verifying".to_string());
    let issues = verify_bundle(&mut *bundle, |_| pb.inc(1))
        .with_context(|| format!("Failed to verify {}", bundle_path.display()))?;
    pb.finish_and_clear();

    if issues.is_empty() {
        println!("No issues found ({} assets checked)", total);
    } else {
        println!("Issues found:");
        for issue in &issues {
            println!("  - {}", issue);
        }
    }
    Ok(())
}
