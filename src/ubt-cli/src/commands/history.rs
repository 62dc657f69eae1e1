//! `history` command handler.

use std::path::Path;

use anyhow::{Context, Result};
use ubt::ModificationLog;

pub fn history(log_path: &Path) -> Result<()> {
    let log = ModificationLog::load(log_path)
        .with_context(|| format!("Failed to read {}", log_path.display()))?;

    if log.is_empty() {
        println!("No modification history found");
        return Ok(());
    }
    println!("{}", log.render());
    Ok(())
}
