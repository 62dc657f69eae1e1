mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::extract::{ExtractArgs, extract, extract_all};
use commands::repack::{RepackArgs, repack, repack_all};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Unpack { bundle } => {
            commands::unpack::unpack(&bundle)?;
        }

        Commands::Extract {
            bundle,
            output,
            types,
            flat,
            dry_run,
            log,
        } => {
            let args = ExtractArgs {
                types: &types,
                flat,
                dry_run,
            };
            extract(&bundle, output.as_deref(), &args, log.as_deref())?;
        }

        Commands::ExtractAll {
            input,
            output,
            types,
            flat,
            dry_run,
            log,
        } => {
            let args = ExtractArgs {
                types: &types,
                flat,
                dry_run,
            };
            extract_all(&input, output.as_deref(), &args, log.as_deref())?;
        }

        Commands::Repack {
            bundle,
            input,
            output,
            fast,
            types,
            dry_run,
            log,
        } => {
            let args = RepackArgs {
                types: &types,
                fast,
                dry_run,
                log: log.as_deref(),
            };
            repack(&bundle, input.as_deref(), output.as_deref(), &args)?;
        }

        Commands::RepackAll {
            base_dir,
            mod_dir,
            out_dir,
            fast,
            types,
            dry_run,
            log,
        } => {
            let args = RepackArgs {
                types: &types,
                fast,
                dry_run,
                log: log.as_deref(),
            };
            repack_all(&base_dir, mod_dir.as_deref(), out_dir.as_deref(), &args)?;
        }

        Commands::Verify { bundle } => {
            commands::verify::verify(&bundle)?;
        }

        Commands::History { log } => {
            commands::history::history(&log)?;
        }
    }

    Ok(())
}
