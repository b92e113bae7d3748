//! Convert a listing file into sampler directives or JSON

use anyhow::Result;
use ls2sampler_core::{Emitter, Listing, SamplerSettings, SchemaRegistry, read_listing};
use std::io::{self, Write};
use tracing::{debug, info};

use crate::cli::app::{Cli, OutputFormat};
use crate::config::FileConfig;

/// Execute the conversion
pub fn execute(cli: &Cli) -> Result<()> {
    let file_config = match &cli.config {
        Some(path) => {
            info!("Loading config file: {:?}", path);
            FileConfig::from_file(path)?
        }
        None => FileConfig::default(),
    };
    let settings = file_config.resolve(cli.overrides());
    debug!(?settings, "sampler settings");

    let listing = read_listing(&cli.path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match render(&listing, &settings, cli.format, &mut out) {
        Err(err) if is_broken_pipe(&err) => {
            debug!("stdout closed early, stopping output");
            Ok(())
        }
        other => other,
    }
}

fn render<W: Write>(
    listing: &Listing,
    settings: &SamplerSettings,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Directives => {
            Emitter::new(settings).write_to(listing, &mut SchemaRegistry::new(), out)?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(listing)?;
            writeln!(out, "{json}")?;
            out.flush()?;
        }
    }
    Ok(())
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<io::Error>().is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}
