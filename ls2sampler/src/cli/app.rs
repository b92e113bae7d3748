use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::SettingsOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "ls2sampler",
    version,
    about = "Convert `ldms_ls -lv` output into test_sampler configuration",
    long_about = "Parses the output of `ldms_ls -l` (optionally with -v metadata) and prints the \
                  load/config/start directives that make a test_sampler plugin publish the same \
                  schemas and sets."
)]
pub struct Cli {
    /// Path to the ldms_ls result
    #[arg(short, long)]
    pub path: PathBuf,

    /// Producer name format [default: ${HOSTNAME}_${PORT}]
    #[arg(short = 'P', long)]
    pub producer: Option<String>,

    /// Sample interval in microseconds [default: 1000000]
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Sample offset in microseconds [default: 0]
    #[arg(short, long)]
    pub offset: Option<String>,

    /// Sampler plugin instance name [default: test_sampler]
    #[arg(long)]
    pub plugin: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// What to print
    #[arg(long, value_enum, default_value_t = OutputFormat::Directives)]
    pub format: OutputFormat,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence all log output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// test_sampler configuration directives
    Directives,
    /// The parsed listing as pretty-printed JSON
    Json,
}

impl Cli {
    /// Log filter implied by -v/-q, used when RUST_LOG is not set
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "off";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Sampler values given on the command line
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            plugin: self.plugin.clone(),
            producer: self.producer.clone(),
            interval: self.interval.clone(),
            offset: self.offset.clone(),
        }
    }
}
