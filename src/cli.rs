use clap::Parser;
use std::path::PathBuf;

/// Tap D, F, Space, J and K along to a song and save the taps as a chart.
#[derive(Debug, Parser)]
#[command(name = "chartmaker", version, about)]
pub struct Cli {
    /// Audio file to play
    pub audio: PathBuf,

    /// Where to write the chart JSON (overwritten if it exists)
    pub output: PathBuf,

    /// Config file to use instead of ~/.config/chartmaker/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
