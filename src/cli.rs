//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "amberbars")]
#[command(about = "Terminal music player with a floating spectrum overlay", long_about = None)]
pub struct Args {
    /// Directory to start browsing in
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Initial number of spectrum bands
    #[arg(long, value_name = "N", default_value = "32")]
    pub bands: usize,

    /// Initial overlay height in rows
    #[arg(long, value_name = "ROWS", default_value = "8")]
    pub height: u16,

    /// Run without the spectrum analyzer, as if its plugin were missing
    #[arg(long)]
    pub no_spectrum: bool,

    /// Where to write the log (defaults to amberbars.log in the temp dir)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Defaults with the command-line overrides applied.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.spectrum.bands = self.bands.max(1);
        config.overlay.height = self.height.max(2);
        config.without_spectrum = self.no_spectrum;
        config
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("amberbars.log"))
    }
}
