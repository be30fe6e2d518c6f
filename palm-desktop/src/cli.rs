use crate::error::Result as DesktopResult;

use palm_config::Config;

use std::path::PathBuf;

use clap::Parser;

/// Supervises the LM Studio and Ollama proxy endpoints.
#[derive(Debug, Parser)]
#[command(name = "palm-desktop", version, about)]
pub struct Args {
    /// Directory holding config.toml (default: $PALM_CONFIG_DIR or ./.palm)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Leave stdout/stderr alone instead of routing them into the log pane
    #[arg(long)]
    pub no_capture: bool,
}

impl Args {
    /// Load and validate the configuration these arguments point at.
    pub fn load_config(&self) -> DesktopResult<Config> {
        let config = match &self.config_dir {
            Some(dir) => Config::load_from(dir)?,
            None => Config::load()?,
        };
        config.validate()?;
        Ok(config)
    }
}
