pub mod config;
pub mod parse;
pub mod process;

use cotiza_core::config::PipelineConfig;
use cotiza_core::error::CotizaError;
use std::path::PathBuf;

/// Load the config file if one was given, else the defaults.
fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig, CotizaError> {
    match path {
        Some(p) => PipelineConfig::load(&p),
        None => Ok(PipelineConfig::default()),
    }
}
