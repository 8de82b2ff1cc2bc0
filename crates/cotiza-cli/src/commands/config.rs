use cotiza_core::config::PipelineConfig;
use cotiza_core::error::CotizaError;

pub fn print_default() -> Result<(), CotizaError> {
    let text = PipelineConfig::default().to_toml_string()?;
    print!("{text}");
    Ok(())
}
