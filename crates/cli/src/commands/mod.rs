pub mod ask;
pub mod config_cmd;
pub mod tool;

use siftwire_config::AppConfig;
use siftwire_tools::ToolKit;

/// Build the tool kit from config, using the default provider.
pub fn toolkit(config: &AppConfig) -> Result<ToolKit, Box<dyn std::error::Error>> {
    let router = siftwire_providers::router::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;
    Ok(ToolKit::from_config(config, provider))
}
