//! `siftwire tool` and `siftwire tools`: direct tool access.

use siftwire_config::AppConfig;

pub async fn run(name: &str, input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = super::toolkit(&config)?.build_registry();

    let result = registry.execute(name, input).await?;
    if !result.success {
        tracing::warn!(tool = name, "Tool reported a failure");
    }
    println!("{}", result.output);
    Ok(())
}

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = super::toolkit(&config)?.build_registry();

    println!("Available tools");
    println!("===============");
    for tool in registry.descriptors() {
        println!();
        println!("  {}", tool.name);
        println!("    input: {}", tool.input_format);
        println!("    {}", tool.description);
    }
    Ok(())
}
