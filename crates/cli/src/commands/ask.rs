//! `siftwire ask`: answer a question end to end.

use siftwire_agent::ResearchPipeline;
use siftwire_config::AppConfig;
use std::sync::Arc;

pub async fn run(
    question: &str,
    database_id: Option<String>,
    show_thoughts: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Fail early with a clear error when no API key is set
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GEMINI_API_KEY     (Gemini, the default provider)");
        eprintln!("    OPENAI_API_KEY     (with default_provider = \"openai\")");
        eprintln!("    SIFTWIRE_API_KEY   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let kit = super::toolkit(&config)?;
    let tools = Arc::new(kit.build_registry());
    let mut pipeline = ResearchPipeline::from_config(tools, kit.directory.clone(), &config);
    if let Some(id) = database_id {
        pipeline = pipeline.with_database_id(id);
    }

    let outcome = pipeline.run(question).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if show_thoughts {
        for (i, thought) in outcome.thoughts.iter().enumerate() {
            let mark = if thought.success { "ok" } else { "failed" };
            println!("[{}] {} ({mark})", i + 1, thought.tool);
            println!("    input: {}", thought.input);
            for line in thought.observation.lines() {
                println!("    | {line}");
            }
        }
        println!();
    }
    println!("{}", outcome.answer);
    Ok(())
}
