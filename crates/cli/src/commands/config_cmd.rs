//! `siftwire config`: configuration management commands.

use siftwire_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    };
    println!("   Config parsed successfully");

    let warnings = warnings(&config);
    if warnings.is_empty() {
        println!("   All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   warning: {w}");
        }
    }

    println!();
    println!("   Provider:      {}", config.default_provider);
    println!("   Model:         {}", config.default_model);
    println!("   Directory:     {}", config.directory.api_url);
    println!(
        "   Database:      {}",
        config.directory.database_id.as_deref().unwrap_or("(not set)")
    );
    println!(
        "   Timeouts:      homepage {}s, article {}s",
        config.scraper.homepage_timeout_secs, config.scraper.article_timeout_secs
    );
    println!("   Max articles:  {}", config.scraper.max_articles);

    Ok(())
}

/// Settings that load fine but will make some commands fail.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if config.api_key.is_none() {
        warnings.push("No API key set (set GEMINI_API_KEY or SIFTWIRE_API_KEY)");
    }
    if config.directory.token.is_none() {
        warnings.push("No directory token set (set NOTION_TOKEN)");
    }
    if config.directory.database_id.is_none() {
        warnings.push("No directory database set (set SIFTWIRE_DATABASE_ID or pass --database-id)");
    }
    warnings
}

pub async fn show_default() -> Result<(), Box<dyn std::error::Error>> {
    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!("{}", AppConfig::default_toml());
    Ok(())
}
