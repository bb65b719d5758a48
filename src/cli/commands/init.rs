use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;

use crate::cli::output::banner;
use crate::config::Config;

static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");

pub async fn run(force: bool) -> Result<()> {
    banner("Initialization");

    let config_dir = Config::config_dir()?;
    let config_path = Config::config_path()?;

    if config_path.exists() && !force {
        println!(
            "{}Configuration already exists at {}",
            WARN,
            style(config_path.display()).cyan()
        );
        println!("  Use {} to overwrite", style("--force").yellow());
        return Ok(());
    }

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    let config_content = toml::to_string_pretty(&Config::template())?;
    fs::write(&config_path, config_content).context("Failed to write config file")?;

    println!(
        "{}Created configuration at {}",
        CHECK,
        style(config_path.display()).cyan()
    );

    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}Next steps:", ROCKET);
    println!();
    println!("  {}Add your OpenAI API key:", KEY);
    println!("    {} dumbifier auth --service openai", style("$").dim());
    println!();
    println!("  {}Simplify your first document:", PAPER);
    println!("    {} dumbifier analyze ./terms-of-service.txt", style("$").dim());
    println!();

    Ok(())
}
