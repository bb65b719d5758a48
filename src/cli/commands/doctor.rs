use anyhow::Result;
use console::{Emoji, style};
use std::time::Duration;

use crate::config::{Config, DEFAULT_OPENAI_BASE_URL};
use crate::history::HistoryStore;
use crate::remote::RemoteClient;

static DOCTOR: Emoji<'_, '_> = Emoji("🩺 ", "");
static PASS: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static FAIL: Emoji<'_, '_> = Emoji("❌ ", "[!!] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i] ");
static ARROW: Emoji<'_, '_> = Emoji("   → ", "  -> ");

#[derive(Default)]
struct Tally {
    pass: u32,
    fail: u32,
    warn: u32,
}

pub async fn run() -> Result<()> {
    println!();
    println!("{}", style(" Dumbifier Doctor ").bold().reverse());
    println!();
    println!("{}Running diagnostics...", DOCTOR);
    println!();

    let mut tally = Tally::default();

    // ── 1. Binary version ────────────────────────────────────────────
    print_section("Binary");
    pass(&format!("dumbifier {}", env!("CARGO_PKG_VERSION")), &mut tally);

    // ── 2. Config file ───────────────────────────────────────────────
    print_section("Configuration");

    let config_path = Config::config_path().ok();

    let config = match config_path {
        Some(ref path) if path.exists() => {
            pass(
                &format!("Config found at {}", style(path.display()).dim()),
                &mut tally,
            );
            match Config::load() {
                Ok(c) => {
                    pass(
                        &format!("Config is valid TOML (model: {})", c.openai.model),
                        &mut tally,
                    );
                    Some(c)
                }
                Err(e) => {
                    fail(&format!("Config parse error: {:#}", e), &mut tally);
                    hint("Run: dumbifier init --force");
                    None
                }
            }
        }
        Some(_) => {
            fail("Config file not found", &mut tally);
            hint("Run: dumbifier init");
            None
        }
        None => {
            fail("Cannot determine config directory", &mut tally);
            None
        }
    };

    // ── 3. OpenAI ────────────────────────────────────────────────────
    print_section("OpenAI");

    if let Some(ref config) = config {
        let base_url = config
            .openai
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL)
            .trim_end_matches('/');

        if config.openai.api_key.is_empty() {
            fail("OpenAI API key not configured", &mut tally);
            hint("Run: dumbifier auth --service openai (or set OPENAI_API_KEY)");
        } else {
            pass("OpenAI API key configured", &mut tally);

            match check_http_get(&format!("{}/models", base_url), &config.openai.api_key).await {
                Some(200) => pass(&format!("API reachable at {}", base_url), &mut tally),
                Some(401) => {
                    fail("API rejected the key (HTTP 401)", &mut tally);
                    hint("Check the key: dumbifier auth --service openai");
                }
                Some(status) => warn(
                    &format!("API responded with status {} at {}", status, base_url),
                    &mut tally,
                ),
                None => warn(&format!("API not reachable at {}", base_url), &mut tally),
            }
        }
        info(&format!(
            "Model {} (max {} tokens, {} chars sent)",
            config.openai.model, config.openai.max_tokens, config.analysis.max_chars
        ));
    } else {
        warn("Skipping OpenAI checks (no config)", &mut tally);
    }

    // ── 4. History ───────────────────────────────────────────────────
    print_section("History");

    let history_config = config.clone().unwrap_or_default();
    match HistoryStore::open(&history_config) {
        Ok(store) => {
            if store.path().exists() {
                let count = store.all().len();
                pass(
                    &format!(
                        "History file readable ({} of {} entries)",
                        count,
                        store.capacity()
                    ),
                    &mut tally,
                );
            } else {
                info("No history saved yet");
            }
            info(&format!("History path: {}", store.path().display()));
        }
        Err(e) => fail(&format!("Cannot locate history file: {}", e), &mut tally),
    }

    // ── 5. Optional services ─────────────────────────────────────────
    print_section("Optional Services");

    if let Some(ref config) = config {
        if config.dictionary.api_key.is_empty() {
            info("Dictionary not configured (set API_NINJAS_KEY or run dumbifier auth)");
        } else {
            pass("Dictionary API key configured", &mut tally);
        }

        match RemoteClient::new(&config.remote) {
            Ok(client) => match client.list_words().await {
                Ok(words) => pass(
                    &format!(
                        "Remote account reachable at {} ({} saved words)",
                        client.base_url(),
                        words.len()
                    ),
                    &mut tally,
                ),
                Err(e) => {
                    warn(&format!("Remote account check failed: {}", e), &mut tally);
                    hint("Check remote.base_url and the token in the config");
                }
            },
            Err(_) => info("Remote account not configured (analyses are kept locally)"),
        }
    }

    // ── 6. System info ───────────────────────────────────────────────
    print_section("System");

    info(&format!(
        "OS: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    ));

    if let Some(ref path) = config_path {
        info(&format!("Config path: {}", path.display()));
    }

    // ── Summary ──────────────────────────────────────────────────────
    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();

    let total = tally.pass + tally.fail + tally.warn;
    print!(
        "  {} {} passed",
        style(tally.pass).green().bold(),
        if tally.pass == 1 { "check" } else { "checks" }
    );
    if tally.warn > 0 {
        print!(
            ", {} {}",
            style(tally.warn).yellow().bold(),
            if tally.warn == 1 { "warning" } else { "warnings" }
        );
    }
    if tally.fail > 0 {
        print!(
            ", {} {}",
            style(tally.fail).red().bold(),
            if tally.fail == 1 { "failure" } else { "failures" }
        );
    }
    println!(" ({}  total)", total);
    println!();

    if tally.fail > 0 {
        println!(
            "  {}",
            style("Some checks failed. Fix the issues above and re-run:").red()
        );
        println!("    {} dumbifier doctor", style("$").dim());
    } else if tally.warn > 0 {
        println!(
            "  {}",
            style("Everything essential works, but there are some warnings.").yellow()
        );
    } else {
        println!(
            "  {}",
            style("All checks passed! You're ready to go.").green().bold()
        );
    }
    println!();

    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

fn print_section(name: &str) {
    println!("  {}", style(name).bold().underlined());
}

fn pass(msg: &str, tally: &mut Tally) {
    println!("  {}{}", PASS, msg);
    tally.pass += 1;
}

fn fail(msg: &str, tally: &mut Tally) {
    println!("  {}{}", FAIL, style(msg).red());
    tally.fail += 1;
}

fn warn(msg: &str, tally: &mut Tally) {
    println!("  {}{}", WARN, style(msg).yellow());
    tally.warn += 1;
}

fn info(msg: &str) {
    println!("  {}{}", INFO, style(msg).dim());
}

fn hint(msg: &str) {
    println!("{}{}", ARROW, style(msg).dim());
}

async fn check_http_get(url: &str, api_key: &str) -> Option<u16> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .ok()?;

    client
        .get(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .send()
        .await
        .map(|r| r.status().as_u16())
        .ok()
}
