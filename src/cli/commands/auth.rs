use anyhow::{Context, Result};
use console::{Emoji, style};
use std::fs;
use std::io::{self, Write};

use crate::cli::Service;
use crate::cli::output::banner;
use crate::config::Config;

static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
static PLUG: Emoji<'_, '_> = Emoji("🔌 ", "");

pub async fn run(
    service: Option<Service>,
    key: Option<String>,
    url: Option<String>,
    list: bool,
) -> Result<()> {
    banner("Authentication");

    if list {
        return list_services();
    }

    let service = match service {
        Some(s) => s,
        None => select_service()?,
    };

    let secret = match key {
        Some(k) => k.trim().to_string(),
        None => prompt_secret(service)?,
    };
    if secret.is_empty() {
        anyhow::bail!("Key cannot be empty");
    }

    save_secret(service, &secret, url.as_deref())?;

    println!();
    println!(
        "{}Credentials for {} configured successfully!",
        CHECK,
        style(service.to_string()).cyan().bold()
    );

    Ok(())
}

fn list_services() -> Result<()> {
    println!("{}Configured Services", PLUG);
    println!();

    let config = match Config::load() {
        Ok(c) => c,
        Err(_) => {
            println!(
                "{}",
                style("No configuration found. Run 'dumbifier init' first.").yellow()
            );
            return Ok(());
        }
    };

    let services = [
        (
            "OpenAI",
            key_status(&config.openai.api_key, "OPENAI_API_KEY"),
        ),
        (
            "Dictionary",
            key_status(&config.dictionary.api_key, "API_NINJAS_KEY"),
        ),
        ("Remote", remote_status(&config)),
    ];

    for (name, (configured, detail)) in services {
        let status_icon = if configured { CHECK } else { CROSS };
        let status_text = if configured {
            style("Configured").green()
        } else {
            style("Not configured").red()
        };

        println!(
            "  {}{:<12} {} {}",
            status_icon,
            name,
            status_text,
            style(detail).dim()
        );
    }

    println!();
    println!("{}Set credentials with:", KEY);
    println!("  {} dumbifier auth --service <name>", style("$").dim());
    println!();
    println!("Or set environment variables:");
    println!("  {} export OPENAI_API_KEY=your-key", style("$").dim());
    println!("  {} export API_NINJAS_KEY=your-key", style("$").dim());
    println!("  {} export DUMBIFIER_TOKEN=your-token", style("$").dim());

    Ok(())
}

fn key_status(resolved: &str, env_var: &str) -> (bool, String) {
    if let Ok(val) = std::env::var(env_var)
        && !val.is_empty()
    {
        return (true, format!("(from {})", env_var));
    }

    if !resolved.is_empty() {
        return (true, "(from config)".to_string());
    }

    (false, String::new())
}

fn remote_status(config: &Config) -> (bool, String) {
    match config.remote.base_url.as_deref() {
        Some(url) if config.remote.is_authenticated() => (true, format!("({})", url)),
        Some(url) => (false, format!("(no token for {})", url)),
        None => (false, "(no server set)".to_string()),
    }
}

fn select_service() -> Result<Service> {
    println!("Select service:");
    println!();
    println!("  {} OpenAI (document simplification)", style("1.").cyan());
    println!("  {} Dictionary (word lookups)", style("2.").cyan());
    println!("  {} Remote account (saved documents and words)", style("3.").cyan());
    println!();

    print!("{} Enter choice [1-3]: ", style("?").green().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    match input.trim() {
        "2" => Ok(Service::Dictionary),
        "3" => Ok(Service::Remote),
        "1" => Ok(Service::OpenAI),
        _ => {
            println!("  {}", style("Invalid choice, defaulting to OpenAI").yellow());
            Ok(Service::OpenAI)
        }
    }
}

fn prompt_secret(service: Service) -> Result<String> {
    let prompt = match service {
        Service::OpenAI => "Enter your OpenAI API key",
        Service::Dictionary => "Enter your API Ninjas key",
        Service::Remote => "Enter your account token",
    };

    print!("{} {}: ", style("?").green().bold(), prompt);
    io::stdout().flush()?;

    let mut secret = String::new();
    io::stdin().read_line(&mut secret)?;
    let secret = secret.trim().to_string();

    if service == Service::OpenAI && !secret.is_empty() && !secret.starts_with("sk-") {
        println!(
            "  {}",
            style("Warning: OpenAI API keys typically start with 'sk-'").yellow()
        );
    }

    Ok(secret)
}

fn save_secret(service: Service, secret: &str, url: Option<&str>) -> Result<()> {
    let config_path = Config::config_path()?;

    if !config_path.exists() {
        anyhow::bail!("Configuration not found. Run 'dumbifier init' first.");
    }

    let mut content = fs::read_to_string(&config_path).context("Failed to read config file")?;

    content = match service {
        Service::OpenAI => set_value(&content, "openai", "api_key", secret),
        Service::Dictionary => set_value(&content, "dictionary", "api_key", secret),
        Service::Remote => {
            let content = set_value(&content, "remote", "token", secret);
            match url {
                Some(url) => set_value(&content, "remote", "base_url", url.trim()),
                None => content,
            }
        }
    };

    fs::write(&config_path, content).context("Failed to write config file")?;

    Ok(())
}

/// Set `key` inside `[section]`, adding the line or the section when missing.
/// Edits in place so comments and ordering in the file survive.
fn set_value(content: &str, section: &str, key: &str, value: &str) -> String {
    let header = format!("[{}]", section);
    let new_line = format!("{} = {}", key, toml::Value::String(value.to_string()));

    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let mut in_section = false;
    let mut section_at = None;
    let mut updated = false;

    for (i, line) in lines.iter_mut().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_section = trimmed == header;
            if in_section {
                section_at = Some(i);
            }
            continue;
        }

        if in_section
            && let Some((name, _)) = trimmed.split_once('=')
            && name.trim() == key
        {
            *line = new_line.clone();
            updated = true;
        }
    }

    if !updated {
        match section_at {
            Some(i) => lines.insert(i + 1, new_line),
            None => {
                lines.push(String::new());
                lines.push(header);
                lines.push(new_line);
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "[openai]\napi_key = \"${OPENAI_API_KEY}\"\nmodel = \"gpt-4o-mini\"\n\n[remote]\ntoken = \"${DUMBIFIER_TOKEN}\"\n";

    #[test]
    fn test_set_value_replaces_existing_key() {
        let out = set_value(CONFIG, "openai", "api_key", "sk-new");
        assert!(out.contains("api_key = \"sk-new\""));
        assert!(out.contains("model = \"gpt-4o-mini\""));
        assert!(!out.contains("OPENAI_API_KEY"));

        let parsed: Config = toml::from_str(&out).unwrap();
        assert_eq!(parsed.openai.api_key, "sk-new");
    }

    #[test]
    fn test_set_value_adds_key_to_existing_section() {
        let out = set_value(CONFIG, "remote", "base_url", "http://localhost:5000/api");
        let parsed: Config = toml::from_str(&out).unwrap();
        assert_eq!(
            parsed.remote.base_url.as_deref(),
            Some("http://localhost:5000/api")
        );
    }

    #[test]
    fn test_set_value_adds_missing_section() {
        let out = set_value(CONFIG, "dictionary", "api_key", "ninja");
        let parsed: Config = toml::from_str(&out).unwrap();
        assert_eq!(parsed.dictionary.api_key, "ninja");
        assert_eq!(parsed.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_set_value_does_not_touch_other_sections() {
        let out = set_value(CONFIG, "remote", "token", "t0k");
        assert!(out.contains("api_key = \"${OPENAI_API_KEY}\""));
        assert!(out.contains("token = \"t0k\""));
    }

    #[test]
    fn test_set_value_escapes_quotes() {
        let out = set_value(CONFIG, "openai", "api_key", "a\"b");
        let parsed: Config = toml::from_str(&out).unwrap();
        assert_eq!(parsed.openai.api_key, "a\"b");
    }
}
