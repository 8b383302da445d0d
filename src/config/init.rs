use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, Config};
use crate::scoring::{validate_rubric, AwardTier, RubricConfig};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    Ok(parse_yes_no(&input, default_yes))
}

fn parse_yes_no(input: &str, default_yes: bool) -> bool {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        default_yes
    } else {
        input == "y" || input == "yes"
    }
}

fn parse_slots(input: &str) -> Result<usize, String> {
    input
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a whole number", input.trim()))
}

/// Result of a completed wizard run.
#[derive(Debug)]
pub struct InitOutcome {
    pub config_path: PathBuf,
    pub config: Config,
    /// Rubric with the committee name and award slots chosen in the wizard
    pub rubric: RubricConfig,
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
/// Returns `None` if the user declined to overwrite an existing file.
pub fn run_init_wizard(
    default_path: Option<PathBuf>,
    current: &RubricConfig,
) -> Result<Option<InitOutcome>> {
    println!();
    println!("MUN Marker Setup");
    println!("================");
    println!();

    // 1. Committee
    let committee = prompt_with_default("Committee name", &current.committee)?;

    // 2. Award tiers
    println!();
    println!("Awards are handed out from the top of the ranking, tier by tier.");
    let mut award_tiers: Vec<AwardTier> = Vec::new();
    for tier in &current.award_tiers {
        let name = tier.title.as_deref().unwrap_or(&tier.label);
        let slots = loop {
            let input = prompt_with_default(
                &format!("  {} ({}) slots", name, tier.label),
                &tier.slots.to_string(),
            )?;
            match parse_slots(&input) {
                Ok(n) => break n,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };
        award_tiers.push(AwardTier {
            slots,
            ..tier.clone()
        });
    }

    let rubric = RubricConfig {
        committee,
        award_tiers,
        ..current.clone()
    };
    if let Err(errors) = validate_rubric(&rubric) {
        anyhow::bail!("Rubric errors:\n  - {}", errors.join("\n  - "));
    }

    // 3. Where things live
    println!();
    let ledger_default = crate::ledger::get_ledger_path();
    let ledger_path = prompt_with_default(
        "Ledger file",
        &ledger_default.display().to_string(),
    )?;
    let export_dir = prompt_with_default("Export directory", ".")?;

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(None);
        }
    }

    // 5. Write config
    let config = Config {
        ledger_path: (PathBuf::from(&ledger_path) != ledger_default).then_some(ledger_path),
        export_dir: (export_dir != ".").then_some(export_dir),
        log_level: None,
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `mun-marker add` to start marking.");

    Ok(Some(InitOutcome {
        config_path,
        config,
        rubric,
    }))
}
