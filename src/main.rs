use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mun_marker::config::{self, Config};
use mun_marker::export;
use mun_marker::ledger::{self, JsonFileStore, Ledger, Session};
use mun_marker::output;
use mun_marker::scoring::{self, RawInput};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Ledger(LedgerCommand),
    /// Interactive setup wizard
    Init,
}

/// Commands that open the ledger.
#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Show participants ranked by final total (default if no subcommand)
    List {
        /// Only portfolios or serial numbers containing this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Show one participant with a line-by-line breakdown
    Show {
        /// Serial number, id, or id prefix
        who: String,
    },
    /// Add a participant
    Add {
        #[arg(short, long)]
        portfolio: Option<String>,
    },
    /// Remove a participant
    Remove { who: String },
    /// Enter a score for a speech field or capped extra
    Score {
        who: String,
        key: String,
        /// Raw value; blank or non-numeric counts as zero
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Enter a count for a participation item or per-item extra
    Count {
        who: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Edit a participant's details
    Set {
        who: String,
        field: MetaField,
        /// New value (empty string clears)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Assign or clear awards
    Awards {
        #[command(subcommand)]
        action: AwardsAction,
    },
    /// Show participants grouped by award
    Recognition,
    /// Show notes for every participant
    Notes {
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Inspect or replace the rubric
    Rubric {
        #[command(subcommand)]
        action: RubricAction,
    },
    /// Write the Marking, Recognition and Verbatim sheets as CSV
    Export {
        /// Output directory (defaults to export_dir from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Write a JSON backup of the rubric and all participants
    Backup {
        /// Output file (defaults to <committee>_backup.json)
        file: Option<PathBuf>,
    },
    /// Restore from a JSON backup
    Restore { file: PathBuf },
    /// Replace the rubric with the default and remove every participant
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AwardsAction {
    /// Clear all awards, then fill tiers from the top of the ranking
    Auto,
    /// Clear all awards
    Clear,
}

#[derive(Subcommand, Debug)]
enum RubricAction {
    /// Print the current rubric as YAML
    Show,
    /// Replace the rubric from a YAML file
    Load { file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MetaField {
    Portfolio,
    Notes,
    Sno,
    Award,
}

#[derive(Parser, Debug)]
#[command(name = "mun-marker")]
#[command(about = "Committee marking ledger: score, rank and award delegates", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/mun-marker/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Ledger file, overriding the config
    #[arg(short, long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ledger(LedgerCommand::List {
        filter: None,
        tsv: false,
    }));

    let config_path = cli.config.map(PathBuf::from);
    let app_config = match config::load_config(config_path.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(e) = mun_marker::logging::init_tracing(cli.verbose, app_config.log_level.as_deref()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let command = match command {
        Commands::Ledger(command) => command,
        Commands::Init => {
            if let Err(e) = run_init(config_path, cli.ledger, &app_config) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
    };

    let ledger_path = cli.ledger.unwrap_or_else(|| app_config.ledger_path());
    tracing::debug!(path = %ledger_path.display(), "using ledger");

    let mut session = match Session::open(JsonFileStore::new(&ledger_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Ledger error: {:#}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    // Commands that replace the rubric may run against a broken one
    let repairs_rubric = matches!(
        command,
        LedgerCommand::Reset { .. } | LedgerCommand::Restore { .. } | LedgerCommand::Rubric { action: RubricAction::Load { .. } }
    );
    if let Err(errors) = scoring::validate_rubric(&session.ledger().config) {
        eprintln!("Rubric errors in {}:", ledger_path.display());
        for error in errors {
            eprintln!("  - {}", error);
        }
        if !repairs_rubric {
            std::process::exit(EXIT_CONFIG);
        }
    }

    if let Err(e) = run(command, &mut session, &app_config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(EXIT_DATA);
    }

    std::process::exit(EXIT_SUCCESS);
}

fn run(command: LedgerCommand, session: &mut Session<JsonFileStore>, app_config: &Config) -> Result<()> {
    let use_colors = output::should_use_colors();

    match command {
        LedgerCommand::List { filter, tsv } => {
            let ledger = session.ledger();
            let ranked = ledger.ranked();
            let visible: Vec<_> = match filter.as_deref() {
                Some(text) => {
                    let matching = ledger.filter(text);
                    let ids: Vec<&str> = matching.iter().map(|p| p.id.as_str()).collect();
                    ranked
                        .into_iter()
                        .filter(|r| ids.contains(&r.participant.id.as_str()))
                        .collect()
                }
                None => ranked,
            };
            if tsv {
                println!("{}", output::format_tsv(&visible));
            } else {
                println!("{}", output::format_ranked_table(&visible, use_colors));
            }
        }
        LedgerCommand::Show { who } => {
            let ledger = session.ledger();
            let id = ledger.resolve(&who)?;
            print_detail(ledger, &id, use_colors);
        }
        LedgerCommand::Add { portfolio } => {
            let participant = session.apply(|l| {
                let p = l.add_participant();
                if let Some(name) = portfolio {
                    p.portfolio = name;
                }
                p.clone()
            })?;
            println!(
                "Added #{} {} ({})",
                participant.sequence,
                participant.display_name(),
                participant.short_id()
            );
        }
        LedgerCommand::Remove { who } => {
            let id = session.ledger().resolve(&who)?;
            session.apply(|l| l.remove(&id))?;
            println!("Removed {}", id);
        }
        LedgerCommand::Score { who, key, value } => {
            let id = session.ledger().resolve(&who)?;
            if !session.ledger().is_score_key(&key) {
                bail!(unknown_key_message(session.ledger(), &key, "score"));
            }
            session.apply(|l| l.set_score(&id, &key, RawInput::from_entry(&value)))?;
            print_detail(session.ledger(), &id, use_colors);
        }
        LedgerCommand::Count { who, key, value } => {
            let id = session.ledger().resolve(&who)?;
            if !session.ledger().is_count_key(&key) {
                bail!(unknown_key_message(session.ledger(), &key, "count"));
            }
            session.apply(|l| l.set_count(&id, &key, RawInput::from_entry(&value)))?;
            print_detail(session.ledger(), &id, use_colors);
        }
        LedgerCommand::Set { who, field, value } => {
            let id = session.ledger().resolve(&who)?;
            match field {
                MetaField::Portfolio => {
                    session.apply(|l| l.set_portfolio(&id, &value))?;
                }
                MetaField::Notes => {
                    session.apply(|l| l.set_notes(&id, &value))?;
                }
                MetaField::Sno => {
                    let sequence: u32 = value
                        .trim()
                        .parse()
                        .with_context(|| format!("Serial number must be a whole number, got '{}'", value))?;
                    session.apply(|l| l.set_sequence(&id, sequence))?;
                }
                MetaField::Award => {
                    let label = value.trim();
                    if !label.is_empty() && session.ledger().config.tier(label).is_none() {
                        tracing::warn!(award = label, "award label does not match any tier");
                    }
                    session.apply(|l| l.set_award(&id, label))?;
                }
            }
            println!("Updated {:?} for {}", field, id);
        }
        LedgerCommand::Awards { action } => match action {
            AwardsAction::Auto => {
                let plan = session.apply(|l| l.auto_assign_awards())?;
                let slots = session.ledger().config.total_slots();
                println!("Assigned {} of {} award slots", plan.len(), slots);
                print_recognition(session.ledger(), use_colors);
            }
            AwardsAction::Clear => {
                session.apply(|l| l.clear_awards())?;
                println!("Cleared all awards");
            }
        },
        LedgerCommand::Recognition => {
            print_recognition(session.ledger(), use_colors);
        }
        LedgerCommand::Notes { filter } => {
            let ledger = session.ledger();
            let visible = ledger.filter(filter.as_deref().unwrap_or(""));
            println!("{}", output::format_notes(&visible));
        }
        LedgerCommand::Rubric { action } => match action {
            RubricAction::Show => {
                print!("{}", config::rubric_to_yaml(&session.ledger().config)?);
            }
            RubricAction::Load { file } => {
                let rubric = config::load_rubric_file(&file)?;
                let applied = session.try_apply(|l| l.replace_config(rubric))?;
                if let Err(errors) = applied {
                    bail!("Rubric rejected:\n  - {}", errors.join("\n  - "));
                }
                println!("Rubric loaded from {}", file.display());
            }
        },
        LedgerCommand::Export { dir } => {
            let ledger = session.ledger();
            let dir = dir.unwrap_or_else(|| app_config.export_dir());
            let stem = export::file_stem(&ledger.config.committee);
            let workbook = export::build_workbook(&ledger.config, &ledger.participants);
            for path in export::write_workbook(&dir, &stem, &workbook)? {
                println!("Wrote {}", path.display());
            }
        }
        LedgerCommand::Backup { file } => {
            let ledger = session.ledger();
            let path = file.unwrap_or_else(|| {
                app_config
                    .export_dir()
                    .join(ledger::backup_file_name(&ledger.config.committee))
            });
            ledger::write_backup_file(&path, ledger)?;
            println!("Backup written to {}", path.display());
        }
        LedgerCommand::Restore { file } => {
            let text = ledger::read_backup_file(&file)?;
            match session.try_apply(|l| ledger::import_backup(l, &text))? {
                Ok(ledger::ImportOutcome::Replaced { participants }) => {
                    println!("Restored rubric and {} participants", participants);
                }
                Ok(ledger::ImportOutcome::ParticipantsOnly { participants }) => {
                    println!("Restored {} participants; rubric unchanged", participants);
                }
                Err(e) => bail!("Import failed, nothing changed: {}", e),
            }
        }
        LedgerCommand::Reset { yes } => {
            let confirmed = yes || config::init::prompt_yes_no("Clear all data?", false)?;
            if !confirmed {
                println!("Aborted.");
                return Ok(());
            }
            session.apply(|l| l.reset())?;
            tracing::info!("ledger reset");
            println!("Ledger reset to the default rubric");
        }
    }

    Ok(())
}

fn run_init(config_path: Option<PathBuf>, ledger_override: Option<PathBuf>, app_config: &Config) -> Result<()> {
    let ledger_path = ledger_override.clone().unwrap_or_else(|| app_config.ledger_path());
    let current = Session::open(JsonFileStore::new(&ledger_path))?;

    let Some(outcome) = config::init::run_init_wizard(config_path, &current.ledger().config)? else {
        return Ok(());
    };

    let target = ledger_override.unwrap_or_else(|| outcome.config.ledger_path());
    let mut session = Session::open(JsonFileStore::new(&target))?;
    let applied = session.try_apply(|l| l.replace_config(outcome.rubric))?;
    if let Err(errors) = applied {
        bail!("Rubric rejected:\n  - {}", errors.join("\n  - "));
    }
    println!("Ledger ready at {}", target.display());
    Ok(())
}

fn print_detail(ledger: &Ledger, id: &str, use_colors: bool) {
    if let Some(p) = ledger.get(id) {
        let result = scoring::calculate_score(&ledger.config, &p.scores, &p.counts);
        println!("{}", output::format_participant_detail(p, &result, use_colors));
    }
}

fn print_recognition(ledger: &Ledger, use_colors: bool) {
    let ranked = ledger.ranked();
    let groups = scoring::group_by_award(&ranked);
    println!("{}", output::format_recognition(&groups, &ledger.config, use_colors));
}

fn unknown_key_message(ledger: &Ledger, key: &str, kind: &str) -> String {
    let keys: Vec<&str> = if kind == "score" {
        ledger.config.score_keys().collect()
    } else {
        ledger.config.count_keys().collect()
    };
    format!("Unknown {} key '{}'. Valid keys: {}", kind, key, keys.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_set_accepts_leading_hyphen() {
        let cli = Cli::try_parse_from(["mun-marker", "set", "3", "notes", "-weak rebuttal"]).unwrap();
        match cli.command {
            Some(Commands::Ledger(LedgerCommand::Set { who, field, value })) => {
                assert_eq!(who, "3");
                assert!(matches!(field, MetaField::Notes));
                assert_eq!(value, "-weak rebuttal");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_is_separate_from_ledger_commands() {
        let cli = Cli::try_parse_from(["mun-marker", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init)));

        let cli = Cli::try_parse_from(["mun-marker", "list", "--tsv"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Ledger(LedgerCommand::List { tsv: true, .. }))
        ));
    }
}
