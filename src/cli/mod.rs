mod menu;
mod views;

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

pub use menu::run_menu;
pub use views::{summarize, write_history, write_report, HistorySummary};

use crate::application::{singleton, AccountConfig, Session};
use crate::domain::{format_amount, parse_cents, Account, Cents};
use crate::io::{Exporter, ReplayOptions, Replayer};
use crate::notify::StdoutSink;

/// Argentum - observable bank account
#[derive(Parser)]
#[command(name = "argentum")]
#[command(about = "A single bank account whose changes are broadcast to listeners")]
#[command(version)]
pub struct Cli {
    /// Account owner name
    #[arg(long, global = true, default_value = "Account Holder")]
    pub owner: String,

    /// Opening balance (e.g., "1000" or "1000.00")
    #[arg(long, global = true, default_value = "0")]
    pub opening: String,

    /// Balance below which alerts are raised
    #[arg(long, global = true, default_value = "100")]
    pub threshold: String,

    /// Withdrawals above this amount are flagged
    #[arg(long, global = true)]
    pub withdrawal_limit: Option<String>,

    /// Address that receives a notification for every operation
    #[arg(long, global = true)]
    pub notify: Option<String>,

    /// Currency label used in messages
    #[arg(long, global = true, default_value = "DT")]
    pub currency: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to the interactive menu
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive menu: deposit, withdraw, balance, history, alerts, report
    Interactive,

    /// Scripted walkthrough of the controller and its views
    Demo,

    /// Show that a second construction returns the first account
    SingletonCheck {
        /// Owner name passed to the second construction
        #[arg(long, default_value = "Someone Else")]
        other_owner: String,

        /// Opening balance passed to the second construction
        #[arg(long, default_value = "500")]
        other_opening: String,
    },

    /// Apply deposits and withdrawals from a CSV file with `kind,amount` rows
    Replay {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate rows without applying them
        #[arg(long)]
        dry_run: bool,

        /// History output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Output file for the history (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// Build the account configuration from the command-line flags.
    pub fn config(&self) -> Result<AccountConfig> {
        let opening = parse_cents(&self.opening)
            .with_context(|| format!("Invalid opening balance '{}'", self.opening))?;
        let threshold = parse_cents(&self.threshold)
            .with_context(|| format!("Invalid alert threshold '{}'", self.threshold))?;

        let mut config = AccountConfig::new(self.owner.trim(), opening)
            .with_alert_threshold(threshold)
            .with_currency(self.currency.clone());
        if let Some(limit) = &self.withdrawal_limit {
            let limit = parse_cents(limit)
                .with_context(|| format!("Invalid withdrawal limit '{}'", limit))?;
            config = config.with_withdrawal_limit(limit);
        }
        if let Some(destination) = &self.notify {
            config = config.with_notify(destination.trim());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn run(self) -> Result<()> {
        let config = self.config()?;

        match self.command.unwrap_or(Commands::Interactive) {
            Commands::Interactive => {
                let session = open_session(&config)?;
                println!("Account ready for {}", session.controller.owner());
                let stdin = io::stdin();
                run_menu(&session, &mut stdin.lock(), &mut io::stdout())?;
            }

            Commands::Demo => run_demo(&config, &mut io::stdout())?,

            Commands::SingletonCheck {
                other_owner,
                other_opening,
            } => {
                let other_opening = parse_cents(&other_opening)
                    .with_context(|| format!("Invalid opening balance '{}'", other_opening))?;
                run_singleton_check(&config, &other_owner, other_opening, &mut io::stdout())?;
            }

            Commands::Replay {
                input,
                dry_run,
                format,
                output,
            } => {
                let session = open_session(&config)?;
                let reader: Box<dyn Read> = match &input {
                    Some(path) => Box::new(BufReader::new(
                        File::open(path).with_context(|| format!("Cannot open '{}'", path))?,
                    )),
                    None => Box::new(io::stdin()),
                };
                let writer: Box<dyn Write> = match &output {
                    Some(path) => Box::new(
                        File::create(path).with_context(|| format!("Cannot create '{}'", path))?,
                    ),
                    None => Box::new(io::stdout()),
                };
                run_replay(&session, reader, dry_run, &format, writer)?;
            }
        }

        Ok(())
    }
}

/// Create the process-wide account and attach the configured listeners.
fn open_session(config: &AccountConfig) -> Result<Session> {
    let account = singleton::get_or_create(&config.owner, config.opening_balance)?;
    Ok(Session::assemble(config, account, Arc::new(StdoutSink)))
}

const DEMO_OPENING: Cents = 100000;
const DEMO_THRESHOLD: Cents = 30000;

/// Walk through the controller and views: open with 1000, deposit 500,
/// withdraw 300, withdraw 800, then show every view.
pub fn run_demo<W: Write>(config: &AccountConfig, out: &mut W) -> Result<()> {
    let demo_config = AccountConfig {
        opening_balance: DEMO_OPENING,
        alert_threshold: DEMO_THRESHOLD,
        ..config.clone()
    };
    let account = Arc::new(Account::open(&demo_config.owner, demo_config.opening_balance)?);
    let session = Session::assemble(&demo_config, account, Arc::new(StdoutSink));
    let controller = &session.controller;
    let currency = controller.currency();

    writeln!(out, "1. Model, views and controller configured")?;
    writeln!(out, "2. Initial state")?;
    session.display.show(session.account());

    writeln!(out, "3. Operations through the controller")?;
    for (label, amount, is_deposit) in [
        ("Deposit", 50000, true),
        ("Withdrawal", 30000, false),
        ("Withdrawal", 80000, false),
    ] {
        writeln!(out, ">>> {} of {}", label, format_amount(amount, currency))?;
        let outcome = if is_deposit {
            controller.deposit(amount)
        } else {
            controller.withdraw(amount)
        };
        writeln!(out, "   Result: {}", outcome.message)?;
    }

    writeln!(out, "4. Views")?;
    session.display.show(session.account());
    write_history(out, controller.owner(), &controller.history(), currency)?;
    session.alert.check(session.account());
    Ok(())
}

/// Construct the process-wide account twice and show which arguments won.
pub fn run_singleton_check<W: Write>(
    config: &AccountConfig,
    other_owner: &str,
    other_opening: Cents,
    out: &mut W,
) -> Result<()> {
    let first = singleton::get_or_create(&config.owner, config.opening_balance)?;
    let second = singleton::get_or_create(other_owner, other_opening)?;
    let currency = config.currency.as_str();

    writeln!(out, "Second construction with '{}'", other_owner)?;
    writeln!(out, "  Owner:   {} (not '{}')", second.owner(), other_owner)?;
    writeln!(
        out,
        "  Balance: {} (not {})",
        format_amount(second.balance(), currency),
        format_amount(other_opening, currency)
    )?;
    writeln!(
        out,
        "  Same instance: {}",
        if Arc::ptr_eq(&first, &second) { "yes" } else { "no" }
    )?;
    Ok(())
}

/// Apply a replay file, report each row, then write the resulting history.
pub fn run_replay<R: Read, W: Write>(
    session: &Session,
    reader: R,
    dry_run: bool,
    format: &str,
    mut writer: W,
) -> Result<()> {
    let controller = &session.controller;
    let currency = controller.currency();
    let result = Replayer::new(controller).replay_csv(reader, ReplayOptions { dry_run })?;

    for entry in &result.entries {
        let status = match &entry.outcome {
            Some(outcome) if outcome.success => format!("ok: {}", outcome.message),
            Some(outcome) => format!("rejected: {}", outcome.message),
            None => "valid".to_string(),
        };
        eprintln!(
            "  line {}: {} {} -> {}",
            entry.line,
            entry.kind,
            format_amount(entry.amount, currency),
            status
        );
    }
    for error in &result.errors {
        match &error.field {
            Some(field) => eprintln!("  line {} [{}]: {}", error.line, field, error.error),
            None => eprintln!("  line {}: {}", error.line, error.error),
        }
    }
    eprintln!(
        "Replayed {} row(s): {} applied, {} rejected, {} invalid",
        result.entries.len(),
        result.applied(),
        result.rejected(),
        result.errors.len()
    );

    let exporter = Exporter::new(session.account());
    match format {
        "table" => write_history(&mut writer, controller.owner(), &controller.history(), currency)?,
        "json" => {
            exporter.export_history_json(&mut writer)?;
        }
        "csv" => {
            exporter.export_history_csv(&mut writer)?;
        }
        other => bail!("Unknown format '{}'. Use table, json or csv", other),
    }
    Ok(())
}
