use anyhow::Result;
use serde::Deserialize;
use std::io::Read;

use crate::application::{AccountController, Outcome};
use crate::domain::{parse_cents, Cents, OperationKind};

/// One `kind,amount` row of a replay file
#[derive(Debug, Clone, Deserialize)]
struct ReplayRow {
    kind: String,
    amount: String,
}

/// A row that was routed through the controller
#[derive(Debug, Clone)]
pub struct ReplayEntry {
    pub line: usize,
    pub kind: OperationKind,
    pub amount: Cents,
    /// `None` when running with `dry_run`
    pub outcome: Option<Outcome>,
}

/// A row that could not be parsed
#[derive(Debug, Clone)]
pub struct ReplayError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayResult {
    pub entries: Vec<ReplayEntry>,
    pub errors: Vec<ReplayError>,
}

impl ReplayResult {
    pub fn applied(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.as_ref().is_some_and(|o| o.success))
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.as_ref().is_some_and(|o| !o.success))
            .count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Parse and validate rows without touching the account
    pub dry_run: bool,
}

/// Applies a file of deposits and withdrawals through the controller, in order
pub struct Replayer<'a> {
    controller: &'a AccountController,
}

impl<'a> Replayer<'a> {
    pub fn new(controller: &'a AccountController) -> Self {
        Self { controller }
    }

    pub fn replay_csv<R: Read>(&self, reader: R, options: ReplayOptions) -> Result<ReplayResult> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut result = ReplayResult::default();

        for (line_num, row) in csv_reader.deserialize::<ReplayRow>().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ReplayError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let kind = match OperationKind::from_str(&row.kind) {
                Some(kind @ (OperationKind::Deposit | OperationKind::Withdrawal)) => kind,
                _ => {
                    result.errors.push(ReplayError {
                        line,
                        field: Some("kind".to_string()),
                        error: format!(
                            "Unknown operation '{}' (use deposit or withdraw)",
                            row.kind
                        ),
                    });
                    continue;
                }
            };

            let amount = match parse_cents(&row.amount) {
                Ok(a) => a,
                Err(e) => {
                    result.errors.push(ReplayError {
                        line,
                        field: Some("amount".to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    continue;
                }
            };

            let outcome = if options.dry_run {
                None
            } else if kind == OperationKind::Deposit {
                Some(self.controller.deposit(amount))
            } else {
                Some(self.controller.withdraw(amount))
            };

            result.entries.push(ReplayEntry {
                line,
                kind,
                amount,
                outcome,
            });
        }

        Ok(result)
    }
}
