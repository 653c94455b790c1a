use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Account, Cents, Operation};

/// Account snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub owner: String,
    pub balance: Cents,
    pub operations: Vec<Operation>,
}

/// Exporter for converting an account history to various formats
pub struct Exporter<'a> {
    account: &'a Account,
}

impl<'a> Exporter<'a> {
    pub fn new(account: &'a Account) -> Self {
        Self { account }
    }

    /// Export operations to CSV format
    pub fn export_history_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let operations = self.account.history();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "sequence",
            "timestamp",
            "kind",
            "amount_cents",
            "balance_after_cents",
        ])?;

        for op in &operations {
            csv_writer.write_record(&[
                op.id.to_string(),
                op.sequence.to_string(),
                op.timestamp.to_rfc3339(),
                op.kind.as_str().to_string(),
                op.amount.to_string(),
                op.balance_after.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(operations.len())
    }

    /// Export the account as a JSON snapshot
    pub fn export_history_json<W: Write>(&self, mut writer: W) -> Result<HistorySnapshot> {
        let snapshot = HistorySnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            owner: self.account.owner().to_string(),
            balance: self.account.balance(),
            operations: self.account.history(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
