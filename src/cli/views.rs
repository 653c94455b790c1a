use std::io::Write;

use anyhow::Result;

use crate::application::Session;
use crate::domain::{format_amount, Cents, Operation, OperationKind};

/// Totals derived from an account history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub opening: Cents,
    pub deposit_count: usize,
    pub deposit_total: Cents,
    pub withdrawal_count: usize,
    pub withdrawal_total: Cents,
}

pub fn summarize(history: &[Operation]) -> HistorySummary {
    history
        .iter()
        .fold(HistorySummary::default(), |mut summary, op| {
            match op.kind {
                OperationKind::Opening => {
                    summary.opening = summary.opening.saturating_add(op.amount);
                }
                OperationKind::Deposit => {
                    summary.deposit_count += 1;
                    summary.deposit_total = summary.deposit_total.saturating_add(op.amount);
                }
                OperationKind::Withdrawal => {
                    summary.withdrawal_count += 1;
                    summary.withdrawal_total = summary.withdrawal_total.saturating_add(op.amount);
                }
            }
            summary
        })
}

pub fn write_history<W: Write>(
    out: &mut W,
    owner: &str,
    history: &[Operation],
    currency: &str,
) -> Result<()> {
    writeln!(out, "HISTORY - {}", owner)?;
    if history.is_empty() {
        writeln!(out, "No operations")?;
        return Ok(());
    }
    for op in history {
        writeln!(
            out,
            "  {}. {} [{}] {}: {} (balance: {})",
            op.sequence,
            op.kind.arrow(),
            op.timestamp.format("%Y-%m-%d %H:%M:%S"),
            op.kind,
            format_amount(op.amount, currency),
            format_amount(op.balance_after, currency)
        )?;
    }
    Ok(())
}

pub fn write_report<W: Write>(out: &mut W, session: &Session) -> Result<()> {
    let controller = &session.controller;
    let currency = controller.currency();
    let summary = summarize(&controller.history());

    writeln!(out, "REPORT - {}", controller.owner())?;
    writeln!(out, "  Opening:     {:>15}", format_amount(summary.opening, currency))?;
    writeln!(
        out,
        "  Deposits:    {:>15} ({})",
        format_amount(summary.deposit_total, currency),
        summary.deposit_count
    )?;
    writeln!(
        out,
        "  Withdrawals: {:>15} ({})",
        format_amount(summary.withdrawal_total, currency),
        summary.withdrawal_count
    )?;
    writeln!(out, "  Balance:     {:>15}", format_amount(controller.balance(), currency))?;
    if let Some(guard) = &session.guard {
        writeln!(
            out,
            "  Large withdrawals flagged: {} (limit {})",
            guard.report().large_withdrawals,
            format_amount(guard.limit(), currency)
        )?;
    }
    if let Some(notifier) = &session.notifier {
        writeln!(
            out,
            "  Notifications sent to {}: {}",
            notifier.destination(),
            notifier.sent().len()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::AccountConfig;
    use crate::domain::Account;
    use crate::notify::MemorySink;

    #[test]
    fn test_summarize() {
        let account = Account::open("Imed", 100000).unwrap();
        account.deposit(50000).unwrap();
        account.withdraw(30000).unwrap();
        account.withdraw(10000).unwrap();

        let summary = summarize(&account.history());
        assert_eq!(
            summary,
            HistorySummary {
                opening: 100000,
                deposit_count: 1,
                deposit_total: 50000,
                withdrawal_count: 2,
                withdrawal_total: 40000,
            }
        );
    }

    #[test]
    fn test_summarize_saturates_totals() {
        let account = Account::open("Imed", i64::MAX).unwrap();
        account.withdraw(i64::MAX).unwrap();
        account.deposit(i64::MAX).unwrap();

        let summary = summarize(&account.history());
        assert_eq!(summary.opening, i64::MAX);
        assert_eq!(summary.deposit_total, i64::MAX);
        assert_eq!(summary.withdrawal_total, i64::MAX);

        account.withdraw(1).unwrap();
        assert_eq!(summarize(&account.history()).withdrawal_total, i64::MAX);
    }

    #[test]
    fn test_write_history_empty() {
        let mut out = Vec::new();
        write_history(&mut out, "Imed", &[], "DT").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "HISTORY - Imed\nNo operations\n");
    }

    #[test]
    fn test_write_history_uses_arrows() {
        let account = Account::open("Imed", 100000).unwrap();
        account.withdraw(30000).unwrap();

        let mut out = Vec::new();
        write_history(&mut out, "Imed", &account.history(), "DT").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[1].starts_with("  1. ↑ ["));
        assert!(lines[1].ends_with("OPENING: 1000.00DT (balance: 1000.00DT)"));
        assert!(lines[2].starts_with("  2. ↓ ["));
        assert!(lines[2].ends_with("WITHDRAWAL: 300.00DT (balance: 700.00DT)"));
    }

    #[test]
    fn test_write_report_includes_guard_tally() {
        let account = Arc::new(Account::open("Imed", 100000).unwrap());
        let config = AccountConfig::new("Imed", 100000).with_withdrawal_limit(20000);
        let session = Session::assemble(&config, account, Arc::new(MemorySink::new()));
        session.controller.withdraw(25000);

        let mut out = Vec::new();
        write_report(&mut out, &session).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Withdrawals:"));
        assert!(text.contains("250.00DT (1)"));
        assert!(text.contains("Large withdrawals flagged: 1 (limit 200.00DT)"));
    }
}
