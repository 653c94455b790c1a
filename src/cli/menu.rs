use std::io::{BufRead, Write};

use anyhow::Result;

use super::views::{write_history, write_report};
use crate::application::{Outcome, Session};
use crate::domain::{format_amount, parse_cents, Cents};

const MENU: &[&str] = &[
    "--- Menu ---",
    "1. Deposit",
    "2. Withdraw",
    "3. Show balance",
    "4. Show history",
    "5. Check alerts",
    "6. Show report",
    "0. Quit",
];

/// Interactive loop over `input`. Returns when the user quits or input ends.
/// Listener output goes to the session's sink; menu output goes to `out`.
pub fn run_menu<R: BufRead, W: Write>(session: &Session, input: &mut R, out: &mut W) -> Result<()> {
    let controller = &session.controller;
    let account = session.account();

    loop {
        writeln!(out)?;
        writeln!(
            out,
            "{} - balance {}",
            controller.owner(),
            format_amount(controller.balance(), controller.currency())
        )?;
        for line in MENU {
            writeln!(out, "{}", line)?;
        }

        let Some(choice) = prompt(input, out, "Your choice: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => {
                let Some(amount) = prompt_amount(input, out, "Amount to deposit: ")? else {
                    break;
                };
                write_outcome(out, &controller.deposit(amount))?;
            }
            "2" => {
                let Some(amount) = prompt_amount(input, out, "Amount to withdraw: ")? else {
                    break;
                };
                write_outcome(out, &controller.withdraw(amount))?;
            }
            "3" => session.display.show(account),
            "4" => write_history(
                out,
                controller.owner(),
                &controller.history(),
                controller.currency(),
            )?,
            "5" => {
                session.alert.check(account);
            }
            "6" => write_report(out, session)?,
            "0" | "q" => {
                writeln!(out, "Goodbye!")?;
                break;
            }
            _ => writeln!(out, "Invalid choice!")?,
        }
    }

    writeln!(out)?;
    writeln!(out, "Final state")?;
    session.display.show(account);
    session.alert.check(account);
    write_report(out, session)?;
    Ok(())
}

fn write_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> Result<()> {
    let symbol = if outcome.success { "✅" } else { "❌" };
    writeln!(out, "{} {}", symbol, outcome.message)?;
    Ok(())
}

/// Read one trimmed line; `None` on end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask until the answer parses as an amount; `None` on end of input.
fn prompt_amount<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> Result<Option<Cents>> {
    loop {
        let Some(answer) = prompt(input, out, label)? else {
            return Ok(None);
        };
        match parse_cents(&answer) {
            Ok(amount) => return Ok(Some(amount)),
            Err(_) => writeln!(out, "Invalid amount. Please enter a number.")?,
        }
    }
}
