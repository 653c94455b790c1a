mod common;

use std::fs;

use anyhow::Result;
use argentum::application::AccountConfig;
use argentum::cli::run_replay;
use argentum::io::{Exporter, HistorySnapshot};
use common::{test_account, test_session};
use tempfile::TempDir;

#[test]
fn test_replay_writes_csv_history_to_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input_path = temp_dir.path().join("ops.csv");
    let output_path = temp_dir.path().join("history.csv");
    fs::write(
        &input_path,
        "kind,amount\ndeposit,500\nwithdraw,300\nwithdraw,2000\nbogus,1\n",
    )?;

    let (session, _sink) = test_session(AccountConfig::new("Imed Zayet", 100000));
    run_replay(
        &session,
        fs::File::open(&input_path)?,
        false,
        "csv",
        fs::File::create(&output_path)?,
    )?;

    let exported = fs::read_to_string(&output_path)?;
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(lines.len(), 4, "header plus three operations");
    assert!(lines[1].ends_with(",OPENING,100000,100000"));
    assert!(lines[2].ends_with(",DEPOSIT,50000,150000"));
    assert!(lines[3].ends_with(",WITHDRAWAL,30000,120000"));
    assert_eq!(session.controller.balance(), 120000);

    Ok(())
}

#[test]
fn test_json_snapshot_round_trips_through_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("snapshot.json");

    let account = test_account(100000);
    account.deposit(50000)?;
    account.withdraw(30000)?;
    Exporter::new(&account).export_history_json(fs::File::create(&path)?)?;

    let snapshot: HistorySnapshot = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(snapshot.owner, "Imed Zayet");
    assert_eq!(snapshot.balance, 120000);
    assert_eq!(snapshot.operations, account.history());

    Ok(())
}
