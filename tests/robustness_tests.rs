use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::NamedTempFile;

mod common;

#[test]
fn test_malformed_csv_handling() {
    let file = NamedTempFile::new().unwrap();
    common::write_operations(
        file.path(),
        &[
            "open, 1, , 0, alice, 1111",
            // Valid deposit
            "deposit, 1, , 1.0",
            // Invalid type
            "invalid, 1, , 1.0",
            // Missing amount
            "deposit, 1, , ",
            // Valid deposit again
            "deposit, 1, , 2.0",
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("ledgerd"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stdout(predicate::str::contains("1,alice,3.0"));
}

#[test]
fn test_invalid_data_types() {
    let file = NamedTempFile::new().unwrap();
    common::write_operations(
        file.path(),
        &[
            "open, 1, , 0, alice, 1111",
            // Text in amount field
            "deposit, 1, , not_a_number",
            // Non-integer account number
            "deposit, abc, , 1.0",
            // Valid deposit
            "deposit, 1, , 5.0",
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("ledgerd"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stdout(predicate::str::contains("1,alice,5.0"));
}

#[test]
fn test_rejected_operations_are_reported_and_skipped() {
    let file = NamedTempFile::new().unwrap();
    common::write_operations(
        file.path(),
        &[
            "open, 1, , 10.00, alice, 1111",
            "open, 1, , 99.00, mallory, 6666",
            "deposit, 2, , 1.00",
            "withdraw, 1, , -1.00",
            "transfer, 1, 1, 5.00",
            "withdraw, 1, , 10.01",
            "withdraw, 1, , 4.00",
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("ledgerd"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Account 1 is already open."))
        .stderr(predicate::str::contains("Account 2 does not exist."))
        .stderr(predicate::str::contains("Invalid amount -1.00"))
        .stderr(predicate::str::contains(
            "Cannot transfer money to the same account.",
        ))
        .stderr(predicate::str::contains("Insufficient balance in account 1"))
        .stdout(predicate::str::contains("1,alice,6.00"))
        .stdout(predicate::str::contains("mallory").not());
}
