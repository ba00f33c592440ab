#![allow(dead_code)]

use rand::Rng;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;

pub const HEADER: &str = "type, account, counterparty, amount, name, pin";

/// Writes an operations file made of the given body lines.
pub fn write_operations(path: &Path, lines: &[&str]) -> Result<(), Error> {
    let mut file = File::create(path)?;
    writeln!(file, "{}", HEADER)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

/// Opens `accounts` accounts with 100.00 each, then appends `rows` random
/// deposits, withdrawals and transfers between them.
pub fn generate_operations(path: &Path, accounts: u32, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    wtr.write_record(["type", "account", "counterparty", "amount", "name", "pin"])?;

    for account in 1..=accounts {
        let number = account.to_string();
        let name = format!("holder{}", account);
        wtr.write_record(["open", number.as_str(), "", "100.00", name.as_str(), "1111"])?;
    }

    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let account = rng.gen_range(1..=accounts).to_string();
        let amount = format!("{}.{:02}", rng.gen_range(0..50), rng.gen_range(1..100));
        match rng.gen_range(0..3) {
            0 => wtr.write_record(["deposit", account.as_str(), "", amount.as_str()])?,
            1 => wtr.write_record(["withdraw", account.as_str(), "", amount.as_str()])?,
            _ => {
                let counterparty = rng.gen_range(1..=accounts).to_string();
                wtr.write_record([
                    "transfer",
                    account.as_str(),
                    counterparty.as_str(),
                    amount.as_str(),
                ])?
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
