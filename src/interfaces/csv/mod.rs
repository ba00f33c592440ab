//! CSV adapters: operations in, account state and history out.

pub mod ledger_writer;
pub mod operation_reader;
