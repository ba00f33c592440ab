//! Application layer containing the ledger's business logic orchestration.
//!
//! `LedgerEngine` is the entry point. It drives the `AccountRepository` and the
//! `TransactionRecorder` inside a `UnitOfWork`, which owns the per-account
//! critical sections and the staged writes of one operation.

pub mod accounts;
pub mod audit;
pub mod engine;
pub mod locks;
pub mod recorder;
pub mod unit_of_work;
