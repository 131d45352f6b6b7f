//! Circulation policy engine for library lending.
//!
//! The crate decides whether a proposed loan of one or more book editions may
//! proceed, given a set of named numeric library policies, the reader's
//! borrowing history, and the subject-domain forest the books belong to. On
//! acceptance it moves per-edition stock through an atomic inventory ledger.
//! Persistence is abstracted behind store traits so the engine can be embedded
//! in any application layer.

pub mod catalog;
pub mod config;
pub mod lending;
pub mod telemetry;
