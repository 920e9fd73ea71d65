//! `SheetPortal` - A student, teacher and admin portal backed by a spreadsheet
//!
//! This crate keeps every portal table in a workbook of named tabs: accounts,
//! subject assignments and one private log per account. It provides the
//! spreadsheet access layer, account identity generation, tuition and book-fee
//! accounting, and a line-oriented JSON request surface.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Correctness
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::enum_glob_use,
    clippy::semicolon_if_nothing_returned,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,  // e.g. PortalConfig in config::portal
    clippy::missing_errors_doc,        // Errors are documented where non-obvious
    clippy::missing_panics_doc,        // Only tests panic
)]

/// Configuration management for the workbook and portal settings
pub mod config;
/// Core business logic - schema, records, identity, fees, accounts, payments
pub mod core;
/// `SeaORM` entity definitions for the workbook storage
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Line-oriented JSON request surface
pub mod ipc;
/// Spreadsheet client - workbook, worksheets and in-memory tables
pub mod sheet;

#[cfg(test)]
pub mod test_utils;
