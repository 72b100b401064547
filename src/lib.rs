//! Core library for the roster-tools command line application.
//!
//! The library manages a support-agent roster kept as row-aligned tables in
//! one workbook. Spreadsheet adapters live under [`roster::io`], identifiers
//! and table handles in [`roster::model`], the workbook description in
//! [`roster::layout`], and the operations in [`roster::sync`] (aligned record
//! deletion), [`roster::blacklist`], [`roster::annotation`] and
//! [`roster::norm`].

pub mod roster;

pub use roster::{
    Result, RosterError, annotation, blacklist, confirm, error, io, layout, model, norm, sync,
};
