#![doc = "sql-docgen-core: core pipeline library for sql-docgen."]

//! This crate turns a SQL schema dump into per-table Markdown documentation.
//! It holds every pipeline stage and data model; the concrete text-generation
//! client and the command line live in the `sql-docgen` crate.
//!
//! # Usage
//! Implement [`contract::TextGenerator`] for your model provider and call
//! [`pipeline::document_file`] (or [`pipeline::document_sql`] for in-memory input).

pub mod config;
pub mod contract;
pub mod dispatch;
pub mod extract;
pub mod group;
pub mod pipeline;
pub mod prompt;
pub mod segment;
pub mod writer;
