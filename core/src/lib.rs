//! mindease-core: workforce stress scoring and shift-swap optimization.
//!
//! The session owns the working set. Everything else is either a pure
//! function over records (scoring, planning, statistics) or a collaborator
//! the session calls (store, remote client, dispatcher).

pub mod command;
pub mod config;
pub mod csv_input;
pub mod demo;
pub mod employee;
pub mod error;
pub mod event;
pub mod ingest;
pub mod notification;
pub mod planner;
pub mod remote;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod store;
pub mod swap;
pub mod types;
pub mod working_set;
