//! # Booker Core
//!
//! Core functionality for the booker end-to-end suite of a booking service.
//!
//! This crate provides:
//! - [`ApiClient`], one authenticated HTTP session exposing the booking operations
//! - the booking data model and its calendar date validation
//! - assertion macros returning errors instead of panicking
//! - configuration loading and a sequential scenario runner
//!
//! ## Architecture (block diagram)
//!
//! ```text
//! +---------------------+      +---------------------+      +---------------------+
//! | scenarios           | ---> | runner (sequential) | ---> | reporter (output)   |
//! | scenario!(fn)       |      | + event channel     |      | List/Null           |
//! +---------------------+      +---------------------+      +---------------------+
//!            |                         ^                              ^
//!            v                         |                              |
//! +---------------------+              |                   +---------------------+
//! | ApiClient           | ---publish---+-------------------| masking             |
//! | + http session      |   (req/res logs)                 | (tokens, passwords) |
//! +---------------------+                                  +---------------------+
//!            |
//!            v
//! +---------------------+      +---------------------+
//! | model validation    |      | config              |
//! | Booking, dates      |      | ENVIRONMENT, URLs   |
//! +---------------------+      +---------------------+
//! ```
//!
//! Most users should use the `booker` crate rather than importing `booker-core` directly.

#[doc(hidden)]
pub mod assertion;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod masking;
pub mod model;
pub mod reporter;
pub mod runner;

pub use eyre;
#[doc(hidden)]
pub use inventory;
#[doc(hidden)]
pub use pretty_assertions;

/// Rust module path of a scenario, e.g. `booker_integration_tests::booking::create`.
pub type ModuleName = String;

/// Name of a scenario function.
pub type TestName = String;

pub use client::{ApiClient, Body};
pub use config::{get_config, Config, Credentials, Environment};
pub use error::{Error, Result};
pub use model::{
    Booking, BookingDates, BookingFilter, BookingId, BookingResponse, CalendarDate,
    PartialBooking, ValidationError,
};
pub use reporter::{ListReporter, NullReporter, Reporter};
pub use runner::{Filter, ModuleFilter, Runner, TestIgnoreFilter, TestInfo, TestNameFilter};
