//! # booker - end-to-end tests for a hotel booking API
//!
//! booker drives a booking service over HTTP: it authenticates, creates
//! bookings with valid and invalid payloads, reads, updates and deletes them,
//! and checks every answer against the booking model.
//!
//! Configuration comes from `ENVIRONMENT` (`TEST` or `PROD`) and the matching
//! `TEST_BASE_URL` / `PROD_BASE_URL`, optionally from a `.env` file and a
//! `booker.toml`.
//!
//! ## Writing a scenario
//!
//! ```rust,no_run
//! use booker::{check_eq, eyre, ApiClient, Booking, BookingDates};
//!
//! async fn create_and_read() -> eyre::Result<()> {
//!     let client = ApiClient::from_env()?;
//!     client.authenticate().await?;
//!
//!     let booking = Booking {
//!         firstname: "Ivan".into(),
//!         lastname: "Ivanov".into(),
//!         totalprice: 113,
//!         depositpaid: true,
//!         bookingdates: BookingDates::new("2025-01-01", "2025-02-01")?,
//!         additionalneeds: Some("Dinner".into()),
//!     };
//!     let created = client.create_booking_typed(&booking).await?;
//!     check_eq!(booking, client.get_booking(created.bookingid).await?);
//!     Ok(())
//! }
//! booker::scenario!(create_and_read);
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     booker::App::new().run(booker::Runner::discover()).await
//! }
//! ```

mod app;

pub use eyre;
pub use inventory;
pub use pretty_assertions;

pub use app::{App, Color, ReporterType};

pub use booker_core::{
    assertion, client, config,
    config::{get_config, Config, Credentials, Environment},
    error::{Error, Result},
    http, masking, model,
    model::{
        Booking, BookingDates, BookingFilter, BookingId, BookingResponse, CalendarDate,
        PartialBooking, ValidationError,
    },
    reporter::{ListReporter, NullReporter, Reporter},
    runner::{self, Runner, TestInfo},
    ApiClient, Body, ModuleName, TestName,
    {check, check_eq, check_ne, check_str_eq, scenario},
};
