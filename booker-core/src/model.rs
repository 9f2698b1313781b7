//! Booking payloads and their validation.
//!
//! Wire payloads are first read into loosely typed `Raw*` shapes and then
//! converted into the validated domain types, so that every failure names the
//! field that caused it.
//!
//! ```
//! use booker_core::model::{BookingDates, DateError, ValidationError};
//!
//! let err = BookingDates::new("2024-02-30", "2024-03-02").unwrap_err();
//! assert!(matches!(
//!     err,
//!     ValidationError::Date { field: "checkin", source: DateError::DayOutOfRange { .. } }
//! ));
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("value {0:?} is not a date in YYYY-MM-DD format")]
    Malformed(String),
    #[error("month value is outside expected range of 1-12")]
    MonthOutOfRange { month: u32 },
    #[error("day value is outside expected range for the given month/year")]
    DayOutOfRange { year: i32, month: u32, day: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: {source}")]
    Date {
        field: &'static str,
        #[source]
        source: DateError,
    },
    #[error("payload does not match the expected schema: {0}")]
    Schema(#[from] serde_json::Error),
}

impl ValidationError {
    fn date(field: &'static str) -> impl FnOnce(DateError) -> ValidationError {
        move |source| ValidationError::Date { field, source }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`. `month` must be within 1-12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// A calendar date written as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<CalendarDate, DateError> {
        if !(1..=12).contains(&month) {
            return Err(DateError::MonthOutOfRange { month });
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(DateError::DayOutOfRange { year, month, day });
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(CalendarDate)
            .ok_or(DateError::DayOutOfRange { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate(date)
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DateError::Malformed(s.to_string());
        let mut parts = s.split('-');
        let (Some(y), Some(m), Some(d), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let digits = |part: &str, len: usize| {
            part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !(digits(y, 4) && digits(m, 2) && digits(d, 2)) {
            return Err(malformed());
        }
        let year = y.parse().map_err(|_| malformed())?;
        let month = m.parse().map_err(|_| malformed())?;
        let day = d.parse().map_err(|_| malformed())?;
        CalendarDate::from_ymd(year, month, day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Deserialize)]
struct RawBookingDates {
    checkin: String,
    checkout: String,
}

/// Stay dates. `checkout` before `checkin` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBookingDates")]
pub struct BookingDates {
    pub checkin: CalendarDate,
    pub checkout: CalendarDate,
}

impl BookingDates {
    pub fn new(checkin: &str, checkout: &str) -> Result<BookingDates, ValidationError> {
        Ok(BookingDates {
            checkin: checkin.parse().map_err(ValidationError::date("checkin"))?,
            checkout: checkout.parse().map_err(ValidationError::date("checkout"))?,
        })
    }
}

impl TryFrom<RawBookingDates> for BookingDates {
    type Error = ValidationError;

    fn try_from(raw: RawBookingDates) -> Result<Self, Self::Error> {
        BookingDates::new(&raw.checkin, &raw.checkout)
    }
}

#[derive(Debug, Deserialize)]
struct RawBooking {
    firstname: String,
    lastname: String,
    totalprice: i64,
    depositpaid: bool,
    bookingdates: RawBookingDates,
    #[serde(default)]
    additionalneeds: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBooking")]
pub struct Booking {
    pub firstname: String,
    pub lastname: String,
    pub totalprice: i64,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

impl TryFrom<RawBooking> for Booking {
    type Error = ValidationError;

    fn try_from(raw: RawBooking) -> Result<Self, Self::Error> {
        let RawBookingDates { checkin, checkout } = raw.bookingdates;
        Ok(Booking {
            firstname: raw.firstname,
            lastname: raw.lastname,
            totalprice: raw.totalprice,
            depositpaid: raw.depositpaid,
            bookingdates: BookingDates {
                checkin: checkin
                    .parse()
                    .map_err(ValidationError::date("bookingdates.checkin"))?,
                checkout: checkout
                    .parse()
                    .map_err(ValidationError::date("bookingdates.checkout"))?,
            },
            additionalneeds: raw.additionalneeds,
        })
    }
}

impl Booking {
    /// Validate a JSON value as a booking.
    pub fn from_value(value: serde_json::Value) -> Result<Booking, ValidationError> {
        let raw: RawBooking = serde_json::from_value(value)?;
        raw.try_into()
    }

    /// JSON encoding of the booking; an absent `additionalneeds` is omitted.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Deserialize)]
struct RawBookingResponse {
    bookingid: u64,
    booking: RawBooking,
}

/// Response of a successful create call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawBookingResponse")]
pub struct BookingResponse {
    pub bookingid: u64,
    pub booking: Booking,
}

impl TryFrom<RawBookingResponse> for BookingResponse {
    type Error = ValidationError;

    fn try_from(raw: RawBookingResponse) -> Result<Self, Self::Error> {
        Ok(BookingResponse {
            bookingid: raw.bookingid,
            booking: raw.booking.try_into()?,
        })
    }
}

impl BookingResponse {
    pub fn from_value(value: serde_json::Value) -> Result<BookingResponse, ValidationError> {
        let raw: RawBookingResponse = serde_json::from_value(value)?;
        raw.try_into()
    }
}

/// An entry of the booking collection listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId {
    pub bookingid: u64,
}

/// Query filters for the booking collection. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin: Option<CalendarDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CalendarDate>,
}

impl BookingFilter {
    pub fn is_empty(&self) -> bool {
        self == &BookingFilter::default()
    }
}

/// PATCH payload: only the fields that are set get sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialBooking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totalprice: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depositpaid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookingdates: Option<BookingDates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

impl PartialBooking {
    /// Apply the set fields onto `booking`, the way the service merges a PATCH.
    pub fn apply(&self, booking: &Booking) -> Booking {
        Booking {
            firstname: self.firstname.clone().unwrap_or_else(|| booking.firstname.clone()),
            lastname: self.lastname.clone().unwrap_or_else(|| booking.lastname.clone()),
            totalprice: self.totalprice.unwrap_or(booking.totalprice),
            depositpaid: self.depositpaid.unwrap_or(booking.depositpaid),
            bookingdates: self
                .bookingdates
                .clone()
                .unwrap_or_else(|| booking.bookingdates.clone()),
            additionalneeds: self
                .additionalneeds
                .clone()
                .or_else(|| booking.additionalneeds.clone()),
        }
    }
}
