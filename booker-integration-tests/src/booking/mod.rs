mod create;
mod delete;
mod read;
mod update;

use booker::{eyre, Booking, BookingDates, BookingResponse};

/// The reference guest used across scenarios.
pub fn ivan_ivanov() -> eyre::Result<Booking> {
    Ok(Booking {
        firstname: "Ivan".into(),
        lastname: "Ivanov".into(),
        totalprice: 113,
        depositpaid: true,
        bookingdates: BookingDates::new("2025-01-01", "2025-02-01")?,
        additionalneeds: Some("Dinner".into()),
    })
}

/// Create a fresh booking for scenarios that need one to exist.
pub async fn create_fixture() -> eyre::Result<BookingResponse> {
    let client = crate::get_client().await?;
    Ok(client.create_booking_typed(&ivan_ivanov()?).await?)
}
