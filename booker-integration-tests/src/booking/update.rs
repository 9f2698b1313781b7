use booker::{check_eq, eyre, Booking, BookingDates, PartialBooking};

async fn update_booking() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let created = super::create_fixture().await?;

    let replacement = Booking {
        totalprice: 250,
        bookingdates: BookingDates::new("2025-03-01", "2025-03-10")?,
        additionalneeds: Some("Breakfast".into()),
        ..created.booking.clone()
    };
    let updated = Booking::from_value(
        client
            .update_booking(created.bookingid, &replacement)
            .await?,
    )?;
    check_eq!(replacement, updated);
    check_eq!(replacement, client.get_booking(created.bookingid).await?);
    Ok(())
}
booker::scenario!(update_booking);

async fn partial_update_booking() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let created = super::create_fixture().await?;

    let patch = PartialBooking {
        firstname: Some("Petr".into()),
        depositpaid: Some(false),
        ..Default::default()
    };
    let patched = Booking::from_value(
        client
            .partial_update_booking(created.bookingid, &patch)
            .await?,
    )?;
    check_eq!(patch.apply(&created.booking), patched);
    check_eq!("Ivanov", patched.lastname);
    Ok(())
}
booker::scenario!(partial_update_booking);
