use booker::{check, check_eq, eyre, BookingFilter};

async fn get_booking_by_id() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let created = super::create_fixture().await?;

    let raw = client.get_booking_by_id(created.bookingid).await?;
    check_eq!("Ivan", raw["firstname"]);
    check_eq!(created.booking, client.get_booking(created.bookingid).await?);
    Ok(())
}
booker::scenario!(get_booking_by_id);

async fn get_booking_ids_lists_created_booking() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let created = super::create_fixture().await?;

    let ids = client.get_booking_ids(None).await?;
    check!(
        ids.iter().any(|id| id.bookingid == created.bookingid),
        "booking {} missing from the listing",
        created.bookingid
    );
    Ok(())
}
booker::scenario!(get_booking_ids_lists_created_booking);

async fn get_booking_ids_by_name() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let created = super::create_fixture().await?;

    let filter = BookingFilter {
        firstname: Some(created.booking.firstname.clone()),
        lastname: Some(created.booking.lastname.clone()),
        ..Default::default()
    };
    let ids = client.get_booking_ids(Some(&filter)).await?;
    check!(ids.iter().any(|id| id.bookingid == created.bookingid));
    Ok(())
}
booker::scenario!(get_booking_ids_by_name);
