use booker::{check, check_eq, eyre, http::StatusCode};

async fn delete_booking() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let created = super::create_fixture().await?;

    check!(client.delete_booking(created.bookingid).await?);

    let err = match client.get_booking_by_id(created.bookingid).await {
        Ok(body) => eyre::bail!("deleted booking is still readable: {body}"),
        Err(e) => e,
    };
    check_eq!(Some(StatusCode::NOT_FOUND), err.status());
    Ok(())
}
booker::scenario!(delete_booking);
