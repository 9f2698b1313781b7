use booker::{check, check_eq, eyre, http::StatusCode, BookingResponse, Error};
use serde_json::{json, Value};

async fn creating_booking_with_custom_data() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let booking = super::ivan_ivanov()?;

    let created = client.create_booking_typed(&booking).await?;
    check_eq!(booking.firstname, created.booking.firstname);
    check_eq!(booking.lastname, created.booking.lastname);
    check_eq!(booking.totalprice, created.booking.totalprice);
    check_eq!(booking.depositpaid, created.booking.depositpaid);
    check_eq!(booking.bookingdates, created.booking.bookingdates);
    check_eq!(booking.additionalneeds, created.booking.additionalneeds);
    Ok(())
}
booker::scenario!(creating_booking_with_custom_data);

/// Checkout before checkin is accepted by the service and echoed unchanged.
async fn checkout_before_checkin_is_echoed() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let payload = json!({
        "firstname": "Ivan",
        "lastname": "Ivanov",
        "totalprice": 113,
        "depositpaid": true,
        "bookingdates": {"checkin": "2025-12-01", "checkout": "2025-02-01"},
        "additionalneeds": "Dinner",
    });

    let body = client.create_booking(&payload, None).await?.into_json()?;
    let created = BookingResponse::from_value(body.clone())?;
    check_eq!(payload, body["booking"]);
    check_eq!("2025-12-01", created.booking.bookingdates.checkin.to_string());
    Ok(())
}
booker::scenario!(checkout_before_checkin_is_echoed);

fn valid_payload() -> Value {
    json!({
        "firstname": "Valid",
        "lastname": "Data",
        "totalprice": 100,
        "depositpaid": true,
        "bookingdates": {"checkin": "2025-01-01", "checkout": "2025-01-05"},
    })
}

async fn expect_internal_server_error(payload: &Value) -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let body = client
        .create_booking(payload, Some(StatusCode::INTERNAL_SERVER_ERROR))
        .await?;
    check!(
        body.to_string().contains("Internal Server Error"),
        "unexpected body: {body}"
    );
    Ok(())
}

async fn create_booking_without_firstname_returns_500() -> eyre::Result<()> {
    let payload = json!({
        "lastname": "Brown",
        "totalprice": 111,
        "depositpaid": true,
        "bookingdates": {"checkin": "2024-01-01", "checkout": "2024-01-05"},
        "additionalneeds": "Breakfast",
    });
    expect_internal_server_error(&payload).await
}
booker::scenario!(create_booking_without_firstname_returns_500);

async fn create_booking_with_null_firstname_returns_500() -> eyre::Result<()> {
    let payload = json!({
        "firstname": null,
        "lastname": "Brown",
        "totalprice": 111,
        "depositpaid": true,
        "bookingdates": {"checkin": "2024-01-01", "checkout": "2024-01-05"},
        "additionalneeds": "Breakfast",
    });
    expect_internal_server_error(&payload).await
}
booker::scenario!(create_booking_with_null_firstname_returns_500);

async fn create_booking_with_empty_payload_returns_500() -> eyre::Result<()> {
    expect_internal_server_error(&json!({})).await
}
booker::scenario!(create_booking_with_empty_payload_returns_500);

async fn create_booking_with_invalid_data_types_returns_500() -> eyre::Result<()> {
    let invalid_cases = [
        ("firstname", json!(12345)),
        ("bookingdates", json!("2025-01-01,2025-01-05")),
    ];

    for (field, value) in invalid_cases {
        let mut payload = valid_payload();
        payload[field] = value;
        expect_internal_server_error(&payload).await?;
    }
    Ok(())
}
booker::scenario!(create_booking_with_invalid_data_types_returns_500);

/// Without an expected status, a server error is reported with its status code.
async fn strict_create_surfaces_server_error() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let mut payload = valid_payload();
    payload
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("payload is not an object"))?
        .remove("firstname");

    match client.create_booking(&payload, None).await {
        Err(Error::Status { status, .. }) => {
            check_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
        }
        Ok(body) => eyre::bail!("booking without firstname was accepted: {body}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
booker::scenario!(strict_create_surfaces_server_error);

/// An expected status the service does not answer with fails the call.
async fn unexpected_success_is_a_mismatch() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    let res = client
        .create_booking(&valid_payload(), Some(StatusCode::INTERNAL_SERVER_ERROR))
        .await;

    match res {
        Err(Error::StatusMismatch {
            expected, actual, ..
        }) => {
            check_eq!(StatusCode::INTERNAL_SERVER_ERROR, expected);
            check_eq!(StatusCode::OK, actual);
        }
        other => eyre::bail!("expected a status mismatch, got {other:?}"),
    }
    Ok(())
}
booker::scenario!(unexpected_success_is_a_mismatch);
