use booker::{check_eq, eyre, http::StatusCode};

async fn service_is_up() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    check_eq!(StatusCode::CREATED, client.health_check().await?);
    Ok(())
}
booker::scenario!(service_is_up);
