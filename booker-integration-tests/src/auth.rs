use std::sync::Arc;

use booker::{check, check_eq, eyre, get_config, ApiClient, Config, Credentials, Error};

async fn shared_session_holds_token() -> eyre::Result<()> {
    let client = crate::get_client().await?;
    check!(client.is_authenticated());
    Ok(())
}
booker::scenario!(shared_session_holds_token);

/// The service answers bad credentials with 200 and a "reason" body instead of a token.
async fn bad_credentials_yield_no_token() -> eyre::Result<()> {
    let cfg = Config {
        credentials: Credentials {
            username: "nobody".into(),
            password: "wrong".into(),
        },
        ..(*get_config()?).clone()
    };
    let client = ApiClient::new(Arc::new(cfg));

    let Err(err) = client.authenticate().await else {
        eyre::bail!("authentication with bad credentials succeeded");
    };
    check!(matches!(err, Error::MissingToken(_)), "unexpected error: {err}");
    check_eq!(false, client.is_authenticated());
    Ok(())
}
booker::scenario!(bad_credentials_yield_no_token);
