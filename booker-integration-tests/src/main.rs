mod auth;
mod booking;
mod ping;

use booker::{eyre, ApiClient};
use tokio::sync::OnceCell;

/// First outcome of setting up the session; a failure is kept as its message.
type Session = Result<ApiClient, String>;

/// One authenticated session shared by every scenario.
static CLIENT: OnceCell<Session> = OnceCell::const_new();

pub async fn get_client() -> eyre::Result<&'static ApiClient> {
    connect(&CLIENT, ApiClient::from_env).await
}

/// Set up the session once. Later calls get the same client, or the same error
/// without contacting the service again.
async fn connect(
    cell: &OnceCell<Session>,
    make_client: impl FnOnce() -> booker::Result<ApiClient>,
) -> eyre::Result<&ApiClient> {
    let session = cell
        .get_or_init(|| async move {
            let client = make_client().map_err(|e| e.to_string())?;
            client.authenticate().await.map_err(|e| e.to_string())?;
            Ok::<_, String>(client)
        })
        .await;
    session
        .as_ref()
        .map_err(|e| eyre::eyre!("session setup failed: {e}"))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let runner = booker::Runner::discover();
    let app = booker::App::new();
    app.run(runner).await?;
    Ok(())
}
