//! Client for the booking service.
//!
//! [`ApiClient`] owns one HTTP session. After [`ApiClient::authenticate`] the
//! session carries `Authorization: Bearer <token>` on every request; deletion
//! sends HTTP Basic credentials instead.
//!
//! Every operation with a fixed expected status follows the same rule: a
//! non-2xx answer is [`Error::Status`], a 2xx answer other than the expected
//! one is [`Error::StatusMismatch`].

use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::*;

use crate::{
    config::{get_config, Config},
    http::{self, header, Response, StatusCode},
    model::{Booking, BookingFilter, BookingId, BookingResponse},
    Error, Result,
};

pub const PING_ENDPOINT: &str = "/ping";
pub const AUTH_ENDPOINT: &str = "/auth";
pub const BOOKING_ENDPOINT: &str = "/booking";

/// Body of a create call: parsed JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    Text(String),
}

impl Body {
    fn from_response(res: &Response) -> Body {
        match res.json() {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(res.text().to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// The JSON value, or a decode error when the body was plain text.
    pub fn into_json(self) -> Result<serde_json::Value> {
        match self {
            Body::Json(value) => Ok(value),
            Body::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Json(value) => write!(f, "{value}"),
            Body::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<Config>,
    session: http::Client,
}

impl ApiClient {
    pub fn new(config: Arc<Config>) -> ApiClient {
        let session = http::Client::new().with_timeout(config.timeout);
        ApiClient { config, session }
    }

    /// Build a client from the process-wide configuration.
    pub fn from_env() -> Result<ApiClient> {
        Ok(ApiClient::new(get_config()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &http::Client {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .default_headers()
            .contains_key(header::AUTHORIZATION)
    }

    fn booking_url(&self, id: u64) -> url::Url {
        self.config.endpoint(&format!("{BOOKING_ENDPOINT}/{id}"))
    }

    /// Exchange the configured credentials for a token and attach it to the session.
    #[instrument(level = "debug", skip_all)]
    pub async fn authenticate(&self) -> Result<()> {
        let res = self
            .session
            .post(self.config.endpoint(AUTH_ENDPOINT))
            .json(&self.config.credentials)
            .send()
            .await?;
        let res = expect_status(res, StatusCode::OK)?;

        let body: serde_json::Value = res.json()?;
        let Some(token) = body.get("token").and_then(|t| t.as_str()) else {
            return Err(Error::MissingToken(res.text().to_string()));
        };
        let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::MissingToken(res.text().to_string()))?;
        self.session.set_default_header(header::AUTHORIZATION, value);
        info!("authenticated as {}", self.config.credentials.username);
        Ok(())
    }

    /// The service answers its ping endpoint with 201.
    #[instrument(level = "debug", skip_all)]
    pub async fn health_check(&self) -> Result<StatusCode> {
        let res = self
            .session
            .get(self.config.endpoint(PING_ENDPOINT))
            .send()
            .await?;
        Ok(expect_status(res, StatusCode::CREATED)?.status())
    }

    /// Create a booking from an arbitrary payload.
    ///
    /// With `expected_status`, the response status must equal it and no other
    /// status check is done; this is how error answers are probed. Without it,
    /// any non-2xx status fails.
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn create_booking<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        expected_status: Option<StatusCode>,
    ) -> Result<Body> {
        let res = self
            .session
            .post(self.config.endpoint(BOOKING_ENDPOINT))
            .json(payload)
            .send()
            .await?;

        match expected_status {
            Some(expected) if res.status() != expected => Err(Error::StatusMismatch {
                expected,
                actual: res.status(),
                body: res.text().to_string(),
            }),
            Some(_) => Ok(Body::from_response(&res)),
            None => Ok(Body::from_response(&ensure_success(res)?)),
        }
    }

    /// Create a booking and validate the response shape.
    pub async fn create_booking_typed(&self, booking: &Booking) -> Result<BookingResponse> {
        let value = self.create_booking(booking, None).await?.into_json()?;
        Ok(BookingResponse::from_value(value)?)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_booking_by_id(&self, id: u64) -> Result<serde_json::Value> {
        let res = self.session.get(self.booking_url(id)).send().await?;
        Ok(expect_status(res, StatusCode::OK)?.json()?)
    }

    /// Fetch a booking and validate it.
    pub async fn get_booking(&self, id: u64) -> Result<Booking> {
        let value = self.get_booking_by_id(id).await?;
        Ok(Booking::from_value(value)?)
    }

    /// List booking identifiers, optionally filtered.
    ///
    /// Yields the listed ids themselves rather than a bare success flag;
    /// callers only interested in the call succeeding check `is_ok()`.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_booking_ids(&self, filter: Option<&BookingFilter>) -> Result<Vec<BookingId>> {
        let mut req = self.session.get(self.config.endpoint(BOOKING_ENDPOINT));
        if let Some(filter) = filter {
            req = req.query(filter);
        }
        let res = expect_status(req.send().await?, StatusCode::OK)?;
        Ok(res.json()?)
    }

    /// Replace a booking (PUT).
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn update_booking<T: Serialize + ?Sized>(
        &self,
        id: u64,
        payload: &T,
    ) -> Result<serde_json::Value> {
        let res = self
            .session
            .put(self.booking_url(id))
            .json(payload)
            .send()
            .await?;
        Ok(expect_status(res, StatusCode::OK)?.json()?)
    }

    /// Update some fields of a booking (PATCH).
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn partial_update_booking<T: Serialize + ?Sized>(
        &self,
        id: u64,
        payload: &T,
    ) -> Result<serde_json::Value> {
        let res = self
            .session
            .patch(self.booking_url(id))
            .json(payload)
            .send()
            .await?;
        Ok(expect_status(res, StatusCode::OK)?.json()?)
    }

    /// Delete a booking with HTTP Basic credentials. The service answers 201.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_booking(&self, id: u64) -> Result<bool> {
        let credentials = &self.config.credentials;
        let res = self
            .session
            .delete(self.booking_url(id))
            .basic_auth(&credentials.username, &credentials.password)
            .send()
            .await?;
        expect_status(res, StatusCode::CREATED)?;
        Ok(true)
    }
}

fn ensure_success(res: Response) -> Result<Response> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(Error::Status {
            status: res.status,
            url: res.url,
            body: res.text,
        })
    }
}

fn expect_status(res: Response, expected: StatusCode) -> Result<Response> {
    let res = ensure_success(res)?;
    if res.status() != expected {
        return Err(Error::StatusMismatch {
            expected,
            actual: res.status,
            body: res.text,
        });
    }
    Ok(res)
}
