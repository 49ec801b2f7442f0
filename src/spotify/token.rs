use std::{future::Future, time::Duration};

use reqwest::{Client, header::AUTHORIZATION};

use crate::{
    error::{AuthError, Result},
    types::{Credentials, TokenBundle, TokenResponse},
    utils,
};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The two token endpoint grants used by the client.
///
/// Implementations stamp `issued_at` on the returned bundle themselves and
/// never retry; a failed call is reported as-is.
pub trait TokenExchanger {
    fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<TokenBundle>> + Send;

    fn exchange_refresh(
        &self,
        refresh_token: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<TokenBundle>> + Send;
}

/// [`TokenExchanger`] that POSTs url-encoded forms to a real token endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenExchanger {
    client: Client,
    token_url: String,
}

impl HttpTokenExchanger {
    pub fn new(token_url: impl Into<String>) -> Result<Self> {
        Self::with_timeouts(token_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(
        token_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(HttpTokenExchanger {
            client,
            token_url: token_url.into(),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    async fn read_bundle(response: reqwest::Response) -> Result<TokenBundle> {
        let status = response.status();
        let body = response.text().await?;
        let issued_at = utils::now_timestamp();

        if !status.is_success() {
            return Err(AuthError::AuthServer {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => Ok(token.into_bundle(issued_at)),
            Err(_) => Err(AuthError::AuthServer {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

impl TokenExchanger for HttpTokenExchanger {
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        credentials: &Credentials,
    ) -> Result<TokenBundle> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        Self::read_bundle(response).await
    }

    async fn exchange_refresh(
        &self,
        refresh_token: &str,
        credentials: &Credentials,
    ) -> Result<TokenBundle> {
        let response = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, utils::basic_authorization(credentials))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        Self::read_bundle(response).await
    }
}
