//! Spot credential resolution and token exchange.

use std::sync::LazyLock;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{OptionExt, ResultExt, Snafu};
use url::Url;

use crate::{USER_AGENT, event::RESOURCE_PROPERTIES};

/// Token-issuance endpoint long-lived credentials are exchanged against.
pub const TOKEN_ENDPOINT: &str = "https://oauth.spotinst.io/token";

static TOKEN_ENDPOINT_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(TOKEN_ENDPOINT).expect("failed to parse the fixed token endpoint URL")
});

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("No valid long or short term credentials provided"))]
    MissingCredentials,

    #[snafu(display("failed to build HTTP client"))]
    BuildHttpClient { source: reqwest::Error },

    #[snafu(display("Token creation failed: {source}"))]
    TokenRequest { source: reqwest::Error },

    #[snafu(display("Token creation failed: {status}"))]
    TokenEndpoint { status: StatusCode },

    #[snafu(display("Token creation failed: {source}"))]
    DeserializeTokenResponse { source: reqwest::Error },

    #[snafu(display("Token creation failed: access token missing from response"))]
    MalformedTokenResponse,
}

/// The credential shapes an event can carry.
///
/// Long-lived credentials are exchanged for an access token; a short-lived
/// token is passed through as-is. When an event carries both shapes, the
/// long-lived set wins.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum Credentials {
    #[serde(rename_all = "camelCase")]
    LongLived {
        username: String,
        password: String,
        client_id: String,
        client_secret: String,
    },

    #[serde(rename_all = "camelCase")]
    Token { access_token: String },
}

impl Credentials {
    /// Reads the credential shape off the event, from `ResourceProperties`
    /// when present and from the top level otherwise.
    pub fn from_event(event: &Value) -> Result<Self, Error> {
        let source = event
            .get(RESOURCE_PROPERTIES)
            .filter(|properties| properties.is_object())
            .unwrap_or(event);
        Self::deserialize(source)
            .ok()
            .context(MissingCredentialsSnafu)
    }
}

/// Form body of the password-grant exchange.
#[derive(Serialize)]
struct TokenExchangeForm<'a> {
    username: &'a str,
    password: &'a str,
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    response: TokenResponseItems,
}

#[derive(Default, Deserialize)]
struct TokenResponseItems {
    #[serde(default)]
    items: Vec<TokenItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenItem {
    #[serde(default)]
    access_token: Option<String>,
}

/// Resolves credentials to an access token against the Spot OAuth endpoint.
///
/// Tokens are fetched fresh per invocation and never cached here; their
/// lifetime is the caller's concern.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl TokenClient {
    /// Client against the fixed production endpoint.
    pub fn new() -> Result<Self, Error> {
        Self::with_endpoint(TOKEN_ENDPOINT_URL.clone())
    }

    pub fn with_endpoint(endpoint: Url) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context(BuildHttpClientSnafu)?;
        Ok(Self { http, endpoint })
    }

    /// Resolves the event's credentials straight to a token.
    pub async fn resolve_from_event(&self, event: &Value) -> Result<String, Error> {
        let credentials = Credentials::from_event(event)?;
        self.resolve(&credentials).await
    }

    /// Resolves `credentials` to a bearer token.
    ///
    /// Long-lived credentials go through the password-grant form exchange;
    /// a short-lived token is returned without any network call.
    pub async fn resolve(&self, credentials: &Credentials) -> Result<String, Error> {
        match credentials {
            Credentials::Token { access_token } => {
                tracing::debug!("using pre-issued access token");
                Ok(access_token.clone())
            }
            Credentials::LongLived {
                username,
                password,
                client_id,
                client_secret,
            } => {
                tracing::debug!(endpoint = %self.endpoint, "exchanging long-lived credentials for an access token");
                self.exchange(&TokenExchangeForm {
                    username,
                    password,
                    grant_type: "password",
                    client_id,
                    client_secret,
                })
                .await
            }
        }
    }

    async fn exchange(&self, form: &TokenExchangeForm<'_>) -> Result<String, Error> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(form)
            .send()
            .await
            .context(TokenRequestSnafu)?;

        let status = response.status();
        if status.as_u16() > 201 {
            return TokenEndpointSnafu { status }.fail();
        }

        let body: TokenResponse = response
            .json()
            .await
            .context(DeserializeTokenResponseSnafu)?;
        body.response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.access_token)
            .context(MalformedTokenResponseSnafu)
    }
}
