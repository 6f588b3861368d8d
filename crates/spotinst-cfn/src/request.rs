//! Combined token and config resolution.

use serde_json::Value;
use snafu::{ResultExt, Snafu};
use tokio::task::JoinHandle;

use crate::{
    auth::{self, TokenClient},
    event::{self, ConfigLocator},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    LocateConfig { source: event::Error },

    #[snafu(transparent)]
    ResolveToken { source: auth::Error },

    #[snafu(display("resolution task panicked"))]
    TaskJoin { source: tokio::task::JoinError },
}

/// A resolved token plus the located resource configuration.
#[derive(Debug)]
pub struct TokenAndConfig {
    pub token: String,
    pub config: Value,
}

/// Resolves the token and the resource config for `event` concurrently.
///
/// Both resolutions run as independent tasks. On success the call waits for
/// both; the first error wins and is returned immediately. The surviving
/// task is not cancelled, and a late result after an early failure is simply
/// discarded.
pub async fn token_and_config(
    locator: &ConfigLocator,
    tokens: &TokenClient,
    event: &Value,
) -> Result<TokenAndConfig, Error> {
    let config_task = tokio::spawn({
        let locator = locator.clone();
        let event = event.clone();
        async move { locator.locate(&event) }
    });
    let token_task = tokio::spawn({
        let tokens = tokens.clone();
        let event = event.clone();
        async move { tokens.resolve_from_event(&event).await }
    });

    let (config, token) = futures::try_join!(flatten(config_task), flatten(token_task))?;
    Ok(TokenAndConfig { token, config })
}

async fn flatten<T, E>(task: JoinHandle<Result<T, E>>) -> Result<T, Error>
where
    Error: From<E>,
{
    task.await.context(TaskJoinSnafu)?.map_err(Error::from)
}
