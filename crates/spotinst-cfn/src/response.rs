//! Spot API response validation and dispatch.

use http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Everything known about one Spot API call at validation time.
#[derive(Debug)]
pub struct SpotResponse {
    /// HTTP status returned by the Spot API.
    pub status: StatusCode,

    /// Parsed response body.
    pub body: Value,

    /// The CloudFormation event that triggered the call.
    pub event: Value,

    /// The invocation context of the surrounding framework.
    pub context: Value,

    /// Resource name, used in failure reports.
    pub resource: String,

    /// Action name, used in failure reports.
    pub action: String,
}

/// Completion capability owned by the surrounding framework.
///
/// Invoked when a failed response has no dedicated failure handler; this is
/// the only path that ultimately communicates failure back to
/// CloudFormation.
pub trait CompletionReporter {
    fn done(&self, error: &str, event: &Value, context: &Value);
}

/// Per-error detail in a Spot failure body.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    response: ErrorBodyResponse,
}

#[derive(Debug, Deserialize)]
struct ErrorBodyResponse {
    errors: Vec<ApiError>,
}

/// Dispatches on the response status.
///
/// Statuses up to 201 go to `on_success`. Anything above goes to
/// `on_failure` when one is supplied, otherwise the failure is reported
/// through `reporter` as `"<resource> <action> failed: <message>"`.
pub fn validate_response<S, F, R>(
    spot_response: &SpotResponse,
    on_success: S,
    on_failure: Option<F>,
    reporter: &R,
) where
    S: FnOnce(&SpotResponse),
    F: FnOnce(&SpotResponse),
    R: CompletionReporter + ?Sized,
{
    tracing::debug!(body = %spot_response.body, "Spot API response");

    if spot_response.status.as_u16() > 201 {
        if let Some(on_failure) = on_failure {
            on_failure(spot_response);
        } else {
            let SpotResponse {
                event,
                context,
                resource,
                action,
                ..
            } = spot_response;
            let message = error_message(spot_response);
            reporter.done(&format!("{resource} {action} failed: {message}"), event, context);
        }
    } else {
        on_success(spot_response);
    }
}

/// One `code: message` line per API error, or the raw status code when the
/// body does not carry a parsable error list.
fn error_message(spot_response: &SpotResponse) -> String {
    match ErrorBody::deserialize(&spot_response.body) {
        Ok(body) => body
            .response
            .errors
            .iter()
            .map(|ApiError { code, message }| format!("{code}: {message}\n"))
            .collect(),
        Err(_) => spot_response.status.as_u16().to_string(),
    }
}
