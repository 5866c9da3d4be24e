use super::NodeContext;
use crate::error::CallError;
use crate::graph::{ApiConfig, AuthConfig, DatabaseConfig, DatabaseType};
use crate::router::{ERROR_HANDLE, SUCCESS_HANDLE};
use crate::runner::{FailureReason, LogLevel, Outcome};
use crate::transport::{DatabaseRequest, HttpRequest, HttpResponse};
use crate::variables::Value;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

enum Attempt<T> {
    Succeeded(T),
    Failed(CallError),
    Cancelled,
}

/// Runs `call` up to `attempts` times with no delay between attempts, checking the
/// cancel token before and after each one. Errors that are not retryable stop immediately.
fn with_retries<T>(
    ctx: &NodeContext,
    attempts: u32,
    mut call: impl FnMut() -> Result<T, CallError>,
) -> Attempt<T> {
    let mut attempt = 1;
    loop {
        if ctx.cancel.is_cancelled() {
            return Attempt::Cancelled;
        }
        let result = call();
        // A result that arrives after cancellation must not reach the variables.
        if ctx.cancel.is_cancelled() {
            debug!(node_id = ctx.node_id, attempt, "Discarding call result after cancellation");
            return Attempt::Cancelled;
        }
        match result {
            Ok(value) => return Attempt::Succeeded(value),
            Err(error) => {
                warn!(
                    node_id = ctx.node_id,
                    attempt,
                    attempts,
                    error = %error,
                    "External call failed"
                );
                if attempt >= attempts || !error.is_retryable() {
                    return Attempt::Failed(error);
                }
                attempt += 1;
            }
        }
    }
}

fn attempts_for(ctx: &NodeContext, retries: u32) -> u32 {
    retries.min(ctx.config.max_retries) + 1
}

/// Takes the `"error"` edge if the node has one, otherwise fails the run.
fn fail(
    ctx: &mut NodeContext,
    error: CallError,
    status_variable: Option<&str>,
    error_variable: Option<&str>,
) -> Outcome {
    let message = error.to_string();
    ctx.log(
        LogLevel::Warn,
        format!("external call at '{}' gave up: {}", ctx.node_id, message),
    );

    if !ctx.has_handle(ERROR_HANDLE) {
        return Outcome::failed(FailureReason::ExternalCallFailed {
            node_id: ctx.node_id.to_string(),
            message,
        });
    }

    if let (Some(name), Some(status)) = (status_variable, error.status()) {
        ctx.variables.set(name, f64::from(status));
    }
    if let Some(name) = error_variable {
        ctx.variables.set(name, message);
    }
    Outcome::advance(ERROR_HANDLE)
}

// --- API / Webhook ---

pub(super) fn call_api(ctx: &mut NodeContext, config: &ApiConfig) -> Outcome {
    let request = build_http_request(ctx, config);
    let attempts = attempts_for(ctx, config.retries);

    let services = ctx.services;
    let result = match services.http.as_deref() {
        Some(client) => with_retries(ctx, attempts, || {
            let response = client.send(&request)?;
            if response.is_success() {
                Ok(response)
            } else {
                Err(CallError::Status {
                    status: response.status,
                    body: response.body,
                })
            }
        }),
        None => Attempt::Failed(CallError::Unsupported(
            "no HTTP client is configured".to_string(),
        )),
    };

    match result {
        Attempt::Succeeded(response) => {
            store_response(ctx, config, response);
            Outcome::advance(SUCCESS_HANDLE)
        }
        Attempt::Failed(error) => fail(
            ctx,
            error,
            config.status_variable.as_deref(),
            config.error_variable.as_deref(),
        ),
        Attempt::Cancelled => Outcome::failed(FailureReason::Cancelled),
    }
}

fn build_http_request(ctx: &NodeContext, config: &ApiConfig) -> HttpRequest {
    let mut headers: Vec<(String, String)> = config
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), ctx.render(value)))
        .collect();

    if let Some(auth) = &config.auth {
        headers.push(match auth {
            AuthConfig::Bearer { token } => (
                "Authorization".to_string(),
                format!("Bearer {}", ctx.render(token)),
            ),
            AuthConfig::Basic { username, password } => {
                let credentials = format!("{}:{}", ctx.render(username), ctx.render(password));
                (
                    "Authorization".to_string(),
                    format!("Basic {}", STANDARD.encode(credentials)),
                )
            }
            AuthConfig::ApiKey { header, value } => (header.clone(), ctx.render(value)),
        });
    }

    let body = ctx.render_opt(config.body.as_deref());
    let has_content_type = headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
    if body.is_some() && !has_content_type {
        let content_type = config
            .content_type
            .clone()
            .unwrap_or_else(|| "application/json".to_string());
        headers.push(("Content-Type".to_string(), content_type));
    }

    HttpRequest {
        method: config.method,
        url: ctx.render(&config.url),
        headers,
        body,
        timeout_ms: config.timeout_ms.unwrap_or(ctx.config.default_timeout_ms),
    }
}

fn store_response(ctx: &mut NodeContext, config: &ApiConfig, response: HttpResponse) {
    debug!(node_id = ctx.node_id, status = response.status, "External call succeeded");
    if let Some(name) = &config.status_variable {
        ctx.variables.set(name.as_str(), f64::from(response.status));
    }
    if let Some(name) = &config.response_variable {
        let value = match serde_json::from_str::<JsonValue>(&response.body) {
            Ok(json) => Value::from(json),
            Err(_) => Value::Text(response.body),
        };
        ctx.variables.set(name.as_str(), value);
    }
}

// --- Database ---

pub(super) fn call_database(ctx: &mut NodeContext, config: &DatabaseConfig) -> Outcome {
    let request = match build_database_request(ctx, config) {
        Ok(request) => request,
        Err(error) => return fail(ctx, error, None, config.error_variable.as_deref()),
    };
    let attempts = attempts_for(ctx, config.retries);
    let timeout_ms = config.timeout_ms.unwrap_or(ctx.config.default_timeout_ms);

    let services = ctx.services;
    let result = match services.database.as_deref() {
        Some(client) => with_retries(ctx, attempts, || client.execute(&request, timeout_ms)),
        None => Attempt::Failed(CallError::Unsupported(
            "no database client is configured".to_string(),
        )),
    };

    match result {
        Attempt::Succeeded(json) => {
            debug!(node_id = ctx.node_id, "Database call succeeded");
            if let Some(name) = &config.response_variable {
                ctx.variables.set(name.as_str(), Value::from(json));
            }
            Outcome::advance(SUCCESS_HANDLE)
        }
        Attempt::Failed(error) => fail(ctx, error, None, config.error_variable.as_deref()),
        Attempt::Cancelled => Outcome::failed(FailureReason::Cancelled),
    }
}

fn build_database_request(
    ctx: &NodeContext,
    config: &DatabaseConfig,
) -> Result<DatabaseRequest, CallError> {
    match config.database_type {
        DatabaseType::Document => Ok(DatabaseRequest::Document {
            operation: config.operation,
            collection: ctx.render(config.collection.as_deref().unwrap_or_default()),
            filter: render_json(ctx, config.filter.as_deref(), "filter")?,
            document: render_json(ctx, config.document.as_deref(), "document")?,
        }),
        DatabaseType::Relational => Ok(DatabaseRequest::Relational {
            query: config.query.clone().unwrap_or_default(),
            params: config.params.iter().map(|p| ctx.render(p)).collect(),
        }),
    }
}

/// Substitutes a JSON template, then parses it. An absent template is an empty object.
fn render_json(
    ctx: &NodeContext,
    template: Option<&str>,
    field: &str,
) -> Result<JsonValue, CallError> {
    let Some(template) = template.filter(|t| !t.trim().is_empty()) else {
        return Ok(JsonValue::Object(Default::default()));
    };
    serde_json::from_str(&ctx.render(template))
        .map_err(|e| CallError::MalformedPayload(format!("`{}` is not valid JSON: {}", field, e)))
}
