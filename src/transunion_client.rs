use crate::config::TransunionConfig;
use crate::errors::AppError;
use crate::models::{LeadQuery, LeadRecord};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;

/// Client for the Transunion lead lookup endpoint.
///
/// Sends one JSON POST per lookup and hands back the nested lead record.
/// No retries: transport and shape faults go straight back to the caller.
#[derive(Clone)]
pub struct TransunionClient {
    client: reqwest::Client,
    endpoint_url: String,
}

impl TransunionClient {
    /// Creates a new `TransunionClient`.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, extra headers and optional timeout.
    pub fn new(config: &TransunionConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                AppError::InternalError(format!("Invalid header name '{}': {}", name, e))
            })?;
            let mut value = HeaderValue::from_str(value).map_err(|e| {
                AppError::InternalError(format!("Invalid value for header '{}': {}", name, e))
            })?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create Transunion client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
        })
    }

    /// Looks up a lead.
    ///
    /// # Arguments
    ///
    /// * `query` - Identifiers sent verbatim as the JSON request body.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The value at `transaction.output`.
    /// * `Ok(None)` - The provider had no match (path missing or null).
    /// * `Err(_)` - Transport failure, non-JSON body (with the status in the
    ///   message when it was not a success) or unexpected top-level shape.
    ///
    /// A JSON body is read for `transaction.output` whatever the status code.
    pub async fn fetch(&self, query: &LeadQuery) -> Result<Option<LeadRecord>, AppError> {
        tracing::info!(
            "Looking up lead at Transunion with params: {:?}",
            query.keys()
        );

        let response = self
            .client
            .post(&self.endpoint_url)
            .json(query)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        // No-match can arrive with a 4xx status and a JSON body.
        let body: Value = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(AppError::ExternalApiError(format!(
                    "Failed to parse Transunion response: {}",
                    e
                )))
            }
            Err(_) => {
                return Err(AppError::ExternalApiError(format!(
                    "Transunion returned {}: {}",
                    status,
                    String::from_utf8_lossy(&bytes)
                )))
            }
        };

        if !status.is_success() {
            tracing::warn!("Transunion returned {} with a JSON body", status);
        }

        let record = extract_lead_record(body)?;
        if record.is_none() {
            tracing::info!("Transunion returned no lead for this query");
        }
        Ok(record)
    }
}

/// Pulls `transaction.output` out of a parsed response body.
///
/// A missing or null `transaction` or `output` is a no-match, not an error.
pub fn extract_lead_record(body: Value) -> Result<Option<LeadRecord>, AppError> {
    let mut root = match body {
        Value::Object(root) => root,
        other => {
            return Err(AppError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )))
        }
    };

    let mut transaction = match root.remove("transaction") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(t)) => t,
        Some(other) => {
            return Err(AppError::MalformedResponse(format!(
                "'transaction' should be an object, got {}",
                json_type(&other)
            )))
        }
    };

    match transaction.remove("output") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(output)) => Ok(Some(LeadRecord::from(output))),
        Some(other) => Err(AppError::MalformedResponse(format!(
            "'transaction.output' should be an object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
