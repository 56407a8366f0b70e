//! HTTP client for the Gemini long-running-operation API (Veo video generation).

use crate::extract::operation_status;
use crate::http::{success_text, transport_error};
use archviz_types::{
    GenerateVideoRequest, JobId, OperationClient, OperationError, OperationStatus,
};
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "veo-3.0-generate-preview";
pub const API_KEY_HEADER: &str = "x-goog-api-key";

const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(60);

/// Client that starts video generations and reads their operations.
pub struct GeminiOperationClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiOperationClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }

    /// Bound for every status-check and start request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The operation name is interpolated as-is; upstream names are path-safe.
    fn operation_url(&self, operation_name: &str) -> String {
        format!("{}/{}", self.base_url, operation_name.trim_start_matches('/'))
    }

    fn predict_url(&self) -> String {
        format!("{}/models/{}:predictLongRunning", self.base_url, self.model)
    }
}

/// Request body for `predictLongRunning`. The reference image goes in `instances[0].image`.
fn predict_body(req: &GenerateVideoRequest) -> Value {
    let mut instance = Map::new();
    instance.insert("prompt".into(), json!(req.prompt));
    if let Some(ref image) = req.image {
        instance.insert(
            "image".into(),
            json!({ "bytesBase64Encoded": image.data, "mimeType": image.mime_type }),
        );
    }
    let mut parameters = Map::new();
    if let Some(ref ratio) = req.aspect_ratio {
        parameters.insert("aspectRatio".into(), json!(ratio));
    }
    if let Some(ref negative) = req.negative_prompt {
        parameters.insert("negativePrompt".into(), json!(negative));
    }
    let mut body = json!({ "instances": [Value::Object(instance)] });
    if !parameters.is_empty() {
        body["parameters"] = Value::Object(parameters);
    }
    body
}

fn parse_json(body: &str) -> Result<Value, OperationError> {
    serde_json::from_str(body).map_err(|e| OperationError::DataShape(format!("invalid JSON: {}", e)))
}

#[async_trait::async_trait]
impl OperationClient for GeminiOperationClient {
    async fn check_status(&self, operation_name: &str) -> Result<OperationStatus, OperationError> {
        let res = self
            .client
            .get(self.operation_url(operation_name))
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;
        let body = success_text(res).await?;
        let status = operation_status(&parse_json(&body)?)?;
        tracing::debug!(
            operation = operation_name,
            done = matches!(status, OperationStatus::Done { .. }),
            "operation status checked"
        );
        Ok(status)
    }

    async fn start_generation(&self, req: &GenerateVideoRequest) -> Result<JobId, OperationError> {
        let res = self
            .client
            .post(self.predict_url())
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .json(&predict_body(req))
            .send()
            .await
            .map_err(transport_error)?;
        let body = success_text(res).await?;
        let name = parse_json(&body)?
            .get("name")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                OperationError::DataShape("predictLongRunning response has no name".to_string())
            })?;
        tracing::info!(operation = %name, model = %self.model, "video generation started");
        Ok(name)
    }
}
