use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::logging::{LogLevel, SharedLogger};
use crate::translate::gemini_types::GeminiResponse;
use crate::translate::generic_types::GenericRequest;
use crate::translate::request::generic_to_gemini;
use crate::translate::response::{gemini_to_caller, CallerResponse, ResponseShape};
use crate::upstream::generate_content_url;

use bytes::Bytes;
use std::time::Instant;

/// Outcome of relaying one request.
pub enum RelayOutcome {
    Success(CallerResponse),
    /// Gemini answered with a non-success status; forwarded verbatim.
    Upstream {
        status: u16,
        content_type: Option<String>,
        body: Bytes,
    },
}

/// Forward a generic chat request to Gemini and translate the answer back.
pub async fn relay(
    req: &GenericRequest,
    api_key: &str,
    shape: ResponseShape,
    config: &RelayConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<RelayOutcome> {
    let (upstream_model, gemini_req) = generic_to_gemini(req, &config.models);
    let url = generate_content_url(&config.upstream.base_url, &upstream_model);

    logger.debug(
        "proxy",
        format!("Forwarding to Gemini: model={} (requested {})", upstream_model, req.model),
    );
    if logger.debug_enabled() {
        logger.debug(
            "proxy",
            format!("Payload: {}", serde_json::to_string(&gemini_req)?),
        );
    }

    let started = Instant::now();
    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .header("Content-Type", "application/json")
        .json(&gemini_req)
        .send()
        .await
        .map_err(|e| RelayError::gateway(e.to_string()))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .bytes()
        .await
        .map_err(|e| RelayError::gateway(e.to_string()))?;

    if !status.is_success() {
        logger.error(
            "proxy",
            format!(
                "Gemini error (status {}): {}",
                status.as_u16(),
                String::from_utf8_lossy(&body)
            ),
        );
        return Ok(RelayOutcome::Upstream {
            status: status.as_u16(),
            content_type,
            body,
        });
    }

    let gemini_resp = match serde_json::from_slice::<GeminiResponse>(&body) {
        Ok(r) => r,
        Err(e) => {
            logger.log_with_context(
                LogLevel::Warn,
                "proxy",
                format!("Unparseable Gemini response: {}", e),
                upstream_context(&body),
            );
            GeminiResponse::default()
        }
    };

    let created = chrono::Utc::now().timestamp();
    match gemini_to_caller(&gemini_resp, shape, &req.model, created) {
        Ok(resp) => {
            logger.debug(
                "proxy",
                format!("Success in {:?}", started.elapsed()),
            );
            Ok(RelayOutcome::Success(resp))
        }
        Err(e) => {
            logger.log_with_context(
                LogLevel::Error,
                "proxy",
                e.to_string(),
                upstream_context(&body),
            );
            Err(e)
        }
    }
}

fn upstream_context(body: &[u8]) -> serde_json::Value {
    serde_json::json!({ "upstream_body": String::from_utf8_lossy(body) })
}
