//! Upstream label source client and shared HTTP utilities.

use reqwest::header::HeaderValue;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use crate::config::HttpSettings;
use crate::error::LabelGateError;

pub(crate) mod openfda;
pub(crate) mod trace;

const ERROR_BODY_MAX_BYTES: usize = 2048;
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Builds the outbound HTTP client with request tracing middleware.
///
/// The process entry point owns the client; clones share one connection pool.
///
/// # Errors
///
/// Returns an error when the underlying reqwest client cannot be constructed.
pub fn http_client(settings: &HttpSettings) -> Result<ClientWithMiddleware, LabelGateError> {
    let base_client = reqwest::Client::builder()
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .pool_max_idle_per_host(settings.pool_max_idle_per_host)
        .user_agent(concat!("labelgate/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(LabelGateError::HttpClientInit)?;

    Ok(ClientBuilder::new(base_client)
        .with(trace::OutboundTraceMiddleware)
        .build())
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let full = String::from_utf8_lossy(bytes);

    let truncated: &str = if full.len() > ERROR_BODY_MAX_BYTES {
        let mut end = ERROR_BODY_MAX_BYTES;
        while end > 0 && !full.is_char_boundary(end) {
            end -= 1;
        }
        &full[..end]
    } else {
        full.as_ref()
    };

    let mut s = truncated.trim().replace(['\n', '\r', '\t'], " ");
    if full.len() > ERROR_BODY_MAX_BYTES {
        s.push_str(" …");
    }
    s
}

/// Accepts a missing header or a JSON media type; anything else is an upstream error.
pub(crate) fn ensure_json_content_type(
    api: &str,
    content_type: Option<&HeaderValue>,
    body: &[u8],
) -> Result<(), LabelGateError> {
    let Some(content_type) = content_type else {
        return Ok(());
    };

    let raw = String::from_utf8_lossy(content_type.as_bytes());
    let media_type = raw
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_ascii_lowercase();
    if media_type.is_empty() || media_type == "application/json" || media_type.ends_with("+json") {
        return Ok(());
    }

    Err(LabelGateError::Api {
        api: api.to_string(),
        message: format!(
            "Unexpected content-type {}: {}",
            raw.trim(),
            body_excerpt(body)
        ),
    })
}

pub(crate) async fn read_limited_body(
    mut resp: reqwest::Response,
    api: &str,
) -> Result<Vec<u8>, LabelGateError> {
    let mut body: Vec<u8> = Vec::new();

    while let Some(chunk) = resp.chunk().await? {
        let next_len = body.len().saturating_add(chunk.len());
        if next_len > DEFAULT_MAX_BODY_BYTES {
            return Err(LabelGateError::Api {
                api: api.to_string(),
                message: format!("Response body exceeded {DEFAULT_MAX_BODY_BYTES} bytes"),
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
