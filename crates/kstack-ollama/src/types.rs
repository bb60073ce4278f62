// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama HTTP API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/embed`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    pub model: String,
    pub input: Vec<String>,
}

/// Response body for `POST /api/embed`. Unused fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub embeddings: Vec<Vec<f32>>,
}

/// Response body for `GET /api/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Error body returned by Ollama on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_request_serializes_input_array() {
        let req = EmbedRequest {
            model: "all-minilm".into(),
            input: vec!["hello".into(), "world".into()],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "all-minilm");
        assert_eq!(json["input"][1], "world");
    }

    #[test]
    fn embed_response_ignores_extra_fields() {
        let body = r#"{"model":"all-minilm","embeddings":[[0.1,0.2]],"total_duration":14143917}"#;
        let resp: EmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.embeddings, vec![vec![0.1, 0.2]]);
        assert_eq!(resp.model.as_deref(), Some("all-minilm"));
    }

    #[test]
    fn error_body_parses() {
        let err: ApiErrorResponse =
            serde_json::from_str(r#"{"error":"model \"nope\" not found"}"#).unwrap();
        assert!(err.error.contains("not found"));
    }
}
