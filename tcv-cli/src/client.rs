//! HTTP client for the tcv-server API

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tcv_common::api_types::{
    AudioDetailResponse, AudioListResponse, CreateModelRequest, DeleteResponse, ErrorResponse,
    FeedbackListResponse, ImportCsvRequest, ImportCsvResponse, ModelListResponse, StatsResponse,
    SubmitFeedbackRequest, SubmitFeedbackResponse, UpdateModelRequest, UploadResponse,
};
use tcv_common::csv_row::CsvRow;
use tcv_common::{Audio, Model};
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("tcv-cli/", env!("CARGO_PKG_VERSION"));

/// Uploads can be large; everything else is quick
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx answer carrying the server's `{ error }` message
    #[error("Server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// One file ready to upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct TcvClient {
    http: reqwest::Client,
    base_url: String,
}

impl TcvClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(ClientError::Api { status, message })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    pub async fn list_models(&self) -> Result<ModelListResponse, ClientError> {
        self.json(self.http.get(self.url("/api/models"))).await
    }

    pub async fn create_model(&self, request: &CreateModelRequest) -> Result<Model, ClientError> {
        self.json(self.http.post(self.url("/api/models")).json(request)).await
    }

    pub async fn update_model(&self, id: &str, request: &UpdateModelRequest) -> Result<Model, ClientError> {
        self.json(self.http.patch(self.url(&format!("/api/models/{id}"))).json(request))
            .await
    }

    pub async fn delete_model(&self, id: &str) -> Result<DeleteResponse, ClientError> {
        self.json(self.http.delete(self.url(&format!("/api/models/{id}")))).await
    }

    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadResponse, ClientError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str(file.mime_type)?;
            form = form.part("files", part);
        }
        self.json(self.http.post(self.url("/api/upload")).multipart(form)).await
    }

    pub async fn list_audios(&self) -> Result<AudioListResponse, ClientError> {
        self.json(self.http.get(self.url("/api/upload"))).await
    }

    pub async fn get_audio(&self, id: &str) -> Result<AudioDetailResponse, ClientError> {
        self.json(self.http.get(self.url(&format!("/api/audio/{id}")))).await
    }

    pub async fn set_validated(&self, id: &str, validated: bool) -> Result<Audio, ClientError> {
        let body = serde_json::json!({ "is_validated": validated });
        self.json(self.http.patch(self.url(&format!("/api/audio/{id}"))).json(&body))
            .await
    }

    pub async fn import_csv(&self, model_id: &str, rows: Vec<CsvRow>) -> Result<ImportCsvResponse, ClientError> {
        let request = ImportCsvRequest {
            rows: Some(rows),
            model_id: Some(model_id.to_string()),
        };
        self.json(self.http.post(self.url("/api/import-csv")).json(&request)).await
    }

    /// Submit a vote; returns the response and the session id the server
    /// minted, if it set one
    pub async fn submit_feedback(
        &self,
        request: &SubmitFeedbackRequest,
        session_id: Option<&str>,
    ) -> Result<(SubmitFeedbackResponse, Option<String>), ClientError> {
        let mut builder = self.http.post(self.url("/api/feedback")).json(request);
        if let Some(session_id) = session_id {
            builder = builder.header(COOKIE, format!("session_id={session_id}"));
        }

        let response = self.send(builder).await?;
        let minted = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(session_from_set_cookie);
        if let Some(id) = &minted {
            debug!("Server assigned session {}", id);
        }

        let body = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok((body, minted))
    }

    pub async fn list_feedback(&self, audio_id: Option<&str>) -> Result<FeedbackListResponse, ClientError> {
        let mut builder = self.http.get(self.url("/api/feedback"));
        if let Some(audio_id) = audio_id {
            builder = builder.query(&[("audioId", audio_id)]);
        }
        self.json(builder).await
    }

    pub async fn stats(&self) -> Result<StatsResponse, ClientError> {
        self.json(self.http.get(self.url("/api/stats"))).await
    }
}

/// `session_id` value from a `Set-Cookie` header
fn session_from_set_cookie(header: &str) -> Option<String> {
    let first = header.split(';').next()?.trim();
    let (name, value) = first.split_once('=')?;
    (name == "session_id" && !value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_set_cookie() {
        assert_eq!(
            session_from_set_cookie("session_id=session_1_abc; HttpOnly; Path=/").as_deref(),
            Some("session_1_abc")
        );
        assert!(session_from_set_cookie("other=1; Path=/").is_none());
        assert!(session_from_set_cookie("session_id=; Path=/").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = TcvClient::new("http://localhost:5740/").unwrap();
        assert_eq!(client.url("/api/models"), "http://localhost:5740/api/models");
    }
}
