use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use wordlens_logging::wl_debug;

use crate::types::{AddReply, UploadReply, WordsReply};
use crate::{
    MarkParams, MarkRecord, NounRecord, OccurrenceRecord, StatusRecord, ToggleReply,
    TransportError, TransportFailure,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_download_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Every request the client makes against the analysis service.
#[async_trait::async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn upload(&self, file: &Path) -> Result<String, TransportError>;
    async fn job_status(&self, job_id: &str) -> Result<StatusRecord, TransportError>;
    async fn terms(
        &self,
        job_id: &str,
        query: Option<&str>,
        sort: &str,
    ) -> Result<Vec<NounRecord>, TransportError>;
    async fn occurrences(
        &self,
        job_id: &str,
        term: &str,
    ) -> Result<Vec<OccurrenceRecord>, TransportError>;
    async fn toggle_mark(
        &self,
        job_id: &str,
        mark: &MarkParams,
    ) -> Result<ToggleReply, TransportError>;
    async fn marks(&self, job_id: &str) -> Result<Vec<MarkRecord>, TransportError>;
    /// `Ok(false)` means the word was already in the dictionary.
    async fn add_word(&self, word: &str) -> Result<bool, TransportError>;
    async fn words(&self) -> Result<Vec<String>, TransportError>;
    async fn remove_word(&self, word: &str) -> Result<(), TransportError>;
    async fn download_dictionary(&self) -> Result<Vec<u8>, TransportError>;
    async fn replace_dictionary(&self, file: &Path) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, TransportError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| TransportError::new(TransportFailure::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::new(
                TransportFailure::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(TransportFailure::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    /// `{base}/api/{segments..}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let message = error_message(status.as_u16(), &body);
        wl_debug!("service answered {}: {}", status.as_u16(), message);
        Err(TransportError::new(
            TransportFailure::HttpStatus(status.as_u16()),
            message,
        ))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| TransportError::new(TransportFailure::Decode, err.to_string()))
    }

    async fn file_form(&self, file: &Path) -> Result<Form, TransportError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|err| TransportError::new(TransportFailure::Io, err.to_string()))?;
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Form::new().part("file", Part::bytes(bytes).file_name(name)))
    }
}

#[async_trait::async_trait]
impl AnalysisApi for ReqwestApi {
    async fn upload(&self, file: &Path) -> Result<String, TransportError> {
        let form = self.file_form(file).await?;
        let url = self.endpoint(&["upload"]);
        let reply: UploadReply = self
            .send_json(self.client.post(url).multipart(form))
            .await?;
        Ok(reply.job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusRecord, TransportError> {
        let url = self.endpoint(&["jobs", job_id, "status"]);
        self.send_json(self.client.get(url)).await
    }

    async fn terms(
        &self,
        job_id: &str,
        query: Option<&str>,
        sort: &str,
    ) -> Result<Vec<NounRecord>, TransportError> {
        let mut url = self.endpoint(&["jobs", job_id, "nouns"]);
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(query) = query {
                pairs.append_pair("query", query);
            }
            pairs.append_pair("sort", sort);
        }
        self.send_json(self.client.get(url)).await
    }

    async fn occurrences(
        &self,
        job_id: &str,
        term: &str,
    ) -> Result<Vec<OccurrenceRecord>, TransportError> {
        let url = self.endpoint(&["jobs", job_id, "nouns", term, "occurrences"]);
        self.send_json(self.client.get(url)).await
    }

    async fn toggle_mark(
        &self,
        job_id: &str,
        mark: &MarkParams,
    ) -> Result<ToggleReply, TransportError> {
        let mut url = self.endpoint(&["jobs", job_id, "marks", "toggle"]);
        url.query_pairs_mut()
            .append_pair("noun", &mark.noun)
            .append_pair("page", &mark.page.to_string())
            .append_pair("line", &mark.line.to_string())
            .append_pair("sentence", &mark.sentence);
        self.send_json(self.client.post(url)).await
    }

    async fn marks(&self, job_id: &str) -> Result<Vec<MarkRecord>, TransportError> {
        let url = self.endpoint(&["jobs", job_id, "marks"]);
        self.send_json(self.client.get(url)).await
    }

    async fn add_word(&self, word: &str) -> Result<bool, TransportError> {
        let mut url = self.endpoint(&["dict", "add"]);
        url.query_pairs_mut().append_pair("word", word);
        let reply: AddReply = self.send_json(self.client.post(url)).await?;
        Ok(reply.added)
    }

    async fn words(&self) -> Result<Vec<String>, TransportError> {
        let url = self.endpoint(&["dict", "words"]);
        let reply: WordsReply = self.send_json(self.client.get(url)).await?;
        Ok(reply.words)
    }

    async fn remove_word(&self, word: &str) -> Result<(), TransportError> {
        let mut url = self.endpoint(&["dict", "words"]);
        url.query_pairs_mut().append_pair("word", word);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn download_dictionary(&self) -> Result<Vec<u8>, TransportError> {
        let max_bytes = self.settings.max_download_bytes;
        let too_large = || {
            TransportError::new(
                TransportFailure::TooLarge { max_bytes },
                "dictionary too large",
            )
        };
        let url = self.endpoint(&["dict"]);
        let response = self.send(self.client.get(url)).await?;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(too_large());
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn replace_dictionary(&self, file: &Path) -> Result<(), TransportError> {
        let form = self.file_form(file).await?;
        let url = self.endpoint(&["dict"]);
        self.send(self.client.post(url).multipart(form)).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Human-readable text for a non-success response body.
fn error_message(status: u16, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.detail);
    match detail {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        Some(Value::String(_)) | Some(Value::Null) | None => format!("HTTP {status}"),
        Some(other) => other.to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportFailure::Timeout, err.to_string());
    }
    if err.is_decode() {
        return TransportError::new(TransportFailure::Decode, err.to_string());
    }
    TransportError::new(TransportFailure::Network, err.to_string())
}
