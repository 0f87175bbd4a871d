use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{Result, VidNavigatorError};
use crate::models::{
    AnalysisResponse, FileResponse, FileSearchResponse, FilesListResponse, FilesQuery,
    TranscriptResponse, UsageResponse, VideoSearchOptions, VideoSearchResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.vidnavigator.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_ENV: &str = "VIDNAVIGATOR_API_KEY";
const SDK_USER_AGENT: &str = concat!("vidnavigator-rust/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use vidnavigator::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> vidnavigator::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("vn_your_api_key")
///     .base_url("https://staging.example.com/v1")
///     .timeout(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: None,
        }
    }

    /// Set the API key. Takes precedence over `VIDNAVIGATOR_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the base URL (defaults to `https://api.vidnavigator.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout (defaults to 30 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Reuse an existing `reqwest::Client` instead of creating one.
    ///
    /// The SDK headers and timeout are applied to each request, so the
    /// injected client does not need to be configured for VidNavigator.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the [`Client`].
    ///
    /// If no API key was set via [`api_key`](Self::api_key), the builder
    /// reads the `VIDNAVIGATOR_API_KEY` environment variable.
    ///
    /// Returns [`VidNavigatorError::Authentication`] if no usable key is
    /// available. Nothing else happens before this check.
    pub fn build(self) -> Result<Client> {
        let api_key = resolve_api_key(self.api_key, std::env::var(API_KEY_ENV).ok())?;

        let mut key_value =
            HeaderValue::from_str(&api_key).map_err(|_| VidNavigatorError::Authentication {
                message: "API key contains characters that are not allowed in a header".into(),
            })?;
        key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_value);
        headers.insert(USER_AGENT, HeaderValue::from_static(SDK_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(VidNavigatorError::Request)?,
        };

        Ok(Client {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            headers,
            timeout: self.timeout,
            http,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the explicit key over the environment one. Empty strings count as
/// missing.
fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .filter(|k| !k.is_empty())
        .or_else(|| from_env.filter(|k| !k.is_empty()))
        .ok_or_else(|| VidNavigatorError::Authentication {
            message: "API key was not provided. Pass it to ClientBuilder::api_key() \
                      or set the VIDNAVIGATOR_API_KEY environment variable."
                .into(),
        })
}

/// Body of an outgoing request.
enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// The VidNavigator API client.
///
/// Use [`Client::new`] for quick construction or [`ClientBuilder`] for full
/// control. The client owns its connection pool; it is released when the
/// client is dropped or [`close`](Client::close)d.
///
/// # Example
///
/// ```no_run
/// use vidnavigator::Client;
///
/// # async fn example() -> vidnavigator::Result<()> {
/// let client = Client::new("vn_your_api_key")?;
///
/// let resp = client
///     .get_transcript("https://www.youtube.com/watch?v=dQw4w9WgXcQ", None)
///     .await?;
/// println!("{} segments", resp.data.transcript.len());
/// # Ok(())
/// # }
/// ```
pub struct Client {
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    http: reqwest::Client,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        debug!(base_url = %self.base_url, "client released");
    }
}

impl Client {
    /// Create a new client with the given API key and default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Transcripts
    // -----------------------------------------------------------------------

    /// Fetch the existing transcript of an online video (YouTube, Vimeo...).
    ///
    /// `language` is a two-letter ISO code; when `None` the server picks the
    /// default track.
    pub async fn get_transcript(
        &self,
        video_url: &str,
        language: Option<&str>,
    ) -> Result<TranscriptResponse> {
        let mut body = json!({ "video_url": video_url });
        insert_opt(&mut body, "language", language);
        self.request_typed(Method::POST, "/transcript", &[], Body::Json(body)).await
    }

    /// Transcribe an online video with speech-to-text.
    ///
    /// Used for platforms without ready-made captions, such as Instagram or
    /// TikTok.
    pub async fn transcribe_video(&self, video_url: &str) -> Result<TranscriptResponse> {
        let body = json!({ "video_url": video_url });
        self.request_typed(Method::POST, "/transcribe", &[], Body::Json(body)).await
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    /// List uploaded files, one page at a time.
    pub async fn get_files(&self, query: &FilesQuery) -> Result<FilesListResponse> {
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
            params.push(("status", status.to_string()));
        }
        self.request_typed(Method::GET, "/files", &params, Body::Empty).await
    }

    /// Details of a single file, with its transcript once processed.
    pub async fn get_file(&self, file_id: &str) -> Result<FileResponse> {
        self.request_typed(Method::GET, &format!("/file/{file_id}"), &[], Body::Empty).await
    }

    /// Upload a local audio or video file.
    ///
    /// With `wait_for_completion` the server only answers once processing
    /// has finished. Returns the raw JSON payload.
    ///
    /// # Errors
    ///
    /// - [`VidNavigatorError::FileNotFound`] if `path` is not a regular file;
    ///   no request is sent in that case.
    /// - [`VidNavigatorError::Io`] if the file cannot be opened.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        wait_for_completion: bool,
    ) -> Result<Value> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(VidNavigatorError::FileNotFound(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        debug!(file = %file_name, bytes = len, "uploading file");

        // Streamed from disk with a known length.
        let part = Part::stream_with_length(reqwest::Body::from(file), len).file_name(file_name);
        let form = Form::new()
            .text("wait_for_completion", wait_for_completion.to_string())
            .part("file", part);

        self.request(Method::POST, "/upload/file", &[], Body::Multipart(form)).await
    }

    /// Ask the server to process a failed file again.
    pub async fn retry_file_processing(&self, file_id: &str) -> Result<Value> {
        self.request(Method::POST, &format!("/file/{file_id}/retry"), &[], Body::Empty).await
    }

    /// Cancel an upload that is still being processed.
    pub async fn cancel_file_upload(&self, file_id: &str) -> Result<Value> {
        self.request(Method::POST, &format!("/file/{file_id}/cancel"), &[], Body::Empty).await
    }

    /// Permanently delete a file and its transcript.
    pub async fn delete_file(&self, file_id: &str) -> Result<Value> {
        self.request(Method::DELETE, &format!("/file/{file_id}/delete"), &[], Body::Empty).await
    }

    /// A (typically signed, short-lived) download URL for the file.
    pub async fn get_file_url(&self, file_id: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/file/{file_id}/url"), &[], Body::Empty).await
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    /// Summarize an online video, optionally answering `query` about it.
    pub async fn analyze_video(
        &self,
        video_url: &str,
        query: Option<&str>,
    ) -> Result<AnalysisResponse> {
        let mut body = json!({ "video_url": video_url });
        insert_opt(&mut body, "query", query);
        self.request_typed(Method::POST, "/analyze/video", &[], Body::Json(body)).await
    }

    /// Summarize an uploaded file, optionally answering `query` about it.
    pub async fn analyze_file(
        &self,
        file_id: &str,
        query: Option<&str>,
    ) -> Result<AnalysisResponse> {
        let mut body = json!({ "file_id": file_id });
        insert_opt(&mut body, "query", query);
        self.request_typed(Method::POST, "/analyze/file", &[], Body::Json(body)).await
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Search online videos.
    pub async fn search_videos(
        &self,
        query: &str,
        opts: &VideoSearchOptions,
    ) -> Result<VideoSearchResponse> {
        let mut body = json!({
            "query": query,
            "use_enhanced_search": opts.use_enhanced_search,
            "focus": opts.focus,
        });
        insert_opt(&mut body, "start_year", opts.start_year);
        insert_opt(&mut body, "end_year", opts.end_year);
        insert_opt(&mut body, "duration", opts.duration);
        self.request_typed(Method::POST, "/search/video", &[], Body::Json(body)).await
    }

    /// Search the transcripts of your uploaded files.
    pub async fn search_files(&self, query: &str) -> Result<FileSearchResponse> {
        let body = json!({ "query": query });
        self.request_typed(Method::POST, "/search/file", &[], Body::Json(body)).await
    }

    // -----------------------------------------------------------------------
    // System
    // -----------------------------------------------------------------------

    /// Current API usage and storage information.
    pub async fn get_usage(&self) -> Result<UsageResponse> {
        self.request_typed(Method::GET, "/usage", &[], Body::Empty).await
    }

    /// Server liveness. The endpoint does not need a key, but the usual
    /// headers are sent anyway.
    pub async fn health_check(&self) -> Result<Value> {
        self.request(Method::GET, "/health", &[], Body::Empty).await
    }

    /// Release the client and its pooled connections.
    ///
    /// Dropping the client has the same effect; this makes the end of its
    /// use explicit.
    pub fn close(self) {
        drop(self);
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Issue the request and hand back the response with its body unread.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "sending request");

        let mut req = self
            .http
            .request(method, &url)
            .headers(self.headers.clone())
            .timeout(self.timeout);

        if !query.is_empty() {
            req = req.query(query);
        }

        req = match body {
            Body::Empty => req,
            Body::Json(value) => req.json(&value),
            Body::Multipart(form) => req.multipart(form),
        };

        Ok(req.send().await?)
    }

    /// Send a request and return the JSON payload of a 2xx response, or the
    /// typed error for any other status.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<Value> {
        let response = self.send(method, path, query, body).await?;
        let status = response.status();
        debug!(status = status.as_u16(), path, "received response");

        let text = response.text().await?;
        let payload = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(status = status.as_u16(), path, error = %e, "response body is not JSON");
                json!({ "status": "error", "message": text })
            }
        };

        if status.is_success() {
            return Ok(payload);
        }

        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .or_else(|| status.canonical_reason())
            .unwrap_or("unknown error")
            .to_string();

        Err(VidNavigatorError::from_status(status.as_u16(), message))
    }

    async fn request_typed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<T> {
        let payload = self.request(method, path, query, body).await?;
        Ok(serde_json::from_value(payload)?)
    }
}

/// Add `key` to a JSON object body unless `value` is absent or an empty
/// string.
fn insert_opt<T: Into<Value>>(body: &mut Value, key: &str, value: Option<T>) {
    let Some(value) = value.map(Into::into) else {
        return;
    };
    if value.as_str().is_some_and(str::is_empty) {
        return;
    }
    if let Some(map) = body.as_object_mut() {
        map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins_over_env() {
        let key = resolve_api_key(Some("explicit".into()), Some("from-env".into())).unwrap();
        assert_eq!(key, "explicit");
    }

    #[test]
    fn env_key_used_when_no_explicit_key() {
        let key = resolve_api_key(None, Some("from-env".into())).unwrap();
        assert_eq!(key, "from-env");

        let key = resolve_api_key(Some(String::new()), Some("from-env".into())).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn missing_key_is_authentication_error() {
        let err = resolve_api_key(None, None).unwrap_err();
        assert!(matches!(err, VidNavigatorError::Authentication { .. }));

        let err = resolve_api_key(Some(String::new()), Some(String::new())).unwrap_err();
        assert!(matches!(err, VidNavigatorError::Authentication { .. }));
    }

    #[test]
    fn key_with_newline_is_rejected() {
        let err = ClientBuilder::new().api_key("bad\nkey").build().unwrap_err();
        assert!(matches!(err, VidNavigatorError::Authentication { .. }));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ClientBuilder::new()
            .api_key("k")
            .base_url("http://localhost:8080/v1/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn debug_output_hides_key() {
        let client = Client::new("secret-key").unwrap();
        assert!(!format!("{client:?}").contains("secret-key"));
    }

    #[test]
    fn insert_opt_skips_none_and_empty() {
        let mut body = json!({ "video_url": "https://x" });
        insert_opt(&mut body, "language", None::<&str>);
        insert_opt(&mut body, "query", Some(""));
        assert_eq!(body, json!({ "video_url": "https://x" }));

        insert_opt(&mut body, "start_year", Some(2020));
        assert_eq!(body, json!({ "video_url": "https://x", "start_year": 2020 }));
    }
}
