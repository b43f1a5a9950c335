//! reqwest-backed implementation of [`AnalysisBackend`].

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::backend::{AnalysisBackend, BoxFuture};
use crate::error::{FetchError, FetchResult, MalformedSnafu, ServerSnafu, UnreachableSnafu};
use crate::ids::{ImageId, VideoId};
use crate::resource::{DEFAULT_BASE_URL, DeleteTarget, Endpoints, FileRef, Resource, Upload};
use crate::types::{
    CheckedResponse, FrameRecord, ImageAnalysis, ImageDetail, ImageHistory, ImageHistoryEntry,
    VideoAnalysis, VideoAnalysisRecord, VideoHistory, VideoHistoryEntry,
};

/// Video analysis runs inference on every sampled frame, so the ceiling is generous.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// HTTP client for one analysis service instance.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoints: Endpoints,
    request_timeout: Duration,
}

struct RawResponse {
    url: String,
    status: u16,
    body: Vec<u8>,
}

impl HttpBackend {
    /// Builds a client whose every request is bounded by `config.request_timeout`.
    pub fn new(config: BackendConfig) -> FetchResult<Self> {
        let endpoints = Endpoints::new(&config.base_url);
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| {
                UnreachableSnafu {
                    stage: "build-client",
                    url: endpoints.base_url(),
                    message: source.to_string(),
                }
                .build()
            })?;

        Ok(Self {
            client,
            endpoints,
            request_timeout: config.request_timeout,
        })
    }

    /// Fetches and decodes a JSON resource.
    pub async fn fetch<T>(&self, resource: Resource) -> FetchResult<T>
    where
        T: DeserializeOwned + CheckedResponse,
    {
        let raw = self.send(resource, None).await?;
        decode_response(resource.stage(), &raw.url, raw.status, &raw.body)
    }

    async fn fetch_with_form<T>(&self, resource: Resource, form: Form) -> FetchResult<T>
    where
        T: DeserializeOwned + CheckedResponse,
    {
        let raw = self.send(resource, Some(form)).await?;
        decode_response(resource.stage(), &raw.url, raw.status, &raw.body)
    }

    async fn send(&self, resource: Resource, form: Option<Form>) -> FetchResult<RawResponse> {
        let stage = resource.stage();
        let url = self.endpoints.url(&resource);
        tracing::debug!(method = %resource.method(), %url, "sending request");

        let mut request = self.client.request(resource.method(), &url);
        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request
            .send()
            .await
            .map_err(|source| self.transport_error(stage, &url, &source))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(stage, &url, &source))?;

        if !(200..300).contains(&status) {
            tracing::warn!(stage, %url, status, "service returned a non-success status");
        }

        Ok(RawResponse {
            url,
            status,
            body: body.to_vec(),
        })
    }

    fn transport_error(&self, stage: &'static str, url: &str, source: &reqwest::Error) -> FetchError {
        let message = if source.is_timeout() {
            format!("request timed out after {}s", self.request_timeout.as_secs())
        } else {
            source.to_string()
        };
        tracing::warn!(stage, url, %message, "request failed before a response arrived");
        UnreachableSnafu {
            stage,
            url,
            message,
        }
        .build()
    }

    fn upload_form(&self, resource: Resource, upload: &Upload) -> FetchResult<Form> {
        let part = Part::bytes(upload.bytes().to_vec())
            .file_name(upload.file_name().to_string())
            .mime_str(upload.content_type())
            .map_err(|source| {
                MalformedSnafu {
                    stage: "build-upload-form",
                    url: self.endpoints.url(&resource),
                    details: source.to_string(),
                }
                .build()
            })?;
        Ok(Form::new().part("file", part))
    }
}

impl AnalysisBackend for HttpBackend {
    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn analyze_image<'a>(&'a self, upload: &'a Upload) -> BoxFuture<'a, FetchResult<ImageAnalysis>> {
        Box::pin(async move {
            let form = self.upload_form(Resource::AnalyzeImage, upload)?;
            self.fetch_with_form(Resource::AnalyzeImage, form).await
        })
    }

    fn analyze_video<'a>(
        &'a self,
        upload: &'a Upload,
        frame_interval: u32,
    ) -> BoxFuture<'a, FetchResult<VideoAnalysis>> {
        Box::pin(async move {
            let form = self
                .upload_form(Resource::AnalyzeVideo, upload)?
                .text("frame_interval", frame_interval.to_string());
            self.fetch_with_form(Resource::AnalyzeVideo, form).await
        })
    }

    fn list_images(&self) -> BoxFuture<'_, FetchResult<Vec<ImageHistoryEntry>>> {
        Box::pin(async move {
            let history: ImageHistory = self.fetch(Resource::ListImages).await?;
            Ok(history.images)
        })
    }

    fn list_videos(&self) -> BoxFuture<'_, FetchResult<Vec<VideoHistoryEntry>>> {
        Box::pin(async move {
            let history: VideoHistory = self.fetch(Resource::ListVideos).await?;
            Ok(history.videos)
        })
    }

    fn image_detail(&self, id: ImageId) -> BoxFuture<'_, FetchResult<ImageDetail>> {
        Box::pin(self.fetch(Resource::ImageDetail(id)))
    }

    fn video_detail(&self, id: VideoId) -> BoxFuture<'_, FetchResult<VideoAnalysisRecord>> {
        Box::pin(self.fetch(Resource::VideoDetail(id)))
    }

    fn frame_analysis(
        &self,
        video: VideoId,
        frame_number: u64,
    ) -> BoxFuture<'_, FetchResult<FrameRecord>> {
        Box::pin(self.fetch(Resource::FrameDetail {
            video,
            frame_number,
        }))
    }

    fn delete(&self, target: DeleteTarget) -> BoxFuture<'_, FetchResult<()>> {
        Box::pin(async move {
            let resource = target.resource();
            let raw = self.send(resource, None).await?;
            // Success bodies carry only a confirmation string.
            ensure_success(resource.stage(), raw.status, &raw.body)
        })
    }

    fn fetch_file(&self, file: FileRef) -> BoxFuture<'_, FetchResult<Vec<u8>>> {
        Box::pin(async move {
            let resource = file.resource();
            let raw = self.send(resource, None).await?;
            ensure_success(resource.stage(), raw.status, &raw.body)?;
            Ok(raw.body)
        })
    }
}

/// Maps a completed response onto the fetch taxonomy.
pub fn decode_response<T>(stage: &'static str, url: &str, status: u16, body: &[u8]) -> FetchResult<T>
where
    T: DeserializeOwned + CheckedResponse,
{
    ensure_success(stage, status, body)?;

    let value: T = serde_json::from_slice(body).map_err(|source| {
        tracing::warn!(stage, url, %source, "response body did not decode");
        MalformedSnafu {
            stage,
            url,
            details: source.to_string(),
        }
        .build()
    })?;

    if let Some(details) = value.invariant_violation() {
        tracing::warn!(stage, url, %details, "response violates record invariants");
        return MalformedSnafu {
            stage,
            url,
            details,
        }
        .fail();
    }

    Ok(value)
}

pub fn ensure_success(stage: &'static str, status: u16, body: &[u8]) -> FetchResult<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    ServerSnafu {
        stage,
        status,
        detail: server_detail(body),
    }
    .fail()
}

/// Extracts a usable `detail` string from an error body.
///
/// Non-JSON bodies, missing keys and non-string details (validation error lists)
/// all yield `None` so the caller's fallback message is shown instead.
fn server_detail(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        detail: Option<serde_json::Value>,
    }

    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}
