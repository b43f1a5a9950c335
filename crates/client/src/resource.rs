use std::path::Path;
use std::sync::Arc;

use reqwest::Method;

use crate::ids::{ImageId, VideoId};
use crate::types::MediaKind;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Content types the analysis service accepts, keyed by lowercase extension.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
];

/// Infers an upload content type from a file name.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    extension
        .and_then(|extension| {
            CONTENT_TYPES
                .iter()
                .find(|(known, _)| *known == extension)
                .map(|(_, content_type)| *content_type)
        })
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// A picked file, ready to be sent as the `file` part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    file_name: String,
    content_type: &'static str,
    bytes: Arc<[u8]>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name);
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Media kind implied by the content type; `None` for unrecognized files.
    pub fn media_kind(&self) -> Option<MediaKind> {
        if self.content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if self.content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// A stored analysis that can be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteTarget {
    Image(ImageId),
    Video(VideoId),
}

impl DeleteTarget {
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Video(_) => MediaKind::Video,
        }
    }

    pub fn resource(&self) -> Resource {
        match *self {
            Self::Image(id) => Resource::DeleteImage(id),
            Self::Video(id) => Resource::DeleteVideo(id),
        }
    }
}

/// A binary file served by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRef {
    Image(ImageId),
    Frame { video: VideoId, frame_number: u64 },
}

impl FileRef {
    pub fn resource(&self) -> Resource {
        match *self {
            Self::Image(id) => Resource::ImageFile(id),
            Self::Frame {
                video,
                frame_number,
            } => Resource::FrameFile {
                video,
                frame_number,
            },
        }
    }
}

/// Every endpoint of the analysis service, by operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    AnalyzeImage,
    AnalyzeVideo,
    ListImages,
    ListVideos,
    ImageDetail(ImageId),
    VideoDetail(VideoId),
    FrameDetail { video: VideoId, frame_number: u64 },
    DeleteImage(ImageId),
    DeleteVideo(VideoId),
    ImageFile(ImageId),
    FrameFile { video: VideoId, frame_number: u64 },
}

impl Resource {
    pub fn method(&self) -> Method {
        match self {
            Self::AnalyzeImage | Self::AnalyzeVideo => Method::POST,
            Self::DeleteImage(_) | Self::DeleteVideo(_) => Method::DELETE,
            Self::ListImages
            | Self::ListVideos
            | Self::ImageDetail(_)
            | Self::VideoDetail(_)
            | Self::FrameDetail { .. }
            | Self::ImageFile(_)
            | Self::FrameFile { .. } => Method::GET,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::AnalyzeImage => "/image".to_string(),
            Self::AnalyzeVideo => "/video".to_string(),
            Self::ListImages => "/images".to_string(),
            Self::ListVideos => "/videos".to_string(),
            Self::ImageDetail(id) | Self::DeleteImage(id) => format!("/image/{id}"),
            Self::VideoDetail(id) | Self::DeleteVideo(id) => format!("/video/{id}"),
            Self::FrameDetail {
                video,
                frame_number,
            } => format!("/video/{video}/frame/{frame_number}"),
            Self::ImageFile(id) => format!("/image/{id}/file"),
            Self::FrameFile {
                video,
                frame_number,
            } => format!("/video/{video}/frame/{frame_number}/file"),
        }
    }

    /// Short operation name used as the error `stage`.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::AnalyzeImage => "analyze-image",
            Self::AnalyzeVideo => "analyze-video",
            Self::ListImages => "list-images",
            Self::ListVideos => "list-videos",
            Self::ImageDetail(_) => "image-detail",
            Self::VideoDetail(_) => "video-detail",
            Self::FrameDetail { .. } => "frame-detail",
            Self::DeleteImage(_) => "delete-image",
            Self::DeleteVideo(_) => "delete-video",
            Self::ImageFile(_) => "image-file",
            Self::FrameFile { .. } => "frame-file",
        }
    }
}

/// Resolves resources against the service base URL configured at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: Arc<str>,
}

impl Endpoints {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let trimmed = base_url.as_ref().trim().trim_end_matches('/');
        let base_url = if trimmed.is_empty() {
            DEFAULT_BASE_URL
        } else {
            trimmed
        };
        Self {
            base_url: Arc::from(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, resource: &Resource) -> String {
        format!("{}{}", self.base_url, resource.path())
    }

    pub fn file_url(&self, file: FileRef) -> String {
        self.url(&file.resource())
    }

    pub fn image_file_url(&self, id: ImageId) -> String {
        self.file_url(FileRef::Image(id))
    }

    pub fn frame_file_url(&self, video: VideoId, frame_number: u64) -> String {
        self.file_url(FileRef::Frame {
            video,
            frame_number,
        })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("face.JPG"), "image/jpeg");
        assert_eq!(content_type_for("face.png"), "image/png");
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("clip.mov"), "video/quicktime");
        assert_eq!(content_type_for("clip.avi"), "video/x-msvideo");
        assert_eq!(content_type_for("notes.txt"), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for("no_extension"), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn upload_reports_media_kind() {
        assert_eq!(
            Upload::new("clip.mp4", vec![0_u8; 4]).media_kind(),
            Some(MediaKind::Video)
        );
        assert_eq!(
            Upload::new("face.jpeg", vec![0_u8; 4]).media_kind(),
            Some(MediaKind::Image)
        );
        assert_eq!(Upload::new("notes.txt", Vec::new()).media_kind(), None);
    }

    #[test]
    fn endpoints_trim_trailing_slash() {
        let endpoints = Endpoints::new("http://analysis.local:9000/");
        assert_eq!(
            endpoints.url(&Resource::ListVideos),
            "http://analysis.local:9000/videos"
        );
        assert_eq!(Endpoints::new("  ").base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn file_urls_match_service_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.image_file_url(ImageId::new(4)),
            "http://localhost:8000/image/4/file"
        );
        assert_eq!(
            endpoints.frame_file_url(VideoId::new(2), 105),
            "http://localhost:8000/video/2/frame/105/file"
        );
    }

    #[test]
    fn delete_targets_map_to_delete_method() {
        let resource = DeleteTarget::Video(VideoId::new(9)).resource();
        assert_eq!(resource.method(), Method::DELETE);
        assert_eq!(resource.path(), "/video/9");
    }
}
