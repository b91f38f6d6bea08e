use std::sync::Arc;

use anyhow::{anyhow, Result};
use image::ImageFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Png,
    Jpeg,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Png => "png",
            MediaFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Png => "image/png",
            MediaFormat::Jpeg => "image/jpeg",
        }
    }
}

/// One captured image. Bytes are shared behind an `Arc` so the pipeline
/// stages and any preview hold the same buffer without copying; the data
/// never outlives the attempt it belongs to.
#[derive(Debug, Clone)]
pub struct CapturedMedia {
    bytes: Arc<Vec<u8>>,
    format: MediaFormat,
}

impl CapturedMedia {
    /// Sniff the format from the byte header. Anything that is not a PNG
    /// or JPEG is rejected here, before any upload is attempted.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = match image::guess_format(&bytes) {
            Ok(ImageFormat::Png) => MediaFormat::Png,
            Ok(ImageFormat::Jpeg) => MediaFormat::Jpeg,
            Ok(other) => return Err(anyhow!("unsupported capture format {other:?}")),
            Err(err) => return Err(anyhow!("unrecognized capture data: {err}")),
        };
        Ok(Self {
            bytes: Arc::new(bytes),
            format,
        })
    }

    /// For callers that already know what they captured (test doubles,
    /// canned dev media).
    pub fn with_format(bytes: Vec<u8>, format: MediaFormat) -> Self {
        Self {
            bytes: Arc::new(bytes),
            format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> MediaFormat {
        self.format
    }
}

/// How an attempt gets its image. The pipeline never cares: the camera,
/// the photo picker, and the developer shortcut are all just sources.
pub trait MediaSource: Send + Sync {
    fn acquire(&self) -> Result<CapturedMedia>;
}

/// Canned media for exercising the pipeline without a real camera.
pub struct CannedMediaSource {
    media: CapturedMedia,
}

impl CannedMediaSource {
    pub fn new(media: CapturedMedia) -> Self {
        Self { media }
    }
}

impl MediaSource for CannedMediaSource {
    fn acquire(&self) -> Result<CapturedMedia> {
        Ok(self.media.clone())
    }
}
