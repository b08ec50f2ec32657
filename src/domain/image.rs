//! Image payload encoding
//!
//! The codec itself lives with the caller; the store only ever sees the
//! compressed bytes an [`ImageSource`] produces.

use crate::error::{JotbookError, Result};

/// Compression quality as a percentage (1..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageQuality(u8);

impl ImageQuality {
    pub const DEFAULT: ImageQuality = ImageQuality(75);

    pub fn new(percent: u8) -> Result<Self> {
        if (1..=100).contains(&percent) {
            Ok(ImageQuality(percent))
        } else {
            Err(JotbookError::Config(format!(
                "Invalid image quality: {}. Expected a percentage between 1 and 100",
                percent
            )))
        }
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Quality as a fraction, the form most codecs take
    pub fn as_fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for ImageQuality {
    fn default() -> Self {
        ImageQuality::DEFAULT
    }
}

/// Something that can be turned into a compressed image payload
pub trait ImageSource {
    fn encode(&self, quality: ImageQuality) -> Result<Vec<u8>>;
}

/// Bytes that are already compressed; stored as-is regardless of quality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage(pub Vec<u8>);

impl ImageSource for EncodedImage {
    fn encode(&self, quality: ImageQuality) -> Result<Vec<u8>> {
        self.0.as_slice().encode(quality)
    }
}

impl ImageSource for [u8] {
    fn encode(&self, _quality: ImageQuality) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(JotbookError::ImageEncoding(
                "image payload is empty".to_string(),
            ));
        }
        Ok(self.to_vec())
    }
}

impl ImageSource for Vec<u8> {
    fn encode(&self, quality: ImageQuality) -> Result<Vec<u8>> {
        self.as_slice().encode(quality)
    }
}
