//! Persisted screenshot metadata

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ScreenshotType;

/// One cataloged capture. The record points at an image file; it never
/// holds the pixels themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotRecord {
    /// Assigned by the catalog on insert; 0 until then
    #[serde(default)]
    pub id: u64,
    /// Backing image file, absent when the capture was not saved
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    /// Comma-separated tags
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(rename = "type")]
    pub kind: ScreenshotType,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub file_size_bytes: u64,
    #[serde(default)]
    pub ocr_text: Option<String>,
    /// PNG thumbnail bytes, stored as base64 text
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<u8>>,
}

impl ScreenshotRecord {
    pub fn new(kind: ScreenshotType, width: u32, height: u32, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            file_path: None,
            captured_at,
            title: None,
            tags: None,
            kind,
            width,
            height,
            file_size_bytes: 0,
            ocr_text: None,
            thumbnail: None,
        }
    }

    /// Case-insensitive substring match against title, tags and OCR text.
    /// `needle` must already be lowercase; absent fields never match.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.tags, &self.ocr_text]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        text.map(|t| STANDARD.decode(t).map_err(serde::de::Error::custom))
            .transpose()
    }
}
