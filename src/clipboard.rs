//! Best-effort clipboard sink
//!
//! Other processes may hold the clipboard at any moment, so every failure is
//! logged and swallowed.

use std::borrow::Cow;

use arboard::{Clipboard, ImageData};

use crate::types::CapturedImage;

pub trait ClipboardSink: Send + Sync {
    fn copy_image(&self, image: &CapturedImage);

    fn copy_text(&self, text: &str);
}

/// System clipboard via `arboard`; a fresh handle is opened per call
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl ArboardClipboard {
    fn open() -> Option<Clipboard> {
        match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                log::warn!("clipboard unavailable: {}", e);
                None
            }
        }
    }
}

impl ClipboardSink for ArboardClipboard {
    fn copy_image(&self, image: &CapturedImage) {
        let Some(mut clipboard) = Self::open() else {
            return;
        };

        let data = ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Owned(image.to_rgba8()),
        };
        match clipboard.set_image(data) {
            Ok(()) => log::debug!("copied {}x{} image to clipboard", image.width(), image.height()),
            Err(e) => log::warn!("failed to copy image to clipboard: {}", e),
        }
    }

    fn copy_text(&self, text: &str) {
        let Some(mut clipboard) = Self::open() else {
            return;
        };

        if let Err(e) = clipboard.set_text(text) {
            log::warn!("failed to copy text to clipboard: {}", e);
        }
    }
}
