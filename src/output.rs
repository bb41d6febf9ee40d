//! Writing captured images to disk

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, Timelike};

use crate::{
    encoder::{self, ImageFormat},
    error::{SaveError, SaveResult},
    settings::Settings,
    types::CapturedImage,
};

/// Highest numeric suffix tried before giving up on a file name
pub const MAX_NAME_SUFFIX: u32 = 9999;

/// Expand the date tokens inside every `{…}` group of `pattern`.
///
/// Tokens are `yyyy MM dd HH mm ss fff`; other characters inside a group and
/// all text outside groups are copied literally.
pub fn expand_pattern(pattern: &str, now: &DateTime<Local>) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        expand_group(&after[..close], now, &mut out);
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn expand_group(group: &str, now: &DateTime<Local>, out: &mut String) {
    let mut rest = group;
    while !rest.is_empty() {
        let (expanded, len) = if rest.starts_with("yyyy") {
            (format!("{:04}", now.year()), 4)
        } else if rest.starts_with("fff") {
            (format!("{:03}", now.timestamp_subsec_millis().min(999)), 3)
        } else if rest.starts_with("MM") {
            (format!("{:02}", now.month()), 2)
        } else if rest.starts_with("dd") {
            (format!("{:02}", now.day()), 2)
        } else if rest.starts_with("HH") {
            (format!("{:02}", now.hour()), 2)
        } else if rest.starts_with("mm") {
            (format!("{:02}", now.minute()), 2)
        } else if rest.starts_with("ss") {
            (format!("{:02}", now.second()), 2)
        } else {
            let c = rest.chars().next().unwrap_or_default();
            (c.to_string(), c.len_utf8())
        };
        out.push_str(&expanded);
        rest = &rest[len..];
    }
}

/// Candidate path for attempt `n`: the base name, then `stem_n.ext`
fn candidate(base: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };
    base.with_file_name(name)
}

/// Encode `image` and write it to `path` without overwriting anything.
///
/// On collision `_1`, `_2`, … up to `_9999` are appended to the stem.
/// Returns the path actually written.
pub fn save_image(
    image: &CapturedImage,
    path: &Path,
    format: ImageFormat,
    quality: u8,
) -> SaveResult<PathBuf> {
    let bytes = encoder::encode(image, format, quality)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SaveError::from_io(parent.to_path_buf(), e))?;
    }

    for n in 0..=MAX_NAME_SUFFIX {
        let target = candidate(path, n);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(SaveError::from_io(target, e)),
        };

        if let Err(e) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
            drop(file);
            // Do not leave a truncated image claiming the name
            let _ = std::fs::remove_file(&target);
            return Err(SaveError::from_io(target, e));
        }

        log::debug!("saved {} bytes to {:?}", bytes.len(), target);
        return Ok(target);
    }

    Err(SaveError::NamesExhausted {
        base: path.to_path_buf(),
    })
}

/// Path a capture taken at `now` would be saved to, before collision handling
pub fn target_path(settings: &Settings, now: &DateTime<Local>) -> PathBuf {
    let name = expand_pattern(&settings.file_name_pattern, now);
    settings
        .save_directory
        .join(format!("{}.{}", name, settings.default_format.extension()))
}

/// Save using the configured directory, name pattern, format and quality
pub fn save_with_settings(
    image: &CapturedImage,
    settings: &Settings,
    now: &DateTime<Local>,
) -> SaveResult<PathBuf> {
    save_image(
        image,
        &target_path(settings, now),
        settings.default_format,
        settings.quality,
    )
}
