//! Attachment path normalization, URL building, and deduplication.
//!
//! Everything here is pure and total: unresolvable input degrades to a
//! sentinel (`"#"` for downloads, `""` for images) instead of erroring,
//! because attachment metadata is best-effort enrichment.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashSet;

use kb_client::types::Attachment;

/// Characters escaped when percent-encoding a path segment: everything
/// except ASCII alphanumerics and `-_.!~*'()` (the `encodeURIComponent`
/// set, which the backend's upload routes decode against).
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Sentinel returned by [`build_download_url`] when no path resolves.
pub const DOWNLOAD_UNAVAILABLE: &str = "#";

/// Canonical form of a stored file path: forward slashes, no leading
/// slashes, and at most one leading `uploads/` segment stripped (any case).
pub fn normalize_path(file_path: &str) -> String {
    let cleaned = file_path.replace('\\', "/");
    let cleaned = cleaned.trim_start_matches('/');
    match cleaned.get(..8) {
        Some(prefix) if prefix.eq_ignore_ascii_case("uploads/") => cleaned[8..].to_string(),
        _ => cleaned.to_string(),
    }
}

/// Percent-encode a path segment-by-segment so reserved characters inside a
/// segment cannot corrupt the URL. Empty segments are dropped.
pub fn encode_segments(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| utf8_percent_encode(segment, URI_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn effective_path(file_path: Option<&str>, file_name: Option<&str>) -> String {
    let raw = match file_path {
        Some(path) if !path.is_empty() => path,
        _ => file_name.unwrap_or(""),
    };
    normalize_path(raw)
}

/// Download link for an attachment, or [`DOWNLOAD_UNAVAILABLE`] when
/// neither path nor name resolves.
pub fn build_download_url(
    base_url: &str,
    file_path: Option<&str>,
    file_name: Option<&str>,
) -> String {
    let path = effective_path(file_path, file_name);
    if path.is_empty() {
        return DOWNLOAD_UNAVAILABLE.to_string();
    }
    format!("{}/api/download/{}", base_url, encode_segments(&path))
}

/// Image source URL for an attachment. Returns an empty string when
/// unresolved; callers suppress the image instead of requesting a broken
/// URL.
pub fn build_image_url(base_url: &str, file_path: Option<&str>, file_name: Option<&str>) -> String {
    let path = effective_path(file_path, file_name);
    if path.is_empty() {
        return String::new();
    }
    format!("{}/uploads/{}", base_url, encode_segments(&path))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    File,
}

/// An attachment renders as an image iff its declared type has the
/// case-sensitive `image/` prefix; an absent type means plain file.
pub fn classify(attachment: &Attachment) -> AttachmentKind {
    match &attachment.file_type {
        Some(file_type) if file_type.starts_with("image/") => AttachmentKind::Image,
        _ => AttachmentKind::File,
    }
}

/// Dedup key: lower-cased, trimmed `file_path`, falling back to `file_name`
/// when the path is empty.
fn file_key(attachment: &Attachment) -> String {
    let source = if attachment.file_path.is_empty() {
        attachment.file_name.as_str()
    } else {
        attachment.file_path.as_str()
    };
    source.to_lowercase().trim().to_string()
}

/// Stable filter keeping the first occurrence per file key. Attachments
/// with an empty key are never treated as duplicates of each other.
pub fn dedupe(attachments: Vec<Attachment>) -> Vec<Attachment> {
    let mut seen = HashSet::new();
    attachments
        .into_iter()
        .filter(|attachment| {
            let key = file_key(attachment);
            if key.is_empty() {
                return true;
            }
            seen.insert(key)
        })
        .collect()
}
