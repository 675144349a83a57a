use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const MAX_FILE_SIZE: u64 = 5_242_880; // 5MB
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "csv", "xlsx", "xls"];

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    FileTooLarge { size: u64, max: u64 },
    UnsupportedExtension(String),
    NoExtension,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::FileTooLarge { size, max } => {
                write!(f, "file is {} (limit {})", format_file_size(*size), format_file_size(*max))
            }
            ValidationError::UnsupportedExtension(ext) => {
                write!(f, "unsupported file type .{ext}")
            }
            ValidationError::NoExtension => write!(f, "file has no extension"),
        }
    }
}

/// A user-attached file staged for the next message.
///
/// `url` is a transient in-process object reference, only meaningful while
/// the backing registry entry is alive. It is never persisted or sent to the
/// backend as-is.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub url: String,
}

impl LocalFile {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Backs `blob:` object URLs with in-memory bytes. Revoking a URL drops the
/// bytes; unrevoked entries live for the process lifetime.
#[derive(Default)]
pub struct ObjectUrlRegistry {
    blobs: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_url(&self, bytes: Vec<u8>) -> String {
        let url = format!("blob:{}", Uuid::new_v4());
        self.blobs.lock().insert(url.clone(), bytes.into());
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.blobs.lock().get(url).cloned()
    }

    pub fn revoke(&self, url: &str) -> bool {
        self.blobs.lock().remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

/// Staging area for files attached to the next submission.
///
/// Removing a file or clearing the staging area releases the object URLs;
/// taking the files for a sent message keeps them alive, since the message
/// still references them.
pub struct AttachedFiles {
    registry: Arc<ObjectUrlRegistry>,
    files: Vec<LocalFile>,
}

impl AttachedFiles {
    pub fn new(registry: Arc<ObjectUrlRegistry>) -> Self {
        Self {
            registry,
            files: Vec::new(),
        }
    }

    /// Validate and stage a file. Size and extension limits mirror what the
    /// backend accepts for uploads.
    pub fn stage(&mut self, name: &str, bytes: Vec<u8>) -> Result<&LocalFile, ValidationError> {
        let extension = validate_staged(name, bytes.len() as u64)?;
        let file = LocalFile {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            size: bytes.len() as u64,
            mime: mime_for_extension(&extension),
            url: self.registry.create_url(bytes),
        };
        debug!(name = %file.name, size = file.size, "Staged attachment");
        self.files.push(file);
        Ok(self.files.last().expect("just pushed"))
    }

    /// Remove one staged file and release its object URL.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.files.iter().position(|file| file.id == id) else {
            warn!(file_id = %id, "Remove ignored, file not staged");
            return false;
        };
        let file = self.files.remove(index);
        self.registry.revoke(&file.url);
        true
    }

    /// Release everything staged.
    pub fn clear(&mut self) {
        for file in self.files.drain(..) {
            self.registry.revoke(&file.url);
        }
    }

    /// Hand the staged files over for a message; their URLs stay alive.
    pub fn take(&mut self) -> Vec<LocalFile> {
        std::mem::take(&mut self.files)
    }

    pub fn files(&self) -> &[LocalFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn validate_staged(name: &str, size: u64) -> Result<String, ValidationError> {
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }

    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
        .ok_or(ValidationError::NoExtension)?;

    if !IMAGE_EXTENSIONS.contains(&extension.as_str())
        && !DOCUMENT_EXTENSIONS.contains(&extension.as_str())
    {
        return Err(ValidationError::UnsupportedExtension(extension));
    }

    Ok(extension)
}

fn mime_for_extension(extension: &str) -> String {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Human-readable size: `512 B`, `1.5 KB`, `2.3 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
