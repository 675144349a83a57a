pub mod attachments;
pub mod context;

pub use attachments::{
    AttachmentKind, DOWNLOAD_UNAVAILABLE, build_download_url, build_image_url, classify, dedupe,
    encode_segments, normalize_path,
};
pub use context::{AttachmentBuckets, bucket_attachments, flatten_attachments};
