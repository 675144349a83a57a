//! Flattening of the "context item → attachments" graph into the image and
//! file buckets a message renders.

use kb_client::types::{Attachment, ContextItem};

use super::attachments::{AttachmentKind, classify, dedupe};

fn is_absent(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Flatten context items into their attachments, tagging each with its
/// parent item's title and type for provenance. Attachment-level values win
/// when present. Order is context-item order outer, attachment order inner.
pub fn flatten_attachments(items: &[ContextItem]) -> Vec<Attachment> {
    items
        .iter()
        .flat_map(|item| {
            item.attachments
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(move |attachment| {
                    let mut attachment = attachment.clone();
                    if is_absent(&attachment.parent_node_title) {
                        attachment.parent_node_title = Some(item.title.clone());
                    }
                    if is_absent(&attachment.parent_node_type) {
                        attachment.parent_node_type = Some(item.node_type.clone());
                    }
                    attachment
                })
        })
        .collect()
}

/// Image and file buckets computed from the deduplicated flattened set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentBuckets {
    pub images: Vec<Attachment>,
    pub files: Vec<Attachment>,
}

impl AttachmentBuckets {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.files.is_empty()
    }
}

/// The full pipeline: flatten, then dedupe, then classify. Grouping happens
/// after deduplication so bucket membership reflects the deduplicated set.
pub fn bucket_attachments(items: &[ContextItem]) -> AttachmentBuckets {
    let mut buckets = AttachmentBuckets::default();
    for attachment in dedupe(flatten_attachments(items)) {
        match classify(&attachment) {
            AttachmentKind::Image => buckets.images.push(attachment),
            AttachmentKind::File => buckets.files.push(attachment),
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(id: &str, file_path: &str, file_type: Option<&str>) -> Attachment {
        Attachment {
            id: id.to_string(),
            file_name: format!("{id}.bin"),
            file_type: file_type.map(String::from),
            file_path: file_path.to_string(),
            uploaded_at: None,
            parent_node_title: None,
            parent_node_type: None,
        }
    }

    fn item(id: &str, title: &str, attachments: Vec<Attachment>) -> ContextItem {
        ContextItem {
            id: id.to_string(),
            title: title.to_string(),
            node_type: "value".to_string(),
            content: None,
            similarity: None,
            parent_id: None,
            attachments: if attachments.is_empty() {
                None
            } else {
                Some(attachments)
            },
        }
    }

    #[test]
    fn test_flatten_length_and_order() {
        let items = vec![
            item(
                "i1",
                "First",
                vec![attachment("a", "a.png", None), attachment("b", "b.png", None)],
            ),
            item("i2", "Second", vec![]),
            item("i3", "Third", vec![attachment("c", "c.png", None)]),
        ];
        let flat = flatten_attachments(&items);
        assert_eq!(flat.len(), 3);
        assert_eq!(
            flat.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_flatten_fills_parent_provenance() {
        let items = vec![item("i1", "Trust", vec![attachment("a", "a.png", None)])];
        let flat = flatten_attachments(&items);
        assert_eq!(flat[0].parent_node_title.as_deref(), Some("Trust"));
        assert_eq!(flat[0].parent_node_type.as_deref(), Some("value"));
    }

    #[test]
    fn test_flatten_keeps_attachment_level_provenance() {
        let mut tagged = attachment("a", "a.png", None);
        tagged.parent_node_title = Some("Override".to_string());
        let items = vec![item("i1", "Trust", vec![tagged])];

        let flat = flatten_attachments(&items);
        assert_eq!(flat[0].parent_node_title.as_deref(), Some("Override"));
        // The untouched field still inherits from the item.
        assert_eq!(flat[0].parent_node_type.as_deref(), Some("value"));
    }

    #[test]
    fn test_flatten_treats_empty_provenance_as_absent() {
        let mut blank = attachment("a", "a.png", None);
        blank.parent_node_title = Some(String::new());
        let items = vec![item("i1", "Trust", vec![blank])];

        let flat = flatten_attachments(&items);
        assert_eq!(flat[0].parent_node_title.as_deref(), Some("Trust"));
    }

    #[test]
    fn test_bucket_groups_after_dedupe() {
        // The duplicate image appears under two different items; only the
        // first survives, so the image bucket has one entry.
        let items = vec![
            item(
                "i1",
                "First",
                vec![attachment("dup1", "uploads/a.png", Some("image/png"))],
            ),
            item(
                "i2",
                "Second",
                vec![
                    attachment("dup2", "Uploads/A.PNG", Some("image/png")),
                    attachment("doc", "b.pdf", Some("application/pdf")),
                ],
            ),
        ];
        let buckets = bucket_attachments(&items);
        assert_eq!(buckets.images.len(), 1);
        assert_eq!(buckets.images[0].id, "dup1");
        assert_eq!(buckets.images[0].parent_node_title.as_deref(), Some("First"));
        assert_eq!(buckets.files.len(), 1);
        assert_eq!(buckets.files[0].id, "doc");
    }

    #[test]
    fn test_bucket_empty_input() {
        assert!(bucket_attachments(&[]).is_empty());
    }
}
