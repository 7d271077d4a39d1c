use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::time::Instant;

use thiserror::Error;

use crate::config::{MAX_ATTACHMENTS_BYTES, SubmissionConfig};
use crate::fields::BasicField;
use crate::responses::{Answer, FieldResponse, ProcessedFieldResponse};

const ZIP_EXTENSION: &str = ".zip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Error)]
enum ZipScanError {
    #[error("unreadable archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive nested deeper than {max_depth} levels")]
    TooDeep { max_depth: usize },
    #[error("zip scan ran past its deadline")]
    TimedOut,
    #[error("nested archive '{name}' is larger than {limit} bytes")]
    EntryTooLarge { name: String, limit: usize },
    #[error("zip scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Lowercased extension including the dot, e.g. `".pdf"`. Empty when the
/// name has no dot.
pub fn file_extension(filename: &str) -> String {
    filename
        .rfind('.')
        .map(|dot| filename[dot..].to_lowercase())
        .unwrap_or_default()
}

/// Attachment responses that actually carry file content. Unanswered and
/// hidden attachment fields have none and are left out.
pub fn map_attachments_from_parsed_responses(
    responses: &[FieldResponse],
) -> Vec<AttachmentInfo> {
    responses
        .iter()
        .filter(|response| response.field_type == BasicField::Attachment.as_str())
        .filter_map(|response| {
            let content = response.content.clone()?;
            let filename = response
                .filename
                .clone()
                .or_else(|| response.answer.clone())
                .unwrap_or_default();
            Some(AttachmentInfo { filename, content })
        })
        .collect()
}

/// Attachments of responses that passed validation. Only these are forwarded
/// with the email; each is named by its validated answer.
pub fn map_attachments_from_processed_responses(
    responses: &[ProcessedFieldResponse],
) -> Vec<AttachmentInfo> {
    responses
        .iter()
        .filter(|response| response.field_type == BasicField::Attachment)
        .filter_map(|response| match &response.answer {
            Answer::Attachment {
                answer,
                content: Some(content),
                ..
            } => Some(AttachmentInfo {
                filename: answer.clone(),
                content: content.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Renames repeated filenames so every attachment in the email is distinct.
/// A name seen N times gets `{N-1}-`, `{N-2}-`, ... `1-` prefixes on all but
/// its last occurrence, which keeps the original name.
pub fn handle_duplicates_in_attachments(attachments: Vec<AttachmentInfo>) -> Vec<AttachmentInfo> {
    let mut remaining: HashMap<String, usize> = HashMap::new();
    for attachment in &attachments {
        *remaining.entry(attachment.filename.clone()).or_default() += 1;
    }

    attachments
        .into_iter()
        .map(|attachment| {
            let Some(count) = remaining.get_mut(&attachment.filename) else {
                return attachment;
            };
            if *count <= 1 {
                return attachment;
            }
            *count -= 1;
            AttachmentInfo {
                filename: format!("{count}-{}", attachment.filename),
                content: attachment.content,
            }
        })
        .collect()
}

pub fn total_size(attachments: &[AttachmentInfo]) -> usize {
    attachments.iter().map(|a| a.content.len()).sum()
}

pub fn exceeds_size_limit(attachments: &[AttachmentInfo], limit_bytes: usize) -> bool {
    total_size(attachments) > limit_bytes
}

pub fn are_attachments_more_than_7mb(attachments: &[AttachmentInfo]) -> bool {
    exceeds_size_limit(attachments, MAX_ATTACHMENTS_BYTES)
}

/// Disallowed extensions found inside a zip, descending into nested zips.
/// Stops with `TimedOut` once `deadline` passes, so an abandoned scan does
/// not keep decompressing on the blocking pool.
fn invalid_extensions_in_zip(
    content: &[u8],
    config: &SubmissionConfig,
    depth: usize,
    deadline: Instant,
) -> Result<Vec<String>, ZipScanError> {
    if depth > config.zip_max_depth {
        return Err(ZipScanError::TooDeep {
            max_depth: config.zip_max_depth,
        });
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(content))?;
    let mut invalid = Vec::new();

    for index in 0..archive.len() {
        if Instant::now() >= deadline {
            return Err(ZipScanError::TimedOut);
        }
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let extension = file_extension(entry.name());
        if config.is_disallowed_extension(&extension) {
            invalid.push(extension);
            continue;
        }
        if extension != ZIP_EXTENSION {
            continue;
        }

        let limit = config.max_attachments_bytes;
        if entry.size() > limit as u64 {
            return Err(ZipScanError::EntryTooLarge {
                name: entry.name().to_string(),
                limit,
            });
        }
        let mut inner = Vec::new();
        // Declared sizes can lie, so the read itself is capped too.
        (&mut entry).take(limit as u64 + 1).read_to_end(&mut inner)?;
        if inner.len() > limit {
            return Err(ZipScanError::EntryTooLarge {
                name: entry.name().to_string(),
                limit,
            });
        }
        invalid.extend(invalid_extensions_in_zip(&inner, config, depth + 1, deadline)?);
    }

    Ok(invalid)
}

async fn scan_zip(
    content: Vec<u8>,
    config: SubmissionConfig,
    deadline: Instant,
) -> Result<Vec<String>, ZipScanError> {
    tokio::task::spawn_blocking(move || {
        invalid_extensions_in_zip(&content, &config, 1, deadline)
    })
    .await?
}

/// `false` if any attachment, or any file inside an attached zip, has a
/// disallowed extension. Unreadable archives and scans that overrun
/// `zip_scan_timeout` also count as invalid.
pub async fn attachments_are_valid(
    attachments: &[AttachmentInfo],
    config: &SubmissionConfig,
) -> bool {
    let deadline = Instant::now() + config.zip_scan_timeout;
    let scan = async {
        for attachment in attachments {
            let extension = file_extension(&attachment.filename);
            if config.is_disallowed_extension(&extension) {
                tracing::warn!(
                    filename = %attachment.filename,
                    extension = %extension,
                    "attachment has a disallowed extension"
                );
                return false;
            }
            if extension != ZIP_EXTENSION {
                continue;
            }

            match scan_zip(attachment.content.clone(), config.clone(), deadline).await {
                Ok(invalid) if invalid.is_empty() => {}
                Ok(invalid) => {
                    tracing::warn!(
                        filename = %attachment.filename,
                        extensions = ?invalid,
                        "zip contains disallowed extensions"
                    );
                    return false;
                }
                Err(e) => {
                    tracing::warn!(filename = %attachment.filename, error = %e, "zip scan failed");
                    return false;
                }
            }
        }
        true
    };

    match tokio::time::timeout(config.zip_scan_timeout, scan).await {
        Ok(valid) => valid,
        Err(_) => {
            tracing::warn!(
                timeout_ms = config.zip_scan_timeout.as_millis() as u64,
                "attachment scan timed out"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn attachment(filename: &str, content: Vec<u8>) -> AttachmentInfo {
        AttachmentInfo {
            filename: filename.to_string(),
            content,
        }
    }

    fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extension_is_lowercased_last_segment() {
        assert_eq!(file_extension("report.final.PDF"), ".pdf");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
    }

    #[test]
    fn duplicate_names_count_down() {
        let renamed = handle_duplicates_in_attachments(vec![
            attachment("abc.txt", b"1".to_vec()),
            attachment("abc.txt", b"2".to_vec()),
        ]);
        let names: Vec<&str> = renamed.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["1-abc.txt", "abc.txt"]);
        assert_eq!(renamed[0].content, b"1");
    }

    #[test]
    fn three_duplicates_keep_one_original() {
        let renamed = handle_duplicates_in_attachments(vec![
            attachment("a.pdf", Vec::new()),
            attachment("b.pdf", Vec::new()),
            attachment("a.pdf", Vec::new()),
            attachment("a.pdf", Vec::new()),
        ]);
        let names: Vec<&str> = renamed.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["2-a.pdf", "b.pdf", "1-a.pdf", "a.pdf"]);
    }

    #[test]
    fn size_ceiling_is_seven_million_bytes() {
        let big = vec![attachment("a.bin.pdf", vec![0; 8_000_000])];
        assert!(are_attachments_more_than_7mb(&big));

        let small = vec![
            attachment("a.pdf", vec![0; 3_000_000]),
            attachment("b.pdf", vec![0; 3_000_000]),
        ];
        assert!(!are_attachments_more_than_7mb(&small));
        assert!(!are_attachments_more_than_7mb(&[attachment("c.pdf", vec![0; 7_000_000])]));
    }

    #[test]
    fn only_attachment_responses_with_content_are_extracted() {
        let mut no_content = FieldResponse::attachment("a2", "empty.pdf", Vec::new());
        no_content.content = None;
        let responses = vec![
            FieldResponse::attachment("a1", "abc.pdf", b"pdf".to_vec()),
            no_content,
            FieldResponse::single("t1", BasicField::ShortText, "abc.pdf"),
        ];
        let attachments = map_attachments_from_parsed_responses(&responses);
        assert_eq!(attachments, vec![attachment("abc.pdf", b"pdf".to_vec())]);
    }

    #[tokio::test]
    async fn plain_files_are_checked_by_extension() {
        let config = SubmissionConfig::default();
        assert!(attachments_are_valid(&[attachment("cv.pdf", b"pdf".to_vec())], &config).await);
        assert!(!attachments_are_valid(&[attachment("setup.EXE", b"MZ".to_vec())], &config).await);
    }

    #[tokio::test]
    async fn zip_contents_are_scanned() {
        let config = SubmissionConfig::default();
        let clean = zip_of(&[("notes.txt", &b"hello"[..]), ("photo.jpg", &b"jpg"[..])]);
        assert!(attachments_are_valid(&[attachment("docs.zip", clean)], &config).await);

        let dirty = zip_of(&[("notes.txt", &b"hello"[..]), ("run.bat", &b"echo"[..])]);
        assert!(!attachments_are_valid(&[attachment("docs.zip", dirty)], &config).await);
    }

    #[tokio::test]
    async fn nested_zips_are_scanned() {
        let config = SubmissionConfig::default();
        let inner = zip_of(&[("payload.exe", &b"MZ"[..])]);
        let outer = zip_of(&[("readme.txt", &b"hi"[..]), ("inner.zip", inner.as_slice())]);
        assert!(!attachments_are_valid(&[attachment("outer.zip", outer)], &config).await);
    }

    #[tokio::test]
    async fn nesting_beyond_max_depth_is_invalid() {
        let config = SubmissionConfig {
            zip_max_depth: 1,
            ..SubmissionConfig::default()
        };
        let inner = zip_of(&[("readme.txt", &b"hi"[..])]);
        let outer = zip_of(&[("inner.zip", inner.as_slice())]);
        assert!(!attachments_are_valid(&[attachment("outer.zip", outer)], &config).await);
    }

    #[tokio::test]
    async fn corrupt_zip_is_invalid() {
        let config = SubmissionConfig::default();
        let corrupt = b"PK\x03\x04 definitely not a zip".to_vec();
        assert!(!attachments_are_valid(&[attachment("broken.zip", corrupt)], &config).await);
    }

    #[test]
    fn scan_stops_at_deadline() {
        let config = SubmissionConfig::default();
        let archive = zip_of(&[("readme.txt", &b"hi"[..])]);
        let result = invalid_extensions_in_zip(&archive, &config, 1, Instant::now());
        assert!(matches!(result, Err(ZipScanError::TimedOut)));
    }

    #[tokio::test]
    async fn exhausted_scan_budget_is_invalid() {
        let config = SubmissionConfig {
            zip_scan_timeout: std::time::Duration::ZERO,
            ..SubmissionConfig::default()
        };
        let archive = zip_of(&[("readme.txt", &b"hi"[..])]);
        assert!(!attachments_are_valid(&[attachment("docs.zip", archive)], &config).await);
    }
}
