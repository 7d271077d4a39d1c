use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

/// Total attachment ceiling for email-mode submissions.
pub const MAX_ATTACHMENTS_BYTES: usize = 7_000_000;

/// Upper bound for `FORMSG_ZIP_SCAN_TIMEOUT_MS`.
pub const MAX_ZIP_SCAN_TIMEOUT: Duration = Duration::from_secs(600);

/// Extensions that are never accepted, on their own or inside a zip.
pub const DEFAULT_DISALLOWED_EXTENSIONS: &[&str] = &[
    ".app", ".apk", ".bat", ".bin", ".cmd", ".com", ".cpl", ".dll", ".dmg", ".exe", ".hta",
    ".jar", ".js", ".jse", ".lnk", ".msi", ".msp", ".pif", ".ps1", ".reg", ".scr", ".sh",
    ".vb", ".vbe", ".vbs", ".ws", ".wsf",
];

/// Deployment settings read by the submission pipeline.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    /// "Today" for date rules is evaluated in this timezone.
    pub timezone: Tz,
    pub max_attachments_bytes: usize,
    pub disallowed_extensions: Vec<String>,
    /// Budget for scanning every zip in one submission.
    pub zip_scan_timeout: Duration,
    /// Zips nested deeper than this are treated as invalid.
    pub zip_max_depth: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Singapore,
            max_attachments_bytes: MAX_ATTACHMENTS_BYTES,
            disallowed_extensions: DEFAULT_DISALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            zip_scan_timeout: Duration::from_secs(10),
            zip_max_depth: 3,
        }
    }
}

impl SubmissionConfig {
    /// Reads `FORMSG_*` overrides from the environment. Unset or unparsable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timezone = lookup("FORMSG_TIMEZONE")
            .and_then(|tz| {
                tz.parse::<Tz>()
                    .inspect_err(|_| {
                        tracing::warn!(timezone = %tz, "unknown timezone, using default")
                    })
                    .ok()
            })
            .unwrap_or(defaults.timezone);

        let max_attachments_bytes = lookup("FORMSG_MAX_ATTACHMENTS_BYTES")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.max_attachments_bytes);

        let disallowed_extensions = lookup("FORMSG_DISALLOWED_EXTENSIONS")
            .map(|list| parse_extension_list(&list))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.disallowed_extensions);

        let zip_scan_timeout = lookup("FORMSG_ZIP_SCAN_TIMEOUT_MS")
            .and_then(|v| v.trim().parse().ok())
            .map(|ms| Duration::from_millis(ms).min(MAX_ZIP_SCAN_TIMEOUT))
            .unwrap_or(defaults.zip_scan_timeout);

        let zip_max_depth = lookup("FORMSG_ZIP_MAX_DEPTH")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.zip_max_depth);

        Self {
            timezone,
            max_attachments_bytes,
            disallowed_extensions,
            zip_scan_timeout,
            zip_max_depth,
        }
    }

    /// Current calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    pub fn is_disallowed_extension(&self, extension: &str) -> bool {
        self.disallowed_extensions
            .iter()
            .any(|disallowed| disallowed.eq_ignore_ascii_case(extension))
    }
}

/// `"exe, .BAT"` -> `[".exe", ".bat"]`
fn parse_extension_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .map(|ext| {
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            }
        })
        .collect()
}
