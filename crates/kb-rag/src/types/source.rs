//! Document source descriptors

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Where a document's bytes come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentSource {
    /// Google Drive shared file, addressed by file id
    GoogleDrive {
        /// Drive file id extracted from the share link
        file_id: String,
        /// Link as configured
        link: String,
    },
    /// Any other HTTP(S) URL
    Url(String),
    /// Local file
    File(PathBuf),
}

fn drive_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("static regex is valid"))
}

impl DocumentSource {
    /// Parse a configured source string
    ///
    /// Drive links must carry a `/d/<id>` segment; anything else under
    /// `drive.google.com` is rejected as unreadable.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::unreadable(raw, "empty source"));
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            if raw.contains("drive.google.com") {
                let file_id = drive_id_pattern()
                    .captures(raw)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .ok_or_else(|| Error::unreadable(raw, "invalid Google Drive link"))?;
                return Ok(Self::GoogleDrive {
                    file_id,
                    link: raw.to_string(),
                });
            }
            return Ok(Self::Url(raw.to_string()));
        }

        Ok(Self::File(PathBuf::from(raw)))
    }

    /// URL to download from, for remote sources
    pub fn download_url(&self) -> Option<String> {
        match self {
            Self::GoogleDrive { file_id, .. } => Some(format!(
                "https://drive.google.com/uc?export=download&id={}",
                file_id
            )),
            Self::Url(url) => Some(url.clone()),
            Self::File(_) => None,
        }
    }

    /// Human-readable location for logs and error messages
    pub fn location(&self) -> String {
        match self {
            Self::GoogleDrive { link, .. } => link.clone(),
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}
