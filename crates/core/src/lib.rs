use serde::{Deserialize, Serialize};

/// Number of leading credential characters kept in a compression record.
pub const RECORD_CREDENTIAL_PREFIX: usize = 20;

/// First/last use timestamps for one credential (RFC 3339, UTC).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDetails {
    pub first_used: Option<String>,
    pub last_used: Option<String>,
}

/// Combined view of a credential's counter and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialUsage {
    pub usage_count: u64,
    pub first_used: Option<String>,
    pub last_used: Option<String>,
}

/// Outcome of one successful compression, keyed by the source fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionRecord {
    pub source_path: String,
    pub output_path: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: String,
    pub compressed_at: String,
    pub api_key_index: usize,
    pub api_key_used: String,
}

/// Per-credential row of the status display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialStatus {
    pub index: usize,
    pub masked: String,
    pub usage: u64,
    pub limit: u64,
    pub remaining: i64,
    pub percent_used: f64,
    pub first_used: Option<String>,
    pub last_used: Option<String>,
    pub active: bool,
}

/// Category of a per-image failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Exhausted,
    Account,
    Request,
    Server,
    Connection,
    Io,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exhausted => "quota exhausted",
            Self::Account => "credential error",
            Self::Request => "request error",
            Self::Server => "server error",
            Self::Connection => "connection error",
            Self::Io => "io error",
        }
    }
}

/// A single image that could not be compressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    pub path: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Statistics for one batch run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub compressed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailedItem>,
    pub exhausted: bool,
}

impl RunStats {
    pub fn record_failure(&mut self, item: FailedItem) {
        if item.kind == FailureKind::Exhausted {
            self.exhausted = true;
        }
        self.failed += 1;
        self.failures.push(item);
    }
}

/// Percentage saved: `(1 - compressed / original) * 100`. Zero-byte originals yield 0.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    (1.0 - compressed_size as f64 / original_size as f64) * 100.0
}

pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}%", ratio)
}

/// Identifier stored alongside a record: a short prefix of the secret.
pub fn truncate_credential(credential: &str) -> String {
    let prefix: String = credential.chars().take(RECORD_CREDENTIAL_PREFIX).collect();
    format!("{prefix}...")
}

/// Identifier shown in the status display: head and tail of the secret.
pub fn mask_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    let head: String = chars.iter().take(10).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

/// Renders an RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn display_timestamp(value: &str) -> String {
    value.chars().take(19).collect::<String>().replace('T', " ")
}
