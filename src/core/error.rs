use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire launcher.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── Launch-file interpretation ──────────────────────
    #[error("malformed expansion in `{word}`: {reason}")]
    MalformedExpansion { word: String, reason: &'static str },

    #[error("usage: {usage}")]
    Usage {
        directive: String,
        usage: &'static str,
        #[source]
        source: Option<Box<LauncherError>>,
    },

    #[error("invalid version of launcher; launch file requires {required_major}.{required_minor}, this is {major}.{minor}")]
    IncompatibleVersion {
        required_major: u32,
        required_minor: u32,
        major: u32,
        minor: u32,
    },

    #[error("unterminated `when' stanza: {0}")]
    UnterminatedConditional(String),

    #[error("`when' operator `{operator}' lacks operands: {words}")]
    MissingOperand { operator: String, words: String },

    #[error("cannot split line into words: {0}")]
    MalformedLine(String),

    #[error("line {line}: {text}: {source}")]
    AtLine {
        line: usize,
        text: String,
        #[source]
        source: Box<LauncherError>,
    },

    #[error("in {uri}: {source}")]
    InFile {
        uri: String,
        #[source]
        source: Box<LauncherError>,
    },

    // ── Argument syntax ─────────────────────────────────
    #[error("malformed URI `{uri}`: {source}")]
    MalformedUri {
        uri: String,
        source: url::ParseError,
    },

    #[error("malformed pattern: {0}")]
    MalformedPattern(#[from] regex::Error),

    #[error("malformed integer `{text}`: {source}")]
    MalformedInteger {
        text: String,
        source: std::num::ParseIntError,
    },

    #[error("malformed version `{0}`")]
    MalformedVersion(String),

    #[error("malformed validator `{0}`")]
    MalformedValidator(String),

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Unsupported resource scheme: {0}")]
    UnsupportedScheme(String),

    // ── Integrity ───────────────────────────────────────
    #[error("{validator} mismatch for {uri}: got {actual}")]
    ValidationFailed {
        uri: String,
        validator: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Java ────────────────────────────────────────────
    #[error("Java runtime not found: {0}")]
    JavaNotFound(String),

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    // ── Launch ──────────────────────────────────────────
    #[error("launch file names neither a main class nor an executable jar")]
    NothingToLaunch,

    #[error("too many chained launch files (last: {0})")]
    ChainTooDeep(String),

    #[error("native libraries {first} and {second} would both be installed as `{name}`")]
    NativeNameClash {
        name: String,
        first: String,
        second: String,
    },

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    /// Wraps `self` as the cause of a usage failure of `directive`.
    pub fn into_usage(self, directive: &str, usage: &'static str) -> Self {
        LauncherError::Usage {
            directive: directive.to_string(),
            usage,
            source: Some(Box::new(self)),
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for machine-readable output ──────────
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
