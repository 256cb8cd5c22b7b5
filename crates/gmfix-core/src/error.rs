use std::fmt;
use std::io;
use std::path::PathBuf;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    RootNotGiven,
    RootNotFound,
    ProjectMarkerMissing,
    ConfigParseError,
    MalformedXml,
    UnexpectedRoot,
    UnmappedCategory,
    InvalidNumber,
    FileReadFailed,
    FileWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RootNotGiven => "E1001",
            Self::RootNotFound => "E1002",
            Self::ProjectMarkerMissing => "E1003",
            Self::ConfigParseError => "E1004",
            Self::MalformedXml => "E3001",
            Self::UnexpectedRoot => "E3002",
            Self::UnmappedCategory => "E3003",
            Self::InvalidNumber => "E3004",
            Self::FileReadFailed => "E5001",
            Self::FileWriteFailed => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::RootNotGiven => "Project folder not given",
            Self::RootNotFound => "Project folder does not exist",
            Self::ProjectMarkerMissing => "Project file missing from folder",
            Self::ConfigParseError => "Config file parse error",
            Self::MalformedXml => "Malformed XML document",
            Self::UnexpectedRoot => "Unexpected document root element",
            Self::UnmappedCategory => "Unknown event category",
            Self::InvalidNumber => "Invalid numeric field",
            Self::FileReadFailed => "File read failed",
            Self::FileWriteFailed => "File write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::RootNotGiven => Some("Pass the project folder explicitly."),
            Self::RootNotFound => Some("Check the folder path and retry."),
            Self::ProjectMarkerMissing => {
                Some("Select the folder that directly contains the project file.")
            }
            Self::ConfigParseError => Some("Fix syntax in the gmfix config.toml and retry."),
            Self::MalformedXml => Some("Re-export the document with the splitting tool."),
            Self::UnexpectedRoot | Self::UnmappedCategory | Self::InvalidNumber => None,
            Self::FileReadFailed => Some("Check that the file exists and is readable."),
            Self::FileWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Conditions that abort a whole batch before any file is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionFailure {
    #[error("project folder is not set")]
    EmptyRoot,

    #[error("folder \"{}\" does not exist", .0.display())]
    RootMissing(PathBuf),

    #[error("folder \"{}\" does not contain a project file *.{suffix}", .root.display())]
    MarkerMissing { root: PathBuf, suffix: String },
}

impl PreconditionFailure {
    /// Machine-readable code associated with this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyRoot => ErrorCode::RootNotGiven,
            Self::RootMissing(_) => ErrorCode::RootNotFound,
            Self::MarkerMissing { .. } => ErrorCode::ProjectMarkerMissing,
        }
    }
}

/// Per-file I/O failure. The batch notes it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum IoFailure {
    #[error("failed to read file \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file \"{}\": {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IoFailure {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::FileReadFailed,
            Self::Write { .. } => ErrorCode::FileWriteFailed,
        }
    }
}

/// Failure to load the optional TOML configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config \"{}\": {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::FileReadFailed,
            Self::Parse { .. } => ErrorCode::ConfigParseError,
        }
    }
}

/// Failure to turn one XML document into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("expected root element <{expected}>, found <{found}>")]
    MissingRoot {
        expected: &'static str,
        found: String,
    },

    #[error("unknown event category \"{0}\"")]
    UnmappedCategory(String),

    #[error("field \"{field}\" is not an integer: \"{value}\"")]
    InvalidNumber { field: &'static str, value: String },
}

impl ParseFailure {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed(_) => ErrorCode::MalformedXml,
            Self::MissingRoot { .. } => ErrorCode::UnexpectedRoot,
            Self::UnmappedCategory(_) => ErrorCode::UnmappedCategory,
            Self::InvalidNumber { .. } => ErrorCode::InvalidNumber,
        }
    }
}

impl From<roxmltree::Error> for ParseFailure {
    fn from(err: roxmltree::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
