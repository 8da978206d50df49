use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Failure taxonomy for a single conversion call.
///
/// Unknown TLV tags during decode are the one recoverable condition and are
/// reported as [`crate::factory::DecodeWarning`] values instead of errors;
/// everything here aborts the operation with no partial output.
#[derive(Debug)]
pub enum Error {
    /// A type descriptor was registered twice under one registry. This is a
    /// programming error in the registration tables, not bad user data.
    DuplicateTypeName { name: String },
    /// An enum type or enum label lookup missed.
    UnknownEnumValue { enum_name: String, detail: String },
    /// An imported document field failed its enum or bounds constraint.
    FieldValidation { field: String, message: String },
    /// The binary container structure cannot be parsed.
    MalformedContainer { message: String },
    /// The structured document cannot be parsed as a path document.
    MalformedDocument { message: String },
    /// The requested path id is not present in the container.
    PathNotFound { path_id: u32 },
    /// The document's schema version is outside the supported migration range.
    UnsupportedSchemaVersion { found: i64, oldest: i32, current: i32 },
    /// A path decoded cleanly under both game variants; a hint is required.
    GameDetectionAmbiguous { message: String },
    Io(io::Error),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer {
            message: message.into(),
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTypeName { name } => {
                write!(f, "type '{name}' is registered more than once")
            }
            Self::UnknownEnumValue { enum_name, detail } => {
                write!(f, "unknown enum value for '{enum_name}': {detail}")
            }
            Self::FieldValidation { field, message } => {
                write!(f, "invalid field '{field}': {message}")
            }
            Self::MalformedContainer { message } => {
                write!(f, "malformed container: {message}")
            }
            Self::MalformedDocument { message } => {
                write!(f, "malformed document: {message}")
            }
            Self::PathNotFound { path_id } => {
                write!(f, "path id {path_id} not found in container")
            }
            Self::UnsupportedSchemaVersion {
                found,
                oldest,
                current,
            } => {
                write!(
                    f,
                    "unsupported schema version {found}, supported range is {oldest}..={current}"
                )
            }
            Self::GameDetectionAmbiguous { message } => {
                write!(f, "game detection ambiguous: {message}")
            }
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
