use std::error::Error;
use std::fmt::Display;

use crate::config::{DedupField, SchemaVersion};
use crate::messages;

/// The contact fields that must be filled in.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ContactField {
    Name,
    Email,
    Whatsapp,
}

/// A submission that does not pass the basic format checks.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ValidationError {
    MissingRequiredField {
        field: ContactField,
        schema: SchemaVersion,
    },
    InvalidEmail,
    InvalidPhone,
    InvalidRating {
        value: u8,
    },
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { schema, .. } if schema.has_name() => {
                messages::MISSING_CONTACT_WITH_NAME
            }
            ValidationError::MissingRequiredField { .. } => messages::MISSING_CONTACT,
            ValidationError::InvalidEmail => messages::INVALID_EMAIL,
            ValidationError::InvalidPhone => messages::INVALID_PHONE,
            ValidationError::InvalidRating { .. } => messages::INVALID_RATING,
        }
    }
}

impl Error for ValidationError {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingRequiredField { field, .. } => {
                write!(f, "missing required field: {:?}", field)
            }
            ValidationError::InvalidEmail => write!(f, "invalid email format"),
            ValidationError::InvalidPhone => write!(f, "invalid phone format"),
            ValidationError::InvalidRating { value } => {
                write!(f, "rating {} is outside of the 1-5 scale", value)
            }
        }
    }
}

/// The backing store could not be read or written.
///
/// Wraps whatever the store implementation reported. When this comes out of an
/// append, the caller cannot tell whether the response was persisted.
#[derive(Debug)]
pub struct StorageError {
    source: Box<dyn Error + Send + Sync + 'static>,
}

impl StorageError {
    pub fn new<E>(source: E) -> StorageError
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        StorageError {
            source: source.into(),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "storage unavailable: {}", self.source)
    }
}

/// Why a submission was not recorded.
#[derive(Debug)]
pub enum SubmitError {
    Validation(ValidationError),
    /// The email or whatsapp number is already on file.
    Duplicate(DedupField),
    Storage(StorageError),
}

impl SubmitError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::Validation(e) => e.user_message(),
            SubmitError::Duplicate(DedupField::Email) => messages::DUPLICATE_EMAIL,
            SubmitError::Duplicate(DedupField::Whatsapp) => messages::DUPLICATE_WHATSAPP,
            SubmitError::Storage(_) => messages::STORAGE_FAILURE,
        }
    }
}

impl From<ValidationError> for SubmitError {
    fn from(e: ValidationError) -> Self {
        SubmitError::Validation(e)
    }
}

impl From<StorageError> for SubmitError {
    fn from(e: StorageError) -> Self {
        SubmitError::Storage(e)
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SubmitError::Validation(e) => Some(e),
            SubmitError::Duplicate(_) => None,
            SubmitError::Storage(e) => Some(e),
        }
    }
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Validation(e) => write!(f, "rejected: {}", e),
            SubmitError::Duplicate(field) => write!(f, "rejected: duplicate {}", field),
            SubmitError::Storage(e) => write!(f, "{}", e),
        }
    }
}

/// Errors that prevent a draw from producing a winner.
#[derive(Debug)]
pub enum DrawError {
    NoParticipants,
    Storage(StorageError),
}

impl DrawError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DrawError::NoParticipants => messages::NO_PARTICIPANTS,
            DrawError::Storage(_) => messages::STORAGE_FAILURE,
        }
    }
}

impl From<StorageError> for DrawError {
    fn from(e: StorageError) -> Self {
        DrawError::Storage(e)
    }
}

impl Error for DrawError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DrawError::NoParticipants => None,
            DrawError::Storage(e) => Some(e),
        }
    }
}

impl Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::NoParticipants => write!(f, "no participants for the draw"),
            DrawError::Storage(e) => write!(f, "{}", e),
        }
    }
}
