// ⚠️ Election Errors - every rejection the model can report
//
// Nothing here is fatal: each variant describes an operation that was refused
// while leaving the election exactly as it was before the call.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::FieldError;

#[derive(Debug, Error)]
pub enum ElectionError {
    // ========================================================================
    // INPUT
    // ========================================================================
    /// One or more voter fields failed the syntax checks
    #[error("Validation failed: {}", join_field_errors(.0))]
    ValidationFailed(Vec<FieldError>),

    // ========================================================================
    // INVARIANT VIOLATIONS
    // ========================================================================
    #[error("Voter with ID {0} already exists")]
    DuplicateVoterId(u32),

    #[error("Voter with ID {id} is already registered in region '{region}'")]
    DuplicateVoterInRegion { id: u32, region: String },

    #[error("Candidate '{name}' is already registered in region '{region}'")]
    DuplicateCandidateInRegion { name: String, region: String },

    #[error("Region with code '{0}' already exists")]
    DuplicateRegionCode(String),

    #[error("Party '{party}' already has a candidate in region '{region}'")]
    PartyAlreadyRepresented { party: String, region: String },

    #[error("Candidate '{0}' is already registered in another region")]
    CandidateAlreadyInAnotherRegion(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Unknown party handle: {0}")]
    UnknownParty(usize),

    // ========================================================================
    // VOTING
    // ========================================================================
    #[error("Voter with ID {0} is not registered")]
    VoterNotFound(u32),

    #[error("Voter with ID {id} is not registered to vote in region '{region}'")]
    VoterNotInRegion { id: u32, region: String },

    #[error("Voter with ID {0} has already voted")]
    AlreadyVoted(u32),

    #[error("Invalid candidate index {index} (valid range is 0..{count})")]
    InvalidCandidateIndex { index: usize, count: usize },

    // ========================================================================
    // PERSISTENCE
    // ========================================================================
    #[error("Could not open file {path:?}: {source}")]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write file {path:?}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl ElectionError {
    pub fn open_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ElectionError::FileOpenFailed {
            path: path.into(),
            source,
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ElectionError::FileWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Field errors carried by a validation failure (empty for every other kind)
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ElectionError::ValidationFailed(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ElectionError>;
