// Clear Ballot - Core Library
// Election model, invariant-enforcing operations, persistence, and the service layer

pub mod config;
pub mod election;
pub mod entities;
pub mod error;
pub mod export;
pub mod persistence;
pub mod results;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use config::AppConfig;
pub use election::Election;
pub use entities::{
    Candidate, Party, PartyId, Region, RegionId, Voter, INDEPENDENT,
};
pub use error::{ElectionError, Result};
pub use export::ExportPaths;
pub use persistence::{ElectionDocument, LoadSummary};
pub use results::{ResultRow, ResultsReport};
pub use service::{ElectionService, ServiceResponse};
pub use validation::{validate_voter_input, FieldError, VoterRegistration};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
