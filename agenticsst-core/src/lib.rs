//! AgenticSST Core - Shared domain types
//!
//! Identifiers, filter parameters, cached entity payloads, and the error
//! taxonomy shared by the AgenticSST collaborators. The cache machinery
//! itself lives in `agenticsst-cache`.

pub mod entities;
pub mod error;
pub mod filter;
pub mod identity;

pub use entities::{AgentContribution, AnalysisReport, CrawledDocument, ScenarioScript};
pub use error::{ConfigError, KeyError, SstError, SstResult};
pub use filter::{AnalysisFilters, FilterValue};
pub use identity::{DocumentId, ScenarioId, Timestamp};
