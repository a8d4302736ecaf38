//! Backend boundary for query compilation and execution
//!
//! Transport lives outside this crate. A [`Backend`] receives the immutable
//! [`Table`] snapshot, ships the lowered wire message to an execution
//! agent, and returns either the agent-native query text or decoded result
//! rows. Implementations own connection management, authentication,
//! retries, and response decoding.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::table::Table;

/// A decoded result row
///
/// Rows come back as loosely typed JSON objects keyed by output column
/// name, matching the agent's execution response.
pub type Row = serde_json::Value;

/// Remote execution boundary for table queries
#[async_trait]
pub trait Backend: Send + Sync {
    /// Compile the query and return the agent-native query string
    ///
    /// Implementations lower the table with the dry-run flag set, so the
    /// agent validates and compiles without running anything.
    async fn compile(&self, query: &Table) -> Result<String, BackendError>;

    /// Execute the query and return decoded rows
    async fn execute(&self, query: &Table) -> Result<Vec<Row>, BackendError>;
}
