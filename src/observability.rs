//! Observability module for correlation and tracing

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation ID for tracking one operation across its network round-trips
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Trace identifiers for one exported operation
///
/// Every operation (`init`, `change-admin`, `lock`, ...) opens a context;
/// the submission pipeline opens a child span under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceContext {
    /// Unique trace identifier for the entire operation
    pub trace_id: String,

    /// Unique span identifier for this specific step
    pub span_id: String,

    pub correlation_id: CorrelationId,

    pub parent_span_id: Option<String>,

    /// Operation name
    pub operation: String,
}

impl TraceContext {
    /// Create a new trace context for an operation
    pub fn new(operation: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            span_id: Uuid::new_v4().to_string(),
            correlation_id: CorrelationId::new(),
            parent_span_id: None,
            operation: operation.to_string(),
        }
    }

    /// Create a child span context
    pub fn child_span(&self, operation: &str) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: Uuid::new_v4().to_string(),
            correlation_id: self.correlation_id.clone(),
            parent_span_id: Some(self.span_id.clone()),
            operation: operation.to_string(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// `tracing` span carrying this context's identifiers
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "operation",
            op = %self.operation,
            correlation_id = %self.correlation_id,
            span_id = %self.span_id,
        )
    }
}
