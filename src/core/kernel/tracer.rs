use std::fmt;

/// `tracing` target for API trace lines
pub const API_TARGET: &str = "restlink::api";
/// `tracing` target for the general application log
pub const GENERAL_TARGET: &str = "restlink::general";

/// Where a trace line is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceCategory {
    /// API trace log only
    Api,
    /// API trace log and the general log; used for failures
    Both,
}

impl fmt::Display for TraceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => f.write_str("api"),
            Self::Both => f.write_str("both"),
        }
    }
}

/// Fire-and-forget sink for trace lines
pub trait Tracer: Send + Sync {
    fn log(&self, message: &str, category: TraceCategory);
}

/// Tracer that forwards every line as a `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn log(&self, message: &str, category: TraceCategory) {
        match category {
            TraceCategory::Api => {
                tracing::info!(target: API_TARGET, category = %category, "{}", message);
            }
            TraceCategory::Both => {
                tracing::error!(target: API_TARGET, category = %category, "{}", message);
                tracing::error!(target: GENERAL_TARGET, category = %category, "{}", message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display() {
        assert_eq!(TraceCategory::Api.to_string(), "api");
        assert_eq!(TraceCategory::Both.to_string(), "both");
    }
}
