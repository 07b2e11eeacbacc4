//! Non-fatal normalization conflicts.
//!
//! The builder resolves these locally (dropping or overwriting the offending
//! entry) and reports each one as a [`Diagnostic`]. Every diagnostic is also
//! logged at `warn` level when it is recorded.

use serde::Serialize;
use tracing::warn;

/// A conflict the builder resolved without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Diagnostic {
    /// A parameter's wire name repeats an earlier one; the later one was dropped.
    #[error("endpoint '{endpoint}': duplicate parameter '{parameter}' dropped")]
    DuplicateParameter {
        /// Display name of the endpoint.
        endpoint: String,
        /// Wire name of the dropped parameter.
        parameter: String,
    },

    /// Two endpoints normalize to the same method, path, and parameters.
    #[error("client '{client}': duplicate endpoint {http_method} {path} replaced by a later one")]
    DuplicateEndpoint {
        /// Client name.
        client: String,
        /// HTTP method of the replaced endpoint.
        http_method: String,
        /// Route path of the replaced endpoint.
        path: String,
    },

    /// Two methods share a name and callable parameter types.
    #[error("client '{client}': duplicate method signature '{method}' replaced by a later one")]
    DuplicateSignature {
        /// Client name.
        client: String,
        /// Method name.
        method: String,
    },

    /// No 2xx response declares a type; the method returns nothing.
    #[error("endpoint '{endpoint}': no response type found, assuming void")]
    MissingResponseType {
        /// Display name of the endpoint.
        endpoint: String,
    },
}

/// Ordered diagnostics collected during one build.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Logs and records a diagnostic.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        warn!(diagnostic = %diagnostic, "Normalization conflict");
        self.entries.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
