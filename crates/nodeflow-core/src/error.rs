use thiserror::Error;

/// Error raised by a registered computation itself.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EngineError {
    // Graph errors
    #[error("{}", missing_dependency_message(.missing, .requested_by.as_deref(), .chain))]
    MissingDependency {
        /// Name that has neither an input value nor a registered computation.
        missing: String,
        /// Computation that declared the missing name as a dependency.
        /// `None` when a requested target itself is unknown.
        requested_by: Option<String>,
        /// Requesting computations from the outermost target down to `requested_by`.
        chain: Vec<String>,
    },

    #[error("Cycle detected: {}", .cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error("Computation '{node}' declares unsupported variadic parameter '{parameter}'")]
    UnsupportedParameter { node: String, parameter: String },

    // Construction errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Domain errors, surfaced exactly as the computation raised them
    #[error(transparent)]
    Computation(BoxError),

    // Config file errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether the graph itself is malformed, as opposed to a computation failing.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::MissingDependency { .. }
                | Self::CycleDetected { .. }
                | Self::UnsupportedParameter { .. }
        )
    }

    /// The error a computation raised, if this is a domain failure.
    pub fn computation_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Computation(err) => Some(&**err),
            _ => None,
        }
    }

    /// Record that `node` was resolving a dependency when this error surfaced.
    ///
    /// Only missing-dependency errors accumulate context; everything else is
    /// returned untouched.
    pub fn requested_via(self, node: &str) -> Self {
        match self {
            Self::MissingDependency {
                missing,
                requested_by,
                mut chain,
            } => {
                chain.insert(0, node.to_string());
                Self::MissingDependency {
                    missing,
                    requested_by: requested_by.or_else(|| Some(node.to_string())),
                    chain,
                }
            }
            other => other,
        }
    }
}

fn missing_dependency_message(missing: &str, requested_by: Option<&str>, chain: &[String]) -> String {
    match requested_by {
        None => format!("No input value or computation available for '{}'", missing),
        Some(node) if chain.len() > 1 => format!(
            "Computation '{}' requires missing dependency '{}' (requested via {})",
            node,
            missing,
            chain.join(" -> ")
        ),
        Some(node) => format!(
            "Computation '{}' requires missing dependency '{}'",
            node, missing
        ),
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
