pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{BoxError, EngineError, Result};
pub use traits::{ComputeResult, Computation, ResultAdapter};
pub use types::*;
