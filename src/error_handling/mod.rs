//! Error types for every stage of a check run.
//!
//! Errors are split by stage so the pipeline driver can decide what to do
//! with each of them:
//! - **Recovered**: `FetchError` (the host is logged and skipped)
//! - **Fatal**: everything else, collected into `RunError` and returned to the
//!   caller of `run_check`

mod types;

// Re-export public API
pub use types::{
    CertificateError, ConfigurationError, DeliveryError, FetchError, InitializationError,
    RunError, SourceUnavailableError, TemplateError,
};
