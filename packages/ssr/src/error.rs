//! Error taxonomy for the render-to-string serializer.

use weave_core::CoreError;

/// Errors that can occur while rendering a tree to an HTML string.
#[derive(thiserror::Error, Debug, Clone)]
pub enum SsrError {
    /// A resource's producer did not resolve on its first synchronous poll
    /// and the render carried no pre-populated value for it. `key`
    /// identifies the resource's scope and hook slot, not a user-chosen
    /// name.
    #[error("resource `{key}` has no synchronous value available for server-side rendering")]
    DataMissing { key: String },

    /// Any other failure mounting the root tree: a hook-order break, a
    /// panicking component, an update-depth violation.
    #[error("failed to mount the root component: {0}")]
    Mount(CoreError),
}

impl From<CoreError> for SsrError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SsrDataMissing { key } => SsrError::DataMissing { key },
            other => SsrError::Mount(other),
        }
    }
}
