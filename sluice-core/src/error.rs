use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Allocation failed for {what}: {source}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CoreError {
    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| CoreError::Allocation { what, source }
    }
}
