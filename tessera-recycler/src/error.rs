//! Error types reported by the pool and the recycler.
use thiserror::Error;

use crate::pool::{PoolHandle, TemplateId};

/// Boxed error returned by template factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by a [`Pool`](crate::pool::Pool) or a
/// [`PoolRegistry`](crate::pool::PoolRegistry).
#[derive(Debug, Error)]
pub enum PoolError {
    /// The entry is already free. Releasing it again is a logic error.
    #[error("pool entry {0:?} is not active")]
    NotActive(PoolHandle),
    /// The handle does not belong to this pool, or the pool was torn down.
    #[error("pool entry {0:?} does not exist")]
    StaleHandle(PoolHandle),
    /// No pool is registered for the template.
    #[error("template {0} is not registered")]
    UnknownTemplate(TemplateId),
    /// The template factory failed. The acquisition is not retried.
    #[error("factory for template {template} failed")]
    Factory {
        /// Template whose factory failed.
        template: TemplateId,
        /// Error reported by the factory.
        #[source]
        source: BoxError,
    },
}

/// Errors surfaced by [`RecyclerView`](crate::recycler::RecyclerView)
/// operations.
#[derive(Debug, Error)]
pub enum RecyclerError {
    /// `initialize` named a template that was never registered.
    #[error("template {0} is not registered")]
    UnknownTemplate(TemplateId),
    /// An operation that needs a dataset ran before `initialize`.
    #[error("recycler has not been initialized with a template")]
    NotInitialized,
    /// `snap_to_element` was asked for an index outside the dataset.
    #[error("index {index} is outside the dataset of {len} items")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current dataset length.
        len: usize,
    },
    /// A pool operation failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}
