//! Errors that end a top-level command.

use thiserror::Error;

use crate::collector::CollectorError;
use crate::sync::RemoteError;

/// Failures that escape the interactive loops.
///
/// Invalid menu input, out-of-range indices and unsupported actions are
/// handled inside the loops and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote store or event source failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// The operator's input stream failed or closed.
    #[error(transparent)]
    Input(#[from] CollectorError),
}
