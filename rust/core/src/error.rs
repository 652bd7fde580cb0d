// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the parser seam
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Parser initialization failed: {0}")]
    InitFailed(String),

    #[error("Parser is not initialized")]
    NotInitialized,

    #[error("Empty model data")]
    EmptyInput,

    #[error("Failed to open model: {0}")]
    OpenFailed(String),
}
