// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed errors for gateway calls.
//!
//! Callers pattern-match on the variant instead of catching broad error
//! types: a 404 is expected control flow (`NotFound`), a rejected payload is
//! user input to correct (`Validation`), and only `Transport`/`Protocol`
//! indicate the backend is unreachable or misbehaving.

use thiserror::Error;

/// Errors returned by [`PlanesClient`](crate::PlanesClient) operations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server rejected the request content (4xx other than 404), or a
    /// client-side pre-check failed. Non-retryable; the form stays open for
    /// correction.
    #[error("request rejected: {message}")]
    Validation {
        /// Server-provided detail message, or the failed pre-check.
        message: String,
    },

    /// The referenced plane no longer exists server-side (404).
    #[error("plane {id} not found")]
    NotFound {
        /// The id that was requested.
        id: i64,
    },

    /// Network/connection failure, or a transient server error (502/503/504)
    /// that persisted after all retries.
    #[error("transport failure: {message}")]
    Transport {
        /// What went wrong on the wire.
        message: String,
    },

    /// The server answered with an unexpected status or a malformed body.
    /// Treated as a bug signal.
    #[error("unexpected response: {message}")]
    Protocol {
        /// Description of the unexpected response.
        message: String,
    },
}

impl ApiError {
    /// Whether this error means the entity is gone and the caller should
    /// resynchronize its collection.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
