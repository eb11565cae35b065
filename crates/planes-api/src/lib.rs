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

//! Client library for the FlySmart plane inventory REST API.
//!
//! This library provides the non-UI layers of the desktop client and can be
//! used independently of it:
//!
//! - **Model layer**: the [`PlaneRecord`] entity and its exact JSON wire
//!   format, including the legacy `FlightId` field alias
//! - **Gateway layer**: [`PlanesClient`], an async HTTP client with fixed
//!   timeouts, bounded retry on transient server errors, and typed errors
//! - **Store layer**: [`PlaneStore`], the authoritative in-memory collection
//!   with pure display filtering
//!
//! # Quick Start
//!
//! ```no_run
//! use planes_api::{ClientConfig, PlaneFilter, PlaneStore, PlanesClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), planes_api::ApiError> {
//!     let client = PlanesClient::new(ClientConfig {
//!         base_url: "http://127.0.0.1:8000".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     let mut store = PlaneStore::new();
//!     store.replace_all(client.list_all().await?);
//!
//!     let filter = PlaneFilter {
//!         search: "737".to_string(),
//!         ..Default::default()
//!     };
//!     for plane in store.filtered(&filter) {
//!         println!("{} ({}, {})", plane.name, plane.manufacturer, plane.year);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error handling
//!
//! Every gateway call returns a typed [`ApiError`] so callers can
//! pattern-match instead of catching broad failures:
//!
//! ```no_run
//! use planes_api::{ApiError, ClientConfig, PlanesClient};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = PlanesClient::new(ClientConfig::default()).unwrap();
//! match client.get_by_id(42).await {
//!     Ok(plane) => println!("{}", plane.name),
//!     Err(ApiError::NotFound { id }) => println!("plane {id} is gone, reload the list"),
//!     Err(e) => eprintln!("request failed: {e}"),
//! }
//! # }
//! ```

pub mod client;
pub mod error;
pub mod model;
pub mod store;

pub use client::{ClientConfig, PlanesClient, RetryPolicy, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use model::{DeleteReceipt, PlaneFields, PlaneRecord};
pub use store::{PlaneFilter, PlaneStore};
