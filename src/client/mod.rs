//! Registry client - talks to the lookup endpoint and drives result state / 客户端
//!
//! - `normalize`: interprets the three response shapes
//! - `session`: single in-flight search, result state and modal preview
//! - `http`: reqwest client for lookups and design downloads
//! - `view`: plain-text rendering of cards and details

pub mod http;
pub mod normalize;
pub mod session;
pub mod view;

pub use http::{DownloadOutcome, RegistryClient};
pub use normalize::{normalize, LookupResponse, ResultState};
pub use session::{validate_query, SearchSession};
