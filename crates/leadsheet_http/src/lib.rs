//! Access to lead records stored in a remote spreadsheet.
//!
//! Reads use the configured api key. Writes are authorized with a bearer
//! token minted from the service account, see [`credentials`].

pub mod access;
pub mod client;
pub mod credentials;
pub mod refresh;
pub mod sheets;

#[cfg(test)]
mod testutil;

pub use access::{AppendOutcome, ClientOptions, LeadSheetClient, UpdateOutcome};
pub use client::{HttpClient, ReqwestHttpClient};
pub use credentials::TokenPolicy;
pub use refresh::{RefreshEvent, RefreshHandle, spawn_silent_refresh};
