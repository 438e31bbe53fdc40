//! Lead records and how they're laid out in a spreadsheet.
//!
//! Nothing in here talks to the network. See `leadsheet_http` for that.

pub mod column;
pub mod config;
pub mod lead;
pub mod lookup;
pub mod mapper;
pub mod mapping;
pub mod range;

pub use column::Column;
pub use config::{CredentialBundle, ServiceAccountKey};
pub use lead::{CellValue, HotelCategory, Lead, LeadField, LeadPatch, LeadStatus};
pub use mapping::ColumnMapping;
