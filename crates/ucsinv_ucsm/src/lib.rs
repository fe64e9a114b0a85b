//! `ucsinv_ucsm` v1:
//! Cisco UCS Manager XML API session and class query client.
//!
//! Modules:
//! - `spec`   : connection settings, session and errors
//! - `xml`    : request bodies and response parsing
//! - `client` : blocking HTTP client implementing `InventorySource`
pub mod client;
pub mod spec;
pub mod xml;

pub use client::UcsmClient;
pub use spec::{SpecUcsmConnection, SpecUcsmSession, UcsmError};
