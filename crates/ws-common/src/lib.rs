//! WebShop Common
//!
//! Infrastructure shared across the workspace binaries.
//! Currently this is the structured logging setup; domain types live in
//! `ws-platform`.

pub mod logging;
