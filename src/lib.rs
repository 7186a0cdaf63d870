//! Skill exchange marketplace.
//!
//! Users list skills they can teach, request other users' skills, and review
//! the exchange once it is completed. The HTTP service in [`routes`] is the
//! source of truth; [`client`] is the thin typed wrapper a front end calls.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod exchange;
pub mod lifecycle;
pub mod routes;
pub mod types;
pub mod validation;

pub use error::{ExchangeError, ExchangeResult};
pub use lifecycle::RequestStatus;
