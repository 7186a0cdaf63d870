//! Request status machine.
//!
//! ```text
//! Pending --accept--> Accepted --complete--> Completed
//!    |
//!    +----reject----> Rejected
//! ```
//!
//! Nothing leaves `Rejected` or `Completed`, and nothing goes back to `Pending`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Accept,
    Reject,
    Complete,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Accepted => "Accepted",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Completed => "Completed",
        }
    }

    /// Status the request moves to when `action` is applied, or a
    /// not-permitted error when the transition does not exist.
    pub fn apply(self, action: RequestAction) -> ExchangeResult<RequestStatus> {
        match (self, action) {
            (RequestStatus::Pending, RequestAction::Accept) => Ok(RequestStatus::Accepted),
            (RequestStatus::Pending, RequestAction::Reject) => Ok(RequestStatus::Rejected),
            (RequestStatus::Accepted, RequestAction::Complete) => Ok(RequestStatus::Completed),
            (from, action) => Err(ExchangeError::not_permitted(format!(
                "Cannot {action} a request that is {from}"
            ))),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Accepted" => Ok(RequestStatus::Accepted),
            "Rejected" => Ok(RequestStatus::Rejected),
            "Completed" => Ok(RequestStatus::Completed),
            _ => Err(ExchangeError::validation("Invalid status")),
        }
    }
}

impl fmt::Display for RequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            RequestAction::Accept => "accept",
            RequestAction::Reject => "reject",
            RequestAction::Complete => "complete",
        };
        f.write_str(verb)
    }
}

/// Review score, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> ExchangeResult<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(ExchangeError::validation("Rating must be between 1 and 5"))
        }
    }

    pub fn get(&self) -> i16 {
        i16::from(self.0)
    }
}
