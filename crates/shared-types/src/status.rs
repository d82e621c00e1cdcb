//! # Status Codes
//!
//! The status vocabulary reported by the vehicle HAL and attached to every
//! failed get/set outcome delivered to a caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Status of a vehicle HAL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    /// Transient failure; the caller may retry.
    TryAgain = 1,
    InvalidArg = 2,
    /// The property is not available in the current state.
    NotAvailable = 3,
    AccessDenied = 4,
    InternalError = 5,
    NotAvailableDisabled = 6,
    NotAvailableSpeedLow = 7,
    NotAvailableSpeedHigh = 8,
    NotAvailablePoorVisibility = 9,
    NotAvailableSafety = 10,
}

/// Raised when an integer does not name a known status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown status code: {0}")]
pub struct UnknownStatusCode(pub i32);

impl StatusCode {
    /// Integer form used on the wire and in log lines.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = UnknownStatusCode;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let code = match value {
            0 => StatusCode::Ok,
            1 => StatusCode::TryAgain,
            2 => StatusCode::InvalidArg,
            3 => StatusCode::NotAvailable,
            4 => StatusCode::AccessDenied,
            5 => StatusCode::InternalError,
            6 => StatusCode::NotAvailableDisabled,
            7 => StatusCode::NotAvailableSpeedLow,
            8 => StatusCode::NotAvailableSpeedHigh,
            9 => StatusCode::NotAvailablePoorVisibility,
            10 => StatusCode::NotAvailableSafety,
            other => return Err(UnknownStatusCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Ok => "OK",
            StatusCode::TryAgain => "TRY_AGAIN",
            StatusCode::InvalidArg => "INVALID_ARG",
            StatusCode::NotAvailable => "NOT_AVAILABLE",
            StatusCode::AccessDenied => "ACCESS_DENIED",
            StatusCode::InternalError => "INTERNAL_ERROR",
            StatusCode::NotAvailableDisabled => "NOT_AVAILABLE_DISABLED",
            StatusCode::NotAvailableSpeedLow => "NOT_AVAILABLE_SPEED_LOW",
            StatusCode::NotAvailableSpeedHigh => "NOT_AVAILABLE_SPEED_HIGH",
            StatusCode::NotAvailablePoorVisibility => "NOT_AVAILABLE_POOR_VISIBILITY",
            StatusCode::NotAvailableSafety => "NOT_AVAILABLE_SAFETY",
        };
        write!(f, "{}({})", name, self.as_i32())
    }
}
