//! Device position lookup policy.
//!
//! The first attempt asks for a precise fix. A timeout or an unavailable
//! position is retried once with relaxed options; a denied permission is
//! final.

use crate::error::GeolocationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    pub maximum_age_ms: u32,
}

impl LocateOptions {
    /// First attempt: GPS-grade fix, no cached positions.
    pub const PRECISE: Self = Self {
        high_accuracy: true,
        timeout_ms: 15_000,
        maximum_age_ms: 0,
    };

    /// Retry: network-grade fix, accepts a position up to a minute old.
    pub const RELAXED: Self = Self {
        high_accuracy: false,
        timeout_ms: 20_000,
        maximum_age_ms: 60_000,
    };
}

impl GeolocationError {
    /// Maps a `GeolocationPositionError.code`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::PositionUnavailable,
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            GeolocationError::Timeout | GeolocationError::PositionUnavailable
        )
    }
}

/// Options for the retry after `first` failed, or `None` when the failure
/// is final.
pub fn retry_options(first: GeolocationError) -> Option<LocateOptions> {
    first.is_retryable().then_some(LocateOptions::RELAXED)
}

pub const LOCATING_STATUS: &str = "Getting your location…";
pub const RETRYING_STATUS: &str = "Trying again with less precise location…";
