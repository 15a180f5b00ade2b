use std::time::Duration;

use loyalty_common::Points;
use serde::{Deserialize, Serialize};

use crate::AccrualApiError;

/// The order status as reported by the accrual authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

/// The JSON body of a successful (200) response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualResponse {
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
}

/// What the authority said about an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualResult {
    /// The authority has accepted the order but not started on it (or does not know it yet).
    Registered,
    Processing,
    /// Final verdict: the order is worth this many points.
    Processed(Points),
    /// Final verdict: the order earns nothing.
    Invalid,
    /// The authority asked us to back off for this long.
    RateLimited(Duration),
}

impl TryFrom<AccrualResponse> for AccrualResult {
    type Error = AccrualApiError;

    /// A `PROCESSED` verdict without an `accrual` field means the order earned no points.
    fn try_from(response: AccrualResponse) -> Result<Self, Self::Error> {
        let result = match response.status {
            AccrualStatus::Registered => Self::Registered,
            AccrualStatus::Processing => Self::Processing,
            AccrualStatus::Invalid => Self::Invalid,
            AccrualStatus::Processed => {
                let accrual = response.accrual.unwrap_or_default();
                if accrual.is_negative() {
                    return Err(AccrualApiError::InvalidResponse(format!(
                        "Order {} has a negative accrual of {accrual}",
                        response.order
                    )));
                }
                Self::Processed(accrual)
            },
        };
        Ok(result)
    }
}
