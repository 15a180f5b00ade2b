use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AccrualApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Accrual system unavailable after {attempts} attempts. {reason}")]
    Unavailable { attempts: u32, reason: String },
    #[error("Unexpected response from the accrual system. Error {status}. {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Invalid accrual response: {0}")]
    InvalidResponse(String),
}
