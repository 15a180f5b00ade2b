use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use loyalty_engine::{helpers::OrderNumberError, BalanceApiError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Malformed order number. {0}")]
    MalformedOrderNumber(String),
    #[error("Invalid order number. {0}")]
    InvalidOrderNumber(String),
    #[error("This order number has already been submitted by another user.")]
    OrderOwnedByOtherUser,
    #[error("Insufficient funds. {0}")]
    InsufficientFunds(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not issue access token. {0}")]
    CouldNotSerializeAccessToken(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::MalformedOrderNumber(_) => StatusCode::BAD_REQUEST,
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderOwnedByOtherUser => StatusCode::CONFLICT,
            Self::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No session token was found in the request. Please log in first.")]
    MissingToken,
    #[error("Session token is invalid. {0}")]
    ValidationError(String),
    #[error("Session token has expired.")]
    Expired,
    #[error("Session token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidOrderNumber(e @ OrderNumberError::MalformedInput(_)) => {
                Self::MalformedOrderNumber(e.to_string())
            },
            OrderFlowError::InvalidOrderNumber(e @ OrderNumberError::InvalidChecksum(_)) => {
                Self::InvalidOrderNumber(e.to_string())
            },
            OrderFlowError::OwnedByOtherUser(_) => Self::OrderOwnedByOtherUser,
            OrderFlowError::StoreError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<BalanceApiError> for ServerError {
    fn from(e: BalanceApiError) -> Self {
        match e {
            // Any order number that cannot be paid for is unprocessable, whether or not it is made of digits
            BalanceApiError::InvalidOrderNumber(e) => Self::InvalidOrderNumber(e.to_string()),
            BalanceApiError::NonPositiveSum(_) => Self::InvalidRequestBody(e.to_string()),
            BalanceApiError::InsufficientFunds(_) => Self::InsufficientFunds(e.to_string()),
            BalanceApiError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}
