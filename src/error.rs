use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::gpio::PinMode;
use crate::protocol::Envelope;

#[derive(Debug, Error)]
pub enum GpioError {
    #[error("GPIO manager not initialized")]
    NotInitialized,
    #[error("Pin {0} not found")]
    NotConfigured(u32),
    #[error("Pin {pin} is not set up as {expected}")]
    WrongMode { pin: u32, expected: PinMode },
    #[error("Invalid mode: {0}")]
    InvalidMode(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid pull up/down: {0}")]
    InvalidPull(String),
    #[error("Invalid pin number: {0}")]
    InvalidPin(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Pin {0} is already configured")]
    AlreadyConfigured(u32),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("GPIO error: {0}")]
    Gpio(String),
    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl From<reqwest::Error> for GpioError {
    fn from(e: reqwest::Error) -> Self {
        GpioError::RemoteOperation(e.to_string())
    }
}

impl ResponseError for GpioError {
    fn status_code(&self) -> StatusCode {
        match self {
            GpioError::NotConfigured(_) => StatusCode::NOT_FOUND,
            GpioError::WrongMode { .. }
            | GpioError::InvalidMode(_)
            | GpioError::InvalidState(_)
            | GpioError::InvalidPull(_)
            | GpioError::InvalidPin(_)
            | GpioError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            GpioError::AlreadyConfigured(_) => StatusCode::CONFLICT,
            GpioError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GpioError::NotInitialized | GpioError::BackendUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GpioError::RemoteOperation(_) => StatusCode::BAD_GATEWAY,
            GpioError::Config(_) | GpioError::Gpio(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Envelope::error(self.to_string()))
    }
}
