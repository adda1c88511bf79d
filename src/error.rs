use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::core::{MAX_LINES, MIN_LINES};
use crate::models::ErrorResponse;
use crate::share::ShareError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Invalid request data
    ValidationError(String),
    /// Unknown share code
    NotFound(String),
    /// Share past its expiry date
    Expired(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Expired(msg) => write!(f, "Expired: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ShareError> for AppError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::NotFound(code) => {
                AppError::NotFound(format!("No share with code {}", code))
            }
            ShareError::Expired(code) => {
                AppError::Expired(format!("Share {} has expired", code))
            }
            ShareError::InvalidPayload(msg) => AppError::ValidationError(msg),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("validation_error", msg.clone()),
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::Expired(msg) => ("expired", msg.clone()),
            AppError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

/// Validation functions
pub fn validate_line_count(count: usize) -> Result<(), AppError> {
    if !(MIN_LINES..=MAX_LINES).contains(&count) {
        return Err(AppError::ValidationError(format!(
            "Between {} and {} lines required, got {}",
            MIN_LINES, MAX_LINES, count
        )));
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::ValidationError(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

pub fn validate_commission(commission: f64) -> Result<(), AppError> {
    if !(0.0..100.0).contains(&commission) {
        return Err(AppError::ValidationError(format!(
            "Commission must be between 0 and 100 percent, got {}",
            commission
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_line_count_valid() {
        for n in 2..=5 {
            assert!(validate_line_count(n).is_ok());
        }
    }

    #[test]
    fn test_validate_line_count_invalid() {
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(1).is_err());
        assert!(validate_line_count(6).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("odds", 0.0).is_ok());
        assert!(validate_non_negative("odds", 2.5).is_ok());
        assert!(validate_non_negative("odds", -0.01).is_err());
        assert!(validate_non_negative("stake", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_commission() {
        assert!(validate_commission(0.0).is_ok());
        assert!(validate_commission(6.5).is_ok());
        assert!(validate_commission(100.0).is_err());
        assert!(validate_commission(-1.0).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = AppError::ValidationError("test error".to_string());
        assert!(err.to_string().contains("Validation error"));
    }

    #[test]
    fn test_share_error_mapping() {
        let err: AppError = ShareError::NotFound("DTX".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: AppError = ShareError::Expired("DTX".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::GONE);

        let err: AppError = ShareError::InvalidPayload("bad".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: AppError = ShareError::Storage(io).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
