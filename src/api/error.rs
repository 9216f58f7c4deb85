use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::generators::GeneratorError;
use crate::ErrorResponse;

impl ResponseError for GeneratorError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidData(_) => StatusCode::BAD_REQUEST,
            Self::TemplateNotFound(_) | Self::UnknownKind(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Validation(errors) => ErrorResponse::new("ValidationError", &errors.to_message()),
            Self::InvalidData(_) => ErrorResponse::bad_request(&self.to_string()),
            Self::TemplateNotFound(_) | Self::UnknownKind(_) => {
                ErrorResponse::not_found(&self.to_string())
            }
            Self::UnsupportedFormat(_) => {
                ErrorResponse::new("UnsupportedMediaType", &self.to_string())
            }
            Self::StoreUnavailable(_) => {
                ErrorResponse::new("ServiceUnavailable", &self.to_string())
            }
            Self::Render(_) => ErrorResponse::internal_error(&self.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{ValidationError, ValidationErrors};

    #[test]
    fn test_status_codes() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::empty_field("company.name", "Tên công ty"));
        assert_eq!(
            GeneratorError::Validation(errors).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GeneratorError::TemplateNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GeneratorError::UnsupportedFormat("pdf".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            GeneratorError::StoreUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
