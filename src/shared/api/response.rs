// src/shared/api/response.rs
use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// Uniform response envelope for every endpoint.
///
/// Success: `{ "success": true, "message": ..., "data": ... }`
/// Failure: `{ "success": false, "error": ..., "details"?: ... }`
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
            error: None,
            details: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn error(status: StatusCode, message: &str) -> HttpResponse {
        Self::error_with_details(status, message, None)
    }

    pub fn error_with_details(
        status: StatusCode,
        message: &str,
        details: Option<String>,
    ) -> HttpResponse {
        HttpResponse::build(status).json(ApiResponse::<()> {
            success: false,
            message: None,
            data: None,
            error: Some(message.to_string()),
            details,
        })
    }

    pub fn bad_request(message: &str) -> HttpResponse {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    pub fn method_not_allowed(message: &str) -> HttpResponse {
        Self::error(StatusCode::METHOD_NOT_ALLOWED, message)
    }
}
