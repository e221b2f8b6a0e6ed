use actix_web::http::header::{self, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::shared::api::ApiResponse;
use crate::upload::application::use_cases::{UploadCommand, UploadError};
use crate::AppState;

//
// ──────────────────────────────────────────────────────────
// Request DTO
// ──────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize, Serialize)]
pub struct UploadRequest {
    /// Raw base64 or a `data:image/...;base64,` data URL. Optional at the
    /// parse level so a missing field maps to the same 400 as an empty one.
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub filename: Option<String>,
}

//
// ──────────────────────────────────────────────────────────
// Routes
// ──────────────────────────────────────────────────────────
//

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    // The same handler set serves the root and the named endpoint; the two
    // paths exist for the different hosting transports that call us.
    for path in ["/", "/upload"] {
        cfg.service(
            web::resource(path)
                .route(web::post().to(upload_image_handler))
                .route(web::method(Method::OPTIONS).to(preflight_handler))
                .default_service(web::route().to(method_not_allowed_handler)),
        );
    }
}

/// The endpoint is called cross-origin from browser clients, so every
/// response carries permissive CORS headers.
fn with_cors(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn preflight_handler() -> HttpResponse {
    with_cors(HttpResponse::NoContent().finish())
}

async fn method_not_allowed_handler() -> HttpResponse {
    with_cors(ApiResponse::method_not_allowed("Method not allowed. Use POST."))
}

//
// ──────────────────────────────────────────────────────────
// Handler
// ──────────────────────────────────────────────────────────
//

/// Body is taken as raw bytes and parsed here so that unparseable JSON gets
/// the documented 400 envelope instead of the framework's default error.
pub async fn upload_image_handler(body: web::Bytes, data: web::Data<AppState>) -> HttpResponse {
    info!("Upload request received");

    let request: UploadRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to parse request body");
            return with_cors(ApiResponse::bad_request("Invalid JSON in request body"));
        }
    };

    let command = UploadCommand {
        image: request.image.unwrap_or_default(),
        filename: request.filename,
    };

    match data.upload_image.execute(command).await {
        Ok(receipt) => with_cors(ApiResponse::success(
            "Image uploaded successfully to GitHub",
            receipt,
        )),
        Err(err) => {
            error!(error = %err, "Upload failed");
            with_cors(error_response(err, data.config.expose_details))
        }
    }
}

/// Converts use-case errors to the response envelope. The client-facing
/// status mirrors the upstream status when one is known; raw upstream detail
/// is only echoed outside production.
fn error_response(err: UploadError, expose_details: bool) -> HttpResponse {
    let status = match &err {
        UploadError::MissingImage | UploadError::InvalidPayload => StatusCode::BAD_REQUEST,
        UploadError::TokenNotConfigured | UploadError::StoreUnreachable { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        UploadError::StoreRejected { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    let details = match &err {
        UploadError::StoreRejected { details, .. }
        | UploadError::StoreUnreachable { details, .. }
            if expose_details =>
        {
            Some(details.clone())
        }
        _ => None,
    };

    ApiResponse::error_with_details(status, &err.to_string(), details)
}
