use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_status(status: StatusCode, data: T, message: &str) -> HttpResponse {
        HttpResponse::build(status).json(ApiResponse {
            status_code: status.as_u16(),
            data: Some(data),
            message: message.to_string(),
            success: true,
        })
    }

    pub fn ok(data: T, message: &str) -> HttpResponse {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: &str) -> HttpResponse {
        Self::with_status(StatusCode::CREATED, data, message)
    }
}
