use utoipa::{Modify, OpenApi};

use crate::core::error::FieldError;
use crate::features::requests::{dtos as requests_dtos, handlers as requests_handlers, models as requests_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Requests
        requests_handlers::request_handler::create_request,
        requests_handlers::request_handler::list_requests,
        requests_handlers::request_handler::get_request,
        requests_handlers::request_handler::update_request,
        requests_handlers::request_handler::submit_request,
    ),
    components(
        schemas(
            // Shared
            Meta,
            FieldError,
            // Requests
            requests_models::RequestType,
            requests_models::RequestStatus,
            requests_dtos::CreateRequestDto,
            requests_dtos::UpdateRequestDto,
            requests_dtos::RequestResponseDto,
            ApiResponse<requests_dtos::RequestResponseDto>,
            ApiResponse<Vec<requests_dtos::RequestResponseDto>>,
        )
    ),
    tags(
        (name = "requests", description = "Ticket refund and payment-deposit requests"),
    ),
    info(
        title = "AeroDesk API",
        version = "0.1.0",
        description = "API documentation for AeroDesk",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
