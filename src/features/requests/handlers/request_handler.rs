use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::requests::dtos::{CreateRequestDto, RequestResponseDto, UpdateRequestDto};
use crate::features::requests::services::RequestService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Open a new draft request
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateRequestDto,
    responses(
        (status = 201, description = "Draft request opened", body = ApiResponse<RequestResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "requests"
)]
pub async fn create_request(
    State(service): State<Arc<RequestService>>,
    AppJson(dto): AppJson<CreateRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<RequestResponseDto>>)> {
    dto.validate()?;

    let request = service.create_draft(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(request), None, None)),
    ))
}

/// List requests, newest first
#[utoipa::path(
    get,
    path = "/api/requests",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of requests", body = ApiResponse<Vec<RequestResponseDto>>),
    ),
    tag = "requests"
)]
pub async fn list_requests(
    State(service): State<Arc<RequestService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<RequestResponseDto>>>> {
    let (requests, total) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(requests),
        None,
        Some(Meta { total }),
    )))
}

/// Get a request by ID
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request found", body = ApiResponse<RequestResponseDto>),
        (status = 404, description = "Request not found")
    ),
    tag = "requests"
)]
pub async fn get_request(
    State(service): State<Arc<RequestService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RequestResponseDto>>> {
    let request = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(request), None, None)))
}

/// Edit a draft or failed request
#[utoipa::path(
    patch,
    path = "/api/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    request_body = UpdateRequestDto,
    responses(
        (status = 200, description = "Request updated", body = ApiResponse<RequestResponseDto>),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is submitted or a submission is in progress")
    ),
    tag = "requests"
)]
pub async fn update_request(
    State(service): State<Arc<RequestService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateRequestDto>,
) -> Result<Json<ApiResponse<RequestResponseDto>>> {
    dto.validate()?;

    let request = service.update_draft(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(request), None, None)))
}

/// Validate and submit a request to the processing endpoint
#[utoipa::path(
    post,
    path = "/api/requests/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request submitted", body = ApiResponse<RequestResponseDto>),
        (status = 400, description = "Validation error with one entry per offending field"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "A submission is already in progress"),
        (status = 502, description = "Processing endpoint rejected the request")
    ),
    tag = "requests"
)]
pub async fn submit_request(
    State(service): State<Arc<RequestService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RequestResponseDto>>> {
    let request = service.submit(id).await?;
    Ok(Json(ApiResponse::success(
        Some(request),
        Some("Request submitted successfully".to_string()),
        None,
    )))
}
