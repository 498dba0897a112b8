use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::requests::models::{RequestStatus, RequestType, TicketRequest};

/// Request DTO for opening a draft. Only the request type is fixed up
/// front; identifier fields may stay blank until submission.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestDto {
    /// Kind of request the operator is filing
    pub request_type: RequestType,

    #[serde(default)]
    #[validate(length(max = 128, message = "Customer identifier must not exceed 128 characters"))]
    pub customer_identifier: String,

    #[serde(default)]
    #[validate(length(max = 128, message = "Ticket reference must not exceed 128 characters"))]
    pub ticket_reference: String,

    /// Amount in the booking currency; required before submitting a
    /// payment deposit
    pub amount: Option<Decimal>,

    #[validate(length(max = 2000, message = "Notes must not exceed 2000 characters"))]
    pub notes: Option<String>,
}

/// Request DTO for editing a draft; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestDto {
    pub request_type: Option<RequestType>,

    #[validate(length(max = 128, message = "Customer identifier must not exceed 128 characters"))]
    pub customer_identifier: Option<String>,

    #[validate(length(max = 128, message = "Ticket reference must not exceed 128 characters"))]
    pub ticket_reference: Option<String>,

    pub amount: Option<Decimal>,

    #[validate(length(max = 2000, message = "Notes must not exceed 2000 characters"))]
    pub notes: Option<String>,
}

/// Response DTO for a ticket request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponseDto {
    pub id: Uuid,
    pub request_type: RequestType,
    pub customer_identifier: String,
    pub ticket_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: RequestStatus,
    /// Assigned by the processing endpoint once submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    /// Present while the request is in the failed state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<TicketRequest> for RequestResponseDto {
    fn from(request: TicketRequest) -> Self {
        Self {
            id: request.id,
            request_type: request.request_type,
            customer_identifier: request.customer_identifier,
            ticket_reference: request.ticket_reference,
            amount: request.amount,
            notes: request.notes,
            status: request.status,
            reference_number: request.reference_number,
            failure_reason: request.failure_reason,
            created_at: request.created_at,
            updated_at: request.updated_at,
            submitted_at: request.submitted_at,
        }
    }
}
