use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::FieldError;

/// Kind of ticket request an operator can file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Refund,
    PaymentDeposit,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Refund => write!(f, "refund"),
            RequestType::PaymentDeposit => write!(f, "payment_deposit"),
        }
    }
}

/// Request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Draft,
    Submitted,
    Failed,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Draft => write!(f, "draft"),
            RequestStatus::Submitted => write!(f, "submitted"),
            RequestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Form fields a validation error can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    CustomerIdentifier,
    TicketReference,
    Amount,
}

impl RequestField {
    /// Field name as the form knows it (matches the JSON payload keys)
    pub fn name(&self) -> &'static str {
        match self {
            RequestField::CustomerIdentifier => "customerIdentifier",
            RequestField::TicketReference => "ticketReference",
            RequestField::Amount => "amount",
        }
    }
}

/// One per-field contract violation found by [`TicketRequest::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: RequestField,
    pub message: String,
}

impl FieldViolation {
    fn new(field: RequestField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<FieldViolation> for FieldError {
    fn from(violation: FieldViolation) -> Self {
        FieldError::new(violation.field.name(), violation.message)
    }
}

/// Snapshot of a request that passed validation. Only a `ValidRequest` can
/// be handed to the submission gateway; it also serves as the payload body
/// sent to the processing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidRequest {
    pub request_id: Uuid,
    pub request_type: RequestType,
    pub customer_identifier: String,
    pub ticket_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A ticket refund / payment-deposit request as the operator drafts it
#[derive(Debug, Clone)]
pub struct TicketRequest {
    pub id: Uuid,
    pub request_type: RequestType,
    pub customer_identifier: String,
    pub ticket_reference: String,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    pub status: RequestStatus,
    /// Reason reported by the processing endpoint, present while `Failed`
    pub failure_reason: Option<String>,
    /// Reference number assigned by the processing endpoint once `Submitted`
    pub reference_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl TicketRequest {
    /// Open a new draft. Identifier fields may still be blank at this point;
    /// they are only enforced at submission time.
    pub fn draft(
        request_type: RequestType,
        customer_identifier: String,
        ticket_reference: String,
        amount: Option<Decimal>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            request_type,
            customer_identifier,
            ticket_reference,
            amount,
            notes,
            status: RequestStatus::Draft,
            failure_reason: None,
            reference_number: None,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        }
    }

    /// Check the submission contract, returning one violation per offending
    /// field. Identifier fields must carry non-whitespace content for every
    /// request type; an amount greater than zero is required for payment
    /// deposits only. A refund carrying an amount is passed through as-is.
    pub fn validate(&self) -> Result<ValidRequest, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if self.customer_identifier.trim().is_empty() {
            violations.push(FieldViolation::new(
                RequestField::CustomerIdentifier,
                "Customer identifier is required",
            ));
        }

        if self.ticket_reference.trim().is_empty() {
            violations.push(FieldViolation::new(
                RequestField::TicketReference,
                "Ticket reference is required",
            ));
        }

        if self.request_type == RequestType::PaymentDeposit {
            match self.amount {
                None => violations.push(FieldViolation::new(
                    RequestField::Amount,
                    "Amount is required for payment deposit requests",
                )),
                Some(amount) if amount <= Decimal::ZERO => violations.push(FieldViolation::new(
                    RequestField::Amount,
                    "Amount must be greater than zero",
                )),
                Some(_) => {}
            }
        }

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(ValidRequest {
            request_id: self.id,
            request_type: self.request_type,
            customer_identifier: self.customer_identifier.trim().to_string(),
            ticket_reference: self.ticket_reference.trim().to_string(),
            amount: self.amount,
            notes: self.notes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(request_type: RequestType, amount: Option<Decimal>) -> TicketRequest {
        TicketRequest::draft(
            request_type,
            "C1".to_string(),
            "T1".to_string(),
            amount,
            None,
        )
    }

    #[test]
    fn refund_never_requires_amount() {
        let request = draft(RequestType::Refund, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn deposit_requires_amount() {
        let request = draft(RequestType::PaymentDeposit, None);
        let violations = request.validate().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, RequestField::Amount);
    }

    #[test]
    fn deposit_rejects_zero_amount() {
        let request = draft(RequestType::PaymentDeposit, Some(Decimal::ZERO));
        let violations = request.validate().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, RequestField::Amount);
    }

    #[test]
    fn deposit_rejects_negative_amount() {
        let request = draft(RequestType::PaymentDeposit, Some(Decimal::new(-500, 2)));
        let violations = request.validate().unwrap_err();
        assert_eq!(violations[0].field, RequestField::Amount);
    }

    #[test]
    fn deposit_accepts_positive_amount() {
        let request = draft(RequestType::PaymentDeposit, Some(Decimal::new(12050, 2)));
        let valid = request.validate().unwrap();
        assert_eq!(valid.amount, Some(Decimal::new(12050, 2)));
    }

    #[test]
    fn empty_identifiers_reject_regardless_of_type() {
        for request_type in [RequestType::Refund, RequestType::PaymentDeposit] {
            let mut request = draft(request_type, Some(Decimal::ONE));
            request.customer_identifier = String::new();
            request.ticket_reference = "   ".to_string();

            let violations = request.validate().unwrap_err();
            let fields: Vec<RequestField> = violations.iter().map(|v| v.field).collect();
            assert!(fields.contains(&RequestField::CustomerIdentifier));
            assert!(fields.contains(&RequestField::TicketReference));
        }
    }

    #[test]
    fn one_violation_per_field() {
        let mut request = draft(RequestType::PaymentDeposit, None);
        request.customer_identifier = String::new();
        request.ticket_reference = String::new();

        let violations = request.validate().unwrap_err();
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn valid_request_trims_identifier_fields() {
        let mut request = draft(RequestType::Refund, None);
        request.customer_identifier = " C1 ".to_string();
        request.ticket_reference = " T1 ".to_string();

        let valid = request.validate().unwrap();
        assert_eq!(valid.customer_identifier, "C1");
        assert_eq!(valid.ticket_reference, "T1");
    }
}
