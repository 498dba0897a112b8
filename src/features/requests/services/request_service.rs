use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::NotificationService;
use crate::features::requests::clients::SubmissionGateway;
use crate::features::requests::dtos::{CreateRequestDto, RequestResponseDto, UpdateRequestDto};
use crate::features::requests::models::{RequestStatus, TicketRequest};
use crate::shared::types::PaginationQuery;

/// Registry slot for one request. `in_flight` enforces the single logical
/// submission per request: edits and second submits are rejected while set.
struct RequestSlot {
    request: TicketRequest,
    in_flight: bool,
}

/// Service owning the request-submission workflow: draft registry,
/// validation, and the Draft -> Submitted / Failed lifecycle.
pub struct RequestService {
    gateway: Arc<dyn SubmissionGateway>,
    notifier: Option<Arc<NotificationService>>,
    registry: Arc<RwLock<HashMap<Uuid, RequestSlot>>>,
}

impl RequestService {
    pub fn new(
        gateway: Arc<dyn SubmissionGateway>,
        notifier: Option<Arc<NotificationService>>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a new draft request
    pub async fn create_draft(&self, dto: CreateRequestDto) -> Result<RequestResponseDto> {
        let request = TicketRequest::draft(
            dto.request_type,
            dto.customer_identifier,
            dto.ticket_reference,
            dto.amount,
            dto.notes,
        );

        tracing::info!(
            "Draft request opened: id={}, type={}",
            request.id,
            request.request_type
        );

        let mut registry = self.registry.write().await;
        let response = RequestResponseDto::from(request.clone());
        registry.insert(
            request.id,
            RequestSlot {
                request,
                in_flight: false,
            },
        );

        Ok(response)
    }

    /// Get a request by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<RequestResponseDto> {
        let registry = self.registry.read().await;

        registry
            .get(&id)
            .map(|slot| RequestResponseDto::from(slot.request.clone()))
            .ok_or_else(|| AppError::NotFound(format!("Request '{}' not found", id)))
    }

    /// List requests, newest first
    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<RequestResponseDto>, i64)> {
        let registry = self.registry.read().await;

        let mut requests: Vec<&TicketRequest> =
            registry.values().map(|slot| &slot.request).collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = requests.len() as i64;
        let page = requests
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .map(|request| RequestResponseDto::from(request.clone()))
            .collect();

        Ok((page, total))
    }

    /// Edit a draft. Editing a failed request reverts it to an editable
    /// draft and clears the failure reason; a submitted request is
    /// immutable and an in-flight one accepts no concurrent mutation.
    pub async fn update_draft(&self, id: Uuid, dto: UpdateRequestDto) -> Result<RequestResponseDto> {
        let mut registry = self.registry.write().await;

        let slot = registry
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Request '{}' not found", id)))?;

        if slot.in_flight {
            return Err(AppError::Conflict(
                "A submission for this request is in progress".to_string(),
            ));
        }

        if slot.request.status == RequestStatus::Submitted {
            return Err(AppError::Conflict(
                "A submitted request can no longer be edited".to_string(),
            ));
        }

        if let Some(request_type) = dto.request_type {
            slot.request.request_type = request_type;
        }
        if let Some(customer_identifier) = dto.customer_identifier {
            slot.request.customer_identifier = customer_identifier;
        }
        if let Some(ticket_reference) = dto.ticket_reference {
            slot.request.ticket_reference = ticket_reference;
        }
        if let Some(amount) = dto.amount {
            slot.request.amount = Some(amount);
        }
        if let Some(notes) = dto.notes {
            slot.request.notes = Some(notes);
        }

        if slot.request.status == RequestStatus::Failed {
            slot.request.status = RequestStatus::Draft;
            slot.request.failure_reason = None;
        }
        slot.request.updated_at = Utc::now();

        Ok(RequestResponseDto::from(slot.request.clone()))
    }

    /// Validate and submit a request. A validation failure returns one
    /// error per offending field without contacting the processing
    /// endpoint; re-submitting an already submitted request returns the
    /// stored record, again without contacting it.
    pub async fn submit(&self, id: Uuid) -> Result<RequestResponseDto> {
        // Claim the slot and validate under the lock
        let payload = {
            let mut registry = self.registry.write().await;

            let slot = registry
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Request '{}' not found", id)))?;

            if slot.in_flight {
                return Err(AppError::Conflict(
                    "A submission for this request is in progress".to_string(),
                ));
            }

            if slot.request.status == RequestStatus::Submitted {
                return Ok(RequestResponseDto::from(slot.request.clone()));
            }

            let payload = match slot.request.validate() {
                Ok(payload) => payload,
                Err(violations) => {
                    return Err(AppError::Validation(
                        violations.into_iter().map(Into::into).collect(),
                    ));
                }
            };

            slot.in_flight = true;
            payload
        };

        // The network call runs on its own task: an operator dropping the
        // connection mid-submit must not strand the in-flight flag, and the
        // request still settles to Submitted or Failed.
        let registry = Arc::clone(&self.registry);
        let gateway = Arc::clone(&self.gateway);
        let notifier = self.notifier.clone();

        let handle = tokio::spawn(async move {
            let outcome = gateway.submit(&payload).await;

            let mut registry = registry.write().await;
            let slot = match registry.get_mut(&id) {
                Some(slot) => slot,
                None => {
                    return Err(AppError::Internal(format!(
                        "Request '{}' vanished during submission",
                        id
                    )));
                }
            };

            slot.in_flight = false;
            let now = Utc::now();

            match outcome {
                Ok(record) => {
                    slot.request.status = RequestStatus::Submitted;
                    slot.request.reference_number = Some(record.reference_number.clone());
                    slot.request.failure_reason = None;
                    slot.request.submitted_at = Some(record.accepted_at.unwrap_or(now));
                    slot.request.updated_at = now;

                    tracing::info!(
                        "Request submitted: id={}, ref={}",
                        id,
                        record.reference_number
                    );

                    if let Some(notifier) = notifier {
                        let request = slot.request.clone();
                        tokio::spawn(async move {
                            notifier.submission_accepted(&request).await;
                        });
                    }

                    Ok(RequestResponseDto::from(slot.request.clone()))
                }
                Err(failure) => {
                    let reason = failure.to_string();
                    slot.request.status = RequestStatus::Failed;
                    slot.request.failure_reason = Some(reason.clone());
                    slot.request.updated_at = now;

                    tracing::warn!("Request submission failed: id={}, reason={}", id, reason);

                    if let Some(notifier) = notifier {
                        let request = slot.request.clone();
                        tokio::spawn(async move {
                            notifier.submission_failed(&request).await;
                        });
                    }

                    Err(AppError::ExternalServiceError(reason))
                }
            }
        });

        handle
            .await
            .map_err(|e| AppError::Internal(format!("Submission task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use rust_decimal::Decimal;
    use tokio::sync::Semaphore;

    use crate::features::requests::clients::{SubmissionFailure, SubmittedRecord};
    use crate::features::requests::models::{RequestType, ValidRequest};

    enum Behavior {
        Accept,
        Reject,
    }

    struct ScriptedGateway {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SubmissionGateway for ScriptedGateway {
        async fn submit(
            &self,
            _request: &ValidRequest,
        ) -> std::result::Result<SubmittedRecord, SubmissionFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Accept => Ok(SubmittedRecord {
                    reference_number: "REQ-2026-0000001".to_string(),
                    accepted_at: None,
                }),
                Behavior::Reject => Err(SubmissionFailure::Rejected(
                    "duplicate ticket reference".to_string(),
                )),
            }
        }
    }

    /// Gateway that parks inside `submit` until the test releases it
    struct GatedGateway {
        entered: Arc<Semaphore>,
        release: Arc<Semaphore>,
    }

    #[async_trait]
    impl SubmissionGateway for GatedGateway {
        async fn submit(
            &self,
            _request: &ValidRequest,
        ) -> std::result::Result<SubmittedRecord, SubmissionFailure> {
            self.entered.add_permits(1);
            let _permit = self.release.acquire().await.unwrap();
            Ok(SubmittedRecord {
                reference_number: "REQ-2026-0000002".to_string(),
                accepted_at: None,
            })
        }
    }

    fn service(gateway: Arc<dyn SubmissionGateway>) -> RequestService {
        RequestService::new(gateway, None)
    }

    fn refund_dto() -> CreateRequestDto {
        CreateRequestDto {
            request_type: RequestType::Refund,
            customer_identifier: Name().fake(),
            ticket_reference: "160-4837291055".to_string(),
            amount: None,
            notes: None,
        }
    }

    fn deposit_dto(amount: Option<Decimal>) -> CreateRequestDto {
        CreateRequestDto {
            request_type: RequestType::PaymentDeposit,
            customer_identifier: Name().fake(),
            ticket_reference: "160-4837291055".to_string(),
            amount,
            notes: Some("deposit for rebooking".to_string()),
        }
    }

    #[tokio::test]
    async fn validation_failure_never_calls_the_gateway() {
        let gateway = ScriptedGateway::new(Behavior::Accept);
        let service = service(gateway.clone());

        let draft = service
            .create_draft(deposit_dto(Some(Decimal::ZERO)))
            .await
            .unwrap();

        let err = service.submit(draft.id).await.unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field.as_deref(), Some("amount"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert_eq!(gateway.calls(), 0);

        // Still an editable draft
        let request = service.get_by_id(draft.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Draft);
    }

    #[tokio::test]
    async fn successful_submit_moves_draft_to_submitted() {
        let gateway = ScriptedGateway::new(Behavior::Accept);
        let service = service(gateway.clone());

        let draft = service.create_draft(refund_dto()).await.unwrap();
        let submitted = service.submit(draft.id).await.unwrap();

        assert_eq!(submitted.status, RequestStatus::Submitted);
        assert_eq!(submitted.reference_number.as_deref(), Some("REQ-2026-0000001"));
        assert!(submitted.submitted_at.is_some());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn resubmitting_a_submitted_request_does_not_call_the_gateway_again() {
        let gateway = ScriptedGateway::new(Behavior::Accept);
        let service = service(gateway.clone());

        let draft = service.create_draft(refund_dto()).await.unwrap();
        let first = service.submit(draft.id).await.unwrap();
        let second = service.submit(draft.id).await.unwrap();

        assert_eq!(second.status, RequestStatus::Submitted);
        assert_eq!(second.reference_number, first.reference_number);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn failed_submit_moves_draft_to_failed_and_edit_reverts_it() {
        let gateway = ScriptedGateway::new(Behavior::Reject);
        let service = service(gateway.clone());

        let draft = service.create_draft(refund_dto()).await.unwrap();
        let err = service.submit(draft.id).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));

        let failed = service.get_by_id(draft.id).await.unwrap();
        assert_eq!(failed.status, RequestStatus::Failed);
        assert!(failed
            .failure_reason
            .as_deref()
            .unwrap()
            .contains("duplicate ticket reference"));

        let edited = service
            .update_draft(
                draft.id,
                UpdateRequestDto {
                    ticket_reference: Some("160-4837291056".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.status, RequestStatus::Draft);
        assert!(edited.failure_reason.is_none());
        assert_eq!(edited.ticket_reference, "160-4837291056");
    }

    #[tokio::test]
    async fn failed_request_can_be_retried_without_editing() {
        let gateway = ScriptedGateway::new(Behavior::Reject);
        let service = service(gateway.clone());

        let draft = service.create_draft(refund_dto()).await.unwrap();
        let _ = service.submit(draft.id).await.unwrap_err();
        let _ = service.submit(draft.id).await.unwrap_err();

        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn submitted_request_is_immutable() {
        let gateway = ScriptedGateway::new(Behavior::Accept);
        let service = service(gateway);

        let draft = service.create_draft(refund_dto()).await.unwrap();
        service.submit(draft.id).await.unwrap();

        let err = service
            .update_draft(
                draft.id,
                UpdateRequestDto {
                    notes: Some("late edit".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn in_flight_submission_blocks_edits_and_second_submits() {
        let entered = Arc::new(Semaphore::new(0));
        let release = Arc::new(Semaphore::new(0));
        let gateway = Arc::new(GatedGateway {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        });

        let service = Arc::new(service(gateway));
        let draft = service.create_draft(refund_dto()).await.unwrap();

        let submitting = {
            let service = Arc::clone(&service);
            let id = draft.id;
            tokio::spawn(async move { service.submit(id).await })
        };

        // Wait until the gateway call is actually in flight
        let permit = entered.acquire().await.unwrap();
        permit.forget();

        let edit_err = service
            .update_draft(
                draft.id,
                UpdateRequestDto {
                    notes: Some("concurrent edit".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(edit_err, AppError::Conflict(_)));

        let submit_err = service.submit(draft.id).await.unwrap_err();
        assert!(matches!(submit_err, AppError::Conflict(_)));

        release.add_permits(1);
        let submitted = submitting.await.unwrap().unwrap();
        assert_eq!(submitted.status, RequestStatus::Submitted);
    }

    #[tokio::test]
    async fn list_returns_newest_first_with_total() {
        let gateway = ScriptedGateway::new(Behavior::Accept);
        let service = service(gateway);

        for _ in 0..3 {
            service.create_draft(refund_dto()).await.unwrap();
        }

        let (page, total) = service
            .list(&PaginationQuery {
                page: 1,
                page_size: 2,
            })
            .await
            .unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert!(page[0].created_at >= page[1].created_at);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let gateway = ScriptedGateway::new(Behavior::Accept);
        let service = service(gateway);

        let err = service.submit(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
