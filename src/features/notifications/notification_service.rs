use crate::features::notifications::TelegramClient;
use crate::features::requests::models::{RequestType, TicketRequest};

/// Sends operator-facing Telegram notifications about submission outcomes.
/// Delivery is best-effort: failures are logged and never surface to the
/// workflow.
pub struct NotificationService {
    telegram: TelegramClient,
}

impl NotificationService {
    pub fn new(telegram: TelegramClient) -> Self {
        Self { telegram }
    }

    pub async fn submission_accepted(&self, request: &TicketRequest) {
        let text = format_accepted_message(request);
        if let Err(e) = self.telegram.send_message(&text).await {
            tracing::warn!(
                "Failed to deliver acceptance notification for {}: {}",
                request.id,
                e
            );
        }
    }

    pub async fn submission_failed(&self, request: &TicketRequest) {
        let text = format_failed_message(request);
        if let Err(e) = self.telegram.send_message(&text).await {
            tracing::warn!(
                "Failed to deliver failure notification for {}: {}",
                request.id,
                e
            );
        }
    }
}

fn request_type_label(request_type: RequestType) -> &'static str {
    match request_type {
        RequestType::Refund => "Refund",
        RequestType::PaymentDeposit => "Payment deposit",
    }
}

fn format_accepted_message(request: &TicketRequest) -> String {
    let mut lines = vec![
        "<b>Request submitted</b>".to_string(),
        format!("Type: {}", request_type_label(request.request_type)),
        format!("Customer: {}", escape_html(&request.customer_identifier)),
        format!("Ticket: {}", escape_html(&request.ticket_reference)),
    ];

    if let Some(ref reference) = request.reference_number {
        lines.push(format!("Reference: {}", escape_html(reference)));
    }
    if request.request_type == RequestType::PaymentDeposit {
        if let Some(amount) = request.amount {
            lines.push(format!("Amount: {}", amount));
        }
    }

    lines.join("\n")
}

fn format_failed_message(request: &TicketRequest) -> String {
    let mut lines = vec![
        "<b>Request submission failed</b>".to_string(),
        format!("Type: {}", request_type_label(request.request_type)),
        format!("Customer: {}", escape_html(&request.customer_identifier)),
        format!("Ticket: {}", escape_html(&request.ticket_reference)),
    ];

    if let Some(ref reason) = request.failure_reason {
        lines.push(format!("Reason: {}", escape_html(reason)));
    }

    lines.join("\n")
}

/// Minimal escaping for Telegram HTML parse mode
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
