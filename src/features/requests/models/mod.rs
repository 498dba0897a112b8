mod request;

pub use request::{
    FieldViolation, RequestField, RequestStatus, RequestType, TicketRequest, ValidRequest,
};
