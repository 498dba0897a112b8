mod processing_client;

pub use processing_client::{
    ProcessingApiClient, SubmissionFailure, SubmissionGateway, SubmittedRecord,
};
