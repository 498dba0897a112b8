mod request_dto;

pub use request_dto::{CreateRequestDto, RequestResponseDto, UpdateRequestDto};
