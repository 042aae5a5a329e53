//! Data Transfer Objects (DTOs).

mod provider_dto;

pub use provider_dto::*;
