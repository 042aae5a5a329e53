//! MySQL repository implementations.

mod provider_repository;

pub use provider_repository::MySqlProviderRepository;
