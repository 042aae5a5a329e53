//! # Gantry Repository
//!
//! Persistence for providers:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn ProviderRepository>
//! MySqlProviderRepository          (MySQL / SQLx, soft delete)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! MySQL
//! ```
//!
//! [`InMemoryProviderRepository`] implements the same trait without a
//! database and is used by the service and REST tests.

pub mod memory;
pub mod mysql;
pub mod pool;
pub mod traits;

pub use memory::InMemoryProviderRepository;
pub use mysql::*;
pub use pool::*;
pub use traits::*;
