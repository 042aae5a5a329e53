//! HTTP surface of Gantry.
//!
//! `/v1/provider`, `/v1/providers` and `/v1/pokemon/:name` answer inside [`responses::ApiResponse`];
//! the `/_/` diagnostics routes answer with bare bodies.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
