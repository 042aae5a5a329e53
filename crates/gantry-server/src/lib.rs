//! # Gantry Server Library
//!
//! Wiring and start-up for the Gantry server: the component graph
//! ([`di`]), infrastructure bootstrap and the serve loop ([`app`]), and
//! start-up banners ([`startup`]).

pub mod app;
pub mod di;
pub mod startup;

pub use app::run;
