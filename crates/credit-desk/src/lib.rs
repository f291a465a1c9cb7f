//! Credit application service library.
//!
//! The [`applications`] module owns the domain core: collision-checked
//! identifier assignment, the review status lifecycle, and the append-only
//! message thread attached to every application. The remaining modules carry
//! the shared service infrastructure (configuration, telemetry, error
//! surface) used by the HTTP binary in `services/api`.

pub mod applications;
pub mod clock;
pub mod config;
pub mod error;
pub mod telemetry;
