//! # Tutorbook Core
//!
//! Domain logic for the Tutorbook scheduling service: models, slot
//! generation, booking validation, and the decision logic behind slot
//! locks and booking confirmation.
//!
//! Everything in this crate is pure: time ("now"/"today") is always an
//! explicit parameter, and no I/O happens here. Persistence lives in
//! `tutorbook-db`, the HTTP surface in `tutorbook-api`.

/// Confirmation planning for booking requests
pub mod booking;
/// Error taxonomy shared across the workspace
pub mod errors;
/// Acquire/extend/deny decision logic for advisory slot locks
pub mod locks;
/// Domain models and wire types
pub mod models;
/// Candidate slot generation from recurring availability
pub mod slots;
/// Ordered business-constraint validation of candidate slots
pub mod validation;
