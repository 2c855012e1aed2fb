//! Room, submission and aggregation-result domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by registry, store and engine.
//! - Own payload shape validation so every write path shares one rule set.
//!
//! # Invariants
//! - Every room is identified by a stable `RoomId`.
//! - Submissions are keyed by `(RoomId, ParticipantId)`.

pub mod result;
pub mod room;
pub mod submission;
