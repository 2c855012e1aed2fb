//! Consensus core for SyncSpot meetup rooms.
//! Owns room lifecycle, participant submissions and the deterministic
//! aggregation of dates and meeting points.

pub mod boundary;
pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod projector;
pub mod repo;
pub mod service;

pub use boundary::access::{AccessError, NextStep};
pub use boundary::intent::{resolve_origin, IntentTarget, PendingIntent};
pub use crate::config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::EngineError;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::result::{
    AggregationResult, CommonWindow, DateOverlap, DayAvailability, MidpointMethod,
    MidpointOutcome, Outcome,
};
pub use model::room::{Room, RoomCheck, RoomId, RoomStatus, RoomType, VoteKind};
pub use model::submission::{
    Availability, Coordinate, DateVote, Payload, PayloadError, Place, ProxyEntry, Submission,
    SubmissionLimits, TimeRange, Transport,
};
pub use projector::{project, DateBreakdown, MidpointView, Projection};
pub use repo::room_repo::{RoomRepository, SqliteRoomRepository};
pub use repo::submission_repo::{RoomSnapshot, SqliteSubmissionRepository, SubmissionRepository};
pub use repo::{RepoError, RepoResult};
pub use service::aggregation_service::{AggregationService, ResultCache};
pub use service::room_service::RoomService;
pub use service::submission_service::SubmissionService;
pub use service::{CoreError, CoreResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
