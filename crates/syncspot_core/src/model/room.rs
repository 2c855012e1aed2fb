//! Room domain model.
//!
//! # Responsibility
//! - Define the coordination session record shared by time and place votes.
//! - Parse external room-type and vote-kind names.
//!
//! # Invariants
//! - `id` is allocated once and never reused for another room.
//! - `room_type` and `vote_kind` are immutable after creation.
//! - `status` only moves `Open -> Closed`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque room identifier handed to clients.
pub type RoomId = Uuid;

/// Who enters availability for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    /// One user enters every member's data on their behalf.
    Alone,
    /// Each member submits their own data.
    Each,
}

impl RoomType {
    /// Parses the external `ALONE`/`EACH` name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALONE" => Some(Self::Alone),
            "EACH" => Some(Self::Each),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alone => "ALONE",
            Self::Each => "EACH",
        }
    }
}

/// What a room is voting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    /// Candidate dates with optional time windows.
    Time,
    /// Departure places reduced to a midpoint.
    Place,
}

impl VoteKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "time" => Some(Self::Time),
            "place" => Some(Self::Place),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Place => "place",
        }
    }
}

/// Room lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Open,
    Closed,
}

impl RoomStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OPEN" => Some(Self::Open),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Canonical room record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_type: RoomType,
    pub vote_kind: VoteKind,
    pub status: RoomStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last mutation to the room or its
    /// submissions.
    pub updated_at: i64,
    /// Bumped on every mutation; aggregation caches key on it.
    pub revision: i64,
    /// Sorted and deduplicated. Empty means any date is accepted.
    pub candidate_dates: Vec<NaiveDate>,
}

impl Room {
    /// Creates an open room with a generated identifier.
    pub fn new(room_type: RoomType, vote_kind: VoteKind, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_type,
            vote_kind,
            status: RoomStatus::Open,
            created_at: now_ms,
            updated_at: now_ms,
            revision: 0,
            candidate_dates: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == RoomStatus::Open
    }

    /// Returns whether `date` may be voted on in this room.
    pub fn accepts_date(&self, date: NaiveDate) -> bool {
        self.candidate_dates.is_empty() || self.candidate_dates.binary_search(&date).is_ok()
    }
}

/// Existence check returned to clients before they create or recreate a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomCheck {
    pub exists: bool,
    pub candidate_dates: Vec<NaiveDate>,
}
