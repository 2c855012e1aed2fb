//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into registry, store and aggregation APIs.
//! - Map storage and engine failures onto one caller-facing error taxonomy.
//!
//! # Invariants
//! - Errors are returned to the caller, never retried or swallowed here.

use crate::engine::EngineError;
use crate::model::room::RoomId;
use crate::model::submission::{ParticipantId, PayloadError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod aggregation_service;
pub mod room_service;
pub mod submission_service;

pub type CoreResult<T> = Result<T, CoreError>;

/// Caller-facing error taxonomy of the core.
#[derive(Debug)]
pub enum CoreError {
    /// Room does not exist.
    NotFound(RoomId),
    /// Room type or vote kind is not a recognized value.
    InvalidType(String),
    /// Payload shape does not fit the room, or its content is invalid.
    InvalidPayload(PayloadError),
    /// Mutation attempted after the room was closed.
    RoomClosed(RoomId),
    /// Another participant already fills in this `Alone` room.
    RoomOwned {
        room_id: RoomId,
        owner: ParticipantId,
    },
    /// Too few inputs to aggregate.
    InsufficientData {
        room_id: RoomId,
        required: usize,
        found: usize,
    },
    /// Storage failure.
    Repo(RepoError),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "room not found: {id}"),
            Self::InvalidType(value) => write!(f, "invalid room type: `{value}`"),
            Self::InvalidPayload(err) => write!(f, "invalid payload: {err}"),
            Self::RoomClosed(id) => write!(f, "room is closed: {id}"),
            Self::RoomOwned { room_id, owner } => {
                write!(f, "room {room_id} is filled in by `{owner}` alone")
            }
            Self::InsufficientData {
                room_id,
                required,
                found,
            } => write!(
                f,
                "room {room_id} needs at least {required} input(s), found {found}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPayload(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::RoomClosed(id) => Self::RoomClosed(id),
            RepoError::Validation(err) => Self::InvalidPayload(err),
            RepoError::RoomOwned { room_id, owner } => Self::RoomOwned { room_id, owner },
            other => Self::Repo(other),
        }
    }
}

impl From<PayloadError> for CoreError {
    fn from(value: PayloadError) -> Self {
        Self::InvalidPayload(value)
    }
}

impl From<EngineError> for CoreError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::InsufficientData {
                room_id,
                required,
                found,
            } => Self::InsufficientData {
                room_id,
                required,
                found,
            },
        }
    }
}

impl CoreError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidType(_) => "invalid_type",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::RoomClosed(_) => "room_closed",
            Self::RoomOwned { .. } => "room_owned",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::Repo(_) => "storage",
        }
    }
}
