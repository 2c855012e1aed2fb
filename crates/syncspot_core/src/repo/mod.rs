//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define room registry and submission store contracts.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Every mutation runs in one IMMEDIATE transaction that also bumps the
//!   room `revision`.
//! - Submission writes call `Payload::validate()` inside that transaction,
//!   against the room row read in the same transaction.
//! - Repository APIs return semantic errors (`NotFound`, `RoomClosed`) in
//!   addition to DB transport errors.

use crate::db::DbError;
use crate::model::room::RoomId;
use crate::model::submission::{ParticipantId, PayloadError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod room_repo;
pub mod submission_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for room and submission persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(PayloadError),
    Db(DbError),
    NotFound(RoomId),
    RoomClosed(RoomId),
    /// An `Alone` room already belongs to another submitter.
    RoomOwned {
        room_id: RoomId,
        owner: ParticipantId,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "room not found: {id}"),
            Self::RoomClosed(id) => write!(f, "room is closed: {id}"),
            Self::RoomOwned { room_id, owner } => {
                write!(f, "room {room_id} is filled in by `{owner}` alone")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted room data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PayloadError> for RepoError {
    fn from(value: PayloadError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
