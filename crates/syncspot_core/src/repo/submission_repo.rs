//! Submission store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert, withdraw and list per-participant submissions.
//! - Provide consistent room snapshots for aggregation.
//!
//! # Invariants
//! - `(room_uuid, participant)` is unique; resubmission replaces the payload
//!   in place and keeps `first_submitted_at` and the row id.
//! - Listing order is `first_submitted_at ASC, id ASC`.
//! - A snapshot reads the room row and all submissions in one transaction.

use crate::model::room::{Room, RoomId, RoomType};
use crate::model::submission::{Payload, Submission, SubmissionLimits};
use crate::repo::room_repo::{bump_revision, load_room};
use crate::repo::{now_epoch_ms, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const SUBMISSION_SELECT_SQL: &str = "SELECT
    id,
    participant,
    payload,
    first_submitted_at,
    updated_at
FROM submissions";

/// Room state frozen at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub room: Room,
    /// Ordered by first submission.
    pub submissions: Vec<Submission>,
}

/// Repository interface for the submission store.
pub trait SubmissionRepository {
    /// Validates and upserts one participant's payload.
    ///
    /// Room lookup, status check, validation, write and revision bump happen
    /// in one IMMEDIATE transaction.
    fn upsert_submission(
        &self,
        room_id: RoomId,
        participant: &str,
        payload: &Payload,
        limits: &SubmissionLimits,
    ) -> RepoResult<Submission>;
    /// Removes one participant's submission. Returns `true` when a row was
    /// removed.
    fn delete_submission(&self, room_id: RoomId, participant: &str) -> RepoResult<bool>;
    /// Reads a room and all its current submissions atomically.
    fn snapshot(&self, room_id: RoomId) -> RepoResult<RoomSnapshot>;
    /// Reads the room row only. Cheap revision lookup for caches.
    fn room(&self, room_id: RoomId) -> RepoResult<Room>;
}

/// SQLite-backed submission store.
pub struct SqliteSubmissionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubmissionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SubmissionRepository for SqliteSubmissionRepository<'_> {
    fn upsert_submission(
        &self,
        room_id: RoomId,
        participant: &str,
        payload: &Payload,
        limits: &SubmissionLimits,
    ) -> RepoResult<Submission> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let room = load_room(&tx, room_id)?.ok_or(RepoError::NotFound(room_id))?;
        if !room.is_open() {
            return Err(RepoError::RoomClosed(room_id));
        }
        if room.room_type == RoomType::Alone {
            ensure_sole_submitter(&tx, room_id, participant)?;
        }
        payload.validate(&room, limits)?;

        let encoded = serde_json::to_string(payload)
            .map_err(|err| RepoError::InvalidData(format!("payload encode failed: {err}")))?;
        tx.execute(
            "INSERT INTO submissions (
                room_uuid,
                participant,
                payload,
                first_submitted_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (room_uuid, participant) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![room_id.to_string(), participant, encoded, now_epoch_ms()],
        )?;
        bump_revision(&tx, room_id)?;

        let stored = tx
            .query_row(
                &format!("{SUBMISSION_SELECT_SQL} WHERE room_uuid = ?1 AND participant = ?2;"),
                params![room_id.to_string(), participant],
                |row| Ok(parse_submission_row(room_id, row)),
            )
            .optional()?
            .ok_or_else(|| {
                RepoError::InvalidData("submission missing after upsert".to_string())
            })??;
        tx.commit()?;

        Ok(stored)
    }

    fn delete_submission(&self, room_id: RoomId, participant: &str) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let room = load_room(&tx, room_id)?.ok_or(RepoError::NotFound(room_id))?;
        if !room.is_open() {
            return Err(RepoError::RoomClosed(room_id));
        }

        let changed = tx.execute(
            "DELETE FROM submissions WHERE room_uuid = ?1 AND participant = ?2;",
            params![room_id.to_string(), participant],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        bump_revision(&tx, room_id)?;
        tx.commit()?;

        Ok(true)
    }

    fn snapshot(&self, room_id: RoomId) -> RepoResult<RoomSnapshot> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let room = load_room(&tx, room_id)?.ok_or(RepoError::NotFound(room_id))?;
        let submissions = list_room_submissions(&tx, room_id)?;
        tx.commit()?;

        Ok(RoomSnapshot { room, submissions })
    }

    fn room(&self, room_id: RoomId) -> RepoResult<Room> {
        load_room(self.conn, room_id)?.ok_or(RepoError::NotFound(room_id))
    }
}

fn ensure_sole_submitter(conn: &Connection, room_id: RoomId, participant: &str) -> RepoResult<()> {
    let owner = conn
        .query_row(
            "SELECT participant
             FROM submissions
             WHERE room_uuid = ?1
               AND participant <> ?2
             LIMIT 1;",
            params![room_id.to_string(), participant],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    match owner {
        Some(owner) => Err(RepoError::RoomOwned { room_id, owner }),
        None => Ok(()),
    }
}

fn list_room_submissions(conn: &Connection, room_id: RoomId) -> RepoResult<Vec<Submission>> {
    let mut stmt = conn.prepare(&format!(
        "{SUBMISSION_SELECT_SQL}
         WHERE room_uuid = ?1
         ORDER BY first_submitted_at ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([room_id.to_string()])?;
    let mut submissions = Vec::new();

    while let Some(row) = rows.next()? {
        submissions.push(parse_submission_row(room_id, row)?);
    }

    Ok(submissions)
}

fn parse_submission_row(room_id: RoomId, row: &Row<'_>) -> RepoResult<Submission> {
    let participant: String = row.get("participant")?;
    let payload_text: String = row.get("payload")?;
    let payload: Payload = serde_json::from_str(&payload_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid payload for participant `{participant}` in submissions.payload: {err}"
        ))
    })?;

    Ok(Submission {
        room_id,
        participant,
        payload,
        first_submitted_at: row.get("first_submitted_at")?,
        updated_at: row.get("updated_at")?,
        sequence: row.get("id")?,
    })
}
