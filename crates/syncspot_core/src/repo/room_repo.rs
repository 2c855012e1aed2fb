//! Room registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist room identity, type and lifecycle.
//! - Own candidate-date replacement for time votes.
//!
//! # Invariants
//! - `room_type`/`vote_kind` are never updated (enforced by trigger too).
//! - Status moves only `OPEN -> CLOSED`; closing twice is a no-op.
//! - Replacing candidate dates discards the room's submissions in the same
//!   transaction.

use crate::model::room::{Room, RoomId, RoomStatus, RoomType, VoteKind};
use crate::repo::{now_epoch_ms, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository interface for the room registry.
pub trait RoomRepository {
    /// Inserts a new room together with its candidate dates.
    fn create_room(&self, room: &Room) -> RepoResult<RoomId>;
    /// Loads one room, or `None` when absent.
    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>>;
    /// Closes a room. Returns `true` when this call changed the status.
    fn close_room(&self, id: RoomId) -> RepoResult<bool>;
    /// Replaces the candidate date list of an open room and clears its
    /// submissions. Returns the number of discarded submissions.
    fn replace_candidate_dates(&self, id: RoomId, dates: &[NaiveDate]) -> RepoResult<usize>;
}

/// SQLite-backed room registry.
pub struct SqliteRoomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoomRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RoomRepository for SqliteRoomRepository<'_> {
    fn create_room(&self, room: &Room) -> RepoResult<RoomId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO rooms (
                uuid,
                room_type,
                vote_kind,
                status,
                revision,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                room.id.to_string(),
                room.room_type.as_str(),
                room.vote_kind.as_str(),
                room.status.as_str(),
                room.revision,
                room.created_at,
                room.updated_at,
            ],
        )?;
        insert_candidate_dates(&tx, room.id, &room.candidate_dates)?;
        tx.commit()?;

        Ok(room.id)
    }

    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>> {
        load_room(self.conn, id)
    }

    fn close_room(&self, id: RoomId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let status = tx
            .query_row(
                "SELECT status FROM rooms WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or(RepoError::NotFound(id))?;

        if status == RoomStatus::Closed.as_str() {
            return Ok(false);
        }

        tx.execute(
            "UPDATE rooms
             SET
                status = 'CLOSED',
                revision = revision + 1,
                updated_at = ?2
             WHERE uuid = ?1;",
            params![id.to_string(), now_epoch_ms()],
        )?;
        tx.commit()?;

        Ok(true)
    }

    fn replace_candidate_dates(&self, id: RoomId, dates: &[NaiveDate]) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let room = load_room(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        if !room.is_open() {
            return Err(RepoError::RoomClosed(id));
        }

        tx.execute(
            "DELETE FROM room_dates WHERE room_uuid = ?1;",
            [id.to_string()],
        )?;
        insert_candidate_dates(&tx, id, dates)?;
        let cleared = tx.execute(
            "DELETE FROM submissions WHERE room_uuid = ?1;",
            [id.to_string()],
        )?;
        bump_revision(&tx, id)?;
        tx.commit()?;

        Ok(cleared)
    }
}

/// Reads one room row plus its candidate dates.
///
/// Works on a plain connection or inside an open transaction.
pub(crate) fn load_room(conn: &Connection, id: RoomId) -> RepoResult<Option<Room>> {
    let mut stmt = conn.prepare(
        "SELECT
            uuid,
            room_type,
            vote_kind,
            status,
            revision,
            created_at,
            updated_at
         FROM rooms
         WHERE uuid = ?1;",
    )?;

    let mut rows = stmt.query([id.to_string()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let mut room = parse_room_row(row)?;
    room.candidate_dates = load_candidate_dates(conn, id)?;
    Ok(Some(room))
}

/// Marks the room as mutated.
pub(crate) fn bump_revision(conn: &Connection, id: RoomId) -> RepoResult<()> {
    conn.execute(
        "UPDATE rooms
         SET
            revision = revision + 1,
            updated_at = ?2
         WHERE uuid = ?1;",
        params![id.to_string(), now_epoch_ms()],
    )?;
    Ok(())
}

fn insert_candidate_dates(conn: &Connection, id: RoomId, dates: &[NaiveDate]) -> RepoResult<()> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO room_dates (room_uuid, date) VALUES (?1, ?2);")?;
    for date in dates {
        stmt.execute(params![id.to_string(), date.format(DATE_FORMAT).to_string()])?;
    }
    Ok(())
}

fn load_candidate_dates(conn: &Connection, id: RoomId) -> RepoResult<Vec<NaiveDate>> {
    let mut stmt =
        conn.prepare("SELECT date FROM room_dates WHERE room_uuid = ?1 ORDER BY date ASC;")?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut dates = Vec::new();

    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        let date = NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!("invalid date `{text}` in room_dates.date"))
        })?;
        dates.push(date);
    }

    Ok(dates)
}

fn parse_room_row(row: &Row<'_>) -> RepoResult<Room> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in rooms.uuid"))
    })?;

    let type_text: String = row.get("room_type")?;
    let room_type = RoomType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid room type `{type_text}` in rooms.room_type"))
    })?;

    let kind_text: String = row.get("vote_kind")?;
    let vote_kind = VoteKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid vote kind `{kind_text}` in rooms.vote_kind"))
    })?;

    let status_text: String = row.get("status")?;
    let status = RoomStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in rooms.status"))
    })?;

    Ok(Room {
        id,
        room_type,
        vote_kind,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        revision: row.get("revision")?,
        candidate_dates: Vec::new(),
    })
}
