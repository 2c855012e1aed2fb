//! Room registry use-case service.
//!
//! # Responsibility
//! - Create, close, look up and check rooms.
//! - Create or recreate the candidate date list of time votes.
//!
//! # Invariants
//! - Unknown room type or vote kind strings never reach storage.
//! - Candidate dates are stored sorted and deduplicated.

use crate::model::room::{Room, RoomCheck, RoomId, RoomType, VoteKind};
use crate::model::submission::PayloadError;
use crate::repo::now_epoch_ms;
use crate::repo::room_repo::RoomRepository;
use crate::service::aggregation_service::ResultCache;
use crate::service::{CoreError, CoreResult};
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

/// Room registry facade over repository implementations.
pub struct RoomService<R: RoomRepository> {
    repo: R,
    cache: Option<Arc<ResultCache>>,
}

impl<R: RoomRepository> RoomService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, cache: None }
    }

    /// Evicts a room's cached results when it is closed or gets new dates.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Allocates a fresh open room.
    ///
    /// `room_type` is `ALONE` or `EACH`; `vote_kind` is `time` or `place`.
    pub fn create_room(&self, room_type: &str, vote_kind: &str) -> CoreResult<RoomId> {
        let room_type = RoomType::parse(room_type).ok_or_else(|| {
            warn!("event=room_create module=registry status=error error_code=invalid_type");
            CoreError::InvalidType(room_type.to_string())
        })?;
        let vote_kind = VoteKind::parse(vote_kind)
            .ok_or_else(|| CoreError::InvalidType(vote_kind.to_string()))?;

        let room = Room::new(room_type, vote_kind, now_epoch_ms());
        let id = self.repo.create_room(&room)?;
        info!(
            "event=room_create module=registry status=ok room_id={} room_type={} vote_kind={}",
            id,
            room_type.as_str(),
            vote_kind.as_str()
        );
        Ok(id)
    }

    /// Closes a room. Closing an already closed room succeeds.
    pub fn close_room(&self, id: RoomId) -> CoreResult<()> {
        let changed = self.repo.close_room(id)?;
        if changed {
            self.evict(id);
        }
        info!(
            "event=room_close module=registry status=ok room_id={} changed={}",
            id, changed
        );
        Ok(())
    }

    pub fn get_room(&self, id: RoomId) -> CoreResult<Room> {
        self.repo.get_room(id)?.ok_or(CoreError::NotFound(id))
    }

    /// Reports whether a room exists and which dates it offers.
    pub fn check_room(&self, id: RoomId) -> CoreResult<RoomCheck> {
        Ok(match self.repo.get_room(id)? {
            Some(room) => RoomCheck {
                exists: true,
                candidate_dates: room.candidate_dates,
            },
            None => RoomCheck {
                exists: false,
                candidate_dates: Vec::new(),
            },
        })
    }

    /// Creates or recreates the candidate dates of a time vote.
    ///
    /// Recreating starts a new round: existing submissions are discarded.
    pub fn set_candidate_dates(&self, id: RoomId, dates: Vec<NaiveDate>) -> CoreResult<Room> {
        let room = self.get_room(id)?;
        if room.vote_kind != VoteKind::Time {
            return Err(CoreError::InvalidPayload(PayloadError::ShapeMismatch {
                room_type: room.room_type,
                vote_kind: room.vote_kind,
                found: "candidate_dates",
            }));
        }

        let mut dates = dates;
        dates.sort_unstable();
        dates.dedup();
        if dates.is_empty() {
            return Err(CoreError::InvalidPayload(PayloadError::EmptyCandidateDates));
        }

        let cleared = self.repo.replace_candidate_dates(id, &dates)?;
        self.evict(id);
        info!(
            "event=room_dates_set module=registry status=ok room_id={} date_count={} cleared_submissions={}",
            id,
            dates.len(),
            cleared
        );
        self.get_room(id)
    }

    fn evict(&self, id: RoomId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(id);
        }
    }
}
