//! Submission store use-case service.
//!
//! # Responsibility
//! - Normalize participant identity and forward upserts to the store.
//! - Drop cached aggregation results after every accepted mutation.
//!
//! # Invariants
//! - Resubmission replaces the participant's previous payload.
//! - Payload contents are never logged, only counts and ids.

use crate::model::room::RoomId;
use crate::model::submission::{normalize_participant, Payload, Submission, SubmissionLimits};
use crate::repo::submission_repo::SubmissionRepository;
use crate::service::aggregation_service::ResultCache;
use crate::service::CoreResult;
use log::{debug, info};
use std::sync::Arc;

/// Submission store facade.
pub struct SubmissionService<S: SubmissionRepository> {
    repo: S,
    limits: SubmissionLimits,
    cache: Option<Arc<ResultCache>>,
}

impl<S: SubmissionRepository> SubmissionService<S> {
    /// Creates a service with default limits and no result cache.
    pub fn new(repo: S) -> Self {
        Self {
            repo,
            limits: SubmissionLimits::default(),
            cache: None,
        }
    }

    pub fn with_limits(mut self, limits: SubmissionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Shares a result cache with an `AggregationService` so accepted
    /// mutations evict the room's cached result.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Validates and upserts one participant's payload.
    pub fn submit(
        &self,
        room_id: RoomId,
        participant: &str,
        payload: Payload,
    ) -> CoreResult<Submission> {
        let participant = normalize_participant(participant)?;
        let stored = match self
            .repo
            .upsert_submission(room_id, &participant, &payload, &self.limits)
        {
            Ok(stored) => stored,
            Err(err) => {
                debug!(
                    "event=submission_upsert module=store status=rejected room_id={} error={}",
                    room_id, err
                );
                return Err(err.into());
            }
        };

        self.evict(room_id);
        info!(
            "event=submission_upsert module=store status=ok room_id={} sequence={}",
            room_id, stored.sequence
        );
        Ok(stored)
    }

    /// Removes one participant's submission. Returns whether anything was
    /// removed.
    pub fn withdraw(&self, room_id: RoomId, participant: &str) -> CoreResult<bool> {
        let participant = normalize_participant(participant)?;
        let removed = self.repo.delete_submission(room_id, &participant)?;
        if removed {
            self.evict(room_id);
        }
        info!(
            "event=submission_withdraw module=store status=ok room_id={} removed={}",
            room_id, removed
        );
        Ok(removed)
    }

    /// Lists current submissions in first-submission order.
    pub fn list_submissions(&self, room_id: RoomId) -> CoreResult<Vec<Submission>> {
        Ok(self.repo.snapshot(room_id)?.submissions)
    }

    fn evict(&self, room_id: RoomId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(room_id);
        }
    }
}
