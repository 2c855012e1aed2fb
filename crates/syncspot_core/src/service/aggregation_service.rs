//! Aggregation use-case service.
//!
//! # Responsibility
//! - Snapshot a room, run the pure engine and project the result.
//! - Cache results per room, keyed by the room revision.
//!
//! # Invariants
//! - A cached result is served only while its revision equals the stored
//!   room revision and it was computed with the requesting midpoint method.
//! - Failed aggregations are never cached.

use crate::engine::aggregate;
use crate::model::result::{AggregationResult, MidpointMethod};
use crate::model::room::RoomId;
use crate::projector::{project, Projection};
use crate::repo::submission_repo::SubmissionRepository;
use crate::service::{CoreError, CoreResult};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type CacheKey = (RoomId, MidpointMethod);

/// Process-wide result cache shared between services and threads.
///
/// Entries are keyed by room and midpoint method, and hold at most the
/// newest revision seen for that room.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<CacheKey, AggregationResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result when it was computed at `revision` with
    /// `method`.
    pub fn get(
        &self,
        room_id: RoomId,
        revision: i64,
        method: MidpointMethod,
    ) -> Option<AggregationResult> {
        self.lock()
            .get(&(room_id, method))
            .filter(|result| result.revision == revision)
            .cloned()
    }

    /// Stores `result` unless a newer revision is already cached. Older
    /// revisions of the same room are dropped for every method.
    pub fn put(&self, result: AggregationResult, method: MidpointMethod) {
        let mut entries = self.lock();
        let room_id = result.room_id;
        let newer_cached = entries
            .get(&(room_id, method))
            .is_some_and(|cached| cached.revision > result.revision);
        if newer_cached {
            return;
        }
        entries.retain(|(id, _), cached| *id != room_id || cached.revision >= result.revision);
        entries.insert((room_id, method), result);
    }

    /// Drops every cached result of `room_id`.
    pub fn invalidate(&self, room_id: RoomId) {
        self.lock().retain(|(id, _), _| *id != room_id);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, AggregationResult>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Aggregation facade over a submission repository.
pub struct AggregationService<S: SubmissionRepository> {
    repo: S,
    cache: Arc<ResultCache>,
    method: MidpointMethod,
}

impl<S: SubmissionRepository> AggregationService<S> {
    /// Creates a service with a private cache and planar midpoints.
    pub fn new(repo: S) -> Self {
        Self::with_cache(repo, Arc::new(ResultCache::new()))
    }

    pub fn with_cache(repo: S, cache: Arc<ResultCache>) -> Self {
        Self {
            repo,
            cache,
            method: MidpointMethod::default(),
        }
    }

    pub fn with_method(mut self, method: MidpointMethod) -> Self {
        self.method = method;
        self
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Aggregates the room's current submissions.
    ///
    /// # Errors
    /// - `NotFound` when the room does not exist.
    /// - `InsufficientData` when a midpoint has too few places.
    pub fn aggregate(&self, room_id: RoomId) -> CoreResult<AggregationResult> {
        let room = self.repo.room(room_id)?;
        if let Some(cached) = self.cache.get(room_id, room.revision, self.method) {
            debug!(
                "event=aggregate module=engine status=cache_hit room_id={} revision={}",
                room_id, room.revision
            );
            return Ok(cached);
        }

        let snapshot = self.repo.snapshot(room_id)?;
        let result = aggregate(&snapshot, self.method).map_err(|err| {
            info!(
                "event=aggregate module=engine status=error room_id={} revision={} error_code=insufficient_data",
                room_id, snapshot.room.revision
            );
            CoreError::from(err)
        })?;
        info!(
            "event=aggregate module=engine status=ok room_id={} revision={} submissions={}",
            room_id,
            result.revision,
            snapshot.submissions.len()
        );
        self.cache.put(result.clone(), self.method);
        Ok(result)
    }

    /// Aggregates and shapes the result for display.
    pub fn project(&self, room_id: RoomId) -> CoreResult<Projection> {
        let result = self.aggregate(room_id)?;
        Ok(project(&result))
    }
}
