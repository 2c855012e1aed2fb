//! Aggregation output model.
//!
//! # Invariants
//! - A result is fully determined by `(room_id, revision)`.
//! - `DateOverlap::days` is sorted by date and never holds an empty day.

use crate::model::room::RoomId;
use crate::model::submission::{Coordinate, Place, TimeRange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How the midpoint of several coordinates is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidpointMethod {
    /// Arithmetic mean of latitude and longitude.
    #[default]
    Planar,
    /// Mean of unit vectors on the sphere.
    Geodesic,
}

/// Intersection of every window declared for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "range", rename_all = "snake_case")]
pub enum CommonWindow {
    /// Nobody restricted the time of day.
    AllDay,
    Range(TimeRange),
    /// Windows exist but do not overlap.
    Disjoint,
}

/// One participant available on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendance {
    pub name: String,
    pub window: Option<TimeRange>,
}

/// All participants available on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    /// Kept in first-submission order.
    pub attendees: Vec<Attendance>,
    pub common_window: CommonWindow,
}

/// Overlap of submitted dates.
///
/// `shared` is the consensus answer: the dates on which every participant
/// is available. `days` is the full per-date breakdown and also lists dates
/// only some participants picked, so callers can show partial availability.
/// With A on 01-01 and 01-02 and B on 01-02 only, `shared` is `[01-02]`
/// while `days` holds both dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateOverlap {
    /// Every date with at least one attendee, ascending.
    pub days: Vec<DayAvailability>,
    /// Dates every participant can attend, ascending. Empty when no single
    /// date suits everyone.
    pub shared: Vec<NaiveDate>,
    /// Most attendees, earliest date on ties.
    pub best: Option<NaiveDate>,
}

/// Distance from one participant to the midpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub name: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidpointOutcome {
    pub coordinate: Coordinate,
    pub method: MidpointMethod,
    /// Submitted place closest to the midpoint.
    pub nearest: Place,
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Dates(DateOverlap),
    Midpoint(MidpointOutcome),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub room_id: RoomId,
    pub revision: i64,
    /// The room's `updated_at` at snapshot time, in epoch milliseconds.
    pub computed_at: i64,
    pub outcome: Outcome,
}
