//! Submission domain model and payload validation.
//!
//! # Responsibility
//! - Define per-participant payload shapes for time and place votes.
//! - Validate a payload against the room it targets before persistence.
//!
//! # Invariants
//! - At most one active submission per (room, participant).
//! - `Each` rooms take `Dates`/`Place`; `Alone` rooms take `OnBehalf`.
//! - A date appears at most once per availability list.

use crate::model::room::{Room, RoomId, RoomType, VoteKind};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_NAME_CHARS: usize = 64;

/// Participant identity inside one room (display name).
pub type ParticipantId = String;

/// Half-open availability window within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Returns the overlap of two windows, or `None` when they are disjoint.
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(TimeRange { start, end })
        } else {
            None
        }
    }
}

/// One date a participant can attend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateVote {
    pub date: NaiveDate,
    /// `None` means available all day.
    #[serde(default)]
    pub window: Option<TimeRange>,
}

impl DateVote {
    pub fn all_day(date: NaiveDate) -> Self {
        Self { date, window: None }
    }

    pub fn between(date: NaiveDate, window: TimeRange) -> Self {
        Self {
            date,
            window: Some(window),
        }
    }
}

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

/// How a participant travels to the meeting point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    #[default]
    Public,
    Car,
}

/// A geocoded departure place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub label: Option<String>,
    /// Province / metropolitan city.
    #[serde(default)]
    pub si_do: String,
    /// District.
    #[serde(default)]
    pub si_gun_gu: String,
    pub road_name_address: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub transport: Transport,
}

impl Place {
    pub fn new(road_name_address: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            label: None,
            si_do: String::new(),
            si_gun_gu: String::new(),
            road_name_address: road_name_address.into(),
            coordinate,
            transport: Transport::default(),
        }
    }
}

/// Data one member contributes, independent of who typed it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Availability {
    Dates(Vec<DateVote>),
    Place(Place),
}

/// One member entered by the submitter of an `Alone` room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyEntry {
    pub name: String,
    pub availability: Availability,
}

/// Submission body. Stored as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// The participant's own candidate dates.
    Dates(Vec<DateVote>),
    /// The participant's own departure place.
    Place(Place),
    /// Every member's data, entered by one submitter.
    OnBehalf(Vec<ProxyEntry>),
}

impl Payload {
    fn shape_name(&self) -> &'static str {
        match self {
            Self::Dates(_) => "dates",
            Self::Place(_) => "place",
            Self::OnBehalf(_) => "on_behalf",
        }
    }

    /// Validates this payload against the target room and limits.
    pub fn validate(&self, room: &Room, limits: &SubmissionLimits) -> Result<(), PayloadError> {
        match (room.room_type, self) {
            (RoomType::Each, Self::Dates(votes)) if room.vote_kind == VoteKind::Time => {
                validate_dates(votes, room, limits)
            }
            (RoomType::Each, Self::Place(place)) if room.vote_kind == VoteKind::Place => {
                validate_place(place)
            }
            (RoomType::Alone, Self::OnBehalf(entries)) => {
                validate_proxy_entries(entries, room, limits)
            }
            _ => Err(PayloadError::ShapeMismatch {
                room_type: room.room_type,
                vote_kind: room.vote_kind,
                found: self.shape_name(),
            }),
        }
    }
}

/// Upper bounds applied during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    pub max_dates: usize,
    pub max_proxy_entries: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            max_dates: 62,
            max_proxy_entries: 30,
        }
    }
}

/// Current submission of one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub room_id: RoomId,
    pub participant: ParticipantId,
    pub payload: Payload,
    /// Unix epoch milliseconds of the participant's first submission. Kept
    /// across resubmissions.
    pub first_submitted_at: i64,
    /// Unix epoch milliseconds of the latest replacement.
    pub updated_at: i64,
    /// Storage insertion order; breaks `first_submitted_at` ties.
    pub sequence: i64,
}

/// Payload shape or content violation.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadError {
    ShapeMismatch {
        room_type: RoomType,
        vote_kind: VoteKind,
        found: &'static str,
    },
    EmptyDates,
    DuplicateDate(NaiveDate),
    DateNotOffered(NaiveDate),
    InvalidWindow(NaiveDate),
    TooManyDates {
        max: usize,
        found: usize,
    },
    InvalidCoordinate(Coordinate),
    EmptyAddress,
    InvalidName(String),
    DuplicateName(String),
    NoEntries,
    TooManyEntries {
        max: usize,
        found: usize,
    },
    EmptyCandidateDates,
}

impl Display for PayloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShapeMismatch {
                room_type,
                vote_kind,
                found,
            } => write!(
                f,
                "payload `{found}` does not fit {} {} room",
                room_type.as_str(),
                vote_kind.as_str()
            ),
            Self::EmptyDates => write!(f, "at least one date is required"),
            Self::DuplicateDate(date) => write!(f, "date listed twice: {date}"),
            Self::DateNotOffered(date) => write!(f, "date is not a candidate of this room: {date}"),
            Self::InvalidWindow(date) => write!(f, "time window on {date} must end after it starts"),
            Self::TooManyDates { max, found } => {
                write!(f, "too many dates: {found} (max {max})")
            }
            Self::InvalidCoordinate(coordinate) => write!(
                f,
                "coordinate out of range: lat={} lng={}",
                coordinate.lat, coordinate.lng
            ),
            Self::EmptyAddress => write!(f, "road name address must not be blank"),
            Self::InvalidName(name) => write!(f, "invalid participant name: `{name}`"),
            Self::DuplicateName(name) => write!(f, "participant listed twice: `{name}`"),
            Self::NoEntries => write!(f, "at least one member entry is required"),
            Self::TooManyEntries { max, found } => {
                write!(f, "too many member entries: {found} (max {max})")
            }
            Self::EmptyCandidateDates => write!(f, "candidate date list must not be empty"),
        }
    }
}

impl Error for PayloadError {}

/// Trims and checks a participant or member name.
pub fn normalize_participant(value: &str) -> Result<ParticipantId, PayloadError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(PayloadError::InvalidName(value.to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_dates(
    votes: &[DateVote],
    room: &Room,
    limits: &SubmissionLimits,
) -> Result<(), PayloadError> {
    if votes.is_empty() {
        return Err(PayloadError::EmptyDates);
    }
    if votes.len() > limits.max_dates {
        return Err(PayloadError::TooManyDates {
            max: limits.max_dates,
            found: votes.len(),
        });
    }

    let mut seen = HashSet::with_capacity(votes.len());
    for vote in votes {
        if !seen.insert(vote.date) {
            return Err(PayloadError::DuplicateDate(vote.date));
        }
        if !room.accepts_date(vote.date) {
            return Err(PayloadError::DateNotOffered(vote.date));
        }
        if let Some(window) = vote.window {
            if !window.is_valid() {
                return Err(PayloadError::InvalidWindow(vote.date));
            }
        }
    }
    Ok(())
}

fn validate_place(place: &Place) -> Result<(), PayloadError> {
    if place.road_name_address.trim().is_empty() {
        return Err(PayloadError::EmptyAddress);
    }
    if !place.coordinate.is_valid() {
        return Err(PayloadError::InvalidCoordinate(place.coordinate));
    }
    Ok(())
}

fn validate_proxy_entries(
    entries: &[ProxyEntry],
    room: &Room,
    limits: &SubmissionLimits,
) -> Result<(), PayloadError> {
    if entries.is_empty() {
        return Err(PayloadError::NoEntries);
    }
    if entries.len() > limits.max_proxy_entries {
        return Err(PayloadError::TooManyEntries {
            max: limits.max_proxy_entries,
            found: entries.len(),
        });
    }

    let mut names = HashSet::with_capacity(entries.len());
    for entry in entries {
        let name = normalize_participant(&entry.name)?;
        if !names.insert(name.clone()) {
            return Err(PayloadError::DuplicateName(name));
        }

        match (&entry.availability, room.vote_kind) {
            (Availability::Dates(votes), VoteKind::Time) => validate_dates(votes, room, limits)?,
            (Availability::Place(place), VoteKind::Place) => validate_place(place)?,
            (Availability::Dates(_), VoteKind::Place) | (Availability::Place(_), VoteKind::Time) => {
                return Err(PayloadError::ShapeMismatch {
                    room_type: room.room_type,
                    vote_kind: room.vote_kind,
                    found: match entry.availability {
                        Availability::Dates(_) => "dates",
                        Availability::Place(_) => "place",
                    },
                });
            }
        }
    }
    Ok(())
}
