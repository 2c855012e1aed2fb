//! Aggregation engine.
//!
//! # Responsibility
//! - Reduce a room snapshot to a decision-ready result.
//! - Select overlap or midpoint mode from the room's vote kind.
//!
//! # Invariants
//! - Pure: no I/O, no clock reads. `computed_at` is taken from the snapshot.
//! - Identical snapshots produce identical results.
//! - `Alone` rooms need at least two places for a midpoint, `Each` rooms one.

use crate::model::result::{AggregationResult, MidpointMethod, Outcome};
use crate::model::room::{RoomId, RoomType, VoteKind};
use crate::model::submission::{Availability, DateVote, Payload, Place, Submission};
use crate::repo::submission_repo::RoomSnapshot;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod midpoint;
pub mod overlap;

/// Aggregation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    InsufficientData {
        room_id: RoomId,
        required: usize,
        found: usize,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientData {
                room_id,
                required,
                found,
            } => write!(
                f,
                "room {room_id} needs at least {required} place(s) for a midpoint, found {found}"
            ),
        }
    }
}

impl Error for EngineError {}

/// One member's contribution after `Alone` payloads are expanded.
#[derive(Debug, Clone, Copy)]
enum EntryData<'a> {
    Dates(&'a [DateVote]),
    Place(&'a Place),
}

#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    name: &'a str,
    data: EntryData<'a>,
}

/// Computes the aggregation result for one snapshot.
pub fn aggregate(
    snapshot: &RoomSnapshot,
    method: MidpointMethod,
) -> Result<AggregationResult, EngineError> {
    let room = &snapshot.room;
    let entries = flatten(&snapshot.submissions);

    let outcome = match room.vote_kind {
        VoteKind::Time => Outcome::Dates(overlap::overlap_dates(entries.iter().filter_map(
            |entry| match entry.data {
                EntryData::Dates(votes) => Some((entry.name, votes)),
                EntryData::Place(_) => None,
            },
        ))),
        VoteKind::Place => {
            let places: Vec<(&str, &Place)> = entries
                .iter()
                .filter_map(|entry| match entry.data {
                    EntryData::Place(place) => Some((entry.name, place)),
                    EntryData::Dates(_) => None,
                })
                .collect();

            let required = match room.room_type {
                RoomType::Alone => 2,
                RoomType::Each => 1,
            };
            if places.len() < required {
                return Err(EngineError::InsufficientData {
                    room_id: room.id,
                    required,
                    found: places.len(),
                });
            }

            let outcome =
                midpoint::midpoint(&places, method).ok_or(EngineError::InsufficientData {
                    room_id: room.id,
                    required,
                    found: 0,
                })?;
            Outcome::Midpoint(outcome)
        }
    };

    Ok(AggregationResult {
        room_id: room.id,
        revision: room.revision,
        computed_at: room.updated_at,
        outcome,
    })
}

fn flatten(submissions: &[Submission]) -> Vec<Entry<'_>> {
    let mut entries = Vec::with_capacity(submissions.len());
    for submission in submissions {
        match &submission.payload {
            Payload::Dates(votes) => entries.push(Entry {
                name: submission.participant.as_str(),
                data: EntryData::Dates(votes),
            }),
            Payload::Place(place) => entries.push(Entry {
                name: submission.participant.as_str(),
                data: EntryData::Place(place),
            }),
            Payload::OnBehalf(proxies) => {
                entries.extend(proxies.iter().map(|proxy| Entry {
                    name: proxy.name.trim(),
                    data: match &proxy.availability {
                        Availability::Dates(votes) => EntryData::Dates(votes),
                        Availability::Place(place) => EntryData::Place(place),
                    },
                }));
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::{aggregate, EngineError};
    use crate::model::result::{MidpointMethod, Outcome};
    use crate::model::room::{Room, RoomType, VoteKind};
    use crate::model::submission::{
        Availability, Coordinate, Payload, Place, ProxyEntry, Submission,
    };
    use crate::repo::submission_repo::RoomSnapshot;

    fn submission(room: &Room, participant: &str, payload: Payload, sequence: i64) -> Submission {
        Submission {
            room_id: room.id,
            participant: participant.to_string(),
            payload,
            first_submitted_at: sequence,
            updated_at: sequence,
            sequence,
        }
    }

    #[test]
    fn each_place_room_without_submissions_is_insufficient() {
        let room = Room::new(RoomType::Each, VoteKind::Place, 10);
        let snapshot = RoomSnapshot {
            room: room.clone(),
            submissions: Vec::new(),
        };
        let err = aggregate(&snapshot, MidpointMethod::Planar).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientData {
                room_id: room.id,
                required: 1,
                found: 0,
            }
        );
    }

    #[test]
    fn alone_place_room_needs_two_members() {
        let room = Room::new(RoomType::Alone, VoteKind::Place, 10);
        let one = Payload::OnBehalf(vec![ProxyEntry {
            name: "me".to_string(),
            availability: Availability::Place(Place::new("a", Coordinate::new(0.0, 0.0))),
        }]);
        let snapshot = RoomSnapshot {
            room: room.clone(),
            submissions: vec![submission(&room, "me", one, 1)],
        };
        assert!(matches!(
            aggregate(&snapshot, MidpointMethod::Planar),
            Err(EngineError::InsufficientData { required: 2, found: 1, .. })
        ));
    }

    #[test]
    fn alone_entries_are_expanded_per_member() {
        let room = Room::new(RoomType::Alone, VoteKind::Place, 10);
        let payload = Payload::OnBehalf(vec![
            ProxyEntry {
                name: "mina".to_string(),
                availability: Availability::Place(Place::new("a", Coordinate::new(0.0, 0.0))),
            },
            ProxyEntry {
                name: "joon".to_string(),
                availability: Availability::Place(Place::new("b", Coordinate::new(0.0, 2.0))),
            },
        ]);
        let snapshot = RoomSnapshot {
            room: room.clone(),
            submissions: vec![submission(&room, "owner", payload, 1)],
        };

        let result = aggregate(&snapshot, MidpointMethod::Planar).unwrap();
        let Outcome::Midpoint(outcome) = result.outcome else {
            panic!("expected midpoint outcome");
        };
        assert_eq!(outcome.coordinate, Coordinate::new(0.0, 1.0));
        let names: Vec<&str> = outcome.legs.iter().map(|leg| leg.name.as_str()).collect();
        assert_eq!(names, vec!["mina", "joon"]);
        assert_eq!(result.computed_at, 10);
    }
}
