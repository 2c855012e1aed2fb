//! Pending navigation intent carried through the login boundary.
//!
//! # Responsibility
//! - Represent "where the user was going" as a typed value.
//! - Resolve that value to a route through one dispatch table.
//!
//! # Invariants
//! - Every `(RoomType, IntentTarget)` pair has exactly one table row.
//! - Unknown legacy origins resolve to the home route.

use crate::model::room::{RoomId, RoomType};
use serde::{Deserialize, Serialize};

pub const HOME_ROUTE: &str = "/";
const ROOM_ID_PLACEHOLDER: &str = "{room_id}";

/// Screen the user wanted to reach before authentication interrupted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTarget {
    EnterRoom,
    Result,
    CreatePlaceVote,
    PlaceVote,
    PlaceVoteResult,
    CreateTimeVote,
    TimeVote,
    TimeVoteResult,
}

/// Intent resumed after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingIntent {
    pub room_type: RoomType,
    pub target: IntentTarget,
}

struct Route {
    origin: &'static str,
    room_type: RoomType,
    target: IntentTarget,
    template: &'static str,
}

const ROUTES: &[Route] = &[
    Route {
        origin: "FROM_ENTER_ALONE",
        room_type: RoomType::Alone,
        target: IntentTarget::EnterRoom,
        template: "/page/alone/{room_id}",
    },
    Route {
        origin: "FROM_ENTER_EACH",
        room_type: RoomType::Each,
        target: IntentTarget::EnterRoom,
        template: "/page/each/{room_id}",
    },
    Route {
        origin: "FROM_ALONE_RESULT",
        room_type: RoomType::Alone,
        target: IntentTarget::Result,
        template: "/page/a/results/{room_id}",
    },
    Route {
        origin: "FROM_EACH_RESULT",
        room_type: RoomType::Each,
        target: IntentTarget::Result,
        template: "/page/e/results/{room_id}",
    },
    Route {
        origin: "FROM_ALONE_CREATE_VOTE_PLACE",
        room_type: RoomType::Alone,
        target: IntentTarget::CreatePlaceVote,
        template: "/page/a/create/place-vote-room/{room_id}",
    },
    Route {
        origin: "FROM_EACH_CREATE_VOTE_PLACE",
        room_type: RoomType::Each,
        target: IntentTarget::CreatePlaceVote,
        template: "/page/e/create/place-vote-room/{room_id}",
    },
    Route {
        origin: "FROM_ALONE_PLACE_VOTE",
        room_type: RoomType::Alone,
        target: IntentTarget::PlaceVote,
        template: "/page/a/place-vote/{room_id}",
    },
    Route {
        origin: "FROM_EACH_PLACE_VOTE",
        room_type: RoomType::Each,
        target: IntentTarget::PlaceVote,
        template: "/page/e/place-vote/{room_id}",
    },
    Route {
        origin: "FROM_ALONE_PLACE_VOTE_RESULT",
        room_type: RoomType::Alone,
        target: IntentTarget::PlaceVoteResult,
        template: "/page/a/place-vote/results/{room_id}",
    },
    Route {
        origin: "FROM_EACH_PLACE_VOTE_RESULT",
        room_type: RoomType::Each,
        target: IntentTarget::PlaceVoteResult,
        template: "/page/e/place-vote/results/{room_id}",
    },
    Route {
        origin: "FROM_ALONE_CREATE_VOTE_TIME",
        room_type: RoomType::Alone,
        target: IntentTarget::CreateTimeVote,
        template: "/page/a/create/time-vote-room/{room_id}",
    },
    Route {
        origin: "FROM_EACH_CREATE_VOTE_TIME",
        room_type: RoomType::Each,
        target: IntentTarget::CreateTimeVote,
        template: "/page/e/create/time-vote-room/{room_id}",
    },
    Route {
        origin: "FROM_ALONE_TIME_VOTE",
        room_type: RoomType::Alone,
        target: IntentTarget::TimeVote,
        template: "/page/a/time-vote/{room_id}",
    },
    Route {
        origin: "FROM_EACH_TIME_VOTE",
        room_type: RoomType::Each,
        target: IntentTarget::TimeVote,
        template: "/page/e/time-vote/{room_id}",
    },
    Route {
        origin: "FROM_ALONE_TIME_VOTE_RESULT",
        room_type: RoomType::Alone,
        target: IntentTarget::TimeVoteResult,
        template: "/page/a/time-vote/results/{room_id}",
    },
    Route {
        origin: "FROM_EACH_TIME_VOTE_RESULT",
        room_type: RoomType::Each,
        target: IntentTarget::TimeVoteResult,
        template: "/page/e/time-vote/results/{room_id}",
    },
];

impl PendingIntent {
    pub fn new(room_type: RoomType, target: IntentTarget) -> Self {
        Self { room_type, target }
    }

    /// Parses a legacy origin constant such as `FROM_EACH_TIME_VOTE`.
    pub fn parse(origin: &str) -> Option<Self> {
        let origin = origin.trim();
        ROUTES
            .iter()
            .find(|route| route.origin == origin)
            .map(|route| Self::new(route.room_type, route.target))
    }

    /// Renders the route for `room_id`.
    pub fn route(&self, room_id: RoomId) -> String {
        ROUTES
            .iter()
            .find(|route| route.room_type == self.room_type && route.target == self.target)
            .map_or_else(
                || HOME_ROUTE.to_string(),
                |route| {
                    route
                        .template
                        .replace(ROOM_ID_PLACEHOLDER, &room_id.to_string())
                },
            )
    }
}

/// Resolves a legacy origin string straight to a route, defaulting to home.
pub fn resolve_origin(origin: Option<&str>, room_id: RoomId) -> String {
    origin
        .and_then(PendingIntent::parse)
        .map_or_else(|| HOME_ROUTE.to_string(), |intent| intent.route(room_id))
}

#[cfg(test)]
mod tests {
    use super::{resolve_origin, IntentTarget, PendingIntent, ROUTES};
    use crate::model::room::RoomType;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn every_type_and_target_pair_has_one_route() {
        let pairs: HashSet<_> = ROUTES
            .iter()
            .map(|route| (route.room_type, route.target))
            .collect();
        assert_eq!(pairs.len(), ROUTES.len());
        assert_eq!(ROUTES.len(), 16);
    }

    #[test]
    fn legacy_origin_round_trips_to_route() {
        let room_id = Uuid::new_v4();
        let intent = PendingIntent::parse("FROM_EACH_TIME_VOTE_RESULT").unwrap();
        assert_eq!(
            intent,
            PendingIntent::new(RoomType::Each, IntentTarget::TimeVoteResult)
        );
        assert_eq!(
            intent.route(room_id),
            format!("/page/e/time-vote/results/{room_id}")
        );
    }

    #[test]
    fn unknown_or_missing_origin_goes_home() {
        let room_id = Uuid::new_v4();
        assert_eq!(resolve_origin(Some("FROM_NOWHERE"), room_id), "/");
        assert_eq!(resolve_origin(None, room_id), "/");
        assert_eq!(
            resolve_origin(Some("FROM_ENTER_ALONE"), room_id),
            format!("/page/alone/{room_id}")
        );
    }
}
