//! Access failures surfaced by the backend collaborator.
//!
//! The core never issues or checks tokens. It only tells "not logged in"
//! apart from "logged in but not allowed in this room" so the caller can pick
//! the next screen.

use crate::boundary::intent::{IntentTarget, PendingIntent};
use crate::model::room::RoomId;
use std::error::Error;
use std::fmt::{Display, Formatter};

const HTTP_UNAUTHORIZED: u16 = 401;
const HTTP_FORBIDDEN: u16 = 403;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// No valid credentials; the caller must log in.
    Unauthorized { room_id: RoomId },
    /// Credentials are valid but scoped to another room or flow.
    Forbidden { room_id: RoomId },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { room_id } => write!(f, "login required for room {room_id}"),
            Self::Forbidden { room_id } => write!(f, "access to room {room_id} is forbidden"),
        }
    }
}

impl Error for AccessError {}

/// What the caller should do after an access failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// Show the login screen, then resume `resume`.
    Login {
        path: String,
        resume: PendingIntent,
    },
    /// Send the user back into the room flow.
    Redirect(String),
}

impl AccessError {
    /// Classifies an HTTP status. Returns `None` for anything but 401/403.
    pub fn from_status(status: u16, room_id: RoomId) -> Option<Self> {
        match status {
            HTTP_UNAUTHORIZED => Some(Self::Unauthorized { room_id }),
            HTTP_FORBIDDEN => Some(Self::Forbidden { room_id }),
            _ => None,
        }
    }

    /// Decides the next screen for a request made on behalf of `intent`.
    pub fn next_step(&self, intent: PendingIntent) -> NextStep {
        match *self {
            Self::Unauthorized { room_id } => NextStep::Login {
                path: format!("/page/login/{room_id}"),
                resume: intent,
            },
            Self::Forbidden { room_id } => NextStep::Redirect(
                PendingIntent::new(intent.room_type, IntentTarget::EnterRoom).route(room_id),
            ),
        }
    }
}
