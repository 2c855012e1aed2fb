//! Date/time overlap aggregation.
//!
//! # Invariants
//! - Days are emitted in ascending date order; empty days never appear.
//! - Attendees keep the order entries were supplied in.
//! - Best day: most attendees, earliest date on ties.
//! - `shared` lists the days every entry attends.

use crate::model::result::{Attendance, CommonWindow, DateOverlap, DayAvailability};
use crate::model::submission::{DateVote, TimeRange};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Groups each entry's date votes by date and intersects their windows.
pub fn overlap_dates<'a, I>(entries: I) -> DateOverlap
where
    I: IntoIterator<Item = (&'a str, &'a [DateVote])>,
{
    let mut by_date: BTreeMap<NaiveDate, Vec<Attendance>> = BTreeMap::new();
    let mut participants = 0;
    for (name, votes) in entries {
        participants += 1;
        for vote in votes {
            by_date.entry(vote.date).or_default().push(Attendance {
                name: name.to_string(),
                window: vote.window,
            });
        }
    }

    let days: Vec<DayAvailability> = by_date
        .into_iter()
        .filter(|(_, attendees)| !attendees.is_empty())
        .map(|(date, attendees)| {
            let common_window = common_window(attendees.iter().map(|entry| entry.window));
            DayAvailability {
                date,
                attendees,
                common_window,
            }
        })
        .collect();

    let mut best: Option<&DayAvailability> = None;
    for day in &days {
        // Strict comparison keeps the earliest date on ties.
        if best.map_or(true, |current| day.attendees.len() > current.attendees.len()) {
            best = Some(day);
        }
    }
    let best = best.map(|day| day.date);
    let shared = days
        .iter()
        .filter(|day| day.attendees.len() == participants)
        .map(|day| day.date)
        .collect();

    DateOverlap { days, shared, best }
}

fn common_window(windows: impl Iterator<Item = Option<TimeRange>>) -> CommonWindow {
    windows.fold(CommonWindow::AllDay, |acc, window| match (acc, window) {
        (acc, None) => acc,
        (CommonWindow::AllDay, Some(window)) => CommonWindow::Range(window),
        (CommonWindow::Range(current), Some(window)) => current
            .intersect(&window)
            .map_or(CommonWindow::Disjoint, CommonWindow::Range),
        (CommonWindow::Disjoint, Some(_)) => CommonWindow::Disjoint,
    })
}
