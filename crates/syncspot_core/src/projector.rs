//! Result projection into client-facing shapes.
//!
//! Transform only: no filtering, ranking or validation happens here.

use crate::model::result::{AggregationResult, CommonWindow, DateOverlap, MidpointOutcome, Outcome};
use crate::model::submission::TimeRange;
use serde::Serialize;
use std::collections::BTreeMap;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// One attendee row under a date key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateEntry {
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Date-keyed breakdown, looked up by `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateBreakdown {
    pub result: BTreeMap<String, Vec<DateEntry>>,
    /// Shared `HH:MM` window per date; absent when all-day or disjoint.
    pub common: BTreeMap<String, (String, String)>,
    /// Consensus days every participant can attend; `result` also keys
    /// partially attended days.
    pub shared: Vec<String>,
    pub best: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegView {
    pub name: String,
    pub distance_km: f64,
}

/// Single coordinate plus the closest submitted address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidpointView {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub si_do: String,
    pub si_gun_gu: String,
    pub legs: Vec<LegView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Projection {
    Dates(DateBreakdown),
    Midpoint(MidpointView),
}

/// Projects either result shape.
pub fn project(result: &AggregationResult) -> Projection {
    match &result.outcome {
        Outcome::Dates(overlap) => Projection::Dates(project_dates(overlap)),
        Outcome::Midpoint(outcome) => Projection::Midpoint(project_midpoint(outcome)),
    }
}

pub fn project_dates(overlap: &DateOverlap) -> DateBreakdown {
    let mut result = BTreeMap::new();
    let mut common = BTreeMap::new();

    for day in &overlap.days {
        let key = day.date.format(DATE_KEY_FORMAT).to_string();
        let entries = day
            .attendees
            .iter()
            .map(|attendance| {
                let (start_time, end_time) = match attendance.window {
                    Some(window) => {
                        let (start, end) = format_window(&window);
                        (Some(start), Some(end))
                    }
                    None => (None, None),
                };
                DateEntry {
                    name: attendance.name.clone(),
                    start_time,
                    end_time,
                }
            })
            .collect();
        if let CommonWindow::Range(window) = day.common_window {
            common.insert(key.clone(), format_window(&window));
        }
        result.insert(key, entries);
    }

    DateBreakdown {
        result,
        common,
        shared: overlap
            .shared
            .iter()
            .map(|date| date.format(DATE_KEY_FORMAT).to_string())
            .collect(),
        best: overlap
            .best
            .map(|date| date.format(DATE_KEY_FORMAT).to_string()),
    }
}

pub fn project_midpoint(outcome: &MidpointOutcome) -> MidpointView {
    MidpointView {
        lat: outcome.coordinate.lat,
        lng: outcome.coordinate.lng,
        address: outcome.nearest.road_name_address.clone(),
        si_do: outcome.nearest.si_do.clone(),
        si_gun_gu: outcome.nearest.si_gun_gu.clone(),
        legs: outcome
            .legs
            .iter()
            .map(|leg| LegView {
                name: leg.name.clone(),
                distance_km: leg.distance_km,
            })
            .collect(),
    }
}

fn format_window(window: &TimeRange) -> (String, String) {
    (
        window.start.format(TIME_FORMAT).to_string(),
        window.end.format(TIME_FORMAT).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::{project_dates, DateEntry};
    use crate::model::result::{Attendance, CommonWindow, DateOverlap, DayAvailability};
    use crate::model::submission::TimeRange;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn dates_are_keyed_by_iso_day_with_hh_mm_windows() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let window = TimeRange::new(
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        let overlap = DateOverlap {
            days: vec![DayAvailability {
                date,
                attendees: vec![
                    Attendance {
                        name: "A".to_string(),
                        window: Some(window),
                    },
                    Attendance {
                        name: "B".to_string(),
                        window: None,
                    },
                ],
                common_window: CommonWindow::Range(window),
            }],
            shared: vec![date],
            best: Some(date),
        };

        let breakdown = project_dates(&overlap);
        assert_eq!(breakdown.best.as_deref(), Some("2024-01-02"));
        assert_eq!(breakdown.shared, vec!["2024-01-02".to_string()]);
        assert_eq!(
            breakdown.result["2024-01-02"][0],
            DateEntry {
                name: "A".to_string(),
                start_time: Some("09:30".to_string()),
                end_time: Some("12:00".to_string()),
            }
        );
        assert_eq!(breakdown.result["2024-01-02"][1].start_time, None);
        assert_eq!(
            breakdown.common["2024-01-02"],
            ("09:30".to_string(), "12:00".to_string())
        );
    }
}
