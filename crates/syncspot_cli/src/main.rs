//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `syncspot_core` linkage, configuration and schema bootstrap.
//! - Run one small time vote end to end and print the projection.
//!
//! Usage: `syncspot_cli [config.json]`. A `.env` file, when present, feeds
//! the `SYNCSPOT_*` variables.

use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::process::ExitCode;
use syncspot_core::db::migrations::current_user_version;
use syncspot_core::{
    init_logging, open_db, open_db_in_memory, AggregationService, CoreConfig, DateVote, Payload,
    Projection, RoomService, SqliteRoomRepository, SqliteSubmissionRepository, SubmissionService,
};

const DEFAULT_CONFIG_PATH: &str = "syncspot.json";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("syncspot_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = CoreConfig::load(&config_path)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    println!("syncspot_core ping={}", syncspot_core::ping());
    println!("syncspot_core version={}", syncspot_core::core_version());

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    println!("syncspot_core schema_version={}", current_user_version(&conn)?);

    let rooms = RoomService::new(SqliteRoomRepository::new(&conn));
    let submissions =
        SubmissionService::new(SqliteSubmissionRepository::new(&conn)).with_limits(config.limits());
    let aggregation = AggregationService::new(SqliteSubmissionRepository::new(&conn))
        .with_method(config.midpoint_method);

    let first = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid demo date")?;
    let second = first.succ_opt().ok_or("invalid demo date")?;

    let room_id = rooms.create_room("EACH", "time")?;
    rooms.set_candidate_dates(room_id, vec![first, second])?;
    submissions.submit(
        room_id,
        "A",
        Payload::Dates(vec![DateVote::all_day(first), DateVote::all_day(second)]),
    )?;
    submissions.submit(room_id, "B", Payload::Dates(vec![DateVote::all_day(second)]))?;

    if let Projection::Dates(breakdown) = aggregation.project(room_id)? {
        for (date, entries) in &breakdown.result {
            let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
            println!("demo date={} attendees={}", date, names.join(","));
        }
        println!("demo best={}", breakdown.best.as_deref().unwrap_or("-"));
    }
    rooms.close_room(room_id)?;
    info!("event=cli_demo module=cli status=ok room_id={}", room_id);

    Ok(())
}
