use chrono::NaiveDate;
use syncspot_core::db::open_db_in_memory;
use syncspot_core::{
    CoreError, DateVote, Payload, PayloadError, RoomRepository, RoomService, RoomStatus,
    RoomType, SqliteRoomRepository, SqliteSubmissionRepository, SubmissionService, VoteKind,
};
use uuid::Uuid;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[test]
fn create_room_returns_distinct_open_rooms() {
    let conn = open_db_in_memory().unwrap();
    let service = RoomService::new(SqliteRoomRepository::new(&conn));

    let first = service.create_room("EACH", "time").unwrap();
    let second = service.create_room("ALONE", "place").unwrap();
    assert_ne!(first, second);

    let room = service.get_room(second).unwrap();
    assert_eq!(room.room_type, RoomType::Alone);
    assert_eq!(room.vote_kind, VoteKind::Place);
    assert_eq!(room.status, RoomStatus::Open);
    assert_eq!(room.revision, 0);
    assert!(room.candidate_dates.is_empty());
}

#[test]
fn create_room_rejects_unknown_type() {
    let conn = open_db_in_memory().unwrap();
    let service = RoomService::new(SqliteRoomRepository::new(&conn));

    let err = service.create_room("GROUP", "time").unwrap_err();
    assert!(matches!(err, CoreError::InvalidType(value) if value == "GROUP"));
    assert!(matches!(
        service.create_room("EACH", "weather").unwrap_err(),
        CoreError::InvalidType(_)
    ));
}

#[test]
fn get_room_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = RoomService::new(SqliteRoomRepository::new(&conn));
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.get_room(missing).unwrap_err(),
        CoreError::NotFound(id) if id == missing
    ));
    assert!(matches!(
        service.close_room(missing).unwrap_err(),
        CoreError::NotFound(_)
    ));
}

#[test]
fn close_room_is_idempotent_and_bumps_revision_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRoomRepository::new(&conn);
    let service = RoomService::new(SqliteRoomRepository::new(&conn));
    let id = service.create_room("EACH", "place").unwrap();

    assert!(repo.close_room(id).unwrap());
    assert!(!repo.close_room(id).unwrap());
    service.close_room(id).unwrap();

    let room = service.get_room(id).unwrap();
    assert_eq!(room.status, RoomStatus::Closed);
    assert_eq!(room.revision, 1);
}

#[test]
fn check_room_reports_existence_and_dates() {
    let conn = open_db_in_memory().unwrap();
    let service = RoomService::new(SqliteRoomRepository::new(&conn));
    let id = service.create_room("EACH", "time").unwrap();
    service
        .set_candidate_dates(id, vec![date(3), date(1), date(3)])
        .unwrap();

    let check = service.check_room(id).unwrap();
    assert!(check.exists);
    assert_eq!(check.candidate_dates, vec![date(1), date(3)]);

    let absent = service.check_room(Uuid::new_v4()).unwrap();
    assert!(!absent.exists);
    assert!(absent.candidate_dates.is_empty());
}

#[test]
fn set_candidate_dates_rejects_place_rooms_and_empty_lists() {
    let conn = open_db_in_memory().unwrap();
    let service = RoomService::new(SqliteRoomRepository::new(&conn));
    let place_room = service.create_room("EACH", "place").unwrap();
    let time_room = service.create_room("EACH", "time").unwrap();

    assert!(matches!(
        service
            .set_candidate_dates(place_room, vec![date(1)])
            .unwrap_err(),
        CoreError::InvalidPayload(PayloadError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        service.set_candidate_dates(time_room, Vec::new()).unwrap_err(),
        CoreError::InvalidPayload(PayloadError::EmptyCandidateDates)
    ));
}

#[test]
fn recreating_candidate_dates_starts_a_new_round() {
    let conn = open_db_in_memory().unwrap();
    let rooms = RoomService::new(SqliteRoomRepository::new(&conn));
    let submissions = SubmissionService::new(SqliteSubmissionRepository::new(&conn));
    let id = rooms.create_room("EACH", "time").unwrap();
    rooms.set_candidate_dates(id, vec![date(1), date(2)]).unwrap();

    submissions
        .submit(id, "mina", Payload::Dates(vec![DateVote::all_day(date(1))]))
        .unwrap();
    let before = rooms.get_room(id).unwrap().revision;

    let room = rooms.set_candidate_dates(id, vec![date(5)]).unwrap();
    assert_eq!(room.candidate_dates, vec![date(5)]);
    assert!(room.revision > before);
    assert!(submissions.list_submissions(id).unwrap().is_empty());

    let err = submissions
        .submit(id, "mina", Payload::Dates(vec![DateVote::all_day(date(1))]))
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidPayload(PayloadError::DateNotOffered(day)) if day == date(1)
    ));
}

#[test]
fn closed_room_rejects_candidate_date_changes() {
    let conn = open_db_in_memory().unwrap();
    let service = RoomService::new(SqliteRoomRepository::new(&conn));
    let id = service.create_room("ALONE", "time").unwrap();
    service.close_room(id).unwrap();

    assert!(matches!(
        service.set_candidate_dates(id, vec![date(1)]).unwrap_err(),
        CoreError::RoomClosed(_)
    ));
}
