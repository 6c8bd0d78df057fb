use netdrive_core::storage::{
    ensure_persisted, exists, load, load_or_new, Computer, Database, Mapping, Server, Setting,
    Share, User,
};
use tempfile::tempdir;

const STAMP: &str = "2024-03-04T08:00:00+00:00";

#[test]
fn test_ensure_persisted_is_idempotent() {
    let db = Database::open_in_memory().unwrap();

    let mut first = Server::new("FS01", "CORP", STAMP);
    let mut second = Server::new("FS01", "CORP", STAMP);
    assert!(ensure_persisted(&db, &mut first).unwrap());
    assert!(!ensure_persisted(&db, &mut second).unwrap());
    assert!(!ensure_persisted(&db, &mut first).unwrap());

    assert_eq!(first.id, second.id);
    assert!(first.id.is_some());
    assert_eq!(db.count_rows("servers").unwrap(), 1);
}

#[test]
fn test_load_or_new_reports_existence() {
    let db = Database::open_in_memory().unwrap();

    let (user, existed) = load_or_new(&db, User::new("alice")).unwrap();
    assert!(!existed);
    assert_eq!(user.id, None);
    assert_eq!(db.count_rows("users").unwrap(), 0);

    let mut user = user;
    ensure_persisted(&db, &mut user).unwrap();
    let (again, existed) = load_or_new(&db, User::new("alice")).unwrap();
    assert!(existed);
    assert_eq!(again.id, user.id);
}

#[test]
fn test_load_picks_up_store_resident_fields() {
    let db = Database::open_in_memory().unwrap();
    let mut server = Server::new("FS01", "CORP", STAMP);
    ensure_persisted(&db, &mut server).unwrap();
    server.set_active(&db, false).unwrap();

    let mut fresh = Server::new("FS01", "CORP", "2030-01-01T00:00:00+00:00");
    assert!(fresh.active);
    assert!(load(&db, &mut fresh).unwrap());
    assert!(!fresh.active);
    assert_eq!(fresh.first_seen, STAMP);
}

#[test]
fn test_server_key_includes_domain() {
    let db = Database::open_in_memory().unwrap();
    let mut corp = Server::new("FS01", "CORP", STAMP);
    let mut lab = Server::new("FS01", "LAB", STAMP);
    ensure_persisted(&db, &mut corp).unwrap();
    ensure_persisted(&db, &mut lab).unwrap();
    assert_ne!(corp.id, lab.id);
    assert!(exists(&db, &Server::new("fs01", "corp", STAMP)).unwrap());
}

#[test]
fn test_share_requires_existing_server() {
    let db = Database::open_in_memory().unwrap();
    let mut orphan = Share::new(999, "Public");
    assert!(ensure_persisted(&db, &mut orphan).is_err());
    assert_eq!(db.count_rows("shares").unwrap(), 0);
}

#[test]
fn test_mapping_upsert_refreshes_existing_row() {
    let db = Database::open_in_memory().unwrap();
    let mut server = Server::new("FS01", "CORP", STAMP);
    ensure_persisted(&db, &mut server).unwrap();
    let mut share = Share::new(server.id.unwrap(), "Public");
    ensure_persisted(&db, &mut share).unwrap();
    let mut user = User::new("alice");
    ensure_persisted(&db, &mut user).unwrap();
    let mut computer = Computer::new("WS-0042");
    ensure_persisted(&db, &mut computer).unwrap();

    let ids = (share.id.unwrap(), computer.id.unwrap(), user.id.unwrap());
    let first = Mapping::new(ids.0, ids.1, ids.2, "Z:", r"CORP\alice", STAMP);
    assert!(first.upsert(&db).unwrap());

    let later = Mapping::new(ids.0, ids.1, ids.2, "P:", r"CORP\alice", "2024-03-05T08:00:00+00:00");
    assert!(!later.upsert(&db).unwrap());

    let (stored, existed) = load_or_new(&db, Mapping::new(ids.0, ids.1, ids.2, "", "", "")).unwrap();
    assert!(existed);
    assert_eq!(stored.letter, "P:");
    assert_eq!(stored.last_seen, "2024-03-05T08:00:00+00:00");
    assert_eq!(db.count_rows("mappings").unwrap(), 1);
}

#[test]
fn test_setting_entity_does_not_overwrite() {
    let db = Database::open_in_memory().unwrap();
    db.set_setting("logging", "true").unwrap();

    let mut setting = Setting::new("logging", "false");
    assert!(!ensure_persisted(&db, &mut setting).unwrap());
    assert_eq!(setting.value, "true");
}

#[test]
fn test_catalog_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let id = {
        let db = Database::open(&path).unwrap();
        let mut computer = Computer::new("WS-0042");
        ensure_persisted(&db, &mut computer).unwrap();
        computer.id
    };

    let db = Database::open(&path).unwrap();
    let (computer, existed) = load_or_new(&db, Computer::new("ws-0042")).unwrap();
    assert!(existed);
    assert_eq!(computer.id, id);
}

#[test]
fn test_open_in_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does-not-exist").join("catalog.db");
    assert!(Database::open(&path).is_err());
}

#[test]
fn test_transaction_rollback_discards_writes() {
    let db = Database::open_in_memory().unwrap();
    {
        let _tx = db.transaction().unwrap();
        let mut user = User::new("alice");
        ensure_persisted(&db, &mut user).unwrap();
    }
    assert_eq!(db.count_rows("users").unwrap(), 0);
}
