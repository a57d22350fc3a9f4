use std::{collections::BTreeSet, fs};

use tempfile::TempDir;

use memberlog::{
    config::{Backend, RegistryConfig, StorageConfig},
    core::registry::{MemberRegistry, StoreError},
    member::{MemberDraft, MemberRecord},
    persist::{
        self, PersistError, RecordSink, RecordSource, delimited::DelimitedFile,
        load_registry, save_registry, sqlite::SqliteMemberTable,
    },
    shell::Shell,
};

fn populated() -> MemberRegistry {
    let mut registry = MemberRegistry::new();
    for (first, last, email) in [
        ("Jane", "Doe", "j@x.com"),
        ("Ada", "Lovelace", "ada@engine.org"),
        ("Alan", "Turing", "alan@bletchley.uk"),
        ("Grace", "Hopper", "grace@navy.mil"),
    ] {
        registry.insert(MemberDraft::new(first, last, email)).expect("insert");
    }
    registry
}

fn tuples(registry: &MemberRegistry) -> BTreeSet<(u32, String, String, String)> {
    registry
        .iter()
        .map(|r| (r.id, r.first_name.clone(), r.last_name.clone(), r.email.clone()))
        .collect()
}

#[test]
fn delimited_file_round_trips_members() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("members.txt");

    let registry = populated();
    let mut file = DelimitedFile::new(&path, ',');
    assert_eq!(save_registry(&mut file, &registry).expect("save"), 4);

    let text = fs::read_to_string(&path).expect("read");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("ID,FNAME,LNAME,EMAIL"));
    let row_ids: Vec<u32> = lines
        .map(|l| l.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(row_ids, registry.ordered_ids());

    let reloaded = load_registry(&mut file, &RegistryConfig::default()).expect("load");
    assert_eq!(tuples(&reloaded), tuples(&registry));
    assert_eq!(reloaded.capacity(), 4 + 10);
}

#[test]
fn reloaded_registry_still_rejects_duplicates() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("members.txt");
    let mut file = DelimitedFile::new(&path, '\t');
    save_registry(&mut file, &populated()).expect("save");

    let mut reloaded = load_registry(&mut file, &RegistryConfig::default()).expect("load");
    let err = reloaded
        .insert(MemberDraft::new("jane", "DOE", "again@x.com"))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateMember { .. }));
}

#[test]
fn invalid_identifier_aborts_load() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("members.txt");
    fs::write(
        &path,
        "ID,FNAME,LNAME,EMAIL\n147707,Jane,Doe,j@x.com\nabc,Bad,Row,b@x.com\n",
    )
    .expect("write");

    let mut file = DelimitedFile::new(&path, ',');
    match load_registry(&mut file, &RegistryConfig::default()) {
        Err(PersistError::InvalidIdentifier { line, value }) => {
            assert_eq!(line, 3);
            assert_eq!(value, "abc");
        }
        other => panic!("expected InvalidIdentifier, got {other:?}"),
    }
}

#[test]
fn repeated_identifier_aborts_load() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("members.txt");
    fs::write(
        &path,
        "ID,FNAME,LNAME,EMAIL\n7,Jane,Doe,j@x.com\n7,Jane,Doe,j@x.com\n",
    )
    .expect("write");

    let mut file = DelimitedFile::new(&path, ',');
    assert!(matches!(
        load_registry(&mut file, &RegistryConfig::default()),
        Err(PersistError::Store(StoreError::DuplicateIdentifier { id: 7 }))
    ));
}

#[test]
fn unencodable_field_leaves_existing_file_untouched() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("members.txt");
    let mut file = DelimitedFile::new(&path, ',');
    save_registry(&mut file, &populated()).expect("save");
    let before = fs::read_to_string(&path).expect("read");

    let mut registry = populated();
    registry
        .insert(MemberDraft::new("Comma", "Person", "a,b@x.com"))
        .expect("insert");
    assert!(matches!(
        save_registry(&mut file, &registry),
        Err(PersistError::FieldNotEncodable { .. })
    ));
    assert_eq!(fs::read_to_string(&path).expect("read"), before);
}

#[test]
fn storage_config_reads_one_path_and_writes_another() {
    let tmp = TempDir::new().expect("tmp");
    let input = tmp.path().join("in.txt");
    let output = tmp.path().join("out.txt");
    fs::write(&input, "ID,FNAME,LNAME,EMAIL\n147707,Jane,Doe,j@x.com\n").expect("write");

    let storage = StorageConfig {
        data_path: input.clone(),
        output_path: Some(output.clone()),
        ..StorageConfig::default()
    };
    let mut registry = persist::load(&storage, &RegistryConfig::default()).expect("load");
    registry
        .insert(MemberDraft::new("Ada", "Lovelace", "ada@engine.org"))
        .expect("insert");
    assert_eq!(persist::save(&storage, &registry).expect("save"), 2);

    assert_eq!(
        fs::read_to_string(&input).expect("read input"),
        "ID,FNAME,LNAME,EMAIL\n147707,Jane,Doe,j@x.com\n"
    );
    let mut out = DelimitedFile::new(&output, ',');
    assert_eq!(out.load_records().expect("load output").len(), 2);
}

#[test]
fn missing_file_starts_empty_unless_required() {
    let tmp = TempDir::new().expect("tmp");
    let mut storage = StorageConfig {
        data_path: tmp.path().join("absent.txt"),
        ..StorageConfig::default()
    };

    let registry = persist::load(&storage, &RegistryConfig::default()).expect("load");
    assert!(registry.is_empty());
    assert_eq!(registry.capacity(), 10);

    storage.create_if_missing = false;
    assert!(matches!(
        persist::load(&storage, &RegistryConfig::default()),
        Err(PersistError::Missing(_))
    ));
}

#[test]
fn sqlite_table_round_trips_members() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("members.db");

    let registry = populated();
    let mut table = SqliteMemberTable::open(&db_path).expect("open sqlite");
    assert_eq!(save_registry(&mut table, &registry).expect("save"), 4);
    drop(table);

    let mut reopened = SqliteMemberTable::open(&db_path).expect("reopen");
    assert_eq!(reopened.row_count().expect("count"), 4);
    let reloaded = load_registry(&mut reopened, &RegistryConfig::default()).expect("load");
    assert_eq!(tuples(&reloaded), tuples(&registry));
    assert_eq!(reloaded.ordered_ids(), registry.ordered_ids());
}

#[test]
fn sqlite_write_replaces_previous_rows() {
    let mut table = SqliteMemberTable::open_in_memory().expect("open");
    let mut registry = populated();
    table
        .write_records(&registry.export_snapshot().records)
        .expect("first write");

    let id = registry.ordered_ids()[0];
    registry.remove(id).expect("remove");
    table
        .write_records(&registry.export_snapshot().records)
        .expect("second write");

    let rows: Vec<MemberRecord> = table.load_records().expect("load");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.id != id));
}

#[test]
fn sqlite_backend_via_storage_config() {
    let tmp = TempDir::new().expect("tmp");
    let storage = StorageConfig {
        data_path: tmp.path().join("members.db"),
        backend: Backend::Sqlite,
        ..StorageConfig::default()
    };

    let empty = persist::load(&storage, &RegistryConfig::default()).expect("load empty");
    assert!(empty.is_empty());

    persist::save(&storage, &populated()).expect("save");
    let reloaded = persist::load(&storage, &RegistryConfig::default()).expect("reload");
    assert_eq!(tuples(&reloaded), tuples(&populated()));
}

#[test]
fn session_with_delimiter_in_name_still_saves() {
    let tmp = TempDir::new().expect("tmp");
    let storage = StorageConfig {
        data_path: tmp.path().join("members.txt"),
        ..StorageConfig::default()
    };
    let mut registry = persist::load(&storage, &RegistryConfig::default()).expect("load");

    let mut out = Vec::new();
    Shell::new(
        &mut registry,
        "1\nBob\nStone\nbob@x.com\n\n1\nMary,Ann\nLee\nm@x.com\n\nq\n".as_bytes(),
        &mut out,
    )
    .run()
    .expect("session");
    let out = String::from_utf8(out).expect("utf8");

    assert!(out.contains("Bob Stone was added!"));
    assert!(out.contains("Sorry, Mary,Ann Lee cannot be added"));
    assert_eq!(registry.len(), 1);

    assert_eq!(persist::save(&storage, &registry).expect("save"), 1);
    let text = fs::read_to_string(&storage.data_path).expect("read");
    assert!(text.contains(",Bob,Stone,bob@x.com"));
    assert!(!text.contains("Mary"));
}

#[test]
fn failed_write_removes_temp_file() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("members.txt");
    fs::create_dir(&path).expect("dir in the way");

    let mut file = DelimitedFile::new(&path, ',');
    assert!(matches!(
        file.write_records(&populated().export_snapshot().records),
        Err(PersistError::Io(_))
    ));
    assert!(!tmp.path().join("members.txt.tmp").exists());
    assert!(path.is_dir());
}
