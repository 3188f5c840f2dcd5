//! File-backed log behaviour: creation, reopening and damaged files.

use apo_codec::impl_record;
use apo_core::{ApoLog, CoreError, LogConfig, Meta, Op, HEADER_SIZE};
use proptest::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq)]
struct Event {
    id: u64,
    tags: Vec<String>,
    parent: Option<u64>,
}

impl_record!(Event { id, tags, parent });

#[derive(Debug, Clone, Copy, PartialEq)]
struct Id {
    id: u64,
}

impl_record!(Id { id });

fn event(id: u64) -> Event {
    Event {
        id,
        tags: (0..id % 3).map(|t| format!("t{t}")).collect(),
        parent: id.checked_sub(1),
    }
}

#[test]
fn create_writes_header_and_empty_footer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");

    let log = ApoLog::open(&path).unwrap();
    assert_eq!(log.path(), Some(path.as_path()));
    log.close().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 25);
    assert_eq!(bytes[0], 1);
    assert_eq!(&bytes[1..9], &0u64.to_be_bytes());
    assert_eq!(&bytes[9..17], &17u64.to_be_bytes());
    assert_eq!(&bytes[17..25], &0u64.to_be_bytes());
}

#[test]
fn single_record_file_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");

    let log = ApoLog::open(&path).unwrap();
    log.write(Meta::new(*b"user", Op::Insert).with_at(1), &Id { id: 1 })
        .unwrap();

    let header = log.header().unwrap();
    assert_eq!(
        (header.version, header.total_records, header.footer_offset),
        (1, 1, 38)
    );
    assert_eq!(log.footer().unwrap().offsets(), &[17]);
    log.close().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 38 + 16);
    assert_eq!(&bytes[17..25], &1i64.to_be_bytes());
    assert_eq!(&bytes[25..29], b"user");
    assert_eq!(bytes[29], 0);
    assert_eq!(&bytes[30..38], &1u64.to_be_bytes());
    assert_eq!(&bytes[38..46], &1u64.to_be_bytes());
    assert_eq!(&bytes[46..54], &17u64.to_be_bytes());
}

#[test]
fn reopen_resumes_appending() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");

    {
        let log = ApoLog::open(&path).unwrap();
        for id in 0..5 {
            log.write(Meta::new(*b"evnt", Op::Insert), &event(id)).unwrap();
        }
        log.close().unwrap();
    }

    let log = ApoLog::open(&path).unwrap();
    assert_eq!(log.len().unwrap(), 5);
    assert_eq!(log.write(Meta::new(*b"evnt", Op::Update), &event(5)).unwrap(), 5);

    let records = log.read_all::<Event>().unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.data.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(records[5].meta.op, Op::Update);
    assert_eq!(records[3].data, event(3));
}

#[test]
fn missing_file_without_create_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.apo");

    let result = ApoLog::open_with_config(&path, LogConfig::new().create_if_missing(false));
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
    assert!(!path.exists());
}

#[test]
fn existing_file_with_error_if_exists_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    ApoLog::open(&path).unwrap().close().unwrap();

    let result = ApoLog::open_with_config(&path, LogConfig::new().error_if_exists(true));
    assert!(matches!(result, Err(CoreError::AlreadyExists { .. })));
}

#[test]
fn parent_dirs_created_on_request() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("events.apo");

    assert!(ApoLog::open(&path).is_err());
    let log = ApoLog::open_with_config(&path, LogConfig::new().create_parent_dirs(true)).unwrap();
    assert!(log.is_empty().unwrap());
}

#[test]
fn zero_length_file_is_initialized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    fs::write(&path, b"").unwrap();

    let log = ApoLog::open(&path).unwrap();
    assert_eq!(log.header().unwrap().footer_offset, HEADER_SIZE);
    assert_eq!(fs::metadata(&path).unwrap().len(), 25);
}

#[test]
fn read_only_open_never_writes() {
    let dir = tempdir().unwrap();
    let config = LogConfig::new().read_only(true);

    let missing = dir.path().join("missing.apo");
    assert!(matches!(
        ApoLog::open_with_config(&missing, config.clone()),
        Err(CoreError::NotFound { .. })
    ));
    assert!(!missing.exists());

    let empty = dir.path().join("empty.apo");
    fs::write(&empty, b"").unwrap();
    assert!(matches!(
        ApoLog::open_with_config(&empty, config.clone()),
        Err(CoreError::InvalidFormat { .. })
    ));
    assert_eq!(fs::metadata(&empty).unwrap().len(), 0);

    let path = dir.path().join("events.apo");
    let log = ApoLog::open(&path).unwrap();
    log.write(Meta::new(*b"evnt", Op::Insert), &event(1)).unwrap();
    log.close().unwrap();
    let before = fs::read(&path).unwrap();

    let log = ApoLog::open_with_config(&path, config).unwrap();
    assert_eq!(log.read::<Event>(0).unwrap().data, event(1));
    assert!(matches!(
        log.write(Meta::new(*b"evnt", Op::Insert), &event(2)),
        Err(CoreError::ReadOnly)
    ));
    log.sync().unwrap();
    log.close().unwrap();
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn truncated_header_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    fs::write(&path, [1u8, 0, 0]).unwrap();

    let err = ApoLog::open(&path).unwrap_err();
    assert_eq!(err.io_op(), Some("read header"));
}

#[test]
fn truncated_footer_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    {
        let log = ApoLog::open(&path).unwrap();
        log.write(Meta::new(*b"user", Op::Insert), &Id { id: 1 })
            .unwrap();
    }

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

    let err = ApoLog::open(&path).unwrap_err();
    assert_eq!(err.io_op(), Some("read footer"));
}

#[test]
fn unknown_version_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    ApoLog::open(&path).unwrap().close().unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[0] = 9;
    fs::write(&path, bytes).unwrap();

    assert!(matches!(
        ApoLog::open(&path),
        Err(CoreError::UnsupportedVersion { found: 9, expected: 1 })
    ));
}

#[test]
fn header_footer_disagreement_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    {
        let log = ApoLog::open(&path).unwrap();
        log.write(Meta::new(*b"user", Op::Insert), &Id { id: 1 })
            .unwrap();
    }

    let mut bytes = fs::read(&path).unwrap();
    bytes[1..9].copy_from_slice(&2u64.to_be_bytes());
    fs::write(&path, bytes).unwrap();

    assert!(matches!(
        ApoLog::open(&path),
        Err(CoreError::InvalidFormat { .. })
    ));
}

#[test]
fn corrupt_op_names_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    {
        let log = ApoLog::open(&path).unwrap();
        log.write(Meta::new(*b"user", Op::Insert), &Id { id: 1 })
            .unwrap();
        log.write(Meta::new(*b"user", Op::Insert), &Id { id: 2 })
            .unwrap();
    }

    // second record starts at 38; its op byte is the 13th meta byte
    let mut bytes = fs::read(&path).unwrap();
    bytes[38 + 12] = 3;
    fs::write(&path, bytes).unwrap();

    let log = ApoLog::open(&path).unwrap();
    let err = log.read_all::<Id>().unwrap_err();
    assert!(matches!(err, CoreError::RecordRead { index: 1, .. }));
    assert_eq!(log.read::<Id>(0).unwrap().data, Id { id: 1 });
}

#[test]
fn trailing_bytes_trimmed_on_next_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.apo");
    {
        let log = ApoLog::open(&path).unwrap();
        log.write(Meta::new(*b"user", Op::Insert), &Id { id: 1 })
            .unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xAB; 40]).unwrap();
    }

    let log = ApoLog::open(&path).unwrap();
    assert_eq!(log.stats().unwrap().orphaned_bytes, 40);
    assert_eq!(log.read_all::<Id>().unwrap().len(), 1);

    log.write(Meta::new(*b"user", Op::Delete), &Id { id: 1 })
        .unwrap();
    let stats = log.stats().unwrap();
    assert_eq!(stats.orphaned_bytes, 0);
    assert_eq!(
        stats.file_size,
        stats.header.footer_offset + stats.footer_size
    );
    log.close().unwrap();

    let reopened = ApoLog::open(&path).unwrap();
    assert_eq!(reopened.read_all::<Id>().unwrap().len(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn reopen_yields_identical_state(ids in prop::collection::vec(any::<u64>(), 0..20)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.apo");

        let log = ApoLog::open_with_config(&path, LogConfig::new().sync_on_write(false)).unwrap();
        for (i, &id) in ids.iter().enumerate() {
            let meta = Meta::new(*b"prop", Op::Insert).with_at(i as i64 + 1);
            log.write(meta, &event(id % 1000)).unwrap();
        }
        let header = log.header().unwrap();
        let footer = log.footer().unwrap();
        let before = log.read_all::<Event>().unwrap();
        log.close().unwrap();

        let reopened = ApoLog::open(&path).unwrap();
        prop_assert_eq!(reopened.header().unwrap(), header);
        prop_assert_eq!(reopened.footer().unwrap(), footer.clone());
        prop_assert_eq!(header.total_records, ids.len() as u64);
        prop_assert!(footer.offsets().windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(reopened.read_all::<Event>().unwrap(), before);
    }
}
