use std::{
    collections::HashSet,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::log::log_sink::LogSink;
use crate::protocol::ClientId;
use crate::store::hex::{from_hex, to_hex};
use crate::store::{ClientIdentity, IdSource, IdentityStore, StoreError, TimeOrderedIdSource};
use crate::{sink_debug, sink_error, sink_info, sink_warn};

pub const CLIENTS_TABLE: &str = "clients.tbl";
pub const FILES_TABLE: &str = "files.tbl";

const CLIENTS_SCHEMA: &str = "# clients: id|name|public_key|last_seen|aes_key";
const FILES_SCHEMA: &str = "# files: id|file_name|path_name|verified";
const NULL_FIELD: &str = "-";

/// Identity store backed by flat table files in one directory.
///
/// `clients.tbl` holds one row per identity:
/// `id|hex(name)|hex(public_key)|last_seen|hex(aes_key)`, `-` for NULL.
/// `files.tbl` is created for completeness and never written after that.
///
/// Every commit rewrites `clients.tbl` through a temp file and a rename.
pub struct FileIdentityStore {
    dir: PathBuf,
    records: Vec<ClientIdentity>,
    names: HashSet<String>,
    ids: HashSet<ClientId>,
    id_source: Box<dyn IdSource>,
    log: Arc<dyn LogSink>,
}

impl FileIdentityStore {
    /// Opens (or initializes) the store in `dir`.
    ///
    /// Schema problems are logged and do not fail the open; only an existing
    /// clients table that cannot be read does.
    pub fn open(dir: impl AsRef<Path>, log: Arc<dyn LogSink>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        ensure_schema(&dir, log.as_ref());

        let mut store = Self {
            dir,
            records: Vec::new(),
            names: HashSet::new(),
            ids: HashSet::new(),
            id_source: Box::new(TimeOrderedIdSource),
            log,
        };
        store.load()?;
        sink_info!(
            store.log,
            "identity store at {:?}: {} client(s) loaded",
            store.dir,
            store.records.len()
        );
        Ok(store)
    }

    /// Builder-style override of the identifier source.
    pub fn with_id_source(mut self, source: impl IdSource + 'static) -> Self {
        self.id_source = Box::new(source);
        self
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ClientIdentity> {
        self.records.iter().find(|r| r.name == name)
    }

    fn clients_path(&self) -> PathBuf {
        self.dir.join(CLIENTS_TABLE)
    }

    fn load(&mut self) -> io::Result<()> {
        let path = self.clients_path();
        if !path.exists() {
            return Ok(());
        }
        let contents = fs::read_to_string(&path)?;

        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let record = match parse_row(line) {
                Ok(r) => r,
                Err(reason) => {
                    sink_warn!(
                        self.log,
                        "ignoring malformed line {} in {:?}: {}",
                        line_no + 1,
                        path,
                        reason
                    );
                    continue;
                }
            };
            if self.ids.contains(&record.id) || self.names.contains(&record.name) {
                sink_warn!(
                    self.log,
                    "ignoring duplicate client on line {} in {:?}: {}",
                    line_no + 1,
                    path,
                    record.id
                );
                continue;
            }
            self.index(&record);
            self.records.push(record);
        }
        Ok(())
    }

    fn index(&mut self, record: &ClientIdentity) {
        self.ids.insert(record.id);
        self.names.insert(record.name.clone());
    }

    fn persist(&self) -> io::Result<()> {
        let mut buf = String::new();
        buf.push_str(CLIENTS_SCHEMA);
        buf.push('\n');
        for record in &self.records {
            buf.push_str(&format_row(record));
            buf.push('\n');
        }

        // Write to temp file then atomically rename.
        let path = self.clients_path();
        let tmp = path.with_extension("tmp");
        let written = write_synced(&tmp, buf.as_bytes()).and_then(|()| fs::rename(&tmp, &path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut f = fs::File::create(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}

impl IdentityStore for FileIdentityStore {
    fn has_name(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.names.contains(name))
    }

    fn has_identifier(&self, id: &ClientId) -> Result<bool, StoreError> {
        Ok(self.ids.contains(id))
    }

    fn next_candidate(&mut self) -> ClientId {
        self.id_source.next_id()
    }

    fn insert(&mut self, identity: ClientIdentity) -> Result<(), StoreError> {
        if self.ids.contains(&identity.id) {
            return Err(StoreError::DuplicateIdentifier(identity.id));
        }
        if self.names.contains(&identity.name) {
            return Err(StoreError::DuplicateName(identity.name));
        }

        let id = identity.id;
        let name = identity.name.clone();
        self.index(&identity);
        self.records.push(identity);

        // Persist to disk; if it fails, roll back.
        if let Err(e) = self.persist() {
            self.records.pop();
            self.ids.remove(&id);
            self.names.remove(&name);
            sink_error!(self.log, "failed to persist client {}: {}", id, e);
            return Err(StoreError::Io(e));
        }
        sink_debug!(self.log, "stored client {} ({:?})", id, name);
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Creates the store directory and both table files if missing.
/// Failures are logged only.
fn ensure_schema(dir: &Path, log: &dyn LogSink) {
    if let Err(e) = fs::create_dir_all(dir) {
        sink_error!(log, "cannot create store directory {:?}: {}", dir, e);
        return;
    }
    for (table, schema) in [(CLIENTS_TABLE, CLIENTS_SCHEMA), (FILES_TABLE, FILES_SCHEMA)] {
        let path = dir.join(table);
        let created = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "{schema}"));
        match created {
            Ok(()) => sink_debug!(log, "created table {:?}", path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                check_existing_schema(&path, schema, log);
            }
            Err(e) => sink_error!(log, "cannot create table {:?}: {}", path, e),
        }
    }
}

fn check_existing_schema(path: &Path, schema: &str, log: &dyn LogSink) {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let first = contents.lines().next().unwrap_or_default().trim();
            if first != schema {
                sink_warn!(
                    log,
                    "table {:?} has header {:?}, expected {:?}; using it as is",
                    path,
                    first,
                    schema
                );
            }
        }
        Err(e) => sink_warn!(log, "cannot inspect table {:?}: {}", path, e),
    }
}

fn format_row(record: &ClientIdentity) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        record.id.to_text(),
        to_hex(record.name.as_bytes()),
        nullable_hex(record.public_key.as_deref()),
        record.last_seen,
        nullable_hex(record.aes_key.as_deref()),
    )
}

fn parse_row(line: &str) -> Result<ClientIdentity, String> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() != 5 {
        return Err(format!("expected 5 fields, found {}", parts.len()));
    }
    let id = ClientId::parse_text(parts[0]).map_err(|e| e.to_string())?;
    let name_bytes = from_hex(parts[1]).ok_or("bad name hex")?;
    let name = String::from_utf8(name_bytes).map_err(|_| "name is not UTF-8")?;
    let public_key = parse_nullable_hex(parts[2]).ok_or("bad public_key hex")?;
    let aes_key = parse_nullable_hex(parts[4]).ok_or("bad aes_key hex")?;
    Ok(ClientIdentity {
        id,
        name,
        public_key,
        last_seen: parts[3].to_owned(),
        aes_key,
    })
}

fn nullable_hex(bytes: Option<&[u8]>) -> String {
    bytes.map_or_else(|| NULL_FIELD.to_owned(), to_hex)
}

fn parse_nullable_hex(field: &str) -> Option<Option<Vec<u8>>> {
    if field == NULL_FIELD {
        Some(None)
    } else {
        from_hex(field).map(Some)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::{CaptureLogSink, NoopLogSink};
    use crate::log::log_level::LogLevel;
    use crate::store::{MAX_ID_ATTEMPTS, ScriptedIdSource};
    use rand::RngCore;

    fn unique_temp_dir() -> PathBuf {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        let suffix = u64::from_le_bytes(bytes);
        std::env::temp_dir().join(format!("file_identity_store_test_{suffix}"))
    }

    fn id(n: u8) -> ClientId {
        ClientId::time_ordered(u64::from(n), &[n; 10])
    }

    #[test]
    fn open_creates_both_tables_with_headers() {
        let dir = unique_temp_dir();
        let store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).expect("open store");
        assert!(store.is_empty());

        let clients = fs::read_to_string(dir.join(CLIENTS_TABLE)).unwrap();
        let files = fs::read_to_string(dir.join(FILES_TABLE)).unwrap();
        assert_eq!(clients.lines().next(), Some(CLIENTS_SCHEMA));
        assert_eq!(files.lines().next(), Some(FILES_SCHEMA));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reopening_is_idempotent_and_keeps_records() {
        let dir = unique_temp_dir();
        let alice = ClientIdentity::new(id(1), "alice", "2024-02-29 12:34:56");
        {
            let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
            store.insert(alice.clone()).unwrap();
        }
        {
            let store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
            assert_eq!(store.len(), 1);
            assert_eq!(store.get_by_name("alice"), Some(&alice));
            assert!(store.has_identifier(&id(1)).unwrap());
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn duplicates_are_rejected_without_writing() {
        let dir = unique_temp_dir();
        let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
        store
            .insert(ClientIdentity::new(id(1), "bob", "2024-01-01 00:00:00"))
            .unwrap();
        let before = fs::read_to_string(dir.join(CLIENTS_TABLE)).unwrap();

        match store.insert(ClientIdentity::new(id(2), "bob", "2024-01-01 00:00:01")) {
            Err(StoreError::DuplicateName(name)) => assert_eq!(name, "bob"),
            other => panic!("expected DuplicateName, got {other:?}"),
        }
        match store.insert(ClientIdentity::new(id(1), "carol", "2024-01-01 00:00:02")) {
            Err(StoreError::DuplicateIdentifier(dup)) => assert_eq!(dup, id(1)),
            other => panic!("expected DuplicateIdentifier, got {other:?}"),
        }

        assert_eq!(store.len(), 1);
        assert_eq!(fs::read_to_string(dir.join(CLIENTS_TABLE)).unwrap(), before);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn names_with_separators_stay_data() {
        let dir = unique_temp_dir();
        let tricky = "x|y\n' OR 1=1 --";
        {
            let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
            store
                .insert(ClientIdentity::new(id(7), tricky, "2024-01-01 00:00:00"))
                .unwrap();
        }
        let store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
        assert!(store.has_name(tricky).unwrap());
        assert!(!store.has_name("x").unwrap());
        assert_eq!(store.len(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn colliding_candidates_are_skipped() {
        let dir = unique_temp_dir();
        let taken = id(1);
        let free = id(2);
        let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink))
            .unwrap()
            .with_id_source(ScriptedIdSource::new([taken, taken, free]));
        store
            .insert(ClientIdentity::new(taken, "dave", "2024-01-01 00:00:00"))
            .unwrap();

        assert_eq!(store.generate_unique_identifier().unwrap(), free);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn generated_identifiers_never_repeat() {
        let dir = unique_temp_dir();
        let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
        for n in 0..50 {
            let fresh = store.generate_unique_identifier().unwrap();
            assert!(!store.has_identifier(&fresh).unwrap());
            store
                .insert(ClientIdentity::registered_now(fresh, format!("user{n}")))
                .unwrap();
        }
        assert_eq!(store.len(), 50);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn exhausted_identifier_space_is_reported() {
        let dir = unique_temp_dir();
        let taken = id(3);
        let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink))
            .unwrap()
            .with_id_source(ScriptedIdSource::new(vec![taken; MAX_ID_ATTEMPTS]));
        store
            .insert(ClientIdentity::new(taken, "erin", "2024-01-01 00:00:00"))
            .unwrap();

        match store.generate_unique_identifier() {
            Err(StoreError::IdentifierExhausted { attempts }) => {
                assert_eq!(attempts, MAX_ID_ATTEMPTS);
            }
            other => panic!("expected IdentifierExhausted, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_rows_are_skipped_and_logged() {
        let dir = unique_temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let good = format_row(&ClientIdentity::new(id(4), "frank", "2024-01-01 00:00:00"));
        fs::write(
            dir.join(CLIENTS_TABLE),
            format!("{CLIENTS_SCHEMA}\nnot|enough\n{good}\nzz|zz|-|t|-\n"),
        )
        .unwrap();

        let log = Arc::new(CaptureLogSink::new());
        let store = FileIdentityStore::open(&dir, log.clone()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.has_name("frank").unwrap());
        assert!(log.contains(LogLevel::Warn, "line 2"));
        assert!(log.contains(LogLevel::Warn, "line 4"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_commit_rolls_back() {
        let dir = unique_temp_dir();
        let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
        // Removing the directory makes the temp-file write fail.
        fs::remove_dir_all(&dir).unwrap();

        match store.insert(ClientIdentity::new(id(5), "gina", "2024-01-01 00:00:00")) {
            Err(StoreError::Io(_)) => {}
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(store.is_empty());
        assert!(!store.has_name("gina").unwrap());
        assert!(!store.has_identifier(&id(5)).unwrap());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = unique_temp_dir();
        let mut store = FileIdentityStore::open(&dir, Arc::new(NoopLogSink)).unwrap();
        // A non-empty directory where the table was makes the rename fail.
        let table = dir.join(CLIENTS_TABLE);
        fs::remove_file(&table).unwrap();
        fs::create_dir(&table).unwrap();
        fs::write(table.join("keep"), b"x").unwrap();

        match store.insert(ClientIdentity::new(id(6), "hank", "2024-01-01 00:00:00")) {
            Err(StoreError::Io(_)) => {}
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(!table.with_extension("tmp").exists());
        assert!(store.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unusable_directory_is_logged_not_fatal() {
        let blocker = unique_temp_dir();
        fs::write(&blocker, b"plain file").unwrap();
        let dir = blocker.join("store");

        let log = Arc::new(CaptureLogSink::new());
        let store = FileIdentityStore::open(&dir, log.clone()).expect("open still succeeds");
        assert!(store.is_empty());
        assert!(log.contains(LogLevel::Error, "cannot create store directory"));
        let _ = fs::remove_file(&blocker);
    }
}
