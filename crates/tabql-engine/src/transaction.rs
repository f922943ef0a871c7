//! Commit/rollback over the pending-write log. Classifies
//! `Results` by path, encodes each dirty view as CSV and hands the
//! bytes to the file layer; failure semantics are best-effort
//! durability with no partial-commit rollback.

use ahash::AHashMap;
use tabql_core::{AppError, CodePosition, Format, JsonEscape, MutationResult, ResultType};

use crate::operators::FileLayer;
use crate::session::Session;

/// One path's worth of classified commit work.
struct Classified {
    creates: AHashMap<String, MutationResult>,
    updates: AHashMap<String, MutationResult>,
}

/// Partitions `results` into `creates` (any `CREATE_TABLE` on that path)
/// and `updates` (any other non-zero mutation); a path with both keeps
/// only the `CREATE_TABLE` entry.
fn classify(results: Vec<MutationResult>) -> Classified {
    let mut creates: AHashMap<String, MutationResult> = AHashMap::default();
    let mut updates: AHashMap<String, MutationResult> = AHashMap::default();

    for result in results {
        if result.file_info.is_temporary {
            continue;
        }
        let path = result.file_info.canonical_path();
        if result.result_type == ResultType::CreateTable {
            creates.insert(path, result);
            continue;
        }
        if result.operated_count == 0 {
            continue;
        }
        match creates.get(&path) {
            Some(existing) if existing.result_type.precedence() >= result.result_type.precedence() => {}
            _ => {
                updates.insert(path, result);
            }
        }
    }
    for path in creates.keys() {
        updates.remove(path);
    }
    Classified { creates, updates }
}

/// Forces a CSV [`tabql_core::FileInfo`] for writing, preserving the
/// caller's encoding/line-break/header choices but always encoding as
/// CSV.
fn csv_file_info(source: &tabql_core::FileInfo) -> tabql_core::FileInfo {
    tabql_core::FileInfo {
        path: source.path.clone(),
        format: Format::Csv,
        delimiter: ',',
        delimiter_positions: None,
        encoding: source.encoding,
        line_break: source.line_break,
        no_header: source.no_header,
        enclose_all: false,
        json_escape: JsonEscape::Backslash,
        pretty_print: false,
        is_temporary: false,
    }
}

pub struct TransactionManager;

impl TransactionManager {
    /// Runs the full commit algorithm. `pos` is
    /// the source position of the `COMMIT` statement, if any; its
    /// absence is what distinguishes an explicit `COMMIT` failure
    /// (`AutoCommitError`, carries `pos`) from one implied by script
    /// exit (`WriteFileError`, carries the path instead).
    pub fn commit(
        session: &mut Session,
        file_layer: &mut dyn FileLayer,
        pos: Option<CodePosition>,
    ) -> Result<(), AppError> {
        let results = session.take_results();
        if results.is_empty() {
            log::debug!("commit: nothing pending");
            session.cache.clear();
            return Ok(());
        }
        let classified = classify(results);
        log::debug!(
            "commit: {} file(s) to create, {} to update",
            classified.creates.len(),
            classified.updates.len()
        );

        for (path, result) in &classified.creates {
            let view = session
                .cache
                .get(path)
                .ok_or_else(|| write_error(path, "view missing from cache at commit", pos))?;
            let info = csv_file_info(&result.file_info);
            let bytes = tabql_encode::encode(view, &info, false)?;
            file_layer
                .create_file(path, &bytes)
                .map_err(|e| commit_io_error(path, &e, pos))?;
            log::info!("created {path}");
        }

        for (path, result) in &classified.updates {
            let view = session
                .cache
                .get(path)
                .ok_or_else(|| write_error(path, "view missing from cache at commit", pos))?;
            let info = csv_file_info(&result.file_info);
            let bytes = tabql_encode::encode(view, &info, false)?;
            file_layer
                .update_file(path, &bytes)
                .map_err(|e| commit_io_error(path, &e, pos))?;
            log::info!("updated {path}");
        }

        session.cache.clear();
        Ok(())
    }

    /// Discards pending work without touching disk; logs `Rolled back.`
    /// through the session's writer.
    pub fn rollback(session: &mut Session) {
        session.take_results();
        session.cache.clear();
        session.print("Rolled back.");
        log::debug!("rollback complete");
    }
}

fn write_error(path: &str, message: &str, pos: Option<CodePosition>) -> AppError {
    if pos.is_some() {
        AppError::AutoCommitError { message: format!("{message}: {path}"), pos }
    } else {
        AppError::WriteFileError { path: path.to_string(), message: message.to_string() }
    }
}

fn commit_io_error(path: &str, err: &std::io::Error, pos: Option<CodePosition>) -> AppError {
    if pos.is_some() {
        AppError::AutoCommitError { message: err.to_string(), pos }
    } else {
        AppError::WriteFileError { path: path.to_string(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabql_core::{FileInfo, Flags, Header, HeaderField, ResultType, Value, View};

    struct FakeFileLayer {
        created: Vec<(String, Vec<u8>)>,
        updated: Vec<(String, Vec<u8>)>,
    }

    impl FileLayer for FakeFileLayer {
        fn create_file(&mut self, path: &str, bytes: &[u8]) -> std::io::Result<()> {
            self.created.push((path.to_string(), bytes.to_vec()));
            Ok(())
        }

        fn update_file(&mut self, path: &str, bytes: &[u8]) -> std::io::Result<()> {
            self.updated.push((path.to_string(), bytes.to_vec()));
            Ok(())
        }
    }

    fn sample_view() -> View {
        let header = Header(vec![HeaderField::new(None, "a"), HeaderField::new(None, "b")]);
        View::new(header, vec![vec![Value::Integer(1), Value::Integer(2)]], None)
    }

    /// A non-temporary `FileInfo`: `FileInfo::temporary` always sets
    /// `is_temporary: true`, which `classify()` skips, so committed
    /// writes need a `FileInfo` built by hand instead.
    fn persisted_file_info(path: &str) -> FileInfo {
        let mut info = FileInfo::temporary(path);
        info.is_temporary = false;
        info
    }

    #[test]
    fn commit_with_empty_log_is_a_noop() {
        let mut session = Session::new(Flags::default(), Box::new(crate::session::BufferWriter::default()));
        session.cache.set("t.csv", sample_view());
        let mut layer = FakeFileLayer { created: vec![], updated: vec![] };
        TransactionManager::commit(&mut session, &mut layer, None).unwrap();
        // Empty-log commit still clears the cache.
        assert!(!session.cache.exists("t.csv"));
        assert!(layer.created.is_empty());
        assert!(layer.updated.is_empty());
    }

    #[test]
    fn create_table_then_insert_persists_a_single_create() {
        let mut session = Session::new(Flags::default(), Box::new(crate::session::BufferWriter::default()));
        session.cache.set("t.csv", sample_view());
        session.log_result(MutationResult {
            result_type: ResultType::CreateTable,
            file_info: persisted_file_info("t.csv"),
            operated_count: 0,
        });
        session.log_result(MutationResult {
            result_type: ResultType::Insert,
            file_info: persisted_file_info("t.csv"),
            operated_count: 1,
        });
        let mut layer = FakeFileLayer { created: vec![], updated: vec![] };
        TransactionManager::commit(&mut session, &mut layer, None).unwrap();
        assert_eq!(layer.created.len(), 1);
        assert!(layer.updated.is_empty());
        let (path, bytes) = &layer.created[0];
        assert_eq!(path, "t.csv");
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "a,b\n1,2");
    }

    #[test]
    fn rollback_clears_results_and_cache() {
        let mut session = Session::new(Flags::default(), Box::new(crate::session::BufferWriter::default()));
        session.cache.set("t.csv", sample_view());
        session.log_result(MutationResult {
            result_type: ResultType::Update,
            file_info: FileInfo::temporary("t.csv"),
            operated_count: 1,
        });
        TransactionManager::rollback(&mut session);
        assert!(session.results.is_empty());
        assert!(!session.cache.exists("t.csv"));
    }
}
