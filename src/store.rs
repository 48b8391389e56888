use crate::util::json::set_nested;
use async_trait::async_trait;
use serde_json::{Map, Value};

mod error;
mod mem;
mod pg;

pub use error::StoreError;
pub use mem::MemoryStore;
pub use pg::{Db, PgStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// One record in a backing store, keyed by property name.
pub type Record = Map<String, Value>;

/// Which of the three backing stores a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Users,
    Threads,
    Global,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Users => "users",
            Scope::Threads => "threads",
            Scope::Global => "global",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the whole record, or an empty record when the id is unknown.
    async fn get_item(&self, id: &str) -> StoreResult<Record>;

    /// Merges `partial` into the record by top-level key. Keys not present in
    /// `partial` are left untouched.
    async fn set_item(&self, id: &str, partial: Record) -> StoreResult<()>;

    /// Returns a partial record that only contains the (dotted) `path`.
    async fn query_item(&self, id: &str, path: &str) -> StoreResult<Record> {
        let record = self.get_item(id).await?;
        Ok(pick_path(&record, path))
    }
}

/// Builds a partial record holding only the value at `path`, keeping the
/// record's nesting. Missing paths give an empty record.
pub fn pick_path(record: &Record, path: &str) -> Record {
    let keys: Vec<&str> = path.split('.').filter(|k| !k.is_empty()).collect();
    let Some((last, parents)) = keys.split_last() else {
        return Record::new();
    };

    let mut cur = record;
    for key in parents {
        match cur.get(*key) {
            Some(Value::Object(inner)) => cur = inner,
            _ => return Record::new(),
        }
    }
    let Some(found) = cur.get(*last) else {
        return Record::new();
    };

    let mut out = Map::new();
    out.insert(last.to_string(), found.clone());
    for key in parents.iter().rev() {
        let mut wrap = Map::new();
        wrap.insert(key.to_string(), Value::Object(out));
        out = wrap;
    }
    out
}

/// Writes `value` at the nested `keys` of record `id`. Only the top-level key is replaced,
/// so sibling keys of the record are kept; deeper siblings (and array elements) are carried
/// over by a read first.
pub async fn write_path(store: &dyn Store, id: &str, keys: &[String], value: Value) -> StoreResult<()> {
    let Some((first, rest)) = keys.split_first() else {
        return Ok(());
    };

    let top = if rest.is_empty() {
        value
    } else {
        let mut current = store.query_item(id, first).await?;
        let mut top = current.remove(first.as_str()).unwrap_or(Value::Null);
        set_nested(&mut top, rest, value);
        top
    };

    let mut partial = Record::new();
    partial.insert(first.clone(), top);
    store.set_item(id, partial).await
}
