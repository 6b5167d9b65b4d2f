//! Column-oriented capture of optimizer trace events.
//!
//! A `tracing` subscriber turns every info-level event into a row of the
//! table named after the event's target (`pick`, `shortfall`, `repair`,
//! `restart`, `summary`). Columns appear the first time a field is seen;
//! rows that lack a field get the column's zero value.
//!
//! ```ignore
//! let (plan, recorder) = instrument::record(|| optimizer.optimize(&want, &config));
//! let picks = recorder.table("pick").unwrap();
//! assert_eq!(picks.len(), plan.allocation.fragments().count());
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

/// One field value of one event.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl TypedColumn {
    fn empty_like(value: &Value, rows: usize) -> Self {
        match value {
            Value::U64(_) => TypedColumn::U64(vec![0; rows]),
            Value::I64(_) => TypedColumn::I64(vec![0; rows]),
            Value::F64(_) => TypedColumn::F64(vec![0.0; rows]),
            Value::Bool(_) => TypedColumn::Bool(vec![false; rows]),
            Value::Str(_) => TypedColumn::Str(vec![String::new(); rows]),
        }
    }

    /// Append `value`, or the zero value if the types disagree.
    fn push(&mut self, value: Option<Value>) {
        match (self, value) {
            (TypedColumn::U64(v), Some(Value::U64(x))) => v.push(x),
            (TypedColumn::I64(v), Some(Value::I64(x))) => v.push(x),
            (TypedColumn::F64(v), Some(Value::F64(x))) => v.push(x),
            (TypedColumn::Bool(v), Some(Value::Bool(x))) => v.push(x),
            (TypedColumn::Str(v), Some(Value::Str(x))) => v.push(x),
            (TypedColumn::U64(v), _) => v.push(0),
            (TypedColumn::I64(v), _) => v.push(0),
            (TypedColumn::F64(v), _) => v.push(0.0),
            (TypedColumn::Bool(v), _) => v.push(false),
            (TypedColumn::Str(v), _) => v.push(String::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Bool(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rows of one event target. Every column always holds `len()` values.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    columns: BTreeMap<String, TypedColumn>,
    rows: usize,
}

impl EventTable {
    fn push_row(&mut self, mut row: Vec<(String, Value)>) {
        for (name, value) in &row {
            if !self.columns.contains_key(name) {
                self.columns
                    .insert(name.clone(), TypedColumn::empty_like(value, self.rows));
            }
        }
        for (name, column) in self.columns.iter_mut() {
            let value = row
                .iter()
                .position(|(field, _)| field == name)
                .map(|i| row.swap_remove(i).1);
            column.push(value);
        }
        self.rows += 1;
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn u64_column(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name)? {
            TypedColumn::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn f64_column(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            TypedColumn::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn bool_column(&self, name: &str) -> Option<&[bool]> {
        match self.columns.get(name)? {
            TypedColumn::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn str_column(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name)? {
            TypedColumn::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Tables keyed by event target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: BTreeMap<String, EventTable>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    /// Row count of a target, zero if it never fired.
    pub fn rows(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, EventTable::len)
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

#[derive(Default)]
struct RowVisitor {
    row: Vec<(String, Value)>,
}

impl RowVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        self.row.push((field.name().to_string(), value));
    }
}

impl Visit for RowVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::U64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::I64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::Str(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::Str(format!("{value:?}")));
    }
}

/// Subscriber that writes info-level events into the thread-local recorder.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = RowVisitor::default();
        event.record(&mut visitor);
        let target = event.metadata().target().to_string();

        RECORDER.with(|r| {
            r.borrow_mut()
                .tables
                .entry(target)
                .or_default()
                .push_row(visitor.row);
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install `TableSubscriber` as the global default. Later calls are ignored.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber);
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with a scoped `TableSubscriber` and return what it recorded.
pub fn record<T>(f: impl FnOnce() -> T) -> (T, Recorder) {
    clear();
    let out = tracing::subscriber::with_default(TableSubscriber, f);
    (out, drain())
}

// === Polars ===

use polars::prelude::*;

impl EventTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                TypedColumn::U64(v) => Column::new(name.into(), v),
                TypedColumn::I64(v) => Column::new(name.into(), v),
                TypedColumn::F64(v) => Column::new(name.into(), v),
                TypedColumn::Bool(v) => Column::new(name.into(), v),
                TypedColumn::Str(v) => Column::new(name.into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }
}

impl Recorder {
    pub fn to_dataframes(&self) -> PolarsResult<BTreeMap<String, DataFrame>> {
        self.tables
            .iter()
            .map(|(name, table)| Ok((name.clone(), table.to_dataframe()?)))
            .collect()
    }
}

fn io_error(error: std::io::Error) -> PolarsError {
    PolarsError::IO {
        error: error.into(),
        msg: None,
    }
}

/// Write each frame to `{dir}/{target}.parquet`.
pub fn save_parquet(dfs: &mut BTreeMap<String, DataFrame>, dir: &Path) -> PolarsResult<()> {
    std::fs::create_dir_all(dir).map_err(io_error)?;
    for (name, df) in dfs.iter_mut() {
        let file = std::fs::File::create(dir.join(format!("{name}.parquet"))).map_err(io_error)?;
        ParquetWriter::new(file).finish(df)?;
    }
    Ok(())
}

/// Records a batch of optimizer runs and writes them as parquet, plus a
/// `_ready` sentinel, on drop.
///
/// ```ignore
/// let mut run = instrument::RunRecorder::new("target/plans", "synth_seed_42");
/// let plan = optimizer.optimize(&want, &config);
/// assert!(run.recorder().rows("pick") > 0);
/// // drop writes target/plans/synth_seed_42/{pick,summary,...}.parquet and _ready
/// ```
pub struct RunRecorder {
    run_dir: PathBuf,
    recorder: Option<Recorder>,
}

impl RunRecorder {
    pub fn new(parent: impl Into<PathBuf>, name: &str) -> Self {
        let name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        clear();
        install_subscriber();
        Self {
            run_dir: parent.into().join(name),
            recorder: None,
        }
    }

    /// Drains on first call; later calls return the same data.
    pub fn recorder(&mut self) -> &Recorder {
        self.recorder.get_or_insert_with(drain)
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl Drop for RunRecorder {
    fn drop(&mut self) {
        let recorder = self.recorder.take().unwrap_or_else(drain);
        if recorder.tables.is_empty() {
            return;
        }
        let written = recorder
            .to_dataframes()
            .and_then(|mut dfs| save_parquet(&mut dfs, &self.run_dir));
        if let Err(e) = written {
            eprintln!("RunRecorder({}): failed to write parquet: {e}", self.run_dir.display());
            return;
        }
        // Readers wait for this before loading the tables.
        if let Err(e) = std::fs::File::create(self.run_dir.join("_ready")) {
            eprintln!("RunRecorder({}): failed to write _ready: {e}", self.run_dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_become_rows_by_target() {
        let ((), recorder) = record(|| {
            tracing::info!(target: "pick", item = "sol ring", selected_amount = 2u64, price_per_unit = 3.5);
            tracing::info!(target: "pick", item = "mox opal", selected_amount = 1u64, price_per_unit = 9.0);
            tracing::info!(target: "shortfall", item = "force of will", missing = 1u64);
        });

        assert_eq!(recorder.rows("pick"), 2);
        assert_eq!(recorder.rows("shortfall"), 1);
        assert_eq!(recorder.rows("repair"), 0);

        let picks = recorder.table("pick").unwrap();
        assert_eq!(picks.u64_column("selected_amount"), Some(&[2, 1][..]));
        assert_eq!(picks.f64_column("price_per_unit"), Some(&[3.5, 9.0][..]));
        assert_eq!(picks.str_column("item").unwrap()[1], "mox opal");
    }

    #[test]
    fn missing_fields_are_zero_filled() {
        let ((), recorder) = record(|| {
            tracing::info!(target: "summary", total = 10.0);
            tracing::info!(target: "summary", total = 12.0, sellers = 3u64, stage = "final");
            tracing::info!(target: "summary", stage = "initial");
        });

        let table = recorder.table("summary").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.f64_column("total"), Some(&[10.0, 12.0, 0.0][..]));
        assert_eq!(table.u64_column("sellers"), Some(&[0, 3, 0][..]));
        let stages = table.str_column("stage").unwrap();
        assert_eq!(stages, ["", "final", "initial"]);
        for name in table.column_names() {
            assert_eq!(table.column(name).unwrap().len(), 3, "{name} is aligned");
        }
    }

    #[test]
    fn debug_level_is_ignored() {
        let ((), recorder) = record(|| {
            tracing::debug!(target: "pick", item = "ignored");
        });
        assert!(recorder.tables.is_empty());
    }

    #[test]
    fn tables_convert_to_dataframes() {
        let ((), recorder) = record(|| {
            tracing::info!(target: "restart", round = 0u64, total = 14.0, best = true);
            tracing::info!(target: "restart", round = 1u64, total = 10.0, best = true);
        });
        let dfs = recorder.to_dataframes().unwrap();
        let df = &dfs["restart"];
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("instrument-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn save_parquet_writes_one_file_per_table() {
        let dir = scratch_dir("save");
        let ((), recorder) = record(|| {
            tracing::info!(target: "pick", item = "x", selected_amount = 1u64);
            tracing::info!(target: "shortfall", item = "y", missing = 2u64);
        });
        let mut dfs = recorder.to_dataframes().unwrap();
        save_parquet(&mut dfs, &dir).unwrap();

        assert!(dir.join("pick.parquet").is_file());
        assert!(dir.join("shortfall.parquet").is_file());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn run_recorder_writes_tables_and_ready_on_drop() {
        let parent = scratch_dir("run");
        let mut run = RunRecorder::new(parent.clone(), "seed 42/policy");
        tracing::subscriber::with_default(TableSubscriber, || {
            tracing::info!(target: "pick", item = "x", selected_amount = 1u64, price_per_unit = 6.0);
            tracing::info!(target: "summary", stage = "final", total = 6.0);
        });
        assert_eq!(run.recorder().rows("pick"), 1);

        let run_dir = run.run_dir().to_path_buf();
        assert_eq!(run_dir, parent.join("seed_42_policy"));
        drop(run);

        assert!(run_dir.join("pick.parquet").is_file());
        assert!(run_dir.join("summary.parquet").is_file());
        assert!(run_dir.join("_ready").is_file());
        std::fs::remove_dir_all(&parent).unwrap();
    }

    #[test]
    fn empty_run_writes_nothing() {
        let parent = scratch_dir("empty");
        let run = RunRecorder::new(parent.clone(), "idle");
        let run_dir = run.run_dir().to_path_buf();
        drop(run);
        assert!(!run_dir.exists());
    }
}
