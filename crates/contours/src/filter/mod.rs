//! Logged filtering of chant tables.
//!
//! A filter decides which rows of a [`ChantTable`] to keep. The harness in
//! [`apply_filter`] builds the filtered table and reports what happened:
//!
//! ```text
//! Filter Chants By Genre:
//! Include only chants with a certain genre
//!  * include=[genre_a]
//!  > 58.10% removed (2905 out of 5000; 2095 remain)
//! ```
//!
//! Filters never add or change rows, and every filter is total: a row that
//! lacks the field a filter reads is excluded rather than treated as an
//! error.

mod chants;
mod sample;

pub use chants::{
    ByGenre, DuplicatedNotes, IncipitIsFullText, NotStartingWithGClef, WithFClef,
    WithMissingPitches, WithNonVolpianoChars, WithoutFullText, WithoutNotes, WithoutSimpleMode,
    WithoutVolpiano, WithoutWordBoundary,
};
pub use sample::StratifiedSample;

use std::fmt;

use tracing::info;

use crate::table::{ChantRecord, ChantTable};

/// A row selection over a chant table.
pub trait ChantFilter {
    /// Title used in the log header, e.g. `Filter Chants Without Volpiano`.
    fn name(&self) -> &str;

    /// One-line description of what the filter keeps or removes.
    fn description(&self) -> &str;

    /// Options that differ from their defaults, as `(key, value)` pairs.
    fn options(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Indices of the rows to keep, in output order.
    fn select(&self, table: &ChantTable) -> Vec<usize>;
}

/// Indices of the rows matching `keep`, in table order.
pub(crate) fn retain_where<F>(table: &ChantTable, mut keep: F) -> Vec<usize>
where
    F: FnMut(&ChantRecord) -> bool,
{
    table
        .iter()
        .enumerate()
        .filter(|(_, record)| keep(record))
        .map(|(i, _)| i)
        .collect()
}

/// What one filter did to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterReport {
    pub name: String,
    pub description: String,
    pub options: Vec<(String, String)>,
    pub before: usize,
    pub after: usize,
}

impl FilterReport {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }

    /// Share of rows removed, 0 for an empty input.
    pub fn removed_fraction(&self) -> f64 {
        if self.before == 0 {
            0.0
        } else {
            self.removed() as f64 / self.before as f64
        }
    }

    pub fn header(&self) -> String {
        format!("{}:", self.name)
    }

    pub fn option_lines(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|(key, value)| format!(" * {key}={value}"))
            .collect()
    }

    pub fn statistics(&self) -> String {
        format!(
            " > {:.2}% removed ({} out of {}; {} remain)",
            self.removed_fraction() * 100.0,
            self.removed(),
            self.before,
            self.after
        )
    }

    /// All log lines in emission order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.header(), self.description.clone()];
        lines.extend(self.option_lines());
        lines.push(self.statistics());
        lines
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// Destination for filter log lines.
pub trait FilterLogger {
    fn log(&mut self, line: &str);

    /// Whether lines are wanted at all.
    fn enabled(&self) -> bool {
        true
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl FilterLogger for NullLogger {
    fn log(&mut self, _line: &str) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Forwards lines to `tracing` at info level.
#[derive(Debug, Default, Clone)]
pub struct TracingLogger {
    prefix: Option<String>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every line, e.g. `"[antiphons] "`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        TracingLogger {
            prefix: Some(prefix.into()),
        }
    }
}

impl FilterLogger for TracingLogger {
    fn log(&mut self, line: &str) {
        match &self.prefix {
            Some(prefix) => info!("{prefix}{line}"),
            None => info!("{line}"),
        }
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    pub lines: Vec<String>,
}

impl FilterLogger for MemoryLogger {
    fn log(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Run a filter over a table and log the report.
pub fn apply_filter<F, L>(table: &ChantTable, filter: &F, logger: &mut L) -> (ChantTable, FilterReport)
where
    F: ChantFilter + ?Sized,
    L: FilterLogger + ?Sized,
{
    let filtered = table.select(&filter.select(table));
    let report = FilterReport {
        name: filter.name().to_string(),
        description: filter.description().to_string(),
        options: filter.options(),
        before: table.len(),
        after: filtered.len(),
    };

    if logger.enabled() {
        for line in report.lines() {
            logger.log(&line);
        }
    }

    (filtered, report)
}

/// An ordered chain of filters.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn ChantFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F: ChantFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn push(&mut self, filter: Box<dyn ChantFilter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply every filter in turn, each to the previous one's output.
    pub fn run<L>(&self, table: &ChantTable, logger: &mut L) -> (ChantTable, Vec<FilterReport>)
    where
        L: FilterLogger + ?Sized,
    {
        let mut current = table.clone();
        let mut reports = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            let (next, report) = apply_filter(&current, filter.as_ref(), logger);
            current = next;
            reports.push(report);
        }
        (current, reports)
    }
}

impl fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn table(volpianos: &[Option<&str>]) -> ChantTable {
        let records = volpianos
            .iter()
            .enumerate()
            .map(|(i, v)| ChantRecord {
                id: format!("c{i}"),
                volpiano: v.map(str::to_string),
                ..Default::default()
            })
            .collect();
        ChantTable::new(records).unwrap()
    }

    #[test]
    fn test_report_lines() {
        let report = FilterReport {
            name: "Filter Chants By Genre".into(),
            description: "Include only chants with a certain genre".into(),
            options: vec![("include".into(), "[genre_a]".into())],
            before: 5000,
            after: 2095,
        };
        assert_eq!(
            report.lines(),
            vec![
                "Filter Chants By Genre:",
                "Include only chants with a certain genre",
                " * include=[genre_a]",
                " > 58.10% removed (2905 out of 5000; 2095 remain)",
            ]
        );
    }

    #[test]
    fn test_empty_input_reports_zero() {
        let report = FilterReport {
            name: "x".into(),
            description: String::new(),
            options: Vec::new(),
            before: 0,
            after: 0,
        };
        assert_eq!(report.removed_fraction(), 0.0);
        assert_eq!(report.statistics(), " > 0.00% removed (0 out of 0; 0 remain)");
    }

    #[test]
    fn test_apply_filter_logs_in_order() {
        let t = table(&[Some("1---f"), None, Some("1---g")]);
        let mut logger = MemoryLogger::default();
        let (filtered, report) = apply_filter(&t, &WithoutVolpiano, &mut logger);

        assert_eq!(filtered.ids().collect::<Vec<_>>(), vec!["c0", "c2"]);
        assert_eq!(report.removed(), 1);
        assert_eq!(
            logger.lines,
            vec![
                "Filter Chants Without Volpiano:",
                "Exclude all chants with an empty volpiano field",
                " > 33.33% removed (1 out of 3; 2 remain)",
            ]
        );
    }

    #[test]
    fn test_null_logger_is_silent() {
        let t = table(&[Some("1---f")]);
        let (filtered, _) = apply_filter(&t, &WithoutVolpiano, &mut NullLogger);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_pipeline_chains_counts() {
        let t = table(&[Some("1---f"), None, Some("1---3"), Some("2---g")]);
        let pipeline = FilterPipeline::new()
            .with(WithoutVolpiano)
            .with(WithoutNotes)
            .with(WithFClef);

        let (filtered, reports) = pipeline.run(&t, &mut NullLogger);
        assert_eq!(filtered.ids().collect::<Vec<_>>(), vec!["c0"]);

        let counts: Vec<(usize, usize)> = reports.iter().map(|r| (r.before, r.after)).collect();
        assert_eq!(counts, vec![(4, 3), (3, 2), (2, 1)]);
    }

    /// Collects formatted events for inspection.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_logger_prefixes_lines() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .finish();

        let t = table(&[Some("1---f"), None]);
        tracing::subscriber::with_default(subscriber, || {
            apply_filter(&t, &WithoutVolpiano, &mut TracingLogger::with_prefix(" . "));
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().map(str::trim_start).collect();
        assert_eq!(
            lines,
            vec![
                ". Filter Chants Without Volpiano:",
                ". Exclude all chants with an empty volpiano field",
                ". > 50.00% removed (1 out of 2; 1 remain)",
            ]
        );
    }
}
