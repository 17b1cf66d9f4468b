//! Scan orchestration
//!
//! One scan run reads every `.ses` sheet in a directory, validates it, writes
//! the per-record tables, and finally folds the collected sessions into the
//! aggregate tables.
//!
//! ```text
//! discover ──► dated sheets (sorted) ──► split ──► validators ──► record tables
//!    │                                                   │
//!    │                                                   ▼
//!    │                                         SessionMap / indexes
//!    │                                                   │
//!    └──► TODO sheets ──► charters-todo.txt              ▼
//!                                      overlap check ──► aggregate tables
//! ```
//!
//! All output for one run lives in a [`ScanContext`]: the diagnostics sink,
//! the open record tables, and the accumulated session data. Validators never
//! see it; they return their findings and the context routes them.

use crate::analytics::{
    write_breakdowns, write_coverage_tables, write_day_totals, write_tester_tables, OverlapCheck,
    SessionIndex, SessionMap, TimelineEntry,
};
use crate::config::{AllowLists, Config};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::Result;
use crate::metrics;
use crate::outputs::{self, EMPTY_FIELD};
use crate::sheet::{read_sheet, SessionSheet};
use crate::todo::{write_todo_table, TodoEntry, TODO_NAME_MESSAGE};
use crate::tsv::TsvWriter;
use crate::types::{
    is_session_file_name, ItemEntry, ParsedCharter, SectionContent, SectionKind, SessionBreakdown,
    SessionKind, SessionRecord,
};
use crate::validate::{
    record_count, BreakdownValidator, CharterValidator, DataFilesValidator, ItemsValidator,
    SectionValidator, SheetContext, StartValidator, TestNotesValidator, TesterValidator,
};
use chrono::NaiveDateTime;
use glob::MatchOptions;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Printed instead of a scan when the directory has no sheets.
pub const NOTHING_TO_SCAN_MESSAGE: &str = "Nothing to scan.";

/// Message for a dated sheet with a malformed name.
pub const SESSION_NAME_MESSAGE: &str = "Unexpected session file name. If it's a session sheet, \
     its name must be: \"ET-<tester initials>-<yymmdd>-<A, B, C, etc.>.SES\". If it's a TODO \
     sheet, its name must be: \"ET-TODO-<priority number>-<title>.SES\"";

/// A sheet found in the scan directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFile {
    /// Path as found on disk
    pub path: PathBuf,
    /// Lower-cased file name
    pub name: String,
    pub kind: SessionKind,
}

impl SheetFile {
    fn new(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        let kind = SessionKind::of(&name);
        Some(Self { path, name, kind })
    }

    /// How diagnostics refer to the sheet: its directory plus lower-cased name.
    pub fn label(&self) -> String {
        match self.path.parent() {
            Some(dir) => dir.join(&self.name).display().to_string(),
            None => self.name.clone(),
        }
    }
}

/// Find every `*.ses` sheet (any case) directly inside `scan_dir`, sorted by
/// lower-cased name.
pub fn discover_sheets(scan_dir: &Path) -> Result<Vec<SheetFile>> {
    let pattern = Path::new(&glob::Pattern::escape(&scan_dir.to_string_lossy())).join("*.ses");
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut sheets: Vec<SheetFile> = glob::glob_with(&pattern.to_string_lossy(), options)?
        .flatten()
        .filter(|path| path.is_file())
        .filter_map(SheetFile::new)
        .collect();
    sheets.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::info!(dir = %scan_dir.display(), count = sheets.len(), "Discovered session sheets");
    Ok(sheets)
}

/// Summary of one scan run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Dated sheets found in the directory
    pub sheets_found: usize,
    /// TODO sheets found in the directory
    pub todo_sheets: usize,
    /// Dated sheets skipped for a bad name or for having no sections
    pub sheets_skipped: usize,
    /// Sessions with a valid START timestamp, the ones aggregated
    pub sessions_recorded: usize,
    pub errors_found: bool,
    /// Nothing was scanned and no file was written
    pub nothing_to_scan: bool,
}

impl ScanReport {
    /// Pretty-printed JSON, as printed by `sbtm-scan --format json`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The per-record tables, open for the length of the dated-sheet pass.
struct RecordTables {
    charters: TsvWriter,
    builds: Option<TsvWriter>,
    testers: TsvWriter,
    data: Option<TsvWriter>,
    notes: TsvWriter,
    bugs: TsvWriter,
    issues: TsvWriter,
}

impl RecordTables {
    fn create(dir: &Path, config: &Config) -> Result<Self> {
        let options = &config.scan_options;
        let open = |name: &str, header: &[&str]| TsvWriter::create(&dir.join(name), header);
        Ok(Self {
            charters: open(outputs::CHARTERS, outputs::CHARTERS_HEADER)?,
            builds: options
                .build
                .then(|| open(outputs::BUILDS, outputs::BUILDS_HEADER))
                .transpose()?,
            testers: open(outputs::TESTERS, outputs::TESTERS_HEADER)?,
            data: options
                .data_files
                .then(|| open(outputs::DATA, outputs::DATA_HEADER))
                .transpose()?,
            notes: open(outputs::TEST_NOTES, outputs::TEST_NOTES_HEADER)?,
            bugs: open(outputs::BUGS, outputs::BUGS_HEADER)?,
            issues: open(outputs::ISSUES, outputs::ISSUES_HEADER)?,
        })
    }

    fn finish(self) -> Result<()> {
        self.charters.finish()?;
        if let Some(builds) = self.builds {
            builds.finish()?;
        }
        self.testers.finish()?;
        if let Some(data) = self.data {
            data.finish()?;
        }
        self.notes.finish()?;
        self.bugs.finish()?;
        self.issues.finish()
    }
}

/// State threaded through one scan run.
pub struct ScanContext<'a> {
    pub config: &'a Config,
    pub allow_lists: AllowLists,
    pub sink: &'a mut DiagnosticSink,
    tables: RecordTables,
    sessions: SessionMap,
    testers: SessionIndex,
    areas: SessionIndex,
    overlap: OverlapCheck,
    report: ScanReport,
}

impl<'a> ScanContext<'a> {
    /// Open the record tables in the metrics directory.
    pub fn new(config: &'a Config, allow_lists: AllowLists, sink: &'a mut DiagnosticSink) -> Result<Self> {
        let tables = RecordTables::create(&config.folders.metrics_dir, config)?;
        Ok(Self {
            config,
            allow_lists,
            sink,
            tables,
            sessions: SessionMap::new(),
            testers: SessionIndex::new(),
            areas: SessionIndex::new(),
            overlap: OverlapCheck::new(config.timebox.allowable_session_overlap),
            report: ScanReport::default(),
        })
    }

    /// Sessions recorded so far.
    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    fn sheet_context<'c>(&'c self, sheet: &'c SheetFile) -> SheetContext<'c> {
        SheetContext {
            file_name: &sheet.name,
            kind: sheet.kind,
            options: &self.config.scan_options,
            timebox: &self.config.timebox,
            allow_lists: &self.allow_lists,
            data_dir: &self.config.folders.data_dir,
        }
    }

    /// Run a validator over a section and report its diagnostics.
    fn check<V: SectionValidator>(
        &mut self,
        validator: V,
        sheet: &SessionSheet,
        file: &SheetFile,
    ) -> Result<V::Output> {
        let checked = validator.validate(sheet.lines(validator.section()), &self.sheet_context(file));
        self.sink.report_all(&file.label(), checked.diagnostics)?;
        Ok(checked.value)
    }

    /// Split a sheet and report the splitter's findings.
    fn split(&mut self, file: &SheetFile) -> Result<SessionSheet> {
        let checked = read_sheet(&file.path, &self.config.scan_options)?;
        self.sink.report_all(&file.label(), checked.diagnostics)?;
        Ok(checked.value)
    }

    /// Scan one dated session sheet.
    pub fn scan_session(&mut self, file: &SheetFile) -> Result<()> {
        let label = file.label();
        if !is_session_file_name(&file.name) {
            self.sink.report(&label, Diagnostic::error(SESSION_NAME_MESSAGE))?;
            self.report.sheets_skipped += 1;
            return Ok(());
        }

        let sheet = self.split(file)?;
        if !sheet.has_content() {
            tracing::debug!(file = %label, "Sheet has no sections, skipping");
            self.report.sheets_skipped += 1;
            return Ok(());
        }

        let options = self.config.scan_options;
        let name = file.name.as_str();

        if sheet.has(SectionKind::Charter) {
            let charter = self.check(CharterValidator, &sheet, file)?;
            self.write_charter(name, &charter)?;
        }

        let started_at: Option<NaiveDateTime> = if sheet.has(SectionKind::Start) {
            self.check(StartValidator, &sheet, file)?
        } else {
            None
        };

        let testers = if sheet.has(SectionKind::Tester) {
            self.check(TesterValidator, &sheet, file)?
        } else {
            Vec::new()
        };
        for tester in &testers {
            self.tables.testers.write_row([name, tester.as_str()])?;
            self.testers
                .entry(tester.clone())
                .or_default()
                .push(name.to_string());
        }

        let breakdown = if options.task() && sheet.has(SectionKind::TaskBreakdown) {
            let values = self.check(BreakdownValidator, &sheet, file)?;
            metrics::derive(values, testers.len(), &options, &self.config.timebox)
        } else {
            SessionBreakdown::zero()
        };

        if options.data_files && sheet.has(SectionKind::DataFiles) {
            let files = self.check(DataFilesValidator, &sheet, file)?;
            if let Some(table) = self.tables.data.as_mut() {
                match files {
                    SectionContent::NotApplicable => table.write_row([name, EMPTY_FIELD])?,
                    SectionContent::Present(files) => {
                        for data_file in files {
                            table.write_row([name, data_file.as_str()])?;
                        }
                    }
                    SectionContent::Invalid => {}
                }
            }
        }

        if sheet.has(SectionKind::TestNotes) {
            match self.check(TestNotesValidator, &sheet, file)? {
                SectionContent::NotApplicable => self.tables.notes.write_row([name, EMPTY_FIELD])?,
                SectionContent::Present(notes) => {
                    self.tables.notes.write_row([name, notes.join("\n").as_str()])?
                }
                SectionContent::Invalid => {}
            }
        }

        let mut bugs = 0;
        if sheet.has(SectionKind::Bugs) {
            let content = self.check(ItemsValidator::bugs(), &sheet, file)?;
            bugs = record_count(&content);
            write_items(&mut self.tables.bugs, name, content)?;
        }

        let mut issues = 0;
        if sheet.has(SectionKind::Issues) {
            let content = self.check(ItemsValidator::issues(), &sheet, file)?;
            issues = record_count(&content);
            write_items(&mut self.tables.issues, name, content)?;
        }

        let Some(started_at) = started_at else {
            tracing::debug!(file = %label, "No valid START timestamp, not aggregated");
            return Ok(());
        };

        if options.duration {
            let minutes = breakdown.duration * self.config.timebox.normal;
            if minutes != 0.0 {
                for tester in &testers {
                    self.overlap.record(
                        tester,
                        TimelineEntry {
                            session: name.to_uppercase(),
                            started_at,
                            duration_minutes: minutes,
                        },
                    );
                }
            }
        }

        self.sessions.insert(
            name.to_string(),
            SessionRecord {
                file_name: name.to_string(),
                started_at,
                breakdown,
                bugs,
                issues,
                tester_count: testers.len(),
            },
        );
        Ok(())
    }

    fn write_charter(&mut self, name: &str, charter: &ParsedCharter) -> Result<()> {
        let table = &mut self.tables.charters;
        if !charter.description.is_empty() {
            table.write_row([name, "DESCRIPTION", charter.description.join("\n").as_str()])?;
        }
        for area in &charter.lttd_areas {
            table.write_row([name, "LTTD AREA", area.as_str()])?;
        }
        for area in &charter.areas {
            table.write_row([name, "AREA", area.as_str()])?;
            self.areas
                .entry(area.clone())
                .or_default()
                .push(name.to_string());
        }
        for build in &charter.builds {
            table.write_row([name, "BUILD", build.as_str()])?;
            if let Some(builds) = self.tables.builds.as_mut() {
                builds.write_row([name, build.as_str()])?;
            }
        }
        Ok(())
    }

    /// Scan one TODO sheet: only its CHARTER and START sections are checked.
    pub fn scan_todo(&mut self, file: &SheetFile) -> Result<Option<TodoEntry>> {
        let sheet = self.split(file)?;
        let charter = if sheet.has(SectionKind::Charter) {
            self.check(CharterValidator, &sheet, file)?
        } else {
            ParsedCharter::default()
        };
        if sheet.has(SectionKind::Start) {
            self.check(StartValidator, &sheet, file)?;
        }

        let entry = TodoEntry::new(&file.name, charter);
        if entry.is_none() {
            self.sink.report(&file.label(), Diagnostic::error(TODO_NAME_MESSAGE))?;
        }
        Ok(entry)
    }

    /// Close the record tables and write everything derived from them.
    pub fn finish(self) -> Result<ScanReport> {
        let ScanContext {
            config,
            sink,
            tables,
            sessions,
            testers,
            areas,
            overlap,
            allow_lists,
            mut report,
        } = self;
        tables.finish()?;

        if config.scan_options.duration {
            for message in overlap.check() {
                sink.report_consistency_error(&message)?;
            }
        }

        let dir = &config.folders.metrics_dir;
        write_day_totals(dir, &sessions)?;
        write_tester_tables(dir, &sessions, &testers)?;
        if config.scan_options.areas {
            write_coverage_tables(dir, &sessions, &areas, &allow_lists.areas)?;
        }
        write_breakdowns(dir, &sessions)?;

        report.sessions_recorded = sessions.len();
        report.errors_found = sink.finish()?;
        Ok(report)
    }
}

/// Rows for a BUGS or ISSUES section.
fn write_items(table: &mut TsvWriter, name: &str, content: SectionContent<Vec<ItemEntry>>) -> Result<()> {
    match content {
        SectionContent::NotApplicable => table.write_row([name, EMPTY_FIELD, ""]),
        SectionContent::Present(entries) => {
            for entry in entries {
                table.write_row([name, entry.body.join("\n").as_str(), entry.id.as_str()])?;
            }
            Ok(())
        }
        SectionContent::Invalid => Ok(()),
    }
}

/// Runs scans with one configuration.
pub struct Scanner {
    config: Config,
    config_dir: PathBuf,
}

impl Scanner {
    /// `config_dir` is where the allow-lists are read from.
    pub fn new(config: Config, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            config_dir: config_dir.into(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scan every sheet in `scan_dir`, reporting problems to `sink`.
    ///
    /// Sheet problems never fail the run; the returned report says whether
    /// any were found. Only I/O failures return `Err`.
    pub fn scan(&self, scan_dir: &Path, sink: &mut DiagnosticSink) -> Result<ScanReport> {
        let (todo, sheets): (Vec<SheetFile>, Vec<SheetFile>) = discover_sheets(scan_dir)?
            .into_iter()
            .partition(|sheet| sheet.kind == SessionKind::Todo);

        if sheets.is_empty() && todo.is_empty() {
            sink.notice(NOTHING_TO_SCAN_MESSAGE)?;
            return Ok(ScanReport {
                nothing_to_scan: true,
                ..Default::default()
            });
        }

        let allow_lists = AllowLists::load(&self.config_dir, &self.config.scan_options)?;
        let mut ctx = ScanContext::new(&self.config, allow_lists, sink)?;
        ctx.report.sheets_found = sheets.len();
        ctx.report.todo_sheets = todo.len();

        for sheet in &sheets {
            tracing::debug!(file = %sheet.name, "Scanning session sheet");
            ctx.scan_session(sheet)?;
        }

        if !todo.is_empty() {
            let mut entries = Vec::new();
            for sheet in &todo {
                tracing::debug!(file = %sheet.name, "Scanning TODO sheet");
                if let Some(entry) = ctx.scan_todo(sheet)? {
                    entries.push(entry);
                }
            }
            write_todo_table(&self.config.folders.metrics_dir, &entries)?;
        }

        let report = ctx.finish()?;
        tracing::info!(
            sheets = report.sheets_found,
            todo = report.todo_sheets,
            recorded = report.sessions_recorded,
            errors_found = report.errors_found,
            "Scan complete"
        );
        Ok(report)
    }
}
