//! Full-text search over session sheets.

use crate::error::{Error, Result};
use crate::outputs;
use crate::scan::{discover_sheets, SheetFile};
use crate::types::SessionKind;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Written when nothing matched.
pub const NO_MATCHES: &str = "no matches found";

const BANNER_RULE: &str = "!##########################################################";

/// Sort key of a dated sheet: `yymmdd-<letter>` then the tester initials,
/// so one day's sessions sit together regardless of who ran them.
fn chronological_key(name: &str) -> String {
    let bytes = name.as_bytes();
    let start = (0..bytes.len().saturating_sub(6)).find(|&i| {
        bytes[i..i + 6].iter().all(u8::is_ascii_digit) && bytes[i + 6] == b'-'
    });
    let date = start
        .map(|i| &name[i..(i + 8).min(name.len())])
        .unwrap_or_default();
    let initials = name
        .strip_prefix("et-")
        .and_then(|rest| rest.split('-').next())
        .unwrap_or_default();
    format!("{}{}", date, initials)
}

/// Dated sheets in chronological order, then TODO sheets by name.
pub fn search_order(sheets: Vec<SheetFile>) -> Vec<SheetFile> {
    let (mut todo, mut dated): (Vec<SheetFile>, Vec<SheetFile>) = sheets
        .into_iter()
        .partition(|sheet| sheet.kind == SessionKind::Todo);
    dated.sort_by_cached_key(|sheet| chronological_key(&sheet.name));
    todo.sort_by(|a, b| a.name.cmp(&b.name));
    dated.extend(todo);
    dated
}

/// A sheet whose text contains the query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub path: PathBuf,
    pub text: String,
}

/// Result of searching a directory.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Sheets read, matching or not
    pub sheets_searched: usize,
    /// Matching sheets in search order
    pub hits: Vec<SearchHit>,
}

/// Find the sheets in `scan_dir` containing `query`, ignoring case.
pub fn search_sheets(scan_dir: &Path, query: &str) -> Result<SearchOutcome> {
    let needle = query.to_lowercase();
    let sheets = search_order(discover_sheets(scan_dir)?);
    let sheets_searched = sheets.len();
    let mut hits = Vec::new();

    for sheet in sheets {
        let bytes = std::fs::read(&sheet.path).map_err(|e| Error::open(&sheet.path, e))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if text.to_lowercase().contains(&needle) {
            hits.push(SearchHit {
                path: sheet.path,
                text,
            });
        }
    }

    tracing::info!(dir = %scan_dir.display(), query, hits = hits.len(), "Search complete");
    Ok(SearchOutcome {
        sheets_searched,
        hits,
    })
}

/// Write every hit, each under a banner naming the sheet, to
/// `search_results_sheets.txt` in `output_dir`. Returns the file's path.
pub fn write_search_results(output_dir: &Path, hits: &[SearchHit]) -> Result<PathBuf> {
    let path = output_dir.join(outputs::SEARCH_RESULTS);
    let file = File::create(&path).map_err(|e| Error::open(&path, e))?;
    let mut out = BufWriter::new(file);

    if hits.is_empty() {
        writeln!(out, "{}", NO_MATCHES)?;
    }
    for hit in hits {
        writeln!(out, "Session: {}", hit.path.display())?;
        writeln!(out, "{}", BANNER_RULE)?;
        for line in hit.text.lines() {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;
    Ok(path)
}
