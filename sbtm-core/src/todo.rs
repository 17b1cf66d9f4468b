//! TODO sheets
//!
//! `et-todo-<priority>-<title>.ses` sheets describe sessions that have not
//! happened yet. They only carry a charter, and are listed in
//! `charters-todo.txt` so planned work can be reported next to finished work.

use crate::error::Result;
use crate::outputs::{self, CHARTERS_TODO_HEADER, EMPTY_OR_MISSING};
use crate::tsv::TsvWriter;
use crate::types::{todo_name_parts, ParsedCharter};
use std::path::Path;

/// Message for a TODO sheet whose name does not carry a priority and title.
pub const TODO_NAME_MESSAGE: &str = "Unexpected TODO sheet file name. Its name must be: \
     \"ET-TODO-<priority number>-<title>.SES\"";

/// One row of `charters-todo.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEntry {
    pub title: String,
    pub priority: String,
    pub areas: Vec<String>,
    pub description: Vec<String>,
}

impl TodoEntry {
    /// Build an entry from a TODO sheet's name and charter.
    ///
    /// Returns `None` when the name has no `<digit>-<title>` part.
    pub fn new(file_name: &str, charter: ParsedCharter) -> Option<Self> {
        let (priority, title) = todo_name_parts(file_name)?;
        Some(Self {
            title,
            priority,
            areas: charter.areas,
            description: charter.description,
        })
    }

    /// Whether the charter gave anything worth listing.
    pub fn has_content(&self) -> bool {
        !self.areas.is_empty() || !self.description.is_empty()
    }

    fn fields(&self) -> [String; 4] {
        let areas = if self.areas.is_empty() {
            EMPTY_OR_MISSING.to_string()
        } else {
            self.areas.join(";")
        };
        let description = if self.description.is_empty() {
            EMPTY_OR_MISSING.to_string()
        } else {
            self.description.join(" ")
        };
        [self.title.clone(), areas, self.priority.clone(), description]
    }
}

/// Write `charters-todo.txt`, one row per entry in the given order.
pub fn write_todo_table(dir: &Path, entries: &[TodoEntry]) -> Result<()> {
    let mut table = TsvWriter::create(&dir.join(outputs::CHARTERS_TODO), CHARTERS_TODO_HEADER)?;
    for entry in entries.iter().filter(|entry| entry.has_content()) {
        table.write_row(entry.fields())?;
    }
    table.finish()
}
