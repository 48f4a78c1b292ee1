//! Per-entry results of a sync run

use drivesync_fs::EntryKind;
use serde::Serialize;

/// What the engine did (or, in dry-run, would do) with one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// File content was transferred.
    Copied,
    /// Destination already up to date.
    Unchanged,
    /// Destination directory was created.
    Created,
    /// Matched an exclusion pattern.
    Excluded { pattern: String },
    /// Skipped with a warning; the run continued.
    Warned { reason: String },
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Unchanged => "unchanged",
            Self::Created => "created",
            Self::Excluded { .. } => "excluded",
            Self::Warned { .. } => "warned",
        }
    }
}

/// Result record for one source entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub source: String,
    /// Destination path; absent for excluded entries, which are never mapped.
    pub dest: Option<String>,
    /// Entry kind; absent for excluded entries, which are never classified.
    pub kind: Option<EntryKind>,
    #[serde(flatten)]
    pub action: Action,
    /// Byte size, reported for regular files only.
    pub size: Option<u64>,
}

/// Per-action totals of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub copied: usize,
    pub unchanged: usize,
    pub created: usize,
    pub excluded: usize,
    pub warned: usize,
    /// Bytes in copied files.
    pub bytes_copied: u64,
}

/// Report from a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub source_root: String,
    pub dest_root: String,
    pub dry_run: bool,
    /// One record per source entry, in processing order.
    pub entries: Vec<EntryReport>,
    /// Destination directories whose mtime was restored, in restoration order.
    pub restored: Vec<String>,
}

impl SyncReport {
    pub(crate) fn new(source_root: &str, dest_root: &str, dry_run: bool) -> Self {
        Self {
            source_root: source_root.to_string(),
            dest_root: dest_root.to_string(),
            dry_run,
            entries: Vec::new(),
            restored: Vec::new(),
        }
    }

    pub fn summary(&self) -> Summary {
        self.entries
            .iter()
            .fold(Summary::default(), |mut summary, entry| {
                match entry.action {
                    Action::Copied => {
                        summary.copied += 1;
                        summary.bytes_copied += entry.size.unwrap_or(0);
                    }
                    Action::Unchanged => summary.unchanged += 1,
                    Action::Created => summary.created += 1,
                    Action::Excluded { .. } => summary.excluded += 1,
                    Action::Warned { .. } => summary.warned += 1,
                }
                summary
            })
    }

    /// The (source, action) sequence, independent of dry-run.
    pub fn decisions(&self) -> Vec<(&str, &Action)> {
        self.entries
            .iter()
            .map(|entry| (entry.source.as_str(), &entry.action))
            .collect()
    }

    /// Entries that ended with the given action label.
    pub fn with_action<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a EntryReport> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.action.label() == label)
    }
}
