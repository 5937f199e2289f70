//! Per-target statistics records and the accumulator that fills them from
//! classified output lines.

use crate::duplicacy::classify::{Field, LineClass};
use getset::Getters;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::time::Duration;

/// Statistics a record type knows how to absorb, and how it is sealed.
pub trait RevisionStats: Default {
    type Target;
    type Revision;

    /// Stores `value` if `field` belongs to this record, ignores it otherwise.
    fn set(&mut self, field: Field, value: &str);

    fn finalize(self, target: Self::Target, duration: Duration) -> Self::Revision;
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Getters)]
#[getset(get = "pub")]
pub struct BackupStats {
    files_total_count: Option<String>,
    files_total_size: Option<String>,
    files_new_count: Option<String>,
    files_new_size: Option<String>,
    chunk_total_count: Option<String>,
    chunk_total_size: Option<String>,
    chunk_new_count: Option<String>,
    chunk_new_size: Option<String>,
    chunk_new_uploaded: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Getters)]
#[getset(get = "pub")]
pub struct CopyStats {
    chunk_total_count: Option<String>,
    chunk_copy_count: Option<String>,
    chunk_skip_count: Option<String>,
}

/// Result of one `duplicacy backup` run against one storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Getters)]
#[getset(get = "pub")]
pub struct BackupRevision {
    storage: String,
    #[serde(flatten)]
    stats: BackupStats,
    #[serde(with = "humantime_serde")]
    duration: Duration,
}

/// Result of one `duplicacy copy` run between two storages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Getters)]
#[getset(get = "pub")]
pub struct CopyRevision {
    storage_from: String,
    storage_to: String,
    #[serde(flatten)]
    stats: CopyStats,
    #[serde(with = "humantime_serde")]
    duration: Duration,
}

pub fn format_duration(duration: Duration) -> String {
    humantime::format_duration(Duration::from_secs(duration.as_secs())).to_string()
}

impl BackupRevision {
    pub fn duration_display(&self) -> String {
        format_duration(self.duration)
    }
}

impl CopyRevision {
    pub fn duration_display(&self) -> String {
        format_duration(self.duration)
    }
}

impl RevisionStats for BackupStats {
    type Target = String;
    type Revision = BackupRevision;

    fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::FilesTotalCount => &mut self.files_total_count,
            Field::FilesTotalSize => &mut self.files_total_size,
            Field::FilesNewCount => &mut self.files_new_count,
            Field::FilesNewSize => &mut self.files_new_size,
            Field::ChunkTotalCount => &mut self.chunk_total_count,
            Field::ChunkTotalSize => &mut self.chunk_total_size,
            Field::ChunkNewCount => &mut self.chunk_new_count,
            Field::ChunkNewSize => &mut self.chunk_new_size,
            Field::ChunkNewUploaded => &mut self.chunk_new_uploaded,
            Field::CopyTotalCount | Field::CopyCopiedCount | Field::CopySkippedCount => return,
        };
        *slot = Some(value.to_owned());
    }

    fn finalize(self, storage: String, duration: Duration) -> BackupRevision {
        BackupRevision {
            storage,
            stats: self,
            duration,
        }
    }
}

impl RevisionStats for CopyStats {
    /// `(from, to)`
    type Target = (String, String);
    type Revision = CopyRevision;

    fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::CopyTotalCount => &mut self.chunk_total_count,
            Field::CopyCopiedCount => &mut self.chunk_copy_count,
            Field::CopySkippedCount => &mut self.chunk_skip_count,
            _ => return,
        };
        *slot = Some(value.to_owned());
    }

    fn finalize(self, (storage_from, storage_to): (String, String), duration: Duration) -> CopyRevision {
        CopyRevision {
            storage_from,
            storage_to,
            stats: self,
            duration,
        }
    }
}

/// In-progress record for the target currently being processed.
#[derive(Debug, Default)]
pub struct RevisionAccumulator<S> {
    stats: S,
}

impl<S: RevisionStats> RevisionAccumulator<S> {
    pub fn new() -> Self {
        Self {
            stats: S::default(),
        }
    }

    /// Merges whatever `class` captured. A later capture of the same field
    /// replaces the earlier one.
    pub fn record(&mut self, class: &LineClass<'_>) {
        for (field, value) in class.captures() {
            self.stats.set(field, value);
        }
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    pub fn finish(self, target: S::Target, duration: Duration) -> S::Revision {
        self.stats.finalize(target, duration)
    }
}
