//! Recognition of the handful of duplicacy output lines that carry statistics.
//!
//! The shapes are fixed and anchored on a literal prefix; every captured token
//! is a run of non-whitespace characters kept exactly as printed (`15,951M`
//! stays `15,951M`).

pub const FILES_PREFIX: &str = "Files:";
pub const ALL_CHUNKS_PREFIX: &str = "All chunks:";
pub const COPY_COMPLETE_PREFIX: &str = "Copy complete, ";
pub const PASSWORD_PROMPT_PREFIX: &str = "Enter storage password:";
pub const AUTHORIZATION_FAILURE_SUFFIX: &str = "Authorization failure";

// Files: 161318 total, 1666G bytes; 373 new, 15,951M bytes
const FILES_SHAPE: [&str; 4] = [" total, ", " bytes; ", " new, ", " bytes"];
// All chunks: 348444 total, 1668G bytes; 2415 new, 12,391M bytes, 12,255M bytes uploaded
const ALL_CHUNKS_SHAPE: [&str; 5] = [
    " total, ",
    " bytes; ",
    " new, ",
    " bytes, ",
    " bytes uploaded",
];
// Copy complete, 107 total chunks, 0 chunks copied, 107 skipped
const COPY_COMPLETE_SHAPE: [&str; 3] = [" total chunks, ", " chunks copied, ", " skipped"];

/// Named value a recognized line can contribute to a revision record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    FilesTotalCount,
    FilesTotalSize,
    FilesNewCount,
    FilesNewSize,
    ChunkTotalCount,
    ChunkTotalSize,
    ChunkNewCount,
    ChunkNewSize,
    ChunkNewUploaded,
    CopyTotalCount,
    CopyCopiedCount,
    CopySkippedCount,
}

/// Outcome of classifying one output line.
///
/// The summary variants carry `None` when the prefix was seen but the rest of
/// the line did not have the expected shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineClass<'a> {
    FilesSummary(Option<[&'a str; 4]>),
    ChunkSummary(Option<[&'a str; 5]>),
    CopySummary(Option<[&'a str; 3]>),
    CredentialPrompt,
    Unclassified,
}

impl<'a> LineClass<'a> {
    pub fn captures(&self) -> Vec<(Field, &'a str)> {
        match self {
            LineClass::FilesSummary(Some([total_count, total_size, new_count, new_size])) => vec![
                (Field::FilesTotalCount, *total_count),
                (Field::FilesTotalSize, *total_size),
                (Field::FilesNewCount, *new_count),
                (Field::FilesNewSize, *new_size),
            ],
            LineClass::ChunkSummary(Some(
                [total_count, total_size, new_count, new_size, uploaded],
            )) => vec![
                (Field::ChunkTotalCount, *total_count),
                (Field::ChunkTotalSize, *total_size),
                (Field::ChunkNewCount, *new_count),
                (Field::ChunkNewSize, *new_size),
                (Field::ChunkNewUploaded, *uploaded),
            ],
            LineClass::CopySummary(Some([total, copied, skipped])) => vec![
                (Field::CopyTotalCount, *total),
                (Field::CopyCopiedCount, *copied),
                (Field::CopySkippedCount, *skipped),
            ],
            _ => vec![],
        }
    }

    /// Summary lines are echoed to the console in addition to the run log.
    pub fn is_summary(&self) -> bool {
        matches!(
            self,
            LineClass::FilesSummary(_) | LineClass::ChunkSummary(_) | LineClass::CopySummary(_)
        )
    }
}

pub fn classify(line: &str) -> LineClass<'_> {
    if let Some(rest) = line.strip_prefix(FILES_PREFIX) {
        LineClass::FilesSummary(capture_tokens(rest.trim_start(), FILES_SHAPE))
    } else if let Some(rest) = line.strip_prefix(ALL_CHUNKS_PREFIX) {
        LineClass::ChunkSummary(capture_tokens(rest.trim_start(), ALL_CHUNKS_SHAPE))
    } else if let Some(rest) = line.strip_prefix(COPY_COMPLETE_PREFIX) {
        LineClass::CopySummary(capture_tokens(rest, COPY_COMPLETE_SHAPE))
    } else if line.starts_with(PASSWORD_PROMPT_PREFIX)
        || line.ends_with(AUTHORIZATION_FAILURE_SUFFIX)
    {
        LineClass::CredentialPrompt
    } else {
        LineClass::Unclassified
    }
}

/// Captures one non-whitespace token in front of every literal of `shape`.
/// Text after the last literal is ignored.
fn capture_tokens<'a, const N: usize>(mut rest: &'a str, shape: [&str; N]) -> Option<[&'a str; N]> {
    let mut captures = [""; N];
    for (capture, literal) in captures.iter_mut().zip(shape) {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        *capture = &rest[..end];
        rest = rest[end..].strip_prefix(literal)?;
    }
    Some(captures)
}
