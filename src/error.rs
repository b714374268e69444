// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

use crate::common::Platform;

/// Every way reading game data can fail.
///
/// Errors propagate to the caller as-is; nothing in this crate retries or
/// logs them. The only fallbacks are the documented ones: an unrecognized
/// repository segment resolving to the base repository, and a sheet falling
/// back to its language-agnostic data during construction.
#[derive(Debug, Error)]
pub enum Error {
    /// The path does not exist in any index consulted.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The virtual path that was looked up.
        path: String,
    },

    /// The first path segment is not a known category name.
    #[error("unknown category: {segment}")]
    UnknownCategory {
        /// The offending path segment.
        segment: String,
    },

    /// The repository segment is neither the base repository nor `ex<N>`.
    #[error("invalid repository: {segment}")]
    InvalidRepo {
        /// The offending segment.
        segment: String,
    },

    /// Only win32 game data is supported.
    #[error("unsupported platform: {platform:?}")]
    UnsupportedPlatform {
        /// The requested platform.
        platform: Platform,
    },

    /// An index file had a bad magic, a short read, or malformed entries.
    #[error("invalid index file: {path}")]
    InvalidIndex {
        /// The filesystem path of the index file.
        path: String,
    },

    /// A dat entry was malformed, or reconstruction produced the wrong size.
    #[error("invalid dat entry at {offset:#x}: {reason}")]
    InvalidDat {
        /// Byte offset of the entry inside the dat file.
        offset: u64,
        /// What went wrong.
        reason: &'static str,
    },

    /// A compressed block did not inflate to its declared size.
    #[error("block decompression failed at {offset:#x}")]
    DecompressFailed {
        /// Byte offset of the block inside the dat file.
        offset: u64,
    },

    /// A row index was out of range for the sheet.
    #[error("row index {index} out of range for sheet {sheet}")]
    InvalidPageIndex {
        /// The sheet name.
        sheet: String,
        /// The offending index.
        index: usize,
    },

    /// No row with this id exists in the sheet.
    #[error("row {row_id} not found")]
    RowNotFound {
        /// The row id that was looked up.
        row_id: u32,
    },

    /// The sheet supports neither the preferred language nor `none`.
    #[error("no usable language for sheet {sheet}")]
    LanguageNotFound {
        /// The sheet name.
        sheet: String,
    },

    /// An Excel header, page, or list file failed to parse.
    #[error("corrupt excel file: {path}")]
    CorruptExcel {
        /// The virtual path of the file.
        path: String,
    },

    /// An underlying OS error, tagged with the operation that hit it.
    #[error("{operation}: {source}")]
    Io {
        /// What the crate was doing at the time.
        operation: &'static str,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}
