// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::Path;

use binrw::{BinRead, BinReaderExt, binread};
use modular_bitfield::prelude::*;
use tracing::debug;

use crate::common::Platform;
use crate::crc::{hash_full_path, hash_split_path};
use crate::error::Error;
use crate::repository::ShardName;
use crate::sqpack::SqPackHeader;

/// The packed location every index entry points at. The stored offset is in
/// 128-byte units, so the widest addressable dat file is 32 GiB.
#[bitfield]
#[binread]
#[br(map = Self::from_bytes)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct DataLocator {
    pub synonym: B1,
    pub data_file_id: B3,
    pub offset: B28,
}

/// Where a file lives: which dat file of the shard, and the byte offset of
/// its entry header inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct IndexEntry {
    pub data_file_id: u8,
    pub offset: u64,
}

impl From<DataLocator> for IndexEntry {
    fn from(locator: DataLocator) -> IndexEntry {
        IndexEntry {
            data_file_id: locator.data_file_id(),
            offset: (locator.offset() as u64) << 7,
        }
    }
}

#[binread]
#[br(little)]
struct IndexHeader {
    #[allow(dead_code)]
    size: u32,
    #[allow(dead_code)]
    file_type: u32,
    data_offset: u32,
    data_size: u32,
}

/// An entry in an `index` file, keyed by the two halves of the path hash.
#[binread]
#[br(little)]
struct SplitPathEntry {
    file_hash: u32,
    folder_hash: u32,
    #[br(pad_after = 4)]
    locator: DataLocator,
}

const SPLIT_PATH_ENTRY_WIDTH: u32 = 16;

/// An entry in an `index2` file, keyed by the full path hash.
#[binread]
#[br(little)]
struct FullPathEntry {
    hash: u32,
    locator: DataLocator,
}

const FULL_PATH_ENTRY_WIDTH: u32 = 8;

#[binread]
#[br(little)]
struct IndexFile {
    #[allow(dead_code)]
    sqpack_header: SqPackHeader,

    #[br(seek_before = SeekFrom::Start(sqpack_header.size.into()))]
    #[allow(dead_code)]
    index_header: IndexHeader,

    #[br(seek_before = SeekFrom::Start(index_header.data_offset.into()))]
    #[br(count = index_header.data_size / SPLIT_PATH_ENTRY_WIDTH)]
    entries: Vec<SplitPathEntry>,
}

#[binread]
#[br(little)]
struct Index2File {
    #[allow(dead_code)]
    sqpack_header: SqPackHeader,

    #[br(seek_before = SeekFrom::Start(sqpack_header.size.into()))]
    #[allow(dead_code)]
    index_header: IndexHeader,

    #[br(seek_before = SeekFrom::Start(index_header.data_offset.into()))]
    #[br(count = index_header.data_size / FULL_PATH_ENTRY_WIDTH)]
    entries: Vec<FullPathEntry>,
}

/// The loaded lookup tables of one shard.
///
/// A shard on disk has an `index` file, an `index2` file, or both; they key
/// the same locators by a split hash and a full-path hash respectively.
/// Lookups prefer the full-path table.
pub(crate) struct SqPackIndex {
    split_path: HashMap<u64, IndexEntry>,
    full_path: HashMap<u32, IndexEntry>,
}

impl SqPackIndex {
    /// Loads the index tables of `shard` from `dir`. Returns `Ok(None)` when
    /// the shard has no index files at all, which ends a chunk scan.
    pub(crate) fn open(
        dir: &Path,
        shard: ShardName,
        platform: Platform,
    ) -> Result<Option<SqPackIndex>, Error> {
        let index_path = dir.join(shard.index_filename(platform));
        let index2_path = dir.join(shard.index2_filename(platform));

        if !index_path.is_file() && !index2_path.is_file() {
            return Ok(None);
        }

        let mut index = SqPackIndex {
            split_path: HashMap::new(),
            full_path: HashMap::new(),
        };

        if index2_path.is_file() {
            let parsed = Self::parse::<Index2File>(&index2_path)?;

            index.full_path.reserve(parsed.entries.len());
            for entry in parsed.entries {
                index.full_path.insert(entry.hash, entry.locator.into());
            }

            debug!(path = %index2_path.display(), entries = index.full_path.len(), "Loaded index2");
        }

        if index_path.is_file() {
            let parsed = Self::parse::<IndexFile>(&index_path)?;

            index.split_path.reserve(parsed.entries.len());
            for entry in parsed.entries {
                let hash = (entry.folder_hash as u64) << 32 | (entry.file_hash as u64);
                index.split_path.insert(hash, entry.locator.into());
            }

            debug!(path = %index_path.display(), entries = index.split_path.len(), "Loaded index");
        }

        Ok(Some(index))
    }

    fn parse<F: for<'a> BinRead<Args<'a> = ()>>(path: &Path) -> Result<F, Error> {
        let mut file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: "open index file",
            source,
        })?;

        file.read_le().map_err(|_| Error::InvalidIndex {
            path: path.display().to_string(),
        })
    }

    /// Looks up a virtual path, preferring the full-path table.
    pub(crate) fn lookup(&self, path: &str) -> Option<IndexEntry> {
        if let Some(entry) = self.full_path.get(&hash_full_path(path)) {
            return Some(*entry);
        }

        self.split_path.get(&hash_split_path(path)).copied()
    }
}
