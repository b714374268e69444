// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;

use tracing::debug;

use crate::common::Platform;
use crate::error::Error;
use crate::repository::{Category, RepositoryId, ShardName};
use crate::sqpack::{DatFile, IndexEntry, SqPackIndex};
use crate::{ByteBuffer, ReadableFile};

/// Resolves virtual paths to file contents across every shard of a game
/// directory.
///
/// Index tables and dat file handles are opened on first demand and cached
/// for the lifetime of the pack.
pub struct Pack {
    sqpack_directory: PathBuf,
    platform: Platform,

    indexes: HashMap<ShardName, Option<SqPackIndex>>,
    dats: HashMap<(ShardName, u8), DatFile>,
}

impl Pack {
    /// Creates a pack over `directory`, the game directory containing
    /// `sqpack/`. No files are touched until the first lookup.
    pub fn new(directory: &str, platform: Platform) -> Pack {
        let mut sqpack_directory = PathBuf::from(directory);
        sqpack_directory.push("sqpack");

        Pack {
            sqpack_directory,
            platform,
            indexes: HashMap::new(),
            dats: HashMap::new(),
        }
    }

    /// Reads the file at `path` and reconstructs its contents.
    pub fn file_contents(&mut self, path: &str) -> Result<ByteBuffer, Error> {
        let (shard, entry) = self.resolve(path)?;

        let dat_path = self
            .sqpack_directory
            .join(shard.repository.name())
            .join(shard.dat_filename(self.platform, entry.data_file_id));

        let dat = match self.dats.entry((shard, entry.data_file_id)) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => vacant.insert(DatFile::open(&dat_path)?),
        };

        dat.read_from_offset(entry.offset)
    }

    /// Reads the file at `path` and parses it as `F`.
    ///
    /// The parser gets a borrowed view of the contents and must copy what it
    /// wants to keep.
    pub fn typed_file<F: ReadableFile>(&mut self, path: &str) -> Result<F, Error> {
        let bytes = self.file_contents(path)?;

        F::from_existing(&bytes).ok_or_else(|| Error::CorruptExcel {
            path: path.to_string(),
        })
    }

    /// Checks whether `path` exists, from the indices alone.
    pub fn exists(&mut self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    /// Finds the shard and index entry for `path`.
    fn resolve(&mut self, path: &str) -> Result<(ShardName, IndexEntry), Error> {
        let mut segments = path.split('/');

        let first = segments.next().unwrap_or_default();
        let category = Category::from_name(first).ok_or_else(|| Error::UnknownCategory {
            segment: first.to_string(),
        })?;

        // A second segment that isn't an expansion name means the base
        // repository.
        let repository = match segments.next() {
            Some(segment) => RepositoryId::from_name(segment, true)?,
            None => RepositoryId::Base,
        };

        // Chunks are numbered contiguously from zero; the first one with no
        // index files on disk ends the scan.
        for chunk in 0..=u8::MAX {
            let shard = ShardName {
                category,
                repository,
                chunk,
            };

            if let Entry::Vacant(vacant) = self.indexes.entry(shard) {
                let dir = self.sqpack_directory.join(repository.name());
                vacant.insert(SqPackIndex::open(&dir, shard, self.platform)?);
            }

            match self.indexes.get(&shard) {
                Some(Some(index)) => {
                    if let Some(entry) = index.lookup(path) {
                        debug!(path, chunk, "Resolved path");
                        return Ok((shard, entry));
                    }
                }
                _ => break,
            }
        }

        Err(Error::FileNotFound {
            path: path.to_string(),
        })
    }
}
