// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Everything to do with reading SqPack files.
//!
//! Index and dat files are little-endian throughout; anything bigger than a
//! block goes through [Pack], which resolves virtual paths across shards.

use std::io::{Read, Seek, SeekFrom};

use binrw::{BinRead, binrw};

use crate::common::Platform;
use crate::compression::inflate_raw;
use crate::error::Error;

mod index;
pub(crate) use index::{IndexEntry, SqPackIndex};

mod dat;
pub(crate) use dat::DatFile;

mod pack;
pub use pack::Pack;

/// The type of a SqPack file.
#[binrw]
#[brw(repr = u8)]
#[derive(Debug)]
pub(crate) enum SqPackFileType {
    /// FFXIV Explorer says "SQDB", whatever that is.
    SQDB = 0x0,
    /// Dat files.
    Data = 0x1,
    /// Index/Index2 files.
    Index = 0x2,
}

/// The header every SqPack file starts with. `size` gives the total header
/// size, which is where the file-type specific data begins.
#[binrw]
#[brw(little, magic = b"SqPack\0\0")]
#[derive(Debug)]
pub(crate) struct SqPackHeader {
    #[brw(pad_size_to = 4)]
    pub platform: Platform,
    pub size: u32,
    // Have only seen version 1
    pub version: u32,
    #[brw(pad_size_to = 4)]
    pub file_type: SqPackFileType,
}

/// A compressed block's `compressed_size` at or above this value means the
/// body is stored bytes, not a DEFLATE stream.
const STORED_SENTINEL: i32 = 32000;

/// The 16-byte header in front of every block body inside a dat file.
#[binrw]
#[brw(little)]
#[derive(Debug)]
pub(crate) struct BlockHeader {
    #[brw(pad_after = 4)]
    pub size: u32,
    pub compressed_size: i32,
    pub uncompressed_size: i32,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CompressionMode {
    /// The body is a raw DEFLATE stream of `compressed_length` bytes.
    Compressed {
        compressed_length: i32,
        decompressed_length: i32,
    },
    /// The body is `size` bytes, stored verbatim.
    Stored { size: i32 },
}

impl BlockHeader {
    pub(crate) fn compression(&self) -> CompressionMode {
        if self.compressed_size < STORED_SENTINEL {
            CompressionMode::Compressed {
                compressed_length: self.compressed_size,
                decompressed_length: self.uncompressed_size,
            }
        } else {
            CompressionMode::Stored {
                size: self.uncompressed_size,
            }
        }
    }
}

/// Reads one block at `starting_position` in a dat file and returns its
/// decompressed bytes.
pub(crate) fn read_data_block<T: Read + Seek>(
    mut buf: T,
    starting_position: u64,
) -> Result<Vec<u8>, Error> {
    buf.seek(SeekFrom::Start(starting_position))
        .map_err(|source| Error::Io {
            operation: "seek to block",
            source,
        })?;

    let block_header = BlockHeader::read(&mut buf).map_err(|_| Error::InvalidDat {
        offset: starting_position,
        reason: "malformed block header",
    })?;

    match block_header.compression() {
        CompressionMode::Compressed {
            compressed_length,
            decompressed_length,
        } => {
            if compressed_length < 0 || decompressed_length < 0 {
                return Err(Error::InvalidDat {
                    offset: starting_position,
                    reason: "negative block size",
                });
            }

            let mut compressed_data: Vec<u8> = vec![0; compressed_length as usize];
            buf.read_exact(&mut compressed_data)
                .map_err(|source| Error::Io {
                    operation: "read compressed block",
                    source,
                })?;

            let mut decompressed_data: Vec<u8> = vec![0; decompressed_length as usize];
            if !inflate_raw(&mut compressed_data, &mut decompressed_data) {
                return Err(Error::DecompressFailed {
                    offset: starting_position,
                });
            }

            Ok(decompressed_data)
        }
        CompressionMode::Stored { size } => {
            if size < 0 {
                return Err(Error::InvalidDat {
                    offset: starting_position,
                    reason: "negative block size",
                });
            }

            let mut local_data: Vec<u8> = vec![0; size as usize];
            buf.read_exact(&mut local_data).map_err(|source| Error::Io {
                operation: "read stored block",
                source,
            })?;

            Ok(local_data)
        }
    }
}
