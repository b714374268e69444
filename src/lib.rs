// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only access to the game's SqPack archives and the Excel sheets stored
//! inside of them.
//!
//! The entry point is [GameData](crate::gamedata::GameData), which locates a
//! game directory and hands out file contents by their virtual path:
//!
//! ```no_run
//! # use aetherite::gamedata::{GameData, GameDataOptions};
//! let mut game = GameData::from_options(GameDataOptions::default())?;
//! let bytes = game.file_contents("exd/root.exl")?;
//! # Ok::<(), aetherite::Error>(())
//! ```
//!
//! Tabular data is read through [ExcelSheet](crate::excel::ExcelSheet):
//!
//! ```no_run
//! # use aetherite::gamedata::{GameData, GameDataOptions};
//! let mut game = GameData::from_options(GameDataOptions::default())?;
//! let sheet = game.sheet("Item")?;
//! println!("{} rows", sheet.row_count());
//! # Ok::<(), aetherite::Error>(())
//! ```

pub mod common;
mod compression;
pub mod crc;
mod error;
pub mod excel;
pub mod exd;
pub mod exh;
pub mod exl;
pub mod gamedata;
pub mod model;
pub mod repository;
pub mod sqpack;

pub use error::Error;

/// An owned, in-memory copy of a file's contents.
pub type ByteBuffer = Vec<u8>;

/// A borrowed span of file contents.
pub type ByteSpan<'a> = &'a [u8];

/// A file format that can be parsed out of a byte buffer.
///
/// Implementations must not hold on to the span past `from_existing`; anything
/// worth keeping is copied into the returned value. A `None` signals a
/// malformed file, which [Pack::typed_file](crate::sqpack::Pack::typed_file)
/// reports to the caller.
pub trait ReadableFile: Sized {
    /// Parses `buffer` into this file type, or `None` if it's malformed.
    fn from_existing(buffer: ByteSpan) -> Option<Self>;
}
