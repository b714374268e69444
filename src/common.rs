// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use binrw::binrw;

/// Language the game data is written for.
#[binrw]
#[brw(repr(u8))]
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Language {
    /// Used for data that is language-agnostic.
    None,
    /// Japanese language.
    Japanese,
    /// English language.
    English,
    /// German language.
    German,
    /// French language.
    French,
    /// Chinese (Simplified) language. Only available in the Chinese client.
    ChineseSimplified,
    /// Chinese (Traditional) language. Only available in the Chinese client.
    ChineseTraditional,
    /// Korean language. Only available in the Korean client.
    Korean,
}

impl Language {
    /// The shorthand language code used in Excel page filenames.
    ///
    /// For example, English becomes "en". [Language::None] has no code, pages
    /// for it carry no language suffix at all.
    pub fn code(&self) -> &'static str {
        match self {
            Language::None => "",
            Language::Japanese => "ja",
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::ChineseSimplified => "chs",
            Language::ChineseTraditional => "cht",
            Language::Korean => "ko",
        }
    }
}

/// Platform the game data was built for.
#[binrw]
#[brw(repr = u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Platform {
    /// Windows and macOS.
    Win32 = 0x0,
    /// PlayStation 3.
    PS3 = 0x1,
    /// PlayStation 4.
    PS4 = 0x2,
    /// PlayStation 5.
    PS5 = 0x3,
}

impl Platform {
    /// The short-hand name used in SqPack filenames, e.g. "win32".
    pub fn shortname(&self) -> &'static str {
        match self {
            Platform::Win32 => "win32",
            Platform::PS3 => "ps3",
            Platform::PS4 => "ps4",
            Platform::PS5 => "ps5",
        }
    }
}

/// Reads a version file, such as `ffxivgame.ver`.
pub fn read_version(p: &Path) -> Option<String> {
    fs::read_to_string(p).ok()
}
