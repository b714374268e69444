// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use crate::common::{Platform, read_version};
use crate::error::Error;

/// Identifies a repository: the base game data or one of its expansions.
///
/// Converting to and from the on-disk `u8` is total; 0 is the base repository
/// and anything else is an expansion number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RepositoryId {
    /// The base game repository, named "ffxiv" on disk.
    Base,
    /// An expansion repository, named "ex1", "ex2" and so on.
    Expansion(u8),
}

impl RepositoryId {
    /// Parses a path segment such as "ffxiv" or "ex1".
    ///
    /// With `fallback` set, a segment that is not a repository name at all
    /// (say, a filename) resolves to the base repository instead of an error.
    pub fn from_name(segment: &str, fallback: bool) -> Result<RepositoryId, Error> {
        if segment == "ffxiv" {
            return Ok(RepositoryId::Base);
        }

        if let Some(digits) = segment.strip_prefix("ex") {
            if let Ok(number) = digits.parse::<u8>() {
                if number > 0 {
                    return Ok(RepositoryId::Expansion(number));
                }
            }
        }

        if fallback {
            Ok(RepositoryId::Base)
        } else {
            Err(Error::InvalidRepo {
                segment: segment.to_string(),
            })
        }
    }

    /// The directory name of this repository, e.g. "ffxiv" or "ex3".
    pub fn name(&self) -> String {
        match self {
            RepositoryId::Base => "ffxiv".to_string(),
            RepositoryId::Expansion(number) => format!("ex{number}"),
        }
    }

    /// The number encoded into SqPack filenames: 0 for base, N for exN.
    pub fn number(&self) -> u8 {
        match self {
            RepositoryId::Base => 0,
            RepositoryId::Expansion(number) => *number,
        }
    }

    pub(crate) fn from_number(number: u8) -> RepositoryId {
        match number {
            0 => RepositoryId::Base,
            n => RepositoryId::Expansion(n),
        }
    }
}

/// A versioned directory of game data, such as "ffxiv" or "ex1".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Which repository this is.
    pub id: RepositoryId,
    /// The folder name, such as "ex1".
    pub name: String,
    /// The version of this repository's data, if its version file exists.
    pub version: Option<String>,
}

impl PartialOrd for Repository {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Repository {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // ffxiv sorts before ex1, ex2, ...
        self.id.cmp(&other.id)
    }
}

impl Repository {
    /// Creates the base `Repository` from the game directory, which holds
    /// `ffxivgame.ver`. Returns `None` if the directory doesn't exist.
    pub fn from_existing_base(dir: &str) -> Option<Repository> {
        let path = Path::new(dir);
        if path.metadata().is_err() {
            return None;
        }

        let mut d = PathBuf::from(dir);
        d.push("ffxivgame.ver");

        Some(Repository {
            id: RepositoryId::Base,
            name: "ffxiv".to_string(),
            version: read_version(d.as_path()),
        })
    }

    /// Creates an expansion `Repository` from its directory under `sqpack/`,
    /// which holds `exN.ver`. Returns `None` if the directory name isn't an
    /// expansion name.
    pub fn from_existing_expansion(dir: &str) -> Option<Repository> {
        let path = Path::new(dir);
        if path.metadata().is_err() {
            return None;
        }

        let name = String::from(path.file_stem()?.to_str()?);
        let RepositoryId::Expansion(number) = RepositoryId::from_name(&name, false).ok()? else {
            return None;
        };

        let mut d = PathBuf::from(dir);
        d.push(format!("{name}.ver"));

        Some(Repository {
            id: RepositoryId::Expansion(number),
            name,
            version: read_version(d.as_path()),
        })
    }
}

/// The root directory a file is located in. This is a fixed list, and the
/// first segment of every virtual path names one of them.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Category {
    /// Common files such as game fonts.
    Common = 0x00,
    /// Shared data between game maps.
    BackgroundCommon = 0x01,
    /// Game map data such as models and textures.
    Background = 0x02,
    /// Cutscene content such as animations.
    Cutscene = 0x03,
    /// Character model files and more.
    Character = 0x04,
    /// Compiled shaders used by the retail client.
    Shader = 0x05,
    /// UI layouts and textures.
    UI = 0x06,
    /// Sound effects, basically anything not under `Music`.
    Sound = 0x07,
    /// Visual effects, such as battle effect textures and definitions.
    VFX = 0x08,
    /// A leftover from 1.0, where the UI was driven by LUA scripts.
    UIScript = 0x09,
    /// Excel data.
    EXD = 0x0A,
    /// LUA scripts driving game events such as cutscenes.
    GameScript = 0x0B,
    /// Music!
    Music = 0x0C,
    /// Unknown purpose, most likely to test SqPack functionality.
    SqPackTest = 0x12,
    /// Unknown purpose, most likely debug files.
    Debug = 0x13,
}

impl Category {
    /// Maps the first segment of a virtual path to its category.
    pub fn from_name(segment: &str) -> Option<Category> {
        use Category::*;

        match segment {
            "common" => Some(Common),
            "bgcommon" => Some(BackgroundCommon),
            "bg" => Some(Background),
            "cut" => Some(Cutscene),
            "chara" => Some(Character),
            "shader" => Some(Shader),
            "ui" => Some(UI),
            "sound" => Some(Sound),
            "vfx" => Some(VFX),
            "ui_script" => Some(UIScript),
            "exd" => Some(EXD),
            "game_script" => Some(GameScript),
            "music" => Some(Music),
            "sqpack_test" => Some(SqPackTest),
            "debug" => Some(Debug),
            _ => None,
        }
    }

    /// The 8-bit id encoded into SqPack filenames.
    pub fn id(&self) -> u8 {
        *self as u8
    }
}

/// Names one shard family inside a repository: all files of one category
/// split across chunks and dat files.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ShardName {
    pub category: Category,
    pub repository: RepositoryId,
    pub chunk: u8,
}

impl ShardName {
    /// The shared filename stem, like "0a0000".
    fn stem(&self) -> String {
        format!(
            "{:02x}{:02}{:02}",
            self.category.id(),
            self.repository.number(),
            self.chunk
        )
    }

    /// The index filename for this shard, like "0a0000.win32.index".
    pub fn index_filename(&self, platform: Platform) -> String {
        format!("{}.{}.index", self.stem(), platform.shortname())
    }

    /// The index2 filename for this shard, like "0a0000.win32.index2".
    pub fn index2_filename(&self, platform: Platform) -> String {
        format!("{}2", self.index_filename(platform))
    }

    /// The filename of one of this shard's dat files, like "0a0000.win32.dat0".
    pub fn dat_filename(&self, platform: Platform, dat_id: u8) -> String {
        format!("{}.{}.dat{}", self.stem(), platform.shortname(), dat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_parsing() {
        assert_eq!(
            RepositoryId::from_name("ffxiv", false).unwrap(),
            RepositoryId::Base
        );
        assert_eq!(
            RepositoryId::from_name("ex1", false).unwrap(),
            RepositoryId::Expansion(1)
        );

        // Not a repository name: an error without fallback, base with it.
        assert!(matches!(
            RepositoryId::from_name("explodey", false),
            Err(Error::InvalidRepo { .. })
        ));
        assert_eq!(
            RepositoryId::from_name("explodey", true).unwrap(),
            RepositoryId::Base
        );

        // There is no expansion zero.
        assert!(RepositoryId::from_name("ex0", false).is_err());
    }

    #[test]
    fn repository_name_round_trip() {
        let mut all = vec![RepositoryId::Base];
        all.extend((1..=255).map(RepositoryId::Expansion));

        for id in all {
            assert_eq!(RepositoryId::from_name(&id.name(), false).unwrap(), id);
            assert_eq!(RepositoryId::from_number(id.number()), id);
        }
    }

    #[test]
    fn repository_ordering() {
        let mut repos = vec![
            RepositoryId::Expansion(2),
            RepositoryId::Base,
            RepositoryId::Expansion(1),
        ];
        repos.sort();

        assert_eq!(
            repos,
            vec![
                RepositoryId::Base,
                RepositoryId::Expansion(1),
                RepositoryId::Expansion(2)
            ]
        );
    }

    #[test]
    fn category_names() {
        assert_eq!(Category::from_name("exd"), Some(Category::EXD));
        assert_eq!(Category::from_name("chara"), Some(Category::Character));
        assert_eq!(Category::from_name("what"), None);

        assert_eq!(Category::EXD.id(), 0x0A);
        assert_eq!(Category::Debug.id(), 0x13);
    }

    #[test]
    fn shard_filenames() {
        let shard = ShardName {
            category: Category::Music,
            repository: RepositoryId::Base,
            chunk: 0,
        };

        assert_eq!(shard.index_filename(Platform::Win32), "0c0000.win32.index");
        assert_eq!(
            shard.index2_filename(Platform::Win32),
            "0c0000.win32.index2"
        );
        assert_eq!(shard.dat_filename(Platform::Win32, 1), "0c0000.win32.dat1");

        let expansion_shard = ShardName {
            category: Category::Background,
            repository: RepositoryId::Expansion(2),
            chunk: 3,
        };

        assert_eq!(
            expansion_shard.index_filename(Platform::PS4),
            "020203.ps4.index"
        );
    }
}
