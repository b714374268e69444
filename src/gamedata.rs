// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! The top-level framework for operating on game data.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::common::{Language, Platform, read_version};
use crate::error::Error;
use crate::excel::{ExcelModule, ExcelSheet};
use crate::repository::Repository;
use crate::sqpack::Pack;
use crate::{ByteBuffer, ReadableFile};

/// The environment variable consulted when no game path is configured.
pub const GAME_PATH_VARIABLE: &str = "FFXIV_GAME_PATH";

/// Options for opening a game installation.
#[derive(Debug, Clone)]
pub struct GameDataOptions {
    /// The game directory, the one containing `ffxivgame.ver` and `sqpack/`.
    /// When absent, the `FFXIV_GAME_PATH` environment variable is used.
    pub path: Option<String>,

    /// The platform the game data was built for. Only [Platform::Win32] is
    /// supported.
    pub platform: Platform,

    /// The language Excel sheets are loaded in.
    pub language: Language,
}

impl Default for GameDataOptions {
    fn default() -> Self {
        GameDataOptions {
            path: None,
            platform: Platform::Win32,
            language: Language::English,
        }
    }
}

/// Framework for operating on game data.
///
/// Owns the [Pack] resolving virtual paths and the [ExcelModule] caching
/// sheets. Both are public so that borrows can be split when holding a sheet
/// across row reads:
///
/// ```no_run
/// # use aetherite::gamedata::{GameData, GameDataOptions};
/// # let mut game = GameData::from_options(GameDataOptions::default())?;
/// let sheet = game.excel.sheet(&mut game.pack, "Item")?;
/// for row in sheet.rows(&mut game.pack)? {
///     println!("{}", row.row_id);
/// }
/// # Ok::<(), aetherite::Error>(())
/// ```
pub struct GameData {
    /// The game directory this was opened on.
    pub game_directory: String,

    /// The version string from `ffxivgame.ver`, if present.
    pub version: Option<String>,

    /// Repositories in the game directory, base first.
    pub repositories: Vec<Repository>,

    /// Resolves virtual paths to file contents.
    pub pack: Pack,

    /// Caches Excel sheets.
    pub excel: ExcelModule,
}

impl GameData {
    /// Opens a game installation described by `options`.
    pub fn from_options(options: GameDataOptions) -> Result<GameData, Error> {
        if options.platform != Platform::Win32 {
            return Err(Error::UnsupportedPlatform {
                platform: options.platform,
            });
        }

        let directory = match options.path {
            Some(path) => path,
            None => {
                std::env::var(GAME_PATH_VARIABLE).map_err(|_| Error::FileNotFound {
                    path: format!("${GAME_PATH_VARIABLE}"),
                })?
            }
        };

        debug!(directory, "Loading game directory");

        if fs::metadata(&directory).is_err() {
            warn!(directory, "Game directory not found");
            return Err(Error::FileNotFound { path: directory });
        }

        let mut version_path = PathBuf::from(&directory);
        version_path.push("ffxivgame.ver");
        let version = read_version(&version_path);

        Ok(GameData {
            repositories: discover_repositories(&directory),
            version,
            pack: Pack::new(&directory, options.platform),
            excel: ExcelModule::new(options.language),
            game_directory: directory,
        })
    }

    /// Opens a game installation at `directory`, with default options.
    pub fn from_existing(platform: Platform, directory: &str) -> Result<GameData, Error> {
        GameData::from_options(GameDataOptions {
            path: Some(directory.to_string()),
            platform,
            ..GameDataOptions::default()
        })
    }

    /// Reads the file at `path` and reconstructs its contents.
    pub fn file_contents(&mut self, path: &str) -> Result<ByteBuffer, Error> {
        self.pack.file_contents(path)
    }

    /// Checks whether `path` exists, without reading it.
    pub fn file_exists(&mut self, path: &str) -> bool {
        self.pack.exists(path)
    }

    /// Reads the file at `path` and parses it as `F`.
    pub fn typed_file<F: ReadableFile>(&mut self, path: &str) -> Result<F, Error> {
        self.pack.typed_file(path)
    }

    /// Returns the sheet called `name`, loading it on first use.
    pub fn sheet(&mut self, name: &str) -> Result<&mut ExcelSheet, Error> {
        self.excel.sheet(&mut self.pack, name)
    }

    /// Returns all known sheet names listed in the root list.
    pub fn sheet_names(&mut self) -> Result<Vec<String>, Error> {
        self.excel.sheet_names(&mut self.pack)
    }
}

/// Collects the base repository and every expansion under `sqpack/`, sorted
/// so the base comes first.
fn discover_repositories(directory: &str) -> Vec<Repository> {
    let mut repositories = Vec::new();

    if let Some(base) = Repository::from_existing_base(directory) {
        repositories.push(base);
    }

    let mut sqpack = PathBuf::from(directory);
    sqpack.push("sqpack");

    if let Ok(entries) = fs::read_dir(&sqpack) {
        for entry in entries.filter_map(Result::ok) {
            if !entry.path().is_dir() {
                continue;
            }

            if let Some(path) = entry.path().to_str() {
                if let Some(expansion) = Repository::from_existing_expansion(path) {
                    repositories.push(expansion);
                }
            }
        }
    }

    repositories.sort();
    repositories
}
