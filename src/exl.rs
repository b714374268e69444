// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Excel list files, usually with the `.exl` file extension.
//!
//! `exd/root.exl` lists every sheet available in-game.

use std::io::{BufRead, BufReader, Cursor};

use crate::{ByteSpan, ReadableFile};

/// The parsed contents of an Excel list.
#[derive(Debug)]
pub struct ExcelList {
    /// The version of the list.
    pub version: i32,

    /// Sheet names with their assigned ids. Unnamed sheets have an id of -1.
    pub entries: Vec<(String, i32)>,
}

impl ReadableFile for ExcelList {
    fn from_existing(buffer: ByteSpan) -> Option<Self> {
        let mut list = ExcelList {
            version: 0,
            entries: Vec::new(),
        };

        let reader = BufReader::new(Cursor::new(buffer));
        for line in reader.lines().map_while(Result::ok) {
            let Some((name, value)) = line.split_once(',') else {
                continue;
            };
            let Ok(parsed_value) = value.trim().parse() else {
                continue;
            };

            if name == "EXLT" {
                list.version = parsed_value;
            } else if !name.starts_with('#') {
                list.entries.push((name.to_string(), parsed_value));
            }
        }

        Some(list)
    }
}

impl ExcelList {
    /// Checks whether the list contains the sheet named `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common_setup() -> ExcelList {
        let contents = b"EXLT,2\nAchievement,209\nItem,-1\n#Commented,5\n";

        ExcelList::from_existing(contents).unwrap()
    }

    #[test]
    fn version_parsing() {
        assert_eq!(common_setup().version, 2);
    }

    #[test]
    fn entries() {
        let list = common_setup();

        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0], ("Achievement".to_string(), 209));
        assert_eq!(list.entries[1], ("Item".to_string(), -1));
    }

    #[test]
    fn contains() {
        let list = common_setup();

        assert!(list.contains("Achievement"));
        assert!(!list.contains("Commented"));
        assert!(!list.contains("Cid"));
    }
}
