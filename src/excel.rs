// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Higher-level Excel API.
//!
//! [ExcelModule] caches [ExcelSheet]s by name; a sheet resolves its language,
//! loads pages on first touch and hands out [ExcelRow] views that borrow the
//! row bytes straight out of the page cache.
//!
//! ```no_run
//! # use aetherite::gamedata::{GameData, GameDataOptions};
//! let mut game = GameData::from_options(GameDataOptions::default())?;
//! let sheet = game.excel.sheet(&mut game.pack, "Item")?;
//! let row = sheet.row(&mut game.pack, 1)?;
//! println!("{:?}", row.field(0));
//! # Ok::<(), aetherite::Error>(())
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Cursor;

use binrw::BinReaderExt;
use tracing::debug;

use crate::common::Language;
use crate::error::Error;
use crate::exd::{ExcelPage, RawRow};
use crate::exh::{ColumnDataType, ColumnDefinition, ExcelHeader, SheetVariant};
use crate::exl::ExcelList;
use crate::sqpack::Pack;

/// Contains a single column's data, which can be various underlying types.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// String.
    String(String),
    /// Boolean, both the plain and the bit-packed column types.
    Bool(bool),
    /// 8-bit signed integer.
    Int8(i8),
    /// 8-bit unsigned integer.
    UInt8(u8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit unsigned integer.
    UInt64(u64),
}

impl Field {
    /// Returns a `Some(String)` if this column was a `String`, otherwise `None`.
    pub fn into_string(&self) -> Option<&String> {
        if let Field::String(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(bool)` if this column was a `Bool`, otherwise `None`.
    pub fn into_bool(&self) -> Option<&bool> {
        if let Field::Bool(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(i8)` if this column was a `Int8`, otherwise `None`.
    pub fn into_i8(&self) -> Option<&i8> {
        if let Field::Int8(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(u8)` if this column was a `UInt8`, otherwise `None`.
    pub fn into_u8(&self) -> Option<&u8> {
        if let Field::UInt8(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(i16)` if this column was a `Int16`, otherwise `None`.
    pub fn into_i16(&self) -> Option<&i16> {
        if let Field::Int16(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(u16)` if this column was a `UInt16`, otherwise `None`.
    pub fn into_u16(&self) -> Option<&u16> {
        if let Field::UInt16(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(i32)` if this column was a `Int32`, otherwise `None`.
    pub fn into_i32(&self) -> Option<&i32> {
        if let Field::Int32(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(u32)` if this column was a `UInt32`, otherwise `None`.
    pub fn into_u32(&self) -> Option<&u32> {
        if let Field::UInt32(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(f32)` if this column was a `Float32`, otherwise `None`.
    pub fn into_f32(&self) -> Option<&f32> {
        if let Field::Float32(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(i64)` if this column was a `Int64`, otherwise `None`.
    pub fn into_i64(&self) -> Option<&i64> {
        if let Field::Int64(value) = self {
            return Some(value);
        }
        None
    }

    /// Returns a `Some(u64)` if this column was a `UInt64`, otherwise `None`.
    pub fn into_u64(&self) -> Option<&u64> {
        if let Field::UInt64(value) = self {
            return Some(value);
        }
        None
    }
}

/// A non-owning view of one row. The bytes live in the sheet's page cache,
/// so the view cannot outlive the sheet.
#[derive(Debug, Copy, Clone)]
pub struct ExcelRow<'a> {
    /// The row's id.
    pub row_id: u32,
    /// Number of sub-records in this row; 1 unless the sheet has subrows.
    pub subrow_count: u16,
    /// The raw row bytes: the fixed columns, then string data.
    pub data: &'a [u8],

    columns: &'a [ColumnDefinition],
    row_size: u16,
    variant: SheetVariant,
}

impl ExcelRow<'_> {
    /// Decodes one column of this row.
    ///
    /// For subrow sheets this reads the first sub-record. Returns `None` when
    /// the column doesn't exist or the row data is too short for it.
    pub fn field(&self, column: usize) -> Option<Field> {
        self.subrow_field(0, column)
    }

    /// Decodes one column of the sub-record `subrow`.
    ///
    /// Subrow sheets cannot carry strings, so a string column in one returns
    /// `None`.
    pub fn subrow_field(&self, subrow: u16, column: usize) -> Option<Field> {
        let column = self.columns.get(column)?;

        let base = match self.variant {
            SheetVariant::Default => {
                if subrow != 0 {
                    return None;
                }
                0usize
            }
            // Each sub-record is prefixed with its 2-byte id.
            SheetVariant::SubRows => {
                if subrow >= self.subrow_count {
                    return None;
                }
                (subrow as usize) * (self.row_size as usize + 2) + 2
            }
        };

        let mut cursor = Cursor::new(self.data);
        cursor.set_position((base + column.offset as usize) as u64);

        let mut read_packed_bool = |shift: u8| -> Option<bool> {
            let flags: u8 = cursor.read_be().ok()?;
            Some(flags & (1 << shift) != 0)
        };

        match column.data_type {
            ColumnDataType::String => {
                if self.variant == SheetVariant::SubRows {
                    return None;
                }

                let string_offset: u32 = cursor.read_be().ok()?;
                let heap = self
                    .data
                    .get(self.row_size as usize + string_offset as usize..)?;
                let end = heap.iter().position(|&byte| byte == 0)?;

                Some(Field::String(
                    String::from_utf8_lossy(&heap[..end]).into_owned(),
                ))
            }
            ColumnDataType::Bool => {
                let value: u8 = cursor.read_be().ok()?;
                Some(Field::Bool(value != 0))
            }
            ColumnDataType::Int8 => Some(Field::Int8(cursor.read_be().ok()?)),
            ColumnDataType::UInt8 => Some(Field::UInt8(cursor.read_be().ok()?)),
            ColumnDataType::Int16 => Some(Field::Int16(cursor.read_be().ok()?)),
            ColumnDataType::UInt16 => Some(Field::UInt16(cursor.read_be().ok()?)),
            ColumnDataType::Int32 => Some(Field::Int32(cursor.read_be().ok()?)),
            ColumnDataType::UInt32 => Some(Field::UInt32(cursor.read_be().ok()?)),
            ColumnDataType::Float32 => Some(Field::Float32(cursor.read_be().ok()?)),
            ColumnDataType::Int64 => Some(Field::Int64(cursor.read_be().ok()?)),
            ColumnDataType::UInt64 => Some(Field::UInt64(cursor.read_be().ok()?)),
            ColumnDataType::PackedBool0 => Some(Field::Bool(read_packed_bool(0)?)),
            ColumnDataType::PackedBool1 => Some(Field::Bool(read_packed_bool(1)?)),
            ColumnDataType::PackedBool2 => Some(Field::Bool(read_packed_bool(2)?)),
            ColumnDataType::PackedBool3 => Some(Field::Bool(read_packed_bool(3)?)),
            ColumnDataType::PackedBool4 => Some(Field::Bool(read_packed_bool(4)?)),
            ColumnDataType::PackedBool5 => Some(Field::Bool(read_packed_bool(5)?)),
            ColumnDataType::PackedBool6 => Some(Field::Bool(read_packed_bool(6)?)),
            ColumnDataType::PackedBool7 => Some(Field::Bool(read_packed_bool(7)?)),
        }
    }
}

/// One sheet of tabular data.
///
/// A sheet knows its schema up front; pages load lazily and stay cached for
/// the sheet's lifetime. A page that failed to load is retried on the next
/// access.
pub struct ExcelSheet {
    name: String,
    language: Language,
    header: ExcelHeader,
    pages: Vec<Option<ExcelPage>>,
}

impl ExcelSheet {
    pub(crate) fn new(pack: &mut Pack, name: &str, preferred: Language) -> Result<ExcelSheet, Error> {
        let header: ExcelHeader = pack.typed_file(&format!("exd/{name}.exh"))?;

        let language =
            choose_language(&header.languages, preferred).ok_or_else(|| Error::LanguageNotFound {
                sheet: name.to_string(),
            })?;

        let pages = header.pages.iter().map(|_| None).collect();

        debug!(name, ?language, "Loaded sheet");

        Ok(ExcelSheet {
            name: name.to_string(),
            language,
            header,
            pages,
        })
    }

    /// The sheet's schema.
    pub fn header(&self) -> &ExcelHeader {
        &self.header
    }

    /// The language this sheet resolved to.
    pub fn language(&self) -> Language {
        self.language
    }

    /// The total number of rows, summed over the page definitions.
    pub fn row_count(&self) -> u32 {
        self.header.pages.iter().map(|page| page.row_count).sum()
    }

    /// Looks up the row with id `row_id`, loading its page if needed.
    pub fn row(&mut self, pack: &mut Pack, row_id: u32) -> Result<ExcelRow<'_>, Error> {
        let page_index = self
            .page_for_row(row_id)
            .ok_or(Error::RowNotFound { row_id })?;

        self.ensure_page(pack, page_index)?;

        let Some(page) = &self.pages[page_index] else {
            return Err(Error::InvalidPageIndex {
                sheet: self.name.clone(),
                index: page_index,
            });
        };

        let raw = page.row(row_id).ok_or(Error::RowNotFound { row_id })?;
        Ok(self.wrap(raw))
    }

    /// Returns the `index`-th row of the sheet, counting across pages in
    /// order. O(pages), then a direct lookup within the page.
    pub fn row_at_index(&mut self, pack: &mut Pack, index: usize) -> Result<ExcelRow<'_>, Error> {
        let mut accumulated = 0usize;
        let mut target = None;

        for (page_index, definition) in self.header.pages.iter().enumerate() {
            let count = definition.row_count as usize;
            if index < accumulated + count {
                target = Some((page_index, index - accumulated));
                break;
            }
            accumulated += count;
        }

        let Some((page_index, local_index)) = target else {
            return Err(Error::InvalidPageIndex {
                sheet: self.name.clone(),
                index,
            });
        };

        self.ensure_page(pack, page_index)?;

        let Some(page) = &self.pages[page_index] else {
            return Err(Error::InvalidPageIndex {
                sheet: self.name.clone(),
                index: page_index,
            });
        };

        let raw = page.row_at(local_index).ok_or(Error::InvalidPageIndex {
            sheet: self.name.clone(),
            index,
        })?;
        Ok(self.wrap(raw))
    }

    /// Iterates every row in `(page order, row order)`. All pages are loaded
    /// up front so the iterator itself cannot fail.
    pub fn rows(&mut self, pack: &mut Pack) -> Result<RowIterator<'_>, Error> {
        for index in 0..self.pages.len() {
            self.ensure_page(pack, index)?;
        }

        Ok(RowIterator {
            sheet: self,
            page: 0,
            row: 0,
        })
    }

    /// Binary-searches the page definitions for the one covering `row_id`.
    fn page_for_row(&self, row_id: u32) -> Option<usize> {
        let pages = &self.header.pages;
        let candidate = pages
            .partition_point(|page| page.start_id <= row_id)
            .checked_sub(1)?;

        let definition = &pages[candidate];
        if row_id - definition.start_id < definition.row_count {
            Some(candidate)
        } else {
            None
        }
    }

    fn ensure_page(&mut self, pack: &mut Pack, index: usize) -> Result<(), Error> {
        if index >= self.pages.len() {
            return Err(Error::InvalidPageIndex {
                sheet: self.name.clone(),
                index,
            });
        }

        if self.pages[index].is_some() {
            return Ok(());
        }

        let definition = self.header.pages[index];
        let path = page_path(&self.name, self.language, definition.start_id);

        let bytes = pack.file_contents(&path)?;
        let page = ExcelPage::from_existing(&bytes, definition.start_id).ok_or_else(|| {
            Error::CorruptExcel { path: path.clone() }
        })?;

        debug!(sheet = %self.name, start_id = definition.start_id, "Loaded page");

        self.pages[index] = Some(page);
        Ok(())
    }

    fn wrap<'a>(&'a self, raw: RawRow<'a>) -> ExcelRow<'a> {
        ExcelRow {
            row_id: raw.row_id,
            subrow_count: raw.subrow_count,
            data: raw.data,
            columns: &self.header.columns,
            row_size: self.header.row_size,
            variant: self.header.variant,
        }
    }
}

/// The path of one page file, like "exd/item_0_en.exd". Language-agnostic
/// sheets carry no language tag.
fn page_path(name: &str, language: Language, start_id: u32) -> String {
    match language {
        Language::None => format!("exd/{name}_{start_id}.exd"),
        language => format!("exd/{name}_{start_id}_{}.exd", language.code()),
    }
}

/// The documented fallback chain: the preferred language when the sheet has
/// it, the language-agnostic data otherwise.
fn choose_language(available: &[Language], preferred: Language) -> Option<Language> {
    if available.contains(&preferred) {
        return Some(preferred);
    }

    if available.contains(&Language::None) {
        return Some(Language::None);
    }

    None
}

/// Iterates the rows of a sheet across its pages.
pub struct RowIterator<'a> {
    sheet: &'a ExcelSheet,
    page: usize,
    row: usize,
}

impl<'a> Iterator for RowIterator<'a> {
    type Item = ExcelRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let page = self.sheet.pages.get(self.page)?.as_ref()?;

            if let Some(raw) = page.row_at(self.row) {
                self.row += 1;
                return Some(self.sheet.wrap(raw));
            }

            self.page += 1;
            self.row = 0;
        }
    }
}

/// Owns every sheet loaded so far, keyed by case-folded name.
pub struct ExcelModule {
    /// The language requested for sheet loads.
    pub default_language: Language,

    sheets: HashMap<String, ExcelSheet>,
}

impl ExcelModule {
    /// Creates an empty module that loads sheets in `default_language`.
    pub fn new(default_language: Language) -> ExcelModule {
        ExcelModule {
            default_language,
            sheets: HashMap::new(),
        }
    }

    /// Returns the sheet called `name`, loading its header on first use.
    /// Sheet names are case-insensitive.
    pub fn sheet<'a>(&'a mut self, pack: &mut Pack, name: &str) -> Result<&'a mut ExcelSheet, Error> {
        match self.sheets.entry(name.to_lowercase()) {
            Entry::Occupied(occupied) => Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => {
                let sheet = ExcelSheet::new(pack, vacant.key(), self.default_language)?;
                Ok(vacant.insert(sheet))
            }
        }
    }

    /// Returns all known sheet names listed in the root list.
    pub fn sheet_names(&self, pack: &mut Pack) -> Result<Vec<String>, Error> {
        let root_list: ExcelList = pack.typed_file("exd/root.exl")?;

        Ok(root_list.entries.into_iter().map(|(name, _)| name).collect())
    }
}
