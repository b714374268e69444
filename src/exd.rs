// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Excel data pages, usually with the `.exd` file extension.
//!
//! A page holds the rows of one id range of a sheet: a table of
//! `(row_id, offset)` locators followed by the raw row data. Each row starts
//! with a 6-byte preamble giving its data size and sub-record count.

use std::collections::HashMap;
use std::io::Cursor;

use binrw::{BinRead, binread};

use crate::ByteSpan;

#[binread]
#[br(big, magic = b"EXDF")]
#[derive(Debug)]
struct PageHeader {
    #[allow(dead_code)]
    version: u16,

    #[br(pad_before = 2)]
    index_size: u32,
    #[br(pad_after = 16)]
    data_size: u32,
}

/// The size of [PageHeader] on disk, which is where the locator table starts.
const PAGE_HEADER_SIZE: u32 = 32;

/// Points at one row: its id, and the absolute offset of its preamble in the
/// page file.
#[binread]
#[br(big)]
#[derive(Debug, Copy, Clone)]
pub(crate) struct RowLocator {
    pub row_id: u32,
    pub offset: u32,
}

const ROW_LOCATOR_WIDTH: u32 = 8;

/// The 6-byte preamble in front of every row's data.
#[binread]
#[br(big)]
#[derive(Debug)]
struct RowPreamble {
    data_size: u32,
    row_count: u16,
}

const ROW_PREAMBLE_SIZE: usize = 6;

/// A borrowed view of one row's bytes inside a page.
#[derive(Debug, Copy, Clone)]
pub(crate) struct RawRow<'a> {
    pub row_id: u32,
    /// Number of sub-records; 1 for sheets without subrows.
    pub subrow_count: u16,
    pub data: &'a [u8],
}

/// One loaded page of a sheet.
pub struct ExcelPage {
    start_id: u32,
    locators: Vec<RowLocator>,

    /// Positions of rows whose id is not `start_id + index`; everything else
    /// is found without it.
    row_to_index: HashMap<u32, usize>,

    data_start: u32,
    raw_sheet_data: Vec<u8>,
}

impl ExcelPage {
    /// Parses a page file. `start_id` is the first row id of the page's
    /// definition in the sheet header, which anchors the direct row lookup.
    ///
    /// Every locator is validated here, so lookups afterwards cannot run out
    /// of bounds. Returns `None` for malformed pages.
    pub fn from_existing(buffer: ByteSpan, start_id: u32) -> Option<ExcelPage> {
        let mut cursor = Cursor::new(buffer);
        let header = PageHeader::read(&mut cursor).ok()?;

        let locator_count = header.index_size / ROW_LOCATOR_WIDTH;
        let mut locators = Vec::with_capacity(locator_count as usize);
        for _ in 0..locator_count {
            locators.push(RowLocator::read(&mut cursor).ok()?);
        }

        let data_start = PAGE_HEADER_SIZE.checked_add(header.index_size)?;
        let raw_sheet_data = buffer
            .get(data_start as usize..data_start as usize + header.data_size as usize)?
            .to_vec();

        let mut page = ExcelPage {
            start_id,
            locators,
            row_to_index: HashMap::new(),
            data_start,
            raw_sheet_data,
        };

        let mut previous_id = None;
        for (index, locator) in page.locators.iter().enumerate() {
            // Row ids are strictly increasing within a page.
            if previous_id.is_some_and(|previous| locator.row_id <= previous) {
                return None;
            }
            previous_id = Some(locator.row_id);

            // Check the preamble is addressable now, so row reads can't fail.
            page.preamble_at(locator.offset)?;

            if locator.row_id != start_id.checked_add(index as u32)? {
                page.row_to_index.insert(locator.row_id, index);
            }
        }

        Some(page)
    }

    fn preamble_at(&self, offset: u32) -> Option<(RowPreamble, usize)> {
        let position = offset.checked_sub(self.data_start)? as usize;
        let bytes = self
            .raw_sheet_data
            .get(position..position + ROW_PREAMBLE_SIZE)?;

        let preamble = RowPreamble::read(&mut Cursor::new(bytes)).ok()?;

        let data_end = (position + ROW_PREAMBLE_SIZE).checked_add(preamble.data_size as usize)?;
        if data_end > self.raw_sheet_data.len() {
            return None;
        }

        Some((preamble, position + ROW_PREAMBLE_SIZE))
    }

    fn row_at_locator(&self, index: usize) -> Option<RawRow<'_>> {
        let locator = self.locators.get(index)?;
        let (preamble, data_position) = self.preamble_at(locator.offset)?;

        Some(RawRow {
            row_id: locator.row_id,
            subrow_count: preamble.row_count,
            data: &self.raw_sheet_data[data_position..data_position + preamble.data_size as usize],
        })
    }

    /// Finds the row with `row_id`, trying the direct index before the
    /// fallback map. `None` is a genuine miss, a hole in the page's id range.
    pub(crate) fn row(&self, row_id: u32) -> Option<RawRow<'_>> {
        if let Some(index) = row_id.checked_sub(self.start_id) {
            let index = index as usize;
            if index < self.locators.len() && self.locators[index].row_id == row_id {
                return self.row_at_locator(index);
            }
        }

        self.row_at_locator(*self.row_to_index.get(&row_id)?)
    }

    /// Returns the row at `index` in locator order.
    pub(crate) fn row_at(&self, index: usize) -> Option<RawRow<'_>> {
        self.row_at_locator(index)
    }

    /// The number of rows actually present in this page.
    pub fn row_count(&self) -> usize {
        self.locators.len()
    }
}
