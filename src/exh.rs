// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Excel sheet headers, usually with the `.exh` file extension.
//!
//! The header is the schema of a sheet: its columns, how its rows are split
//! into pages, and which languages it is available in. Unlike the SqPack
//! containers, all Excel files are big-endian.

use std::io::Cursor;

use binrw::{BinRead, binread};

use crate::common::Language;
use crate::{ByteSpan, ReadableFile};

/// How rows of a sheet are laid out.
#[binread]
#[br(repr = u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SheetVariant {
    /// One record per row id.
    Default = 1,
    /// Each row carries multiple sub-records.
    SubRows = 2,
}

/// The data type of one column.
#[binread]
#[br(repr = u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnDataType {
    String = 0x0,
    Bool = 0x1,
    Int8 = 0x2,
    UInt8 = 0x3,
    Int16 = 0x4,
    UInt16 = 0x5,
    Int32 = 0x6,
    UInt32 = 0x7,
    Float32 = 0x9,
    Int64 = 0xA,
    UInt64 = 0xB,

    PackedBool0 = 0x19,
    PackedBool1 = 0x1A,
    PackedBool2 = 0x1B,
    PackedBool3 = 0x1C,
    PackedBool4 = 0x1D,
    PackedBool5 = 0x1E,
    PackedBool6 = 0x1F,
    PackedBool7 = 0x20,
}

/// Describes one column: its type and its byte offset inside the row.
#[binread]
#[derive(Debug, Copy, Clone)]
pub struct ColumnDefinition {
    pub data_type: ColumnDataType,
    pub offset: u16,
}

/// Describes one page: the contiguous row id range stored in one `.exd` file.
///
/// Page definitions are sorted ascending on `start_id` and their ranges do
/// not overlap.
#[binread]
#[derive(Debug, Copy, Clone)]
pub struct PageDefinition {
    pub start_id: u32,
    pub row_count: u32,
}

/// The parsed schema of one Excel sheet.
#[binread]
#[br(big, magic = b"EXHF")]
#[derive(Debug, Clone)]
pub struct ExcelHeader {
    #[allow(dead_code)]
    pub(crate) version: u16,

    /// The size of a row's fixed part; string data sits past it.
    pub row_size: u16,
    pub(crate) column_count: u16,
    pub(crate) page_count: u16,
    pub(crate) language_count: u16,

    #[br(pad_before = 3)]
    pub variant: SheetVariant,

    /// Total number of rows across all pages.
    #[br(pad_before = 2, pad_after = 8)]
    pub row_total: u32,

    #[br(count = column_count)]
    pub columns: Vec<ColumnDefinition>,

    #[br(count = page_count)]
    pub pages: Vec<PageDefinition>,

    #[br(count = language_count)]
    pub languages: Vec<Language>,
}

impl ReadableFile for ExcelHeader {
    fn from_existing(buffer: ByteSpan) -> Option<Self> {
        ExcelHeader::read(&mut Cursor::new(buffer)).ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds EXHF bytes for the given schema, the way they sit inside `exd/`.
    pub(crate) fn header_bytes(
        row_size: u16,
        variant: u8,
        columns: &[(u16, u16)],
        pages: &[(u32, u32)],
        languages: &[u8],
    ) -> Vec<u8> {
        let row_total: u32 = pages.iter().map(|(_, count)| count).sum();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"EXHF");
        bytes.extend_from_slice(&3u16.to_be_bytes()); // version
        bytes.extend_from_slice(&row_size.to_be_bytes());
        bytes.extend_from_slice(&(columns.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&(pages.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&(languages.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&[0; 3]);
        bytes.push(variant);
        bytes.extend_from_slice(&[0; 2]);
        bytes.extend_from_slice(&row_total.to_be_bytes());
        bytes.extend_from_slice(&[0; 8]);

        for (data_type, offset) in columns {
            bytes.extend_from_slice(&data_type.to_be_bytes());
            bytes.extend_from_slice(&offset.to_be_bytes());
        }
        for (start_id, row_count) in pages {
            bytes.extend_from_slice(&start_id.to_be_bytes());
            bytes.extend_from_slice(&row_count.to_be_bytes());
        }
        bytes.extend_from_slice(languages);

        bytes
    }

    #[test]
    fn parse_header() {
        let bytes = header_bytes(
            8,
            1,
            &[(0x7, 0), (0x0, 4)],
            &[(1, 3), (10, 2)],
            &[0x01, 0x02],
        );

        let header = ExcelHeader::from_existing(&bytes).unwrap();

        assert_eq!(header.row_size, 8);
        assert_eq!(header.variant, SheetVariant::Default);
        assert_eq!(header.row_total, 5);

        assert_eq!(header.columns.len(), 2);
        assert_eq!(header.columns[0].data_type, ColumnDataType::UInt32);
        assert_eq!(header.columns[1].data_type, ColumnDataType::String);
        assert_eq!(header.columns[1].offset, 4);

        assert_eq!(header.pages.len(), 2);
        assert_eq!(header.pages[1].start_id, 10);
        assert_eq!(header.pages[1].row_count, 2);

        assert_eq!(
            header.languages,
            vec![Language::Japanese, Language::English]
        );
    }

    #[test]
    fn parse_subrow_variant() {
        let bytes = header_bytes(2, 2, &[(0x4, 0)], &[(0, 4)], &[0x00]);

        let header = ExcelHeader::from_existing(&bytes).unwrap();
        assert_eq!(header.variant, SheetVariant::SubRows);
        assert_eq!(header.languages, vec![Language::None]);
    }

    #[test]
    fn reject_bad_magic() {
        let mut bytes = header_bytes(2, 1, &[], &[], &[]);
        bytes[0] = b'X';

        assert!(ExcelHeader::from_existing(&bytes).is_none());
    }

    #[test]
    fn reject_short_read() {
        let bytes = header_bytes(8, 1, &[(0x7, 0)], &[(1, 3)], &[0x00]);

        assert!(ExcelHeader::from_existing(&bytes[..bytes.len() - 2]).is_none());
    }
}
