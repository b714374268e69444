// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! The leader in front of reconstructed model files.
//!
//! Model payloads come out of the dat fragmented into sections; the reader
//! re-assembles them and prefixes this header so downstream model decoders
//! see the same bytes an unpacked `.mdl` file would start with. Decoding the
//! geometry itself is their job, not ours.

use binrw::binrw;

/// The size of [ModelFileHeader] on disk.
pub const MODEL_FILE_HEADER_SIZE: u64 = 0x44;

/// The first 0x44 bytes of every `.mdl` file, summarizing the sections that
/// follow.
#[binrw]
#[brw(little)]
#[derive(Debug)]
pub struct ModelFileHeader {
    pub version: u32,

    pub stack_size: u32,
    pub runtime_size: u32,

    pub vertex_declaration_count: u16,
    pub material_count: u16,

    pub vertex_offsets: [u32; 3],
    pub index_offsets: [u32; 3],
    pub vertex_buffer_size: [u32; 3],
    pub index_buffer_size: [u32; 3],

    pub lod_count: u8,

    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| -> u8 { if *x { 1 } else { 0 } })]
    pub index_buffer_streaming_enabled: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| -> u8 { if *x { 1 } else { 0 } })]
    #[brw(pad_after = 1)]
    pub has_edge_geometry: bool,
}
