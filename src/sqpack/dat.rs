// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use binrw::{BinRead, BinReaderExt, BinWrite, VecArgs, binread};

use crate::ByteBuffer;
use crate::error::Error;
use crate::model::{MODEL_FILE_HEADER_SIZE, ModelFileHeader};
use crate::sqpack::read_data_block;

/// How a file entry's payload is laid out inside the dat.
#[binread]
#[br(repr = u32)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum FileKind {
    /// Empty entry, usually invalid.
    Empty = 1,
    /// Everything that is not a model or a texture.
    Standard,
    /// Model (.mdl) files.
    Model,
    /// Texture (.tex) files.
    Texture,
}

/// One entry of a standard file's block table.
#[binread]
#[derive(Debug)]
struct StandardBlock {
    /// Offset of the block, relative to the end of the entry header.
    offset: u32,
    /// Size of the block on disk, header included.
    #[allow(dead_code)]
    size: u16,
    #[allow(dead_code)]
    decompressed_size: u16,
}

#[binread]
#[derive(Debug)]
struct StandardInfo {
    #[br(pad_before = 8)]
    block_count: u32,

    #[br(count = block_count)]
    blocks: Vec<StandardBlock>,
}

pub(crate) trait SectionValue<'a>:
    BinRead<Args<'a> = ()> + std::ops::AddAssign + Copy + Default + 'static
{
}

impl<'a, T> SectionValue<'a> for T where
    T: BinRead<Args<'a> = ()> + std::ops::AddAssign + Copy + Default + 'static
{
}

/// One value per model section: the stack and runtime tables, then vertex,
/// edge-geometry and index buffers for each of the three LODs.
#[binread]
#[derive(Debug)]
pub(crate) struct ModelSections<T: for<'a> SectionValue<'a>> {
    pub stack: T,
    pub runtime: T,

    pub vertex_buffer: [T; 3],
    pub edge_geometry_vertex_buffer: [T; 3],
    pub index_buffer: [T; 3],
}

impl<T: for<'a> SectionValue<'a>> ModelSections<T> {
    /// Sums the value across all eleven sections.
    pub(crate) fn total(&self) -> T {
        let mut total: T = T::default();

        total += self.stack;
        total += self.runtime;

        for i in 0..3 {
            total += self.vertex_buffer[i];
            total += self.edge_geometry_vertex_buffer[i];
            total += self.index_buffer[i];
        }

        total
    }
}

#[binread]
#[derive(Debug)]
struct ModelInfo {
    #[allow(dead_code)]
    block_count: u32,
    #[allow(dead_code)]
    used_block_count: u32,
    version: u32,

    #[allow(dead_code)]
    uncompressed_size: ModelSections<u32>,
    #[allow(dead_code)]
    compressed_size: ModelSections<u32>,
    /// Per-section offsets, relative to the end of the entry header.
    offset: ModelSections<u32>,
    #[allow(dead_code)]
    index: ModelSections<u16>,
    /// Per-section block counts.
    count: ModelSections<u16>,

    vertex_declaration_count: u16,
    material_count: u16,
    lod_count: u8,

    #[br(map = |x: u8| x != 0)]
    index_buffer_streaming_enabled: bool,
    #[br(pad_after = 1)]
    #[br(map = |x: u8| x != 0)]
    edge_geometry_enabled: bool,
}

/// One mipmap of a texture entry.
#[binread]
#[derive(Debug)]
struct TextureMip {
    /// Offset of the mip's first block, relative to the end of the entry
    /// header. For the first mip this doubles as the size of the unblocked
    /// texture header region in front of it.
    compressed_offset: u32,
    compressed_size: u32,
    #[allow(dead_code)]
    decompressed_size: u32,

    #[allow(dead_code)]
    block_offset: u32,
    block_count: u32,
}

#[binread]
#[derive(Debug)]
struct TextureInfo {
    #[br(pad_before = 8)]
    mip_count: u32,

    #[br(count = mip_count)]
    mips: Vec<TextureMip>,
}

/// A file entry's header inside the dat. Depending on the kind it is followed
/// by one of three per-kind tables.
#[binread]
#[br(little)]
#[derive(Debug)]
struct FileInfo {
    /// Size of the whole entry header; blocks are addressed relative to its
    /// end.
    size: u32,
    kind: FileKind,
    /// Size of the reconstructed payload.
    file_size: u32,

    #[br(if(kind == FileKind::Standard))]
    standard: Option<StandardInfo>,

    #[br(if(kind == FileKind::Model))]
    model: Option<ModelInfo>,

    #[br(if(kind == FileKind::Texture))]
    texture: Option<TextureInfo>,
}

/// A reference to one open dat file of a shard.
pub(crate) struct DatFile {
    file: std::fs::File,
}

impl DatFile {
    /// Opens an existing dat file.
    pub(crate) fn open(path: &Path) -> Result<DatFile, Error> {
        Ok(DatFile {
            file: std::fs::File::open(path).map_err(|source| Error::Io {
                operation: "open dat file",
                source,
            })?,
        })
    }

    /// Reads the file entry at `offset` (as resolved through an index) and
    /// reconstructs its payload.
    pub(crate) fn read_from_offset(&mut self, offset: u64) -> Result<ByteBuffer, Error> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| Error::Io {
                operation: "seek to dat entry",
                source,
            })?;

        let file_info = FileInfo::read(&mut self.file).map_err(|_| Error::InvalidDat {
            offset,
            reason: "malformed entry header",
        })?;

        let data = match file_info.kind {
            FileKind::Empty => {
                return Err(Error::InvalidDat {
                    offset,
                    reason: "empty file entry",
                });
            }
            FileKind::Standard => self.read_standard_file(offset, &file_info)?,
            FileKind::Model => self.read_model_file(offset, &file_info)?,
            FileKind::Texture => self.read_texture_file(offset, &file_info)?,
        };

        // Every kind declares the exact reconstructed size up front.
        if data.len() != file_info.file_size as usize {
            return Err(Error::InvalidDat {
                offset,
                reason: "reconstructed size mismatch",
            });
        }

        Ok(data)
    }

    fn read_standard_file(&mut self, offset: u64, file_info: &FileInfo) -> Result<ByteBuffer, Error> {
        let Some(standard) = &file_info.standard else {
            return Err(Error::InvalidDat {
                offset,
                reason: "missing standard block table",
            });
        };

        let base = offset + file_info.size as u64;
        let mut data: Vec<u8> = Vec::with_capacity(file_info.file_size as usize);

        for block in &standard.blocks {
            data.append(&mut read_data_block(
                &mut self.file,
                base + block.offset as u64,
            )?);
        }

        Ok(data)
    }

    /// Re-assembles a model payload: a synthetic header at 0x0, then the
    /// eleven sections in their fixed order.
    fn read_model_file(&mut self, offset: u64, file_info: &FileInfo) -> Result<ByteBuffer, Error> {
        let Some(model) = &file_info.model else {
            return Err(Error::InvalidDat {
                offset,
                reason: "missing model block table",
            });
        };

        let base = offset + file_info.size as u64;

        // The on-disk size of every block follows the entry header; blocks of
        // a section sit back to back, so these sizes chain them together.
        let total_blocks = model.count.total();
        let block_sizes: Vec<u16> = self
            .file
            .read_le_args(VecArgs::builder().count(total_blocks as usize).finalize())
            .map_err(|_| Error::InvalidDat {
                offset,
                reason: "short model block size table",
            })?;

        let mut buffer = Cursor::new(Vec::new());
        buffer
            .seek(SeekFrom::Start(MODEL_FILE_HEADER_SIZE))
            .map_err(|source| Error::Io {
                operation: "seek in model buffer",
                source,
            })?;

        let mut next_block = 0usize;
        let mut read_section = |file: &mut std::fs::File,
                                buffer: &mut Cursor<Vec<u8>>,
                                section_offset: u32,
                                block_count: u16|
         -> Result<u32, Error> {
            let section_start = buffer.position();
            let mut position = base + section_offset as u64;

            for _ in 0..block_count {
                let data = read_data_block(&mut *file, position)?;
                buffer.write_all(&data).map_err(|source| Error::Io {
                    operation: "write to model buffer",
                    source,
                })?;

                let Some(size) = block_sizes.get(next_block) else {
                    return Err(Error::InvalidDat {
                        offset,
                        reason: "model block count exceeds size table",
                    });
                };
                position += *size as u64;
                next_block += 1;
            }

            Ok((buffer.position() - section_start) as u32)
        };

        let stack_size = read_section(&mut self.file, &mut buffer, model.offset.stack, model.count.stack)?;
        let runtime_size = read_section(
            &mut self.file,
            &mut buffer,
            model.offset.runtime,
            model.count.runtime,
        )?;

        let mut vertex_offsets: [u32; 3] = [0; 3];
        let mut vertex_sizes: [u32; 3] = [0; 3];
        let mut index_offsets: [u32; 3] = [0; 3];
        let mut index_sizes: [u32; 3] = [0; 3];

        for lod in 0..3 {
            if model.count.vertex_buffer[lod] != 0 {
                vertex_offsets[lod] = buffer.position() as u32;
                vertex_sizes[lod] = read_section(
                    &mut self.file,
                    &mut buffer,
                    model.offset.vertex_buffer[lod],
                    model.count.vertex_buffer[lod],
                )?;
            }

            // Edge geometry bytes are carried, but the header doesn't track
            // where they land.
            if model.count.edge_geometry_vertex_buffer[lod] != 0 {
                read_section(
                    &mut self.file,
                    &mut buffer,
                    model.offset.edge_geometry_vertex_buffer[lod],
                    model.count.edge_geometry_vertex_buffer[lod],
                )?;
            }

            if model.count.index_buffer[lod] != 0 {
                index_offsets[lod] = buffer.position() as u32;
                index_sizes[lod] = read_section(
                    &mut self.file,
                    &mut buffer,
                    model.offset.index_buffer[lod],
                    model.count.index_buffer[lod],
                )?;
            }
        }

        let header = ModelFileHeader {
            version: model.version,
            stack_size,
            runtime_size,
            vertex_declaration_count: model.vertex_declaration_count,
            material_count: model.material_count,
            vertex_offsets,
            index_offsets,
            vertex_buffer_size: vertex_sizes,
            index_buffer_size: index_sizes,
            lod_count: model.lod_count,
            index_buffer_streaming_enabled: model.index_buffer_streaming_enabled,
            has_edge_geometry: model.edge_geometry_enabled,
        };

        buffer
            .seek(SeekFrom::Start(0))
            .map_err(|source| Error::Io {
                operation: "seek in model buffer",
                source,
            })?;
        header.write(&mut buffer).map_err(|_| Error::InvalidDat {
            offset,
            reason: "model header write failed",
        })?;

        Ok(buffer.into_inner())
    }

    /// Re-assembles a texture payload: the unblocked texture header region
    /// first, then every mip's blocks in mip order.
    fn read_texture_file(&mut self, offset: u64, file_info: &FileInfo) -> Result<ByteBuffer, Error> {
        let Some(texture) = &file_info.texture else {
            return Err(Error::InvalidDat {
                offset,
                reason: "missing texture mip table",
            });
        };

        let base = offset + file_info.size as u64;

        // Like models, per-block on-disk sizes follow the mip table.
        let total_blocks: u32 = texture.mips.iter().map(|mip| mip.block_count).sum();
        let block_sizes: Vec<u16> = self
            .file
            .read_le_args(VecArgs::builder().count(total_blocks as usize).finalize())
            .map_err(|_| Error::InvalidDat {
                offset,
                reason: "short texture block size table",
            })?;

        let mut data: Vec<u8> = Vec::with_capacity(file_info.file_size as usize);

        // The texture header region is stored unblocked in front of the first
        // mip's data.
        if let Some(first_mip) = texture.mips.first() {
            if first_mip.compressed_size != 0 {
                self.file
                    .seek(SeekFrom::Start(base))
                    .map_err(|source| Error::Io {
                        operation: "seek to texture header",
                        source,
                    })?;

                let mut header = vec![0u8; first_mip.compressed_offset as usize];
                self.file
                    .read_exact(&mut header)
                    .map_err(|source| Error::Io {
                        operation: "read texture header",
                        source,
                    })?;

                data.append(&mut header);
            }
        }

        let mut next_block = 0usize;
        for mip in &texture.mips {
            let mut position = base + mip.compressed_offset as u64;

            for _ in 0..mip.block_count {
                data.append(&mut read_data_block(&mut self.file, position)?);

                let Some(size) = block_sizes.get(next_block) else {
                    return Err(Error::InvalidDat {
                        offset,
                        reason: "texture block count exceeds size table",
                    });
                };
                position += *size as u64;
                next_block += 1;
            }
        }

        Ok(data)
    }
}
