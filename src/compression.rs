// SPDX-FileCopyrightText: 2026 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::ptr::null_mut;

use libz_rs_sys::*;

/// Inflates a raw DEFLATE stream (no zlib header, no checksum) into
/// `out_data`, which must be sized to the block's declared uncompressed size.
///
/// Returns false when the stream is malformed or ends before filling the
/// output.
pub(crate) fn inflate_raw(in_data: &mut [u8], out_data: &mut [u8]) -> bool {
    unsafe {
        let mut strm = z_stream {
            next_in: null_mut(),
            avail_in: in_data.len() as u32,
            total_in: 0,
            next_out: null_mut(),
            avail_out: 0,
            total_out: 0,
            msg: null_mut(),
            state: null_mut(),
            zalloc: None,
            zfree: None,
            opaque: null_mut(),
            data_type: 0,
            adler: 0,
            reserved: 0,
        };

        // -15: raw deflate, maximum window
        let ret = inflateInit2_(
            &mut strm,
            -15,
            zlibVersion(),
            core::mem::size_of::<z_stream>() as i32,
        );
        if ret != Z_OK {
            return false;
        }

        strm.next_in = in_data.as_mut_ptr();
        strm.next_out = out_data.as_mut_ptr();
        strm.avail_out = out_data.len() as u32;

        let ret = inflate(&mut strm, Z_NO_FLUSH);
        inflateEnd(&mut strm);

        ret == Z_STREAM_END && strm.avail_out == 0
    }
}
