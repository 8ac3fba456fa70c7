//! The DEFLATE block engine.
//!
//! This module holds the canonical-Huffman table builder, the
//! per-symbol decode routine and the block state machine that drives
//! them, together with the zlib framing layer.
//!
//! Decoding is table driven. Each Huffman code becomes a
//! direct-indexed array of `u32` entries (the format is documented in
//! the constants module); codewords no longer than the root index bits
//! resolve in one lookup, longer ones in two. Blocks are processed in
//! order and output is produced strictly left to right, so a LZ77 copy
//! can always be served from bytes already written.

use log::trace;

use crate::bitstream::BitStreamReader;
use crate::constants::{
    DEFLATE_BLOCKTYPE_DYNAMIC, DEFLATE_BLOCKTYPE_STATIC, DEFLATE_BLOCKTYPE_UNCOMPRESSED,
    DEFLATE_MAX_CODEWORD_LENGTH, DEFLATE_MAX_MATCH_DISTANCE, DEFLATE_MAX_PRE_CODEWORD_LEN,
    DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS, DEFLATE_NUM_PRECODE_SYMS,
    DEFLATE_PRECODE_LENS_PERMUTATION, HUFFDEC_EXCEPTIONAL, HUFFDEC_INVALID_ENTRY,
    HUFFDEC_LITERAL, HUFFDEC_RESERVED, HUFFDEC_SUBTABLE_POINTER, LITLEN_DECODE_RESULTS,
    LITLEN_ENOUGH, LITLEN_TABLE_BITS, OFFSET_DECODE_RESULTS, OFFSET_ENOUGH, OFFSET_TABLE_BITS,
    PRECODE_DECODE_RESULTS, PRECODE_ENOUGH, PRECODE_TABLE_BITS
};
use crate::errors::{InflateError, InflateErrorKind};

/// Options shaping how the decoder allocates and bounds its output.
///
/// ```
/// use tinflate::InflateOptions;
///
/// let options = InflateOptions::default().set_limit(1 << 20);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct InflateOptions
{
    limit:     usize,
    size_hint: Option<usize>
}

impl Default for InflateOptions
{
    fn default() -> InflateOptions
    {
        InflateOptions {
            limit:     usize::MAX,
            size_hint: None
        }
    }
}

impl InflateOptions
{
    /// Hard cap on the decompressed size the growable decode
    /// functions will produce.
    ///
    /// Exceeding it reports `OutputLimitExceeded`. Untrusted input
    /// should always get a limit, otherwise a tiny stream can demand
    /// gigabytes of output.
    pub fn set_limit(mut self, limit: usize) -> InflateOptions
    {
        self.limit = limit;
        self
    }

    /// Expected decompressed size, used to size the first output
    /// allocation of the growable decode functions.
    pub fn set_size_hint(mut self, hint: usize) -> InflateOptions
    {
        self.size_hint = Some(hint);
        self
    }

    pub const fn limit(&self) -> usize
    {
        self.limit
    }
}

/// A DEFLATE/zlib decoder over a fully buffered compressed stream.
///
/// The decoder borrows the compressed bytes and is reusable; every
/// `decode_*` call restarts from the beginning of the input.
pub struct InflateDecoder<'a>
{
    data:                &'a [u8],
    stream:              BitStreamReader<'a>,
    options:             InflateOptions,
    litlen_table:        [u32; LITLEN_ENOUGH],
    offset_table:        [u32; OFFSET_ENOUGH],
    litlen_table_bits:   usize,
    static_codes_loaded: bool,
    bytes_decoded:       usize
}

impl<'a> InflateDecoder<'a>
{
    /// Create a new decoder over `data` with default options.
    pub fn new(data: &'a [u8]) -> InflateDecoder<'a>
    {
        InflateDecoder::new_with_options(data, InflateOptions::default())
    }

    /// Create a new decoder over `data` with the given options.
    pub fn new_with_options(data: &'a [u8], options: InflateOptions) -> InflateDecoder<'a>
    {
        InflateDecoder {
            data,
            options,
            stream: BitStreamReader::new(data),
            litlen_table: [0; LITLEN_ENOUGH],
            offset_table: [0; OFFSET_ENOUGH],
            litlen_table_bits: LITLEN_TABLE_BITS,
            static_codes_loaded: false,
            bytes_decoded: 0
        }
    }

    /// Decode a raw DEFLATE stream into a caller-supplied buffer.
    ///
    /// Returns the number of bytes written. `DecompressedOverflow` is
    /// reported when the buffer cannot hold the output; the buffer
    /// contents past the last completed block are unspecified on
    /// error.
    pub fn decode_deflate_into(&mut self, output: &mut [u8]) -> Result<usize, InflateError>
    {
        if self.data.is_empty()
        {
            return Ok(0);
        }
        self.decode_blocks(self.data, output)
            .map_err(InflateError::new_with_kind)
    }

    /// Decode a raw DEFLATE stream into a freshly allocated buffer.
    ///
    /// On failure the error carries the bytes decoded up to the last
    /// completed block.
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateError>
    {
        if self.data.is_empty()
        {
            return Ok(vec![]);
        }
        self.decode_growable(self.data)
    }

    /// Decode a zlib stream (RFC 1950) into a caller-supplied buffer.
    ///
    /// The two header bytes are validated structurally, the four
    /// Adler-32 trailer bytes are skipped without being checked.
    pub fn decode_zlib_into(&mut self, output: &mut [u8]) -> Result<usize, InflateError>
    {
        if self.data.is_empty()
        {
            return Ok(0);
        }
        let payload = self.zlib_payload().map_err(InflateError::new_with_kind)?;

        self.decode_blocks(payload, output)
            .map_err(InflateError::new_with_kind)
    }

    /// Decode a zlib stream (RFC 1950) into a freshly allocated
    /// buffer.
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateError>
    {
        if self.data.is_empty()
        {
            return Ok(vec![]);
        }
        let payload = self.zlib_payload().map_err(InflateError::new_with_kind)?;

        self.decode_growable(payload)
    }

    /// Validate the zlib header and return the DEFLATE payload between
    /// it and the Adler-32 trailer.
    fn zlib_payload(&self) -> Result<&'a [u8], InflateErrorKind>
    {
        if self.data.len()
            < 2 /* zlib header */
            + 4
        /* Adler-32 trailer */
        {
            return Err(InflateErrorKind::CompressedIncomplete);
        }

        // See https://www.ietf.org/rfc/rfc1950.txt for the header
        // layout
        let cmf = self.data[0];
        let flg = self.data[1];

        let cm = cmf & 0xF;
        let cinfo = cmf >> 4;

        trace!("zlib header: cm={} cinfo={} flg={:#04X}", cm, cinfo, flg);

        if cm != 8
        {
            return Err(InflateErrorKind::GenericStr(format!(
                "Unknown zlib compression method {cm}"
            )));
        }
        if cinfo > 7
        {
            return Err(InflateErrorKind::GenericStr(format!(
                "Invalid window size value {cinfo}, greater than 7"
            )));
        }
        if (flg >> 5) & 1 == 1
        {
            return Err(InflateErrorKind::Generic("Preset dictionaries are not supported"));
        }
        if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0
        {
            return Err(InflateErrorKind::Generic("Zlib header check bits are corrupt"));
        }

        Ok(&self.data[2..self.data.len() - 4])
    }

    /// Run the fixed-capacity engine against an owned buffer, growing
    /// it on overflow up to the configured limit.
    fn decode_growable(&mut self, input: &'a [u8]) -> Result<Vec<u8>, InflateError>
    {
        let limit = self.options.limit;
        let hint = self
            .options
            .size_hint
            .unwrap_or_else(|| self.data.len().saturating_mul(4));

        let mut capacity = hint.max(64).min(limit);
        let mut output = vec![];

        loop
        {
            output.resize(capacity, 0);

            match self.decode_blocks(input, &mut output)
            {
                Ok(decoded) =>
                {
                    output.truncate(decoded);
                    return Ok(output);
                }
                Err(InflateErrorKind::DecompressedOverflow(needed, _)) if capacity < limit =>
                {
                    capacity = capacity.saturating_mul(2).max(needed).min(limit);
                }
                Err(InflateErrorKind::DecompressedOverflow(needed, _)) =>
                {
                    output.truncate(self.bytes_decoded);
                    return Err(InflateError::new(
                        InflateErrorKind::OutputLimitExceeded(limit, needed),
                        output
                    ));
                }
                Err(kind) =>
                {
                    // attach everything decoded up to the last
                    // completed block for diagnostics
                    output.truncate(self.bytes_decoded);
                    return Err(InflateError::new(kind, output));
                }
            }
        }
    }

    /// The block state machine; decodes `input` into `output` and
    /// returns the decompressed length.
    fn decode_blocks(&mut self, input: &'a [u8], output: &mut [u8])
        -> Result<usize, InflateErrorKind>
    {
        self.stream = BitStreamReader::new(input);
        self.static_codes_loaded = false;
        self.bytes_decoded = 0;

        let mut out_pos = 0;

        loop
        {
            let is_last_block = self.stream.try_get_bits(1)? == 1;
            let block_type = self.stream.try_get_bits(2)?;

            trace!("block header: final={} type={}", is_last_block, block_type);

            match block_type
            {
                DEFLATE_BLOCKTYPE_UNCOMPRESSED =>
                {
                    self.stored_block(input, output, &mut out_pos)?;
                }
                DEFLATE_BLOCKTYPE_STATIC =>
                {
                    if !self.static_codes_loaded
                    {
                        self.build_static_tables()?;
                        self.static_codes_loaded = true;
                    }
                    self.decode_huffman_data(output, &mut out_pos)?;
                }
                DEFLATE_BLOCKTYPE_DYNAMIC =>
                {
                    // the dynamic tables overwrite the cached static
                    // ones
                    self.static_codes_loaded = false;
                    self.read_dynamic_tables()?;
                    self.decode_huffman_data(output, &mut out_pos)?;
                }
                _ => return Err(InflateErrorKind::InvalidBlockType)
            }

            self.bytes_decoded = out_pos;

            if is_last_block
            {
                break;
            }
        }

        Ok(out_pos)
    }

    /// Copy a stored block verbatim from `input` to `output`.
    fn stored_block(&mut self, input: &'a [u8], output: &mut [u8], out_pos: &mut usize)
        -> Result<(), InflateErrorKind>
    {
        self.stream.align_to_byte();

        let len = self.stream.try_get_bits(16)? as u16;
        let nlen = self.stream.try_get_bits(16)? as u16;

        if nlen != !len
        {
            return Err(InflateErrorKind::BlockLengthMismatch(len, nlen));
        }

        let len = usize::from(len);
        let start = self.stream.unread_position();

        trace!("stored block: len={}", len);

        if start + len > input.len()
        {
            // the declared length runs past the input; report without
            // a partial copy so the decoded length stays a block
            // boundary
            return Err(InflateErrorKind::CompressedIncomplete);
        }
        if *out_pos + len > output.len()
        {
            return Err(InflateErrorKind::DecompressedOverflow(*out_pos + len, output.len()));
        }

        output[*out_pos..*out_pos + len].copy_from_slice(&input[start..start + len]);
        *out_pos += len;

        self.stream.set_position(start + len);

        Ok(())
    }

    /// Build the litlen and distance tables for the fixed Huffman
    /// codes of RFC 1951 section 3.2.6.
    fn build_static_tables(&mut self) -> Result<(), InflateErrorKind>
    {
        let mut lens = [0_u8; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS];

        lens[000..144].fill(8);
        lens[144..256].fill(9);
        lens[256..280].fill(7);
        lens[280..288].fill(8);
        // all 32 distance codes get five bits; 30 and 31 exist in the
        // code but may never be used
        lens[288..].fill(5);

        self.litlen_table_bits = build_decode_table(
            &lens[..DEFLATE_NUM_LITLEN_SYMS],
            &LITLEN_DECODE_RESULTS,
            &mut self.litlen_table,
            LITLEN_TABLE_BITS,
            DEFLATE_NUM_LITLEN_SYMS,
            DEFLATE_MAX_CODEWORD_LENGTH,
            true
        )?;

        build_decode_table(
            &lens[DEFLATE_NUM_LITLEN_SYMS..],
            &OFFSET_DECODE_RESULTS,
            &mut self.offset_table,
            OFFSET_TABLE_BITS,
            DEFLATE_NUM_OFFSET_SYMS,
            DEFLATE_MAX_CODEWORD_LENGTH,
            false
        )?;

        Ok(())
    }

    /// Read the code-length preamble of a dynamic block and build the
    /// litlen and distance tables it describes.
    fn read_dynamic_tables(&mut self) -> Result<(), InflateErrorKind>
    {
        let num_litlen_syms = 257 + self.stream.try_get_bits(5)? as usize;
        let num_offset_syms = 1 + self.stream.try_get_bits(5)? as usize;
        let num_explicit_precode_lens = 4 + self.stream.try_get_bits(4)? as usize;

        trace!(
            "dynamic block: hlit={} hdist={} hclen={}",
            num_litlen_syms,
            num_offset_syms,
            num_explicit_precode_lens
        );

        // precode lengths arrive in a fixed permutation order;
        // unlisted ones stay zero
        let mut precode_lens = [0_u8; DEFLATE_NUM_PRECODE_SYMS];

        for i in DEFLATE_PRECODE_LENS_PERMUTATION
            .iter()
            .take(num_explicit_precode_lens)
        {
            precode_lens[usize::from(*i)] = self.stream.try_get_bits(3)? as u8;
        }

        let mut precode_table = [0_u32; PRECODE_ENOUGH];

        build_decode_table(
            &precode_lens,
            &PRECODE_DECODE_RESULTS,
            &mut precode_table,
            PRECODE_TABLE_BITS,
            DEFLATE_NUM_PRECODE_SYMS,
            DEFLATE_MAX_PRE_CODEWORD_LEN,
            false
        )?;

        // Decode the run-length coded litlen and distance codeword
        // lengths into one combined array.
        let num_lens = num_litlen_syms + num_offset_syms;
        let mut lens = [0_u8; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS];
        let mut i = 0;

        while i < num_lens
        {
            let entry = decode_symbol(&mut self.stream, &precode_table, PRECODE_TABLE_BITS)?;
            let presym = (entry >> 16) as usize;

            if presym < 16
            {
                // explicit codeword length
                lens[i] = presym as u8;
                i += 1;
                continue;
            }

            let (rep_val, rep_count) = match presym
            {
                16 =>
                {
                    // repeat the previous length 3..=6 times
                    if i == 0
                    {
                        return Err(InflateErrorKind::InvalidHuffmanCode(
                            "repeat code with no previous length"
                        ));
                    }
                    (lens[i - 1], 3 + self.stream.try_get_bits(2)?)
                }
                // zero run of 3..=10
                17 => (0, 3 + self.stream.try_get_bits(3)?),
                // zero run of 11..=138
                _ => (0, 11 + self.stream.try_get_bits(7)?)
            };
            let rep_count = rep_count as usize;

            // repeat expansions must land exactly on the declared
            // symbol count
            if i + rep_count > num_lens
            {
                return Err(InflateErrorKind::InvalidHuffmanCode(
                    "repeat run past the declared symbol count"
                ));
            }
            lens[i..i + rep_count].fill(rep_val);
            i += rep_count;
        }

        self.litlen_table_bits = build_decode_table(
            &lens[..num_litlen_syms],
            &LITLEN_DECODE_RESULTS,
            &mut self.litlen_table,
            LITLEN_TABLE_BITS,
            num_litlen_syms,
            DEFLATE_MAX_CODEWORD_LENGTH,
            true
        )?;

        build_decode_table(
            &lens[num_litlen_syms..num_lens],
            &OFFSET_DECODE_RESULTS,
            &mut self.offset_table,
            OFFSET_TABLE_BITS,
            num_offset_syms,
            DEFLATE_MAX_CODEWORD_LENGTH,
            false
        )?;

        Ok(())
    }

    /// Decode litlen symbols until the end-of-block symbol, emitting
    /// literals and serving LZ77 copies from the output written so
    /// far.
    fn decode_huffman_data(&mut self, output: &mut [u8], out_pos: &mut usize)
        -> Result<(), InflateErrorKind>
    {
        loop
        {
            let entry =
                decode_symbol(&mut self.stream, &self.litlen_table, self.litlen_table_bits)?;

            if (entry & HUFFDEC_LITERAL) != 0
            {
                if *out_pos == output.len()
                {
                    return Err(InflateErrorKind::DecompressedOverflow(
                        *out_pos + 1,
                        output.len()
                    ));
                }
                output[*out_pos] = ((entry >> 16) & 0xFF) as u8;
                *out_pos += 1;
                continue;
            }
            if (entry & HUFFDEC_EXCEPTIONAL) != 0
            {
                if (entry & HUFFDEC_RESERVED) != 0
                {
                    return Err(InflateErrorKind::ValueNotAllowed(((entry >> 16) & 0x1FF) as u16));
                }
                // end of block
                return Ok(());
            }

            // a length symbol; its extra bits complete the match
            // length, then a distance symbol follows
            let length_base = ((entry >> 16) & 0x1FF) as usize;
            let length_extra = (entry & 0x1F) as u8;
            let length = length_base + self.stream.try_get_bits(length_extra)? as usize;

            let entry = decode_symbol(&mut self.stream, &self.offset_table, OFFSET_TABLE_BITS)?;

            if (entry & HUFFDEC_RESERVED) != 0
            {
                return Err(InflateErrorKind::ValueNotAllowed(((entry >> 16) & 0x1FF) as u16));
            }
            let offset_base = ((entry >> 16) & 0x7FFF) as usize;
            let offset_extra = (entry & 0x1F) as u8;
            let offset = offset_base + self.stream.try_get_bits(offset_extra)? as usize;

            debug_assert!(offset <= DEFLATE_MAX_MATCH_DISTANCE);

            if offset > *out_pos
            {
                return Err(InflateErrorKind::InvalidBackReference(offset, *out_pos));
            }
            if *out_pos + length > output.len()
            {
                return Err(InflateErrorKind::DecompressedOverflow(
                    *out_pos + length,
                    output.len()
                ));
            }

            // byte by byte so a length larger than the offset repeats
            // bytes this copy itself has just produced
            let mut src = *out_pos - offset;

            for _ in 0..length
            {
                output[*out_pos] = output[src];
                *out_pos += 1;
                src += 1;
            }
        }
    }
}

/// Decode one symbol from the bit stream via `table`, consuming its
/// codeword bits, and return its table entry.
///
/// The entry still carries the symbol flags; extra bits of length or
/// distance symbols are not consumed here. Near the end of input the
/// buffered bits decide: a codeword fully determined by them decodes
/// normally, anything needing more reports `CompressedIncomplete`.
#[inline(always)]
fn decode_symbol(
    stream: &mut BitStreamReader, table: &[u32], table_bits: usize
) -> Result<u32, InflateErrorKind>
{
    if !stream.has(DEFLATE_MAX_CODEWORD_LENGTH as u8)
    {
        stream.refill();
    }

    let mut entry = table[stream.peek_var_bits(table_bits)];

    if (entry & (HUFFDEC_EXCEPTIONAL | HUFFDEC_SUBTABLE_POINTER))
        == (HUFFDEC_EXCEPTIONAL | HUFFDEC_SUBTABLE_POINTER)
    {
        if entry == HUFFDEC_INVALID_ENTRY
        {
            return Err(InflateErrorKind::InvalidHuffmanCode(
                "codeword decoded from an empty code"
            ));
        }
        // the codeword is longer than the root bits; the next bits
        // pick the entry out of a subtable
        if stream.bits_left() < table_bits as u8
        {
            return Err(InflateErrorKind::CompressedIncomplete);
        }
        stream.drop_bits(table_bits as u8);

        let subtable_bits = ((entry >> 8) & 0xF) as usize;
        let subtable_start = ((entry >> 16) & 0x7FFF) as usize;

        entry = table[subtable_start + stream.peek_var_bits(subtable_bits)];
    }

    let len = ((entry >> 8) & 0xF) as u8;

    if !stream.has(len)
    {
        return Err(InflateErrorKind::CompressedIncomplete);
    }
    stream.drop_bits(len);

    Ok(entry)
}

/// Combine the static symbol part from `decode_results` with the
/// codeword length to form a decode-table entry.
///
/// For subtable entries `len` is the codeword length beyond the root
/// bits, which is exactly what is left to consume after the root
/// lookup.
fn make_decode_table_entry(decode_results: &[u32], sym: usize, len: u32) -> u32
{
    decode_results[sym] | (len << 8)
}

/// Build a direct-indexed decode table from a canonical-Huffman
/// codeword length array.
///
/// `lens[sym]` is the codeword length of `sym`, zero when unused.
/// `decode_results` supplies the static payload per symbol. Codewords
/// no longer than `table_bits` are replicated across the root table;
/// longer ones share minimally sized subtables appended after it. When
/// `shrink_table_bits` is set the root width drops to the longest
/// length in use (the litlen table keeps its effective width in
/// `InflateDecoder::litlen_table_bits`).
///
/// Returns the effective root width. Length arrays that over- or
/// under-subscribe the codespace are rejected, except for the two
/// cases RFC 1951 sanctions: the empty code (the table is filled with
/// [`HUFFDEC_INVALID_ENTRY`] so lookups fail) and the lone
/// length-one symbol (assigned both one-bit patterns).
fn build_decode_table(
    lens: &[u8], decode_results: &[u32], decode_table: &mut [u32], table_bits: usize,
    num_syms: usize, mut max_codeword_len: usize, shrink_table_bits: bool
) -> Result<usize, InflateErrorKind>
{
    let mut len_counts = [0_u32; DEFLATE_MAX_CODEWORD_LENGTH + 1];
    let mut offsets = [0_u32; DEFLATE_MAX_CODEWORD_LENGTH + 1];
    let mut sorted_syms = [0_u16; DEFLATE_NUM_LITLEN_SYMS];

    // count how many codewords have each length, including zero
    for sym in 0..num_syms
    {
        len_counts[usize::from(lens[sym])] += 1;
    }

    // determine the maximum codeword length actually used
    while max_codeword_len > 1 && len_counts[max_codeword_len] == 0
    {
        max_codeword_len -= 1;
    }

    let table_bits = if shrink_table_bits
    {
        table_bits.min(max_codeword_len)
    }
    else
    {
        table_bits
    };

    // Sort the symbols primarily by increasing codeword length and
    // secondarily by increasing symbol value, equivalently by their
    // codewords in lexicographic order. The same pass accumulates the
    // codespace the lengths claim, scaled by 2^max_codeword_len.
    offsets[0] = 0;
    offsets[1] = len_counts[0];

    let mut codespace_used = 0_u32;

    for len in 1..max_codeword_len
    {
        offsets[len + 1] = offsets[len] + len_counts[len];
        codespace_used = (codespace_used << 1) + len_counts[len];
    }
    codespace_used = (codespace_used << 1) + len_counts[max_codeword_len];

    for sym in 0..num_syms
    {
        let len = usize::from(lens[sym]);

        sorted_syms[offsets[len] as usize] = sym as u16;
        offsets[len] += 1;
    }
    // symbols with no codeword sorted first, skip them
    let mut next_sorted = offsets[0] as usize;

    // A codeword of length n claims 1/2^n of the codespace. Claiming
    // more than the whole codespace is nonsensical, claiming less
    // leaves bit patterns without meaning; both are corrupt input
    // apart from the two sanctioned incomplete shapes below.
    if codespace_used > 1 << max_codeword_len
    {
        return Err(InflateErrorKind::OverfullHuffmanCode);
    }

    if codespace_used < 1 << max_codeword_len
    {
        let entry = if codespace_used == 0
        {
            // An empty code, which DEFLATE permits for the distance
            // code of a block holding no matches. Every slot gets the
            // invalid marker so that decoding through it fails.
            HUFFDEC_INVALID_ENTRY
        }
        else
        {
            // A single symbol with codeword length one. zlib assigns
            // it the codeword '0' and we match it, but both one-bit
            // patterns resolve to the symbol so '1' needs no special
            // case.
            if codespace_used != 1 << (max_codeword_len - 1) || len_counts[1] != 1
            {
                return Err(InflateErrorKind::IncompleteHuffmanCode);
            }
            make_decode_table_entry(decode_results, usize::from(sorted_syms[next_sorted]), 1)
        };
        decode_table[..1 << table_bits].fill(entry);

        return Ok(table_bits);
    }

    // The lengths form a complete code. Enumerate the codewords in
    // canonical order and fill the table. The codeword value is kept
    // bit-reversed so it doubles as the table index; while processing
    // length len the table is treated as having 2^len slots and is
    // doubled each time len grows, which keeps every store sequential
    // instead of strided.
    let mut codeword = 0_usize;
    let mut len = 1_usize;
    let mut count = len_counts[1];

    while count == 0
    {
        len += 1;
        count = len_counts[len];
    }

    let mut curr_table_end = 1 << len;

    while len <= table_bits
    {
        // process all codewords of length len
        loop
        {
            let entry = make_decode_table_entry(
                decode_results,
                usize::from(sorted_syms[next_sorted]),
                len as u32
            );
            next_sorted += 1;

            decode_table[codeword] = entry;

            if codeword == curr_table_end - 1
            {
                // last codeword, all ones; replicate the filled
                // prefix over the rest of the root table
                for _ in len..table_bits
                {
                    decode_table.copy_within(0..curr_table_end, curr_table_end);
                    curr_table_end <<= 1;
                }
                return Ok(table_bits);
            }

            // Advance to the lexicographically next codeword. In the
            // bit-reversed value that is: find the highest unset bit
            // below the length, set it, clear everything above it.
            let bit = 1 << (usize::BITS - 1 - (codeword ^ (curr_table_end - 1)).leading_zeros());

            codeword &= bit - 1;
            codeword |= bit;
            count -= 1;

            if count == 0
            {
                break;
            }
        }

        // advance to the next used codeword length
        loop
        {
            len += 1;

            if len <= table_bits
            {
                decode_table.copy_within(0..curr_table_end, curr_table_end);
                curr_table_end <<= 1;
            }
            count = len_counts[len];

            if count != 0
            {
                break;
            }
        }
    }

    // Codewords longer than table_bits remain; group them by their
    // low table_bits prefix into subtables.
    curr_table_end = 1 << table_bits;

    let mut subtable_prefix = usize::MAX;
    let mut subtable_start = 0_usize;

    loop
    {
        if codeword & ((1 << table_bits) - 1) != subtable_prefix
        {
            subtable_prefix = codeword & ((1 << table_bits) - 1);
            subtable_start = curr_table_end;

            // A codeword of length table_bits + n needs a subtable of
            // 2^n slots, widened until the codewords remaining at this
            // prefix can fill it completely. A complete code always
            // can.
            let mut subtable_bits = len - table_bits;

            codespace_used = count;

            while codespace_used < 1 << subtable_bits
            {
                subtable_bits += 1;

                if subtable_bits + table_bits > DEFLATE_MAX_CODEWORD_LENGTH
                {
                    return Err(InflateErrorKind::InvalidHuffmanCode(
                        "subtable width out of range"
                    ));
                }
                codespace_used = (codespace_used << 1) + len_counts[table_bits + subtable_bits];
            }

            decode_table[subtable_prefix] = (subtable_start as u32) << 16
                | HUFFDEC_EXCEPTIONAL
                | HUFFDEC_SUBTABLE_POINTER
                | (subtable_bits as u32) << 8
                | table_bits as u32;

            curr_table_end = subtable_start + (1 << subtable_bits);
        }

        // fill the subtable slots of the current codeword
        let entry = make_decode_table_entry(
            decode_results,
            usize::from(sorted_syms[next_sorted]),
            (len - table_bits) as u32
        );
        next_sorted += 1;

        let stride = 1 << (len - table_bits);
        let mut j = subtable_start + (codeword >> table_bits);

        while j < curr_table_end
        {
            decode_table[j] = entry;
            j += stride;
        }

        if codeword == (1 << len) - 1
        {
            // last codeword
            return Ok(table_bits);
        }

        let bit = 1 << (usize::BITS - 1 - (codeword ^ ((1 << len) - 1)).leading_zeros());

        codeword &= bit - 1;
        codeword |= bit;
        count -= 1;

        while count == 0
        {
            len += 1;
            count = len_counts[len];
        }
    }
}
