//! `BitStreamReader` API
//!
//! A little-endian bit reader over a byte slice, backed by a 64-bit
//! buffer that is refilled a word at a time.
//!
//! Bit 0 of each input byte is consumed first, as RFC 1951 requires.
//! Unlike the usual trick of padding the input and over-reading, this
//! reader never touches memory past the end of the slice; near the end
//! of input a refill simply leaves fewer bits buffered and the caller
//! decides whether that is an error.

use crate::errors::InflateErrorKind;

pub struct BitStreamReader<'src>
{
    // buffer from which we are pulling in bits from
    // used in decompression.
    src:      &'src [u8],
    // position of the next byte to be loaded into the bit buffer
    position: usize,

    bits_left: u8,
    buffer:    u64
}

impl<'src> BitStreamReader<'src>
{
    /// Create a new `BitStreamReader` instance positioned at the
    /// start of `in_buffer` with an empty bit buffer.
    pub fn new(in_buffer: &'src [u8]) -> BitStreamReader<'src>
    {
        BitStreamReader {
            bits_left: 0,
            buffer:    0,
            src:       in_buffer,
            position:  0
        }
    }

    /// Refill the bit buffer, best effort.
    ///
    /// When at least 8 input bytes remain this loads a whole
    /// little-endian word and leaves between 56 and 63 valid bits.
    /// Near the end of input it buffers whatever bytes remain; the
    /// buffer ends up below 56 bits only when the input is exhausted.
    #[inline(always)]
    pub fn refill(&mut self)
    {
        match self.src.get(self.position..self.position + 8)
        {
            Some(bytes) =>
            {
                let mut buf = [0; 8];
                buf.copy_from_slice(bytes);

                let new_buffer = u64::from_le_bytes(buf);
                // number of bits with room in the buffer, rounded
                // down to whole bytes when divided by 8.
                let num = 63 ^ self.bits_left;

                self.buffer |= new_buffer << self.bits_left;
                self.position += (num >> 3) as usize;
                // bits left are now between 56-63
                self.bits_left |= 56;
            }
            None => self.refill_slow()
        }
    }

    #[inline(never)]
    fn refill_slow(&mut self)
    {
        while self.bits_left < 56
        {
            match self.src.get(self.position)
            {
                Some(byte) =>
                {
                    self.buffer |= u64::from(*byte) << self.bits_left;
                    self.bits_left += 8;
                    self.position += 1;
                }
                None => break
            }
        }
    }

    /// Look at the next `lookahead` bits without consuming them.
    ///
    /// Bits beyond `bits_left` read as zero.
    #[inline(always)]
    pub fn peek_var_bits(&self, lookahead: usize) -> usize
    {
        (self.buffer & ((1 << lookahead) - 1)) as usize
    }

    /// Consume `num_bits` bits from the buffer and return them.
    ///
    /// The caller must have established, via `refill` and `has`, that
    /// the buffer holds at least `num_bits` bits.
    #[inline(always)]
    pub fn get_bits(&mut self, num_bits: u8) -> u64
    {
        debug_assert!(self.bits_left >= num_bits);

        let mask = (1_u64 << num_bits) - 1;
        let value = self.buffer & mask;

        self.buffer >>= num_bits;
        self.bits_left -= num_bits;

        value
    }

    /// Consume `num_bits` bits, refilling first if needed.
    ///
    /// Unlike `get_bits` this reports when the stream cannot supply
    /// the requested bits. `num_bits` must be at most 16 so a single
    /// refill always suffices.
    #[inline(always)]
    pub fn try_get_bits(&mut self, num_bits: u8) -> Result<u64, InflateErrorKind>
    {
        debug_assert!(num_bits <= 16);

        if self.bits_left < num_bits
        {
            self.refill();

            if self.bits_left < num_bits
            {
                return Err(InflateErrorKind::CompressedIncomplete);
            }
        }
        Ok(self.get_bits(num_bits))
    }

    /// Discard `bits` bits from the buffer.
    #[inline(always)]
    pub fn drop_bits(&mut self, bits: u8)
    {
        debug_assert!(self.bits_left >= bits);
        self.bits_left -= bits;
        self.buffer >>= bits;
    }

    /// Discard buffered bits up to the next byte boundary.
    ///
    /// Afterwards `bits_left` is a multiple of 8 and the logical next
    /// bit is bit 0 of an input byte.
    pub fn align_to_byte(&mut self)
    {
        let partial = self.bits_left & 7;

        self.buffer >>= partial;
        self.bits_left -= partial;
    }

    /// Byte index of the first input byte not yet consumed.
    ///
    /// Only meaningful while `bits_left` is a whole number of bytes,
    /// i.e. after `align_to_byte`.
    pub const fn unread_position(&self) -> usize
    {
        debug_assert!(self.bits_left & 7 == 0);
        self.position - (self.bits_left >> 3) as usize
    }

    /// Move the read cursor to `position`, discarding buffered bits.
    pub fn set_position(&mut self, position: usize)
    {
        self.position = position;
        self.buffer = 0;
        self.bits_left = 0;
    }

    /// Return true if the bit buffer can satisfy `bits` reads without
    /// refilling.
    pub const fn has(&self, bits: u8) -> bool
    {
        self.bits_left >= bits
    }

    /// Get number of bits left in the bit buffer.
    pub const fn bits_left(&self) -> u8
    {
        self.bits_left
    }
}
