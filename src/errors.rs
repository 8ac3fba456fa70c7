use std::fmt::{Debug, Display, Formatter};

/// A struct returned when decompression fails
///
/// Carries the reason decompression stopped together with the bytes
/// decoded up to the last completed block, which callers can use for
/// diagnostics.
pub struct InflateError
{
    /// reason why decompression failed
    pub kind: InflateErrorKind,
    /// Decoded data up until the decompression error
    pub data: Vec<u8>
}

impl InflateError
{
    /// Create a new error wrapper, with `data` being the bytes that
    /// were successfully decoded before the error was hit.
    pub fn new(kind: InflateErrorKind, data: Vec<u8>) -> InflateError
    {
        InflateError { kind, data }
    }

    /// Create a new error wrapper with no decoded data attached.
    pub fn new_with_kind(kind: InflateErrorKind) -> InflateError
    {
        InflateError::new(kind, vec![])
    }
}

impl Debug for InflateError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        writeln!(f, "{:?}", self.kind)
    }
}

impl Display for InflateError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        writeln!(f, "{:?}", self.kind)
    }
}

impl std::error::Error for InflateError {}

/// Why a decode attempt failed.
///
/// The first error encountered aborts the invocation and is returned
/// verbatim; the decoder never attempts recovery between blocks.
pub enum InflateErrorKind
{
    /// The bit stream ended in the middle of a block, a codeword or a
    /// bit field
    CompressedIncomplete,
    /// A block header used the reserved block kind 3
    InvalidBlockType,
    /// A stored block's LEN field does not match the ones' complement
    /// of its NLEN field
    BlockLengthMismatch(u16, u16),
    /// The output buffer cannot hold the decompressed data.
    ///
    /// Fields are the size needed and the capacity available
    DecompressedOverflow(usize, usize),
    /// A reserved symbol was decoded (litlen 286/287 or distance
    /// 30/31)
    ValueNotAllowed(u16),
    /// A back-reference pointed before the start of the output.
    ///
    /// Fields are the distance and the number of bytes written so far
    InvalidBackReference(usize, usize),
    /// A code-length array oversubscribes the codespace (Kraft sum
    /// above one)
    OverfullHuffmanCode,
    /// A code-length array undersubscribes the codespace and is not
    /// the single-symbol degenerate case the format permits
    IncompleteHuffmanCode,
    /// The code-length decode sequence of a dynamic block was
    /// malformed
    InvalidHuffmanCode(&'static str),
    /// Decompressed output would exceed the limit set in the options.
    ///
    /// Fields are the limit and the size needed
    OutputLimitExceeded(usize, usize),
    /// Anything that isn't significant
    Generic(&'static str),
    GenericStr(String)
}

impl Debug for InflateErrorKind
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::CompressedIncomplete => writeln!(f, "Compressed data ended prematurely"),
            Self::InvalidBlockType => writeln!(f, "Invalid block type 3"),
            Self::BlockLengthMismatch(len, nlen) => writeln!(
                f,
                "Stored block length mismatch, LEN is {len:#06X} but NLEN is {nlen:#06X}"
            ),
            Self::DecompressedOverflow(needed, capacity) => writeln!(
                f,
                "Output buffer too small, needed {needed} bytes but capacity is {capacity}"
            ),
            Self::ValueNotAllowed(symbol) =>
            {
                writeln!(f, "Reserved symbol {symbol} decoded from the stream")
            }
            Self::InvalidBackReference(distance, written) => writeln!(
                f,
                "Back-reference distance {distance} exceeds {written} bytes of output"
            ),
            Self::OverfullHuffmanCode => writeln!(f, "Overfull huffman code"),
            Self::IncompleteHuffmanCode => writeln!(f, "Incomplete huffman code"),
            Self::InvalidHuffmanCode(reason) => writeln!(f, "Invalid huffman code: {reason}"),
            Self::OutputLimitExceeded(limit, needed) => writeln!(
                f,
                "Output limit exceeded, set limit was {limit} and output needs {needed}"
            ),
            Self::Generic(reason) => writeln!(f, "{reason}"),
            Self::GenericStr(reason) => writeln!(f, "{reason}")
        }
    }
}

impl Display for InflateErrorKind
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for InflateErrorKind {}

impl From<InflateErrorKind> for InflateError
{
    fn from(kind: InflateErrorKind) -> InflateError
    {
        InflateError::new_with_kind(kind)
    }
}
