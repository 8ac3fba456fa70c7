//! A small and fast DEFLATE (RFC 1951) and zlib (RFC 1950)
//! decompressor.
//!
//! The whole compressed buffer is handed to the decoder up front;
//! decoding is single threaded, table driven and allocates nothing
//! whose size depends on the input, apart from the output itself.
//!
//! Two output modes are supported per wire format:
//! - `decode_*_into` writes into a caller-supplied buffer and errors
//!   when it is too small,
//! - `decode_*` returns an owned `Vec<u8>`, growing as needed up to a
//!   configurable limit.
//!
//! The zlib wrapper is handled structurally: the header is validated,
//! the Adler-32 trailer is skipped without being checked.
//!
//! # Usage
//!
//! Decoding deflate data
//!
//! ```
//! use tinflate::InflateDecoder;
//!
//! // a fixed-huffman encoding of "abc"
//! let data = [0x4B, 0x4C, 0x4A, 0x06, 0x00];
//! let mut decoder = InflateDecoder::new(&data);
//!
//! let decompressed = decoder.decode_deflate().unwrap();
//! assert_eq!(decompressed, b"abc");
//! ```
//!
//! Decoding zlib data into a fixed buffer
//!
//! ```
//! use tinflate::InflateDecoder;
//!
//! let data = [
//!     0x78, 0x9C, 0x4B, 0x4C, 0x4A, 0x06, 0x00, 0x02, 0x4D, 0x01, 0x27,
//! ];
//! let mut output = [0_u8; 16];
//! let mut decoder = InflateDecoder::new(&data);
//!
//! let decoded = decoder.decode_zlib_into(&mut output).unwrap();
//! assert_eq!(&output[..decoded], b"abc");
//! ```
//!
//! Bounding the output of untrusted input
//!
//! ```
//! use tinflate::{InflateDecoder, InflateOptions};
//!
//! let options = InflateOptions::default().set_limit(1 << 20);
//! let data = [0x4B, 0x4C, 0x4A, 0x06, 0x00];
//! let mut decoder = InflateDecoder::new_with_options(&data, options);
//!
//! assert_eq!(decoder.decode_deflate().unwrap(), b"abc");
//! ```
pub use crate::decoder::{InflateDecoder, InflateOptions};

mod bitstream;
mod constants;
mod decoder;
pub mod errors;
