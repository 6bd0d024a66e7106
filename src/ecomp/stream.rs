//! Seeking and concatenating across a stream of e-compression blocks.
//!
//! Grounded on `e_decomp` (seek + decode) and the per-block loop body of
//! `e_comp` (frame blocks until the input is consumed), plus their
//! `_inplace` wrappers. The reference implementation keeps `static` scratch
//! arrays sized `EC_MAX_BUFFER`; here every call allocates its own, so nested
//! or concurrent calls never interfere.

use crate::error::{Error, Result};

use super::block::{block_e_decomp, encode_block};
use super::header::Header;

/// Whether the terminal block of a compressed stream is zero-padded to its
/// nominal size (`FullEnd`) or truncated to its actual payload
/// (`ShortEnd`). Matches `EC_FULL_END`/`EC_SHORT_END`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockFlag {
    FullEnd,
    ShortEnd,
}

/// Decodes `outsamp` samples starting at absolute sample offset `out0` from
/// a compressed stream of `insamp` total samples packed into `inbyte` bytes
/// of `input`.
pub fn e_decomp(input: &[u8], insamp: i32, inbyte: i32, out0: i32, outsamp: i32) -> Result<Vec<i32>> {
    if outsamp == 0 {
        return Ok(Vec::new());
    }
    if insamp <= 0
        || inbyte <= 0
        || out0 < 0
        || out0 >= insamp
        || outsamp <= 0
        || out0 + outsamp > insamp
        || inbyte as usize > input.len()
    {
        return Err(Error::arg("e_decomp argument out of range"));
    }
    let inbyte = inbyte as usize;
    let out0 = out0 as usize;
    let outsamp = outsamp as usize;

    // Skip whole blocks until the one containing sample out0, re-validating
    // each header we pass over without decoding its payload.
    let mut pos = 0usize;
    let mut skipsamp = 0usize;
    loop {
        let header = Header::parse(&input[pos..inbyte])?;
        let packsamp = header.nsamp as usize;
        let packbyte = header.nbyte as usize;
        if pos + packbyte > inbyte {
            return Err(Error::length("block runs past the end of the input"));
        }
        if skipsamp + packsamp > out0 {
            break;
        }
        skipsamp += packsamp;
        pos += packbyte;
    }
    let mut unbuf0 = out0 - skipsamp;

    let mut out = Vec::with_capacity(outsamp);
    while out.len() < outsamp {
        let block = block_e_decomp(&input[pos..inbyte])?;
        let take = (block.samples.len() - unbuf0).min(outsamp - out.len());
        out.extend_from_slice(&block.samples[unbuf0..unbuf0 + take]);
        unbuf0 = 0;
        pos += block.nbyte;
    }

    Ok(out)
}

/// Runs [`e_decomp`] and writes the result back into `buf` as native-endian
/// bytes, matching `e_decomp_inplace`'s private-scratch-then-copy-back
/// behaviour without requiring the caller to size a second buffer.
pub fn e_decomp_inplace(buf: &mut [u8], insamp: i32, inbyte: i32, out0: i32, outsamp: i32) -> Result<()> {
    let decoded = e_decomp(buf, insamp, inbyte, out0, outsamp)?;
    if decoded.len() * 4 > buf.len() {
        return Err(Error::memory("output does not fit back into the input buffer"));
    }
    for (i, value) in decoded.iter().enumerate() {
        buf[4 * i..4 * i + 4].copy_from_slice(&value.to_ne_bytes());
    }
    Ok(())
}

/// Chooses the nominal block byte budget for an e-compression datatype tag
/// (`e0`..`e8`, `E0`..`E9`), matching the `bufbytes` table in `e_comp`.
fn block_budget(datatype: &str) -> Result<usize> {
    let mut chars = datatype.chars();
    let kind = chars.next();
    let digit = chars.next().and_then(|c| c.to_digit(10));
    if chars.next().is_some() {
        return Err(Error::conv_type(format!("malformed e-compression datatype tag: {datatype:?}")));
    }
    match (kind, digit) {
        (Some('e'), Some(0)) => Ok(1024),
        (Some('e'), Some(n)) if (1..=8).contains(&n) => Ok(n as usize * 2048),
        (Some('E'), Some(0)) => Ok(1200),
        (Some('E'), Some(n)) if (1..=9).contains(&n) => Ok((n as usize + 1) * 400),
        _ => Err(Error::conv_type(format!("unrecognised e-compression datatype tag: {datatype:?}"))),
    }
}

/// Compresses every sample of `input` into a concatenation of e-compression
/// blocks, framed per `datatype`'s nominal block size.
pub fn e_comp(input: &[i32], datatype: &str, block_flag: BlockFlag) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let bufbytes = block_budget(datatype)?;
    let bufints = bufbytes / 4 - 2;

    let mut out = Vec::new();
    let mut remaining = input;
    while !remaining.is_empty() {
        let is_final = remaining.len() <= bufints;
        let block = encode_block(remaining, bufbytes, bufints, is_final, block_flag == BlockFlag::ShortEnd);
        out.extend_from_slice(&block.bytes);
        remaining = &remaining[block.consumed..];
    }
    Ok(out)
}

/// Runs [`e_comp`] over `insamp` native-endian samples already stored at the
/// front of `buf`, then writes the compressed bytes back over the same
/// region. Returns the compressed byte length.
pub fn e_comp_inplace(buf: &mut [u8], insamp: usize, datatype: &str, block_flag: BlockFlag) -> Result<usize> {
    if insamp * 4 > buf.len() {
        return Err(Error::arg("insamp exceeds the provided buffer"));
    }
    let samples: Vec<i32> = (0..insamp)
        .map(|i| i32::from_ne_bytes(buf[4 * i..4 * i + 4].try_into().unwrap()))
        .collect();
    let compressed = e_comp(&samples, datatype, block_flag)?;
    if compressed.len() > buf.len() {
        return Err(Error::memory("compressed output does not fit back into the input buffer"));
    }
    buf[..compressed.len()].copy_from_slice(&compressed);
    Ok(compressed.len())
}

#[test]
fn round_trips_a_short_sequence() {
    let input: Vec<i32> = (0..200).collect();
    let bytes = e_comp(&input, "e1", BlockFlag::ShortEnd).unwrap();
    let decoded = e_decomp(&bytes, input.len() as i32, bytes.len() as i32, 0, input.len() as i32).unwrap();
    assert_eq!(decoded, input);
}

#[test]
fn seek_matches_a_full_decode_slice() {
    let input: Vec<i32> = (0..300).map(|i| i * 3 - 150).collect();
    let bytes = e_comp(&input, "e1", BlockFlag::ShortEnd).unwrap();
    let full = e_decomp(&bytes, input.len() as i32, bytes.len() as i32, 0, input.len() as i32).unwrap();
    let seeked = e_decomp(&bytes, input.len() as i32, bytes.len() as i32, 150, 100).unwrap();
    assert_eq!(seeked, full[150..250]);
}

#[test]
fn outsamp_of_one_works_near_a_block_boundary() {
    let input: Vec<i32> = (0..100).collect();
    let bytes = e_comp(&input, "e1", BlockFlag::ShortEnd).unwrap();
    let one = e_decomp(&bytes, input.len() as i32, bytes.len() as i32, 99, 1).unwrap();
    assert_eq!(one, vec![99]);
}

#[test]
fn empty_input_compresses_to_nothing() {
    let bytes = e_comp(&[], "e1", BlockFlag::FullEnd).unwrap();
    assert!(bytes.is_empty());
}

#[test]
fn rejects_out_of_range_arguments() {
    let input: Vec<i32> = (0..10).collect();
    let bytes = e_comp(&input, "e1", BlockFlag::ShortEnd).unwrap();
    let err = e_decomp(&bytes, 10, bytes.len() as i32, 10, 1).unwrap_err();
    assert_eq!(err.code(), crate::error::ErrorCode::Arg);
}

#[test]
fn unknown_datatype_tag_is_rejected() {
    let err = e_comp(&[1, 2, 3], "x9", BlockFlag::FullEnd).unwrap_err();
    assert_eq!(err.code(), crate::error::ErrorCode::Type);
}

#[test]
fn inplace_round_trip() {
    let input: Vec<i32> = (0..50).collect();
    let mut buf = vec![0u8; 4096];
    for (i, value) in input.iter().enumerate() {
        buf[4 * i..4 * i + 4].copy_from_slice(&value.to_ne_bytes());
    }
    let outbytes = e_comp_inplace(&mut buf, input.len(), "e1", BlockFlag::ShortEnd).unwrap();
    let mut decomp_buf = vec![0u8; 4096];
    decomp_buf[..outbytes].copy_from_slice(&buf[..outbytes]);
    e_decomp_inplace(&mut decomp_buf, input.len() as i32, outbytes as i32, 0, input.len() as i32).unwrap();
    let recovered: Vec<i32> = (0..input.len())
        .map(|i| i32::from_ne_bytes(decomp_buf[4 * i..4 * i + 4].try_into().unwrap()))
        .collect();
    assert_eq!(recovered, input);
}
