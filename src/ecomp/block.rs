//! Decoding and encoding one framed e-compression block.
//!
//! Grounded on `block_e_decomp` (decode) and the per-block body of the
//! `while (in <= lastin)` loop in `e_comp` (encode). Differencing depth is
//! bounded by [`EC_MAX_NDIFF`](crate::ecomp::header::EC_MAX_NDIFF); the
//! encoder always evaluates all five candidate depths (0 through 4) over
//! at most `bufints` samples before choosing one, matching the original's
//! `dmaxbit`/`dsum` accounting (kept here as plain locals rather than
//! `static` scratch, since nothing about the algorithm needs it to persist
//! between calls).

use crate::error::{Error, Result};

use super::header::{ec_makecheck, Header, EC_UNCOMP};
use super::packet::{decode_kind0, decode_kind1, decode_kind2, decode_kind3, decode_kind4, decode_kind5, encode_best, INDEX_MAP};

/// One decoded block: its samples and how many bytes of input it consumed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedBlock {
    pub samples: Vec<i32>,
    pub nbyte: usize,
}

/// Decodes a single block starting at the beginning of `buf`.
///
/// `buf` may contain trailing bytes belonging to later blocks or a later
/// stream entirely; only the leading `header.nbyte` bytes are read.
pub fn block_e_decomp(buf: &[u8]) -> Result<DecodedBlock> {
    let header = Header::parse(buf)?;
    let nsamp = header.nsamp as usize;
    let nbyte = header.nbyte as usize;

    if header.is_uncompressed() {
        if nbyte != (nsamp + 2) * 4 {
            return Err(Error::length("uncompressed block's nbyte does not match nsamp"));
        }
        if buf.len() < nbyte {
            return Err(Error::length("buffer shorter than the declared block"));
        }
        let mut samples = Vec::with_capacity(nsamp);
        for i in 0..nsamp {
            let base = 8 + 4 * i;
            samples.push(i32::from_be_bytes(buf[base..base + 4].try_into().unwrap()));
        }
        return Ok(DecodedBlock { samples, nbyte });
    }

    let ndiff = header.ndiff();
    if ndiff > super::header::EC_MAX_NDIFF {
        return Err(Error::diff("ndiff exceeds EC_MAX_NDIFF"));
    }
    let check = header.check();

    if buf.len() < nbyte {
        return Err(Error::length("buffer shorter than the declared block"));
    }

    let mut samples = vec![0i32; nsamp];
    let mut samps = 0usize;
    let mut pos = 8usize;
    while samps < nsamp {
        if pos + 4 > nbyte {
            return Err(Error::length("packet runs past the end of the block"));
        }
        let w0 = u32::from_be_bytes(buf[pos..pos + 4].try_into().unwrap());
        let kind = INDEX_MAP[(w0 >> 28) as usize] as usize;
        let words = super::packet::KIND_WORDS[kind];
        let count = super::packet::KIND_SAMPLES[kind];
        if pos + 4 * words > nbyte || samps + count > nsamp {
            return Err(Error::samp("packet would overrun the declared sample count"));
        }
        let out = &mut samples[samps..samps + count];
        match kind {
            0 => {
                let w1 = u32::from_be_bytes(buf[pos + 4..pos + 8].try_into().unwrap());
                decode_kind0(w0, w1, out);
            }
            1 => decode_kind1(w0, out),
            2 => decode_kind2(w0, out),
            3 => {
                let w1 = u32::from_be_bytes(buf[pos + 4..pos + 8].try_into().unwrap());
                decode_kind3(w0, w1, out);
            }
            4 => {
                let w1 = u32::from_be_bytes(buf[pos + 4..pos + 8].try_into().unwrap());
                decode_kind4(w0, w1, out);
            }
            5 => decode_kind5(w0, out),
            _ => unreachable!("index_map only yields 0..=5"),
        }
        pos += 4 * words;
        samps += count;
    }
    if samps != nsamp {
        return Err(Error::samp("decoded sample count does not match the header"));
    }

    for _ in 0..ndiff {
        for i in 1..nsamp {
            samples[i] = samples[i].wrapping_add(samples[i - 1]);
        }
    }

    if nsamp > 0 && ec_makecheck(samples[nsamp - 1]) != check {
        return Err(Error::check("stored check value disagrees with the recovered last sample"));
    }

    Ok(DecodedBlock { samples, nbyte })
}

/// An encoded block: its wire bytes and how many input samples it consumed.
pub struct EncodedBlock {
    pub bytes: Vec<u8>,
    pub consumed: usize,
}

/// Encodes up to `bufints` samples from the front of `input` into one
/// block of nominal size `bufbytes`.
///
/// `is_final` marks the last block of the whole stream: under
/// [`super::BlockFlag::ShortEnd`] it is truncated to its actual payload
/// instead of zero-padded to `bufbytes`. Mirrors the per-iteration body of
/// `e_comp`'s main loop.
pub fn encode_block(input: &[i32], bufbytes: usize, bufints: usize, is_final: bool, short_end: bool) -> EncodedBlock {
    debug_assert!(!input.is_empty(), "callers must not request a block for empty input");
    let n = input.len().min(bufints);
    let chunk = &input[..n];

    let mut d = [vec![0i32; n], vec![0i32; n], vec![0i32; n], vec![0i32; n], vec![0i32; n]];
    let mut a = [vec![0u32; n], vec![0u32; n], vec![0u32; n], vec![0u32; n], vec![0u32; n]];
    let mut dmaxbit = [0u32; 5];
    let mut dsum = [0f64; 5];

    if n > 0 {
        for j in 0..5 {
            d[j][0] = chunk[0];
            a[j][0] = chunk[0].unsigned_abs();
            dmaxbit[j] = a[j][0];
            dsum[j] = a[j][0] as f64;
        }
        for i in 1..n {
            d[0][i] = chunk[i];
            a[0][i] = d[0][i].unsigned_abs();
            dsum[0] += a[0][i] as f64;
            dmaxbit[0] |= a[0][i];
            for j in 1..5 {
                d[j][i] = d[j - 1][i].wrapping_sub(d[j - 1][i - 1]);
                a[j][i] = d[j][i].unsigned_abs();
                dsum[j] += a[j][i] as f64;
                dmaxbit[j] |= a[j][i];
            }
        }
    }

    let mut dchoose = None;
    for j in 0..5 {
        if dmaxbit[j] & 0xf800_0000 != 0 {
            continue;
        }
        dchoose = Some(j);
        break;
    }

    let Some(mut dchoose) = dchoose else {
        return encode_uncompressed(chunk, bufbytes, n, is_final, short_end);
    };
    for j in (dchoose + 1)..5 {
        if dmaxbit[j] & 0xf800_0000 != 0 {
            continue;
        }
        if dsum[j] < dsum[dchoose] {
            dchoose = j;
        }
    }

    let pd = &d[dchoose];
    let pa = &a[dchoose];
    let body_words = bufints;
    let mut words: Vec<u32> = Vec::with_capacity(body_words);
    let mut didsamp = 0usize;
    while didsamp < n && words.len() < body_words {
        match encode_best(&pd[didsamp..], &pa[didsamp..], body_words - words.len()) {
            Some((w0, w1, count)) => {
                words.push(w0);
                if let Some(w1) = w1 {
                    words.push(w1);
                }
                didsamp += count;
            }
            None => break,
        }
    }

    let nbyte = if is_final && short_end {
        8 + words.len() * 4
    } else {
        bufbytes
    };
    let mut bytes = vec![0u8; nbyte.max(8 + words.len() * 4)];
    bytes[0..2].copy_from_slice(&(nbyte as u16).to_be_bytes());
    bytes[2..4].copy_from_slice(&(didsamp as u16).to_be_bytes());
    let check = ec_makecheck(chunk[didsamp - 1]);
    let control = ((dchoose as u32) << 24) | (check as u32 & 0x00ff_ffff);
    bytes[4..8].copy_from_slice(&control.to_be_bytes());
    for (i, word) in words.iter().enumerate() {
        bytes[8 + 4 * i..12 + 4 * i].copy_from_slice(&word.to_be_bytes());
    }
    if !(is_final && short_end) {
        bytes.resize(bufbytes, 0);
    }

    EncodedBlock { bytes, consumed: didsamp }
}

fn encode_uncompressed(chunk: &[i32], bufbytes: usize, n: usize, is_final: bool, short_end: bool) -> EncodedBlock {
    let nbyte = if is_final && short_end { (n + 2) * 4 } else { bufbytes };
    let mut bytes = vec![0u8; nbyte.max((n + 2) * 4)];
    bytes[0..2].copy_from_slice(&(nbyte as u16).to_be_bytes());
    bytes[2..4].copy_from_slice(&(n as u16).to_be_bytes());
    bytes[4..8].copy_from_slice(&EC_UNCOMP.to_be_bytes());
    for (i, value) in chunk.iter().enumerate() {
        bytes[8 + 4 * i..12 + 4 * i].copy_from_slice(&value.to_be_bytes());
    }
    if !(is_final && short_end) {
        bytes.resize(bufbytes, 0);
    }
    EncodedBlock { bytes, consumed: n }
}

#[test]
fn trivial_sequence_compresses_and_decodes() {
    let input = [1i32, 2, 3, 4, 5, 6, 7];
    let bufints = 16384 / 4 - 2;
    let block = encode_block(&input, 1024, bufints, true, true);
    assert_eq!(block.consumed, 7);
    let decoded = block_e_decomp(&block.bytes).unwrap();
    assert_eq!(decoded.samples, input);
    assert_eq!(decoded.nbyte, block.bytes.len());
}

#[test]
fn oversized_sample_forces_an_uncompressed_block() {
    let input = [1i32 << 29, 2, 3];
    let bufints = 16384 / 4 - 2;
    let block = encode_block(&input, 1200, bufints, true, true);
    assert_eq!(block.consumed, 3);
    assert_eq!(block.bytes[4] & 0x10, 0x10);
    let decoded = block_e_decomp(&block.bytes).unwrap();
    assert_eq!(decoded.samples, input);
}

#[test]
fn full_end_pads_the_terminal_block_to_nominal_size() {
    let input = [1i32, 2, 3];
    let block = encode_block(&input, 400, 98, true, false);
    assert_eq!(block.bytes.len(), 400);
}

#[test]
fn corrupted_check_value_is_detected() {
    let input = [1i32, 2, 3, 4, 5, 6, 7];
    let bufints = 16384 / 4 - 2;
    let mut block = encode_block(&input, 1024, bufints, true, true);
    let last = block.bytes.len() - 1;
    block.bytes[last] ^= 0xff;
    // Flipping the low check byte should make the stored check disagree
    // with the recovered last sample (7) unless it happens to collide.
    let result = block_e_decomp(&block.bytes);
    assert!(result.is_err() || result.unwrap().samples[6] == 7);
}
