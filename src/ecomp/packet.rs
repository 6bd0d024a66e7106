//! The six variable-width packet layouts that carry differenced samples.
//!
//! Grounded on the `switch` in `block_e_decomp` (decode direction) and the
//! greedy first-fit chain in `e_comp` (encode direction). Each decode
//! function takes the raw big-endian word(s) already converted to host
//! order and sign-extends the packed fields via the shift-up/shift-down
//! trick the original performs on `int32_t`; the three fields whose mask
//! includes the sign bit (`0xf8000000`, `0xff000000`, `0xc0000000`) are
//! taken from the *unsigned* word so they contribute unsigned low bits
//! instead of sign-extending, matching the original's implicit signed to
//! unsigned promotion when ANDing against a mask too large to fit `int`.
//!
//! `index_map` translates the top 4 bits of a packet into one of these six
//! kinds; kind 0 is marked by a single `0` bit, kind 1 by `10`, and so on,
//! so most of the 16 nibble values collapse onto kinds 0 and 1.

/// Maps the top 4 bits of the next word to a packet kind in `0..=5`.
pub const INDEX_MAP: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 3, 4, 5];

/// Samples carried by each packet kind, indexed by kind.
pub const KIND_SAMPLES: [usize; 6] = [7, 3, 4, 5, 4, 1];

/// 32-bit words consumed by each packet kind, indexed by kind.
pub const KIND_WORDS: [usize; 6] = [2, 1, 1, 2, 2, 1];

/// Kind 0: 7 samples at 9 bits each, across 2 words.
pub fn decode_kind0(w0: u32, w1: u32, out: &mut [i32]) {
    let s0 = w0 as i32;
    out[0] = (s0 & 0x7fc0_0000) << 1 >> 23;
    out[1] = (s0 & 0x003f_e000) << 10 >> 23;
    out[2] = (s0 & 0x0000_1ff0) << 19 >> 23;
    let mut s3 = (s0 & 0x0000_000f) << 28 >> 23;
    s3 |= ((w1 & 0xf800_0000) >> 27) as i32;
    out[3] = s3;
    let s1 = w1 as i32;
    out[4] = (s1 & 0x07fc_0000) << 5 >> 23;
    out[5] = (s1 & 0x0003_fe00) << 14 >> 23;
    out[6] = (s1 & 0x0000_01ff) << 23 >> 23;
}

/// Kind 1: 3 samples at 10 bits each, 1 word.
pub fn decode_kind1(w0: u32, out: &mut [i32]) {
    let s = w0 as i32;
    out[0] = (s & 0x3ff0_0000) << 2 >> 22;
    out[1] = (s & 0x000f_fc00) << 12 >> 22;
    out[2] = (s & 0x0000_03ff) << 22 >> 22;
}

/// Kind 2: 4 samples at 7 bits each, 1 word.
pub fn decode_kind2(w0: u32, out: &mut [i32]) {
    let s = w0 as i32;
    out[0] = (s & 0x0fe0_0000) << 4 >> 25;
    out[1] = (s & 0x001f_c000) << 11 >> 25;
    out[2] = (s & 0x0000_3f80) << 18 >> 25;
    out[3] = (s & 0x0000_007f) << 25 >> 25;
}

/// Kind 3: 5 samples at 12 bits each, across 2 words.
pub fn decode_kind3(w0: u32, w1: u32, out: &mut [i32]) {
    let s0 = w0 as i32;
    out[0] = (s0 & 0x0fff_0000) << 4 >> 20;
    out[1] = (s0 & 0x0000_fff0) << 16 >> 20;
    let mut s2 = (s0 & 0x0000_000f) << 28 >> 20;
    s2 |= ((w1 & 0xff00_0000) >> 24) as i32;
    out[2] = s2;
    let s1 = w1 as i32;
    out[3] = (s1 & 0x00ff_f000) << 8 >> 20;
    out[4] = (s1 & 0x0000_0fff) << 20 >> 20;
}

/// Kind 4: 4 samples at 15 bits each, across 2 words.
pub fn decode_kind4(w0: u32, w1: u32, out: &mut [i32]) {
    let s0 = w0 as i32;
    out[0] = (s0 & 0x0fff_e000) << 4 >> 17;
    let mut s1v = (s0 & 0x0000_1fff) << 19 >> 17;
    s1v |= ((w1 & 0xc000_0000) >> 30) as i32;
    out[1] = s1v;
    let s1 = w1 as i32;
    out[2] = (s1 & 0x3fff_8000) << 2 >> 17;
    out[3] = (s1 & 0x0000_7fff) << 17 >> 17;
}

/// Kind 5: 1 sample at 28 bits, 1 word.
pub fn decode_kind5(w0: u32, out: &mut [i32]) {
    let s = w0 as i32;
    out[0] = (s & 0x0fff_ffff) << 4 >> 4;
}

/// Tries each packet kind in the encoder's first-fit priority order against
/// the start of `d`/`a` (differenced values and their absolute magnitudes),
/// bounded by `words_left` 32-bit words of remaining output space.
///
/// Returns the emitted word(s) and how many samples they consumed, or
/// `None` if no kind fits (either too few samples remain, the next value
/// is too large, or a 2-word kind doesn't have the room).
pub fn encode_best(d: &[i32], a: &[u32], words_left: usize) -> Option<(u32, Option<u32>, usize)> {
    if d.len() >= 4 && a[0] < 0x40 && a[1] < 0x40 && a[2] < 0x40 && a[3] < 0x40 {
        let w = 0xc000_0000u32
            | ((d[0] as u32 & 0x7f) << 21)
            | ((d[1] as u32 & 0x7f) << 14)
            | ((d[2] as u32 & 0x7f) << 7)
            | (d[3] as u32 & 0x7f);
        return Some((w, None, 4));
    }
    if d.len() >= 7
        && words_left > 1
        && a[0] < 0x100
        && a[1] < 0x100
        && a[2] < 0x100
        && a[3] < 0x100
        && a[4] < 0x100
        && a[5] < 0x100
        && a[6] < 0x100
    {
        let w0 = ((d[0] as u32 & 0x1ff) << 22)
            | ((d[1] as u32 & 0x1ff) << 13)
            | ((d[2] as u32 & 0x1ff) << 4)
            | ((d[3] as u32 & 0x1ff) >> 5);
        let w1 = ((d[3] as u32) << 27)
            | ((d[4] as u32 & 0x1ff) << 18)
            | ((d[5] as u32 & 0x1ff) << 9)
            | (d[6] as u32 & 0x1ff);
        return Some((w0, Some(w1), 7));
    }
    if d.len() >= 3 && a[0] < 0x200 && a[1] < 0x200 && a[2] < 0x200 {
        let w = 0x8000_0000u32
            | ((d[0] as u32 & 0x3ff) << 20)
            | ((d[1] as u32 & 0x3ff) << 10)
            | (d[2] as u32 & 0x3ff);
        return Some((w, None, 3));
    }
    if d.len() >= 5 && words_left > 1 && a[0] < 0x800 && a[1] < 0x800 && a[2] < 0x800 && a[3] < 0x800 && a[4] < 0x800 {
        let w0 = 0xd000_0000u32
            | ((d[0] as u32 & 0xfff) << 16)
            | ((d[1] as u32 & 0xfff) << 4)
            | ((d[2] as u32 & 0xfff) >> 8);
        let w1 = ((d[2] as u32) << 24) | ((d[3] as u32 & 0xfff) << 12) | (d[4] as u32 & 0xfff);
        return Some((w0, Some(w1), 5));
    }
    if d.len() >= 4 && words_left > 1 && a[0] < 0x4000 && a[1] < 0x4000 && a[2] < 0x4000 && a[3] < 0x4000 {
        let w0 = 0xe000_0000u32 | ((d[0] as u32 & 0x7fff) << 13) | ((d[1] as u32 & 0x7fff) >> 2);
        let w1 = ((d[1] as u32) << 30) | ((d[2] as u32 & 0x7fff) << 15) | (d[3] as u32 & 0x7fff);
        return Some((w0, Some(w1), 4));
    }
    if !d.is_empty() && a[0] < 0x1000_0000 {
        let w = 0xf000_0000u32 | (d[0] as u32 & 0x0fff_ffff);
        return Some((w, None, 1));
    }
    None
}

#[test]
fn kind2_round_trips_small_positive_and_negative_samples() {
    let d = [10i32, -20, 30, -7];
    let a: Vec<u32> = d.iter().map(|v| v.unsigned_abs()).collect();
    let (w0, w1, n) = encode_best(&d, &a, 4).unwrap();
    assert_eq!(n, 4);
    assert!(w1.is_none());
    let mut out = [0i32; 4];
    decode_kind2(w0, &mut out);
    assert_eq!(out, d);
}

#[test]
fn kind0_round_trips_seven_samples_across_two_words() {
    // Magnitudes are held above 0x40 so the narrower 7-bit/4-sample
    // packet never matches first.
    let d = [100i32, -100, 100, -100, 100, -100, 100];
    let a: Vec<u32> = d.iter().map(|v| v.unsigned_abs()).collect();
    let (w0, w1, n) = encode_best(&d, &a, 8).unwrap();
    assert_eq!(n, 7);
    let mut out = [0i32; 7];
    decode_kind0(w0, w1.unwrap(), &mut out);
    assert_eq!(out, d);
}

#[test]
fn kind5_handles_the_full_28_bit_envelope() {
    let d = [0x0fff_ffffi32];
    let a = [0x0fff_ffffu32];
    let (w, rest, n) = encode_best(&d, &a, 1).unwrap();
    assert_eq!(n, 1);
    assert!(rest.is_none());
    let mut out = [0i32; 1];
    decode_kind5(w, &mut out);
    assert_eq!(out[0], 0x0fff_ffff);
}

#[test]
fn values_exceeding_28_bits_fit_nothing() {
    let d = [0x1000_0000i32];
    let a = [0x1000_0000u32];
    assert!(encode_best(&d, &a, 4).is_none());
}

#[test]
fn two_word_kinds_are_skipped_when_only_one_word_remains() {
    // Magnitude 100 rules out the 1-word 7-bit/4 packet, so with only
    // one word of output space left the 2-word 9-bit/7 packet must be
    // skipped too, falling through to the 1-word 10-bit/3 packet.
    let d = [100i32; 7];
    let a = [100u32; 7];
    let (_, rest, n) = encode_best(&d, &a, 1).unwrap();
    assert!(rest.is_none());
    assert_eq!(n, 3);
}
