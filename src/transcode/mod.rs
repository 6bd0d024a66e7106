//! Datatype transcoding: converting buffers of fixed-width numeric samples
//! between the eleven recognised tags, in place.
//!
//! The catalogue of tags and their pivot availability lives in [`catalog`];
//! the bit-exact conversion routines live in [`integer`], [`gain`], [`vax`]
//! and [`ibm`]. This module ties them together: [`Primitive`] names one
//! conversion step, [`conv_plan`] chooses a chain of them for a given tag
//! pair, and [`conv_data`] runs the chain against a buffer.
//!
//! Grounded on `convdata.c`'s `convfunc`/`convdata` pair: the planner here
//! mirrors their rule order (special cases first, then `s4`, then `t8`).

pub mod catalog;
pub mod gain;
pub mod ibm;
pub mod integer;
pub mod vax;

pub use catalog::Tag;

use crate::error::{Error, ErrorCode, Result};

/// One in-place conversion step over `n` samples.
///
/// `ToS4`/`FromS4`/`ToT8`/`FromT8` are parameterized by the *non-pivot* tag
/// on the other end of the step; [`Primitive::apply`] looks up the right
/// underlying routine for that tag, including the two-function compositions
/// that `a2` and `f4` need to reach `t8` (they only ever touch `t4`
/// directly, so reaching `t8` means going through `t4` first).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Primitive {
    /// `i2 -> s2` or `s2 -> i2`: both are the same byte swap.
    SwapI2S2,
    /// `f4 -> t4`, fast variant.
    F4ToT4,
    /// `t4 -> f4`, fast variant.
    T4ToF4,
    /// `f4 -> t4`, exact variant (flushes near-zero to zero, overflow to
    /// infinity); used only by [`conv_data`]'s direct `f4`/`t4` special
    /// case, never by [`conv_plan`].
    F4ToT4Exact,
    /// `t4 -> f4`, exact variant.
    T4ToF4Exact,
    /// `tag -> s4`.
    ToS4(Tag),
    /// `s4 -> tag`.
    FromS4(Tag),
    /// `tag -> t8`.
    ToT8(Tag),
    /// `t8 -> tag`.
    FromT8(Tag),
}

impl Primitive {
    /// Runs this step over the first `n` samples of `buf`.
    pub fn apply(self, buf: &mut [u8], n: usize) {
        match self {
            Primitive::SwapI2S2 => integer::swap_i2_s2(buf, n),
            Primitive::F4ToT4 => vax::f4_to_t4(buf, n),
            Primitive::T4ToF4 => vax::t4_to_f4(buf, n),
            Primitive::F4ToT4Exact => vax::f4_to_t4_exact(buf, n),
            Primitive::T4ToF4Exact => vax::t4_to_f4_exact(buf, n),
            Primitive::ToS4(tag) => to_s4(tag, buf, n),
            Primitive::FromS4(tag) => from_s4(tag, buf, n),
            Primitive::ToT8(tag) => to_t8(tag, buf, n),
            Primitive::FromT8(tag) => from_t8(tag, buf, n),
        }
    }
}

fn to_s4(tag: Tag, buf: &mut [u8], n: usize) {
    match tag {
        Tag::G2 => gain::g2_to_s4(buf, n),
        Tag::I2 => integer::widen_i2_to_s4(buf, n),
        Tag::I4 => integer::swap_i4_s4(buf, n),
        Tag::S2 => integer::widen_s2_to_s4(buf, n),
        Tag::S3 => integer::widen_s3_to_s4(buf, n),
        Tag::T4 => integer::cast_t4_to_s4(buf, n),
        Tag::T8 => integer::narrow_t8_to_s4(buf, n),
        other => unreachable!("{other} has no to_s4 primitive"),
    }
}

fn from_s4(tag: Tag, buf: &mut [u8], n: usize) {
    match tag {
        Tag::G2 => gain::s4_to_g2(buf, n),
        Tag::I2 => integer::narrow_s4_to_i2(buf, n),
        Tag::I4 => integer::swap_i4_s4(buf, n),
        Tag::S2 => integer::narrow_s4_to_s2(buf, n),
        Tag::S3 => integer::narrow_s4_to_s3(buf, n),
        Tag::T4 => integer::cast_s4_to_t4(buf, n),
        Tag::T8 => integer::widen_s4_to_t8(buf, n),
        other => unreachable!("{other} has no from_s4 primitive"),
    }
}

fn to_t8(tag: Tag, buf: &mut [u8], n: usize) {
    match tag {
        Tag::A2 => {
            gain::a2_to_t4(buf, n);
            integer::widen_t4_to_t8(buf, n);
        }
        Tag::F4 => {
            vax::f4_to_t4(buf, n);
            integer::widen_t4_to_t8(buf, n);
        }
        Tag::F8 => vax::f8_to_t8(buf, n),
        Tag::S2 => integer::widen_s2_to_t8(buf, n),
        Tag::S4 => integer::widen_s4_to_t8(buf, n),
        Tag::T4 => integer::widen_t4_to_t8(buf, n),
        other => unreachable!("{other} has no to_t8 primitive"),
    }
}

fn from_t8(tag: Tag, buf: &mut [u8], n: usize) {
    match tag {
        Tag::A2 => {
            integer::narrow_t8_to_t4(buf, n);
            gain::t4_to_a2(buf, n);
        }
        Tag::F4 => {
            integer::narrow_t8_to_t4(buf, n);
            vax::t4_to_f4(buf, n);
        }
        Tag::F8 => vax::t8_to_f8(buf, n),
        Tag::S2 => integer::narrow_t8_to_s2(buf, n),
        Tag::S4 => integer::narrow_t8_to_s4(buf, n),
        Tag::T4 => integer::narrow_t8_to_t4(buf, n),
        other => unreachable!("{other} has no from_t8 primitive"),
    }
}

/// A chosen conversion path between two tags, as returned by [`conv_plan`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Plan {
    /// Byte width of one input sample.
    pub in_len: usize,
    /// Byte width of one output sample.
    pub out_len: usize,
    /// The ordered steps to apply, zero to three of them.
    pub steps: Vec<Primitive>,
}

/// Returns the byte width of `tag`, or `None` if it is not one of the
/// eleven recognised datatypes.
pub fn conv_length(tag: &str) -> Option<usize> {
    Tag::parse(tag).map(Tag::byte_width)
}

/// Chooses the chain of primitives that converts `in_tag` into `out_tag`,
/// without running it.
///
/// Follows the planning rules in order, first match wins: identical tags
/// need no steps; `i2<->s2` and `f4<->t4` (fast variant) are direct special
/// cases; otherwise the plan routes through whichever of `s4`/`t8` both
/// sides can reach, preferring a single shared pivot over a double hop.
pub fn conv_plan(in_tag: &str, out_tag: &str) -> Result<Plan> {
    let in_t = Tag::parse(in_tag).ok_or_else(|| unknown_tag(in_tag))?;
    let out_t = Tag::parse(out_tag).ok_or_else(|| unknown_tag(out_tag))?;

    let in_len = in_t.byte_width();
    let out_len = out_t.byte_width();

    if in_t == out_t {
        return Ok(Plan { in_len, out_len, steps: vec![] });
    }

    if (in_t == Tag::I2 && out_t == Tag::S2) || (in_t == Tag::S2 && out_t == Tag::I2) {
        return Ok(Plan { in_len, out_len, steps: vec![Primitive::SwapI2S2] });
    }
    if in_t == Tag::F4 && out_t == Tag::T4 {
        return Ok(Plan { in_len, out_len, steps: vec![Primitive::F4ToT4] });
    }
    if in_t == Tag::T4 && out_t == Tag::F4 {
        return Ok(Plan { in_len, out_len, steps: vec![Primitive::T4ToF4] });
    }

    if in_t == Tag::S4 {
        return Ok(Plan { in_len, out_len, steps: vec![Primitive::FromS4(out_t)] });
    }
    if out_t == Tag::S4 {
        return Ok(Plan { in_len, out_len, steps: vec![Primitive::ToS4(in_t)] });
    }

    if in_t.have_s4() && out_t.have_s4() {
        return Ok(Plan {
            in_len,
            out_len,
            steps: vec![Primitive::ToS4(in_t), Primitive::FromS4(out_t)],
        });
    }

    if in_t == Tag::T8 {
        let steps = if out_t.have_t8() {
            vec![Primitive::FromT8(out_t)]
        } else {
            vec![Primitive::FromT8(Tag::S4), Primitive::FromS4(out_t)]
        };
        return Ok(Plan { in_len, out_len, steps });
    }
    if out_t == Tag::T8 {
        let steps = if in_t.have_t8() {
            vec![Primitive::ToT8(in_t)]
        } else {
            vec![Primitive::ToS4(in_t), Primitive::ToT8(Tag::S4)]
        };
        return Ok(Plan { in_len, out_len, steps });
    }

    if in_t.have_t8() && out_t.have_t8() {
        return Ok(Plan {
            in_len,
            out_len,
            steps: vec![Primitive::ToT8(in_t), Primitive::FromT8(out_t)],
        });
    }

    let mut steps = Vec::with_capacity(3);
    if in_t.have_t8() {
        steps.push(Primitive::ToT8(in_t));
    } else {
        steps.push(Primitive::ToS4(in_t));
        steps.push(Primitive::ToT8(Tag::S4));
    }
    if out_t.have_t8() {
        steps.push(Primitive::FromT8(out_t));
    } else {
        steps.push(Primitive::FromT8(Tag::S4));
        steps.push(Primitive::FromS4(out_t));
    }
    Ok(Plan { in_len, out_len, steps })
}

/// Converts `n` samples in `buf` from `in_tag` to `out_tag`, in place.
///
/// Identical to running [`conv_plan`]'s steps, except for the direct
/// `f4<->t4` pair: `conv_data` uses the exact variant there (flushing
/// near-zero and overflow rather than silently wrapping), while `conv_plan`
/// reports the fast variant it would use in a longer chain. This mirrors
/// `convdata()` calling `f4tot4x`/`t4tof4x` directly for that one pair while
/// `convfunc()` still reports the plain `f4tot4`/`t4tof4` in its table.
pub fn conv_data(buf: &mut [u8], n: usize, in_tag: &str, out_tag: &str) -> Result<()> {
    let in_t = Tag::parse(in_tag).ok_or_else(|| unknown_tag(in_tag))?;
    let out_t = Tag::parse(out_tag).ok_or_else(|| unknown_tag(out_tag))?;

    if in_t == Tag::F4 && out_t == Tag::T4 {
        vax::f4_to_t4_exact(buf, n);
        return Ok(());
    }
    if in_t == Tag::T4 && out_t == Tag::F4 {
        vax::t4_to_f4_exact(buf, n);
        return Ok(());
    }

    let plan = conv_plan(in_tag, out_tag)?;
    for step in plan.steps {
        step.apply(buf, n);
    }
    Ok(())
}

fn unknown_tag(tag: &str) -> Error {
    Error::new(ErrorCode::UnknownTag, format!("unrecognised datatype tag: {tag:?}"))
}

#[test]
fn identical_tags_need_no_steps() {
    let plan = conv_plan("s4", "s4").unwrap();
    assert!(plan.steps.is_empty());
}

#[test]
fn unknown_tag_is_rejected() {
    assert_eq!(conv_plan("zz", "s4").unwrap_err().code(), ErrorCode::UnknownTag);
    assert_eq!(conv_length("zz"), None);
    assert_eq!(conv_length("s4"), Some(4));
}

#[test]
fn i2_s2_is_a_single_swap() {
    let plan = conv_plan("i2", "s2").unwrap();
    assert_eq!(plan.steps, vec![Primitive::SwapI2S2]);
}

#[test]
fn s4_pivot_direct_pairs_are_single_step() {
    let plan = conv_plan("i4", "s4").unwrap();
    assert_eq!(plan.steps, vec![Primitive::FromS4(Tag::I4)]);
    let plan = conv_plan("s4", "g2").unwrap();
    assert_eq!(plan.steps, vec![Primitive::FromS4(Tag::G2)]);
}

#[test]
fn double_s4_hop_for_two_s4_only_tags() {
    let plan = conv_plan("i2", "g2").unwrap();
    assert_eq!(plan.steps, vec![Primitive::ToS4(Tag::I2), Primitive::FromS4(Tag::G2)]);
}

#[test]
fn t8_pivot_prefers_direct_other_side() {
    let plan = conv_plan("t8", "f4").unwrap();
    assert_eq!(plan.steps, vec![Primitive::FromT8(Tag::F4)]);
}

#[test]
fn t8_to_s4_only_tag_falls_back_through_s4() {
    let plan = conv_plan("t8", "i2").unwrap();
    assert_eq!(plan.steps, vec![Primitive::FromT8(Tag::S4), Primitive::FromS4(Tag::I2)]);
}

#[test]
fn double_t8_hop_for_two_t8_only_tags() {
    let plan = conv_plan("a2", "f8").unwrap();
    assert_eq!(plan.steps, vec![Primitive::ToT8(Tag::A2), Primitive::FromT8(Tag::F8)]);
}

#[test]
fn fully_disjoint_tags_route_through_both_pivots() {
    // i2 only has s4, f8 only has t8: in -> s4 -> t8 -> out, three steps.
    let plan = conv_plan("i2", "f8").unwrap();
    assert_eq!(
        plan.steps,
        vec![Primitive::ToS4(Tag::I2), Primitive::ToT8(Tag::S4), Primitive::FromT8(Tag::F8)]
    );
}

#[test]
fn conv_data_byte_swap_round_trip() {
    let mut buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    conv_data(&mut buf, 2, "i4", "s4").unwrap();
    assert_eq!(buf, [0x04, 0x03, 0x02, 0x01, 0x08, 0x07, 0x06, 0x05]);
}

#[test]
fn conv_data_s3_to_s4_sign_extension() {
    let mut input: Vec<u8> = vec![];
    input.extend_from_slice(&[0x00, 0x00, 0x01]);
    input.extend_from_slice(&[0xff, 0xff, 0xff]);
    input.extend_from_slice(&[0x80, 0x00, 0x00]);
    input.resize(4 * 3, 0);
    conv_data(&mut input, 3, "s3", "s4").unwrap();
    assert_eq!(i32::from_be_bytes(input[0..4].try_into().unwrap()), 1);
    assert_eq!(i32::from_be_bytes(input[4..8].try_into().unwrap()), -1);
    assert_eq!(i32::from_be_bytes(input[8..12].try_into().unwrap()), -0x0080_0000);
}

#[test]
fn conv_data_g2_decode_scenarios() {
    let decode = |raw: u16| -> i32 {
        let mut buf = vec![0u8; 4];
        buf[0..2].copy_from_slice(&raw.to_be_bytes());
        conv_data(&mut buf, 1, "g2", "s4").unwrap();
        i32::from_be_bytes(buf[0..4].try_into().unwrap())
    };
    assert_eq!(decode(0x0000), -8191);
    assert_eq!(decode(0x3fff), 8192);
    assert_eq!(decode(0x4000), -32764);
    assert_eq!(decode(0xc000), -1048448);
}

#[test]
fn conv_data_uses_exact_f4_t4_variant_not_fast() {
    // An exponent of 1 must flush to zero under the exact variant that
    // conv_data selects, unlike the fast variant conv_plan reports.
    let mut buf = [0x00, 0x01, 0x00, 0x00];
    conv_data(&mut buf, 1, "f4", "t4").unwrap();
    assert_eq!(buf, [0, 0, 0, 0]);
}

#[test]
fn a2_to_f8_composite_round_trip_is_lossy_but_finite() {
    let mut buf = vec![0u8; 8];
    buf[0..2].copy_from_slice(&0x1000u16.to_be_bytes());
    conv_data(&mut buf, 1, "a2", "t8").unwrap();
    let value = f64::from_be_bytes(buf[0..8].try_into().unwrap());
    assert!(value.is_finite());
}
