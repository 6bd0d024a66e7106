//! The eleven recognised datatype tags and their per-row metadata.
//!
//! Grounded on `datatype[NDATATYPE]` in `convdata.c`: each row records the
//! byte width and which of the two pivots (`s4`, `t8`) the tag can reach
//! directly. The function pointers themselves live in
//! [`super::Primitive`] rather than on the row, since Rust does not need a
//! vtable-shaped struct to express "this tag has a `to_s4` conversion" —
//! a method on `Tag` that returns `Option<Primitive>` does the same job.

use std::fmt;

/// One of the eleven datatype tags recognised by the transcoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Tag {
    /// Aftac gain-ranged 16-bit integer.
    A2,
    /// VAX single-precision float.
    F4,
    /// VAX G-format double-precision float.
    F8,
    /// 2-bit-gain-code 16-bit integer.
    G2,
    /// Little-endian 16-bit integer.
    I2,
    /// Little-endian 32-bit integer.
    I4,
    /// Big-endian 16-bit integer.
    S2,
    /// Big-endian 24-bit signed integer.
    S3,
    /// Big-endian 32-bit signed integer. One of the two pivot types.
    S4,
    /// IEEE 754 single-precision float, big-endian.
    T4,
    /// IEEE 754 double-precision float, big-endian. The other pivot type.
    T8,
}

impl Tag {
    /// All recognised tags, in catalogue order.
    pub const ALL: [Tag; 11] = [
        Tag::A2,
        Tag::F4,
        Tag::F8,
        Tag::G2,
        Tag::I2,
        Tag::I4,
        Tag::S2,
        Tag::S3,
        Tag::S4,
        Tag::T4,
        Tag::T8,
    ];

    /// Parses a 2-character tag such as `"s4"` or `"t8"`.
    ///
    /// Returns `None` for anything that is not one of the eleven recognised
    /// tags, mirroring `CONV_UNKNOWN` from the original `convdata.c`.
    pub fn parse(tag: &str) -> Option<Tag> {
        Tag::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// The canonical 2-character spelling of this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::A2 => "a2",
            Tag::F4 => "f4",
            Tag::F8 => "f8",
            Tag::G2 => "g2",
            Tag::I2 => "i2",
            Tag::I4 => "i4",
            Tag::S2 => "s2",
            Tag::S3 => "s3",
            Tag::S4 => "s4",
            Tag::T4 => "t4",
            Tag::T8 => "t8",
        }
    }

    /// The per-sample byte width of this datatype.
    pub fn byte_width(self) -> usize {
        match self {
            Tag::A2 | Tag::G2 | Tag::I2 | Tag::S2 => 2,
            Tag::S3 => 3,
            Tag::F4 | Tag::I4 | Tag::S4 | Tag::T4 => 4,
            Tag::F8 | Tag::T8 => 8,
        }
    }

    /// Whether a direct `to_s4`/`from_s4` primitive exists for this tag.
    ///
    /// Copied verbatim from the `have_s4` column of `datatype[NDATATYPE]`:
    /// `s4` itself is not flagged, since nothing converts "to s4" from s4.
    /// At least one of `have_s4`/`have_t8` is set for every tag.
    pub fn have_s4(self) -> bool {
        matches!(
            self,
            Tag::G2 | Tag::I2 | Tag::I4 | Tag::S2 | Tag::S3 | Tag::T4 | Tag::T8
        )
    }

    /// Whether a direct `to_t8`/`from_t8` primitive exists for this tag.
    ///
    /// Copied verbatim from the `have_t8` column of `datatype[NDATATYPE]`.
    pub fn have_t8(self) -> bool {
        matches!(self, Tag::A2 | Tag::F4 | Tag::F8 | Tag::S2 | Tag::S4 | Tag::T4)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[test]
fn parses_all_known_tags() {
    for tag in Tag::ALL {
        assert_eq!(Tag::parse(tag.as_str()), Some(tag));
    }
}

#[test]
fn rejects_unknown_tag() {
    assert_eq!(Tag::parse("zz"), None);
    assert_eq!(Tag::parse("s"), None);
}

#[test]
fn byte_widths_match_catalogue() {
    assert_eq!(Tag::A2.byte_width(), 2);
    assert_eq!(Tag::S3.byte_width(), 3);
    assert_eq!(Tag::S4.byte_width(), 4);
    assert_eq!(Tag::T8.byte_width(), 8);
}

#[test]
fn every_tag_has_at_least_one_pivot() {
    for tag in Tag::ALL {
        assert!(tag.have_s4() || tag.have_t8(), "{tag} has neither pivot");
    }
}

#[test]
fn pivot_flags_match_datatype_table() {
    assert_eq!((Tag::A2.have_s4(), Tag::A2.have_t8()), (false, true));
    assert_eq!((Tag::F4.have_s4(), Tag::F4.have_t8()), (false, true));
    assert_eq!((Tag::F8.have_s4(), Tag::F8.have_t8()), (false, true));
    assert_eq!((Tag::G2.have_s4(), Tag::G2.have_t8()), (true, false));
    assert_eq!((Tag::I2.have_s4(), Tag::I2.have_t8()), (true, false));
    assert_eq!((Tag::I4.have_s4(), Tag::I4.have_t8()), (true, false));
    assert_eq!((Tag::S2.have_s4(), Tag::S2.have_t8()), (true, true));
    assert_eq!((Tag::S3.have_s4(), Tag::S3.have_t8()), (true, false));
    assert_eq!((Tag::S4.have_s4(), Tag::S4.have_t8()), (false, true));
    assert_eq!((Tag::T4.have_s4(), Tag::T4.have_t8()), (true, true));
    assert_eq!((Tag::T8.have_s4(), Tag::T8.have_t8()), (true, false));
}
