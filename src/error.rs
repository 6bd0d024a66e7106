//! Error and result types shared by the transcoder and the e-compression codec.

use std::fmt;

/// The stable, language-neutral numeric codes from the external interface.
///
/// These mirror the original C library's `EC_*` / `CONV_*` return values so
/// that a caller that only cares about the integer contract can still recover
/// it via [`Error::code`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum ErrorCode {
    /// `EC_FAILED` — the block or stream could not be processed at all.
    Failed = 1,
    /// `EC_LENGTH_ERROR` — a declared byte length is inconsistent or runs
    /// past the end of the input.
    Length = 2,
    /// `EC_SAMP_ERROR` — a declared sample count is inconsistent, or fewer
    /// or more samples were decoded than declared.
    Samp = 3,
    /// `EC_DIFF_ERROR` — the differencing depth in a block header exceeds
    /// [`crate::ecomp::EC_MAX_NDIFF`].
    Diff = 4,
    /// `EC_CHECK_ERROR` — the trailing check value disagrees with the
    /// recovered last sample of a block.
    Check = 5,
    /// `EC_ARG_ERROR` — a caller-supplied argument is null, non-positive, or
    /// out of range.
    Arg = 6,
    /// `EC_TYPE_ERROR` — an unrecognised e-compression datatype tag (`e0`..
    /// `e8`, `E0`..`E9`).
    Type = 7,
    /// `EC_MEMORY_ERROR` — scratch allocation failed for an in-place call.
    Memory = 8,
    /// `CONV_UNKNOWN` — a transcoder tag was not one of the eleven
    /// recognised datatypes.
    UnknownTag = -1,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorCode::Failed => "operation failed",
            ErrorCode::Length => "number of bytes in data incorrect",
            ErrorCode::Samp => "number of samples in data incorrect",
            ErrorCode::Diff => "error in number of differences",
            ErrorCode::Check => "check value (last sample in block) incorrect",
            ErrorCode::Arg => "error in arguments to function",
            ErrorCode::Type => "datatype incorrect",
            ErrorCode::Memory => "memory allocation error",
            ErrorCode::UnknownTag => "unrecognised datatype tag",
        };
        f.write_str(message)
    }
}

/// An error produced by the transcoder or the e-compression codec.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{code}: {detail}")]
pub struct Error {
    code: ErrorCode,
    detail: String,
}

impl Error {
    /// Builds an error carrying `code` and a human-readable `detail`.
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Error {
        Error {
            code,
            detail: detail.into(),
        }
    }

    /// The stable numeric code, matching the original C library's return
    /// value contract (`as i32` recovers e.g. `EC_CHECK_ERROR == 5`).
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

macro_rules! error_ctor {
    ($name:ident, $variant:ident) => {
        impl Error {
            #[doc = concat!("Shorthand for `Error::new(ErrorCode::", stringify!($variant), ", detail)`.")]
            pub fn $name(detail: impl Into<String>) -> Error {
                Error::new(ErrorCode::$variant, detail)
            }
        }
    };
}

error_ctor!(failed, Failed);
error_ctor!(length, Length);
error_ctor!(samp, Samp);
error_ctor!(diff, Diff);
error_ctor!(check, Check);
error_ctor!(arg, Arg);
error_ctor!(conv_type, Type);
error_ctor!(memory, Memory);

/// `Result<T, Error>`, the return type of every fallible operation in this
/// crate.
pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn code_round_trips_stable_discriminant() {
    assert_eq!(ErrorCode::Check as i32, 5);
    assert_eq!(ErrorCode::UnknownTag as i32, -1);
}

#[test]
fn error_exposes_its_code() {
    let err = Error::check("last sample disagrees with stored check");
    assert_eq!(err.code(), ErrorCode::Check);
}
