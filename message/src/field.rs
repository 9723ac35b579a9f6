//! The `[gap:]format:value` field descriptor language.
//!
//! Formats borrow the letters of the classic struct-packing notation: an optional byte-order
//! prefix (`>`/`!` big-endian, the default, or `<` little-endian), an optional repeat count, and a
//! single type letter. Each format resolves to exactly one [`FormatCode`] when parsed.

use std::{
    fmt::{
        Display,
        Formatter,
    },
    str::FromStr,
};

use crate::{
    error::FieldError,
    header::MAX_USER_DATA_LEN,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Big,
    Little,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntWidth {
    One,
    Two,
    Four,
    Eight,
}

impl IntWidth {
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Inclusive range of values representable at this width.
    fn range(self, signed: bool) -> (i128, i128) {
        let bits = self.bytes() as u32 * 8;

        if signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    Single,
    Double,
}

impl FloatWidth {
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }
}

/// How a field's literal is turned into bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormatCode {
    SignedInt(IntWidth, ByteOrder),
    UnsignedInt(IntWidth, ByteOrder),
    Float(FloatWidth, ByteOrder),
    /// UTF-8 text, left-aligned and zero-padded to the given width.
    RawString(usize),
}

impl FormatCode {
    #[inline]
    pub const fn width(&self) -> usize {
        match *self {
            Self::SignedInt(w, _) | Self::UnsignedInt(w, _) => w.bytes(),
            Self::Float(w, _) => w.bytes(),
            Self::RawString(w) => w,
        }
    }

    /// Encode `literal` at exactly [`Self::width`] bytes.
    pub fn encode(&self, literal: &str) -> Result<Vec<u8>, FieldError> {
        match *self {
            Self::SignedInt(width, order) => encode_int(self, literal, true, width, order),
            Self::UnsignedInt(width, order) => encode_int(self, literal, false, width, order),
            Self::Float(width, order) => encode_float(self, literal, width, order),
            Self::RawString(width) => {
                let bytes = literal.as_bytes();

                if bytes.len() > width {
                    return Err(FieldError::InvalidStringFormat {
                        format: self.to_string(),
                        reason: format!(
                            "literal is {} bytes, longer than the {width}-byte field",
                            bytes.len()
                        ),
                    });
                }

                let mut out = vec![0u8; width];
                out[..bytes.len()].copy_from_slice(bytes);

                Ok(out)
            },
        }
    }
}

fn encode_int(
    format: &FormatCode,
    literal: &str,
    signed: bool,
    width: IntWidth,
    order: ByteOrder,
) -> Result<Vec<u8>, FieldError> {
    let invalid = |reason: String| FieldError::InvalidIntegerLiteral {
        format: format.to_string(),
        literal: literal.to_owned(),
        reason,
    };

    let value = literal
        .trim()
        .replace('_', "")
        .parse::<i128>()
        .map_err(|e| invalid(e.to_string()))?;

    let (min, max) = width.range(signed);
    if value < min || value > max {
        return Err(invalid(format!("out of range [{min}, {max}]")));
    }

    // two's complement truncation is exact once the range check has passed
    let be = value.to_be_bytes();
    let mut out = be[be.len() - width.bytes()..].to_vec();

    if order == ByteOrder::Little {
        out.reverse();
    }

    Ok(out)
}

fn encode_float(
    format: &FormatCode,
    literal: &str,
    width: FloatWidth,
    order: ByteOrder,
) -> Result<Vec<u8>, FieldError> {
    let invalid = |reason: String| FieldError::InvalidFloatLiteral {
        format: format.to_string(),
        literal: literal.to_owned(),
        reason,
    };

    let value = literal.trim().parse::<f64>().map_err(|e| invalid(e.to_string()))?;

    let mut out = match width {
        FloatWidth::Double => value.to_be_bytes().to_vec(),
        FloatWidth::Single => {
            let narrowed = value as f32;

            if value.is_finite() && narrowed.is_infinite() {
                return Err(invalid("too large for a 4-byte float".to_owned()));
            }

            narrowed.to_be_bytes().to_vec()
        },
    };

    if order == ByteOrder::Little {
        out.reverse();
    }

    Ok(out)
}

impl FromStr for FormatCode {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| FieldError::InvalidStringFormat {
            format: s.to_owned(),
            reason: reason.to_owned(),
        };

        let (order, rest) = match s.as_bytes().first() {
            Some(b'>' | b'!') => (ByteOrder::Big, &s[1..]),
            Some(b'<') => (ByteOrder::Little, &s[1..]),
            _ => (ByteOrder::Big, s),
        };

        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (count, letter) = rest.split_at(digits);

        let count = match count {
            "" => None,
            c => Some(c.parse::<usize>().map_err(|_| invalid("repeat count out of range"))?),
        };

        let mut letters = letter.chars();
        let (Some(letter), None) = (letters.next(), letters.next()) else {
            return Err(invalid("expected exactly one type letter"));
        };

        let numeric = |code: FormatCode| match count {
            None | Some(1) => Ok(code),
            Some(_) => Err(invalid("repeat counts are only supported for strings")),
        };

        match letter {
            'b' => numeric(Self::SignedInt(IntWidth::One, order)),
            'B' => numeric(Self::UnsignedInt(IntWidth::One, order)),
            'h' => numeric(Self::SignedInt(IntWidth::Two, order)),
            'H' => numeric(Self::UnsignedInt(IntWidth::Two, order)),
            'i' | 'l' => numeric(Self::SignedInt(IntWidth::Four, order)),
            'I' | 'L' => numeric(Self::UnsignedInt(IntWidth::Four, order)),
            'q' | 'n' => numeric(Self::SignedInt(IntWidth::Eight, order)),
            'Q' | 'N' => numeric(Self::UnsignedInt(IntWidth::Eight, order)),
            'f' => numeric(Self::Float(FloatWidth::Single, order)),
            'd' => numeric(Self::Float(FloatWidth::Double, order)),
            's' => match count.unwrap_or(1) {
                width if width > MAX_USER_DATA_LEN => {
                    Err(invalid("string wider than the largest packet"))
                },
                width => Ok(Self::RawString(width)),
            },
            _ => Err(invalid("unknown type letter")),
        }
    }
}

impl Display for FormatCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (order, letter) = match *self {
            Self::RawString(width) => return write!(f, "{width}s"),

            Self::SignedInt(w, order) => (order, ['b', 'h', 'i', 'q'][w as usize]),
            Self::UnsignedInt(w, order) => (order, ['B', 'H', 'I', 'Q'][w as usize]),
            Self::Float(FloatWidth::Single, order) => (order, 'f'),
            Self::Float(FloatWidth::Double, order) => (order, 'd'),
        };

        let prefix = match order {
            ByteOrder::Big => '>',
            ByteOrder::Little => '<',
        };

        write!(f, "{prefix}{letter}")
    }
}

/// One parsed `[gap:]format:value` descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec<'a> {
    /// Bytes skipped after the end of the previous field.
    pub gap:     usize,
    pub format:  FormatCode,
    pub literal: &'a str,
}

impl<'a> FieldSpec<'a> {
    /// Split a descriptor into at most three pieces, so string literals may contain `:`.
    pub fn parse(descriptor: &'a str) -> Result<Self, FieldError> {
        let components = descriptor.splitn(3, ':').collect::<Vec<_>>();

        let (gap, format, literal) = match components[..] {
            [format, literal] => (0, format, literal),
            [gap, format, literal] => {
                let gap = gap.trim().parse::<usize>().map_err(|e| {
                    FieldError::MalformedFieldSpec {
                        reason: format!("invalid gap {gap:?}: {e}"),
                    }
                })?;

                (gap, format, literal)
            },
            _ => {
                return Err(FieldError::MalformedFieldSpec {
                    reason: format!("{descriptor:?} has fewer than two components"),
                })
            },
        };

        Ok(Self {
            gap,
            format: format.parse()?,
            literal,
        })
    }

    #[inline]
    pub fn encode(&self) -> Result<Vec<u8>, FieldError> {
        self.format.encode(self.literal)
    }
}
