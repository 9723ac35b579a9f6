//! CUC-style secondary header time: whole seconds followed by a binary fraction of a second.

use bytes::BufMut;
use chrono::{
    DateTime,
    NaiveDate,
    NaiveDateTime,
    TimeZone,
    Utc,
};

use crate::error::{
    EncodeError,
    InvalidTimeWidth,
};

/// Byte widths of the secondary header time field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeFormat {
    total:    usize,
    fraction: usize,
}

impl TimeFormat {
    pub const DEFAULT: Self = Self {
        total:    6,
        fraction: 2,
    };

    pub fn new(total: usize, fraction: usize) -> Result<Self, InvalidTimeWidth> {
        let seconds = total.checked_sub(fraction);

        match (seconds, fraction) {
            (Some(2 | 4 | 8), 0 | 2 | 4) => Ok(Self {
                total,
                fraction,
            }),
            _ => Err(InvalidTimeWidth {
                total,
                fraction,
            }),
        }
    }

    #[inline]
    pub const fn total_bytes(&self) -> usize {
        self.total
    }

    #[inline]
    pub const fn seconds_bytes(&self) -> usize {
        self.total - self.fraction
    }

    #[inline]
    pub const fn fraction_bytes(&self) -> usize {
        self.fraction
    }

    #[inline]
    fn max_seconds(&self) -> u64 {
        match self.seconds_bytes() {
            8 => u64::MAX,
            n => (1u64 << (8 * n)) - 1,
        }
    }

    #[inline]
    fn ticks_per_second(&self) -> u64 {
        1u64 << (8 * self.fraction)
    }
}

impl Default for TimeFormat {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecondaryHeader {
    pub seconds:    u64,
    pub subseconds: u32,
    pub format:     TimeFormat,
}

impl SecondaryHeader {
    /// Encode seconds since the Unix epoch.
    ///
    /// The fraction is rounded half-to-even onto `8 * fraction_bytes` bits; a fraction that rounds
    /// up to a whole second carries into the seconds field.
    pub fn from_unix_seconds(t: f64, format: TimeFormat) -> Result<Self, EncodeError> {
        let out_of_range = || EncodeError::TimeOutOfRange {
            seconds: t,
            width:   format.seconds_bytes(),
        };

        if !t.is_finite() || t < 0. || t >= u64::MAX as f64 {
            return Err(out_of_range());
        }

        let whole = t.trunc();
        Self::from_parts(whole as u64, t - whole, format).ok_or_else(out_of_range)
    }

    pub fn from_datetime(dt: DateTime<Utc>, format: TimeFormat) -> Result<Self, EncodeError> {
        let out_of_range = || EncodeError::TimeOutOfRange {
            seconds: dt.timestamp() as f64,
            width:   format.seconds_bytes(),
        };

        let seconds = u64::try_from(dt.timestamp()).map_err(|_| out_of_range())?;
        let fraction = dt.timestamp_subsec_nanos() as f64 / 1e9;

        Self::from_parts(seconds, fraction, format).ok_or_else(out_of_range)
    }

    fn from_parts(mut seconds: u64, fraction: f64, format: TimeFormat) -> Option<Self> {
        let mut subseconds = 0;

        if format.fraction_bytes() > 0 {
            let ticks_per_second = format.ticks_per_second();
            let ticks = (fraction * ticks_per_second as f64).round_ties_even() as u64;

            if ticks >= ticks_per_second {
                seconds = seconds.checked_add(1)?;
            } else {
                subseconds = ticks as u32;
            }
        }

        if seconds > format.max_seconds() {
            return None;
        }

        Some(Self {
            seconds,
            subseconds,
            format,
        })
    }

    /// Seconds since the Unix epoch, fraction included.
    #[inline]
    pub fn as_unix_seconds(&self) -> f64 {
        let fraction = match self.format.fraction_bytes() {
            0 => 0.,
            _ => self.subseconds as f64 / self.format.ticks_per_second() as f64,
        };

        self.seconds as f64 + fraction
    }

    /// Parse a header previously written with [`Self::write_to`].
    pub fn read_from(src: &[u8], format: TimeFormat) -> Option<Self> {
        let src = src.get(..format.total_bytes())?;
        let (seconds, fraction) = src.split_at(format.seconds_bytes());

        let be = |b: &[u8]| b.iter().fold(0u64, |acc, &x| (acc << 8) | x as u64);

        Some(Self {
            seconds: be(seconds),
            subseconds: be(fraction) as u32,
            format,
        })
    }

    pub fn write_to(&self, out: &mut impl BufMut) {
        match self.format.seconds_bytes() {
            2 => out.put_u16(self.seconds as u16),
            4 => out.put_u32(self.seconds as u32),
            _ => out.put_u64(self.seconds),
        }

        match self.format.fraction_bytes() {
            0 => {},
            2 => out.put_u16(self.subseconds as u16),
            _ => out.put_u32(self.subseconds),
        }
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.format.total_bytes());
        self.write_to(&mut out);

        out
    }
}

/// Parse an ISO 8601 timestamp without zone designator as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, EncodeError> {
    let input = input.trim();

    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M"))
        .or_else(|e| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or(e)
        })
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .map_err(|source| EncodeError::InvalidTimestamp {
            input: input.to_owned(),
            source,
        })
}
