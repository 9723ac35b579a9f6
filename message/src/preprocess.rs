//! Per-link bookkeeping for received telemetry: generation time and sequence continuity.

use std::{
    collections::HashMap,
    fmt::{
        Display,
        Formatter,
    },
    str::FromStr,
};

use chrono::{
    DateTime,
    Duration,
    Utc,
};

use crate::{
    error::{
        InvalidTimeWidth,
        UnknownEpoch,
    },
    header::{
        APID_MASK,
        PRIMARY_HEADER_LEN,
        SEQUENCE_COUNT_MASK,
    },
};

const SECONDARY_HEADER_FLAG: u32 = 0x0800_0000;

lazy_static::lazy_static! {
    // 1958-01-01T00:00:00Z
    static ref TAI_EPOCH: DateTime<Utc> = DateTime::UNIX_EPOCH - Duration::seconds(378_691_200);
    // 1980-01-06T00:00:00Z
    static ref GPS_EPOCH: DateTime<Utc> = DateTime::UNIX_EPOCH + Duration::seconds(315_964_800);
    // 2000-01-01T11:58:55.816Z
    static ref J2000_EPOCH: DateTime<Utc> = DateTime::UNIX_EPOCH + Duration::milliseconds(946_727_935_816);
}

/// Reference instant a raw packet time counts from. Leap seconds are not applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Epoch {
    Tai,
    Unix,
    Gps,
    J2000,
}

impl Epoch {
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Epoch::Tai => *TAI_EPOCH,
            Epoch::Unix => DateTime::UNIX_EPOCH,
            Epoch::Gps => *GPS_EPOCH,
            Epoch::J2000 => *J2000_EPOCH,
        }
    }
}

impl Default for Epoch {
    #[inline]
    fn default() -> Self {
        Epoch::Unix
    }
}

impl FromStr for Epoch {
    type Err = UnknownEpoch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tai" => Ok(Epoch::Tai),
            "unix" => Ok(Epoch::Unix),
            "gps" => Ok(Epoch::Gps),
            "j2000" => Ok(Epoch::J2000),
            _ => Err(UnknownEpoch(s.to_owned())),
        }
    }
}

impl Display for Epoch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Epoch::Tai => "tai",
            Epoch::Unix => "unix",
            Epoch::Gps => "gps",
            Epoch::J2000 => "j2000",
        };

        f.write_str(name)
    }
}

/// Where the generation time sits in a telemetry packet and how to read it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PreprocessorConfig {
    time_offset:     Option<usize>,
    time_length:     usize,
    fraction_length: usize,
    epoch:           Epoch,
}

impl PreprocessorConfig {
    pub const MAX_TIME_LENGTH: usize = 8;

    pub fn new(
        time_offset: Option<usize>,
        time_length: usize,
        fraction_length: usize,
        epoch: Epoch,
    ) -> Result<Self, InvalidTimeWidth> {
        if time_length > Self::MAX_TIME_LENGTH || fraction_length > time_length {
            return Err(InvalidTimeWidth {
                total:    time_length,
                fraction: fraction_length,
            });
        }

        Ok(Self {
            time_offset,
            time_length,
            fraction_length,
            epoch,
        })
    }

    #[inline]
    pub fn time_offset(&self) -> Option<usize> {
        self.time_offset
    }

    #[inline]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Milliseconds since the epoch for a raw big-endian time value, rounded half away from zero.
    fn millis(&self, raw: u64) -> u128 {
        let denominator = 1u128 << (8 * self.fraction_length);

        (raw as u128 * 1000 + denominator / 2) / denominator
    }
}

impl Default for PreprocessorConfig {
    #[inline]
    fn default() -> Self {
        Self {
            time_offset:     None,
            time_length:     6,
            fraction_length: 2,
            epoch:           Epoch::Unix,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct TelemetryInfo {
    pub apid:            u16,
    pub sequence_count:  u16,
    /// The first four header bytes, unique per packet within a sequence-count cycle.
    pub sequence_key:    u32,
    /// Set when the sequence count did not follow the previous packet on this APID.
    pub sequence_jump:   bool,
    /// `None` when the packet carries no usable time; callers substitute reception time.
    pub generation_time: Option<DateTime<Utc>>,
}

impl Display for TelemetryInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "apid {} seq {}", self.apid, self.sequence_count)?;

        match self.generation_time {
            Some(time) => write!(f, " generated {}", time.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, " generated <unknown>"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Preprocessor {
    config:   PreprocessorConfig,
    last_seq: HashMap<u16, u16>,
}

impl Preprocessor {
    #[inline]
    pub fn new(config: PreprocessorConfig) -> Self {
        Self {
            config,
            last_seq: HashMap::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    /// Inspect one received packet. Returns `None` if it is too short to carry a primary header.
    pub fn process(&mut self, buf: &[u8]) -> Option<TelemetryInfo> {
        if buf.len() < PRIMARY_HEADER_LEN {
            tracing::warn!(len = buf.len(), "short packet");
            return None;
        }

        let sequence_key = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let apid = (sequence_key >> 16) as u16 & APID_MASK;
        let sequence_count = sequence_key as u16 & SEQUENCE_COUNT_MASK;

        let sequence_jump = match self.last_seq.insert(apid, sequence_count) {
            Some(prev) if sequence_count.wrapping_sub(prev) & SEQUENCE_COUNT_MASK != 1 => {
                tracing::warn!(apid, prev, current = sequence_count, "sequence count jump");
                true
            },
            _ => false,
        };

        let generation_time = if sequence_key & SECONDARY_HEADER_FLAG == 0 {
            None
        } else {
            self.config.time_offset.and_then(|offset| self.generation_time(buf, offset))
        };

        Some(TelemetryInfo {
            apid,
            sequence_count,
            sequence_key,
            sequence_jump,
            generation_time,
        })
    }

    fn generation_time(&self, buf: &[u8], offset: usize) -> Option<DateTime<Utc>> {
        let time_length = self.config.time_length;
        let field = offset.checked_add(time_length).and_then(|end| buf.get(offset..end));

        let bytes = match field {
            Some(bytes) => bytes,
            None => {
                tracing::warn!(
                    len = buf.len(),
                    offset,
                    time_length,
                    "packet too short for time field"
                );
                return None;
            },
        };

        let raw = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
        let millis = i64::try_from(self.config.millis(raw)).ok()?;

        self.config.epoch.instant().checked_add_signed(Duration::milliseconds(millis))
    }
}
