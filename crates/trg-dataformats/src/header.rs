//! Fixed-size trigger activity header.
//!
//! Layout (72 bytes, natural C alignment of the fields in declaration order):
//!
//! | offset | field           | type |
//! |-------:|-----------------|------|
//! | 0      | `version`       | u16  |
//! | 8      | `time_start`    | u64  |
//! | 16     | `time_end`      | u64  |
//! | 24     | `time_peak`     | u64  |
//! | 32     | `time_activity` | u64  |
//! | 40     | `channel_start` | i32  |
//! | 44     | `channel_end`   | i32  |
//! | 48     | `channel_peak`  | i32  |
//! | 52     | `adc_integral`  | u32  |
//! | 56     | `adc_peak`      | u32  |
//! | 60     | `detid`         | u16  |
//! | 64     | `type`          | u32  |
//! | 68     | `algorithm`     | u32  |
//!
//! Bytes 2..8 and 62..64 are padding. They are written as zero and carried through unchanged
//! when a foreign header is copied.

use core::fmt;

use bytemuck::{Pod, Zeroable};

use crate::error::{FormatError, Result};

/// Current trigger activity format version.
pub const TRIGGER_ACTIVITY_VERSION: u16 = 1;

/// Versions this crate knows how to interpret.
pub const SUPPORTED_VERSIONS: &[u16] = &[TRIGGER_ACTIVITY_VERSION];

/// Detector subsystem an activity was formed from.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActivityType {
    #[default]
    Unknown = 0,
    Tpc = 1,
    Pds = 2,
}

impl ActivityType {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Unknown),
            1 => Some(Self::Tpc),
            2 => Some(Self::Pds),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Tpc => "TPC",
            Self::Pds => "PDS",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm that produced an activity.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActivityAlgorithm {
    #[default]
    Unknown = 0,
    Supernova = 1,
    Prescale = 2,
    AdcSimpleWindow = 3,
    HorizontalMuon = 4,
    MichelElectron = 5,
    Dbscan = 6,
}

impl ActivityAlgorithm {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Unknown),
            1 => Some(Self::Supernova),
            2 => Some(Self::Prescale),
            3 => Some(Self::AdcSimpleWindow),
            4 => Some(Self::HorizontalMuon),
            5 => Some(Self::MichelElectron),
            6 => Some(Self::Dbscan),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Supernova => "Supernova",
            Self::Prescale => "Prescale",
            Self::AdcSimpleWindow => "ADCSimpleWindow",
            Self::HorizontalMuon => "HorizontalMuon",
            Self::MichelElectron => "MichelElectron",
            Self::Dbscan => "DBSCAN",
        }
    }
}

impl fmt::Display for ActivityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger activity metadata.
///
/// The struct is packed (alignment 1) with explicit padding fields so it can be overlaid on any
/// byte buffer while keeping the naturally aligned wire layout. Fields are only reachable
/// through by-value accessors.
#[repr(C, packed)]
#[derive(Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct HeaderRecord {
    version: u16,
    _pad0: [u8; 6],
    time_start: u64,
    time_end: u64,
    time_peak: u64,
    time_activity: u64,
    channel_start: i32,
    channel_end: i32,
    channel_peak: i32,
    adc_integral: u32,
    adc_peak: u32,
    detid: u16,
    _pad1: [u8; 2],
    kind: u32,
    algorithm: u32,
}

const _: () = assert!(core::mem::size_of::<HeaderRecord>() == HeaderRecord::SIZE_BYTES);
const _: () = assert!(core::mem::align_of::<HeaderRecord>() == 1);

impl HeaderRecord {
    pub const SIZE_BYTES: usize = 72;

    /// All fields zero, version set to [`TRIGGER_ACTIVITY_VERSION`].
    pub fn new() -> Self {
        Self {
            version: TRIGGER_ACTIVITY_VERSION,
            ..Self::zeroed()
        }
    }

    /// Copy a header out of the front of `buf`.
    pub fn decode_from_le_bytes(buf: &[u8]) -> Result<Self> {
        Self::overlay(buf).copied()
    }

    /// Borrow the header at the front of `buf` in place.
    pub(crate) fn overlay(buf: &[u8]) -> Result<&Self> {
        let bytes = buf.get(..Self::SIZE_BYTES).ok_or(FormatError::TooShort {
            len: buf.len(),
            min: Self::SIZE_BYTES,
        })?;
        let header: &Self = bytemuck::try_from_bytes(bytes).map_err(|_| FormatError::TooShort {
            len: buf.len(),
            min: Self::SIZE_BYTES,
        })?;
        header.validate()?;
        Ok(header)
    }

    /// Structural checks: known version and enum discriminants. Field values are not
    /// interpreted.
    pub fn validate(&self) -> Result<()> {
        let version = self.version;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let kind = self.kind;
        if ActivityType::from_u32(kind).is_none() {
            return Err(FormatError::UnknownActivityType(kind));
        }
        let algorithm = self.algorithm;
        if ActivityAlgorithm::from_u32(algorithm).is_none() {
            return Err(FormatError::UnknownAlgorithm(algorithm));
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn time_start(&self) -> u64 {
        self.time_start
    }

    pub fn time_end(&self) -> u64 {
        self.time_end
    }

    pub fn time_peak(&self) -> u64 {
        self.time_peak
    }

    pub fn time_activity(&self) -> u64 {
        self.time_activity
    }

    pub fn channel_start(&self) -> i32 {
        self.channel_start
    }

    pub fn channel_end(&self) -> i32 {
        self.channel_end
    }

    pub fn channel_peak(&self) -> i32 {
        self.channel_peak
    }

    pub fn adc_integral(&self) -> u32 {
        self.adc_integral
    }

    pub fn adc_peak(&self) -> u32 {
        self.adc_peak
    }

    pub fn detid(&self) -> u16 {
        self.detid
    }

    /// Headers reaching this accessor through the crate's constructors are validated; a raw
    /// `bytemuck` cast that skipped [`HeaderRecord::validate`] reads unknown values as
    /// `Unknown`. Use [`HeaderRecord::activity_type_raw`] to see the stored value.
    pub fn activity_type(&self) -> ActivityType {
        ActivityType::from_u32(self.kind).unwrap_or_default()
    }

    pub fn activity_type_raw(&self) -> u32 {
        self.kind
    }

    /// See [`HeaderRecord::activity_type`] for how unvalidated values are reported.
    pub fn algorithm(&self) -> ActivityAlgorithm {
        ActivityAlgorithm::from_u32(self.algorithm).unwrap_or_default()
    }

    pub fn algorithm_raw(&self) -> u32 {
        self.algorithm
    }

    pub fn with_time_start(mut self, ticks: u64) -> Self {
        self.time_start = ticks;
        self
    }

    pub fn with_time_end(mut self, ticks: u64) -> Self {
        self.time_end = ticks;
        self
    }

    pub fn with_time_peak(mut self, ticks: u64) -> Self {
        self.time_peak = ticks;
        self
    }

    pub fn with_time_activity(mut self, ticks: u64) -> Self {
        self.time_activity = ticks;
        self
    }

    pub fn with_channel_start(mut self, channel: i32) -> Self {
        self.channel_start = channel;
        self
    }

    pub fn with_channel_end(mut self, channel: i32) -> Self {
        self.channel_end = channel;
        self
    }

    pub fn with_channel_peak(mut self, channel: i32) -> Self {
        self.channel_peak = channel;
        self
    }

    pub fn with_adc_integral(mut self, adc: u32) -> Self {
        self.adc_integral = adc;
        self
    }

    pub fn with_adc_peak(mut self, adc: u32) -> Self {
        self.adc_peak = adc;
        self
    }

    pub fn with_detid(mut self, detid: u16) -> Self {
        self.detid = detid;
        self
    }

    pub fn with_activity_type(mut self, kind: ActivityType) -> Self {
        self.kind = kind as u32;
        self
    }

    pub fn with_algorithm(mut self, algorithm: ActivityAlgorithm) -> Self {
        self.algorithm = algorithm as u32;
        self
    }
}

impl Default for HeaderRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeaderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderRecord")
            .field("version", &self.version())
            .field("time_start", &self.time_start())
            .field("time_end", &self.time_end())
            .field("time_peak", &self.time_peak())
            .field("time_activity", &self.time_activity())
            .field("channel_start", &self.channel_start())
            .field("channel_end", &self.channel_end())
            .field("channel_peak", &self.channel_peak())
            .field("adc_integral", &self.adc_integral())
            .field("adc_peak", &self.adc_peak())
            .field("detid", &self.detid())
            .field("type", &self.activity_type_raw())
            .field("algorithm", &self.algorithm_raw())
            .finish()
    }
}
