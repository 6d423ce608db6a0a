//! Decoding side of `trg-inspect`: walks a buffer of back-to-back trigger activity records and
//! produces per-record summaries. Kept separate from `main.rs` so the logic is testable without
//! spawning the binary.

use std::fmt;

use anyhow::bail;
use serde::Serialize;
use trg_dataformats::{ActivityStream, FormatError, Limits, RecordView};

pub const MIN_PRIMITIVE_SIZE: usize = 8;
pub const MAX_PRIMITIVE_SIZE: usize = 256;
pub const DEFAULT_PRIMITIVE_SIZE: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct InspectOptions {
    pub primitive_size: usize,
    pub limits: Limits,
    pub dump_primitives: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            primitive_size: DEFAULT_PRIMITIVE_SIZE,
            limits: Limits::default(),
            dump_primitives: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub offset: usize,
    pub version: u16,
    pub activity_type: String,
    pub algorithm: String,
    pub detid: u16,
    pub time_start: u64,
    pub time_end: u64,
    pub time_peak: u64,
    pub time_activity: u64,
    pub channel_start: i32,
    pub channel_end: i32,
    pub channel_peak: i32,
    pub adc_integral: u32,
    pub adc_peak: u32,
    pub num_primitives: usize,
    pub byte_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitives: Option<Vec<String>>,
}

impl fmt::Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{:<8} {} {} detid={} time=[{}, {}] peak={} ",
            self.offset,
            self.activity_type,
            self.algorithm,
            self.detid,
            self.time_start,
            self.time_end,
            self.time_peak,
        )?;
        write!(
            f,
            "channels=[{}, {}] adc_integral={} adc_peak={} primitives={} bytes={}",
            self.channel_start,
            self.channel_end,
            self.adc_integral,
            self.adc_peak,
            self.num_primitives,
            self.byte_size,
        )
    }
}

/// Where decoding stopped and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamFault {
    pub offset: usize,
    pub message: String,
    #[serde(skip)]
    pub error: Option<FormatError>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub records: Vec<RecordSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<StreamFault>,
}

impl Report {
    pub fn total_primitives(&self) -> usize {
        self.records.iter().map(|r| r.num_primitives).sum()
    }
}

pub fn parse_primitive_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|err| format!("{err}"))?;
    if !(MIN_PRIMITIVE_SIZE..=MAX_PRIMITIVE_SIZE).contains(&size) || size % 8 != 0 {
        return Err(format!(
            "primitive size must be a multiple of 8 in \
             {MIN_PRIMITIVE_SIZE}..={MAX_PRIMITIVE_SIZE}, got {size}"
        ));
    }
    Ok(size)
}

macro_rules! dispatch_primitive_size {
    ($size:expr, $bytes:expr, $opts:expr; $($n:literal)*) => {
        match $size {
            $($n => Ok(inspect_as::<$n>($bytes, $opts)),)*
            other => bail!("unsupported primitive size {other}"),
        }
    };
}

/// Decode every record in `bytes`, treating each primitive as `opts.primitive_size` opaque bytes.
///
/// Malformed input is not an error here: decoding stops and the report carries the fault.
pub fn inspect(bytes: &[u8], opts: &InspectOptions) -> anyhow::Result<Report> {
    dispatch_primitive_size!(opts.primitive_size, bytes, opts;
        8 16 24 32 40 48 56 64 72 80 88 96 104 112 120 128
        136 144 152 160 168 176 184 192 200 208 216 224 232 240 248 256)
}

fn inspect_as<const N: usize>(bytes: &[u8], opts: &InspectOptions) -> Report {
    let mut report = Report::default();
    let mut stream = ActivityStream::<[u8; N]>::with_limits(bytes, &opts.limits);
    loop {
        let offset = stream.offset();
        match stream.next() {
            None => break,
            Some(Ok(view)) => {
                tracing::debug!(offset, len = view.len(), "decoded record");
                report.records.push(summarize(offset, &view, opts.dump_primitives));
            }
            Some(Err(err)) => {
                report.fault = Some(StreamFault {
                    offset,
                    message: err.to_string(),
                    error: Some(err),
                });
            }
        }
    }
    report
}

fn summarize<const N: usize>(
    offset: usize,
    view: &RecordView<'_, [u8; N]>,
    dump: bool,
) -> RecordSummary {
    let header = view.header();
    RecordSummary {
        offset,
        version: header.version(),
        activity_type: header.activity_type().as_str().to_owned(),
        algorithm: header.algorithm().as_str().to_owned(),
        detid: header.detid(),
        time_start: header.time_start(),
        time_end: header.time_end(),
        time_peak: header.time_peak(),
        time_activity: header.time_activity(),
        channel_start: header.channel_start(),
        channel_end: header.channel_end(),
        channel_peak: header.channel_peak(),
        adc_integral: header.adc_integral(),
        adc_peak: header.adc_peak(),
        num_primitives: view.len(),
        byte_size: view.byte_size(),
        primitives: dump.then(|| view.iter().map(hex::encode).collect()),
    }
}
