//! Output audio format value object

use std::fmt;

/// MIME type reported for every finished recording
pub const M4A_MIME_TYPE: &str = "audio/m4a";

/// Audio codec of the encoded stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCodec {
    Aac,
}

impl AudioCodec {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Aac => "aac",
        }
    }
}

/// Value object describing the encoded output.
///
/// Callers depend on this exact encoding: mono AAC in an MPEG-4 container,
/// 44.1 kHz, 128 kbps constant bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    codec: AudioCodec,
    sample_rate_hz: u32,
    bitrate_bps: u32,
    channels: u16,
}

impl AudioFormat {
    /// The recording format used by the bridge
    pub const fn aac_m4a() -> Self {
        Self {
            codec: AudioCodec::Aac,
            sample_rate_hz: 44_100,
            bitrate_bps: 128_000,
            channels: 1,
        }
    }

    pub const fn codec(&self) -> AudioCodec {
        self.codec
    }

    pub const fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub const fn bitrate_bps(&self) -> u32 {
        self.bitrate_bps
    }

    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the MIME type string
    pub const fn mime_type(&self) -> &'static str {
        M4A_MIME_TYPE
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        "m4a"
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::aac_m4a()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}kbps {}Hz {}ch .{}",
            self.codec.as_str(),
            self.bitrate_bps / 1000,
            self.sample_rate_hz,
            self.channels,
            self.extension()
        )
    }
}
