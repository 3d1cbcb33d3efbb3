use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::error::ValidationError;

static RE_DIMENSIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)x([0-9]+)$").unwrap());

/// Target container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Mp4,
    Mkv,
    Webm,
    Avi,
    Mov,
}

impl Format {
    pub const ALL: [Format; 5] = [Self::Mp4, Self::Mkv, Self::Webm, Self::Avi, Self::Mov];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Webm => "webm",
            Self::Avi => "avi",
            Self::Mov => "mov",
        }
    }
}

impl FromStr for Format {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| ValidationError::UnsupportedFormat {
                value: value.to_string(),
            })
    }
}

/// Quality preset, ordered from smallest output to largest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    Lossless,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Self::Low, Self::Medium, Self::High, Self::Lossless];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Lossless => "lossless",
        }
    }

    /// Constant rate factor handed to the encoder. Lower is better, 0 is lossless.
    pub fn crf(self) -> u8 {
        match self {
            Self::Low => 28,
            Self::Medium => 23,
            Self::High => 18,
            Self::Lossless => 0,
        }
    }
}

impl FromStr for Quality {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|quality| quality.as_str() == value)
            .ok_or_else(|| ValidationError::UnsupportedQuality {
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    H264,
    H265,
    Vp9,
}

impl Codec {
    pub const ALL: [Codec; 3] = [Self::H264, Self::H265, Self::Vp9];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "h265",
            Self::Vp9 => "vp9",
        }
    }

    /// Encoder library name ffmpeg expects after `-c:v`.
    pub fn library(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
            Self::Vp9 => "libvpx-vp9",
        }
    }
}

impl FromStr for Codec {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|codec| codec.as_str() == value)
            .ok_or_else(|| ValidationError::UnsupportedCodec {
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPreset {
    P2160,
    P1440,
    P1080,
    P720,
    P480,
    P360,
}

impl ResolutionPreset {
    pub const ALL: [ResolutionPreset; 6] = [
        Self::P2160,
        Self::P1440,
        Self::P1080,
        Self::P720,
        Self::P480,
        Self::P360,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P2160 => "2160p",
            Self::P1440 => "1440p",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
            Self::P480 => "480p",
            Self::P360 => "360p",
        }
    }

    pub fn height(self) -> u32 {
        match self {
            Self::P2160 => 2160,
            Self::P1440 => 1440,
            Self::P1080 => 1080,
            Self::P720 => 720,
            Self::P480 => 480,
            Self::P360 => 360,
        }
    }
}

/// Target frame size. Explicit dimensions are kept as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Preset(ResolutionPreset),
    Explicit { width: String, height: String },
}

impl Resolution {
    /// Scale filter expression for `-vf`.
    /// Presets fix the height and let ffmpeg pick an even width that keeps the aspect ratio.
    pub fn scale_filter(&self) -> String {
        match self {
            Self::Preset(preset) => format!("scale=-2:{}", preset.height()),
            Self::Explicit { width, height } => format!("scale={width}:{height}"),
        }
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(preset) = ResolutionPreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == value)
        {
            return Ok(Self::Preset(preset));
        }

        RE_DIMENSIONS
            .captures(value)
            .and_then(|cap| {
                let width = cap.get(1)?.as_str().to_string();
                let height = cap.get(2)?.as_str().to_string();
                Some(Self::Explicit { width, height })
            })
            .ok_or_else(|| ValidationError::InvalidResolution {
                value: value.to_string(),
            })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(preset) => f.write_str(preset.as_str()),
            Self::Explicit { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Format, Quality, Codec, ResolutionPreset);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crf_table_is_fixed() {
        assert_eq!(Quality::Low.crf(), 28);
        assert_eq!(Quality::Medium.crf(), 23);
        assert_eq!(Quality::High.crf(), 18);
        assert_eq!(Quality::Lossless.crf(), 0);
    }

    #[test]
    fn codec_libraries() {
        assert_eq!(Codec::H264.library(), "libx264");
        assert_eq!(Codec::H265.library(), "libx265");
        assert_eq!(Codec::Vp9.library(), "libvpx-vp9");
    }

    #[test]
    fn every_preset_scales_to_its_height() {
        for preset in ResolutionPreset::ALL {
            let resolution: Resolution = preset.as_str().parse().unwrap();
            let expected = format!("scale=-2:{}", preset.as_str().trim_end_matches('p'));
            assert_eq!(resolution.scale_filter(), expected);
        }
    }

    #[test]
    fn explicit_dimensions_scale_literally() {
        let resolution: Resolution = "1920x1080".parse().unwrap();
        assert_eq!(resolution.scale_filter(), "scale=1920:1080");

        let resolution: Resolution = "0640x0360".parse().unwrap();
        assert_eq!(resolution.scale_filter(), "scale=0640:0360");
    }

    #[test]
    fn malformed_resolutions_are_rejected() {
        for value in [
            "big", "1920x", "x1080", "1920X1080", "1920x1080p", " 720p", "-2x720", "١٢٨٠x٧٢٠", "1280x٧٢٠",
        ] {
            assert_eq!(
                value.parse::<Resolution>(),
                Err(ValidationError::InvalidResolution {
                    value: value.to_string()
                }),
                "{value}"
            );
        }
    }

    #[test]
    fn unknown_names_have_distinct_errors() {
        assert!(matches!(
            "flv".parse::<Format>(),
            Err(ValidationError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            "av1".parse::<Codec>(),
            Err(ValidationError::UnsupportedCodec { .. })
        ));
        assert!(matches!(
            "ultra".parse::<Quality>(),
            Err(ValidationError::UnsupportedQuality { .. })
        ));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!("MP4".parse::<Format>().is_err());
        assert!("High".parse::<Quality>().is_err());
    }
}
