use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::ValidationError;
use crate::core::options::{Codec, Format, Quality, Resolution};

/// A conversion as the user asked for it. Fields left `None` are filled in by [`ConversionRequest::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub quality: Option<String>,
    pub resolution: Option<String>,
    pub codec: Option<String>,
}

/// A validated request with every field in its typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: Format,
    pub quality: Quality,
    pub resolution: Option<Resolution>,
    pub codec: Option<Codec>,
}

struct TypedFields {
    format: Option<Format>,
    codec: Option<Codec>,
    quality: Option<Quality>,
    resolution: Option<Resolution>,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Fills in output, format and quality.
    ///
    /// A format implied by an explicit output path wins over the `mp4` default, and a
    /// synthesized output path always carries the final format as its extension.
    pub fn resolve(mut self) -> Self {
        self.output = self.output.filter(|path| !path.as_os_str().is_empty());
        self.format = non_empty(self.format);
        self.quality = non_empty(self.quality);
        self.resolution = non_empty(self.resolution);
        self.codec = non_empty(self.codec);

        if self.format.is_none() {
            self.format = self
                .output
                .as_deref()
                .and_then(extension_of)
                .map(str::to_string);
        }

        let format = self
            .format
            .get_or_insert_with(|| Format::default().as_str().to_string());

        if self.output.is_none() {
            self.output = Some(converted_output_path(&self.input, format));
        }

        if self.quality.is_none() {
            self.quality = Some(Quality::default().as_str().to_string());
        }

        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.typed_fields().map(|_| ())
    }

    /// Checks the input exists and parses every set field, in that order.
    fn typed_fields(&self) -> Result<TypedFields, ValidationError> {
        self.check_input()?;
        Ok(TypedFields {
            format: parse_field(self.format.as_deref())?,
            codec: parse_field(self.codec.as_deref())?,
            quality: parse_field(self.quality.as_deref())?,
            resolution: parse_field(self.resolution.as_deref())?,
        })
    }

    fn check_input(&self) -> Result<(), ValidationError> {
        if self.input.exists() {
            Ok(())
        } else {
            Err(ValidationError::InputNotFound {
                path: self.input.clone(),
            })
        }
    }
}

impl TryFrom<ConversionRequest> for ResolvedRequest {
    type Error = ValidationError;

    fn try_from(request: ConversionRequest) -> Result<Self, Self::Error> {
        let request = request.resolve();
        let TypedFields {
            format,
            codec,
            quality,
            resolution,
        } = request.typed_fields()?;
        let format = format.unwrap_or_default();
        let quality = quality.unwrap_or_default();
        let output = request
            .output
            .unwrap_or_else(|| converted_output_path(&request.input, format.as_str()));

        Ok(Self {
            input: request.input,
            output,
            format,
            quality,
            resolution,
            codec,
        })
    }
}

/// Empty values count as unset.
fn parse_field<T>(value: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    value
        .filter(|value| !value.is_empty())
        .map(str::parse)
        .transpose()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

/// `dir/movie.mov` + `webm` -> `dir/movie_converted.webm`
fn converted_output_path(input: &Path, format: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = OsString::from(stem);
    name.push("_converted.");
    name.push(format);
    input.with_file_name(name)
}
