//! Error taxonomy for card configuration and per-render input validation.

use core::fmt;

/// Static configuration is unusable; raised when a renderer or font set is
/// constructed, never mid-render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A `FontSpec` was built with no candidate sizes.
    EmptyCandidateSizes,
    /// Candidate sizes must be strictly descending.
    CandidateSizesNotDescending { previous: u32, next: u32 },
    /// Candidate sizes must be positive.
    InvalidCandidateSize(u32),
    /// Canvas width or height is zero.
    InvalidCanvas { width: u32, height: u32 },
    /// A font spec references a resource the backend does not know.
    MissingFontResource(String),
    /// A font file could not be read.
    UnreadableFontResource { name: String, reason: String },
    /// Font bytes were read but could not be parsed.
    InvalidFontData(String),
    /// Card variant name is not recognised.
    UnknownVariant(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCandidateSizes => write!(f, "font spec has no candidate sizes"),
            Self::CandidateSizesNotDescending { previous, next } => write!(
                f,
                "font candidate sizes must be strictly descending ({} then {})",
                previous, next
            ),
            Self::InvalidCandidateSize(size) => {
                write!(f, "font candidate size must be positive (got {})", size)
            }
            Self::InvalidCanvas { width, height } => {
                write!(f, "canvas dimensions must be positive ({}x{})", width, height)
            }
            Self::MissingFontResource(name) => write!(f, "font resource '{}' is not loaded", name),
            Self::UnreadableFontResource { name, reason } => {
                write!(f, "font resource '{}' could not be read: {}", name, reason)
            }
            Self::InvalidFontData(name) => write!(f, "font resource '{}' is not a valid font", name),
            Self::UnknownVariant(name) => write!(f, "unknown card variant '{}'", name),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Per-render input violates the caller contract. No partial card is produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputValidationError {
    /// A required metadata string is empty.
    MissingField(&'static str),
    /// Release year is not four characters.
    InvalidReleaseYear(String),
    /// Track numbers start at 1.
    InvalidTrackNumber(u32),
    /// `track_number` is larger than `total_tracks`.
    TrackNumberExceedsTotal { track_number: u32, total_tracks: u32 },
    /// Album art has a zero dimension.
    InvalidArtDimensions { width: u32, height: u32 },
}

impl fmt::Display for InputValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "metadata field '{}' is missing", field),
            Self::InvalidReleaseYear(year) => {
                write!(f, "release year '{}' is not four characters", year)
            }
            Self::InvalidTrackNumber(n) => write!(f, "track number must be >= 1 (got {})", n),
            Self::TrackNumberExceedsTotal {
                track_number,
                total_tracks,
            } => write!(
                f,
                "track number {} exceeds total tracks {}",
                track_number, total_tracks
            ),
            Self::InvalidArtDimensions { width, height } => {
                write!(f, "album art dimensions must be positive ({}x{})", width, height)
            }
        }
    }
}

impl std::error::Error for InputValidationError {}

/// Failure returned by a card render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardError {
    Configuration(ConfigurationError),
    Input(InputValidationError),
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "card configuration error: {}", err),
            Self::Input(err) => write!(f, "card input error: {}", err),
        }
    }
}

impl std::error::Error for CardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::Input(err) => Some(err),
        }
    }
}

impl From<ConfigurationError> for CardError {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}

impl From<InputValidationError> for CardError {
    fn from(value: InputValidationError) -> Self {
        Self::Input(value)
    }
}
