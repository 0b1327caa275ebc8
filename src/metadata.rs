//! Track metadata handed over by the now-playing client.

use serde::{Deserialize, Serialize};

use crate::error::InputValidationError;

/// Metadata for the track currently playing.
///
/// Strings are arbitrary Unicode; nothing here assumes ASCII. Values built
/// through [`TrackMetadata::new`] are already validated; values produced by
/// deserialization must go through [`TrackMetadata::validate`], which every
/// renderer calls before drawing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub song: String,
    pub album: String,
    pub artist: String,
    pub release_year: String,
    pub track_number: u32,
    pub total_tracks: u32,
}

impl TrackMetadata {
    /// Build and validate a metadata record.
    pub fn new(
        song: impl Into<String>,
        album: impl Into<String>,
        artist: impl Into<String>,
        release_year: impl Into<String>,
        track_number: u32,
        total_tracks: u32,
    ) -> Result<Self, InputValidationError> {
        let metadata = Self {
            song: song.into(),
            album: album.into(),
            artist: artist.into(),
            release_year: release_year.into(),
            track_number,
            total_tracks,
        };
        metadata.validate()?;
        Ok(metadata)
    }

    /// Build a record from a full release date such as `1997-05-21`.
    ///
    /// Only the leading four characters are kept, so `1997`, `1997-05` and
    /// `1997-05-21` all yield `1997`.
    pub fn from_release_date(
        song: impl Into<String>,
        album: impl Into<String>,
        artist: impl Into<String>,
        release_date: &str,
        track_number: u32,
        total_tracks: u32,
    ) -> Result<Self, InputValidationError> {
        let year: String = release_date.trim().chars().take(4).collect();
        Self::new(song, album, artist, year, track_number, total_tracks)
    }

    /// Check the record against the render contract.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        for (name, value) in [
            ("song", &self.song),
            ("album", &self.album),
            ("artist", &self.artist),
        ] {
            if value.trim().is_empty() {
                return Err(InputValidationError::MissingField(name));
            }
        }
        if self.release_year.trim().is_empty() {
            return Err(InputValidationError::MissingField("release_year"));
        }
        if self.release_year.chars().count() != 4 {
            return Err(InputValidationError::InvalidReleaseYear(
                self.release_year.clone(),
            ));
        }
        if self.track_number == 0 {
            return Err(InputValidationError::InvalidTrackNumber(self.track_number));
        }
        if self.track_number > self.total_tracks {
            return Err(InputValidationError::TrackNumberExceedsTotal {
                track_number: self.track_number,
                total_tracks: self.total_tracks,
            });
        }
        Ok(())
    }

    /// Album line as shown in poster layouts.
    pub fn album_with_year(&self) -> String {
        format!("{} - {}", self.album, self.release_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_latin_fields() {
        let metadata = TrackMetadata::new("夜に駆ける", "THE BOOK", "YOASOBI", "2021", 3, 10);
        assert!(metadata.is_ok());
    }

    #[test]
    fn release_date_keeps_year_only() {
        let metadata =
            TrackMetadata::from_release_date("Song", "Album", "Artist", "1997-05-21", 1, 1)
                .unwrap();
        assert_eq!(metadata.release_year, "1997");
    }

    #[test]
    fn rejects_empty_song() {
        let err = TrackMetadata::new("  ", "Album", "Artist", "2001", 1, 1).unwrap_err();
        assert_eq!(err, InputValidationError::MissingField("song"));
    }

    #[test]
    fn rejects_short_year() {
        let err = TrackMetadata::new("Song", "Album", "Artist", "97", 1, 1).unwrap_err();
        assert_eq!(err, InputValidationError::InvalidReleaseYear("97".into()));
    }

    #[test]
    fn rejects_track_zero_and_overflow() {
        assert_eq!(
            TrackMetadata::new("S", "A", "B", "2000", 0, 4).unwrap_err(),
            InputValidationError::InvalidTrackNumber(0)
        );
        assert_eq!(
            TrackMetadata::new("S", "A", "B", "2000", 5, 4).unwrap_err(),
            InputValidationError::TrackNumberExceedsTotal {
                track_number: 5,
                total_tracks: 4
            }
        );
    }

    #[test]
    fn deserialized_records_still_need_validation() {
        let json = r#"{"song":"","album":"A","artist":"B","release_year":"2000","track_number":1,"total_tracks":1}"#;
        let metadata: TrackMetadata = serde_json::from_str(json).unwrap();
        assert!(metadata.validate().is_err());
    }
}
