use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{is_valid_email, normalize_email, optional_text, required, ValidationError, INVALID_EMAIL};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SongRequest {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub song_title: String,
    pub artist_name: String,
    pub genre: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SongSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub song_title: Option<String>,
    pub artist_name: Option<String>,
    pub genre: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub name: String,
    pub email: String,
    pub song_title: String,
    pub artist_name: String,
    pub genre: String,
    pub reason: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SongCreated {
    pub id: i32,
    pub name: String,
    pub song_title: String,
    pub artist_name: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SongStats {
    pub total_songs: i64,
    pub genre_breakdown: Vec<GenreCount>,
}

impl SongSubmission {
    pub fn validate(&self) -> Result<NewSong, ValidationError> {
        let (Some(name), Some(email), Some(song_title), Some(artist_name)) = (
            required(&self.name),
            required(&self.email),
            required(&self.song_title),
            required(&self.artist_name),
        ) else {
            return Err(ValidationError::new(
                "Missing required fields: name, email, song_title, and artist_name are required",
            ));
        };

        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ValidationError::new(INVALID_EMAIL));
        }

        Ok(NewSong {
            name: name.to_string(),
            email,
            song_title: song_title.to_string(),
            artist_name: artist_name.to_string(),
            genre: optional_text(&self.genre),
            reason: optional_text(&self.reason),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_requires_title_and_artist() {
        let submission = SongSubmission {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            song_title: Some("September".into()),
            ..SongSubmission::default()
        };
        let err = submission.validate().unwrap_err();
        assert!(err.0.contains("artist_name"));
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let submission = SongSubmission {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            song_title: Some("September".into()),
            artist_name: Some("Earth, Wind & Fire".into()),
            ..SongSubmission::default()
        };
        let song = submission.validate().unwrap();
        assert_eq!(song.genre, "");
        assert_eq!(song.artist_name, "Earth, Wind & Fire");
    }
}
