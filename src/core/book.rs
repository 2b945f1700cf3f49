//! Book record model.
//!
//! The structured, AI-generated description of a book that drives the
//! entire landing page. Records are parsed from the model's JSON payload,
//! validated once, and never patched in place — a new search replaces the
//! record wholesale.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A character card on the landing page. Identity is list position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
}

/// A review quote with a 1-5 star rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default = "default_rating", deserialize_with = "de_rating")]
    pub rating: u8,
}

fn default_rating() -> u8 {
    5
}

/// One point on the narrative-tension curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalArcPoint {
    #[serde(deserialize_with = "de_chapter")]
    pub chapter: u32,
    #[serde(deserialize_with = "de_tension")]
    pub tension: u8,
    #[serde(default)]
    pub label: String,
}

/// The generated book record. Wire format is camelCase JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub tagline: String,
    pub synopsis: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub publication_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goodreads_url: Option<String>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub emotional_arc: Vec<EmotionalArcPoint>,
}

/// Errors from parsing a generated payload into a [`BookRecord`].
#[derive(Debug, Error)]
pub enum BookParseError {
    #[error("malformed book payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("generated book is missing required field: {0}")]
    MissingField(&'static str),
}

impl BookRecord {
    /// Parse and validate a model payload.
    ///
    /// Required fields (title, author, synopsis, characters, emotionalArc)
    /// must be non-empty. Ratings are clamped to 1-5 and tension to 0-100
    /// during deserialization; the arc is sorted by ascending chapter
    /// because the chart renders it in chapter order.
    pub fn from_json(payload: &str) -> Result<Self, BookParseError> {
        let mut record: BookRecord = serde_json::from_str(payload)?;

        if record.title.trim().is_empty() {
            return Err(BookParseError::MissingField("title"));
        }
        if record.author.trim().is_empty() {
            return Err(BookParseError::MissingField("author"));
        }
        if record.synopsis.trim().is_empty() {
            return Err(BookParseError::MissingField("synopsis"));
        }
        if record.characters.is_empty() {
            return Err(BookParseError::MissingField("characters"));
        }
        if record.emotional_arc.is_empty() {
            return Err(BookParseError::MissingField("emotionalArc"));
        }

        record.emotional_arc.sort_by_key(|p| p.chapter);

        Ok(record)
    }

    /// Peak tension point, if the arc is non-empty.
    pub fn peak_tension(&self) -> Option<&EmotionalArcPoint> {
        self.emotional_arc.iter().max_by_key(|p| p.tension)
    }
}

// The model emits plain JSON numbers (often floats) for these fields.
// Out-of-range values are clamped rather than rejected — a cosmetic field
// should not fail the whole page.

fn de_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.clamp(1.0, 5.0).round() as u8)
}

fn de_tension<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.clamp(0.0, 100.0).round() as u8)
}

fn de_chapter<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.clamp(0.0, u32::MAX as f64).round() as u32)
}
