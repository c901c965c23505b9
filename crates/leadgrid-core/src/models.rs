use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default search radius in meters when the caller omits one.
pub const DEFAULT_RADIUS_METERS: f64 = 50_000.0;

fn default_radius() -> f64 {
    DEFAULT_RADIUS_METERS
}

/// Inbound search request: what to look for, and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub city: String,
    pub keyword: String,
    /// Optional sub-areas of the city; each one is geocoded separately.
    #[serde(default)]
    pub areas: Vec<String>,
    /// Search radius in meters.
    #[serde(default = "default_radius")]
    pub radius: f64,
}

impl SearchQuery {
    pub fn new(city: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            keyword: keyword.into(),
            areas: Vec::new(),
            radius: DEFAULT_RADIUS_METERS,
        }
    }

    pub fn with_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.areas = areas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Reject queries that cannot produce a meaningful search.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.city.trim().is_empty() {
            return Err(AppError::InvalidQuery("city must not be blank".into()));
        }
        if self.keyword.trim().is_empty() {
            return Err(AppError::InvalidQuery("keyword must not be blank".into()));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(AppError::InvalidQuery(format!(
                "radius must be a positive number of meters, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// A point on the globe, in decimal degrees.
///
/// Serialized with the places API's `lng` key; `lon` is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    #[serde(rename = "lng", alias = "lon")]
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlusCode {
    pub global_code: Option<String>,
    pub compound_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    pub weekday_text: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub photo_reference: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Option<Coordinate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorialSummary {
    pub overview: Option<String>,
}

/// Fields a nearby-search result carries for one place.
///
/// Every field is optional: upstream omits whatever it does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: Option<String>,
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub vicinity: Option<String>,
    pub plus_code: Option<PlusCode>,
    pub business_status: Option<String>,
    pub photos: Vec<Photo>,
    pub geometry: Option<Geometry>,
    pub opening_hours: Option<OpeningHours>,
    pub price_level: Option<u8>,
}

/// Extended fields returned by the place-details lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceDetails {
    pub formatted_address: Option<String>,
    pub plus_code: Option<PlusCode>,
    pub opening_hours: Option<OpeningHours>,
    pub international_phone_number: Option<String>,
    pub website: Option<String>,
    pub price_level: Option<u8>,
    pub url: Option<String>,
    pub editorial_summary: Option<EditorialSummary>,
}

/// Contact signals harvested from a business website.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactSignals {
    pub emails: Vec<String>,
    pub social_media: Vec<String>,
}

/// Outcome of the fallback page scrape, reported inline per place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FallbackData {
    Contacts(ContactSignals),
    Failed { error: String },
}

/// One unique place, accumulating data stage by stage.
///
/// Stages only ever add: the search summary is never overwritten, details and
/// fallback data are attached beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub summary: PlaceSummary,
    pub details: Option<PlaceDetails>,
    pub fallback: Option<FallbackData>,
    pub is_duplicate: bool,
}

impl PlaceRecord {
    pub fn new(summary: PlaceSummary) -> Self {
        Self {
            summary,
            details: None,
            fallback: None,
            is_duplicate: false,
        }
    }

    pub fn place_id(&self) -> &str {
        &self.summary.place_id
    }

    /// Website reported by the details lookup, if any.
    pub fn website(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.website.as_deref())
            .filter(|w| !w.trim().is_empty())
    }
}

/// What a retry-log entry is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetryContext {
    Place { place_id: String },
    Location { location: Coordinate },
    Query { query: String },
}

/// A recoverable failure recorded during one top-level request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryLogEntry {
    #[serde(flatten)]
    pub context: RetryContext,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only diagnostics for a single scrape.
#[derive(Debug, Clone, Default)]
pub struct RetryLog {
    entries: Vec<RetryLogEntry>,
}

impl RetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, context: RetryContext, error: &AppError) {
        self.entries.push(RetryLogEntry {
            context,
            error: error.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RetryLogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RetryLogEntry> {
        self.entries
    }
}

/// Public projection of an enriched place.
///
/// Fields upstream did not supply are left out of the JSON; `fallback_data`
/// is always present and `null` when no scrape ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedPlace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plus_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_status: Option<String>,
    pub photo_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    pub place_id: String,
    pub is_duplicate: bool,
    pub fallback_data: Option<FallbackData>,
}

/// The unified result of one scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub total_results: usize,
    pub results: Vec<FormattedPlace>,
    pub retry_logs: Vec<RetryLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_radius() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"city": "Delhi", "keyword": "dentist"}"#).unwrap();
        assert_eq!(query.radius, DEFAULT_RADIUS_METERS);
        assert!(query.areas.is_empty());
    }

    #[test]
    fn test_query_validation() {
        assert!(SearchQuery::new("Delhi", "dentist").validate().is_ok());
        assert!(SearchQuery::new("  ", "dentist").validate().is_err());
        assert!(SearchQuery::new("Delhi", "").validate().is_err());
        assert!(
            SearchQuery::new("Delhi", "dentist")
                .with_radius(0.0)
                .validate()
                .is_err()
        );
        assert!(
            SearchQuery::new("Delhi", "dentist")
                .with_radius(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_coordinate_accepts_lon_and_lng() {
        let a: Coordinate = serde_json::from_str(r#"{"lat": 1.5, "lng": 2.5}"#).unwrap();
        let b: Coordinate = serde_json::from_str(r#"{"lat": 1.5, "lon": 2.5}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_value(a).unwrap(),
            serde_json::json!({"lat": 1.5, "lng": 2.5})
        );
    }

    #[test]
    fn test_retry_log_entry_flattens_context() {
        let mut log = RetryLog::new();
        log.record(
            RetryContext::Place {
                place_id: "P123".into(),
            },
            &AppError::Timeout(30),
        );

        let json = serde_json::to_value(&log.entries()[0]).unwrap();
        assert_eq!(json["place_id"], "P123");
        assert!(json["error"].as_str().unwrap().contains("timed out"));
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_fallback_data_shapes() {
        let ok = FallbackData::Contacts(ContactSignals {
            emails: vec!["info@clinic.in".into()],
            social_media: vec![],
        });
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"emails": ["info@clinic.in"], "social_media": []})
        );

        let failed = FallbackData::Failed {
            error: "navigation timeout".into(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "navigation timeout"})
        );
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let summary: PlaceSummary =
            serde_json::from_str(r#"{"place_id": "abc", "name": "Smile Care"}"#).unwrap();
        assert_eq!(summary.place_id, "abc");
        assert!(summary.photos.is_empty());
        assert!(summary.geometry.is_none());
    }

    #[test]
    fn test_blank_website_is_ignored() {
        let mut record = PlaceRecord::new(PlaceSummary {
            place_id: "abc".into(),
            ..Default::default()
        });
        assert_eq!(record.website(), None);

        record.details = Some(PlaceDetails {
            website: Some(" ".into()),
            ..Default::default()
        });
        assert_eq!(record.website(), None);

        record.details = Some(PlaceDetails {
            website: Some("https://smile.example".into()),
            ..Default::default()
        });
        assert_eq!(record.website(), Some("https://smile.example"));
    }
}
