//! Request construction and response decoding for the places/geocoding API.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::AppError;
use crate::executor::ResilientExecutor;
use crate::models::{Coordinate, Geometry, PlaceDetails, PlaceSummary};
use crate::traits::{Sleeper, Transport};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Fields requested from the place-details endpoint.
pub const DETAIL_FIELDS: &str = "formatted_address,plus_code,opening_hours,international_phone_number,website,price_level,url,editorial_summary";

const PHOTO_MAX_WIDTH: &str = "400";

/// Builds authenticated endpoint URLs under a common base.
#[derive(Debug, Clone)]
pub struct PlacesEndpoints {
    base: Url,
    api_key: String,
}

impl PlacesEndpoints {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, AppError> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid places API base URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "Places API base URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            base,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn geocode(&self, address: &str) -> Url {
        let mut url = self.endpoint(&["geocode", "json"]);
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);
        url
    }

    pub fn nearby_search(
        &self,
        location: &Coordinate,
        radius: f64,
        keyword: &str,
        page_token: Option<&str>,
    ) -> Url {
        let mut url = self.endpoint(&["place", "nearbysearch", "json"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("location", &format!("{},{}", location.lat, location.lon))
                .append_pair("radius", &radius.to_string())
                .append_pair("keyword", keyword)
                .append_pair("key", &self.api_key);
            if let Some(token) = page_token {
                query.append_pair("pagetoken", token);
            }
        }
        url
    }

    pub fn place_details(&self, place_id: &str) -> Url {
        let mut url = self.endpoint(&["place", "details", "json"]);
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", DETAIL_FIELDS)
            .append_pair("key", &self.api_key);
        url
    }

    pub fn photo(&self, photo_reference: &str) -> String {
        let mut url = self.endpoint(&["place", "photo"]);
        url.query_pairs_mut()
            .append_pair("maxwidth", PHOTO_MAX_WIDTH)
            .append_pair("photoreference", photo_reference)
            .append_pair("key", &self.api_key);
        url.into()
    }
}

// ---- API envelopes ----

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceSummary>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

/// One page of nearby-search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyPage {
    pub results: Vec<PlaceSummary>,
    pub next_page_token: Option<String>,
}

/// `OK` and `ZERO_RESULTS` are successes; an absent status is tolerated.
fn check_status(status: Option<&str>, error_message: Option<&str>) -> Result<(), AppError> {
    match status {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
        Some("OVER_QUERY_LIMIT") if error_message.is_none() => Err(AppError::RateLimitExceeded),
        Some(other) => Err(AppError::PlacesApi {
            status: other.to_string(),
            message: error_message.unwrap_or_default().to_string(),
        }),
    }
}

fn decode<R: DeserializeOwned>(body: serde_json::Value) -> Result<R, AppError> {
    Ok(serde_json::from_value(body)?)
}

/// Typed access to the three upstream lookups, each run through the
/// resilient executor.
#[derive(Clone)]
pub struct PlacesGateway<T, S> {
    executor: ResilientExecutor<T, S>,
    endpoints: PlacesEndpoints,
}

impl<T: Transport, S: Sleeper> PlacesGateway<T, S> {
    pub fn new(executor: ResilientExecutor<T, S>, endpoints: PlacesEndpoints) -> Self {
        Self {
            executor,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &PlacesEndpoints {
        &self.endpoints
    }

    /// Geocode an address to its first match, `None` when nothing matched.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError> {
        let url = self.endpoints.geocode(address);
        self.executor
            .execute(&url, |body| {
                let resp: GeocodeResponse = decode(body)?;
                check_status(resp.status.as_deref(), resp.error_message.as_deref())?;
                Ok(resp
                    .results
                    .into_iter()
                    .next()
                    .and_then(|r| r.geometry)
                    .and_then(|g| g.location))
            })
            .await
    }

    pub async fn nearby_search(
        &self,
        location: &Coordinate,
        radius: f64,
        keyword: &str,
        page_token: Option<&str>,
    ) -> Result<NearbyPage, AppError> {
        let url = self
            .endpoints
            .nearby_search(location, radius, keyword, page_token);
        self.executor
            .execute(&url, |body| {
                let resp: NearbySearchResponse = decode(body)?;
                check_status(resp.status.as_deref(), resp.error_message.as_deref())?;
                Ok(NearbyPage {
                    results: resp.results,
                    next_page_token: resp.next_page_token.filter(|t| !t.is_empty()),
                })
            })
            .await
    }

    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, AppError> {
        let url = self.endpoints.place_details(place_id);
        self.executor
            .execute(&url, |body| {
                let resp: DetailsResponse = decode(body)?;
                check_status(resp.status.as_deref(), resp.error_message.as_deref())?;
                Ok(resp.result)
            })
            .await
    }
}
