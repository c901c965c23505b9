//! Projection of enriched records into the public result shape.

use crate::models::{FormattedPlace, PlaceRecord};
use crate::places::PlacesEndpoints;

/// Flatten a record into a [`FormattedPlace`].
///
/// Detail values win over search values for fields both carry. Photo
/// references are expanded into fetchable URLs via `endpoints`.
pub fn format_place(record: &PlaceRecord, endpoints: &PlacesEndpoints) -> FormattedPlace {
    let summary = &record.summary;
    let details = record.details.as_ref();

    let plus_code = details
        .and_then(|d| d.plus_code.as_ref())
        .or(summary.plus_code.as_ref())
        .and_then(|p| p.global_code.clone());

    let opening_hours = details
        .and_then(|d| d.opening_hours.as_ref())
        .or(summary.opening_hours.as_ref())
        .and_then(|h| h.weekday_text.clone());

    let location = summary.geometry.as_ref().and_then(|g| g.location);

    FormattedPlace {
        business_name: summary.name.clone(),
        category: summary.types.first().cloned(),
        rating: summary.rating,
        review_count: summary.user_ratings_total,
        address: details
            .and_then(|d| d.formatted_address.clone())
            .or_else(|| summary.vicinity.clone()),
        plus_code,
        google_maps_url: details.and_then(|d| d.url.clone()),
        opening_hours,
        phone_number: details.and_then(|d| d.international_phone_number.clone()),
        website_url: details.and_then(|d| d.website.clone()),
        business_status: summary.business_status.clone(),
        photo_urls: summary
            .photos
            .iter()
            .map(|p| endpoints.photo(&p.photo_reference))
            .collect(),
        latitude: location.map(|c| c.lat),
        longitude: location.map(|c| c.lon),
        description: details
            .and_then(|d| d.editorial_summary.as_ref())
            .and_then(|e| e.overview.clone()),
        price_level: details.and_then(|d| d.price_level).or(summary.price_level),
        place_id: summary.place_id.clone(),
        is_duplicate: record.is_duplicate,
        fallback_data: record.fallback.clone(),
    }
}

pub fn format_places(records: &[PlaceRecord], endpoints: &PlacesEndpoints) -> Vec<FormattedPlace> {
    records.iter().map(|r| format_place(r, endpoints)).collect()
}
