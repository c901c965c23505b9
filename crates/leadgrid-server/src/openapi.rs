use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "leadgrid API",
        version = "0.1.0",
        description = "Business-listing aggregation over the places API: geocode, sweep, deduplicate, enrich."
    ),
    paths(crate::routes::scrape, crate::routes::health),
    components(schemas(
        crate::dto::ScrapeRequest,
        crate::dto::ScrapeResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "scrape", description = "Listing aggregation"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
