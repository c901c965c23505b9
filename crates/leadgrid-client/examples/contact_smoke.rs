/// Smoke-test for `BrowserScraper`.
///
/// Launches a headless Chromium against a public page and prints the contact
/// signals found on it.
///
/// Run with:
///   cargo run -p leadgrid-client --example contact_smoke --features browser -- https://example.com
use leadgrid_client::BrowserScraper;
use leadgrid_core::traits::PageScraper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    println!("Scraping {url} …");
    let signals = BrowserScraper::new().scrape(&url).await?;

    println!("emails: {:?}", signals.emails);
    println!("social: {:?}", signals.social_media);
    Ok(())
}
