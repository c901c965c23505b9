pub mod contacts;
pub mod guard;
pub mod transport;

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "browser")]
pub use browser::BrowserScraper;
pub use contacts::extract_contacts;
pub use transport::ReqwestTransport;
