mod client;
mod http;
mod types;

pub use client::DownloadBackend;
pub use http::HttpBackend;
pub use types::Receipt;
