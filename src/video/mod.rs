mod extractor;
pub mod preview;
mod types;

pub use extractor::extract;
pub use preview::PreviewDescriptor;
pub use types::{VideoId, VideoReference};
