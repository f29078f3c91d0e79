pub mod client;
pub mod error;
pub mod normalize;
mod rate_limit;
pub mod types;

pub use client::ShortimizeClient;
pub use error::ShortimizeError;
pub use normalize::normalize_video;
pub use types::{ShortimizeVideo, ShortimizeVideosResponse};
