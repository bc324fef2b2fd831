pub mod client;
pub mod directory;
pub mod error;
pub mod prediction;
pub mod request;

pub use client::DermascanClient;
pub use directory::parse_providers;
pub use error::{ClientError, Endpoint};
pub use prediction::summarize_prediction;
pub use request::{ClassifyRequest, DirectoryRequest, JPEG_QUALITY, SEARCH_RADIUS_METERS};
