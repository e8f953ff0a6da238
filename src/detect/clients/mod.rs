pub mod http;
pub mod stub;

pub use http::{HttpDetectionClient, DEFAULT_API_URL};
pub use stub::StubDetectionClient;
