pub mod cache;
pub mod doh;

pub use cache::LruResolutionCache;
pub use doh::{DohAnswer, DohResolver, DohResponse, DohTransport, HttpsJsonTransport};
