// Adapters layer: concrete implementations for external systems (http, filesystem).

pub mod http;
pub mod storage;

pub use http::HttpSource;
pub use storage::LocalStorage;
