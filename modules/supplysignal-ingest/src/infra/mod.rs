pub mod http;

pub use http::{FetchError, HttpClient};
