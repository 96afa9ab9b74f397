mod client;
mod errors;
pub mod types;
pub use self::client::{Client, Credentials, DEFAULT_BASE_URL};
pub use self::errors::Error;
pub use self::types::{MetricSample, Series};
