pub mod error;
pub mod http;
pub mod retry;

pub use error::{PpvError, Result};
pub use http::{HttpClient, RawResponse, Transport, TransportError};
pub use retry::RetryPolicy;
