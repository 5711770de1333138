pub mod health;
pub mod results;

pub use health::HealthResponse;
pub use results::{PublishResponse, ReloadResponse};
