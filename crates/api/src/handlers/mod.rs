pub mod config;
pub mod health;
pub mod results;

pub use config::reload_config;
pub use health::health_check;
pub use results::{get_results, push_results};
