pub mod dns;
pub mod web;

pub use dns::{bind_dns, serve_dns};
pub use web::{bind_web, serve_web};
