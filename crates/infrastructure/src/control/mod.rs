pub mod client;
pub mod push;

pub use client::ControlClient;
pub use push::HttpResultPusher;
