use serde::Serialize;
use steer_dns_application::use_cases::PublishOutcome;

#[derive(Serialize, Debug)]
pub struct PublishResponse {
    pub success: bool,
    pub hosts_published: usize,
    pub persisted: bool,
    pub failed_sinks: Vec<&'static str>,
}

impl From<PublishOutcome> for PublishResponse {
    fn from(outcome: PublishOutcome) -> Self {
        Self {
            success: true,
            hosts_published: outcome.hosts_published,
            persisted: outcome.persisted,
            failed_sinks: outcome.failed_sinks,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ReloadResponse {
    pub success: bool,
    pub hosts: usize,
    pub message: String,
}
