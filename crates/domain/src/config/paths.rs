use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// JSON document holding the last probe cycle result.
    #[serde(default = "default_result_file")]
    pub result_file: String,

    #[serde(default)]
    pub zone_template: Option<String>,

    #[serde(default)]
    pub zone_output: Option<String>,

    /// Commands run after the zone file is written, e.g. `["rndc", "reload"]`.
    #[serde(default)]
    pub reload_commands: Vec<Vec<String>>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            result_file: default_result_file(),
            zone_template: None,
            zone_output: None,
            reload_commands: Vec::new(),
        }
    }
}

fn default_result_file() -> String {
    "steer-dns-result.json".to_string()
}
