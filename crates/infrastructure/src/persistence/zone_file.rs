use super::write_atomically;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use steer_dns_application::ports::ResultSink;
use steer_dns_domain::{DomainError, ProbeCycleResult};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const BEST_PREFIX: &str = "{{best:";

/// `YYMMDDHHMM` for `now`, bumped past `previous` when the clock has not
/// moved on. Fits the 32-bit SOA serial field.
pub fn next_serial(now: DateTime<Utc>, previous: u32) -> u32 {
    let serial = now
        .format("%y%m%d%H%M")
        .to_string()
        .parse::<u32>()
        .unwrap_or(0);
    if serial <= previous {
        previous.saturating_add(1)
    } else {
        serial
    }
}

/// Fill `{{serial}}`, `{{updated_at}}`, `{{records}}` and `{{best:<host>}}`.
pub fn render_zone(template: &str, result: &ProbeCycleResult, serial: u32) -> String {
    let records: String = result
        .best_addresses()
        .map(|(host, addr)| format!("{}. IN A {}\n", host.trim_end_matches('.'), addr))
        .collect();

    let rendered = template
        .replace("{{serial}}", &serial.to_string())
        .replace("{{updated_at}}", &result.updated_at.to_rfc3339())
        .replace("{{records}}", records.trim_end());

    let mut out = String::with_capacity(rendered.len());
    let mut rest = rendered.as_str();
    while let Some(start) = rest.find(BEST_PREFIX) {
        out.push_str(&rest[..start]);
        let after = &rest[start + BEST_PREFIX.len()..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let host = after[..end].trim().trim_end_matches('.').to_ascii_lowercase();
        match result.detail.get(&host) {
            Some(report) => out.push_str(&report.best.addr.to_string()),
            None => warn!(host = %host, "Zone template references unknown host"),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Renders the zone template for every published result, then runs the
/// configured reload commands in order.
///
/// The last serial is kept in `<output>.serial` so it keeps increasing
/// across restarts.
pub struct ZoneFileWriter {
    template: PathBuf,
    output: PathBuf,
    serial_path: PathBuf,
    reload_commands: Vec<Vec<String>>,
    last_serial: AtomicU32,
    seeded: Mutex<bool>,
}

impl ZoneFileWriter {
    pub fn new(
        template: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        reload_commands: Vec<Vec<String>>,
    ) -> Self {
        let output = output.into();
        let mut serial_path = output.as_os_str().to_owned();
        serial_path.push(".serial");
        Self {
            template: template.into(),
            output,
            serial_path: PathBuf::from(serial_path),
            reload_commands,
            last_serial: AtomicU32::new(0),
            seeded: Mutex::new(false),
        }
    }

    pub fn last_serial(&self) -> u32 {
        self.last_serial.load(Ordering::Acquire)
    }

    async fn run_reload_commands(&self) {
        for command in &self.reload_commands {
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            match Command::new(program).args(args).status().await {
                Ok(status) if status.success() => {
                    info!(command = %command.join(" "), "Reload command finished");
                }
                Ok(status) => {
                    warn!(command = %command.join(" "), code = ?status.code(), "Reload command failed");
                }
                Err(e) => {
                    warn!(command = %command.join(" "), error = %e, "Reload command could not start");
                }
            }
        }
    }
}

#[async_trait]
impl ResultSink for ZoneFileWriter {
    fn name(&self) -> &'static str {
        "zone"
    }

    async fn deliver(&self, result: &ProbeCycleResult) -> Result<(), DomainError> {
        let mut seeded = self.seeded.lock().await;
        if !*seeded {
            if let Some(previous) = read_serial(&self.serial_path).await {
                debug!(serial = previous, "Resuming zone serial");
                self.last_serial.fetch_max(previous, Ordering::AcqRel);
            }
            *seeded = true;
        }

        let template = tokio::fs::read_to_string(&self.template)
            .await
            .map_err(|e| DomainError::IoError(format!("{}: {}", self.template.display(), e)))?;

        let serial = next_serial(Utc::now(), self.last_serial());
        let zone = render_zone(&template, result, serial);
        write_atomically(&self.output, zone.as_bytes()).await?;
        self.last_serial.store(serial, Ordering::Release);
        if let Err(e) = write_atomically(&self.serial_path, serial.to_string().as_bytes()).await {
            warn!(error = %e, "Failed to record zone serial");
        }
        drop(seeded);
        info!(path = %self.output.display(), serial, "Zone file written");

        self.run_reload_commands().await;
        Ok(())
    }
}

async fn read_serial(path: &Path) -> Option<u32> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    match raw.trim().parse() {
        Ok(serial) => Some(serial),
        Err(_) => {
            warn!(path = %path.display(), "Ignoring unreadable zone serial file");
            None
        }
    }
}
