use chrono::{TimeZone, Utc};
use std::net::Ipv4Addr;
use steer_dns_application::ports::{ResultSink, ResultStorePort};
use steer_dns_domain::{EndpointReport, HostReport, ProbeCycleResult};
use steer_dns_infrastructure::persistence::{JsonResultStore, ZoneFileWriter};
use tempfile::TempDir;

fn sample() -> ProbeCycleResult {
    let mut result = ProbeCycleResult::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    result.detail.insert(
        "media.example.test".to_string(),
        HostReport {
            default: Some(EndpointReport {
                addr: Ipv4Addr::new(192, 0, 2, 1),
                ping: 31.25,
                speed: 2_000_000.0,
            }),
            best: EndpointReport {
                addr: Ipv4Addr::new(198, 51, 100, 20),
                ping: 12.5,
                speed: 10_000_000.0,
            },
            live: None,
        },
    );
    result
}

// ── result store ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_result_file_loads_as_none() {
    let dir = TempDir::new().unwrap();
    let store = JsonResultStore::new(dir.path().join("result.json"));

    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_saved_result_is_loaded_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("result.json");
    let store = JsonResultStore::new(&path);

    store.save(&sample()).await.unwrap();

    assert_eq!(store.load().await.unwrap(), Some(sample()));
    assert!(!dir.path().join("state").join("result.json.tmp").exists());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["detail"]["media.example.test"]["best"]["addr"], "198.51.100.20");
    assert!(json["detail"]["media.example.test"].get("live").is_none());
}

#[tokio::test]
async fn test_corrupt_result_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(JsonResultStore::new(&path).load().await.is_err());
}

// ── zone file ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_zone_file_is_rendered_and_reload_commands_run() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("zone.tpl");
    let output = dir.path().join("zone.db");
    let marker = dir.path().join("reloaded");
    std::fs::write(
        &template,
        "$TTL 60\n@ IN SOA ns. admin. ( {{serial}} 3600 600 86400 60 )\n{{records}}\n",
    )
    .unwrap();

    let writer = ZoneFileWriter::new(
        &template,
        &output,
        vec![vec![
            "touch".to_string(),
            marker.to_string_lossy().into_owned(),
        ]],
    );
    writer.deliver(&sample()).await.unwrap();

    let zone = std::fs::read_to_string(&output).unwrap();
    assert!(zone.contains("media.example.test. IN A 198.51.100.20"));
    assert!(zone.contains(&writer.last_serial().to_string()));
    assert!(marker.exists());
}

#[tokio::test]
async fn test_zone_serial_increases_on_every_write() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("zone.tpl");
    std::fs::write(&template, "{{serial}}").unwrap();
    let writer = ZoneFileWriter::new(&template, dir.path().join("zone.db"), Vec::new());

    writer.deliver(&sample()).await.unwrap();
    let first = writer.last_serial();
    writer.deliver(&sample()).await.unwrap();

    assert!(writer.last_serial() > first);
}

#[tokio::test]
async fn test_zone_serial_keeps_increasing_after_restart() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("zone.tpl");
    let output = dir.path().join("zone.db");
    std::fs::write(&template, "{{serial}}").unwrap();

    let before = ZoneFileWriter::new(&template, &output, Vec::new());
    for _ in 0..3 {
        before.deliver(&sample()).await.unwrap();
    }
    let last_before = before.last_serial();
    drop(before);

    let after = ZoneFileWriter::new(&template, &output, Vec::new());
    after.deliver(&sample()).await.unwrap();

    assert!(after.last_serial() > last_before);
    let written: u32 = std::fs::read_to_string(&output).unwrap().parse().unwrap();
    assert_eq!(written, after.last_serial());
    assert!(dir.path().join("zone.db.serial").exists());
}

#[tokio::test]
async fn test_zone_serial_resumes_from_recorded_value() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("zone.tpl");
    let output = dir.path().join("zone.db");
    std::fs::write(&template, "{{serial}}").unwrap();
    std::fs::write(dir.path().join("zone.db.serial"), "4000000000\n").unwrap();

    let writer = ZoneFileWriter::new(&template, &output, Vec::new());
    writer.deliver(&sample()).await.unwrap();

    assert_eq!(writer.last_serial(), 4_000_000_001);
}

#[tokio::test]
async fn test_missing_template_fails_delivery() {
    let dir = TempDir::new().unwrap();
    let writer = ZoneFileWriter::new(
        dir.path().join("absent.tpl"),
        dir.path().join("zone.db"),
        Vec::new(),
    );

    assert!(writer.deliver(&sample()).await.is_err());
    assert!(!dir.path().join("zone.db").exists());
}
