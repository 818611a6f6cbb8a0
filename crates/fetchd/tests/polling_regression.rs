//! End-to-end polling tests.
//!
//! Runs the `fetchd` binary against mock HTTP servers and checks the
//! availability lines it prints, plus the fatal configuration paths.

use std::io::Write;
use std::process::Output;
use std::time::Duration;

use fetchgrid_config::parse_endpoints;
use fetchgrid_health::{HttpProber, PollingScheduler};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

async fn run_fetchd(args: &[&str]) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    tokio::process::Command::new(env!("CARGO_BIN_EXE_fetchd"))
        .args(&args)
        .env("RUST_LOG", "warn")
        .output()
        .await
        .unwrap()
}

/// Mock that answers 200 `ok` times, then 500 forever.
async fn flaky_server(ok: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(ok)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(2)
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ten_cycles_eight_up_reports_eighty_percent() {
    let server = flaky_server(8).await;
    let port = server.address().port();
    let config = write_config(&format!(
        "- name: home\n  url: http://localhost:{port}/\n"
    ));

    let output = run_fetchd(&[
        config.path().to_str().unwrap(),
        "--cycles",
        "10",
        "--interval-secs",
        "0",
    ])
    .await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 10, "one line per cycle: {stdout}");
    assert_eq!(lines[7], "localhost has 100% availability percentage");
    assert_eq!(lines[9], "localhost has 80% availability percentage");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scheduler_against_mock_reports_eighty_percent() {
    let server = flaky_server(8).await;
    let port = server.address().port();
    let endpoints =
        parse_endpoints(&format!("- name: home\n  url: http://localhost:{port}/\n")).unwrap();

    let prober = HttpProber::new(Duration::from_millis(500)).unwrap();
    let mut scheduler = PollingScheduler::new(endpoints, prober)
        .with_reporter(fetchgrid_metrics::Reporter::new(Box::new(std::io::sink())));

    let mut last = None;
    for _ in 0..10 {
        last = Some(scheduler.run_cycle().await);
    }

    let report = last.unwrap();
    assert_eq!(
        report.to_string(),
        "localhost has 80% availability percentage\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mixed_hosts_report_independently() {
    let up = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&up)
        .await;
    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&down)
        .await;

    // Same host, different ports: one bucket. 127.0.0.1 vs localhost: two.
    let config = write_config(&format!(
        "- name: up\n  url: http://127.0.0.1:{}/a\n\
         - name: down\n  url: http://127.0.0.1:{}/b\n\
         - name: named\n  url: http://localhost:{}/c\n",
        up.address().port(),
        down.address().port(),
        up.address().port(),
    ));

    let output = run_fetchd(&[config.path().to_str().unwrap(), "--cycles", "1"]).await;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines: Vec<&str> = stdout.lines().collect();
    lines.sort_unstable();
    assert_eq!(
        lines,
        vec![
            "127.0.0.1 has 50% availability percentage",
            "localhost has 100% availability percentage",
        ]
    );
}

#[tokio::test]
async fn missing_name_exits_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = write_config(&format!(
        "- name: fine\n  url: {}/ok\n- url: {}/nameless\n",
        server.uri(),
        server.uri()
    ));

    let output = run_fetchd(&[config.path().to_str().unwrap(), "--cycles", "1"]).await;
    assert_eq!(output.status.code(), Some(255));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required name not found"), "stderr: {stderr}");

    server.verify().await;
}

#[tokio::test]
async fn missing_url_exits_with_error() {
    let config = write_config("- name: home\n");
    let output = run_fetchd(&[config.path().to_str().unwrap()]).await;
    assert_eq!(output.status.code(), Some(255));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required url not found"), "stderr: {stderr}");
}

#[tokio::test]
async fn unreadable_config_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let output = run_fetchd(&[missing.to_str().unwrap()]).await;
    assert_eq!(output.status.code(), Some(255));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unable to open config file"));
}

#[tokio::test]
async fn malformed_config_exits_with_error() {
    let config = write_config("- name: [unclosed\n");
    let output = run_fetchd(&[config.path().to_str().unwrap()]).await;
    assert_eq!(output.status.code(), Some(255));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unable to parse config"));
}

#[tokio::test]
async fn missing_argument_is_usage_error() {
    let output = run_fetchd(&[]).await;
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}
