//! End-to-end dashboard behaviour against a mocked trace backend.
//!
//! Every test stands up a `wiremock` server playing the backend API and
//! drives the `Dashboard` controller the way page interactions would.

use std::time::Duration;

use serde_json::json;
use tracelens::chart::ChartOptions;
use tracelens::dashboard::Dashboard;
use tracelens::fetcher::ApiClient;
use tracelens::models::{Marker, QueryType};
use tracelens::query_panel::Filters;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event(name: &str, fname: &str, start_us: u32, end_us: u32) -> serde_json::Value {
    json!({
        "event_name": name,
        "en_datetime": format!("2024-05-01 10:00:00.{:06}", start_us),
        "ex_datetime": format!("2024-05-01 10:00:00.{:06}", end_us),
        "fname": fname,
        "countbytes": 128,
        "latency": end_us - start_us,
        "ret": 128
    })
}

fn page(page: u32, total_pages: u32) -> serde_json::Value {
    json!({
        "data": [{"fname": format!("/data/file{}", page), "count": page * 10}],
        "page": page,
        "total_pages": total_pages,
        "prev_page": if page > 1 { json!(page - 1) } else { json!(null) },
        "next_page": if page < total_pages { json!(page + 1) } else { json!(null) },
    })
}

async fn mount_procs(server: &MockServer, procs: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/events/procs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(procs)))
        .mount(server)
        .await;
}

async fn mount_initial_events(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event("open", "/etc/passwd", 0, 10),
            event("read", "/etc/passwd", 20, 90),
        ])))
        .mount(server)
        .await;
}

fn dashboard(server: &MockServer) -> Dashboard {
    let client = ApiClient::new(&server.uri(), None).unwrap();
    Dashboard::new(client, ChartOptions::default(), Vec::new())
}

#[tokio::test]
async fn test_load_populates_procs_and_initial_chart() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash", "nginx: worker"]).await;
    mount_initial_events(&server).await;

    let mut dash = dashboard(&server);
    dash.load().await;

    assert_eq!(dash.selector().options().len(), 2);
    assert_eq!(dash.selector().options()[1].id, "proc_nginx__worker");
    assert!(dash.selector().selected().is_none());
    assert_eq!(dash.chart().segments().len(), 2);
    assert!(dash.alerts().is_empty());
    // no process yet, so the report stays empty
    assert!(dash.panel().last_response().is_none());
}

#[tokio::test]
async fn test_select_process_charts_it_and_loads_report() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .and(query_param("proc", "bash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event("write", "/dev/pts/0", 0, 5),
            event("write", "/dev/pts/0", 6, 9),
            event("read", "/home/u/.bashrc", 1, 4),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/files/count"))
        .and(query_param("page", "1"))
        .and(query_param("proc", "bash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    assert!(dash.select_process("bash").await);

    assert_eq!(dash.chart().segments().len(), 3);
    assert_eq!(dash.selector().selected(), Some("bash"));
    let controls = dash.panel().controls();
    assert_eq!(controls.info, "Page 1 of 2");
    assert!(controls.prev_disabled);
    assert!(!controls.next_disabled);
}

#[tokio::test]
async fn test_unknown_process_is_rejected_without_fetch() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    assert!(!dash.select_process("zsh").await);
}

#[tokio::test]
async fn test_process_without_events_renders_empty_chart() {
    let server = MockServer::start().await;
    mount_procs(&server, &["idle"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [], "page": 1, "total_pages": 0, "prev_page": null, "next_page": null
        })))
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    assert!(dash.select_process("idle").await);

    assert!(dash.chart().is_empty());
    assert!(dash.chart().segments().is_empty());
    assert!(dash.chart().to_svg().contains("</svg>"));
    assert!(dash.alerts().is_empty());
}

#[tokio::test]
async fn test_paging_follows_server_cursor_and_type_change_resets() {
    let server = MockServer::start().await;
    mount_procs(&server, &["db"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    for p in 1..=2u32 {
        Mock::given(method("GET"))
            .and(path("/api/files/count"))
            .and(query_param("page", p.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(p, 2)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/files/bytes"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    dash.select_process("db").await;

    assert!(dash.next_page().await);
    assert_eq!(dash.panel().current_page(), 2);
    let controls = dash.panel().controls();
    assert!(controls.next_disabled, "next_page: null must disable next");
    assert!(!dash.next_page().await);
    assert_eq!(dash.panel().current_page(), 2);

    dash.change_query_type(QueryType::Bytes).await;
    assert_eq!(dash.panel().current_page(), 1);
    assert_eq!(dash.panel().controls().info, "Page 1 of 5");
    assert!(dash.panel().table_html().contains(">bytes</th>"));
}

#[tokio::test]
async fn test_file_click_without_process_does_not_fetch() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    assert!(!dash.click_file("/etc/passwd").await);
    assert_eq!(dash.chart().segments().len(), 2);
}

#[tokio::test]
async fn test_file_click_scopes_chart_and_filters_keep_scope() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/files/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .and(query_param("fname", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .and(query_param("fname", "/data/file1"))
        .and(query_param("hunk", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event("read", "/data/file1", 0, 50)
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .and(query_param("fname", "/data/file1"))
        .and(query_param("hunk", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event("read", "/data/file1", 0, 50),
            event("read", "/data/file1", 60, 70),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    dash.select_process("bash").await;
    assert!(dash.click_file("/data/file1").await);
    assert_eq!(dash.chart().segments().len(), 1);

    dash.set_filters(Filters {
        hunk: true,
        ..Filters::default()
    })
    .await;
    assert_eq!(dash.chart().segments().len(), 2);
    assert_eq!(
        dash.chart_scope().and_then(|q| q.fname.as_deref()),
        Some("/data/file1")
    );
}

#[tokio::test]
async fn test_failed_chart_fetch_keeps_previous_chart_and_alerts() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files/count"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    let before = dash.chart().to_svg();

    dash.select_process("bash").await;
    assert_eq!(dash.chart().to_svg(), before);
    // chart failure alerts; report failure is only logged
    let alerts = dash.alerts_mut().drain();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("Error loading events"));
    assert!(dash.panel().last_response().is_none());
}

#[tokio::test]
async fn test_markers_are_drawn_on_every_chart() {
    let server = MockServer::start().await;
    mount_procs(&server, &[]).await;
    mount_initial_events(&server).await;

    let client = ApiClient::new(&server.uri(), None).unwrap();
    let mut dash = Dashboard::new(
        client,
        ChartOptions::default(),
        vec![Marker::new("2024-05-01 10:00:00.000050")],
    );
    dash.load().await;
    assert_eq!(dash.chart().marker_lines().len(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_raises_alerts() {
    let client = ApiClient::new("http://127.0.0.1:1", None).unwrap();
    let mut dash = Dashboard::new(client, ChartOptions::default(), Vec::new());
    dash.load().await;
    assert_eq!(dash.alerts().peek().count(), 2);
    assert!(dash.chart().is_empty());
}

#[tokio::test]
async fn test_last_issued_chart_wins_over_late_answer() {
    let server = MockServer::start().await;
    mount_procs(&server, &["a", "b"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .and(query_param("proc", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event("read", "/a", 0, 5),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .and(query_param("proc", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event("read", "/b", 0, 5),
            event("write", "/b", 6, 9),
            event("read", "/b", 10, 12),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1)))
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    let first = dash.plan_select("a").unwrap();
    let second = dash.plan_select("b").unwrap();

    // the later selection answers first, the earlier one arrives last
    dash.execute(second).await;
    assert_eq!(dash.chart().segments().len(), 3);
    for fetch in first {
        let done = fetch.run(dash.client()).await;
        assert!(!dash.complete(done));
    }
    assert_eq!(dash.chart().segments().len(), 3);
    assert_eq!(dash.selector().selected(), Some("b"));
    assert!(dash.alerts().is_empty());
}

#[tokio::test]
async fn test_timed_out_chart_fetch_keeps_previous_chart() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1)))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), Some(Duration::from_millis(200))).unwrap();
    let mut dash = Dashboard::new(client, ChartOptions::default(), Vec::new());
    dash.load().await;
    let before = dash.chart().to_svg();

    dash.select_process("bash").await;
    assert_eq!(dash.chart().to_svg(), before);
    assert_eq!(dash.chart().segments().len(), 2);
    let alerts = dash.alerts_mut().drain();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("Error loading events"));
    // the report request is independent and still lands
    assert_eq!(dash.panel().controls().info, "Page 1 of 1");
}

#[tokio::test]
async fn test_null_aggregate_row_renders_empty_cell() {
    let server = MockServer::start().await;
    mount_procs(&server, &["bash"]).await;
    mount_initial_events(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/events/io"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files/bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"fname": "/var/log/app.log", "total_bytes": 4096},
                {"fname": "/etc/ld.so.cache", "total_bytes": null}
            ],
            "page": 1,
            "total_pages": 1,
            "prev_page": null,
            "next_page": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut dash = dashboard(&server);
    dash.load().await;
    dash.select_process("bash").await;
    dash.change_query_type(QueryType::Bytes).await;

    let resp = dash.panel().last_response().unwrap();
    assert_eq!(resp.data.len(), 2);
    assert_eq!(resp.data[1].value, None);
    let table = dash.panel().table_html();
    assert!(table.contains("padding: 4px;\">4096</td>"));
    assert!(table.contains("padding: 4px;\"></td>"));
}
