//! Integration tests for the HTTP feed path.
//!
//! Serves fixture documents from an in-process axum server and drives the
//! real reqwest-backed `HttpFeed` through a `Coordinator`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use vrijeme::{
    available_cities, Config, Coordinator, FailureKind, HttpFeed, NodeError, Reading,
    RefreshError, WindDirection,
};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Hrvatska>
  <DatumTermin><Datum>18.10.2026</Datum><Termin>14</Termin></DatumTermin>
  <Grad autom="0">
    <GradIme>Zagreb</GradIme>
    <Lat>45.8</Lat>
    <Lon>15.9</Lon>
    <Podatci>
      <Temp>21,4</Temp>
      <Vlaga>65</Vlaga>
      <Tlak>-</Tlak>
      <TlakTend>-</TlakTend>
      <VjetarSmjer>SW</VjetarSmjer>
      <VjetarBrzina>10</VjetarBrzina>
      <Vrijeme>Sunčano</Vrijeme>
      <VrijemeZnak>1</VrijemeZnak>
    </Podatci>
  </Grad>
  <Grad autom="1">
    <GradIme>Rijeka</GradIme>
    <Lat>45.3</Lat>
    <Lon>14.4</Lon>
    <Podatci>
      <Temp>19.8</Temp>
      <Vlaga>72</Vlaga>
      <Tlak>1016.4</Tlak>
      <TlakTend>+0,4</TlakTend>
      <VjetarSmjer>C</VjetarSmjer>
      <VjetarBrzina>0</VjetarBrzina>
      <Vrijeme>pretežno oblačno</Vrijeme>
    </Podatci>
  </Grad>
</Hrvatska>
"#;

// ── Test server ──────────────────────────────────────────────────────

/// What the fixture server answers with on each request.
#[derive(Clone)]
enum Reply {
    Body(&'static str),
    Status(StatusCode),
    Slow(Duration),
}

#[derive(Clone)]
struct ServerState {
    reply: Arc<Mutex<Reply>>,
    hits: Arc<AtomicUsize>,
}

async fn feed_handler(State(state): State<ServerState>) -> axum::response::Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let reply = state.reply.lock().unwrap().clone();
    match reply {
        Reply::Body(body) => {
            ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], body).into_response()
        }
        Reply::Status(code) => code.into_response(),
        Reply::Slow(delay) => {
            tokio::time::sleep(delay).await;
            ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], FEED).into_response()
        }
    }
}

struct TestServer {
    url: String,
    state: ServerState,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(reply: Reply) -> Self {
        let state = ServerState {
            reply: Arc::new(Mutex::new(reply)),
            hits: Arc::new(AtomicUsize::new(0)),
        };
        let app = Router::new()
            .route("/hrvatska_n.xml", get(feed_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/hrvatska_n.xml", addr),
            state,
            _handle: handle,
        }
    }

    fn set_reply(&self, reply: Reply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    fn coordinator(&self, city: &str, timeout: Duration) -> Coordinator<HttpFeed> {
        let config = Config {
            url: self.url.clone(),
            timeout_secs: timeout.as_secs().max(1),
            ..Config::for_city(city)
        };
        Coordinator::from_config(&config).unwrap()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_first_refresh() {
    let server = TestServer::start(Reply::Body(FEED)).await;
    let coordinator = server.coordinator("Zagreb", Duration::from_secs(5));

    let reading = coordinator.first_refresh().await.unwrap();
    assert_eq!(
        *reading,
        Reading {
            temperature: Some(21.4),
            humidity: Some(65),
            pressure: None,
            pressure_tendency: None,
            wind_speed: Some(10.0),
            wind_direction: Some(WindDirection::SW),
            condition_raw: "sunčano".to_string(),
            latitude: Some(45.8),
            longitude: Some(15.9),
        }
    );
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn calm_station_and_signed_tendency() {
    let server = TestServer::start(Reply::Body(FEED)).await;
    let coordinator = server.coordinator("Rijeka", Duration::from_secs(5));

    let reading = coordinator.refresh().await.unwrap();
    assert_eq!(reading.wind_direction, Some(WindDirection::Calm));
    assert_eq!(reading.wind_speed, Some(0.0));
    assert_eq!(reading.pressure_tendency, Some(0.4));
    assert_eq!(reading.pressure, Some(1016.4));
}

#[tokio::test]
async fn non_200_is_transport_failure() {
    let server = TestServer::start(Reply::Status(StatusCode::SERVICE_UNAVAILABLE)).await;
    let coordinator = server.coordinator("Zagreb", Duration::from_secs(5));

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::Status(503)), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(coordinator.current().is_none());
}

#[tokio::test]
async fn failed_cycle_keeps_last_good_snapshot() {
    let server = TestServer::start(Reply::Body(FEED)).await;
    let coordinator = server.coordinator("Zagreb", Duration::from_secs(5));
    let good = coordinator.refresh().await.unwrap();

    server.set_reply(Reply::Body("<Hrvatska><Grad><GradIme>Zagreb"));
    let err = coordinator.refresh().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedDocument);

    server.set_reply(Reply::Status(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(coordinator.refresh().await.is_err());

    assert!(Arc::ptr_eq(&coordinator.current().unwrap(), &good));
    assert_eq!(coordinator.status().consecutive_failures, 2);
}

#[tokio::test]
async fn unknown_city_on_first_refresh_is_not_ready() {
    let server = TestServer::start(Reply::Body(FEED)).await;
    let coordinator = server.coordinator("Zagreb-Grič", Duration::from_secs(5));

    let err = coordinator.first_refresh().await.unwrap_err();
    match err {
        NodeError::NotReady(RefreshError::CityNotFound(city)) => assert_eq!(city, "Zagreb-Grič"),
        other => panic!("expected NotReady(CityNotFound), got {other:?}"),
    }
    assert!(coordinator.current().is_none());
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = TestServer::start(Reply::Slow(Duration::from_secs(5))).await;
    let coordinator = server.coordinator("Zagreb", Duration::from_secs(1));

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::Timeout(_)), "got {err:?}");
    assert!(coordinator.current().is_none());
}

#[tokio::test]
async fn concurrent_refreshes_hit_upstream_once() {
    let server = TestServer::start(Reply::Slow(Duration::from_millis(300))).await;
    let coordinator = server.coordinator("Zagreb", Duration::from_secs(5));

    let (a, b, c) = tokio::join!(
        coordinator.refresh(),
        coordinator.refresh(),
        coordinator.refresh()
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(server.hits(), 1);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &c));
}

#[tokio::test]
async fn lists_available_cities() {
    let server = TestServer::start(Reply::Body(FEED)).await;
    let feed = HttpFeed::new(server.url.clone(), Duration::from_secs(5)).unwrap();

    let cities = available_cities(&feed).await.unwrap();
    assert_eq!(cities, vec!["Rijeka", "Zagreb"]);
}

#[tokio::test]
async fn connection_refused_is_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let feed = HttpFeed::new(format!("http://{}/hrvatska_n.xml", addr), Duration::from_secs(2))
        .unwrap();
    let coordinator = Coordinator::new("Zagreb", Duration::from_secs(60), feed);

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::Transport(_)), "got {err:?}");
}
