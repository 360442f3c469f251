//! End-to-end tests against a real listener on an ephemeral port.

use canvas_server::config::ServerConfig;
use canvas_server::{AppState, router};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> SocketAddr {
    start_server_with(ServerConfig::default()).await
}

async fn start_server_with(config: ServerConfig) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig {
        bind_addr: addr,
        ..config
    };
    let app = router(AppState::new(config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    ws
}

/// Next JSON envelope from the server, skipping control frames.
async fn next_event(ws: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for server event")
            .expect("connection ended")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn place(ws: &mut Client, x: Value, y: Value, color: &str, player: &str) {
    let frame = json!({
        "event": "place-pixel",
        "data": { "x": x, "y": y, "color": color, "player": player },
    });
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
}

async fn get_json(addr: SocketAddr, path: &str) -> Value {
    reqwest::get(format!("http://{}{}", addr, path))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_two_clients_see_each_placement() {
    let addr = start_server().await;

    let mut a = connect(addr).await;
    assert_eq!(
        next_event(&mut a).await,
        json!({ "event": "map-data", "data": { "pixels": {}, "online": 1 } })
    );
    assert_eq!(
        next_event(&mut a).await,
        json!({ "event": "player-count", "data": 1 })
    );

    let mut b = connect(addr).await;
    let map_b = next_event(&mut b).await;
    assert_eq!(map_b["event"], "map-data");
    assert_eq!(map_b["data"]["online"], 2);
    let count = json!({ "event": "player-count", "data": 2 });
    assert_eq!(next_event(&mut a).await, count);
    assert_eq!(next_event(&mut b).await, count);

    place(&mut a, json!(5), json!(5), "#fff", "A").await;
    let placed = json!({
        "event": "pixel-placed",
        "data": { "x": 5, "y": 5, "color": "#fff", "player": "A" },
    });
    assert_eq!(next_event(&mut a).await, placed);
    assert_eq!(next_event(&mut b).await, placed);

    let map = get_json(addr, "/api/map").await;
    assert_eq!(map["totalPixels"], 1);
    assert_eq!(map["pixels"]["5,5"], "#fff");
    assert_eq!(map["online"], 2);
}

#[tokio::test]
async fn test_late_joiner_receives_current_grid() {
    let addr = start_server().await;

    let mut a = connect(addr).await;
    next_event(&mut a).await;
    next_event(&mut a).await;
    place(&mut a, json!(0), json!(0), "red", "A").await;
    place(&mut a, json!(1999), json!(1999), "blue", "A").await;
    next_event(&mut a).await;
    next_event(&mut a).await;

    let mut b = connect(addr).await;
    let map_b = next_event(&mut b).await;
    assert_eq!(map_b["event"], "map-data");
    assert_eq!(
        map_b["data"]["pixels"],
        json!({ "0,0": "red", "1999,1999": "blue" })
    );
}

#[tokio::test]
async fn test_invalid_placements_are_ignored() {
    let addr = start_server().await;

    let mut a = connect(addr).await;
    next_event(&mut a).await;
    next_event(&mut a).await;

    place(&mut a, json!(2000), json!(0), "#000", "A").await;
    place(&mut a, json!(-1), json!(0), "#000", "A").await;
    place(&mut a, json!(1.5), json!(0), "#000", "A").await;
    a.send(Message::Text("not an envelope".into())).await.unwrap();
    place(&mut a, json!(1), json!(1), "#123456", "A").await;

    // The only event produced is for the valid placement sent last
    let event = next_event(&mut a).await;
    assert_eq!(event["event"], "pixel-placed");
    assert_eq!(event["data"]["x"], 1);
    assert_eq!(event["data"]["y"], 1);

    let map = get_json(addr, "/api/map").await;
    assert_eq!(map["totalPixels"], 1);
}

#[tokio::test]
async fn test_whole_float_coordinates_are_accepted() {
    let addr = start_server().await;

    let mut a = connect(addr).await;
    next_event(&mut a).await;
    next_event(&mut a).await;

    let frame = r##"{"event":"place-pixel","data":{"x":5.0,"y":5,"color":"#fff","player":"A"}}"##;
    a.send(Message::Text(frame.into())).await.unwrap();

    assert_eq!(
        next_event(&mut a).await,
        json!({
            "event": "pixel-placed",
            "data": { "x": 5, "y": 5, "color": "#fff", "player": "A" },
        })
    );
    let map = get_json(addr, "/api/map").await;
    assert_eq!(map["pixels"]["5,5"], "#fff");
}

#[tokio::test]
async fn test_disconnect_updates_player_count() {
    let addr = start_server().await;

    let mut a = connect(addr).await;
    next_event(&mut a).await;
    next_event(&mut a).await;

    let mut b = connect(addr).await;
    next_event(&mut a).await;
    b.close(None).await.unwrap();

    assert_eq!(
        next_event(&mut a).await,
        json!({ "event": "player-count", "data": 1 })
    );
}

#[tokio::test]
async fn test_lagging_client_is_closed() {
    // One slot: map-data fills the queue, so the count broadcast overflows it
    let addr = start_server_with(ServerConfig {
        outbound_capacity: 1,
        ..Default::default()
    })
    .await;

    let mut a = connect(addr).await;
    assert_eq!(next_event(&mut a).await["event"], "map-data");

    let frame = tokio::time::timeout(Duration::from_secs(5), a.next())
        .await
        .expect("timed out waiting for close");
    assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));

    let map = get_json(addr, "/api/map").await;
    assert_eq!(map["online"], 0);
    let metrics = get_json(addr, "/metrics").await;
    assert_eq!(metrics["messages"]["sessions_evicted"], 1);
}

#[tokio::test]
async fn test_backup_keeps_newest_thousand() {
    let addr = start_server().await;

    let mut a = connect(addr).await;
    next_event(&mut a).await;
    next_event(&mut a).await;

    for i in 0..1001 {
        place(&mut a, json!(i % 2000), json!(i / 2000), "#000", &format!("p{i}")).await;
    }
    for _ in 0..1001 {
        assert_eq!(next_event(&mut a).await["event"], "pixel-placed");
    }

    let backup = get_json(addr, "/api/backup").await;
    let history = backup["history"].as_array().unwrap();
    assert_eq!(history.len(), 1000);
    assert_eq!(history[0]["player"], "p1");
    assert_eq!(history[999]["player"], "p1000");
    assert!(history[0]["socketId"].is_string());
    assert_eq!(backup["pixels"].as_object().unwrap().len(), 1001);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let addr = start_server().await;

    let mut a = connect(addr).await;
    next_event(&mut a).await;
    next_event(&mut a).await;

    let health = get_json(addr, "/health").await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["online"], 1);

    let metrics = get_json(addr, "/metrics").await;
    assert_eq!(metrics["connections"]["active"], 1);
    assert_eq!(metrics["connections"]["total"], 1);
}
