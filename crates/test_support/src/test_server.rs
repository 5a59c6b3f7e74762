use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration};

use libprotocol::{SignalMessage, OFFER, REGISTER_REQUEST};

// /register
async fn register(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| serve_register(socket, Duration::ZERO))
}

// /slow/150
async fn slow(Path(ms): Path<u64>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_register(socket, Duration::from_millis(ms)))
}

async fn serve_register(mut socket: WebSocket, delay: Duration) {
    while next_register_request(&mut socket).await.is_some() {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        if socket.send(success_frame()).await.is_err() {
            return;
        }
    }
}

// an unrelated signaling message arrives before the success reply
async fn noise(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        while next_register_request(&mut socket).await.is_some() {
            let offer = SignalMessage {
                kind: OFFER.to_string(),
                to: None,
                from: Some("Peer".to_string()),
                data: Some(json!({"sdp": "v=0"})),
            };
            let frame = offer.to_json().expect("encode offer");
            if socket.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
            if socket.send(success_frame()).await.is_err() {
                return;
            }
        }
    })
}

// a non-JSON frame arrives before the success reply
async fn garbage(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        while next_register_request(&mut socket).await.is_some() {
            if socket
                .send(Message::Text("not json {{{".to_string().into()))
                .await
                .is_err()
            {
                return;
            }
            if socket.send(success_frame()).await.is_err() {
                return;
            }
        }
    })
}

// accepts the request and never answers
async fn mute(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        while socket.recv().await.is_some() {}
    })
}

// drops the connection as soon as the request arrives
async fn hangup(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        let _ = next_register_request(&mut socket).await;
    })
}

async fn next_register_request(socket: &mut WebSocket) -> Option<SignalMessage> {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else { continue };
        let Ok(request) = SignalMessage::parse(text.as_str()) else {
            continue;
        };
        if request.kind == REGISTER_REQUEST {
            return Some(request);
        }
    }
    None
}

fn success_frame() -> Message {
    let frame = SignalMessage::register_success()
        .to_json()
        .expect("encode success reply");
    Message::Text(frame.into())
}

/// Returns (ws_base_url, shutdown_sender, join_handle)
pub fn spawn_signal_server() -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    // listener on a random free port
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("ws://{}", addr);

    let app = Router::new()
        .route("/register", get(register))
        .route("/slow/{ms}", get(slow))
        .route("/noise", get(noise))
        .route("/garbage", get(garbage))
        .route("/mute", get(mute))
        .route("/hangup", get(hangup));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let server = axum::serve(
            tokio::net::TcpListener::from_std(listener).unwrap(),
            app,
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        // a crashing server must fail the test
        server.await.unwrap();
    });

    (base_url, shutdown_tx, handle)
}
