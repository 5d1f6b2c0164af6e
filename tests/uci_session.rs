//! UCI session lifecycle against a scripted in-process engine.

use arena::chess::uci::{ChessEngine, SessionState, UciSession};
use arena::chess::{ChessLevel, Fen};
use arena::ArenaError;
use std::time::Duration;
use tokio::io::{
    duplex, split, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf,
};
use tokio::task::JoinHandle;

type ClientSession = UciSession<WriteHalf<DuplexStream>, BufReader<ReadHalf<DuplexStream>>>;

/// Replies like a real engine. `go depth 99` never finishes on its own and
/// only answers once `stop` arrives. A position containing "8/8/8/8/8/8/8/8"
/// has no legal move. Returns every command it received.
fn fake_engine(stream: DuplexStream) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let (read, mut write) = split(stream);
        let mut lines = BufReader::new(read).lines();
        let mut received = Vec::new();
        let mut empty_board = false;

        while let Ok(Some(line)) = lines.next_line().await {
            received.push(line.clone());
            let reply: Option<String> = match line.split_whitespace().next() {
                Some("uci") => Some("id name Fake\nid author arena\nuciok".to_string()),
                Some("isready") => Some("readyok".to_string()),
                Some("position") => {
                    empty_board = line.contains("8/8/8/8/8/8/8/8");
                    None
                }
                Some("go") if line.ends_with("depth 99") => None,
                Some("go") if empty_board => Some("bestmove (none)".to_string()),
                Some("go") => Some("info depth 1 score cp 30\nbestmove e2e4 ponder e7e5".to_string()),
                Some("stop") => Some("bestmove a2a3".to_string()),
                Some("quit") => break,
                _ => None,
            };
            if let Some(reply) = reply {
                if write.write_all(format!("{}\n", reply).as_bytes()).await.is_err() {
                    break;
                }
            }
        }
        received
    })
}

fn connect() -> (ClientSession, JoinHandle<Vec<String>>) {
    let (client, engine) = duplex(4096);
    let (read, write) = split(client);
    (UciSession::new(write, BufReader::new(read)), fake_engine(engine))
}

#[tokio::test]
async fn test_handshake_then_best_move() {
    let (mut session, engine) = connect();
    assert_eq!(session.state(), SessionState::Open);

    session.handshake().await.unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    let mv = session.best_move(&Fen::startpos(), 3).await.unwrap().unwrap();
    assert_eq!(mv.to_string(), "e2e4");
    assert_eq!(session.state(), SessionState::Ready);

    session.quit().await.unwrap();
    let received = engine.await.unwrap();
    assert_eq!(received[0], "uci");
    assert_eq!(received[1], "isready");
    assert!(received[2].starts_with("position fen rnbqkbnr/"));
    assert_eq!(received[3], "go depth 3");
    assert_eq!(received.last().map(String::as_str), Some("quit"));
}

#[tokio::test]
async fn test_request_before_handshake_is_refused() {
    let (mut session, _engine) = connect();
    match session.best_move(&Fen::startpos(), 1).await {
        Err(ArenaError::EngineUnavailable) => {}
        other => panic!("expected EngineUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_legal_move_is_none() {
    let (mut session, _engine) = connect();
    session.handshake().await.unwrap();
    let fen = Fen::parse("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
    assert_eq!(session.best_move(&fen, 1).await.unwrap(), None);
}

#[tokio::test]
async fn test_cancelled_search_is_stopped_before_next_request() {
    let (mut session, engine) = connect();
    session.handshake().await.unwrap();

    let pending = tokio::time::timeout(
        Duration::from_millis(50),
        session.best_move(&Fen::startpos(), 99),
    )
    .await;
    assert!(pending.is_err());
    assert_eq!(session.state(), SessionState::InFlight);

    // The stale "a2a3" answer must not leak into this request.
    let mv = session.best_move(&Fen::startpos(), 2).await.unwrap().unwrap();
    assert_eq!(mv.to_string(), "e2e4");

    session.quit().await.unwrap();
    let received = engine.await.unwrap();
    assert!(received.iter().any(|c| c == "stop"));
}

#[tokio::test]
async fn test_engine_exit_closes_session() {
    let (client, engine_side) = duplex(1024);
    let (read, write) = split(client);
    let mut session = UciSession::new(write, BufReader::new(read));
    drop(engine_side);

    assert!(session.handshake().await.is_err());
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_engine_owner_reports_failures_as_no_move() {
    let mut engine: ChessEngine<WriteHalf<DuplexStream>, BufReader<ReadHalf<DuplexStream>>> =
        ChessEngine::default();
    let (mut session, _first_fake) = connect();
    assert_eq!(
        engine.request_move(&Fen::startpos(), ChessLevel::Beginner).await,
        None
    );

    session.handshake().await.unwrap();
    engine.attach(session).await;
    assert!(engine.is_ready());
    let mv = engine
        .request_move(&Fen::startpos(), ChessLevel::Club)
        .await
        .unwrap();
    assert_eq!(mv.to_string(), "e2e4");

    // A second session replaces the first, which is shut down.
    let (mut replacement, _second_fake) = connect();
    replacement.handshake().await.unwrap();
    engine.attach(replacement).await;
    assert!(engine.is_ready());

    engine.shutdown().await;
    assert_eq!(engine.session_state(), None);
}
