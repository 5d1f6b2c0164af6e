//! UCI session with an external chess engine
//!
//! Lifecycle: [`SessionState::Open`] until the `uci`/`isready` handshake
//! completes, then [`SessionState::Ready`]. A search moves it to
//! [`SessionState::InFlight`] until `bestmove` arrives. Dropping a pending
//! search future cancels it; the next request sends `stop` and drains the
//! stale answer first. If the future was dropped before `go` reached the
//! engine, there is no answer to drain and an `isready` round trip is used
//! instead. `quit` ends in [`SessionState::Closed`].

use super::{ChessLevel, Fen, UciMove};
use crate::error::{ArenaError, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, trace, warn};

/// How long a quitting engine gets before it is killed.
const QUIT_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Ready,
    InFlight,
    Closed,
}

pub struct UciSession<W, R> {
    writer: W,
    lines: Lines<R>,
    state: SessionState,
    /// Whether the in-flight request got as far as sending `go`.
    go_sent: bool,
    child: Option<Child>,
}

/// Session talking to an engine process over its stdin and stdout.
pub type ProcessSession = UciSession<ChildStdin, BufReader<ChildStdout>>;

impl ProcessSession {
    /// Starts the engine at `path` and completes the handshake.
    pub async fn spawn(path: &Path) -> Result<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ArenaError::EngineProtocol("engine stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ArenaError::EngineProtocol("engine stdout not captured".to_string()))?;

        let mut session = UciSession::new(stdin, BufReader::new(stdout));
        session.child = Some(child);
        session.handshake().await?;
        info!(engine = %path.display(), "chess engine ready");
        Ok(session)
    }
}

impl<W, R> UciSession<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    /// Wraps an already connected pipe pair. The session starts `Open`.
    pub fn new(writer: W, reader: R) -> Self {
        UciSession {
            writer,
            lines: reader.lines(),
            state: SessionState::Open,
            go_sent: false,
            child: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    async fn send(&mut self, command: &str) -> Result<()> {
        trace!(command, "uci >>");
        let written = async {
            self.writer.write_all(command.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await
        }
        .await;
        if let Err(e) = written {
            self.state = SessionState::Closed;
            return Err(e.into());
        }
        Ok(())
    }

    /// Reads lines until one whose first token is `token`.
    async fn wait_for(&mut self, token: &str) -> Result<String> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    trace!(line = %line, "uci <<");
                    if line.split_whitespace().next() == Some(token) {
                        return Ok(line);
                    }
                }
                Ok(None) => {
                    self.state = SessionState::Closed;
                    return Err(ArenaError::EngineClosed);
                }
                Err(e) => {
                    self.state = SessionState::Closed;
                    return Err(e.into());
                }
            }
        }
    }

    /// `uci`/`uciok` followed by `isready`/`readyok`.
    pub async fn handshake(&mut self) -> Result<()> {
        match self.state {
            SessionState::Open => {}
            SessionState::Closed => return Err(ArenaError::EngineClosed),
            _ => return Ok(()),
        }
        self.send("uci").await?;
        self.wait_for("uciok").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await?;
        self.state = SessionState::Ready;
        debug!("uci handshake complete");
        Ok(())
    }

    /// Asks the engine for its move in `fen`, searching `depth` plies.
    /// `Ok(None)` means the engine reported no move.
    pub async fn best_move(&mut self, fen: &Fen, depth: u32) -> Result<Option<UciMove>> {
        match self.state {
            SessionState::Open => return Err(ArenaError::EngineUnavailable),
            SessionState::Closed => return Err(ArenaError::EngineClosed),
            SessionState::InFlight => {
                self.stop().await?;
            }
            SessionState::Ready => {}
        }

        self.state = SessionState::InFlight;
        self.go_sent = false;
        self.send(&format!("position fen {}", fen)).await?;
        self.send(&format!("go depth {}", depth)).await?;
        self.go_sent = true;

        let line = self.wait_for("bestmove").await?;
        self.state = SessionState::Ready;
        let mv = parse_bestmove(&line);
        debug!(depth, best = ?mv.map(|m| m.to_string()), "engine answered");
        Ok(mv)
    }

    /// Interrupts a running search and discards its answer.
    pub async fn stop(&mut self) -> Result<()> {
        if self.state != SessionState::InFlight {
            return Ok(());
        }
        if self.go_sent {
            self.send("stop").await?;
            let stale = self.wait_for("bestmove").await?;
            debug!(line = %stale, "discarded answer of cancelled search");
        } else {
            self.send("isready").await?;
            self.wait_for("readyok").await?;
            debug!("cancelled before go, engine idle");
        }
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Sends `quit` and waits for the engine process to exit.
    pub async fn quit(mut self) -> Result<()> {
        if self.state != SessionState::Closed {
            if let Err(e) = self.send("quit").await {
                debug!(error = %e, "engine gone before quit");
            }
            self.state = SessionState::Closed;
        }
        if let Some(mut child) = self.child.take() {
            match tokio::time::timeout(QUIT_GRACE, child.wait()).await {
                Ok(status) => {
                    status?;
                }
                Err(_) => {
                    warn!("engine ignored quit, killing it");
                    child.kill().await?;
                }
            }
        }
        Ok(())
    }
}

fn parse_bestmove(line: &str) -> Option<UciMove> {
    line.split_whitespace().nth(1).and_then(UciMove::parse)
}

/// Owner of at most one live engine session.
///
/// Every failure is reported as "no move"; a session that has closed is
/// dropped so later requests fail fast.
pub struct ChessEngine<W, R> {
    session: Option<UciSession<W, R>>,
}

pub type ProcessEngine = ChessEngine<ChildStdin, BufReader<ChildStdout>>;

impl ProcessEngine {
    /// Starts the engine at `path`. A failed start leaves an engine without a
    /// session, which answers every request with no move.
    pub async fn start(path: &Path) -> Self {
        let mut engine = ChessEngine::default();
        match ProcessSession::spawn(path).await {
            Ok(session) => engine.attach(session).await,
            Err(e) => warn!(engine = %path.display(), error = %e, "could not start chess engine"),
        }
        engine
    }
}

impl<W, R> Default for ChessEngine<W, R> {
    fn default() -> Self {
        ChessEngine { session: None }
    }
}

impl<W, R> ChessEngine<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
{
    pub fn is_ready(&self) -> bool {
        matches!(
            self.session.as_ref().map(UciSession::state),
            Some(SessionState::Ready | SessionState::InFlight)
        )
    }

    pub fn session_state(&self) -> Option<SessionState> {
        self.session.as_ref().map(UciSession::state)
    }

    /// Installs `session`, shutting down the previous one first.
    pub async fn attach(&mut self, session: UciSession<W, R>) {
        self.shutdown().await;
        self.session = Some(session);
    }

    pub async fn request_move(&mut self, fen: &Fen, level: ChessLevel) -> Option<UciMove> {
        let Some(session) = self.session.as_mut() else {
            debug!("no chess engine session");
            return None;
        };
        match session.best_move(fen, level.depth()).await {
            Ok(mv) => mv,
            Err(e) => {
                warn!(error = %e, "chess engine request failed");
                if session.state() == SessionState::Closed {
                    self.session = None;
                }
                None
            }
        }
    }

    pub async fn shutdown(&mut self) {
        if let Some(old) = self.session.take() {
            if let Err(e) = old.quit().await {
                warn!(error = %e, "chess engine did not shut down cleanly");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, split, DuplexStream, ReadHalf, WriteHalf};

    /// Answers the handshake and every `go` at once; ignores `stop` like an
    /// idle engine does.
    fn idle_engine(stream: DuplexStream) -> tokio::task::JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let (read, mut write) = split(stream);
            let mut lines = BufReader::new(read).lines();
            let mut received = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                received.push(line.clone());
                let reply = match line.split_whitespace().next() {
                    Some("uci") => "uciok\n",
                    Some("isready") => "readyok\n",
                    Some("go") => "bestmove e2e4\n",
                    Some("quit") => break,
                    _ => continue,
                };
                if write.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
            received
        })
    }

    type Session = UciSession<WriteHalf<DuplexStream>, BufReader<ReadHalf<DuplexStream>>>;

    async fn ready_session() -> (Session, tokio::task::JoinHandle<Vec<String>>) {
        let (client, engine) = duplex(4096);
        let (read, write) = split(client);
        let mut session = UciSession::new(write, BufReader::new(read));
        let handle = idle_engine(engine);
        session.handshake().await.unwrap();
        (session, handle)
    }

    #[tokio::test]
    async fn test_request_cancelled_before_go_resyncs_with_isready() {
        let (mut session, engine) = ready_session().await;
        // What a request dropped while writing `position` leaves behind.
        session.state = SessionState::InFlight;
        session.go_sent = false;

        let mv = tokio::time::timeout(Duration::from_secs(1), session.best_move(&Fen::startpos(), 2))
            .await
            .expect("session must not wait for an answer that never comes")
            .unwrap();
        assert_eq!(mv.map(|m| m.to_string()), Some("e2e4".to_string()));
        assert_eq!(session.state(), SessionState::Ready);

        session.quit().await.unwrap();
        let received = engine.await.unwrap();
        assert!(!received.iter().any(|c| c == "stop"));
        assert_eq!(received.iter().filter(|c| *c == "isready").count(), 2);
    }

    #[test]
    fn test_parse_bestmove_line() {
        assert_eq!(
            parse_bestmove("bestmove e2e4 ponder e7e5").map(|m| m.to_string()),
            Some("e2e4".to_string())
        );
        assert_eq!(parse_bestmove("bestmove (none)"), None);
        assert_eq!(parse_bestmove("bestmove"), None);
    }
}
