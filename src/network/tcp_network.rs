//! ## Handles TCP sessions to the slaves
//!
//! Every frame, both directions, is a big-endian `u16` length followed by that many payload bytes.
//! Each accepted session gets a reader task (frames in, lifecycle events) and a writer task
//! (drains the session's send queue), so a slow slave never blocks the master.

use anyhow::{bail, Context, Result};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout, Duration};

use super::{NetEvent, PeerLink};
use crate::{config, print};
use crate::message::{Message, Outbound};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// [PeerLink] for one accepted TCP session.
#[derive(Debug, Clone)]
pub struct TcpPeer {
    session_id: u64,
    addr: SocketAddr,
    outbox: mpsc::UnboundedSender<Vec<u8>>,
}

impl PeerLink for TcpPeer {
    fn session_id(&self) -> u64 {
        self.session_id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    fn send(&self, msg: &Outbound) -> Result<()> {
        let payload = msg.encode()?;
        if payload.len() > config::MAX_FRAME_LEN {
            bail!("Payload of {} bytes does not fit in a frame", payload.len());
        }
        self.outbox
            .send(payload)
            .map_err(|_| anyhow::anyhow!("Session to {} is closed", self.addr))
    }
}

/// Binds the master's listener on [config::LISTEN_ADDR]:`port`.
pub async fn bind_listener(port: u16) -> Result<TcpListener> {
    let addr = format!("{}:{}", config::LISTEN_ADDR, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {}", addr))?;
    print::ok(format!("System listening on {}", addr));
    Ok(listener)
}

/// Accepts slave sessions until the master stops listening.
///
/// # Parameters
/// `listener`: bound listener, see [bind_listener]
/// `net_tx`: queue into the master's event loop
/// `tcp_timeout`: optional read watchdog per session
///
/// # Return
/// Only returns when `net_tx` is closed, which means the master is gone.
///
/// # Behavior
/// Accept errors are logged and retried after [config::ACCEPT_RETRY_DELAY]. Each session is
/// handed to [start_session].
pub async fn listener_task(
    listener: TcpListener,
    net_tx: mpsc::Sender<NetEvent<TcpPeer>>,
    tcp_timeout: Option<Duration>,
) -> Result<()> {
    loop {
        if net_tx.is_closed() {
            bail!("Master event queue closed, stopping listener");
        }
        match listener.accept().await {
            Ok((socket, addr)) => {
                print::master(format!("{} connected to TCP", addr));
                if let Err(e) = socket.set_nodelay(true) {
                    print::warn(format!("Could not set TCP_NODELAY for {}: {}", addr, e));
                }
                let (reader, writer) = socket.into_split();
                start_session(reader, writer, addr, net_tx.clone(), tcp_timeout);
            }
            Err(e) => {
                print::err(format!("Error while accepting slave connection: {}", e));
                // Typically out of file descriptors, give sessions time to close
                sleep(config::ACCEPT_RETRY_DELAY).await;
            }
        }
    }
}

/// Spawns the reader and writer tasks for one session.
///
/// The reader announces the session with [NetEvent::NewConnection] before reading anything,
/// and ends it with exactly one [NetEvent::LostConnection]. The session also ends when the
/// writer gives up, so a peer that cannot be written to is reported lost.
fn start_session<R, W>(
    mut reader: R,
    writer: W,
    addr: SocketAddr,
    net_tx: mpsc::Sender<NetEvent<TcpPeer>>,
    tcp_timeout: Option<Duration>,
) where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbox, outbox_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let (writer_done_tx, mut writer_done_rx) = oneshot::channel::<()>();
    let peer = TcpPeer {
        session_id: NEXT_SESSION_ID.fetch_add(1, Ordering::SeqCst),
        addr,
        outbox,
    };

    tokio::spawn(async move {
        write_frames(writer, outbox_rx, addr).await;
        let _ = writer_done_tx.send(());
    });

    tokio::spawn(async move {
        if net_tx.send(NetEvent::NewConnection(peer.clone())).await.is_err() {
            return;
        }
        loop {
            let read = async {
                match tcp_timeout {
                    Some(limit) => timeout(limit, read_frame(&mut reader)).await.ok(),
                    None => Some(read_frame(&mut reader).await),
                }
            };
            let frame = tokio::select! {
                frame = read => frame,
                _ = &mut writer_done_rx => {
                    print::err(format!("Writer to slave {} stopped, closing session", addr));
                    break;
                }
            };
            match frame {
                None => {
                    print::err(format!("Timeout: No message from {} within {:?}", addr, tcp_timeout.unwrap_or_default()));
                    break;
                }
                Some(Ok(Some(payload))) => {
                    let msg = Message { sender: peer.clone(), payload };
                    if net_tx.send(NetEvent::Message(msg)).await.is_err() {
                        return;
                    }
                }
                Some(Ok(None)) => {
                    print::info(format!("Slave {} disconnected", addr));
                    break;
                }
                Some(Err(e)) => {
                    print::err(format!("Error while reading from slave {}: {:#}", addr, e));
                    break;
                }
            }
        }
        let _ = net_tx.send(NetEvent::LostConnection(peer)).await;
    });
}

/// Reads one length-prefixed frame.
///
/// # Return
/// `Ok(None)` on a clean end of stream between frames.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 2];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("Failed to read frame length"),
    }
    let len = u16::from_be_bytes(len_buf) as usize;
    let mut buffer = vec![0u8; len];
    reader
        .read_exact(&mut buffer)
        .await
        .context("Stream ended inside a frame")?;
    Ok(Some(buffer))
}

/// Writes one length-prefixed frame and flushes.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = u16::try_from(payload.len()).context("Payload too large for one frame")?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Drains a session's send queue onto the socket.
///
/// Ends when every [TcpPeer] clone is dropped or the socket fails. The session's reader is told
/// when this returns, see [start_session].
async fn write_frames<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut outbox_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    addr: SocketAddr,
) {
    while let Some(payload) = outbox_rx.recv().await {
        if let Err(e) = write_frame(&mut writer, &payload).await {
            print::err(format!("Failed to send to slave {}: {:#}", addr, e));
            break;
        }
    }
    let _ = writer.shutdown().await;
}
