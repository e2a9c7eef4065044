use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use crate::config::ServerSettings;
use crate::log::NoopLogSink;
use crate::log::log_sink::LogSink;
use crate::protocol::{FrameError, ProtoError, Response, ResponseCode, SERVER_VERSION};
use crate::server::{Connection, ConnectionEnd, Dispatcher};
use crate::store::IdentityStore;
use crate::{sink_debug, sink_info, sink_warn};

/// Top-level runtime object for the registry service.
///
/// This owns:
/// - the bound listener
/// - the identity store (passed `&mut` into handlers, no locking)
/// - the dispatcher and logging sink
///
/// It accepts exactly one connection and serves it serially.
pub struct RegistryServer<St> {
    listener: TcpListener,
    store: St,
    dispatcher: Dispatcher,
    settings: ServerSettings,
    log: Arc<dyn LogSink>,
}

impl<St: IdentityStore> RegistryServer<St> {
    /// Binds `settings.bind_addr()`; port 0 picks a free port.
    pub fn bind(settings: ServerSettings, store: St, log: Arc<dyn LogSink>) -> io::Result<Self> {
        let listener = TcpListener::bind(settings.bind_addr())?;
        sink_info!(
            log,
            "registry server listening on {} ({} client(s) known)",
            listener.local_addr()?,
            store.len()
        );
        Ok(Self {
            listener,
            store,
            dispatcher: Dispatcher::with_log(log.clone()),
            settings,
            log,
        })
    }

    /// Convenience: bind with a `NoopLogSink`.
    pub fn bind_no_log(settings: ServerSettings, store: St) -> io::Result<Self> {
        Self::bind(settings, store, Arc::new(NoopLogSink))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn into_store(self) -> St {
        self.store
    }

    /// Blocks until one client connects, then serves it until it leaves.
    pub fn serve_one(&mut self) -> io::Result<ConnectionEnd> {
        let (stream, peer) = self.listener.accept()?;
        sink_info!(self.log, "accepted connection from {}", peer);

        if let Some(timeout) = self.settings.read_timeout {
            stream.set_read_timeout(Some(timeout))?;
        }

        let mut conn = Connection::new(peer.to_string(), stream, self.settings.max_payload_len);
        let end = serve_connection(
            &mut conn,
            &mut self.dispatcher,
            &mut self.store,
            self.log.as_ref(),
        );
        sink_info!(self.log, "connection from {} ended: {:?}", peer, end);
        Ok(end)
    }
}

/// Request loop for one connection.
///
/// Framing errors end the connection; everything else is answered and the
/// loop continues.
pub fn serve_connection<S, St>(
    conn: &mut Connection<S>,
    dispatcher: &mut Dispatcher,
    store: &mut St,
    log: &dyn LogSink,
) -> ConnectionEnd
where
    S: Read + Write,
    St: IdentityStore,
{
    loop {
        let request = match conn.recv() {
            Ok(Some(req)) => req,
            Ok(None) => {
                sink_debug!(log, "[{}] peer closed the connection", conn.peer);
                return ConnectionEnd::PeerClosed;
            }
            Err(FrameError::Proto(ProtoError::PayloadTooLarge { max, declared })) => {
                sink_warn!(
                    log,
                    "[{}] declared payload {} exceeds {}; closing",
                    conn.peer,
                    declared,
                    max
                );
                let refusal = Response::failure(SERVER_VERSION, ResponseCode::GeneralFailure);
                if let Err(e) = conn.send(&refusal) {
                    sink_warn!(log, "[{}] could not send refusal: {}", conn.peer, e);
                }
                return ConnectionEnd::PayloadTooLarge;
            }
            Err(FrameError::Proto(e)) => {
                sink_warn!(log, "[{}] {}; closing", conn.peer, e);
                return ConnectionEnd::ProtocolError;
            }
            Err(FrameError::Io(e)) => {
                sink_warn!(
                    log,
                    "[{}] IO error while reading: {} (kind={:?})",
                    conn.peer,
                    e,
                    e.kind()
                );
                return ConnectionEnd::Io(e.kind());
            }
        };

        sink_debug!(
            log,
            "[{}] op {} v{} with {} payload bytes",
            conn.peer,
            request.header.op_code,
            request.header.version,
            request.payload.len()
        );

        let response = dispatcher.dispatch(&request, store);
        if let Err(e) = conn.send(&response) {
            sink_warn!(log, "[{}] error sending response: {}", conn.peer, e);
            return ConnectionEnd::Io(e.kind());
        }
    }
}
