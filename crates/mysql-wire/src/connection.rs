use std::path::PathBuf;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::PacketCodec;
use crate::error::{Error, Result};
use crate::handshake::{
    AuthSwitchRequest, CACHING_SHA2_PASSWORD, ErrPacket, HandshakeResponse, InitialHandshake,
    scramble_for,
};
use crate::lenenc;
use crate::packet::{Command, Packet, capabilities};
use crate::resultset::{self, ResultSet};

/// caching_sha2_password "more data" status bytes
const FAST_AUTH_SUCCESS: u8 = 0x03;
const PERFORM_FULL_AUTHENTICATION: u8 = 0x04;

/// Connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
    /// Unix socket path; when set, host and port are ignored
    pub socket: Option<PathBuf>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: None,
            socket: None,
        }
    }
}

impl ConnectOptions {
    /// Human readable address for logs and errors
    pub fn address(&self) -> String {
        match &self.socket {
            Some(path) => format!("unix:{}", path.display()),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

/// An authenticated MySQL client connection
pub struct Connection<S> {
    framed: Framed<S, PacketCodec>,
    capabilities: u32,
    server_version: String,
    connection_id: u32,
}

/// Connect over TCP and authenticate
pub async fn connect_tcp(opts: &ConnectOptions) -> Result<Connection<TcpStream>> {
    let addr = format!("{}:{}", opts.host, opts.port);
    debug!(addr = %addr, "Connecting to server");

    let stream = TcpStream::connect(&addr).await.map_err(|e| {
        warn!(addr = %addr, error = %e, "Failed to connect to server");
        Error::Connect {
            addr: addr.clone(),
            reason: e.to_string(),
        }
    })?;
    stream.set_nodelay(true)?;

    Connection::handshake(stream, opts).await
}

/// Connect over a Unix domain socket and authenticate
#[cfg(unix)]
pub async fn connect_unix(opts: &ConnectOptions) -> Result<Connection<tokio::net::UnixStream>> {
    let path = opts
        .socket
        .clone()
        .ok_or_else(|| Error::protocol("no socket path configured"))?;
    debug!(socket = %path.display(), "Connecting to server");

    let stream = tokio::net::UnixStream::connect(&path).await.map_err(|e| {
        warn!(socket = %path.display(), error = %e, "Failed to connect to server");
        Error::Connect {
            addr: format!("unix {}", path.display()),
            reason: e.to_string(),
        }
    })?;

    Connection::handshake(stream, opts).await
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Run the connection phase over an established stream
    pub async fn handshake(stream: S, opts: &ConnectOptions) -> Result<Self> {
        let mut framed = Framed::new(stream, PacketCodec);

        let greeting = recv_packet(&mut framed).await?;
        if greeting.is_err() {
            return Err(server_error(&greeting));
        }
        let server_handshake = InitialHandshake::parse(&greeting.payload)
            .ok_or_else(|| Error::protocol("invalid server handshake"))?;

        debug!(
            server_version = %server_handshake.server_version,
            connection_id = server_handshake.connection_id,
            auth_plugin = %server_handshake.auth_plugin_name,
            "Received server handshake"
        );

        let mut caps = capabilities::DEFAULT_CAPABILITIES & server_handshake.capability_flags;
        if opts.database.is_some() {
            caps |= capabilities::CLIENT_CONNECT_WITH_DB & server_handshake.capability_flags;
        }
        if caps & capabilities::CLIENT_PROTOCOL_41 == 0 {
            return Err(Error::protocol("server does not support protocol 4.1"));
        }

        let mut plugin = server_handshake.auth_plugin_name.clone();
        let mut nonce = server_handshake.auth_plugin_data();
        let auth_response = scramble_for(&plugin, &opts.password, &nonce)
            .ok_or_else(|| Error::UnsupportedAuthPlugin(plugin.clone()))?;

        let response = HandshakeResponse {
            capability_flags: caps,
            max_packet_size: 16 * 1024 * 1024,
            character_set: 0x21, // utf8_general_ci
            username: opts.user.clone(),
            auth_response,
            database: opts.database.clone(),
            auth_plugin_name: plugin.clone(),
        };
        send_packet(&mut framed, response.encode(greeting.sequence_id.wrapping_add(1))).await?;

        loop {
            let packet = recv_packet(&mut framed).await?;
            let next_seq = packet.sequence_id.wrapping_add(1);
            match packet.header() {
                Some(0x00) => break,
                Some(0xFF) => {
                    let err = ErrPacket::parse(&packet.payload)
                        .unwrap_or_else(|| ErrPacket::new(1045, "28000", "Access denied"));
                    warn!(
                        error_code = err.error_code,
                        error_message = %err.error_message,
                        "Authentication failed"
                    );
                    return Err(Error::Auth(format!(
                        "Error {} ({}): {}",
                        err.error_code, err.sql_state, err.error_message
                    )));
                }
                Some(0xFE) => {
                    let switch = AuthSwitchRequest::parse(&packet.payload)
                        .ok_or_else(|| Error::protocol("invalid auth switch request"))?;
                    debug!(plugin = %switch.plugin_name, "Server requested auth switch");
                    plugin = switch.plugin_name;
                    nonce = switch.plugin_data;
                    let data = scramble_for(&plugin, &opts.password, &nonce)
                        .ok_or_else(|| Error::UnsupportedAuthPlugin(plugin.clone()))?;
                    send_packet(&mut framed, Packet::new(next_seq, data)).await?;
                }
                Some(0x01) if plugin == CACHING_SHA2_PASSWORD => {
                    match packet.payload.get(1).copied() {
                        Some(FAST_AUTH_SUCCESS) => debug!("caching_sha2_password fast auth succeeded"),
                        Some(PERFORM_FULL_AUTHENTICATION) => {
                            return Err(Error::Auth(
                                "caching_sha2_password full authentication requires a secure connection"
                                    .to_string(),
                            ));
                        }
                        other => {
                            return Err(Error::protocol(format!(
                                "unexpected caching_sha2_password status {:?}",
                                other
                            )));
                        }
                    }
                }
                other => {
                    return Err(Error::protocol(format!(
                        "unexpected packet header {:?} during authentication",
                        other
                    )));
                }
            }
        }

        debug!("Authentication successful");

        Ok(Self {
            framed,
            capabilities: caps,
            server_version: server_handshake.server_version,
            connection_id: server_handshake.connection_id,
        })
    }

    /// Run a text-protocol query and buffer the full result set.
    ///
    /// Statements without a result set return an empty [`ResultSet`].
    pub async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        debug!(sql = %sql, "Sending query");
        send_packet(&mut self.framed, Packet::command(Command::Query, sql.as_bytes())).await?;

        let first = recv_packet(&mut self.framed).await?;
        if first.is_err() {
            return Err(server_error(&first));
        }
        if first.is_ok() {
            return Ok(ResultSet::default());
        }

        let mut buf = &first.payload[..];
        let column_count = lenenc::read_int(&mut buf)
            .filter(|&count| count > 0 && count <= resultset::MAX_COLUMNS as u64)
            .ok_or_else(|| Error::protocol("invalid column count"))? as usize;

        let mut columns = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            let def = recv_packet(&mut self.framed).await?;
            columns.push(resultset::parse_column_name(&def.payload)?);
        }
        let mut result = ResultSet::new(columns);

        // EOF after column definitions, unless the server skipped it.
        let mut pending = recv_packet(&mut self.framed).await?;
        if pending.is_eof() {
            pending = recv_packet(&mut self.framed).await?;
        }

        loop {
            if pending.is_eof() {
                break;
            }
            if pending.is_err() {
                return Err(server_error(&pending));
            }
            result.push_row(resultset::parse_row(&pending.payload, column_count)?)?;
            pending = recv_packet(&mut self.framed).await?;
        }

        debug!(
            columns = result.columns.len(),
            rows = result.rows.len(),
            "Query complete"
        );
        Ok(result)
    }

    /// Send COM_QUIT and shut down the write half. Errors are ignored;
    /// the server may already have gone away.
    pub async fn close(&mut self) {
        if let Err(e) = self
            .framed
            .send(Packet::command(Command::Quit, &[]))
            .await
        {
            debug!(error = %e, "COM_QUIT failed");
        }
        let _ = self.framed.close().await;
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    pub fn connection_id(&self) -> u32 {
        self.connection_id
    }

    /// Negotiated capability flags
    pub fn capabilities(&self) -> u32 {
        self.capabilities
    }
}

async fn send_packet<S>(framed: &mut Framed<S, PacketCodec>, packet: Packet) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    framed.send(packet).await.map_err(Error::from)
}

async fn recv_packet<S>(framed: &mut Framed<S, PacketCodec>) -> Result<Packet>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match framed.next().await {
        Some(Ok(packet)) => Ok(packet),
        Some(Err(e)) => Err(Error::Io(e)),
        None => Err(Error::Disconnected),
    }
}

fn server_error(packet: &Packet) -> Error {
    match ErrPacket::parse(&packet.payload) {
        Some(err) => Error::Server {
            code: err.error_code,
            state: err.sql_state,
            message: err.error_message,
        },
        None => Error::protocol("malformed ERR packet"),
    }
}
