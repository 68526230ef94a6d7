//! Minimal MySQL client protocol.
//!
//! Just enough of the wire protocol to authenticate and run text-protocol
//! queries:
//! - Packet framing as a `tokio_util` codec
//! - Initial handshake, `mysql_native_password` and the
//!   `caching_sha2_password` fast path, including auth switch requests
//! - `COM_QUERY` result sets decoded into string cells
//!
//! Prepared statements, compression and TLS are not implemented.

pub mod codec;
pub mod connection;
pub mod error;
pub mod handshake;
pub mod lenenc;
pub mod packet;
pub mod resultset;

pub use codec::PacketCodec;
pub use connection::{ConnectOptions, Connection, connect_tcp};
#[cfg(unix)]
pub use connection::connect_unix;
pub use error::{Error, Result};
pub use packet::{Command, Packet, capabilities};
pub use resultset::ResultSet;
