use bytes::{Buf, BufMut, Bytes, BytesMut};

/// MySQL packet header size: 3 bytes length + 1 byte sequence
pub const PACKET_HEADER_SIZE: usize = 4;
/// Maximum packet payload size (16MB - 1)
pub const MAX_PACKET_SIZE: usize = 0xFF_FF_FF;

/// MySQL wire protocol packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub sequence_id: u8,
    pub payload: Bytes,
}

impl Packet {
    pub fn new(sequence_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            sequence_id,
            payload: payload.into(),
        }
    }

    /// Build a command packet (always sequence 0)
    pub fn command(command: Command, argument: &[u8]) -> Self {
        let mut payload = BytesMut::with_capacity(1 + argument.len());
        payload.put_u8(command as u8);
        payload.extend_from_slice(argument);
        Self::new(0, payload.freeze())
    }

    /// First payload byte, used to tell OK/ERR/EOF/row packets apart
    pub fn header(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    pub fn is_ok(&self) -> bool {
        self.header() == Some(0x00)
    }

    pub fn is_err(&self) -> bool {
        self.header() == Some(0xFF)
    }

    /// EOF packets are 0xFE with fewer than 9 bytes; longer 0xFE payloads are
    /// rows starting with an 8-byte length-encoded integer.
    pub fn is_eof(&self) -> bool {
        self.header() == Some(0xFE) && self.payload.len() < 9
    }

    /// Encode packet to bytes (header + payload)
    pub fn encode(&self, dst: &mut BytesMut) {
        let len = self.payload.len();
        dst.reserve(PACKET_HEADER_SIZE + len);
        // 3 bytes for length (little endian)
        dst.put_u8((len & 0xFF) as u8);
        dst.put_u8(((len >> 8) & 0xFF) as u8);
        dst.put_u8(((len >> 16) & 0xFF) as u8);
        dst.put_u8(self.sequence_id);
        dst.extend_from_slice(&self.payload);
    }

    /// Try to decode packet from bytes, returns None if not enough data
    pub fn decode(src: &mut BytesMut) -> Option<Self> {
        if src.len() < PACKET_HEADER_SIZE {
            return None;
        }

        let len = src[0] as usize | ((src[1] as usize) << 8) | ((src[2] as usize) << 16);

        let total_len = PACKET_HEADER_SIZE + len;
        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return None;
        }

        let sequence_id = src[3];
        src.advance(PACKET_HEADER_SIZE);
        let payload = src.split_to(len).freeze();

        Some(Self {
            sequence_id,
            payload,
        })
    }
}

/// MySQL capability flags
#[allow(dead_code)]
pub mod capabilities {
    pub const CLIENT_LONG_PASSWORD: u32 = 1;
    pub const CLIENT_FOUND_ROWS: u32 = 1 << 1;
    pub const CLIENT_LONG_FLAG: u32 = 1 << 2;
    pub const CLIENT_CONNECT_WITH_DB: u32 = 1 << 3;
    pub const CLIENT_PROTOCOL_41: u32 = 1 << 9;
    pub const CLIENT_SSL: u32 = 1 << 11;
    pub const CLIENT_TRANSACTIONS: u32 = 1 << 14;
    pub const CLIENT_SECURE_CONNECTION: u32 = 1 << 15;
    pub const CLIENT_MULTI_RESULTS: u32 = 1 << 17;
    pub const CLIENT_PLUGIN_AUTH: u32 = 1 << 19;
    pub const CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA: u32 = 1 << 21;
    pub const CLIENT_DEPRECATE_EOF: u32 = 1 << 24;

    /// Capabilities requested by the client, masked with what the server offers.
    ///
    /// CLIENT_DEPRECATE_EOF stays off so result sets keep their EOF markers.
    pub const DEFAULT_CAPABILITIES: u32 = CLIENT_LONG_PASSWORD
        | CLIENT_FOUND_ROWS
        | CLIENT_LONG_FLAG
        | CLIENT_PROTOCOL_41
        | CLIENT_TRANSACTIONS
        | CLIENT_SECURE_CONNECTION
        | CLIENT_MULTI_RESULTS
        | CLIENT_PLUGIN_AUTH;
}

/// Client commands used by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Quit = 0x01,
    Query = 0x03,
}
