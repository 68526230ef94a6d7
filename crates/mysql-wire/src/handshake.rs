//! Connection phase packets and authentication scrambles.

use bytes::{Buf, BufMut, BytesMut};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::packet::{Packet, capabilities::*};

pub const MYSQL_NATIVE_PASSWORD: &str = "mysql_native_password";
pub const CACHING_SHA2_PASSWORD: &str = "caching_sha2_password";

/// MySQL initial handshake packet (server -> client)
#[derive(Debug, Clone)]
pub struct InitialHandshake {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub auth_plugin_data_part1: [u8; 8],
    pub capability_flags: u32,
    pub character_set: u8,
    pub status_flags: u16,
    pub auth_plugin_data_part2: Vec<u8>,
    pub auth_plugin_name: String,
}

impl InitialHandshake {
    /// Full auth plugin data (the 20 byte nonce)
    pub fn auth_plugin_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(20);
        data.extend_from_slice(&self.auth_plugin_data_part1);
        data.extend_from_slice(&self.auth_plugin_data_part2);
        data
    }

    /// Parse from packet payload
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut buf = payload;
        if buf.remaining() < 1 {
            return None;
        }
        let protocol_version = buf.get_u8();
        if protocol_version != 10 {
            return None;
        }

        let server_version = take_null_terminated(&mut buf)?;

        // connection id + auth data part 1 + filler + capability lower
        if buf.remaining() < 4 + 8 + 1 + 2 {
            return None;
        }
        let connection_id = buf.get_u32_le();

        let mut auth_plugin_data_part1 = [0u8; 8];
        buf.copy_to_slice(&mut auth_plugin_data_part1);
        buf.advance(1);

        let capability_flags_lower = buf.get_u16_le() as u32;

        // Pre-4.1 servers stop here.
        if buf.remaining() < 1 + 2 + 2 + 1 + 10 {
            return Some(Self {
                protocol_version,
                server_version,
                connection_id,
                auth_plugin_data_part1,
                capability_flags: capability_flags_lower,
                character_set: 0,
                status_flags: 0,
                auth_plugin_data_part2: Vec::new(),
                auth_plugin_name: MYSQL_NATIVE_PASSWORD.to_string(),
            });
        }

        let character_set = buf.get_u8();
        let status_flags = buf.get_u16_le();
        let capability_flags_upper = buf.get_u16_le() as u32;
        let capability_flags = capability_flags_lower | (capability_flags_upper << 16);

        let auth_plugin_data_len = buf.get_u8() as usize;
        buf.advance(10);

        let mut auth_plugin_data_part2 = Vec::new();
        if capability_flags & CLIENT_SECURE_CONNECTION != 0 {
            let len = auth_plugin_data_len.saturating_sub(8).max(13).min(buf.remaining());
            // The last byte of part 2 is a NUL terminator, not nonce.
            let data_len = buf[..len].iter().position(|&b| b == 0).unwrap_or(len);
            auth_plugin_data_part2.extend_from_slice(&buf[..data_len]);
            buf.advance(len);
        }

        let auth_plugin_name = if capability_flags & CLIENT_PLUGIN_AUTH != 0 && buf.has_remaining() {
            let null_pos = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            String::from_utf8_lossy(&buf[..null_pos]).to_string()
        } else {
            MYSQL_NATIVE_PASSWORD.to_string()
        };

        Some(Self {
            protocol_version,
            server_version,
            connection_id,
            auth_plugin_data_part1,
            capability_flags,
            character_set,
            status_flags,
            auth_plugin_data_part2,
            auth_plugin_name,
        })
    }
}

/// MySQL handshake response packet (client -> server)
#[derive(Debug, Clone)]
pub struct HandshakeResponse {
    pub capability_flags: u32,
    pub max_packet_size: u32,
    pub character_set: u8,
    pub username: String,
    pub auth_response: Vec<u8>,
    pub database: Option<String>,
    pub auth_plugin_name: String,
}

impl HandshakeResponse {
    /// Encode to packet
    pub fn encode(&self, sequence_id: u8) -> Packet {
        let mut buf = BytesMut::new();

        buf.put_u32_le(self.capability_flags);
        buf.put_u32_le(self.max_packet_size);
        buf.put_u8(self.character_set);

        // Reserved (23 bytes)
        buf.extend_from_slice(&[0u8; 23]);

        buf.extend_from_slice(self.username.as_bytes());
        buf.put_u8(0);

        if self.capability_flags & CLIENT_SECURE_CONNECTION != 0 {
            buf.put_u8(self.auth_response.len() as u8);
            buf.extend_from_slice(&self.auth_response);
        } else {
            buf.extend_from_slice(&self.auth_response);
            buf.put_u8(0);
        }

        if self.capability_flags & CLIENT_CONNECT_WITH_DB != 0 {
            if let Some(ref db) = self.database {
                buf.extend_from_slice(db.as_bytes());
            }
            buf.put_u8(0);
        }

        if self.capability_flags & CLIENT_PLUGIN_AUTH != 0 {
            buf.extend_from_slice(self.auth_plugin_name.as_bytes());
            buf.put_u8(0);
        }

        Packet::new(sequence_id, buf.freeze())
    }
}

/// Auth switch request (0xFE during the connection phase)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSwitchRequest {
    pub plugin_name: String,
    pub plugin_data: Vec<u8>,
}

impl AuthSwitchRequest {
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let mut buf = payload;
        if buf.first() != Some(&0xFE) {
            return None;
        }
        buf.advance(1);
        let plugin_name = take_null_terminated(&mut buf)?;
        let data = match buf.last() {
            Some(0) => &buf[..buf.len() - 1],
            _ => buf,
        };
        Some(Self {
            plugin_name,
            plugin_data: data.to_vec(),
        })
    }
}

/// ERR packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrPacket {
    pub error_code: u16,
    pub sql_state: String,
    pub error_message: String,
}

impl ErrPacket {
    pub fn new(error_code: u16, sql_state: &str, error_message: &str) -> Self {
        Self {
            error_code,
            sql_state: sql_state.to_string(),
            error_message: error_message.to_string(),
        }
    }

    /// Encode to packet (protocol 4.1 layout)
    pub fn encode(&self, sequence_id: u8) -> Packet {
        let mut buf = BytesMut::new();
        buf.put_u8(0xFF);
        buf.put_u16_le(self.error_code);
        buf.put_u8(b'#');
        buf.extend_from_slice(self.sql_state.as_bytes());
        buf.extend_from_slice(self.error_message.as_bytes());
        Packet::new(sequence_id, buf.freeze())
    }

    /// Parse from packet payload
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.first() != Some(&0xFF) {
            return None;
        }

        let mut buf = &payload[1..];
        if buf.remaining() < 2 {
            return None;
        }

        let error_code = buf.get_u16_le();

        let (sql_state, error_message) = if buf.first() == Some(&b'#') && buf.len() >= 6 {
            let sql_state = String::from_utf8_lossy(&buf[1..6]).to_string();
            let error_message = String::from_utf8_lossy(&buf[6..]).to_string();
            (sql_state, error_message)
        } else {
            ("HY000".to_string(), String::from_utf8_lossy(buf).to_string())
        };

        Some(Self {
            error_code,
            sql_state,
            error_message,
        })
    }
}

/// Compute the auth response for `plugin`, or None if the plugin is unknown.
pub fn scramble_for(plugin: &str, password: &str, nonce: &[u8]) -> Option<Vec<u8>> {
    match plugin {
        MYSQL_NATIVE_PASSWORD => Some(scramble_native_password(password, nonce)),
        CACHING_SHA2_PASSWORD => Some(scramble_caching_sha2(password, nonce)),
        _ => None,
    }
}

/// mysql_native_password:
/// `SHA1(password) XOR SHA1(nonce + SHA1(SHA1(password)))`
pub fn scramble_native_password(password: &str, nonce: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }

    let hash1 = Sha1::digest(password.as_bytes());
    let hash2 = Sha1::digest(hash1);

    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(hash2);
    let hash3 = hasher.finalize();

    hash1.iter().zip(hash3.iter()).map(|(a, b)| a ^ b).collect()
}

/// caching_sha2_password fast path:
/// `SHA256(password) XOR SHA256(SHA256(SHA256(password)) + nonce)`
pub fn scramble_caching_sha2(password: &str, nonce: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }

    let hash1 = Sha256::digest(password.as_bytes());
    let hash2 = Sha256::digest(hash1);

    let mut hasher = Sha256::new();
    hasher.update(hash2);
    hasher.update(nonce);
    let hash3 = hasher.finalize();

    hash1.iter().zip(hash3.iter()).map(|(a, b)| a ^ b).collect()
}

fn take_null_terminated(buf: &mut &[u8]) -> Option<String> {
    let null_pos = buf.iter().position(|&b| b == 0)?;
    let value = String::from_utf8_lossy(&buf[..null_pos]).to_string();
    buf.advance(null_pos + 1);
    Some(value)
}
