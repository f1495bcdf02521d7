//! Concrete packet types for the text protocol subset the snapshot core
//! needs: handshake, authentication, `OK`/`ERR`/`EOF`, and result-set
//! framing. Grounded in the source's own packet vocabulary, rewritten to
//! own their bytes instead of borrowing from a reused read buffer.

use std::str::from_utf8;

use crate::protocol::{
    capability, msc, read_length_coded_string, read_null_terminated_bytes,
    read_unsigned_integer_little_endian, read_unsigned_short_little_endian,
    write_length_coded_bytes, write_null_terminated_string, write_unsigned_4byte_little_endian,
    write_unsigned_short_little_endian, Packet,
};
use crate::utils::mysql_password_encrypted::scramble411;

#[derive(Debug, Clone, Copy, Default)]
pub struct PacketHeader {
    pub body_length: u32,
    pub sequence_number: u8,
}

impl PacketHeader {
    pub fn new(body_length: u32, sequence_number: u8) -> Self {
        Self {
            body_length,
            sequence_number,
        }
    }
}

impl Packet for PacketHeader {
    fn from_bytes(buf: &[u8]) -> Self {
        let body_length =
            (buf[0] as u32) | ((buf[1] as u32) << 8) | ((buf[2] as u32) << 16);
        Self {
            body_length,
            sequence_number: buf[3],
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        vec![
            (self.body_length & 0xFF) as u8,
            ((self.body_length >> 8) & 0xFF) as u8,
            ((self.body_length >> 16) & 0xFF) as u8,
            self.sequence_number,
        ]
    }
}

/// The server's initial greeting. Only the fields the connection layer
/// actually needs (protocol version, scramble seed, capability flags)
/// are kept; server version/thread id are parsed for completeness since
/// a failed handshake's error message often quotes them back.
#[derive(Debug, Clone, Default)]
pub struct HandshakeInitializationPacket {
    pub protocol_version: u8,
    pub server_version: String,
    pub thread_id: u32,
    pub seed: Vec<u8>,
    pub server_capabilities: u32,
    pub server_charset_number: u8,
    pub server_status: u16,
}

impl HandshakeInitializationPacket {
    pub fn supports(&self, flag: u32) -> bool {
        self.server_capabilities & flag != 0
    }
}

impl Packet for HandshakeInitializationPacket {
    fn from_bytes(buf: &[u8]) -> Self {
        let mut index = 0;
        let protocol_version = buf[index];
        index += 1;

        let server_version_bytes = read_null_terminated_bytes(&buf[index..]);
        let server_version = from_utf8(server_version_bytes).unwrap_or_default().to_string();
        index += server_version_bytes.len() + 1;

        let thread_id = read_unsigned_integer_little_endian(&buf[index..index + 4]);
        index += 4;

        let mut seed = buf[index..index + 8].to_vec();
        index += 8;
        index += 1; // filler, always 0x00

        let capabilities_lower =
            read_unsigned_short_little_endian(&buf[index..index + 2]) as u32;
        index += 2;

        let mut server_charset_number = 0;
        let mut server_status = 0;
        let mut server_capabilities = capabilities_lower;

        if buf.len() > index {
            server_charset_number = buf[index];
            index += 1;
            server_status = read_unsigned_short_little_endian(&buf[index..index + 2]);
            index += 2;
            let capabilities_upper =
                read_unsigned_short_little_endian(&buf[index..index + 2]) as u32;
            server_capabilities = (capabilities_upper << 16) | capabilities_lower;
            index += 2;
            index += 1 + 10; // auth-plugin-data-len + 10 reserved bytes

            if server_capabilities & capability::CLIENT_SECURE_CONNECTION != 0 && buf.len() >= index + 12 {
                seed.extend_from_slice(&buf[index..index + 12]);
            }
        }

        Self {
            protocol_version,
            server_version,
            thread_id,
            seed,
            server_capabilities,
            server_charset_number,
            server_status,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        unimplemented!("server-only packet, client never encodes this")
    }
}

/// Old (pre-4.1) `mysql_old_password` scramble reply.
pub struct Reply323Packet {
    pub seed: Vec<u8>,
}

impl Packet for Reply323Packet {
    fn from_bytes(_buf: &[u8]) -> Self {
        unimplemented!("client-only packet, never read back from the wire")
    }

    fn to_bytes(&self) -> Vec<u8> {
        if self.seed.is_empty() {
            vec![0]
        } else {
            self.seed.clone()
        }
    }
}

/// 4.1+ authentication response (`mysql_native_password`).
pub struct ClientAuthenticationPacket {
    pub client_capability: u32,
    pub username: String,
    pub password: String,
    pub charset_number: u8,
    pub database_name: String,
    pub scramble_buff: Vec<u8>,
}

impl ClientAuthenticationPacket {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        charset_number: u8,
        database_name: impl Into<String>,
        scramble_buff: Vec<u8>,
    ) -> Self {
        let database_name = database_name.into();
        let mut client_capability = capability::CLIENT_LONG_PASSWORD
            | capability::CLIENT_LONG_FLAG
            | capability::CLIENT_PROTOCOL_41
            | capability::CLIENT_INTERACTIVE
            | capability::CLIENT_TRANSACTIONS
            | capability::CLIENT_SECURE_CONNECTION
            | capability::CLIENT_MULTI_STATEMENTS
            | capability::CLIENT_MULTI_RESULTS;
        if !database_name.is_empty() {
            client_capability |= capability::CLIENT_CONNECT_WITH_DB;
        }
        Self {
            client_capability,
            username: username.into(),
            password: password.into(),
            charset_number,
            database_name,
            scramble_buff,
        }
    }
}

impl Packet for ClientAuthenticationPacket {
    fn from_bytes(_buf: &[u8]) -> Self {
        unimplemented!("client-only packet")
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_unsigned_4byte_little_endian(self.client_capability, &mut out);
        write_unsigned_4byte_little_endian(msc::MAX_PACKET_LENGTH, &mut out);
        out.push(self.charset_number);
        out.extend(std::iter::repeat(0u8).take(23));

        write_null_terminated_string(&self.username, &mut out);

        if self.password.is_empty() {
            out.push(0x00);
        } else {
            let scrambled = scramble411(self.password.as_bytes(), &self.scramble_buff);
            write_length_coded_bytes(&scrambled, &mut out);
        }

        if !self.database_name.is_empty() {
            write_null_terminated_string(&self.database_name, &mut out);
        }

        out
    }
}

const QUERY_COMMAND: u8 = 0x03;

pub struct QueryCommandPacket {
    pub sql: String,
}

impl QueryCommandPacket {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

impl Packet for QueryCommandPacket {
    fn from_bytes(_buf: &[u8]) -> Self {
        unimplemented!("client-only packet")
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![QUERY_COMMAND];
        out.extend_from_slice(self.sql.as_bytes());
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub insert_id: u64,
    pub server_status: u16,
    pub warning_count: u16,
    pub message: String,
}

impl Packet for OkPacket {
    fn from_bytes(buf: &[u8]) -> Self {
        let mut index = 1; // skip the leading 0x00 field-count byte
        let (affected_rows, consumed) = crate::protocol::read_length_coded_binary(buf, index);
        index += consumed;
        let (insert_id, consumed) = crate::protocol::read_length_coded_binary(buf, index);
        index += consumed;
        let server_status = read_unsigned_short_little_endian(&buf[index..index + 2]);
        index += 2;
        let warning_count = read_unsigned_short_little_endian(&buf[index..index + 2]);
        index += 2;
        let message = from_utf8(&buf[index..]).unwrap_or_default().to_string();
        Self {
            affected_rows: affected_rows.max(0) as u64,
            insert_id: insert_id.max(0) as u64,
            server_status,
            warning_count,
            message,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        unimplemented!("server-only packet")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorPacket {
    pub error_number: u16,
    pub sql_state: String,
    pub message: String,
}

impl Packet for ErrorPacket {
    fn from_bytes(buf: &[u8]) -> Self {
        let mut index = 1;
        let error_number = read_unsigned_short_little_endian(&buf[index..index + 2]);
        index += 2;
        index += 1; // sql-state marker ('#')
        let sql_state = from_utf8(&buf[index..index + 5]).unwrap_or_default().to_string();
        index += 5;
        let message = from_utf8(&buf[index..]).unwrap_or_default().to_string();
        Self {
            error_number,
            sql_state,
            message,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        unimplemented!("server-only packet")
    }
}

impl std::fmt::Display for ErrorPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ERROR {} ({}): {}", self.error_number, self.sql_state, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EofPacket {
    pub warning_count: u16,
    pub status_flag: u16,
}

impl EofPacket {
    pub fn more_results_exist(&self) -> bool {
        self.status_flag & 0x0008 != 0
    }
}

impl Packet for EofPacket {
    fn from_bytes(buf: &[u8]) -> Self {
        let warning_count = read_unsigned_short_little_endian(&buf[1..3]);
        let status_flag = read_unsigned_short_little_endian(&buf[3..5]);
        Self {
            warning_count,
            status_flag,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0xFE];
        write_unsigned_short_little_endian(self.warning_count, &mut out);
        write_unsigned_short_little_endian(self.status_flag, &mut out);
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultSetHeaderPacket {
    pub column_count: i64,
}

impl Packet for ResultSetHeaderPacket {
    fn from_bytes(buf: &[u8]) -> Self {
        let (column_count, _) = crate::protocol::read_length_coded_binary(buf, 0);
        Self { column_count }
    }

    fn to_bytes(&self) -> Vec<u8> {
        unimplemented!("server-only packet")
    }
}

/// One column descriptor from a result-set's field block.
#[derive(Debug, Clone, Default)]
pub struct FieldPacket {
    pub db: String,
    pub table: String,
    pub name: String,
    pub column_type: u8,
}

impl Packet for FieldPacket {
    fn from_bytes(buf: &[u8]) -> Self {
        let mut index = 0;
        let (_catalog, consumed) = read_length_coded_string(buf, index);
        index += consumed;
        let (db, consumed) = read_length_coded_string(buf, index);
        index += consumed;
        let (table, consumed) = read_length_coded_string(buf, index);
        index += consumed;
        let (_original_table, consumed) = read_length_coded_string(buf, index);
        index += consumed;
        let (name, consumed) = read_length_coded_string(buf, index);
        index += consumed;
        let (_original_name, consumed) = read_length_coded_string(buf, index);
        index += consumed;
        index += 1; // length-of-fixed-fields filler, always 0x0c
        index += 2; // character set
        index += 4; // column length
        let column_type = buf[index];
        Self {
            db: db.unwrap_or_default(),
            table: table.unwrap_or_default(),
            name: name.unwrap_or_default(),
            column_type,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        unimplemented!("server-only packet")
    }
}

/// A single data row, with `None` distinguishing SQL NULL from `""`.
#[derive(Debug, Clone, Default)]
pub struct RowDataPacket {
    pub columns: Vec<Option<String>>,
}

impl Packet for RowDataPacket {
    fn from_bytes(buf: &[u8]) -> Self {
        let mut index = 0;
        let mut columns = Vec::new();
        while index < buf.len() {
            let (value, consumed) = read_length_coded_string(buf, index);
            columns.push(value);
            index += consumed;
        }
        Self { columns }
    }

    fn to_bytes(&self) -> Vec<u8> {
        unimplemented!("server-only packet")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = PacketHeader::new(42, 3);
        let bytes = header.to_bytes();
        let parsed = PacketHeader::from_bytes(&bytes);
        assert_eq!(parsed.body_length, 42);
        assert_eq!(parsed.sequence_number, 3);
    }

    #[test]
    fn ok_packet_parses_affected_rows() {
        let mut buf = vec![0x00, 3, 0];
        write_unsigned_short_little_endian(2, &mut buf);
        write_unsigned_short_little_endian(0, &mut buf);
        let ok = OkPacket::from_bytes(&buf);
        assert_eq!(ok.affected_rows, 3);
        assert_eq!(ok.server_status, 2);
    }

    #[test]
    fn row_data_packet_parses_mixed_null_and_text() {
        let mut buf = vec![251u8]; // NULL
        buf.push(5);
        buf.extend_from_slice(b"hello");
        let row = RowDataPacket::from_bytes(&buf);
        assert_eq!(row.columns, vec![None, Some("hello".to_string())]);
    }
}
