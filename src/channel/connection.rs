//! The one MySQL client-protocol connection every other component issues
//! SQL through (SPEC_FULL.md §4.8): handshake negotiation, a text-protocol
//! query executor, and an update executor. Intentionally not a full
//! protocol implementation — no `COM_BINLOG_DUMP` decoding.

use std::time::Duration;

use crate::error::ConnectionError;
use crate::protocol::packets::{
    ClientAuthenticationPacket, EofPacket, ErrorPacket, FieldPacket, HandshakeInitializationPacket,
    OkPacket, QueryCommandPacket, Reply323Packet, ResultSetHeaderPacket, RowDataPacket,
};
use crate::protocol::{msc, Packet};
use crate::utils::mysql_password_encrypted::scramble323;

use super::{SocketChannel, TcpChannel};

const DEFAULT_CHARSET_NUMBER: u8 = 33; // utf8_general_ci

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub default_schema: String,
    pub charset_number: u8,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl ConnectionInfo {
    pub fn new(address: impl Into<String>, port: u16, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            username: username.into(),
            password: password.into(),
            default_schema: String::new(),
            charset_number: DEFAULT_CHARSET_NUMBER,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }
}

/// A decoded result set: column descriptors plus the rows returned by a
/// `SELECT`/`SHOW`/`DESCRIBE` style statement.
pub struct ResultSet {
    pub columns: Vec<FieldPacket>,
    pub rows: Vec<RowDataPacket>,
}

impl ResultSet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// The SQL-issuing surface every higher layer (`ServerProbe`, the
/// orchestrator) depends on, rather than the concrete [`MysqlConnection`]
/// directly. Lets tests substitute a scripted fake connection the same
/// way [`super::SocketChannel`] lets the connection itself substitute a
/// fake transport.
pub trait SqlConnection {
    fn query(&mut self, sql: &str) -> Result<ResultSet, ConnectionError>;
    fn execute(&mut self, sql: &str) -> Result<u64, ConnectionError>;
    fn select_db(&mut self, database: &str) -> Result<(), ConnectionError>;
}

pub struct MysqlConnection {
    channel: Box<dyn SocketChannel>,
    info: ConnectionInfo,
    sequence: u8,
}

impl MysqlConnection {
    pub fn connect(info: ConnectionInfo) -> Result<Self, ConnectionError> {
        let channel = TcpChannel::connect(&info.address, info.port, info.connect_timeout)?;
        let mut connection = Self {
            channel: Box::new(channel),
            sequence: 0,
            info,
        };
        connection.negotiate()?;
        Ok(connection)
    }

    /// Opens a second, independent connection with the same credentials
    /// — the dedicated metadata connection the orchestrator keeps
    /// alongside the main snapshot connection (§4.8).
    pub fn fork(&self) -> Result<Self, ConnectionError> {
        Self::connect(self.info.clone())
    }

    fn negotiate(&mut self) -> Result<(), ConnectionError> {
        let (header, body) = self.read_packet()?;
        if body.is_empty() {
            return Err(ConnectionError::new("empty handshake packet"));
        }
        if body[0] == 0xFF {
            let error = ErrorPacket::from_bytes(&body);
            return Err(ConnectionError::new(format!("handshake failed: {error}")));
        }

        let handshake = HandshakeInitializationPacket::from_bytes(&body);
        self.sequence = header.sequence_number + 1;

        if handshake.protocol_version < msc::DEFAULT_PROTOCOL_VERSION {
            self.auth_323(&handshake.seed)?;
        } else {
            self.auth_411(&handshake)?;
        }

        let (_, reply_body) = self.read_packet()?;
        if reply_body.first() == Some(&0xFF) {
            let error = ErrorPacket::from_bytes(&reply_body);
            return Err(ConnectionError::new(format!("authentication failed: {error}")));
        }
        Ok(())
    }

    fn auth_323(&mut self, seed: &[u8]) -> Result<(), ConnectionError> {
        let seed_str = std::str::from_utf8(seed).unwrap_or_default();
        let scrambled = if self.info.password.is_empty() {
            String::new()
        } else {
            scramble323(Some(&self.info.password), Some(seed_str))
        };
        let packet = Reply323Packet {
            seed: scrambled.into_bytes(),
        };
        self.write_packet(&packet.to_bytes())
    }

    fn auth_411(&mut self, handshake: &HandshakeInitializationPacket) -> Result<(), ConnectionError> {
        let packet = ClientAuthenticationPacket::new(
            self.info.username.clone(),
            self.info.password.clone(),
            self.info.charset_number,
            self.info.default_schema.clone(),
            handshake.seed.clone(),
        );
        self.write_packet(&packet.to_bytes())
    }

    fn read_packet(&mut self) -> Result<(crate::protocol::packets::PacketHeader, Vec<u8>), ConnectionError> {
        let mut header_buf = [0u8; 4];
        self.channel
            .read_exact_with_timeout(&mut header_buf, self.info.read_timeout)?;
        let header = crate::protocol::packets::PacketHeader::from_bytes(&header_buf);
        let mut body = vec![0u8; header.body_length as usize];
        self.channel
            .read_exact_with_timeout(&mut body, self.info.read_timeout)?;
        self.sequence = header.sequence_number.wrapping_add(1);
        Ok((header, body))
    }

    fn write_packet(&mut self, body: &[u8]) -> Result<(), ConnectionError> {
        let header = crate::protocol::packets::PacketHeader::new(body.len() as u32, self.sequence);
        let mut out = header.to_bytes();
        out.extend_from_slice(body);
        self.channel.write_all(&out)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(())
    }

    fn send_command(&mut self, sql: &str) -> Result<(), ConnectionError> {
        self.sequence = 0;
        let command = QueryCommandPacket::new(sql);
        self.write_packet(&command.to_bytes())
    }

    /// Runs a statement expected to return a result set (`SELECT`,
    /// `SHOW`, `DESCRIBE`).
    pub fn query(&mut self, sql: &str) -> Result<ResultSet, ConnectionError> {
        self.send_command(sql)?;

        let (_, body) = self.read_packet()?;
        if body.first() == Some(&0xFF) {
            let error = ErrorPacket::from_bytes(&body);
            return Err(ConnectionError::new(format!("{error}\nwhile executing: {sql}")));
        }

        let header = ResultSetHeaderPacket::from_bytes(&body);
        let mut columns = Vec::with_capacity(header.column_count.max(0) as usize);
        for _ in 0..header.column_count {
            let (_, field_body) = self.read_packet()?;
            columns.push(FieldPacket::from_bytes(&field_body));
        }
        let (_, eof_body) = self.read_packet()?;
        let _ = EofPacket::from_bytes(&eof_body);

        let mut rows = Vec::new();
        loop {
            let (_, row_body) = self.read_packet()?;
            if row_body.first() == Some(&0xFE) && row_body.len() < 9 {
                break;
            }
            rows.push(RowDataPacket::from_bytes(&row_body));
        }

        Ok(ResultSet { columns, rows })
    }

    /// Runs a statement that does not return rows (`SET`, `START
    /// TRANSACTION`, `FLUSH TABLES WITH READ LOCK`, `UNLOCK TABLES`,
    /// `COMMIT`, `ROLLBACK`, `USE`). Returns the affected-row count for
    /// callers that care (DML); most orchestrator calls ignore it.
    pub fn execute(&mut self, sql: &str) -> Result<u64, ConnectionError> {
        self.send_command(sql)?;
        let (_, body) = self.read_packet()?;
        if body.first() == Some(&0xFF) {
            let error = ErrorPacket::from_bytes(&body);
            return Err(ConnectionError::new(format!("{error}\nwhile executing: {sql}")));
        }
        let ok = OkPacket::from_bytes(&body);
        Ok(ok.affected_rows)
    }

    pub fn select_db(&mut self, database: &str) -> Result<(), ConnectionError> {
        self.execute(&format!("USE `{database}`")).map(|_| ())
    }
}

impl SqlConnection for MysqlConnection {
    fn query(&mut self, sql: &str) -> Result<ResultSet, ConnectionError> {
        MysqlConnection::query(self, sql)
    }

    fn execute(&mut self, sql: &str) -> Result<u64, ConnectionError> {
        MysqlConnection::execute(self, sql)
    }

    fn select_db(&mut self, database: &str) -> Result<(), ConnectionError> {
        MysqlConnection::select_db(self, database)
    }
}
