//! Blocking client for the roster daemon.
//!
//! Every call opens a fresh TCP connection, sends one command with its
//! argument tokens, reads the result byte and, for listings, the entries that
//! follow. The daemon closes the connection after each response.

use std::io::{self, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

use crate::codes::{
    ConnectCode, DeleteCode, DisconnectCode, ListContentCode, ListUsersCode, PublishCode,
    RegisterCode, ResultCode, UnregisterCode,
};
use crate::command::Command;
use crate::frame::{self, FrameError, MAX_TOKEN_BYTES};

/// Default connect, read and write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while talking to the daemon.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The daemon address could not be resolved.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        /// Host and port as supplied.
        endpoint: String,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// The TCP connection could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// Address that refused or timed out.
        address: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Writing the request or reading the response failed.
    #[error("protocol exchange failed: {0}")]
    Frame(#[from] FrameError),
    /// The daemon answered with a byte outside the command's code table.
    #[error("unexpected result code {byte} for {command}")]
    UnknownCode {
        /// Command that was sent.
        command: Command,
        /// Byte that was received.
        byte: u8,
    },
}

impl From<io::Error> for ClientError {
    fn from(source: io::Error) -> Self {
        Self::Frame(FrameError::Io(source))
    }
}

/// A connected user as reported by `LIST_USERS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedUser {
    /// Registered username.
    pub username: String,
    /// Address the session was opened from.
    pub ip: String,
    /// Port the user declared when connecting.
    pub port: u16,
}

/// A listing response: the result code and, on success, its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<C, T> {
    /// Result code sent by the daemon.
    pub code: C,
    /// Entries following a success code; empty otherwise.
    pub entries: Vec<T>,
}

/// Client bound to a single daemon address.
#[derive(Debug, Clone)]
pub struct Client {
    address: SocketAddr,
    timeout: Duration,
}

impl Client {
    /// Builds a client for an already resolved address.
    #[must_use]
    pub const fn new(address: SocketAddr) -> Self {
        Self {
            address,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolves `host:port` and builds a client for the first address.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Resolve`] when resolution fails or yields no
    /// address.
    pub fn resolve(host: &str, port: u16) -> Result<Self, ClientError> {
        let endpoint = format!("{host}:{port}");
        let address = (host, port)
            .to_socket_addrs()
            .and_then(|mut addresses| {
                addresses.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses")
                })
            })
            .map_err(|source| ClientError::Resolve { endpoint, source })?;
        Ok(Self::new(address))
    }

    /// Overrides the connect, read and write timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Address this client talks to.
    #[must_use]
    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    /// Sends `REGISTER`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn register(&self, username: &str) -> Result<RegisterCode, ClientError> {
        self.simple(Command::Register, &[username.as_bytes()])
    }

    /// Sends `UNREGISTER`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn unregister(&self, username: &str) -> Result<UnregisterCode, ClientError> {
        self.simple(Command::Unregister, &[username.as_bytes()])
    }

    /// Sends `CONNECT`, declaring the port the user listens on.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn connect(&self, username: &str, port: u16) -> Result<ConnectCode, ClientError> {
        let port = port.to_string();
        self.simple(Command::Connect, &[username.as_bytes(), port.as_bytes()])
    }

    /// Sends `DISCONNECT`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn disconnect(&self, username: &str) -> Result<DisconnectCode, ClientError> {
        self.simple(Command::Disconnect, &[username.as_bytes()])
    }

    /// Sends `PUBLISH`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn publish(
        &self,
        username: &str,
        file: &str,
        description: &str,
    ) -> Result<PublishCode, ClientError> {
        self.simple(
            Command::Publish,
            &[username.as_bytes(), file.as_bytes(), description.as_bytes()],
        )
    }

    /// Sends `DELETE`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn delete(&self, username: &str, file: &str) -> Result<DeleteCode, ClientError> {
        self.simple(Command::Delete, &[username.as_bytes(), file.as_bytes()])
    }

    /// Sends `LIST_USERS` on behalf of `username`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn list_users(
        &self,
        username: &str,
    ) -> Result<Listing<ListUsersCode, ConnectedUser>, ClientError> {
        let stream = self.send(Command::ListUsers, &[username.as_bytes()])?;
        let mut reader = BufReader::new(&stream);
        let code = read_result::<ListUsersCode, _>(Command::ListUsers, &mut reader)?;
        let mut entries = Vec::new();
        if code.is_success() {
            let count: usize = frame::read_number(&mut reader)?;
            for _ in 0..count {
                let name = frame::read_text(&mut reader, MAX_TOKEN_BYTES)?;
                let ip = frame::read_text(&mut reader, MAX_TOKEN_BYTES)?;
                let port = frame::read_number(&mut reader)?;
                entries.push(ConnectedUser {
                    username: name,
                    ip,
                    port,
                });
            }
        }
        Ok(Listing { code, entries })
    }

    /// Sends `LIST_CONTENT` on behalf of `username` for `owner`'s catalogue.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn list_content(
        &self,
        username: &str,
        owner: &str,
    ) -> Result<Listing<ListContentCode, String>, ClientError> {
        let stream = self.send(
            Command::ListContent,
            &[username.as_bytes(), owner.as_bytes()],
        )?;
        let mut reader = BufReader::new(&stream);
        let code = read_result::<ListContentCode, _>(Command::ListContent, &mut reader)?;
        let mut entries = Vec::new();
        if code.is_success() {
            let count: usize = frame::read_number(&mut reader)?;
            for _ in 0..count {
                entries.push(frame::read_text(&mut reader, MAX_TOKEN_BYTES)?);
            }
        }
        Ok(Listing { code, entries })
    }

    /// Sends an arbitrary token sequence and returns the open stream.
    ///
    /// Useful for driving the daemon with malformed or unknown requests.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when connecting or writing fails.
    pub fn send_raw(&self, tokens: &[&[u8]]) -> Result<TcpStream, ClientError> {
        let mut stream = self.open()?;
        for token in tokens {
            frame::write_frame(&mut stream, token)?;
        }
        stream.flush()?;
        Ok(stream)
    }

    fn simple<C: ResultCode>(&self, command: Command, args: &[&[u8]]) -> Result<C, ClientError> {
        let stream = self.send(command, args)?;
        let mut reader = BufReader::new(&stream);
        read_result(command, &mut reader)
    }

    fn send(&self, command: Command, args: &[&[u8]]) -> Result<TcpStream, ClientError> {
        let mut tokens = Vec::with_capacity(args.len() + 1);
        tokens.push(command.token().as_bytes());
        tokens.extend_from_slice(args);
        self.send_raw(&tokens)
    }

    fn open(&self) -> Result<TcpStream, ClientError> {
        let stream = TcpStream::connect_timeout(&self.address, self.timeout).map_err(|source| {
            ClientError::Connect {
                address: self.address,
                source,
            }
        })?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        Ok(stream)
    }
}

fn read_result<C, R>(command: Command, reader: &mut R) -> Result<C, ClientError>
where
    C: ResultCode,
    R: io::Read,
{
    let byte = frame::read_code(reader)?;
    C::from_byte(byte).ok_or(ClientError::UnknownCode { command, byte })
}
