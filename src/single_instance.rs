//! Single-instance lock
//!
//! Binding a fixed localhost port is the whole coordination mechanism: the
//! first process to bind holds the lock until it exits, and every later
//! attempt observes the port as taken. No handshake, no peer messaging.

use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};

/// Port held by a running instance
pub const DEFAULT_INSTANCE_PORT: u16 = 49152;

/// Holds the instance port for the lifetime of the process
///
/// Dropping the lock releases the port and lets another instance start.
#[derive(Debug)]
pub struct InstanceLock {
    _listener: TcpListener,
    port: u16,
}

impl InstanceLock {
    /// Try to become the single running instance on the default port
    ///
    /// Returns `Ok(None)` when another instance already holds the port.
    pub fn acquire() -> std::io::Result<Option<Self>> {
        Self::acquire_on_port(DEFAULT_INSTANCE_PORT)
    }

    /// Try to acquire the lock on a specific port
    pub fn acquire_on_port(port: u16) -> std::io::Result<Option<Self>> {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);
        match TcpListener::bind(addr) {
            Ok(listener) => Ok(Some(Self {
                _listener: listener,
                port,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The port this lock holds
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}
