use crate::domain::ports::PortProbe;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, TcpListener};

/// 試著 bind 0.0.0.0:port，和應用程式本身監聽的位址相同
#[derive(Debug, Clone, Default)]
pub struct TcpPortProbe;

impl TcpPortProbe {
    pub fn new() -> Self {
        Self
    }
}

impl PortProbe for TcpPortProbe {
    fn is_in_use(&self, port: u16) -> bool {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)) {
            Ok(_listener) => false,
            Err(e) if e.kind() == ErrorKind::AddrInUse => true,
            Err(e) => {
                // permission errors etc. are left for the application to report
                tracing::debug!("Port probe on {} failed: {}", port, e);
                false
            }
        }
    }
}
