//! Register bus interface and the USB2MDIO adapter protocol.
//!
//! The adapter speaks a CRLF-terminated line protocol: every command is
//! echoed back, then answered with a single response line. A read that
//! times out produces an empty line; the bus reports that as `Ok(None)`
//! ("no response"), not as an error. Opening and configuring the physical
//! serial device is the caller's concern; the protocol itself only needs
//! `Read + Write`.

use std::io::{BufRead, BufReader, Read, Write};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed adapter response: {0:?}")]
    Response(String),
}

/// Something that can read and write hardware registers by address.
pub trait RegisterBus {
    /// Read a register. `Ok(None)` means the device did not answer within
    /// the transport's timeout.
    fn read_register(&mut self, address: u32) -> Result<Option<u32>, TransportError>;

    fn write_register(&mut self, address: u32, value: u32) -> Result<(), TransportError>;
}

const ENDLINE: &str = "\r\n";

/// USB2MDIO serial adapter. Generic over the port so tests can drive the
/// protocol with an in-memory pair.
pub struct UsbMdio<P: Read + Write> {
    port: BufReader<P>,
}

impl<P: Read + Write> UsbMdio<P> {
    pub fn new(port: P) -> Self {
        Self {
            port: BufReader::new(port),
        }
    }

    /// Select the MDIO port and PHY address to talk to.
    pub fn select(&mut self, port: u32, phy_id: u32) -> Result<(), TransportError> {
        self.command(&format!("mdio_port {}", port))?;
        self.command(&format!("mdio_phy {}", phy_id))?;
        Ok(())
    }

    /// Send one command and return the response line. The adapter echoes
    /// the command first; the echo is consumed and discarded.
    fn command(&mut self, command: &str) -> Result<String, TransportError> {
        let writer = self.port.get_mut();
        writer.write_all(command.as_bytes())?;
        writer.write_all(ENDLINE.as_bytes())?;
        writer.flush()?;

        let mut echo = String::new();
        self.port.read_line(&mut echo)?;
        let mut response = String::new();
        self.port.read_line(&mut response)?;
        let response = response.trim().to_string();
        debug!(command, response = %response, "adapter exchange");
        Ok(response)
    }
}

impl<P: Read + Write> RegisterBus for UsbMdio<P> {
    fn read_register(&mut self, address: u32) -> Result<Option<u32>, TransportError> {
        let response = self.command(&format!("mdio_r {}", address))?;
        if response.is_empty() {
            return Ok(None);
        }
        // Response shape: "<reg> <value> <status>", value in hex.
        let parts: Vec<&str> = response.split_whitespace().collect();
        let [_, value, _] = parts.as_slice() else {
            return Err(TransportError::Response(response));
        };
        let value = value.strip_prefix("0x").unwrap_or(value);
        u32::from_str_radix(value, 16)
            .map(Some)
            .map_err(|_| TransportError::Response(response.clone()))
    }

    fn write_register(&mut self, address: u32, value: u32) -> Result<(), TransportError> {
        self.command(&format!("mdio_w {} {}", address, value))?;
        Ok(())
    }
}
