//! Socket setup and broadcast-address discovery
//!
//! One UDP socket is shared by all three worker loops: it receives unit
//! traffic, unicasts registration replies and broadcasts probes and operator
//! commands. UDP's atomic-datagram semantics make the concurrent sends safe
//! without coordination.
//!
//! The broadcast address is derived from the IPv4 address of the configured
//! wireless interface by substituting 255 for the last octet. If the
//! interface is absent, carries no IPv4 address, or reports an address with a
//! zero first octet, the configured fallback applies instead.

use crate::error::{Error, Result};
use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

/// Read timeout on the shared socket so the receiver loop can observe the
/// running flag between waits
pub const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Bind the shared socket to all interfaces on `port`, broadcast-enabled
pub fn bind_broadcast_socket(port: u16) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(("0.0.0.0", port))?;
    socket.set_broadcast(true)?;
    socket.set_read_timeout(Some(READ_TIMEOUT))?;
    Ok(socket)
}

/// Resolve the broadcast address for the telemetry network
pub fn resolve_broadcast_addr(
    interface: &str,
    fallback: &str,
    port: u16,
) -> Result<SocketAddr> {
    let fallback: Ipv4Addr = fallback
        .parse()
        .map_err(|_| Error::InvalidAddress(fallback.to_string()))?;

    let ip = match interface_ipv4(interface) {
        Some(ip) if ip.octets()[0] != 0 => {
            let broadcast = broadcast_from_ipv4(ip);
            log::debug!("interface {} has address {}", interface, ip);
            broadcast
        }
        Some(ip) => {
            log::warn!(
                "interface {} reports unusable address {}, using fallback broadcast {}",
                interface,
                ip,
                fallback
            );
            fallback
        }
        None => {
            log::warn!(
                "interface {} not found or without IPv4 address, using fallback broadcast {}",
                interface,
                fallback
            );
            fallback
        }
    };

    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

/// Broadcast address for a /24 around the given address
fn broadcast_from_ipv4(ip: Ipv4Addr) -> Ipv4Addr {
    let octets = ip.octets();
    Ipv4Addr::new(octets[0], octets[1], octets[2], 255)
}

/// First IPv4 address of the named interface, if any
fn interface_ipv4(name: &str) -> Option<Ipv4Addr> {
    let interfaces = NetworkInterface::show().ok()?;
    interfaces
        .into_iter()
        .find(|iface| iface.name == name)?
        .addr
        .into_iter()
        .find_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
}
