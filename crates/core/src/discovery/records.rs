use beacon_common::{Address, AddressError};
use std::net::SocketAddr;
use tracing::debug;

/// Parse a member record of the form `ip:port/protocol`
///
/// IPv6 addresses are bracketed: `[2001:db8::1]:443/udp`.
pub fn parse_member_record(record: &str) -> Result<Address, AddressError> {
    let record = record.trim();
    let (socket, protocol) = record
        .rsplit_once('/')
        .ok_or_else(|| AddressError::InvalidIp(record.to_string()))?;

    let socket: SocketAddr = socket
        .parse()
        .map_err(|_| AddressError::InvalidIp(socket.to_string()))?;

    Address::new(protocol.parse()?, socket.ip(), socket.port())
}

/// Parse every record that looks like an address, skipping the rest
pub fn parse_member_records(records: &[String]) -> Vec<Address> {
    records
        .iter()
        .filter_map(|record| match parse_member_record(record) {
            Ok(address) => Some(address),
            Err(e) => {
                debug!("skipping record {:?}: {}", record, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_common::Protocol;

    #[test]
    fn test_parse_ipv4_record() {
        let address = parse_member_record("10.0.0.1:80/tcp").unwrap();
        assert_eq!(address, Address::parse("10.0.0.1", 80, "tcp").unwrap());
    }

    #[test]
    fn test_parse_ipv6_record() {
        let address = parse_member_record("[2001:db8::1]:443/udp").unwrap();
        assert_eq!(address.protocol, Protocol::Udp);
        assert_eq!(address.port, 443);
        assert_eq!(address.ip.to_string(), "2001:db8::1");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_member_record("10.0.0.1:80").is_err());
        assert!(parse_member_record("10.0.0.1/tcp").is_err());
        assert!(parse_member_record("10.0.0.1:0/tcp").is_err());
        assert!(parse_member_record("10.0.0.1:80/icmp").is_err());
    }

    #[test]
    fn test_parse_records_skips_opaque_entries() {
        let records = vec![
            "10.0.0.1:80/tcp".to_string(),
            "v=beacon1 opaque".to_string(),
            "[::1]:53/udp".to_string(),
        ];
        assert_eq!(parse_member_records(&records).len(), 2);
    }
}
