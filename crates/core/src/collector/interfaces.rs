use std::io;
use std::net::IpAddr;

/// One address bound to a local network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub ip: IpAddr,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            name: name.into(),
            ip,
        }
    }
}

/// Source of local interface addresses
pub trait InterfaceSource: Send + Sync {
    fn interfaces(&self) -> io::Result<Vec<NetworkInterface>>;
}

/// Interfaces of the running host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> io::Result<Vec<NetworkInterface>> {
        Ok(if_addrs::get_if_addrs()?
            .into_iter()
            .map(|iface| {
                let ip = iface.ip();
                NetworkInterface::new(iface.name, ip)
            })
            .collect())
    }
}

/// Keep interfaces whose name avoids every denied substring and whose
/// address is not loopback
pub fn filter_interfaces(
    interfaces: Vec<NetworkInterface>,
    denied: &[String],
) -> Vec<NetworkInterface> {
    interfaces
        .into_iter()
        .filter(|iface| !denied.iter().any(|d| iface.name.contains(d.as_str())))
        .filter(|iface| !iface.ip.is_loopback())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_common::config::collector::DEFAULT_DENIED_INTERFACES;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn denied() -> Vec<String> {
        DEFAULT_DENIED_INTERFACES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_default_deny_list() {
        let interfaces = vec![
            NetworkInterface::new("docker0", IpAddr::V4(Ipv4Addr::new(172, 17, 0, 1))),
            NetworkInterface::new("eth0", IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10))),
            NetworkInterface::new("lo", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            NetworkInterface::new("br-1a2b", IpAddr::V4(Ipv4Addr::new(172, 18, 0, 1))),
            NetworkInterface::new("veth9f", IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2))),
        ];

        let kept = filter_interfaces(interfaces, &denied());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "eth0");
    }

    #[test]
    fn test_filter_drops_loopback_on_allowed_interface() {
        let interfaces = vec![
            NetworkInterface::new("eth0", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2))),
            NetworkInterface::new("eth0", IpAddr::V6(Ipv6Addr::LOCALHOST)),
            NetworkInterface::new("eth0", IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1))),
        ];

        let kept = filter_interfaces(interfaces, &denied());
        assert_eq!(kept.len(), 1);
        assert!(kept[0].ip.is_ipv6());
    }

    #[test]
    fn test_custom_deny_list() {
        let interfaces = vec![
            NetworkInterface::new("wg0", IpAddr::V4(Ipv4Addr::new(10, 8, 0, 1))),
            NetworkInterface::new("docker0", IpAddr::V4(Ipv4Addr::new(172, 17, 0, 1))),
        ];

        let kept = filter_interfaces(interfaces, &["wg".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "docker0");
    }
}
