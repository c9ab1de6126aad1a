use super::CollectError;
use reqwest::Client;
use std::net::IpAddr;

/// IP family an echo endpoint answers for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            Self::V4 => ip.is_ipv4(),
            Self::V6 => ip.is_ipv6(),
        }
    }
}

/// Ask an IP echo endpoint for our public address
///
/// The body must be a single IP literal of `family`, surrounding
/// whitespace ignored.
pub async fn fetch_public_ip(
    client: &Client,
    url: &str,
    family: IpFamily,
) -> Result<IpAddr, CollectError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CollectError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    parse_echo_body(&body, family)
}

pub fn parse_echo_body(body: &str, family: IpFamily) -> Result<IpAddr, CollectError> {
    let trimmed = body.trim();
    let ip: IpAddr = trimmed
        .parse()
        .map_err(|_| CollectError::InvalidAddress(trimmed.to_string()))?;

    if !family.matches(&ip) {
        return Err(CollectError::InvalidAddress(format!(
            "{} is not an {:?} address",
            ip, family
        )));
    }

    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_body() {
        let ip = parse_echo_body(" 203.0.113.7\n", IpFamily::V4).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.7");

        let ip = parse_echo_body("2001:db8::1\n", IpFamily::V6).unwrap();
        assert_eq!(ip.to_string(), "2001:db8::1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_echo_body("<html>rate limited</html>", IpFamily::V4),
            Err(CollectError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_echo_body("", IpFamily::V6),
            Err(CollectError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_family() {
        assert!(matches!(
            parse_echo_body("203.0.113.7", IpFamily::V6),
            Err(CollectError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_echo_body("::1", IpFamily::V4),
            Err(CollectError::InvalidAddress(_))
        ));
    }
}
