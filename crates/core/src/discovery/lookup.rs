use super::LookupError;
use async_trait::async_trait;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;
use tracing::debug;

/// TXT record lookup abstraction
///
/// Each returned string is one TXT record with its character-strings
/// concatenated.
#[async_trait]
pub trait TxtLookup: Send + Sync {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupError>;
}

/// TXT lookups against the system DNS configuration
pub struct DnsTxtLookup {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsTxtLookup {
    /// Build a resolver from the system configuration
    pub fn from_system_conf(timeout: Duration) -> Result<Self, LookupError> {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| LookupError::Resolver(e.to_string()))?;
        opts.timeout = timeout;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        })
    }
}

#[async_trait]
impl TxtLookup for DnsTxtLookup {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupError> {
        debug!("TXT lookup {}", name);

        let result = tokio::time::timeout(self.timeout, self.resolver.txt_lookup(name))
            .await
            .map_err(|_| LookupError::Timeout {
                name: name.to_string(),
            })?;

        let lookup = match result {
            Ok(lookup) => lookup,
            Err(e) => return empty_or_error(name, &e),
        };

        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<String>()
            })
            .collect())
    }
}

/// A name that exists but carries no TXT records (NODATA) is an empty
/// answer. NXDOMAIN and everything else are errors.
fn empty_or_error(name: &str, err: &ResolveError) -> Result<Vec<String>, LookupError> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound {
            response_code: ResponseCode::NoError,
            ..
        } => {
            debug!("{} has no TXT records", name);
            Ok(Vec::new())
        }
        ResolveErrorKind::Timeout => Err(LookupError::Timeout {
            name: name.to_string(),
        }),
        _ => Err(LookupError::Resolve {
            name: name.to_string(),
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::op::Query;

    fn no_records(response_code: ResponseCode) -> ResolveError {
        ResolveErrorKind::NoRecordsFound {
            query: Box::new(Query::new()),
            soa: None,
            negative_ttl: None,
            response_code,
            trusted: true,
        }
        .into()
    }

    #[test]
    fn test_nodata_is_empty_answer() {
        let records = empty_or_error("n2.node.beacon.test", &no_records(ResponseCode::NoError));
        assert_eq!(records.unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_nxdomain_is_error() {
        let err = empty_or_error("gone.node.beacon.test", &no_records(ResponseCode::NXDomain));
        assert!(matches!(err, Err(LookupError::Resolve { .. })));
    }

    #[test]
    fn test_timeout_kind_maps_to_timeout() {
        let err = empty_or_error("slow.node.beacon.test", &ResolveErrorKind::Timeout.into());
        assert!(matches!(err, Err(LookupError::Timeout { .. })));
    }
}
