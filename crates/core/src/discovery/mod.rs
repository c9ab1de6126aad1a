/// DNS based peer discovery
///
/// - TXT lookup abstraction and the system DNS implementation
/// - Room/member resolution with per-member failure isolation
/// - Optional parsing of `ip:port/protocol` member records

pub mod lookup;
pub mod records;
pub mod resolver;

pub use lookup::{DnsTxtLookup, TxtLookup};
pub use records::{parse_member_record, parse_member_records};
pub use resolver::{DiscoveryResolver, MemberFailure, PullReport};

/// DNS lookup errors
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("TXT lookup for {name} failed: {reason}")]
    Resolve { name: String, reason: String },

    #[error("TXT lookup for {name} timed out")]
    Timeout { name: String },

    #[error("Failed to initialise DNS resolver: {0}")]
    Resolver(String),
}
