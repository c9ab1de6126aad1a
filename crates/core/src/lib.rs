pub mod announce;
pub mod beacon;
pub mod collector;
pub mod discovery;
mod error;
pub mod identity;
pub mod state;

pub use beacon::{Beacon, BeaconStats};

pub use identity::{
    verify_room_signature, Identity, IdentitySource, KeyPair, KeyPairError, PublicKey,
    RoomIdentity, RoomName,
};

pub use state::{NodeState, PeerNode, SelfNode};

// Re-export announce types
pub use announce::{AnnounceError, RegistrationPayload, RegistryClient};

// Re-export discovery types
pub use discovery::{DiscoveryResolver, LookupError, PullReport, TxtLookup};

// Re-export collector types
pub use collector::{AddressCollector, CollectError, CollectReport, CollectStep};
