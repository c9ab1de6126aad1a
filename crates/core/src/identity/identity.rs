use super::{KeyPair, KeyPairError, PublicKey, RoomIdentity, RoomName};
use std::fmt;

/// Where a node's keypair comes from, decided once at construction
#[derive(Debug, Clone)]
pub enum IdentitySource {
    /// Generate a fresh keypair
    Generated,

    /// Use a keypair supplied by the caller
    Provided(KeyPair),
}

impl IdentitySource {
    /// Source for an optional PEM private key from configuration
    pub fn from_private_pem(pem: Option<&str>) -> Result<Self, KeyPairError> {
        match pem {
            Some(pem) => Ok(Self::Provided(KeyPair::from_private_pem(pem)?)),
            None => Ok(Self::Generated),
        }
    }
}

/// Complete identity for a node
///
/// Holds the keypair and the signed room identity derived from it.
#[derive(Clone)]
pub struct Identity {
    keypair: KeyPair,
    room: RoomIdentity,
}

impl Identity {
    pub fn from_source(source: IdentitySource) -> Result<Self, KeyPairError> {
        let keypair = match source {
            IdentitySource::Generated => KeyPair::generate()?,
            IdentitySource::Provided(keypair) => keypair,
        };
        Self::from_keypair(keypair)
    }

    /// Generate a new random identity
    pub fn generate() -> Result<Self, KeyPairError> {
        Self::from_source(IdentitySource::Generated)
    }

    /// Create an identity from an existing keypair
    pub fn from_keypair(keypair: KeyPair) -> Result<Self, KeyPairError> {
        let room = RoomIdentity::from_keypair(&keypair)?;
        Ok(Self { keypair, room })
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn room_name(&self) -> &RoomName {
        &self.room.name
    }

    pub fn room_identity(&self) -> &RoomIdentity {
        &self.room
    }

    /// Export the private key (use carefully!)
    pub fn private_key_pem(&self) -> Result<String, KeyPairError> {
        self.keypair.to_private_pem()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("room", &self.room.name)
            .field("public_key", &self.public_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_generation() {
        let identity = Identity::generate().unwrap();
        assert!(identity.room_identity().verify().unwrap());
        assert!(identity.room_name().matches_public_key(&identity.public_key()));
    }

    #[test]
    fn test_provided_identity_keeps_keypair() {
        let keypair = KeyPair::from_secret_bytes(&[3u8; 32]);
        let identity = Identity::from_source(IdentitySource::Provided(keypair.clone())).unwrap();

        assert_eq!(identity.keypair().public_bytes(), keypair.public_bytes());
        assert_eq!(
            identity.room_name(),
            &RoomName::from_public_key(&keypair.public_key())
        );
    }

    #[test]
    fn test_source_from_config() {
        assert!(matches!(
            IdentitySource::from_private_pem(None).unwrap(),
            IdentitySource::Generated
        ));

        let pem = KeyPair::from_secret_bytes(&[5u8; 32]).to_private_pem().unwrap();
        let source = IdentitySource::from_private_pem(Some(&pem)).unwrap();
        let identity = Identity::from_source(source).unwrap();
        assert_eq!(identity.private_key_pem().unwrap(), pem);

        assert!(IdentitySource::from_private_pem(Some("broken")).is_err());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let identity = Identity::generate().unwrap();
        let pem = identity.private_key_pem().unwrap();
        assert!(!format!("{:?}", identity).contains(&pem));
    }
}
