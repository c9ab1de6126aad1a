/// Room names and room signatures
///
/// A room name is derived from a public key, so anyone holding
/// `(name, signature, public_key)` can check that the key owner
/// controls the room without asking a third party.

use super::{KeyPair, KeyPairError, PublicKey};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain separation tag for room derivation
const ROOM_DOMAIN: &[u8] = b"BEACON-ROOM-V1";

/// Length of an encoded room name (base32 of a 32-byte hash, unpadded)
pub const ROOM_NAME_LEN: usize = 52;

/// A DNS-label-safe room name
///
/// Format: lowercase base32 (`a-z`, `2-7`) of
/// `BLAKE3("BEACON-ROOM-V1" || public_key)`, 52 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    /// Derive the room name owned by a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(ROOM_DOMAIN);
        hasher.update(&public_key.as_bytes());
        let hash = hasher.finalize();

        Self(data_encoding::BASE32_NOPAD.encode(hash.as_bytes()).to_lowercase())
    }

    /// Parse and validate a room name
    pub fn parse(name: &str) -> Result<Self, RoomNameError> {
        let name = name.trim().to_lowercase();

        if name.len() != ROOM_NAME_LEN {
            return Err(RoomNameError::InvalidLength(name.len()));
        }

        if !name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b))
        {
            return Err(RoomNameError::InvalidCharacter);
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that this name is the one derived from `public_key`
    pub fn matches_public_key(&self, public_key: &PublicKey) -> bool {
        self == &Self::from_public_key(public_key)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomName {
    type Error = RoomNameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::parse(&name)
    }
}

impl From<RoomName> for String {
    fn from(name: RoomName) -> Self {
        name.0
    }
}

impl AsRef<str> for RoomName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Room name errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomNameError {
    #[error("Invalid room name length: {0} (expected 52)")]
    InvalidLength(usize),

    #[error("Room name contains characters outside the base32 alphabet")]
    InvalidCharacter,
}

/// The public half of a node identity, as announced to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomIdentity {
    pub name: RoomName,

    /// Base64 of the SPKI PEM public key
    pub public_key: String,

    /// Base64 of the Ed25519 signature over the room name
    pub signature: String,
}

impl RoomIdentity {
    /// Derive and sign the room identity of a keypair
    pub fn from_keypair(keypair: &KeyPair) -> Result<Self, KeyPairError> {
        let public_key = keypair.public_key();
        let name = RoomName::from_public_key(&public_key);
        let signature = sign_room_name(keypair, &name);

        Ok(Self {
            name,
            public_key: public_key.to_pem_base64()?,
            signature: BASE64.encode(signature),
        })
    }

    /// Check both the signature and that the name derives from the key
    pub fn verify(&self) -> Result<bool, KeyPairError> {
        let public_key = PublicKey::from_pem_base64(&self.public_key)?;
        if !self.name.matches_public_key(&public_key) {
            return Ok(false);
        }

        verify_room_signature(self.name.as_str(), &self.signature, &self.public_key)
    }
}

/// Sign a room name
pub fn sign_room_name(keypair: &KeyPair, name: &RoomName) -> [u8; 64] {
    keypair.sign(name.as_str().as_bytes())
}

/// Sign a room name with a PKCS#8 PEM private key
pub fn sign_room_name_pem(private_key_pem: &str, name: &RoomName) -> Result<[u8; 64], KeyPairError> {
    let keypair = KeyPair::from_private_pem(private_key_pem)?;
    Ok(sign_room_name(&keypair, name))
}

/// Verify a room signature from its wire encodings
///
/// Malformed base64, PEM or signature length is an error. A well formed
/// signature that does not match is `Ok(false)`.
pub fn verify_room_signature(
    name: &str,
    signature_base64: &str,
    public_key_base64: &str,
) -> Result<bool, KeyPairError> {
    let public_key = PublicKey::from_pem_base64(public_key_base64)?;

    let signature_bytes = BASE64
        .decode(signature_base64.trim())
        .map_err(|e| KeyPairError::Decode(format!("invalid signature base64: {}", e)))?;
    let signature: [u8; 64] = signature_bytes.as_slice().try_into().map_err(|_| {
        KeyPairError::Decode(format!(
            "invalid signature length: {} (expected 64)",
            signature_bytes.len()
        ))
    })?;

    Ok(public_key.verify(name.as_bytes(), &signature))
}
