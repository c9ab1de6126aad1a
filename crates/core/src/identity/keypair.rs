use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// An Ed25519 keypair owning a room identity
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a new random keypair from the OS entropy source
    pub fn generate() -> Result<Self, KeyPairError> {
        let mut secret_bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut secret_bytes)
            .map_err(|e| KeyPairError::KeyGeneration(e.to_string()))?;

        Ok(Self::from_secret_bytes(&secret_bytes))
    }

    /// Create a keypair from a secret key
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();

        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Load a keypair from a PKCS#8 PEM private key
    pub fn from_private_pem(pem: &str) -> Result<Self, KeyPairError> {
        let signing_key = SigningKey::from_pkcs8_pem(pem)
            .map_err(|e| KeyPairError::Signing(e.to_string()))?;
        let verifying_key = signing_key.verifying_key();

        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Export the private key as PKCS#8 PEM
    pub fn to_private_pem(&self) -> Result<String, KeyPairError> {
        let pem = self
            .signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyPairError::Encoding(e.to_string()))?;
        Ok(pem.to_string())
    }

    /// Get the secret key bytes
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Get the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            key: self.verifying_key,
        }
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify a signature on a message
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        self.public_key().verify(message, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_bytes()))
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// A public key for verifying room signatures
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key: VerifyingKey,
}

impl PublicKey {
    /// Create a public key from bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyPairError> {
        let key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| KeyPairError::Decode(format!("invalid public key: {}", e)))?;
        Ok(Self { key })
    }

    /// Get the public key bytes
    pub fn as_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// SPKI PEM encoding
    pub fn to_pem(&self) -> Result<String, KeyPairError> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyPairError::Encoding(e.to_string()))
    }

    pub fn from_pem(pem: &str) -> Result<Self, KeyPairError> {
        let key = VerifyingKey::from_public_key_pem(pem)
            .map_err(|e| KeyPairError::Decode(format!("invalid public key PEM: {}", e)))?;
        Ok(Self { key })
    }

    /// Base64 of the PEM text, as sent to the registry
    pub fn to_pem_base64(&self) -> Result<String, KeyPairError> {
        Ok(BASE64.encode(self.to_pem()?))
    }

    pub fn from_pem_base64(encoded: &str) -> Result<Self, KeyPairError> {
        let pem_bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| KeyPairError::Decode(format!("invalid public key base64: {}", e)))?;
        let pem = String::from_utf8(pem_bytes)
            .map_err(|_| KeyPairError::Decode("public key PEM is not UTF-8".to_string()))?;
        Self::from_pem(&pem)
    }

    /// Verify a signature on a message
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        self.key
            .verify(message, &Signature::from_bytes(signature))
            .is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.as_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}

/// Errors related to keypair operations
#[derive(Debug, thiserror::Error)]
pub enum KeyPairError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// Malformed base64, PEM or key material handed to verification
    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Key encoding failed: {0}")]
    Encoding(String),
}
