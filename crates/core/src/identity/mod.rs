mod identity;
mod keypair;
mod room;

pub use identity::{Identity, IdentitySource};
pub use keypair::{KeyPair, KeyPairError, PublicKey};
pub use room::{
    sign_room_name, sign_room_name_pem, verify_room_signature, RoomIdentity, RoomName,
    RoomNameError, ROOM_NAME_LEN,
};
