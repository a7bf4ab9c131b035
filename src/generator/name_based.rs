use md5::Md5;
use sha1::{Digest, Sha1};

use crate::Uuid;

/// Generates a UUIDv3 from the MD5 hash of `namespace` bytes followed by `name`.
pub fn hash_v3(namespace: &Uuid, name: &[u8]) -> Uuid {
    finish::<Md5>(namespace, name, 3)
}

/// Generates a UUIDv5 from the SHA-1 hash of `namespace` bytes followed by `name`.
pub fn hash_v5(namespace: &Uuid, name: &[u8]) -> Uuid {
    finish::<Sha1>(namespace, name, 5)
}

fn finish<D: Digest>(namespace: &Uuid, name: &[u8], version: u8) -> Uuid {
    let mut hasher = D::new();
    hasher.update(namespace.as_bytes());
    hasher.update(name);
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::with_version_bits(bytes, version)
}
