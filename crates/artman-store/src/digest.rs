use artman_schema::ManifestDigest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::{Digest, Md5};

/// Base64 (standard alphabet, padded) of the MD5 of `data`.
pub fn b64_md5(data: &[u8]) -> ManifestDigest {
    ManifestDigest::new(STANDARD.encode(Md5::digest(data)))
}
