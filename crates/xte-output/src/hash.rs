use md5::{Digest, Md5};

/// Hex MD5 digest, as carried by the document epilogue.
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}
