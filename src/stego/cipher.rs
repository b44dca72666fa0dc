//! Additive byte-wise key stream ("extended Vigenere" over 256 symbols).
//!
//! This is reversible obfuscation, not encryption: any known plaintext
//! fragment reveals the key bytes under it. Callers reject empty keys before
//! getting here.

pub fn encrypt(data: &[u8], key: &[u8]) -> Vec<u8> {
    apply(data, key, u8::wrapping_add)
}

pub fn decrypt(data: &[u8], key: &[u8]) -> Vec<u8> {
    apply(data, key, u8::wrapping_sub)
}

fn apply(data: &[u8], key: &[u8], op: fn(u8, u8) -> u8) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(&b, &k)| op(b, k))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encrypt_wraps_mod_256() {
        assert_eq!(encrypt(&[0xFF, 0x01, 0x10], &[0x02]), vec![0x01, 0x03, 0x12]);
        assert_eq!(decrypt(&[0x01, 0x03, 0x12], &[0x02]), vec![0xFF, 0x01, 0x10]);
    }

    #[test]
    fn test_key_repeats() {
        let out = encrypt(&[0, 0, 0, 0, 0], b"ab");
        assert_eq!(out, vec![b'a', b'b', b'a', b'b', b'a']);
    }

    #[test]
    fn test_known_plaintext_leaks_key() {
        // Why this is obfuscation only: ciphertext - plaintext = key
        let plain = b"Hello, Vigenere 123!";
        let key = b"mysecret";
        let cipher = encrypt(plain, key);
        let leaked: Vec<u8> = cipher.iter().zip(plain).map(|(c, p)| c.wrapping_sub(*p)).collect();
        assert_eq!(&leaked[..key.len()], key);
    }

    proptest! {
        #[test]
        fn prop_decrypt_inverts_encrypt(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            key in proptest::collection::vec(any::<u8>(), 1..32),
        ) {
            prop_assert_eq!(decrypt(&encrypt(&data, &key), &key), data);
        }
    }
}
