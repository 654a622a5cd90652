#![forbid(unsafe_code)]

//! AES-CBC payload encryption with a leading 16-byte IV and PKCS#7 padding.

use cbc::cipher::block_padding::Pkcs7;
use kista_core::{algorithm, Error};
use zeroize::Zeroizing;

/// AES block size; also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// AES in CBC mode for a fixed key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AesCbc {
    key_size: usize,
    uri: &'static str,
}

/// Create the cipher named by an `EncryptionMethod` URI.
pub fn from_uri(uri: &str) -> Result<AesCbc, Error> {
    match uri {
        algorithm::AES128_CBC => Ok(AesCbc {
            key_size: 16,
            uri: algorithm::AES128_CBC,
        }),
        algorithm::AES192_CBC => Ok(AesCbc {
            key_size: 24,
            uri: algorithm::AES192_CBC,
        }),
        algorithm::AES256_CBC => Ok(AesCbc {
            key_size: 32,
            uri: algorithm::AES256_CBC,
        }),
        _ => Err(Error::DecryptionFailure(format!(
            "unsupported block encryption algorithm: {uri}"
        ))),
    }
}

impl AesCbc {
    /// Pick the AES variant from the length of an unwrapped key.
    pub fn for_key(key: &[u8]) -> Result<Self, Error> {
        match key.len() {
            16 => from_uri(algorithm::AES128_CBC),
            24 => from_uri(algorithm::AES192_CBC),
            32 => from_uri(algorithm::AES256_CBC),
            n => Err(Error::DecryptionFailure(format!(
                "unwrapped key has {n} bytes, expected 16, 24 or 32"
            ))),
        }
    }

    pub fn uri(&self) -> &'static str {
        self.uri
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Encrypt `plaintext` under a fresh random IV, returning `IV || ciphertext`.
    pub fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::{BlockEncryptMut, KeyIvInit};
        use rand::RngCore;

        self.check_key(key)?;

        let mut iv = [0u8; BLOCK_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        // Room for one extra block of padding.
        let pt_len = plaintext.len();
        let mut buf = vec![0u8; pt_len + BLOCK_SIZE];
        buf[..pt_len].copy_from_slice(plaintext);

        macro_rules! do_encrypt {
            ($aes:ty) => {{
                let enc = cbc::Encryptor::<$aes>::new_from_slices(key, &iv)
                    .map_err(|e| Error::DecryptionFailure(format!("AES-CBC init: {e}")))?;
                enc.encrypt_padded_mut::<Pkcs7>(&mut buf, pt_len)
                    .map_err(|e| Error::DecryptionFailure(format!("AES-CBC encrypt: {e}")))?
                    .len()
            }};
        }

        let ct_len = match self.key_size {
            16 => do_encrypt!(aes::Aes128),
            24 => do_encrypt!(aes::Aes192),
            32 => do_encrypt!(aes::Aes256),
            _ => return Err(Error::DecryptionFailure("unsupported AES key size".into())),
        };
        buf.truncate(ct_len);

        let mut result = Vec::with_capacity(BLOCK_SIZE + buf.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&buf);
        Ok(result)
    }

    /// Decrypt `IV || ciphertext` and strip PKCS#7 padding.
    pub fn decrypt(&self, key: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        use cbc::cipher::{BlockDecryptMut, KeyIvInit};

        if data.len() < BLOCK_SIZE {
            return Err(Error::MalformedCiphertext(format!(
                "{} bytes is shorter than the {BLOCK_SIZE}-byte IV",
                data.len()
            )));
        }
        let (iv, ciphertext) = data.split_at(BLOCK_SIZE);
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(Error::MalformedCiphertext(format!(
                "cipher body of {} bytes is not a positive multiple of {BLOCK_SIZE}",
                ciphertext.len()
            )));
        }
        self.check_key(key)?;

        let mut buf = Zeroizing::new(ciphertext.to_vec());

        macro_rules! do_decrypt {
            ($aes:ty) => {{
                let dec = cbc::Decryptor::<$aes>::new_from_slices(key, iv)
                    .map_err(|e| Error::DecryptionFailure(format!("AES-CBC init: {e}")))?;
                dec.decrypt_padded_mut::<Pkcs7>(&mut buf)
                    .map_err(|_| Error::DecryptionFailure("invalid PKCS#7 padding".into()))?
                    .len()
            }};
        }

        let len = match self.key_size {
            16 => do_decrypt!(aes::Aes128),
            24 => do_decrypt!(aes::Aes192),
            32 => do_decrypt!(aes::Aes256),
            _ => return Err(Error::DecryptionFailure("unsupported AES key size".into())),
        };
        buf.truncate(len);
        Ok(buf)
    }

    /// Decrypt a base64 `CipherValue` payload to UTF-8 text.
    pub fn decrypt_payload(&self, key: &[u8], cipher_value: &str) -> Result<String, Error> {
        let data = crate::cipher_value::decode(cipher_value)?;
        let plaintext = self.decrypt(key, &data)?;
        String::from_utf8(plaintext.to_vec())
            .map_err(|e| Error::DecryptionFailure(format!("plaintext is not valid UTF-8: {e}")))
    }

    fn check_key(&self, key: &[u8]) -> Result<(), Error> {
        if key.len() != self.key_size {
            return Err(Error::DecryptionFailure(format!(
                "expected {} byte key, got {}",
                self.key_size,
                key.len()
            )));
        }
        Ok(())
    }
}
