//! Cloudinary request signing
//! https://cloudinary.com/documentation/authentication_signatures

use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

/// Collects the parameters that take part in a signature
#[derive(Debug, Default, Clone)]
pub struct Signer {
    params: BTreeMap<String, String>,
}

impl Signer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter; empty values are left out of the signature
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.params.insert(key.into(), value);
        }
        self
    }

    /// `k1=v1&k2=v2` with keys in alphabetical order
    fn get_string_to_sign(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<String>>()
            .join("&")
    }

    /// Lowercase hex SHA-1 of the sorted parameters followed by the API secret
    pub fn get_signature(&self, api_secret: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.get_string_to_sign().as_bytes());
        hasher.update(api_secret.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|x| format!("{:02x}", x))
            .collect::<Vec<String>>()
            .join("")
    }

    /// Signed parameters, for sending alongside the signature
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}
