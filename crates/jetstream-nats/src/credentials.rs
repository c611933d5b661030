use std::fmt;

use serde::Deserialize;

use crate::Error;

/// User credentials and server address, as stored by the credential
/// collaborator.
///
/// The JSON form is `{"jwt": "...", "seed_key": "...", "address": "..."}`.
#[derive(Clone, Deserialize, Eq, PartialEq)]
pub struct Credentials {
    /// User JWT.
    pub jwt: String,

    /// User NKEY seed.
    pub seed_key: String,

    /// Server address, e.g. `nats://nats.example.com:4222`.
    pub address: String,
}

impl Credentials {
    /// Decodes and validates credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] if the bytes are not valid JSON
    /// or a field is empty.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let credentials: Self =
            serde_json::from_slice(bytes).map_err(|e| Error::InvalidCredentials(e.to_string()))?;

        for (field, value) in [
            ("jwt", &credentials.jwt),
            ("seed_key", &credentials.seed_key),
            ("address", &credentials.address),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidCredentials(format!("{field} is empty")));
            }
        }

        Ok(credentials)
    }

    /// Renders the JWT and seed in `.creds` file format.
    #[must_use]
    pub fn to_creds(&self) -> String {
        format!(
            "-----BEGIN NATS USER JWT-----\n{}\n------END NATS USER JWT------\n\n\
             ************************* IMPORTANT *************************\n\
             NKEY Seed printed below can be used to sign and prove identity.\n\
             NKEYs are sensitive and should be treated as secrets.\n\n\
             -----BEGIN USER NKEY SEED-----\n{}\n------END USER NKEY SEED------\n\n\
             *************************************************************\n",
            self.jwt.trim(),
            self.seed_key.trim()
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("jwt", &"<redacted>")
            .field("seed_key", &"<redacted>")
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    const JSON: &str = r#"{
        "jwt": "eyJ0eXAiOiJKV1QiLCJhbGciOiJlZDI1NTE5LW5rZXkifQ.e30.c2ln",
        "seed_key": "SUAIBDPBAUTWCWBKIO6XHQNINK5FWJW4OHLXC3HQ2KFE4PEJUA44CNHTC4",
        "address": "nats://localhost:4222"
    }"#;

    #[test]
    fn test_from_slice() {
        let credentials = Credentials::from_slice(JSON.as_bytes()).unwrap();

        assert_eq!(credentials.address, "nats://localhost:4222");
        assert!(credentials.seed_key.starts_with("SU"));
    }

    #[test]
    fn test_missing_fields() {
        assert_matches!(
            Credentials::from_slice(br#"{"jwt": "a", "seed_key": "b"}"#),
            Err(Error::InvalidCredentials(_))
        );
        assert_matches!(
            Credentials::from_slice(br#"{"jwt": "a", "seed_key": " ", "address": "c"}"#),
            Err(Error::InvalidCredentials(msg)) if msg == "seed_key is empty"
        );
        assert_matches!(
            Credentials::from_slice(b"not json"),
            Err(Error::InvalidCredentials(_))
        );
    }

    #[test]
    fn test_creds_format() {
        let credentials = Credentials::from_slice(JSON.as_bytes()).unwrap();
        let creds = credentials.to_creds();

        assert!(creds.starts_with("-----BEGIN NATS USER JWT-----\neyJ0eXAi"));
        assert!(creds.contains("-----BEGIN USER NKEY SEED-----\nSUAIBDPB"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials::from_slice(JSON.as_bytes()).unwrap();
        let debug = format!("{credentials:?}");

        assert!(!debug.contains("SUAIBDPB"));
        assert!(debug.contains("nats://localhost:4222"));
    }
}
