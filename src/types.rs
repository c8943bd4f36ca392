use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Host identity attached to every line and diagnostic.
///
/// Cheap to clone; one allocation per pipeline rather than per line.
pub type HostName = Arc<str>;

/// Private key reference used for public-key authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub path: PathBuf,
    pub passphrase: Option<String>,
}

/// How a host is authenticated.
///
/// When both are present the key is offered first and the password is the
/// fallback.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub private_key: Option<PrivateKey>,
    pub password: Option<String>,
}

impl Credential {
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            private_key: None,
            password: Some(password.into()),
        }
    }

    pub fn private_key(path: impl Into<PathBuf>) -> Self {
        Self {
            private_key: Some(PrivateKey {
                path: path.into(),
                passphrase: None,
            }),
            password: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.private_key.is_none() && self.password.is_none()
    }
}

// Secrets never reach logs or dry-run output.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("path", &self.path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("private_key", &self.private_key)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let mut cred = Credential::password("hunter2");
        cred.private_key = Some(PrivateKey {
            path: PathBuf::from("/home/ops/.ssh/id_ed25519"),
            passphrase: Some("s3cret".to_string()),
        });

        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("id_ed25519"));
    }
}
