use serde::{Deserialize, Serialize};

/// The identity a request claims (at issuance) or proves (through a credential).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Principal {
    pub email: String,
}

impl Principal {
    pub fn new(email: impl Into<String>) -> Self { Self { email: email.into() } }

    pub fn email(&self) -> &str { &self.email }
}
