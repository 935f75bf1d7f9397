//! Claims supplied by the identity provider for an authenticated request

use std::collections::HashMap;

use tenancy_shared::constants::{COMPANY_CLAIM, TENANT_CLAIM};

/// Named claims of an authenticated identity.
///
/// Only `tenant_id` and `company_id` are interpreted; everything else is carried opaquely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedClaims {
    values: HashMap<String, String>,
}

impl AuthenticatedClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.get(TENANT_CLAIM)
    }

    pub fn company_id(&self) -> Option<&str> {
        self.get(COMPANY_CLAIM)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AuthenticatedClaims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_claims_are_absent() {
        let claims = AuthenticatedClaims::new()
            .with("tenant_id", "acme")
            .with("company_id", "   ");

        assert_eq!(claims.tenant_id(), Some("acme"));
        assert_eq!(claims.company_id(), None);
    }
}
