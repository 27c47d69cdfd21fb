//! Verification helpers for testing configuration managers
//!
//! Provides assertion helpers over the requests a manager sent to the
//! endpoint.

use ontap_cfgmgr_common::ZapiElement;
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected API '{api}' to be invoked, invoked: {invoked:?}")]
    ApiNotInvoked { api: String, invoked: Vec<String> },

    #[error("API '{api}' was invoked {count} time(s), expected none")]
    UnexpectedInvocation { api: String, count: usize },

    #[error("Expected element '{path}' in '{api}' request")]
    ElementNotFound { api: String, path: String },

    #[error("Payload mismatch for {api}/{path}: expected {expected:?}, got {actual:?}")]
    PayloadMismatch {
        api: String,
        path: String,
        expected: Vec<(String, String)>,
        actual: Vec<(String, String)>,
    },

    #[error("Expected {expected} invocations, found {actual}")]
    InvocationCountMismatch { expected: usize, actual: usize },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Invocation verifier
pub struct InvocationVerifier {
    invocations: Vec<ZapiElement>,
}

impl InvocationVerifier {
    /// Create a new invocation verifier
    pub fn new(invocations: Vec<ZapiElement>) -> Self {
        Self { invocations }
    }

    fn invoked_apis(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    fn count(&self, api: &str) -> usize {
        self.invocations.iter().filter(|r| r.name() == api).count()
    }

    /// Verify that an API was invoked at least once
    pub fn assert_api_invoked(&self, api: &str) -> VerifyResult<()> {
        if self.count(api) > 0 {
            Ok(())
        } else {
            Err(VerificationError::ApiNotInvoked {
                api: api.to_string(),
                invoked: self.invoked_apis(),
            })
        }
    }

    /// Verify that an API was NOT invoked
    pub fn assert_api_not_invoked(&self, api: &str) -> VerifyResult<()> {
        match self.count(api) {
            0 => Ok(()),
            count => Err(VerificationError::UnexpectedInvocation {
                api: api.to_string(),
                count,
            }),
        }
    }

    /// Verify the number of invocations
    pub fn assert_invocation_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.invocations.len();
        if actual != expected {
            Err(VerificationError::InvocationCountMismatch { expected, actual })
        } else {
            Ok(())
        }
    }

    /// Verify the exact text children (names, values and order) of the
    /// element at `path` inside the first `api` request
    pub fn assert_payload(
        &self,
        api: &str,
        path: &[&str],
        expected: &[(&str, &str)],
    ) -> VerifyResult<()> {
        let joined = path.join("/");
        let request = self
            .invocations
            .iter()
            .find(|r| r.name() == api)
            .ok_or_else(|| VerificationError::ApiNotInvoked {
                api: api.to_string(),
                invoked: self.invoked_apis(),
            })?;

        let elem = request
            .child_path(path)
            .ok_or_else(|| VerificationError::ElementNotFound {
                api: api.to_string(),
                path: joined.clone(),
            })?;

        let actual: Vec<(String, String)> = elem
            .children()
            .iter()
            .map(|c| (c.name().to_string(), c.content().to_string()))
            .collect();
        let expected: Vec<(String, String)> = expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        if actual == expected {
            Ok(())
        } else {
            Err(VerificationError::PayloadMismatch {
                api: api.to_string(),
                path: joined,
                expected,
                actual,
            })
        }
    }

    /// Get all captured requests
    pub fn invocations(&self) -> &[ZapiElement] {
        &self.invocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> ZapiElement {
        let mut info = ZapiElement::new("vlan-info");
        info.add_new_child("parent-interface", "e0a");
        info.add_new_child("vlanid", "13");
        let mut request = ZapiElement::new("net-vlan-create");
        request.add_child_elem(info);
        request
    }

    #[test]
    fn test_invocation_verifier() {
        let mut get = ZapiElement::new("net-vlan-get");
        get.add_new_child("interface-name", "e0a-13");

        let verifier = InvocationVerifier::new(vec![get, create_request()]);

        assert!(verifier.assert_api_invoked("net-vlan-get").is_ok());
        assert!(verifier.assert_api_invoked("net-vlan-create").is_ok());
        assert!(verifier.assert_api_not_invoked("net-vlan-delete").is_ok());
        assert!(verifier.assert_invocation_count(2).is_ok());

        assert!(verifier.assert_invocation_count(3).is_err());
        assert!(verifier.assert_api_invoked("net-vlan-delete").is_err());
        assert!(verifier.assert_api_not_invoked("net-vlan-get").is_err());
    }

    #[test]
    fn test_assert_payload() {
        let verifier = InvocationVerifier::new(vec![create_request()]);

        assert!(verifier
            .assert_payload(
                "net-vlan-create",
                &["vlan-info"],
                &[("parent-interface", "e0a"), ("vlanid", "13")]
            )
            .is_ok());

        // order matters
        assert!(verifier
            .assert_payload(
                "net-vlan-create",
                &["vlan-info"],
                &[("vlanid", "13"), ("parent-interface", "e0a")]
            )
            .is_err());

        assert!(matches!(
            verifier.assert_payload("net-vlan-create", &["missing"], &[]),
            Err(VerificationError::ElementNotFound { .. })
        ));
    }
}
