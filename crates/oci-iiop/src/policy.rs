// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client-side policies consulted during profile selection.
//!
//! Only the protocol policy is interpreted by this layer; every other policy
//! is carried through to the connection helper untouched.

/// Policy type id of the protocol policy.
pub const PROTOCOL_POLICY_ID: u32 = 0x4f42_0001;

/// Ordered list of transport plugin ids a client is willing to use.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProtocolPolicy {
    pub plugin_ids: Vec<String>,
}

impl ProtocolPolicy {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            plugin_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the policy accepts the given plugin id.
    pub fn contains(&self, plugin_id: &str) -> bool {
        self.plugin_ids.iter().any(|id| id == plugin_id)
    }
}

/// A typed constraint attached to an invocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Restricts which transport plugins may be used
    Protocol(ProtocolPolicy),
    /// Any other policy, opaque to this layer
    Other { policy_type: u32, value: Vec<u8> },
}

impl Policy {
    pub fn policy_type(&self) -> u32 {
        match self {
            Policy::Protocol(_) => PROTOCOL_POLICY_ID,
            Policy::Other { policy_type, .. } => *policy_type,
        }
    }

    /// Narrow to a protocol policy.
    pub fn as_protocol(&self) -> Option<&ProtocolPolicy> {
        match self {
            Policy::Protocol(p) => Some(p),
            Policy::Other { .. } => None,
        }
    }
}

/// Whether every protocol policy in `policies` accepts `plugin_id`.
pub fn policies_accept(policies: &[Policy], plugin_id: &str) -> bool {
    policies
        .iter()
        .filter_map(Policy::as_protocol)
        .all(|p| p.contains(plugin_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_policy_contains() {
        let policy = ProtocolPolicy::new(["uiop", "iiop"]);
        assert!(policy.contains("iiop"));
        assert!(!policy.contains("shmiop"));
    }

    #[test]
    fn test_policies_accept() {
        let other = Policy::Other {
            policy_type: 42,
            value: vec![1],
        };
        assert!(policies_accept(&[], "iiop"));
        assert!(policies_accept(&[other.clone()], "iiop"));
        assert!(policies_accept(
            &[Policy::Protocol(ProtocolPolicy::new(["iiop"])), other],
            "iiop"
        ));
        assert!(!policies_accept(
            &[
                Policy::Protocol(ProtocolPolicy::new(["iiop"])),
                Policy::Protocol(ProtocolPolicy::new(["uiop"])),
            ],
            "iiop"
        ));
    }

    #[test]
    fn test_policy_type() {
        assert_eq!(
            Policy::Protocol(ProtocolPolicy::default()).policy_type(),
            PROTOCOL_POLICY_ID
        );
        assert_eq!(
            Policy::Other {
                policy_type: 7,
                value: Vec::new()
            }
            .policy_type(),
            7
        );
    }
}
