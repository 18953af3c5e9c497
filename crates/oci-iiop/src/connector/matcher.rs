// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Profile selection for a connector.
//!
//! A connector may only be reused for profiles that point at its own
//! endpoint *and* were issued under the same transport security context as
//! the object reference it was created for. The security context check is
//! all-or-nothing: a single candidate with a different security mechanism
//! list empties the whole result.

use crate::ior::{Ior, Profile, TAG_INTERNET_IOP};
use crate::policy::{policies_accept, Policy};

/// Security mechanism list of the first IIOP profile in `ior` (empty if none).
pub fn extract_security_context(ior: &Ior) -> Vec<u8> {
    ior.first_iiop_profile()
        .map(|p| p.security_context().to_vec())
        .unwrap_or_default()
}

/// Filters object reference profiles down to those a connector may serve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileMatcher {
    plugin_id: &'static str,
    host: String,
    port: u16,
    security_context: Vec<u8>,
}

impl ProfileMatcher {
    /// Matcher for `host:port`, bound to the security context of `target`.
    pub fn new(plugin_id: &'static str, host: &str, port: u16, target: &Ior) -> Self {
        Self {
            plugin_id,
            host: host.to_string(),
            port,
            security_context: extract_security_context(target),
        }
    }

    /// Security context extracted from the target reference.
    pub fn security_context(&self) -> &[u8] {
        &self.security_context
    }

    /// IIOP profiles of `ior` for this endpoint, duplicates removed.
    ///
    /// Host names are compared literally; no resolution happens here.
    pub fn candidate_profiles(&self, ior: &Ior) -> Vec<Profile> {
        let mut candidates: Vec<Profile> = Vec::new();
        for profile in ior.profiles_with_tag(TAG_INTERNET_IOP) {
            if profile.host != self.host || profile.port != self.port {
                continue;
            }
            if !candidates.contains(profile) {
                candidates.push(profile.clone());
            }
        }
        candidates
    }

    /// Profiles of `ior` usable under `policies`, or empty.
    pub fn select_usable_profiles(&self, ior: &Ior, policies: &[Policy]) -> Vec<Profile> {
        if !policies_accept(policies, self.plugin_id) {
            log::debug!(
                "protocol policy excludes plugin '{}', no usable profiles",
                self.plugin_id
            );
            return Vec::new();
        }

        let candidates = self.candidate_profiles(ior);
        if let Some(mismatch) = candidates
            .iter()
            .find(|p| p.security_context() != self.security_context.as_slice())
        {
            log::debug!(
                "profile {}:{} carries a different security context, no usable profiles",
                mismatch.host,
                mismatch.port
            );
            return Vec::new();
        }

        candidates
    }
}
