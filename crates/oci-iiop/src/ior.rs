// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object references, transport profiles and tagged components.
//!
//! Only the decoded form is modelled here; the stringified/CDR encoding of an
//! IOR is owned by the marshalling layer.

/// Profile tag for IIOP (Internet Inter-ORB Protocol) profiles.
pub const TAG_INTERNET_IOP: u32 = 0;

/// Profile tag for multiple-components profiles.
pub const TAG_MULTIPLE_COMPONENTS: u32 = 1;

/// Component tag carrying the CSIv2 security mechanism list.
pub const TAG_CSI_SEC_MECH_LIST: u32 = 33;

/// A (tag, opaque payload) pair attached to a profile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaggedComponent {
    pub tag: u32,
    pub data: Vec<u8>,
}

impl TaggedComponent {
    pub fn new(tag: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            data: data.into(),
        }
    }
}

/// One transport endpoint inside an object reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Profile {
    /// Profile tag (`TAG_INTERNET_IOP` for IIOP endpoints)
    pub tag: u32,
    pub host: String,
    pub port: u16,
    pub object_key: Vec<u8>,
    pub components: Vec<TaggedComponent>,
}

impl Profile {
    /// IIOP profile with no components.
    pub fn iiop(host: impl Into<String>, port: u16, object_key: impl Into<Vec<u8>>) -> Self {
        Self {
            tag: TAG_INTERNET_IOP,
            host: host.into(),
            port,
            object_key: object_key.into(),
            components: Vec::new(),
        }
    }

    /// Builder: append a tagged component
    pub fn with_component(mut self, component: TaggedComponent) -> Self {
        self.components.push(component);
        self
    }

    /// Payload of the first component with `tag`.
    pub fn component(&self, tag: u32) -> Option<&[u8]> {
        self.components
            .iter()
            .find(|c| c.tag == tag)
            .map(|c| c.data.as_slice())
    }

    /// Security mechanism list payload (empty if the profile has none).
    pub fn security_context(&self) -> &[u8] {
        self.component(TAG_CSI_SEC_MECH_LIST).unwrap_or(&[])
    }
}

/// Interoperable object reference. Immutable once received.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Ior {
    pub type_id: String,
    pub profiles: Vec<Profile>,
}

impl Ior {
    pub fn new(type_id: impl Into<String>, profiles: Vec<Profile>) -> Self {
        Self {
            type_id: type_id.into(),
            profiles,
        }
    }

    /// Iterate over profiles carrying `tag`.
    pub fn profiles_with_tag(&self, tag: u32) -> impl Iterator<Item = &Profile> {
        self.profiles.iter().filter(move |p| p.tag == tag)
    }

    /// First IIOP profile, if any.
    pub fn first_iiop_profile(&self) -> Option<&Profile> {
        self.profiles_with_tag(TAG_INTERNET_IOP).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_lookup() {
        let profile = Profile::iiop("host", 2809, b"key".to_vec())
            .with_component(TaggedComponent::new(5, vec![1]))
            .with_component(TaggedComponent::new(TAG_CSI_SEC_MECH_LIST, vec![9, 9]))
            .with_component(TaggedComponent::new(TAG_CSI_SEC_MECH_LIST, vec![7]));

        assert_eq!(profile.component(5), Some(&[1u8][..]));
        assert_eq!(profile.component(6), None);
        // First match wins
        assert_eq!(profile.security_context(), &[9, 9]);
    }

    #[test]
    fn test_missing_security_context_is_empty() {
        let profile = Profile::iiop("host", 1, Vec::new());
        assert!(profile.security_context().is_empty());
    }

    #[test]
    fn test_first_iiop_profile_skips_other_tags() {
        let mut other = Profile::iiop("other", 1, Vec::new());
        other.tag = TAG_MULTIPLE_COMPONENTS;
        let ior = Ior::new(
            "IDL:Echo:1.0",
            vec![other, Profile::iiop("target", 2, Vec::new())],
        );
        assert_eq!(ior.first_iiop_profile().unwrap().host, "target");
        assert_eq!(ior.profiles_with_tag(TAG_INTERNET_IOP).count(), 1);
    }
}
