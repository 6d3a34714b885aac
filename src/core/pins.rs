//! Version pin model
//!
//! A [`VersionConstraintSet`] is the fixed set of `package==version` pairs
//! that must hold after provisioning, regardless of what any transitive
//! resolver chose along the way.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Grammar for a pin spec: `name==exact.version`
fn pin_spec_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*==\S+$").expect("valid pin regex")
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PinError {
    #[error("invalid pin spec '{0}' (expected package==version)")]
    InvalidSpec(String),

    #[error("package '{0}' is pinned more than once")]
    DuplicatePackage(String),
}

/// One exact version pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPin {
    pub package: String,
    pub version: String,
}

impl VersionPin {
    /// Render back to installer syntax
    pub fn as_spec(&self) -> String {
        format!("{}=={}", self.package, self.version)
    }
}

/// Ordered, read-only set of exact version constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionConstraintSet {
    pins: Vec<VersionPin>,
}

impl VersionConstraintSet {
    /// Build from `package==version` specs, preserving order
    pub fn from_specs<I, S>(specs: I) -> Result<Self, PinError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pins: Vec<VersionPin> = Vec::new();
        for spec in specs {
            let spec = spec.as_ref().trim();
            if !pin_spec_re().is_match(spec) {
                return Err(PinError::InvalidSpec(spec.to_string()));
            }
            let (package, version) = spec
                .split_once("==")
                .expect("regex guarantees a == separator");
            if pins
                .iter()
                .any(|p| p.package.eq_ignore_ascii_case(package))
            {
                return Err(PinError::DuplicatePackage(package.to_string()));
            }
            pins.push(VersionPin {
                package: package.to_string(),
                version: version.to_string(),
            });
        }
        Ok(Self { pins })
    }

    pub fn pins(&self) -> &[VersionPin] {
        &self.pins
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.pins.iter().map(|p| p.package.as_str())
    }

    pub fn as_specs(&self) -> Vec<String> {
        self.pins.iter().map(VersionPin::as_spec).collect()
    }

    /// Pinned version of a package, compared case-insensitively
    pub fn version_of(&self, package: &str) -> Option<&str> {
        self.pins
            .iter()
            .find(|p| p.package.eq_ignore_ascii_case(package))
            .map(|p| p.version.as_str())
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}
