//! Well-known namespaces for name-based generation.

use serde::Serialize;

use crate::{normalize_uuid, Error, Result, Uuid};

/// A namespace identifier with a short name and a description.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Namespace {
    pub name: &'static str,
    pub uuid: Uuid,
    pub description: &'static str,
}

pub const DNS: Namespace = Namespace {
    name: "DNS",
    uuid: Uuid::from_u128(0x6ba7b810_9dad_11d1_80b4_00c04fd430c8),
    description: "Domain Name System namespace",
};

pub const URL: Namespace = Namespace {
    name: "URL",
    uuid: Uuid::from_u128(0x6ba7b811_9dad_11d1_80b4_00c04fd430c8),
    description: "Uniform Resource Locator namespace",
};

pub const OID: Namespace = Namespace {
    name: "OID",
    uuid: Uuid::from_u128(0x6ba7b812_9dad_11d1_80b4_00c04fd430c8),
    description: "Object Identifier namespace",
};

pub const X500: Namespace = Namespace {
    name: "X500",
    uuid: Uuid::from_u128(0x6ba7b814_9dad_11d1_80b4_00c04fd430c8),
    description: "X.500 Distinguished Name namespace",
};

/// The four namespaces defined for name-based generation.
pub const STANDARD: [Namespace; 4] = [DNS, URL, OID, X500];

/// Resolves a namespace given either by standard name (case-insensitive) or as an identifier in
/// any supported format.
pub fn resolve(namespace: &str) -> Result<Uuid> {
    let trimmed = namespace.trim();
    if let Some(e) = STANDARD
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(trimmed))
    {
        return Ok(e.uuid);
    }
    normalize_uuid(trimmed)
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("unknown namespace '{namespace}'")))
}

#[cfg(test)]
mod tests {
    use super::{resolve, DNS, STANDARD, URL};
    use crate::Error;

    /// Resolves standard names and identifiers alike
    #[test]
    fn resolves_standard_names_and_identifiers_alike() {
        assert_eq!(resolve("dns"), Ok(DNS.uuid));
        assert_eq!(resolve("URL"), Ok(URL.uuid));
        assert_eq!(
            resolve("{6BA7B810-9DAD-11D1-80B4-00C04FD430C8}"),
            Ok(DNS.uuid)
        );
        assert_eq!(
            resolve("urn:uuid:6ba7b811-9dad-11d1-80b4-00c04fd430c8"),
            Ok(URL.uuid)
        );
        assert!(matches!(resolve("example"), Err(Error::InvalidArgument(_))));
    }

    /// Spells standard namespaces as published
    #[test]
    fn spells_standard_namespaces_as_published() {
        let texts: Vec<String> = STANDARD.iter().map(|e| e.uuid.to_string()).collect();
        assert_eq!(
            texts,
            [
                "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
                "6ba7b811-9dad-11d1-80b4-00c04fd430c8",
                "6ba7b812-9dad-11d1-80b4-00c04fd430c8",
                "6ba7b814-9dad-11d1-80b4-00c04fd430c8",
            ]
        );
    }
}
