//! Pre-scan of an inbound attribute bag.
//!
//! Reserved names are aliased to the kind's real fields and every path is
//! grouped by its first segment before any resource is assembled. Builders
//! then read leaves and nested groups from the scan and construct the target
//! value in one expression, bottom-up.

use crate::error::{ValidationError, ValidationResult};
use crate::resource::{AttributeBag, AttributePath, AttributeValue, ResourceKind};
use std::collections::BTreeMap;

type Entries<'a> = Vec<(Option<&'a str>, &'a [AttributeValue])>;

/// Attribute bag grouped by first path segment.
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    prefix: Option<String>,
    roots: BTreeMap<&'a str, Entries<'a>>,
}

impl<'a> Scan<'a> {
    /// Scan a bag for the given kind, aliasing reserved names first.
    pub fn new(kind: ResourceKind, bag: &'a AttributeBag) -> Self {
        let bundle = kind.bundle();
        Self::group(None, bag.iter().map(|(path, values)| (bundle.field(path), values)))
    }

    fn group<I>(prefix: Option<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [AttributeValue])>,
    {
        let mut roots: BTreeMap<&'a str, Entries<'a>> = BTreeMap::new();
        for (path, values) in entries {
            let (root, rest) = AttributePath::split_first(path);
            roots.entry(root).or_default().push((rest, values));
        }
        Self { prefix, roots }
    }

    /// Names of the first path segments present.
    pub fn fields(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.roots.keys().copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.roots.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Values stored directly under `field`.
    pub fn values(&self, field: &str) -> &'a [AttributeValue] {
        self.roots
            .get(field)
            .and_then(|entries| entries.iter().find(|(rest, _)| rest.is_none()))
            .map(|(_, values)| *values)
            .unwrap_or_default()
    }

    /// Nested attributes below `field`, or `None` when there are none.
    pub fn nested(&self, field: &str) -> Option<Scan<'a>> {
        let children: Vec<_> = self
            .roots
            .get(field)?
            .iter()
            .filter_map(|(rest, values)| rest.map(|rest| (rest, *values)))
            .collect();
        if children.is_empty() {
            return None;
        }
        Some(Self::group(Some(self.path(field)), children))
    }

    /// One scan per element of a multi-valued complex field. Embedded objects
    /// are scanned as they are; a plain value stands for the element's `value`.
    pub fn elements(&self, field: &str) -> Vec<Scan<'a>> {
        let prefix = self.path(field);
        self.values(field)
            .iter()
            .map(|value| match value {
                AttributeValue::Embedded(object) => {
                    Self::group(Some(prefix.clone()), object.attributes.iter())
                }
                plain => Self::group(Some(prefix.clone()), [("value", std::slice::from_ref(plain))]),
            })
            .collect()
    }

    /// Full path of a field, for error reporting.
    pub fn path(&self, field: &str) -> String {
        AttributePath::join(self.prefix.as_deref(), field)
    }

    /// First value as a string.
    pub fn string(&self, field: &str) -> ValidationResult<Option<String>> {
        self.values(field)
            .first()
            .map(|value| self.coerce_string(field, value))
            .transpose()
    }

    /// Every value as a string.
    pub fn strings(&self, field: &str) -> ValidationResult<Vec<String>> {
        self.values(field)
            .iter()
            .map(|value| self.coerce_string(field, value))
            .collect()
    }

    /// First value as a boolean; accepts `true`/`false`/`1`/`0` text.
    pub fn boolean(&self, field: &str) -> ValidationResult<Option<bool>> {
        self.values(field)
            .first()
            .map(|value| self.coerce_boolean(field, value))
            .transpose()
    }

    /// Every value as a boolean.
    pub fn booleans(&self, field: &str) -> ValidationResult<Vec<bool>> {
        self.values(field)
            .iter()
            .map(|value| self.coerce_boolean(field, value))
            .collect()
    }

    /// Clear text of a credential; plain strings are accepted as well.
    pub fn secret(&self, field: &str) -> ValidationResult<Option<String>> {
        match self.values(field).first() {
            Some(AttributeValue::Credential(secret)) => Ok(Some(secret.reveal().to_string())),
            Some(value) => self.coerce_string(field, value).map(Some),
            None => Ok(None),
        }
    }

    fn coerce_string(&self, field: &str, value: &AttributeValue) -> ValidationResult<String> {
        match value {
            AttributeValue::Credential(secret) => Ok(secret.reveal().to_string()),
            other => other.to_text().ok_or_else(|| self.invalid(field, value, "string")),
        }
    }

    fn coerce_boolean(&self, field: &str, value: &AttributeValue) -> ValidationResult<bool> {
        match value {
            AttributeValue::Boolean(flag) => Ok(*flag),
            AttributeValue::Integer(1) => Ok(true),
            AttributeValue::Integer(0) => Ok(false),
            AttributeValue::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(self.invalid(field, value, "boolean")),
            },
            _ => Err(self.invalid(field, value, "boolean")),
        }
    }

    fn invalid(&self, field: &str, value: &AttributeValue, expected: &'static str) -> ValidationError {
        let shown = match value {
            AttributeValue::Credential(_) => "****".to_string(),
            AttributeValue::Embedded(object) => format!("<{}>", object.object_class),
            other => other.to_text().unwrap_or_default(),
        };
        ValidationError::InvalidValue {
            attribute: self.path(field),
            value: shown,
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{GuardedString, NAME, PASSWORD};

    #[test]
    fn test_groups_by_prefix_and_aliases() {
        let bag = AttributeBag::new()
            .with(NAME, "bjensen")
            .with("name.familyName", "Jensen")
            .with("name.givenName", "Barbara")
            .with(PASSWORD, GuardedString::new("pw"));
        let scan = Scan::new(ResourceKind::Account, &bag);

        assert_eq!(scan.string("userName").unwrap().as_deref(), Some("bjensen"));
        assert_eq!(scan.secret("password").unwrap().as_deref(), Some("pw"));
        assert!(scan.values("name").is_empty());

        let name = scan.nested("name").unwrap();
        assert_eq!(name.string("familyName").unwrap().as_deref(), Some("Jensen"));
        assert_eq!(name.path("givenName"), "name.givenName");
        assert!(scan.nested("userName").is_none());
    }

    #[test]
    fn test_boolean_coercion() {
        let bag = AttributeBag::new()
            .with("a", "1")
            .with("b", "FALSE")
            .with("c", true)
            .with("d", "maybe");
        let scan = Scan::new(ResourceKind::Account, &bag);

        assert_eq!(scan.boolean("a").unwrap(), Some(true));
        assert_eq!(scan.boolean("b").unwrap(), Some(false));
        assert_eq!(scan.boolean("c").unwrap(), Some(true));
        assert_eq!(scan.boolean("missing").unwrap(), None);
        assert_eq!(
            scan.boolean("d"),
            Err(ValidationError::InvalidValue {
                attribute: "d".into(),
                value: "maybe".into(),
                expected: "boolean",
            })
        );
    }

    #[test]
    fn test_string_coercion_of_scalars() {
        let bag = AttributeBag::new().with("count", 42_i64).with("flag", false);
        let scan = Scan::new(ResourceKind::Tenant, &bag);
        assert_eq!(scan.string("count").unwrap().as_deref(), Some("42"));
        assert_eq!(scan.strings("flag").unwrap(), vec!["false".to_string()]);
    }
}
