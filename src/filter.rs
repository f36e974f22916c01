//! Translation of framework filters into provider query strings.
//!
//! Only a single comparison is ever translated. Conjunctions, disjunctions
//! and operators without a token in the provider's [`Dialect`] degrade to
//! "no native filter": the provider returns everything and the framework
//! filters on its side.

use crate::resource::ResourceKind;
use crate::resource::platform::{STATUS_ACTIVE, STATUS_SUSPENDED};
use log::debug;

/// Comparison operators known to the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    In,
}

/// A single attribute comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub attribute: String,
    pub operator: Operator,
    pub value: String,
    pub negate: bool,
}

impl Comparison {
    pub fn new(
        attribute: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: value.into(),
            negate: false,
        }
    }

    pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(attribute, Operator::Eq, value)
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }
}

/// Filter expression handed down by the framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Comparison(Comparison),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl From<Comparison> for Filter {
    fn from(comparison: Comparison) -> Self {
        Self::Comparison(comparison)
    }
}

/// Query syntax of one provider.
#[derive(Debug)]
pub struct Dialect {
    /// Query parameter carrying the filter
    pub parameter: &'static str,
    /// Token placed between attribute and value, per operator
    pub tokens: &'static [(Operator, &'static str)],
    /// Fields the provider cannot filter on
    pub client_side: &'static [&'static str],
}

impl Dialect {
    pub fn token(&self, operator: Operator) -> Option<&'static str> {
        self.tokens
            .iter()
            .find(|(candidate, _)| *candidate == operator)
            .map(|(_, token)| *token)
    }
}

/// Query syntax of the user and group directory.
pub static DIRECTORY_DIALECT: Dialect = Dialect {
    parameter: "filter",
    tokens: &[(Operator::Eq, ":")],
    client_side: &[],
};

/// Query syntax of the platform API.
pub static PLATFORM_DIALECT: Dialect = Dialect {
    parameter: "q",
    tokens: &[(Operator::Eq, ":")],
    // the identifier is the envelope's metadata guid, not an entity field
    client_side: &["id"],
};

/// Builds native queries for one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct FilterTranslator {
    kind: ResourceKind,
}

impl FilterTranslator {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }

    /// Provider field behind a reserved pseudo-attribute name.
    pub fn field<'a>(&self, attribute: &'a str) -> &'a str {
        self.kind.bundle().field(attribute)
    }

    /// `[not (]name<token>value[)]`, or `None` when the dialect has no token
    /// for the operator or cannot filter on the field.
    pub fn translate(
        &self,
        attribute: &str,
        value: &str,
        operator: Operator,
        negate: bool,
    ) -> Option<String> {
        let dialect = self.kind.bundle().dialect;
        let token = dialect.token(operator)?;
        let field = self.field(attribute);
        if dialect.client_side.contains(&field) {
            return None;
        }
        let expression = format!("{}{}{}", field, token, self.value(field, value));
        Some(if negate {
            format!("not ({expression})")
        } else {
            expression
        })
    }

    /// Provider value for a field; the enabled flag of a tenant is its status name.
    fn value<'a>(&self, field: &str, value: &'a str) -> &'a str {
        if self.kind != ResourceKind::Tenant || field != "status" {
            return value;
        }
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => STATUS_ACTIVE,
            "false" | "0" => STATUS_SUSPENDED,
            _ => value,
        }
    }

    /// Native query for a filter, or `None` to let the provider return everything.
    pub fn native(&self, filter: &Filter) -> Option<String> {
        match filter {
            Filter::Comparison(comparison) => {
                let query = self.translate(
                    &comparison.attribute,
                    &comparison.value,
                    comparison.operator,
                    comparison.negate,
                );
                if query.is_none() {
                    debug!(
                        "Filter {:?} on '{}' has no native form for {}, filtering client side",
                        comparison.operator, comparison.attribute, self.kind
                    );
                }
                query
            }
            Filter::And(..) | Filter::Or(..) => {
                debug!("Composite filter for {} is evaluated client side", self.kind);
                None
            }
        }
    }

    /// Query parameter name carrying the native filter.
    pub fn parameter(&self) -> &'static str {
        self.kind.bundle().dialect.parameter
    }
}
