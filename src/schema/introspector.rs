//! Builds the flattened attribute catalog from provider schema resources.

use super::catalog::{AttributeInfo, Catalog, ObjectClassInfo, ValueType};
use super::embedded::builtin_schemas;
use super::types::{AttributeDefinition, AttributeType, Mutability, Returned, SchemaResource};
use crate::error::ConnectorResult;
use crate::resource::{AttributePath, NAME, ResourceKind};
use log::{debug, warn};

/// Reference attributes every account carries in addition to its schema.
const ACCOUNT_REFERENCES: [ResourceKind; 3] =
    [ResourceKind::Group, ResourceKind::Tenant, ResourceKind::Space];

/// Turns provider schema resources into a [`Catalog`].
///
/// For each top-level definition:
/// - a multi-valued complex attribute becomes an embedded object class named
///   `<object class>.<attribute>` plus a reference attribute on the parent;
/// - a single-valued complex attribute is flattened onto the parent as
///   `<attribute>.<sub-attribute>`;
/// - anything else maps to one primitive attribute.
///
/// Schemas contributing to the same kind are unioned; on collision the later
/// schema wins.
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Catalog of the schemas shipped with the connector.
    pub fn builtin() -> ConnectorResult<Catalog> {
        let schemas = builtin_schemas()
            .into_iter()
            .map(SchemaResource::from_json)
            .collect::<ConnectorResult<Vec<_>>>()?;
        Ok(Self::build(&schemas))
    }

    /// Build and merge the catalogs of the given schemas, in order.
    pub fn build<'a, I>(schemas: I) -> Catalog
    where
        I: IntoIterator<Item = &'a SchemaResource>,
    {
        let mut catalog = Catalog::new();
        for schema in schemas {
            catalog.extend(Self::introspect(schema));
        }
        catalog
    }

    /// Catalog contribution of a single schema resource.
    pub fn introspect(schema: &SchemaResource) -> Catalog {
        let mut catalog = Catalog::new();
        let Some(kind) = schema.resource_kind() else {
            warn!(
                "Schema '{}' ({}) does not map to a resource kind, skipped",
                schema.name, schema.id
            );
            return catalog;
        };
        let prefix = kind.object_class();
        let mut parent = ObjectClassInfo::new(prefix, false);

        for definition in &schema.attributes {
            match (definition.data_type, definition.multi_valued) {
                (AttributeType::Complex, true) => {
                    let class_name = AttributePath::join(Some(prefix), &definition.name);
                    catalog.define(Self::embedded_class(&class_name, definition));
                    parent.add(Self::attribute(
                        definition.name.clone(),
                        definition,
                        Mutability::ReadWrite,
                        Some(class_name),
                    ));
                }
                (AttributeType::Complex, false) => {
                    let inherited = definition.mutability.unwrap_or_default();
                    for sub in &definition.sub_attributes {
                        let path = AttributePath::join(Some(&definition.name), &sub.name);
                        parent.add(Self::attribute(path, sub, inherited, None));
                    }
                }
                _ => parent.add(Self::attribute(
                    definition.name.clone(),
                    definition,
                    Mutability::ReadWrite,
                    None,
                )),
            }
        }

        if kind == ResourceKind::Account {
            for reference in ACCOUNT_REFERENCES {
                let class = reference.object_class();
                parent.add(AttributeInfo {
                    returned_by_default: false,
                    ..AttributeInfo::embedded(class, class)
                });
            }
        }

        debug!(
            "Schema '{}' contributes {} attributes to {}",
            schema.id,
            parent.attributes.len(),
            prefix
        );
        catalog.define(parent);
        catalog
    }

    /// Object class holding the sub-attributes of a multi-valued complex attribute.
    fn embedded_class(name: &str, definition: &AttributeDefinition) -> ObjectClassInfo {
        let mut class = ObjectClassInfo::new(name, true);
        class.add(AttributeInfo::string(NAME));
        for sub in &definition.sub_attributes {
            let nested = (sub.data_type == AttributeType::Complex)
                .then(|| AttributePath::join(Some(name), &sub.name));
            class.add(Self::attribute(sub.name.clone(), sub, Mutability::ReadOnly, nested));
        }
        class
    }

    fn attribute(
        name: String,
        definition: &AttributeDefinition,
        default_mutability: Mutability,
        object_class: Option<String>,
    ) -> AttributeInfo {
        let (createable, readable) = definition
            .mutability
            .unwrap_or(default_mutability)
            .access();
        let value_type = match (definition.data_type, object_class) {
            (AttributeType::Complex, Some(object_class)) => ValueType::Embedded { object_class },
            (AttributeType::Complex, None) => ValueType::Embedded {
                object_class: name.clone(),
            },
            (AttributeType::Boolean, _) => ValueType::Boolean,
            (AttributeType::Integer, _) => ValueType::Integer,
            (AttributeType::Decimal | AttributeType::DateTime, _) => ValueType::Long,
            _ => ValueType::String,
        };
        AttributeInfo {
            name,
            value_type,
            multi_valued: definition.multi_valued,
            required: definition.required,
            createable,
            readable,
            returned_by_default: definition.returned != Some(Returned::Never),
        }
    }
}
