//! Marshalling of directory users and groups.

use super::descriptor::{Described, Property, flag, number, text, timestamp, walk_each, walk_one};
use super::scan::Scan;
use crate::error::{ConnectorResult, ValidationResult};
use crate::resource::directory::{
    Email, GROUP_SCHEMA, GroupRef, GroupResource, Member, Meta, Name, PhoneNumber, USER_SCHEMA,
    UserResource,
};
use crate::resource::{
    AttributeBag, AttributeValue, NAME, PatchOp, PatchOperation, ResourceKind,
};
use log::trace;
use serde_json::{Value, json};

impl Described for UserResource {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("id", |user| text(&user.id)),
        Property::value("userName", |user| text(&user.user_name)),
        Property::nested("name", |user, path, collector| {
            walk_one(user.name.as_ref(), path, collector)
        }),
        Property::nested("emails", |user, path, collector| {
            walk_each(&user.emails, ResourceKind::Account, path, collector)
        }),
        Property::nested("phoneNumbers", |user, path, collector| {
            walk_each(&user.phone_numbers, ResourceKind::Account, path, collector)
        }),
        Property::value("active", |user| flag(user.active)),
        Property::value("verified", |user| flag(user.verified)),
        Property::value("origin", |user| text(&user.origin)),
        Property::value("zoneId", |user| text(&user.zone_id)),
        Property::ignored("password", |user| text(&user.password)),
        Property::value("passwordLastModified", |user| {
            timestamp(&user.password_last_modified)
        }),
        Property::value("lastLogonTime", |user| number(user.last_logon_time)),
        Property::value("previousLogonTime", |user| number(user.previous_logon_time)),
        // delivered as embedded group references instead
        Property::ignored("groups", |user| {
            user.groups
                .iter()
                .map(|group| AttributeValue::from(group.value.as_str()))
                .collect()
        }),
        Property::nested("meta", |user, path, collector| {
            walk_one(user.meta.as_ref(), path, collector)
        }),
    ];
}

impl Described for Name {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("formatted", |name| text(&name.formatted)),
        Property::value("familyName", |name| text(&name.family_name)),
        Property::value("givenName", |name| text(&name.given_name)),
        Property::value("middleName", |name| text(&name.middle_name)),
        Property::value("honorificPrefix", |name| text(&name.honorific_prefix)),
        Property::value("honorificSuffix", |name| text(&name.honorific_suffix)),
    ];
}

impl Described for Email {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("value", |email| vec![email.value.as_str().into()]),
        Property::value("type", |email| text(&email.kind)),
        Property::value("primary", |email| flag(Some(email.primary))),
    ];
}

impl Described for PhoneNumber {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("value", |phone| vec![phone.value.as_str().into()]),
        Property::value("type", |phone| text(&phone.kind)),
    ];
}

impl Described for Meta {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("version", |meta| number(meta.version)),
        Property::value("created", |meta| timestamp(&meta.created)),
        Property::value("lastModified", |meta| timestamp(&meta.last_modified)),
    ];
}

impl Described for GroupResource {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("id", |group| text(&group.id)),
        Property::value("displayName", |group| text(&group.display_name)),
        Property::value("description", |group| text(&group.description)),
        Property::value("zoneId", |group| text(&group.zone_id)),
        Property::ignored("members", |group| {
            group
                .members
                .iter()
                .map(|member| AttributeValue::from(member.value.as_str()))
                .collect()
        }),
        Property::nested("meta", |group, path, collector| {
            walk_one(group.meta.as_ref(), path, collector)
        }),
    ];
}

/// Full user built from a bag, for create.
pub fn user_from_attributes(bag: &AttributeBag) -> ConnectorResult<UserResource> {
    let scan = Scan::new(ResourceKind::Account, bag);
    Ok(UserResource {
        schemas: vec![USER_SCHEMA.to_string()],
        id: scan.string("id")?,
        user_name: scan.string("userName")?,
        name: scan.nested("name").map(|name| name_from(&name)).transpose()?,
        emails: emails_from(&scan, "emails")?,
        phone_numbers: phones_from(&scan, "phoneNumbers")?,
        active: scan.boolean("active")?,
        verified: scan.boolean("verified")?,
        origin: scan.string("origin")?,
        zone_id: scan.string("zoneId")?,
        password: scan.secret("password")?,
        groups: scan
            .nested("groups")
            .map(|groups| group_refs_from(&groups))
            .transpose()?
            .unwrap_or_default(),
        ..UserResource::default()
    })
}

/// Full group built from a bag, for create.
pub fn group_from_attributes(bag: &AttributeBag) -> ConnectorResult<GroupResource> {
    let scan = Scan::new(ResourceKind::Group, bag);
    Ok(GroupResource {
        schemas: vec![GROUP_SCHEMA.to_string()],
        id: scan.string("id")?,
        display_name: scan.string("displayName")?,
        description: scan.string("description")?,
        zone_id: scan.string("zoneId")?,
        members: member_ids(&scan)?.into_iter().map(Member::user).collect(),
        meta: None,
    })
}

fn name_from(scan: &Scan<'_>) -> ValidationResult<Name> {
    Ok(Name {
        formatted: scan.string("formatted")?,
        family_name: scan.string("familyName")?,
        given_name: scan.string("givenName")?,
        middle_name: scan.string("middleName")?,
        honorific_prefix: scan.string("honorificPrefix")?,
        honorific_suffix: scan.string("honorificSuffix")?,
    })
}

/// Addresses given as whole elements under `field`, followed by any flat
/// `field.value` entries. The first address is primary unless stated otherwise.
fn emails_from(scan: &Scan<'_>, field: &str) -> ValidationResult<Vec<Email>> {
    let mut emails = Vec::new();
    for element in scan.elements(field) {
        if let Some(value) = element_value(&element)? {
            emails.push(Email {
                value,
                kind: element.string("type")?,
                primary: element.boolean("primary")?.unwrap_or(emails.is_empty()),
            });
        }
    }
    if let Some(flat) = scan.nested(field) {
        let offset = emails.len();
        emails.extend(flat_emails(&flat, offset)?);
    }
    Ok(emails)
}

/// Positional zip of flat `value`, `type` and `primary` lists.
fn flat_emails(scan: &Scan<'_>, offset: usize) -> ValidationResult<Vec<Email>> {
    let types = scan.strings("type")?;
    let primary = scan.booleans("primary")?;
    Ok(scan
        .strings("value")?
        .into_iter()
        .enumerate()
        .map(|(index, value)| Email {
            value,
            kind: types.get(index).cloned(),
            primary: primary.get(index).copied().unwrap_or(offset + index == 0),
        })
        .collect())
}

fn phones_from(scan: &Scan<'_>, field: &str) -> ValidationResult<Vec<PhoneNumber>> {
    let mut phones = Vec::new();
    for element in scan.elements(field) {
        if let Some(value) = element_value(&element)? {
            phones.push(PhoneNumber {
                value,
                kind: element.string("type")?,
            });
        }
    }
    if let Some(flat) = scan.nested(field) {
        let types = flat.strings("type")?;
        phones.extend(
            flat.strings("value")?
                .into_iter()
                .enumerate()
                .map(|(index, value)| PhoneNumber {
                    value,
                    kind: types.get(index).cloned(),
                }),
        );
    }
    Ok(phones)
}

/// `value` of an element, falling back to its name.
fn element_value(element: &Scan<'_>) -> ValidationResult<Option<String>> {
    match element.string("value")? {
        Some(value) => Ok(Some(value)),
        None => element.string(NAME),
    }
}

fn group_refs_from(scan: &Scan<'_>) -> ValidationResult<Vec<GroupRef>> {
    Ok(scan
        .strings("value")?
        .into_iter()
        .map(|value| GroupRef {
            value,
            ..GroupRef::default()
        })
        .collect())
}

/// Member identifiers given either flat (`members`) or nested (`members.value`).
fn member_ids(scan: &Scan<'_>) -> ValidationResult<Vec<String>> {
    let mut ids = scan.strings("members")?;
    if let Some(nested) = scan.nested("members") {
        ids.extend(nested.strings("value")?);
    }
    Ok(ids)
}

/// How a field of a patchable kind becomes patch operations.
#[derive(Debug, Clone, Copy)]
enum PatchRule {
    Text,
    Flag,
    Secret,
    /// Each sub-attribute replaced on its own path
    Nested,
    /// Whole list of addresses replaced, first one primary
    Emails,
    /// Whole list of numbers replaced
    Phones,
    /// Whole member list replaced
    Members,
}

const USER_PATCH: &[(&str, PatchRule)] = &[
    ("userName", PatchRule::Text),
    ("name", PatchRule::Nested),
    ("emails", PatchRule::Emails),
    ("phoneNumbers", PatchRule::Phones),
    ("active", PatchRule::Flag),
    ("verified", PatchRule::Flag),
    ("password", PatchRule::Secret),
];

const GROUP_PATCH: &[(&str, PatchRule)] = &[
    ("displayName", PatchRule::Text),
    ("description", PatchRule::Text),
    ("members", PatchRule::Members),
];

/// Patch operations updating a user with the attributes of a bag.
pub fn user_patch(bag: &AttributeBag) -> ConnectorResult<Vec<PatchOperation>> {
    patch_with(&Scan::new(ResourceKind::Account, bag), USER_PATCH)
}

/// Patch operations updating a group with the attributes of a bag.
pub fn group_patch(bag: &AttributeBag) -> ConnectorResult<Vec<PatchOperation>> {
    patch_with(&Scan::new(ResourceKind::Group, bag), GROUP_PATCH)
}

/// Operation adding or removing group members.
pub fn member_patch(op: PatchOp, ids: &[String]) -> PatchOperation {
    let members = Value::Array(
        ids.iter()
            .map(|id| json!(Member::user(id.as_str())))
            .collect(),
    );
    match op {
        PatchOp::Add => PatchOperation::add("members", members),
        PatchOp::Replace => PatchOperation::replace("members", members),
        PatchOp::Remove => PatchOperation::remove("members", Some(members)),
    }
}

fn patch_with(
    scan: &Scan<'_>,
    table: &[(&str, PatchRule)],
) -> ConnectorResult<Vec<PatchOperation>> {
    let mut operations = Vec::new();
    for &(field, rule) in table {
        if !scan.contains(field) {
            continue;
        }
        match rule {
            PatchRule::Text => {
                if let Some(value) = scan.string(field)? {
                    operations.push(PatchOperation::replace(field, Value::String(value)));
                }
            }
            PatchRule::Flag => {
                if let Some(value) = scan.boolean(field)? {
                    operations.push(PatchOperation::replace(field, Value::Bool(value)));
                }
            }
            PatchRule::Secret => {
                if let Some(value) = scan.secret(field)? {
                    operations.push(PatchOperation::replace(field, Value::String(value)));
                }
            }
            PatchRule::Nested => {
                if let Some(nested) = scan.nested(field) {
                    for child in nested.fields() {
                        if let Some(value) = nested.string(child)? {
                            operations.push(PatchOperation::replace(
                                nested.path(child),
                                Value::String(value),
                            ));
                        }
                    }
                }
            }
            PatchRule::Emails => {
                let emails = emails_from(scan, field)?;
                if !emails.is_empty() {
                    operations.push(PatchOperation::replace(field, json!(emails)));
                }
            }
            PatchRule::Phones => {
                let phones = phones_from(scan, field)?;
                if !phones.is_empty() {
                    operations.push(PatchOperation::replace(field, json!(phones)));
                }
            }
            PatchRule::Members => {
                let ids = member_ids(scan)?;
                if !ids.is_empty() {
                    operations.push(member_patch(PatchOp::Replace, &ids));
                }
            }
        }
    }
    for field in scan.fields() {
        if !table.iter().any(|(known, _)| *known == field) {
            trace!("Attribute '{}' cannot be patched, ignored", field);
        }
    }
    Ok(operations)
}
