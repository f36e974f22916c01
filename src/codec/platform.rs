//! Marshalling of platform organizations and spaces.

use super::descriptor::{Described, Property, flag, text, timestamp};
use super::scan::Scan;
use crate::error::{ConnectorResult, ValidationResult};
use crate::resource::platform::{
    Envelope, STATUS_ACTIVE, STATUS_SUSPENDED, SpaceEntity, SpacePayload, TenantEntity,
    TenantPayload,
};
use crate::resource::{AttributeBag, AttributeValue, ResourceKind};

fn guid<E>(envelope: &Envelope<E>) -> Vec<AttributeValue> {
    vec![envelope.metadata.guid.as_str().into()]
}

impl Described for Envelope<TenantEntity> {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("id", guid),
        Property::value("name", |tenant| vec![tenant.entity.name.as_str().into()]),
        Property::value("status", |tenant| flag(tenant.entity.is_active())),
        Property::value("billing_enabled", |tenant| flag(tenant.entity.billing_enabled)),
        Property::value("quota_definition_guid", |tenant| {
            text(&tenant.entity.quota_definition_guid)
        }),
        Property::value("default_isolation_segment_guid", |tenant| {
            text(&tenant.entity.default_isolation_segment_guid)
        }),
        Property::value("created_at", |tenant| timestamp(&tenant.metadata.created_at)),
        Property::value("updated_at", |tenant| timestamp(&tenant.metadata.updated_at)),
    ];
}

impl Described for Envelope<SpaceEntity> {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property::value("id", guid),
        Property::value("name", |space| vec![space.entity.name.as_str().into()]),
        Property::value("organization_guid", |space| text(&space.entity.organization_guid)),
        Property::value("allow_ssh", |space| flag(space.entity.allow_ssh)),
        Property::value("space_quota_definition_guid", |space| {
            text(&space.entity.space_quota_definition_guid)
        }),
        Property::value("isolation_segment_guid", |space| {
            text(&space.entity.isolation_segment_guid)
        }),
        Property::value("created_at", |space| timestamp(&space.metadata.created_at)),
        Property::value("updated_at", |space| timestamp(&space.metadata.updated_at)),
    ];
}

/// Organization create or update body built from a bag.
pub fn tenant_from_attributes(bag: &AttributeBag) -> ConnectorResult<TenantPayload> {
    let scan = Scan::new(ResourceKind::Tenant, bag);
    Ok(TenantPayload {
        name: scan.string("name")?,
        status: tenant_status(&scan)?,
        billing_enabled: scan.boolean("billing_enabled")?,
        quota_definition_guid: scan.string("quota_definition_guid")?,
        default_isolation_segment_guid: scan.string("default_isolation_segment_guid")?,
    })
}

/// Space create or update body built from a bag.
pub fn space_from_attributes(bag: &AttributeBag) -> ConnectorResult<SpacePayload> {
    let scan = Scan::new(ResourceKind::Space, bag);
    Ok(SpacePayload {
        name: scan.string("name")?,
        organization_guid: scan.string("organization_guid")?,
        allow_ssh: scan.boolean("allow_ssh")?,
        space_quota_definition_guid: scan.string("space_quota_definition_guid")?,
        isolation_segment_guid: scan.string("isolation_segment_guid")?,
        domain_guids: scan.strings("domain_guids")?,
        security_group_guids: scan.strings("security_group_guids")?,
        manager_guids: scan.strings("manager_guids")?,
        auditor_guids: scan.strings("auditor_guids")?,
        developer_guids: scan.strings("developer_guids")?,
    })
}

/// The enabled flag maps onto the organization status; the status names
/// themselves are accepted as well.
fn tenant_status(scan: &Scan<'_>) -> ValidationResult<Option<String>> {
    match scan.values("status").first() {
        None => Ok(None),
        Some(AttributeValue::String(status))
            if status == STATUS_ACTIVE || status == STATUS_SUSPENDED =>
        {
            Ok(Some(status.clone()))
        }
        Some(_) => Ok(scan.boolean("status")?.map(|active| {
            if active { STATUS_ACTIVE } else { STATUS_SUSPENDED }.to_string()
        })),
    }
}
