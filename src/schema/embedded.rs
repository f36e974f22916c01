//! Provider schemas shipped with the connector.
//!
//! The directory publishes its user and group schemas; the platform API does
//! not publish any, so its organization and space schemas are described here
//! from the documented resource shapes.

/// Returns the directory user schema as a JSON string.
pub fn directory_user_schema() -> &'static str {
    r#"{
  "id": "urn:scim:schemas:core:1.0:User",
  "name": "User",
  "description": "Directory user account",
  "attributes": [
    { "name": "id", "type": "string", "required": false, "caseExact": true, "mutability": "readOnly", "returned": "always" },
    { "name": "userName", "type": "string", "required": true, "mutability": "readWrite", "returned": "always" },
    {
      "name": "name",
      "type": "complex",
      "mutability": "readWrite",
      "subAttributes": [
        { "name": "formatted", "type": "string", "mutability": "readWrite" },
        { "name": "familyName", "type": "string", "mutability": "readWrite" },
        { "name": "givenName", "type": "string", "mutability": "readWrite" },
        { "name": "middleName", "type": "string", "mutability": "readWrite" },
        { "name": "honorificPrefix", "type": "string", "mutability": "readWrite" },
        { "name": "honorificSuffix", "type": "string", "mutability": "readWrite" }
      ]
    },
    {
      "name": "emails",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "subAttributes": [
        { "name": "value", "type": "string", "mutability": "readWrite" },
        { "name": "type", "type": "string", "mutability": "readWrite" },
        { "name": "primary", "type": "boolean", "mutability": "readWrite" }
      ]
    },
    {
      "name": "phoneNumbers",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "subAttributes": [
        { "name": "value", "type": "string", "mutability": "readWrite" },
        { "name": "type", "type": "string", "mutability": "readWrite" }
      ]
    },
    { "name": "active", "type": "boolean", "mutability": "readWrite" },
    { "name": "verified", "type": "boolean", "mutability": "readWrite" },
    { "name": "origin", "type": "string", "mutability": "immutable" },
    { "name": "zoneId", "type": "string", "mutability": "readOnly" },
    { "name": "password", "type": "string", "mutability": "writeOnly", "returned": "never" },
    { "name": "passwordLastModified", "type": "dateTime", "mutability": "readOnly" },
    { "name": "lastLogonTime", "type": "integer", "mutability": "readOnly" },
    { "name": "previousLogonTime", "type": "integer", "mutability": "readOnly" },
    {
      "name": "groups",
      "type": "complex",
      "multiValued": true,
      "subAttributes": [
        { "name": "value", "type": "string" },
        { "name": "display", "type": "string" },
        { "name": "type", "type": "string" }
      ]
    },
    {
      "name": "meta",
      "type": "complex",
      "mutability": "readOnly",
      "subAttributes": [
        { "name": "version", "type": "integer", "mutability": "readOnly" },
        { "name": "created", "type": "dateTime", "mutability": "readOnly" },
        { "name": "lastModified", "type": "dateTime", "mutability": "readOnly" }
      ]
    }
  ]
}"#
}

/// Returns the directory group schema as a JSON string.
pub fn directory_group_schema() -> &'static str {
    r#"{
  "id": "urn:scim:schemas:core:1.0:Group",
  "name": "Group",
  "description": "Directory group",
  "attributes": [
    { "name": "id", "type": "string", "caseExact": true, "mutability": "readOnly", "returned": "always" },
    { "name": "displayName", "type": "string", "required": true, "mutability": "readWrite", "returned": "always" },
    { "name": "description", "type": "string", "mutability": "readWrite" },
    { "name": "zoneId", "type": "string", "mutability": "readOnly" },
    {
      "name": "members",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "never",
      "subAttributes": [
        { "name": "value", "type": "string", "mutability": "readWrite" },
        { "name": "type", "type": "string", "mutability": "readWrite" },
        { "name": "origin", "type": "string", "mutability": "readWrite" }
      ]
    },
    {
      "name": "meta",
      "type": "complex",
      "mutability": "readOnly",
      "subAttributes": [
        { "name": "version", "type": "integer", "mutability": "readOnly" },
        { "name": "created", "type": "dateTime", "mutability": "readOnly" },
        { "name": "lastModified", "type": "dateTime", "mutability": "readOnly" }
      ]
    }
  ]
}"#
}

/// Returns the platform organization schema as a JSON string.
pub fn platform_organization_schema() -> &'static str {
    r#"{
  "id": "urn:cloudfoundry:schemas:v2:Organization",
  "name": "Organization",
  "description": "Platform organization",
  "attributes": [
    { "name": "id", "type": "string", "caseExact": true, "mutability": "readOnly", "returned": "always" },
    { "name": "name", "type": "string", "required": true, "mutability": "readWrite", "returned": "always" },
    { "name": "status", "type": "boolean", "mutability": "readWrite" },
    { "name": "billing_enabled", "type": "boolean", "mutability": "readWrite" },
    { "name": "quota_definition_guid", "type": "string", "mutability": "readWrite" },
    { "name": "default_isolation_segment_guid", "type": "string", "mutability": "readWrite" },
    { "name": "created_at", "type": "dateTime", "mutability": "readOnly" },
    { "name": "updated_at", "type": "dateTime", "mutability": "readOnly" }
  ]
}"#
}

/// Returns the platform space schema as a JSON string.
pub fn platform_space_schema() -> &'static str {
    r#"{
  "id": "urn:cloudfoundry:schemas:v2:Space",
  "name": "Space",
  "description": "Platform space",
  "attributes": [
    { "name": "id", "type": "string", "caseExact": true, "mutability": "readOnly", "returned": "always" },
    { "name": "name", "type": "string", "required": true, "mutability": "readWrite", "returned": "always" },
    { "name": "organization_guid", "type": "string", "required": true, "mutability": "immutable" },
    { "name": "organization_name", "type": "string", "mutability": "readOnly" },
    { "name": "allow_ssh", "type": "boolean", "mutability": "readWrite" },
    { "name": "space_quota_definition_guid", "type": "string", "mutability": "readWrite" },
    { "name": "isolation_segment_guid", "type": "string", "mutability": "readWrite" },
    { "name": "domain_guids", "type": "string", "multiValued": true, "mutability": "writeOnly", "returned": "never" },
    { "name": "security_group_guids", "type": "string", "multiValued": true, "mutability": "writeOnly", "returned": "never" },
    { "name": "manager_guids", "type": "string", "multiValued": true, "mutability": "writeOnly", "returned": "never" },
    { "name": "auditor_guids", "type": "string", "multiValued": true, "mutability": "writeOnly", "returned": "never" },
    { "name": "developer_guids", "type": "string", "multiValued": true, "mutability": "writeOnly", "returned": "never" },
    { "name": "created_at", "type": "dateTime", "mutability": "readOnly" },
    { "name": "updated_at", "type": "dateTime", "mutability": "readOnly" }
  ]
}"#
}

/// All built-in schemas, directory first.
pub fn builtin_schemas() -> [&'static str; 4] {
    [
        directory_user_schema(),
        directory_group_schema(),
        platform_organization_schema(),
        platform_space_schema(),
    ]
}
