//! Data-source handlers
//!
//! Read-only lookups of existing remote objects, either by id or by name
//! within a project.

pub mod clickhouse;
pub mod kafka;
pub mod network;

use crate::framework::{Attribute, AttributeType, DataSourceFactory, DiagResult, Diagnostic, Diagnostics, Schema};

/// Every data-source type the provider serves
pub fn factories() -> Vec<DataSourceFactory> {
    vec![
        network::NetworkDataSource::factory,
        clickhouse::ClickhouseDataSource::factory,
        kafka::KafkaDataSource::factory,
    ]
}

/// How a data source finds its object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(String),
    Name { project_id: String, name: String },
}

impl Lookup {
    /// Exactly one of `id` or `name`; `name` needs `project_id`.
    pub fn from_config(
        id: &Option<String>,
        name: &Option<String>,
        project_id: &Option<String>,
    ) -> DiagResult<Self> {
        let id = id.as_deref().filter(|s| !s.is_empty());
        let name = name.as_deref().filter(|s| !s.is_empty());
        let project_id = project_id.as_deref().filter(|s| !s.is_empty());

        match (id, name) {
            (Some(_), Some(_)) => Err(Diagnostics::error(
                "Invalid lookup",
                "only one of id or name may be set",
            )),
            (None, None) => Err(Diagnostics::error(
                "Invalid lookup",
                "one of id or name must be set",
            )),
            (Some(id), None) => Ok(Lookup::Id(id.to_string())),
            (None, Some(name)) => match project_id {
                Some(project_id) => Ok(Lookup::Name {
                    project_id: project_id.to_string(),
                    name: name.to_string(),
                }),
                None => Err(Diagnostic::error(
                    "Missing project_id",
                    "project_id is required when looking up by name",
                )
                .at("project_id")
                .into()),
            },
        }
    }
}

/// The lookup attributes every data source shares
pub(crate) fn lookup_schema(description: &str) -> Schema {
    Schema::new(description)
        .attribute("id", Attribute::optional_computed(AttributeType::String))
        .attribute("name", Attribute::optional_computed(AttributeType::String))
        .attribute("project_id", Attribute::optional_computed(AttributeType::String))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(
            Lookup::from_config(&some("n1"), &None, &None).unwrap(),
            Lookup::Id("n1".into())
        );
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            Lookup::from_config(&None, &some("prod"), &some("p1")).unwrap(),
            Lookup::Name {
                project_id: "p1".into(),
                name: "prod".into()
            }
        );
    }

    #[test]
    fn test_lookup_rejects_both_or_neither() {
        assert!(Lookup::from_config(&some("n1"), &some("prod"), &some("p1")).is_err());
        assert!(Lookup::from_config(&None, &None, &some("p1")).is_err());
        assert!(Lookup::from_config(&some(""), &None, &None).is_err());
    }

    #[test]
    fn test_name_requires_project() {
        let diags = Lookup::from_config(&None, &some("prod"), &None).unwrap_err();
        let first = diags.iter().next().unwrap();
        assert_eq!(first.attribute.as_deref(), Some("project_id"));
    }
}
