//! Schema declaration
//!
//! Each resource, data source and the provider itself declare a [`Schema`]:
//! typed attributes with required/optional/computed flags, defaults, plan
//! modifiers and validators, plus nested single blocks. The schema validates
//! configuration, fills defaults and computes plans.

use super::diag::Diagnostics;
use super::validators::Validator;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int64,
    Bool,
    Float64,
    StringList,
}

impl AttributeType {
    fn matches(self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Int64 => value.is_i64() || value.is_u64(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Float64 => value.is_number(),
            AttributeType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// A change to this attribute destroys and recreates the resource
    RequiresReplace,
    /// Keep the prior state value while the new one is unknown
    UseStateForUnknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: AttributeType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
    #[serde(skip)]
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn base(ty: AttributeType) -> Self {
        Self {
            ty,
            description: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
            plan_modifiers: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn required(ty: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::base(ty)
        }
    }

    pub fn optional(ty: AttributeType) -> Self {
        Self {
            optional: true,
            ..Self::base(ty)
        }
    }

    pub fn computed(ty: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::base(ty)
        }
    }

    /// Optional in configuration, filled in by the remote side otherwise
    pub fn optional_computed(ty: AttributeType) -> Self {
        Self {
            optional: true,
            computed: true,
            ..Self::base(ty)
        }
    }

    /// The computed `id` attribute every resource carries
    pub fn id() -> Self {
        Self::computed(AttributeType::String)
            .use_state_for_unknown()
            .describe("Resource identifier")
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::RequiresReplace);
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::UseStateForUnknown);
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }

    fn configurable(&self) -> bool {
        self.required || self.optional
    }
}

/// Nested single block
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub required: bool,
    pub computed: bool,
    #[serde(flatten)]
    pub schema: Schema,
}

impl Block {
    pub fn required(schema: Schema) -> Self {
        Self {
            required: true,
            computed: false,
            schema,
        }
    }

    pub fn optional(schema: Schema) -> Self {
        Self {
            required: false,
            computed: false,
            schema,
        }
    }

    /// Block populated only by the remote side
    pub fn computed(schema: Schema) -> Self {
        Self {
            required: false,
            computed: true,
            schema,
        }
    }
}

/// Planned state plus the attribute paths forcing replacement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub planned_state: Value,
    pub requires_replace: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, Block>,
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

impl Schema {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..Self::default()
        }
    }

    pub fn attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn block(mut self, name: &str, block: Block) -> Self {
        self.blocks.insert(name.to_string(), block);
        self
    }

    /// Validate user configuration.
    ///
    /// All problems are collected: missing required values, type mismatches,
    /// validator failures, unknown or unconfigurable attributes.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.validate_object(config, "", &mut diags);
        diags
    }

    fn validate_object(&self, value: &Value, path: &str, diags: &mut Diagnostics) {
        let empty = Map::new();
        let obj = match value {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                diags.add_attribute_error(path, "Incorrect attribute value type", "expected an object");
                return;
            }
        };

        for key in obj.keys() {
            if !self.attributes.contains_key(key) && !self.blocks.contains_key(key) {
                diags.add_attribute_error(
                    join(path, key),
                    "Unsupported argument",
                    format!("an argument named {:?} is not expected here", key),
                );
            }
        }

        for (name, attr) in &self.attributes {
            let attr_path = join(path, name);
            let value = obj.get(name).unwrap_or(&Value::Null);

            if value.is_null() {
                if attr.required {
                    diags.add_attribute_error(
                        attr_path,
                        "Missing required argument",
                        format!("the argument {:?} is required", name),
                    );
                }
                continue;
            }

            if !attr.configurable() {
                diags.add_attribute_error(
                    attr_path.clone(),
                    "Invalid configuration for read-only attribute",
                    format!("{:?} is computed by the provider and cannot be set", name),
                );
            }

            if !attr.ty.matches(value) {
                diags.add_attribute_error(
                    attr_path,
                    "Incorrect attribute value type",
                    format!("expected {:?}", attr.ty),
                );
                continue;
            }

            for validator in &attr.validators {
                if let Err(detail) = validator.check(value) {
                    diags.add_attribute_error(attr_path.clone(), "Invalid attribute value", detail);
                }
            }
        }

        for (name, block) in &self.blocks {
            let block_path = join(path, name);
            match obj.get(name).unwrap_or(&Value::Null) {
                Value::Null => {
                    if block.required {
                        diags.add_attribute_error(
                            block_path,
                            "Missing required block",
                            format!("a {:?} block is required", name),
                        );
                    }
                }
                _ if block.computed => {
                    diags.add_attribute_error(
                        block_path,
                        "Invalid configuration for read-only block",
                        format!("{:?} is computed by the provider and cannot be set", name),
                    );
                }
                nested => block.schema.validate_object(nested, &block_path, diags),
            }
        }
    }

    /// Fill defaults for unset attributes, recursing into present blocks
    pub fn apply_defaults(&self, value: &mut Value) {
        let Value::Object(obj) = value else {
            return;
        };

        for (name, attr) in &self.attributes {
            if let Some(default) = &attr.default {
                let slot = obj.entry(name.clone()).or_insert(Value::Null);
                if slot.is_null() {
                    *slot = default.clone();
                }
            }
        }

        for (name, block) in &self.blocks {
            if let Some(nested) = obj.get_mut(name) {
                block.schema.apply_defaults(nested);
            }
        }
    }

    /// Compute the planned state for `proposed` given the `prior` state.
    ///
    /// Defaults are applied, computed attributes marked
    /// [`PlanModifier::UseStateForUnknown`] keep their prior value and changes
    /// to [`PlanModifier::RequiresReplace`] attributes are reported.
    pub fn plan(&self, prior: Option<&Value>, proposed: &Value) -> Plan {
        let mut planned = proposed.clone();
        if planned.is_null() {
            planned = Value::Object(Map::new());
        }
        self.apply_defaults(&mut planned);

        let mut requires_replace = Vec::new();
        if let Some(prior) = prior.filter(|p| !p.is_null()) {
            self.plan_object(prior, &mut planned, "", &mut requires_replace);
        }

        Plan {
            planned_state: planned,
            requires_replace,
        }
    }

    fn plan_object(&self, prior: &Value, planned: &mut Value, path: &str, replace: &mut Vec<String>) {
        let Value::Object(obj) = planned else {
            return;
        };

        for (name, attr) in &self.attributes {
            let prior_value = prior.get(name).unwrap_or(&Value::Null);
            let slot = obj.entry(name.clone()).or_insert(Value::Null);

            if slot.is_null()
                && attr.computed
                && attr.has_modifier(PlanModifier::UseStateForUnknown)
            {
                *slot = prior_value.clone();
            }

            if attr.has_modifier(PlanModifier::RequiresReplace) && *slot != *prior_value {
                // Unset optional+computed values are filled remotely; not a change
                if !(slot.is_null() && attr.computed) {
                    replace.push(join(path, name));
                }
            }
        }

        for (name, block) in &self.blocks {
            let prior_block = prior.get(name).unwrap_or(&Value::Null);
            match obj.get_mut(name) {
                Some(nested) if !nested.is_null() => {
                    block
                        .schema
                        .plan_object(prior_block, nested, &join(path, name), replace);
                }
                _ if block.computed => {
                    obj.insert(name.clone(), prior_block.clone());
                }
                _ => {}
            }
        }
    }

    /// Paths of every sensitive attribute, for masking in logs
    pub fn sensitive_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_sensitive("", &mut out);
        out
    }

    /// Copy of `value` with every set sensitive attribute masked, for logging
    pub fn redact(&self, value: &Value) -> Value {
        let mut redacted = value.clone();
        for path in self.sensitive_paths() {
            let mut slot = Some(&mut redacted);
            for segment in path.split('.') {
                slot = slot.and_then(|v| v.get_mut(segment));
            }
            if let Some(slot) = slot.filter(|v| !v.is_null()) {
                *slot = Value::String("<sensitive>".to_string());
            }
        }
        redacted
    }

    fn collect_sensitive(&self, path: &str, out: &mut Vec<String>) {
        for (name, attr) in &self.attributes {
            if attr.sensitive {
                out.push(join(path, name));
            }
        }
        for (name, block) in &self.blocks {
            block.schema.collect_sensitive(&join(path, name), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn network_like() -> Schema {
        Schema::new("test")
            .attribute("id", Attribute::id())
            .attribute(
                "project_id",
                Attribute::required(AttributeType::String).requires_replace(),
            )
            .attribute(
                "cloud_type",
                Attribute::required(AttributeType::String)
                    .requires_replace()
                    .validate(Validator::OneOfCaseInsensitive(&["aws", "gcp"])),
            )
            .attribute("description", Attribute::optional(AttributeType::String).default(json!("")))
            .attribute("ipv6_cidr_block", Attribute::computed(AttributeType::String).use_state_for_unknown())
            .block(
                "limits",
                Block::optional(
                    Schema::new("")
                        .attribute("size", Attribute::required(AttributeType::Int64).validate(Validator::AtLeast(1))),
                ),
            )
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let diags = network_like().validate(&json!({
            "cloud_type": "azure",
            "ipv6_cidr_block": "::/56",
            "bogus": true,
            "limits": {"size": 0}
        }));
        let rendered = diags.to_string();
        assert!(rendered.contains("project_id: Missing required argument"));
        assert!(rendered.contains("cloud_type: Invalid attribute value"));
        assert!(rendered.contains("ipv6_cidr_block: Invalid configuration for read-only attribute"));
        assert!(rendered.contains("bogus: Unsupported argument"));
        assert!(rendered.contains("limits.size: Invalid attribute value"));
        assert_eq!(diags.len(), 5);
    }

    #[test]
    fn test_type_mismatch() {
        let diags = network_like().validate(&json!({"project_id": 5, "cloud_type": "aws"}));
        assert!(diags.to_string().contains("project_id: Incorrect attribute value type"));
    }

    #[test]
    fn test_plan_applies_defaults_and_keeps_computed() {
        let prior = json!({"id": "n1", "project_id": "p", "cloud_type": "aws", "description": "", "ipv6_cidr_block": "::/56"});
        let proposed = json!({"id": null, "project_id": "p", "cloud_type": "aws", "ipv6_cidr_block": null});
        let plan = network_like().plan(Some(&prior), &proposed);
        assert_eq!(plan.planned_state["id"], "n1");
        assert_eq!(plan.planned_state["ipv6_cidr_block"], "::/56");
        assert_eq!(plan.planned_state["description"], "");
        assert!(plan.requires_replace.is_empty());
    }

    #[test]
    fn test_plan_reports_replacement() {
        let prior = json!({"id": "n1", "project_id": "p", "cloud_type": "aws"});
        let proposed = json!({"project_id": "other", "cloud_type": "aws"});
        let plan = network_like().plan(Some(&prior), &proposed);
        assert_eq!(plan.requires_replace, vec!["project_id".to_string()]);
    }

    #[test]
    fn test_plan_without_prior_is_create() {
        let plan = network_like().plan(None, &json!({"project_id": "p", "cloud_type": "gcp"}));
        assert!(plan.requires_replace.is_empty());
        assert_eq!(plan.planned_state["description"], "");
    }

    #[test]
    fn test_sensitive_paths() {
        let schema = Schema::new("")
            .attribute("token", Attribute::optional(AttributeType::String).sensitive())
            .block(
                "connection_info",
                Block::computed(Schema::new("").attribute("password", Attribute::computed(AttributeType::String).sensitive())),
            );
        assert_eq!(schema.sensitive_paths(), vec!["token", "connection_info.password"]);

        let redacted = schema.redact(&json!({
            "token": "abc",
            "connection_info": {"password": "hunter2", "host": "h"}
        }));
        assert_eq!(redacted["token"], "<sensitive>");
        assert_eq!(redacted["connection_info"]["password"], "<sensitive>");
        assert_eq!(redacted["connection_info"]["host"], "h");

        let untouched = schema.redact(&json!({"token": null}));
        assert!(untouched["token"].is_null());
    }
}
