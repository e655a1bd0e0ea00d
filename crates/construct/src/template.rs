//! Synthesized CloudFormation templates

use crate::error::Result;
use crate::resource::PATH_METADATA_KEY;
use crate::stack::Stack;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const FORMAT_VERSION: &str = "2010-09-09";

/// A rendered template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion", default = "default_format_version")]
    pub format_version: String,

    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Resources", default)]
    pub resources: BTreeMap<String, Value>,

    #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Value>,
}

fn default_format_version() -> String {
    FORMAT_VERSION.to_string()
}

impl Template {
    pub(crate) fn render(stack: &Stack) -> Self {
        let resources = stack
            .resources()
            .map(|(id, r)| (id.to_string(), r.render()))
            .collect();

        let outputs = stack
            .outputs()
            .iter()
            .map(|(name, output)| {
                let mut entry = Map::new();
                entry.insert("Value".into(), output.value.to_json());
                if let Some(description) = &output.description {
                    entry.insert("Description".into(), description.clone().into());
                }
                if let Some(export) = &output.export_name {
                    entry.insert("Export".into(), json!({ "Name": export }));
                }
                (name.clone(), Value::Object(entry))
            })
            .collect();

        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: stack.props().description.clone(),
            resources,
            outputs,
        }
    }

    /// Parse a template previously written by [`Template::to_json_pretty`]
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.resources.get(logical_id)
    }

    /// `(logical_id, entry)` pairs of one resource type
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, v)| v["Type"] == resource_type)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Construct path recorded in a resource's metadata
    pub fn path_of(&self, logical_id: &str) -> Option<&str> {
        self.resources
            .get(logical_id)?
            .get("Metadata")?
            .get(PATH_METADATA_KEY)?
            .as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::CfnResource;
    use crate::token::Token;
    use crate::types::{Output, StackProps};

    fn sample() -> Template {
        let mut stack = Stack::new(
            "Sample",
            StackProps::default().with_description("sample stack"),
        )
        .unwrap();
        let table = stack
            .add_resource(&["Table"], CfnResource::new("AWS::DynamoDB::Table"))
            .unwrap();
        stack
            .add_output(
                "TableName",
                Output::new(Token::Ref(table)).with_export_name("sample-table"),
            )
            .unwrap();
        stack.synth().unwrap()
    }

    #[test]
    fn test_render_shape() {
        let t = sample();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(v["Description"], "sample stack");
        assert_eq!(v["Resources"]["Table"]["Type"], "AWS::DynamoDB::Table");
        assert_eq!(v["Outputs"]["TableName"]["Value"], json!({ "Ref": "Table" }));
        assert_eq!(v["Outputs"]["TableName"]["Export"]["Name"], "sample-table");
        assert_eq!(t.path_of("Table"), Some("Sample/Table"));
    }

    #[test]
    fn test_json_roundtrip_preserves_template() {
        let t = sample();
        let parsed = Template::from_json(&t.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn test_from_json_tolerates_missing_sections() {
        let t = Template::from_json(r#"{"Resources": {}}"#).unwrap();
        assert_eq!(t.format_version, FORMAT_VERSION);
        assert!(t.outputs.is_empty());
    }
}
