//! The root scope and the cloud assembly it synthesizes

use crate::asset::{self, ASSEMBLY_VERSION};
use crate::error::{Error, Result};
use crate::stack::Stack;
use crate::template::Template;
use crate::types::Environment;
use serde_json::{Map, Value, json};

/// Root of the construct tree; owns every stack
#[derive(Debug, Default)]
pub struct App {
    stacks: Vec<Stack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a fully built stack
    pub fn add_stack(&mut self, stack: Stack) -> Result<&mut Stack> {
        if self.stacks.iter().any(|s| s.name() == stack.name()) {
            return Err(Error::DuplicateStack(stack.name().to_string()));
        }
        self.stacks.push(stack);
        let last = self.stacks.len() - 1;
        Ok(&mut self.stacks[last])
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Synthesize every stack
    pub fn synth(&self) -> Result<CloudAssembly> {
        let mut artifacts = Vec::with_capacity(self.stacks.len());
        for stack in &self.stacks {
            artifacts.push(StackArtifact {
                stack_name: stack.name().to_string(),
                environment: Environment::from_props(stack.props()),
                tags: stack
                    .props()
                    .tags
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                template: stack.synth()?,
                asset_manifest: asset::render_manifest(stack.assets()),
            });
        }
        Ok(CloudAssembly { artifacts })
    }
}

/// Synthesis output of one stack
#[derive(Debug, Clone)]
pub struct StackArtifact {
    pub stack_name: String,
    pub environment: Environment,
    pub tags: Vec<(String, String)>,
    pub template: Template,
    pub asset_manifest: Value,
}

impl StackArtifact {
    pub fn template_file(&self) -> String {
        format!("{}.template.json", self.stack_name)
    }

    pub fn assets_file(&self) -> String {
        format!("{}.assets.json", self.stack_name)
    }
}

/// Everything an external deployment tool needs, as named files
#[derive(Debug, Clone)]
pub struct CloudAssembly {
    pub artifacts: Vec<StackArtifact>,
}

impl CloudAssembly {
    pub fn artifact(&self, stack_name: &str) -> Option<&StackArtifact> {
        self.artifacts.iter().find(|a| a.stack_name == stack_name)
    }

    /// The top-level `manifest.json`
    pub fn manifest(&self) -> Value {
        let mut artifacts = Map::new();
        for a in &self.artifacts {
            let tags: Vec<Value> = a
                .tags
                .iter()
                .map(|(k, v)| json!({ "Key": k, "Value": v }))
                .collect();
            let mut properties = json!({
                "templateFile": a.template_file(),
                "validateOnSynth": false,
            });
            if !tags.is_empty() {
                properties["tags"] = Value::Array(tags);
            }

            artifacts.insert(
                a.stack_name.clone(),
                json!({
                    "type": "aws:cloudformation:stack",
                    "environment": a.environment.uri(),
                    "properties": properties,
                    "dependencies": [format!("{}.assets", a.stack_name)],
                }),
            );
            artifacts.insert(
                format!("{}.assets", a.stack_name),
                json!({
                    "type": "cdk:asset-manifest",
                    "properties": { "file": a.assets_file() },
                }),
            );
        }

        json!({ "version": ASSEMBLY_VERSION, "artifacts": Value::Object(artifacts) })
    }

    /// `(file name, contents)` for every file of the assembly
    pub fn files(&self) -> Result<Vec<(String, String)>> {
        let mut files = vec![(
            "manifest.json".to_string(),
            serde_json::to_string_pretty(&self.manifest())?,
        )];
        for a in &self.artifacts {
            files.push((a.template_file(), a.template.to_json_pretty()?));
            files.push((
                a.assets_file(),
                serde_json::to_string_pretty(&a.asset_manifest)?,
            ));
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::CfnResource;
    use crate::types::StackProps;

    fn stack(name: &str) -> Stack {
        let mut s = Stack::new(name, StackProps::default().with_tag("project", "demo")).unwrap();
        s.add_resource(&["Table"], CfnResource::new("AWS::DynamoDB::Table"))
            .unwrap();
        s
    }

    #[test]
    fn test_duplicate_stack_rejected() {
        let mut app = App::new();
        app.add_stack(stack("One")).unwrap();
        assert!(matches!(
            app.add_stack(stack("One")),
            Err(Error::DuplicateStack(_))
        ));
        assert_eq!(app.stacks().len(), 1);
    }

    #[test]
    fn test_assembly_files() {
        let mut app = App::new();
        app.add_stack(stack("One")).unwrap();
        let assembly = app.synth().unwrap();

        let names: Vec<String> = assembly
            .files()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec!["manifest.json", "One.template.json", "One.assets.json"]
        );

        let manifest = assembly.manifest();
        let artifact = &manifest["artifacts"]["One"];
        assert_eq!(artifact["environment"], "aws://unknown-account/unknown-region");
        assert_eq!(artifact["properties"]["templateFile"], "One.template.json");
        assert_eq!(artifact["properties"]["tags"][0]["Key"], "project");
    }

    #[test]
    fn test_synth_is_deterministic() {
        let mut app = App::new();
        app.add_stack(stack("One")).unwrap();
        let a = app.synth().unwrap().files().unwrap();
        let b = app.synth().unwrap().files().unwrap();
        assert_eq!(a, b);
    }
}
