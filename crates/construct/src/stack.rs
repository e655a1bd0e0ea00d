//! Stacks: the unit of deployment and the scope resources are declared in

use crate::asset::FileAsset;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::id::{self, LogicalId, PATH_SEP};
use crate::resource::CfnResource;
use crate::template::Template;
use crate::token::{Pseudo, Token};
use crate::types::{AccessMode, Edge, EdgeKind, Output, StackProps};
use std::collections::{BTreeMap, HashMap};

/// A deployable set of resources, outputs and the edges between them
#[derive(Debug)]
pub struct Stack {
    name: String,
    props: StackProps,
    resources: Vec<(LogicalId, CfnResource)>,
    index: HashMap<LogicalId, usize>,
    paths: HashMap<String, LogicalId>,
    edges: Vec<Edge>,
    outputs: BTreeMap<String, Output>,
    assets: Vec<FileAsset>,
}

impl Stack {
    /// Create an empty stack
    pub fn new(name: &str, props: StackProps) -> Result<Self> {
        id::validate_stack_name(name)?;
        Ok(Self {
            name: name.to_string(),
            props,
            resources: Vec::new(),
            index: HashMap::new(),
            paths: HashMap::new(),
            edges: Vec::new(),
            outputs: BTreeMap::new(),
            assets: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn props(&self) -> &StackProps {
        &self.props
    }

    /// Account as a literal when configured, the pseudo parameter otherwise
    pub fn account(&self) -> Token {
        match &self.props.account {
            Some(account) => Token::from(account),
            None => Token::Pseudo(Pseudo::AccountId),
        }
    }

    /// Region as a literal when configured, the pseudo parameter otherwise
    pub fn region(&self) -> Token {
        match &self.props.region {
            Some(region) => Token::from(region),
            None => Token::Pseudo(Pseudo::Region),
        }
    }

    pub fn partition(&self) -> Token {
        Token::Pseudo(Pseudo::Partition)
    }

    pub fn url_suffix(&self) -> Token {
        Token::Pseudo(Pseudo::UrlSuffix)
    }

    /// Declare a resource at `scope` (construct ids relative to the stack)
    ///
    /// Fails if the path is already taken or its logical ID collides with
    /// another path.
    pub fn add_resource(&mut self, scope: &[&str], mut resource: CfnResource) -> Result<LogicalId> {
        for component in scope {
            id::validate_construct_id(component)?;
        }

        let relative = scope.join(PATH_SEP);
        if self.paths.contains_key(&relative) {
            return Err(Error::DuplicatePath(format!("{}/{relative}", self.name)));
        }

        let components: Vec<String> = scope.iter().map(|s| (*s).to_string()).collect();
        let logical_id = LogicalId::from_path(&components);
        if let Some(&existing) = self.index.get(&logical_id) {
            return Err(Error::DuplicateLogicalId {
                logical_id: logical_id.to_string(),
                existing: self.resources[existing].1.path.clone(),
            });
        }

        resource.path = format!("{}/{relative}", self.name);
        log::debug!(
            "Declared {} {} at {}",
            resource.resource_type,
            logical_id,
            resource.path
        );

        self.index.insert(logical_id.clone(), self.resources.len());
        self.paths.insert(relative, logical_id.clone());
        self.resources.push((logical_id.clone(), resource));
        Ok(logical_id)
    }

    /// Give the resource at `id` a new logical ID
    ///
    /// Every reference to it (properties, `DependsOn`, outputs, edges) is
    /// rewritten. Renaming to the current ID is a no-op.
    pub fn rekey_resource(&mut self, id: &LogicalId, new_id: LogicalId) -> Result<LogicalId> {
        if *id == new_id {
            return Ok(new_id);
        }
        let Some(&position) = self.index.get(id) else {
            return Err(Error::UnknownResource(id.to_string()));
        };
        if let Some(&existing) = self.index.get(&new_id) {
            return Err(Error::DuplicateLogicalId {
                logical_id: new_id.to_string(),
                existing: self.resources[existing].1.path.clone(),
            });
        }

        self.index.remove(id);
        self.index.insert(new_id.clone(), position);
        self.resources[position].0 = new_id.clone();
        for logical_id in self.paths.values_mut() {
            if *logical_id == *id {
                *logical_id = new_id.clone();
            }
        }

        for (_, resource) in &mut self.resources {
            resource.rename_reference(id, &new_id);
        }
        for output in self.outputs.values_mut() {
            output.value.rename_reference(id, &new_id);
        }
        for edge in &mut self.edges {
            for end in [&mut edge.from, &mut edge.to] {
                if *end == *id {
                    *end = new_id.clone();
                }
            }
        }

        log::debug!("Renamed {id} to {new_id}");
        Ok(new_id)
    }

    pub fn resource(&self, id: &LogicalId) -> Option<&CfnResource> {
        self.index.get(id).map(|&i| &self.resources[i].1)
    }

    pub fn resource_mut(&mut self, id: &LogicalId) -> Result<&mut CfnResource> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.resources[i].1),
            None => Err(Error::UnknownResource(id.to_string())),
        }
    }

    /// Look up a resource by its path relative to the stack
    pub fn find_by_path(&self, scope: &[&str]) -> Option<&LogicalId> {
        self.paths.get(&scope.join(PATH_SEP))
    }

    /// All resources in declaration order
    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &CfnResource)> {
        self.resources.iter().map(|(id, r)| (id, r))
    }

    /// Resources of one CloudFormation type, in declaration order
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a LogicalId, &'a CfnResource)> + 'a {
        self.resources()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Record a grant or route edge
    pub fn add_edge(&mut self, edge: Edge) {
        log::debug!("Edge {} -> {} ({:?})", edge.from, edge.to, edge.kind);
        self.edges.push(edge);
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Grant edges as `(grantee, target, mode)`
    pub fn grants(&self) -> impl Iterator<Item = (&LogicalId, &LogicalId, AccessMode)> {
        self.edges
            .iter()
            .filter_map(|e| e.grant_mode().map(|mode| (&e.from, &e.to, mode)))
    }

    /// Route edges as `(method, path, handler)`
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, &LogicalId)> {
        self.edges.iter().filter_map(|e| match &e.kind {
            EdgeKind::Route { method, path } => Some((method.as_str(), path.as_str(), &e.to)),
            EdgeKind::Grant { .. } => None,
        })
    }

    /// Publish an output
    pub fn add_output(&mut self, id: &str, output: Output) -> Result<()> {
        id::validate_output_id(id)?;
        if self.outputs.contains_key(id) {
            return Err(Error::DuplicateOutput(id.to_string()));
        }
        self.outputs.insert(id.to_string(), output);
        Ok(())
    }

    pub fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    /// Register a file asset; registering the same fingerprint twice is a no-op
    pub fn add_asset(&mut self, asset: FileAsset) {
        if !self.assets.iter().any(|a| a.id == asset.id) {
            self.assets.push(asset);
        }
    }

    pub fn assets(&self) -> &[FileAsset] {
        &self.assets
    }

    /// Check that every reference resolves inside this stack
    pub fn validate(&self) -> Result<()> {
        for (id, resource) in &self.resources {
            for target in resource.references() {
                if !self.index.contains_key(&target) {
                    return Err(Error::UnresolvedReference {
                        from: id.to_string(),
                        to: target.to_string(),
                    });
                }
            }
        }

        for (name, output) in &self.outputs {
            for target in output.value.references() {
                if !self.index.contains_key(&target) {
                    return Err(Error::UnresolvedReference {
                        from: format!("output {name}"),
                        to: target.to_string(),
                    });
                }
            }
        }

        for edge in &self.edges {
            for end in [&edge.from, &edge.to] {
                if !self.index.contains_key(end) {
                    return Err(Error::UnresolvedReference {
                        from: format!("edge {} -> {}", edge.from, edge.to),
                        to: end.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Dependency graph between this stack's resources
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::new(
            self.resources
                .iter()
                .map(|(id, r)| (id.clone(), r.references())),
        )
    }

    /// Validate and render the template
    pub fn synth(&self) -> Result<Template> {
        self.validate()?;
        let order = self.dependency_graph().creation_order()?;
        log::info!(
            "Synthesized stack {} ({} resources, {} outputs)",
            self.name,
            order.len(),
            self.outputs.len()
        );
        Ok(Template::render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> Stack {
        Stack::new("TestStack", StackProps::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_stack_name() {
        assert!(Stack::new("bad name", StackProps::default()).is_err());
    }

    #[test]
    fn test_add_resource_sets_path_and_id() {
        let mut s = stack();
        let id = s
            .add_resource(&["Products"], CfnResource::new("AWS::DynamoDB::Table"))
            .unwrap();
        assert_eq!(id.as_str(), "Products");
        assert_eq!(s.resource(&id).unwrap().path(), "TestStack/Products");
        assert_eq!(s.find_by_path(&["Products"]), Some(&id));
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let mut s = stack();
        s.add_resource(&["Fn", "Resource"], CfnResource::new("A"))
            .unwrap();
        let err = s
            .add_resource(&["Fn", "Resource"], CfnResource::new("B"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePath(_)));
        assert_eq!(s.resource_count(), 1);
    }

    #[test]
    fn test_sanitized_single_ids_collide() {
        let mut s = stack();
        s.add_resource(&["Api-Url"], CfnResource::new("A")).unwrap();
        let err = s
            .add_resource(&["ApiUrl"], CfnResource::new("B"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId { .. }));
    }

    #[test]
    fn test_account_and_region_tokens() {
        let s = stack();
        assert_eq!(s.account(), Token::Pseudo(Pseudo::AccountId));
        assert_eq!(s.region(), Token::Pseudo(Pseudo::Region));

        let s = Stack::new(
            "Pinned",
            StackProps::default()
                .with_account("123456789012")
                .with_region("us-east-1"),
        )
        .unwrap();
        assert_eq!(s.account().as_str(), Some("123456789012"));
        assert_eq!(s.region().as_str(), Some("us-east-1"));
    }

    #[test]
    fn test_validate_catches_dangling_reference() {
        let mut s = stack();
        s.add_resource(
            &["Fn"],
            CfnResource::new("AWS::Lambda::Function").with("Role", Token::Ref("Missing".into())),
        )
        .unwrap();
        let err = s.synth().unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn test_validate_catches_dangling_output() {
        let mut s = stack();
        s.add_output("Url", Output::new(Token::Ref("Nope".into())))
            .unwrap();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_duplicate_output_is_rejected() {
        let mut s = stack();
        s.add_output("Url", Output::new("a")).unwrap();
        assert!(matches!(
            s.add_output("Url", Output::new("b")),
            Err(Error::DuplicateOutput(_))
        ));
    }

    #[test]
    fn test_output_names_must_be_alphanumeric() {
        let mut s = stack();
        assert!(matches!(
            s.add_output("Api-URL", Output::new("a")),
            Err(Error::InvalidId { .. })
        ));
        assert!(s.outputs().is_empty());
        s.add_output("ApiURL", Output::new("a")).unwrap();
    }

    #[test]
    fn test_rekey_rewrites_references() {
        let mut s = stack();
        let old = s
            .add_resource(&["Deploy", "Resource"], CfnResource::new("AWS::ApiGateway::Deployment"))
            .unwrap();
        let stage = s
            .add_resource(
                &["Stage"],
                CfnResource::new("AWS::ApiGateway::Stage")
                    .with("DeploymentId", Token::Ref(old.clone()))
                    .depending_on(&old),
            )
            .unwrap();
        s.add_output("DeploymentId", Output::new(Token::Ref(old.clone())))
            .unwrap();
        s.add_edge(Edge::grant(&stage, &old, AccessMode::Read));

        let new = s.rekey_resource(&old, LogicalId::new("Deploy1234abcd")).unwrap();

        assert!(s.resource(&old).is_none());
        assert_eq!(s.find_by_path(&["Deploy", "Resource"]), Some(&new));
        let rendered = s.resource(&stage).unwrap().render();
        assert_eq!(rendered["Properties"]["DeploymentId"]["Ref"], "Deploy1234abcd");
        assert_eq!(rendered["DependsOn"][0], "Deploy1234abcd");
        assert_eq!(s.outputs()["DeploymentId"].value, Token::Ref(new.clone()));
        assert_eq!(s.edges()[0].to, new);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_rekey_rejects_taken_id() {
        let mut s = stack();
        let a = s.add_resource(&["A"], CfnResource::new("T")).unwrap();
        let b = s.add_resource(&["B"], CfnResource::new("T")).unwrap();
        assert!(matches!(
            s.rekey_resource(&a, b.clone()),
            Err(Error::DuplicateLogicalId { .. })
        ));
        assert!(matches!(
            s.rekey_resource(&LogicalId::new("Nope"), LogicalId::new("C")),
            Err(Error::UnknownResource(_))
        ));
        assert_eq!(s.rekey_resource(&a, a.clone()).unwrap(), a);
    }

    #[test]
    fn test_grants_and_routes_views() {
        let mut s = stack();
        let table = s.add_resource(&["Table"], CfnResource::new("T")).unwrap();
        let func = s.add_resource(&["Fn"], CfnResource::new("F")).unwrap();
        let api = s.add_resource(&["Api"], CfnResource::new("A")).unwrap();
        s.add_edge(Edge::grant(&func, &table, AccessMode::Read));
        s.add_edge(Edge::route(&api, &func, "GET", "/items"));

        let grants: Vec<_> = s.grants().collect();
        assert_eq!(grants, vec![(&func, &table, AccessMode::Read)]);
        let routes: Vec<_> = s.routes().collect();
        assert_eq!(routes, vec![("GET", "/items", &func)]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_assets_deduplicate_by_id() {
        use crate::asset::Packaging;
        let mut s = stack();
        let asset = FileAsset {
            id: "abc".into(),
            source_path: "a.ts".into(),
            packaging: Packaging::ZipDirectory,
            build_command: vec![],
        };
        s.add_asset(asset.clone());
        s.add_asset(asset);
        assert_eq!(s.assets().len(), 1);
    }
}
