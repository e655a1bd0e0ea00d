//! API Gateway REST APIs with Lambda proxy integrations.
//!
//! A [`RestApi`] owns its path tree. Path resources are created through
//! [`RestApi::add_resource`], which hands back an [`ApiResource`] handle;
//! methods are bound to a handle with [`RestApi::add_method`]. Every method
//! becomes a dependency of the API's deployment, and the deployment's logical
//! ID carries a fingerprint of the rendered paths and methods, so any route
//! change makes CloudFormation create a fresh deployment for the stage.

use crate::error::{Error, Result};
use crate::iam::{self, Role, ServicePrincipal};
use crate::lambda::Function;
use construct::asset;
use construct::{CfnResource, Edge, LogicalId, Resource, ResourceExt, Stack, Token};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

static PATH_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\{[a-zA-Z0-9._-]+\+?\}|[a-zA-Z0-9:._$-]+)$").expect("static regex")
});

static STAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static regex"));

/// HTTP verbs a method can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// Catch-all `ANY`
    Any,
}

impl HttpMethod {
    /// Upper-case verb
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Any => "ANY",
        }
    }

    /// Verb as matched in an execute-api ARN
    fn arn_verb(&self) -> &'static str {
        match self {
            HttpMethod::Any => "*",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution log level of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodLoggingLevel {
    /// No execution logs
    #[default]
    Off,
    /// Errors only
    Error,
    /// Errors and info
    Info,
}

impl MethodLoggingLevel {
    fn as_str(&self) -> &'static str {
        match self {
            MethodLoggingLevel::Off => "OFF",
            MethodLoggingLevel::Error => "ERROR",
            MethodLoggingLevel::Info => "INFO",
        }
    }
}

/// Options of the stage the API deploys to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOptions {
    /// Stage name; appears in the invoke URL
    pub stage_name: String,
    /// X-Ray tracing
    pub tracing_enabled: bool,
    /// Log full request and response data
    pub data_trace_enabled: bool,
    /// Execution log level
    pub logging_level: MethodLoggingLevel,
    /// Detailed CloudWatch metrics
    pub metrics_enabled: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            stage_name: "prod".to_string(),
            tracing_enabled: false,
            data_trace_enabled: false,
            logging_level: MethodLoggingLevel::Off,
            metrics_enabled: false,
        }
    }
}

impl StageOptions {
    fn has_method_settings(&self) -> bool {
        self.data_trace_enabled || self.metrics_enabled || self.logging_level != MethodLoggingLevel::Off
    }
}

/// REST API properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestApiProps {
    /// API name; the construct id when unset
    pub rest_api_name: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Stage options
    pub deploy_options: StageOptions,
    /// Declare the account-level CloudWatch role API Gateway logs through
    pub cloud_watch_role: bool,
}

impl Default for RestApiProps {
    fn default() -> Self {
        Self {
            rest_api_name: None,
            description: None,
            deploy_options: StageOptions::default(),
            cloud_watch_role: true,
        }
    }
}

/// Handle to a node of an API's path tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResource {
    api: LogicalId,
    path: String,
}

impl ApiResource {
    /// Full path, `/` for the root
    pub fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, part: &str) -> String {
        if self.path == "/" {
            format!("/{part}")
        } else {
            format!("{}/{part}", self.path)
        }
    }
}

#[derive(Debug, Clone)]
struct PathNode {
    /// `None` for the root, which the RestApi itself provides
    logical_id: Option<LogicalId>,
    scope: Vec<String>,
    methods: BTreeSet<HttpMethod>,
}

/// A REST API with one deployment and one stage.
#[derive(Debug, Clone)]
pub struct RestApi {
    id: LogicalId,
    scope: String,
    deployment: LogicalId,
    deployment_scope: Vec<String>,
    /// Path resources and methods the deployment snapshots
    model: BTreeSet<LogicalId>,
    stage: LogicalId,
    stage_name: String,
    url: Token,
    nodes: BTreeMap<String, PathNode>,
}

impl RestApi {
    /// Declare the API, its deployment and its stage.
    pub fn new(stack: &mut Stack, id: &str, props: RestApiProps) -> Result<Self> {
        let options = &props.deploy_options;
        if !STAGE_NAME.is_match(&options.stage_name) {
            return Err(Error::invalid(
                id,
                "stage name",
                format!("'{}' must be letters, digits, '-' or '_'", options.stage_name),
            ));
        }
        let name = props.rest_api_name.clone().unwrap_or_else(|| id.to_string());
        if name.is_empty() {
            return Err(Error::invalid(id, "name", "must not be empty"));
        }

        let api = CfnResource::new("AWS::ApiGateway::RestApi")
            .with("Name", name)
            .with_opt("Description", props.description.as_deref());
        let api_id = stack.add_resource(&[id, "Resource"], api)?;
        let api_ref = Token::Ref(api_id.clone());

        let account = if props.cloud_watch_role {
            let push_logs = iam::aws_managed_policy(stack, "service-role/AmazonAPIGatewayPushToCloudWatchLogs");
            let role = Role::new(
                stack,
                &[id, "CloudWatchRole"],
                &ServicePrincipal::new("apigateway"),
                vec![push_logs],
            )?;
            let account = CfnResource::new("AWS::ApiGateway::Account")
                .with("CloudWatchRoleArn", role.arn())
                .depending_on(&api_id);
            Some(stack.add_resource(&[id, "Account"], account)?)
        } else {
            None
        };

        let deployment = CfnResource::new("AWS::ApiGateway::Deployment")
            .with("RestApiId", api_ref.clone())
            .with("Description", "Automatically created by the RestApi construct");
        let deployment_id = stack.add_resource(&[id, "Deployment", "Resource"], deployment)?;

        let mut stage = CfnResource::new("AWS::ApiGateway::Stage")
            .with("DeploymentId", Token::Ref(deployment_id.clone()))
            .with("RestApiId", api_ref.clone())
            .with("StageName", options.stage_name.as_str());
        if options.tracing_enabled {
            stage = stage.with("TracingEnabled", true);
        }
        if options.has_method_settings() {
            stage = stage.with(
                "MethodSettings",
                Token::list([Token::object([
                    ("DataTraceEnabled", Token::from(options.data_trace_enabled)),
                    ("HttpMethod", Token::from("*")),
                    ("LoggingLevel", Token::from(options.logging_level.as_str())),
                    ("MetricsEnabled", Token::from(options.metrics_enabled)),
                    ("ResourcePath", Token::from("/*")),
                ])]),
            );
        }
        if let Some(account) = &account {
            stage = stage.depending_on(account);
        }
        let stage_scope = format!("DeploymentStage.{}", options.stage_name);
        let stage_id = stack.add_resource(&[id, &stage_scope, "Resource"], stage)?;

        let url = Token::join(
            "",
            vec![
                "https://".into(),
                api_ref,
                ".execute-api.".into(),
                stack.region(),
                ".".into(),
                stack.url_suffix(),
                "/".into(),
                Token::Ref(stage_id.clone()),
                "/".into(),
            ],
        );

        let mut nodes = BTreeMap::new();
        nodes.insert(
            "/".to_string(),
            PathNode {
                logical_id: None,
                scope: vec![id.to_string(), "Default".to_string()],
                methods: BTreeSet::new(),
            },
        );

        log::debug!("Declared REST API {id} with stage {}", options.stage_name);
        let mut api = Self {
            id: api_id,
            scope: id.to_string(),
            deployment: deployment_id,
            deployment_scope: vec![id.to_string(), "Deployment".to_string(), "Resource".to_string()],
            model: BTreeSet::new(),
            stage: stage_id,
            stage_name: options.stage_name.clone(),
            url,
            nodes,
        };
        api.rekey_deployment(stack)?;
        Ok(api)
    }

    /// Handle to `/`.
    pub fn root(&self) -> ApiResource {
        ApiResource {
            api: self.id.clone(),
            path: "/".to_string(),
        }
    }

    /// Add a path part under `parent`.
    pub fn add_resource(&mut self, stack: &mut Stack, parent: &ApiResource, path_part: &str) -> Result<ApiResource> {
        let parent_node = self.node(parent)?;
        if !PATH_PART.is_match(path_part) {
            return Err(Error::invalid(
                &self.scope,
                "path part",
                format!("'{path_part}' is not a valid path segment"),
            ));
        }

        let path = parent.child_path(path_part);
        if self.nodes.contains_key(&path) {
            return Err(Error::DuplicateApiResource { path });
        }

        let parent_id = match &parent_node.logical_id {
            Some(id) => Token::Ref(id.clone()),
            None => self.att("RootResourceId"),
        };
        let mut scope = parent_node.scope.clone();
        scope.push(path_part.to_string());

        let resource = CfnResource::new("AWS::ApiGateway::Resource")
            .with("ParentId", parent_id)
            .with("PathPart", path_part)
            .with("RestApiId", self.ref_token());
        let mut resource_path: Vec<&str> = scope.iter().map(String::as_str).collect();
        resource_path.push("Resource");
        let logical_id = stack.add_resource(&resource_path, resource)?;

        self.model.insert(logical_id.clone());
        self.nodes.insert(
            path.clone(),
            PathNode {
                logical_id: Some(logical_id),
                scope,
                methods: BTreeSet::new(),
            },
        );
        self.rekey_deployment(stack)?;
        Ok(ApiResource {
            api: self.id.clone(),
            path,
        })
    }

    /// Bind `method` on `resource` to `handler` through a Lambda proxy integration.
    ///
    /// Also allows API Gateway to invoke the handler for this method and
    /// path only, and orders the deployment after the method.
    pub fn add_method(
        &mut self,
        stack: &mut Stack,
        resource: &ApiResource,
        method: HttpMethod,
        handler: &Function,
    ) -> Result<LogicalId> {
        let node = self.node(resource)?;
        if node.methods.contains(&method) {
            return Err(Error::DuplicateMethod {
                method: method.to_string(),
                path: resource.path.clone(),
            });
        }

        let resource_id = match &node.logical_id {
            Some(id) => Token::Ref(id.clone()),
            None => self.att("RootResourceId"),
        };
        let uri = Token::join(
            "",
            vec![
                "arn:".into(),
                stack.partition(),
                ":apigateway:".into(),
                stack.region(),
                ":lambda:path/2015-03-31/functions/".into(),
                handler.function_arn(),
                "/invocations".into(),
            ],
        );
        let cfn_method = CfnResource::new("AWS::ApiGateway::Method")
            .with("AuthorizationType", "NONE")
            .with("HttpMethod", method.as_str())
            .with(
                "Integration",
                Token::object([
                    ("IntegrationHttpMethod", Token::from("POST")),
                    ("Type", Token::from("AWS_PROXY")),
                    ("Uri", uri),
                ]),
            )
            .with("ResourceId", resource_id)
            .with("RestApiId", self.ref_token());

        let mut scope: Vec<&str> = node.scope.iter().map(String::as_str).collect();
        scope.push(method.as_str());
        let method_id = {
            let mut path = scope.clone();
            path.push("Resource");
            stack.add_resource(&path, cfn_method)?
        };

        scope.push("ApiPermission");
        let source_arn = self.execute_arn(stack, method, &resource.path);
        handler.add_permission(
            stack,
            &scope,
            &ServicePrincipal::new("apigateway"),
            Some(source_arn),
        )?;

        stack.resource_mut(&self.deployment)?.add_dependency(&method_id);
        stack.add_edge(Edge::route(
            &self.id,
            handler.logical_id(),
            method.as_str(),
            resource.path.as_str(),
        ));

        if let Some(node) = self.nodes.get_mut(&resource.path) {
            node.methods.insert(method);
        }
        self.model.insert(method_id.clone());
        self.rekey_deployment(stack)?;
        log::debug!("Bound {method} {} to {}", resource.path, handler.logical_id());
        Ok(method_id)
    }

    /// Invoke URL of the stage, ending in `/`.
    pub fn url(&self) -> Token {
        self.url.clone()
    }

    /// Stage name.
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// Logical ID of the current deployment.
    pub fn deployment(&self) -> &LogicalId {
        &self.deployment
    }

    /// Logical ID of the stage.
    pub fn deployment_stage(&self) -> &LogicalId {
        &self.stage
    }

    /// Methods bound on `path`, if the path exists.
    pub fn methods_of(&self, path: &str) -> Option<&BTreeSet<HttpMethod>> {
        self.nodes.get(path).map(|n| &n.methods)
    }

    /// Every path of the tree, root first.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Move the deployment to a logical ID fingerprinted by the API model.
    fn rekey_deployment(&mut self, stack: &mut Stack) -> Result<()> {
        let mut rendered = Vec::with_capacity(self.model.len());
        for id in &self.model {
            let resource = stack
                .resource(id)
                .ok_or_else(|| construct::Error::UnknownResource(id.to_string()))?;
            rendered.push(serde_json::to_vec(&resource.render())?);
        }
        let fingerprint = asset::fingerprint(&rendered);
        let new_id = LogicalId::with_fingerprint(&self.deployment_scope, &fingerprint);
        self.deployment = stack.rekey_resource(&self.deployment, new_id)?;
        Ok(())
    }

    fn node(&self, handle: &ApiResource) -> Result<&PathNode> {
        if handle.api != self.id {
            return Err(Error::ForeignApiResource {
                path: handle.path.clone(),
                api: self.scope.clone(),
            });
        }
        self.nodes.get(&handle.path).ok_or_else(|| Error::ForeignApiResource {
            path: handle.path.clone(),
            api: self.scope.clone(),
        })
    }

    /// `arn:...:execute-api:region:account:api/stage/METHOD/path`, path
    /// parameters widened to `*`.
    fn execute_arn(&self, stack: &Stack, method: HttpMethod, path: &str) -> Token {
        Token::join(
            "",
            vec![
                "arn:".into(),
                stack.partition(),
                ":execute-api:".into(),
                stack.region(),
                ":".into(),
                stack.account(),
                ":".into(),
                self.ref_token(),
                "/".into(),
                Token::Ref(self.stage.clone()),
                "/".into(),
                method.arn_verb().into(),
                wildcard_params(path).into(),
            ],
        )
    }
}

impl Resource for RestApi {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        "AWS::ApiGateway::RestApi"
    }
}

fn wildcard_params(path: &str) -> String {
    path.split('/')
        .map(|part| if part.starts_with('{') { "*" } else { part })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lambda::{Code, FunctionProps, Runtime};
    use construct::StackProps;
    use serde_json::json;

    fn stack() -> Stack {
        Stack::new("ApiTest", StackProps::default()).unwrap()
    }

    fn handler(stack: &mut Stack, id: &str) -> Function {
        Function::new(
            stack,
            id,
            FunctionProps::new(Code::Inline(String::new()), "index.handler", Runtime::Nodejs20x),
        )
        .unwrap()
    }

    #[test]
    fn test_stage_settings() {
        let mut s = stack();
        let props = RestApiProps {
            rest_api_name: Some("ItemsApi".into()),
            deploy_options: StageOptions {
                tracing_enabled: true,
                data_trace_enabled: true,
                logging_level: MethodLoggingLevel::Info,
                metrics_enabled: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let api = RestApi::new(&mut s, "Items", props).unwrap();

        let stage = s.resource(api.deployment_stage()).unwrap().render();
        assert_eq!(stage["Properties"]["StageName"], "prod");
        assert_eq!(stage["Properties"]["TracingEnabled"], true);
        assert_eq!(
            stage["Properties"]["MethodSettings"],
            json!([{
                "DataTraceEnabled": true,
                "HttpMethod": "*",
                "LoggingLevel": "INFO",
                "MetricsEnabled": true,
                "ResourcePath": "/*"
            }])
        );
        assert_eq!(s.resources_of_type("AWS::ApiGateway::Account").count(), 1);

        let rendered = s.resource(api.logical_id()).unwrap().render();
        assert_eq!(rendered["Properties"]["Name"], "ItemsApi");
    }

    #[test]
    fn test_default_stage_has_no_method_settings() {
        let mut s = stack();
        let props = RestApiProps {
            cloud_watch_role: false,
            ..Default::default()
        };
        let api = RestApi::new(&mut s, "Plain", props).unwrap();
        let stage = s.resource(api.deployment_stage()).unwrap().render();
        assert!(stage["Properties"].get("MethodSettings").is_none());
        assert!(stage.get("DependsOn").is_none());
        assert_eq!(s.resources_of_type("AWS::ApiGateway::Account").count(), 0);
    }

    #[test]
    fn test_resources_and_methods() {
        let mut s = stack();
        let get = handler(&mut s, "Get");
        let put = handler(&mut s, "Put");
        let mut api = RestApi::new(&mut s, "Items", RestApiProps::default()).unwrap();

        let items = api.add_resource(&mut s, &api.root(), "items").unwrap();
        let item = api.add_resource(&mut s, &items, "{id}").unwrap();
        assert_eq!(item.path(), "/items/{id}");

        api.add_method(&mut s, &items, HttpMethod::Get, &get).unwrap();
        let put_id = api.add_method(&mut s, &item, HttpMethod::Put, &put).unwrap();

        assert_eq!(
            api.methods_of("/items").unwrap().iter().collect::<Vec<_>>(),
            vec![&HttpMethod::Get]
        );
        assert_eq!(api.paths().collect::<Vec<_>>(), vec!["/", "/items", "/items/{id}"]);

        let items_id = s.find_by_path(&["Items", "Default", "items", "Resource"]).unwrap();
        let items_rendered = s.resource(items_id).unwrap().render();
        assert_eq!(
            items_rendered["Properties"]["ParentId"],
            json!({ "Fn::GetAtt": [api.logical_id().as_str(), "RootResourceId"] })
        );

        let method = s.resource(&put_id).unwrap().render();
        assert_eq!(method["Properties"]["HttpMethod"], "PUT");
        assert_eq!(method["Properties"]["Integration"]["Type"], "AWS_PROXY");

        let routes: Vec<_> = s.routes().map(|(m, p, _)| (m.to_string(), p.to_string())).collect();
        assert_eq!(
            routes,
            vec![
                ("GET".to_string(), "/items".to_string()),
                ("PUT".to_string(), "/items/{id}".to_string())
            ]
        );

        let deployment = s.find_by_path(&["Items", "Deployment", "Resource"]).unwrap();
        assert_eq!(deployment, api.deployment());
        let deps = &s.resource(deployment).unwrap().depends_on;
        assert!(deps.contains(&put_id));
        assert_eq!(deps.len(), 2);

        let stage = s.resource(api.deployment_stage()).unwrap().render();
        assert_eq!(stage["Properties"]["DeploymentId"]["Ref"], deployment.as_str());
        assert!(s.validate().is_ok());
    }

    fn items_api(extra_post: bool) -> (Stack, RestApi) {
        let mut s = stack();
        let get = handler(&mut s, "Get");
        let post = handler(&mut s, "Post");
        let mut api = RestApi::new(&mut s, "Items", RestApiProps::default()).unwrap();
        let items = api.add_resource(&mut s, &api.root(), "items").unwrap();
        api.add_method(&mut s, &items, HttpMethod::Get, &get).unwrap();
        if extra_post {
            api.add_method(&mut s, &items, HttpMethod::Post, &post).unwrap();
        }
        (s, api)
    }

    #[test]
    fn test_route_change_replaces_deployment() {
        let (before_stack, before) = items_api(false);
        let (after_stack, after) = items_api(true);
        assert_ne!(before.deployment(), after.deployment());

        let (again_stack, again) = items_api(false);
        assert_eq!(before.deployment(), again.deployment());

        let old = before_stack.synth().unwrap();
        let new = after_stack.synth().unwrap();
        let deployments = |t: &construct::Template| -> Vec<String> {
            t.resources_of_type("AWS::ApiGateway::Deployment")
                .map(|(id, _)| id.to_string())
                .collect()
        };
        assert_eq!(deployments(&old).len(), 1);
        assert_ne!(deployments(&old), deployments(&new));
        assert_eq!(
            again_stack.synth().unwrap().to_json_pretty().unwrap(),
            old.to_json_pretty().unwrap()
        );
    }

    #[test]
    fn test_deployment_id_keeps_readable_prefix() {
        let (s, api) = items_api(false);
        assert!(api.deployment().as_str().starts_with("ItemsDeployment"));
        assert_eq!(
            s.resource(api.deployment()).unwrap().resource_type,
            "AWS::ApiGateway::Deployment"
        );
    }

    #[test]
    fn test_permission_source_arn_widens_path_params() {
        let mut s = stack();
        let del = handler(&mut s, "Del");
        let mut api = RestApi::new(&mut s, "Items", RestApiProps::default()).unwrap();
        let items = api.add_resource(&mut s, &api.root(), "items").unwrap();
        let item = api.add_resource(&mut s, &items, "{id}").unwrap();
        api.add_method(&mut s, &item, HttpMethod::Delete, &del).unwrap();

        let permission = s
            .find_by_path(&["Items", "Default", "items", "{id}", "DELETE", "ApiPermission"])
            .unwrap();
        let rendered = s.resource(permission).unwrap().render();
        let parts = rendered["Properties"]["SourceArn"]["Fn::Join"][1].as_array().unwrap();
        assert_eq!(parts.last().unwrap(), "/DELETE/items/*");
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut s = stack();
        let get = handler(&mut s, "Get");
        let mut api = RestApi::new(&mut s, "Items", RestApiProps::default()).unwrap();
        let items = api.add_resource(&mut s, &api.root(), "items").unwrap();

        assert!(matches!(
            api.add_resource(&mut s, &api.root(), "items"),
            Err(Error::DuplicateApiResource { .. })
        ));

        api.add_method(&mut s, &items, HttpMethod::Get, &get).unwrap();
        assert!(matches!(
            api.add_method(&mut s, &items, HttpMethod::Get, &get),
            Err(Error::DuplicateMethod { .. })
        ));
    }

    #[test]
    fn test_invalid_path_part_and_foreign_handle() {
        let mut s = stack();
        let mut a = RestApi::new(&mut s, "A", RestApiProps::default()).unwrap();
        let b = RestApi::new(&mut s, "B", RestApiProps { cloud_watch_role: false, ..Default::default() })
            .unwrap();

        assert!(a.add_resource(&mut s, &a.root(), "has space").is_err());
        assert!(a.add_resource(&mut s, &a.root(), "a/b").is_err());
        assert!(matches!(
            a.add_resource(&mut s, &b.root(), "items"),
            Err(Error::ForeignApiResource { .. })
        ));
    }

    #[test]
    fn test_url_ends_with_slash() {
        let mut s = stack();
        let api = RestApi::new(&mut s, "Items", RestApiProps::default()).unwrap();
        let url = api.url().to_json();
        let parts = url["Fn::Join"][1].as_array().unwrap();
        assert_eq!(parts.first().unwrap(), "https://");
        assert_eq!(parts.last().unwrap(), "/");
    }

    #[test]
    fn test_wildcard_params() {
        assert_eq!(wildcard_params("/"), "/");
        assert_eq!(wildcard_params("/items"), "/items");
        assert_eq!(wildcard_params("/items/{id}/tags/{tag+}"), "/items/*/tags/*");
    }
}
