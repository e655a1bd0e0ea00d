//! Lambda functions.
//!
//! A [`Function`] owns three template entries besides itself: a service
//! role, the role's default policy (created when the first statement is
//! attached) and, when a retention is configured, its log group.

use crate::error::{Error, Result};
use crate::iam::{self, Grantable, PolicyStatement, Role, ServicePrincipal};
use crate::logs::{LogGroup, RetentionDays};
use construct::asset::{self, FileAsset};
use construct::{CfnResource, LogicalId, Resource, ResourceExt, Stack, Token};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Memory range Lambda accepts, in MB.
pub const MEMORY_RANGE: std::ops::RangeInclusive<u32> = 128..=10240;

/// Variables the Lambda service sets itself; functions may not override them.
pub const RESERVED_ENV_KEYS: &[&str] = &[
    "_HANDLER",
    "_X_AMZN_TRACE_ID",
    "AWS_ACCESS_KEY",
    "AWS_ACCESS_KEY_ID",
    "AWS_DEFAULT_REGION",
    "AWS_EXECUTION_ENV",
    "AWS_LAMBDA_FUNCTION_MEMORY_SIZE",
    "AWS_LAMBDA_FUNCTION_NAME",
    "AWS_LAMBDA_FUNCTION_VERSION",
    "AWS_LAMBDA_INITIALIZATION_TYPE",
    "AWS_LAMBDA_LOG_GROUP_NAME",
    "AWS_LAMBDA_LOG_STREAM_NAME",
    "AWS_LAMBDA_RUNTIME_API",
    "AWS_REGION",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "LAMBDA_RUNTIME_DIR",
    "LAMBDA_TASK_ROOT",
];

const X_RAY_ACTIONS: &[&str] = &["xray:PutTraceSegments", "xray:PutTelemetryRecords"];

static ENV_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("static regex"));

/// Execution runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// `nodejs16.x`
    Nodejs16x,
    /// `nodejs18.x`
    Nodejs18x,
    /// `nodejs20.x`
    Nodejs20x,
    /// `provided.al2023`, for custom runtimes
    ProvidedAl2023,
}

impl Runtime {
    /// Identifier written to the template
    pub fn name(&self) -> &'static str {
        match self {
            Runtime::Nodejs16x => "nodejs16.x",
            Runtime::Nodejs18x => "nodejs18.x",
            Runtime::Nodejs20x => "nodejs20.x",
            Runtime::ProvidedAl2023 => "provided.al2023",
        }
    }

    /// Bundler target matching the runtime's Node.js version
    pub fn node_target(&self) -> Option<&'static str> {
        match self {
            Runtime::Nodejs16x => Some("node16"),
            Runtime::Nodejs18x => Some("node18"),
            Runtime::Nodejs20x => Some("node20"),
            Runtime::ProvidedAl2023 => None,
        }
    }
}

/// X-Ray tracing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tracing {
    /// Sample and trace incoming requests
    Active,
    /// Trace only requests that arrive with a sampling decision
    PassThrough,
    /// No `TracingConfig` at all
    #[default]
    Disabled,
}

/// Where the function code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// A packaged asset in the bootstrap staging bucket
    Asset(FileAsset),
    /// Source inlined into the template
    Inline(String),
}

/// Function properties.
#[derive(Debug, Clone)]
pub struct FunctionProps {
    /// Code location
    pub code: Code,
    /// `file.export` inside the package
    pub handler: String,
    /// Execution runtime
    pub runtime: Runtime,
    /// Memory in MB
    pub memory_size: u32,
    /// Environment variables
    pub environment: BTreeMap<String, Token>,
    /// X-Ray tracing
    pub tracing: Tracing,
    /// Log group retention; no log group is declared when unset
    pub log_retention: Option<RetentionDays>,
    /// Free-form description
    pub description: Option<String>,
    /// Timeout in seconds
    pub timeout_seconds: Option<u32>,
}

impl FunctionProps {
    /// Defaults for everything but the code, handler and runtime.
    pub fn new(code: Code, handler: impl Into<String>, runtime: Runtime) -> Self {
        Self {
            code,
            handler: handler.into(),
            runtime,
            memory_size: 128,
            environment: BTreeMap::new(),
            tracing: Tracing::Disabled,
            log_retention: None,
            description: None,
            timeout_seconds: None,
        }
    }
}

/// A Lambda function together with its service role.
#[derive(Debug, Clone)]
pub struct Function {
    id: LogicalId,
    scope: String,
    role: Role,
    log_group: Option<LogGroup>,
}

impl Function {
    /// Declare a function and its supporting resources under `id`.
    pub fn new(stack: &mut Stack, id: &str, props: FunctionProps) -> Result<Self> {
        validate(id, &props)?;

        let basic_execution = iam::aws_managed_policy(stack, "service-role/AWSLambdaBasicExecutionRole");
        let role = Role::new(
            stack,
            &[id, "ServiceRole"],
            &ServicePrincipal::new("lambda"),
            vec![basic_execution],
        )?;

        let code = match &props.code {
            Code::Asset(file) => {
                stack.add_asset(file.clone());
                Token::object([
                    ("S3Bucket", Token::Sub(asset::staging_bucket())),
                    ("S3Key", Token::from(file.object_key())),
                ])
            }
            Code::Inline(source) => Token::object([("ZipFile", Token::from(source))]),
        };

        let mut resource = CfnResource::new("AWS::Lambda::Function")
            .with("Code", code)
            .with("Handler", props.handler.as_str())
            .with("MemorySize", props.memory_size)
            .with("Role", role.arn())
            .with("Runtime", props.runtime.name())
            .with_opt("Description", props.description.as_deref())
            .with_opt("Timeout", props.timeout_seconds)
            .depending_on(role.logical_id());

        if !props.environment.is_empty() {
            resource = resource.with(
                "Environment",
                Token::object([("Variables", Token::Object(props.environment.clone()))]),
            );
        }
        match props.tracing {
            Tracing::Active => resource = resource.with("TracingConfig", Token::object([("Mode", "Active")])),
            Tracing::PassThrough => {
                resource = resource.with("TracingConfig", Token::object([("Mode", "PassThrough")]));
            }
            Tracing::Disabled => {}
        }

        let function_id = stack.add_resource(&[id, "Resource"], resource)?;

        if props.tracing == Tracing::Active {
            let xray = PolicyStatement::allow(X_RAY_ACTIONS.iter().copied(), vec![Token::from("*")]);
            let policy = role.add_to_policy(stack, &xray)?;
            stack.resource_mut(&function_id)?.add_dependency(&policy);
        }

        let log_group = match props.log_retention {
            Some(retention) => Some(LogGroup::new(
                stack,
                &[id, "LogGroup", "Resource"],
                Token::from("/aws/lambda/").concat(Token::Ref(function_id.clone())),
                retention,
            )?),
            None => None,
        };

        log::debug!("Declared function {id} ({})", props.runtime.name());
        Ok(Self {
            id: function_id,
            scope: id.to_string(),
            role,
            log_group,
        })
    }

    /// Generated function name.
    pub fn function_name(&self) -> Token {
        self.ref_token()
    }

    /// Function ARN.
    pub fn function_arn(&self) -> Token {
        self.att("Arn")
    }

    /// Service role the function runs as.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Log group, when a retention was configured.
    pub fn log_group(&self) -> Option<&LogGroup> {
        self.log_group.as_ref()
    }

    /// Allow `principal` to invoke the function.
    ///
    /// The permission is declared at `scope`, which callers usually place
    /// under the construct that triggers the invocation.
    pub fn add_permission(
        &self,
        stack: &mut Stack,
        scope: &[&str],
        principal: &ServicePrincipal,
        source_arn: Option<Token>,
    ) -> Result<LogicalId> {
        let permission = CfnResource::new("AWS::Lambda::Permission")
            .with("Action", "lambda:InvokeFunction")
            .with("FunctionName", self.function_arn())
            .with("Principal", principal.0.as_str())
            .with_opt("SourceArn", source_arn);
        let id = stack.add_resource(scope, permission)?;
        log::debug!("Allowed {} to invoke {}", principal.0, self.scope);
        Ok(id)
    }
}

impl Resource for Function {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        "AWS::Lambda::Function"
    }

    fn description(&self) -> String {
        format!("function {} ({})", self.scope, self.id)
    }
}

impl Grantable for Function {
    fn grant_principal(&self) -> &Role {
        &self.role
    }
}

fn validate(id: &str, props: &FunctionProps) -> Result<()> {
    if !MEMORY_RANGE.contains(&props.memory_size) {
        return Err(Error::invalid(
            id,
            "memory size",
            format!(
                "{} MB is outside {}..={}",
                props.memory_size,
                MEMORY_RANGE.start(),
                MEMORY_RANGE.end()
            ),
        ));
    }
    if props.handler.is_empty() {
        return Err(Error::invalid(id, "handler", "must not be empty"));
    }
    if let Some(timeout) = props.timeout_seconds
        && !(1..=900).contains(&timeout)
    {
        return Err(Error::invalid(id, "timeout", format!("{timeout}s is outside 1..=900")));
    }
    for key in props.environment.keys() {
        if !ENV_KEY.is_match(key) {
            return Err(Error::invalid(
                id,
                "environment",
                format!("'{key}' is not a valid variable name"),
            ));
        }
        if RESERVED_ENV_KEYS.contains(&key.as_str()) {
            return Err(Error::invalid(
                id,
                "environment",
                format!("'{key}' is reserved by the Lambda runtime"),
            ));
        }
    }
    Ok(())
}
