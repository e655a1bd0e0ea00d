//! IAM roles, inline policies and grants.

use crate::error::Result;
use construct::{AccessMode, CfnResource, Edge, LogicalId, Resource, ResourceExt, Stack, Token};

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Allow the actions
    Allow,
    /// Deny the actions
    Deny,
}

impl Effect {
    fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

/// A single IAM policy statement.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    /// Allow or deny
    pub effect: Effect,
    /// Action names, e.g. `dynamodb:GetItem`
    pub actions: Vec<String>,
    /// Resource ARNs (possibly late-bound)
    pub resources: Vec<Token>,
}

impl PolicyStatement {
    /// An `Allow` statement.
    pub fn allow<I, S>(actions: I, resources: Vec<Token>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources,
        }
    }

    /// Render as a template value.
    ///
    /// Single actions and resources are written as scalars, like the IAM
    /// console does.
    pub fn to_token(&self) -> Token {
        let action = match self.actions.as_slice() {
            [single] => Token::from(single),
            many => Token::list(many.iter().map(Token::from)),
        };
        let resource = match self.resources.as_slice() {
            [single] => single.clone(),
            many => Token::List(many.to_vec()),
        };
        Token::object([
            ("Action", action),
            ("Effect", Token::from(self.effect.as_str())),
            ("Resource", resource),
        ])
    }
}

/// Service principal allowed to assume a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrincipal(pub String);

impl ServicePrincipal {
    /// `<service>.amazonaws.com`
    pub fn new(service: &str) -> Self {
        Self(format!("{service}.amazonaws.com"))
    }
}

/// Reference to an AWS-managed policy.
pub fn aws_managed_policy(stack: &Stack, name: &str) -> Token {
    Token::join(
        "",
        vec![
            "arn:".into(),
            stack.partition(),
            format!(":iam::aws:policy/{name}").into(),
        ],
    )
}

/// An IAM role.
#[derive(Debug, Clone)]
pub struct Role {
    id: LogicalId,
    scope: Vec<String>,
}

impl Role {
    /// Declare a role at `scope`, assumable by `principal`.
    pub fn new(
        stack: &mut Stack,
        scope: &[&str],
        principal: &ServicePrincipal,
        managed_policies: Vec<Token>,
    ) -> Result<Self> {
        let assume = Token::object([
            (
                "Statement",
                Token::list([Token::object([
                    ("Action", Token::from("sts:AssumeRole")),
                    ("Effect", Token::from("Allow")),
                    (
                        "Principal",
                        Token::object([("Service", Token::from(&principal.0))]),
                    ),
                ])]),
            ),
            ("Version", Token::from("2012-10-17")),
        ]);

        let mut resource = CfnResource::new("AWS::IAM::Role").with("AssumeRolePolicyDocument", assume);
        if !managed_policies.is_empty() {
            resource = resource.with("ManagedPolicyArns", Token::List(managed_policies));
        }

        let mut path: Vec<&str> = scope.to_vec();
        path.push("Resource");
        let id = stack.add_resource(&path, resource)?;

        Ok(Self {
            id,
            scope: scope.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Role ARN.
    pub fn arn(&self) -> Token {
        self.att("Arn")
    }

    /// Attach a statement to the role's default inline policy.
    ///
    /// The policy is created on first use. Returns its logical ID so callers
    /// can order their own resources after it.
    pub fn add_to_policy(&self, stack: &mut Stack, statement: &PolicyStatement) -> Result<LogicalId> {
        let mut path: Vec<&str> = self.scope.iter().map(String::as_str).collect();
        path.extend(["DefaultPolicy", "Resource"]);

        let policy_id = match stack.find_by_path(&path) {
            Some(id) => id.clone(),
            None => {
                let mut scope_name: String = self.scope.concat();
                scope_name.retain(|c| c.is_ascii_alphanumeric());
                let policy = CfnResource::new("AWS::IAM::Policy")
                    .with(
                        "PolicyDocument",
                        Token::object([
                            ("Statement", Token::List(Vec::new())),
                            ("Version", Token::from("2012-10-17")),
                        ]),
                    )
                    .with("PolicyName", format!("{scope_name}DefaultPolicy"))
                    .with("Roles", Token::list([self.ref_token()]));
                stack.add_resource(&path, policy)?
            }
        };

        stack.resource_mut(&policy_id)?.push_to_list(
            &policy_id,
            &["PolicyDocument", "Statement"],
            statement.to_token(),
        )?;
        Ok(policy_id)
    }
}

impl Resource for Role {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        "AWS::IAM::Role"
    }
}

/// A resource that acts through an IAM role and can receive grants.
pub trait Grantable: Resource {
    /// Role whose policy receives granted statements
    fn grant_principal(&self) -> &Role;
}

/// Grant `grantee` the given actions on `target`.
///
/// Adds the statement to the grantee's role policy, orders the grantee
/// after that policy, and records a grant edge on the stack.
pub fn grant(
    stack: &mut Stack,
    grantee: &dyn Grantable,
    target: &dyn Resource,
    mode: AccessMode,
    statement: &PolicyStatement,
) -> Result<()> {
    let policy = grantee.grant_principal().add_to_policy(stack, statement)?;
    stack
        .resource_mut(grantee.logical_id())?
        .add_dependency(&policy);
    stack.add_edge(Edge::grant(grantee.logical_id(), target.logical_id(), mode));
    log::debug!(
        "Granted {} {} access to {}",
        grantee.logical_id(),
        mode,
        target.logical_id()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use construct::StackProps;
    use serde_json::json;

    fn stack() -> Stack {
        Stack::new("IamTest", StackProps::default()).unwrap()
    }

    #[test]
    fn test_statement_scalar_and_list_forms() {
        let single = PolicyStatement::allow(["s3:GetObject"], vec![Token::from("arn:a")]);
        assert_eq!(
            single.to_token().to_json(),
            json!({ "Action": "s3:GetObject", "Effect": "Allow", "Resource": "arn:a" })
        );

        let many = PolicyStatement::allow(
            ["s3:GetObject", "s3:PutObject"],
            vec![Token::from("arn:a"), Token::from("arn:b")],
        );
        let rendered = many.to_token().to_json();
        assert_eq!(rendered["Action"], json!(["s3:GetObject", "s3:PutObject"]));
        assert_eq!(rendered["Resource"], json!(["arn:a", "arn:b"]));
    }

    #[test]
    fn test_role_trust_policy() {
        let mut s = stack();
        let role = Role::new(
            &mut s,
            &["Fn", "ServiceRole"],
            &ServicePrincipal::new("lambda"),
            vec![],
        )
        .unwrap();
        let rendered = s.resource(role.logical_id()).unwrap().render();
        assert_eq!(
            rendered["Properties"]["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"],
            "lambda.amazonaws.com"
        );
        assert!(rendered["Properties"].get("ManagedPolicyArns").is_none());
    }

    #[test]
    fn test_default_policy_is_created_once() {
        let mut s = stack();
        let role = Role::new(&mut s, &["Fn", "ServiceRole"], &ServicePrincipal::new("lambda"), vec![])
            .unwrap();
        let a = role
            .add_to_policy(&mut s, &PolicyStatement::allow(["a:A"], vec!["*".into()]))
            .unwrap();
        let b = role
            .add_to_policy(&mut s, &PolicyStatement::allow(["b:B"], vec!["*".into()]))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(s.resources_of_type("AWS::IAM::Policy").count(), 1);

        let rendered = s.resource(&a).unwrap().render();
        let statements = rendered["Properties"]["PolicyDocument"]["Statement"]
            .as_array()
            .unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(rendered["Properties"]["PolicyName"], "FnServiceRoleDefaultPolicy");
    }

    #[test]
    fn test_aws_managed_policy_arn() {
        let s = stack();
        assert_eq!(
            aws_managed_policy(&s, "service-role/AWSLambdaBasicExecutionRole").to_json(),
            json!({ "Fn::Join": ["", [
                "arn:",
                { "Ref": "AWS::Partition" },
                ":iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
            ]] })
        );
    }
}
