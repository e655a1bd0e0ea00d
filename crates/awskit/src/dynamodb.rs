//! DynamoDB tables.

use crate::error::{Error, Result};
use crate::iam::{self, Grantable, PolicyStatement};
use construct::{AccessMode, CfnResource, LogicalId, RemovalPolicy, Resource, ResourceExt, Stack, Token};
use regex::Regex;
use std::sync::LazyLock;

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]{3,255}$").expect("static regex"));

/// Actions granted by [`Table::grant_read_data`].
pub const READ_DATA_ACTIONS: &[&str] = &[
    "dynamodb:BatchGetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:GetItem",
    "dynamodb:Scan",
    "dynamodb:ConditionCheckItem",
    "dynamodb:DescribeTable",
];

/// Actions granted by [`Table::grant_write_data`].
pub const WRITE_DATA_ACTIONS: &[&str] = &[
    "dynamodb:BatchWriteItem",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
    "dynamodb:DescribeTable",
];

/// Scalar attribute types usable in key schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// `S`
    String,
    /// `N`
    Number,
    /// `B`
    Binary,
}

impl AttributeType {
    fn code(&self) -> &'static str {
        match self {
            AttributeType::String => "S",
            AttributeType::Number => "N",
            AttributeType::Binary => "B",
        }
    }
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Scalar type
    pub attribute_type: AttributeType,
}

impl Attribute {
    /// A string-typed attribute.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: AttributeType::String,
        }
    }

    /// A number-typed attribute.
    pub fn number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: AttributeType::Number,
        }
    }
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    /// On-demand capacity
    PayPerRequest,
    /// Fixed read/write capacity units
    Provisioned {
        /// Read capacity units
        read: u32,
        /// Write capacity units
        write: u32,
    },
}

/// Table properties.
#[derive(Debug, Clone)]
pub struct TableProps {
    /// Physical name; generated by CloudFormation when unset
    pub table_name: Option<String>,
    /// Partition (hash) key
    pub partition_key: Attribute,
    /// Optional sort (range) key
    pub sort_key: Option<Attribute>,
    /// Capacity mode
    pub billing_mode: BillingMode,
    /// Policy when the table leaves the stack; `Retain` when unset
    pub removal_policy: Option<RemovalPolicy>,
}

impl TableProps {
    /// On-demand table keyed by `partition_key`.
    pub fn new(partition_key: Attribute) -> Self {
        Self {
            table_name: None,
            partition_key,
            sort_key: None,
            billing_mode: BillingMode::PayPerRequest,
            removal_policy: None,
        }
    }
}

/// A DynamoDB table.
#[derive(Debug, Clone)]
pub struct Table {
    id: LogicalId,
}

impl Table {
    /// Declare a table.
    pub fn new(stack: &mut Stack, id: &str, props: TableProps) -> Result<Self> {
        validate(id, &props)?;

        let mut attributes = vec![&props.partition_key];
        let mut key_schema = vec![key_element(&props.partition_key, "HASH")];
        if let Some(sort) = &props.sort_key {
            attributes.push(sort);
            key_schema.push(key_element(sort, "RANGE"));
        }

        let definitions = Token::list(attributes.iter().map(|a| {
            Token::object([
                ("AttributeName", Token::from(&a.name)),
                ("AttributeType", Token::from(a.attribute_type.code())),
            ])
        }));

        let mut resource = CfnResource::new("AWS::DynamoDB::Table")
            .with("AttributeDefinitions", definitions)
            .with("KeySchema", Token::List(key_schema))
            .with_opt("TableName", props.table_name.as_deref())
            .with_removal_policy(props.removal_policy.unwrap_or(RemovalPolicy::Retain));

        resource = match props.billing_mode {
            BillingMode::PayPerRequest => resource.with("BillingMode", "PAY_PER_REQUEST"),
            BillingMode::Provisioned { read, write } => resource.with(
                "ProvisionedThroughput",
                Token::object([
                    ("ReadCapacityUnits", Token::from(read)),
                    ("WriteCapacityUnits", Token::from(write)),
                ]),
            ),
        };

        let logical_id = stack.add_resource(&[id, "Resource"], resource)?;
        Ok(Self { id: logical_id })
    }

    /// Generated table name.
    pub fn table_name(&self) -> Token {
        self.ref_token()
    }

    /// Table ARN.
    pub fn table_arn(&self) -> Token {
        self.att("Arn")
    }

    /// Allow `grantee` to read items and describe the table.
    pub fn grant_read_data(&self, stack: &mut Stack, grantee: &dyn Grantable) -> Result<()> {
        self.grant(stack, grantee, AccessMode::Read, READ_DATA_ACTIONS)
    }

    /// Allow `grantee` to write and delete items and describe the table.
    pub fn grant_write_data(&self, stack: &mut Stack, grantee: &dyn Grantable) -> Result<()> {
        self.grant(stack, grantee, AccessMode::Write, WRITE_DATA_ACTIONS)
    }

    fn grant(
        &self,
        stack: &mut Stack,
        grantee: &dyn Grantable,
        mode: AccessMode,
        actions: &[&str],
    ) -> Result<()> {
        let statement = PolicyStatement::allow(
            actions.iter().copied(),
            vec![self.table_arn(), Token::Pseudo(construct::Pseudo::NoValue)],
        );
        iam::grant(stack, grantee, self, mode, &statement)
    }
}

impl Resource for Table {
    fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    fn resource_type(&self) -> &'static str {
        "AWS::DynamoDB::Table"
    }
}

fn key_element(attribute: &Attribute, key_type: &str) -> Token {
    Token::object([
        ("AttributeName", Token::from(&attribute.name)),
        ("KeyType", Token::from(key_type)),
    ])
}

fn validate(id: &str, props: &TableProps) -> Result<()> {
    if let Some(name) = &props.table_name
        && !TABLE_NAME.is_match(name)
    {
        return Err(Error::invalid(
            id,
            "table name",
            format!("'{name}' must be 3-255 characters of [a-zA-Z0-9_.-]"),
        ));
    }
    if props.partition_key.name.is_empty() {
        return Err(Error::invalid(id, "partition key", "name must not be empty"));
    }
    if let Some(sort) = &props.sort_key
        && sort.name == props.partition_key.name
    {
        return Err(Error::invalid(
            id,
            "sort key",
            format!("'{}' is already the partition key", sort.name),
        ));
    }
    if let BillingMode::Provisioned { read, write } = props.billing_mode
        && (read == 0 || write == 0)
    {
        return Err(Error::invalid(
            id,
            "billing mode",
            "provisioned capacity must be at least 1",
        ));
    }
    Ok(())
}
