//! The products API stack.
//!
//! One DynamoDB table, four Node.js handlers with read or write access to
//! it, and a REST API routing `/products` and `/products/{id}` to them.

use awskit::Result;
use awskit::apigateway::{HttpMethod, MethodLoggingLevel, RestApi, RestApiProps, StageOptions};
use awskit::dynamodb::{Attribute, Table, TableProps};
use awskit::lambda::{Runtime, Tracing};
use awskit::logs::RetentionDays;
use awskit::nodejs::{BundlingOptions, FunctionSettings, NodejsFunction, NodejsFunctionProps, OutputFormat};
use construct::{App, Output, RemovalPolicy, Stack, StackProps, Token};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const SERVICE_NAME: &str = "serverless-typescript-demo";
pub const METRICS_NAMESPACE: &str = "AwsSamples";
pub const TABLE_NAME: &str = "Products";
pub const API_NAME: &str = "ProductsApi";
pub const OUTPUT_API_URL: &str = "ApiURL";

/// Lets bundled ESM code `require()` CommonJS dependencies.
const ESM_BANNER: &str =
    "import { createRequire } from 'module';const require = createRequire(import.meta.url);";

/// Handler construct ids and their entry files, relative to the entry root
pub const HANDLERS: [(&str, &str); 4] = [
    ("GetProductsFunction", "src/api/get-products.ts"),
    ("GetProductFunction", "src/api/get-product.ts"),
    ("PutProductFunction", "src/api/put-product.ts"),
    ("DeleteProductsFunction", "src/api/delete-product.ts"),
];

/// Knobs of the products stack that are not stack properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductsOptions {
    /// Directory the handler entries are resolved against
    pub entry_root: PathBuf,
    /// Removal policy override for the table; `Retain` when `None`
    pub table_removal_policy: Option<RemovalPolicy>,
}

impl Default for ProductsOptions {
    fn default() -> Self {
        Self {
            entry_root: PathBuf::from("."),
            table_removal_policy: Some(RemovalPolicy::Destroy),
        }
    }
}

/// Add the products stack to `scope` with default options.
pub fn products_stack(scope: &mut App, id: &str, props: Option<StackProps>) -> Result<()> {
    products_stack_with(scope, id, props, &ProductsOptions::default())
}

/// Add the products stack to `scope`.
///
/// The stack is only attached once fully wired; on error `scope` is left
/// untouched.
pub fn products_stack_with(
    scope: &mut App,
    id: &str,
    props: Option<StackProps>,
    options: &ProductsOptions,
) -> Result<()> {
    let mut stack = Stack::new(id, props.unwrap_or_default())?;

    let table = Table::new(
        &mut stack,
        TABLE_NAME,
        TableProps {
            table_name: Some(TABLE_NAME.to_string()),
            removal_policy: options.table_removal_policy,
            ..TableProps::new(Attribute::string("id"))
        },
    )?;

    let settings = shared_settings(function_environment(&stack, &table));
    let [get_products, get_product, put_product, delete_product] = HANDLERS.map(|(name, entry)| {
        NodejsFunction::new(
            &mut stack,
            name,
            NodejsFunctionProps::new(options.entry_root.join(entry), "handler", settings.clone())
                .with_project_root(options.entry_root.clone()),
        )
    });
    let (get_products, get_product, put_product, delete_product) =
        (get_products?, get_product?, put_product?, delete_product?);

    table.grant_read_data(&mut stack, &get_products)?;
    table.grant_read_data(&mut stack, &get_product)?;
    table.grant_write_data(&mut stack, &delete_product)?;
    table.grant_write_data(&mut stack, &put_product)?;

    let mut api = RestApi::new(
        &mut stack,
        API_NAME,
        RestApiProps {
            rest_api_name: Some(API_NAME.to_string()),
            deploy_options: StageOptions {
                tracing_enabled: true,
                data_trace_enabled: true,
                logging_level: MethodLoggingLevel::Info,
                metrics_enabled: true,
                ..Default::default()
            },
            ..Default::default()
        },
    )?;

    let products = api.add_resource(&mut stack, &api.root(), "products")?;
    api.add_method(&mut stack, &products, HttpMethod::Get, &get_products)?;

    let product = api.add_resource(&mut stack, &products, "{id}")?;
    api.add_method(&mut stack, &product, HttpMethod::Get, &get_product)?;
    api.add_method(&mut stack, &product, HttpMethod::Put, &put_product)?;
    api.add_method(&mut stack, &product, HttpMethod::Delete, &delete_product)?;

    stack.add_output(OUTPUT_API_URL, Output::new(api.url().concat("products")))?;

    log::info!(
        "Assembled stack {id} with {} resources",
        stack.resource_count()
    );
    scope.add_stack(stack)?;
    Ok(())
}

/// Variables every handler sees: the table name plus the fixed
/// observability settings.
pub fn function_environment(stack: &Stack, table: &Table) -> BTreeMap<String, Token> {
    BTreeMap::from([
        ("TABLE_NAME".to_string(), table.table_name()),
        ("AWS_ACCOUNT_ID".to_string(), stack.account()),
        ("POWERTOOLS_SERVICE_NAME".to_string(), Token::from(SERVICE_NAME)),
        ("POWERTOOLS_LOGGER_LOG_LEVEL".to_string(), Token::from("WARN")),
        ("POWERTOOLS_LOGGER_SAMPLE_RATE".to_string(), Token::from("0.01")),
        ("POWERTOOLS_LOGGER_LOG_EVENT".to_string(), Token::from("true")),
        ("POWERTOOLS_METRICS_NAMESPACE".to_string(), Token::from(METRICS_NAMESPACE)),
    ])
}

fn shared_settings(environment: BTreeMap<String, Token>) -> FunctionSettings {
    FunctionSettings {
        runtime: Runtime::Nodejs16x,
        memory_size: 256,
        environment,
        tracing: Tracing::Active,
        log_retention: Some(RetentionDays::OneWeek),
        aws_sdk_connection_reuse: true,
        bundling: BundlingOptions {
            format: OutputFormat::Esm,
            banner: Some(ESM_BANNER.to_string()),
            main_fields: vec!["module".to_string(), "main".to_string()],
            minify: true,
            ..Default::default()
        },
        timeout_seconds: None,
    }
}
