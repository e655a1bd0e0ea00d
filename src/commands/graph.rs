//! `stackgen graph`

use anyhow::{Context as _, Result};
use colored::Colorize;
use construct::{LogicalId, Stack};
use serde_json::{Map, Value, json};

use crate::Context;
use crate::cli::{GraphArgs, GraphFormat};
use crate::ui;

pub fn run(ctx: &Context, args: GraphArgs) -> Result<()> {
    let (config, app) = super::assemble(ctx)?;
    let stack = app
        .stack(&config.stack_name)
        .with_context(|| format!("Stack {} not found", config.stack_name))?;
    let order = stack
        .dependency_graph()
        .creation_order()
        .context("Could not order resources")?;

    match args.format {
        GraphFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(stack, &order))?),
        GraphFormat::Text => print_text(stack, &order),
    }
    Ok(())
}

fn print_text(stack: &Stack, order: &[LogicalId]) {
    let graph = stack.dependency_graph();
    ui::header(&format!("{} ({})", stack.name(), ui::plural(order.len(), "resource")));

    let width = order.len().to_string().len();
    for (i, id) in order.iter().enumerate() {
        let Some(resource) = stack.resource(id) else {
            continue;
        };
        println!(
            "{:>width$}. {} {}",
            i + 1,
            id,
            resource.resource_type.dimmed()
        );
        if let Some(deps) = graph.dependencies_of(id)
            && !deps.is_empty()
        {
            let names: Vec<&str> = deps.iter().map(LogicalId::as_str).collect();
            ui::dim(&format!("{:width$}  after {}", "", names.join(", ")));
        }
    }
}

fn to_json(stack: &Stack, order: &[LogicalId]) -> Value {
    let graph = stack.dependency_graph();
    let mut nodes = Map::new();
    for id in order {
        let Some(resource) = stack.resource(id) else {
            continue;
        };
        let dependencies: Vec<&str> = graph
            .dependencies_of(id)
            .map(|deps| deps.iter().map(LogicalId::as_str).collect())
            .unwrap_or_default();
        nodes.insert(
            id.to_string(),
            json!({
                "type": resource.resource_type,
                "path": resource.path(),
                "dependencies": dependencies,
            }),
        );
    }

    json!({
        "stack": stack.name(),
        "order": order,
        "nodes": nodes,
        "edges": stack.edges(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use construct::{AccessMode, CfnResource, Edge, StackProps, Token};

    #[test]
    fn test_json_shape() {
        let mut stack = Stack::new("Graph", StackProps::default()).unwrap();
        let table = stack
            .add_resource(&["Table"], CfnResource::new("AWS::DynamoDB::Table"))
            .unwrap();
        let function = stack
            .add_resource(
                &["Fn"],
                CfnResource::new("AWS::Lambda::Function").with("Table", Token::Ref(table.clone())),
            )
            .unwrap();
        stack.add_edge(Edge::grant(&function, &table, AccessMode::Read));

        let order = stack.dependency_graph().creation_order().unwrap();
        let value = to_json(&stack, &order);

        assert_eq!(value["order"], json!(["Table", "Fn"]));
        assert_eq!(value["nodes"]["Fn"]["dependencies"], json!(["Table"]));
        assert_eq!(value["nodes"]["Table"]["path"], "Graph/Table");
        assert_eq!(value["edges"][0]["kind"], "grant");
        assert_eq!(value["edges"][0]["mode"], "read");
    }
}
