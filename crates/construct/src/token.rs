//! Property values that may embed CloudFormation intrinsics
//!
//! A [`Token`] is a JSON-shaped tree whose leaves are either literals or
//! late-bound values (`Ref`, `Fn::GetAtt`, pseudo parameters). Values only
//! become concrete when the provisioning engine deploys the template, so the
//! tree is rendered as-is and its references are tracked for ordering.

use crate::id::LogicalId;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// Pseudo parameters resolved by CloudFormation at deploy time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pseudo {
    AccountId,
    Region,
    Partition,
    UrlSuffix,
    StackName,
    NoValue,
}

impl Pseudo {
    pub fn name(&self) -> &'static str {
        match self {
            Pseudo::AccountId => "AWS::AccountId",
            Pseudo::Region => "AWS::Region",
            Pseudo::Partition => "AWS::Partition",
            Pseudo::UrlSuffix => "AWS::URLSuffix",
            Pseudo::StackName => "AWS::StackName",
            Pseudo::NoValue => "AWS::NoValue",
        }
    }
}

/// A property value
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Plain JSON
    Literal(Value),
    /// `{"Ref": logical_id}`
    Ref(LogicalId),
    /// `{"Fn::GetAtt": [logical_id, attribute]}`
    GetAtt { target: LogicalId, attribute: String },
    /// `{"Ref": "AWS::..."}`
    Pseudo(Pseudo),
    /// `{"Fn::Join": [delimiter, [parts...]]}`
    Join { delimiter: String, parts: Vec<Token> },
    /// `{"Fn::Sub": template}`
    Sub(String),
    List(Vec<Token>),
    Object(BTreeMap<String, Token>),
}

impl Token {
    pub fn get_att(target: &LogicalId, attribute: impl Into<String>) -> Self {
        Token::GetAtt {
            target: target.clone(),
            attribute: attribute.into(),
        }
    }

    /// Build an object from key/value pairs
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Token>,
        I: IntoIterator<Item = (K, V)>,
    {
        Token::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Token>,
        I: IntoIterator<Item = V>,
    {
        Token::List(items.into_iter().map(Into::into).collect())
    }

    /// Join parts with a delimiter
    ///
    /// Nested joins with the same delimiter are flattened and adjacent
    /// literal strings are merged. If nothing late-bound remains the result
    /// is a plain literal string.
    pub fn join(delimiter: impl Into<String>, parts: Vec<Token>) -> Self {
        let delimiter = delimiter.into();
        let mut flat: Vec<Token> = Vec::with_capacity(parts.len());

        for part in parts {
            match part {
                Token::Join {
                    delimiter: inner,
                    parts: inner_parts,
                } if inner == delimiter => flat.extend(inner_parts),
                other => flat.push(other),
            }
        }

        let mut merged: Vec<Token> = Vec::with_capacity(flat.len());
        for part in flat {
            let joined = match (merged.last(), part.as_str()) {
                (Some(last), Some(next)) => last
                    .as_str()
                    .map(|prev| format!("{prev}{delimiter}{next}")),
                _ => None,
            };
            match joined {
                Some(s) => {
                    merged.pop();
                    merged.push(Token::from(s));
                }
                None => merged.push(part),
            }
        }

        if merged.is_empty() {
            return Token::from("");
        }
        if merged.len() == 1 && merged[0].as_str().is_some() {
            return merged.remove(0);
        }
        Token::Join {
            delimiter,
            parts: merged,
        }
    }

    /// Concatenate two values without a delimiter
    pub fn concat(self, suffix: impl Into<Token>) -> Self {
        Token::join("", vec![self, suffix.into()])
    }

    /// The value as a literal string, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::Literal(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Whether the value needs the provisioning engine to resolve
    pub fn is_unresolved(&self) -> bool {
        match self {
            Token::Literal(_) => false,
            Token::List(items) => items.iter().any(Token::is_unresolved),
            Token::Object(map) => map.values().any(Token::is_unresolved),
            _ => true,
        }
    }

    /// Logical IDs of every resource this value refers to
    pub fn references(&self) -> BTreeSet<LogicalId> {
        let mut out = BTreeSet::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut BTreeSet<LogicalId>) {
        match self {
            Token::Literal(_) | Token::Pseudo(_) => {}
            Token::Ref(id) => {
                out.insert(id.clone());
            }
            Token::GetAtt { target, .. } => {
                out.insert(target.clone());
            }
            Token::Join { parts, .. } | Token::List(parts) => {
                for part in parts {
                    part.collect_references(out);
                }
            }
            Token::Sub(template) => out.extend(sub_references(template)),
            Token::Object(map) => {
                for value in map.values() {
                    value.collect_references(out);
                }
            }
        }
    }

    /// Point every reference to `from` at `to` instead
    pub fn rename_reference(&mut self, from: &LogicalId, to: &LogicalId) {
        match self {
            Token::Literal(_) | Token::Pseudo(_) => {}
            Token::Ref(id) | Token::GetAtt { target: id, .. } => {
                if id == from {
                    *id = to.clone();
                }
            }
            Token::Join { parts, .. } | Token::List(parts) => {
                for part in parts {
                    part.rename_reference(from, to);
                }
            }
            Token::Sub(template) => {
                *template = template
                    .replace(&format!("${{{from}}}"), &format!("${{{to}}}"))
                    .replace(&format!("${{{from}."), &format!("${{{to}."));
            }
            Token::Object(map) => {
                for value in map.values_mut() {
                    value.rename_reference(from, to);
                }
            }
        }
    }

    /// Render to template JSON
    pub fn to_json(&self) -> Value {
        match self {
            Token::Literal(v) => v.clone(),
            Token::Ref(id) => json!({ "Ref": id.as_str() }),
            Token::GetAtt { target, attribute } => {
                json!({ "Fn::GetAtt": [target.as_str(), attribute] })
            }
            Token::Pseudo(p) => json!({ "Ref": p.name() }),
            Token::Join { delimiter, parts } => {
                let parts: Vec<Value> = parts.iter().map(Token::to_json).collect();
                json!({ "Fn::Join": [delimiter, parts] })
            }
            Token::Sub(template) => json!({ "Fn::Sub": template }),
            Token::List(items) => Value::Array(items.iter().map(Token::to_json).collect()),
            Token::Object(map) => {
                let mut out = Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                Value::Object(out)
            }
        }
    }
}

/// Resource references inside a `Fn::Sub` template (`${Id}` or `${Id.Attr}`)
fn sub_references(template: &str) -> BTreeSet<LogicalId> {
    let mut out = BTreeSet::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else { break };
        let name = &after[..end];
        // `${!Literal}` escapes, `${AWS::...}` are pseudo parameters
        if !name.starts_with('!') && !name.contains("::") {
            let id = name.split('.').next().unwrap_or(name);
            if !id.is_empty() {
                out.insert(LogicalId::new(id));
            }
        }
        rest = &after[end + 1..];
    }
    out
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::Literal(Value::String(s.to_string()))
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::Literal(Value::String(s))
    }
}

impl From<&String> for Token {
    fn from(s: &String) -> Self {
        Token::from(s.as_str())
    }
}

impl From<bool> for Token {
    fn from(b: bool) -> Self {
        Token::Literal(Value::Bool(b))
    }
}

impl From<u32> for Token {
    fn from(n: u32) -> Self {
        Token::Literal(Value::from(n))
    }
}

impl From<Value> for Token {
    fn from(v: Value) -> Self {
        Token::Literal(v)
    }
}

impl From<Pseudo> for Token {
    fn from(p: Pseudo) -> Self {
        Token::Pseudo(p)
    }
}

impl From<&Token> for Token {
    fn from(t: &Token) -> Self {
        t.clone()
    }
}

impl From<Vec<Token>> for Token {
    fn from(items: Vec<Token>) -> Self {
        Token::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_of_literals_collapses() {
        let t = Token::join("-", vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(t.as_str(), Some("a-b-c"));
    }

    #[test]
    fn test_concat_merges_trailing_literal() {
        let api = LogicalId::new("ProductsApi");
        let url = Token::join(
            "",
            vec!["https://".into(), Token::Ref(api), ".execute-api/".into()],
        );
        let out = url.concat("products");

        match &out {
            Token::Join { parts, .. } => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[2].as_str(), Some(".execute-api/products"));
            }
            other => panic!("expected join, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_join_flattens() {
        let inner = Token::join("", vec![Token::Pseudo(Pseudo::Region), ".".into()]);
        let outer = Token::join("", vec!["x.".into(), inner, "y".into()]);
        assert_eq!(
            outer.to_json(),
            json!({ "Fn::Join": ["", ["x.", { "Ref": "AWS::Region" }, ".y"]] })
        );
    }

    #[test]
    fn test_references_walk_the_tree() {
        let table = LogicalId::new("Products");
        let role = LogicalId::new("Role1234");
        let t = Token::object([
            ("Table", Token::Ref(table.clone())),
            (
                "Nested",
                Token::list([Token::get_att(&role, "Arn"), Token::from("lit")]),
            ),
        ]);
        let refs = t.references();
        assert!(refs.contains(&table));
        assert!(refs.contains(&role));
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_sub_references_skip_pseudo_and_escapes() {
        let refs = sub_references("arn:${AWS::Partition}:${Fn1.Arn}/${!Literal}/${Api}");
        let ids: Vec<&str> = refs.iter().map(LogicalId::as_str).collect();
        assert_eq!(ids, vec!["Api", "Fn1"]);
    }

    #[test]
    fn test_rename_reference() {
        let old = LogicalId::new("Deployment1");
        let new = LogicalId::new("Deployment2");
        let mut t = Token::object([
            ("Id", Token::Ref(old.clone())),
            ("Arn", Token::list([Token::get_att(&old, "Arn")])),
            ("Sub", Token::Sub("${Deployment1}/${Deployment1.Arn}/${Deployment10}".into())),
        ]);
        t.rename_reference(&old, &new);

        let refs = t.references();
        assert!(!refs.contains(&old));
        assert!(refs.contains(&new));
        assert_eq!(
            t.to_json()["Sub"]["Fn::Sub"],
            "${Deployment2}/${Deployment2.Arn}/${Deployment10}"
        );
        assert_eq!(t.to_json()["Id"], json!({ "Ref": "Deployment2" }));
    }

    #[test]
    fn test_is_unresolved() {
        assert!(!Token::from("x").is_unresolved());
        assert!(Token::Pseudo(Pseudo::AccountId).is_unresolved());
        assert!(Token::object([("k", Token::Pseudo(Pseudo::Region))]).is_unresolved());
    }
}
