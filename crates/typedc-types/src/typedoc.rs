//! Loader for TypeDoc JSON output.
//!
//! Converts the generator's reflection tree into [`DeclarationNode`]s. The
//! several arrays TypeDoc uses for nested reflections (`children`,
//! `signatures`, `parameters`, accessor signatures, ...) are folded into a
//! single ordered `children` list.
//!
//! The conversion recurses over an already-parsed [`Value`]; `serde_json`
//! refuses documents nested deeper than its recursion limit, which bounds
//! the depth here too.

use serde_json::{Map, Value};

use crate::declaration::{DeclarationNode, Flags, SourceRef, Visibility};
use crate::error::{TypeError, TypeResult};
use crate::kind::DeclarationKind;
use crate::type_desc::{FunctionParam, ObjectMember, TypeDescriptor};

/// Keys that nest further reflections, in the order their entries are
/// appended to `children`.
const NESTED_KEYS: &[&str] = &[
    "children",
    "signatures",
    "indexSignature",
    "indexSignatures",
    "getSignature",
    "setSignature",
    "parameters",
    "typeParameter",
    "typeParameters",
];

/// Keys that differ between two runs of the generator over the same API.
const VOLATILE_KEYS: &[&str] = &["id", "target", "sources", "comment", "url", "package"];

/// Parse a TypeDoc JSON document into a declaration tree.
pub fn load_declarations(json: &str) -> TypeResult<DeclarationNode> {
    let value: Value = serde_json::from_str(json)?;
    declaration_from_value(&value)
}

/// Convert an already-parsed TypeDoc JSON value into a declaration tree.
pub fn declaration_from_value(value: &Value) -> TypeResult<DeclarationNode> {
    node_from_value(value, "$")
}

fn node_from_value(value: &Value, at: &str) -> TypeResult<DeclarationNode> {
    let obj = value.as_object().ok_or_else(|| TypeError::InvalidTree {
        path: at.to_string(),
        reason: "declaration must be a JSON object".into(),
    })?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| TypeError::InvalidTree {
            path: at.to_string(),
            reason: "missing string field `name`".into(),
        })?;
    let here = format!("{at}.{name}");

    let kind = parse_kind(obj).ok_or_else(|| TypeError::InvalidTree {
        path: here.clone(),
        reason: "missing `kindString` or numeric `kind`".into(),
    })?;

    let mut node = DeclarationNode::new(name, kind);
    node.flags = parse_flags(obj.get("flags"));
    node.type_descriptor = obj.get("type").map(type_from_value);
    node.default_value = obj
        .get("defaultValue")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(sources) = obj.get("sources") {
        node.sources = serde_json::from_value::<Vec<SourceRef>>(sources.clone())?;
    }

    for key in NESTED_KEYS {
        match obj.get(*key) {
            Some(Value::Array(items)) => {
                for item in items {
                    node.children.push(node_from_value(item, &here)?);
                }
            }
            Some(item @ Value::Object(_)) => {
                node.children.push(node_from_value(item, &here)?);
            }
            Some(Value::Null) | None => {}
            Some(_) => {
                return Err(TypeError::InvalidTree {
                    path: here,
                    reason: format!("`{key}` must be an object or an array"),
                });
            }
        }
    }

    Ok(node)
}

fn parse_kind(obj: &Map<String, Value>) -> Option<DeclarationKind> {
    if let Some(label) = obj.get("kindString").and_then(Value::as_str) {
        return Some(DeclarationKind::from_label(label));
    }
    obj.get("kind")
        .and_then(Value::as_u64)
        .map(DeclarationKind::from_bits)
}

fn flag(flags: &Map<String, Value>, key: &str) -> bool {
    flags.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn parse_flags(value: Option<&Value>) -> Flags {
    let Some(flags) = value.and_then(Value::as_object) else {
        return Flags::default();
    };

    let visibility = if flag(flags, "isPrivate") {
        Visibility::Private
    } else if flag(flags, "isProtected") {
        Visibility::Protected
    } else {
        Visibility::Public
    };

    Flags {
        visibility,
        optional: flag(flags, "isOptional"),
        readonly: flag(flags, "isReadonly"),
        is_static: flag(flags, "isStatic"),
        is_abstract: flag(flags, "isAbstract"),
        rest: flag(flags, "isRest"),
        is_const: flag(flags, "isConst"),
    }
}

fn types_from(value: Option<&Value>) -> Vec<TypeDescriptor> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(type_from_value).collect())
        .unwrap_or_default()
}

fn boxed_type(value: Option<&Value>) -> Box<TypeDescriptor> {
    Box::new(value.map(type_from_value).unwrap_or_else(|| TypeDescriptor::intrinsic("unknown")))
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Convert a TypeDoc type node into a [`TypeDescriptor`].
///
/// Shapes without a structural mapping become [`TypeDescriptor::Opaque`]
/// holding canonical JSON with generator-specific ids stripped.
pub fn type_from_value(value: &Value) -> TypeDescriptor {
    let Some(obj) = value.as_object() else {
        return TypeDescriptor::Opaque(value.to_string());
    };

    match str_field(obj, "type") {
        "intrinsic" => TypeDescriptor::intrinsic(str_field(obj, "name")),
        "reference" => {
            let name = str_field(obj, "name");
            let refers_to_param = obj
                .get("refersToTypeParameter")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if refers_to_param {
                TypeDescriptor::TypeParameter(name.to_string())
            } else {
                TypeDescriptor::Reference {
                    name: name.to_string(),
                    arguments: types_from(obj.get("typeArguments")),
                }
            }
        }
        "typeParameter" => TypeDescriptor::TypeParameter(str_field(obj, "name").to_string()),
        "union" => TypeDescriptor::union(types_from(obj.get("types"))),
        "intersection" => TypeDescriptor::intersection(types_from(obj.get("types"))),
        "array" => TypeDescriptor::Array(boxed_type(obj.get("elementType"))),
        "tuple" => {
            let elements = obj.get("elements").or_else(|| obj.get("elementTypes"));
            TypeDescriptor::Tuple(types_from(elements))
        }
        "stringLiteral" => TypeDescriptor::string_literal(str_field(obj, "value")),
        "literal" => literal_from(obj.get("value")),
        "typeOperator" => TypeDescriptor::Operator {
            operator: str_field(obj, "operator").to_string(),
            target: boxed_type(obj.get("target")),
        },
        "query" => TypeDescriptor::Operator {
            operator: "typeof".into(),
            target: boxed_type(obj.get("queryType")),
        },
        "reflection" => match obj.get("declaration") {
            Some(declaration) => reflection_type(declaration),
            None => TypeDescriptor::Object {
                members: Vec::new(),
            },
        },
        _ => TypeDescriptor::Opaque(canonical_json(value).to_string()),
    }
}

fn literal_from(value: Option<&Value>) -> TypeDescriptor {
    match value {
        Some(Value::String(s)) => TypeDescriptor::string_literal(s),
        Some(Value::Number(n)) => TypeDescriptor::Literal(n.to_string()),
        Some(Value::Bool(b)) => TypeDescriptor::Literal(b.to_string()),
        Some(Value::Object(big)) => {
            // bigint literals: { "value": "123", "negative": true }
            let digits = str_field(big, "value");
            let sign = if big.get("negative").and_then(Value::as_bool).unwrap_or(false) {
                "-"
            } else {
                ""
            };
            TypeDescriptor::Literal(format!("{sign}{digits}n"))
        }
        Some(Value::Null) | None => TypeDescriptor::Literal("null".into()),
        Some(other) => TypeDescriptor::Opaque(other.to_string()),
    }
}

/// Inline `{ ... }` or function types arrive as anonymous reflections.
fn reflection_type(declaration: &Value) -> TypeDescriptor {
    let Some(decl) = declaration.as_object() else {
        return TypeDescriptor::Opaque(declaration.to_string());
    };

    let signatures: Vec<TypeDescriptor> = decl
        .get("signatures")
        .and_then(Value::as_array)
        .map(|sigs| sigs.iter().map(signature_type).collect())
        .unwrap_or_default();
    if !signatures.is_empty() {
        return TypeDescriptor::intersection(signatures);
    }

    let mut members: Vec<ObjectMember> = decl
        .get("children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter_map(Value::as_object)
                .map(|child| ObjectMember {
                    name: str_field(child, "name").to_string(),
                    ty: child
                        .get("type")
                        .map(type_from_value)
                        .unwrap_or_else(|| TypeDescriptor::intrinsic("any")),
                    optional: child
                        .get("flags")
                        .and_then(Value::as_object)
                        .is_some_and(|f| flag(f, "isOptional")),
                })
                .collect()
        })
        .unwrap_or_default();

    let index_signatures = decl
        .get("indexSignature")
        .or_else(|| decl.get("indexSignatures"));
    let index_list: Vec<&Value> = match index_signatures {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    };
    for index in index_list.into_iter().filter_map(Value::as_object) {
        let key = index
            .get("parameters")
            .and_then(Value::as_array)
            .and_then(|p| p.first())
            .and_then(Value::as_object);
        let key_name = key.map(|k| str_field(k, "name")).unwrap_or("key");
        let key_type = key
            .and_then(|k| k.get("type"))
            .map(type_from_value)
            .unwrap_or_else(|| TypeDescriptor::intrinsic("string"));
        members.push(ObjectMember {
            name: format!("[{key_name}: {key_type}]"),
            ty: index
                .get("type")
                .map(type_from_value)
                .unwrap_or_else(|| TypeDescriptor::intrinsic("any")),
            optional: false,
        });
    }

    members.sort();
    TypeDescriptor::Object { members }
}

fn signature_type(signature: &Value) -> TypeDescriptor {
    let Some(sig) = signature.as_object() else {
        return TypeDescriptor::Opaque(signature.to_string());
    };

    let parameters = sig
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| {
            params
                .iter()
                .filter_map(Value::as_object)
                .map(|param| {
                    let flags = param.get("flags").and_then(Value::as_object);
                    FunctionParam {
                        name: str_field(param, "name").to_string(),
                        ty: param
                            .get("type")
                            .map(type_from_value)
                            .unwrap_or_else(|| TypeDescriptor::intrinsic("any")),
                        optional: flags.is_some_and(|f| flag(f, "isOptional"))
                            || param.contains_key("defaultValue"),
                        rest: flags.is_some_and(|f| flag(f, "isRest")),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    TypeDescriptor::Function {
        parameters,
        returns: Box::new(
            sig.get("type")
                .map(type_from_value)
                .unwrap_or_else(|| TypeDescriptor::intrinsic("void")),
        ),
    }
}

/// Strip volatile keys so that equal shapes compare equal across runs.
fn canonical_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !VOLATILE_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), canonical_json(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(canonical_json).collect()),
        other => other.clone(),
    }
}
