//! Structural type descriptors.
//!
//! A [`TypeDescriptor`] is a comparable, order-normalised rendering of a
//! declaration's type. Unions and intersections are sorted and deduplicated
//! on construction, so derived equality is insensitive to member order.

use std::fmt;

/// Structural description of a declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeDescriptor {
    /// Built-in type: `string`, `number`, `void`, `any`, ...
    Intrinsic(String),
    /// Literal type. String literals keep their quotes (`"small"`).
    Literal(String),
    /// Named reference to another declared type, with type arguments.
    Reference {
        name: String,
        arguments: Vec<TypeDescriptor>,
    },
    /// Reference to a type parameter in scope (`T`).
    TypeParameter(String),
    Union(Vec<TypeDescriptor>),
    Intersection(Vec<TypeDescriptor>),
    Array(Box<TypeDescriptor>),
    Tuple(Vec<TypeDescriptor>),
    /// Inline function type.
    Function {
        parameters: Vec<FunctionParam>,
        returns: Box<TypeDescriptor>,
    },
    /// Inline object type.
    Object { members: Vec<ObjectMember> },
    /// Type operator such as `keyof T` or `readonly T[]`.
    Operator {
        operator: String,
        target: Box<TypeDescriptor>,
    },
    /// Any other shape, kept as canonical text. Only equality is defined.
    Opaque(String),
}

/// A parameter of an inline function type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionParam {
    pub name: String,
    pub ty: TypeDescriptor,
    pub optional: bool,
    pub rest: bool,
}

/// A member of an inline object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectMember {
    pub name: String,
    pub ty: TypeDescriptor,
    pub optional: bool,
}

/// Family of a literal type, used to relate literals to their intrinsic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralFamily {
    String,
    Number,
    Boolean,
    BigInt,
    Null,
    Undefined,
}

impl TypeDescriptor {
    pub fn intrinsic(name: impl Into<String>) -> Self {
        Self::Intrinsic(name.into())
    }

    /// A reference with no type arguments.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// A string literal type; the value is quoted for display.
    pub fn string_literal(value: &str) -> Self {
        Self::Literal(format!("{value:?}"))
    }

    /// Build a union, flattening nested unions and normalising member order.
    ///
    /// A union with a single distinct member collapses to that member.
    pub fn union(members: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Self::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::Union(flat)
        }
    }

    /// Build an intersection, flattening and normalising like [`Self::union`].
    pub fn intersection(members: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Self::Intersection(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::Intersection(flat)
        }
    }

    pub fn array(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    /// Returns `true` for the intrinsic with the given name.
    pub fn is_intrinsic(&self, name: &str) -> bool {
        matches!(self, Self::Intrinsic(n) if n == name)
    }

    /// Top types accept every value.
    pub fn is_top(&self) -> bool {
        self.is_intrinsic("any") || self.is_intrinsic("unknown")
    }

    /// Family of a literal type, or `None` for non-literals.
    pub fn literal_family(&self) -> Option<LiteralFamily> {
        let Self::Literal(text) = self else {
            return None;
        };
        if text.starts_with('"') {
            Some(LiteralFamily::String)
        } else if text == "true" || text == "false" {
            Some(LiteralFamily::Boolean)
        } else if text == "null" {
            Some(LiteralFamily::Null)
        } else if text == "undefined" {
            Some(LiteralFamily::Undefined)
        } else if text.ends_with('n') && text[..text.len() - 1].parse::<i128>().is_ok() {
            Some(LiteralFamily::BigInt)
        } else if text.parse::<f64>().is_ok() {
            Some(LiteralFamily::Number)
        } else {
            None
        }
    }
}

impl LiteralFamily {
    /// The intrinsic every literal of this family is assignable to.
    pub fn intrinsic_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::BigInt => "bigint",
            Self::Null => "null",
            Self::Undefined => "undefined",
        }
    }
}

fn needs_parens(ty: &TypeDescriptor) -> bool {
    matches!(
        ty,
        TypeDescriptor::Union(_) | TypeDescriptor::Intersection(_) | TypeDescriptor::Function { .. }
    )
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    items: &[TypeDescriptor],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        if needs_parens(item) {
            write!(f, "({item})")?;
        } else {
            write!(f, "{item}")?;
        }
    }
    Ok(())
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intrinsic(name) | Self::TypeParameter(name) => f.write_str(name),
            Self::Literal(text) | Self::Opaque(text) => f.write_str(text),
            Self::Reference { name, arguments } => {
                f.write_str(name)?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Union(members) => write_joined(f, members, " | "),
            Self::Intersection(members) => write_joined(f, members, " & "),
            Self::Array(element) => {
                if needs_parens(element) {
                    write!(f, "({element})[]")
                } else {
                    write!(f, "{element}[]")
                }
            }
            Self::Tuple(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Self::Function {
                parameters,
                returns,
            } => {
                f.write_str("(")?;
                for (i, param) in parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    let rest = if param.rest { "..." } else { "" };
                    let optional = if param.optional { "?" } else { "" };
                    write!(f, "{rest}{}{optional}: {}", param.name, param.ty)?;
                }
                write!(f, ") => {returns}")
            }
            Self::Object { members } => {
                if members.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    let optional = if member.optional { "?" } else { "" };
                    write!(f, "{}{optional}: {}", member.name, member.ty)?;
                }
                f.write_str(" }")
            }
            Self::Operator { operator, target } => write!(f, "{operator} {target}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn s() -> TypeDescriptor {
        TypeDescriptor::intrinsic("string")
    }

    fn n() -> TypeDescriptor {
        TypeDescriptor::intrinsic("number")
    }

    #[test]
    fn union_equality_ignores_order() {
        assert_eq!(
            TypeDescriptor::union([s(), n()]),
            TypeDescriptor::union([n(), s()])
        );
    }

    #[test]
    fn union_flattens_and_collapses() {
        let nested = TypeDescriptor::union([s(), TypeDescriptor::union([n(), s()])]);
        assert_eq!(nested, TypeDescriptor::union([s(), n()]));
        assert_eq!(TypeDescriptor::union([s(), s()]), s());
    }

    #[test]
    fn display_renders_typescript_syntax() {
        let ty = TypeDescriptor::Function {
            parameters: vec![
                FunctionParam {
                    name: "value".into(),
                    ty: TypeDescriptor::union([s(), n()]),
                    optional: true,
                    rest: false,
                },
                FunctionParam {
                    name: "rest".into(),
                    ty: TypeDescriptor::array(s()),
                    optional: false,
                    rest: true,
                },
            ],
            returns: Box::new(TypeDescriptor::intrinsic("void")),
        };
        assert_eq!(ty.to_string(), "(value?: number | string, ...rest: string[]) => void");

        let generic = TypeDescriptor::Reference {
            name: "Map".into(),
            arguments: vec![s(), TypeDescriptor::array(TypeDescriptor::union([s(), n()]))],
        };
        assert_eq!(generic.to_string(), "Map<string, (number | string)[]>");
    }

    #[test]
    fn display_object_and_literal() {
        let obj = TypeDescriptor::Object {
            members: vec![ObjectMember {
                name: "size".into(),
                ty: TypeDescriptor::string_literal("small"),
                optional: true,
            }],
        };
        assert_eq!(obj.to_string(), "{ size?: \"small\" }");
    }

    #[test]
    fn literal_families() {
        assert_eq!(
            TypeDescriptor::string_literal("a").literal_family(),
            Some(LiteralFamily::String)
        );
        assert_eq!(
            TypeDescriptor::Literal("42".into()).literal_family(),
            Some(LiteralFamily::Number)
        );
        assert_eq!(
            TypeDescriptor::Literal("10n".into()).literal_family(),
            Some(LiteralFamily::BigInt)
        );
        assert_eq!(
            TypeDescriptor::Literal("false".into()).literal_family(),
            Some(LiteralFamily::Boolean)
        );
        assert_eq!(s().literal_family(), None);
    }

    fn arb_member() -> impl Strategy<Value = TypeDescriptor> {
        prop_oneof![
            prop_oneof![Just("string"), Just("number"), Just("boolean")]
                .prop_map(|name| TypeDescriptor::intrinsic(name)),
            "[a-z]{1,4}".prop_map(|v| TypeDescriptor::string_literal(&v)),
            "[A-Z][a-z]{0,4}".prop_map(|name| TypeDescriptor::reference(name)),
        ]
    }

    proptest! {
        #[test]
        fn union_ignores_member_order(
            (members, shuffled) in prop::collection::vec(arb_member(), 1..6)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let a = TypeDescriptor::union(members.clone());
            let b = TypeDescriptor::union(shuffled.clone());
            prop_assert_eq!(a.to_string(), b.to_string());
            prop_assert_eq!(a, b);
            prop_assert_eq!(
                TypeDescriptor::intersection(members),
                TypeDescriptor::intersection(shuffled)
            );
        }

        #[test]
        fn nested_union_flattens(
            left in prop::collection::vec(arb_member(), 1..4),
            right in prop::collection::vec(arb_member(), 1..4),
        ) {
            let nested = TypeDescriptor::union([
                TypeDescriptor::union(left.clone()),
                TypeDescriptor::union(right.clone()),
            ]);
            let flat = TypeDescriptor::union(left.into_iter().chain(right));
            prop_assert_eq!(nested, flat);
        }
    }
}
