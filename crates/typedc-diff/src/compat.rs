//! Type widening relation.
//!
//! [`is_assignable`] answers "is every value of `sub` also a value of
//! `sup`?" for the structural shapes in [`TypeDescriptor`]. Whenever it
//! cannot prove assignability it answers `false`, so an unclassifiable
//! change is reported as breaking.

use typedc_types::{DeclarationKind, DeclarationNode, TypeDescriptor};

/// Generic references whose type arguments are only ever produced, never
/// consumed, so their arguments may vary covariantly.
const COVARIANT_REFERENCES: &[&str] = &[
    "Promise",
    "PromiseLike",
    "ReadonlyArray",
    "Readonly",
    "Iterable",
    "AsyncIterable",
    "IterableIterator",
];

/// Returns `true` if every value of `sub` is provably a value of `sup`.
pub fn is_assignable(sub: &TypeDescriptor, sup: &TypeDescriptor) -> bool {
    use TypeDescriptor as T;

    if sub == sup || sup.is_top() || sub.is_intrinsic("never") {
        return true;
    }

    match (sub, sup) {
        (T::Union(members), _) => members.iter().all(|m| is_assignable(m, sup)),
        (_, T::Union(members)) => members.iter().any(|m| is_assignable(sub, m)),
        (_, T::Intersection(members)) => members.iter().all(|m| is_assignable(sub, m)),
        (T::Intersection(members), _) => members.iter().any(|m| is_assignable(m, sup)),
        (T::Literal(_), T::Intrinsic(name)) => sub
            .literal_family()
            .is_some_and(|family| name.as_str() == family.intrinsic_name()),
        (T::Array(a), T::Array(b)) => is_assignable(a, b),
        (T::Tuple(elements), T::Array(b)) => elements.iter().all(|e| is_assignable(e, b)),
        (T::Tuple(a), T::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_assignable(x, y))
        }
        (
            T::Function {
                parameters: sub_params,
                returns: sub_ret,
            },
            T::Function {
                parameters: sup_params,
                returns: sup_ret,
            },
        ) => {
            let params_ok = sub_params.iter().enumerate().all(|(i, p)| match sup_params.get(i) {
                // Parameters are contravariant.
                Some(q) => is_assignable(&q.ty, &p.ty),
                None => p.optional || p.rest,
            });
            let returns_ok = sup_ret.is_intrinsic("void") || is_assignable(sub_ret, sup_ret);
            params_ok && returns_ok
        }
        (T::Object { members: sub_members }, T::Object { members: sup_members }) => {
            sup_members.iter().all(|want| {
                match sub_members.iter().find(|have| have.name == want.name) {
                    Some(have) => {
                        (want.optional || !have.optional) && is_assignable(&have.ty, &want.ty)
                    }
                    None => want.optional,
                }
            })
        }
        (
            T::Operator {
                operator: op_a,
                target: a,
            },
            T::Operator {
                operator: op_b,
                target: b,
            },
        ) => op_a == op_b && op_a == "readonly" && is_assignable(a, b),
        (
            T::Reference {
                name: name_a,
                arguments: args_a,
            },
            T::Reference {
                name: name_b,
                arguments: args_b,
            },
        ) => {
            name_a == name_b
                && COVARIANT_REFERENCES.contains(&name_a.as_str())
                && args_a.len() == args_b.len()
                && args_a.iter().zip(args_b).all(|(x, y)| is_assignable(x, y))
        }
        _ => false,
    }
}

/// Direction of a type change between two versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeChange {
    Unchanged,
    /// The new type accepts every old value and possibly more.
    Widened,
    /// The old type accepts every new value, but not the reverse.
    Narrowed,
    /// Neither side provably contains the other.
    Incompatible,
}

/// Classify a change from `old` to `new`.
pub fn classify_change(old: &TypeDescriptor, new: &TypeDescriptor) -> TypeChange {
    if old == new {
        TypeChange::Unchanged
    } else if is_assignable(old, new) {
        TypeChange::Widened
    } else if is_assignable(new, old) {
        TypeChange::Narrowed
    } else {
        TypeChange::Incompatible
    }
}

/// Which side of the API boundary produces values of a node's type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variance {
    /// Consumers pass values in: widening is safe.
    Input,
    /// The library hands values out: narrowing is safe.
    Output,
}

/// Variance position of a node's type, or `None` for kinds without rules.
pub fn variance_of(node: &DeclarationNode) -> Option<Variance> {
    match node.kind {
        DeclarationKind::CallSignature
        | DeclarationKind::ConstructorSignature
        | DeclarationKind::GetSignature
        | DeclarationKind::IndexSignature => Some(Variance::Output),
        DeclarationKind::Property | DeclarationKind::Variable
            if node.flags.readonly || node.flags.is_const =>
        {
            Some(Variance::Output)
        }
        DeclarationKind::Unknown(_) => None,
        _ => Some(Variance::Input),
    }
}
