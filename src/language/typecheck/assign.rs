use crate::language::types::TypeExpr;

/// Structural compatibility: may a value of type `provided` be used where
/// `expected` is required? Both sides must already be resolved. The relation
/// is deliberately non-standard in four places and callers rely on each:
/// primitive tags compare exactly (`any` and `void` are not top types),
/// function parameters are covariant, union matching is existential on both
/// sides, and an object may omit properties the expected type declares as
/// long as every property it does have exists on the expected side.
pub fn is_assignable(provided: &TypeExpr, expected: &TypeExpr) -> bool {
    match expected {
        TypeExpr::Prim(expected_tag) => {
            matches!(provided, TypeExpr::Prim(tag) if tag == expected_tag)
        }
        TypeExpr::Union(members) => match provided {
            TypeExpr::Union(provided_members) => provided_members
                .iter()
                .any(|member| is_assignable(member, expected)),
            _ => members.iter().any(|member| is_assignable(provided, member)),
        },
        TypeExpr::Function {
            params: expected_params,
            ret: expected_ret,
        } => match provided {
            TypeExpr::Function { params, ret } => {
                params
                    .iter()
                    .zip(expected_params)
                    .all(|(param, expected_param)| is_assignable(param, expected_param))
                    && is_assignable(ret, expected_ret)
            }
            _ => false,
        },
        TypeExpr::Object(expected_props) => match provided {
            TypeExpr::Object(props) => props.iter().all(|(name, ty)| {
                expected_props
                    .iter()
                    .find(|(expected_name, _)| expected_name == name)
                    .map_or(false, |(_, expected_ty)| is_assignable(ty, expected_ty))
            }),
            _ => false,
        },
        TypeExpr::Array(expected_elem) => match provided {
            TypeExpr::Array(elem) => {
                is_assignable(elem, expected_elem) && is_assignable(expected_elem, elem)
            }
            _ => false,
        },
        // Unresolved references never reach this relation; nothing is
        // assignable to one.
        TypeExpr::Named(_) => false,
    }
}
