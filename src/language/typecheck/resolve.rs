use super::scopes::ScopeChain;
use crate::language::types::TypeExpr;

/// Resolves a type expression to a canonical structural type: the result
/// never contains a `Named` reference. Resolution is total; a name with no
/// alias in the chain degrades to `any` instead of failing.
pub fn resolve_type(ty: &TypeExpr, scopes: &ScopeChain) -> TypeExpr {
    let mut cycle = false;
    resolve_guarded(ty, scopes, &mut cycle)
}

/// Like [`resolve_type`], but reports back whether resolution re-entered an
/// alias that was already being resolved. The binder uses this to diagnose
/// circular aliases; the reference that closes the cycle resolves to `any`.
pub(super) fn resolve_guarded(ty: &TypeExpr, scopes: &ScopeChain, cycle: &mut bool) -> TypeExpr {
    let mut visiting = Vec::new();
    resolve_inner(ty, scopes, &mut visiting, cycle)
}

fn resolve_inner(
    ty: &TypeExpr,
    scopes: &ScopeChain,
    visiting: &mut Vec<String>,
    cycle: &mut bool,
) -> TypeExpr {
    match ty {
        TypeExpr::Prim(prim) => TypeExpr::Prim(*prim),
        TypeExpr::Named(name) => {
            if visiting.iter().any(|n| n == name) {
                *cycle = true;
                return TypeExpr::any();
            }
            let alias = scopes.lookup(name).and_then(|symbol| symbol.alias.clone());
            match alias {
                Some(alias) => {
                    visiting.push(name.clone());
                    let resolved = resolve_inner(&alias, scopes, visiting, cycle);
                    visiting.pop();
                    resolved
                }
                None => TypeExpr::any(),
            }
        }
        TypeExpr::Function { params, ret } => TypeExpr::Function {
            params: params
                .iter()
                .map(|param| resolve_inner(param, scopes, visiting, cycle))
                .collect(),
            ret: Box::new(resolve_inner(ret, scopes, visiting, cycle)),
        },
        TypeExpr::Union(members) => TypeExpr::Union(
            members
                .iter()
                .map(|member| resolve_inner(member, scopes, visiting, cycle))
                .collect(),
        ),
        TypeExpr::Object(props) => TypeExpr::Object(
            props
                .iter()
                .map(|(name, ty)| (name.clone(), resolve_inner(ty, scopes, visiting, cycle)))
                .collect(),
        ),
        TypeExpr::Array(elem) => {
            TypeExpr::Array(Box::new(resolve_inner(elem, scopes, visiting, cycle)))
        }
    }
}
