use super::{
    resolve::{resolve_guarded, resolve_type},
    scopes::ScopeChain,
    Diagnostics,
};
use crate::language::{ast::Statement, types::TypeExpr};

/// Populates the innermost scope for one lexical block before any of its
/// statements are checked. The pass order is load-bearing: aliases first,
/// then alias roots resolved, then `var` placeholders, then `function`
/// signatures, so every hoisted declaration is visible to forward
/// references across declaration kinds. `let` and `const` are deliberately
/// absent: their symbols appear only when the checker reaches them.
pub fn bind(statements: &[Statement], scopes: &mut ScopeChain, diagnostics: &mut Diagnostics) {
    bind_type_aliases(statements, scopes, diagnostics);
    resolve_alias_roots(statements, scopes, diagnostics);
    bind_vars(statements, scopes);
    bind_functions(statements, scopes);
}

fn bind_type_aliases(
    statements: &[Statement],
    scopes: &mut ScopeChain,
    diagnostics: &mut Diagnostics,
) {
    for statement in statements {
        let Statement::TypeAlias(alias) = statement else {
            continue;
        };
        let Some(scope) = scopes.current_mut() else {
            continue;
        };
        let symbol = scope.entry(&alias.name.name);
        if symbol.alias.is_some() {
            // First declaration wins.
            diagnostics.error(
                alias.name.span,
                format!("cannot redeclare type `{}`", alias.name.name),
            );
        } else {
            symbol.alias = Some(alias.ty.clone());
        }
    }
}

/// Second pass over the aliases just bound: every alias whose root is an
/// identifier reference is resolved now, so later lookups see canonical
/// structural types regardless of declaration order.
fn resolve_alias_roots(
    statements: &[Statement],
    scopes: &mut ScopeChain,
    diagnostics: &mut Diagnostics,
) {
    for statement in statements {
        let Statement::TypeAlias(alias) = statement else {
            continue;
        };
        let unresolved = scopes
            .current()
            .and_then(|scope| scope.get(&alias.name.name))
            .and_then(|symbol| symbol.alias.clone());
        let Some(ty @ TypeExpr::Named(_)) = unresolved else {
            continue;
        };
        let mut cycle = false;
        let resolved = resolve_guarded(&ty, scopes, &mut cycle);
        if cycle {
            diagnostics.error(
                alias.name.span,
                format!("circular type alias `{}`", alias.name.name),
            );
        }
        if let Some(scope) = scopes.current_mut() {
            scope.entry(&alias.name.name).alias = Some(resolved);
        }
    }
}

fn bind_vars(statements: &[Statement], scopes: &mut ScopeChain) {
    for statement in statements {
        let Statement::Var(var) = statement else {
            continue;
        };
        if let Some(scope) = scopes.current_mut() {
            // Placeholder only; the declared or inferred type replaces it
            // when the checker visits the statement.
            scope.entry(&var.name.name).value = Some(TypeExpr::undefined());
        }
    }
}

fn bind_functions(statements: &[Statement], scopes: &mut ScopeChain) {
    for statement in statements {
        let Statement::Function(decl) = statement else {
            continue;
        };
        let params = decl
            .params
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => resolve_type(ty, scopes),
                None => TypeExpr::any(),
            })
            .collect();
        let ret = match &decl.ret {
            Some(ty) => resolve_type(ty, scopes),
            None => TypeExpr::any(),
        };
        if let Some(scope) = scopes.current_mut() {
            scope.entry(&decl.name.name).value = Some(TypeExpr::Function {
                params,
                ret: Box::new(ret),
            });
        }
    }
}
