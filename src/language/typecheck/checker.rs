use super::{
    assign::is_assignable,
    binder::bind,
    resolve::resolve_type,
    scopes::{Scope, ScopeChain},
    Diagnostics,
};
use crate::language::{
    ast::{BinaryOp, Expr, Identifier, Module, Param, Statement, UnaryOp},
    span::Span,
    types::{Primitive, TypeExpr},
};

/// Checks a whole module. Returns the module's scope table (symbol types are
/// fully resolved afterwards) together with every diagnostic found in one
/// pass over the tree.
pub fn check_module(module: &Module) -> (Scope, Diagnostics) {
    let mut checker = Checker::new();
    let scope = checker.check(module);
    (scope, checker.diagnostics)
}

struct Checker {
    scopes: ScopeChain,
    diagnostics: Diagnostics,
}

impl Checker {
    fn new() -> Self {
        Self {
            scopes: ScopeChain::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn check(&mut self, module: &Module) -> Scope {
        self.scopes.push();
        bind(&module.statements, &mut self.scopes, &mut self.diagnostics);
        for statement in &module.statements {
            // There is no enclosing function at module level; `return`
            // statements check against `any`.
            self.check_statement(statement, &TypeExpr::any());
        }
        self.scopes.pop().unwrap_or_default()
    }

    fn check_statement(&mut self, statement: &Statement, return_type: &TypeExpr) {
        match statement {
            Statement::If(stmt) => {
                // The condition's type is unconstrained.
                self.check_expression(&stmt.cond);
                self.check_block(&stmt.then_branch, return_type);
                self.check_block(&stmt.else_branch, return_type);
            }
            Statement::While(stmt) => {
                self.check_expression(&stmt.cond);
                self.check_block(&stmt.body, return_type);
            }
            Statement::Return(stmt) => {
                let provided = self.check_expression(&stmt.value);
                if !is_assignable(&provided, return_type) {
                    self.diagnostics.error(
                        stmt.value.span(),
                        format!(
                            "type `{}` is not assignable to return type `{}`",
                            provided, return_type
                        ),
                    );
                }
            }
            Statement::Var(stmt) => {
                let declared = stmt.ty.as_ref().map(|ty| resolve_type(ty, &self.scopes));
                let inferred = stmt
                    .value
                    .as_ref()
                    .map(|value| (self.check_expression(value), value.span()));
                if let (Some(declared), Some((inferred, span))) = (&declared, &inferred) {
                    self.check_assignable(inferred, declared, *span);
                }
                let ty = declared
                    .or(inferred.map(|(ty, _)| ty))
                    .unwrap_or_else(TypeExpr::any);
                if let Some(scope) = self.scopes.current_mut() {
                    scope.entry(&stmt.name.name).value = Some(ty);
                }
            }
            Statement::Let(stmt) => {
                let redeclared = self
                    .scopes
                    .current()
                    .and_then(|scope| scope.get(&stmt.name.name))
                    .map_or(false, |symbol| symbol.value.is_some());
                if redeclared {
                    self.diagnostics.error(
                        stmt.name.span,
                        format!("cannot redeclare `{}`", stmt.name.name),
                    );
                }
                let declared = stmt.ty.as_ref().map(|ty| resolve_type(ty, &self.scopes));
                let inferred = stmt
                    .value
                    .as_ref()
                    .map(|value| (self.check_expression(value), value.span()));
                if let (Some(declared), Some((inferred, span))) = (&declared, &inferred) {
                    self.check_assignable(inferred, declared, *span);
                }
                if !redeclared {
                    let ty = declared
                        .or(inferred.map(|(ty, _)| ty))
                        .unwrap_or_else(TypeExpr::any);
                    if let Some(scope) = self.scopes.current_mut() {
                        scope.entry(&stmt.name.name).value = Some(ty);
                    }
                }
            }
            Statement::Const(stmt) => {
                let redeclared = self
                    .scopes
                    .current()
                    .and_then(|scope| scope.get(&stmt.name.name))
                    .map_or(false, |symbol| symbol.value.is_some());
                if redeclared {
                    self.diagnostics.error(
                        stmt.name.span,
                        format!("cannot redeclare `{}`", stmt.name.name),
                    );
                }
                let declared = stmt.ty.as_ref().map(|ty| resolve_type(ty, &self.scopes));
                let inferred = self.check_expression(&stmt.value);
                if let Some(declared) = &declared {
                    self.check_assignable(&inferred, declared, stmt.value.span());
                }
                if !redeclared {
                    let ty = declared.unwrap_or(inferred);
                    if let Some(scope) = self.scopes.current_mut() {
                        scope.entry(&stmt.name.name).value = Some(ty);
                    }
                }
            }
            Statement::Function(decl) => {
                // The symbol was bound with the other hoisted declarations;
                // only the body remains to be checked.
                self.check_function_body(&decl.params, &decl.ret, &decl.body);
            }
            Statement::TypeAlias(_) => {}
            Statement::Expr(stmt) => {
                self.check_expression(&stmt.expr);
            }
        }
    }

    fn check_block(&mut self, statements: &[Statement], return_type: &TypeExpr) {
        self.scopes.push();
        bind(statements, &mut self.scopes, &mut self.diagnostics);
        for statement in statements {
            self.check_statement(statement, return_type);
        }
        self.scopes.pop();
    }

    fn check_expression(&mut self, expr: &Expr) -> TypeExpr {
        match expr {
            Expr::Identifier(ident) => self.check_identifier(ident),
            Expr::Number(_, _) => TypeExpr::number(),
            Expr::True(_) | Expr::False(_) => TypeExpr::boolean(),
            Expr::Undefined(_) => TypeExpr::undefined(),
            Expr::This(_) => TypeExpr::Object(Vec::new()),
            Expr::Index { target, index, .. } => self.check_index(target, index),
            Expr::Binary { op, left, right, .. } => {
                self.check_expression(left);
                self.check_expression(right);
                match op {
                    BinaryOp::Add
                    | BinaryOp::Sub
                    | BinaryOp::Mul
                    | BinaryOp::Div
                    | BinaryOp::BitAnd
                    | BinaryOp::BitOr => TypeExpr::number(),
                    BinaryOp::Lt
                    | BinaryOp::Gt
                    | BinaryOp::Eq
                    | BinaryOp::StrictEq
                    | BinaryOp::NotEq
                    | BinaryOp::StrictNotEq
                    | BinaryOp::And
                    | BinaryOp::Or => TypeExpr::boolean(),
                }
            }
            Expr::Unary { op, expr, .. } => {
                self.check_expression(expr);
                match op {
                    UnaryOp::Neg => TypeExpr::number(),
                    UnaryOp::Not => TypeExpr::boolean(),
                }
            }
            Expr::Call { callee, args, span } => self.check_call(callee, args, *span),
            Expr::Prop { target, name, .. } => {
                let target = self.check_expression(target);
                self.check_property(&target, name)
            }
            Expr::New { callee, args, .. } => {
                // No member introspection: constructing yields the empty
                // object type, but the operands still get resolved.
                self.check_expression(callee);
                for arg in args {
                    self.check_expression(arg);
                }
                TypeExpr::Object(Vec::new())
            }
            Expr::Assign { name, value, .. } => {
                let provided = self.check_expression(value);
                let target = self.check_identifier(name);
                self.check_assignable(&provided, &target, value.span());
                provided
            }
            Expr::IndexAssign {
                target,
                index,
                value,
                ..
            } => {
                let provided = self.check_expression(value);
                let element = self.check_index(target, index);
                self.check_assignable(&provided, &element, value.span());
                provided
            }
            Expr::PropAssign {
                target,
                name,
                value,
                ..
            } => {
                let provided = self.check_expression(value);
                let target = self.check_expression(target);
                let property = self.check_property(&target, name);
                self.check_assignable(&provided, &property, value.span());
                provided
            }
            Expr::List(list, _) => {
                let mut last = TypeExpr::any();
                for expr in list {
                    last = self.check_expression(expr);
                }
                last
            }
            Expr::Function(func) => self.check_function_body(&func.params, &func.ret, &func.body),
            Expr::Object(props, _) => {
                let props = props
                    .iter()
                    .map(|prop| (prop.name.name.clone(), self.check_expression(&prop.value)))
                    .collect();
                TypeExpr::Object(props)
            }
        }
    }

    fn check_identifier(&mut self, ident: &Identifier) -> TypeExpr {
        let value = self
            .scopes
            .lookup(&ident.name)
            .and_then(|symbol| symbol.value.clone());
        match value {
            Some(ty) => resolve_type(&ty, &self.scopes),
            None => {
                self.diagnostics.error(
                    ident.span,
                    format!("unknown identifier `{}`", ident.name),
                );
                TypeExpr::any()
            }
        }
    }

    fn check_index(&mut self, target: &Expr, index: &Expr) -> TypeExpr {
        let target_ty = self.check_expression(target);
        let index_ty = self.check_expression(index);
        if !index_ty.is_prim(Primitive::Number) {
            self.diagnostics.error(
                index.span(),
                format!("type `{}` is not assignable to type `number`", index_ty),
            );
        }
        match target_ty {
            TypeExpr::Array(elem) => *elem,
            other => {
                self.diagnostics
                    .error(target.span(), format!("type `{}` is not indexable", other));
                TypeExpr::any()
            }
        }
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> TypeExpr {
        let callee_ty = self.check_expression(callee);
        match callee_ty {
            TypeExpr::Function { params, ret } => {
                for (arg, param) in args.iter().zip(&params) {
                    let provided = self.check_expression(arg);
                    if !is_assignable(&provided, param) {
                        self.diagnostics.error(
                            arg.span(),
                            format!(
                                "argument of type `{}` is not assignable to parameter of type `{}`",
                                provided, param
                            ),
                        );
                    }
                }
                // Arguments beyond the declared arity are resolved but not
                // validated.
                for arg in args.iter().skip(params.len()) {
                    self.check_expression(arg);
                }
                *ret
            }
            other => {
                self.diagnostics
                    .error(span, format!("type `{}` is not callable", other));
                for arg in args {
                    self.check_expression(arg);
                }
                TypeExpr::any()
            }
        }
    }

    fn check_property(&mut self, target: &TypeExpr, name: &Identifier) -> TypeExpr {
        match target {
            TypeExpr::Object(props) => {
                match props.iter().find(|(prop, _)| prop == &name.name) {
                    Some((_, ty)) => ty.clone(),
                    None => {
                        self.diagnostics.error(
                            name.span,
                            format!("property `{}` does not exist on type `{}`", name.name, target),
                        );
                        TypeExpr::any()
                    }
                }
            }
            other => {
                self.diagnostics
                    .error(name.span, format!("type `{}` is not an object", other));
                TypeExpr::any()
            }
        }
    }

    /// Shared by function declarations and function expressions: a fresh
    /// scope seeded with the parameters, the body's own hoisted declarations
    /// bound on top, then every statement checked against the declared
    /// return type. Returns the function's type.
    fn check_function_body(
        &mut self,
        params: &[Param],
        ret: &Option<TypeExpr>,
        body: &[Statement],
    ) -> TypeExpr {
        let param_types: Vec<TypeExpr> = params
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => resolve_type(ty, &self.scopes),
                None => TypeExpr::any(),
            })
            .collect();
        let return_type = match ret {
            Some(ty) => resolve_type(ty, &self.scopes),
            None => TypeExpr::any(),
        };

        self.scopes.push();
        for (param, ty) in params.iter().zip(&param_types) {
            if let Some(scope) = self.scopes.current_mut() {
                scope.entry(&param.name.name).value = Some(ty.clone());
            }
        }
        bind(body, &mut self.scopes, &mut self.diagnostics);
        for statement in body {
            self.check_statement(statement, &return_type);
        }
        self.scopes.pop();

        TypeExpr::Function {
            params: param_types,
            ret: Box::new(return_type),
        }
    }

    fn check_assignable(&mut self, provided: &TypeExpr, expected: &TypeExpr, span: Span) {
        if !is_assignable(provided, expected) {
            self.diagnostics.error(
                span,
                format!(
                    "type `{}` is not assignable to type `{}`",
                    provided, expected
                ),
            );
        }
    }
}
