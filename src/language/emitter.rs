use crate::language::ast::{
    BinaryOp, Expr, FunctionExpr, ObjectProperty, Param, Statement, UnaryOp,
};

/// Emits JavaScript for a checked module. Type aliases and annotations leave
/// no trace in the output; everything else maps one statement to one
/// statement.
pub fn emit(statements: &[Statement]) -> String {
    Emitter { level: 0 }.emit_statements(statements)
}

struct Emitter {
    level: usize,
}

impl Emitter {
    fn indent(&self, text: &str) -> String {
        format!("{}{}", "  ".repeat(self.level), text)
    }

    fn emit_statements(&mut self, statements: &[Statement]) -> String {
        let parts: Vec<String> = statements
            .iter()
            .map(|statement| self.emit_statement(statement))
            .filter(|part| !part.is_empty())
            .collect();
        parts.join("\n")
    }

    fn emit_statement(&mut self, statement: &Statement) -> String {
        match statement {
            Statement::If(stmt) => {
                let cond = self.emit_expr(&stmt.cond);
                let mut out = self.indent(&format!("if ({}) {{\n", cond));
                self.level += 1;
                out += &self.emit_statements(&stmt.then_branch);
                self.level -= 1;
                out += "\n";
                out += &self.indent("}");
                if !stmt.else_branch.is_empty() {
                    out += " else {\n";
                    self.level += 1;
                    out += &self.emit_statements(&stmt.else_branch);
                    self.level -= 1;
                    out += "\n";
                    out += &self.indent("}");
                }
                out
            }
            Statement::While(stmt) => {
                let cond = self.emit_expr(&stmt.cond);
                let mut out = self.indent(&format!("while ({}) {{\n", cond));
                self.level += 1;
                out += &self.emit_statements(&stmt.body);
                self.level -= 1;
                out += "\n";
                out += &self.indent("}");
                out
            }
            Statement::Return(stmt) => {
                let value = self.emit_expr(&stmt.value);
                self.indent(&format!("return {};", value))
            }
            Statement::Var(stmt) => {
                let tail = match &stmt.value {
                    Some(value) => format!(" = {}", self.emit_expr(value)),
                    None => String::new(),
                };
                self.indent(&format!("var {}{};", stmt.name.name, tail))
            }
            Statement::Let(stmt) => {
                let tail = match &stmt.value {
                    Some(value) => format!(" = {}", self.emit_expr(value)),
                    None => String::new(),
                };
                self.indent(&format!("let {}{};", stmt.name.name, tail))
            }
            Statement::Const(stmt) => {
                let value = self.emit_expr(&stmt.value);
                self.indent(&format!("const {} = {};", stmt.name.name, value))
            }
            Statement::Function(decl) => {
                let body = self.emit_function(Some(&decl.name.name), &decl.params, &decl.body);
                self.indent(&body)
            }
            Statement::TypeAlias(_) => String::new(),
            Statement::Expr(stmt) => {
                let expr = self.emit_expr(&stmt.expr);
                self.indent(&format!("{};", expr))
            }
        }
    }

    fn emit_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Identifier(ident) => ident.name.clone(),
            Expr::Number(value, _) => emit_number(*value),
            Expr::True(_) => "true".to_string(),
            Expr::False(_) => "false".to_string(),
            Expr::Undefined(_) => "undefined".to_string(),
            Expr::This(_) => "this".to_string(),
            Expr::Index { target, index, .. } => {
                let target_js = self.emit_grouped(target);
                format!("{}[{}]", target_js, self.emit_expr(index))
            }
            Expr::Binary { op, left, right, .. } => format!(
                "{} {} {}",
                self.emit_expr(left),
                binary_op_js(*op),
                self.emit_expr(right)
            ),
            Expr::Unary { op, expr, .. } => {
                let op = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                };
                format!("{} {}", op, self.emit_expr(expr))
            }
            Expr::Call { callee, args, .. } => {
                let callee_js = self.emit_grouped(callee);
                format!("{}({})", callee_js, self.emit_args(args))
            }
            Expr::Prop { target, name, .. } => {
                let target_js = self.emit_grouped(target);
                format!("{}.{}", target_js, name.name)
            }
            Expr::New { callee, args, .. } => {
                let callee_js = self.emit_grouped(callee);
                format!("new {}({})", callee_js, self.emit_args(args))
            }
            Expr::Assign { name, value, .. } => {
                format!("{} = {}", name.name, self.emit_expr(value))
            }
            Expr::IndexAssign {
                target,
                index,
                value,
                ..
            } => {
                let target_js = self.emit_grouped(target);
                format!(
                    "{}[{}] = {}",
                    target_js,
                    self.emit_expr(index),
                    self.emit_expr(value)
                )
            }
            Expr::PropAssign {
                target,
                name,
                value,
                ..
            } => {
                let target_js = self.emit_grouped(target);
                format!("{}.{} = {}", target_js, name.name, self.emit_expr(value))
            }
            Expr::List(list, _) => {
                let parts: Vec<String> = list.iter().map(|expr| self.emit_expr(expr)).collect();
                format!("({})", parts.join(", "))
            }
            Expr::Function(func) => self.emit_function_expr(func),
            Expr::Object(props, _) => self.emit_object(props),
        }
    }

    /// Non-identifier targets of calls, member accesses, and index accesses
    /// get wrapped in parentheses so the output parses the way the input
    /// did.
    fn emit_grouped(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Identifier(_) => self.emit_expr(expr),
            _ => format!("({})", self.emit_expr(expr)),
        }
    }

    fn emit_args(&mut self, args: &[Expr]) -> String {
        let parts: Vec<String> = args.iter().map(|arg| self.emit_expr(arg)).collect();
        parts.join(", ")
    }

    fn emit_function_expr(&mut self, func: &FunctionExpr) -> String {
        match &func.name {
            Some(name) => self.emit_function(Some(&name.name), &func.params, &func.body),
            None => self.emit_function(None, &func.params, &func.body),
        }
    }

    fn emit_function(
        &mut self,
        name: Option<&str>,
        params: &[Param],
        body: &[Statement],
    ) -> String {
        let params: Vec<&str> = params.iter().map(|param| param.name.name.as_str()).collect();
        let mut out = match name {
            Some(name) => format!("function {}({}) {{\n", name, params.join(", ")),
            None => format!("function ({}) {{\n", params.join(", ")),
        };
        self.level += 1;
        out += &self.emit_statements(body);
        self.level -= 1;
        out += "\n";
        out += &self.indent("}");
        out
    }

    fn emit_object(&mut self, props: &[ObjectProperty]) -> String {
        if props.is_empty() {
            return "{}".to_string();
        }
        let mut out = "{\n".to_string();
        self.level += 1;
        let parts: Vec<String> = props
            .iter()
            .map(|prop| {
                let value = self.emit_expr(&prop.value);
                self.indent(&format!("{}: {}", prop.name.name, value))
            })
            .collect();
        self.level -= 1;
        out += &parts.join(",\n");
        out += "\n";
        out += &self.indent("}");
        out
    }
}

fn emit_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn binary_op_js(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::Lt => "<",
        BinaryOp::Gt => ">",
        BinaryOp::Eq => "==",
        BinaryOp::StrictEq => "===",
        BinaryOp::NotEq => "!=",
        BinaryOp::StrictNotEq => "!==",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse_module;

    fn emit_source(source: &str) -> String {
        let module = parse_module(source).expect("parse");
        emit(&module.statements)
    }

    #[test]
    fn emits_declarations_without_annotations() {
        assert_eq!(
            emit_source("let x: number = 1; const y: number = 2; var z;"),
            "let x = 1;\nconst y = 2;\nvar z;"
        );
    }

    #[test]
    fn type_aliases_emit_nothing() {
        assert_eq!(emit_source("type U = number | string; let x: U = 1;"), "let x = 1;");
    }

    #[test]
    fn emits_if_else_with_indentation() {
        assert_eq!(
            emit_source("if (x > 1) { y = 2; } else { y = 3; }"),
            "if (x > 1) {\n  y = 2;\n} else {\n  y = 3;\n}"
        );
    }

    #[test]
    fn emits_function_declaration() {
        assert_eq!(
            emit_source("function add(a: number, b: number): number { return a + b; }"),
            "function add(a, b) {\n  return a + b;\n}"
        );
    }

    #[test]
    fn emits_nested_while() {
        assert_eq!(
            emit_source("while (go) { while (more) { step(); } }"),
            "while (go) {\n  while (more) {\n    step();\n  }\n}"
        );
    }

    #[test]
    fn wraps_non_identifier_targets() {
        assert_eq!(emit_source("f()[0];"), "(f())[0];");
        assert_eq!(emit_source("f().p;"), "(f()).p;");
    }

    #[test]
    fn emits_object_literals() {
        assert_eq!(
            emit_source("p = { x: 1, y: 2 };"),
            "p = {\n  x: 1,\n  y: 2\n};"
        );
    }
}
