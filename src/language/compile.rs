use crate::language::{
    ast::Module,
    emitter::emit,
    errors::SyntaxErrors,
    parser::parse_module,
    typecheck::{check_module, Diagnostics, Scope},
};

pub struct CompileOutput {
    pub module: Module,
    pub scope: Scope,
    pub diagnostics: Diagnostics,
    pub js: String,
}

/// Runs the whole pipeline over one source file: lex + parse, bind + check,
/// emit. Each call gets its own diagnostics accumulator, so concurrent or
/// repeated compilations never observe one another's errors. Semantic
/// diagnostics do not stop emission; the caller decides what to do with a
/// module that has errors.
pub fn compile(source: &str) -> Result<CompileOutput, SyntaxErrors> {
    let module = parse_module(source)?;
    let (scope, diagnostics) = check_module(&module);
    let js = emit(&module.statements);
    Ok(CompileOutput {
        module,
        scope,
        diagnostics,
        js,
    })
}
