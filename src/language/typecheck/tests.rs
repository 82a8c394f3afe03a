use super::*;
use crate::language::{parser::parse_module, types::TypeExpr};

fn check_source(source: &str) -> (Scope, Diagnostics) {
    let module = parse_module(source).expect("parse");
    check_module(&module)
}

fn diagnostics(source: &str) -> Vec<Diagnostic> {
    check_source(source).1.into_vec()
}

fn value_type(scope: &Scope, name: &str) -> TypeExpr {
    scope
        .get(name)
        .and_then(|symbol| symbol.value.clone())
        .unwrap_or_else(|| panic!("no value binding for `{}`", name))
}

#[test]
fn functions_may_call_forward() {
    let errors = diagnostics(
        "function f(): number { return g(); } \
         function g(): number { return 1; }",
    );
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn let_is_not_visible_before_its_declaration() {
    let errors = diagnostics("x; let x = 1;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("unknown identifier `x`"));
}

#[test]
fn let_redeclaration_is_reported_at_the_second_site() {
    let source = "let x = 1; let x = 2;";
    let errors = diagnostics(source);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cannot redeclare `x`"));
    let second = source.rfind("x =").expect("second declaration");
    assert_eq!(errors[0].span.start, second);
}

#[test]
fn var_redeclaration_merges_and_the_last_initializer_wins() {
    let (scope, errors) = check_source("var x = 1; var x = true;");
    assert!(errors.is_empty());
    assert_eq!(value_type(&scope, "x"), TypeExpr::boolean());
}

#[test]
fn var_is_undefined_before_its_statement_runs() {
    let (scope, errors) = check_source("let y = x; var x = 1;");
    assert!(errors.is_empty());
    assert_eq!(value_type(&scope, "y"), TypeExpr::undefined());
    assert_eq!(value_type(&scope, "x"), TypeExpr::number());
}

#[test]
fn union_accepts_member_types_only() {
    let errors = diagnostics("type U = number | string; let u: U = 1;");
    assert!(errors.is_empty(), "{:?}", errors);

    let errors = diagnostics("type U = number | string; let u: U = true;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("not assignable"));
}

#[test]
fn array_assignment_checks_element_types() {
    let errors = diagnostics("var a: number[]; var b: string[]; a = b;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .message
        .contains("type `string[]` is not assignable to type `number[]`"));
}

#[test]
fn object_literal_may_omit_declared_properties() {
    let errors = diagnostics("let p: { a: number, b: number } = { a: 1 };");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn object_literal_with_mismatched_property_is_rejected() {
    let errors = diagnostics("let p: { a: number } = { a: true };");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("not assignable"));
}

#[test]
fn increment_through_a_typed_let() {
    let (scope, errors) = check_source("let x: number = 1; x = x + 1;");
    assert!(errors.is_empty(), "{:?}", errors.into_vec());
    assert_eq!(value_type(&scope, "x"), TypeExpr::number());
}

#[test]
fn bad_initializer_is_reported_at_the_literal() {
    let source = "let x: number = true;";
    let errors = diagnostics(source);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("not assignable"));
    assert_eq!(errors[0].span.start, source.find("true").expect("literal"));
}

#[test]
fn aliases_resolve_in_any_declaration_order() {
    let errors = diagnostics("type A = B; type B = number; let x: A = 1;");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn self_referential_alias_is_diagnosed() {
    let errors = diagnostics("type A = A;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("circular type alias `A`"));
}

#[test]
fn mutual_alias_cycle_is_diagnosed_once() {
    let errors = diagnostics("type A = B; type B = A;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("circular type alias"));
}

#[test]
fn duplicate_alias_keeps_the_first_definition() {
    let errors = diagnostics("type A = number; type A = string; let x: A = 1;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cannot redeclare type `A`"));
}

#[test]
fn unknown_annotation_degrades_to_any() {
    // `any` is an ordinary tag, so even a number initializer mismatches it.
    let errors = diagnostics("let x: Missing = 1;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .message
        .contains("type `number` is not assignable to type `any`"));
}

#[test]
fn call_arguments_are_checked_positionally() {
    let errors = diagnostics("function f(a: number): number { return a; } f(1);");
    assert!(errors.is_empty(), "{:?}", errors);

    let errors = diagnostics("function f(a: number): number { return a; } f(true);");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("argument of type `boolean`"));
}

#[test]
fn extra_arguments_are_not_validated() {
    let errors = diagnostics("function f(a: number): number { return a; } f(1, true);");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn calling_a_non_function_is_reported() {
    let errors = diagnostics("var x = 1; x();");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("is not callable"));
}

#[test]
fn property_access_requires_a_known_property() {
    let errors = diagnostics("let p = { a: 1 }; p.a;");
    assert!(errors.is_empty(), "{:?}", errors);

    let errors = diagnostics("let p = { a: 1 }; p.b;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("property `b` does not exist"));

    let errors = diagnostics("var n: number; n.a;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("is not an object"));
}

#[test]
fn element_access_requires_an_array_and_a_number_index() {
    let errors = diagnostics("var a: number[]; a[0] = 2; let x: number = a[0];");
    assert!(errors.is_empty(), "{:?}", errors);

    let errors = diagnostics("var a: number[]; a[true];");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("not assignable to type `number`"));

    let errors = diagnostics("var n: number; n[0];");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("is not indexable"));
}

#[test]
fn return_values_must_match_the_declared_type() {
    let errors = diagnostics("function f(): number { return true; }");
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .message
        .contains("not assignable to return type `number`"));
}

#[test]
fn branch_scopes_are_discarded() {
    let errors = diagnostics("var c; if (c) { let y = 1; } y;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("unknown identifier `y`"));
}

#[test]
fn hoisting_applies_inside_nested_blocks() {
    let errors = diagnostics("var c; if (c) { f(); function f(): number { return 1; } }");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn inner_blocks_may_shadow_outer_bindings() {
    let errors = diagnostics("let x = 1; if (x) { let x = true; x = false; }");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn function_expressions_check_like_declarations() {
    let errors = diagnostics("let f = function (a: number): number { return a; }; f(1);");
    assert!(errors.is_empty(), "{:?}", errors);

    let errors = diagnostics("let f = function (a: number): number { return a; }; f(true);");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("argument of type `boolean`"));
}

#[test]
fn alias_and_value_share_one_name() {
    let (scope, errors) = check_source("type n = number; let n: n = 1; n = 2;");
    assert!(errors.is_empty());
    let symbol = scope.get("n").expect("symbol");
    assert_eq!(symbol.alias, Some(TypeExpr::number()));
    assert_eq!(symbol.value, Some(TypeExpr::number()));
}

#[test]
fn elided_const_initializer_is_undefined() {
    let errors = diagnostics("const c: number;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .message
        .contains("type `undefined` is not assignable to type `number`"));
}

#[test]
fn this_and_new_produce_the_empty_object_type() {
    let errors = diagnostics(
        "function F(): number { return 1; } \
         let o: {} = new F(); o = this;",
    );
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn list_expressions_take_the_type_of_the_last_element() {
    let errors = diagnostics("let x: number = (true, 1);");
    assert!(errors.is_empty(), "{:?}", errors);

    let errors = diagnostics("let z: number = (1, true);");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("not assignable"));
}

#[test]
fn function_redeclaration_takes_the_last_signature() {
    let errors = diagnostics(
        "function f(): number { return 1; } \
         function f(): boolean { return true; } \
         let x: boolean = f();",
    );
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn let_cannot_replace_a_hoisted_function() {
    let errors = diagnostics("function f(): number { return 1; } let f = 2;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("cannot redeclare `f`"));
}

#[test]
fn every_error_is_collected_in_one_pass() {
    let errors = diagnostics("let x: number = true; let y: boolean = 1; missing;");
    assert_eq!(errors.len(), 3);
}

#[test]
fn alias_resolution_reaches_outer_scopes() {
    let errors = diagnostics(
        "type U = number | string; \
         function f(u: U): number { let v: U = 1; return 2; } \
         f(1);",
    );
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn primitive_reflexivity_holds_through_resolution() {
    let mut scopes = ScopeChain::new();
    scopes.push();
    let resolved = resolve_type(&TypeExpr::Named("nowhere".to_string()), &scopes);
    assert_eq!(resolved, TypeExpr::any());
    assert!(is_assignable(&resolved, &TypeExpr::any()));
    assert!(!is_assignable(&resolved, &TypeExpr::number()));
}

#[test]
fn binder_populates_placeholders_without_checking() {
    let module = parse_module("var x = 1; function f(a: number): boolean { return true; }")
        .expect("parse");
    let mut scopes = ScopeChain::new();
    let mut errors = Diagnostics::new();
    scopes.push();
    bind(&module.statements, &mut scopes, &mut errors);
    assert!(errors.is_empty());

    let x = scopes.lookup("x").expect("x bound");
    assert_eq!(x.value, Some(TypeExpr::undefined()));

    let f = scopes.lookup("f").expect("f bound");
    assert_eq!(
        f.value,
        Some(TypeExpr::Function {
            params: vec![TypeExpr::number()],
            ret: Box::new(TypeExpr::boolean()),
        })
    );
}
