use leverr::diagnostics::Diagnostic;
use leverr::infer_source;

fn infer(source: &str) -> String {
    infer_source(source).expect("inference failure")
}

fn infer_err(source: &str) -> Diagnostic {
    infer_source(source).expect_err("should not typecheck")
}

#[test]
fn literals_have_their_base_types() {
    assert_eq!(infer("42"), "Int");
    assert_eq!(infer("2.5"), "Float");
    assert_eq!(infer(r#""hi""#), "String");
    assert_eq!(infer("true"), "Bool");
    assert_eq!(infer("()"), "Unit");
}

#[test]
fn identity_is_polymorphic() {
    assert_eq!(infer("fn x -> x"), "a -> a");
    assert_eq!(infer("fn(x, y) -> x"), "a -> b -> a");
}

#[test]
fn let_bindings_generalize() {
    assert_eq!(
        infer(r#"let id = fn x -> x in (id(1), id("s"))"#),
        "(Int, String)"
    );
}

#[test]
fn lambda_parameters_stay_monomorphic() {
    let diag = infer_err(r#"fn f -> (f(1), f("s"))"#);
    assert!(diag.message.contains("type mismatch"));
}

#[test]
fn recursive_function_types_close_the_knot() {
    assert_eq!(
        infer("let rec fact = fn n -> match n { 0 -> 1, _ -> n * fact(n - 1) } in fact"),
        "Int -> Int"
    );
}

#[test]
fn builtins_are_seeded_with_schemes() {
    assert_eq!(infer("map"), "(a -> b) -> List(a) -> List(b)");
    assert_eq!(infer("filter"), "(a -> Bool) -> List(a) -> List(a)");
    assert_eq!(infer("fold"), "a -> (a -> b -> a) -> List(b) -> a");
    assert_eq!(infer("head"), "List(a) -> Result(a)");
    assert_eq!(infer("concat"), "String -> String -> String");
    assert_eq!(infer("print"), "a -> Unit");
}

#[test]
fn partial_application_of_builtins_types_as_functions() {
    assert_eq!(infer("map(fn x -> x * 2)"), "List(Int) -> List(Int)");
    assert_eq!(infer("fold(0)"), "(Int -> a -> Int) -> List(a) -> Int");
}

#[test]
fn list_elements_must_agree() {
    assert_eq!(infer("[1, 2, 3]"), "List(Int)");
    assert!(matches!(infer("[]").as_str(), "List(a)"));
    let diag = infer_err(r#"[1, "a"]"#);
    assert!(diag.message.contains("type mismatch"));
}

#[test]
fn tuples_and_records_are_structural() {
    assert_eq!(infer(r#"(1, "a", true)"#), "(Int, String, Bool)");
    assert_eq!(infer("{ x: 1, y: 2.5 }"), "{ x: Int, y: Float }");
}

#[test]
fn field_access_on_a_known_record() {
    assert_eq!(infer("{ x: 1 }.x"), "Int");
    let diag = infer_err("{ x: 1 }.y");
    assert!(diag.message.contains("no field y"));
}

#[test]
fn field_access_constrains_unknown_records_with_an_open_row() {
    assert_eq!(infer("fn r -> r.x"), "{ x: a, .. } -> a");
    assert_eq!(infer("fn r -> r.x + 1"), "{ x: Int, .. } -> Int");
}

#[test]
fn field_access_on_a_non_record_fails() {
    let diag = infer_err("5 .x");
    assert!(diag.message.contains("non-record"));
}

#[test]
fn ok_and_err_construct_results() {
    assert_eq!(infer("Ok(42)"), "Result(Int)");
    assert_eq!(infer(r#"Err("boom")"#), "Result(a)");
}

#[test]
fn err_payload_must_be_text() {
    let diag = infer_err("Err(42)");
    assert!(diag.message.contains("type mismatch"));
}

#[test]
fn other_tags_are_open_and_structural() {
    assert_eq!(infer("Circle(1.5)"), "Circle(Float)");
    assert_eq!(infer("Locked"), "Locked");
}

#[test]
fn pipe_into_function_applies() {
    assert_eq!(infer("5 |> fn n -> n * 2"), "Int");
    assert_eq!(infer("[1, 2] |> map(fn x -> x > 0)"), "List(Bool)");
}

#[test]
fn pipe_into_unwrap_strips_the_result() {
    assert_eq!(
        infer(r#"let parse = fn s -> match s { "1" -> Ok(1), _ -> Err("bad") } in "1" |> parse?"#),
        "Int"
    );
}

#[test]
fn pipe_into_catch_returns_the_ok_type() {
    assert_eq!(infer("head([1, 2]) |> catch e -> 0"), "Int");
    // The error parameter is text
    assert_eq!(infer(r#"head(["a"]) |> catch e -> e"#), "String");
}

#[test]
fn pipe_into_catch_accepts_an_already_unwrapped_chain() {
    // The unwrap already produced an Int; the catch only guards the transfer
    assert_eq!(
        infer(
            r#"let parse = fn s -> match s { "1" -> Ok(1), _ -> Err("bad") } in
               "no" |> parse? |> fn n -> n * 2 |> catch e -> 0"#
        ),
        "Int"
    );
}

#[test]
fn catch_fallback_must_match_the_ok_type() {
    let diag = infer_err(r#"head([1, 2]) |> catch e -> "zero""#);
    assert!(diag.message.contains("type mismatch"));
}

#[test]
fn unwrap_requires_a_result() {
    let diag = infer_err(r#""hello"?"#);
    assert!(diag.message.contains("? operator requires a Result"));
    assert_eq!(infer("head([1])?"), "Int");
}

#[test]
fn conditionals_unify_their_branches() {
    assert_eq!(infer("if 1 < 2 then 10 else 20"), "Int");
    assert!(infer_source("if 1 then 2 else 3").is_err());
    assert!(infer_source(r#"if true then 2 else "x""#).is_err());
}

#[test]
fn match_arms_unify_to_one_return_type() {
    assert_eq!(infer(r#"match 1 { 1 -> "one", _ -> "other" }"#), "String");
    assert!(infer_source(r#"match 1 { 1 -> 2, _ -> "other" }"#).is_err());
}

#[test]
fn match_subject_unifies_with_non_tag_patterns() {
    let diag = infer_err(r#"match 1 { "one" -> 1 }"#);
    assert!(diag.message.contains("type mismatch"));
}

#[test]
fn tag_patterns_are_opaque_to_the_subject() {
    // No declared sum types: matching Int-carrying tags on the same
    // subject must not be rejected
    assert_eq!(
        infer("fn s -> match s { Circle(r) -> r * r, Rect(w, h) -> w * h }"),
        "a -> Int"
    );
}

#[test]
fn arithmetic_mismatch_spans_the_right_operand() {
    let diag = infer_err(r#"5 + "hello""#);
    assert!(diag.message.contains("type mismatch"));
    assert_eq!(diag.span.start.column, 5);
    assert_eq!(diag.span.end.column, 12);
}

#[test]
fn calling_a_non_function_is_a_mismatch() {
    let diag = infer_err("let x = 5 in x(3)");
    assert!(diag.message.contains("type mismatch"));
}

#[test]
fn self_application_trips_the_occurs_check() {
    let diag = infer_err("fn x -> x(x)");
    assert!(diag.message.contains("infinite type"));
}

#[test]
fn undefined_variables_are_reported() {
    let diag = infer_err("nope");
    assert!(diag.message.contains("undefined variable: nope"));
}

#[test]
fn negation_tries_int_then_float() {
    assert_eq!(infer("-(1)"), "Int");
    assert_eq!(infer("-(1.5)"), "Float");
    assert!(infer_source(r#"-("x")"#).is_err());
}

#[test]
fn arithmetic_requires_matching_operand_types() {
    assert_eq!(infer("1 + 2"), "Int");
    assert_eq!(infer("1.5 + 2.5"), "Float");
    // Promotion is a runtime affair; statically the operands must agree
    assert!(infer_source("1 + 0.5").is_err());
}

#[test]
fn concat_requires_strings() {
    assert_eq!(infer(r#""a" ++ "b""#), "String");
    assert!(infer_source(r#"1 ++ "b""#).is_err());
}

#[test]
fn logical_operators_require_booleans() {
    assert_eq!(infer("true && false || true"), "Bool");
    assert!(infer_source("1 && true").is_err());
    assert!(infer_source("!5").is_err());
}

#[test]
fn inference_is_deterministic_across_runs() {
    let source = "fn f -> fn x -> f(f(x))";
    let first = infer(source);
    let second = infer(source);
    assert_eq!(first, second);
    assert_eq!(first, "(a -> a) -> a -> a");
}
