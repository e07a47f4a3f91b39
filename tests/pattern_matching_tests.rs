use leverr::run_source;

fn run(source: &str) -> String {
    run_source(source).expect("run failure")
}

#[test]
fn literal_patterns_compare_values() {
    assert_eq!(run(r#"match 42 { 0 -> "zero", 42 -> "answer", _ -> "other" }"#), "\"answer\"");
    assert_eq!(run(r#"match "yes" { "no" -> 0, "yes" -> 1, _ -> 2 }"#), "1");
    assert_eq!(run(r#"match 2.5 { 2.5 -> true, _ -> false }"#), "true");
    assert_eq!(run(r#"match true { true -> 1, false -> 0 }"#), "1");
}

#[test]
fn first_matching_case_wins() {
    assert_eq!(run(r#"match 1 { _ -> "first", 1 -> "second" }"#), "\"first\"");
}

#[test]
fn identifier_patterns_bind_the_subject() {
    assert_eq!(run("match 21 { n -> n * 2 }"), "42");
}

#[test]
fn wildcard_matches_without_binding() {
    assert_eq!(run(r#"match (1, 2) { _ -> "anything" }"#), "\"anything\"");
}

#[test]
fn tag_patterns_require_name_and_arity() {
    assert_eq!(
        run(r#"match Circle(5) { Rect(w, h) -> w * h, Circle(r) -> r * r * 3 }"#),
        "75"
    );
    // Same constructor, wrong arity: falls through
    assert_eq!(
        run(r#"match Pair(1, 2) { Pair(x) -> x, Pair(x, y) -> x + y }"#),
        "3"
    );
}

#[test]
fn nested_tag_patterns_recurse() {
    assert_eq!(
        run(r#"match Wrap(Ok(7)) { Wrap(Ok(n)) -> n, _ -> 0 }"#),
        "7"
    );
}

#[test]
fn tuple_patterns_destructure_pairwise() {
    assert_eq!(run("match (1, 2) { (a, b) -> a + b }"), "3");
    assert_eq!(
        run(r#"match (1, (2, 3)) { (a, (b, c)) -> a + b + c }"#),
        "6"
    );
}

#[test]
fn record_patterns_ignore_extra_fields() {
    assert_eq!(
        run("match { x: 1, y: 2, z: 3 } { { x: a, y: b } -> a + b }"),
        "3"
    );
}

#[test]
fn record_pattern_missing_field_fails_the_case() {
    assert_eq!(
        run(r#"match { x: 1 } { { y: n } -> n, { x: n } -> n + 10 }"#),
        "11"
    );
}

#[test]
fn ok_and_err_patterns_split_results() {
    let source = r#"match head([1, 2]) { Ok(n) -> n, Err(e) -> 0 }"#;
    assert_eq!(run(source), "1");

    let source = r#"match head([]) { Ok(n) -> n, Err(e) -> length(e) }"#;
    assert_eq!(run(source), "10");
}

#[test]
fn match_on_bool_drives_recursion() {
    assert_eq!(
        run("let rec fib = fn(n) -> match n <= 1 { true -> n, false -> fib(n-1) + fib(n-2) } in fib(10)"),
        "55"
    );
}
