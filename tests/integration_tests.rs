//! End-to-end scenarios through the public pipeline API.

use leverr::{infer_source, run_source};

fn run(source: &str) -> String {
    run_source(source).expect("run failure")
}

#[test]
fn recursive_fibonacci() {
    let source = "let rec fib = fn(n) -> match n <= 1 { true -> n, false -> fib(n-1) + fib(n-2) } in fib(10)";
    assert_eq!(run(source), "55");
}

#[test]
fn filter_map_fold_pipeline() {
    let source = "[1, 2, 3, 4, 5] |> filter(fn(x) -> x > 2) |> map(fn(x) -> x * 10) |> fold(0, fn(acc, x) -> acc + x)";
    assert_eq!(run(source), "120");
}

#[test]
fn unwrap_pipeline_happy_path() {
    let source = r#"let parse = fn(s) -> match s { "42" -> Ok(42), _ -> Err("bad") } in "42" |> parse? |> fn n -> n * 2"#;
    assert_eq!(run(source), "84");
}

#[test]
fn unwrap_pipeline_recovers_with_catch() {
    let source = r#"let parse = fn(s) -> match s { "1" -> Ok(1), _ -> Err("bad") } in "bad" |> parse? |> fn n -> n * 2 |> catch e -> 0"#;
    assert_eq!(run(source), "0");
}

#[test]
fn tag_dispatch_computes_area() {
    let source = "let area = fn(s) -> match s { Circle(r) -> r * r * 3, Rect(w, h) -> w * h } in area(Rect(3, 4))";
    assert_eq!(run(source), "12");
}

#[test]
fn partial_application_in_a_pipeline() {
    let source = "let add = fn(a, b) -> a + b in [1, 2, 3] |> map(add(10))";
    assert_eq!(run(source), "[11, 12, 13]");
}

#[test]
fn rendered_literals_reparse_to_the_same_rendering() {
    for source in [
        "42",
        "-7",
        "2.5",
        "3.0",
        r#""hello""#,
        "true",
        "()",
        "[1, 2, 3]",
        "(1, 2)",
        r#"(1, "x", false)"#,
        "Ok(42)",
        "Err(\"bad\")",
        "None",
        "Rect(3, 4)",
        "[[1], [2]]",
    ] {
        let rendered = run(source);
        let reparsed = run(&rendered);
        assert_eq!(rendered, reparsed, "round-trip failed for {source}");
    }
}

#[test]
fn mismatch_diagnostic_renders_a_caret_block() {
    let source = r#"5 + "hello""#;
    let diagnostic = run_source(source).expect_err("should fail");
    let rendered = diagnostic.render(source);

    let mut lines = rendered.lines();
    let header = lines.next().expect("header line");
    assert!(header.starts_with("Error at line 1, col 5:"));
    assert_eq!(lines.next(), Some(r#"  5 + "hello""#));
    assert_eq!(lines.next(), Some("      ^^^^^^^"));
    assert_eq!(lines.next(), None);
}

#[test]
fn lexical_diagnostic_carries_its_span() {
    let source = "let x = \"unfinished\nin x";
    let diagnostic = run_source(source).expect_err("should fail");
    assert!(diagnostic.message.contains("unterminated string"));
    assert_eq!(diagnostic.span.start.line, 1);
    assert_eq!(diagnostic.span.start.column, 9);
}

#[test]
fn parse_diagnostic_names_the_offender() {
    let diagnostic = run_source("let = 5 in x").expect_err("should fail");
    assert!(diagnostic.message.contains("expected identifier"));
}

#[test]
fn runtime_diagnostic_for_an_exhausted_match() {
    let source = "match 5 { 6 -> 1 }";
    let diagnostic = run_source(source).expect_err("should fail");
    assert!(diagnostic.message.contains("no matching pattern"));
    // The whole match form is underlined from its start
    assert_eq!(diagnostic.span.start.column, 1);
}

#[test]
fn infer_source_reports_the_program_type() {
    assert_eq!(infer_source("fn x -> x").expect("inference failure"), "a -> a");
    assert_eq!(
        infer_source("[1, 2] |> map(fn x -> x * 2)").expect("inference failure"),
        "List(Int)"
    );
}

#[test]
fn comments_and_layout_do_not_change_meaning() {
    let source = "\n-- doubles every element\nlet xs = [1, 2] in -- the input\n  xs |> map(fn x -> x * 2)\n";
    assert_eq!(run(source), "[2, 4]");
}

#[test]
fn nested_data_round_trips_through_rendering() {
    let source = r#"{ name: "leverr", tags: [Ok(1), Err("x")], pos: (1, 2.5) }"#;
    assert_eq!(
        run(source),
        r#"{ name: "leverr", tags: [Ok(1), Err("x")], pos: (1, 2.5) }"#
    );
}
