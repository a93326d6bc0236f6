use super::*;
use pretty_assertions::assert_eq;

fn run(source: &str) -> Preprocessed {
    run_with(source, &[])
}

fn run_with(source: &str, defines: &[(&str, &str)]) -> Preprocessed {
    let mut pp = Preprocessor::new(Path::new("test.h"), &[]);
    for (name, value) in defines {
        pp.define(*name, MacroDef::object(*value));
    }
    pp.run(source).unwrap()
}

fn texts(pre: &Preprocessed) -> Vec<&str> {
    pre.tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| &*t.text)
        .collect()
}

#[test]
fn test_ifdef_selects_branch() {
    let pre = run_with(
        "#ifdef __REFLECTION_PARSER__\nint a;\n#else\nint b;\n#endif\n",
        &[("__REFLECTION_PARSER__", "1")],
    );
    assert_eq!(texts(&pre), vec!["int", "a", ";"]);

    let pre = run("#ifdef __REFLECTION_PARSER__\nint a;\n#else\nint b;\n#endif\n");
    assert_eq!(texts(&pre), vec!["int", "b", ";"]);
}

#[test]
fn test_if_elif_chain() {
    let source = "#define LEVEL 2\n#if LEVEL == 1\none\n#elif LEVEL == 2\ntwo\n#elif LEVEL >= 2\nthree\n#else\nfour\n#endif\n";
    assert_eq!(texts(&run(source)), vec!["two"]);
}

#[test]
fn test_nested_inactive_groups_stay_inactive() {
    let source = "#if 0\n#if 1\nhidden\n#else\nalso_hidden\n#endif\n#endif\nshown\n";
    assert_eq!(texts(&run(source)), vec!["shown"]);
}

#[test]
fn test_defined_operator() {
    let source = "#define A\n#if defined(A) && !defined B\nyes\n#endif\n";
    assert_eq!(texts(&run(source)), vec!["yes"]);
}

#[test]
fn test_undefined_identifier_is_zero() {
    assert_eq!(texts(&run("#if UNKNOWN\nno\n#else\nyes\n#endif\n")), vec!["yes"]);
}

#[test]
fn test_object_macro_expansion() {
    let source = "#define API\n#define COUNT 4\nclass API Foo { int v[COUNT]; };\n";
    assert_eq!(
        texts(&run(source)),
        vec!["class", "Foo", "{", "int", "v", "[", "4", "]", ";", "}", ";"]
    );
}

#[test]
fn test_self_referential_macro_stops() {
    let source = "#define X X + 1\nX\n";
    assert_eq!(texts(&run(source)), vec!["X", "+", "1"]);
}

#[test]
fn test_function_macro_recorded_not_expanded() {
    let pre = run("#define GENERATED_BODY() int x;\nGENERATED_BODY()\n");
    assert_eq!(texts(&pre), vec!["GENERATED_BODY", "(", ")"]);
    assert_eq!(
        pre.macros.get("GENERATED_BODY"),
        Some(&MacroDef {
            params: Some(Vec::new()),
            body: "int x;".to_string()
        })
    );
}

#[test]
fn test_undef_and_line_continuation() {
    let source = "#define LONG 1 + \\\n 2\nLONG\n#undef LONG\nLONG\n";
    let pre = run(source);
    assert_eq!(texts(&pre), vec!["1", "+", "2", "LONG"]);
    assert!(!pre.macros.contains_key("LONG"));
}

#[test]
fn test_comments_are_blanked() {
    let source = "int a; /* #if 0\n still comment */ int b; // #endif\n";
    let pre = run(source);
    assert_eq!(texts(&pre), vec!["int", "a", ";", "int", "b", ";"]);
    // Offsets still refer to the original text
    let b = &pre.tokens[4];
    assert_eq!(&source[b.span.range()], "b");
}

#[test]
fn test_includes_recorded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("core.h"), "").unwrap();
    let include_dirs = vec![dir.path().to_path_buf()];
    let pp = Preprocessor::new(Path::new("src/test.h"), &include_dirs);
    let pre = pp
        .run("#include \"core.h\"\n#include <vector>\n#if __has_include(<core.h>)\nhas\n#endif\n")
        .unwrap();

    assert_eq!(pre.includes.len(), 2);
    assert_eq!(pre.includes[0].spelled, "core.h");
    assert!(!pre.includes[0].angled);
    assert_eq!(pre.includes[0].resolved, Some(dir.path().join("core.h")));
    assert_eq!(pre.includes[1].spelled, "vector");
    assert!(pre.includes[1].angled);
    assert_eq!(pre.includes[1].resolved, None);
    assert_eq!(texts(&pre), vec!["has"]);
}

#[test]
fn test_error_directive_is_diagnostic() {
    let pre = run("#error unsupported\n#if 0\n#error hidden\n#endif\n");
    assert_eq!(pre.diagnostics.len(), 1);
    assert_eq!(pre.diagnostics[0].severity, Severity::Error);
    assert_eq!(pre.diagnostics[0].line, 1);
}

#[test]
fn test_unbalanced_conditionals() {
    let pp = Preprocessor::new(Path::new("a.h"), &[]);
    assert!(matches!(
        pp.run("#if 1\nint x;\n"),
        Err(FrontendError::UnbalancedConditional { line: 1, .. })
    ));

    let pp = Preprocessor::new(Path::new("a.h"), &[]);
    assert!(matches!(
        pp.run("int x;\n#endif\n"),
        Err(FrontendError::UnbalancedConditional { line: 2, .. })
    ));

    let pp = Preprocessor::new(Path::new("a.h"), &[]);
    assert!(matches!(
        pp.run("#if 1\n#else\n#else\n#endif\n"),
        Err(FrontendError::UnbalancedConditional { line: 3, .. })
    ));
}

#[test]
fn test_unterminated_comment() {
    let pp = Preprocessor::new(Path::new("a.h"), &[]);
    assert!(matches!(
        pp.run("int x;\n/* never closed\n"),
        Err(FrontendError::UnterminatedComment { line: 2, .. })
    ));
}

#[test]
fn test_unterminated_literal_in_inactive_region_is_ignored() {
    let pre = run("#if 0\nconst char* s = \"open;\n#endif\nint y;\n");
    assert_eq!(texts(&pre), vec!["int", "y", ";"]);

    let pp = Preprocessor::new(Path::new("a.h"), &[]);
    assert!(matches!(
        pp.run("int y;\nconst char* s = \"open;\n"),
        Err(FrontendError::UnterminatedLiteral { line: 2, .. })
    ));
}

#[test]
fn test_redefinition_warns() {
    let pre = run("#define A 1\n#define A 1\n#define A 2\n");
    assert_eq!(pre.diagnostics.len(), 1);
    assert_eq!(pre.diagnostics[0].severity, Severity::Warning);
    assert_eq!(pre.macros.get("A"), Some(&MacroDef::object("2")));
}
