//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Expressions, precedence and associativity
//! - Variable and function declarations
//! - Type references with generics and array suffixes
//! - Control flow statements
//! - Class definitions with constructors, destructors and operators
//! - Error recovery

use std::rc::Rc;

use super::{
    expr::read_expr,
    lookups::BindingPower,
    parser::{parse, Parser},
};
use crate::{
    ast::{
        ast::{Arena, ExprId, ProgramId, StatId},
        expressions::ExprKind,
        statements::{Access, StatKind},
        types::{typing_to_string, CORE_ARRAY, CORE_FUNCTION},
    },
    errors::errors::{Diagnostics, ErrorImpl},
    Source,
};

fn parse_source(text: &str) -> (Arena, ProgramId, Diagnostics) {
    let mut arena = Arena::new();
    let mut diagnostics = Diagnostics::new();
    let program = parse(&Source::new("test.og", text), &mut arena, &mut diagnostics);
    (arena, program, diagnostics)
}

/// Parses one expression and returns it with the value of the token after it.
fn parse_expr(text: &str) -> (Arena, ExprId, String, Diagnostics) {
    let mut arena = Arena::new();
    let mut diagnostics = Diagnostics::new();
    let (expr, next) = {
        let mut parser = Parser::new(text, Rc::new("test.og".to_string()), &mut arena, &mut diagnostics);
        let expr = read_expr(&mut parser, BindingPower::Default);
        (expr, parser.lexer.next().value)
    };
    (arena, expr, next, diagnostics)
}

fn binary(arena: &Arena, id: ExprId) -> (&str, ExprId, ExprId) {
    match &arena[id].kind {
        ExprKind::Binary { op, left, right, .. } => (op.as_str(), *left, *right),
        other => panic!("expected binary expression, found {:?}", other),
    }
}

/// Statements of the body of the function declared first in the program.
fn function_body(arena: &Arena, program: ProgramId) -> Vec<StatId> {
    let vardecl = &arena[arena[program].vardecls[0]];
    let Some(init) = vardecl.init else {
        panic!("declaration has no body");
    };
    let ExprKind::Lambda { body, .. } = &arena[init].kind else {
        panic!("declaration is not a function");
    };
    match &arena[*body].kind {
        StatKind::Block(stats) => stats.clone(),
        other => panic!("expected block, found {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter() {
    let (arena, expr, _, diagnostics) = parse_expr("1 + 2 * 3");

    assert!(diagnostics.is_empty());
    let (op, left, right) = binary(&arena, expr);
    assert_eq!(op, "+");
    assert!(matches!(&arena[left].kind, ExprKind::IntLiteral { value } if value == "1"));
    assert_eq!(binary(&arena, right).0, "*");
}

#[test]
fn test_subtraction_is_left_associative() {
    let (arena, expr, _, _) = parse_expr("a - b - c");

    let (op, left, right) = binary(&arena, expr);
    assert_eq!(op, "-");
    assert_eq!(binary(&arena, left).0, "-");
    assert!(matches!(&arena[right].kind, ExprKind::Variable { name } if name == "c"));
}

#[test]
fn test_assignment_is_right_associative() {
    let (arena, expr, _, diagnostics) = parse_expr("a = b = c");

    assert!(diagnostics.is_empty());
    let (op, left, right) = binary(&arena, expr);
    assert_eq!(op, "=");
    assert!(matches!(&arena[left].kind, ExprKind::Variable { name } if name == "a"));
    assert_eq!(binary(&arena, right).0, "=");
}

#[test]
fn test_compound_assignment_is_one_operator() {
    let (arena, expr, _, diagnostics) = parse_expr("a <<~= b + 1");

    assert!(diagnostics.is_empty());
    let (op, _, right) = binary(&arena, expr);
    assert_eq!(op, "<<~=");
    assert_eq!(binary(&arena, right).0, "+");
}

#[test]
fn test_prefix_binds_looser_than_member() {
    let (arena, expr, _, _) = parse_expr("-a.b * c");

    let (op, left, _) = binary(&arena, expr);
    assert_eq!(op, "*");
    match &arena[left].kind {
        ExprKind::Unary { op, operand } => {
            assert_eq!(op, "-");
            assert!(matches!(&arena[*operand].kind, ExprKind::Member { name, .. } if name == "b"));
        }
        other => panic!("expected unary expression, found {:?}", other),
    }
}

#[test]
fn test_call_subscript_and_member_chain() {
    let (arena, expr, _, diagnostics) = parse_expr("list.items[0](x, y)");

    assert!(diagnostics.is_empty());
    let ExprKind::Call { callee, args } = &arena[expr].kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    let ExprKind::Subscript { object, .. } = &arena[*callee].kind else {
        panic!("expected subscript");
    };
    assert!(matches!(&arena[*object].kind, ExprKind::Member { name, .. } if name == "items"));
}

#[test]
fn test_call_recovers_missing_comma() {
    let (arena, expr, next, diagnostics) = parse_expr("f(1, 2 3) after");

    assert!(!diagnostics.is_empty());
    assert_eq!(diagnostics.iter().next().unwrap().error, ErrorImpl::UnexpectedTokens);
    let ExprKind::Call { args, .. } = &arena[expr].kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    assert_eq!(next, "after");
}

#[test]
fn test_call_trailing_comma() {
    let (arena, expr, _, diagnostics) = parse_expr("f(1,)");

    assert_eq!(diagnostics.messages(), vec!["trailing comma in argument list".to_string()]);
    let ExprKind::Call { args, .. } = &arena[expr].kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
}

#[test]
fn test_unclosed_call_at_line_end() {
    let (_, _, _, diagnostics) = parse_expr("f(1\nx");

    let names: Vec<&str> = diagnostics.iter().map(|d| d.get_error_name()).collect();
    assert_eq!(names, vec!["UnclosedCall", "ExpectedToken"]);
}

#[test]
fn test_scope_resolution_folds_names() {
    let (arena, expr, _, diagnostics) = parse_expr("core::math::pi");

    assert!(diagnostics.is_empty());
    assert!(matches!(&arena[expr].kind, ExprKind::Variable { name } if name == "core::math::pi"));
}

#[test]
fn test_scope_resolution_needs_a_name() {
    let (arena, expr, _, diagnostics) = parse_expr("(a)::b");

    assert_eq!(diagnostics.messages(), vec!["expected namespace".to_string()]);
    assert!(matches!(&arena[expr].kind, ExprKind::Variable { name } if name == "<error namespace>::b"));
}

#[test]
fn test_unclosed_parenthesis() {
    let (arena, expr, _, diagnostics) = parse_expr("(1 + 2");

    assert_eq!(
        diagnostics.messages(),
        vec![
            "unclosed parenthesis".to_string(),
            "expected symbol ')' to close parenthesis, found <eof>".to_string()
        ]
    );
    assert!(matches!(&arena[expr].kind, ExprKind::Parenthesized(_)));
}

#[test]
fn test_unexpected_tokens_are_retried() {
    let (arena, expr, _, diagnostics) = parse_expr(") ] 5");

    assert_eq!(
        diagnostics.messages(),
        vec!["unexpected symbol ')'".to_string(), "unexpected symbol ']'".to_string()]
    );
    assert!(matches!(&arena[expr].kind, ExprKind::IntLiteral { value } if value == "5"));
}

#[test]
fn test_unexpected_eof_yields_error_node() {
    let (arena, expr, _, diagnostics) = parse_expr("");

    assert_eq!(diagnostics.messages(), vec!["unexpected <eof>".to_string()]);
    assert!(matches!(arena[expr].kind, ExprKind::Error));
}

#[test]
fn test_missing_semicolon_at_newline() {
    let (arena, program, diagnostics) = parse_source("int x = 1\nint y = 2;");

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.error, ErrorImpl::MissingSemicolon);
    assert_eq!(diagnostic.span.start.0, 9);

    let names: Vec<&str> = arena[program]
        .vardecls
        .iter()
        .map(|v| arena[*v].name.as_str())
        .collect();
    assert_eq!(names, vec!["x", "y"]);
}

#[test]
fn test_missing_semicolon_on_same_line() {
    let (arena, program, diagnostics) = parse_source("int x = 1 int y = 2;");

    assert_eq!(
        diagnostics.messages(),
        vec!["expected symbol ';' to end statement, found identifier 'int'".to_string()]
    );
    assert_eq!(arena[program].vardecls.len(), 2);
}

#[test]
fn test_array_typing_nests() {
    let (arena, program, diagnostics) = parse_source("int[][] grid;");

    assert!(diagnostics.is_empty());
    let typing = arena[arena[program].vardecls[0]].typing.unwrap();
    assert_eq!(arena[typing].name, CORE_ARRAY);
    let inner = arena[typing].templates[0];
    assert_eq!(arena[inner].name, CORE_ARRAY);
    assert_eq!(arena[arena[inner].templates[0]].name, "int");
    assert_eq!(typing_to_string(&arena, typing), "int[][]");
}

#[test]
fn test_generic_typing() {
    let (arena, program, diagnostics) = parse_source("map<string, int[]> counts;");

    assert!(diagnostics.is_empty());
    let typing = arena[arena[program].vardecls[0]].typing.unwrap();
    assert_eq!(arena[typing].templates.len(), 2);
    assert_eq!(typing_to_string(&arena, typing), "map<string, int[]>");
}

#[test]
fn test_template_trailing_comma() {
    let (arena, program, diagnostics) = parse_source("box<int,> b;");

    assert_eq!(diagnostics.messages(), vec!["trailing comma on template types".to_string()]);
    let typing = arena[arena[program].vardecls[0]].typing.unwrap();
    assert_eq!(arena[typing].templates.len(), 1);
}

#[test]
fn test_function_declaration() {
    let (arena, program, diagnostics) = parse_source("int add(int a, int b) { return a + b; }");

    assert!(diagnostics.is_empty());
    let vardecl = &arena[arena[program].vardecls[0]];
    assert_eq!(vardecl.name, "add");

    let typing = vardecl.typing.unwrap();
    assert_eq!(arena[typing].name, CORE_FUNCTION);
    assert_eq!(arena[typing].templates.len(), 3);

    let ExprKind::Lambda { params, return_type, .. } = &arena[vardecl.init.unwrap()].kind else {
        panic!("expected lambda");
    };
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(*return_type, Some(arena[typing].templates[0]));

    let body = function_body(&arena, program);
    assert!(matches!(arena[body[0]].kind, StatKind::Return(Some(_))));
}

#[test]
fn test_parameter_trailing_comma() {
    let (_, _, diagnostics) = parse_source("int f(int a,) { }");

    assert_eq!(diagnostics.messages(), vec!["trailing comma in parameter list".to_string()]);
}

#[test]
fn test_statement_disambiguation() {
    let (arena, program, diagnostics) =
        parse_source("int main() { int x = 1; x = x + 1; foo(x); a < b; box<int> y; }");

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    let body = function_body(&arena, program);
    assert_eq!(body.len(), 5);
    assert!(matches!(arena[body[0]].kind, StatKind::VarDecl(_)));
    assert!(matches!(arena[body[1]].kind, StatKind::Expression(_)));
    assert!(matches!(arena[body[2]].kind, StatKind::Expression(_)));
    assert!(matches!(arena[body[3]].kind, StatKind::Expression(_)));
    assert!(matches!(arena[body[4]].kind, StatKind::VarDecl(_)));
}

#[test]
fn test_control_flow_statements() {
    let (arena, program, diagnostics) =
        parse_source("int main() { if x { return; } else return 1; do { x; } ;; }");

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    let body = function_body(&arena, program);
    assert_eq!(body.len(), 2);

    let StatKind::If { body: then, else_body, .. } = &arena[body[0]].kind else {
        panic!("expected if");
    };
    assert!(matches!(&arena[*then].kind, StatKind::Block(stats) if stats.len() == 1));
    assert!(matches!(arena[else_body.unwrap()].kind, StatKind::Return(Some(_))));
    assert!(matches!(&arena[body[1]].kind, StatKind::Block(stats) if stats.len() == 1));
}

#[test]
fn test_unclosed_block() {
    let (_, _, diagnostics) = parse_source("int main() { x;");

    let names: Vec<&str> = diagnostics.iter().map(|d| d.get_error_name()).collect();
    assert_eq!(names, vec!["UnclosedBlock", "ExpectedToken"]);
}

#[test]
fn test_program_header() {
    let (arena, program, diagnostics) =
        parse_source("namespace geo::shapes;\nimport core;\nimport io;\nalias number = int;\nnumber n;");

    assert!(diagnostics.is_empty());
    let program = &arena[program];
    assert_eq!(program.namespace_name, "geo::shapes");
    let imports: Vec<&str> = program.imports.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(imports, vec!["core", "io"]);
    assert_eq!(arena[program.aliases["number"]].name, "int");
    assert_eq!(program.vardecls.len(), 1);
}

#[test]
fn test_junk_at_top_level_is_skipped() {
    let (arena, program, diagnostics) = parse_source("+ int x;");

    assert_eq!(
        diagnostics.messages(),
        vec!["expected identifier, found symbol".to_string()]
    );
    assert_eq!(arena[program].vardecls.len(), 1);
}

#[test]
fn test_class_members() {
    let source = "class point {
        int x;
    public:
        point(int x) { }
        ~point() { }
        int operator+(point other) { }
        int operator[](int i) { }
        int operator[]=(int i, int v) { }
        int operator()() { }
        int operator==(point other) { }
    }";
    let (arena, program, diagnostics) = parse_source(source);

    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    let class = &arena[arena[program].classes[0]];
    assert_eq!(class.name, "point");
    assert!(!class.is_struct);

    let names: Vec<&str> = class.fields.iter().map(|f| arena[*f].name.as_str()).collect();
    assert_eq!(
        names,
        vec!["x", ".ctor", ".dtor", "operator+", "operator[", "operator[=", "operator(", "operator=="]
    );
    assert_eq!(class.accesses[0], Access::Private);
    assert!(class.accesses[1..].iter().all(|a| *a == Access::Public));

    let ctor = &arena[class.fields[1]];
    assert!(ctor.typing.is_none());
    assert!(ctor.init.is_some());

    let subscript_assign = arena[class.fields[5]].typing.unwrap();
    assert_eq!(arena[subscript_assign].templates.len(), 3);
}

#[test]
fn test_cannot_override_assignment() {
    let (arena, program, diagnostics) =
        parse_source("struct s { int operator=(int v) { } int operator!() { } int operator-() { } }");

    assert_eq!(
        diagnostics.messages(),
        vec![
            "cannot override operator =".to_string(),
            "cannot override operator !".to_string()
        ]
    );
    let class = &arena[arena[program].classes[0]];
    assert!(class.is_struct);
    assert_eq!(class.fields.len(), 3);
    assert_eq!(arena[class.fields[0]].name, "operator=");
}

#[test]
fn test_variadic_generics() {
    let (arena, program, diagnostics) = parse_source("struct function<T, Args...> { }");

    assert!(diagnostics.is_empty());
    let class = &arena[arena[program].classes[0]];
    assert_eq!(class.generics, vec!["T".to_string(), "Args".to_string()]);
    assert!(class.is_variadic);
}

#[test]
fn test_unclosed_class() {
    let (arena, program, diagnostics) = parse_source("class a { int x;");

    let names: Vec<&str> = diagnostics.iter().map(|d| d.get_error_name()).collect();
    assert_eq!(names, vec!["UnclosedClass", "ExpectedToken"]);
    assert_eq!(arena[arena[program].classes[0]].fields.len(), 1);
}
