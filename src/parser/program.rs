use log::trace;

use crate::{
    ast::{
        ast::{ClassId, ExprId, VarDeclId},
        statements::{Access, ClassDef, Import, Program, VarDecl},
    },
    errors::errors::ErrorImpl,
    lexer::tokens::TokenKind,
    Span,
};

use super::{
    parser::Parser,
    stmt::{read_function_part, read_vardecl, semi},
    types::{read_typing, read_variable},
};

/// Operators that exist as infix parselets but can never be overloaded.
const NOT_OVERRIDABLE: &[&str] = &[
    "=", "*=", "/=", "%=", "+=", "-=", "<<~=", "~>>=", "&=", "|=", "^=", ".", "::",
];

pub fn read_program(parser: &mut Parser) -> Program {
    let mut program = Program::default();

    if parser.lexer.is_next_value(TokenKind::Keyword, "namespace") {
        parser.lexer.next();
        program.namespace_name = read_variable(parser).0;
        semi(parser);
    }

    while parser.lexer.is_next_value(TokenKind::Keyword, "import") {
        parser.lexer.next();
        let (name, span) = read_variable(parser);
        program.imports.push(Import { name, span });
        semi(parser);
    }

    while !parser.lexer.eof() {
        if parser.lexer.is_next_value(TokenKind::Keyword, "class")
            || parser.lexer.is_next_value(TokenKind::Keyword, "struct")
        {
            program.classes.push(read_classdef(parser));
        } else if parser.lexer.is_next_value(TokenKind::Keyword, "alias") {
            parser.lexer.next();
            let name = parser
                .lexer
                .consume_msg(TokenKind::Identifier, "in type alias")
                .value;
            parser.lexer.read_value(TokenKind::Symbol, "=");
            let typing = read_typing(parser);
            semi(parser);
            program.aliases.insert(name, typing);
        } else if parser.lexer.is_next(TokenKind::Identifier) {
            program.vardecls.push(read_vardecl(parser));
        } else {
            // Skip anything that cannot start a declaration
            parser.lexer.consume(TokenKind::Identifier);
        }
    }

    program
}

pub fn read_classdef(parser: &mut Parser) -> ClassId {
    let is_struct = parser.lexer.next().value == "struct";
    let name = parser.lexer.consume(TokenKind::Identifier);
    let mut class = ClassDef {
        name: name.value,
        name_span: name.span,
        is_struct,
        generics: vec![],
        is_variadic: false,
        fields: vec![],
        accesses: vec![],
        program: None,
    };

    if parser.lexer.is_next_value(TokenKind::Symbol, "<") {
        read_generics(parser, &mut class);
    }

    let mut access = Access::Private;
    let open = parser
        .lexer
        .read_value_msg(TokenKind::Symbol, "{", "to open class definition");

    while !parser.lexer.is_next_value(TokenKind::Symbol, "}") && !parser.lexer.eof() {
        if parser.lexer.is_next_value(TokenKind::Keyword, "private")
            || parser.lexer.is_next_value(TokenKind::Keyword, "public")
        {
            access = match parser.lexer.next().value.as_str() {
                "public" => Access::Public,
                _ => Access::Private,
            };
            parser
                .lexer
                .read_value_msg(TokenKind::Symbol, ":", "after access modifier");
            continue;
        }

        let field = if parser.lexer.is_next_value(TokenKind::Symbol, "~") {
            read_destructor(parser, &class.name)
        } else if let Some(field) = try_read_constructor(parser, &class.name) {
            field
        } else if let Some(field) = try_read_operator(parser) {
            field
        } else {
            read_vardecl(parser)
        };

        class.fields.push(field);
        class.accesses.push(access);
    }

    if !parser.lexer.is_next_value(TokenKind::Symbol, "}") {
        parser.error(ErrorImpl::UnclosedClass, open.span);
    }
    parser
        .lexer
        .read_value_msg(TokenKind::Symbol, "}", "to close class definition");

    trace!(
        "parsed class {} with {} generics and {} fields",
        class.name,
        class.generics.len(),
        class.fields.len()
    );
    parser.arena.alloc_class(class)
}

/// Reads `<T, U>` or `<T, Rest...>`; a `...` ends the list.
fn read_generics(parser: &mut Parser, class: &mut ClassDef) {
    let open = parser.lexer.next();

    while parser.lexer.is_next(TokenKind::Identifier) {
        class.generics.push(parser.lexer.next().value);
        if parser.lexer.is_next_value(TokenKind::Symbol, "...") {
            parser.lexer.next();
            class.is_variadic = true;
            break;
        }
        if parser.lexer.is_next_value(TokenKind::Symbol, ",") {
            let comma = parser.lexer.next();
            if parser.lexer.is_next_value(TokenKind::Symbol, ">") {
                parser.error(ErrorImpl::TrailingCommaOnTemplates, comma.span);
            }
        } else {
            break;
        }
    }

    if !parser.lexer.is_next_value(TokenKind::Symbol, ">")
        && !parser.lexer.try_to_close(TokenKind::Symbol, "<", ">")
    {
        parser.error(ErrorImpl::UnclosedTemplate, open.span);
    }
    parser
        .lexer
        .read_value_msg(TokenKind::Symbol, ">", "to close template");
}

fn read_destructor(parser: &mut Parser, class_name: &str) -> VarDeclId {
    let start = parser.lexer.next().span;
    let name = parser
        .lexer
        .read_value_msg(TokenKind::Identifier, class_name, "in destructor");
    let (lambda, _) = read_function_part(parser, None);
    special_member(parser, ".dtor", start, name.span, lambda)
}

/// `ClassName(` starts a constructor; anything else leaves the stream untouched.
fn try_read_constructor(parser: &mut Parser, class_name: &str) -> Option<VarDeclId> {
    if !parser.lexer.is_next_value(TokenKind::Identifier, class_name) {
        return None;
    }

    let mut speculation = parser.speculate();
    let name = speculation.lexer.next();
    if !speculation.lexer.is_next_value(TokenKind::Symbol, "(") {
        return None;
    }
    speculation.commit();

    let (lambda, _) = read_function_part(parser, None);
    Some(special_member(parser, ".ctor", name.span.clone(), name.span, lambda))
}

fn special_member(
    parser: &mut Parser,
    name: &str,
    start: Span,
    name_span: Span,
    lambda: ExprId,
) -> VarDeclId {
    let span = parser.span_from(&start);
    parser.arena.alloc_vardecl(VarDecl {
        span,
        name: name.to_string(),
        name_span,
        typing: None,
        init: Some(lambda),
    })
}

/// `Type operator<sym>(params) { body }`; anything else leaves the stream untouched.
fn try_read_operator(parser: &mut Parser) -> Option<VarDeclId> {
    let mut speculation = parser.speculate();
    let return_type = read_typing(&mut speculation);
    if !speculation.lexer.is_next_value(TokenKind::Keyword, "operator") {
        return None;
    }
    speculation.commit();

    let start = parser.lexer.next().span;
    let symbol = parser.lexer.consume(TokenKind::Symbol);
    let mut op = symbol.value;
    match op.as_str() {
        "(" => {
            parser
                .lexer
                .read_value_msg(TokenKind::Symbol, ")", "to close parenthesis");
        }
        "[" => {
            parser
                .lexer
                .read_value_msg(TokenKind::Symbol, "]", "to close bracket");
            if parser.lexer.is_next_value(TokenKind::Symbol, "=") {
                parser.lexer.next();
                op.push('=');
            }
        }
        _ => {}
    }

    let can_override = (parser.has_led(&op) || op == "[=") && !NOT_OVERRIDABLE.contains(&op.as_str());
    if !can_override {
        let span = parser.span_from(&start);
        parser.error(ErrorImpl::CannotOverrideOperator { operator: op.clone() }, span);
    }

    let name_span = parser.span_from(&start);
    let (lambda, typing) = read_function_part(parser, Some(return_type));
    let span = parser.span_from(&start);
    Some(parser.arena.alloc_vardecl(VarDecl {
        span,
        name: format!("operator{}", op),
        name_span,
        typing: Some(typing),
        init: Some(lambda),
    }))
}
