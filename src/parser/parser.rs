//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the parsing entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and recursive descent for statements, declarations
//! and class bodies.
//!
//! It maintains lookup tables for:
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix and postfix expressions
//! - Binding powers for operator precedence

use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
    rc::Rc,
};

use log::{debug, trace};

use crate::{
    ast::{
        ast::{Arena, ExprId, ProgramId},
        expressions::ExprKind,
    },
    errors::errors::{Diagnostics, ErrorImpl},
    lexer::{
        lexer::{Checkpoint, Lexer},
        tokens::TokenKind,
    },
    Source, Span,
};

use super::{
    lookups::{create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup},
    program::read_program,
};

/// The main parser structure that maintains parsing state.
///
/// It owns the lexer for one source, allocates nodes into a shared arena and
/// reports every problem to the diagnostics sink held by the lexer.
pub struct Parser<'a> {
    /// The on-demand token stream
    pub lexer: Lexer<'a>,
    /// Where every parsed node is allocated
    pub arena: &'a mut Arena,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for infix binding powers (precedence)
    binding_power_lookup: BPLookup,
}

impl<'a> Parser<'a> {
    /// Creates a new Parser with every operator table registered.
    ///
    /// # Arguments
    ///
    /// * `source` - Text to parse
    /// * `file` - Name of the source, carried by every span
    /// * `arena` - Arena receiving the parsed nodes
    /// * `diagnostics` - Sink for lexical and syntactic diagnostics
    pub fn new(
        source: &'a str,
        file: Rc<String>,
        arena: &'a mut Arena,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        let mut parser = Parser {
            lexer: Lexer::new(source, file, diagnostics),
            arena,
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        };
        create_token_lookups(&mut parser);
        parser
    }

    /// Registers a left denotation (infix) handler for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The symbol to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this infix operator
    pub fn led(&mut self, symbol: &'static str, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(symbol, binding_power);
        self.led_lookup.insert(symbol, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a symbol.
    pub fn nud(&mut self, symbol: &'static str, nud_fn: NUDHandler) {
        self.nud_lookup.insert(symbol, nud_fn);
    }

    /// Prefix handler for the next token, if it is a symbol that has one.
    pub fn next_nud(&mut self) -> Option<NUDHandler> {
        let token = self.lexer.peek();
        if token.kind != TokenKind::Symbol {
            return None;
        }
        self.nud_lookup.get(token.value.as_str()).copied()
    }

    /// Infix handler and binding power for the next token, if it is a symbol that has one.
    pub fn next_led(&mut self) -> Option<(LEDHandler, BindingPower)> {
        let token = self.lexer.peek();
        if token.kind != TokenKind::Symbol {
            return None;
        }
        let handler = self.led_lookup.get(token.value.as_str()).copied()?;
        let binding_power = self.binding_power_lookup.get(token.value.as_str()).copied()?;
        Some((handler, binding_power))
    }

    /// Whether `symbol` is an infix operator, which is what makes it overloadable.
    pub fn has_led(&self, symbol: &str) -> bool {
        self.led_lookup.contains_key(symbol)
    }

    pub fn error(&mut self, error: ErrorImpl, span: Span) {
        self.lexer.error(error, span);
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(kind, span)
    }

    pub fn expr_span(&self, id: ExprId) -> Span {
        self.arena[id].span.clone()
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        start.to(&self.lexer.last().span)
    }

    /// Starts a speculative region. Dropping the guard rewinds the stream.
    pub fn speculate(&mut self) -> Speculation<'_, 'a> {
        let checkpoint = self.lexer.mark();
        Speculation {
            parser: self,
            checkpoint: Some(checkpoint),
        }
    }
}

/// Guard over a speculative parse. Rewinds on drop unless committed.
///
/// Rewinding also drops every diagnostic raised since the guard was created.
/// Arena nodes allocated meanwhile stay allocated but unreferenced.
pub struct Speculation<'p, 'a> {
    parser: &'p mut Parser<'a>,
    checkpoint: Option<Checkpoint>,
}

impl Speculation<'_, '_> {
    pub fn commit(mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.parser.lexer.commit(checkpoint);
        }
    }
}

impl Drop for Speculation<'_, '_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            trace!("rewinding speculative parse");
            self.parser.lexer.rewind(checkpoint);
        }
    }
}

impl<'a> Deref for Speculation<'_, 'a> {
    type Target = Parser<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.parser
    }
}

impl<'a> DerefMut for Speculation<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.parser
    }
}

/// Parses one source into a program allocated in `arena`.
///
/// This is the main entry point for parsing. Malformed input never stops the
/// parse: every problem becomes a diagnostic and the parser resynchronizes.
pub fn parse(source: &Source, arena: &mut Arena, diagnostics: &mut Diagnostics) -> ProgramId {
    let before = diagnostics.len();
    let mut parser = Parser::new(&source.text, Rc::clone(&source.name), arena, diagnostics);
    let program = read_program(&mut parser);
    drop(parser);

    debug!(
        "parsed {}: namespace '{}', {} classes, {} declarations, {} diagnostics",
        source.name,
        program.namespace_name,
        program.classes.len(),
        program.vardecls.len(),
        diagnostics.len() - before
    );
    arena.alloc_program(program)
}
