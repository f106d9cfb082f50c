//! Single-pass compiler: tokens straight to bytecode
//!
//! A Pratt parser drives code generation directly; there is no AST. Each
//! function being compiled has its own [`FunctionState`] on a stack so that
//! variable resolution can walk outwards through enclosing functions.

use bytecode_system::{Chunk, OpCode, MAX_CONSTANTS};
use core_types::{ObjRef, Value};
use memory_manager::{Heap, ObjFunction};
use tracing::debug;

use crate::error::{CompileError, CompileErrors, Location};
use crate::lexer::{Lexer, Token, TokenKind};

/// Local slots per function, slot 0 included
pub const MAX_LOCALS: usize = u8::MAX as usize + 1;
/// Captured variables per function
pub const MAX_UPVALUES: usize = u8::MAX as usize + 1;
/// Parameters per function and arguments per call
pub const MAX_ARITY: usize = u8::MAX as usize;

/// Compile `source` into a top-level script function allocated in `heap`.
///
/// Every error is collected; on failure nothing is executed but objects
/// created along the way stay in the heap until it is released.
pub fn compile(source: &str, heap: &mut Heap) -> Result<ObjRef, CompileErrors> {
    let mut compiler = Compiler::new(source, heap);
    compiler.advance();
    while !compiler.match_token(TokenKind::Eof) {
        compiler.script_declaration();
    }
    compiler.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }

    /// Binding power of `kind` in infix position
    fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::LeftParen => Precedence::Call,
            TokenKind::Minus | TokenKind::Plus => Precedence::Term,
            TokenKind::Slash | TokenKind::Star => Precedence::Factor,
            TokenKind::BangEqual | TokenKind::EqualEqual => Precedence::Equality,
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => Precedence::Comparison,
            TokenKind::And => Precedence::And,
            TokenKind::Or => Precedence::Or,
            _ => Precedence::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FunctionKind {
    #[default]
    Script,
    Function,
}

#[derive(Debug)]
struct Local<'src> {
    name: &'src str,
    /// `None` between declaration and the end of the initializer
    depth: Option<usize>,
    is_captured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UpvalueSlot {
    index: u8,
    is_local: bool,
}

#[derive(Debug, Default)]
struct FunctionState<'src> {
    function: ObjFunction,
    kind: FunctionKind,
    locals: Vec<Local<'src>>,
    upvalues: Vec<UpvalueSlot>,
    scope_depth: usize,
}

impl<'src> FunctionState<'src> {
    fn new(kind: FunctionKind, name: Option<ObjRef>) -> Self {
        Self {
            function: ObjFunction {
                name,
                ..ObjFunction::new()
            },
            kind,
            // Slot 0 holds the callee; its empty name can never be resolved.
            locals: vec![Local {
                name: "",
                depth: Some(0),
                is_captured: false,
            }],
            upvalues: Vec::new(),
            scope_depth: 0,
        }
    }
}

struct Compiler<'src, 'h> {
    lexer: Lexer<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    panic_mode: bool,
    errors: Vec<CompileError>,
    /// Innermost function last; index 0 is the script
    states: Vec<FunctionState<'src>>,
    heap: &'h mut Heap,
    /// The script ends with an expression statement whose value it returns
    script_result: bool,
}

impl<'src, 'h> Compiler<'src, 'h> {
    fn new(source: &'src str, heap: &'h mut Heap) -> Self {
        let start = Token {
            kind: TokenKind::Eof,
            lexeme: "",
            line: 1,
        };
        Self {
            lexer: Lexer::new(source),
            current: start,
            previous: start,
            panic_mode: false,
            errors: Vec::new(),
            states: vec![FunctionState::new(FunctionKind::Script, None)],
            heap,
            script_result: false,
        }
    }

    fn finish(mut self) -> Result<ObjRef, CompileErrors> {
        let line = self.previous.line;
        if self.script_result {
            self.emit_op(OpCode::Return);
        } else {
            self.emit_return();
        }
        let script = self.states.pop().unwrap_or_default();
        debug_assert!(self.states.is_empty());

        if !self.errors.is_empty() {
            debug!(errors = self.errors.len(), "compile failed");
            return Err(CompileErrors(self.errors));
        }
        debug!(
            bytes = script.function.chunk.len(),
            constants = script.function.chunk.constants.len(),
            last_line = line,
            "compiled script"
        );
        Ok(self.heap.new_function(script.function))
    }

    // ---------------------------------------------------------------------
    // Token stream
    // ---------------------------------------------------------------------

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.lexer.next_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let message = self.current.lexeme;
            self.error_at_current(message);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
        } else {
            self.error_at_current(message);
        }
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        let location = match token.kind {
            TokenKind::Eof => Location::End,
            TokenKind::Error => Location::None,
            _ => Location::Token(token.lexeme.to_string()),
        };
        self.errors.push(CompileError {
            line: token.line,
            location,
            message: message.to_string(),
        });
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => self.advance(),
            }
        }
    }

    // ---------------------------------------------------------------------
    // Emission
    // ---------------------------------------------------------------------

    fn state(&self) -> &FunctionState<'src> {
        &self.states[self.states.len() - 1]
    }

    fn state_mut(&mut self) -> &mut FunctionState<'src> {
        let top = self.states.len() - 1;
        &mut self.states[top]
    }

    fn chunk(&mut self) -> &mut Chunk {
        &mut self.state_mut().function.chunk
    }

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk().write(byte, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op.into());
    }

    fn emit_op_arg(&mut self, op: OpCode, operand: u8) {
        self.emit_op(op);
        self.emit_byte(operand);
    }

    fn emit_return(&mut self) {
        self.emit_op(OpCode::Nil);
        self.emit_op(OpCode::Return);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        let index = self.chunk().add_constant(value);
        if index >= MAX_CONSTANTS {
            self.error("Too many constants in one chunk.");
            return 0;
        }
        index as u8
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_op_arg(OpCode::Constant, index);
    }

    /// Emit a forward jump with a placeholder offset; returns the operand
    /// position for [`Compiler::patch_jump`].
    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit_op(op);
        self.emit_byte(0xff);
        self.emit_byte(0xff);
        self.chunk().len() - 2
    }

    fn patch_jump(&mut self, operand: usize) {
        let jump = self.chunk().len() - operand - 2;
        let Ok(jump) = u16::try_from(jump) else {
            self.error("Too much code to jump over.");
            return;
        };
        let [hi, lo] = jump.to_be_bytes();
        let chunk = self.chunk();
        chunk.code[operand] = hi;
        chunk.code[operand + 1] = lo;
    }

    fn emit_loop(&mut self, loop_start: usize) {
        self.emit_op(OpCode::Loop);
        let offset = self.chunk().len() - loop_start + 2;
        let offset = u16::try_from(offset).unwrap_or_else(|_| {
            self.error("Loop body too large.");
            0
        });
        let [hi, lo] = offset.to_be_bytes();
        self.emit_byte(hi);
        self.emit_byte(lo);
    }

    // ---------------------------------------------------------------------
    // Scopes and variables
    // ---------------------------------------------------------------------

    fn begin_scope(&mut self) {
        self.state_mut().scope_depth += 1;
    }

    fn end_scope(&mut self) {
        let state = self.state_mut();
        state.scope_depth -= 1;
        let depth = state.scope_depth;

        while let Some(local) = self.state().locals.last() {
            if local.depth.is_some_and(|d| d <= depth) {
                break;
            }
            let op = if local.is_captured {
                OpCode::CloseUpvalue
            } else {
                OpCode::Pop
            };
            self.emit_op(op);
            self.state_mut().locals.pop();
        }
    }

    fn identifier_constant(&mut self, name: &str) -> u8 {
        let handle = self.heap.intern_str(name);
        self.make_constant(Value::Object(handle))
    }

    fn add_local(&mut self, name: &'src str) {
        if self.state().locals.len() == MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.state_mut().locals.push(Local {
            name,
            depth: None,
            is_captured: false,
        });
    }

    fn declare_variable(&mut self) {
        let state = self.state();
        if state.scope_depth == 0 {
            return;
        }
        let name = self.previous.lexeme;
        let duplicate = state
            .locals
            .iter()
            .rev()
            .take_while(|l| l.depth.map_or(true, |d| d >= state.scope_depth))
            .any(|l| l.name == name);
        if duplicate {
            self.error("Already a variable with this name in this scope.");
        }
        self.add_local(name);
    }

    fn parse_variable(&mut self, message: &str) -> u8 {
        self.consume(TokenKind::Identifier, message);
        self.declare_variable();
        if self.state().scope_depth > 0 {
            return 0;
        }
        let name = self.previous.lexeme;
        self.identifier_constant(name)
    }

    fn mark_initialized(&mut self) {
        let state = self.state_mut();
        if state.scope_depth == 0 {
            return;
        }
        let depth = state.scope_depth;
        if let Some(local) = state.locals.last_mut() {
            local.depth = Some(depth);
        }
    }

    fn define_variable(&mut self, global: u8) {
        if self.state().scope_depth > 0 {
            self.mark_initialized();
            return;
        }
        self.emit_op_arg(OpCode::DefineGlobal, global);
    }

    fn resolve_local(&mut self, level: usize, name: &str) -> Option<u8> {
        let (slot, local) = self.states[level]
            .locals
            .iter()
            .enumerate()
            .rev()
            .find(|(_, l)| l.name == name)?;
        if local.depth.is_none() {
            self.error("Can't read local variable in its own initializer.");
        }
        Some(slot as u8)
    }

    fn resolve_upvalue(&mut self, level: usize, name: &str) -> Option<u8> {
        let enclosing = level.checked_sub(1)?;

        if let Some(slot) = self.resolve_local(enclosing, name) {
            self.states[enclosing].locals[slot as usize].is_captured = true;
            return Some(self.add_upvalue(level, slot, true));
        }
        let index = self.resolve_upvalue(enclosing, name)?;
        Some(self.add_upvalue(level, index, false))
    }

    fn add_upvalue(&mut self, level: usize, index: u8, is_local: bool) -> u8 {
        let slot = UpvalueSlot { index, is_local };
        let upvalues = &self.states[level].upvalues;
        if let Some(existing) = upvalues.iter().position(|u| *u == slot) {
            return existing as u8;
        }
        if upvalues.len() == MAX_UPVALUES {
            self.error("Too many closure variables in function.");
            return 0;
        }
        let upvalues = &mut self.states[level].upvalues;
        upvalues.push(slot);
        (upvalues.len() - 1) as u8
    }

    fn named_variable(&mut self, name: &'src str, can_assign: bool) {
        let level = self.states.len() - 1;
        let (get, set, operand) = if let Some(slot) = self.resolve_local(level, name) {
            (OpCode::GetLocal, OpCode::SetLocal, slot)
        } else if let Some(index) = self.resolve_upvalue(level, name) {
            (OpCode::GetUpvalue, OpCode::SetUpvalue, index)
        } else {
            let constant = self.identifier_constant(name);
            (OpCode::GetGlobal, OpCode::SetGlobal, constant)
        };

        if can_assign && self.match_token(TokenKind::Equal) {
            self.expression();
            self.emit_op_arg(set, operand);
        } else {
            self.emit_op_arg(get, operand);
        }
    }

    // ---------------------------------------------------------------------
    // Declarations and statements
    // ---------------------------------------------------------------------

    /// A declaration directly in the script body. An expression statement
    /// that ends the script keeps its value as the script's result.
    fn script_declaration(&mut self) {
        match self.current.kind {
            TokenKind::Fun
            | TokenKind::Var
            | TokenKind::Print
            | TokenKind::For
            | TokenKind::If
            | TokenKind::Return
            | TokenKind::While
            | TokenKind::LeftBrace => self.declaration(),
            _ => {
                self.expression();
                if !self.check(TokenKind::Eof) {
                    self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
                }
                if self.check(TokenKind::Eof) {
                    self.script_result = true;
                } else {
                    self.emit_op(OpCode::Pop);
                }
                if self.panic_mode {
                    self.synchronize();
                }
            }
        }
    }

    fn declaration(&mut self) {
        if self.match_token(TokenKind::Fun) {
            self.fun_declaration();
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn fun_declaration(&mut self) {
        let global = self.parse_variable("Expect function name.");
        self.mark_initialized();
        self.function();
        self.define_variable(global);
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");

        if self.match_token(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        );

        self.define_variable(global);
    }

    fn function(&mut self) {
        let name = self.heap.intern_str(self.previous.lexeme);
        self.states
            .push(FunctionState::new(FunctionKind::Function, Some(name)));
        self.begin_scope();

        self.consume(TokenKind::LeftParen, "Expect '(' after function name.");
        if !self.check(TokenKind::RightParen) {
            loop {
                let function = &mut self.state_mut().function;
                if function.arity as usize == MAX_ARITY {
                    self.error_at_current("Can't have more than 255 parameters.");
                } else {
                    function.arity += 1;
                }
                let constant = self.parse_variable("Expect parameter name.");
                self.define_variable(constant);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.");
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.");
        self.block();

        // No end_scope: the frame's slots go away with the frame on return.
        self.emit_return();
        let mut state = self.states.pop().unwrap_or_default();
        state.function.upvalue_count = state.upvalues.len();

        let handle = self.heap.new_function(state.function);
        let constant = self.make_constant(Value::Object(handle));
        self.emit_op_arg(OpCode::Closure, constant);
        for upvalue in state.upvalues {
            self.emit_byte(upvalue.is_local as u8);
            self.emit_byte(upvalue.index);
        }
    }

    fn statement(&mut self) {
        if self.match_token(TokenKind::Print) {
            self.print_statement();
        } else if self.match_token(TokenKind::For) {
            self.for_statement();
        } else if self.match_token(TokenKind::If) {
            self.if_statement();
        } else if self.match_token(TokenKind::Return) {
            self.return_statement();
        } else if self.match_token(TokenKind::While) {
            self.while_statement();
        } else if self.match_token(TokenKind::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn block(&mut self) {
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.declaration();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.");
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value.");
        self.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        self.emit_op(OpCode::Pop);
    }

    fn return_statement(&mut self) {
        if self.state().kind == FunctionKind::Script {
            self.error("Can't return from top-level code.");
        }

        if self.match_token(TokenKind::Semicolon) {
            self.emit_return();
        } else {
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after return value.");
            self.emit_op(OpCode::Return);
        }
    }

    fn if_statement(&mut self) {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let then_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();
        let else_jump = self.emit_jump(OpCode::Jump);

        self.patch_jump(then_jump);
        self.emit_op(OpCode::Pop);
        if self.match_token(TokenKind::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.chunk().len();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_op(OpCode::Pop);
    }

    fn for_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.");
        if self.match_token(TokenKind::Semicolon) {
            // no initializer
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.chunk().len();
        let mut exit_jump = None;
        if !self.match_token(TokenKind::Semicolon) {
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.");
            exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
            self.emit_op(OpCode::Pop);
        }

        if !self.match_token(TokenKind::RightParen) {
            let body_jump = self.emit_jump(OpCode::Jump);
            let increment_start = self.chunk().len();
            self.expression();
            self.emit_op(OpCode::Pop);
            self.consume(TokenKind::RightParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit_op(OpCode::Pop);
        }
        self.end_scope();
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let can_assign = precedence <= Precedence::Assignment;
        if !self.prefix(self.previous.kind, can_assign) {
            self.error("Expect expression.");
            return;
        }

        while precedence <= Precedence::of(self.current.kind) {
            self.advance();
            self.infix(self.previous.kind);
        }

        if can_assign && self.match_token(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    /// Compile the prefix form started by `kind`; false if there is none.
    fn prefix(&mut self, kind: TokenKind, can_assign: bool) -> bool {
        match kind {
            TokenKind::LeftParen => self.grouping(),
            TokenKind::Minus | TokenKind::Bang => self.unary(),
            TokenKind::Number => self.number(),
            TokenKind::String => self.string(),
            TokenKind::Nil | TokenKind::True | TokenKind::False => self.literal(),
            TokenKind::Identifier => self.named_variable(self.previous.lexeme, can_assign),
            _ => return false,
        }
        true
    }

    fn infix(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::LeftParen => self.call(),
            TokenKind::And => self.and(),
            TokenKind::Or => self.or(),
            _ => self.binary(),
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn number(&mut self) {
        match self.previous.lexeme.parse::<f64>() {
            Ok(n) => self.emit_constant(Value::Number(n)),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn string(&mut self) {
        let lexeme = self.previous.lexeme;
        let contents = &lexeme[1..lexeme.len() - 1];
        let handle = self.heap.intern_str(contents);
        self.emit_constant(Value::Object(handle));
    }

    fn literal(&mut self) {
        match self.previous.kind {
            TokenKind::False => self.emit_op(OpCode::False),
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            TokenKind::True => self.emit_op(OpCode::True),
            _ => {}
        }
    }

    fn unary(&mut self) {
        let operator = self.previous.kind;
        self.parse_precedence(Precedence::Unary);
        match operator {
            TokenKind::Bang => self.emit_op(OpCode::Not),
            TokenKind::Minus => self.emit_op(OpCode::Negate),
            _ => {}
        }
    }

    fn binary(&mut self) {
        let operator = self.previous.kind;
        self.parse_precedence(Precedence::of(operator).next());

        match operator {
            TokenKind::BangEqual => {
                self.emit_op(OpCode::Equal);
                self.emit_op(OpCode::Not);
            }
            TokenKind::EqualEqual => self.emit_op(OpCode::Equal),
            TokenKind::Greater => self.emit_op(OpCode::Greater),
            TokenKind::GreaterEqual => {
                self.emit_op(OpCode::Less);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Less => self.emit_op(OpCode::Less),
            TokenKind::LessEqual => {
                self.emit_op(OpCode::Greater);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Plus => self.emit_op(OpCode::Add),
            TokenKind::Minus => self.emit_op(OpCode::Subtract),
            TokenKind::Star => self.emit_op(OpCode::Multiply),
            TokenKind::Slash => self.emit_op(OpCode::Divide),
            _ => {}
        }
    }

    fn and(&mut self) {
        let end_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_op(OpCode::Pop);
        self.parse_precedence(Precedence::And);
        self.patch_jump(end_jump);
    }

    fn or(&mut self) {
        let else_jump = self.emit_jump(OpCode::JumpIfFalse);
        let end_jump = self.emit_jump(OpCode::Jump);

        self.patch_jump(else_jump);
        self.emit_op(OpCode::Pop);
        self.parse_precedence(Precedence::Or);
        self.patch_jump(end_jump);
    }

    fn call(&mut self) {
        let arg_count = self.argument_list();
        self.emit_op_arg(OpCode::Call, arg_count);
    }

    fn argument_list(&mut self) -> u8 {
        let mut count = 0usize;
        if !self.check(TokenKind::RightParen) {
            loop {
                self.expression();
                if count == MAX_ARITY {
                    self.error("Can't have more than 255 arguments.");
                } else {
                    count += 1;
                }
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after arguments.");
        count as u8
    }
}
