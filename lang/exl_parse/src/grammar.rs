//! The expression grammar.
//!
//! Recursive descent with precedence climbing; the state machine is the
//! call graph. Each production delegates its semantic action to a
//! [`Semantics`] implementation and yields an [`Atom`], deferring the
//! value/type/package disambiguation until the enclosing production can
//! force it.
//!
//! Binding, tightest first: primary/selector chain, unary (`! - ~`),
//! multiplicative, additive, shift, relational (including `instanceof`,
//! `=*`, `=~`), bitwise and/xor/or, logical and/or, conditional. All
//! tiers are left-associative except the conditional (right) and the
//! match operators, whose right operand re-enters the relational tier.

use tracing::trace;

use crate::atom::Atom;
use crate::cursor::{TokenCursor, TokenSource};
use crate::error::ParseError;
use crate::extensions::Extensions;
use crate::lexer::ExprToken;
use crate::literal::{decode_char, decode_float, decode_integer, unescape, Literal, LiteralError};
use crate::ops::{BinaryOp, UnaryOp};

/// Semantic actions invoked per production.
///
/// The grammar never interprets anything itself: literals, operators,
/// member access, and type resolution all go through these hooks. An
/// implementation typically builds an AST (so evaluation can be lazy and
/// repeatable), but nothing stops one from evaluating eagerly or pretty
/// printing.
pub trait Semantics {
    /// What a production yields (an AST node, a rendered string, ...).
    type Value;
    /// A resolved type reference.
    type Type: Clone;

    fn literal(&mut self, literal: Literal) -> Result<Self::Value, ParseError>;
    fn conditional(
        &mut self,
        condition: Self::Value,
        if_true: Self::Value,
        if_false: Self::Value,
    ) -> Result<Self::Value, ParseError>;
    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: Self::Value,
        rhs: Self::Value,
    ) -> Result<Self::Value, ParseError>;
    fn unary(&mut self, op: UnaryOp, operand: Self::Value) -> Result<Self::Value, ParseError>;
    fn instance_of(
        &mut self,
        subject: Self::Value,
        ty: Self::Type,
    ) -> Result<Self::Value, ParseError>;
    fn cast(&mut self, ty: Self::Type, operand: Self::Value) -> Result<Self::Value, ParseError>;

    /// A declared variable's reference, or `None` if `name` is not a
    /// variable (the grammar then treats it as a package prefix).
    fn variable(&mut self, name: &str) -> Result<Option<Self::Value>, ParseError>;
    /// Resolve a simple name against single and on-demand imports.
    fn imported_type(&mut self, simple_name: &str) -> Option<Self::Type>;
    /// Load a fully qualified type. Soft-failing: `None` means "keep
    /// treating this as a package prefix", never a hard error.
    fn load_type(&mut self, qualified_name: &str) -> Option<Self::Type>;
    /// A primitive type name (`int`, `boolean`, ...), if the semantics
    /// has a notion of it.
    fn primitive_type(&mut self, name: &str) -> Option<Self::Type>;
    /// A nested type of `outer`. Soft-failing like `load_type`.
    fn nested_type(&mut self, outer: &Self::Type, name: &str) -> Option<Self::Type>;

    fn field_access(&mut self, target: Self::Value, name: &str)
        -> Result<Self::Value, ParseError>;
    fn static_member(&mut self, ty: Self::Type, name: &str) -> Result<Self::Value, ParseError>;
    fn method_call(
        &mut self,
        target: Self::Value,
        name: &str,
        arguments: Vec<Self::Value>,
    ) -> Result<Self::Value, ParseError>;
    fn static_call(
        &mut self,
        ty: Self::Type,
        name: &str,
        arguments: Vec<Self::Value>,
    ) -> Result<Self::Value, ParseError>;
    fn index(&mut self, target: Self::Value, index: Self::Value)
        -> Result<Self::Value, ParseError>;
    fn new_instance(
        &mut self,
        ty: Self::Type,
        arguments: Vec<Self::Value>,
    ) -> Result<Self::Value, ParseError>;
    fn new_array(
        &mut self,
        element: Self::Type,
        dimensions: Vec<Self::Value>,
        extra_rank: usize,
    ) -> Result<Self::Value, ParseError>;
}

type ParsedAtom<H> = Atom<<H as Semantics>::Value, <H as Semantics>::Type>;

/// Parser for one expression over a token source.
///
/// All-or-nothing per top-level call: any expectation violation or
/// semantic-action failure aborts with positional context.
pub struct ExpressionParser<'h, P: TokenSource<ExprToken>, H: Semantics> {
    cursor: TokenCursor<ExprToken, P>,
    semantics: &'h mut H,
    extensions: Extensions,
}

impl<'h, P: TokenSource<ExprToken>, H: Semantics> ExpressionParser<'h, P, H> {
    pub fn new(source: P, semantics: &'h mut H) -> Self {
        ExpressionParser {
            cursor: TokenCursor::new(source).skipping(ExprToken::Space),
            semantics,
            extensions: Extensions::default(),
        }
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Offset of the first input byte the grammar has not consumed.
    pub fn unconsumed_offset(&self) -> usize {
        self.cursor.unconsumed_offset()
    }

    /// Parse one expression and require end of input.
    pub fn parse(mut self) -> Result<H::Value, ParseError> {
        trace!(extensions = ?self.extensions, "parse expression");
        let value = self.parse_part()?;
        self.cursor.eoi()?;
        Ok(value)
    }

    /// Parse exactly one expression, leaving any remaining tokens
    /// untouched.
    pub fn parse_part(&mut self) -> Result<H::Value, ParseError> {
        let result = self.parse_conditional().and_then(|atom| {
            let location = self.here();
            atom.into_value(&location)
        });
        result.map_err(|e| {
            let location = self.here();
            e.locate(&location)
        })
    }

    fn here(&self) -> String {
        self.cursor.location()
    }

    fn force_value(&self, atom: ParsedAtom<H>) -> Result<H::Value, ParseError> {
        let location = self.here();
        atom.into_value(&location)
    }

    fn literal_error(&self, error: LiteralError) -> ParseError {
        ParseError::syntax(error.to_string(), self.here())
    }

    // Precedence tiers, loosest first.

    fn parse_conditional(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        let condition = self.parse_logical_or()?;
        if !self.cursor.peek_read_text("?")? {
            return Ok(condition);
        }
        let condition = self.force_value(condition)?;
        let true_atom = self.parse_conditional()?;
        let if_true = self.force_value(true_atom)?;
        self.cursor.expect_text(":")?;
        let false_atom = self.parse_conditional()?;
        let if_false = self.force_value(false_atom)?;
        let value = self.semantics.conditional(condition, if_true, if_false)?;
        Ok(Atom::Value(value))
    }

    /// One left-associative binary tier: `texts[i]` maps to `ops[i]`.
    fn parse_tier(
        &mut self,
        texts: &[&str],
        ops: &[BinaryOp],
        next: fn(&mut Self) -> Result<ParsedAtom<H>, ParseError>,
    ) -> Result<ParsedAtom<H>, ParseError> {
        let mut left = next(self)?;
        while let Some(index) = self.cursor.peek_text(texts)? {
            self.cursor.read()?;
            let lhs = self.force_value(left)?;
            let right = next(self)?;
            let rhs = self.force_value(right)?;
            left = Atom::Value(self.semantics.binary(ops[index], lhs, rhs)?);
        }
        Ok(left)
    }

    fn parse_logical_or(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(&["||"], &[BinaryOp::LogicalOr], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(&["&&"], &[BinaryOp::LogicalAnd], Self::parse_bitwise_or)
    }

    fn parse_bitwise_or(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(&["|"], &[BinaryOp::BitwiseOr], Self::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(&["^"], &[BinaryOp::BitwiseXor], Self::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(&["&"], &[BinaryOp::BitwiseAnd], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        const TEXTS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];
        const OPS: [BinaryOp; 6] = [
            BinaryOp::Equal,
            BinaryOp::NotEqual,
            BinaryOp::LessEqual,
            BinaryOp::GreaterEqual,
            BinaryOp::Less,
            BinaryOp::Greater,
        ];
        let mut left = self.parse_shift()?;
        loop {
            if let Some(index) = self.cursor.peek_text(&TEXTS)? {
                self.cursor.read()?;
                let lhs = self.force_value(left)?;
                let right = self.parse_shift()?;
                let rhs = self.force_value(right)?;
                left = Atom::Value(self.semantics.binary(OPS[index], lhs, rhs)?);
            } else if self.extensions.contains(Extensions::OPERATOR_INSTANCEOF)
                && self.cursor.peek_read_text("instanceof")?
            {
                let subject = self.force_value(left)?;
                let ty = self.parse_type_name()?;
                left = Atom::Value(self.semantics.instance_of(subject, ty)?);
            } else if self.extensions.contains(Extensions::OPERATOR_GLOB)
                && self.cursor.peek_read_text("=*")?
            {
                // The right operand re-enters this tier, so chains
                // associate to the right.
                let subject = self.force_value(left)?;
                let right = self.parse_relational()?;
                let rhs = self.force_value(right)?;
                left = Atom::Value(self.semantics.binary(BinaryOp::Glob, subject, rhs)?);
            } else if self.extensions.contains(Extensions::OPERATOR_REGEX)
                && self.cursor.peek_read_text("=~")?
            {
                let subject = self.force_value(left)?;
                let right = self.parse_relational()?;
                let rhs = self.force_value(right)?;
                left = Atom::Value(self.semantics.binary(BinaryOp::Regex, subject, rhs)?);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_shift(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(
            &["<<", ">>>", ">>"],
            &[
                BinaryOp::ShiftLeft,
                BinaryOp::ShiftRightUnsigned,
                BinaryOp::ShiftRight,
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(
            &["+", "-"],
            &[BinaryOp::Add, BinaryOp::Subtract],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        self.parse_tier(
            &["*", "/", "%"],
            &[BinaryOp::Multiply, BinaryOp::Divide, BinaryOp::Remainder],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        if self.cursor.peek_read_text("!")? {
            let atom = self.parse_unary()?;
            let operand = self.force_value(atom)?;
            return Ok(Atom::Value(self.semantics.unary(UnaryOp::Not, operand)?));
        }
        if self.cursor.peek_read_text("~")? {
            let atom = self.parse_unary()?;
            let operand = self.force_value(atom)?;
            return Ok(Atom::Value(
                self.semantics.unary(UnaryOp::BitwiseNot, operand)?,
            ));
        }
        if self.cursor.peek_read_text("-")? {
            // Fold the sign into an immediately following numeric literal
            // so that -2147483648 decodes in range.
            if let Some(token) = self.cursor.peek_read(ExprToken::IntLit)? {
                let literal = decode_integer(&format!("-{}", token.text))
                    .map_err(|e| self.literal_error(e))?;
                return Ok(Atom::Value(self.semantics.literal(literal)?));
            }
            if let Some(token) = self.cursor.peek_read(ExprToken::FloatLit)? {
                let literal = decode_float(&format!("-{}", token.text))
                    .map_err(|e| self.literal_error(e))?;
                return Ok(Atom::Value(self.semantics.literal(literal)?));
            }
            let atom = self.parse_unary()?;
            let operand = self.force_value(atom)?;
            return Ok(Atom::Value(self.semantics.unary(UnaryOp::Negate, operand)?));
        }
        let primary = self.parse_primary()?;
        self.parse_selectors(primary)
    }

    // Primary and selector productions.

    fn parse_primary(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        let (token_type, text) = match self.cursor.peek()? {
            Some(t) => (t.token_type, t.text.clone()),
            None => {
                let location = self.here();
                return Err(ParseError::syntax(
                    "unexpected end of input in expression",
                    location,
                ));
            }
        };
        match token_type {
            ExprToken::IntLit => {
                let token = self.cursor.read()?;
                let literal = decode_integer(&token.text).map_err(|e| self.literal_error(e))?;
                Ok(Atom::Value(self.semantics.literal(literal)?))
            }
            ExprToken::FloatLit => {
                let token = self.cursor.read()?;
                let literal = decode_float(&token.text).map_err(|e| self.literal_error(e))?;
                Ok(Atom::Value(self.semantics.literal(literal)?))
            }
            ExprToken::CharLit => {
                let token = self.cursor.read()?;
                let body = token.captured(0).unwrap_or_default();
                let c = decode_char(body).map_err(|e| self.literal_error(e))?;
                Ok(Atom::Value(self.semantics.literal(Literal::Char(c))?))
            }
            ExprToken::StrLit => {
                let token = self.cursor.read()?;
                let body = token.captured(0).unwrap_or_default();
                let s = unescape(body).map_err(|e| self.literal_error(e))?;
                Ok(Atom::Value(self.semantics.literal(Literal::Str(s))?))
            }
            ExprToken::Punct if text == "(" => {
                self.cursor.read()?;
                let inner = self.parse_conditional()?;
                self.cursor.expect_text(")")?;
                match inner {
                    // A parenthesized type immediately followed by a
                    // primary is a cast; anything else passes through.
                    Atom::Type(ty) => {
                        if self.peek_starts_cast_operand()? {
                            let operand_atom = self.parse_unary()?;
                            let operand = self.force_value(operand_atom)?;
                            Ok(Atom::Value(self.semantics.cast(ty, operand)?))
                        } else {
                            Ok(Atom::Type(ty))
                        }
                    }
                    other => Ok(other),
                }
            }
            ExprToken::Ident => {
                self.cursor.read()?;
                match text.as_str() {
                    "true" => Ok(Atom::Value(self.semantics.literal(Literal::Bool(true))?)),
                    "false" => Ok(Atom::Value(self.semantics.literal(Literal::Bool(false))?)),
                    "null" => Ok(Atom::Value(self.semantics.literal(Literal::Null)?)),
                    "new" => self.parse_new(),
                    _ => {
                        if let Some(ty) = self.semantics.primitive_type(&text) {
                            return Ok(Atom::Type(ty));
                        }
                        if let Some(ty) = self.semantics.imported_type(&text) {
                            return Ok(Atom::Type(ty));
                        }
                        if let Some(value) = self.semantics.variable(&text)? {
                            return Ok(Atom::Value(value));
                        }
                        Ok(Atom::Package(text))
                    }
                }
            }
            _ => {
                let location = self.here();
                Err(ParseError::syntax(
                    format!("unexpected token {text:?} in expression"),
                    location,
                ))
            }
        }
    }

    fn peek_starts_cast_operand(&mut self) -> Result<bool, ParseError> {
        Ok(match self.cursor.peek()? {
            Some(t) => match t.token_type {
                ExprToken::IntLit
                | ExprToken::FloatLit
                | ExprToken::CharLit
                | ExprToken::StrLit
                | ExprToken::Ident => true,
                ExprToken::Punct => matches!(t.text.as_str(), "(" | "!" | "~" | "-"),
                ExprToken::Space => false,
            },
            None => false,
        })
    }

    fn parse_selectors(&mut self, mut atom: ParsedAtom<H>) -> Result<ParsedAtom<H>, ParseError> {
        loop {
            if self.cursor.peek_read_text(".")? {
                atom = self.parse_dot_selector(atom)?;
            } else if self.cursor.peek_read_text("[")? {
                let target = self.force_value(atom)?;
                let index_atom = self.parse_conditional()?;
                let index = self.force_value(index_atom)?;
                self.cursor.expect_text("]")?;
                atom = Atom::Value(self.semantics.index(target, index)?);
            } else if self.cursor.peek_text(&["("])?.is_some()
                && self.extensions.contains(Extensions::NEW_WITHOUT_KEYWORD)
                && matches!(atom, Atom::Type(_))
            {
                self.cursor.expect_text("(")?;
                let arguments = self.parse_arguments()?;
                match atom {
                    Atom::Type(ty) => {
                        atom = Atom::Value(self.semantics.new_instance(ty, arguments)?);
                    }
                    other => return Ok(other), // guarded above
                }
            } else {
                return Ok(atom);
            }
        }
    }

    fn parse_dot_selector(&mut self, atom: ParsedAtom<H>) -> Result<ParsedAtom<H>, ParseError> {
        let name = self.cursor.expect(ExprToken::Ident)?.text;
        if self.cursor.peek_read_text("(")? {
            let arguments = self.parse_arguments()?;
            return match atom {
                Atom::Value(target) => Ok(Atom::Value(self.semantics.method_call(
                    target,
                    &name,
                    arguments,
                )?)),
                Atom::Type(ty) => {
                    Ok(Atom::Value(self.semantics.static_call(ty, &name, arguments)?))
                }
                Atom::Package(package) => {
                    let location = self.here();
                    Err(ParseError::syntax(
                        format!("cannot invoke {name:?} on unknown package {package:?}"),
                        location,
                    ))
                }
            };
        }
        match atom {
            Atom::Value(target) => Ok(Atom::Value(self.semantics.field_access(target, &name)?)),
            Atom::Type(ty) => {
                if let Some(nested) = self.semantics.nested_type(&ty, &name) {
                    Ok(Atom::Type(nested))
                } else {
                    Ok(Atom::Value(self.semantics.static_member(ty, &name)?))
                }
            }
            Atom::Package(package) => {
                let qualified = format!("{package}.{name}");
                Ok(match self.semantics.load_type(&qualified) {
                    Some(ty) => Atom::Type(ty),
                    None => Atom::Package(qualified),
                })
            }
        }
    }

    /// Arguments after an already-consumed `(`, through the closing `)`.
    fn parse_arguments(&mut self) -> Result<Vec<H::Value>, ParseError> {
        let mut arguments = Vec::new();
        if self.cursor.peek_read_text(")")? {
            return Ok(arguments);
        }
        loop {
            let atom = self.parse_conditional()?;
            arguments.push(self.force_value(atom)?);
            if self.cursor.peek_read_text(",")? {
                continue;
            }
            self.cursor.expect_text(")")?;
            return Ok(arguments);
        }
    }

    fn parse_new(&mut self) -> Result<ParsedAtom<H>, ParseError> {
        let ty = self.parse_type_name()?;
        if self.cursor.peek_read_text("(")? {
            let arguments = self.parse_arguments()?;
            return Ok(Atom::Value(self.semantics.new_instance(ty, arguments)?));
        }
        if self.cursor.peek_text(&["["])?.is_some() {
            return self.parse_array_creation(ty);
        }
        if self.extensions.contains(Extensions::NEW_WITHOUT_PARENS) {
            return Ok(Atom::Value(self.semantics.new_instance(ty, Vec::new())?));
        }
        let location = self.here();
        Err(ParseError::syntax(
            "expected \"(\" or \"[\" after type name in new expression",
            location,
        ))
    }

    fn parse_array_creation(&mut self, element: H::Type) -> Result<ParsedAtom<H>, ParseError> {
        self.cursor.expect_text("[")?;
        let first = self.parse_conditional()?;
        let mut dimensions = vec![self.force_value(first)?];
        self.cursor.expect_text("]")?;
        let mut extra_rank = 0;
        while self.cursor.peek_read_text("[")? {
            if self.cursor.peek_read_text("]")? {
                extra_rank += 1;
                continue;
            }
            if extra_rank > 0 {
                let location = self.here();
                return Err(ParseError::syntax(
                    "dimension expression after empty bracket pair",
                    location,
                ));
            }
            let atom = self.parse_conditional()?;
            dimensions.push(self.force_value(atom)?);
            self.cursor.expect_text("]")?;
        }
        let value = self.semantics.new_array(element, dimensions, extra_rank)?;
        Ok(Atom::Value(value))
    }

    /// A primitive, imported, or qualified type name. Each unresolved
    /// `.segment` extends the package prefix; only exhausting the chain
    /// without resolving is an error.
    fn parse_type_name(&mut self) -> Result<H::Type, ParseError> {
        let first = self.cursor.expect(ExprToken::Ident)?.text;
        if let Some(primitive) = self.semantics.primitive_type(&first) {
            return Ok(primitive);
        }
        let mut ty = self.semantics.imported_type(&first);
        let mut package = if ty.is_some() { String::new() } else { first };
        while self.cursor.peek_text(&["."])?.is_some() {
            // The dot may belong to the enclosing expression once the
            // type is resolved and the next segment is not a nested type;
            // in a type-name context, though, the chain owns every dot.
            self.cursor.expect_text(".")?;
            let segment = self.cursor.expect(ExprToken::Ident)?.text;
            match ty.take() {
                Some(outer) => {
                    let nested = self.semantics.nested_type(&outer, &segment).ok_or_else(|| {
                        let location = self.here();
                        ParseError::syntax(
                            format!("unknown nested type {segment:?}"),
                            location,
                        )
                    })?;
                    ty = Some(nested);
                }
                None => {
                    let qualified = format!("{package}.{segment}");
                    match self.semantics.load_type(&qualified) {
                        Some(resolved) => ty = Some(resolved),
                        None => package = qualified,
                    }
                }
            }
        }
        ty.ok_or_else(|| {
            let location = self.here();
            ParseError::syntax(format!("unknown type {package:?}"), location)
        })
    }
}
