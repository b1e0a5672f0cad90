//! Type expressions used in universe files and on the command line.
//!
//! Grammar:
//!
//! ```text
//! expr  := NAME
//!        | NAME '<' expr (',' expr)* '>'    closed or partially open
//!        | NAME '<' ','* '>'                open definition (`Range<>`, `Map<,>`)
//! NAME  := [A-Za-z_][A-Za-z0-9_.]*
//! ```
//!
//! Argument lists nest at most [`MAX_NESTING_DEPTH`] levels deep.

use anyhow::{Context, Result, bail};
use liskov_solver::{DepthCounter, TypeId, TypeModel, TypeUniverse};

/// Deepest accepted `<...>` nesting in a type expression.
pub const MAX_NESTING_DEPTH: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A plain name: a non-generic type or a generic parameter in scope.
    Name(String),
    /// A generic definition applied to arguments.
    Apply { name: String, args: Vec<TypeExpr> },
    /// An open generic definition written with empty argument slots.
    Open { name: String, arity: usize },
}

impl TypeExpr {
    pub fn name(&self) -> &str {
        match self {
            TypeExpr::Name(name) | TypeExpr::Apply { name, .. } | TypeExpr::Open { name, .. } => {
                name
            }
        }
    }
}

pub fn parse_type_expr(input: &str) -> Result<TypeExpr> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().peekable(),
        depth: DepthCounter::new(MAX_NESTING_DEPTH),
    };
    let expr = parser.expr()?;
    parser.skip_whitespace();
    if let Some((pos, ch)) = parser.chars.next() {
        bail!("unexpected '{ch}' at offset {pos} in type expression '{input}'");
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    depth: DepthCounter,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.chars.next();
                Ok(())
            }
            Some(ch) => bail!(
                "expected '{expected}' but found '{ch}' in type expression '{}'",
                self.input
            ),
            None => bail!(
                "expected '{expected}' but reached the end of type expression '{}'",
                self.input
            ),
        }
    }

    fn ident(&mut self) -> Result<String> {
        self.skip_whitespace();
        let mut name = String::new();
        if let Some((_, ch)) = self.chars.next_if(|(_, ch)| ch.is_ascii_alphabetic() || *ch == '_') {
            name.push(ch);
        } else {
            bail!("expected a type name in type expression '{}'", self.input);
        }
        while let Some((_, ch)) = self
            .chars
            .next_if(|(_, ch)| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '.')
        {
            name.push(ch);
        }
        Ok(name)
    }

    fn expr(&mut self) -> Result<TypeExpr> {
        if !self.depth.enter() {
            bail!(
                "type expression nests deeper than {MAX_NESTING_DEPTH} levels: '{}'",
                truncated(self.input)
            );
        }
        let expr = self.expr_inner();
        self.depth.leave();
        expr
    }

    fn expr_inner(&mut self) -> Result<TypeExpr> {
        let name = self.ident()?;
        if self.peek() != Some('<') {
            return Ok(TypeExpr::Name(name));
        }
        self.chars.next();

        if matches!(self.peek(), Some('>' | ',')) {
            let mut arity = 1;
            while self.peek() == Some(',') {
                self.chars.next();
                arity += 1;
            }
            self.expect('>')?;
            return Ok(TypeExpr::Open { name, arity });
        }

        let mut args = vec![self.expr()?];
        while self.peek() == Some(',') {
            self.chars.next();
            args.push(self.expr()?);
        }
        self.expect('>')?;
        Ok(TypeExpr::Apply { name, args })
    }
}

/// Long inputs are cut in error messages.
fn truncated(input: &str) -> String {
    const SHOWN: usize = 64;
    match input.char_indices().nth(SHOWN) {
        Some((end, _)) => format!("{}...", &input[..end]),
        None => input.to_string(),
    }
}

/// Resolve an expression to a universe type.
///
/// With `scope` set to a generic declaration, that declaration's parameter
/// names resolve to its parameters and shadow declared types.
pub fn resolve_type_expr(
    universe: &TypeUniverse,
    expr: &TypeExpr,
    scope: Option<TypeId>,
) -> Result<TypeId> {
    match expr {
        TypeExpr::Name(name) => {
            if let Some(param) = scope.and_then(|decl| universe.parameter_named(decl, name).ok()) {
                return Ok(param);
            }
            let ty = lookup(universe, name)?;
            if universe.is_generic(ty) {
                let arity = universe.generic_arguments(ty).len();
                bail!(
                    "'{name}' is generic; write '{name}<{}>' for the open definition or supply {arity} type argument(s)",
                    ",".repeat(arity.saturating_sub(1))
                );
            }
            Ok(ty)
        }
        TypeExpr::Apply { name, args } => {
            let definition = lookup(universe, name)?;
            let args = args
                .iter()
                .map(|arg| resolve_type_expr(universe, arg, scope))
                .collect::<Result<Vec<_>>>()?;
            universe
                .apply(definition, &args)
                .with_context(|| format!("cannot apply '{name}'"))
        }
        TypeExpr::Open { name, arity } => {
            let definition = lookup(universe, name)?;
            let expected = universe.generic_arguments(definition).len();
            if !universe.is_generic(definition) || expected != *arity {
                bail!("'{name}' takes {expected} type argument(s), open form has {arity}");
            }
            Ok(definition)
        }
    }
}

/// Parse and resolve in one step.
pub fn resolve_type_str(
    universe: &TypeUniverse,
    input: &str,
    scope: Option<TypeId>,
) -> Result<TypeId> {
    let expr = parse_type_expr(input)?;
    resolve_type_expr(universe, &expr, scope)
}

fn lookup(universe: &TypeUniverse, name: &str) -> Result<TypeId> {
    match universe.lookup(name) {
        Some(ty) => Ok(ty),
        None => bail!("unknown type '{name}'"),
    }
}
