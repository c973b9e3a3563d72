use super::{RenderError, Result};
use crate::ast::{Entry, EntryKey, Expr, ExprId, ExprKind, Literal};
use crate::escape::quote_string;
use crate::operators::Operator;
use crate::source::SourceInfo;

/// Visits an expression tree and writes it out as source text.
pub(super) struct Unparser<'a> {
    info: &'a SourceInfo,
    pad_positions: bool,
    string: String,
    /// Length of `string` in characters.
    len: usize,
}

impl<'a> Unparser<'a> {
    pub fn new(info: &'a SourceInfo, pad_positions: bool) -> Self {
        Self {
            info,
            pad_positions,
            string: String::new(),
            len: 0,
        }
    }

    pub fn finish(self) -> String {
        self.string
    }

    pub fn visit(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Ident(name) => {
                self.pad(expr.id);
                self.write(name);
                Ok(())
            }
            ExprKind::Select {
                operand,
                field,
                test_only,
            } => self.visit_select(expr.id, operand, field, *test_only),
            ExprKind::Call {
                target,
                function,
                args,
            } => self.visit_call(expr.id, target.as_deref(), function, args),
            ExprKind::List(elements) => {
                self.pad(expr.id);
                self.delimited("[", "]", |printer| {
                    printer.separated(elements, ",", |printer, element| printer.visit(element))
                })
            }
            ExprKind::Struct {
                type_name: Some(type_name),
                entries,
            } => self.visit_message(expr.id, type_name, entries),
            ExprKind::Struct {
                type_name: None,
                entries,
            } => self.visit_map(expr.id, entries),
            ExprKind::Literal(literal) => {
                self.pad(expr.id);
                self.literal(literal);
                Ok(())
            }
            // TODO: Print the macro call a comprehension was expanded from, once
            // trees record which call each comprehension replaces.
            ExprKind::Comprehension(_) => Err(RenderError::Unimplemented {
                id: expr.id,
                kind: expr.kind_name(),
            }),
        }
    }

    fn visit_select(&mut self, id: ExprId, operand: &Expr, field: &str, test_only: bool) -> Result<()> {
        if test_only {
            self.write("has(");
        }

        self.visit(operand)?;
        self.pad(id);
        self.write(".");
        self.write(field);

        if test_only {
            self.write(")");
        }

        Ok(())
    }

    fn visit_call(
        &mut self,
        id: ExprId,
        target: Option<&Expr>,
        function: &str,
        args: &[Expr],
    ) -> Result<()> {
        match Operator::find(function) {
            Some(Operator::Conditional) => self.visit_conditional(id, args),
            Some(Operator::Index) => self.visit_index(id, args),
            Some(op @ (Operator::LogicalNot | Operator::Negate)) => self.visit_unary(id, op, args),
            Some(op) => self.visit_binary(id, op, args),
            None => self.visit_function(id, target, function, args),
        }
    }

    fn visit_conditional(&mut self, id: ExprId, args: &[Expr]) -> Result<()> {
        let [condition, then, otherwise] = operands(id, Operator::Conditional, args)?;

        self.maybe_nested(condition, is_conditional(condition))?;
        self.write(" ");
        self.pad(id);
        self.write("? ");
        self.maybe_nested(then, is_conditional(then))?;
        self.write(" : ");
        self.maybe_nested(otherwise, is_conditional(otherwise))
    }

    fn visit_index(&mut self, id: ExprId, args: &[Expr]) -> Result<()> {
        let [operand, index] = operands(id, Operator::Index, args)?;

        self.visit(operand)?;
        self.pad(id);
        self.delimited("[", "]", |printer| printer.visit(index))
    }

    /// Compound operands are printed without parentheses, so `-(a + b)` comes
    /// out as `-a + b`.
    fn visit_unary(&mut self, id: ExprId, op: Operator, args: &[Expr]) -> Result<()> {
        let [operand] = operands(id, op, args)?;

        self.pad(id);
        self.write(op.symbol());
        self.visit(operand)
    }

    fn visit_binary(&mut self, id: ExprId, op: Operator, args: &[Expr]) -> Result<()> {
        let [lhs, rhs] = operands(id, op, args)?;

        let lhs_nested = binds_looser(lhs, op);
        let rhs_nested =
            binds_looser(rhs, op) || (op.is_left_recursive() && binds_same(rhs, op));

        self.maybe_nested(lhs, lhs_nested)?;
        self.write(" ");
        self.pad(id);
        self.write(op.symbol());
        self.write(" ");
        self.maybe_nested(rhs, rhs_nested)
    }

    fn visit_function(
        &mut self,
        id: ExprId,
        target: Option<&Expr>,
        function: &str,
        args: &[Expr],
    ) -> Result<()> {
        if !is_function_name(function) {
            return Err(RenderError::UnknownOperator {
                id,
                function: function.into(),
            });
        }

        if let Some(target) = target {
            self.visit(target)?;
            self.write(".");
        }

        self.write(function);
        self.pad(id);
        self.delimited("(", ")", |printer| {
            printer.separated(args, ",", |printer, arg| printer.visit(arg))
        })
    }

    fn visit_message(&mut self, id: ExprId, type_name: &str, entries: &[Entry]) -> Result<()> {
        self.write(type_name);
        self.pad(id);
        self.delimited("{", "}", |printer| {
            printer.separated(entries, ", ", |printer, entry| {
                let EntryKey::Field(field) = &entry.key else {
                    return Err(RenderError::MalformedEntry { id: entry.id });
                };

                printer.write(field);
                printer.pad(entry.id);
                printer.write(": ");
                printer.visit(&entry.value)
            })
        })
    }

    fn visit_map(&mut self, id: ExprId, entries: &[Entry]) -> Result<()> {
        self.pad(id);
        self.delimited("{", "}", |printer| {
            printer.separated(entries, ", ", |printer, entry| {
                let EntryKey::Map(key) = &entry.key else {
                    return Err(RenderError::MalformedEntry { id: entry.id });
                };

                printer.visit(key)?;
                printer.pad(entry.id);
                printer.write(": ");
                printer.visit(&entry.value)
            })
        })
    }

    fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Bool(value) => self.write(if *value { "true" } else { "false" }),
            Literal::Bytes(bytes) => {
                self.write("b\"");
                self.write(&String::from_utf8_lossy(bytes));
                self.write("\"");
            }
            Literal::Double(value) => {
                // Debug formatting keeps the `.0` of integral values, unlike
                // `%g`-style formatting, and writes exponents without a sign
                // (`1e21`, not `1e+21`).
                self.write(&format!("{:?}", value.0));
            }
            Literal::Int(value) => self.write(&value.to_string()),
            Literal::Uint(value) => {
                self.write(&value.to_string());
                self.write("u");
            }
            Literal::Null => self.write("null"),
            Literal::String(string) => self.write(&quote_string(string)),
        }
    }

    #[inline]
    fn maybe_nested(&mut self, expr: &Expr, nested: bool) -> Result<()> {
        if nested {
            self.delimited("(", ")", |printer| printer.visit(expr))
        } else {
            self.visit(expr)
        }
    }

    #[inline]
    fn delimited<F>(&mut self, open: &str, close: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.write(open);
        f(self)?;
        self.write(close);
        Ok(())
    }

    fn separated<T, F>(&mut self, items: &[T], separator: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.write(separator);
            }
            f(self, item)?;
        }
        Ok(())
    }

    /// Adds spaces up to the recorded offset of the node, if it has not been
    /// reached yet.
    fn pad(&mut self, id: ExprId) {
        if !self.pad_positions {
            return;
        }

        if let Some(offset) = self.info.position(id) {
            if offset > self.len {
                self.string.extend(std::iter::repeat(' ').take(offset - self.len));
                self.len = offset;
            }
        }
    }

    #[inline]
    fn write(&mut self, str: &str) {
        self.string.push_str(str);
        self.len += str.chars().count();
    }
}

/// Checks that an operator call has the expected number of operands.
fn operands<const N: usize>(id: ExprId, op: Operator, args: &[Expr]) -> Result<&[Expr; N]> {
    args.try_into().map_err(|_| RenderError::Arity {
        id,
        function: op.name().into(),
        expected: N,
        found: args.len(),
    })
}

fn is_conditional(expr: &Expr) -> bool {
    expr.operator() == Some(Operator::Conditional)
}

/// Whether `expr` is an operator call that binds looser than `op`.
fn binds_looser(expr: &Expr, op: Operator) -> bool {
    expr.operator()
        .is_some_and(|other| other.precedence() < op.precedence())
}

/// Whether `expr` is an operator call that binds as tightly as `op`.
fn binds_same(expr: &Expr, op: Operator) -> bool {
    expr.operator()
        .is_some_and(|other| other.precedence() == op.precedence())
}

/// Whether a function name can be written as a call: one or more identifiers
/// joined by dots.
fn is_function_name(name: &str) -> bool {
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
