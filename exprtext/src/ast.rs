//! Expression trees handed to the printer.
//!
//! Trees are built by a parser outside of this crate. Every node carries an
//! [`ExprId`] that is unique within its tree and is used to look up the node's
//! original source offset in a [`SourceInfo`].
//!
//! [`SourceInfo`]: crate::source::SourceInfo
use ordered_float::OrderedFloat;
use proptest::arbitrary::Arbitrary;
use smol_str::SmolStr;
use std::cell::Cell;

use crate::operators::Operator;

/// Identifier of a node within an expression tree.
pub type ExprId = i64;

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

/// The different kinds of expression nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// A plain identifier such as `a`.
    Ident(SmolStr),

    /// Field access `operand.field`.
    ///
    /// When `test_only` is set, the node was produced by the `has()` macro and
    /// tests for the presence of the field instead of reading it.
    Select {
        operand: Box<Expr>,
        field: SmolStr,
        test_only: bool,
    },

    /// A function call, a receiver-style call `target.function(args)` or an
    /// operator application. Operators use their mangled names, see
    /// [`Operator`].
    Call {
        target: Option<Box<Expr>>,
        function: SmolStr,
        args: Vec<Expr>,
    },

    /// A list literal `[a, b]`.
    List(Vec<Expr>),

    /// A message construction `Type{field: value}` when `type_name` is present,
    /// or a map literal `{key: value}` otherwise.
    Struct {
        type_name: Option<SmolStr>,
        entries: Vec<Entry>,
    },

    /// A constant.
    Literal(Literal),

    /// A comprehension, as produced by macro expansion.
    Comprehension(Box<Comprehension>),
}

/// An entry of a message construction or map literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: ExprId,
    pub key: EntryKey,
    pub value: Expr,
}

/// The key of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKey {
    /// Field name in a message construction.
    Field(SmolStr),
    /// Key expression in a map literal.
    Map(Expr),
}

/// Constant values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
    Bytes(Vec<u8>),
    Double(OrderedFloat<f64>),
    Int(i64),
    Uint(u64),
    Null,
    String(String),
}

/// A fold over a range, as produced by macros such as `all` or `map`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comprehension {
    pub iter_var: SmolStr,
    pub iter_range: Expr,
    pub accu_var: SmolStr,
    pub accu_init: Expr,
    pub loop_condition: Expr,
    pub loop_step: Expr,
    pub result: Expr,
}

impl Expr {
    #[inline]
    pub fn new(id: ExprId, kind: ExprKind) -> Self {
        Self { id, kind }
    }

    /// The operator applied by this node, if it is an operator call.
    pub fn operator(&self) -> Option<Operator> {
        match &self.kind {
            ExprKind::Call { function, .. } => Operator::find(function),
            _ => None,
        }
    }

    /// Short name of the node kind for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Ident(_) => "identifier",
            ExprKind::Select { .. } => "select",
            ExprKind::Call { .. } => "call",
            ExprKind::List(_) => "list",
            ExprKind::Struct { .. } => "struct",
            ExprKind::Literal(_) => "literal",
            ExprKind::Comprehension(_) => "comprehension",
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Literal {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Double(OrderedFloat(value))
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for Literal {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Builds expression trees, handing out a fresh id for every node.
///
/// Ids start at 1 and increase by one for every node or entry created.
#[derive(Debug)]
pub struct ExprFactory {
    next_id: Cell<ExprId>,
}

impl Default for ExprFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprFactory {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(id: ExprId) -> Self {
        Self {
            next_id: Cell::new(id),
        }
    }

    /// Returns the next unused id.
    pub fn next_id(&self) -> ExprId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn expr(&self, kind: ExprKind) -> Expr {
        Expr::new(self.next_id(), kind)
    }

    pub fn ident(&self, name: impl Into<SmolStr>) -> Expr {
        self.expr(ExprKind::Ident(name.into()))
    }

    pub fn select(&self, operand: Expr, field: impl Into<SmolStr>) -> Expr {
        self.expr(ExprKind::Select {
            operand: Box::new(operand),
            field: field.into(),
            test_only: false,
        })
    }

    /// A field presence test, as produced by `has(operand.field)`.
    pub fn presence_test(&self, operand: Expr, field: impl Into<SmolStr>) -> Expr {
        self.expr(ExprKind::Select {
            operand: Box::new(operand),
            field: field.into(),
            test_only: true,
        })
    }

    pub fn call(&self, function: impl Into<SmolStr>, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            target: None,
            function: function.into(),
            args,
        })
    }

    pub fn member_call(&self, target: Expr, function: impl Into<SmolStr>, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            target: Some(Box::new(target)),
            function: function.into(),
            args,
        })
    }

    /// Applies an operator to its operands.
    pub fn operator(&self, op: Operator, args: Vec<Expr>) -> Expr {
        self.call(op.name(), args)
    }

    pub fn list(&self, elements: Vec<Expr>) -> Expr {
        self.expr(ExprKind::List(elements))
    }

    pub fn message(&self, type_name: impl Into<SmolStr>, entries: Vec<Entry>) -> Expr {
        self.expr(ExprKind::Struct {
            type_name: Some(type_name.into()),
            entries,
        })
    }

    pub fn map(&self, entries: Vec<Entry>) -> Expr {
        self.expr(ExprKind::Struct {
            type_name: None,
            entries,
        })
    }

    pub fn field_entry(&self, field: impl Into<SmolStr>, value: Expr) -> Entry {
        Entry {
            id: self.next_id(),
            key: EntryKey::Field(field.into()),
            value,
        }
    }

    pub fn map_entry(&self, key: Expr, value: Expr) -> Entry {
        Entry {
            id: self.next_id(),
            key: EntryKey::Map(key),
            value,
        }
    }

    pub fn literal(&self, literal: impl Into<Literal>) -> Expr {
        self.expr(ExprKind::Literal(literal.into()))
    }

    pub fn null(&self) -> Expr {
        self.expr(ExprKind::Literal(Literal::Null))
    }

    pub fn comprehension(&self, comprehension: Comprehension) -> Expr {
        self.expr(ExprKind::Comprehension(Box::new(comprehension)))
    }
}

impl Arbitrary for Literal {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        proptest::prop_oneof![
            any::<bool>().prop_map(Literal::Bool),
            any::<Vec<u8>>().prop_map(Literal::Bytes),
            any::<OrderedFloat<f64>>().prop_map(Literal::Double),
            any::<i64>().prop_map(Literal::Int),
            any::<u64>().prop_map(Literal::Uint),
            Just(Literal::Null),
            any::<String>().prop_map(Literal::String),
        ]
        .boxed()
    }
}

impl Arbitrary for Expr {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    /// Generates trees without comprehensions, numbered in pre-order from 1.
    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let name = "[a-z_][a-z0-9_]{0,6}".prop_map(SmolStr::from);
        let leaf = proptest::prop_oneof![
            name.clone().prop_map(ExprKind::Ident),
            any::<Literal>().prop_map(ExprKind::Literal),
        ]
        .prop_map(|kind| Expr::new(0, kind));

        leaf.prop_recursive(6, 64, 4, move |inner| {
            let unary = proptest::sample::select(vec![Operator::LogicalNot, Operator::Negate]);
            let binary = proptest::sample::select(
                Operator::ALL
                    .iter()
                    .copied()
                    .filter(|op| op.arity() == 2)
                    .collect::<Vec<_>>(),
            );

            proptest::prop_oneof![
                (inner.clone(), name.clone(), any::<bool>()).prop_map(
                    |(operand, field, test_only)| ExprKind::Select {
                        operand: Box::new(operand),
                        field,
                        test_only,
                    }
                ),
                (
                    proptest::option::of(inner.clone()),
                    name.clone(),
                    proptest::collection::vec(inner.clone(), 0..4)
                )
                    .prop_map(|(target, function, args)| ExprKind::Call {
                        target: target.map(Box::new),
                        function,
                        args,
                    }),
                (unary, inner.clone()).prop_map(|(op, arg)| ExprKind::Call {
                    target: None,
                    function: op.name().into(),
                    args: vec![arg],
                }),
                (binary, inner.clone(), inner.clone()).prop_map(|(op, lhs, rhs)| {
                    ExprKind::Call {
                        target: None,
                        function: op.name().into(),
                        args: vec![lhs, rhs],
                    }
                }),
                (inner.clone(), inner.clone(), inner.clone()).prop_map(|(c, t, f)| {
                    ExprKind::Call {
                        target: None,
                        function: Operator::Conditional.name().into(),
                        args: vec![c, t, f],
                    }
                }),
                proptest::collection::vec(inner.clone(), 0..4).prop_map(ExprKind::List),
                (
                    name.clone(),
                    proptest::collection::vec((name.clone(), inner.clone()), 0..4)
                )
                    .prop_map(|(type_name, fields)| ExprKind::Struct {
                        type_name: Some(type_name),
                        entries: fields
                            .into_iter()
                            .map(|(field, value)| Entry {
                                id: 0,
                                key: EntryKey::Field(field),
                                value,
                            })
                            .collect(),
                    }),
                proptest::collection::vec((inner.clone(), inner), 0..4).prop_map(|pairs| {
                    ExprKind::Struct {
                        type_name: None,
                        entries: pairs
                            .into_iter()
                            .map(|(key, value)| Entry {
                                id: 0,
                                key: EntryKey::Map(key),
                                value,
                            })
                            .collect(),
                    }
                }),
            ]
            .prop_map(|kind| Expr::new(0, kind))
        })
        .prop_map(|mut expr| {
            number_preorder(&mut expr, &mut 1);
            expr
        })
        .boxed()
    }
}

/// Assigns fresh ids to every node and entry in pre-order.
fn number_preorder(expr: &mut Expr, next: &mut ExprId) {
    expr.id = *next;
    *next += 1;

    match &mut expr.kind {
        ExprKind::Ident(_) | ExprKind::Literal(_) => {}
        ExprKind::Select { operand, .. } => number_preorder(operand, next),
        ExprKind::Call { target, args, .. } => {
            if let Some(target) = target {
                number_preorder(target, next);
            }
            for arg in args {
                number_preorder(arg, next);
            }
        }
        ExprKind::List(elements) => {
            for element in elements {
                number_preorder(element, next);
            }
        }
        ExprKind::Struct { entries, .. } => {
            for entry in entries {
                entry.id = *next;
                *next += 1;
                if let EntryKey::Map(key) = &mut entry.key {
                    number_preorder(key, next);
                }
                number_preorder(&mut entry.value, next);
            }
        }
        ExprKind::Comprehension(comprehension) => {
            number_preorder(&mut comprehension.iter_range, next);
            number_preorder(&mut comprehension.accu_init, next);
            number_preorder(&mut comprehension.loop_condition, next);
            number_preorder(&mut comprehension.loop_step, next);
            number_preorder(&mut comprehension.result, next);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Expr, ExprFactory, ExprKind, Literal};
    use crate::operators::Operator;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn collect_ids(expr: &Expr, ids: &mut Vec<i64>) {
        ids.push(expr.id);
        match &expr.kind {
            ExprKind::Select { operand, .. } => collect_ids(operand, ids),
            ExprKind::Call { target, args, .. } => {
                target.iter().for_each(|t| collect_ids(t, ids));
                args.iter().for_each(|a| collect_ids(a, ids));
            }
            ExprKind::List(elements) => elements.iter().for_each(|e| collect_ids(e, ids)),
            ExprKind::Struct { entries, .. } => {
                for entry in entries {
                    ids.push(entry.id);
                    if let super::EntryKey::Map(key) = &entry.key {
                        collect_ids(key, ids);
                    }
                    collect_ids(&entry.value, ids);
                }
            }
            _ => {}
        }
    }

    #[test]
    fn factory_hands_out_fresh_ids() {
        let f = ExprFactory::new();
        let expr = f.operator(Operator::Add, vec![f.ident("a"), f.literal(1i64)]);
        assert_eq!(expr.id, 3);
        assert_eq!(expr.operator(), Some(Operator::Add));
        assert_eq!(f.next_id(), 4);
    }

    #[test]
    fn literal_conversions() {
        assert_eq!(Literal::from(2.5), Literal::Double(2.5.into()));
        assert_eq!(Literal::from("x"), Literal::String("x".into()));
        assert_eq!(Literal::from(3u64), Literal::Uint(3));
    }

    proptest! {
        #[test]
        fn arbitrary_trees_have_unique_ids(expr: Expr) {
            let mut ids = Vec::new();
            collect_ids(&expr, &mut ids);
            let unique: HashSet<_> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }
}
