//! Operator names, symbols and precedence.
//!
//! Operators appear in expression trees as calls to functions with mangled
//! names, such as `_+_` for addition or `!_` for logical negation. This table
//! maps the mangled names back to the symbols written in source and holds
//! the precedence and associativity policy the printer uses to decide where
//! parentheses are required.

/// Operators recognized by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Conditional,
    LogicalOr,
    LogicalAnd,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    In,
    OldIn,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LogicalNot,
    Negate,
    Index,
}

impl Operator {
    pub const ALL: [Operator; 19] = [
        Operator::Conditional,
        Operator::LogicalOr,
        Operator::LogicalAnd,
        Operator::Equals,
        Operator::NotEquals,
        Operator::Less,
        Operator::LessEquals,
        Operator::Greater,
        Operator::GreaterEquals,
        Operator::In,
        Operator::OldIn,
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Modulo,
        Operator::LogicalNot,
        Operator::Negate,
        Operator::Index,
    ];

    /// Looks up an operator by its mangled function name.
    pub fn find(name: &str) -> Option<Self> {
        let op = match name {
            "_?_:_" => Self::Conditional,
            "_||_" => Self::LogicalOr,
            "_&&_" => Self::LogicalAnd,
            "_==_" => Self::Equals,
            "_!=_" => Self::NotEquals,
            "_<_" => Self::Less,
            "_<=_" => Self::LessEquals,
            "_>_" => Self::Greater,
            "_>=_" => Self::GreaterEquals,
            "@in" => Self::In,
            "_in_" => Self::OldIn,
            "_+_" => Self::Add,
            "_-_" => Self::Subtract,
            "_*_" => Self::Multiply,
            "_/_" => Self::Divide,
            "_%_" => Self::Modulo,
            "!_" => Self::LogicalNot,
            "-_" => Self::Negate,
            "_[_]" => Self::Index,
            _ => return None,
        };
        Some(op)
    }

    /// The mangled function name used in expression trees.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Conditional => "_?_:_",
            Self::LogicalOr => "_||_",
            Self::LogicalAnd => "_&&_",
            Self::Equals => "_==_",
            Self::NotEquals => "_!=_",
            Self::Less => "_<_",
            Self::LessEquals => "_<=_",
            Self::Greater => "_>_",
            Self::GreaterEquals => "_>=_",
            Self::In => "@in",
            Self::OldIn => "_in_",
            Self::Add => "_+_",
            Self::Subtract => "_-_",
            Self::Multiply => "_*_",
            Self::Divide => "_/_",
            Self::Modulo => "_%_",
            Self::LogicalNot => "!_",
            Self::Negate => "-_",
            Self::Index => "_[_]",
        }
    }

    /// The symbol written in source.
    ///
    /// Operators written around their operands use the pair of delimiters.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Conditional => "?:",
            Self::LogicalOr => "||",
            Self::LogicalAnd => "&&",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::Less => "<",
            Self::LessEquals => "<=",
            Self::Greater => ">",
            Self::GreaterEquals => ">=",
            Self::In | Self::OldIn => "in",
            Self::Add => "+",
            Self::Subtract | Self::Negate => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::LogicalNot => "!",
            Self::Index => "[]",
        }
    }

    /// Precedence rank; a lower rank binds looser.
    ///
    /// - 1: `?:`
    /// - 2: `||`
    /// - 3: `&&`
    /// - 4: `==` `!=` `<` `<=` `>` `>=` `in`
    /// - 5: `+` `-`
    /// - 6: `*` `/` `%`
    /// - 7: unary `!` `-`
    /// - 8: `[]`
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Conditional => 1,
            Self::LogicalOr => 2,
            Self::LogicalAnd => 3,
            Self::Equals
            | Self::NotEquals
            | Self::Less
            | Self::LessEquals
            | Self::Greater
            | Self::GreaterEquals
            | Self::In
            | Self::OldIn => 4,
            Self::Add | Self::Subtract => 5,
            Self::Multiply | Self::Divide | Self::Modulo => 6,
            Self::LogicalNot | Self::Negate => 7,
            Self::Index => 8,
        }
    }

    /// Number of operands.
    pub const fn arity(self) -> usize {
        match self {
            Self::Conditional => 3,
            Self::LogicalNot | Self::Negate => 1,
            _ => 2,
        }
    }

    /// Whether the grammar groups a chain of this operator to the left.
    ///
    /// `&&` and `||` are parsed as flat chains, so their grouping never
    /// changes the meaning of the expression.
    pub const fn is_left_recursive(self) -> bool {
        !matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }

    /// Whether the operator is written between its two operands.
    pub const fn is_binary(self) -> bool {
        self.arity() == 2 && !matches!(self, Self::Index)
    }
}

/// Precedence of the operator with the given mangled name.
///
/// Names that are not operators are regular function calls and get rank 0.
pub fn precedence(name: &str) -> u8 {
    Operator::find(name).map_or(0, Operator::precedence)
}

/// Whether the operator with the given mangled name is left-recursive.
pub fn is_left_recursive(name: &str) -> bool {
    Operator::find(name).is_some_and(Operator::is_left_recursive)
}

/// The source symbol of the operator with the given mangled name, or `None`
/// for regular function calls.
pub fn display_symbol(name: &str) -> Option<&'static str> {
    Operator::find(name).map(Operator::symbol)
}

#[cfg(test)]
mod test {
    use super::{display_symbol, is_left_recursive, precedence, Operator};
    use rstest::rstest;

    #[test]
    fn names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::find(op.name()), Some(op));
        }
    }

    #[rstest]
    #[case("_+_", Some("+"))]
    #[case("_&&_", Some("&&"))]
    #[case("@in", Some("in"))]
    #[case("_in_", Some("in"))]
    #[case("!_", Some("!"))]
    #[case("-_", Some("-"))]
    #[case("size", None)]
    #[case("_&_", None)]
    fn test_display_symbol(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(expected, display_symbol(name));
    }

    #[rstest]
    #[case("_?_:_", "_||_")]
    #[case("_||_", "_&&_")]
    #[case("_&&_", "_==_")]
    #[case("_<_", "_+_")]
    #[case("_-_", "_%_")]
    #[case("_*_", "!_")]
    #[case("-_", "_[_]")]
    #[case("size", "_?_:_")]
    fn binds_looser(#[case] looser: &str, #[case] tighter: &str) {
        assert!(precedence(looser) < precedence(tighter));
    }

    #[test]
    fn only_logical_chains_are_flat() {
        assert!(!is_left_recursive("_&&_"));
        assert!(!is_left_recursive("_||_"));
        assert!(is_left_recursive("_-_"));
        assert!(is_left_recursive("_==_"));
        assert!(!is_left_recursive("size"));
    }

    #[test]
    fn arity_matches_operator_shape() {
        assert_eq!(Operator::Conditional.arity(), 3);
        assert_eq!(Operator::Negate.arity(), 1);
        assert!(Operator::In.is_binary());
        assert!(!Operator::Index.is_binary());
        assert!(!Operator::LogicalNot.is_binary());
    }
}
