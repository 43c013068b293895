//! Query expression tree consumed by the scanner
//!
//! An owned, immutable rendition of an analyzed query: a range table of the
//! relations and subqueries it reads, a filter predicate, explicit join
//! qualifiers, a target list, and GROUP BY / ORDER BY clauses that point into
//! the target list. All types deserialize from JSON so workloads can be fed
//! to the CLI.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::candidate::{ColumnId, RelationId, TypeId};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    Other,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Like => "~~",
            CompareOp::Other => "?",
        }
    }
}

/// Operators an index could serve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorSet(BTreeSet<CompareOp>);

impl OperatorSet {
    /// The B-tree comparison operators: `=`, `<`, `>`, `<=`, `>=`
    pub fn btree() -> Self {
        Self::from_ops([
            CompareOp::Eq,
            CompareOp::Lt,
            CompareOp::Gt,
            CompareOp::Le,
            CompareOp::Ge,
        ])
    }

    pub fn from_ops(ops: impl IntoIterator<Item = CompareOp>) -> Self {
        Self(ops.into_iter().collect())
    }

    pub fn contains(&self, op: CompareOp) -> bool {
        self.0.contains(&op)
    }
}

impl Default for OperatorSet {
    fn default() -> Self {
        Self::btree()
    }
}

/// A column reference
///
/// `range_index` selects an entry in a range table; `levels_up` selects
/// which enclosing query's range table (0 = the query the reference appears
/// in, 1 = its parent, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub range_index: usize,
    #[serde(default)]
    pub levels_up: usize,
    pub column: ColumnId,
    #[serde(default)]
    pub type_id: TypeId,
}

/// Kinds of subquery expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubLinkKind {
    Exists,
    Any,
    All,
    Scalar,
    Array,
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expr {
    And {
        args: Vec<Expr>,
    },
    Or {
        args: Vec<Expr>,
    },
    Not {
        arg: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        args: Vec<Expr>,
    },
    Column(ColumnRef),
    SubLink {
        kind: SubLinkKind,
        subquery: Box<QueryTree>,
        /// Left-hand side of `x IN (...)`, `x = ANY (...)`; absent for EXISTS
        #[serde(default)]
        test: Option<Box<Expr>>,
    },
    Aggregate {
        name: String,
        /// Empty for `count(*)`
        #[serde(default)]
        args: Vec<Expr>,
    },
    Function {
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// Binary-compatible type coercion
    Relabel {
        arg: Box<Expr>,
    },
    List {
        items: Vec<Expr>,
    },
    Const {
        #[serde(default)]
        value: serde_json::Value,
    },
    Param {
        id: u32,
    },
    /// A node kind the adviser does not understand
    Unsupported {
        kind: String,
    },
}

impl Expr {
    pub fn and(args: Vec<Expr>) -> Self {
        Expr::And { args }
    }

    pub fn or(args: Vec<Expr>) -> Self {
        Expr::Or { args }
    }

    pub fn not(arg: Expr) -> Self {
        Expr::Not { arg: Box::new(arg) }
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            args: vec![left, right],
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    /// Column `column` of range-table entry `range_index` in the current query
    pub fn col(range_index: usize, column: ColumnId) -> Self {
        Self::outer_col(0, range_index, column)
    }

    /// Column of a range-table entry `levels_up` queries out
    pub fn outer_col(levels_up: usize, range_index: usize, column: ColumnId) -> Self {
        Expr::Column(ColumnRef {
            range_index,
            levels_up,
            column,
            type_id: 23,
        })
    }

    pub fn constant(value: serde_json::Value) -> Self {
        Expr::Const { value }
    }

    pub fn param(id: u32) -> Self {
        Expr::Param { id }
    }

    pub fn exists(subquery: QueryTree) -> Self {
        Expr::SubLink {
            kind: SubLinkKind::Exists,
            subquery: Box::new(subquery),
            test: None,
        }
    }

    /// `test IN (subquery)`
    pub fn any(test: Expr, subquery: QueryTree) -> Self {
        Expr::SubLink {
            kind: SubLinkKind::Any,
            subquery: Box::new(subquery),
            test: Some(Box::new(test)),
        }
    }

    pub fn aggregate(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Aggregate {
            name: name.into(),
            args,
        }
    }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        Expr::Unsupported { kind: kind.into() }
    }

    /// Node kind name for log output
    pub fn kind(&self) -> &str {
        match self {
            Expr::And { .. } => "and",
            Expr::Or { .. } => "or",
            Expr::Not { .. } => "not",
            Expr::Compare { .. } => "compare",
            Expr::Column(_) => "column",
            Expr::SubLink { .. } => "sub_link",
            Expr::Aggregate { .. } => "aggregate",
            Expr::Function { .. } => "function",
            Expr::Relabel { .. } => "relabel",
            Expr::List { .. } => "list",
            Expr::Const { .. } => "const",
            Expr::Param { .. } => "param",
            Expr::Unsupported { kind } => kind,
        }
    }
}

/// One entry of a query's range table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeEntry {
    /// A base table
    Relation { relation: RelationId },
    /// A subquery in FROM
    Subquery { query: Box<QueryTree> },
    /// The result of an explicit JOIN
    Join,
    /// A set-returning function in FROM
    Function,
    /// A VALUES list
    Values,
}

/// An analyzed query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTree {
    #[serde(default)]
    pub range_table: Vec<RangeEntry>,
    /// WHERE predicate
    #[serde(default)]
    pub filter: Option<Expr>,
    /// JOIN ... ON qualifiers, implicitly ANDed with the filter
    #[serde(default)]
    pub join_quals: Vec<Expr>,
    #[serde(default)]
    pub target_list: Vec<Expr>,
    /// Zero-based positions in `target_list`
    #[serde(default)]
    pub group_by: Vec<usize>,
    /// Zero-based positions in `target_list`
    #[serde(default)]
    pub order_by: Vec<usize>,
}

impl QueryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a base table to the range table
    pub fn with_relation(mut self, relation: RelationId) -> Self {
        self.range_table.push(RangeEntry::Relation { relation });
        self
    }

    /// Appends a FROM-clause subquery to the range table
    pub fn with_subquery(mut self, query: QueryTree) -> Self {
        self.range_table.push(RangeEntry::Subquery {
            query: Box::new(query),
        });
        self
    }

    pub fn with_range_entry(mut self, entry: RangeEntry) -> Self {
        self.range_table.push(entry);
        self
    }

    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_join_qual(mut self, qual: Expr) -> Self {
        self.join_quals.push(qual);
        self
    }

    pub fn with_target(mut self, expr: Expr) -> Self {
        self.target_list.push(expr);
        self
    }

    pub fn with_group_by(mut self, target: usize) -> Self {
        self.group_by.push(target);
        self
    }

    pub fn with_order_by(mut self, target: usize) -> Self {
        self.order_by.push(target);
        self
    }
}
