//! Query tree scanning
//!
//! Walks an analyzed query and proposes the columns, and combinations of
//! columns, that an index could serve.

mod ast;
mod scanner;
mod scope;

pub use ast::{ColumnRef, CompareOp, Expr, OperatorSet, QueryTree, RangeEntry, SubLinkKind};
pub use scanner::TreeScanner;
pub use scope::ScopeStack;
