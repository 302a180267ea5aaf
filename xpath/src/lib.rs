pub mod error;
pub mod eval;
pub mod expr;

use xmlite_tree::XmlItem;

// -----------------------------------------------------------------------------------------------

/// Parses `path` and evaluates it from `node`.
///
/// The query is validated as a whole before evaluation; matches come back in
/// document order within each parent group, duplicates uncollapsed.
pub fn query(node: &XmlItem, path: &str) -> error::Result<Vec<XmlItem>> {
    let expr = expr::Expr::parse(path)?;
    Ok(eval::eval(&expr, node))
}

// -----------------------------------------------------------------------------------------------
