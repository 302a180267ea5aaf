use crate::expr::{Anchor, Expr, Segment};
use xmlite_tree::XmlItem;

// -----------------------------------------------------------------------------------------------

/// Matches of `expr` from `node`, grouped in the order their parent matches
/// were produced. Evaluation never fails and never mutates the tree; a
/// context that cannot be reached yields an empty sequence.
pub fn eval(expr: &Expr, node: &XmlItem) -> Vec<XmlItem> {
    // Anchored searches run over the owning document.
    if expr.anchor != Anchor::Relative && node.as_document().is_none() {
        return match node.root_document() {
            Some(document) => eval(expr, &XmlItem::Document(document)),
            None => vec![],
        };
    }

    if expr.segments.is_empty() {
        return vec![];
    }

    match expr.anchor {
        Anchor::Relative | Anchor::Root => eval_segments(node, &expr.segments),
        Anchor::Descendant => eval_collection(&node.flattened_children(), &expr.segments),
        Anchor::DescendantAttribute => {
            let attributes: Vec<XmlItem> = node
                .flattened_children()
                .iter()
                .flat_map(XmlItem::attributes)
                .map(XmlItem::Attribute)
                .collect();
            eval_collection(&attributes, &expr.segments)
        }
    }
}

/// Matches the leading segment against the children (or attributes) of
/// `item`, then the remainder against each match in turn.
fn eval_segments(item: &XmlItem, segments: &[Segment]) -> Vec<XmlItem> {
    let Some((first, rest)) = segments.split_first() else {
        return vec![item.clone()];
    };

    match first {
        Segment::Parent => match item.parent() {
            Some(parent) => eval_segments(&parent, rest),
            None => vec![],
        },
        Segment::Attribute(name) => item
            .attributes()
            .into_iter()
            .filter(|v| v.borrow().name() == name.as_str())
            .map(XmlItem::Attribute)
            .flat_map(|v| eval_segments(&v, rest))
            .collect(),
        Segment::Name(_) | Segment::AnyPrefix(_) => item
            .children()
            .unwrap_or_default()
            .into_iter()
            .filter(|v| segment_matches(first, v))
            .flat_map(|v| eval_segments(&v, rest))
            .collect(),
    }
}

/// Matches the leading segment against the collection members themselves;
/// only name segments select from a flattened collection.
fn eval_collection(items: &[XmlItem], segments: &[Segment]) -> Vec<XmlItem> {
    let Some((first, rest)) = segments.split_first() else {
        return vec![];
    };

    if !matches!(first, Segment::Name(_) | Segment::AnyPrefix(_)) {
        return vec![];
    }

    items
        .iter()
        .filter(|v| segment_matches(first, v))
        .flat_map(|v| eval_segments(v, rest))
        .collect()
}

fn segment_matches(segment: &Segment, item: &XmlItem) -> bool {
    let Some(name) = item.name() else {
        return false;
    };

    match segment {
        Segment::Name(expected) => name == *expected,
        Segment::AnyPrefix(local) => name.rsplit(':').next() == Some(local.as_str()),
        _ => false,
    }
}
