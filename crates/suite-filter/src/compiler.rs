//! Chain compilation.
//!
//! Compiling walks a chain twice:
//!
//! 1. **Leaf to root**: follow `parent` links and check that every parent
//!    points back at the node we came from, ending on a Root.
//! 2. **Root to leaf**: follow `child` links and group nodes into a sum of
//!    products, an OR of AND-groups. `Or` nodes open a new AND-group,
//!    `And` and `Root` contribute nothing, predicates and `Not` nodes are
//!    appended to the current group.
//!
//! A `Not` renders its own operand, so the walk skips the node right after
//! it. Nested negations are absorbed whole by the outermost `Not`.

use tracing::{debug, trace};

use crate::compiled::CompiledFilter;
use crate::error::{FilterError, Result};
use crate::kind::NodeKind;
use crate::tree::{Arena, Element, NodeId, NodeView};
use crate::xml::{close_tag, open_tag, ElementGroup, WriteXml};

type AndGroup<'a> = ElementGroup<NodeView<'a>>;

/// Compiles the chain ending at `leaf` into a filter.
pub fn compile(arena: &Arena, leaf: NodeId) -> Result<CompiledFilter> {
    let root = validate(arena, leaf)?;
    let groups = normalize(arena, root)?;

    let mut xml = String::new();
    let root_tag = NodeKind::Root.tag();
    open_tag(&mut xml, root_tag);
    match groups.items() {
        // The outer tag already implies AND for a single group.
        [only] => only.write_xml(&mut xml, false),
        _ => groups.write_xml(&mut xml, true),
    }
    close_tag(&mut xml, root_tag);

    debug!(
        nodes = arena.len(),
        groups = groups.len(),
        xml = %xml,
        "compiled test filter"
    );
    Ok(CompiledFilter::new(xml))
}

/// Walks from `leaf` up to the root, returning the root's id.
fn validate(arena: &Arena, leaf: NodeId) -> Result<NodeId> {
    let node = arena.get(leaf).ok_or_else(|| {
        FilterError::invalid_argument(format!("node {} is not part of this chain", leaf.index()))
    })?;
    if !node.is_leaf() {
        return Err(FilterError::invalid_argument(format!(
            "<{}> node is not a true leaf: it already has a successor",
            node.kind()
        )));
    }

    let mut current = leaf;
    loop {
        let node = arena.get(current).ok_or_else(|| {
            FilterError::invalid_state(format!("chain broken: node {} is missing", current.index()))
        })?;
        let Some(parent_id) = node.parent else {
            if node.kind() != NodeKind::Root {
                return Err(FilterError::invalid_state(format!(
                    "root of chain is a <{}> node, not a Root",
                    node.kind()
                )));
            }
            return Ok(current);
        };

        let parent = arena.get(parent_id).ok_or_else(|| {
            FilterError::invalid_state(format!(
                "chain broken: parent {} is missing",
                parent_id.index()
            ))
        })?;
        match parent.child {
            None => {
                return Err(FilterError::invalid_state(
                    "chain broken: a node on the path has no recorded child",
                ))
            }
            Some(child) if child != current => {
                return Err(FilterError::invalid_state(
                    "chain broken: mismatched parent/child linkage",
                ))
            }
            Some(_) => {}
        }

        current = parent_id;
    }
}

/// Walks from the root to the leaf, grouping nodes into AND-groups.
fn normalize(arena: &Arena, root: NodeId) -> Result<ElementGroup<AndGroup<'_>>> {
    let mut groups = ElementGroup::new(NodeKind::Or.tag());
    groups.push(ElementGroup::new(NodeKind::And.tag()));

    let mut invert_next = false;
    let mut current = arena.get(root).and_then(|node| node.child);
    while let Some(id) = current {
        let node = arena.get(id).ok_or_else(|| {
            FilterError::invalid_state(format!("chain broken: node {} is missing", id.index()))
        })?;
        trace!(node = id.index(), kind = %node.kind(), skipped = invert_next, "walk");

        if invert_next {
            // Already rendered by the enclosing Not; a nested Not takes
            // its own operand with it.
            match &node.element {
                Element::Not => {}
                Element::Match(_) => invert_next = false,
                Element::Root | Element::And | Element::Or => {
                    return Err(FilterError::invalid_state(format!(
                        "a Not cannot negate a <{}> node",
                        node.kind()
                    )))
                }
            }
        } else {
            match &node.element {
                Element::Root | Element::And => {}
                Element::Or => groups.push(ElementGroup::new(NodeKind::And.tag())),
                Element::Not => {
                    push_to_current(&mut groups, arena.view(id));
                    invert_next = true;
                }
                Element::Match(_) => push_to_current(&mut groups, arena.view(id)),
            }
        }
        current = node.child;
    }

    if invert_next {
        return Err(FilterError::invalid_state(
            "chain ends with a Not that has no operand",
        ));
    }
    Ok(groups)
}

fn push_to_current<'a>(groups: &mut ElementGroup<AndGroup<'a>>, view: NodeView<'a>) {
    if let Some(group) = groups.last_mut() {
        group.push(view);
    }
}
