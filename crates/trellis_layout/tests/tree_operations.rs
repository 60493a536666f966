//! # Layout Tree Operations
//!
//! Random edit sequences checked against a plain `Vec`-based model of the
//! tree, plus a scenario exercising store growth under a deep tree.

use proptest::prelude::*;
use trellis_layout::{LayoutError, LayoutNode, LayoutTree, StyleData};

#[derive(Clone, Debug)]
enum Edit {
    Create,
    Insert(usize, usize, u32),
    Remove(usize),
    Destroy(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => Just(Edit::Create),
        4 => (any::<usize>(), any::<usize>(), 0u32..6)
            .prop_map(|(p, c, i)| Edit::Insert(p, c, i)),
        2 => any::<usize>().prop_map(Edit::Remove),
        1 => any::<usize>().prop_map(Edit::Destroy),
    ]
}

/// Reference model: ordered child lists and parent links.
#[derive(Default)]
struct Model {
    nodes: Vec<LayoutNode>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    alive: Vec<bool>,
}

impl Model {
    fn live(&self) -> Vec<usize> {
        (0..self.nodes.len()).filter(|&i| self.alive[i]).collect()
    }

    fn is_ancestor_or_self(&self, candidate: usize, mut node: usize) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.parent[node] {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    fn detach(&mut self, child: usize) {
        if let Some(p) = self.parent[child].take() {
            self.children[p].retain(|&c| c != child);
        }
    }
}

proptest! {
    #[test]
    fn tree_matches_model(edits in prop::collection::vec(edit(), 1..120)) {
        let mut tree = LayoutTree::with_capacity(2);
        let mut model = Model::default();

        for edit in edits {
            let live = model.live();
            match edit {
                Edit::Create => {
                    model.nodes.push(tree.create_node(StyleData::default()).unwrap());
                    model.parent.push(None);
                    model.children.push(Vec::new());
                    model.alive.push(true);
                }
                Edit::Insert(p, c, index) if !live.is_empty() => {
                    let (p, c) = (live[p % live.len()], live[c % live.len()]);
                    let result = tree.insert_child(model.nodes[p], model.nodes[c], index);

                    if model.parent[c].is_some() {
                        prop_assert!(matches!(result, Err(LayoutError::AlreadyAttached(_))));
                    } else if model.is_ancestor_or_self(c, p) {
                        let is_cycle = matches!(result, Err(LayoutError::WouldCreateCycle { .. }));
                        prop_assert!(is_cycle);
                    } else if index as usize > model.children[p].len() {
                        let out_of_range =
                            matches!(result, Err(LayoutError::ChildIndexOutOfRange { .. }));
                        prop_assert!(out_of_range);
                    } else {
                        prop_assert!(result.is_ok());
                        model.children[p].insert(index as usize, c);
                        model.parent[c] = Some(p);
                    }
                }
                Edit::Remove(c) if !live.is_empty() => {
                    let c = live[c % live.len()];
                    if let Some(p) = model.parent[c] {
                        tree.remove_child(model.nodes[p], model.nodes[c]).unwrap();
                        model.detach(c);
                    }
                }
                Edit::Destroy(n) if !live.is_empty() => {
                    let n = live[n % live.len()];
                    tree.destroy_node(model.nodes[n]).unwrap();
                    model.detach(n);
                    for child in std::mem::take(&mut model.children[n]) {
                        model.parent[child] = None;
                    }
                    model.alive[n] = false;
                }
                _ => {}
            }

            prop_assert_eq!(tree.len() as usize, model.live().len());
            for i in model.live() {
                let node = model.nodes[i];
                let expected: Vec<LayoutNode> =
                    model.children[i].iter().map(|&c| model.nodes[c]).collect();
                let actual: Vec<LayoutNode> = tree.children(node).unwrap().collect();
                prop_assert_eq!(actual, expected);
                prop_assert_eq!(
                    tree.parent(node).unwrap(),
                    model.parent[i].map(|p| model.nodes[p])
                );
            }
            for (i, node) in model.nodes.iter().enumerate() {
                if !model.alive[i] {
                    prop_assert!(!tree.contains(*node));
                }
            }
        }
    }
}

#[test]
fn test_deep_chain_survives_growth() {
    let mut tree = LayoutTree::with_capacity(1);
    let root = tree.create_node(StyleData::sized(800.0, 600.0)).unwrap();

    let mut chain = vec![root];
    for depth in 1..500u16 {
        let node = tree.create_node(StyleData::sized(f32::from(depth), 1.0)).unwrap();
        tree.append_child(*chain.last().unwrap(), node).unwrap();
        chain.push(node);
    }

    assert!(tree.stats().capacity >= 500);
    for window in chain.windows(2) {
        assert_eq!(tree.parent(window[1]).unwrap(), Some(window[0]));
    }
    for (depth, node) in chain.iter().enumerate().skip(1) {
        let expected = f32::from(u16::try_from(depth).unwrap());
        assert!((tree.style(*node).unwrap().width - expected).abs() < f32::EPSILON);
        assert!(tree.is_dirty(*node).unwrap());
    }

    // Dirtying the leaf reaches the root.
    for node in &chain {
        tree.clear_dirty(*node).unwrap();
    }
    tree.mark_dirty(*chain.last().unwrap()).unwrap();
    assert!(tree.is_dirty(root).unwrap());
}

#[test]
fn test_destroyed_parent_handle_stays_stale() {
    let mut tree = LayoutTree::with_capacity(2);
    let parent = tree.create_node(StyleData::default()).unwrap();
    let child = tree.create_node(StyleData::default()).unwrap();
    tree.append_child(parent, child).unwrap();

    tree.destroy_node(parent).unwrap();
    let replacement = tree.create_node(StyleData::default()).unwrap();

    assert_eq!(replacement.handle().index(), parent.handle().index());
    assert_eq!(tree.parent(child).unwrap(), None);
    assert_eq!(
        tree.append_child(parent, child),
        Err(LayoutError::StaleNode(parent.handle()))
    );
    tree.append_child(replacement, child).unwrap();
    assert_eq!(tree.parent(child).unwrap(), Some(replacement));
}
