//! Tree shapes.
//!
//! A template is a tree of nodes; each node's offset is relative to its
//! parent, and the top-level offsets are relative to the base cell. Growth
//! walks the nodes depth first, so a blocked node prunes its whole branch.

use super::TreeSpecies;
use crate::cell::{Behavior, Head, TypeClass};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Part {
  Trunk,
  Leaf,
  Root,
}

impl Part {
  #[inline]
  pub const fn behavior(self) -> Behavior {
    match self {
      Self::Trunk => Behavior::TreeTrunk,
      Self::Leaf => Behavior::TreeLeaf,
      Self::Root => Behavior::TreeRoot,
    }
  }

  /// Whether `head` is this part of a standing tree.
  #[inline]
  pub fn matches(self, head: Head) -> bool {
    head.type_class() == TypeClass::Static && head.behavior_bits() == self.behavior() as u32
  }
}

#[derive(Debug)]
pub(crate) struct Node {
  pub dx: i8,
  pub dy: i8,
  pub part: Part,
  pub branch: &'static [Node],
}

const fn trunk(dx: i8, dy: i8, branch: &'static [Node]) -> Node {
  Node {
    dx,
    dy,
    part: Part::Trunk,
    branch,
  }
}

const fn leaf(dx: i8, dy: i8, branch: &'static [Node]) -> Node {
  Node {
    dx,
    dy,
    part: Part::Leaf,
    branch,
  }
}

const fn root(dx: i8, dy: i8) -> Node {
  Node {
    dx,
    dy,
    part: Part::Root,
    branch: &[],
  }
}

// Oak: short trunk, two side twigs and a round crown.

const OAK_CROWN: &[Node] = &[
  leaf(-1, 0, &[leaf(-1, 0, &[leaf(0, -1, &[])]), leaf(0, -1, &[])]),
  leaf(1, 0, &[leaf(1, 0, &[leaf(0, -1, &[])]), leaf(0, -1, &[])]),
  leaf(0, -1, &[leaf(0, -1, &[leaf(-1, 0, &[]), leaf(1, 0, &[])])]),
];
const OAK_UPPER: &[Node] = &[
  trunk(0, -1, OAK_CROWN),
  leaf(1, 0, &[leaf(1, 0, &[])]),
];
const OAK_MIDDLE: &[Node] = &[
  trunk(0, -1, OAK_UPPER),
  leaf(-1, -1, &[leaf(-1, 0, &[])]),
];
const OAK: &[Node] = &[
  trunk(0, -1, &[trunk(0, -1, OAK_MIDDLE)]),
  root(0, 1),
  root(-1, 1),
  root(1, 1),
];

// Pine: tall trunk with narrowing leaf tiers.

const PINE_TIP: &[Node] = &[leaf(0, -1, &[leaf(0, -1, &[])])];
const PINE_TIER_3: &[Node] = &[
  trunk(0, -1, PINE_TIP),
  leaf(-1, 0, &[]),
  leaf(1, 0, &[]),
];
const PINE_TIER_2: &[Node] = &[
  trunk(0, -1, PINE_TIER_3),
  leaf(-1, 0, &[leaf(-1, 1, &[])]),
  leaf(1, 0, &[leaf(1, 1, &[])]),
];
const PINE_TIER_1: &[Node] = &[
  trunk(0, -1, PINE_TIER_2),
  leaf(-1, 0, &[leaf(-1, 1, &[leaf(-1, 1, &[])])]),
  leaf(1, 0, &[leaf(1, 1, &[leaf(1, 1, &[])])]),
];
const PINE: &[Node] = &[
  trunk(0, -1, &[trunk(0, -1, &[trunk(0, -1, PINE_TIER_1)])]),
  root(0, 1),
  root(-1, 1),
];

// Birch: thin trunk, small lopsided crown.

const BIRCH_CROWN: &[Node] = &[
  leaf(0, -1, &[leaf(0, -1, &[]), leaf(1, 0, &[])]),
  leaf(-1, 0, &[leaf(0, -1, &[])]),
  leaf(1, 0, &[leaf(1, 0, &[])]),
];
const BIRCH: &[Node] = &[
  trunk(
    0,
    -1,
    &[trunk(0, -1, &[trunk(0, -1, &[trunk(0, -1, &[trunk(0, -1, BIRCH_CROWN)])])])],
  ),
  root(0, 1),
];

// Shrub: a stub with a wide low crown.

const SHRUB: &[Node] = &[
  trunk(
    0,
    -1,
    &[
      leaf(-1, 0, &[leaf(-1, 0, &[])]),
      leaf(1, 0, &[leaf(1, 0, &[])]),
      leaf(0, -1, &[leaf(-1, 0, &[]), leaf(1, 0, &[])]),
    ],
  ),
  root(0, 1),
];

pub(crate) fn template(species: TreeSpecies) -> &'static [Node] {
  match species {
    TreeSpecies::Oak => OAK,
    TreeSpecies::Pine => PINE,
    TreeSpecies::Birch => BIRCH,
    TreeSpecies::Shrub => SHRUB,
  }
}

/// Number of above-ground nodes.
pub(crate) fn crown_size(nodes: &[Node]) -> usize {
  nodes
    .iter()
    .filter(|n| n.part != Part::Root)
    .map(|n| 1 + crown_size(n.branch))
    .sum()
}

/// Counts above-ground template nodes whose branch is gone: a node that is
/// not standing counts together with everything it carries.
pub(crate) fn missing_nodes(
  nodes: &[Node],
  head_at: &dyn Fn(i32, i32) -> Option<Head>,
  x: i32,
  y: i32,
) -> usize {
  let mut missing = 0;
  for node in nodes.iter().filter(|n| n.part != Part::Root) {
    let (nx, ny) = (x + node.dx as i32, y + node.dy as i32);
    if head_at(nx, ny).is_some_and(|h| node.part.matches(h)) {
      missing += missing_nodes(node.branch, head_at, nx, ny);
    } else {
      missing += 1 + crown_size(node.branch);
    }
  }
  missing
}

/// Fraction of the above-ground template that is missing around a base.
pub(crate) fn damage(
  species: TreeSpecies,
  head_at: &dyn Fn(i32, i32) -> Option<Head>,
  x: i32,
  y: i32,
) -> f32 {
  let nodes = template(species);
  let total = crown_size(nodes).max(1);
  missing_nodes(nodes, head_at, x, y) as f32 / total as f32
}
