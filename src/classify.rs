//////////////////////////////////////////////////////////////////////
// node classification by counting incident red/blue triangles

use tracing::debug;

use crate::mesh::{Mesh, NodeType};

// exact (num_red, num_blue) -> type table; anything else is a
// boundary node with an incomplete neighborhood
const CLUSTER_TABLE: [((usize, usize), NodeType); 7] = [
    ((4, 2), NodeType::Type1),
    ((2, 6), NodeType::Type2),
    ((0, 10), NodeType::Type3),
    ((2, 2), NodeType::Type4),
    ((2, 4), NodeType::Type5),
    ((4, 6), NodeType::Type6),
    ((2, 8), NodeType::Type7),
];

pub fn node_type_for_counts(num_red: usize, num_blue: usize) -> NodeType {

    CLUSTER_TABLE.iter()
        .find(|(counts, _)| *counts == (num_red, num_blue))
        .map(|&(_, ntype)| ntype)
        .unwrap_or(NodeType::Boundary)

}

// assign a type to every node in the mesh, discarding any previous
// type and angle
pub fn classify(mesh: &mut Mesh) {

    for node in mesh.nodes_mut().values_mut() {
        node.node_type = node_type_for_counts(node.num_red(), node.num_blue());
        node.angle = None;
    }

    debug!(histogram = ?mesh.type_histogram(), "classified nodes");

}

//////////////////////////////////////////////////////////////////////
