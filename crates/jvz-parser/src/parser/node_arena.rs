//! NodeArena creation methods.

use jvz_common::limits::MAX_NODE_PREALLOC;

use super::base::NodeIndex;
use super::flags::NodeFlags;
use super::node::{Node, NodeArena, NodeData};

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Create an arena with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity.min(MAX_NODE_PREALLOC)),
        }
    }

    /// Append a node and return its index.
    pub fn add(&mut self, pos: u32, end: u32, data: NodeData) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            pos,
            end,
            flags: NodeFlags::empty(),
            data,
        });
        index
    }

    /// Append a zero-width node synthesized by error recovery.
    pub fn add_missing(&mut self, pos: u32, data: NodeData) -> NodeIndex {
        let index = self.add(pos, pos, data);
        self.add_flags(index, NodeFlags::MISSING | NodeFlags::THIS_NODE_HAS_ERROR);
        index
    }

    pub fn add_flags(&mut self, index: NodeIndex, flags: NodeFlags) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.flags |= flags;
        }
    }

    pub fn set_end(&mut self, index: NodeIndex, end: u32) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.end = end;
        }
    }

    pub fn set_pos(&mut self, index: NodeIndex, pos: u32) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.pos = pos;
        }
    }
}
