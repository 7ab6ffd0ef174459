// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Dynamic AABB Tree
//!
//! A spatial partitioning structure for broad-phase ray and overlap queries.
//! It uses an incrementally balanced binary tree of 2D AABBs.

use crate::math::{Aabb, Vec2};

const NULL_NODE: i32 = -1;

/// Margin added around every leaf so small movements don't restructure the tree.
pub const AABB_MARGIN: f32 = 0.1;

/// Multiplier applied to the displacement when predicting a leaf's motion.
const DISPLACEMENT_MULTIPLIER: f32 = 2.0;

/// A node in the dynamic tree.
#[derive(Debug, Clone)]
pub struct DynamicTreeNode<T: Clone> {
    /// Enlarged AABB for this node.
    pub aabb: Aabb,
    /// User data (e.g., a collider handle).
    pub user_data: Option<T>,
    /// Index of the parent node.
    pub parent: i32,
    /// Indices of child nodes (if internal).
    pub children: [i32; 2],
    /// Height of the node in the tree (0 for leaves).
    pub height: i32,
}

impl<T: Clone> DynamicTreeNode<T> {
    /// Returns true if this node is a leaf (has no children).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children[0] == NULL_NODE
    }
}

/// A dynamic AABB tree for efficient spatial queries.
#[derive(Debug, Clone)]
pub struct DynamicTree<T: Clone> {
    root: i32,
    nodes: Vec<DynamicTreeNode<T>>,
    free_list: i32,
    node_count: usize,
    leaf_count: usize,
}

impl<T: Clone> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DynamicTree<T> {
    /// Creates a new, empty dynamic tree.
    pub fn new() -> Self {
        Self {
            root: NULL_NODE,
            nodes: Vec::new(),
            free_list: NULL_NODE,
            node_count: 0,
            leaf_count: 0,
        }
    }

    /// Number of leaves currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    /// Returns `true` if the tree holds no leaves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Number of allocated nodes, leaves and internal nodes alike.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Height of the root (0 for a single leaf or an empty tree).
    pub fn height(&self) -> i32 {
        if self.root == NULL_NODE {
            0
        } else {
            self.nodes[self.root as usize].height
        }
    }

    /// Inserts a new leaf into the tree and returns its index.
    ///
    /// The stored box is `aabb` fattened by [`AABB_MARGIN`].
    pub fn insert(&mut self, aabb: Aabb, user_data: T) -> i32 {
        let leaf = self.allocate_node();
        let node = &mut self.nodes[leaf as usize];
        node.aabb = aabb.inflate(AABB_MARGIN);
        node.user_data = Some(user_data);
        node.height = 0;

        self.insert_leaf(leaf);
        self.leaf_count += 1;
        leaf
    }

    /// Removes a leaf from the tree. Unknown or internal indices are ignored.
    pub fn remove(&mut self, leaf: i32) {
        if !self.is_live_leaf(leaf) {
            return;
        }

        self.remove_leaf(leaf);
        self.deallocate_node(leaf);
        self.leaf_count -= 1;
    }

    /// Updates a leaf with a new AABB.
    /// If the new AABB is still within the "fat" AABB, no tree update is needed.
    ///
    /// Returns `true` if the leaf was reinserted.
    pub fn update(&mut self, leaf: i32, aabb: Aabb, displacement: Vec2, force_update: bool) -> bool {
        if !self.is_live_leaf(leaf) {
            return false;
        }

        if !force_update && self.nodes[leaf as usize].aabb.contains_aabb(&aabb) {
            return false;
        }

        self.remove_leaf(leaf);

        let mut fat_aabb = aabb.inflate(AABB_MARGIN);

        // Predictive fattening in the direction of travel.
        let predicted = displacement * DISPLACEMENT_MULTIPLIER;
        if predicted.x < 0.0 {
            fat_aabb.min.x += predicted.x;
        } else {
            fat_aabb.max.x += predicted.x;
        }
        if predicted.y < 0.0 {
            fat_aabb.min.y += predicted.y;
        } else {
            fat_aabb.max.y += predicted.y;
        }

        self.nodes[leaf as usize].aabb = fat_aabb;
        self.insert_leaf(leaf);
        true
    }

    /// Returns the user data for a given leaf.
    pub fn user_data(&self, leaf: i32) -> Option<&T> {
        if !self.is_live_leaf(leaf) {
            return None;
        }
        self.nodes[leaf as usize].user_data.as_ref()
    }

    /// Returns the fattened box stored for a leaf.
    pub fn fat_aabb(&self, leaf: i32) -> Option<Aabb> {
        self.is_live_leaf(leaf).then(|| self.nodes[leaf as usize].aabb)
    }

    /// Queries the tree for leaves overlapping the given AABB.
    ///
    /// The callback returns `false` to stop the traversal early.
    pub fn query<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(&T) -> bool,
    {
        if self.root == NULL_NODE {
            return;
        }

        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            if !node.aabb.intersects_aabb(aabb) {
                continue;
            }
            if node.is_leaf() {
                if let Some(data) = node.user_data.as_ref() {
                    if !callback(data) {
                        return;
                    }
                }
            } else {
                stack.push(node.children[0]);
                stack.push(node.children[1]);
            }
        }
    }

    /// Walks every leaf whose fat box the ray crosses within `max_distance`.
    ///
    /// The callback runs the exact shape test and returns the hit distance, if
    /// any. Each accepted hit shrinks the search range, so subtrees farther
    /// than the current best are pruned.
    pub fn ray_cast<F>(&self, origin: Vec2, direction: Vec2, max_distance: f32, mut callback: F)
    where
        F: FnMut(&T, f32) -> Option<f32>,
    {
        if self.root == NULL_NODE {
            return;
        }

        let mut best = max_distance;
        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            if node.aabb.ray_intersection(origin, direction, best).is_none() {
                continue;
            }
            if node.is_leaf() {
                if let Some(data) = node.user_data.as_ref() {
                    if let Some(distance) = callback(data, best) {
                        best = best.min(distance);
                    }
                }
            } else {
                stack.push(node.children[0]);
                stack.push(node.children[1]);
            }
        }
    }

    /// Iterates over the user data of every leaf.
    pub fn iter(&self) -> DynamicTreeIterator<'_, T> {
        let mut stack = Vec::new();
        if self.root != NULL_NODE {
            stack.push(self.root);
        }
        DynamicTreeIterator { tree: self, stack }
    }

    fn is_live_leaf(&self, leaf: i32) -> bool {
        leaf >= 0
            && (leaf as usize) < self.nodes.len()
            && self.nodes[leaf as usize].is_leaf()
            && self.nodes[leaf as usize].user_data.is_some()
    }

    // --- Internal Leaf Management ---

    fn insert_leaf(&mut self, leaf: i32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[self.root as usize].parent = NULL_NODE;
            return;
        }

        // Find the best sibling for the new leaf
        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let mut index = self.root;
        while !self.nodes[index as usize].is_leaf() {
            let node = &self.nodes[index as usize];
            let child1 = node.children[0];
            let child2 = node.children[1];

            let area = node.aabb.perimeter();
            let combined_area = node.aabb.merge(&leaf_aabb).perimeter();

            // Cost of creating a new parent for this node and the new leaf
            let cost = 2.0 * combined_area;

            // Minimum cost of pushing the leaf further down the tree
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost1 = self.descend_cost(child1, &leaf_aabb) + inheritance_cost;
            let cost2 = self.descend_cost(child2, &leaf_aabb) + inheritance_cost;

            if cost < cost1 && cost < cost2 {
                break;
            }

            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;

        // Create a new parent
        let old_parent = self.nodes[sibling as usize].parent;
        let new_parent = self.allocate_node();
        self.nodes[new_parent as usize].parent = old_parent;
        self.nodes[new_parent as usize].user_data = None;
        self.nodes[new_parent as usize].aabb = leaf_aabb.merge(&self.nodes[sibling as usize].aabb);
        self.nodes[new_parent as usize].height = self.nodes[sibling as usize].height + 1;
        self.nodes[new_parent as usize].children = [sibling, leaf];
        self.nodes[sibling as usize].parent = new_parent;
        self.nodes[leaf as usize].parent = new_parent;

        if old_parent != NULL_NODE {
            let parent = &mut self.nodes[old_parent as usize];
            if parent.children[0] == sibling {
                parent.children[0] = new_parent;
            } else {
                parent.children[1] = new_parent;
            }
        } else {
            self.root = new_parent;
        }

        // Walk back up the tree fixing heights and AABBs
        self.refit_ancestors(self.nodes[leaf as usize].parent);
    }

    fn descend_cost(&self, child: i32, leaf_aabb: &Aabb) -> f32 {
        let node = &self.nodes[child as usize];
        let new_area = node.aabb.merge(leaf_aabb).perimeter();
        if node.is_leaf() {
            new_area
        } else {
            new_area - node.aabb.perimeter()
        }
    }

    fn remove_leaf(&mut self, leaf: i32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent;
        let grand_parent = self.nodes[parent as usize].parent;
        let sibling = if self.nodes[parent as usize].children[0] == leaf {
            self.nodes[parent as usize].children[1]
        } else {
            self.nodes[parent as usize].children[0]
        };

        if grand_parent != NULL_NODE {
            // Destroy parent and connect sibling to grandParent
            if self.nodes[grand_parent as usize].children[0] == parent {
                self.nodes[grand_parent as usize].children[0] = sibling;
            } else {
                self.nodes[grand_parent as usize].children[1] = sibling;
            }
            self.nodes[sibling as usize].parent = grand_parent;
            self.deallocate_node(parent);
            self.refit_ancestors(grand_parent);
        } else {
            self.root = sibling;
            self.nodes[sibling as usize].parent = NULL_NODE;
            self.deallocate_node(parent);
        }
    }

    fn refit_ancestors(&mut self, mut index: i32) {
        while index != NULL_NODE {
            index = self.balance(index);
            self.update_node_meta(index);
            index = self.nodes[index as usize].parent;
        }
    }

    // --- Node Allocation ---

    fn allocate_node(&mut self) -> i32 {
        self.node_count += 1;
        if self.free_list != NULL_NODE {
            let index = self.free_list;
            let node = &mut self.nodes[index as usize];
            self.free_list = node.parent;
            node.parent = NULL_NODE;
            node.children = [NULL_NODE, NULL_NODE];
            node.height = 0;
            index
        } else {
            let index = self.nodes.len() as i32;
            self.nodes.push(DynamicTreeNode {
                aabb: Aabb::INVALID,
                user_data: None,
                parent: NULL_NODE,
                children: [NULL_NODE, NULL_NODE],
                height: 0,
            });
            index
        }
    }

    fn deallocate_node(&mut self, index: i32) {
        debug_assert!(index != NULL_NODE);
        let node = &mut self.nodes[index as usize];
        node.parent = self.free_list;
        node.children = [NULL_NODE, NULL_NODE];
        node.user_data = None;
        node.height = -1;
        self.free_list = index;
        self.node_count -= 1;
    }

    // --- Balancing (Tree Rotations) ---

    fn balance(&mut self, i_a: i32) -> i32 {
        debug_assert!(i_a != NULL_NODE);

        let node_a = &self.nodes[i_a as usize];
        if node_a.is_leaf() || node_a.height < 2 {
            return i_a;
        }

        let i_b = node_a.children[0];
        let i_c = node_a.children[1];

        let balance = self.nodes[i_c as usize].height - self.nodes[i_b as usize].height;

        // Rotate C up
        if balance > 1 {
            let i_f = self.nodes[i_c as usize].children[0];
            let i_g = self.nodes[i_c as usize].children[1];

            self.lift_over_parent(i_c, i_a);

            if self.nodes[i_f as usize].height > self.nodes[i_g as usize].height {
                self.nodes[i_c as usize].children[1] = i_f;
                self.nodes[i_a as usize].children[1] = i_g;
                self.nodes[i_g as usize].parent = i_a;
            } else {
                self.nodes[i_c as usize].children[1] = i_g;
                self.nodes[i_a as usize].children[1] = i_f;
                self.nodes[i_f as usize].parent = i_a;
            }
            self.update_node_meta(i_a);
            self.update_node_meta(i_c);

            return i_c;
        }

        // Rotate B up
        if balance < -1 {
            let i_d = self.nodes[i_b as usize].children[0];
            let i_e = self.nodes[i_b as usize].children[1];

            self.lift_over_parent(i_b, i_a);

            if self.nodes[i_d as usize].height > self.nodes[i_e as usize].height {
                self.nodes[i_b as usize].children[1] = i_d;
                self.nodes[i_a as usize].children[0] = i_e;
                self.nodes[i_e as usize].parent = i_a;
            } else {
                self.nodes[i_b as usize].children[1] = i_e;
                self.nodes[i_a as usize].children[0] = i_d;
                self.nodes[i_d as usize].parent = i_a;
            }
            self.update_node_meta(i_a);
            self.update_node_meta(i_b);

            return i_b;
        }

        i_a
    }

    /// Makes `child` take `parent`'s place, with `parent` as its first child.
    fn lift_over_parent(&mut self, child: i32, parent: i32) {
        let grand_parent = self.nodes[parent as usize].parent;
        self.nodes[child as usize].children[0] = parent;
        self.nodes[child as usize].parent = grand_parent;
        self.nodes[parent as usize].parent = child;

        if grand_parent != NULL_NODE {
            let gp = &mut self.nodes[grand_parent as usize];
            if gp.children[0] == parent {
                gp.children[0] = child;
            } else {
                gp.children[1] = child;
            }
        } else {
            self.root = child;
        }
    }

    fn update_node_meta(&mut self, index: i32) {
        let child1 = self.nodes[index as usize].children[0];
        let child2 = self.nodes[index as usize].children[1];
        if child1 == NULL_NODE || child2 == NULL_NODE {
            return;
        }
        self.nodes[index as usize].aabb = self.nodes[child1 as usize]
            .aabb
            .merge(&self.nodes[child2 as usize].aabb);
        self.nodes[index as usize].height = 1 + self.nodes[child1 as usize]
            .height
            .max(self.nodes[child2 as usize].height);
    }
}

/// Iterator for traversing all user data in the tree's leaves.
pub struct DynamicTreeIterator<'a, T: Clone> {
    tree: &'a DynamicTree<T>,
    stack: Vec<i32>,
}

impl<'a, T: Clone> Iterator for DynamicTreeIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node_id) = self.stack.pop() {
            let node = &self.tree.nodes[node_id as usize];
            if node.is_leaf() {
                if let Some(data) = node.user_data.as_ref() {
                    return Some(data);
                }
            } else {
                self.stack.push(node.children[0]);
                self.stack.push(node.children[1]);
            }
        }
        None
    }
}
