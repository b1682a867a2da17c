//! Ownership tree for cascading deletes.
//!
//! The store does not cascade on its own. Deleting a shop or a user walks
//! an explicit tree of dependents and removes every node after everything
//! it owns, so no row is ever left pointing at a deleted parent.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    User(i32),
    Shop(i32),
    Food(i32),
    Order(i32),
    OrderItem(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTree {
    pub node: Node,
    pub dependents: Vec<OwnershipTree>,
}

impl OwnershipTree {
    #[must_use]
    pub const fn leaf(node: Node) -> Self {
        Self {
            node,
            dependents: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, dependent: Self) -> Self {
        self.dependents.push(dependent);
        self
    }

    /// An order and its line items.
    #[must_use]
    pub fn order(order_id: i32, item_ids: impl IntoIterator<Item = i32>) -> Self {
        item_ids
            .into_iter()
            .fold(Self::leaf(Node::Order(order_id)), |tree, item| {
                tree.with(Self::leaf(Node::OrderItem(item)))
            })
    }

    /// A shop, its orders (each with items), then its foods.
    #[must_use]
    pub fn shop(
        shop_id: i32,
        orders: impl IntoIterator<Item = Self>,
        food_ids: impl IntoIterator<Item = i32>,
    ) -> Self {
        let tree = orders
            .into_iter()
            .fold(Self::leaf(Node::Shop(shop_id)), Self::with);
        food_ids
            .into_iter()
            .fold(tree, |tree, food| tree.with(Self::leaf(Node::Food(food))))
    }

    /// A user, the orders they placed, then the shop they own.
    #[must_use]
    pub fn user(user_id: i32, orders: impl IntoIterator<Item = Self>, shop: Option<Self>) -> Self {
        let tree = orders
            .into_iter()
            .fold(Self::leaf(Node::User(user_id)), Self::with);
        match shop {
            Some(shop) => tree.with(shop),
            None => tree,
        }
    }

    /// Nodes in deletion order: every dependent before its owner.
    ///
    /// A node reachable along two paths (a shop owner's own order at their
    /// shop) is listed once, at its first position.
    #[must_use]
    pub fn deletion_plan(&self) -> Vec<Node> {
        let mut plan = Vec::new();
        let mut seen = HashSet::new();
        self.collect(&mut plan, &mut seen);
        plan
    }

    fn collect(&self, plan: &mut Vec<Node>, seen: &mut HashSet<Node>) {
        for dependent in &self.dependents {
            dependent.collect(plan, seen);
        }
        if seen.insert(self.node) {
            plan.push(self.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(plan: &[Node], node: Node) -> usize {
        plan.iter().position(|n| *n == node).unwrap()
    }

    #[test]
    fn order_items_go_before_their_order() {
        let plan = OwnershipTree::order(1, [10, 11]).deletion_plan();
        assert_eq!(
            plan,
            vec![Node::OrderItem(10), Node::OrderItem(11), Node::Order(1)]
        );
    }

    #[test]
    fn shop_is_deleted_after_orders_and_foods() {
        let tree = OwnershipTree::shop(
            3,
            [OwnershipTree::order(1, [10]), OwnershipTree::order(2, [])],
            [20, 21],
        );
        let plan = tree.deletion_plan();

        assert_eq!(
            plan,
            vec![
                Node::OrderItem(10),
                Node::Order(1),
                Node::Order(2),
                Node::Food(20),
                Node::Food(21),
                Node::Shop(3),
            ]
        );
    }

    #[test]
    fn user_cascade_covers_orders_and_owned_shop() {
        let shop = OwnershipTree::shop(3, [OwnershipTree::order(2, [12])], [20]);
        let tree = OwnershipTree::user(7, [OwnershipTree::order(1, [10])], Some(shop));
        let plan = tree.deletion_plan();

        assert_eq!(*plan.last().unwrap(), Node::User(7));
        assert!(position(&plan, Node::OrderItem(10)) < position(&plan, Node::Order(1)));
        assert!(position(&plan, Node::Order(2)) < position(&plan, Node::Shop(3)));
        assert!(position(&plan, Node::Food(20)) < position(&plan, Node::Shop(3)));
        assert!(position(&plan, Node::Shop(3)) < position(&plan, Node::User(7)));
        assert_eq!(plan.len(), 7);
    }

    #[test]
    fn shared_order_is_deleted_once() {
        // Vendor bought from their own shop: order 1 hangs off both the user and the shop.
        let shop = OwnershipTree::shop(3, [OwnershipTree::order(1, [10])], []);
        let tree = OwnershipTree::user(7, [OwnershipTree::order(1, [10])], Some(shop));
        let plan = tree.deletion_plan();

        assert_eq!(
            plan,
            vec![
                Node::OrderItem(10),
                Node::Order(1),
                Node::Shop(3),
                Node::User(7)
            ]
        );
    }
}
