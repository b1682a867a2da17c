//! Authorization matrix.
//!
//! Every route asks one question through [`authorize`]: may this identity
//! exercise this capability? The answer is an explicit [`Access`] value, so
//! the whole matrix can be tested without a session or a database.

use crate::entities::Role;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub role: Role,
    /// The shop owned by this user, if any.
    pub shop_id: Option<i32>,
}

impl Identity {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// The caller's shop, only when acting in the `shop` role.
    #[must_use]
    pub const fn owned_shop(&self) -> Option<i32> {
        match self.role {
            Role::Shop => self.shop_id,
            _ => None,
        }
    }
}

/// Something a route needs the caller to be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any signed-in user.
    Authenticated,
    /// Holding exactly this role.
    Role(Role),
    /// Viewing an order: its buyer, or an admin.
    ViewOrder { buyer_id: i32 },
    /// Cancelling an order: its buyer, the owner of its shop, or an admin.
    CancelOrder { buyer_id: i32, shop_id: i32 },
    /// Moving an order through its statuses: the owner of its shop, or an admin.
    ManageOrder { shop_id: i32 },
    /// Editing catalog entries of a shop: that shop's owner.
    ManageShop { shop_id: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No identity at all.
    Unauthorized,
    /// Identity present but not allowed.
    Forbidden,
}

impl Access {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Granted } else { Self::Forbidden }
    }
}

/// A refused [`Access`], for `?`-style checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    Unauthorized,
    Forbidden,
}

/// [`authorize`] as a `Result`.
pub fn require(identity: Option<&Identity>, capability: Capability) -> Result<(), Denied> {
    match authorize(identity, capability) {
        Access::Granted => Ok(()),
        Access::Unauthorized => Err(Denied::Unauthorized),
        Access::Forbidden => Err(Denied::Forbidden),
    }
}

#[must_use]
pub fn authorize(identity: Option<&Identity>, capability: Capability) -> Access {
    let Some(who) = identity else {
        return Access::Unauthorized;
    };

    let allowed = match capability {
        Capability::Authenticated => true,
        Capability::Role(role) => who.role == role,
        Capability::ViewOrder { buyer_id } => who.user_id == buyer_id || who.is_admin(),
        Capability::CancelOrder { buyer_id, shop_id } => {
            who.user_id == buyer_id || who.is_admin() || who.owned_shop() == Some(shop_id)
        }
        Capability::ManageOrder { shop_id } => {
            who.is_admin() || who.owned_shop() == Some(shop_id)
        }
        Capability::ManageShop { shop_id } => who.owned_shop() == Some(shop_id),
    };

    Access::from_bool(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumer(id: i32) -> Identity {
        Identity {
            user_id: id,
            role: Role::User,
            shop_id: None,
        }
    }

    fn vendor(id: i32, shop_id: i32) -> Identity {
        Identity {
            user_id: id,
            role: Role::Shop,
            shop_id: Some(shop_id),
        }
    }

    fn admin(id: i32) -> Identity {
        Identity {
            user_id: id,
            role: Role::Admin,
            shop_id: None,
        }
    }

    #[test]
    fn anonymous_is_unauthorized_for_everything() {
        for cap in [
            Capability::Authenticated,
            Capability::Role(Role::Admin),
            Capability::CancelOrder {
                buyer_id: 1,
                shop_id: 1,
            },
            Capability::ManageShop { shop_id: 1 },
        ] {
            assert_eq!(authorize(None, cap), Access::Unauthorized);
        }
    }

    #[test]
    fn role_capability_requires_exact_role() {
        assert!(authorize(Some(&admin(1)), Capability::Role(Role::Admin)).is_granted());
        assert_eq!(
            authorize(Some(&consumer(2)), Capability::Role(Role::Admin)),
            Access::Forbidden
        );
        assert_eq!(
            authorize(Some(&admin(1)), Capability::Role(Role::Shop)),
            Access::Forbidden
        );
    }

    #[test]
    fn cancel_matrix() {
        let cap = Capability::CancelOrder {
            buyer_id: 5,
            shop_id: 9,
        };

        assert!(authorize(Some(&consumer(5)), cap).is_granted());
        assert!(authorize(Some(&vendor(7, 9)), cap).is_granted());
        assert!(authorize(Some(&admin(1)), cap).is_granted());

        assert_eq!(authorize(Some(&consumer(6)), cap), Access::Forbidden);
        assert_eq!(authorize(Some(&vendor(8, 10)), cap), Access::Forbidden);
    }

    #[test]
    fn manage_order_is_for_owning_shop_or_admin() {
        let cap = Capability::ManageOrder { shop_id: 9 };

        assert!(authorize(Some(&vendor(7, 9)), cap).is_granted());
        assert!(authorize(Some(&admin(1)), cap).is_granted());
        assert_eq!(authorize(Some(&vendor(8, 10)), cap), Access::Forbidden);
        assert_eq!(authorize(Some(&consumer(5)), cap), Access::Forbidden);
    }

    #[test]
    fn shop_id_only_counts_in_shop_role() {
        let odd = Identity {
            user_id: 3,
            role: Role::User,
            shop_id: Some(9),
        };
        assert_eq!(
            authorize(Some(&odd), Capability::ManageShop { shop_id: 9 }),
            Access::Forbidden
        );
    }

    #[test]
    fn order_detail_is_private_to_buyer_and_admin() {
        let cap = Capability::ViewOrder { buyer_id: 5 };
        assert!(authorize(Some(&consumer(5)), cap).is_granted());
        assert!(authorize(Some(&admin(1)), cap).is_granted());
        assert_eq!(authorize(Some(&vendor(7, 9)), cap), Access::Forbidden);
    }

    #[test]
    fn require_maps_denials() {
        assert_eq!(require(None, Capability::Authenticated), Err(Denied::Unauthorized));
        assert_eq!(
            require(Some(&consumer(2)), Capability::Role(Role::Shop)),
            Err(Denied::Forbidden)
        );
        assert!(require(Some(&vendor(7, 9)), Capability::Role(Role::Shop)).is_ok());
    }

    #[test]
    fn manage_shop_excludes_admin() {
        assert_eq!(
            authorize(Some(&admin(1)), Capability::ManageShop { shop_id: 9 }),
            Access::Forbidden
        );
    }
}
