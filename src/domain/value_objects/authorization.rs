//! The authorization guard: a pure decision over who is acting, what they
//! want to do, and who owns the target.

use std::fmt::Display;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::enums::roles::Role;

/// The caller as seen after reconciliation. `user_id` is `None` for
/// anonymous requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    pub role: Role,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            role: Role::User,
        }
    }

    pub fn authenticated(user_id: Uuid, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreatePlace,
    UpdatePlace,
    DeletePlace,
    ModeratePlace,
    ListMyPlaces,
    ListPlacesByStatus,
    CreatePackage,
    Subscribe,
    ListMySubscriptions,
    CheckSubscription,
    CreateAdvertisement,
    UpdateAdvertisement,
    DeleteAdvertisement,
    ListMyAdvertisements,
    ViewCurrentUser,
    ListUsers,
    SetUserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    AuthenticatedOnly,
    OwnerOrAdmin,
    AdminOnly,
    PremiumGated,
}

impl Operation {
    pub fn class(&self) -> OperationClass {
        match self {
            Operation::CreatePlace
            | Operation::ListMyPlaces
            | Operation::Subscribe
            | Operation::ListMySubscriptions
            | Operation::CheckSubscription
            | Operation::ListMyAdvertisements
            | Operation::ViewCurrentUser => OperationClass::AuthenticatedOnly,
            Operation::UpdatePlace
            | Operation::DeletePlace
            | Operation::UpdateAdvertisement
            | Operation::DeleteAdvertisement => OperationClass::OwnerOrAdmin,
            Operation::ModeratePlace
            | Operation::ListPlacesByStatus
            | Operation::CreatePackage
            | Operation::ListUsers
            | Operation::SetUserRole => OperationClass::AdminOnly,
            Operation::CreateAdvertisement => OperationClass::PremiumGated,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operation = match self {
            Operation::CreatePlace => "create place",
            Operation::UpdatePlace => "update place",
            Operation::DeletePlace => "delete place",
            Operation::ModeratePlace => "moderate place",
            Operation::ListMyPlaces => "list own places",
            Operation::ListPlacesByStatus => "list places by moderation status",
            Operation::CreatePackage => "create package",
            Operation::Subscribe => "subscribe",
            Operation::ListMySubscriptions => "list own subscriptions",
            Operation::CheckSubscription => "check subscription",
            Operation::CreateAdvertisement => "create advertisement",
            Operation::UpdateAdvertisement => "update advertisement",
            Operation::DeleteAdvertisement => "delete advertisement",
            Operation::ListMyAdvertisements => "list own advertisements",
            Operation::ViewCurrentUser => "view current user",
            Operation::ListUsers => "list users",
            Operation::SetUserRole => "set user role",
        };
        write!(f, "{}", operation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("not allowed to {0}")]
    Forbidden(Operation),
}

pub fn authorize(
    actor: &Actor,
    operation: Operation,
    resource_owner_id: Option<Uuid>,
) -> Result<(), AuthorizationError> {
    let Some(user_id) = actor.user_id else {
        return Err(AuthorizationError::Unauthenticated);
    };

    let allowed = match operation.class() {
        OperationClass::AuthenticatedOnly => true,
        OperationClass::OwnerOrAdmin => {
            actor.role.is_admin() || resource_owner_id == Some(user_id)
        }
        OperationClass::AdminOnly => actor.role.is_admin(),
        OperationClass::PremiumGated => matches!(actor.role, Role::Premium | Role::Admin),
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthorizationError::Forbidden(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Operation; 17] = [
        Operation::CreatePlace,
        Operation::UpdatePlace,
        Operation::DeletePlace,
        Operation::ModeratePlace,
        Operation::ListMyPlaces,
        Operation::ListPlacesByStatus,
        Operation::CreatePackage,
        Operation::Subscribe,
        Operation::ListMySubscriptions,
        Operation::CheckSubscription,
        Operation::CreateAdvertisement,
        Operation::UpdateAdvertisement,
        Operation::DeleteAdvertisement,
        Operation::ListMyAdvertisements,
        Operation::ViewCurrentUser,
        Operation::ListUsers,
        Operation::SetUserRole,
    ];

    #[test]
    fn anonymous_is_unauthenticated_everywhere() {
        for operation in ALL {
            assert_eq!(
                authorize(&Actor::anonymous(), operation, Some(Uuid::new_v4())),
                Err(AuthorizationError::Unauthenticated),
                "{}",
                operation
            );
        }
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        let admin = Actor::authenticated(Uuid::new_v4(), Role::Admin);
        for operation in ALL {
            assert_eq!(authorize(&admin, operation, Some(Uuid::new_v4())), Ok(()));
        }
    }

    #[test]
    fn owner_or_admin() {
        let owner_id = Uuid::new_v4();
        let owner = Actor::authenticated(owner_id, Role::User);
        let stranger = Actor::authenticated(Uuid::new_v4(), Role::Premium);

        assert_eq!(authorize(&owner, Operation::UpdatePlace, Some(owner_id)), Ok(()));
        assert_eq!(
            authorize(&stranger, Operation::UpdatePlace, Some(owner_id)),
            Err(AuthorizationError::Forbidden(Operation::UpdatePlace))
        );
        assert_eq!(
            authorize(&owner, Operation::DeleteAdvertisement, None),
            Err(AuthorizationError::Forbidden(Operation::DeleteAdvertisement))
        );
    }

    #[test]
    fn premium_gate() {
        let user = Actor::authenticated(Uuid::new_v4(), Role::User);
        let premium = Actor::authenticated(Uuid::new_v4(), Role::Premium);

        assert_eq!(
            authorize(&user, Operation::CreateAdvertisement, None),
            Err(AuthorizationError::Forbidden(Operation::CreateAdvertisement))
        );
        assert_eq!(authorize(&premium, Operation::CreateAdvertisement, None), Ok(()));
    }

    #[test]
    fn admin_only_rejects_premium() {
        let premium = Actor::authenticated(Uuid::new_v4(), Role::Premium);
        for operation in ALL
            .into_iter()
            .filter(|op| op.class() == OperationClass::AdminOnly)
        {
            assert_eq!(
                authorize(&premium, operation, None),
                Err(AuthorizationError::Forbidden(operation))
            );
        }
    }

    #[test]
    fn authenticated_only_ignores_role() {
        let user = Actor::authenticated(Uuid::new_v4(), Role::User);
        assert_eq!(authorize(&user, Operation::Subscribe, None), Ok(()));
        assert_eq!(authorize(&user, Operation::CreatePlace, None), Ok(()));
    }
}
