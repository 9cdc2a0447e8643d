//! Endpoint access policies
//!
//! A [`Policy`] is an OR over [`Permission`] predicates. Each predicate has a
//! collection-level check (run before any lookup) and an instance-level check
//! (run once the target resource is loaded). Evaluating a policy yields an
//! [`Access`] tri-state so that anonymous callers get 401 and authenticated
//! callers get 403.

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
};

/// What the request does to the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    /// Non-mutating actions
    pub fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// Resources owned by a user
pub trait Owned {
    fn owner_id(&self) -> i32;
}

/// A single access predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Authenticated administrators
    AdminOnly,
    /// Authenticated callers on the collection, the owning user on an instance
    OwnerOnly,
    /// Read actions, for anyone
    ReadOnly,
    /// Any authenticated caller
    Authenticated,
}

impl Permission {
    pub fn has_permission(self, caller: Option<&UserClaims>, action: Action) -> bool {
        match self {
            Permission::AdminOnly => caller.map_or(false, UserClaims::is_admin),
            Permission::OwnerOnly | Permission::Authenticated => caller.is_some(),
            Permission::ReadOnly => action.is_safe(),
        }
    }

    pub fn has_object_permission(
        self,
        caller: Option<&UserClaims>,
        action: Action,
        owner_id: i32,
    ) -> bool {
        match self {
            Permission::OwnerOnly => caller.map_or(false, |claims| claims.user_id == owner_id),
            _ => self.has_permission(caller, action),
        }
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Authenticated but not allowed
    Deny,
    /// Not allowed, and no credentials were presented
    Unauthenticated,
}

impl Access {
    fn denied_for(caller: Option<&UserClaims>) -> Self {
        if caller.is_some() {
            Access::Deny
        } else {
            Access::Unauthenticated
        }
    }

    pub fn into_result(self) -> AppResult<()> {
        match self {
            Access::Allow => Ok(()),
            Access::Deny => Err(AppError::Authorization(
                "You do not have permission to perform this action".to_string(),
            )),
            Access::Unauthenticated => Err(AppError::Authentication(
                "Authentication credentials were not provided".to_string(),
            )),
        }
    }
}

/// OR-composition of permissions attached to an endpoint
#[derive(Debug, Clone, Copy)]
pub struct Policy(&'static [Permission]);

impl Policy {
    /// Authors, genres and books
    pub const ADMIN_OR_READ_ONLY: Policy = Policy(&[Permission::AdminOnly, Permission::ReadOnly]);
    /// Inventory count adjustment
    pub const ADMIN_OR_AUTHENTICATED: Policy =
        Policy(&[Permission::AdminOnly, Permission::Authenticated]);
    /// Reviews and ratings
    pub const ADMIN_OR_OWNER_OR_READ_ONLY: Policy = Policy(&[
        Permission::AdminOnly,
        Permission::OwnerOnly,
        Permission::ReadOnly,
    ]);

    pub const fn new(permissions: &'static [Permission]) -> Self {
        Policy(permissions)
    }

    /// Collection-level evaluation
    pub fn evaluate(&self, caller: Option<&UserClaims>, action: Action) -> Access {
        if self.0.iter().any(|p| p.has_permission(caller, action)) {
            Access::Allow
        } else {
            Access::denied_for(caller)
        }
    }

    /// Instance-level evaluation; a predicate only counts when its
    /// collection-level check passes as well
    pub fn evaluate_object<R: Owned>(
        &self,
        caller: Option<&UserClaims>,
        action: Action,
        resource: &R,
    ) -> Access {
        let owner = resource.owner_id();
        let allowed = self.0.iter().any(|p| {
            p.has_permission(caller, action) && p.has_object_permission(caller, action, owner)
        });
        if allowed {
            Access::Allow
        } else {
            Access::denied_for(caller)
        }
    }

    pub fn check(&self, caller: Option<&UserClaims>, action: Action) -> AppResult<()> {
        self.evaluate(caller, action).into_result()
    }

    pub fn check_object<R: Owned>(
        &self,
        caller: Option<&UserClaims>,
        action: Action,
        resource: &R,
    ) -> AppResult<()> {
        self.evaluate_object(caller, action, resource).into_result()
    }
}
