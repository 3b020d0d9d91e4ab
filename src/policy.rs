//! Role-based access policy.
//!
//! Every handler consults [`can`] (through [`require`]) before touching its
//! inputs. The permission table is static; there is no per-user grant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::enums::{Action, EntityType, Role},
};

/// Identity of an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
    /// `None` when the profile is missing or the stored role is unrecognized
    pub role: Option<Role>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn can(&self, action: Action, entity: EntityType) -> bool {
        can(Some(self), action, entity)
    }

    pub fn require(&self, action: Action, entity: EntityType) -> AppResult<()> {
        require(Some(self), action, entity)
    }

    /// Owners may modify their own records; admins may modify anyone's
    pub fn require_owner(&self, owner_id: i32, entity: EntityType) -> AppResult<()> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "You can only modify your own {}",
                entity.label()
            )))
        }
    }
}

const ALL: &[Action] = &[Action::View, Action::Create, Action::Edit, Action::Delete];
const VIEW: &[Action] = &[Action::View];
const NONE: &[Action] = &[];

/// Entity types readable without logging in
const PUBLIC_VIEW: &[EntityType] = &[
    EntityType::Author,
    EntityType::Book,
    EntityType::Post,
    EntityType::Tag,
];

/// Static role table
pub fn granted(role: Role, entity: EntityType) -> &'static [Action] {
    use EntityType as E;

    match (role, entity) {
        (Role::Admin, _) => ALL,

        (Role::Librarian, E::Author | E::Book) => &[Action::View, Action::Create, Action::Edit],
        (Role::Librarian, E::Library) => &[Action::View, Action::Edit],
        (Role::Librarian, E::Librarian | E::User | E::Tag) => VIEW,
        (Role::Librarian, E::Post) => ALL,

        (Role::Member, E::Author | E::Book | E::Library | E::Tag) => VIEW,
        (Role::Member, E::Post) => ALL,
        (Role::Member, E::Librarian | E::User) => NONE,
    }
}

pub fn is_public(action: Action, entity: EntityType) -> bool {
    action == Action::View && PUBLIC_VIEW.contains(&entity)
}

/// Decide whether `principal` may perform `action` on `entity`.
/// Never fails: unknown or missing roles simply get no grants.
pub fn can(principal: Option<&Principal>, action: Action, entity: EntityType) -> bool {
    if is_public(action, entity) {
        return true;
    }
    match principal.and_then(|p| p.role) {
        Some(role) => granted(role, entity).contains(&action),
        None => false,
    }
}

/// Like [`can`], but turns a denial into the error the handler should return
pub fn require(principal: Option<&Principal>, action: Action, entity: EntityType) -> AppResult<()> {
    if can(principal, action, entity) {
        return Ok(());
    }
    match principal {
        None => Err(AppError::Authentication("Authentication required".to_string())),
        Some(p) => {
            tracing::debug!(
                user_id = p.user_id,
                role = ?p.role,
                ?action,
                ?entity,
                "permission denied"
            );
            Err(AppError::Authorization(format!(
                "Insufficient rights to {:?} {}",
                action,
                entity.label()
            )
            .to_lowercase()))
        }
    }
}

/// Per-action permission map for one entity type
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionSet {
    pub entity: EntityType,
    pub permissions: BTreeMap<Action, bool>,
}

pub fn permissions_for(principal: Option<&Principal>, entity: EntityType) -> PermissionSet {
    PermissionSet {
        entity,
        permissions: Action::ALL
            .iter()
            .map(|action| (*action, can(principal, *action, entity)))
            .collect(),
    }
}
