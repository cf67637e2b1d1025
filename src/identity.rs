//! Identity provider seam
//!
//! Account lookup and role management behind a trait so services never
//! reach for a global user/role manager. The production implementation is
//! backed by the `users` and `role_assignments` tables.

use async_trait::async_trait;

use crate::entities::role_assignment::{self, Role};
use crate::entities::user;
use crate::prelude::*;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
  async fn find_by_id(&self, user_id: &str) -> Result<Option<user::Model>>;

  async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>>;

  async fn roles_of(&self, user_id: &str) -> Result<Vec<Role>>;

  async fn is_in_role(&self, user_id: &str, role: Role) -> Result<bool>;

  /// Idempotent: assigning an already-held role is a no-op.
  async fn add_to_role(&self, user_id: &str, role: Role) -> Result<()>;

  /// Idempotent: revoking a role the user does not hold is a no-op.
  async fn remove_from_role(&self, user_id: &str, role: Role) -> Result<()>;
}

pub struct DbIdentity {
  db: DatabaseConnection,
}

impl DbIdentity {
  pub fn new(db: DatabaseConnection) -> Self {
    Self { db }
  }
}

#[async_trait]
impl IdentityProvider for DbIdentity {
  async fn find_by_id(&self, user_id: &str) -> Result<Option<user::Model>> {
    let user = user::Entity::find_by_id(user_id).one(&self.db).await?;
    Ok(user)
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
    let user = user::Entity::find()
      .filter(user::Column::Email.eq(email))
      .one(&self.db)
      .await?;
    Ok(user)
  }

  async fn roles_of(&self, user_id: &str) -> Result<Vec<Role>> {
    let assignments = role_assignment::Entity::find()
      .filter(role_assignment::Column::UserId.eq(user_id))
      .all(&self.db)
      .await?;
    Ok(assignments.into_iter().map(|assignment| assignment.role).collect())
  }

  async fn is_in_role(&self, user_id: &str, role: Role) -> Result<bool> {
    let existing = role_assignment::Entity::find()
      .filter(role_assignment::Column::UserId.eq(user_id))
      .filter(role_assignment::Column::Role.eq(role))
      .one(&self.db)
      .await?;
    Ok(existing.is_some())
  }

  async fn add_to_role(&self, user_id: &str, role: Role) -> Result<()> {
    if self.is_in_role(user_id, role).await? {
      return Ok(());
    }

    role_assignment::ActiveModel {
      id: NotSet,
      user_id: Set(user_id.to_string()),
      role: Set(role),
    }
    .insert(&self.db)
    .await?;

    Ok(())
  }

  async fn remove_from_role(&self, user_id: &str, role: Role) -> Result<()> {
    role_assignment::Entity::delete_many()
      .filter(role_assignment::Column::UserId.eq(user_id))
      .filter(role_assignment::Column::Role.eq(role))
      .exec(&self.db)
      .await?;
    Ok(())
  }
}
