//! User accounts and the admin management surface

use uuid::Uuid;

use crate::entities::role_assignment::{self, Role};
use crate::entities::user;
use crate::identity::IdentityProvider;
use crate::prelude::*;

const PAGE_SIZE: u64 = 30;

pub struct User<'a, I> {
  db: &'a DatabaseConnection,
  identity: &'a I,
}

impl<'a, I: IdentityProvider> User<'a, I> {
  pub fn new(db: &'a DatabaseConnection, identity: &'a I) -> Self {
    Self { db, identity }
  }

  pub async fn register(
    &self,
    email: &str,
    full_name: Option<String>,
  ) -> Result<user::Model> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
      return Err(Error::Validation("invalid email".into()));
    }

    if self.identity.find_by_email(&email).await?.is_some() {
      return Err(Error::EmailTaken);
    }

    let user = user::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      email: Set(email),
      full_name: Set(full_name),
      phone_number: Set(None),
      address: Set(None),
      is_member: Set(false),
      subscription_expiry: Set(None),
      reg_date: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!("registered user {} ({})", user.id, user.email);
    Ok(user)
  }

  pub async fn by_id(&self, user_id: &str) -> Result<user::Model> {
    self.identity.find_by_id(user_id).await?.ok_or(Error::UserNotFound)
  }

  pub async fn update_profile(
    &self,
    user_id: &str,
    full_name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
  ) -> Result<user::Model> {
    let user = self.by_id(user_id).await?;

    let updated = user::ActiveModel {
      full_name: Set(full_name),
      phone_number: Set(phone_number),
      address: Set(address),
      ..user.into()
    }
    .update(self.db)
    .await?;

    Ok(updated)
  }

  /// One page of users matching the term against email or name, newest
  /// registrations first.
  pub async fn search(
    &self,
    term: Option<&str>,
    page: u64,
  ) -> Result<(Vec<user::Model>, u64)> {
    let mut query = user::Entity::find();
    if let Some(term) = term.filter(|t| !t.trim().is_empty()) {
      query = query.filter(
        Condition::any()
          .add(user::Column::Email.contains(term))
          .add(user::Column::FullName.contains(term)),
      );
    }

    let total = query.clone().count(self.db).await?;
    let page = page.max(1);

    let users = query
      .order_by_desc(user::Column::RegDate)
      .offset((page - 1) * PAGE_SIZE)
      .limit(PAGE_SIZE)
      .all(self.db)
      .await?;

    Ok((users, total))
  }

  /// Regular account deletion; staff accounts go through
  /// [`User::delete_admin`].
  pub async fn delete(&self, user_id: &str) -> Result<()> {
    self.by_id(user_id).await?;

    let roles = self.identity.roles_of(user_id).await?;
    if roles.iter().any(|role| matches!(role, Role::Admin | Role::SuperAdmin))
    {
      return Err(Error::Validation(
        "admin accounts cannot be deleted here".into(),
      ));
    }

    user::Entity::delete_by_id(user_id).exec(self.db).await?;
    Ok(())
  }

  pub async fn create_admin(
    &self,
    email: &str,
    full_name: Option<String>,
  ) -> Result<user::Model> {
    let user = self.register(email, full_name).await?;
    self.identity.add_to_role(&user.id, Role::Admin).await?;
    Ok(user)
  }

  /// All admin accounts, ordered by email.
  pub async fn admins(&self) -> Result<Vec<user::Model>> {
    let rows = role_assignment::Entity::find()
      .filter(role_assignment::Column::Role.eq(Role::Admin))
      .find_also_related(user::Entity)
      .all(self.db)
      .await?;

    let mut admins: Vec<_> =
      rows.into_iter().filter_map(|(_, user)| user).collect();
    admins.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(admins)
  }

  /// Super-admin accounts are out of reach even here.
  pub async fn delete_admin(&self, user_id: &str) -> Result<()> {
    self.by_id(user_id).await?;

    if self.identity.is_in_role(user_id, Role::SuperAdmin).await? {
      return Err(Error::Validation(
        "super admin accounts cannot be deleted".into(),
      ));
    }

    user::Entity::delete_by_id(user_id).exec(self.db).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::identity::DbIdentity;
  use crate::sv::testing::*;

  #[tokio::test]
  async fn duplicate_email_is_a_conflict() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let users = User::new(&db, &identity);

    users.register("reader@example.com", None).await.unwrap();
    let result = users.register("Reader@Example.com", None).await;

    assert!(matches!(result, Err(Error::EmailTaken)));
  }

  #[tokio::test]
  async fn created_admins_hold_the_admin_role() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let users = User::new(&db, &identity);

    let admin = users
      .create_admin("admin@example.com", Some("Site Admin".into()))
      .await
      .unwrap();

    assert!(identity.is_in_role(&admin.id, Role::Admin).await.unwrap());
    let listed = users.admins().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, admin.id);
  }

  #[tokio::test]
  async fn admins_cannot_be_deleted_through_the_user_path() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let users = User::new(&db, &identity);

    let admin = users.create_admin("admin@example.com", None).await.unwrap();

    let result = users.delete(&admin.id).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    // the dedicated admin path works, but never for super admins
    users.delete_admin(&admin.id).await.unwrap();

    let root = users.register("root@example.com", None).await.unwrap();
    identity.add_to_role(&root.id, Role::SuperAdmin).await.unwrap();
    let result = users.delete_admin(&root.id).await;
    assert!(matches!(result, Err(Error::Validation(_))));
  }

  #[tokio::test]
  async fn search_matches_email_and_name() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let users = User::new(&db, &identity);

    users.register("alice@example.com", Some("Alice".into())).await.unwrap();
    users.register("bob@example.com", Some("Bob".into())).await.unwrap();

    let (found, total) = users.search(Some("alice"), 1).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].email, "alice@example.com");

    let (all, total) = users.search(None, 1).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);
  }
}
