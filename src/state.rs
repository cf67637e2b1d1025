use migration::Migrator;

use crate::entities::role_assignment::Role;
use crate::identity::{DbIdentity, IdentityProvider};
use crate::prelude::*;
use crate::sv;

pub struct Services<'a> {
  pub access: sv::Access<'a, DbIdentity>,
  pub subscription: sv::Subscription<'a, DbIdentity>,
  pub ledger: sv::Ledger<'a>,
  pub analytics: sv::Analytics<'a>,
  pub history: sv::History<'a>,
  pub catalog: sv::Catalog<'a>,
  pub review: sv::Review<'a>,
  pub favorite: sv::Favorite<'a>,
  pub user: sv::User<'a, DbIdentity>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub identity: DbIdentity,
}

impl AppState {
  pub async fn new(db_url: &str) -> Self {
    info!("Connecting to database...");
    let db =
      Database::connect(db_url).await.expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let identity = DbIdentity::new(db.clone());
    Self { db, identity }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      access: sv::Access::new(&self.db, &self.identity),
      subscription: sv::Subscription::new(&self.db, &self.identity),
      ledger: sv::Ledger::new(&self.db),
      analytics: sv::Analytics::new(&self.db),
      history: sv::History::new(&self.db),
      catalog: sv::Catalog::new(&self.db),
      review: sv::Review::new(&self.db),
      favorite: sv::Favorite::new(&self.db),
      user: sv::User::new(&self.db, &self.identity),
    }
  }

  /// Make sure every configured super-admin account exists and holds the
  /// role. Safe to run on every boot.
  pub async fn seed_super_admins(
    &self,
    emails: &[String],
  ) -> anyhow::Result<()> {
    for email in emails {
      let user = match self
        .identity
        .find_by_email(email)
        .await
        .with_context(|| format!("looking up super admin {email}"))?
      {
        Some(user) => user,
        None => self
          .sv()
          .user
          .register(email, None)
          .await
          .with_context(|| format!("creating super admin {email}"))?,
      };
      self.identity.add_to_role(&user.id, Role::SuperAdmin).await?;
      info!("super admin ready: {email}");
    }
    Ok(())
  }
}
