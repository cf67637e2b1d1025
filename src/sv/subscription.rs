//! Subscription state machine
//!
//! Purchases and admin extensions anchor the new expiry on
//! `max(current expiry, now)` and commit the ledger entry together with the
//! user update in one transaction, re-reading the expiry inside it so
//! concurrent extensions never base themselves on a stale value. Role
//! assignment is synced after the commit; a sync failure never rolls back
//! a recorded payment.

use serde::Serialize;

use crate::entities::payment_transaction::{self, COMPLETED, PackageType};
use crate::entities::role_assignment::Role;
use crate::entities::user;
use crate::identity::IdentityProvider;
use crate::prelude::*;

/// Sentinel duration for "never expires": one hundred years out.
const LIFETIME_MONTHS: u32 = 1200;

/// `months` value admins send to grant a lifetime subscription.
const LIFETIME_SENTINEL: u32 = 999;

#[derive(Debug, PartialEq, Serialize)]
pub enum SubscriptionState {
  NoSubscription,
  ActiveFinite(DateTime),
  ActiveLifetime,
}

#[derive(Debug, Serialize)]
pub struct PurchaseReceipt {
  pub transaction_id: i32,
  pub expires_at: DateTime,
  /// False when the payment stood but the Member role could not be synced.
  pub role_synced: bool,
}

/// Base date for an extension: the current expiry while it is still in the
/// future, otherwise now.
fn anchor(current: Option<DateTime>, now: DateTime) -> DateTime {
  match current {
    Some(expiry) if expiry > now => expiry,
    _ => now,
  }
}

fn add_months(date: DateTime, months: u32) -> Result<DateTime> {
  date
    .checked_add_months(Months::new(months))
    .ok_or_else(|| Error::Internal("expiry date out of range".into()))
}

pub struct Subscription<'a, I> {
  db: &'a DatabaseConnection,
  identity: &'a I,
}

impl<'a, I: IdentityProvider> Subscription<'a, I> {
  pub fn new(db: &'a DatabaseConnection, identity: &'a I) -> Self {
    Self { db, identity }
  }

  pub fn state_of(user: &user::Model, now: DateTime) -> SubscriptionState {
    if !user.is_member {
      return SubscriptionState::NoSubscription;
    }
    match user.subscription_expiry {
      None => SubscriptionState::ActiveLifetime,
      Some(expiry) if expiry > now => SubscriptionState::ActiveFinite(expiry),
      Some(_) => SubscriptionState::NoSubscription,
    }
  }

  pub async fn status(&self, user_id: &str) -> Result<SubscriptionState> {
    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;
    Ok(Self::state_of(&user, Utc::now().naive_utc()))
  }

  /// Purchase a VIP package: exactly one Completed ledger entry at the
  /// package's fixed price, plus the anchored expiry update.
  pub async fn purchase(
    &self,
    user_id: &str,
    package: PackageType,
  ) -> Result<PurchaseReceipt> {
    let now = Utc::now().naive_utc();
    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    let expires_at = match package.months() {
      Some(months) => {
        add_months(anchor(user.subscription_expiry, now), months)?
      }
      None => add_months(now, LIFETIME_MONTHS)?,
    };

    let entry = payment_transaction::ActiveModel {
      transaction_id: NotSet,
      user_id: Set(user.id.clone()),
      package: Set(package),
      amount: Set(package.price()),
      transaction_date: Set(now),
      status: Set(COMPLETED.to_string()),
      notes: Set(Some(format!("VIP purchase: {}", package.label()))),
    }
    .insert(&txn)
    .await?;

    user::ActiveModel {
      is_member: Set(true),
      subscription_expiry: Set(Some(expires_at)),
      ..user.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    info!(
      "user {user_id} purchased {} for {}",
      package.label(),
      package.price()
    );

    let role_synced = self.sync_member_role(user_id).await;

    Ok(PurchaseReceipt {
      transaction_id: entry.transaction_id,
      expires_at,
      role_synced,
    })
  }

  /// Admin extension: same anchoring as a purchase, recorded in the ledger
  /// at price zero. `months == 999` grants a lifetime subscription.
  pub async fn admin_extend(
    &self,
    user_id: &str,
    months: u32,
  ) -> Result<DateTime> {
    if months == 0 || months > LIFETIME_SENTINEL {
      return Err(Error::Validation(
        "months must be between 1 and 999".into(),
      ));
    }

    let now = Utc::now().naive_utc();
    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    let expires_at = if months == LIFETIME_SENTINEL {
      add_months(now, LIFETIME_MONTHS)?
    } else {
      add_months(anchor(user.subscription_expiry, now), months)?
    };

    let package = match months {
      1 => PackageType::OneMonth,
      3 => PackageType::ThreeMonths,
      6 => PackageType::SixMonths,
      12 => PackageType::OneYear,
      _ => PackageType::Lifetime,
    };

    payment_transaction::ActiveModel {
      transaction_id: NotSet,
      user_id: Set(user.id.clone()),
      package: Set(package),
      amount: Set(0),
      transaction_date: Set(now),
      status: Set(COMPLETED.to_string()),
      notes: Set(Some("Extended by admin".to_string())),
    }
    .insert(&txn)
    .await?;

    user::ActiveModel {
      is_member: Set(true),
      subscription_expiry: Set(Some(expires_at)),
      ..user.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    if !self.sync_member_role(user_id).await {
      warn!("member role left out of sync after admin extension");
    }

    Ok(expires_at)
  }

  /// Revoke VIP: clears the subscription fields and the Member role. The
  /// ledger keeps every past entry untouched.
  pub async fn admin_remove_vip(&self, user_id: &str) -> Result<()> {
    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    if !user.is_member {
      return Err(Error::Validation("user has no VIP subscription".into()));
    }

    user::ActiveModel {
      is_member: Set(false),
      subscription_expiry: Set(None),
      ..user.into()
    }
    .update(self.db)
    .await?;

    self.identity.remove_from_role(user_id, Role::Member).await?;

    info!("VIP removed from user {user_id}");
    Ok(())
  }

  async fn sync_member_role(&self, user_id: &str) -> bool {
    match self.identity.add_to_role(user_id, Role::Member).await {
      Ok(()) => true,
      Err(err) => {
        warn!("member role sync failed for {user_id}: {err}");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::identity::DbIdentity;
  use crate::sv::testing::*;

  #[tokio::test]
  async fn first_purchase_anchors_on_now() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "buyer", false, None).await;

    let before = Utc::now().naive_utc();
    let receipt = Subscription::new(&db, &identity)
      .purchase(&user.id, PackageType::OneMonth)
      .await
      .unwrap();

    let expected = before.checked_add_months(Months::new(1)).unwrap();
    let drift = (receipt.expires_at - expected).abs();
    assert!(drift < TimeDelta::minutes(1));

    let entries = payment_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 50_000);
    assert_eq!(entries[0].status, COMPLETED);
  }

  #[tokio::test]
  async fn repeat_purchase_anchors_on_the_existing_expiry() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());

    let current = (Utc::now().naive_utc() + TimeDelta::days(10))
      .with_nanosecond(0)
      .unwrap();
    let user = seed_user(&db, "buyer", true, Some(current)).await;

    let receipt = Subscription::new(&db, &identity)
      .purchase(&user.id, PackageType::ThreeMonths)
      .await
      .unwrap();

    let expected = current.checked_add_months(Months::new(3)).unwrap();
    assert_eq!(receipt.expires_at, expected);

    let entries = payment_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 130_000);
  }

  #[tokio::test]
  async fn lapsed_expiry_anchors_on_now_again() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());

    let lapsed = Utc::now().naive_utc() - TimeDelta::days(30);
    let user = seed_user(&db, "returning", true, Some(lapsed)).await;

    let before = Utc::now().naive_utc();
    let receipt = Subscription::new(&db, &identity)
      .purchase(&user.id, PackageType::OneMonth)
      .await
      .unwrap();

    let expected = before.checked_add_months(Months::new(1)).unwrap();
    let drift = (receipt.expires_at - expected).abs();
    assert!(drift < TimeDelta::minutes(1));
  }

  #[tokio::test]
  async fn purchase_assigns_the_member_role() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "buyer", false, None).await;

    Subscription::new(&db, &identity)
      .purchase(&user.id, PackageType::OneYear)
      .await
      .unwrap();

    assert!(identity.is_in_role("buyer", Role::Member).await.unwrap());

    let user = user::Entity::find_by_id("buyer").one(&db).await.unwrap().unwrap();
    assert!(user.is_member);
  }

  #[tokio::test]
  async fn lifetime_package_sets_a_far_future_expiry() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "whale", false, None).await;

    let receipt = Subscription::new(&db, &identity)
      .purchase(&user.id, PackageType::Lifetime)
      .await
      .unwrap();

    let now = Utc::now().naive_utc();
    assert!(receipt.expires_at > now + TimeDelta::days(99 * 365));

    let entries = payment_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries[0].amount, 1_200_000);
  }

  #[tokio::test]
  async fn admin_extension_is_recorded_at_price_zero() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "gifted", false, None).await;

    let subscription = Subscription::new(&db, &identity);
    let expires_at = subscription.admin_extend(&user.id, 3).await.unwrap();

    let now = Utc::now().naive_utc();
    assert!(expires_at > now + TimeDelta::days(80));

    let entries = payment_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 0);
    assert_eq!(entries[0].notes.as_deref(), Some("Extended by admin"));

    // revenue is untouched by admin extensions
    let revenue: i64 = entries
      .iter()
      .filter(|entry| entry.status == COMPLETED)
      .map(|entry| entry.amount)
      .sum();
    assert_eq!(revenue, 0);
  }

  #[tokio::test]
  async fn admin_extension_999_means_lifetime() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "vip", false, None).await;

    let expires_at = Subscription::new(&db, &identity)
      .admin_extend(&user.id, 999)
      .await
      .unwrap();

    let now = Utc::now().naive_utc();
    assert!(expires_at > now + TimeDelta::days(99 * 365));
  }

  #[tokio::test]
  async fn admin_extension_rejects_zero_months() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "gifted", false, None).await;

    let result =
      Subscription::new(&db, &identity).admin_extend(&user.id, 0).await;

    assert!(matches!(result, Err(Error::Validation(_))));
  }

  #[tokio::test]
  async fn vip_removal_clears_fields_and_role_but_not_the_ledger() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "former", false, None).await;

    let subscription = Subscription::new(&db, &identity);
    subscription.purchase(&user.id, PackageType::SixMonths).await.unwrap();
    subscription.admin_remove_vip(&user.id).await.unwrap();

    let user = user::Entity::find_by_id("former").one(&db).await.unwrap().unwrap();
    assert!(!user.is_member);
    assert_eq!(user.subscription_expiry, None);
    assert!(!identity.is_in_role("former", Role::Member).await.unwrap());

    // the payment stays on record
    let entries = payment_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 250_000);
  }

  #[tokio::test]
  async fn vip_removal_rejects_non_members() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    let user = seed_user(&db, "regular", false, None).await;

    let result =
      Subscription::new(&db, &identity).admin_remove_vip(&user.id).await;

    assert!(matches!(result, Err(Error::Validation(_))));
  }

  #[tokio::test]
  async fn missing_user_is_not_found() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());

    let result = Subscription::new(&db, &identity)
      .purchase("ghost", PackageType::OneMonth)
      .await;

    assert!(matches!(result, Err(Error::UserNotFound)));
  }

  #[test]
  fn state_classification() {
    let now = Utc::now().naive_utc();
    let base = user::Model {
      id: "u".into(),
      email: "u@example.com".into(),
      full_name: None,
      phone_number: None,
      address: None,
      is_member: false,
      subscription_expiry: None,
      reg_date: now,
    };

    assert_eq!(
      Subscription::<DbIdentity>::state_of(&base, now),
      SubscriptionState::NoSubscription
    );

    let lifetime = user::Model { is_member: true, ..base.clone() };
    assert_eq!(
      Subscription::<DbIdentity>::state_of(&lifetime, now),
      SubscriptionState::ActiveLifetime
    );

    let finite = user::Model {
      is_member: true,
      subscription_expiry: Some(now + TimeDelta::days(5)),
      ..base.clone()
    };
    assert_eq!(
      Subscription::<DbIdentity>::state_of(&finite, now),
      SubscriptionState::ActiveFinite(now + TimeDelta::days(5))
    );

    let lapsed = user::Model {
      is_member: true,
      subscription_expiry: Some(now - TimeDelta::days(5)),
      ..base
    };
    assert_eq!(
      Subscription::<DbIdentity>::state_of(&lapsed, now),
      SubscriptionState::NoSubscription
    );
  }
}
