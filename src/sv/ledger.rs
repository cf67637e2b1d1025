//! Read side of the payment ledger
//!
//! The ledger is append-only; writes happen exclusively inside the
//! subscription service's transactions.

use crate::entities::payment_transaction;
use crate::prelude::*;

pub struct Ledger<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Ledger<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn find(
    &self,
    transaction_id: i32,
  ) -> Result<payment_transaction::Model> {
    payment_transaction::Entity::find_by_id(transaction_id)
      .one(self.db)
      .await?
      .ok_or(Error::TransactionNotFound)
  }

  pub async fn for_user(
    &self,
    user_id: &str,
  ) -> Result<Vec<payment_transaction::Model>> {
    let entries = payment_transaction::Entity::find()
      .filter(payment_transaction::Column::UserId.eq(user_id))
      .order_by_desc(payment_transaction::Column::TransactionDate)
      .all(self.db)
      .await?;
    Ok(entries)
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entities::payment_transaction::PackageType;
  use crate::identity::DbIdentity;
  use crate::sv::Subscription;
  use crate::sv::testing::*;

  #[tokio::test]
  async fn user_history_is_most_recent_first() {
    let db = setup_test_db().await;
    let identity = DbIdentity::new(db.clone());
    seed_user(&db, "buyer", false, None).await;

    let subscription = Subscription::new(&db, &identity);
    subscription.purchase("buyer", PackageType::OneMonth).await.unwrap();
    subscription.purchase("buyer", PackageType::ThreeMonths).await.unwrap();

    let ledger = Ledger::new(&db);
    let entries = ledger.for_user("buyer").await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].transaction_date >= entries[1].transaction_date);

    let total: i64 = entries.iter().map(|entry| entry.amount).sum();
    assert_eq!(total, 180_000);
  }

  #[tokio::test]
  async fn missing_transaction_is_not_found() {
    let db = setup_test_db().await;

    let result = Ledger::new(&db).find(404).await;

    assert!(matches!(result, Err(Error::TransactionNotFound)));
  }
}
