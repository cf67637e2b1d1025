//! Analytics aggregation over the ledger and catalog tables
//!
//! Pure read-side computation: nothing here mutates state. Every operation
//! takes `now` so calendar windows are deterministic under test. Monetary
//! sums stay in integer currency units; floats appear only for the final
//! display rounding of percentages.

use serde::Serialize;

use crate::entities::book::{self, Genre};
use crate::entities::favorite;
use crate::entities::payment_transaction::{self, COMPLETED};
use crate::entities::reading_history;
use crate::entities::user;
use crate::prelude::*;
use crate::utils::{day_start, month_start};

const TOP_BOOKS: usize = 10;

#[derive(Debug, PartialEq, Serialize)]
pub struct Growth {
  pub this_month: i64,
  pub last_month: i64,
  pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct PackageSales {
  pub package: &'static str,
  pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct Overview {
  pub total_users: u64,
  pub total_books: u64,
  pub total_favorites: u64,
  pub total_readings: u64,
  pub active_vips: u64,
  pub total_revenue: i64,
  pub user_growth: Growth,
  pub vip_growth: Growth,
  pub revenue_growth: Growth,
  pub package_sales: Vec<PackageSales>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MonthlyRevenue {
  /// `MM/YYYY`
  pub month: String,
  pub revenue: i64,
  pub vip_count: i64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DailyPoint {
  pub day: u32,
  pub count: i64,
  pub revenue: i64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct HourlyPoint {
  pub hour: u32,
  pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BookCount {
  pub book: book::Model,
  pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct GenreShare {
  pub genre: Genre,
  pub count: i64,
  pub percent: f64,
}

/// Month-over-month growth, division-by-zero handled by definition:
/// a rise from zero counts as 100%, zero to zero as 0%.
pub fn growth_percent(this_month: i64, last_month: i64) -> f64 {
  if last_month > 0 {
    round1((this_month - last_month) as f64 / last_month as f64 * 100.0)
  } else if this_month > 0 {
    100.0
  } else {
    0.0
  }
}

fn round1(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

pub struct Analytics<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Analytics<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn overview(&self, now: DateTime) -> Result<Overview> {
    let this_month = month_start(now);
    let last_month = this_month
      .checked_sub_months(Months::new(1))
      .unwrap_or(this_month);

    let total_users = user::Entity::find().count(self.db).await?;
    let total_books = book::Entity::find().count(self.db).await?;
    let total_favorites = favorite::Entity::find().count(self.db).await?;
    let total_readings =
      reading_history::Entity::find().count(self.db).await?;

    let active_vips = user::Entity::find()
      .filter(user::Column::IsMember.eq(true))
      .filter(
        Condition::any()
          .add(user::Column::SubscriptionExpiry.is_null())
          .add(user::Column::SubscriptionExpiry.gt(now)),
      )
      .count(self.db)
      .await?;

    let users_this = user::Entity::find()
      .filter(user::Column::RegDate.gte(this_month))
      .count(self.db)
      .await? as i64;
    let users_last = user::Entity::find()
      .filter(user::Column::RegDate.gte(last_month))
      .filter(user::Column::RegDate.lt(this_month))
      .count(self.db)
      .await? as i64;

    let sales_this = self.completed_between(this_month, None).await?;
    let sales_last =
      self.completed_between(last_month, Some(this_month)).await?;
    let all_sales = self.all_completed().await?;

    let vip_this = sales_this.len() as i64;
    let vip_last = sales_last.len() as i64;
    let revenue_this: i64 = sales_this.iter().map(|entry| entry.amount).sum();
    let revenue_last: i64 = sales_last.iter().map(|entry| entry.amount).sum();
    let total_revenue: i64 = all_sales.iter().map(|entry| entry.amount).sum();

    let mut per_package: HashMap<_, i64> = HashMap::new();
    for entry in &all_sales {
      *per_package.entry(entry.package).or_default() += 1;
    }
    let mut package_sales: Vec<_> = per_package
      .into_iter()
      .map(|(package, count)| PackageSales { package: package.label(), count })
      .collect();
    package_sales.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(Overview {
      total_users,
      total_books,
      total_favorites,
      total_readings,
      active_vips,
      total_revenue,
      user_growth: Growth {
        this_month: users_this,
        last_month: users_last,
        percent: growth_percent(users_this, users_last),
      },
      vip_growth: Growth {
        this_month: vip_this,
        last_month: vip_last,
        percent: growth_percent(vip_this, vip_last),
      },
      revenue_growth: Growth {
        this_month: revenue_this,
        last_month: revenue_last,
        percent: growth_percent(revenue_this, revenue_last),
      },
      package_sales,
    })
  }

  /// Revenue and sale counts for the last six calendar months, zero-filled.
  pub async fn monthly_revenue(
    &self,
    now: DateTime,
  ) -> Result<Vec<MonthlyRevenue>> {
    let this_month = month_start(now);
    let window_start = this_month
      .checked_sub_months(Months::new(5))
      .unwrap_or(this_month);

    let sales = self.completed_between(window_start, None).await?;

    let mut series = Vec::with_capacity(6);
    for offset in (0..6u32).rev() {
      let start = this_month
        .checked_sub_months(Months::new(offset))
        .unwrap_or(this_month);
      let end = start
        .checked_add_months(Months::new(1))
        .unwrap_or(start);

      let bucket: Vec<_> = sales
        .iter()
        .filter(|entry| {
          entry.transaction_date >= start && entry.transaction_date < end
        })
        .collect();

      series.push(MonthlyRevenue {
        month: start.format("%m/%Y").to_string(),
        revenue: bucket.iter().map(|entry| entry.amount).sum(),
        vip_count: bucket.len() as i64,
      });
    }

    Ok(series)
  }

  /// Sale count and revenue per elapsed day of the current month,
  /// zero-filled for quiet days.
  pub async fn daily_conversions(
    &self,
    now: DateTime,
  ) -> Result<Vec<DailyPoint>> {
    let sales = self.completed_between(month_start(now), None).await?;

    let mut series = Vec::with_capacity(now.day() as usize);
    for day in 1..=now.day() {
      let bucket: Vec<_> = sales
        .iter()
        .filter(|entry| entry.transaction_date.day() == day)
        .collect();

      series.push(DailyPoint {
        day,
        count: bucket.len() as i64,
        revenue: bucket.iter().map(|entry| entry.amount).sum(),
      });
    }

    Ok(series)
  }

  /// 24 zero-filled hourly sale counts for the current day.
  pub async fn hourly_conversions(
    &self,
    now: DateTime,
  ) -> Result<Vec<HourlyPoint>> {
    let sales = self.completed_between(day_start(now), None).await?;

    let mut series = Vec::with_capacity(24);
    for hour in 0..24 {
      let count = sales
        .iter()
        .filter(|entry| entry.transaction_date.hour() == hour)
        .count() as i64;
      series.push(HourlyPoint { hour, count });
    }

    Ok(series)
  }

  /// Top books by favorite count, descending, ties broken by book id.
  pub async fn top_favorited(&self) -> Result<Vec<BookCount>> {
    let favorites = favorite::Entity::find().all(self.db).await?;
    let mut counts: HashMap<i32, i64> = HashMap::new();
    for entry in &favorites {
      *counts.entry(entry.book_id).or_default() += 1;
    }
    self.rank_books(counts).await
  }

  /// Top books by reader count, descending, ties broken by book id.
  pub async fn top_read(&self) -> Result<Vec<BookCount>> {
    let readings = reading_history::Entity::find().all(self.db).await?;
    let mut counts: HashMap<i32, i64> = HashMap::new();
    for entry in &readings {
      *counts.entry(entry.book_id).or_default() += 1;
    }
    self.rank_books(counts).await
  }

  /// Favorite share per genre, rounded to one decimal; empty without
  /// favorites.
  pub async fn genre_affinity(&self) -> Result<Vec<GenreShare>> {
    let favorites = favorite::Entity::find()
      .find_also_related(book::Entity)
      .all(self.db)
      .await?;

    let mut counts: HashMap<Genre, i64> = HashMap::new();
    let mut total = 0i64;
    for (_, book) in favorites.iter() {
      if let Some(book) = book {
        *counts.entry(book.genre).or_default() += 1;
        total += 1;
      }
    }

    if total == 0 {
      return Ok(Vec::new());
    }

    let mut shares: Vec<_> = counts
      .into_iter()
      .map(|(genre, count)| GenreShare {
        genre,
        count,
        percent: round1(count as f64 / total as f64 * 100.0),
      })
      .collect();
    shares.sort_by(|a, b| {
      b.percent
        .partial_cmp(&a.percent)
        .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(shares)
  }

  async fn rank_books(
    &self,
    counts: HashMap<i32, i64>,
  ) -> Result<Vec<BookCount>> {
    let books = book::Entity::find()
      .order_by_asc(book::Column::BookId)
      .all(self.db)
      .await?;

    let mut ranked: Vec<_> = books
      .into_iter()
      .map(|book| {
        let count = counts.get(&book.book_id).copied().unwrap_or(0);
        BookCount { book, count }
      })
      .collect();
    // stable sort keeps the ascending id order within equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_BOOKS);

    Ok(ranked)
  }

  async fn all_completed(
    &self,
  ) -> Result<Vec<payment_transaction::Model>> {
    let entries = payment_transaction::Entity::find()
      .filter(payment_transaction::Column::Status.eq(COMPLETED))
      .all(self.db)
      .await?;
    Ok(entries)
  }

  async fn completed_between(
    &self,
    from: DateTime,
    until: Option<DateTime>,
  ) -> Result<Vec<payment_transaction::Model>> {
    let mut query = payment_transaction::Entity::find()
      .filter(payment_transaction::Column::Status.eq(COMPLETED))
      .filter(payment_transaction::Column::TransactionDate.gte(from));
    if let Some(until) = until {
      query = query
        .filter(payment_transaction::Column::TransactionDate.lt(until));
    }
    let entries = query.all(self.db).await?;
    Ok(entries)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entities::book::AccessLevel;
  use crate::entities::payment_transaction::PackageType;
  use crate::sv::testing::*;

  fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime {
    NaiveDate::from_ymd_opt(year, month, day)
      .unwrap()
      .and_hms_opt(hour, 0, 0)
      .unwrap()
  }

  async fn seed_sale(
    db: &DatabaseConnection,
    user_id: &str,
    package: PackageType,
    amount: i64,
    date: DateTime,
  ) {
    payment_transaction::ActiveModel {
      transaction_id: NotSet,
      user_id: Set(user_id.to_string()),
      package: Set(package),
      amount: Set(amount),
      transaction_date: Set(date),
      status: Set(COMPLETED.to_string()),
      notes: Set(None),
    }
    .insert(db)
    .await
    .unwrap();
  }

  #[test]
  fn growth_percent_by_definition() {
    assert_eq!(growth_percent(0, 0), 0.0);
    assert_eq!(growth_percent(5, 0), 100.0);
    assert_eq!(growth_percent(10, 5), 100.0);
    assert_eq!(growth_percent(15, 10), 50.0);
    assert_eq!(growth_percent(5, 10), -50.0);
    assert_eq!(growth_percent(10, 3), 233.3);
  }

  #[tokio::test]
  async fn overview_compares_calendar_months() {
    let db = setup_test_db().await;
    seed_user(&db, "buyer", false, None).await;

    let now = at(2026, 8, 15, 12);
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 3, 9))
      .await;
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 10, 9))
      .await;
    seed_sale(
      &db,
      "buyer",
      PackageType::ThreeMonths,
      130_000,
      at(2026, 7, 20, 9),
    )
    .await;

    let overview = Analytics::new(&db).overview(now).await.unwrap();

    assert_eq!(overview.vip_growth.this_month, 2);
    assert_eq!(overview.vip_growth.last_month, 1);
    assert_eq!(overview.vip_growth.percent, 100.0);

    assert_eq!(overview.revenue_growth.this_month, 100_000);
    assert_eq!(overview.revenue_growth.last_month, 130_000);
    assert_eq!(overview.revenue_growth.percent, -23.1);

    assert_eq!(overview.total_revenue, 230_000);
    assert_eq!(overview.package_sales[0].package, "1 Month");
    assert_eq!(overview.package_sales[0].count, 2);
  }

  #[tokio::test]
  async fn non_completed_entries_are_ignored() {
    let db = setup_test_db().await;
    seed_user(&db, "buyer", false, None).await;

    let now = at(2026, 8, 15, 12);
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 3, 9))
      .await;
    payment_transaction::ActiveModel {
      transaction_id: NotSet,
      user_id: Set("buyer".to_string()),
      package: Set(PackageType::OneYear),
      amount: Set(450_000),
      transaction_date: Set(at(2026, 8, 4, 9)),
      status: Set("Pending".to_string()),
      notes: Set(None),
    }
    .insert(&db)
    .await
    .unwrap();

    let overview = Analytics::new(&db).overview(now).await.unwrap();

    assert_eq!(overview.total_revenue, 50_000);
    assert_eq!(overview.vip_growth.this_month, 1);
  }

  #[tokio::test]
  async fn daily_series_is_zero_filled_up_to_today() {
    let db = setup_test_db().await;
    seed_user(&db, "buyer", false, None).await;

    let now = at(2026, 8, 5, 18);
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 2, 9))
      .await;
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 2, 15))
      .await;

    let series = Analytics::new(&db).daily_conversions(now).await.unwrap();

    assert_eq!(series.len(), 5);
    assert_eq!(series[0], DailyPoint { day: 1, count: 0, revenue: 0 });
    assert_eq!(series[1], DailyPoint { day: 2, count: 2, revenue: 100_000 });
    assert_eq!(series[4], DailyPoint { day: 5, count: 0, revenue: 0 });
  }

  #[tokio::test]
  async fn hourly_series_always_has_24_buckets() {
    let db = setup_test_db().await;
    seed_user(&db, "buyer", false, None).await;

    let now = at(2026, 8, 5, 18);
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 5, 7))
      .await;
    // yesterday's sale is out of scope
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 4, 7))
      .await;

    let series = Analytics::new(&db).hourly_conversions(now).await.unwrap();

    assert_eq!(series.len(), 24);
    assert_eq!(series[7], HourlyPoint { hour: 7, count: 1 });
    assert_eq!(series[8], HourlyPoint { hour: 8, count: 0 });
  }

  #[tokio::test]
  async fn monthly_series_spans_six_months() {
    let db = setup_test_db().await;
    seed_user(&db, "buyer", false, None).await;

    let now = at(2026, 8, 15, 12);
    seed_sale(&db, "buyer", PackageType::OneMonth, 50_000, at(2026, 8, 3, 9))
      .await;
    seed_sale(&db, "buyer", PackageType::OneYear, 450_000, at(2026, 5, 3, 9))
      .await;

    let series = Analytics::new(&db).monthly_revenue(now).await.unwrap();

    assert_eq!(series.len(), 6);
    assert_eq!(series[0].month, "03/2026");
    assert_eq!(
      series[2],
      MonthlyRevenue { month: "05/2026".into(), revenue: 450_000, vip_count: 1 }
    );
    assert_eq!(
      series[5],
      MonthlyRevenue { month: "08/2026".into(), revenue: 50_000, vip_count: 1 }
    );
  }

  #[tokio::test]
  async fn top_books_break_ties_by_id() {
    let db = setup_test_db().await;
    seed_user(&db, "fan", false, None).await;
    seed_user(&db, "other", false, None).await;
    let first = seed_book(&db, "A", AccessLevel::Free).await;
    let second = seed_book(&db, "B", AccessLevel::Free).await;
    let third = seed_book(&db, "C", AccessLevel::Free).await;

    let now = Utc::now().naive_utc();
    for (user_id, book_id) in [
      ("fan", second.book_id),
      ("fan", third.book_id),
      ("other", third.book_id),
    ] {
      favorite::ActiveModel {
        favorite_id: NotSet,
        user_id: Set(user_id.to_string()),
        book_id: Set(book_id),
        date_added: Set(now),
      }
      .insert(&db)
      .await
      .unwrap();
    }

    let ranked = Analytics::new(&db).top_favorited().await.unwrap();

    assert_eq!(ranked[0].book.book_id, third.book_id);
    assert_eq!(ranked[0].count, 2);
    assert_eq!(ranked[1].book.book_id, second.book_id);
    // zero-count books keep ascending id order at the tail
    assert_eq!(ranked[2].book.book_id, first.book_id);
    assert_eq!(ranked[2].count, 0);
  }

  #[tokio::test]
  async fn genre_affinity_shares_sum_to_one_hundred() {
    use crate::entities::book::Genre;

    let db = setup_test_db().await;
    seed_user(&db, "fan", false, None).await;
    seed_user(&db, "other", false, None).await;
    let fantasy =
      seed_book_in_genre(&db, "F", AccessLevel::Free, Genre::Fantasy).await;
    let romance =
      seed_book_in_genre(&db, "R", AccessLevel::Free, Genre::Romance).await;

    let now = Utc::now().naive_utc();
    for (user_id, book_id) in [
      ("fan", fantasy.book_id),
      ("other", fantasy.book_id),
      ("fan", romance.book_id),
    ] {
      favorite::ActiveModel {
        favorite_id: NotSet,
        user_id: Set(user_id.to_string()),
        book_id: Set(book_id),
        date_added: Set(now),
      }
      .insert(&db)
      .await
      .unwrap();
    }

    let shares = Analytics::new(&db).genre_affinity().await.unwrap();

    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].genre, Genre::Fantasy);
    assert_eq!(shares[0].percent, 66.7);
    assert_eq!(shares[1].percent, 33.3);
  }

  #[tokio::test]
  async fn genre_affinity_is_empty_without_favorites() {
    let db = setup_test_db().await;
    seed_book(&db, "Lonely", AccessLevel::Free).await;

    let shares = Analytics::new(&db).genre_affinity().await.unwrap();

    assert!(shares.is_empty());
  }
}
