//! Entitlement evaluation for chapter reads
//!
//! Decides whether a caller may read a chapter and, on success, moves the
//! caller's "continue reading" pointer. Denial is a normal result variant,
//! never an error: store failures while resolving the caller degrade the
//! check to an anonymous one instead of leaking internals.

use serde::Serialize;

use crate::entities::book::{self, AccessLevel};
use crate::entities::chapter;
use crate::entities::role_assignment::Role;
use crate::entities::user;
use crate::identity::IdentityProvider;
use crate::prelude::*;
use crate::sv::History;

pub const VIP_REQUIRED: &str = "VIP content, subscription required.";

#[derive(Debug, PartialEq)]
pub enum Entitlement {
  Granted,
  Denied { reason: &'static str },
}

/// Pure decision rule, first match wins:
///
/// 1. free book or free chapter - anyone may read;
/// 2. member whose subscription has not lapsed (`None` expiry means the
///    subscription never expires);
/// 3. staff override for `Admin`/`SuperAdmin`. Holding the `Member` role
///    alone is NOT enough: entitlement derives from the subscription
///    fields, the role table is a synced projection that may drift.
pub fn evaluate(
  user: Option<&user::Model>,
  roles: &[Role],
  book: &book::Model,
  chapter: &chapter::Model,
  now: DateTime,
) -> Entitlement {
  if book.access_level == AccessLevel::Free || chapter.is_free {
    return Entitlement::Granted;
  }

  if let Some(user) = user {
    if user.is_member
      && user.subscription_expiry.is_none_or(|expiry| expiry > now)
    {
      return Entitlement::Granted;
    }
  }

  if roles.iter().any(|role| matches!(role, Role::Admin | Role::SuperAdmin)) {
    return Entitlement::Granted;
  }

  Entitlement::Denied { reason: VIP_REQUIRED }
}

#[derive(Debug, Serialize)]
pub struct ChapterView {
  pub book: book::Model,
  pub chapter: chapter::Model,
  pub prev_chapter: Option<i32>,
  pub next_chapter: Option<i32>,
}

#[derive(Debug)]
pub enum ReadOutcome {
  Granted(Box<ChapterView>),
  Denied { reason: &'static str },
}

pub struct Access<'a, I> {
  db: &'a DatabaseConnection,
  identity: &'a I,
}

impl<'a, I: IdentityProvider> Access<'a, I> {
  pub fn new(db: &'a DatabaseConnection, identity: &'a I) -> Self {
    Self { db, identity }
  }

  /// Full read-request flow: resolve chapter and caller, evaluate, and on
  /// grant update the reading history of authenticated non-staff callers.
  /// A history write failure is logged, never surfaced.
  pub async fn view_chapter(
    &self,
    user_id: Option<&str>,
    chapter_id: i32,
  ) -> Result<ReadOutcome> {
    let (chapter, book) = chapter::Entity::find_by_id(chapter_id)
      .find_also_related(book::Entity)
      .one(self.db)
      .await?
      .ok_or(Error::ChapterNotFound)?;
    let book = book.ok_or(Error::BookNotFound)?;

    let (user, roles) = self.resolve_caller(user_id).await;
    let now = Utc::now().naive_utc();

    match evaluate(user.as_ref(), &roles, &book, &chapter, now) {
      Entitlement::Denied { reason } => Ok(ReadOutcome::Denied { reason }),
      Entitlement::Granted => {
        let staff = roles
          .iter()
          .any(|role| matches!(role, Role::Admin | Role::SuperAdmin));

        if let Some(user) = &user {
          if !staff {
            let history = History::new(self.db);
            if let Err(err) = history
              .record_access(&user.id, book.book_id, chapter.chapter_id, now)
              .await
            {
              warn!(
                "failed to record reading history for {}: {err}",
                user.id
              );
            }
          }
        }

        let (prev_chapter, next_chapter) =
          self.neighbors(book.book_id, chapter.chapter_order).await?;

        Ok(ReadOutcome::Granted(Box::new(ChapterView {
          book,
          chapter,
          prev_chapter,
          next_chapter,
        })))
      }
    }
  }

  /// Caller resolution never fails the access check: a store error here is
  /// logged and the evaluation proceeds as anonymous (which denies premium
  /// content with the generic reason).
  async fn resolve_caller(
    &self,
    user_id: Option<&str>,
  ) -> (Option<user::Model>, Vec<Role>) {
    let Some(user_id) = user_id else {
      return (None, Vec::new());
    };

    let user = match self.identity.find_by_id(user_id).await {
      Ok(user) => user,
      Err(err) => {
        warn!("user lookup failed during access check: {err}");
        return (None, Vec::new());
      }
    };

    let roles = match self.identity.roles_of(user_id).await {
      Ok(roles) => roles,
      Err(err) => {
        warn!("role lookup failed during access check: {err}");
        Vec::new()
      }
    };

    (user, roles)
  }

  async fn neighbors(
    &self,
    book_id: i32,
    chapter_order: i32,
  ) -> Result<(Option<i32>, Option<i32>)> {
    let prev = chapter::Entity::find()
      .filter(chapter::Column::BookId.eq(book_id))
      .filter(chapter::Column::ChapterOrder.lt(chapter_order))
      .order_by_desc(chapter::Column::ChapterOrder)
      .one(self.db)
      .await?;

    let next = chapter::Entity::find()
      .filter(chapter::Column::BookId.eq(book_id))
      .filter(chapter::Column::ChapterOrder.gt(chapter_order))
      .order_by_asc(chapter::Column::ChapterOrder)
      .one(self.db)
      .await?;

    Ok((
      prev.map(|chapter| chapter.chapter_id),
      next.map(|chapter| chapter.chapter_id),
    ))
  }
}
