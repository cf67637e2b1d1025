pub use std::collections::HashMap;

pub use anyhow::Context;
pub use chrono::{
  Datelike, Months, NaiveDate, NaiveDateTime as DateTime, TimeDelta, Timelike,
  Utc,
};
pub use migration::MigratorTrait;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database,
  DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
  QueryOrder, QuerySelect, Set, TransactionTrait,
};
pub use tracing::{error, info, warn};

pub use crate::error::{Error, Result};
