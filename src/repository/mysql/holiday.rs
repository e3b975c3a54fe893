use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySql;
use tracing::{debug, error};

use super::MySqlStore;
use crate::error::AppResult;
use crate::model::holiday::{Holiday, HolidayFilter};
use crate::repository::{date_taken, HolidayRepository, NewHoliday};
use crate::utils::db_utils::{Conditions, SqlValue};
use crate::utils::pagination::PageRequest;

const HOLIDAY_COLUMNS: &str =
    "id, name, date, description, is_recurring, is_active, is_deleted, created_at, updated_at";

fn list_conditions(filter: &HolidayFilter) -> Conditions {
    let mut c = Conditions::new();
    c.push("is_deleted = FALSE", Vec::new())
        .push_eq("is_active", filter.active_flag());
    if let Some(pattern) = filter.date_pattern() {
        c.push("DATE_FORMAT(date, '%Y-%m-%d') LIKE ?", vec![pattern.into()]);
    }
    c
}

impl MySqlStore {
    /// Locks the live holiday on `date`, or the index gap where it would go,
    /// until the surrounding transaction ends.
    async fn lock_live_on<'e, E>(executor: E, date: NaiveDate, exclude_id: Option<u64>) -> AppResult<Option<Holiday>>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let mut c = Conditions::new();
        c.push_eq("date", date)
            .push("is_active = TRUE AND is_deleted = FALSE", Vec::new());
        if let Some(id) = exclude_id {
            c.push("id <> ?", vec![id.into()]);
        }

        let sql = format!(
            "SELECT {} FROM holidays{} LIMIT 1 FOR UPDATE",
            HOLIDAY_COLUMNS,
            c.where_sql()
        );
        let holiday = sqlx::query_as_with::<MySql, Holiday, _>(&sql, c.arguments(&[]))
            .fetch_optional(executor)
            .await?;

        Ok(holiday)
    }
}

#[async_trait]
impl HolidayRepository for MySqlStore {
    async fn insert(&self, holiday: &NewHoliday) -> AppResult<Holiday> {
        let mut tx = self.pool.begin().await?;

        if let Some(existing) = Self::lock_live_on(&mut *tx, holiday.date, None).await? {
            return Err(date_taken(&existing));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO holidays (name, date, description, is_recurring)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&holiday.name)
        .bind(holiday.date)
        .bind(&holiday.description)
        .bind(holiday.is_recurring)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert holiday");
            e
        })?;

        let holiday = sqlx::query_as::<_, Holiday>(&format!(
            "SELECT {} FROM holidays WHERE id = ?",
            HOLIDAY_COLUMNS
        ))
        .bind(result.last_insert_id())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(holiday)
    }

    async fn find(&self, id: u64) -> AppResult<Option<Holiday>> {
        let holiday = sqlx::query_as::<_, Holiday>(&format!(
            "SELECT {} FROM holidays WHERE id = ?",
            HOLIDAY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(holiday)
    }

    async fn list(&self, filter: &HolidayFilter, page: PageRequest) -> AppResult<(Vec<Holiday>, i64)> {
        let c = list_conditions(filter);

        let count_sql = format!("SELECT COUNT(*) FROM holidays{}", c.where_sql());
        let total = sqlx::query_scalar_with::<MySql, i64, _>(&count_sql, c.arguments(&[]))
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM holidays{} ORDER BY date ASC, id ASC LIMIT ? OFFSET ?",
            HOLIDAY_COLUMNS,
            c.where_sql()
        );
        debug!(sql = %sql, bindings = ?c.values(), "Listing holidays");

        let holidays = sqlx::query_as_with::<MySql, Holiday, _>(
            &sql,
            c.arguments(&[SqlValue::U64(page.limit()), SqlValue::U64(page.offset())]),
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, sql = %sql, "Failed to list holidays");
            e
        })?;

        Ok((holidays, total))
    }

    async fn calendar(&self, year: i32) -> AppResult<Vec<Holiday>> {
        let holidays = sqlx::query_as::<_, Holiday>(&format!(
            r#"
            SELECT {}
            FROM holidays
            WHERE is_active = TRUE
            AND is_deleted = FALSE
            AND (is_recurring = TRUE OR YEAR(date) = ?)
            "#,
            HOLIDAY_COLUMNS
        ))
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(holidays)
    }

    async fn update(&self, holiday: &Holiday) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        if holiday.is_live() {
            if let Some(existing) = Self::lock_live_on(&mut *tx, holiday.date, Some(holiday.id)).await? {
                return Err(date_taken(&existing));
            }
        }

        sqlx::query(
            r#"
            UPDATE holidays
            SET name = ?, date = ?, description = ?, is_recurring = ?, is_active = ?
            WHERE id = ?
            AND is_deleted = FALSE
            "#,
        )
        .bind(&holiday.name)
        .bind(holiday.date)
        .bind(&holiday.description)
        .bind(holiday.is_recurring)
        .bind(holiday.is_active)
        .bind(holiday.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, holiday_id = holiday.id, "Failed to update holiday");
            e
        })?;

        tx.commit().await?;
        Ok(())
    }

    async fn soft_delete(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE holidays
            SET is_active = FALSE, is_deleted = TRUE
            WHERE id = ?
            AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listing_excludes_deleted_and_inactive() {
        let c = list_conditions(&HolidayFilter::default());
        assert_eq!(c.where_sql(), " WHERE is_deleted = FALSE AND is_active = ?");
        assert_eq!(c.values(), &[SqlValue::Bool(true)]);
    }

    #[test]
    fn year_month_filter_uses_date_prefix() {
        let c = list_conditions(&HolidayFilter {
            year: Some(2026),
            month: Some(12),
            is_active: Some(false),
        });
        assert!(c.where_sql().ends_with("DATE_FORMAT(date, '%Y-%m-%d') LIKE ?"));
        assert_eq!(
            c.values(),
            &[SqlValue::Bool(false), SqlValue::String("2026-12-%".into())]
        );
    }
}
