use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use moka::future::Cache;
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::holiday::{
    CreateHoliday, Holiday, HolidayCheck, HolidayFilter, HolidayListResponse, UpdateHoliday,
};
use crate::repository::{HolidayRepository, NewHoliday};
use crate::utils::pagination::PageRequest;

const MAX_NAME_LEN: usize = 150;

/// Holiday CRUD over a store that enforces one live holiday per date, with a
/// per-year calendar cache for [`is_holiday`](Self::is_holiday) lookups.
#[derive(Clone)]
pub struct HolidayService {
    repo: Arc<dyn HolidayRepository>,
    /// year => live holidays of that year plus all recurring ones
    calendar: Cache<i32, Arc<Vec<Holiday>>>,
}

impl HolidayService {
    pub fn new(repo: Arc<dyn HolidayRepository>, cache_ttl: Duration) -> Self {
        let calendar = Cache::builder()
            .max_capacity(64)
            .time_to_live(cache_ttl)
            .build();
        Self { repo, calendar }
    }

    #[instrument(name = "create_holiday", skip(self, input), fields(date = %input.date))]
    pub async fn create(&self, input: CreateHoliday) -> AppResult<Holiday> {
        let name = validate_name(&input.name)?;

        let holiday = self
            .repo
            .insert(&NewHoliday {
                name,
                date: input.date,
                description: clean(input.description),
                is_recurring: input.is_recurring,
            })
            .await?;

        self.calendar.invalidate_all();
        info!(holiday_id = holiday.id, "Holiday created");
        Ok(holiday)
    }

    /// Deleted holidays are reported as missing.
    pub async fn get(&self, id: u64) -> AppResult<Holiday> {
        match self.repo.find(id).await? {
            Some(h) if !h.is_deleted => Ok(h),
            _ => Err(AppError::not_found("Holiday not found")),
        }
    }

    pub async fn list(&self, filter: &HolidayFilter, page: PageRequest) -> AppResult<HolidayListResponse> {
        if let Some(month) = filter.month {
            if !(1..=12).contains(&month) {
                return Err(AppError::validation("month must be between 1 and 12"));
            }
        }
        let (data, total) = self.repo.list(filter, page).await?;
        Ok(HolidayListResponse {
            data,
            page_index: page.page_index,
            page_size: page.page_size,
            total,
        })
    }

    #[instrument(name = "update_holiday", skip(self, changes))]
    pub async fn update(&self, id: u64, changes: UpdateHoliday) -> AppResult<Holiday> {
        let mut holiday = self.get(id).await?;

        if let Some(name) = changes.name.as_deref() {
            holiday.name = validate_name(name)?;
        }
        if let Some(date) = changes.date {
            holiday.date = date;
        }
        if changes.description.is_some() {
            holiday.description = clean(changes.description);
        }
        if let Some(recurring) = changes.is_recurring {
            holiday.is_recurring = recurring;
        }
        if let Some(active) = changes.is_active {
            holiday.is_active = active;
        }

        self.repo.update(&holiday).await?;
        self.calendar.invalidate_all();

        // re-read for the store-maintained updated_at
        self.get(id).await
    }

    /// Clears the active flag and marks the row deleted; nothing is removed.
    #[instrument(name = "delete_holiday", skip(self))]
    pub async fn soft_delete(&self, id: u64) -> AppResult<()> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::not_found("Holiday not found"));
        }
        self.calendar.invalidate_all();
        info!(holiday_id = id, "Holiday soft-deleted");
        Ok(())
    }

    pub async fn check(&self, date: NaiveDate) -> AppResult<HolidayCheck> {
        let calendar = self.calendar_for(date.year()).await?;
        let holidays: Vec<Holiday> = calendar.iter().filter(|h| h.falls_on(date)).cloned().collect();
        Ok(HolidayCheck {
            date,
            is_holiday: !holidays.is_empty(),
            holidays,
        })
    }

    pub async fn is_holiday(&self, date: NaiveDate) -> AppResult<bool> {
        let calendar = self.calendar_for(date.year()).await?;
        Ok(calendar.iter().any(|h| h.falls_on(date)))
    }

    async fn calendar_for(&self, year: i32) -> AppResult<Arc<Vec<Holiday>>> {
        let repo = self.repo.clone();
        self.calendar
            .try_get_with(year, async move {
                debug!(year, "Loading holiday calendar");
                repo.calendar(year).await.map(Arc::new)
            })
            .await
            .map_err(|e| AppError::internal(format!("holiday calendar: {}", e)))
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("  Eid  ").unwrap(), "Eid");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(151)).is_err());
    }

    #[test]
    fn blank_descriptions_become_none() {
        assert_eq!(clean(Some("  ".into())), None);
        assert_eq!(clean(Some(" a ".into())).as_deref(), Some("a"));
    }
}
