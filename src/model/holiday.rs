use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "Victory Day",
    "date": "2026-12-16",
    "description": "National holiday",
    "is_recurring": true,
    "is_active": true,
    "is_deleted": false,
    "created_at": "2026-01-01T00:00:00Z",
    "updated_at": "2026-01-01T00:00:00Z"
}))]
pub struct Holiday {
    pub id: u64,
    pub name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub description: Option<String>,
    /// Repeats every year on the same month and day
    pub is_recurring: bool,
    pub is_active: bool,
    pub is_deleted: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl Holiday {
    /// Whether this holiday falls on `date`, honouring the recurring flag.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        if self.date == date {
            return true;
        }
        self.is_recurring && self.date.month() == date.month() && self.date.day() == date.day()
    }

    /// Counts against the one-holiday-per-date rule
    pub fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "Victory Day")]
    pub name: String,
    #[schema(example = "2026-12-16", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "National holiday")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateHoliday {
    pub name: Option<String>,
    #[schema(example = "2026-12-16", format = "date", value_type = String)]
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub is_recurring: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct HolidayFilter {
    /// Four digit year, e.g. 2026
    pub year: Option<i32>,
    /// Month number 1-12
    pub month: Option<u32>,
    /// Defaults to active holidays only
    pub is_active: Option<bool>,
}

impl HolidayFilter {
    pub fn active_flag(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    /// LIKE pattern over the `YYYY-MM-DD` rendering of the date.
    pub fn date_pattern(&self) -> Option<String> {
        match (self.year, self.month) {
            (Some(y), Some(m)) => Some(format!("{:04}-{:02}-%", y, m)),
            (Some(y), None) => Some(format!("{:04}-%", y)),
            (None, Some(m)) => Some(format!("%-{:02}-%", m)),
            (None, None) => None,
        }
    }

    pub fn matches(&self, holiday: &Holiday) -> bool {
        if holiday.is_deleted || holiday.is_active != self.active_flag() {
            return false;
        }
        let rendered = holiday.date.format("%Y-%m-%d").to_string();
        match (self.year, self.month) {
            (Some(y), Some(m)) => rendered.starts_with(&format!("{:04}-{:02}-", y, m)),
            (Some(y), None) => rendered.starts_with(&format!("{:04}-", y)),
            (None, Some(m)) => rendered.contains(&format!("-{:02}-", m)),
            (None, None) => true,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HolidayCheckQuery {
    /// Date to test, `YYYY-MM-DD`
    #[param(value_type = String, format = "date")]
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HolidayCheck {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub holidays: Vec<Holiday>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HolidayListResponse {
    pub data: Vec<Holiday>,
    #[schema(example = 1)]
    pub page_index: u32,
    #[schema(example = 10)]
    pub page_size: u32,
    #[schema(example = 12)]
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holiday(date: NaiveDate, recurring: bool) -> Holiday {
        Holiday {
            id: 1,
            name: "Test".into(),
            date,
            description: None,
            is_recurring: recurring,
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn date_pattern_uses_prefix_matching() {
        let f = HolidayFilter { year: Some(2026), month: Some(3), is_active: None };
        assert_eq!(f.date_pattern().as_deref(), Some("2026-03-%"));
        let f = HolidayFilter { year: Some(2026), ..Default::default() };
        assert_eq!(f.date_pattern().as_deref(), Some("2026-%"));
        let f = HolidayFilter { month: Some(12), ..Default::default() };
        assert_eq!(f.date_pattern().as_deref(), Some("%-12-%"));
        assert_eq!(HolidayFilter::default().date_pattern(), None);
    }

    #[test]
    fn default_filter_hides_inactive_and_deleted() {
        let day = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut h = holiday(day, false);
        assert!(HolidayFilter::default().matches(&h));

        h.is_active = false;
        assert!(!HolidayFilter::default().matches(&h));
        let inactive = HolidayFilter { is_active: Some(false), ..Default::default() };
        assert!(inactive.matches(&h));

        h.is_deleted = true;
        assert!(!inactive.matches(&h));
    }

    #[test]
    fn month_filter_without_year() {
        let h = holiday(NaiveDate::from_ymd_opt(2025, 12, 16).unwrap(), false);
        assert!(HolidayFilter { month: Some(12), ..Default::default() }.matches(&h));
        assert!(!HolidayFilter { month: Some(1), ..Default::default() }.matches(&h));
    }

    #[test]
    fn recurring_holiday_falls_on_other_years() {
        let h = holiday(NaiveDate::from_ymd_opt(2020, 12, 16).unwrap(), true);
        assert!(h.falls_on(NaiveDate::from_ymd_opt(2031, 12, 16).unwrap()));
        assert!(!h.falls_on(NaiveDate::from_ymd_opt(2031, 12, 17).unwrap()));

        let once = holiday(NaiveDate::from_ymd_opt(2020, 12, 16).unwrap(), false);
        assert!(!once.falls_on(NaiveDate::from_ymd_opt(2031, 12, 16).unwrap()));
    }
}
