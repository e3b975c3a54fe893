mod common;

use common::{date, seeded_state};
use hrm_ops::error::AppError;
use hrm_ops::model::holiday::{CreateHoliday, HolidayFilter, UpdateHoliday};
use hrm_ops::utils::pagination::PageRequest;

fn holiday(name: &str, on: chrono::NaiveDate, recurring: bool) -> CreateHoliday {
    CreateHoliday {
        name: name.to_string(),
        date: on,
        description: None,
        is_recurring: recurring,
    }
}

#[actix_web::test]
async fn second_active_holiday_on_a_date_is_rejected() {
    let (_, state) = seeded_state().await;
    state
        .holidays
        .create(holiday("Victory Day", date(2026, 12, 16), false))
        .await
        .unwrap();

    let err = state
        .holidays
        .create(holiday("Duplicate", date(2026, 12, 16), false))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    state
        .holidays
        .create(holiday("Christmas", date(2026, 12, 25), false))
        .await
        .unwrap();
}

#[actix_web::test]
async fn soft_deleted_holiday_leaves_listing_but_stays_stored() {
    let (store, state) = seeded_state().await;
    let created = state
        .holidays
        .create(holiday("Bank Holiday", date(2026, 7, 1), false))
        .await
        .unwrap();

    state.holidays.soft_delete(created.id).await.unwrap();

    let listed = state
        .holidays
        .list(&HolidayFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert!(listed.data.is_empty());
    assert_eq!(listed.total, 0);
    assert_eq!(store.holiday_rows().await, 1);
    assert!(matches!(state.holidays.get(created.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(state.holidays.soft_delete(created.id).await, Err(AppError::NotFound(_))));

    // the date is free again
    state
        .holidays
        .create(holiday("Replacement", date(2026, 7, 1), false))
        .await
        .unwrap();
}

#[actix_web::test]
async fn listing_filters_by_year_and_month() {
    let (_, state) = seeded_state().await;
    for (name, on) in [
        ("New Year", date(2026, 1, 1)),
        ("Spring", date(2026, 3, 21)),
        ("Next New Year", date(2027, 1, 1)),
    ] {
        state.holidays.create(holiday(name, on, false)).await.unwrap();
    }

    let january = HolidayFilter {
        month: Some(1),
        ..Default::default()
    };
    let page = state.holidays.list(&january, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.data.len(), 2);

    let year = HolidayFilter {
        year: Some(2026),
        ..Default::default()
    };
    let names: Vec<String> = state
        .holidays
        .list(&year, PageRequest::default())
        .await
        .unwrap()
        .data
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(names, vec!["New Year", "Spring"]);

    // pages keep date order and report the full total
    let all = HolidayFilter::default();
    let first = state.holidays.list(&all, PageRequest::new(1, 2)).await.unwrap();
    let second = state.holidays.list(&all, PageRequest::new(2, 2)).await.unwrap();
    assert_eq!((first.total, second.total), (3, 3));
    assert_eq!(first.page_size, 2);
    assert_eq!(first.data.len(), 2);
    assert_eq!(second.page_index, 2);
    assert_eq!(second.data.len(), 1);
    assert_eq!(second.data[0].name, "Next New Year");
    assert!(state.holidays.list(&all, PageRequest::new(3, 2)).await.unwrap().data.is_empty());

    let bad_month = HolidayFilter {
        month: Some(13),
        ..Default::default()
    };
    assert!(matches!(
        state.holidays.list(&bad_month, PageRequest::default()).await,
        Err(AppError::Validation(_))
    ));
}

#[actix_web::test]
async fn inactive_holidays_are_listed_only_on_request() {
    let (_, state) = seeded_state().await;
    let created = state
        .holidays
        .create(holiday("Retired", date(2026, 5, 1), false))
        .await
        .unwrap();
    state
        .holidays
        .update(
            created.id,
            UpdateHoliday {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let active = state
        .holidays
        .list(&HolidayFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert!(active.data.is_empty());
    let inactive = HolidayFilter {
        is_active: Some(false),
        ..Default::default()
    };
    let page = state.holidays.list(&inactive, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);

    // an inactive holiday does not hold its date
    state
        .holidays
        .create(holiday("Labour Day", date(2026, 5, 1), false))
        .await
        .unwrap();
}

#[actix_web::test]
async fn moving_a_holiday_onto_a_taken_date_fails() {
    let (_, state) = seeded_state().await;
    state
        .holidays
        .create(holiday("First", date(2026, 2, 21), false))
        .await
        .unwrap();
    let second = state
        .holidays
        .create(holiday("Second", date(2026, 3, 26), false))
        .await
        .unwrap();

    let err = state
        .holidays
        .update(
            second.id,
            UpdateHoliday {
                date: Some(date(2026, 2, 21)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let renamed = state
        .holidays
        .update(
            second.id,
            UpdateHoliday {
                name: Some("Independence Day".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Independence Day");
    assert_eq!(renamed.date, date(2026, 3, 26));
}

#[actix_web::test]
async fn recurring_holidays_match_every_year_and_cache_follows_writes() {
    let (_, state) = seeded_state().await;
    assert!(!state.holidays.is_holiday(date(2030, 12, 16)).await.unwrap());

    let created = state
        .holidays
        .create(holiday("Victory Day", date(2026, 12, 16), true))
        .await
        .unwrap();
    assert!(state.holidays.is_holiday(date(2030, 12, 16)).await.unwrap());

    let check = state.holidays.check(date(2031, 12, 16)).await.unwrap();
    assert!(check.is_holiday);
    assert_eq!(check.holidays[0].id, created.id);
    assert!(!state.holidays.is_holiday(date(2030, 12, 17)).await.unwrap());

    state.holidays.soft_delete(created.id).await.unwrap();
    assert!(!state.holidays.is_holiday(date(2030, 12, 16)).await.unwrap());
}

#[actix_web::test]
async fn racing_creates_on_one_date_leave_a_single_holiday() {
    let (_, state) = seeded_state().await;
    let (a, b) = futures::future::join(
        state.holidays.create(holiday("Morning", date(2026, 8, 15), false)),
        state.holidays.create(holiday("Evening", date(2026, 8, 15), false)),
    )
    .await;

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let rejected = if a.is_ok() { b } else { a };
    assert!(matches!(rejected, Err(AppError::Validation(_))));

    let on_the_day = HolidayFilter {
        year: Some(2026),
        month: Some(8),
        ..Default::default()
    };
    let page = state.holidays.list(&on_the_day, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
}
