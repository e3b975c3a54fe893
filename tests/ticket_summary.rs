mod common;

use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{employee, seeded_state};
use hrm_ops::error::AppError;
use hrm_ops::model::ticket::{CreateTicket, TicketFilter, TicketType};
use hrm_ops::state::AppState;
use hrm_ops::utils::pagination::PageRequest;
use rust_decimal::Decimal;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
}

fn input(employee_id: u64, ticket_type: TicketType, amount: &str) -> CreateTicket {
    CreateTicket {
        employee_id,
        ticket_type,
        deduction_amount: Decimal::from_str(amount).unwrap(),
        reason: Some("recorded by test".into()),
    }
}

async fn file(state: &AppState, employee_id: u64, ticket_type: TicketType, amount: &str, when: DateTime<Utc>) {
    state
        .tickets
        .create_ticket_at(input(employee_id, ticket_type, amount), Some(1), when)
        .await
        .unwrap();
}

#[actix_web::test]
async fn same_day_numbers_increase_and_reset_next_day() {
    let (_, state) = seeded_state().await;

    let first = state
        .tickets
        .create_ticket_at(input(1, TicketType::Late, "10"), None, at(15, 9))
        .await
        .unwrap();
    let second = state
        .tickets
        .create_ticket_at(input(2, TicketType::Absent, "20"), None, at(15, 11))
        .await
        .unwrap();
    let next_day = state
        .tickets
        .create_ticket_at(input(1, TicketType::Late, "10"), None, at(16, 9))
        .await
        .unwrap();

    assert_eq!(first.ticket.ticket_number, "TKT-20260115-0001");
    assert_eq!(second.ticket.ticket_number, "TKT-20260115-0002");
    assert!(second.ticket.ticket_number > first.ticket.ticket_number);
    assert_eq!(next_day.ticket.ticket_number, "TKT-20260116-0001");

    // the employee relation comes back loaded
    assert_eq!(second.employee.first_name, "Bob");
}

#[actix_web::test]
async fn tickets_require_an_active_employee_and_non_negative_deduction() {
    let (_, state) = seeded_state().await;

    let inactive = state
        .tickets
        .create_ticket(input(3, TicketType::Late, "5"), None)
        .await
        .unwrap_err();
    assert!(matches!(inactive, AppError::NotFound(_)));

    let missing = state
        .tickets
        .create_ticket(input(404, TicketType::Late, "5"), None)
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));

    let negative = state
        .tickets
        .create_ticket(input(1, TicketType::Late, "-0.01"), None)
        .await
        .unwrap_err();
    assert!(matches!(negative, AppError::Validation(_)));

    // nothing was written
    let listed = state
        .tickets
        .list_tickets(&TicketFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);
}

#[actix_web::test]
async fn summary_pages_over_employees_not_tickets() {
    let (_, state) = seeded_state().await;
    // Bob first in time, Alice with more tickets
    file(&state, 2, TicketType::Absent, "100.00", at(10, 9)).await;
    for hour in 9..13 {
        file(&state, 1, TicketType::Late, "25.50", at(11, hour)).await;
    }

    let filter = TicketFilter::default();
    let page1 = state.tickets.summary(&filter, PageRequest::new(1, 1)).await.unwrap();
    let page2 = state.tickets.summary(&filter, PageRequest::new(2, 1)).await.unwrap();
    let page3 = state.tickets.summary(&filter, PageRequest::new(3, 1)).await.unwrap();

    assert_eq!(page1.total, 2);
    assert_eq!(page2.total, 2);
    assert_eq!(page1.total_pages, 2);
    assert_eq!(page1.data.len(), 1);
    assert_eq!(page2.data.len(), 1);
    assert!(page3.data.is_empty());

    // ordered by first name
    assert_eq!(page1.data[0].employee.first_name, "Alice");
    assert_eq!(page2.data[0].employee.first_name, "Bob");
    assert_ne!(page1.data[0].employee.id, page2.data[0].employee.id);
}

#[actix_web::test]
async fn summary_orders_names_without_regard_to_case() {
    let (store, state) = seeded_state().await;
    store.add_employee(employee(4, "anna", "lee", "active")).await;
    file(&state, 2, TicketType::Late, "1", at(4, 9)).await;
    file(&state, 4, TicketType::Late, "1", at(4, 10)).await;

    let page = state
        .tickets
        .summary(&TicketFilter::default(), PageRequest::default())
        .await
        .unwrap();
    let names: Vec<&str> = page.data.iter().map(|s| s.employee.first_name.as_str()).collect();
    assert_eq!(names, vec!["anna", "Bob"]);
}

#[actix_web::test]
async fn summary_aggregates_counts_and_deductions() {
    let (_, state) = seeded_state().await;
    let base = at(5, 8);
    let plan = [
        (TicketType::Late, "10.25"),
        (TicketType::Late, "10.25"),
        (TicketType::Absent, "200"),
        (TicketType::EarlyLeave, "15"),
        (TicketType::Misconduct, "50"),
        (TicketType::Other, "0"),
    ];
    for (i, (kind, amount)) in plan.iter().enumerate() {
        file(&state, 1, *kind, amount, base + Duration::hours(i as i64)).await;
    }

    let page = state
        .tickets
        .summary(&TicketFilter::default(), PageRequest::default())
        .await
        .unwrap();
    let alice = &page.data[0];

    assert_eq!(alice.total_tickets, 6);
    assert_eq!(alice.total_deduction, Decimal::from_str("285.50").unwrap());
    assert_eq!(alice.late_count, 2);
    assert_eq!(alice.absent_count, 1);
    assert_eq!(alice.early_leave_count, 1);
    assert_eq!(alice.other_count, 2);
    assert_eq!(alice.latest_ticket_at, Some(base + Duration::hours(5)));

    // preview is the five newest
    assert_eq!(alice.recent_tickets.len(), 5);
    assert_eq!(alice.recent_tickets[0].ticket_type, TicketType::Other);
    assert_eq!(alice.recent_tickets[4].ticket_type, TicketType::Late);
}

#[actix_web::test]
async fn filters_narrow_both_employees_and_their_totals() {
    let (_, state) = seeded_state().await;
    file(&state, 1, TicketType::Late, "10", at(3, 9)).await;
    file(&state, 1, TicketType::Absent, "90", at(20, 9)).await;
    file(&state, 2, TicketType::Absent, "90", at(21, 9)).await;

    let late_only = TicketFilter {
        ticket_type: Some(TicketType::Late),
        ..Default::default()
    };
    let page = state.tickets.summary(&late_only, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].total_deduction, Decimal::from(10));

    let window = TicketFilter {
        date_from: Some(at(20, 0).date_naive()),
        date_to: Some(at(20, 0).date_naive()),
        ..Default::default()
    };
    let page = state.tickets.summary(&window, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].employee.id, 1);
    assert_eq!(page.data[0].total_tickets, 1);

    let by_email = TicketFilter {
        search: Some("bob.jones@".into()),
        ..Default::default()
    };
    let page = state.tickets.summary(&by_email, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].employee.first_name, "Bob");

    let by_full_name = TicketFilter {
        search: Some("alice smith".into()),
        ..Default::default()
    };
    let page = state.tickets.summary(&by_full_name, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].total_tickets, 2);
}

#[actix_web::test]
async fn flat_listing_is_newest_first_and_paged() {
    let (_, state) = seeded_state().await;
    file(&state, 1, TicketType::Late, "1", at(1, 9)).await;
    file(&state, 2, TicketType::Late, "1", at(2, 9)).await;
    file(&state, 1, TicketType::Late, "1", at(3, 9)).await;

    let page = state
        .tickets
        .list_tickets(&TicketFilter::default(), PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].ticket.ticket_number, "TKT-20260103-0001");

    let found = state.tickets.get_ticket(page.data[1].ticket.id).await.unwrap();
    assert_eq!(found.employee.first_name, "Bob");
    assert!(matches!(state.tickets.get_ticket(999).await, Err(AppError::NotFound(_))));
}
