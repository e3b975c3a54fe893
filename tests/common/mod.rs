#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use hrm_ops::auth::jwt::{issue, Subject};
use hrm_ops::config::Config;
use hrm_ops::model::employee::Employee;
use hrm_ops::model::role::Role;
use hrm_ops::model::user::TokenType;
use hrm_ops::repository::memory::MemoryStore;
use hrm_ops::state::AppState;

pub const SECRET: &str = "integration-test-secret";

pub fn config() -> Config {
    Config::for_tests(SECRET)
}

pub fn employee(id: u64, first: &str, last: &str, status: &str) -> Employee {
    Employee {
        id,
        employee_code: format!("EMP-{:03}", id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@company.com", first.to_lowercase(), last.to_lowercase()),
        phone: None,
        department_id: 10 + id % 2,
        job_title_id: 1,
        hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        status: status.to_string(),
    }
}

/// Store with Alice (1), Bob (2) and the inactive Carol (3).
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_employee(employee(1, "Alice", "Smith", "active")).await;
    store.add_employee(employee(2, "Bob", "Jones", "active")).await;
    store.add_employee(employee(3, "Carol", "White", "inactive")).await;
    store
}

pub async fn seeded_state() -> (Arc<MemoryStore>, AppState) {
    let store = seeded_store().await;
    let state = AppState::in_memory(store.clone(), &config());
    (store, state)
}

pub fn access_token(role: Role) -> String {
    let subject = Subject {
        user_id: 99,
        username: format!("{:?}", role).to_lowercase(),
        role: role.id(),
        employee_id: None,
    };
    issue(&subject, TokenType::Access, SECRET, 900).unwrap().0
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
