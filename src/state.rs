use std::sync::Arc;
use std::time::Duration;

use sqlx::MySqlPool;

use crate::agent::CommandRouter;
use crate::config::Config;
use crate::repository::memory::MemoryStore;
use crate::repository::mysql::MySqlStore;
use crate::repository::{HolidayRepository, InventoryRepository, TicketRepository, UserRepository};
use crate::service::holiday::HolidayService;
use crate::service::inventory::InventoryService;
use crate::service::ticket::TicketService;

/// Services shared by every worker through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub holidays: HolidayService,
    pub tickets: TicketService,
    pub inventory: InventoryService,
    pub agent: CommandRouter,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn mysql(pool: MySqlPool, config: &Config) -> Self {
        let store = Arc::new(MySqlStore::new(pool));
        Self::build(store.clone(), store.clone(), store.clone(), store, config)
    }

    pub fn in_memory(store: Arc<MemoryStore>, config: &Config) -> Self {
        Self::build(store.clone(), store.clone(), store.clone(), store, config)
    }

    fn build(
        holidays: Arc<dyn HolidayRepository>,
        tickets: Arc<dyn TicketRepository>,
        inventory: Arc<dyn InventoryRepository>,
        users: Arc<dyn UserRepository>,
        config: &Config,
    ) -> Self {
        let inventory = InventoryService::new(inventory);
        Self {
            holidays: HolidayService::new(holidays, Duration::from_secs(config.holiday_cache_ttl_secs)),
            tickets: TicketService::new(tickets),
            agent: CommandRouter::new(inventory.clone()),
            inventory,
            users,
        }
    }
}
