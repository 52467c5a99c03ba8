use std::{
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::models::{
    BlogPost, Menu, MenuItem, Page, Setting, User,
    directory::{
        BoardMember, Broker, Career, Commodity, Partner, Publication, TeamMember, Trader,
    },
    market::{MarketPrice, PriceAlert, SubscriptionPlan, UserSubscription},
};

use super::{RepoError, RepoResult};

mod content;
mod directory;
mod market;
mod menus;
mod settings;
mod users;

/// MemoryRepository
///
/// Process-local store with the same observable rules as the SQL schema: unique
/// keys, the setting type check, all-or-nothing batches. Backs `DB_TYPE=memory`
/// and the test-suite.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

#[derive(Default, Clone)]
struct MemoryState {
    users: Table<User>,
    pages: Table<Page>,
    posts: Table<BlogPost>,
    settings: Table<Setting>,
    menus: Table<Menu>,
    menu_items: Table<MenuItem>,
    team_members: Table<TeamMember>,
    board_members: Table<BoardMember>,
    traders: Table<Trader>,
    brokers: Table<Broker>,
    partners: Table<Partner>,
    publications: Table<Publication>,
    careers: Table<Career>,
    commodities: Table<Commodity>,
    plans: Table<SubscriptionPlan>,
    subscriptions: Table<UserSubscription>,
    prices: Table<MarketPrice>,
    alerts: Table<PriceAlert>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| RepoError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| RepoError::Unavailable("memory store lock poisoned".to_string()))
    }
}

/// Table
///
/// Rows keyed by a monotonically increasing id, like a `BIGSERIAL` column.
#[derive(Clone)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Applies `change` to row `id` and returns the updated copy.
    fn update(&mut self, id: i64, change: impl FnOnce(&mut T)) -> Option<T> {
        let row = self.rows.get_mut(&id)?;
        change(row);
        Some(row.clone())
    }
}

/// Case-insensitive substring match across `fields`; no term matches everything.
fn matches_search(term: Option<&str>, fields: &[&str]) -> bool {
    let Some(term) = term.map(|t| t.trim().to_lowercase()) else {
        return true;
    };
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Exact filter; an absent filter matches everything.
fn matches_exact(filter: Option<&str>, value: &str) -> bool {
    filter.is_none_or(|wanted| wanted == value)
}
