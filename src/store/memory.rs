use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::application::{ApplicationId, ApplicationStatus, DriverApplication};
use crate::models::driver::{Driver, DriverId};
use crate::models::order::{Order, OrderId, OrderScope};
use crate::models::user::{User, UserId};
use crate::store::{Repository, StoreError, Table, UnitOfWork};

#[derive(Debug)]
struct Rows<V> {
    rows: BTreeMap<i64, V>,
    last_id: i64,
}

impl<V> Default for Rows<V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<V> Rows<V> {
    fn apply(&mut self, writes: BTreeMap<i64, V>, last_id: i64) {
        self.rows.extend(writes);
        self.last_id = self.last_id.max(last_id);
    }
}

/// Uncommitted writes layered over one table.
struct Staged<'a, V> {
    base: &'a Rows<V>,
    writes: BTreeMap<i64, V>,
    last_id: i64,
}

impl<'a, V: Clone> Staged<'a, V> {
    fn new(base: &'a Rows<V>) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
            last_id: base.last_id,
        }
    }

    fn get(&self, id: i64) -> Option<&V> {
        self.writes.get(&id).or_else(|| self.base.rows.get(&id))
    }

    fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.base
            .rows
            .iter()
            .filter(|(id, _)| !self.writes.contains_key(id))
            .map(|(_, row)| row)
            .chain(self.writes.values())
    }

    fn collect_where(&self, keep: impl Fn(&V) -> bool) -> Vec<V> {
        self.iter().filter(|row| keep(row)).cloned().collect()
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn put(&mut self, id: i64, row: V) {
        self.last_id = self.last_id.max(id);
        self.writes.insert(id, row);
    }

    fn into_writes(self) -> (BTreeMap<i64, V>, i64) {
        (self.writes, self.last_id)
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Rows<User>,
    orders: Rows<Order>,
    drivers: Rows<Driver>,
    applications: Rows<DriverApplication>,
}

struct MemoryTx<'a> {
    users: Staged<'a, User>,
    orders: Staged<'a, Order>,
    drivers: Staged<'a, Driver>,
    applications: Staged<'a, DriverApplication>,
}

type Writes<V> = (BTreeMap<i64, V>, i64);

struct TxWrites {
    users: Writes<User>,
    orders: Writes<Order>,
    drivers: Writes<Driver>,
    applications: Writes<DriverApplication>,
}

impl<'a> MemoryTx<'a> {
    fn new(tables: &'a Tables) -> Self {
        Self {
            users: Staged::new(&tables.users),
            orders: Staged::new(&tables.orders),
            drivers: Staged::new(&tables.drivers),
            applications: Staged::new(&tables.applications),
        }
    }

    fn into_writes(self) -> TxWrites {
        TxWrites {
            users: self.users.into_writes(),
            orders: self.orders.into_writes(),
            drivers: self.drivers.into_writes(),
            applications: self.applications.into_writes(),
        }
    }
}

impl Tables {
    fn commit(&mut self, writes: TxWrites) {
        let (users, last_user) = writes.users;
        let (orders, last_order) = writes.orders;
        let (drivers, last_driver) = writes.drivers;
        let (applications, last_application) = writes.applications;

        self.users.apply(users, last_user);
        self.orders.apply(orders, last_order);
        self.drivers.apply(drivers, last_driver);
        self.applications.apply(applications, last_application);
    }
}

impl UnitOfWork for MemoryTx<'_> {
    fn next_id(&mut self, table: Table) -> i64 {
        match table {
            Table::Users => self.users.next_id(),
            Table::Orders => self.orders.next_id(),
            Table::Drivers => self.drivers.next_id(),
            Table::Applications => self.applications.next_id(),
        }
    }

    fn user(&self, id: UserId) -> Option<User> {
        self.users.get(id).cloned()
    }

    fn user_by_email(&self, email: &str) -> Option<User> {
        self.users.iter().find(|user| user.email == email).cloned()
    }

    fn user_by_phone(&self, phone: &str) -> Option<User> {
        self.users.iter().find(|user| user.phone == phone).cloned()
    }

    fn save_user(&mut self, user: User) -> Result<(), StoreError> {
        let taken = self.users.iter().any(|other| {
            other.id != user.id && (other.email == user.email || other.phone == user.phone)
        });
        if taken {
            return Err(StoreError::UniqueViolation("user with this email or phone"));
        }

        self.users.put(user.id, user);
        Ok(())
    }

    fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(id).cloned()
    }

    fn orders(&self, scope: OrderScope) -> Vec<Order> {
        self.orders.collect_where(|order| scope.includes(order))
    }

    fn save_order(&mut self, order: Order) -> Result<(), StoreError> {
        self.orders.put(order.id, order);
        Ok(())
    }

    fn driver(&self, id: DriverId) -> Option<Driver> {
        self.drivers.get(id).cloned()
    }

    fn driver_for_user(&self, user_id: UserId) -> Option<Driver> {
        self.drivers
            .iter()
            .find(|driver| driver.user_id == user_id)
            .cloned()
    }

    fn drivers(&self) -> Vec<Driver> {
        self.drivers.collect_where(|_| true)
    }

    fn save_driver(&mut self, driver: Driver) -> Result<(), StoreError> {
        let taken = self
            .drivers
            .iter()
            .any(|other| other.id != driver.id && other.user_id == driver.user_id);
        if taken {
            return Err(StoreError::UniqueViolation("driver record for this user"));
        }

        self.drivers.put(driver.id, driver);
        Ok(())
    }

    fn application(&self, id: ApplicationId) -> Option<DriverApplication> {
        self.applications.get(id).cloned()
    }

    fn applications(&self) -> Vec<DriverApplication> {
        self.applications.collect_where(|_| true)
    }

    fn applications_for_user(&self, user_id: UserId) -> Vec<DriverApplication> {
        self.applications
            .collect_where(|application| application.user_id == user_id)
    }

    fn save_application(&mut self, application: DriverApplication) -> Result<(), StoreError> {
        if application.status == ApplicationStatus::Pending {
            let duplicate = self.applications.iter().any(|other| {
                other.id != application.id
                    && other.user_id == application.user_id
                    && other.status == ApplicationStatus::Pending
            });
            if duplicate {
                return Err(StoreError::UniqueViolation("pending application"));
            }
        }

        self.applications.put(application.id, application);
        Ok(())
    }
}

pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn transact<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, AppError> + Send,
        T: Send,
    {
        let mut tables = self.tables.lock().await;

        let mut tx = MemoryTx::new(&tables);
        let value = op(&mut tx)?;
        let writes = tx.into_writes();

        tables.commit(writes);
        Ok(value)
    }
}
