//! Repositories for service orders and the customer directory.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use werkorder_core::{DomainError, DomainResult};
use werkorder_orders::{ServiceOrder, ServiceOrderId};
use werkorder_parties::Customer;

/// Storage of service-order aggregates, keyed by service-order number.
pub trait ServiceOrderRepository: Send + Sync {
    fn get(&self, so: &ServiceOrderId) -> DomainResult<Option<ServiceOrder>>;
    fn save(&self, order: &ServiceOrder) -> DomainResult<()>;
}

impl<R: ServiceOrderRepository + ?Sized> ServiceOrderRepository for Arc<R> {
    fn get(&self, so: &ServiceOrderId) -> DomainResult<Option<ServiceOrder>> {
        (**self).get(so)
    }

    fn save(&self, order: &ServiceOrder) -> DomainResult<()> {
        (**self).save(order)
    }
}

/// Customer lookup by exact name, the reference a service order carries.
pub trait CustomerDirectory: Send + Sync {
    fn find_by_name(&self, name: &str) -> DomainResult<Option<Customer>>;
}

impl<C: CustomerDirectory + ?Sized> CustomerDirectory for Arc<C> {
    fn find_by_name(&self, name: &str) -> DomainResult<Option<Customer>> {
        (**self).find_by_name(name)
    }
}

fn poisoned() -> DomainError {
    DomainError::storage("repository lock poisoned")
}

/// In-memory service-order repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryServiceOrderRepository {
    orders: RwLock<HashMap<ServiceOrderId, ServiceOrder>>,
}

impl InMemoryServiceOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceOrderRepository for InMemoryServiceOrderRepository {
    fn get(&self, so: &ServiceOrderId) -> DomainResult<Option<ServiceOrder>> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders.get(so).cloned())
    }

    fn save(&self, order: &ServiceOrder) -> DomainResult<()> {
        use werkorder_core::AggregateRoot;
        let mut orders = self.orders.write().map_err(|_| poisoned())?;
        orders.insert(order.id().clone(), order.clone());
        Ok(())
    }
}

/// In-memory customer directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCustomerDirectory {
    customers: RwLock<HashMap<String, Customer>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, customer: Customer) -> DomainResult<()> {
        let mut customers = self.customers.write().map_err(|_| poisoned())?;
        customers.insert(customer.name.clone(), customer);
        Ok(())
    }
}

impl CustomerDirectory for InMemoryCustomerDirectory {
    fn find_by_name(&self, name: &str) -> DomainResult<Option<Customer>> {
        let customers = self.customers.read().map_err(|_| poisoned())?;
        Ok(customers.get(name).cloned())
    }
}
