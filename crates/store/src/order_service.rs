//! Service-order application service.
//!
//! Load, decide, apply, save: a command runs against the rehydrated
//! aggregate and the whole aggregate (status, items, audit log) is persisted
//! in one save, so a status change and its log entry always land together.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use werkorder_auth::{require_min_role, Principal, UserRole};
use werkorder_core::{Aggregate, DomainError, DomainResult};
use werkorder_orders::{
    AddItem, CreateServiceOrder, ItemDraft, ReceiveItem, ServiceOrder, ServiceOrderCommand,
    ServiceOrderId, ServiceOrderLog, ServiceOrderStatus, TransitionStatus,
};
use werkorder_pricing::{calculate_order_totals, OrderTotals};

use crate::order_repo::{CustomerDirectory, ServiceOrderRepository};

/// Writes require at least the `user` role; reads are open to any
/// authenticated principal, which the excluded web layer enforces.
pub struct OrderService<R, C> {
    repo: R,
    customers: C,
}

impl<R: ServiceOrderRepository, C: CustomerDirectory> OrderService<R, C> {
    pub fn new(repo: R, customers: C) -> Self {
        Self { repo, customers }
    }

    #[instrument(skip(self, principal, cmd), fields(so = %cmd.so, actor = %principal.email), err)]
    pub fn create(&self, cmd: CreateServiceOrder, principal: &Principal) -> DomainResult<ServiceOrder> {
        require_min_role(principal, UserRole::User)?;
        if self.repo.get(&cmd.so)?.is_some() {
            return Err(DomainError::conflict("serviceorder already exists"));
        }

        let mut order = ServiceOrder::empty(cmd.so.clone());
        Self::execute(&mut order, ServiceOrderCommand::CreateServiceOrder(cmd))?;
        self.repo.save(&order)?;
        info!(so = %order.so(), "serviceorder created");
        Ok(order)
    }

    #[instrument(skip(self, principal, item), fields(so = %so, actor = %principal.email), err)]
    pub fn add_item(
        &self,
        so: &ServiceOrderId,
        item: ItemDraft,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<ServiceOrder> {
        require_min_role(principal, UserRole::User)?;

        let mut order = self.load(so)?;
        Self::execute(
            &mut order,
            ServiceOrderCommand::AddItem(AddItem {
                so: so.clone(),
                item,
                occurred_at: now,
            }),
        )?;
        self.repo.save(&order)?;
        Ok(order)
    }

    /// Explicit, table-checked status transition.
    #[instrument(skip(self, principal), fields(so = %so, target = %target, actor = %principal.email), err)]
    pub fn transition(
        &self,
        so: &ServiceOrderId,
        target: ServiceOrderStatus,
        message: Option<String>,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<ServiceOrder> {
        require_min_role(principal, UserRole::User)?;

        let mut order = self.load(so)?;
        Self::execute(
            &mut order,
            ServiceOrderCommand::TransitionStatus(TransitionStatus {
                so: so.clone(),
                target,
                message,
                occurred_at: now,
            }),
        )?;
        self.repo.save(&order)?;
        info!(so = %order.so(), status = %order.status(), "status changed");
        Ok(order)
    }

    /// Mark an ordered line item as received. When it was the last open one
    /// the order advances to ONTVANGEN; otherwise a partial receipt is
    /// logged.
    #[instrument(skip(self, principal), fields(so = %so, line_no, actor = %principal.email), err)]
    pub fn receive_item(
        &self,
        so: &ServiceOrderId,
        line_no: u32,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<ServiceOrder> {
        require_min_role(principal, UserRole::User)?;

        let mut order = self.load(so)?;
        Self::execute(
            &mut order,
            ServiceOrderCommand::ReceiveItem(ReceiveItem {
                so: so.clone(),
                line_no,
                occurred_at: now,
            }),
        )?;
        self.repo.save(&order)?;
        Ok(order)
    }

    pub fn get(&self, so: &ServiceOrderId) -> DomainResult<ServiceOrder> {
        self.load(so)
    }

    /// Audit log of an order, newest entry first.
    pub fn logs(&self, so: &ServiceOrderId) -> DomainResult<Vec<ServiceOrderLog>> {
        let order = self.load(so)?;
        let mut logs = order.logs().to_vec();
        logs.reverse();
        Ok(logs)
    }

    /// Price the order with its customer's ladder and default price type.
    #[instrument(skip(self), fields(so = %so), err)]
    pub fn totals(&self, so: &ServiceOrderId) -> DomainResult<OrderTotals> {
        let order = self.load(so)?;
        let name = order
            .customer_ref()
            .ok_or_else(|| DomainError::validation("serviceorder has no customer"))?;
        let customer = self
            .customers
            .find_by_name(name)?
            .ok_or_else(DomainError::not_found)?;

        Ok(calculate_order_totals(
            order.items(),
            customer.default_price_type,
            &customer.price_rules,
        ))
    }

    fn load(&self, so: &ServiceOrderId) -> DomainResult<ServiceOrder> {
        self.repo.get(so)?.ok_or_else(DomainError::not_found)
    }

    fn execute(order: &mut ServiceOrder, command: ServiceOrderCommand) -> DomainResult<()> {
        let events = order.handle(&command)?;
        for event in &events {
            order.apply(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use werkorder_core::CustomerId;
    use werkorder_parties::Customer;
    use werkorder_pricing::{PriceRule, PriceType};

    use crate::order_repo::{InMemoryCustomerDirectory, InMemoryServiceOrderRepository};

    fn clerk() -> Principal {
        Principal::new("balie@werkplaats", UserRole::User)
    }

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap()
    }

    fn test_so() -> ServiceOrderId {
        ServiceOrderId::new("26020001")
    }

    fn service() -> OrderService<InMemoryServiceOrderRepository, InMemoryCustomerDirectory> {
        OrderService::new(
            InMemoryServiceOrderRepository::new(),
            InMemoryCustomerDirectory::new(),
        )
    }

    fn create_cmd(customer_ref: Option<&str>) -> CreateServiceOrder {
        CreateServiceOrder {
            so: test_so(),
            supplier: Some("Sullair".to_string()),
            customer_ref: customer_ref.map(str::to_string),
            po: None,
            employee: None,
            remarks: None,
            occurred_at: test_time(),
        }
    }

    fn priced_draft(part_no: &str, bruto: &str, wvk: &str) -> ItemDraft {
        ItemDraft {
            part_no: part_no.to_string(),
            description: None,
            qty: 1,
            list_price: None,
            price_bruto: Some(bruto.parse().unwrap()),
            price_wvk: Some(wvk.parse().unwrap()),
            price_edmac: None,
            price_purchase: None,
            leadtime: None,
            bestellen: true,
        }
    }

    #[test]
    fn created_orders_are_persisted_with_their_initial_log() {
        let service = service();
        service.create(create_cmd(None), &clerk()).unwrap();

        let order = service.get(&test_so()).unwrap();
        assert_eq!(order.status(), ServiceOrderStatus::Open);

        let logs = service.logs(&test_so()).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Serviceorder aangemaakt");
    }

    #[test]
    fn creating_the_same_order_twice_is_a_conflict() {
        let service = service();
        service.create(create_cmd(None), &clerk()).unwrap();
        assert!(matches!(
            service.create(create_cmd(None), &clerk()),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn a_viewer_cannot_write() {
        let service = service();
        let viewer = Principal::new("kijker@werkplaats", UserRole::Viewer);
        assert_eq!(
            service.create(create_cmd(None), &viewer).unwrap_err(),
            DomainError::Unauthorized
        );
    }

    #[test]
    fn transitions_persist_the_status_and_its_log_together() {
        let service = service();
        let clerk = clerk();
        service.create(create_cmd(None), &clerk).unwrap();
        service
            .transition(
                &test_so(),
                ServiceOrderStatus::Aangevraagd,
                None,
                &clerk,
                test_time(),
            )
            .unwrap();

        let order = service.get(&test_so()).unwrap();
        assert_eq!(order.status(), ServiceOrderStatus::Aangevraagd);

        // Newest first.
        let logs = service.logs(&test_so()).unwrap();
        assert_eq!(logs[0].action, "AANGEVRAAGD");
        assert_eq!(logs[0].message, "Status gewijzigd naar AANGEVRAAGD");
    }

    #[test]
    fn an_illegal_transition_does_not_touch_the_stored_order() {
        let service = service();
        let clerk = clerk();
        service.create(create_cmd(None), &clerk).unwrap();

        let err = service
            .transition(
                &test_so(),
                ServiceOrderStatus::Ontvangen,
                None,
                &clerk,
                test_time(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::IllegalTransition { .. }));

        let order = service.get(&test_so()).unwrap();
        assert_eq!(order.status(), ServiceOrderStatus::Open);
        assert_eq!(service.logs(&test_so()).unwrap().len(), 1);
    }

    #[test]
    fn receiving_the_last_item_advances_the_stored_order() {
        let service = service();
        let clerk = clerk();
        service.create(create_cmd(None), &clerk).unwrap();
        service
            .add_item(&test_so(), priced_draft("P-1", "10.00", "8.00"), &clerk, test_time())
            .unwrap();

        service
            .receive_item(&test_so(), 1, &clerk, test_time())
            .unwrap();

        let order = service.get(&test_so()).unwrap();
        assert_eq!(order.status(), ServiceOrderStatus::Ontvangen);
        assert!(order.items()[0].ontvangen);
    }

    #[test]
    fn totals_use_the_customers_ladder() {
        let service = service();
        let clerk = clerk();

        let mut customer = Customer::new(CustomerId::new(), "Jansen BV", test_time());
        customer.default_price_type = Some(PriceType::Bruto);
        customer.price_rules = vec![PriceRule {
            min_amount: dec!(1000),
            price_type: PriceType::Wvk,
        }];
        service.customers.add(customer).unwrap();

        service.create(create_cmd(Some("Jansen BV")), &clerk).unwrap();
        let mut draft = priced_draft("P-1", "1200.00", "950.00");
        draft.qty = 1;
        service
            .add_item(&test_so(), draft, &clerk, test_time())
            .unwrap();

        let totals = service.totals(&test_so()).unwrap();
        // The BRUTO base total (1200) selects the WVK tier; the WVK total
        // itself sits below the threshold and that is intentional.
        assert_eq!(totals.price_type, PriceType::Wvk);
        assert_eq!(totals.total, dec!(950.00));
    }

    #[test]
    fn totals_for_an_unknown_customer_are_not_found() {
        let service = service();
        let clerk = clerk();
        service
            .create(create_cmd(Some("Onbekend BV")), &clerk)
            .unwrap();
        assert_eq!(
            service.totals(&test_so()).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn totals_without_a_customer_reference_are_rejected() {
        let service = service();
        service.create(create_cmd(None), &clerk()).unwrap();
        assert!(matches!(
            service.totals(&test_so()),
            Err(DomainError::Validation(_))
        ));
    }
}
