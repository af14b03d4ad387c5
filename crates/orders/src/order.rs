use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use werkorder_core::{Aggregate, AggregateRoot, DomainError, Event};

use crate::item::{ItemDraft, ServiceOrderItem};
use crate::log::ServiceOrderLog;
use crate::status::ServiceOrderStatus;

/// Service-order identifier: the formatted service-order number string
/// (e.g. `"26020005"`), the leading business key throughout the portal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceOrderId(String);

impl ServiceOrderId {
    pub fn new(so: impl Into<String>) -> Self {
        Self(so.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ServiceOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate root: ServiceOrder.
///
/// Owns its line items and audit log exclusively; both evolve only through
/// applied events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOrder {
    so: ServiceOrderId,
    supplier: Option<String>,
    customer_ref: Option<String>,
    po: Option<String>,
    employee: Option<String>,
    remarks: Option<String>,
    status: ServiceOrderStatus,
    items: Vec<ServiceOrderItem>,
    logs: Vec<ServiceOrderLog>,
    created_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl ServiceOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(so: ServiceOrderId) -> Self {
        Self {
            so,
            supplier: None,
            customer_ref: None,
            po: None,
            employee: None,
            remarks: None,
            status: ServiceOrderStatus::Open,
            items: Vec::new(),
            logs: Vec::new(),
            created_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn so(&self) -> &ServiceOrderId {
        &self.so
    }

    pub fn status(&self) -> ServiceOrderStatus {
        self.status
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    pub fn customer_ref(&self) -> Option<&str> {
        self.customer_ref.as_deref()
    }

    pub fn po(&self) -> Option<&str> {
        self.po.as_deref()
    }

    pub fn employee(&self) -> Option<&str> {
        self.employee.as_deref()
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    pub fn items(&self) -> &[ServiceOrderItem] {
        &self.items
    }

    pub fn logs(&self) -> &[ServiceOrderLog] {
        &self.logs
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn item(&self, line_no: u32) -> Option<&ServiceOrderItem> {
        self.items.iter().find(|item| item.line_no == line_no)
    }
}

impl AggregateRoot for ServiceOrder {
    type Id = ServiceOrderId;

    fn id(&self) -> &Self::Id {
        &self.so
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateServiceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServiceOrder {
    pub so: ServiceOrderId,
    pub supplier: Option<String>,
    pub customer_ref: Option<String>,
    pub po: Option<String>,
    pub employee: Option<String>,
    pub remarks: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub so: ServiceOrderId,
    pub item: ItemDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: TransitionStatus (explicit, table-checked transition).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStatus {
    pub so: ServiceOrderId,
    pub target: ServiceOrderStatus,
    /// Human-readable cause for the audit log; a default is derived from the
    /// target when absent.
    pub message: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReceiveItem (marks an ordered item as received).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveItem {
    pub so: ServiceOrderId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceOrderCommand {
    CreateServiceOrder(CreateServiceOrder),
    AddItem(AddItem),
    TransitionStatus(TransitionStatus),
    ReceiveItem(ReceiveItem),
}

/// Event: ServiceOrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrderCreated {
    pub so: ServiceOrderId,
    pub supplier: Option<String>,
    pub customer_ref: Option<String>,
    pub po: Option<String>,
    pub employee: Option<String>,
    pub remarks: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub so: ServiceOrderId,
    pub item: ServiceOrderItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
///
/// Carries both the status mutation and its audit entry; applying it updates
/// the status and appends exactly one log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub so: ServiceOrderId,
    pub from: ServiceOrderStatus,
    pub to: ServiceOrderStatus,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReceived {
    pub so: ServiceOrderId,
    pub line_no: u32,
    pub part_no: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartialReceipt (audit-only; some ordered items remain open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialReceipt {
    pub so: ServiceOrderId,
    pub part_no: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceOrderEvent {
    ServiceOrderCreated(ServiceOrderCreated),
    ItemAdded(ItemAdded),
    StatusChanged(StatusChanged),
    ItemReceived(ItemReceived),
    PartialReceipt(PartialReceipt),
}

impl Event for ServiceOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ServiceOrderEvent::ServiceOrderCreated(_) => "serviceorder.created",
            ServiceOrderEvent::ItemAdded(_) => "serviceorder.item_added",
            ServiceOrderEvent::StatusChanged(_) => "serviceorder.status_changed",
            ServiceOrderEvent::ItemReceived(_) => "serviceorder.item_received",
            ServiceOrderEvent::PartialReceipt(_) => "serviceorder.partial_receipt",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ServiceOrderEvent::ServiceOrderCreated(e) => e.occurred_at,
            ServiceOrderEvent::ItemAdded(e) => e.occurred_at,
            ServiceOrderEvent::StatusChanged(e) => e.occurred_at,
            ServiceOrderEvent::ItemReceived(e) => e.occurred_at,
            ServiceOrderEvent::PartialReceipt(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ServiceOrder {
    type Command = ServiceOrderCommand;
    type Event = ServiceOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ServiceOrderEvent::ServiceOrderCreated(e) => {
                self.so = e.so.clone();
                self.supplier = e.supplier.clone();
                self.customer_ref = e.customer_ref.clone();
                self.po = e.po.clone();
                self.employee = e.employee.clone();
                self.remarks = e.remarks.clone();
                self.status = ServiceOrderStatus::Open;
                self.items.clear();
                self.logs.clear();
                self.created_at = Some(e.occurred_at);
                self.created = true;
                self.logs.push(ServiceOrderLog {
                    action: ServiceOrderStatus::Open.as_str().to_string(),
                    message: "Serviceorder aangemaakt".to_string(),
                    at: e.occurred_at,
                });
            }
            ServiceOrderEvent::ItemAdded(e) => {
                self.items.push(e.item.clone());
            }
            ServiceOrderEvent::StatusChanged(e) => {
                self.status = e.to;
                self.logs.push(ServiceOrderLog {
                    action: e.to.as_str().to_string(),
                    message: e.message.clone(),
                    at: e.occurred_at,
                });
            }
            ServiceOrderEvent::ItemReceived(e) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.line_no == e.line_no) {
                    item.ontvangen = true;
                    item.received_at = Some(e.occurred_at);
                }
            }
            ServiceOrderEvent::PartialReceipt(e) => {
                self.logs.push(ServiceOrderLog {
                    action: "DEELONTVANGST".to_string(),
                    message: format!("Artikel {} ontvangen", e.part_no),
                    at: e.occurred_at,
                });
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ServiceOrderCommand::CreateServiceOrder(cmd) => self.handle_create(cmd),
            ServiceOrderCommand::AddItem(cmd) => self.handle_add_item(cmd),
            ServiceOrderCommand::TransitionStatus(cmd) => self.handle_transition(cmd),
            ServiceOrderCommand::ReceiveItem(cmd) => self.handle_receive_item(cmd),
        }
    }
}

impl ServiceOrder {
    fn ensure_so(&self, so: &ServiceOrderId) -> Result<(), DomainError> {
        if &self.so != so {
            return Err(DomainError::validation("so mismatch"));
        }
        Ok(())
    }

    fn handle_create(
        &self,
        cmd: &CreateServiceOrder,
    ) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("serviceorder already exists"));
        }

        Ok(vec![ServiceOrderEvent::ServiceOrderCreated(
            ServiceOrderCreated {
                so: cmd.so.clone(),
                supplier: cmd.supplier.clone(),
                customer_ref: cmd.customer_ref.clone(),
                po: cmd.po.clone(),
                employee: cmd.employee.clone(),
                remarks: cmd.remarks.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_so(&cmd.so)?;

        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(
                "cannot add items to an afgehandelde serviceorder",
            ));
        }

        if cmd.item.qty <= 0 {
            return Err(DomainError::validation("qty must be positive"));
        }

        let next_line_no = (self.items.len() as u32) + 1;

        Ok(vec![ServiceOrderEvent::ItemAdded(ItemAdded {
            so: cmd.so.clone(),
            item: cmd.item.clone().into_item(next_line_no),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_transition(
        &self,
        cmd: &TransitionStatus,
    ) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_so(&cmd.so)?;

        if !self.status.can_transition_to(cmd.target) {
            return Err(DomainError::illegal_transition(
                self.status.as_str(),
                cmd.target.as_str(),
                self.status
                    .allowed_transitions()
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            ));
        }

        let message = cmd
            .message
            .clone()
            .unwrap_or_else(|| format!("Status gewijzigd naar {}", cmd.target));

        Ok(vec![ServiceOrderEvent::StatusChanged(StatusChanged {
            so: cmd.so.clone(),
            from: self.status,
            to: cmd.target,
            message,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_receive_item(
        &self,
        cmd: &ReceiveItem,
    ) -> Result<Vec<ServiceOrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_so(&cmd.so)?;

        let item = self.item(cmd.line_no).ok_or_else(DomainError::not_found)?;

        if !item.bestellen {
            return Err(DomainError::validation("item was not ordered"));
        }
        if item.ontvangen {
            return Err(DomainError::validation("item already received"));
        }

        let mut events = vec![ServiceOrderEvent::ItemReceived(ItemReceived {
            so: cmd.so.clone(),
            line_no: cmd.line_no,
            part_no: item.part_no.clone(),
            occurred_at: cmd.occurred_at,
        })];

        let remaining = self
            .items
            .iter()
            .filter(|i| i.line_no != cmd.line_no && i.awaits_receipt())
            .count();

        // Receipt-driven advance is a business action, not a manual
        // transition: it is not routed through the transition table.
        if remaining == 0
            && self.status != ServiceOrderStatus::Ontvangen
            && !self.status.is_terminal()
        {
            events.push(ServiceOrderEvent::StatusChanged(StatusChanged {
                so: cmd.so.clone(),
                from: self.status,
                to: ServiceOrderStatus::Ontvangen,
                message: "Alle bestelde artikelen ontvangen".to_string(),
                occurred_at: cmd.occurred_at,
            }));
        } else {
            events.push(ServiceOrderEvent::PartialReceipt(PartialReceipt {
                so: cmd.so.clone(),
                part_no: item.part_no.clone(),
                occurred_at: cmd.occurred_at,
            }));
        }

        Ok(events)
    }
}
