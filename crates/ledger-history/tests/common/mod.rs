#![allow(dead_code)]

//! Fixture document shared by the integration tests: a miniature ledger with
//! customers, departments and suppliers, plus the add/delete/edit flows a
//! page would run against it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ledger_history::{
    Action, CommandManager, Document, Keyed, ModifiedFlag, Signal, Snapshot, edit_entity,
    insert_entity, remove_entity,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    pub name: String,
    pub phone: String,
}

impl Keyed for Customer {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

impl Snapshot for Customer {
    type State = CustomerFields;

    fn capture(&self) -> CustomerFields {
        CustomerFields {
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
    }

    fn restore(&mut self, state: &CustomerFields) {
        self.name.clone_from(&state.name);
        self.phone.clone_from(&state.phone);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: u64,
    pub name: String,
}

impl Keyed for Department {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    pub id: u64,
    pub name: String,
}

impl Keyed for Supplier {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// Comparable view of the ledger contents, ignoring the dirty flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    pub customers: Vec<Customer>,
    pub departments: Vec<Department>,
    pub suppliers: Vec<Supplier>,
}

#[derive(Debug)]
pub struct Ledger {
    pub customers: Vec<Customer>,
    pub departments: Vec<Department>,
    pub suppliers: Vec<Supplier>,
    next_id: u64,
    modified: ModifiedFlag,
    data_changed: Signal,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            customers: Vec::new(),
            departments: Vec::new(),
            suppliers: Vec::new(),
            next_id: 1,
            modified: ModifiedFlag::default(),
            data_changed: Signal::new("data_changed"),
        }
    }
}

impl Document for Ledger {
    fn mark_modified(&mut self) {
        self.modified.mark();
    }

    fn is_modified(&self) -> bool {
        self.modified.get()
    }

    fn mark_saved(&mut self) {
        self.modified.clear();
    }
}

impl Ledger {
    pub fn state(&self) -> LedgerState {
        LedgerState {
            customers: self.customers.clone(),
            departments: self.departments.clone(),
            suppliers: self.suppliers.clone(),
        }
    }

    pub fn data_changed(&self) -> Signal {
        self.data_changed.clone()
    }

    /// Allocate a fresh identifier. Only forward flows call this; redo
    /// replays the identifier captured in the action.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn customer_names(&self) -> Vec<&str> {
        self.customers.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn department_names(&self) -> Vec<&str> {
        self.departments.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn supplier_names(&self) -> Vec<&str> {
        self.suppliers.iter().map(|s| s.name.as_str()).collect()
    }
}

pub type SharedLedger = Rc<RefCell<Ledger>>;

pub fn shared_ledger() -> SharedLedger {
    Rc::new(RefCell::new(Ledger::default()))
}

fn customers(ledger: &mut Ledger) -> &mut Vec<Customer> {
    &mut ledger.customers
}

fn departments(ledger: &mut Ledger) -> &mut Vec<Department> {
    &mut ledger.departments
}

fn suppliers(ledger: &mut Ledger) -> &mut Vec<Supplier> {
    &mut ledger.suppliers
}

/// "Add customer" modal: allocate an id, insert, record.
pub fn add_customer(doc: &SharedLedger, mgr: &CommandManager, name: &str) -> u64 {
    let id = doc.borrow_mut().allocate_id();
    let customer = Customer {
        id,
        name: name.to_string(),
        phone: String::new(),
    };
    let action = insert_entity(doc, format!("Add customer '{name}'"), customers, customer)
        .expect("fresh id");
    let data_changed = doc.borrow().data_changed();
    data_changed.emit();
    mgr.record_action(action);
    id
}

pub fn add_department(doc: &SharedLedger, mgr: &CommandManager, name: &str) -> u64 {
    let id = doc.borrow_mut().allocate_id();
    let department = Department {
        id,
        name: name.to_string(),
    };
    let action = insert_entity(
        doc,
        format!("Add department '{name}'"),
        departments,
        department,
    )
    .expect("fresh id");
    mgr.record_action(action);
    id
}

pub fn add_supplier(doc: &SharedLedger, mgr: &CommandManager, name: &str) -> u64 {
    let id = doc.borrow_mut().allocate_id();
    let supplier = Supplier {
        id,
        name: name.to_string(),
    };
    let action = insert_entity(doc, format!("Add supplier '{name}'"), suppliers, supplier)
        .expect("fresh id");
    mgr.record_action(action);
    id
}

pub fn delete_customer(doc: &SharedLedger, mgr: &CommandManager, id: u64) -> bool {
    let name = match doc.borrow().customers.iter().find(|c| c.id == id) {
        Some(c) => c.name.clone(),
        None => return false,
    };
    match remove_entity(doc, format!("Delete customer '{name}'"), customers, &id) {
        Some(action) => {
            mgr.record_action(action);
            true
        }
        None => false,
    }
}

pub fn edit_customer_phone(doc: &SharedLedger, mgr: &CommandManager, id: u64, phone: &str) {
    let phone = phone.to_string();
    let action = edit_entity(
        doc,
        format!("Edit customer {id}"),
        move |ledger: &mut Ledger| ledger.customers.iter_mut().find(|c| c.id == id),
        move |customer: &mut Customer| customer.phone = phone,
    )
    .expect("customer exists");
    mgr.record_action(action);
}

/// A generic closure-based action, the way a one-off flow would build it.
pub fn rename_department(doc: &SharedLedger, mgr: &CommandManager, id: u64, to: &str) {
    let from = {
        let mut ledger = doc.borrow_mut();
        let Some(dept) = ledger.departments.iter_mut().find(|d| d.id == id) else {
            return;
        };
        let from = std::mem::replace(&mut dept.name, to.to_string());
        ledger.mark_modified();
        from
    };
    mgr.record_action(Action::new(
        format!("Rename department '{from}' to '{to}'"),
        set_department_name(Rc::downgrade(doc), id, from.clone()),
        set_department_name(Rc::downgrade(doc), id, to.to_string()),
    ));
}

fn set_department_name(
    doc: Weak<RefCell<Ledger>>,
    id: u64,
    name: String,
) -> impl Fn() + 'static {
    move || {
        let Some(doc) = doc.upgrade() else { return };
        let mut ledger = doc.borrow_mut();
        if let Some(dept) = ledger.departments.iter_mut().find(|d| d.id == id) {
            dept.name.clone_from(&name);
            ledger.mark_modified();
        }
    }
}
