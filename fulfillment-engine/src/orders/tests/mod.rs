//! Test helpers for the orders engine

use crate::catalog::Catalog;
use crate::dispatch::DispatchService;
use crate::ledger::LedgerService;
use crate::orders::OrdersEngine;
use crate::storage::Storage;
use shared::Principal;
use shared::models::{ClientAccount, CreateOrder, ItemInput, NewAccount, Product};
use std::sync::Arc;

mod test_dispatch;

/// Returnable 20L jug
pub const BIDON: u64 = 1;
/// Non-returnable soda pack
pub const PACK_SODA: u64 = 2;

pub struct TestContext {
    pub engine: OrdersEngine,
    pub ledger: LedgerService,
    pub dispatch: DispatchService,
    pub operator: Principal,
}

pub fn setup() -> TestContext {
    let storage = Storage::open_in_memory().unwrap();
    let catalog = Arc::new(Catalog::new());
    catalog.warmup(vec![
        Product {
            id: BIDON,
            name: "Bidón 20L".to_string(),
            code: "B20".to_string(),
            price: 1500.0,
            is_returnable: true,
        },
        Product {
            id: PACK_SODA,
            name: "Pack Soda x6".to_string(),
            code: "PS6".to_string(),
            price: 900.0,
            is_returnable: false,
        },
    ]);

    TestContext {
        engine: OrdersEngine::new(storage.clone(), catalog),
        ledger: LedgerService::new(storage.clone()),
        dispatch: DispatchService::new(storage),
        operator: Principal::new(1, "Test Operator"),
    }
}

impl TestContext {
    pub fn client(&self, name: &str) -> ClientAccount {
        self.ledger
            .create_account(NewAccount {
                name: name.to_string(),
                address: format!("{} s/n", name),
                phone: None,
                zone: Some("Centro".to_string()),
            })
            .unwrap()
    }

    /// Draft order with `quantity` bidones at list price
    pub fn draft_order(&self, client_id: u64, quantity: i64) -> shared::models::Order {
        self.engine
            .create(
                &self.operator,
                CreateOrder {
                    client_id,
                    items: vec![item(BIDON, quantity, 200.0)],
                    notes: None,
                },
            )
            .unwrap()
    }
}

pub fn item(product_id: u64, quantity: i64, unit_price: f64) -> ItemInput {
    ItemInput {
        product_id,
        quantity,
        unit_price,
    }
}
