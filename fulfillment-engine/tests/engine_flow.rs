//! End-to-end flow against an on-disk database, including reopen

use fulfillment_engine::{Catalog, DispatchService, LedgerService, OrdersEngine, Storage};
use shared::Principal;
use shared::models::{
    CreateOrder, DeliverRequest, ItemInput, NewAccount, OrderStatus, PaymentMethod, PaymentStatus,
    Product,
};
use std::sync::Arc;

fn catalog() -> Arc<Catalog> {
    let catalog = Arc::new(Catalog::new());
    catalog.warmup(vec![
        Product {
            id: 1,
            name: "Bidón 20L".to_string(),
            code: "B20".to_string(),
            price: 1500.0,
            is_returnable: true,
        },
        Product {
            id: 2,
            name: "Pack Soda x6".to_string(),
            code: "PS6".to_string(),
            price: 900.0,
            is_returnable: false,
        },
    ]);
    catalog
}

#[test]
fn test_full_day_flow_survives_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("fulfillment.redb");
    let operator = Principal::new(7, "Marta");

    let (client_id, account_order, cash_order, group_id);
    {
        let storage = Storage::open(&db_path)?;
        let engine = OrdersEngine::new(storage.clone(), catalog());
        let ledger = LedgerService::new(storage.clone());
        let dispatch = DispatchService::new(storage);

        let client = ledger.create_account(NewAccount {
            name: "Almacén Don José".to_string(),
            address: "Av. Siempreviva 742".to_string(),
            phone: Some("351-5550000".to_string()),
            zone: Some("Centro".to_string()),
        })?;
        client_id = client.id;

        // Two orders, grouped for the morning run
        let first = engine.create(
            &operator,
            CreateOrder {
                client_id,
                items: vec![ItemInput {
                    product_id: 1,
                    quantity: 5,
                    unit_price: 1500.0,
                }],
                notes: None,
            },
        )?;
        let second = engine.create(
            &operator,
            CreateOrder {
                client_id,
                items: vec![ItemInput {
                    product_id: 2,
                    quantity: 2,
                    unit_price: 900.0,
                }],
                notes: None,
            },
        )?;
        engine.confirm(first.id)?;
        engine.confirm(second.id)?;
        let group = dispatch.create_group(&[first.id, second.id], Some("reparto centro".to_string()))?;
        group_id = group.id;

        // First order on the client's account, second collected in cash
        engine.deliver(
            &operator,
            first.id,
            DeliverRequest {
                payment_method: PaymentMethod::CurrentAccount,
                notes: None,
                transfer_ref: None,
                returned_bottles: 2,
            },
        )?;
        engine.deliver(
            &operator,
            second.id,
            DeliverRequest {
                payment_method: PaymentMethod::Cash,
                notes: None,
                transfer_ref: None,
                returned_bottles: 0,
            },
        )?;

        // Partial payment against the new debt
        ledger.record_payment(&operator, client_id, 2500.0, None)?;

        account_order = first.id;
        cash_order = second.id;
    }

    // Reopen from disk: everything committed must still be there
    let storage = Storage::open(&db_path)?;
    let engine = OrdersEngine::new(storage.clone(), catalog());
    let ledger = LedgerService::new(storage.clone());
    let dispatch = DispatchService::new(storage);

    let account = ledger.get_account(client_id)?;
    // 5 × 1500 on account, 2500 paid back
    assert_eq!(account.balance, 5000.0);
    assert_eq!(ledger.recomputed_balance(client_id)?, 5000.0);
    // 5 bidones out, 2 empties back
    assert_eq!(account.bottles_balance, 3);

    let first = engine.get(account_order)?;
    assert_eq!(first.status, OrderStatus::Delivered);
    assert_eq!(first.payment_status, PaymentStatus::OnAccount);
    assert_eq!(first.payment_amount, 0.0);

    let second = engine.get(cash_order)?;
    assert_eq!(second.payment_status, PaymentStatus::Paid);
    assert_eq!(second.payment_amount, 1800.0);
    assert_eq!(ledger.cash_balance()?, 1800.0);

    let summary = dispatch.get_group(group_id)?;
    assert_eq!(summary.orders_count, 2);
    assert_eq!(summary.delivered_count, 2);

    // Id sequences continue after reopen, no reuse
    let third = engine.create(
        &operator,
        CreateOrder {
            client_id,
            items: vec![ItemInput {
                product_id: 1,
                quantity: 1,
                unit_price: 1500.0,
            }],
            notes: None,
        },
    )?;
    assert!(third.id > cash_order);

    Ok(())
}
