//! Dispatch groups: membership exclusivity, listing, deletion

use super::*;
use shared::error::ErrorCode;
use shared::models::DeliveryStatus;

#[test]
fn test_create_group_links_orders() {
    let ctx = setup();
    let client = ctx.client("Cliente Reparto");
    let a = ctx.draft_order(client.id, 1);
    let b = ctx.draft_order(client.id, 2);

    let group = ctx
        .dispatch
        .create_group(&[a.id, b.id], Some("zona centro".to_string()))
        .unwrap();

    assert_eq!(group.status, DeliveryStatus::Pending);
    assert_eq!(group.order_ids, vec![a.id, b.id]);
    assert_eq!(ctx.engine.get(a.id).unwrap().delivery_id, Some(group.id));
    assert_eq!(ctx.engine.get(b.id).unwrap().delivery_id, Some(group.id));
}

#[test]
fn test_create_group_dedupes_input_ids() {
    let ctx = setup();
    let client = ctx.client("Cliente Reparto");
    let a = ctx.draft_order(client.id, 1);

    let group = ctx.dispatch.create_group(&[a.id, a.id, a.id], None).unwrap();
    assert_eq!(group.order_ids, vec![a.id]);
}

#[test]
fn test_create_group_rejects_already_grouped_order() {
    let ctx = setup();
    let client = ctx.client("Cliente Reparto");
    let a = ctx.draft_order(client.id, 1);
    let b = ctx.draft_order(client.id, 2);
    ctx.dispatch.create_group(&[a.id], None).unwrap();

    let err = ctx.dispatch.create_group(&[b.id, a.id], None).unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderAlreadyGrouped);

    // Validation failed before any write: b stays free
    assert_eq!(ctx.engine.get(b.id).unwrap().delivery_id, None);
}

#[test]
fn test_create_group_rejects_empty_and_unknown() {
    let ctx = setup();
    assert_eq!(
        ctx.dispatch.create_group(&[], None).unwrap_err().code,
        ErrorCode::InvalidArgument
    );
    assert_eq!(
        ctx.dispatch.create_group(&[404], None).unwrap_err().code,
        ErrorCode::NotFound
    );
}

#[test]
fn test_delete_group_releases_members() {
    let ctx = setup();
    let client = ctx.client("Cliente Reparto");
    let a = ctx.draft_order(client.id, 1);
    let b = ctx.draft_order(client.id, 2);
    let group = ctx.dispatch.create_group(&[a.id, b.id], None).unwrap();

    ctx.dispatch.delete_group(group.id).unwrap();

    // Orders survive, free to be regrouped
    assert_eq!(ctx.engine.get(a.id).unwrap().delivery_id, None);
    assert_eq!(ctx.engine.get(b.id).unwrap().delivery_id, None);
    assert_eq!(
        ctx.dispatch.get_group(group.id).unwrap_err().code,
        ErrorCode::NotFound
    );

    let regrouped = ctx.dispatch.create_group(&[a.id, b.id], None).unwrap();
    assert_eq!(regrouped.order_ids, vec![a.id, b.id]);
}

#[test]
fn test_list_groups_newest_first_with_limit() {
    let ctx = setup();
    let client = ctx.client("Cliente Reparto");
    let a = ctx.draft_order(client.id, 1);
    let b = ctx.draft_order(client.id, 2);
    let c = ctx.draft_order(client.id, 3);

    let g1 = ctx.dispatch.create_group(&[a.id], None).unwrap();
    let g2 = ctx.dispatch.create_group(&[b.id], None).unwrap();
    let g3 = ctx.dispatch.create_group(&[c.id], None).unwrap();

    let all = ctx.dispatch.list_groups(None, None).unwrap();
    assert_eq!(
        all.iter().map(|s| s.delivery.id).collect::<Vec<_>>(),
        vec![g3.id, g2.id, g1.id]
    );

    let limited = ctx.dispatch.list_groups(Some(DeliveryStatus::Pending), Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].delivery.id, g3.id);
}
