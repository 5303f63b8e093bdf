//! Lifecycle chain coverage: both flows are strict linear chains, observed
//! status sequences are monotonic, and DELIVERED is terminal.

use tiffin_api::entities::order::OrderStatus;

const KITCHEN_CHAIN: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Cooking,
    OrderStatus::Ready,
    OrderStatus::Delivered,
];

const RIDER_CHAIN: [OrderStatus; 4] = [
    OrderStatus::SearchingForRider,
    OrderStatus::RiderAssigned,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

#[test]
fn kitchen_chain_walks_in_order() {
    for window in KITCHEN_CHAIN.windows(2) {
        assert_eq!(window[0].next_in_kitchen_flow(), Some(window[1]));
        assert!(window[0].can_transition(window[1]));
    }
}

#[test]
fn rider_chain_walks_in_order() {
    for window in RIDER_CHAIN.windows(2) {
        assert_eq!(window[0].next_in_rider_flow(), Some(window[1]));
        assert!(window[0].can_transition(window[1]));
    }
}

#[test]
fn delivered_is_terminal_in_both_flows() {
    assert!(OrderStatus::Delivered.is_terminal());
    assert_eq!(OrderStatus::Delivered.next_in_kitchen_flow(), None);
    assert_eq!(OrderStatus::Delivered.next_in_rider_flow(), None);

    for status in KITCHEN_CHAIN.iter().chain(RIDER_CHAIN.iter()) {
        assert!(
            !OrderStatus::Delivered.can_transition(*status),
            "DELIVERED must not transition to {status}"
        );
    }
}

#[test]
fn no_skipping_within_the_kitchen_chain() {
    // Every pair more than one step apart must be rejected
    for (i, from) in KITCHEN_CHAIN.iter().enumerate() {
        for (j, to) in KITCHEN_CHAIN.iter().enumerate() {
            if j > i + 1 {
                assert!(
                    !from.can_transition(*to),
                    "{from} must not skip ahead to {to}"
                );
            }
        }
    }
}

#[test]
fn no_rollback_anywhere() {
    let all = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Cooking,
        OrderStatus::Ready,
        OrderStatus::SearchingForRider,
        OrderStatus::RiderAssigned,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];
    for (i, from) in all.iter().enumerate() {
        for to in all.iter().take(i) {
            assert!(!from.can_transition(*to), "{from} must not roll back to {to}");
        }
    }
}

#[test]
fn ready_branches_into_rider_dispatch() {
    assert!(OrderStatus::Ready.can_transition(OrderStatus::SearchingForRider));
    assert!(OrderStatus::Ready.can_transition(OrderStatus::Delivered));
    // But the kitchen advance itself never enters the rider flow
    assert_eq!(
        OrderStatus::Ready.next_in_kitchen_flow(),
        Some(OrderStatus::Delivered)
    );
}

#[test]
fn chains_only_move_forward_through_legal_single_steps() {
    // Walking any legal transition sequence yields a strictly increasing
    // prefix of one of the two chains.
    let mut observed = vec![OrderStatus::Pending];
    let mut current = OrderStatus::Pending;
    while let Some(next) = current.next_in_kitchen_flow() {
        assert!(current.can_transition(next));
        observed.push(next);
        current = next;
    }
    assert_eq!(observed, KITCHEN_CHAIN);
}
