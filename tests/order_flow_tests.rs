use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use foodloop::config::Config;
use foodloop::db::{FoodChanges, NewFood, NewShop, Store};
use foodloop::domain::OrderId;
use foodloop::domain::access::Identity;
use foodloop::domain::cart::Cart;
use foodloop::entities::{OrderStatus, foods};
use foodloop::services::{AdminError, CancelOutcome, OrderError, Registration, ShopSummary};
use foodloop::state::SharedState;

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = format!(
        "sqlite:{}?mode=rwc",
        std::env::temp_dir()
            .join(format!("foodloop-test-{}.db", uuid::Uuid::new_v4()))
            .display()
    );
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;
    config
}

async fn setup() -> SharedState {
    let config = test_config();
    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open test database");
    SharedState::with_store(config, store).expect("Failed to wire services")
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 1, 15)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn registration(name: &str, email: &str) -> Registration {
    Registration {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        password: "secret123".to_string(),
    }
}

async fn identity(state: &SharedState, user_id: i32) -> Identity {
    state
        .auth_service
        .identity(user_id)
        .await
        .unwrap()
        .expect("identity")
}

async fn consumer(state: &SharedState, email: &str) -> Identity {
    let user = state
        .auth_service
        .register(registration("Buyer", email))
        .await
        .unwrap();
    identity(state, user.id).await
}

async fn admin(state: &SharedState) -> Identity {
    let user = state
        .auth_service
        .register_admin(registration("Admin", "admin@example.com"))
        .await
        .unwrap();
    identity(state, user.id).await
}

async fn vendor(state: &SharedState, email: &str) -> Identity {
    let shop = NewShop {
        name: format!("Shop of {email}"),
        address: None,
        latitude: None,
        longitude: None,
        opening_time: NaiveTime::from_hms_opt(8, 0, 0),
        closing_time: NaiveTime::from_hms_opt(21, 0, 0),
        rating: 0.0,
    };
    let (user, _) = state
        .auth_service
        .register_shop(registration("Vendor", email), shop)
        .await
        .unwrap();
    identity(state, user.id).await
}

async fn listed_food(
    state: &SharedState,
    owner: &Identity,
    name: &str,
    quantity: i32,
) -> foods::Model {
    state
        .catalog_service
        .create_food(
            owner,
            NewFood {
                name: name.to_string(),
                category: None,
                quantity,
                expiry_time: None,
                photo_url: None,
                description: None,
            },
        )
        .await
        .unwrap()
}

async fn stock(state: &SharedState, food_id: i32) -> i32 {
    state.store.foods().get(food_id).await.unwrap().unwrap().quantity
}

async fn cart_with(state: &SharedState, food_id: i32, quantity: i32) -> Cart {
    let mut cart = Cart::default();
    state
        .order_service
        .add_to_cart(&mut cart, food_id, quantity)
        .await
        .unwrap();
    cart
}

async fn place_order(
    state: &SharedState,
    buyer: &Identity,
    food_id: i32,
    quantity: i32,
) -> OrderId {
    let cart = cart_with(state, food_id, quantity).await;
    state
        .order_service
        .checkout(buyer, &cart, Some("18:00"), now())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_available_quantity_ignores_inactive_foods() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;

    listed_food(&state, &shop, "Bread", 3).await;
    let hidden = listed_food(&state, &shop, "Soup", 5).await;
    state
        .catalog_service
        .update_food(
            &shop,
            hidden.id,
            FoodChanges {
                name: "Soup".to_string(),
                quantity: 5,
                is_active: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let shops = state.catalog_service.list_shops().await.unwrap();
    let ShopSummary {
        available_quantity, ..
    } = shops.into_iter().next().unwrap();
    assert_eq!(available_quantity, 3);

    let detail = state
        .catalog_service
        .shop_detail(shop.shop_id.unwrap())
        .await
        .unwrap();
    assert_eq!(detail.foods.len(), 1);
    assert_eq!(detail.foods[0].name, "Bread");
}

#[tokio::test]
async fn test_checkout_decrements_stock() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;

    let order_id = place_order(&state, &buyer, food.id, 2).await;

    assert_eq!(stock(&state, food.id).await, 2);
    let details = state.order_service.get_order(&buyer, order_id).await.unwrap();
    assert_eq!(details.order.status, OrderStatus::Pending);
    assert_eq!(details.lines.len(), 1);
    assert_eq!(details.lines[0].quantity, 2);
    assert_eq!(
        details.order.pickup_time,
        now().date().and_hms_opt(18, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_checkout_books_what_is_left() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let first = consumer(&state, "a@example.com").await;
    let second = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 5).await;

    // Both carts clamp to 5; the first checkout leaves 2 behind.
    let early = cart_with(&state, food.id, 3).await;
    let late = cart_with(&state, food.id, 5).await;

    state
        .order_service
        .checkout(&first, &early, Some("18:00"), now())
        .await
        .unwrap();
    let order_id = state
        .order_service
        .checkout(&second, &late, Some("18:00"), now())
        .await
        .unwrap();

    assert_eq!(stock(&state, food.id).await, 0);
    let details = state.order_service.get_order(&second, order_id).await.unwrap();
    assert_eq!(details.lines[0].quantity, 2);
}

#[tokio::test]
async fn test_checkout_with_nothing_left_still_records_the_line() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 1).await;

    let cart = cart_with(&state, food.id, 1).await;
    place_order(&state, &buyer, food.id, 1).await;

    let order_id = state
        .order_service
        .checkout(&buyer, &cart, Some("18:00"), now())
        .await
        .unwrap();

    let details = state.order_service.get_order(&buyer, order_id).await.unwrap();
    assert_eq!(details.lines.len(), 1);
    assert_eq!(details.lines[0].quantity, 0);
    assert_eq!(stock(&state, food.id).await, 0);
}

#[tokio::test]
async fn test_checkout_skips_deleted_foods() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let kept = listed_food(&state, &shop, "Bread", 3).await;
    let gone = listed_food(&state, &shop, "Soup", 3).await;

    let mut cart = Cart::default();
    for food_id in [kept.id, gone.id] {
        state
            .order_service
            .add_to_cart(&mut cart, food_id, 1)
            .await
            .unwrap();
    }
    state.catalog_service.delete_food(&shop, gone.id).await.unwrap();

    let order_id = state
        .order_service
        .checkout(&buyer, &cart, Some("18:00"), now())
        .await
        .unwrap();

    let details = state.order_service.get_order(&buyer, order_id).await.unwrap();
    assert_eq!(details.lines.len(), 1);
    assert_eq!(details.lines[0].food_id, kept.id);
}

#[tokio::test]
async fn test_checkout_rejects_bad_pickup_times() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;
    let cart = cart_with(&state, food.id, 1).await;

    let missing = state
        .order_service
        .checkout(&buyer, &cart, None, now())
        .await;
    assert!(matches!(missing, Err(OrderError::Validation(_))));

    let past = state
        .order_service
        .checkout(&buyer, &cart, Some("09:30"), now())
        .await;
    assert!(matches!(past, Err(OrderError::PickupTime(_))));

    let after_closing = state
        .order_service
        .checkout(&buyer, &cart, Some("21:30"), now())
        .await;
    assert!(matches!(after_closing, Err(OrderError::PickupTime(_))));

    assert_eq!(stock(&state, food.id).await, 4);
    assert!(state.order_service.list_orders(&buyer).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let state = setup().await;
    let buyer = consumer(&state, "b@example.com").await;

    let result = state
        .order_service
        .checkout(&buyer, &Cart::default(), Some("18:00"), now())
        .await;
    assert!(matches!(result, Err(OrderError::Validation(_))));
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;

    let order_id = place_order(&state, &buyer, food.id, 2).await;
    assert_eq!(stock(&state, food.id).await, 2);

    let cancellation = state.order_service.cancel(&buyer, order_id).await.unwrap();

    assert_eq!(cancellation.outcome, CancelOutcome::Cancelled);
    assert_eq!(cancellation.order.order.status, OrderStatus::Cancelled);
    assert_eq!(stock(&state, food.id).await, 4);
}

#[tokio::test]
async fn test_cancelling_twice_restocks_once() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;

    let order_id = place_order(&state, &buyer, food.id, 2).await;
    state.order_service.cancel(&buyer, order_id).await.unwrap();
    let again = state.order_service.cancel(&buyer, order_id).await.unwrap();

    assert_eq!(again.outcome, CancelOutcome::AlreadyCancelled);
    assert_eq!(stock(&state, food.id).await, 4);
}

#[tokio::test]
async fn test_completed_orders_cannot_be_cancelled() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;

    let order_id = place_order(&state, &buyer, food.id, 2).await;
    state
        .order_service
        .update_status(&shop, order_id, "completed")
        .await
        .unwrap();

    let result = state.order_service.cancel(&buyer, order_id).await;
    assert!(matches!(result, Err(OrderError::InvalidTransition(_))));

    let details = state.order_service.get_order(&buyer, order_id).await.unwrap();
    assert_eq!(details.order.status, OrderStatus::Completed);
    assert_eq!(stock(&state, food.id).await, 2);
}

#[tokio::test]
async fn test_completed_at_follows_status() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;
    let order_id = place_order(&state, &buyer, food.id, 1).await;

    let completed = state
        .order_service
        .update_status(&shop, order_id, "completed")
        .await
        .unwrap();
    assert!(completed.order.completed_at.is_some());

    let reopened = state
        .order_service
        .update_status(&shop, order_id, "pending")
        .await
        .unwrap();
    assert_eq!(reopened.order.status, OrderStatus::Pending);
    assert!(reopened.order.completed_at.is_none());
}

#[tokio::test]
async fn test_status_updates_guard_cancelled_orders() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;
    let order_id = place_order(&state, &buyer, food.id, 2).await;

    let bogus = state
        .order_service
        .update_status(&shop, order_id, "shipped")
        .await;
    assert!(matches!(bogus, Err(OrderError::InvalidStatus(_))));

    state
        .order_service
        .update_status(&shop, order_id, "cancelled")
        .await
        .unwrap();
    assert_eq!(stock(&state, food.id).await, 4);

    // Staying cancelled is allowed and does not restock again.
    state
        .order_service
        .update_status(&shop, order_id, "cancelled")
        .await
        .unwrap();
    assert_eq!(stock(&state, food.id).await, 4);

    let reopen = state
        .order_service
        .update_status(&shop, order_id, "pending")
        .await;
    assert!(matches!(reopen, Err(OrderError::InvalidTransition(_))));
}

#[tokio::test]
async fn test_only_the_owning_shop_manages_an_order() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let rival = vendor(&state, "r@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let stranger = consumer(&state, "s@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;
    let order_id = place_order(&state, &buyer, food.id, 1).await;

    let result = state
        .order_service
        .update_status(&rival, order_id, "completed")
        .await;
    assert!(matches!(result, Err(OrderError::Forbidden)));

    let result = state.order_service.cancel(&stranger, order_id).await;
    assert!(matches!(result, Err(OrderError::Forbidden)));

    let result = state.order_service.get_order(&stranger, order_id).await;
    assert!(matches!(result, Err(OrderError::Forbidden)));

    // The shop may cancel its own order.
    let cancellation = state.order_service.cancel(&shop, order_id).await.unwrap();
    assert_eq!(cancellation.outcome, CancelOutcome::Cancelled);
}

#[tokio::test]
async fn test_cart_rejects_a_second_shop() {
    let state = setup().await;
    let first = vendor(&state, "a@example.com").await;
    let second = vendor(&state, "b@example.com").await;
    let bread = listed_food(&state, &first, "Bread", 4).await;
    let soup = listed_food(&state, &second, "Soup", 4).await;

    let mut cart = cart_with(&state, bread.id, 2).await;
    let before = cart.clone();

    let result = state.order_service.add_to_cart(&mut cart, soup.id, 1).await;

    assert!(matches!(result, Err(OrderError::CartConflict(_))));
    assert_eq!(cart, before);
}

#[tokio::test]
async fn test_cart_clamps_to_stock() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 3).await;

    let mut cart = Cart::default();
    let held = state
        .order_service
        .add_to_cart(&mut cart, food.id, 2)
        .await
        .unwrap();
    assert_eq!(held, 2);

    let held = state
        .order_service
        .add_to_cart(&mut cart, food.id, 5)
        .await
        .unwrap();
    assert_eq!(held, 3);
    assert_eq!(stock(&state, food.id).await, 3);
}

#[tokio::test]
async fn test_cart_forgets_foods_of_a_deleted_shop() {
    let state = setup().await;
    let admin = admin(&state).await;
    let first = vendor(&state, "a@example.com").await;
    let second = vendor(&state, "b@example.com").await;
    let bread = listed_food(&state, &first, "Bread", 4).await;
    let soup = listed_food(&state, &second, "Soup", 4).await;

    let mut cart = cart_with(&state, bread.id, 2).await;
    state
        .admin_service
        .delete_shop(&admin, first.shop_id.unwrap())
        .await
        .unwrap();

    let held = state
        .order_service
        .add_to_cart(&mut cart, soup.id, 1)
        .await
        .unwrap();
    assert_eq!(held, 1);
    assert_eq!(cart.shop_id, second.shop_id);
    assert_eq!(cart.lines().collect::<Vec<_>>(), vec![(soup.id, 1)]);
}

#[tokio::test]
async fn test_cart_contents_drop_deleted_foods() {
    let state = setup().await;
    let shop = vendor(&state, "v@example.com").await;
    let bread = listed_food(&state, &shop, "Bread", 4).await;

    let mut cart = cart_with(&state, bread.id, 2).await;
    state
        .catalog_service
        .delete_food(&shop, bread.id)
        .await
        .unwrap();

    let contents = state
        .order_service
        .cart_contents(&mut cart)
        .await
        .unwrap();
    assert!(contents.lines.is_empty());
    assert!(contents.shop.is_none());
    assert!(cart.is_empty());
    assert_eq!(cart.shop_id, None);
}

#[tokio::test]
async fn test_deleting_a_shop_removes_its_subtree() {
    let state = setup().await;
    let admin = admin(&state).await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;
    let order_id = place_order(&state, &buyer, food.id, 1).await;

    let shop_id = shop.shop_id.unwrap();
    let removed = state
        .admin_service
        .delete_shop(&admin, shop_id)
        .await
        .unwrap();

    // Item, order, food, shop.
    assert_eq!(removed, 4);
    assert!(state.store.shops().get(shop_id).await.unwrap().is_none());
    assert!(state.store.foods().get(food.id).await.unwrap().is_none());
    assert!(
        state
            .store
            .orders()
            .get(order_id.value())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_deleting_a_user_removes_their_orders() {
    let state = setup().await;
    let admin = admin(&state).await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;
    let order_id = place_order(&state, &buyer, food.id, 2).await;

    state
        .admin_service
        .delete_user(&admin, buyer.user_id)
        .await
        .unwrap();

    assert!(
        state
            .store
            .users()
            .get_by_id(buyer.user_id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        state
            .store
            .orders()
            .get(order_id.value())
            .await
            .unwrap()
            .is_none()
    );
    // Deleting an order is not a cancellation.
    assert_eq!(stock(&state, food.id).await, 2);
}

#[tokio::test]
async fn test_admins_are_protected_from_deletion() {
    let state = setup().await;
    let admin = admin(&state).await;
    let other = state
        .auth_service
        .register_admin(registration("Other", "other@example.com"))
        .await
        .unwrap();

    let own = state.admin_service.delete_user(&admin, admin.user_id).await;
    assert!(matches!(own, Err(AdminError::ForbiddenOperation(_))));

    let peer = state.admin_service.delete_user(&admin, other.id).await;
    assert!(matches!(peer, Err(AdminError::ForbiddenOperation(_))));

    let missing = state.admin_service.delete_user(&admin, 9999).await;
    assert!(matches!(missing, Err(AdminError::NotFound(_))));
}

#[tokio::test]
async fn test_admin_dashboard_counts() {
    let state = setup().await;
    let admin = admin(&state).await;
    let shop = vendor(&state, "v@example.com").await;
    let buyer = consumer(&state, "b@example.com").await;
    let food = listed_food(&state, &shop, "Bread", 4).await;
    place_order(&state, &buyer, food.id, 1).await;

    let dashboard = state.admin_service.dashboard(&admin, 20).await.unwrap();

    assert_eq!(dashboard.stats.total_orders, 1);
    assert_eq!(dashboard.stats.total_users, 1);
    assert_eq!(dashboard.stats.total_shops, 1);
    assert_eq!(dashboard.recent_orders.len(), 1);

    let denied = state.admin_service.dashboard(&buyer, 20).await;
    assert!(matches!(denied, Err(AdminError::Forbidden)));
}
