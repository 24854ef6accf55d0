pub mod asset_slots;
pub mod coupon_scopes;
pub mod coupon_statuses;
pub mod discount_types;
pub mod invitation_statuses;
pub mod order_statuses;
pub mod product_sorts;
pub mod product_statuses;
pub mod product_types;
pub mod upload_intent_statuses;
pub mod user_plans;
pub mod visibilities;
