pub mod asset_uploads;
pub mod avatars;
pub mod checkout;
pub mod collaborations;
pub mod coupons;
pub mod gift_cards;
pub mod products;
pub mod profiles;
pub mod publish_product;
pub mod reels;
