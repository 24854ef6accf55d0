pub mod collaborations;
pub mod coupons;
pub mod gift_cards;
pub mod orders;
pub mod products;
pub mod reels;
pub mod storage;
pub mod upload_intents;
pub mod users;
