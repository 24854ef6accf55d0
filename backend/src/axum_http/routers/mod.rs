pub mod checkout;
pub mod collaborations;
pub mod coupons;
pub mod gift_cards;
pub mod products;
pub mod reels;
pub mod users;
