pub mod checkout;
pub mod collaborations;
pub mod coupons;
pub mod enums;
pub mod filenames;
pub mod gift_cards;
pub mod licenses;
pub mod products;
pub mod profiles;
pub mod publish_wizard;
pub mod reels;
pub mod storage;
