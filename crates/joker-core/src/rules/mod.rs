pub mod bidding;
pub mod play;
pub mod trump;
