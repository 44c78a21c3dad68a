use crate::model::player::{PlayerCount, Seat};

/// Only the final block of a match allows bidding before the deal.
pub const BLIND_BLOCK: u8 = 4;

/// Seats in bidding order: left of the dealer first, the dealer last.
pub fn bidding_order(dealer: Seat, players: PlayerCount) -> Vec<Seat> {
    let dealer = players.clamp_seat(dealer);
    players.order_from(players.next(dealer)).collect()
}

/// The single value the dealer may not bid: the one that would make all bids sum to the
/// number of cards dealt. `None` when the other bids already exceed the card count.
pub fn forbidden_bid(cards_in_round: u8, others_total: u32) -> Option<u8> {
    u32::from(cards_in_round)
        .checked_sub(others_total)
        .and_then(|value| u8::try_from(value).ok())
}

pub fn legal_bids(cards_in_round: u8, is_dealer: bool, others_total: u32) -> Vec<u8> {
    let forbidden = if is_dealer {
        forbidden_bid(cards_in_round, others_total)
    } else {
        None
    };
    (0..=cards_in_round)
        .filter(|bid| Some(*bid) != forbidden)
        .collect()
}

/// Keeps `bid` when it is legal, otherwise falls back to the first legal value (or 0).
pub fn sanitize_bid(bid: u8, legal: &[u8]) -> u8 {
    if legal.contains(&bid) {
        bid
    } else {
        legal.first().copied().unwrap_or(0)
    }
}

/// Whether `seat` may still lock a blind bid. Non-dealers may always do so in the blind
/// block; the dealer only once every other seat has chosen.
pub fn can_bid_blind(block_number: u8, is_dealer: bool, others_chosen: usize, players: PlayerCount) -> bool {
    block_number == BLIND_BLOCK && (!is_dealer || others_chosen + 1 >= players.count())
}

/// Blind bids are unconstrained except for a dealer whose opponents all went blind: then
/// their total is known and the forbidden bid applies.
pub fn legal_blind_bids(cards_in_round: u8, is_dealer: bool, others_blind_total: Option<u32>) -> Vec<u8> {
    match others_blind_total {
        Some(total) if is_dealer => legal_bids(cards_in_round, true, total),
        _ => (0..=cards_in_round).collect(),
    }
}
