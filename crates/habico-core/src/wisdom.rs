//! Wisdom cards: short habit-science lines dealt as a shuffled deck.

use rand::seq::SliceRandom;
use rand::Rng;

pub const WISDOM: [&str; 10] = [
    "Don't try to be tough. Just make the temptation harder to reach. That's real strength.",
    "Your willpower is finite. Don't waste it fighting battles you can avoid by changing your space.",
    "A slip-up isn't a failure, it's a lesson. Let's look at what happened, honest and clear.",
    "We slipped. It happens. Just don't let it happen twice in a row. That's the only rule that matters today.",
    "You can't just stop a bad habit. You have to replace it. What's our new plan when the urge hits?",
    "Every time you resist, you're casting a vote for the person you want to become. I feel that effort.",
    "The urge feels big, but it's temporary. You're not. Stay with me.",
    "Our environment is the invisible hand that shapes us. Let's make it work for us, not against us.",
    "We all think we have more self-control than we do. The smartest move is to not have to use it.",
    "Making a bad habit difficult to do is more effective than relying on willpower alone.",
];

/// Every card once, in random order.
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static str> {
    let mut deck = WISDOM.to_vec();
    deck.shuffle(rng);
    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deck_holds_every_card_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut deck = shuffled_deck(&mut rng);
        assert_eq!(deck.len(), WISDOM.len());
        deck.sort_unstable();
        let mut cards = WISDOM.to_vec();
        cards.sort_unstable();
        assert_eq!(deck, cards);
    }

    #[test]
    fn same_seed_deals_same_order() {
        let first = shuffled_deck(&mut StdRng::seed_from_u64(7));
        let second = shuffled_deck(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);

        let changed = (0..20u64)
            .map(|seed| shuffled_deck(&mut StdRng::seed_from_u64(seed)))
            .any(|deck| deck != WISDOM.to_vec());
        assert!(changed);
    }
}
