use crate::card::{CardCatalog, DestinationCardId, WagonCardId, WagonColor};
use crate::config::GameConfig;
use crate::deck::Deck;
use crate::map::RoadId;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Every player has their own color.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerColor {
    Black,
    Blue,
    Green,
    Orange,
    Pink,
    Red,
    Yellow,
    White,
}

/// A player's hand. Both decks are private to the player.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCards {
    /// Destination tickets kept, and not completed yet.
    pub destinations: Deck<DestinationCardId>,
    pub wagons: Deck<WagonCardId>,
}

/// Everything a player owns, apart from roads and stations which live on the [`crate::map::Map`].
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub name: String,
    pub color: PlayerColor,
    /// Points gained by claiming roads so far.
    pub score: u32,
    /// The number of wagons the player has left.
    /// This is the currency used, alongside wagon cards, to claim roads.
    pub wagons: u8,
    /// The number of stations the player has not built yet.
    pub stations: u8,
    pub hand: PlayerCards,
    /// Roads owned by someone else, but usable to fulfill destination tickets.
    pub borrowed_roads: Vec<RoadId>,
    pub completed_destinations: Vec<DestinationCardId>,
}

impl Player {
    pub fn new(name: impl Into<String>, color: PlayerColor, config: &GameConfig) -> Self {
        Self {
            name: name.into(),
            color,
            score: 0,
            wagons: config.wagons,
            stations: config.stations,
            hand: PlayerCards::default(),
            borrowed_roads: Vec::new(),
            completed_destinations: Vec::new(),
        }
    }

    /// Maps how many cards of each color the player holds.
    /// It is guaranteed that the map has key-value pairs for all wagon colors.
    pub fn wagon_counts(&self, catalog: &CardCatalog) -> HashMap<WagonColor, usize> {
        let mut counts: HashMap<_, _> = WagonColor::iter().map(|color| (color, 0)).collect();
        for color in self.hand.wagons.iter().filter_map(|id| catalog.wagon(id)) {
            *counts.entry(color).or_insert(0) += 1;
        }
        counts
    }

    /// How many cards of exactly this color the player holds (locomotives are not counted
    /// unless `color` is [`WagonColor::Locomotive`]).
    pub fn count_color(&self, catalog: &CardCatalog, color: WagonColor) -> usize {
        self.hand
            .wagons
            .iter()
            .filter(|id| catalog.wagon(*id) == Some(color))
            .count()
    }

    /// The non-locomotive color the player holds most of, first in color order on ties.
    /// Falls back to locomotives if the player has no colored card.
    pub fn best_color(&self, catalog: &CardCatalog) -> WagonColor {
        let counts = self.wagon_counts(catalog);
        let mut best = None;

        for color in WagonColor::colors() {
            let count = counts.get(&color).copied().unwrap_or(0);
            if count > best.map_or(0, |(_, best_count)| best_count) {
                best = Some((color, count));
            }
        }

        best.map_or(WagonColor::Locomotive, |(color, _)| color)
    }

    /// Picks `amount` cards of `color` from the hand, topping up with locomotives.
    ///
    /// Paying with [`WagonColor::Locomotive`] only ever picks locomotives.
    /// Returns `None` if the hand cannot cover the amount.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::card::{CardCatalog, WagonCardId, WagonColor};
    /// use ticket_to_ride_europe::config::GameConfig;
    /// use ticket_to_ride_europe::player::{Player, PlayerColor};
    ///
    /// let catalog = CardCatalog::new(
    ///     vec![WagonColor::Red, WagonColor::Locomotive, WagonColor::Red, WagonColor::Blue],
    ///     Vec::new(),
    /// );
    /// let mut player = Player::new("Player1", PlayerColor::Red, &GameConfig::default());
    /// for id in catalog.wagon_ids() {
    ///     player.hand.wagons.add_card(id);
    /// }
    ///
    /// assert_eq!(
    ///     player.plan_payment(&catalog, WagonColor::Red, 3),
    ///     Some(vec![WagonCardId(0), WagonCardId(2), WagonCardId(1)])
    /// );
    /// assert_eq!(player.plan_payment(&catalog, WagonColor::Blue, 3), None);
    /// ```
    pub fn plan_payment(
        &self,
        catalog: &CardCatalog,
        color: WagonColor,
        amount: usize,
    ) -> Option<Vec<WagonCardId>> {
        let of_color = |wanted: WagonColor| {
            self.hand
                .wagons
                .iter()
                .filter(move |id| catalog.wagon(*id) == Some(wanted))
        };

        let mut payment: Vec<_> = if color.is_locomotive() {
            Vec::with_capacity(amount)
        } else {
            of_color(color).take(amount).collect()
        };
        let missing = amount - payment.len();
        payment.extend(of_color(WagonColor::Locomotive).take(missing));

        if payment.len() < amount {
            return None;
        }
        Some(payment)
    }

    #[inline]
    pub fn can_afford(&self, catalog: &CardCatalog, color: WagonColor, amount: usize) -> bool {
        self.plan_payment(catalog, color, amount).is_some()
    }

    /// Removes the given cards from the hand.
    ///
    /// Returns `false` (and leaves the hand untouched) if any of them is not in the hand.
    pub fn pay(&mut self, cards: &[WagonCardId]) -> bool {
        if !cards.iter().all(|card| self.hand.wagons.contains(*card)) {
            return false;
        }

        for card in cards {
            self.hand.wagons.take_card(*card);
        }
        true
    }

    /// Whether the player may borrow one more road, given how many stations they built.
    pub fn can_borrow_more(&self, stations_placed: usize) -> bool {
        self.borrowed_roads.len() < stations_placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    // Tests for `PlayerColor`.

    #[test]
    fn player_color_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&PlayerColor::Blue)?, r#""blue""#);
        assert_eq!(serde_json::to_string(&PlayerColor::Red)?, r#""red""#);
        Ok(())
    }

    #[test]
    fn json_to_player_color() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<PlayerColor>(r#""pink""#)?,
            PlayerColor::Pink
        );
        assert!(serde_json::from_str::<PlayerColor>(r#""turquoise""#).is_err());

        Ok(())
    }

    #[test]
    fn player_color_from_str() {
        assert_eq!(PlayerColor::from_str("white"), Ok(PlayerColor::White));
        assert!(PlayerColor::from_str("gray").is_err());
    }

    // Tests for `Player`.

    fn catalog() -> CardCatalog {
        CardCatalog::new(
            vec![
                WagonColor::Red,
                WagonColor::Red,
                WagonColor::Blue,
                WagonColor::Blue,
                WagonColor::Blue,
                WagonColor::Locomotive,
                WagonColor::Locomotive,
                WagonColor::Green,
            ],
            Vec::new(),
        )
    }

    fn player_holding(catalog: &CardCatalog, ids: &[usize]) -> Player {
        let mut player = Player::new("Player1", PlayerColor::Orange, &GameConfig::default());
        for id in ids {
            assert!(catalog.wagon(WagonCardId(*id)).is_some());
            player.hand.wagons.add_card(WagonCardId(*id));
        }
        player
    }

    #[test]
    fn player_new() {
        let config = GameConfig::default();
        let player = Player::new("Player1", PlayerColor::Orange, &config);

        assert_eq!(player.name, "Player1");
        assert_eq!(player.color, PlayerColor::Orange);
        assert_eq!(player.score, 0);
        assert_eq!(player.wagons, 45);
        assert_eq!(player.stations, 3);
        assert!(player.hand.wagons.is_empty());
        assert!(player.hand.destinations.is_empty());
        assert!(player.borrowed_roads.is_empty());
        assert!(player.completed_destinations.is_empty());
    }

    #[test]
    fn player_wagon_counts() {
        let catalog = catalog();
        let player = player_holding(&catalog, &[0, 2, 3, 5]);
        let counts = player.wagon_counts(&catalog);

        assert_eq!(counts.len(), 9);
        assert_eq!(counts[&WagonColor::Red], 1);
        assert_eq!(counts[&WagonColor::Blue], 2);
        assert_eq!(counts[&WagonColor::Locomotive], 1);
        assert_eq!(counts[&WagonColor::White], 0);
        assert_eq!(player.count_color(&catalog, WagonColor::Blue), 2);
    }

    #[test]
    fn player_best_color() {
        let catalog = catalog();

        assert_eq!(
            player_holding(&catalog, &[0, 2, 3]).best_color(&catalog),
            WagonColor::Blue
        );
        // Ties go to the first color in order.
        assert_eq!(
            player_holding(&catalog, &[0, 2, 7]).best_color(&catalog),
            WagonColor::Blue
        );
        assert_eq!(
            player_holding(&catalog, &[5]).best_color(&catalog),
            WagonColor::Locomotive
        );
        assert_eq!(
            player_holding(&catalog, &[]).best_color(&catalog),
            WagonColor::Locomotive
        );
    }

    #[test]
    fn player_plan_payment_with_locomotives() {
        let catalog = catalog();
        let player = player_holding(&catalog, &[0, 1, 5, 6]);

        assert_eq!(
            player.plan_payment(&catalog, WagonColor::Red, 2),
            Some(vec![WagonCardId(0), WagonCardId(1)])
        );
        assert_eq!(
            player.plan_payment(&catalog, WagonColor::Red, 4),
            Some(vec![
                WagonCardId(0),
                WagonCardId(1),
                WagonCardId(5),
                WagonCardId(6)
            ])
        );
        assert_eq!(player.plan_payment(&catalog, WagonColor::Red, 5), None);
        assert_eq!(
            player.plan_payment(&catalog, WagonColor::Green, 2),
            Some(vec![WagonCardId(5), WagonCardId(6)])
        );
    }

    #[test]
    fn player_plan_payment_locomotives_only() {
        let catalog = catalog();
        let player = player_holding(&catalog, &[0, 1, 5]);

        assert_eq!(
            player.plan_payment(&catalog, WagonColor::Locomotive, 1),
            Some(vec![WagonCardId(5)])
        );
        assert_eq!(player.plan_payment(&catalog, WagonColor::Locomotive, 2), None);
        assert!(player.can_afford(&catalog, WagonColor::Red, 3));
    }

    #[test]
    fn player_pay() {
        let catalog = catalog();
        let mut player = player_holding(&catalog, &[0, 1, 5]);

        assert!(!player.pay(&[WagonCardId(0), WagonCardId(7)]));
        assert_eq!(player.hand.wagons.count_cards(), 3);

        assert!(player.pay(&[WagonCardId(0), WagonCardId(5)]));
        assert_eq!(
            player.hand.wagons.iter().collect::<Vec<_>>(),
            vec![WagonCardId(1)]
        );
    }

    #[test]
    fn player_can_borrow_more() {
        let mut player = Player::new("Player1", PlayerColor::Blue, &GameConfig::default());

        assert!(!player.can_borrow_more(0));
        assert!(player.can_borrow_more(1));
        player.borrowed_roads.push(RoadId(3));
        assert!(!player.can_borrow_more(1));
        assert!(player.can_borrow_more(2));
    }
}
