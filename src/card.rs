use crate::city::City;
use crate::config::GameConfig;
use crate::deck::{Deck, OutOfGame, SharedDeck};
use crate::map::StationId;

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::iter::repeat;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

const NUM_LOCOMOTIVE_CARDS: usize = 14;
const NUM_COLORED_CARDS: usize = 12;
// Bounds how many times in a row the face-up row may be thrown away.
const MAX_FACE_UP_RESETS: usize = 16;

/// The colors of wagon cards, which double as road colors.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WagonColor {
    Black,
    Blue,
    Green,
    Orange,
    Pink,
    Red,
    White,
    Yellow,
    /// The wildcard: matches any color.
    #[serde(alias = "wild")]
    #[strum(to_string = "locomotive", serialize = "wild")]
    Locomotive,
}

impl WagonColor {
    /// Whether the current color is the wildcard.
    ///
    /// # Examples:
    /// ```
    /// use ticket_to_ride_europe::card::WagonColor;
    ///
    /// assert!(!WagonColor::Black.is_locomotive());
    /// assert!(WagonColor::Locomotive.is_locomotive());
    /// ```
    #[inline]
    pub fn is_locomotive(&self) -> bool {
        *self == WagonColor::Locomotive
    }

    /// The eight non-wildcard colors.
    pub fn colors() -> impl Iterator<Item = WagonColor> {
        WagonColor::iter().filter(|color| !color.is_locomotive())
    }
}

/// Index of a wagon card in its [`CardCatalog`].
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct WagonCardId(pub usize);

/// Index of a destination ticket in its [`CardCatalog`].
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct DestinationCardId(pub usize);

impl fmt::Display for WagonCardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for DestinationCardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Encapsulates information about a destination ticket.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DestinationCard {
    /// The two stations that must be connected to fulfill the ticket.
    pub destination: (StationId, StationId),
    /// How many points are granted once this ticket is fulfilled.
    pub points: u8,
    /// Long tickets are dealt one per player at setup, and never drawn afterwards.
    #[serde(default)]
    pub long: bool,
}

/// Convenience macro to generate a destination ticket on the Europe board.
macro_rules! destination_card {
    ($start:ident, $end:ident, $points:literal) => {
        DestinationCard {
            destination: (City::$start.into(), City::$end.into()),
            points: $points,
            long: false,
        }
    };
    ($start:ident, $end:ident, $points:literal, long) => {
        DestinationCard {
            destination: (City::$start.into(), City::$end.into()),
            points: $points,
            long: true,
        }
    };
}

/// Owns every card of a game. Piles and hands only ever hold ids into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardCatalog {
    wagons: Vec<WagonColor>,
    destinations: Vec<DestinationCard>,
}

impl CardCatalog {
    pub fn new(wagons: Vec<WagonColor>, destinations: Vec<DestinationCard>) -> Self {
        Self {
            wagons,
            destinations,
        }
    }

    /// The standard 110 wagon cards: 12 of each color, and 14 locomotives.
    pub fn standard_wagons() -> Vec<WagonColor> {
        let mut wagons = Vec::with_capacity(110);

        for color in WagonColor::iter() {
            let num_cards = if color.is_locomotive() {
                NUM_LOCOMOTIVE_CARDS
            } else {
                NUM_COLORED_CARDS
            };
            wagons.extend(repeat(color).take(num_cards));
        }

        wagons
    }

    /// Every card of the Europe game: the standard wagon cards, 40 regular tickets and 6 long ones.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::card::CardCatalog;
    ///
    /// let catalog = CardCatalog::europe();
    /// assert_eq!(catalog.num_wagons(), 110);
    /// assert_eq!(catalog.num_destinations(), 46);
    /// ```
    pub fn europe() -> Self {
        Self::new(Self::standard_wagons(), Self::europe_destinations())
    }

    fn europe_destinations() -> Vec<DestinationCard> {
        vec![
            destination_card!(Brest, Petrograd, 20, long),
            destination_card!(Cadiz, Stockholm, 21, long),
            destination_card!(Edinburgh, Athina, 21, long),
            destination_card!(Kobenhavn, Erzurum, 21, long),
            destination_card!(Lisboa, Danzig, 20, long),
            destination_card!(Palermo, Moskva, 20, long),
            destination_card!(Amsterdam, Pamplona, 7),
            destination_card!(Amsterdam, Wilno, 12),
            destination_card!(Angora, Kharkov, 10),
            destination_card!(Athina, Angora, 5),
            destination_card!(Athina, Wilno, 11),
            destination_card!(Barcelona, Bruxelles, 8),
            destination_card!(Barcelona, Munchen, 8),
            destination_card!(Berlin, Bucuresti, 8),
            destination_card!(Berlin, Moskva, 12),
            destination_card!(Berlin, Roma, 9),
            destination_card!(Brest, Marseille, 7),
            destination_card!(Brest, Venezia, 8),
            destination_card!(Bruxelles, Danzig, 9),
            destination_card!(Budapest, Sofia, 5),
            destination_card!(Edinburgh, Paris, 7),
            destination_card!(Essen, Kyiv, 10),
            destination_card!(Frankfurt, Kobenhavn, 5),
            destination_card!(Frankfurt, Smolensk, 13),
            destination_card!(Kyiv, Petrograd, 6),
            destination_card!(Kyiv, Sochi, 8),
            destination_card!(London, Berlin, 7),
            destination_card!(London, Wien, 10),
            destination_card!(Madrid, Dieppe, 8),
            destination_card!(Madrid, Zurich, 8),
            destination_card!(Marseille, Essen, 8),
            destination_card!(Palermo, Constantinople, 8),
            destination_card!(Paris, Wien, 8),
            destination_card!(Paris, Zagrab, 7),
            destination_card!(Riga, Bucuresti, 10),
            destination_card!(Roma, Smyrna, 8),
            destination_card!(Rostov, Erzurum, 5),
            destination_card!(Sarajevo, Sevastopol, 8),
            destination_card!(Smolensk, Rostov, 8),
            destination_card!(Sofia, Smyrna, 5),
            destination_card!(Stockholm, Wien, 11),
            destination_card!(Venezia, Constantinople, 10),
            destination_card!(Warszawa, Smolensk, 6),
            destination_card!(Zagrab, Brindisi, 6),
            destination_card!(Zurich, Brindisi, 6),
            destination_card!(Zurich, Budapest, 6),
        ]
    }

    #[inline]
    pub fn wagon(&self, id: WagonCardId) -> Option<WagonColor> {
        self.wagons.get(id.0).copied()
    }

    #[inline]
    pub fn destination(&self, id: DestinationCardId) -> Option<&DestinationCard> {
        self.destinations.get(id.0)
    }

    pub fn num_wagons(&self) -> usize {
        self.wagons.len()
    }

    pub fn num_destinations(&self) -> usize {
        self.destinations.len()
    }

    pub fn wagons(&self) -> &[WagonColor] {
        &self.wagons
    }

    pub fn destinations(&self) -> &[DestinationCard] {
        &self.destinations
    }

    pub fn wagon_ids(&self) -> impl Iterator<Item = WagonCardId> {
        (0..self.wagons.len()).map(WagonCardId)
    }

    pub fn destination_ids(&self) -> impl Iterator<Item = DestinationCardId> + '_ {
        (0..self.destinations.len()).map(DestinationCardId)
    }
}

/// Entity in charge of dealing as well as shuffling wagon cards and destination tickets.
///
/// Cards handed to players leave the dealer: they live in each player's
/// [`crate::player::PlayerCards`] until they are spent and come back through the trash.
#[derive(Clone, Debug)]
pub struct CardDealer {
    catalog: CardCatalog,
    /// Trash, face-up row and face-down pile of wagon cards.
    pub wagons: SharedDeck<WagonCardId>,
    /// Regular destination tickets. Only the face-down pile is used.
    pub destinations: SharedDeck<DestinationCardId>,
    /// Long tickets waiting to be dealt at setup.
    pub long_destinations: Deck<DestinationCardId>,
    /// Tickets removed from the game at setup.
    pub out_of_game: OutOfGame<DestinationCardId>,
    face_up_count: usize,
    face_up_locomotive_limit: usize,
    rng: ChaCha8Rng,
}

impl CardDealer {
    /// Creates a `CardDealer` with every card of the catalog face-down and unshuffled.
    ///
    /// Call [`CardDealer::shuffle_and_lay_out`] before the first turn.
    pub fn new(catalog: CardCatalog, config: &GameConfig, seed: u64) -> Self {
        let (long, regular): (Vec<_>, Vec<_>) = catalog
            .destination_ids()
            .partition(|id| catalog.destinations[id.0].long);

        Self {
            wagons: SharedDeck::with_all_piles(catalog.wagon_ids()),
            destinations: SharedDeck::face_down_only(regular),
            long_destinations: Deck::from_cards(long),
            out_of_game: Deck::new(),
            catalog,
            face_up_count: config.face_up_cards,
            face_up_locomotive_limit: config.face_up_locomotive_limit,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A dealer whose piles are all empty, to be filled from a snapshot.
    pub fn empty(catalog: CardCatalog, config: &GameConfig, seed: u64) -> Self {
        Self {
            catalog,
            wagons: SharedDeck::with_all_piles([]),
            destinations: SharedDeck::face_down_only([]),
            long_destinations: Deck::new(),
            out_of_game: Deck::new(),
            face_up_count: config.face_up_cards,
            face_up_locomotive_limit: config.face_up_locomotive_limit,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[inline]
    pub fn wagon_color(&self, id: WagonCardId) -> Option<WagonColor> {
        self.catalog.wagon(id)
    }

    #[inline]
    pub fn destination(&self, id: DestinationCardId) -> Option<&DestinationCard> {
        self.catalog.destination(id)
    }

    /// Shuffles every face-down pile, then turns up the face-up row.
    ///
    /// The row never starts with too many locomotives (see [`CardDealer::maybe_reset_face_up`]).
    pub fn shuffle_and_lay_out(&mut self) {
        if let Some(face_down) = self.wagons.face_down.as_mut() {
            face_down.shuffle(&mut self.rng);
        }
        if let Some(face_down) = self.destinations.face_down.as_mut() {
            face_down.shuffle(&mut self.rng);
        }
        self.long_destinations.shuffle(&mut self.rng);

        self.replenish();
    }

    /// The face-up card at the given slot, if any.
    pub fn face_up_card(&self, index: usize) -> Option<WagonCardId> {
        self.wagons.face_up.as_ref().and_then(|deck| deck.get(index))
    }

    /// Colors of the face-up row, slot by slot.
    pub fn face_up_colors(&self) -> Vec<WagonColor> {
        self.wagons
            .face_up
            .iter()
            .flat_map(|deck| deck.iter())
            .filter_map(|id| self.catalog.wagon(id))
            .collect()
    }

    /// Draws the face-up card at `index` into `hand`, and refills the row.
    ///
    /// Returns the card drawn, and whether the row had to be thrown away because of
    /// too many locomotives. Returns `None` if there is no card at that slot.
    pub fn draw_face_up(
        &mut self,
        index: usize,
        hand: &mut Deck<WagonCardId>,
    ) -> Option<(WagonCardId, bool)> {
        let card = self.face_up_card(index)?;
        self.ensure_face_down();
        self.wagons.draw_card(hand, Some(card), 0);
        let reset = self.replenish();

        Some((card, reset))
    }

    /// Draws up to `count` cards blind into `hand`, recycling the trash when the pile runs out.
    pub fn draw_face_down(
        &mut self,
        hand: &mut Deck<WagonCardId>,
        count: usize,
    ) -> SmallVec<[WagonCardId; 4]> {
        let mut drawn = SmallVec::new();

        for _ in 0..count {
            self.ensure_face_down();
            match self.wagons.draw_card(hand, None, 1).first() {
                Some(card) => drawn.push(*card),
                None => break,
            }
        }

        self.replenish();
        drawn
    }

    /// Takes up to `count` cards off the face-down pile without giving them to anyone.
    /// Used to reveal the surcharge of a tunnel.
    pub fn reveal_wagons(&mut self, count: usize) -> Vec<WagonCardId> {
        let mut revealed = Vec::with_capacity(count);

        for _ in 0..count {
            self.ensure_face_down();
            match self
                .wagons
                .face_down
                .as_mut()
                .and_then(|deck| deck.take_last_card())
            {
                Some(card) => revealed.push(card),
                None => break,
            }
        }

        revealed
    }

    /// Puts spent or revealed wagon cards into the trash.
    pub fn discard_wagons(&mut self, cards: impl IntoIterator<Item = WagonCardId>) {
        for card in cards {
            self.wagons.discard(card);
        }

        self.replenish();
    }

    /// Whether a second face-up draw is possible: at least one face-up card is not a locomotive.
    pub fn can_draw_face_up_again(&self) -> bool {
        self.face_up_colors()
            .iter()
            .any(|color| !color.is_locomotive())
    }

    /// Whether a face-down draw is possible, counting the trash that would be recycled.
    pub fn can_draw_face_down(&self) -> bool {
        self.wagons.count_face_down() > 0 || self.wagons.count_trash() > 0
    }

    /// Takes up to `count` tickets off the top of the regular destination pile.
    pub fn draw_destinations(&mut self, count: usize) -> SmallVec<[DestinationCardId; 3]> {
        let mut drawn = SmallVec::new();

        if let Some(face_down) = self.destinations.face_down.as_mut() {
            for _ in 0..count {
                match face_down.take_last_card() {
                    Some(card) => drawn.push(card),
                    None => break,
                }
            }
        }

        drawn
    }

    /// Returns a ticket under the regular destination pile.
    pub fn return_destination(&mut self, card: DestinationCardId) {
        if let Some(face_down) = self.destinations.face_down.as_mut() {
            face_down.put_card_back(card);
        }
    }

    #[inline]
    pub fn count_destinations(&self) -> usize {
        self.destinations.count_face_down()
    }

    fn ensure_face_down(&mut self) {
        if self.wagons.count_face_down() > 0 || self.wagons.count_trash() == 0 {
            return;
        }

        let moved = self.wagons.refill_main_deck();
        if let Some(face_down) = self.wagons.face_down.as_mut() {
            face_down.shuffle(&mut self.rng);
        }
        debug!("Recycled {} wagon cards from the trash.", moved);
    }

    fn top_up_face_up(&mut self) {
        while self.wagons.count_face_up() < self.face_up_count {
            self.ensure_face_down();
            if !self.wagons.turn_card_up() {
                break;
            }
        }
    }

    /// Keeps the face-up row full, and the face-down pile fed from the trash.
    ///
    /// Returns whether the face-up row was thrown away along the way.
    pub fn replenish(&mut self) -> bool {
        self.top_up_face_up();
        let reset = self.maybe_reset_face_up();
        self.ensure_face_down();
        reset
    }

    fn should_reset_face_up(&self) -> bool {
        let face_up = self.face_up_colors();
        let num_locomotives = face_up.iter().filter(|color| color.is_locomotive()).count();

        if num_locomotives < self.face_up_locomotive_limit {
            return false;
        }

        // Only reset if enough colored cards are left, otherwise this would never end.
        let mut num_colored = face_up.len() - num_locomotives;
        for deck in [&self.wagons.face_down, &self.wagons.trash].into_iter().flatten() {
            for card in deck.iter() {
                if self.catalog.wagon(card).map_or(false, |color| !color.is_locomotive()) {
                    num_colored += 1;
                    if num_colored >= self.face_up_locomotive_limit {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Throws the face-up row away and turns up a new one, for as long as it shows
    /// `face_up_locomotive_limit` locomotives or more.
    pub fn maybe_reset_face_up(&mut self) -> bool {
        let mut reset = false;

        for _ in 0..MAX_FACE_UP_RESETS {
            if !self.should_reset_face_up() {
                break;
            }

            let row: Vec<_> = self
                .wagons
                .face_up
                .iter()
                .flat_map(|deck| deck.iter())
                .collect();
            for card in row {
                self.wagons.trash_card(card);
            }
            self.top_up_face_up();
            reset = true;
        }

        if reset {
            debug!("Face-up row reset: {:?}.", self.face_up_colors());
        }
        reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dealer() -> CardDealer {
        let mut card_dealer = CardDealer::new(CardCatalog::europe(), &GameConfig::default(), 42);
        card_dealer.shuffle_and_lay_out();
        card_dealer
    }

    fn total_wagons(card_dealer: &CardDealer, hand: &Deck<WagonCardId>) -> usize {
        card_dealer.wagons.count_cards() + hand.count_cards()
    }

    // Tests for `WagonColor`.

    #[test]
    fn wagon_color_to_string() {
        assert_eq!(WagonColor::Orange.to_string(), "orange");
        assert_eq!(WagonColor::Locomotive.to_string(), "locomotive");
    }

    #[test]
    fn wagon_color_from_string() {
        assert_eq!(WagonColor::from_str("pink"), Ok(WagonColor::Pink));
        assert_eq!(WagonColor::from_str("wild"), Ok(WagonColor::Locomotive));
        assert!(WagonColor::from_str("gray").is_err());
    }

    #[test]
    fn wagon_color_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&WagonColor::Blue)?, r#""blue""#);
        assert_eq!(
            serde_json::to_string(&WagonColor::Locomotive)?,
            r#""locomotive""#
        );
        Ok(())
    }

    #[test]
    fn json_to_wagon_color() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<WagonColor>(r#""wild""#)?,
            WagonColor::Locomotive
        );
        assert_eq!(
            serde_json::from_str::<WagonColor>(r#""green""#)?,
            WagonColor::Green
        );
        assert!(serde_json::from_str::<WagonColor>(r#""turquoise""#).is_err());

        Ok(())
    }

    // Tests for `CardCatalog`.

    #[test]
    fn standard_wagons() {
        let mut num_cards_per_color = HashMap::new();
        for color in CardCatalog::standard_wagons() {
            *num_cards_per_color.entry(color).or_insert(0) += 1;
        }

        for color in WagonColor::iter() {
            let expected = if color.is_locomotive() { 14 } else { 12 };
            assert_eq!(num_cards_per_color[&color], expected);
        }
    }

    #[test]
    fn europe_destinations() {
        let catalog = CardCatalog::europe();
        let long = catalog.destinations().iter().filter(|card| card.long).count();

        assert_eq!(long, 6);
        assert_eq!(catalog.num_destinations() - long, 40);
        assert!(catalog
            .destinations()
            .iter()
            .all(|card| card.destination.0 != card.destination.1));
    }

    // Tests for `CardDealer`.

    #[test]
    fn new_card_dealer() {
        let card_dealer = dealer();

        assert_eq!(card_dealer.wagons.count_face_up(), 5);
        assert_eq!(card_dealer.wagons.count_cards(), 110);
        assert_eq!(card_dealer.count_destinations(), 40);
        assert_eq!(card_dealer.long_destinations.count_cards(), 6);
        assert!(
            card_dealer
                .face_up_colors()
                .iter()
                .filter(|color| color.is_locomotive())
                .count()
                < 3
        );
    }

    #[test]
    fn card_dealer_same_seed_same_deal() {
        assert_eq!(dealer().wagons, dealer().wagons);
        assert_eq!(dealer().destinations, dealer().destinations);
    }

    #[test]
    fn card_dealer_draw_face_up() {
        let mut card_dealer = dealer();
        let mut hand = Deck::new();
        let before: Vec<_> = (0..5).map(|slot| card_dealer.face_up_card(slot)).collect();

        let (card, reset) = card_dealer.draw_face_up(2, &mut hand).unwrap();

        assert_eq!(Some(card), before[2]);
        assert!(hand.contains(card));
        assert_eq!(card_dealer.wagons.count_face_up(), 5);
        if !reset {
            for slot in [0, 1, 3, 4] {
                assert_eq!(card_dealer.face_up_card(slot), before[slot]);
            }
            assert_ne!(card_dealer.face_up_card(2), Some(card));
        }
        assert_eq!(total_wagons(&card_dealer, &hand), 110);
        assert!(card_dealer.draw_face_up(5, &mut hand).is_none());
    }

    #[test]
    fn card_dealer_draw_face_down_recycles_trash() {
        let mut card_dealer = dealer();
        let mut hand = Deck::new();

        let drawn = card_dealer.draw_face_down(&mut hand, 105);
        assert_eq!(drawn.len(), 105);
        assert_eq!(card_dealer.wagons.count_face_down(), 0);

        let spent: Vec<_> = hand.iter().take(10).collect();
        for card in &spent {
            hand.take_card(*card);
        }
        card_dealer.discard_wagons(spent);

        // The trash went straight back under the face-down pile.
        assert_eq!(card_dealer.wagons.count_trash(), 0);
        assert_eq!(card_dealer.wagons.count_face_down(), 10);
        assert_eq!(card_dealer.draw_face_down(&mut hand, 1).len(), 1);
        assert_eq!(total_wagons(&card_dealer, &hand), 110);
    }

    #[test]
    fn card_dealer_draw_face_down_empty() {
        let mut card_dealer = dealer();
        let mut hand = Deck::new();

        card_dealer.draw_face_down(&mut hand, 200);
        assert_eq!(hand.count_cards(), 105);
        assert!(!card_dealer.can_draw_face_down());
        assert!(card_dealer.draw_face_down(&mut hand, 1).is_empty());
    }

    #[test]
    fn card_dealer_resets_face_up_with_three_locomotives() {
        // Unshuffled, the face-down pile is dealt from its last id down.
        let mut wagons = vec![WagonColor::Green; 10];
        wagons.extend([
            WagonColor::Red,
            WagonColor::Blue,
            WagonColor::Locomotive,
            WagonColor::Locomotive,
            WagonColor::Locomotive,
        ]);
        let mut card_dealer =
            CardDealer::new(CardCatalog::new(wagons, Vec::new()), &GameConfig::default(), 1);

        assert!(card_dealer.replenish());
        assert_eq!(card_dealer.face_up_colors(), vec![WagonColor::Green; 5]);
        assert_eq!(card_dealer.wagons.count_trash(), 5);
        for id in 10..15 {
            assert!(card_dealer
                .wagons
                .trash
                .as_ref()
                .unwrap()
                .contains(WagonCardId(id)));
        }
        assert_eq!(card_dealer.wagons.count_cards(), 15);
    }

    #[test]
    fn card_dealer_does_not_reset_without_colored_cards_left() {
        let catalog = CardCatalog::new(
            vec![
                WagonColor::Locomotive,
                WagonColor::Locomotive,
                WagonColor::Locomotive,
                WagonColor::Red,
                WagonColor::Red,
            ],
            Vec::new(),
        );
        let mut card_dealer = CardDealer::new(catalog, &GameConfig::default(), 1);
        card_dealer.shuffle_and_lay_out();

        assert_eq!(card_dealer.wagons.count_face_up(), 5);
        assert!(!card_dealer.maybe_reset_face_up());
    }

    #[test]
    fn card_dealer_can_draw_face_up_again() {
        let catalog = CardCatalog::new(
            vec![WagonColor::Locomotive, WagonColor::Locomotive, WagonColor::Blue],
            Vec::new(),
        );
        let mut card_dealer = CardDealer::new(catalog, &GameConfig::default(), 1);
        card_dealer.shuffle_and_lay_out();
        assert!(card_dealer.can_draw_face_up_again());

        let index = card_dealer
            .face_up_colors()
            .iter()
            .position(|color| *color == WagonColor::Blue)
            .unwrap();
        let mut hand = Deck::new();
        card_dealer.draw_face_up(index, &mut hand);

        assert!(!card_dealer.can_draw_face_up_again());
    }

    #[test]
    fn card_dealer_reveal_wagons() {
        let mut card_dealer = dealer();
        let revealed = card_dealer.reveal_wagons(3);

        assert_eq!(revealed.len(), 3);
        assert_eq!(card_dealer.wagons.count_cards(), 107);
        for card in &revealed {
            assert!(!card_dealer.wagons.iter().any(|other| other == *card));
        }

        card_dealer.discard_wagons(revealed);
        assert_eq!(card_dealer.wagons.count_cards(), 110);
    }

    #[test]
    fn card_dealer_draw_destinations() {
        let mut card_dealer = dealer();

        let drawn = card_dealer.draw_destinations(3);
        assert_eq!(drawn.len(), 3);
        assert_eq!(card_dealer.count_destinations(), 37);
        assert!(drawn
            .iter()
            .all(|id| !card_dealer.destination(*id).unwrap().long));

        card_dealer.return_destination(drawn[0]);
        assert_eq!(
            card_dealer.destinations.face_down.as_ref().unwrap().get(0),
            Some(drawn[0])
        );
    }

    #[test]
    fn card_dealer_draw_destinations_partial() {
        let mut card_dealer = dealer();

        assert_eq!(card_dealer.draw_destinations(39).len(), 39);
        assert_eq!(card_dealer.draw_destinations(3).len(), 1);
        assert!(card_dealer.draw_destinations(3).is_empty());
    }
}
