use rand::seq::SliceRandom;
use rand::Rng;
use log::warn;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// An ordered, duplicate-free pile of card references.
///
/// Draws and discards happen at the tail: the last card of the deck is its top.
///
/// # JSON
/// A deck is serialized as the plain array of its cards, bottom first.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Deck<T> {
    cards: VecDeque<T>,
}

/// The cards laid out for everyone to pick from.
pub type FaceUpCards<T> = Deck<T>;
/// The hidden draw pile.
pub type FaceDownCards<T> = Deck<T>;
/// Discarded cards, recycled into the draw pile once it runs out.
pub type Trash<T> = Deck<T>;
/// Cards removed from play for the rest of the game.
pub type OutOfGame<T> = Deck<T>;

impl<T: Copy + PartialEq> Deck<T> {
    /// Creates an empty deck.
    pub fn new() -> Self {
        Self {
            cards: VecDeque::new(),
        }
    }

    /// Creates a deck holding the given cards, in order. Duplicates are dropped.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::deck::Deck;
    ///
    /// let deck = Deck::from_cards([1, 2, 2, 3]);
    /// assert_eq!(deck.count_cards(), 3);
    /// ```
    pub fn from_cards(cards: impl IntoIterator<Item = T>) -> Self {
        let mut deck = Self::new();
        for card in cards {
            deck.add_card(card);
        }
        deck
    }

    /// Appends a card at the top of the deck.
    ///
    /// Returns `false` (and leaves the deck untouched) if the card is already in it.
    pub fn add_card(&mut self, card: T) -> bool {
        if self.contains(card) {
            return false;
        }

        self.cards.push_back(card);
        true
    }

    /// Puts a card at `index` (0 being the bottom of the deck), or on top past the end.
    ///
    /// Returns `false` (and leaves the deck untouched) if the card is already in it.
    pub fn insert_card(&mut self, index: usize, card: T) -> bool {
        if self.contains(card) {
            return false;
        }

        self.cards.insert(index.min(self.cards.len()), card);
        true
    }

    /// Removes the card at `index` (0 being the bottom of the deck).
    ///
    /// Returns `None` if the index is out of range.
    pub fn remove_card(&mut self, index: usize) -> Option<T> {
        self.cards.remove(index)
    }

    /// Removes a specific card, wherever it is in the deck.
    pub fn take_card(&mut self, card: T) -> Option<T> {
        let index = self.position(card)?;
        self.cards.remove(index)
    }

    /// Slips a card under the deck.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::deck::Deck;
    ///
    /// let mut deck = Deck::from_cards([1, 2]);
    /// deck.put_card_back(3);
    /// assert_eq!(deck.take_last_card(), Some(2));
    /// assert_eq!(deck.get(0), Some(3));
    /// ```
    pub fn put_card_back(&mut self, card: T) -> bool {
        if self.contains(card) {
            return false;
        }

        self.cards.push_front(card);
        true
    }

    /// Pops the card at the top of the deck, if any.
    pub fn take_last_card(&mut self) -> Option<T> {
        self.cards.pop_back()
    }

    /// Uniformly permutes the deck.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle_cards(self.cards.make_contiguous(), rng);
    }

    /// Moves every card out of the deck, bottom first.
    pub fn drain_cards(&mut self) -> Vec<T> {
        self.cards.drain(..).collect()
    }

    #[inline]
    pub fn count_cards(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    pub fn contains(&self, card: T) -> bool {
        self.cards.contains(&card)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        self.cards.get(index).copied()
    }

    pub fn position(&self, card: T) -> Option<usize> {
        self.cards.iter().position(|other| *other == card)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.cards.iter().copied()
    }
}

/// Uniformly permutes a raw collection of cards.
pub fn shuffle_cards<T, R: Rng + ?Sized>(cards: &mut [T], rng: &mut R) {
    cards.shuffle(rng);
}

/// The piles of one card type that are shared by all players.
///
/// Not every card type uses every pile: destination tickets only ever have a face-down pile.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDeck<T> {
    pub trash: Option<Trash<T>>,
    pub face_up: Option<FaceUpCards<T>>,
    pub face_down: Option<FaceDownCards<T>>,
}

impl<T: Copy + PartialEq> SharedDeck<T> {
    /// A shared deck using all three piles, with every card starting face-down.
    pub fn with_all_piles(cards: impl IntoIterator<Item = T>) -> Self {
        Self {
            trash: Some(Deck::new()),
            face_up: Some(Deck::new()),
            face_down: Some(Deck::from_cards(cards)),
        }
    }

    /// A shared deck made of a single face-down pile.
    pub fn face_down_only(cards: impl IntoIterator<Item = T>) -> Self {
        Self {
            trash: None,
            face_up: None,
            face_down: Some(Deck::from_cards(cards)),
        }
    }

    /// Moves the top face-down card to the end of the face-up row.
    ///
    /// Returns `false` if there was nothing to turn up.
    pub fn turn_card_up(&mut self) -> bool {
        self.turn_card_up_at(self.count_face_up())
    }

    /// Moves the top face-down card into `slot` of the face-up row.
    pub fn turn_card_up_at(&mut self, slot: usize) -> bool {
        let (Some(face_down), Some(face_up)) = (self.face_down.as_mut(), self.face_up.as_mut())
        else {
            return false;
        };

        match face_down.take_last_card() {
            Some(card) => {
                let added = face_up.insert_card(slot, card);
                if !added {
                    warn!("A card turned up was already face-up, it was dropped.");
                }
                added
            }
            None => false,
        }
    }

    /// Moves a specific face-up card to the trash.
    pub fn trash_card(&mut self, card: T) -> bool {
        let (Some(face_up), Some(trash)) = (self.face_up.as_mut(), self.trash.as_mut()) else {
            return false;
        };

        match face_up.take_card(card) {
            Some(card) => trash.add_card(card),
            None => false,
        }
    }

    /// Moves the whole trash into the face-down pile.
    ///
    /// Returns how many cards were moved.
    pub fn refill_main_deck(&mut self) -> usize {
        let (Some(trash), Some(face_down)) = (self.trash.as_mut(), self.face_down.as_mut()) else {
            return 0;
        };

        let mut moved = 0;
        for card in trash.drain_cards() {
            if face_down.add_card(card) {
                moved += 1;
            } else {
                warn!("A trashed card was already face-down, it was dropped.");
            }
        }
        moved
    }

    /// Draws into `hand`, in one of two modes:
    ///
    /// * `card` is set: that specific card is taken out of the face-up row, and its slot is
    ///   replenished from the face-down pile.
    /// * `card` is `None`: `face_down_count` cards are drawn blind from the top of the face-down pile.
    ///
    /// Returns the cards that made it into the hand.
    pub fn draw_card(
        &mut self,
        hand: &mut Deck<T>,
        card: Option<T>,
        face_down_count: usize,
    ) -> SmallVec<[T; 4]> {
        let mut drawn = SmallVec::new();

        match card {
            Some(card) => {
                let taken = self.face_up.as_mut().and_then(|face_up| {
                    let slot = face_up.position(card)?;
                    face_up.remove_card(slot).map(|card| (slot, card))
                });
                if let Some((slot, card)) = taken {
                    hand.add_card(card);
                    drawn.push(card);
                    self.turn_card_up_at(slot);
                }
            }
            None => {
                if let Some(face_down) = self.face_down.as_mut() {
                    for _ in 0..face_down_count {
                        match face_down.take_last_card() {
                            Some(card) => {
                                hand.add_card(card);
                                drawn.push(card);
                            }
                            None => break,
                        }
                    }
                }
            }
        }

        drawn
    }

    /// Drops a card straight into the trash (e.g. cards spent by a player).
    pub fn discard(&mut self, card: T) -> bool {
        self.trash
            .as_mut()
            .map(|trash| trash.add_card(card))
            .unwrap_or(false)
    }

    pub fn count_face_up(&self) -> usize {
        self.face_up.as_ref().map(Deck::count_cards).unwrap_or(0)
    }

    pub fn count_face_down(&self) -> usize {
        self.face_down.as_ref().map(Deck::count_cards).unwrap_or(0)
    }

    pub fn count_trash(&self) -> usize {
        self.trash.as_ref().map(Deck::count_cards).unwrap_or(0)
    }

    /// How many cards sit in the three piles combined.
    pub fn count_cards(&self) -> usize {
        self.count_face_up() + self.count_face_down() + self.count_trash()
    }

    /// Iterates over the cards of all three piles.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        [&self.trash, &self.face_up, &self.face_down]
            .into_iter()
            .flatten()
            .flat_map(|deck| deck.iter())
    }
}
