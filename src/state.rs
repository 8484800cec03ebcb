use crate::card::{CardCatalog, CardDealer, DestinationCardId};
use crate::config::{GameConfig, MAX_PLAYERS, MIN_PLAYERS};
use crate::error::GameError;
use crate::map::Map;
use crate::player::{Player, PlayerColor};

use log::info;
use serde::Serialize;
use strum::IntoEnumIterator;

/// Breakdown of a player's final score.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScore {
    pub player: usize,
    /// Points gained by claiming roads.
    pub score: u32,
    /// Points of completed destination tickets.
    pub destinations: u32,
    /// Bonus for stations left unbuilt.
    pub wagon_points: u32,
    pub total: u32,
}

/// The whole mutable state of a game: map, cards and players.
#[derive(Clone, Debug)]
pub struct GameState {
    pub map: Map,
    pub cards: CardDealer,
    pub players: Vec<Player>,
    pub config: GameConfig,
    /// Whether starting hands were dealt already.
    pub dealt: bool,
}

/// `Player1`, `Player2`, ...
pub fn default_player_names(num_players: usize) -> Vec<String> {
    (1..=num_players)
        .map(|index| format!("Player{}", index))
        .collect()
}

impl GameState {
    /// Returns an `Err` if the number of players is not supported.
    pub fn new(
        map: Map,
        cards: CardDealer,
        players: Vec<Player>,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(GameError::InvalidPayload(format!(
                "A game needs between {} and {} players, not {}.",
                MIN_PLAYERS,
                MAX_PLAYERS,
                players.len()
            )));
        }

        Ok(Self {
            map,
            cards,
            players,
            config,
            dealt: false,
        })
    }

    /// A fresh game on the Europe board. Players get colors in order.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::config::GameConfig;
    /// use ticket_to_ride_europe::state::{default_player_names, GameState};
    ///
    /// let state = GameState::europe(default_player_names(3), GameConfig::default(), 7).unwrap();
    /// assert_eq!(state.party_size(), 3);
    /// assert_eq!(state.players[2].name, "Player3");
    ///
    /// assert!(GameState::europe(default_player_names(6), GameConfig::default(), 7).is_err());
    /// ```
    pub fn europe(names: Vec<String>, config: GameConfig, seed: u64) -> Result<Self, GameError> {
        let players = names
            .into_iter()
            .zip(PlayerColor::iter())
            .map(|(name, color)| Player::new(name, color, &config))
            .collect::<Vec<_>>();
        if players.len() > MAX_PLAYERS {
            return Err(GameError::InvalidPayload(format!(
                "A game needs between {} and {} players.",
                MIN_PLAYERS, MAX_PLAYERS
            )));
        }

        let cards = CardDealer::new(CardCatalog::europe(), &config, seed);
        Self::new(Map::europe(), cards, players, config)
    }

    #[inline]
    pub fn party_size(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, index: usize) -> Result<&Player, GameError> {
        self.players.get(index).ok_or(GameError::MissingState("player"))
    }

    pub fn player_mut(&mut self, index: usize) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(index)
            .ok_or(GameError::MissingState("player"))
    }

    /// Shuffles every pile, then deals starting hands: one long ticket, the regular tickets and
    /// the wagon cards. Long tickets nobody got leave the game.
    pub fn deal(&mut self) {
        self.cards.shuffle_and_lay_out();

        for player in &mut self.players {
            if let Some(ticket) = self.cards.long_destinations.take_last_card() {
                player.hand.destinations.add_card(ticket);
            }
        }
        for ticket in self.cards.long_destinations.drain_cards() {
            self.cards.out_of_game.add_card(ticket);
        }

        for player in &mut self.players {
            for ticket in self
                .cards
                .draw_destinations(self.config.starting_destinations)
            {
                player.hand.destinations.add_card(ticket);
            }
            self.cards
                .draw_face_down(&mut player.hand.wagons, self.config.starting_wagon_cards);
        }

        self.dealt = true;
        info!(
            "Dealt starting hands to {} players; {} long tickets left the game.",
            self.players.len(),
            self.cards.out_of_game.count_cards()
        );
    }

    /// How many stations a player has on the map.
    pub fn stations_placed(&self, player: usize) -> usize {
        self.map
            .stations()
            .iter()
            .filter(|station| station.owner == Some(player))
            .count()
    }

    /// Moves every ticket the player fulfilled from their hand to their completed tickets.
    ///
    /// Returns the tickets that were just completed.
    pub fn complete_destinations(&mut self, player: usize) -> Vec<DestinationCardId> {
        let Some(current) = self.players.get_mut(player) else {
            return Vec::new();
        };

        let reached: Vec<_> = current
            .hand
            .destinations
            .iter()
            .filter(|id| {
                self.cards.destination(*id).map_or(false, |ticket| {
                    self.map.is_destination_reached(
                        player,
                        &current.borrowed_roads,
                        ticket.destination,
                    )
                })
            })
            .collect();

        for id in &reached {
            current.hand.destinations.take_card(*id);
            current.completed_destinations.push(*id);
        }

        reached
    }

    /// Points of the tickets a player completed.
    pub fn destination_points(&self, player: usize) -> u32 {
        self.players.get(player).map_or(0, |player| {
            player
                .completed_destinations
                .iter()
                .filter_map(|id| self.cards.destination(*id))
                .map(|ticket| ticket.points as u32)
                .sum()
        })
    }

    /// Final scores, in seat order.
    pub fn final_scores(&self) -> Vec<FinalScore> {
        self.players
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let destinations = self.destination_points(index);
                let wagon_points = self.config.station_points * player.stations as u32;
                FinalScore {
                    player: index,
                    score: player.score,
                    destinations,
                    wagon_points,
                    total: player.score + destinations + wagon_points,
                }
            })
            .collect()
    }

    /// The seat with the highest total. The first one wins ties.
    pub fn winner(&self) -> Option<FinalScore> {
        self.final_scores()
            .into_iter()
            .fold(None, |best: Option<FinalScore>, score| match best {
                Some(best) if best.total >= score.total => Some(best),
                _ => Some(score),
            })
    }

    /// Wagon cards in piles and hands. Stays equal to the catalog size between commands.
    pub fn count_wagon_cards(&self) -> usize {
        self.cards.wagons.count_cards()
            + self
                .players
                .iter()
                .map(|player| player.hand.wagons.count_cards())
                .sum::<usize>()
    }

    /// Destination tickets in piles, hands and completed tickets.
    pub fn count_destination_cards(&self) -> usize {
        self.cards.destinations.count_cards()
            + self.cards.long_destinations.count_cards()
            + self.cards.out_of_game.count_cards()
            + self
                .players
                .iter()
                .map(|player| {
                    player.hand.destinations.count_cards() + player.completed_destinations.len()
                })
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::City;
    use crate::map::RoadId;
    use pretty_assertions::assert_eq;

    fn state(num_players: usize) -> GameState {
        GameState::europe(default_player_names(num_players), GameConfig::default(), 42).unwrap()
    }

    #[test]
    fn state_player_count() {
        assert!(GameState::europe(default_player_names(1), GameConfig::default(), 1).is_err());
        assert!(GameState::europe(default_player_names(2), GameConfig::default(), 1).is_ok());
        assert!(GameState::europe(default_player_names(5), GameConfig::default(), 1).is_ok());
        assert!(GameState::europe(default_player_names(6), GameConfig::default(), 1).is_err());
    }

    #[test]
    fn state_players() {
        let state = state(3);

        assert_eq!(
            state
                .players
                .iter()
                .map(|player| (player.name.as_str(), player.color))
                .collect::<Vec<_>>(),
            vec![
                ("Player1", PlayerColor::Black),
                ("Player2", PlayerColor::Blue),
                ("Player3", PlayerColor::Green)
            ]
        );
        assert!(state.player(3).is_err());
    }

    #[test]
    fn state_deal() {
        let mut state = state(4);
        state.deal();

        assert!(state.dealt);
        for player in &state.players {
            assert_eq!(player.hand.wagons.count_cards(), 4);
            assert_eq!(player.hand.destinations.count_cards(), 4);
            let long = player
                .hand
                .destinations
                .iter()
                .filter(|id| state.cards.destination(*id).unwrap().long)
                .count();
            assert_eq!(long, 1);
        }
        assert_eq!(state.cards.out_of_game.count_cards(), 2);
        assert!(state.cards.long_destinations.is_empty());
        assert_eq!(state.cards.wagons.count_face_up(), 5);
        assert_eq!(state.count_wagon_cards(), 110);
        assert_eq!(state.count_destination_cards(), 46);
    }

    #[test]
    fn state_complete_destinations() {
        let mut state = state(2);
        let ticket = state
            .cards
            .destinations
            .iter()
            .find(|id| {
                state.cards.destination(*id).unwrap().destination
                    == (City::Paris.into(), City::Wien.into())
            })
            .unwrap();
        state.players[0].hand.destinations.add_card(ticket);

        assert!(state.complete_destinations(0).is_empty());

        // Paris - Frankfurt - Munchen - Wien.
        for (a, b) in [
            (City::Paris, City::Frankfurt),
            (City::Frankfurt, City::Munchen),
            (City::Munchen, City::Wien),
        ] {
            let road = state.map.roads_between(a.into(), b.into()).next().unwrap().id;
            state.map.claim_road(2, road, 0).unwrap();
        }

        assert_eq!(state.complete_destinations(0), vec![ticket]);
        assert!(state.players[0].hand.destinations.is_empty());
        assert_eq!(state.players[0].completed_destinations, vec![ticket]);
        assert_eq!(
            state.destination_points(0),
            state.cards.destination(ticket).unwrap().points as u32
        );
    }

    #[test]
    fn state_final_scores() {
        let mut state = state(3);
        state.players[0].score = 10;
        state.players[0].stations = 1;
        state.players[1].score = 18;
        state.players[1].stations = 0;
        state.players[2].score = 6;
        state.players[2].stations = 3;

        let totals: Vec<_> = state.final_scores().iter().map(|score| score.total).collect();
        assert_eq!(totals, vec![14, 18, 18]);

        // First maximum in seat order.
        assert_eq!(state.winner().map(|score| score.player), Some(1));
    }

    #[test]
    fn state_stations_placed() {
        let mut state = state(2);
        assert_eq!(state.stations_placed(0), 0);

        state.map.claim_station(City::Roma.into(), 0).unwrap();
        state.map.claim_station(City::Wien.into(), 1).unwrap();
        state.map.claim_station(City::Riga.into(), 0).unwrap();

        assert_eq!(state.stations_placed(0), 2);
        assert_eq!(state.stations_placed(1), 1);
        assert!(state.map.road(RoadId(0)).unwrap().owner.is_none());
    }
}
