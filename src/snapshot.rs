//! JSON snapshots of a game, to save it and resume it later.
//!
//! A snapshot has three mandatory sections, `players`, `map` and `cards`, and two optional
//! ones, `turn` (the [`TurnContext`]) and `config` (the [`GameConfig`]).
//!
//! Cards are identified by their index in the `cards.wagons` and `cards.destinations` lists.
//! Each player points at their hand in `cards.hands` through `hand`; inline
//! `destinationCards`/`wagonCards` arrays are accepted as well.
//!
//! Stations can be referred to by id or by name. Roads can be referred to by id, or by a
//! descriptor such as `{"from": "Paris", "to": "Frankfurt", "color": "white"}`, where `slot`
//! picks among parallel roads that still match.

use crate::card::{
    CardCatalog, CardDealer, DestinationCard, DestinationCardId, WagonCardId, WagonColor,
};
use crate::config::GameConfig;
use crate::context::TurnContext;
use crate::controller::Controller;
use crate::deck::Deck;
use crate::engine::Engine;
use crate::error::GameError;
use crate::map::{Map, Road, RoadId, RoadKind, Station, StationId};
use crate::player::{Player, PlayerCards, PlayerColor};
use crate::state::GameState;

use log::info;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown station `{0}`.")]
    UnknownStation(String),
    #[error("No road matches {0}.")]
    UnknownRoad(String),
    #[error("Malformed snapshot: {0}")]
    Malformed(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

/// A station, by id or by name.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StationRef {
    Id(StationId),
    Name(String),
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadType {
    #[default]
    Road,
    Tunnel,
    Ferry,
}

impl RoadType {
    fn matches(&self, kind: RoadKind) -> bool {
        *self == RoadType::from(kind)
    }
}

impl From<RoadKind> for RoadType {
    fn from(kind: RoadKind) -> Self {
        match kind {
            RoadKind::Plain => RoadType::Road,
            RoadKind::Tunnel => RoadType::Tunnel,
            RoadKind::Ferry { .. } => RoadType::Ferry,
        }
    }
}

/// Picks a road among the ones linking two stations. Unset fields match anything.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoadDescriptor {
    pub from: StationRef,
    pub to: StationRef,
    #[serde(rename = "type", default)]
    pub kind: Option<RoadType>,
    #[serde(default)]
    pub length: Option<u8>,
    /// `gray` matches gray roads only.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub locomotives: Option<u8>,
    /// Position among the roads left after filtering.
    #[serde(default)]
    pub slot: usize,
}

/// A road, by id or by descriptor.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoadRef {
    Id(RoadId),
    Keyed { id: RoadId },
    Descriptor(RoadDescriptor),
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRecord {
    name: String,
    #[serde(default)]
    color: Option<PlayerColor>,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    wagons: Option<u8>,
    #[serde(default)]
    stations: Option<u8>,
    /// Index into `cards.hands`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hand: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    destination_cards: Vec<DestinationCardId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    wagon_cards: Vec<WagonCardId>,
    #[serde(default)]
    borrowed_roads: Vec<RoadRef>,
    #[serde(default)]
    completed_destinations: Vec<DestinationCardId>,
}

#[derive(Debug, Deserialize, Serialize)]
struct StationRecord {
    #[serde(default)]
    id: Option<StationId>,
    name: String,
    #[serde(default)]
    owner: Option<usize>,
    #[serde(default)]
    blocked: bool,
}

#[derive(Debug, Deserialize, Serialize)]
struct RoadRecord {
    #[serde(default)]
    id: Option<RoadId>,
    from: StationRef,
    to: StationRef,
    #[serde(rename = "type", default)]
    kind: RoadType,
    length: u8,
    /// Absent or `gray` for gray roads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default)]
    locomotives: u8,
    #[serde(default)]
    owner: Option<usize>,
    #[serde(default)]
    blocked: bool,
}

#[derive(Debug, Deserialize, Serialize)]
struct MapRecord {
    stations: Vec<StationRecord>,
    roads: Vec<RoadRecord>,
}

#[derive(Debug, Deserialize, Serialize)]
struct DestinationRecord {
    from: StationRef,
    to: StationRef,
    points: u8,
    #[serde(default)]
    long: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardsRecord {
    /// Color of every wagon card, by id. Defaults to the standard 110 cards.
    #[serde(default = "CardCatalog::standard_wagons")]
    wagons: Vec<WagonColor>,
    destinations: Vec<DestinationRecord>,
    #[serde(default)]
    face_up: Vec<WagonCardId>,
    #[serde(default)]
    face_down: Vec<WagonCardId>,
    #[serde(default)]
    trash: Vec<WagonCardId>,
    #[serde(default)]
    destination_deck: Vec<DestinationCardId>,
    #[serde(default)]
    long_destinations: Vec<DestinationCardId>,
    #[serde(default)]
    out_of_game: Vec<DestinationCardId>,
    #[serde(default)]
    hands: Vec<PlayerCards>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Snapshot {
    players: Vec<PlayerRecord>,
    map: MapRecord,
    cards: CardsRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    turn: Option<TurnContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<GameConfig>,
}

fn resolve_station(stations: &[Station], station: &StationRef) -> Result<StationId, SnapshotError> {
    match station {
        StationRef::Id(id) => stations
            .get(id.0)
            .map(|station| station.id)
            .ok_or_else(|| SnapshotError::UnknownStation(id.to_string())),
        StationRef::Name(name) => stations
            .iter()
            .find(|station| station.name.eq_ignore_ascii_case(name.trim()))
            .map(|station| station.id)
            .ok_or_else(|| SnapshotError::UnknownStation(name.clone())),
    }
}

/// `None` for gray roads.
fn parse_road_color(color: Option<&str>) -> Result<Option<WagonColor>, SnapshotError> {
    match color.map(str::trim) {
        None => Ok(None),
        Some(color) if color.eq_ignore_ascii_case("gray") || color.eq_ignore_ascii_case("grey") => {
            Ok(None)
        }
        Some(color) => WagonColor::from_str(&color.to_lowercase())
            .map(Some)
            .map_err(|_| SnapshotError::Malformed(format!("unknown color `{}`", color))),
    }
}

/// Finds the road a reference points at.
pub fn resolve_road(map: &Map, road: &RoadRef) -> Result<RoadId, SnapshotError> {
    match road {
        RoadRef::Id(id) | RoadRef::Keyed { id } => map
            .road(*id)
            .map(|road| road.id)
            .ok_or_else(|| SnapshotError::UnknownRoad(format!("id {}", id))),
        RoadRef::Descriptor(descriptor) => {
            let from = resolve_station(map.stations(), &descriptor.from)?;
            let to = resolve_station(map.stations(), &descriptor.to)?;
            let color = match &descriptor.color {
                Some(color) => Some(parse_road_color(Some(color))?),
                None => None,
            };

            map.roads_between(from, to)
                .filter(|road| descriptor.kind.map_or(true, |kind| kind.matches(road.kind)))
                .filter(|road| descriptor.length.map_or(true, |length| length == road.length))
                .filter(|road| color.map_or(true, |color| color == road.color))
                .filter(|road| {
                    descriptor
                        .locomotives
                        .map_or(true, |locomotives| locomotives == road.locomotives())
                })
                .nth(descriptor.slot)
                .map(|road| road.id)
                .ok_or_else(|| {
                    SnapshotError::UnknownRoad(format!(
                        "{} - {} (slot {})",
                        map.station_name(from),
                        map.station_name(to),
                        descriptor.slot
                    ))
                })
        }
    }
}

fn check_owner(owner: Option<usize>, num_players: usize) -> Result<Option<usize>, SnapshotError> {
    match owner {
        Some(owner) if owner >= num_players => Err(SnapshotError::Malformed(format!(
            "owner {} is not a player",
            owner
        ))),
        _ => Ok(owner),
    }
}

impl MapRecord {
    fn into_map(self, num_players: usize) -> Result<Map, SnapshotError> {
        let mut stations = Vec::with_capacity(self.stations.len());
        for (index, record) in self.stations.into_iter().enumerate() {
            if record.id.map_or(false, |id| id.0 != index) {
                return Err(SnapshotError::Malformed(format!(
                    "station `{}` is listed at position {} but has another id",
                    record.name, index
                )));
            }
            let mut station = Station::new(StationId(index), record.name);
            station.owner = check_owner(record.owner, num_players)?;
            station.blocked = record.blocked;
            stations.push(station);
        }

        let mut roads = Vec::with_capacity(self.roads.len());
        for (index, record) in self.roads.into_iter().enumerate() {
            if record.id.map_or(false, |id| id.0 != index) {
                return Err(SnapshotError::Malformed(format!(
                    "road listed at position {} has another id",
                    index
                )));
            }
            let ends = (
                resolve_station(&stations, &record.from)?,
                resolve_station(&stations, &record.to)?,
            );
            let kind = match record.kind {
                RoadType::Road => RoadKind::Plain,
                RoadType::Tunnel => RoadKind::Tunnel,
                RoadType::Ferry => RoadKind::Ferry {
                    locomotives: record.locomotives,
                },
            };
            let color = parse_road_color(record.color.as_deref())?;

            let mut road = Road::new(RoadId(index), ends, color, record.length, kind);
            road.owner = check_owner(record.owner, num_players)?;
            road.blocked = record.blocked;
            roads.push(road);
        }

        Ok(Map::new(stations, roads)?)
    }

    fn from_map(map: &Map) -> Self {
        Self {
            stations: map
                .stations()
                .iter()
                .map(|station| StationRecord {
                    id: Some(station.id),
                    name: station.name.clone(),
                    owner: station.owner,
                    blocked: station.blocked,
                })
                .collect(),
            roads: map
                .roads()
                .iter()
                .map(|road| RoadRecord {
                    id: Some(road.id),
                    from: StationRef::Id(road.stations.0),
                    to: StationRef::Id(road.stations.1),
                    kind: RoadType::from(road.kind),
                    length: road.length,
                    color: road.color.map(|color| color.to_string()),
                    locomotives: road.locomotives(),
                    owner: road.owner,
                    blocked: road.blocked,
                })
                .collect(),
        }
    }
}

/// Every id below `total` must show up exactly once.
fn check_conservation(
    kind: &str,
    total: usize,
    ids: impl IntoIterator<Item = usize>,
) -> Result<(), SnapshotError> {
    let mut seen = vec![false; total];

    for id in ids {
        match seen.get_mut(id) {
            None => {
                return Err(SnapshotError::Malformed(format!(
                    "{} #{} does not exist",
                    kind, id
                )))
            }
            Some(true) => {
                return Err(SnapshotError::Malformed(format!(
                    "{} #{} shows up more than once",
                    kind, id
                )))
            }
            Some(slot) => *slot = true,
        }
    }

    match seen.iter().position(|seen| !seen) {
        Some(missing) => Err(SnapshotError::Malformed(format!(
            "{} #{} is missing",
            kind, missing
        ))),
        None => Ok(()),
    }
}

impl Snapshot {
    fn into_parts(self, seed: u64) -> Result<(GameState, TurnContext), SnapshotError> {
        let config = self.config.unwrap_or_default();
        let num_players = self.players.len();
        let map = self.map.into_map(num_players)?;

        let mut destinations = Vec::with_capacity(self.cards.destinations.len());
        for record in &self.cards.destinations {
            destinations.push(DestinationCard {
                destination: (
                    resolve_station(map.stations(), &record.from)?,
                    resolve_station(map.stations(), &record.to)?,
                ),
                points: record.points,
                long: record.long,
            });
        }
        let catalog = CardCatalog::new(self.cards.wagons.clone(), destinations);

        let mut hands_used = vec![false; self.cards.hands.len()];
        let mut players = Vec::with_capacity(num_players);
        for (index, record) in self.players.into_iter().enumerate() {
            let color = record
                .color
                .or_else(|| PlayerColor::iter().nth(index))
                .ok_or_else(|| {
                    SnapshotError::Malformed(format!("player `{}` has no color", record.name))
                })?;
            let mut player = Player::new(record.name, color, &config);
            player.score = record.score;
            player.wagons = record.wagons.unwrap_or(config.wagons);
            player.stations = record.stations.unwrap_or(config.stations);

            player.hand = match record.hand {
                Some(hand) => match hands_used.get(hand).copied() {
                    Some(false) => {
                        hands_used[hand] = true;
                        self.cards.hands[hand].clone()
                    }
                    Some(true) => {
                        return Err(SnapshotError::Malformed(format!(
                            "hand {} is shared by several players",
                            hand
                        )))
                    }
                    None => {
                        return Err(SnapshotError::Malformed(format!(
                            "hand {} does not exist",
                            hand
                        )))
                    }
                },
                None => PlayerCards {
                    destinations: Deck::from_cards(record.destination_cards),
                    wagons: Deck::from_cards(record.wagon_cards),
                },
            };

            for road in &record.borrowed_roads {
                player.borrowed_roads.push(resolve_road(&map, road)?);
            }
            player.completed_destinations = record.completed_destinations;
            players.push(player);
        }

        let context = self
            .turn
            .unwrap_or_else(|| TurnContext::new(config.min_keep_tickets));
        if context.current_player >= num_players {
            return Err(SnapshotError::Malformed(format!(
                "current player {} is not a player",
                context.current_player
            )));
        }
        let revealed = context
            .pending_tunnel
            .iter()
            .flat_map(|tunnel| tunnel.revealed.iter().copied());

        let cards = &self.cards;
        check_conservation(
            "wagon card",
            catalog.num_wagons(),
            cards
                .face_up
                .iter()
                .chain(&cards.face_down)
                .chain(&cards.trash)
                .copied()
                .chain(players.iter().flat_map(|player| player.hand.wagons.iter()))
                .chain(revealed)
                .map(|id| id.0),
        )?;
        check_conservation(
            "destination ticket",
            catalog.num_destinations(),
            cards
                .destination_deck
                .iter()
                .chain(&cards.long_destinations)
                .chain(&cards.out_of_game)
                .copied()
                .chain(players.iter().flat_map(|player| {
                    player
                        .hand
                        .destinations
                        .iter()
                        .chain(player.completed_destinations.iter().copied())
                }))
                .chain(context.pending_tickets.offered.iter().copied())
                .map(|id| id.0),
        )?;

        let mut dealer = CardDealer::empty(catalog, &config, seed);
        dealer.wagons.face_up = Some(Deck::from_cards(cards.face_up.iter().copied()));
        dealer.wagons.face_down = Some(Deck::from_cards(cards.face_down.iter().copied()));
        dealer.wagons.trash = Some(Deck::from_cards(cards.trash.iter().copied()));
        dealer.destinations.face_down =
            Some(Deck::from_cards(cards.destination_deck.iter().copied()));
        dealer.long_destinations = Deck::from_cards(cards.long_destinations.iter().copied());
        dealer.out_of_game = Deck::from_cards(cards.out_of_game.iter().copied());

        let mut state = GameState::new(map, dealer, players, config)?;
        state.dealt = true;
        Ok((state, context))
    }

    fn from_engine(state: &GameState, context: &TurnContext) -> Self {
        let catalog = state.cards.catalog();
        let wagons = &state.cards.wagons;
        let pile = |deck: &Option<Deck<WagonCardId>>| {
            deck.iter().flat_map(|deck| deck.iter()).collect::<Vec<_>>()
        };

        Self {
            players: state
                .players
                .iter()
                .enumerate()
                .map(|(index, player)| PlayerRecord {
                    name: player.name.clone(),
                    color: Some(player.color),
                    score: player.score,
                    wagons: Some(player.wagons),
                    stations: Some(player.stations),
                    hand: Some(index),
                    destination_cards: Vec::new(),
                    wagon_cards: Vec::new(),
                    borrowed_roads: player
                        .borrowed_roads
                        .iter()
                        .map(|road| RoadRef::Id(*road))
                        .collect(),
                    completed_destinations: player.completed_destinations.clone(),
                })
                .collect(),
            map: MapRecord::from_map(&state.map),
            cards: CardsRecord {
                wagons: catalog.wagons().to_vec(),
                destinations: catalog
                    .destinations()
                    .iter()
                    .map(|ticket| DestinationRecord {
                        from: StationRef::Id(ticket.destination.0),
                        to: StationRef::Id(ticket.destination.1),
                        points: ticket.points,
                        long: ticket.long,
                    })
                    .collect(),
                face_up: pile(&wagons.face_up),
                face_down: pile(&wagons.face_down),
                trash: pile(&wagons.trash),
                destination_deck: state
                    .cards
                    .destinations
                    .face_down
                    .iter()
                    .flat_map(|deck| deck.iter())
                    .collect(),
                long_destinations: state.cards.long_destinations.iter().collect(),
                out_of_game: state.cards.out_of_game.iter().collect(),
                hands: state
                    .players
                    .iter()
                    .map(|player| player.hand.clone())
                    .collect(),
            },
            turn: Some(context.clone()),
            config: Some(state.config.clone()),
        }
    }
}

impl Engine {
    /// Resumes a saved game. The game goes on at the start of the saved current player's turn
    /// once [`Engine::start`] is called.
    pub fn load(
        json: &str,
        controllers: Vec<Box<dyn Controller>>,
        seed: u64,
    ) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        let (state, context) = snapshot.into_parts(seed)?;
        info!(
            "Loaded a game of {} players on a map of {} stations.",
            state.party_size(),
            state.map.stations().len()
        );

        Ok(Engine::new(state, controllers)?.with_context(context))
    }

    /// Saves the game in the format [`Engine::load`] reads.
    pub fn save(&self) -> Result<String, SnapshotError> {
        let state = self.state()?;
        let json = serde_json::to_string_pretty(&Snapshot::from_engine(state, self.context()))?;
        info!("Saved a game of {} players.", state.party_size());
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::City;
    use crate::controller::HumanController;
    use serde_json::json;

    fn humans(num_players: usize) -> Vec<Box<dyn Controller>> {
        (0..num_players)
            .map(|_| Box::new(HumanController) as Box<dyn Controller>)
            .collect()
    }

    fn small_snapshot() -> serde_json::Value {
        json!({
            "players": [
                {"name": "Ann", "hand": 0, "borrowedRoads": [{"from": "B", "to": "C"}]},
                {"name": "Bob", "color": "red", "destinationCards": [1], "wagonCards": [2, 3]}
            ],
            "map": {
                "stations": [{"name": "A"}, {"name": "B", "owner": 0}, {"name": "C"}],
                "roads": [
                    {"from": "A", "to": "B", "length": 2, "color": "red", "owner": 0},
                    {"from": 1, "to": 2, "length": 3, "type": "tunnel", "owner": 1},
                    {"from": "A", "to": "C", "length": 4, "type": "ferry", "locomotives": 1}
                ]
            },
            "cards": {
                "wagons": ["red", "red", "blue", "wild", "green"],
                "destinations": [
                    {"from": "A", "to": "C", "points": 6},
                    {"from": "B", "to": "C", "points": 3}
                ],
                "faceUp": [4],
                "hands": [{"destinations": [0], "wagons": [0, 1]}]
            },
            "turn": {"currentPlayer": 1}
        })
    }

    #[test]
    fn station_ref_from_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<StationRef>("3")?,
            StationRef::Id(StationId(3))
        );
        assert_eq!(
            serde_json::from_str::<StationRef>(r#""Wien""#)?,
            StationRef::Name(String::from("Wien"))
        );
        Ok(())
    }

    #[test]
    fn road_ref_from_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::from_str::<RoadRef>("7")?, RoadRef::Id(RoadId(7)));
        assert_eq!(
            serde_json::from_str::<RoadRef>(r#"{"id": 7}"#)?,
            RoadRef::Keyed { id: RoadId(7) }
        );
        assert!(matches!(
            serde_json::from_str::<RoadRef>(r#"{"from": "Paris", "to": 3, "slot": 1}"#)?,
            RoadRef::Descriptor(RoadDescriptor { slot: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn resolve_parallel_roads() -> serde_json::Result<()> {
        let map = Map::europe();
        let descriptor = |value| serde_json::from_value::<RoadRef>(value);

        let white = resolve_road(
            &map,
            &descriptor(json!({"from": "Paris", "to": "Frankfurt", "color": "white"}))?,
        )
        .unwrap();
        let orange = resolve_road(
            &map,
            &descriptor(json!({"from": "Frankfurt", "to": "Paris", "slot": 1}))?,
        )
        .unwrap();
        assert_eq!(map.road(white).unwrap().color, Some(WagonColor::White));
        assert_eq!(map.road(orange).unwrap().color, Some(WagonColor::Orange));

        let ferry = resolve_road(
            &map,
            &descriptor(json!({"from": "London", "to": "Dieppe", "type": "ferry", "color": "gray", "slot": 1}))?,
        )
        .unwrap();
        assert!(map.road(ferry).unwrap().is_ferry());

        assert!(matches!(
            resolve_road(
                &map,
                &descriptor(json!({"from": "Paris", "to": "Frankfurt", "slot": 2}))?
            ),
            Err(SnapshotError::UnknownRoad(_))
        ));
        assert!(matches!(
            resolve_road(&map, &descriptor(json!({"from": "Paris", "to": "Atlantis"}))?),
            Err(SnapshotError::UnknownStation(_))
        ));
        assert_eq!(
            resolve_road(&map, &RoadRef::Id(RoadId(3))).unwrap(),
            RoadId(3)
        );

        Ok(())
    }

    #[test]
    fn load_small_snapshot() {
        let engine = Engine::load(&small_snapshot().to_string(), humans(2), 1).unwrap();
        let state = engine.state().unwrap();

        assert!(state.dealt);
        assert_eq!(engine.context().current_player, 1);
        assert_eq!(engine.phase(), None);

        let ann = &state.players[0];
        assert_eq!(ann.color, PlayerColor::Black);
        assert_eq!(ann.wagons, 45);
        assert_eq!(
            ann.hand.wagons.iter().collect::<Vec<_>>(),
            vec![WagonCardId(0), WagonCardId(1)]
        );
        assert_eq!(ann.borrowed_roads, vec![RoadId(1)]);

        let bob = &state.players[1];
        assert_eq!(bob.color, PlayerColor::Red);
        assert_eq!(
            bob.hand.destinations.iter().collect::<Vec<_>>(),
            vec![DestinationCardId(1)]
        );

        assert_eq!(state.map.road(RoadId(0)).unwrap().owner, Some(0));
        assert!(state.map.road(RoadId(1)).unwrap().is_tunnel());
        assert_eq!(state.map.road(RoadId(2)).unwrap().locomotives(), 1);
        assert_eq!(state.map.road(RoadId(2)).unwrap().color, None);
        assert_eq!(
            state.map.station(StationId(1)).unwrap().owner,
            Some(0)
        );
        assert_eq!(state.cards.face_up_colors(), vec![WagonColor::Green]);
        assert_eq!(state.count_wagon_cards(), 5);

        // A - B owned, B - C borrowed.
        assert!(state.map.is_destination_reached(
            0,
            &ann.borrowed_roads,
            (StationId(0), StationId(2))
        ));
    }

    #[test]
    fn load_rejects_missing_card() {
        let mut snapshot = small_snapshot();
        snapshot["cards"]["faceUp"] = json!([]);

        assert_eq!(
            Engine::load(&snapshot.to_string(), humans(2), 1)
                .err()
                .map(|error| error.to_string()),
            Some(String::from("Malformed snapshot: wagon card #4 is missing"))
        );
    }

    #[test]
    fn load_counts_cards_of_the_unfinished_turn() {
        let mut snapshot = small_snapshot();
        snapshot["cards"]["faceUp"] = json!([]);
        snapshot["players"][1]["destinationCards"] = json!([]);
        snapshot["turn"] = json!({
            "currentPlayer": 1,
            "pendingTickets": {"offered": [1]},
            "pendingTunnel": {
                "road": 1,
                "color": "red",
                "baseLength": 3,
                "extraRequired": 0,
                "revealed": [4]
            }
        });

        let mut engine = Engine::load(&snapshot.to_string(), humans(2), 1).unwrap();
        assert_eq!(engine.context().pending_tickets.offered.len(), 1);

        let result = engine.start();
        assert!(result.ok);
        assert_eq!(engine.context().pending_tickets.offered.len(), 0);
        assert_eq!(engine.context().pending_tunnel, None);

        let state = engine.state().unwrap();
        assert_eq!(state.count_wagon_cards(), 5);
        assert_eq!(state.count_destination_cards(), 2);
        assert_eq!(state.cards.count_destinations(), 1);
    }

    #[test]
    fn load_rejects_duplicate_card() {
        let mut snapshot = small_snapshot();
        snapshot["cards"]["trash"] = json!([0]);

        assert!(matches!(
            Engine::load(&snapshot.to_string(), humans(2), 1),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn load_rejects_unknown_station() {
        let mut snapshot = small_snapshot();
        snapshot["map"]["roads"][0]["to"] = json!("Z");

        assert!(matches!(
            Engine::load(&snapshot.to_string(), humans(2), 1),
            Err(SnapshotError::UnknownStation(name)) if name == "Z"
        ));
    }

    #[test]
    fn load_rejects_bad_json() {
        assert!(matches!(
            Engine::load("{\"players\": 3}", humans(2), 1),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn load_rejects_single_player() {
        let mut snapshot = small_snapshot();
        snapshot["players"] = json!([{"name": "Ann", "hand": 0}]);
        snapshot["cards"]["hands"] = json!([{"destinations": [0, 1], "wagons": [0, 1, 2, 3]}]);
        snapshot["map"]["roads"][1]["owner"] = json!(null);
        snapshot["turn"] = json!({});

        assert!(matches!(
            Engine::load(&snapshot.to_string(), humans(1), 1),
            Err(SnapshotError::Game(GameError::InvalidPayload(_)))
        ));
    }

    #[test]
    fn save_then_load() {
        let mut engine =
            Engine::with_europe_board(humans(3), GameConfig::default(), 5).unwrap();
        engine.start();
        {
            let state = engine.state_mut().unwrap();
            let road = state
                .map
                .roads_between(City::Paris.into(), City::Frankfurt.into())
                .nth(1)
                .unwrap()
                .id;
            state.map.claim_road(3, road, 2).unwrap();
            state.map.claim_station(City::Paris.into(), 1).unwrap();
            state.players[1].stations = 2;
            state.players[1].borrowed_roads.push(road);
            state.players[2].score = 4;
        }
        engine.context_mut().current_player = 2;

        let json = engine.save().unwrap();
        let loaded = Engine::load(&json, humans(3), 5).unwrap();
        let (before, after) = (engine.state().unwrap(), loaded.state().unwrap());

        assert_eq!(after.players, before.players);
        assert_eq!(after.map.roads(), before.map.roads());
        assert_eq!(after.map.stations(), before.map.stations());
        assert_eq!(after.cards.face_up_colors(), before.cards.face_up_colors());
        assert_eq!(after.cards.count_destinations(), before.cards.count_destinations());
        assert_eq!(after.count_wagon_cards(), 110);
        assert_eq!(after.count_destination_cards(), 46);
        assert_eq!(loaded.context(), engine.context());
        assert_eq!(after.config, before.config);

        assert_eq!(loaded.save().unwrap(), json);
    }
}
