use crate::card::WagonColor;
use crate::city::City;
use crate::error::GameError;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use strum::IntoEnumIterator;

// Paris has the most roads on the Europe board, counting parallel ones.
const MAX_ROADS_PER_STATION: usize = 10;

/// Parallel roads only open up to a second claimer from this party size onwards.
pub const PARALLEL_ROADS_MIN_PLAYERS: usize = 4;

/// Index of a station on its [`Map`].
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct StationId(pub usize);

/// Index of a road on its [`Map`].
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct RoadId(pub usize);

impl From<City> for StationId {
    fn from(city: City) -> Self {
        StationId(city as usize)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A city on the map, on which one player may build a station.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    /// Index of the player owning a station here. The first claim wins.
    pub owner: Option<usize>,
    pub blocked: bool,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            owner: None,
            blocked: false,
        }
    }
}

/// What kind of road connects two stations, and what it takes to claim it on top of its length.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RoadKind {
    #[serde(rename = "road")]
    Plain,
    /// Claiming it reveals cards, which may raise its cost.
    Tunnel,
    /// Locomotives printed on the board. Claims pay a ferry like a plain road.
    Ferry { locomotives: u8 },
}

impl fmt::Display for RoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoadKind::Plain => write!(f, "road"),
            RoadKind::Tunnel => write!(f, "tunnel"),
            RoadKind::Ferry { .. } => write!(f, "ferry"),
        }
    }
}

/// One edge of the map. There can be multiple "parallel" roads between two stations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Road {
    pub id: RoadId,
    pub stations: (StationId, StationId),
    /// `None` stands for a gray road, which any single color may claim.
    pub color: Option<WagonColor>,
    /// The number of wagons (and wagon cards) needed to claim the road.
    pub length: u8,
    pub kind: RoadKind,
    /// Index of the player owning this road, if any.
    pub owner: Option<usize>,
    pub blocked: bool,
}

impl Road {
    pub fn new(
        id: RoadId,
        stations: (StationId, StationId),
        color: Option<WagonColor>,
        length: u8,
        kind: RoadKind,
    ) -> Self {
        Self {
            id,
            stations,
            color,
            length,
            kind,
            owner: None,
            blocked: false,
        }
    }

    #[inline]
    pub fn is_tunnel(&self) -> bool {
        self.kind == RoadKind::Tunnel
    }

    #[inline]
    pub fn is_ferry(&self) -> bool {
        matches!(self.kind, RoadKind::Ferry { .. })
    }

    /// How many locomotives a ferry asks for; 0 for any other road.
    pub fn locomotives(&self) -> u8 {
        match self.kind {
            RoadKind::Ferry { locomotives } => locomotives,
            _ => 0,
        }
    }

    /// Whether this road links `a` and `b`, in any direction.
    pub fn connects(&self, a: StationId, b: StationId) -> bool {
        self.stations == (a, b) || self.stations == (b, a)
    }

    pub fn touches(&self, station: StationId) -> bool {
        self.stations.0 == station || self.stations.1 == station
    }

    /// The station at the other end of the road, if `station` is one of its ends.
    pub fn other_end(&self, station: StationId) -> Option<StationId> {
        match self.stations {
            (start, end) if start == station => Some(end),
            (start, end) if end == station => Some(start),
            _ => None,
        }
    }

    /// Points granted for claiming this road.
    pub fn points(&self) -> u32 {
        points_for_road_length(self.length)
    }
}

/// Points granted for claiming a road of the given length.
///
/// # Example
/// ```
/// use ticket_to_ride_europe::map::points_for_road_length;
///
/// assert_eq!(points_for_road_length(3), 4);
/// assert_eq!(points_for_road_length(8), 21);
/// ```
pub fn points_for_road_length(length: u8) -> u32 {
    match length {
        0 => 0,
        1 => 1,
        2 => 2,
        3 => 4,
        4 => 7,
        5 => 10,
        6 => 15,
        7 => 18,
        8 => 21,
        longer => 21 + 3 * (longer as u32 - 8),
    }
}

/// How many wagon cards of one color a station costs, given the stations a player has left
/// *before* building it. Returns `None` once no station is left.
///
/// # Example
/// ```
/// use ticket_to_ride_europe::map::station_claim_cost;
///
/// assert_eq!(station_claim_cost(3), Some(1));
/// assert_eq!(station_claim_cost(2), Some(2));
/// assert_eq!(station_claim_cost(1), Some(3));
/// assert_eq!(station_claim_cost(0), None);
/// ```
pub fn station_claim_cost(remaining: u8) -> Option<u8> {
    match remaining {
        0 => None,
        1 => Some(3),
        2 => Some(2),
        _ => Some(1),
    }
}

/// Result of a path query. An empty `stations` list means there is no path.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    /// Every station along the path, both ends included.
    pub stations: Vec<StationId>,
    pub num_edges: usize,
    /// Total cost of the path, under the metric of the query that produced it.
    pub total_length: u32,
}

impl Path {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

const GRAY: Option<WagonColor> = None;
const BLACK: Option<WagonColor> = Some(WagonColor::Black);
const BLUE: Option<WagonColor> = Some(WagonColor::Blue);
const GREEN: Option<WagonColor> = Some(WagonColor::Green);
const ORANGE: Option<WagonColor> = Some(WagonColor::Orange);
const PINK: Option<WagonColor> = Some(WagonColor::Pink);
const RED: Option<WagonColor> = Some(WagonColor::Red);
const WHITE: Option<WagonColor> = Some(WagonColor::White);
const YELLOW: Option<WagonColor> = Some(WagonColor::Yellow);

const PLAIN: RoadKind = RoadKind::Plain;
const TUNNEL: RoadKind = RoadKind::Tunnel;

const fn ferry(locomotives: u8) -> RoadKind {
    RoadKind::Ferry { locomotives }
}

/// Convenience macro to add "parallel" roads between two cities, one per color.
macro_rules! parallel_roads {
    ($roads:ident, $kind:expr, $start:ident - $end:ident, $length:literal, $($color:expr),+) => {
        $(
            $roads.push(Road::new(
                RoadId($roads.len()),
                (City::$start.into(), City::$end.into()),
                $color,
                $length,
                $kind,
            ));
        )+
    };
}

/// The authoritative state of the map, per game.
/// This is mutated as players claim roads and build stations throughout the game.
#[derive(Clone, Debug)]
pub struct Map {
    stations: Vec<Station>,
    roads: Vec<Road>,
    /// Roads leaving each station, indexed by station id.
    adjacency: Vec<SmallVec<[RoadId; MAX_ROADS_PER_STATION]>>,
}

impl Map {
    /// Builds a map out of the given stations and roads.
    ///
    /// Returns an `Err` if ids do not match positions, or if a road does not link two
    /// distinct known stations.
    pub fn new(stations: Vec<Station>, roads: Vec<Road>) -> Result<Self, GameError> {
        for (index, station) in stations.iter().enumerate() {
            if station.id.0 != index {
                return Err(GameError::InvalidPayload(format!(
                    "Station `{}` has id {}, but sits at position {}.",
                    station.name, station.id, index
                )));
            }
        }

        for (index, road) in roads.iter().enumerate() {
            let (start, end) = road.stations;
            if road.id.0 != index {
                return Err(GameError::InvalidPayload(format!(
                    "Road {} sits at position {}.",
                    road.id, index
                )));
            }
            if start.0 >= stations.len() || end.0 >= stations.len() || start == end {
                return Err(GameError::InvalidPayload(format!(
                    "Road {} must link two distinct stations, not {} and {}.",
                    road.id, start, end
                )));
            }
            if road.length == 0 {
                return Err(GameError::InvalidPayload(format!(
                    "Road {} has no length.",
                    road.id
                )));
            }
        }

        Ok(Self::from_parts(stations, roads))
    }

    fn from_parts(stations: Vec<Station>, roads: Vec<Road>) -> Self {
        let mut adjacency = vec![SmallVec::new(); stations.len()];
        for road in &roads {
            adjacency[road.stations.0 .0].push(road.id);
            adjacency[road.stations.1 .0].push(road.id);
        }

        Self {
            stations,
            roads,
            adjacency,
        }
    }

    /// The Europe board: 47 cities, and every road between them.
    ///
    /// Station ids match [`City`] discriminants.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::city::City;
    /// use ticket_to_ride_europe::map::Map;
    ///
    /// let map = Map::europe();
    /// assert_eq!(map.stations().len(), 47);
    /// assert_eq!(map.station_by_name("Paris"), Some(City::Paris.into()));
    /// ```
    pub fn europe() -> Self {
        let stations = City::iter()
            .map(|city| Station::new(city.into(), city.to_string()))
            .collect();

        let mut roads = Vec::with_capacity(101);
        // Britain.
        parallel_roads!(roads, PLAIN, Edinburgh - London, 4, BLACK, ORANGE);
        parallel_roads!(roads, ferry(2), London - Amsterdam, 2, GRAY);
        parallel_roads!(roads, ferry(1), London - Dieppe, 2, GRAY, GRAY);
        // France and the Low Countries.
        parallel_roads!(roads, PLAIN, Brest - Dieppe, 2, ORANGE);
        parallel_roads!(roads, PLAIN, Brest - Paris, 3, BLACK);
        parallel_roads!(roads, PLAIN, Brest - Pamplona, 4, PINK);
        parallel_roads!(roads, PLAIN, Dieppe - Paris, 1, PINK);
        parallel_roads!(roads, PLAIN, Dieppe - Bruxelles, 2, GREEN);
        parallel_roads!(roads, PLAIN, Bruxelles - Amsterdam, 1, BLACK);
        parallel_roads!(roads, PLAIN, Bruxelles - Paris, 2, YELLOW, RED);
        parallel_roads!(roads, PLAIN, Bruxelles - Frankfurt, 2, BLUE);
        parallel_roads!(roads, PLAIN, Amsterdam - Essen, 3, YELLOW);
        parallel_roads!(roads, PLAIN, Amsterdam - Frankfurt, 2, WHITE);
        parallel_roads!(roads, PLAIN, Paris - Frankfurt, 3, WHITE, ORANGE);
        parallel_roads!(roads, TUNNEL, Paris - Zurich, 3, GRAY);
        parallel_roads!(roads, PLAIN, Paris - Marseille, 4, GRAY);
        parallel_roads!(roads, PLAIN, Paris - Pamplona, 4, BLUE, GREEN);
        // Iberia.
        parallel_roads!(roads, TUNNEL, Pamplona - Madrid, 3, BLACK, WHITE);
        parallel_roads!(roads, TUNNEL, Pamplona - Barcelona, 2, GRAY);
        parallel_roads!(roads, PLAIN, Pamplona - Marseille, 4, RED);
        parallel_roads!(roads, PLAIN, Madrid - Lisboa, 3, PINK);
        parallel_roads!(roads, PLAIN, Madrid - Cadiz, 3, ORANGE);
        parallel_roads!(roads, PLAIN, Madrid - Barcelona, 2, YELLOW);
        parallel_roads!(roads, PLAIN, Lisboa - Cadiz, 2, BLUE);
        parallel_roads!(roads, PLAIN, Barcelona - Marseille, 4, GRAY);
        // Alps and Italy.
        parallel_roads!(roads, TUNNEL, Marseille - Zurich, 2, PINK);
        parallel_roads!(roads, TUNNEL, Marseille - Roma, 4, GRAY);
        parallel_roads!(roads, TUNNEL, Zurich - Munchen, 2, YELLOW);
        parallel_roads!(roads, TUNNEL, Zurich - Venezia, 2, GREEN);
        parallel_roads!(roads, TUNNEL, Munchen - Venezia, 2, BLUE);
        parallel_roads!(roads, PLAIN, Venezia - Roma, 2, BLACK);
        parallel_roads!(roads, PLAIN, Venezia - Zagrab, 2, GRAY);
        parallel_roads!(roads, PLAIN, Roma - Brindisi, 2, WHITE);
        parallel_roads!(roads, ferry(1), Roma - Palermo, 4, GRAY);
        parallel_roads!(roads, ferry(1), Palermo - Brindisi, 3, GRAY);
        parallel_roads!(roads, ferry(2), Palermo - Smyrna, 6, GRAY);
        parallel_roads!(roads, ferry(1), Brindisi - Athina, 4, GRAY);
        // Germany and Scandinavia.
        parallel_roads!(roads, PLAIN, Frankfurt - Essen, 2, GREEN);
        parallel_roads!(roads, PLAIN, Frankfurt - Berlin, 3, BLACK, RED);
        parallel_roads!(roads, PLAIN, Frankfurt - Munchen, 2, PINK);
        parallel_roads!(roads, PLAIN, Essen - Berlin, 2, BLUE);
        parallel_roads!(roads, ferry(1), Essen - Kobenhavn, 3, GRAY, GRAY);
        parallel_roads!(roads, PLAIN, Kobenhavn - Stockholm, 3, YELLOW, WHITE);
        parallel_roads!(roads, TUNNEL, Stockholm - Petrograd, 8, GRAY);
        parallel_roads!(roads, PLAIN, Munchen - Wien, 3, ORANGE);
        parallel_roads!(roads, PLAIN, Berlin - Danzig, 4, GRAY);
        parallel_roads!(roads, PLAIN, Berlin - Warszawa, 4, PINK, YELLOW);
        parallel_roads!(roads, PLAIN, Berlin - Wien, 3, GREEN);
        // Baltics and Central Europe.
        parallel_roads!(roads, PLAIN, Danzig - Riga, 3, BLACK);
        parallel_roads!(roads, PLAIN, Danzig - Warszawa, 2, GRAY);
        parallel_roads!(roads, PLAIN, Riga - Petrograd, 4, GRAY);
        parallel_roads!(roads, PLAIN, Riga - Wilno, 4, GREEN);
        parallel_roads!(roads, PLAIN, Warszawa - Wilno, 3, RED);
        parallel_roads!(roads, PLAIN, Warszawa - Kyiv, 4, GRAY);
        parallel_roads!(roads, PLAIN, Warszawa - Wien, 4, BLUE);
        parallel_roads!(roads, PLAIN, Wien - Budapest, 1, RED, WHITE);
        parallel_roads!(roads, PLAIN, Wien - Zagrab, 2, GRAY);
        parallel_roads!(roads, PLAIN, Zagrab - Budapest, 2, ORANGE);
        parallel_roads!(roads, PLAIN, Zagrab - Sarajevo, 3, RED);
        parallel_roads!(roads, PLAIN, Budapest - Sarajevo, 3, PINK);
        parallel_roads!(roads, TUNNEL, Budapest - Kyiv, 6, GRAY);
        parallel_roads!(roads, TUNNEL, Budapest - Bucuresti, 4, GRAY);
        // Balkans and Anatolia.
        parallel_roads!(roads, TUNNEL, Sarajevo - Sofia, 2, GRAY);
        parallel_roads!(roads, PLAIN, Sarajevo - Athina, 4, GREEN);
        parallel_roads!(roads, PLAIN, Athina - Sofia, 3, PINK);
        parallel_roads!(roads, ferry(1), Athina - Smyrna, 2, GRAY);
        parallel_roads!(roads, TUNNEL, Sofia - Bucuresti, 2, GRAY);
        parallel_roads!(roads, PLAIN, Sofia - Constantinople, 3, BLUE);
        parallel_roads!(roads, PLAIN, Bucuresti - Kyiv, 4, GRAY);
        parallel_roads!(roads, PLAIN, Bucuresti - Sevastopol, 4, WHITE);
        parallel_roads!(roads, PLAIN, Bucuresti - Constantinople, 3, YELLOW);
        parallel_roads!(roads, TUNNEL, Constantinople - Smyrna, 2, GRAY);
        parallel_roads!(roads, TUNNEL, Constantinople - Angora, 2, GRAY);
        parallel_roads!(roads, ferry(2), Constantinople - Sevastopol, 4, GRAY);
        parallel_roads!(roads, TUNNEL, Smyrna - Angora, 3, ORANGE);
        parallel_roads!(roads, PLAIN, Angora - Erzurum, 3, BLACK);
        parallel_roads!(roads, ferry(2), Erzurum - Sevastopol, 4, GRAY);
        parallel_roads!(roads, TUNNEL, Erzurum - Sochi, 3, RED);
        // Russia.
        parallel_roads!(roads, ferry(1), Sevastopol - Sochi, 2, GRAY);
        parallel_roads!(roads, PLAIN, Sevastopol - Rostov, 4, GRAY);
        parallel_roads!(roads, PLAIN, Sochi - Rostov, 2, GRAY);
        parallel_roads!(roads, PLAIN, Rostov - Kharkov, 2, GREEN);
        parallel_roads!(roads, PLAIN, Kharkov - Kyiv, 4, GRAY);
        parallel_roads!(roads, PLAIN, Kharkov - Moskva, 4, GRAY);
        parallel_roads!(roads, PLAIN, Kyiv - Smolensk, 3, RED);
        parallel_roads!(roads, PLAIN, Kyiv - Wilno, 2, GRAY);
        parallel_roads!(roads, PLAIN, Wilno - Smolensk, 3, YELLOW);
        parallel_roads!(roads, PLAIN, Wilno - Petrograd, 4, BLUE);
        parallel_roads!(roads, PLAIN, Smolensk - Moskva, 2, ORANGE);
        parallel_roads!(roads, PLAIN, Moskva - Petrograd, 4, WHITE);

        Self::from_parts(stations, roads)
    }

    #[inline]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    #[inline]
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    #[inline]
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.0)
    }

    #[inline]
    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.0)
    }

    /// Mutable accessor to a station.
    ///
    /// Should only be used for testing and snapshot loading!
    pub fn station_mut(&mut self, id: StationId) -> Option<&mut Station> {
        self.stations.get_mut(id.0)
    }

    /// Mutable accessor to a road.
    ///
    /// Should only be used for testing and snapshot loading!
    pub fn road_mut(&mut self, id: RoadId) -> Option<&mut Road> {
        self.roads.get_mut(id.0)
    }

    /// Looks a station up by name, ignoring case.
    pub fn station_by_name(&self, name: &str) -> Option<StationId> {
        let name = name.trim();
        self.stations
            .iter()
            .find(|station| station.name.eq_ignore_ascii_case(name))
            .map(|station| station.id)
    }

    /// The name of a station, or `?` for an unknown id.
    pub fn station_name(&self, id: StationId) -> &str {
        self.station(id).map_or("?", |station| station.name.as_str())
    }

    /// Human-readable summary of a road, e.g. `Paris - Zurich (3, gray tunnel)`.
    pub fn describe_road(&self, road: &Road) -> String {
        let color = road.color.map_or(String::from("gray"), |color| color.to_string());
        format!(
            "{} - {} ({}, {} {})",
            self.station_name(road.stations.0),
            self.station_name(road.stations.1),
            road.length,
            color,
            road.kind
        )
    }

    /// Every road linking `a` and `b`, in id order.
    pub fn roads_between(&self, a: StationId, b: StationId) -> impl Iterator<Item = &Road> {
        self.roads_at(a).filter(move |road| road.connects(a, b))
    }

    /// Every road with `station` as one of its ends.
    pub fn roads_at(&self, station: StationId) -> impl Iterator<Item = &Road> {
        self.adjacency
            .get(station.0)
            .into_iter()
            .flatten()
            .filter_map(|id| self.roads.get(id.0))
    }

    /// Other roads sharing both ends with the given one.
    pub fn parallel_roads(&self, id: RoadId) -> impl Iterator<Item = &Road> {
        let stations = self.road(id).map(|road| road.stations);
        self.roads.iter().filter(move |road| match stations {
            Some((start, end)) => road.id != id && road.connects(start, end),
            None => false,
        })
    }

    /// Checks whether `player` may claim the given road, in a party of `party_size` players.
    ///
    /// Returns an `Err` if either:
    ///   * The road does not exist.
    ///   * The road is blocked, or already claimed.
    ///   * The player already owns a parallel road.
    ///   * Someone else owns a parallel road, and the party is too small for parallel roads.
    pub fn check_road_claim(
        &self,
        party_size: usize,
        id: RoadId,
        player: usize,
    ) -> Result<&Road, GameError> {
        let road = self
            .road(id)
            .ok_or_else(|| GameError::InvalidPayload(format!("Road {} does not exist.", id)))?;
        let start = self.station_name(road.stations.0);
        let end = self.station_name(road.stations.1);

        if road.blocked {
            return Err(GameError::RuleViolation(format!(
                "The selected road between {} and {} is blocked.",
                start, end
            )));
        }

        if road.owner.is_some() {
            return Err(GameError::RuleViolation(format!(
                "The selected road between {} and {} is already claimed.",
                start, end
            )));
        }

        for parallel_road in self.parallel_roads(id) {
            match parallel_road.owner {
                Some(owner) if owner == player => {
                    return Err(GameError::RuleViolation(format!(
                        "Cannot claim more than one road between {} and {}.",
                        start, end
                    )));
                }
                Some(_) if party_size < PARALLEL_ROADS_MIN_PLAYERS => {
                    return Err(GameError::RuleViolation(format!(
                        "Another road is already claimed by someone else between {} and {}.",
                        start, end
                    )));
                }
                _ => {}
            }
        }

        Ok(road)
    }

    /// Predicate version of [`Map::check_road_claim`].
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::map::{Map, RoadId};
    ///
    /// let mut map = Map::europe();
    /// // Edinburgh - London is a double road.
    /// assert!(map.claim_road(3, RoadId(0), 0).is_ok());
    /// assert!(!map.is_road_claimable(3, RoadId(1), 1));
    /// assert!(map.is_road_claimable(4, RoadId(1), 1));
    /// assert!(!map.is_road_claimable(4, RoadId(1), 0));
    /// ```
    pub fn is_road_claimable(&self, party_size: usize, id: RoadId, player: usize) -> bool {
        self.check_road_claim(party_size, id, player).is_ok()
    }

    /// Every road `player` could claim right now, ignoring cards and wagons.
    pub fn get_claimable_roads(&self, party_size: usize, player: usize) -> Vec<RoadId> {
        self.roads
            .iter()
            .map(|road| road.id)
            .filter(|id| self.is_road_claimable(party_size, *id, player))
            .collect()
    }

    /// Hands the road over to `player`, after the same checks as [`Map::check_road_claim`].
    pub fn claim_road(
        &mut self,
        party_size: usize,
        id: RoadId,
        player: usize,
    ) -> Result<(), GameError> {
        self.check_road_claim(party_size, id, player)?;
        self.roads[id.0].owner = Some(player);
        Ok(())
    }

    /// Builds a station for `player`.
    ///
    /// Returns an `Err` if the station does not exist, is blocked, or already has an owner.
    pub fn claim_station(&mut self, id: StationId, player: usize) -> Result<(), GameError> {
        let station = self
            .stations
            .get_mut(id.0)
            .ok_or_else(|| GameError::InvalidPayload(format!("Station {} does not exist.", id)))?;

        if station.blocked {
            return Err(GameError::RuleViolation(format!(
                "{} is blocked.",
                station.name
            )));
        }

        if station.owner.is_some() {
            return Err(GameError::RuleViolation(format!(
                "{} already has a station.",
                station.name
            )));
        }

        station.owner = Some(player);
        Ok(())
    }

    /// The path with the fewest roads between two stations, whatever their lengths.
    ///
    /// The path's `total_length` is its number of roads.
    pub fn get_shortest_path(&self, source: StationId, destination: StationId) -> Path {
        self.find_path(source, destination, |_| 1)
    }

    /// The path needing the fewest wagons between two stations.
    ///
    /// The path's `total_length` is the sum of its road lengths.
    pub fn get_most_efficient_path(&self, source: StationId, destination: StationId) -> Path {
        self.find_path(source, destination, |road| road.length as u32)
    }

    // Dijkstra over unblocked roads.
    fn find_path(
        &self,
        source: StationId,
        destination: StationId,
        weight: impl Fn(&Road) -> u32,
    ) -> Path {
        let num_stations = self.stations.len();
        if source.0 >= num_stations || destination.0 >= num_stations {
            return Path::default();
        }

        let mut distances = vec![u32::MAX; num_stations];
        let mut previous: Vec<Option<StationId>> = vec![None; num_stations];
        let mut to_visit = BinaryHeap::new();

        distances[source.0] = 0;
        to_visit.push(Reverse((0, source.0)));

        while let Some(Reverse((distance, station))) = to_visit.pop() {
            if station == destination.0 {
                break;
            }
            if distance > distances[station] {
                continue;
            }

            for road in self.roads_at(StationId(station)) {
                if road.blocked {
                    continue;
                }
                let Some(next) = road.other_end(StationId(station)) else {
                    continue;
                };

                let candidate = distance + weight(road);
                if candidate < distances[next.0] {
                    distances[next.0] = candidate;
                    previous[next.0] = Some(StationId(station));
                    to_visit.push(Reverse((candidate, next.0)));
                }
            }
        }

        if distances[destination.0] == u32::MAX {
            return Path::default();
        }

        let mut stations = vec![destination];
        let mut current = destination;
        while let Some(station) = previous[current.0] {
            stations.push(station);
            current = station;
        }
        stations.reverse();

        Path {
            num_edges: stations.len() - 1,
            total_length: distances[destination.0],
            stations,
        }
    }

    /// Predicate that assesses whether `player` connected two stations, through roads they
    /// own or have borrowed.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::city::City;
    /// use ticket_to_ride_europe::map::{Map, RoadId};
    ///
    /// let mut map = Map::europe();
    /// let destination = (City::Paris.into(), City::Amsterdam.into());
    /// let player = 0;
    ///
    /// assert!(!map.is_destination_reached(player, &[], destination));
    ///
    /// let paris_bruxelles = map.roads_between(City::Paris.into(), City::Bruxelles.into()).next().unwrap().id;
    /// let bruxelles_amsterdam = map.roads_between(City::Bruxelles.into(), City::Amsterdam.into()).next().unwrap().id;
    /// assert!(map.claim_road(2, paris_bruxelles, player).is_ok());
    /// assert!(!map.is_destination_reached(player, &[], destination));
    /// assert!(map.is_destination_reached(player, &[bruxelles_amsterdam], destination));
    /// ```
    pub fn is_destination_reached(
        &self,
        player: usize,
        borrowed: &[RoadId],
        (start, end): (StationId, StationId),
    ) -> bool {
        if start.0 >= self.stations.len() || end.0 >= self.stations.len() {
            return false;
        }

        let mut stations_visited = vec![false; self.stations.len()];
        let mut stations_to_visit = VecDeque::new();
        stations_visited[start.0] = true;
        stations_to_visit.push_back(start);

        while let Some(station) = stations_to_visit.pop_front() {
            if station == end {
                return true;
            }

            for road in self.roads_at(station) {
                if road.owner != Some(player) && !borrowed.contains(&road.id) {
                    continue;
                }

                if let Some(next) = road.other_end(station) {
                    if !stations_visited[next.0] {
                        stations_visited[next.0] = true;
                        stations_to_visit.push_back(next);
                    }
                }
            }
        }

        false
    }
}
