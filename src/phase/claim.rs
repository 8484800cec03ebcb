use super::{Origin, Phase, Step, Steps};
use crate::card::{WagonCardId, WagonColor};
use crate::command::Command;
use crate::context::PendingTunnel;
use crate::engine::{Engine, Parts};
use crate::error::GameError;
use crate::event::EngineEvent;
use crate::map::{station_claim_cost, RoadId, StationId};
use crate::state::GameState;

/// A road claim that passed validation, and how it will be paid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct RoadClaim {
    pub road: RoadId,
    pub color: WagonColor,
    pub length: u8,
    pub tunnel: bool,
    pub payment: Vec<WagonCardId>,
}

/// Checks whether `player` can claim a road, and plans the payment.
///
/// Without a color, a gray road is paid with the color the player holds most of, and a
/// colored road with its own color.
pub(crate) fn plan_road(
    state: &GameState,
    player: usize,
    id: RoadId,
    color: Option<WagonColor>,
) -> Result<RoadClaim, GameError> {
    let road = state.map.check_road_claim(state.party_size(), id, player)?;
    let current = state.player(player)?;
    let start = state.map.station_name(road.stations.0);
    let end = state.map.station_name(road.stations.1);

    if current.wagons < road.length {
        return Err(GameError::RuleViolation(format!(
            "Cannot claim the road between {} and {} with {} wagons, whilst having only {} left.",
            start, end, road.length, current.wagons
        )));
    }

    let color = match (road.color, color) {
        (Some(road_color), Some(color)) if color == road_color || color.is_locomotive() => color,
        (Some(road_color), Some(color)) => {
            return Err(GameError::RuleViolation(format!(
                "The road between {} and {} is {}, it cannot be claimed with {} cards.",
                start, end, road_color, color
            )));
        }
        (Some(road_color), None) => road_color,
        (None, Some(color)) => color,
        (None, None) => current.best_color(state.cards.catalog()),
    };

    let payment = current
        .plan_payment(state.cards.catalog(), color, road.length as usize)
        .ok_or_else(|| {
            GameError::RuleViolation(format!(
                "Cannot claim the road between {} and {} without {} {} cards (locomotives included).",
                start, end, road.length, color
            ))
        })?;

    Ok(RoadClaim {
        road: id,
        color,
        length: road.length,
        tunnel: road.is_tunnel(),
        payment,
    })
}

/// Hands the road over to `player`, against the given cards.
fn complete_road_claim(
    state: &mut GameState,
    player: usize,
    road: RoadId,
    payment: &[WagonCardId],
    events: &mut Vec<EngineEvent>,
) -> Result<(), GameError> {
    let party_size = state.party_size();
    state.map.check_road_claim(party_size, road, player)?;

    let current = state
        .players
        .get_mut(player)
        .ok_or(GameError::MissingState("player"))?;
    if !current.pay(payment) {
        return Err(GameError::RuleViolation(String::from(
            "The cards to pay with are no longer in hand.",
        )));
    }
    state.cards.discard_wagons(payment.iter().copied());
    state.map.claim_road(party_size, road, player)?;

    if let Some(claimed) = state.map.road(road) {
        let points = claimed.points();
        current.wagons = current.wagons.saturating_sub(claimed.length);
        current.score += points;
        events.push(EngineEvent::info(format!(
            "{} claimed {} for {} points.",
            current.name,
            state.map.describe_road(claimed),
            points
        )));
    }

    Ok(())
}

pub(super) fn take_road(
    engine: &mut Engine,
    road: RoadId,
    color: Option<WagonColor>,
) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let player = context.current_player;
    let claim = plan_road(state, player, road, color)?;

    if !claim.tunnel {
        complete_road_claim(state, player, road, &claim.payment, events)?;
        return Ok(smallvec![Step::Enter(Phase::Confirmation)]);
    }

    let revealed = state.cards.reveal_wagons(state.config.tunnel_reveal);
    let revealed_colors: Vec<_> = revealed
        .iter()
        .filter_map(|card| state.cards.wagon_color(*card))
        .collect();
    let extra_required = revealed_colors
        .iter()
        .filter(|revealed| **revealed == claim.color || revealed.is_locomotive())
        .count() as u8;

    events.push(EngineEvent::info(format!(
        "{} digs a tunnel: {} revealed, {} extra {} cards needed.",
        state.player(player)?.name,
        revealed_colors
            .iter()
            .map(|color| color.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        extra_required,
        claim.color
    )));

    context.pending_tunnel = Some(PendingTunnel {
        road,
        color: claim.color,
        base_length: claim.length,
        extra_required,
        revealed,
    });
    Ok(smallvec![Step::Enter(Phase::TunnelResolve)])
}

/// Pays for the pending tunnel if the player can afford the surcharge. Otherwise the tunnel
/// stays unclaimed. Revealed cards end up in the trash either way.
pub(super) fn resolve_tunnel(engine: &mut Engine) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let tunnel = context
        .pending_tunnel
        .take()
        .ok_or(GameError::MissingState("pending tunnel"))?;
    let player = context.current_player;
    state.cards.discard_wagons(tunnel.revealed.iter().copied());

    let required = tunnel.base_length as usize + tunnel.extra_required as usize;
    let current = state.player(player)?;
    match current.plan_payment(state.cards.catalog(), tunnel.color, required) {
        Some(payment) => complete_road_claim(state, player, tunnel.road, &payment, events)?,
        None => events.push(EngineEvent::info(format!(
            "{} cannot pay {} {} cards: the tunnel stays unclaimed.",
            current.name, required, tunnel.color
        ))),
    }

    Ok(smallvec![Step::Enter(Phase::Confirmation)])
}

/// Revealed cards of an interrupted tunnel claim go to the trash.
pub(super) fn discard_revealed(engine: &mut Engine) {
    if let Ok(Parts { state, context, .. }) = engine.parts() {
        if let Some(tunnel) = context.pending_tunnel.take() {
            state.cards.discard_wagons(tunnel.revealed);
        }
    }
}

/// Checks whether `player` can build a station in the named city, and plans the payment.
pub(crate) fn plan_station(
    state: &GameState,
    player: usize,
    name: &str,
    color: WagonColor,
) -> Result<(StationId, Vec<WagonCardId>), GameError> {
    let id = state
        .map
        .station_by_name(name)
        .ok_or_else(|| GameError::InvalidPayload(format!("Unknown station `{}`.", name)))?;
    let station = state
        .map
        .station(id)
        .ok_or_else(|| GameError::InvalidPayload(format!("Unknown station `{}`.", name)))?;

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

    let current = state.player(player)?;
    let cost = station_claim_cost(current.stations).ok_or_else(|| {
        GameError::RuleViolation(String::from("Cannot build a station without any left."))
    })?;
    let payment = current
        .plan_payment(state.cards.catalog(), color, cost as usize)
        .ok_or_else(|| {
            GameError::RuleViolation(format!(
                "A station in {} costs {} {} cards (locomotives included).",
                station.name, cost, color
            ))
        })?;

    Ok((id, payment))
}

pub(super) fn claim_station(
    engine: &mut Engine,
    name: &str,
    color: WagonColor,
) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let player = context.current_player;
    let (id, payment) = plan_station(state, player, name, color)?;
    complete_station_claim(state, player, id, &payment, events)?;

    Ok(smallvec![Step::Enter(Phase::Confirmation)])
}

/// Builds a station in `id` for `player`, against the given cards.
fn complete_station_claim(
    state: &mut GameState,
    player: usize,
    id: StationId,
    payment: &[WagonCardId],
    events: &mut Vec<EngineEvent>,
) -> Result<(), GameError> {
    let current = state
        .players
        .get_mut(player)
        .ok_or(GameError::MissingState("player"))?;
    if !current.pay(payment) {
        return Err(GameError::RuleViolation(String::from(
            "The cards to pay with are no longer in hand.",
        )));
    }
    state.cards.discard_wagons(payment.iter().copied());
    state.map.claim_station(id, player)?;
    current.stations -= 1;

    events.push(EngineEvent::info(format!(
        "{} built a station in {} for {} cards.",
        current.name,
        state.map.station_name(id),
        payment.len()
    )));

    Ok(())
}

/// Checks whether `player` can borrow a road through one of their stations.
pub(crate) fn check_borrow(state: &GameState, player: usize, id: RoadId) -> Result<(), GameError> {
    let road = state
        .map
        .road(id)
        .ok_or_else(|| GameError::InvalidPayload(format!("Road {} does not exist.", id)))?;
    let start = state.map.station_name(road.stations.0);
    let end = state.map.station_name(road.stations.1);

    match road.owner {
        None => {
            return Err(GameError::RuleViolation(format!(
                "Nobody owns the road between {} and {}: claim it instead.",
                start, end
            )));
        }
        Some(owner) if owner == player => {
            return Err(GameError::RuleViolation(format!(
                "The road between {} and {} is already yours.",
                start, end
            )));
        }
        Some(_) => {}
    }

    let current = state.player(player)?;
    if current.borrowed_roads.contains(&id) {
        return Err(GameError::RuleViolation(format!(
            "The road between {} and {} is already borrowed.",
            start, end
        )));
    }

    let has_station = [road.stations.0, road.stations.1].iter().any(|station| {
        state
            .map
            .station(*station)
            .map_or(false, |station| station.owner == Some(player))
    });
    if !has_station {
        return Err(GameError::RuleViolation(format!(
            "Borrowing the road between {} and {} requires a station in either city.",
            start, end
        )));
    }

    if !current.can_borrow_more(state.stations_placed(player)) {
        return Err(GameError::RuleViolation(String::from(
            "Every station already lets you borrow a road.",
        )));
    }

    Ok(())
}

pub(super) fn borrow_road(engine: &mut Engine, road: RoadId) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let player = context.current_player;
    check_borrow(state, player, road)?;

    let description = state
        .map
        .road(road)
        .map(|borrowed| state.map.describe_road(borrowed))
        .unwrap_or_default();
    let current = state.player_mut(player)?;
    current.borrowed_roads.push(road);
    events.push(EngineEvent::info(format!(
        "{} borrows {}.",
        current.name, description
    )));

    Ok(smallvec![Step::Enter(Phase::Confirmation)])
}

/// Validates a borrow sent during another phase, then forwards it to the borrowing phase.
pub(super) fn forward_borrow(
    engine: &mut Engine,
    road: RoadId,
    origin: Origin,
) -> Result<Steps, GameError> {
    check_borrow(engine.state()?, engine.context.current_player, road)?;

    Ok(smallvec![
        Step::Enter(Phase::BorrowRoad),
        Step::Dispatch {
            command: Command::BorrowRoad { road },
            origin,
        }
    ])
}
