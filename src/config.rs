use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// Rule constants of a game. Defaults follow the Europe rules.
///
/// # JSON
/// Fields are camelCase; missing fields fall back to their default.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Wagons every player starts with.
    pub wagons: u8,
    /// Stations every player starts with.
    pub stations: u8,
    /// Size of the face-up row.
    pub face_up_cards: usize,
    /// The face-up row is thrown away once it shows this many locomotives.
    pub face_up_locomotive_limit: usize,
    pub starting_wagon_cards: usize,
    /// Regular destination tickets dealt to every player at setup, on top of one long ticket.
    pub starting_destinations: usize,
    /// How many tickets a destination draw offers.
    pub destination_offer: usize,
    /// How many of the offered tickets must be kept.
    pub min_keep_tickets: usize,
    /// Cards revealed when claiming a tunnel.
    pub tunnel_reveal: usize,
    /// The final round starts once a player is left with this many wagons or fewer.
    pub final_round_wagons: u8,
    /// End-game bonus for every station left unplaced.
    pub station_points: u32,
    /// Upper bound of automatic steps run while handling a single command.
    pub max_cascade_steps: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            wagons: 45,
            stations: 3,
            face_up_cards: 5,
            face_up_locomotive_limit: 3,
            starting_wagon_cards: 4,
            starting_destinations: 3,
            destination_offer: 3,
            min_keep_tickets: 1,
            tunnel_reveal: 3,
            final_round_wagons: 2,
            station_points: 4,
            max_cascade_steps: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_to_json() -> serde_json::Result<()> {
        let json = serde_json::to_value(GameConfig::default())?;

        assert_eq!(json["wagons"], 45);
        assert_eq!(json["faceUpLocomotiveLimit"], 3);
        assert_eq!(json["maxCascadeSteps"], 10_000);

        Ok(())
    }

    #[test]
    fn partial_json_to_config() -> serde_json::Result<()> {
        let config: GameConfig = serde_json::from_str(r#"{"wagons": 10, "tunnelReveal": 2}"#)?;

        assert_eq!(config.wagons, 10);
        assert_eq!(config.tunnel_reveal, 2);
        assert_eq!(config.stations, 3);
        assert_eq!(config.min_keep_tickets, 1);

        Ok(())
    }
}
