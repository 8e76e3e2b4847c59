//! Game session flags and house ownership queries.

use serde::{Deserialize, Serialize};

/// Kind of game being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Scripted single-player mission.
    #[default]
    Campaign,
    /// Single-player game against computer opponents.
    Skirmish,
    /// Networked game.
    Multiplayer,
}

/// Per-game flags the map consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Kind of game.
    pub mode: GameMode,
    /// Whether random goodie crates are enabled.
    pub goodies_allowed: bool,
    /// Whether the scenario editor is running.
    pub map_editor: bool,
}

impl Session {
    /// A skirmish session with crates enabled.
    #[must_use]
    pub const fn skirmish() -> Self {
        Self {
            mode: GameMode::Skirmish,
            goodies_allowed: true,
            map_editor: false,
        }
    }

    /// Whether the game is a campaign mission.
    #[must_use]
    pub fn is_campaign(&self) -> bool {
        self.mode == GameMode::Campaign
    }
}

/// House (player faction slot) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HouseId(pub u8);

/// Maximum number of houses in a game.
pub const MAX_HOUSES: usize = 20;

/// Ownership and alliance registry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Houses {
    player: Option<HouseId>,
    controlled: u32,
    allies: [u32; MAX_HOUSES],
}

impl Houses {
    /// Registry with no local player and no alliances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose local player is `house`.
    #[must_use]
    pub fn with_player(house: HouseId) -> Self {
        let mut houses = Self::new();
        houses.set_player(house);
        houses
    }

    /// Make `house` the local player and give it control.
    ///
    /// Out-of-range houses are ignored.
    pub fn set_player(&mut self, house: HouseId) {
        if usize::from(house.0) >= MAX_HOUSES {
            return;
        }
        self.player = Some(house);
        self.controlled |= 1 << house.0;
    }

    /// The local player's house.
    #[must_use]
    pub const fn player(&self) -> Option<HouseId> {
        self.player
    }

    /// Whether the local player's view is driven by `house`.
    #[must_use]
    pub fn player_has_control(&self, house: HouseId) -> bool {
        usize::from(house.0) < MAX_HOUSES && self.controlled & (1 << house.0) != 0
    }

    /// Whether `house` is the local player.
    #[must_use]
    pub fn is_player(&self, house: HouseId) -> bool {
        self.player == Some(house)
    }

    /// Declare `a` and `b` allies of each other.
    pub fn make_allies(&mut self, a: HouseId, b: HouseId) {
        if usize::from(a.0) >= MAX_HOUSES || usize::from(b.0) >= MAX_HOUSES {
            return;
        }
        self.allies[usize::from(a.0)] |= 1 << b.0;
        self.allies[usize::from(b.0)] |= 1 << a.0;
    }

    /// Whether `a` considers `b` an ally. A house is always its own ally.
    #[must_use]
    pub fn is_ally(&self, a: HouseId, b: HouseId) -> bool {
        if a == b {
            return true;
        }
        self.allies
            .get(usize::from(a.0))
            .is_some_and(|mask| usize::from(b.0) < MAX_HOUSES && mask & (1 << b.0) != 0)
    }

    /// Whether `house` is allied with the local player.
    #[must_use]
    pub fn is_player_ally(&self, house: HouseId) -> bool {
        self.player.is_some_and(|player| self.is_ally(player, house))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alliances_are_mutual() {
        let mut houses = Houses::new();
        houses.make_allies(HouseId(1), HouseId(3));
        assert!(houses.is_ally(HouseId(1), HouseId(3)));
        assert!(houses.is_ally(HouseId(3), HouseId(1)));
        assert!(!houses.is_ally(HouseId(1), HouseId(2)));
        assert!(houses.is_ally(HouseId(2), HouseId(2)));
    }

    #[test]
    fn test_player_control() {
        let houses = Houses::with_player(HouseId(4));
        assert!(houses.player_has_control(HouseId(4)));
        assert!(!houses.player_has_control(HouseId(5)));
        assert!(houses.is_player_ally(HouseId(4)));
        assert!(!houses.is_player_ally(HouseId(5)));
    }

    #[test]
    fn test_out_of_range_house_ignored() {
        let mut houses = Houses::new();
        houses.set_player(HouseId(25));
        assert_eq!(houses.player(), None);
        houses.make_allies(HouseId(0), HouseId(30));
        assert!(!houses.is_ally(HouseId(0), HouseId(30)));
    }

    #[test]
    fn test_session_defaults() {
        let session = Session::default();
        assert!(session.is_campaign());
        assert!(!session.goodies_allowed);
        assert!(!Session::skirmish().is_campaign());
    }
}
