use serde::{Deserialize, Serialize};

use crate::ae;
use crate::ao;
use crate::error::Error;
use crate::factory::TlvFactory;
use crate::registry::TypeRegistry;

/// The two game variants sharing this machinery. Each carries its own tag
/// vocabulary and kind table; the codec and pipeline are common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Game {
    #[serde(rename = "AO")]
    Ao,
    #[serde(rename = "AE")]
    Ae,
}

impl Game {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ao => "AO",
            Self::Ae => "AE",
        }
    }
}

/// One game's type registry and TLV factory, built once and then shared
/// read-only across any number of conversions.
#[derive(Debug)]
pub struct GameTypes {
    game: Game,
    registry: TypeRegistry,
    factory: TlvFactory,
}

impl GameTypes {
    pub fn new(game: Game) -> Result<Self, Error> {
        let mut registry = TypeRegistry::new();
        let kinds = match game {
            Game::Ao => {
                ao::register_enums(&mut registry)?;
                ao::KINDS
            }
            Game::Ae => {
                ae::register_enums(&mut registry)?;
                ae::KINDS
            }
        };
        let factory = TlvFactory::new(kinds, &mut registry)?;
        Ok(Self {
            game,
            registry,
            factory,
        })
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn factory(&self) -> &TlvFactory {
        &self.factory
    }
}

#[cfg(test)]
mod tests {
    use super::{Game, GameTypes};

    #[test]
    fn both_game_contexts_build() {
        for game in [Game::Ao, Game::Ae] {
            let types = GameTypes::new(game).unwrap();
            assert_eq!(types.game(), game);
            assert!(types.factory().kinds().count() > 0);
        }
    }

    #[test]
    fn game_serializes_as_short_code() {
        assert_eq!(serde_json::to_value(Game::Ao).unwrap(), "AO");
        assert_eq!(serde_json::to_value(Game::Ae).unwrap(), "AE");
    }
}
