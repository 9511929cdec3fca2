pub mod case;
pub mod clue;
pub mod game_state;
pub mod message;
pub mod outcome;
