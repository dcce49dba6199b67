//! Random playouts (single-game simulation).
//!
//! A playout plays uniformly random legal moves until the game is over. It is
//! the cheap way to look at one path through a tree that is far too large to
//! enumerate.

use log::warn;

use crate::position::{MoveOutcome, Player, Position};

/// One move of a playout and the position it led to.
#[derive(Clone, Debug)]
pub struct PlayoutStep {
    pub mover: Player,
    /// Pit offset the mover sowed from
    pub offset: usize,
    pub outcome: MoveOutcome,
    pub position: Position,
}

/// Pick a random legal move for the player to move.
pub fn random_move(pos: &Position, rng: &mut fastrand::Rng) -> Option<usize> {
    let moves: Vec<usize> = pos.legal_moves().collect();
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.usize(..moves.len())])
}

/// Play random moves from `initial` until the game is over.
///
/// Returns every move in order; the last step holds the final position.
pub fn random_game(initial: &Position, rng: &mut fastrand::Rng) -> Vec<PlayoutStep> {
    let mut pos = initial.clone();
    let mut steps = Vec::new();

    while !pos.is_game_over() {
        let Some(offset) = random_move(&pos, rng) else {
            warn!("no legal move from non-terminal state {:?}", pos.pits());
            break;
        };
        let mover = pos.active_player();
        match pos.apply_move(offset) {
            Ok(outcome) => steps.push(PlayoutStep {
                mover,
                offset,
                outcome,
                position: pos.clone(),
            }),
            Err(e) => {
                warn!("{e}");
                break;
            }
        }
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::GameConfig;

    #[test]
    fn test_random_game_ends() {
        let initial = Position::new(GameConfig::new(6, 4).unwrap());
        let mut rng = fastrand::Rng::with_seed(42);
        let steps = random_game(&initial, &mut rng);

        let last = steps.last().unwrap();
        assert!(last.position.is_game_over());
        for step in &steps[..steps.len() - 1] {
            assert!(!step.position.is_game_over());
        }
        for step in &steps {
            assert_eq!(step.position.token_total(), 48);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let initial = Position::new(GameConfig::new(4, 3).unwrap());
        let a = random_game(&initial, &mut fastrand::Rng::with_seed(7));
        let b = random_game(&initial, &mut fastrand::Rng::with_seed(7));
        let moves = |steps: &[PlayoutStep]| steps.iter().map(|s| s.offset).collect::<Vec<_>>();
        assert_eq!(moves(&a), moves(&b));
    }

    #[test]
    fn test_extra_turn_keeps_mover() {
        let initial = Position::new(GameConfig::new(6, 4).unwrap());
        let mut rng = fastrand::Rng::with_seed(3);
        let steps = random_game(&initial, &mut rng);
        for pair in steps.windows(2) {
            if pair[0].outcome.extra_turn {
                assert_eq!(pair[1].mover, pair[0].mover);
            } else {
                assert_ne!(pair[1].mover, pair[0].mover);
            }
        }
    }
}
