//! End-to-end tests of the agent against small games.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::*;
use crate::alpha_beta_searcher::tests::Tripwire;
use crate::alpha_beta_searcher::{EvaluationWeights, Mover};
use crate::games::SubtractionGame;

const BUDGET: Duration = Duration::from_millis(250);

fn seeded_agent(player_count: usize, agent_index: usize) -> Agent<SubtractionGame> {
    let config = AgentConfig {
        seed: Some(17),
        ..AgentConfig::default()
    };
    let mut agent = Agent::with_config(config);
    agent
        .set_up(player_count, agent_index)
        .expect("valid agent index");
    agent
}

/// Plays a full game with one agent per seat and returns the outcome.
fn self_play(start: SubtractionGame) -> [f64; 2] {
    let mut agents = [seeded_agent(2, 0), seeded_agent(2, 1)];
    let mut state = start;
    while state.outcome().is_none() {
        let seat = state.to_move();
        let action = agents[seat]
            .compute_next_action(&state, BUDGET)
            .expect("running game has actions");
        assert!(state.legal_actions().contains(&action));
        state = state.apply(&action);
    }
    state.outcome().expect("game is over")
}

/// Plays the agent in `seat` against a seeded random opponent.
fn play_random_opponent(start: SubtractionGame, seat: usize, seed: u64) -> [f64; 2] {
    let mut agent = seeded_agent(2, seat);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = start;
    while state.outcome().is_none() {
        let action = if state.to_move() == seat {
            agent
                .compute_next_action(&state, BUDGET)
                .expect("running game has actions")
        } else {
            *state
                .legal_actions()
                .choose(&mut rng)
                .expect("running game has actions")
        };
        state = state.apply(&action);
    }
    state.outcome().expect("game is over")
}

#[test]
fn test_compute_requires_set_up() {
    let mut agent: Agent<SubtractionGame> = Agent::new();
    let result = agent.compute_next_action(&SubtractionGame::new(5), BUDGET);
    assert_eq!(result, Err(SearchError::NotSetUp));
}

#[test]
fn test_set_up_rejects_out_of_range_index() {
    let mut agent: Agent<SubtractionGame> = Agent::new();
    assert_eq!(
        agent.set_up(2, 2),
        Err(SearchError::InvalidAgentIndex {
            index: 2,
            players: 2
        })
    );
    assert!(agent.set_up(2, 1).is_ok());
}

#[test]
fn test_terminal_state_has_no_actions() {
    let mut agent = seeded_agent(2, 0);
    let over = SubtractionGame::new(1).apply(&1);
    assert_eq!(
        agent.compute_next_action(&over, BUDGET),
        Err(SearchError::NoAvailableActions)
    );
}

#[test]
fn test_single_option_is_returned() {
    for budget in [Duration::ZERO, BUDGET] {
        let mut agent = seeded_agent(2, 0);
        let action = agent
            .compute_next_action(&SubtractionGame::new(1), budget)
            .expect("one legal action");
        assert_eq!(action, 1);
    }
}

#[test]
fn test_zero_budget_falls_back_to_greedy_choice() {
    let mut agent = seeded_agent(2, 0);
    let action = agent
        .compute_next_action(&SubtractionGame::new(2), Duration::ZERO)
        .expect("legal actions exist");

    assert_eq!(action, 2, "greedy choice takes the immediate win");
    let stats = agent.stats().expect("agent is set up");
    assert!(stats.greedy_fallback);
    assert_eq!(stats.rounds, 0);
}

#[test]
fn test_cancelled_search_still_answers() {
    let cancel = Arc::new(AtomicBool::new(true));
    let mut agent: Agent<SubtractionGame> = Agent::new().with_cancellation(cancel);
    agent.set_up(2, 0).expect("valid agent index");

    let action = agent
        .compute_next_action(&SubtractionGame::new(7), Duration::from_secs(30))
        .expect("legal actions exist");

    assert!(SubtractionGame::new(7).legal_actions().contains(&action));
    assert!(agent.stats().expect("agent is set up").greedy_fallback);
}

#[test]
fn test_finds_winning_moves() {
    // from n tokens the winning move leaves a multiple of three
    for tokens in [1, 2, 4, 5, 7, 8, 10, 11] {
        let mut agent = seeded_agent(2, 0);
        let action = agent
            .compute_next_action(&SubtractionGame::new(tokens), BUDGET)
            .expect("legal actions exist");
        assert_eq!((tokens - action) % 3, 0, "tokens {}", tokens);

        let value = agent.root_evaluation().expect("root is evaluated");
        assert_eq!(value.utility, 1.0);
    }
}

#[test]
fn test_losing_position_is_recognised() {
    let mut agent = seeded_agent(2, 0);
    agent
        .compute_next_action(&SubtractionGame::new(9), BUDGET)
        .expect("legal actions exist");
    let value = agent.root_evaluation().expect("root is evaluated");
    assert_eq!(value.utility, -1.0);
}

#[test]
fn test_self_play_follows_theory() {
    for tokens in 1..=10 {
        let expected = if tokens % 3 == 0 { [0.0, 1.0] } else { [1.0, 0.0] };
        assert_eq!(self_play(SubtractionGame::new(tokens)), expected, "tokens {}", tokens);
    }
}

#[test]
fn test_ply_limit_forces_a_draw() {
    let outcome = self_play(SubtractionGame::new(4).with_ply_limit(2));
    assert_eq!(outcome, [0.5, 0.5]);
}

#[test]
fn test_wins_from_either_seat_against_random_play() {
    for seed in 0..5 {
        assert_eq!(play_random_opponent(SubtractionGame::new(8), 0, seed), [1.0, 0.0]);
        assert_eq!(play_random_opponent(SubtractionGame::new(9), 1, seed), [0.0, 1.0]);
    }
}

#[test]
fn test_tree_is_reused_between_calls() {
    let mut agent = seeded_agent(2, 0);
    let start = SubtractionGame::new(10);
    let action = agent
        .compute_next_action(&start, BUDGET)
        .expect("legal actions exist");
    let reply = start.apply(&action).apply(&1);

    agent
        .compute_next_action(&reply, BUDGET)
        .expect("legal actions exist");

    let tree = agent.tree().expect("tree is kept");
    let root = tree.node(tree.root());
    assert_eq!(root.state(), &reply);
    assert_eq!(root.depth(), 2, "root was found among the explored nodes");
}

#[test]
fn test_unknown_state_restarts_the_tree() {
    let mut agent = seeded_agent(2, 0);
    agent
        .compute_next_action(&SubtractionGame::new(10), BUDGET)
        .expect("legal actions exist");
    let unrelated = SubtractionGame::new(5).with_max_take(3);

    agent
        .compute_next_action(&unrelated, BUDGET)
        .expect("legal actions exist");

    let tree = agent.tree().expect("tree is kept");
    assert_eq!(tree.node(tree.root()).state(), &unrelated);
    assert_eq!(tree.node(tree.root()).depth(), 0);
}

#[test]
fn test_solved_line_takes_the_fast_path() {
    let mut agent = seeded_agent(2, 0);
    let start = SubtractionGame::new(7);
    let action = agent
        .compute_next_action(&start, BUDGET)
        .expect("legal actions exist");
    assert_eq!(action, 1);
    assert!(!agent.stats().expect("agent is set up").fast_path);

    let reply = start.apply(&action).apply(&1);
    let action = agent
        .compute_next_action(&reply, BUDGET)
        .expect("legal actions exist");

    assert_eq!(action, 2);
    let stats = agent.stats().expect("agent is set up");
    assert!(stats.fast_path);
    assert_eq!(stats.rounds, 0);
}

#[test]
fn test_tear_down_forgets_the_match() {
    let mut agent = seeded_agent(2, 0);
    agent
        .compute_next_action(&SubtractionGame::new(7), BUDGET)
        .expect("legal actions exist");
    assert!(agent.tree_size() > 1);

    agent.tear_down();
    assert_eq!(agent.tree_size(), 0);
    assert!(agent.stats().is_none());
    assert_eq!(
        agent.compute_next_action(&SubtractionGame::new(7), BUDGET),
        Err(SearchError::NotSetUp)
    );
}

#[test]
fn test_depth_stays_within_configured_maximum() {
    let config = AgentConfig {
        max_depth: 3,
        seed: Some(3),
        ..AgentConfig::default()
    };
    let mut agent: Agent<SubtractionGame> = Agent::with_config(config);
    agent.set_up(2, 0).expect("valid agent index");
    agent
        .compute_next_action(&SubtractionGame::new(30), BUDGET)
        .expect("legal actions exist");

    let stats = agent.stats().expect("agent is set up");
    assert!(stats.last_depth <= 3);
    assert!(stats.rounds >= 1);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Choice {
    Safe,
    Gamble,
    Heads,
    Tails,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Start,
    Flip,
    Settled([u8; 2]),
}

/// Player 0 either settles for a draw or lets a biased coin decide.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CoinGamble {
    stage: Stage,
    heads_percent: u32,
    last: Option<Choice>,
}

impl CoinGamble {
    fn new(heads_percent: u32) -> Self {
        Self {
            stage: Stage::Start,
            heads_percent,
            last: None,
        }
    }
}

impl GameState for CoinGamble {
    type Action = Choice;

    fn player_count(&self) -> usize {
        2
    }

    fn mover(&self) -> Mover {
        match self.stage {
            Stage::Flip => Mover::Nature,
            _ => Mover::Player(0),
        }
    }

    fn legal_actions(&self) -> Vec<Choice> {
        match self.stage {
            Stage::Start => vec![Choice::Safe, Choice::Gamble],
            Stage::Flip => vec![Choice::Heads, Choice::Tails],
            Stage::Settled(_) => vec![],
        }
    }

    fn apply(&self, action: &Choice) -> Self {
        let stage = match action {
            Choice::Safe => Stage::Settled([1, 1]),
            Choice::Gamble => Stage::Flip,
            Choice::Heads => Stage::Settled([2, 0]),
            Choice::Tails => Stage::Settled([0, 2]),
        };
        Self {
            stage,
            heads_percent: self.heads_percent,
            last: Some(*action),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self.stage, Stage::Settled(_))
    }

    fn utility(&self, weights: &EvaluationWeights) -> f64 {
        match self.stage {
            Stage::Settled(scores) => {
                weights.weigh(&[scores[0] as f64 / 2.0, scores[1] as f64 / 2.0])
            }
            _ => 0.0,
        }
    }

    fn previous_action(&self) -> Option<&Choice> {
        self.last.as_ref()
    }

    fn sample_resolution<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Choice> {
        match self.stage {
            Stage::Flip if rng.gen_range(0..100) < self.heads_percent => Some(Choice::Heads),
            Stage::Flip => Some(Choice::Tails),
            _ => None,
        }
    }
}

fn gamble_decision(heads_percent: u32) -> Choice {
    let config = AgentConfig {
        seed: Some(5),
        ..AgentConfig::default()
    };
    let mut agent: Agent<CoinGamble> = Agent::with_config(config);
    agent.set_up(2, 0).expect("valid agent index");
    let choice = agent
        .compute_next_action(&CoinGamble::new(heads_percent), BUDGET)
        .expect("legal actions exist");
    assert!(agent.stats().expect("agent is set up").chance_samples > 0);
    choice
}

#[test]
fn test_takes_a_favourable_gamble() {
    assert_eq!(gamble_decision(90), Choice::Gamble);
}

#[test]
fn test_avoids_an_unfavourable_gamble() {
    assert_eq!(gamble_decision(10), Choice::Safe);
}

#[test]
fn test_unfinished_round_does_not_change_the_choice() {
    let trip = Arc::new(AtomicBool::new(false));
    let config = AgentConfig {
        check_interval: 1,
        seed: Some(9),
        ..AgentConfig::default()
    };
    let mut agent: Agent<Tripwire> = Agent::with_config(config).with_cancellation(trip.clone());
    agent.set_up(2, 0).expect("valid agent index");

    let action = agent
        .compute_next_action(&Tripwire::new(trip.clone()), BUDGET)
        .expect("legal actions exist");

    assert!(trip.load(std::sync::atomic::Ordering::Relaxed));
    assert_eq!(action, 1);
    let stats = agent.stats().expect("agent is set up");
    assert_eq!(stats.rounds, 2);
    assert!(!stats.guaranteed_pass);
}
