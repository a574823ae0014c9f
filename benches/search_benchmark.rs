use std::time::Duration;

use abagent::agent::{Agent, AgentConfig};
use abagent::alpha_beta_searcher::{
    label_alpha_beta, DepthCoefficients, DepthController, GameState, SearchContext, SearchTree,
    TimeBudget,
};
use abagent::games::SubtractionGame;

use criterion::{criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("alpha beta pass depth 12", |b| {
        b.iter(|| label_pass(SubtractionGame::new(25), 12))
    });
    c.bench_function("alpha beta pass depth 12 take 3", |b| {
        b.iter(|| label_pass(SubtractionGame::new(25).with_max_take(3), 12))
    });
    c.bench_function("self play 12 tokens", |b| {
        b.iter(|| self_play(SubtractionGame::new(12), Duration::from_millis(20)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn label_pass(game: SubtractionGame, depth: u32) -> usize {
    let controller = DepthController::new(64, DepthCoefficients::default());
    let mut context = SearchContext::new(2, 0, controller, Some(1));
    let mut tree = SearchTree::new(game);
    let budget = TimeBudget::new(Duration::from_secs(60), 0.9);
    label_alpha_beta(&mut context, &mut tree, &budget, depth);
    tree.len()
}

fn self_play(start: SubtractionGame, budget: Duration) -> Option<[f64; 2]> {
    let mut agents: Vec<Agent<SubtractionGame>> = (0..2)
        .map(|seat| {
            let mut agent = Agent::with_config(AgentConfig {
                seed: Some(seat as u64),
                ..AgentConfig::default()
            });
            agent.set_up(2, seat).unwrap();
            agent
        })
        .collect();

    let mut state = start;
    while state.outcome().is_none() {
        let action = agents[state.to_move()]
            .compute_next_action(&state, budget)
            .unwrap();
        state = state.apply(&action);
    }
    state.outcome()
}
