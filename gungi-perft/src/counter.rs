//! Iterative depth-first walk of the action tree.
//!
//! Every legal action is a distinct edge: placements of duplicate reserve
//! kinds are collapsed, moves onto opponent squares count once as a capture
//! and once as a stack.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gungi_core::{Action, GameState, Resolution};
use tracing::{info, warn};

/// Stack frame for iterative DFS.
struct Frame {
    /// State at this node
    state: GameState,
    /// All legal actions from this node
    actions: Vec<Action>,
    /// Index of next action to explore
    next: usize,
}

impl Frame {
    fn new(state: GameState) -> Frame {
        let actions = state.legal_actions();
        Frame {
            state,
            actions,
            next: 0,
        }
    }
}

/// Tallies for one walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    /// Nodes visited, root included
    pub nodes: u64,
    /// Nodes at exactly the requested depth (the perft number)
    pub leaves: u64,
    /// Edges by kind
    pub placements: u64,
    pub moves: u64,
    pub captures: u64,
    pub stacks_on_opponent: u64,
    /// Game-over nodes, indexed by winner
    pub wins: [u64; 2],
    /// Edges the engine rejected (should stay zero)
    pub rejected: u64,
}

impl Counts {
    fn add(&mut self, other: &Counts) {
        self.nodes += other.nodes;
        self.leaves += other.leaves;
        self.placements += other.placements;
        self.moves += other.moves;
        self.captures += other.captures;
        self.stacks_on_opponent += other.stacks_on_opponent;
        self.wins[0] += other.wins[0];
        self.wins[1] += other.wins[1];
        self.rejected += other.rejected;
    }

    fn tally(&mut self, action: &Action) {
        match action {
            Action::Place { .. } => self.placements += 1,
            Action::Move { resolution: None, .. } => self.moves += 1,
            Action::Move {
                resolution: Some(Resolution::Capture),
                ..
            } => self.captures += 1,
            Action::Move {
                resolution: Some(Resolution::Stack),
                ..
            } => self.stacks_on_opponent += 1,
        }
    }
}

/// Result of a walk.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub counts: Counts,
    /// False if the walk was interrupted
    pub complete: bool,
}

/// Walks the tree below a position to a fixed depth.
pub struct Counter {
    depth: u32,
    log_interval: Duration,
    running: Arc<AtomicBool>,
}

impl Counter {
    pub fn new(depth: u32, log_interval: Duration, running: Arc<AtomicBool>) -> Counter {
        Counter {
            depth,
            log_interval,
            running,
        }
    }

    /// Count every node below `root`.
    pub fn count(&self, root: &GameState) -> Outcome {
        let mut counts = Counts {
            nodes: 1,
            ..Counts::default()
        };
        if self.depth == 0 {
            counts.leaves = 1;
            return Outcome {
                counts,
                complete: true,
            };
        }

        let start = Instant::now();
        let mut last_log = start;
        let mut stack = vec![Frame::new(root.clone())];

        while let Some(frame) = stack.last_mut() {
            if !self.running.load(Ordering::SeqCst) {
                return Outcome {
                    counts,
                    complete: false,
                };
            }

            if frame.next >= frame.actions.len() {
                stack.pop();
                continue;
            }
            let action = frame.actions[frame.next];
            frame.next += 1;

            let child = match frame.state.apply(&action) {
                Ok(child) => child,
                Err(e) => {
                    warn!(?action, error = %e, "engine rejected its own legal action");
                    counts.rejected += 1;
                    continue;
                }
            };

            counts.tally(&action);
            counts.nodes += 1;

            let depth = stack.len() as u32;
            if depth == self.depth {
                counts.leaves += 1;
            }
            if let Some(winner) = child.winner() {
                counts.wins[winner.index()] += 1;
            } else if depth < self.depth {
                stack.push(Frame::new(child));
            }

            if last_log.elapsed() >= self.log_interval {
                let elapsed = start.elapsed().as_secs_f64();
                info!(
                    nodes = counts.nodes,
                    rate = format!("{:.0}/s", counts.nodes as f64 / elapsed),
                    depth = stack.len(),
                    "progress"
                );
                last_log = Instant::now();
            }
        }

        Outcome {
            counts,
            complete: true,
        }
    }

    /// Count each root action's subtree separately.
    pub fn divide(&self, root: &GameState) -> (Vec<(Action, Counts)>, Outcome) {
        let mut total = Counts {
            nodes: 1,
            ..Counts::default()
        };
        let mut per_action = Vec::new();

        if self.depth == 0 {
            total.leaves = 1;
            return (per_action, Outcome { counts: total, complete: true });
        }

        let child_counter = Counter::new(self.depth - 1, self.log_interval, self.running.clone());
        for action in root.legal_actions() {
            let child = match root.apply(&action) {
                Ok(child) => child,
                Err(e) => {
                    warn!(?action, error = %e, "engine rejected its own legal action");
                    total.rejected += 1;
                    continue;
                }
            };

            let mut counts = if let Some(winner) = child.winner() {
                let mut counts = Counts {
                    nodes: 1,
                    leaves: u64::from(self.depth == 1),
                    ..Counts::default()
                };
                counts.wins[winner.index()] += 1;
                counts
            } else {
                let outcome = child_counter.count(&child);
                if !outcome.complete {
                    total.add(&outcome.counts);
                    return (per_action, Outcome { counts: total, complete: false });
                }
                outcome.counts
            };
            counts.tally(&action);

            total.add(&counts);
            per_action.push((action, counts));
        }

        (per_action, Outcome { counts: total, complete: true })
    }
}
