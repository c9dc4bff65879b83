use std::{
    collections::{HashSet, VecDeque},
    fmt::{self, Display},
    str::FromStr,
    time::{Duration, Instant},
};

use log::{debug, info, trace, warn};

use crate::{BoardError, BoardState, Move, ParseMethodError};

/// Move `tile` so that its top-left cell is `target`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Goal {
    pub tile: String,
    pub target: (usize, usize),
}

impl Goal {
    pub fn new(tile: impl Into<String>, target: (usize, usize)) -> Goal {
        Goal {
            tile: tile.into(),
            target,
        }
    }

    pub fn is_met(&self, state: &BoardState) -> bool {
        matches!(state.tile_location(&self.tile), Ok(at) if at == self.target)
    }
}

impl Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {:?}", self.tile, self.target)
    }
}

/// Frontier discipline of the search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// First in, first out. Finds a shortest solution.
    #[default]
    Bfs,
    /// Last in, first out. Finds some solution, usually with a smaller frontier.
    Dfs,
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Bfs => "bfs",
            Method::Dfs => "dfs",
        })
    }
}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(Method::Bfs),
            "dfs" => Ok(Method::Dfs),
            _ => Err(ParseMethodError::new(s)),
        }
    }
}

/// Bounds after which a search gives up. The default has none.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_expansions: Option<usize>,
    pub max_duration: Option<Duration>,
}

impl SearchLimits {
    pub fn with_max_expansions(mut self, max: usize) -> SearchLimits {
        self.max_expansions = Some(max);
        self
    }

    pub fn with_max_duration(mut self, max: Duration) -> SearchLimits {
        self.max_duration = Some(max);
        self
    }

    // the clock is read only when a duration bound is set
    fn exceeded(&self, expanded: usize, started: Instant) -> Option<Limit> {
        if self.max_expansions.map_or(false, |max| expanded >= max) {
            return Some(Limit::Expansions);
        }
        let max = self.max_duration?;
        (started.elapsed() >= max).then_some(Limit::Duration)
    }
}

/// Which of the [`SearchLimits`] stopped a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Limit {
    Expansions,
    Duration,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Ready,
    Running,
    Solved,
    /// The frontier ran dry or a limit was hit.
    Exhausted,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions taken off the frontier and expanded; the goal position is not counted.
    pub expanded: usize,
    /// Successor positions produced, duplicates included.
    pub generated: usize,
    /// Distinct positions seen, the initial one included.
    pub discovered: usize,
    pub elapsed: Duration,
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expanded {} positions ({} distinct, {} generated) in {:.3?}",
            self.expanded, self.discovered, self.generated, self.elapsed
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub state: BoardState,
    /// The move that led here from the previous step; `None` for the first step.
    pub action: Option<Move>,
}

/// A sequence of boards from the initial position to one satisfying the goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of moves, one less than the number of boards.
    pub fn len(&self) -> usize {
        self.steps.len() - 1
    }

    /// Whether the initial board already met the goal.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn states(&self) -> impl Iterator<Item = &BoardState> + '_ {
        self.steps.iter().map(|step| &step.state)
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> + '_ {
        self.steps.iter().filter_map(|step| step.action.as_ref())
    }

    pub fn initial(&self) -> &BoardState {
        &self.steps[0].state
    }

    pub fn final_state(&self) -> &BoardState {
        &self.steps[self.steps.len() - 1].state
    }

    /// The steps in playback form: a `Step k` banner, the grid, then the
    /// move label in brackets, or a blank line for the first board.
    pub fn trace(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(k, step)| {
                let label = match &step.action {
                    Some(action) => format!("[{action}]"),
                    None => String::new(),
                };
                format!("-------\nStep {k}\n-------\n{}\n{label}\n", step.state)
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub enum Outcome {
    Solved {
        path: Path,
        stats: SearchStats,
    },
    /// Every reachable position was expanded without meeting the goal.
    NoSolution { stats: SearchStats },
    CutOff {
        limit: Limit,
        stats: SearchStats,
    },
}

impl Outcome {
    pub fn stats(&self) -> &SearchStats {
        match self {
            Outcome::Solved { stats, .. }
            | Outcome::NoSolution { stats }
            | Outcome::CutOff { stats, .. } => stats,
        }
    }

    /// The exploration step count: positions expanded before the search ended.
    pub fn explored(&self) -> usize {
        self.stats().expanded
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Outcome::Solved { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            Outcome::Solved { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Uninformed search from one starting board towards one goal.
///
/// The goal is fixed when the solver is built; a different goal needs a
/// different solver.
#[derive(Clone, Debug)]
pub struct Solver {
    initial: BoardState,
    goal: Goal,
    method: Method,
    limits: SearchLimits,
    status: Status,
}

impl Solver {
    /// Fails with [`BoardError::UnknownTile`] if the goal names a tile the board does not have.
    pub fn new(initial: BoardState, goal: Goal, method: Method) -> Result<Solver, BoardError> {
        initial.tile_location(&goal.tile)?;
        Ok(Solver {
            initial,
            goal,
            method,
            limits: SearchLimits::default(),
            status: Status::Ready,
        })
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Solver {
        self.limits = limits;
        self
    }

    pub fn initial(&self) -> &BoardState {
        &self.initial
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Runs the search to completion. Every call starts over from the initial board.
    pub fn solve(&mut self) -> Outcome {
        self.status = Status::Running;
        info!(
            "searching {}x{} board for {} ({}, {} tiles)",
            self.initial.width(),
            self.initial.height(),
            self.goal,
            self.method,
            self.initial.mode()
        );

        let started = Instant::now();
        let mut stats = SearchStats::default();
        let mut arena = vec![Node {
            state: self.initial.clone(),
            parent: None,
        }];
        let mut visited = HashSet::new();
        visited.insert(self.initial.canonical_key());
        let mut frontier = Frontier::new(self.method);
        frontier.push(0);

        let end = loop {
            let Some(current) = frontier.pop() else {
                break End::Exhausted;
            };

            if self.goal.is_met(&arena[current].state) {
                break End::Found(current);
            }

            if let Some(limit) = self.limits.exceeded(stats.expanded, started) {
                break End::CutOff(limit);
            }

            stats.expanded += 1;
            let successors = {
                let state = &arena[current].state;
                trace!("expanding position {current}:\n{state}");
                state
                    .generate_possible_moves()
                    .into_iter()
                    .filter_map(|m| match state.apply(&m) {
                        Ok(next) => Some((m, next)),
                        Err(err) => {
                            warn!("skipping successor: {err}");
                            None
                        }
                    })
                    .collect::<Vec<_>>()
            };

            for (m, next) in successors {
                stats.generated += 1;
                if visited.insert(next.canonical_key()) {
                    arena.push(Node {
                        state: next,
                        parent: Some((current, m)),
                    });
                    frontier.push(arena.len() - 1);
                }
            }
        };

        stats.discovered = arena.len();
        stats.elapsed = started.elapsed();

        let outcome = match end {
            End::Found(index) => {
                let path = reconstruct(&arena, index);
                debug!("solved in {} moves: {}", path.len(), stats);
                Outcome::Solved { path, stats }
            }
            End::Exhausted => {
                debug!("no solution: {}", stats);
                Outcome::NoSolution { stats }
            }
            End::CutOff(limit) => {
                debug!("stopped at {:?} limit: {}", limit, stats);
                Outcome::CutOff { limit, stats }
            }
        };

        self.status = match outcome {
            Outcome::Solved { .. } => Status::Solved,
            _ => Status::Exhausted,
        };
        outcome
    }
}

/// Builds a [`Solver`] and runs it once.
pub fn solve(initial: &BoardState, goal: &Goal, method: Method) -> Result<Outcome, BoardError> {
    Ok(Solver::new(initial.clone(), goal.clone(), method)?.solve())
}

// a discovered position; the arena index of the parent is always smaller than the node's own
struct Node {
    state: BoardState,
    parent: Option<(usize, Move)>,
}

enum End {
    Found(usize),
    Exhausted,
    CutOff(Limit),
}

enum Frontier {
    Queue(VecDeque<usize>),
    Stack(Vec<usize>),
}

impl Frontier {
    fn new(method: Method) -> Frontier {
        match method {
            Method::Bfs => Frontier::Queue(VecDeque::new()),
            Method::Dfs => Frontier::Stack(Vec::new()),
        }
    }

    fn push(&mut self, index: usize) {
        match self {
            Frontier::Queue(queue) => queue.push_back(index),
            Frontier::Stack(stack) => stack.push(index),
        }
    }

    fn pop(&mut self) -> Option<usize> {
        match self {
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Stack(stack) => stack.pop(),
        }
    }
}

fn reconstruct(arena: &[Node], goal: usize) -> Path {
    let mut steps = Vec::new();
    let mut index = goal;
    loop {
        let node = &arena[index];
        match &node.parent {
            Some((parent, m)) => {
                debug_assert!(*parent < index, "parent link does not point backwards");
                steps.push(Step {
                    state: node.state.clone(),
                    action: Some(m.clone()),
                });
                index = *parent;
            }
            None => {
                steps.push(Step {
                    state: node.state.clone(),
                    action: None,
                });
                break;
            }
        }
    }

    steps.reverse();
    Path { steps }
}

#[cfg(test)]
mod test {
    use pathfinding::directed::bfs::bfs;

    use super::*;
    use crate::{board::Keyed, layout::parse_layout, Puzzle, Tile, TileMode};

    fn warmup() -> BoardState {
        Puzzle::warmup(TileMode::Distinct)
            .unwrap()
            .initial()
            .clone()
    }

    // replays the path from its first board and checks it ends on the goal
    fn assert_valid(path: &Path, goal: &Goal) {
        let mut board = path.initial().clone();
        assert_eq!(path.steps()[0].action, None);
        for step in &path.steps()[1..] {
            let action = step.action.as_ref().unwrap();
            board = board.apply(action).unwrap();
            assert_eq!(board, step.state);
        }
        assert!(goal.is_met(path.final_state()));
        assert_eq!(path.moves().count(), path.len());
    }

    #[test]
    fn bfs_moves_block_to_far_corner() {
        let goal = Goal::new("cao", (1, 1));
        let mut solver = Solver::new(warmup(), goal.clone(), Method::Bfs).unwrap();
        assert_eq!(solver.status(), Status::Ready);

        let outcome = solver.solve();
        assert_eq!(solver.status(), Status::Solved);
        assert_eq!(outcome.explored(), 3);
        assert_eq!(outcome.stats().discovered, 4);
        assert_eq!(outcome.stats().generated, 6);

        let path = outcome.path().unwrap();
        assert_valid(path, &goal);
        let labels: Vec<_> = path.moves().map(Move::to_string).collect();
        assert_eq!(labels, ["cao-E", "cao-S"]);
        let spots: Vec<_> = path
            .states()
            .map(|s| s.tile_location("cao").unwrap())
            .collect();
        assert_eq!(spots, [(0, 0), (1, 0), (1, 1)]);
    }

    #[test]
    fn dfs_follows_latest_move_first() {
        let goal = Goal::new("cao", (1, 1));
        let outcome = solve(&warmup(), &goal, Method::Dfs).unwrap();
        assert_eq!(outcome.explored(), 2);
        let path = outcome.into_path().unwrap();
        assert_valid(&path, &goal);
        let labels: Vec<_> = path.moves().map(Move::to_string).collect();
        assert_eq!(labels, ["cao-S", "cao-E"]);
    }

    #[test]
    fn goal_already_met() {
        for method in [Method::Bfs, Method::Dfs] {
            let outcome = solve(&warmup(), &Goal::new("cao", (0, 0)), method).unwrap();
            assert_eq!(outcome.explored(), 0);
            let path = outcome.path().unwrap();
            assert_eq!(path.steps().len(), 1);
            assert_eq!(path.len(), 0);
            assert_eq!(path.final_state(), &warmup());
        }
    }

    #[test]
    fn unknown_goal_tile_is_rejected_up_front() {
        let err = Solver::new(warmup(), Goal::new("guan", (0, 0)), Method::Bfs).unwrap_err();
        assert_eq!(
            err,
            BoardError::UnknownTile {
                name: "guan".to_owned()
            }
        );
    }

    #[test]
    fn unreachable_goal_terminates() {
        for method in [Method::Bfs, Method::Dfs] {
            // a 2x2 block can never have its corner at (2, 2) on a 3x3 board
            let mut solver = Solver::new(warmup(), Goal::new("cao", (2, 2)), method).unwrap();
            let outcome = solver.solve();
            assert!(matches!(outcome, Outcome::NoSolution { .. }));
            assert_eq!(outcome.explored(), 4);
            assert_eq!(solver.status(), Status::Exhausted);
        }
    }

    #[test]
    fn expansion_limit_cuts_search_short() {
        let puzzle = Puzzle::huarongdao(TileMode::Interchangeable).unwrap();
        let mut solver = Solver::new(puzzle.initial().clone(), puzzle.goal().clone(), Method::Bfs)
            .unwrap()
            .with_limits(SearchLimits::default().with_max_expansions(10));
        let outcome = solver.solve();
        assert!(matches!(
            outcome,
            Outcome::CutOff {
                limit: Limit::Expansions,
                ..
            }
        ));
        assert_eq!(outcome.explored(), 10);
        assert_eq!(solver.status(), Status::Exhausted);
    }

    #[test]
    fn duration_limit_cuts_search_short() {
        let puzzle = Puzzle::huarongdao(TileMode::Interchangeable).unwrap();
        let mut solver = Solver::new(puzzle.initial().clone(), puzzle.goal().clone(), Method::Dfs)
            .unwrap()
            .with_limits(SearchLimits::default().with_max_duration(Duration::ZERO));
        let outcome = solver.solve();
        assert!(matches!(
            outcome,
            Outcome::CutOff {
                limit: Limit::Duration,
                ..
            }
        ));
        assert_eq!(outcome.explored(), 0);
    }

    #[test]
    fn limits_check_expansions_before_time() {
        let started = Instant::now();
        assert_eq!(SearchLimits::default().exceeded(usize::MAX, started), None);

        let limits = SearchLimits::default().with_max_expansions(3);
        assert_eq!(limits.exceeded(2, started), None);
        assert_eq!(limits.exceeded(3, started), Some(Limit::Expansions));

        let limits = limits.with_max_duration(Duration::ZERO);
        assert_eq!(limits.exceeded(2, started), Some(Limit::Duration));
        assert_eq!(limits.exceeded(3, started), Some(Limit::Expansions));

        let hour = Duration::from_secs(3600);
        let generous = SearchLimits::default().with_max_duration(hour);
        assert_eq!(generous.exceeded(usize::MAX, started), None);
    }

    #[test]
    fn trace_lists_each_step() {
        let outcome = solve(&warmup(), &Goal::new("cao", (1, 1)), Method::Bfs).unwrap();
        let path = outcome.path().unwrap();
        assert_eq!(path.len(), 2);
        assert!(!path.is_empty());
        assert_eq!(
            path.trace(),
            "-------\nStep 0\n-------\n11.\n11.\n...\n\n\
             -------\nStep 1\n-------\n.11\n.11\n...\n[cao-E]\n\
             -------\nStep 2\n-------\n...\n.11\n.11\n[cao-S]\n"
        );
    }

    #[test]
    fn trace_of_a_solved_start_has_one_block() {
        let outcome = solve(&warmup(), &Goal::new("cao", (0, 0)), Method::Bfs).unwrap();
        let path = outcome.into_path().unwrap();
        assert!(path.is_empty());
        assert_eq!(path.trace(), "-------\nStep 0\n-------\n11.\n11.\n...\n\n");
    }

    #[test]
    fn solver_can_run_again() {
        let mut solver = Solver::new(warmup(), Goal::new("cao", (1, 1)), Method::Bfs).unwrap();
        let first = solver.solve().into_path().unwrap();
        let second = solver.solve().into_path().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bfs_matches_independent_shortest_path() {
        let layouts = [
            ("AA.\nAA1\n2..", Goal::new("A", (1, 1))),
            ("A1.\n23.\n4..", Goal::new("1", (2, 2))),
            ("AB.\nCC.\n.D.", Goal::new("C", (1, 2))),
        ];
        for (layout, goal) in layouts {
            let board = parse_layout(layout, TileMode::Distinct).unwrap();
            let oracle = bfs(
                &Keyed::new(board.clone()),
                |node| node.state.successors().map(Keyed::new).collect::<Vec<_>>(),
                |node| goal.is_met(&node.state),
            )
            .unwrap();

            let bfs_path = solve(&board, &goal, Method::Bfs)
                .unwrap()
                .into_path()
                .unwrap();
            assert_valid(&bfs_path, &goal);
            assert_eq!(bfs_path.len(), oracle.len() - 1, "layout {layout:?}");

            let dfs_path = solve(&board, &goal, Method::Dfs)
                .unwrap()
                .into_path()
                .unwrap();
            assert_valid(&dfs_path, &goal);
            assert!(dfs_path.len() >= bfs_path.len());
        }
    }

    #[test]
    fn interchangeable_tiles_shrink_the_search() {
        let layout = "
            AA1
            AA2
            3..
            45.
        ";
        let goal = Goal::new("A", (1, 2));
        let distinct = parse_layout(layout, TileMode::Distinct).unwrap();
        let shaped = parse_layout(layout, TileMode::Interchangeable).unwrap();

        let a = solve(&distinct, &goal, Method::Bfs).unwrap();
        let b = solve(&shaped, &goal, Method::Bfs).unwrap();
        assert_valid(a.path().unwrap(), &goal);
        assert_valid(b.path().unwrap(), &goal);
        // the goal tile has a unique shape, so both searches find equally short paths
        assert_eq!(a.path().unwrap().len(), b.path().unwrap().len());
        assert!(b.stats().discovered < a.stats().discovered);
    }

    #[test]
    fn solves_huarongdao() {
        let puzzle = Puzzle::huarongdao(TileMode::Interchangeable).unwrap();
        let outcome = solve(puzzle.initial(), puzzle.goal(), Method::Bfs).unwrap();
        let path = outcome.path().unwrap();
        assert_valid(path, puzzle.goal());
        assert!(outcome.explored() > 0);
        assert_eq!(
            path.final_state().occupant((1, 4)).map(Tile::name),
            Some("cao")
        );
    }

    #[test]
    fn method_parses() {
        assert_eq!("bfs".parse(), Ok(Method::Bfs));
        assert_eq!("DFS".parse(), Ok(Method::Dfs));
        assert!("astar".parse::<Method>().is_err());
        assert_eq!(Method::Dfs.to_string(), "dfs");
    }
}
