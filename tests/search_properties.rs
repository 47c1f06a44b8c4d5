use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stepwise_pathfinding::simulation::optimal_cost;
use stepwise_pathfinding::{
    Algorithm, Cell, Grid, GridError, RandomSpawner, SearchProcess, SearchStatus, Simulation,
};

const STEP_CAP: usize = 2_000_000;

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (2usize..=8, 2usize..=8)
        .prop_flat_map(|(rows, cols)| {
            let cells = rows * cols;
            (
                Just(rows),
                Just(cols),
                0..cells,
                1..cells,
                prop::collection::vec(prop::bool::weighted(0.3), cells),
            )
        })
        .prop_map(|(rows, cols, start, offset, walls)| {
            let at = |index: usize| Cell::new(index / cols, index % cols);
            let target = (start + offset) % (rows * cols);
            let mut grid = Grid::new(rows, cols, at(start), at(target)).unwrap();
            for (index, wall) in walls.into_iter().enumerate() {
                if wall {
                    // Endpoints reject walls; skipping them is fine here.
                    grid.set_static_wall(at(index), true).ok();
                }
            }
            grid
        })
}

/// Steps to completion, returning the explored-set size after every step.
fn run_to_end(grid: &Grid, algorithm: Algorithm) -> (SearchProcess, Vec<usize>) {
    let mut process = SearchProcess::start(grid, algorithm);
    let mut sizes = Vec::new();
    loop {
        let result = process.advance_one_step(grid);
        sizes.push(result.explored.len());
        if result.status.is_terminal() {
            break;
        }
        assert!(sizes.len() < STEP_CAP, "{algorithm} did not terminate");
    }
    (process, sizes)
}

/// Where a wall edit is aimed.
#[derive(Debug, Clone)]
enum Aim {
    Start,
    Target,
    Inside(prop::sample::Index),
    Outside(usize),
}

impl Aim {
    fn cell(&self, grid: &Grid) -> Cell {
        match self {
            Aim::Start => grid.start(),
            Aim::Target => grid.target(),
            Aim::Inside(index) => {
                let index = index.index(grid.rows() * grid.cols());
                Cell::new(index / grid.cols(), index % grid.cols())
            }
            Aim::Outside(offset) => Cell::new(grid.rows() + offset, 0),
        }
    }

    fn is_endpoint(&self) -> bool {
        matches!(self, Aim::Start | Aim::Target)
    }
}

#[derive(Debug, Clone)]
enum WallOp {
    Paint(Aim, bool),
    Place(Aim),
    Spawn(u64),
    Randomize(f64, u64),
    ClearAll,
    ClearDynamic,
}

fn aim_strategy() -> impl Strategy<Value = Aim> {
    prop_oneof![
        2 => Just(Aim::Start),
        2 => Just(Aim::Target),
        5 => any::<prop::sample::Index>().prop_map(Aim::Inside),
        1 => (0usize..3).prop_map(Aim::Outside),
    ]
}

fn wall_op_strategy() -> impl Strategy<Value = WallOp> {
    prop_oneof![
        4 => (aim_strategy(), any::<bool>()).prop_map(|(aim, present)| WallOp::Paint(aim, present)),
        4 => aim_strategy().prop_map(WallOp::Place),
        2 => any::<u64>().prop_map(WallOp::Spawn),
        1 => (-0.5f64..1.5, any::<u64>()).prop_map(|(density, seed)| WallOp::Randomize(density, seed)),
        1 => Just(WallOp::ClearAll),
        1 => Just(WallOp::ClearDynamic),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wall_edits_never_cover_the_endpoints(
        grid in grid_strategy(),
        ops in prop::collection::vec(wall_op_strategy(), 1..40),
    ) {
        let mut grid = grid;
        let path = vec![grid.start(), grid.target()];
        for op in &ops {
            match op {
                WallOp::Paint(aim, present) => {
                    let result = grid.set_static_wall(aim.cell(&grid), *present);
                    if aim.is_endpoint() {
                        prop_assert!(matches!(result, Err(GridError::ReservedCell(_))), "{:?}", op);
                    }
                }
                WallOp::Place(aim) => {
                    let result = grid.place_dynamic_obstacle(aim.cell(&grid), &path);
                    if aim.is_endpoint() {
                        prop_assert!(matches!(result, Err(GridError::ReservedCell(_))), "{:?}", op);
                    } else if let Ok(hit) = result {
                        // The only path cells are the endpoints.
                        prop_assert!(!hit);
                    }
                }
                WallOp::Spawn(seed) => {
                    let hit = grid.spawn_dynamic_obstacle(&path, &mut StdRng::seed_from_u64(*seed));
                    prop_assert!(!hit);
                }
                WallOp::Randomize(density, seed) => {
                    let before = grid.clone();
                    let result = grid.randomize(*density, &mut StdRng::seed_from_u64(*seed));
                    if result.is_err() {
                        prop_assert_eq!(grid.static_walls(), before.static_walls());
                        prop_assert_eq!(grid.dynamic_walls(), before.dynamic_walls());
                    }
                }
                WallOp::ClearAll => grid.clear_walls(),
                WallOp::ClearDynamic => grid.clear_dynamic_walls(),
            }
            for endpoint in [grid.start(), grid.target()] {
                prop_assert!(!grid.static_walls().contains(&endpoint), "{:?} walled by {:?}", endpoint, op);
                prop_assert!(!grid.dynamic_walls().contains(&endpoint), "{:?} walled by {:?}", endpoint, op);
            }
            prop_assert!(grid.static_walls().is_disjoint(grid.dynamic_walls()));
        }
    }

    #[test]
    fn searches_terminate_with_valid_paths(grid in grid_strategy()) {
        let reachable = optimal_cost(&grid).is_some();
        for algorithm in Algorithm::ALL {
            let (process, _) = run_to_end(&grid, algorithm);
            match process.status() {
                SearchStatus::Succeeded => {
                    prop_assert!(grid.is_valid_path(process.path()), "{}", algorithm);
                    prop_assert!(reachable);
                }
                SearchStatus::Exhausted => {
                    prop_assert!(process.path().is_empty());
                    // Only the depth bound can hide a reachable target.
                    if algorithm != Algorithm::Dls {
                        prop_assert!(!reachable, "{} missed a reachable target", algorithm);
                    }
                }
                SearchStatus::Running => prop_assert!(false, "{} still running", algorithm),
            }
        }
    }

    #[test]
    fn ucs_is_never_beaten_on_cost(grid in grid_strategy()) {
        let (ucs, _) = run_to_end(&grid, Algorithm::Ucs);
        let (bfs, _) = run_to_end(&grid, Algorithm::Bfs);
        prop_assume!(ucs.status() == SearchStatus::Succeeded);

        let best = Grid::path_cost(ucs.path());
        prop_assert_eq!(Some(best), optimal_cost(&grid));
        for algorithm in Algorithm::ALL {
            let (process, _) = run_to_end(&grid, algorithm);
            if process.status() == SearchStatus::Succeeded {
                prop_assert!(Grid::path_cost(process.path()) >= best, "{}", algorithm);
                prop_assert!(bfs.path().len() <= process.path().len(), "{}", algorithm);
            }
        }
    }

    #[test]
    fn explored_sets_grow_and_avoid_walls(grid in grid_strategy()) {
        for algorithm in Algorithm::ALL {
            let (process, sizes) = run_to_end(&grid, algorithm);
            prop_assert!(process.explored().iter().all(|&cell| grid.in_bounds(cell) && !grid.is_blocked(cell)));
            prop_assert!(process.frontier().iter().all(|&cell| !grid.is_blocked(cell)));
            prop_assert_eq!(process.steps(), sizes.len());
            // IDDFS clears its sets at every new bound.
            if algorithm != Algorithm::Iddfs {
                prop_assert!(sizes.windows(2).all(|pair| pair[0] <= pair[1]), "{}", algorithm);
            }
        }
    }

    #[test]
    fn terminal_processes_ignore_further_steps(grid in grid_strategy()) {
        for algorithm in Algorithm::ALL {
            let (mut process, _) = run_to_end(&grid, algorithm);
            let (status, steps) = (process.status(), process.steps());
            let path = process.path().to_vec();
            let again = process.advance_one_step(&grid);
            prop_assert_eq!(again.status, status);
            prop_assert!(again.path.is_empty());
            prop_assert_eq!(process.steps(), steps);
            prop_assert_eq!(process.path(), path.as_slice());
        }
    }

    #[test]
    fn replanning_runs_end_on_a_clear_path(
        grid in grid_strategy(),
        probability in 0.0f64..0.3,
        seed in any::<u64>(),
        algorithm in prop::sample::select(Algorithm::ALL.to_vec()),
    ) {
        let mut sim = Simulation::new(grid, algorithm, RandomSpawner::seeded(probability, Some(seed)));
        let stats = sim.run(200_000);
        if stats.success() {
            prop_assert!(sim.grid().is_valid_path(sim.committed_path()));
            prop_assert_eq!(stats.path_length, sim.committed_path().len());
        }
        let grid = sim.grid();
        prop_assert!(!grid.is_blocked(grid.start()));
        prop_assert!(!grid.is_blocked(grid.target()));
        prop_assert!(grid.static_walls().is_disjoint(grid.dynamic_walls()));
    }
}
