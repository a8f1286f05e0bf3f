use poisson_rust::{Engine, Grid, PoissonSolver, SolverConfig, SolverError};

const TEST_N: usize = 9;
const TEST_STEPS: usize = 10;

/// グリッドの全要素がビット単位で一致するかチェック
fn grids_are_identical(grid1: &Grid, grid2: &Grid) -> bool {
    if grid1.data.len() != grid2.data.len() {
        return false;
    }

    for i in 0..grid1.data.len() {
        if grid1.data[i].to_bits() != grid2.data[i].to_bits() {
            eprintln!(
                "Mismatch at index {}: {} vs {}",
                i, grid1.data[i], grid2.data[i]
            );
            return false;
        }
    }

    true
}

fn solve_with_threads(n: usize, steps: usize, threads: usize) -> Grid {
    let source = Grid::impulse(n).unwrap();
    let config = SolverConfig::new(n, steps, threads, 1.0);
    PoissonSolver::new(config, &source.data)
        .unwrap()
        .solve()
        .unwrap()
}

#[test]
fn test_thread_count_does_not_change_result() {
    // シングルスレッド版 (正解データ)
    let reference = solve_with_threads(TEST_N, TEST_STEPS, 1);

    for threads in 2..=TEST_N {
        let parallel = solve_with_threads(TEST_N, TEST_STEPS, threads);
        assert!(
            grids_are_identical(&reference, &parallel),
            "1 thread and {} threads produce different results",
            threads
        );
    }

    println!("✓ 1..={} threads: Results match!", TEST_N);
}

#[test]
fn test_more_threads_than_planes() {
    // 空区間のスレッドもバリアに参加するので、ハングせず同じ結果になる
    let reference = solve_with_threads(5, 7, 1);
    let oversubscribed = solve_with_threads(5, 7, 12);
    assert!(grids_are_identical(&reference, &oversubscribed));
}

#[test]
fn test_single_vs_barrier_parallel() {
    let source = Grid::impulse(TEST_N).unwrap();
    let config = SolverConfig::new(TEST_N, TEST_STEPS, 4, 1.0);

    let single = Engine::Single.solve(&config, &source.data).unwrap();
    let barrier = Engine::Barrier.solve(&config, &source.data).unwrap();

    assert!(
        grids_are_identical(&single, &barrier),
        "Single-thread and Barrier Parallel implementations produce different results"
    );

    println!("✓ Single vs Barrier Parallel: Results match!");
}

#[test]
fn test_single_vs_rayon() {
    let source = Grid::impulse(TEST_N).unwrap();
    let config = SolverConfig::new(TEST_N, TEST_STEPS, 4, 1.0);

    let single = Engine::Single.solve(&config, &source.data).unwrap();
    let rayon = Engine::Rayon.solve(&config, &source.data).unwrap();

    assert!(
        grids_are_identical(&single, &rayon),
        "Single-thread and Rayon implementations produce different results"
    );

    println!("✓ Single vs Rayon: Results match!");
}

#[test]
fn test_odd_and_even_step_counts_return_latest_sweep() {
    // バッファの入れ替え回数の偶奇に関わらず、最新の結果が返ること
    let source = Grid::impulse(7).unwrap();
    for steps in [1, 2, 3, 4] {
        let config = SolverConfig::new(7, steps, 3, 1.0);
        let single = Engine::Single.solve(&config, &source.data).unwrap();
        let barrier = Engine::Barrier.solve(&config, &source.data).unwrap();
        assert!(grids_are_identical(&single, &barrier), "steps={}", steps);
    }
}

#[test]
fn test_repeated_solve_is_deterministic() {
    let source = Grid::impulse(TEST_N).unwrap();
    let solver = PoissonSolver::new(SolverConfig::new(TEST_N, TEST_STEPS, 3, 1.0), &source.data)
        .unwrap();
    let first = solver.solve().unwrap();
    let second = solver.solve().unwrap();
    assert!(grids_are_identical(&first, &second));
}

#[test]
fn test_invalid_configuration_is_rejected_before_solving() {
    let source = Grid::impulse(5).unwrap();

    let zero_threads = PoissonSolver::new(SolverConfig::new(5, 1, 0, 1.0), &source.data);
    assert_eq!(zero_threads.unwrap_err(), SolverError::InvalidThreadCount(0));

    let wrong_size = PoissonSolver::new(SolverConfig::new(7, 1, 2, 1.0), &source.data);
    assert_eq!(
        wrong_size.unwrap_err(),
        SolverError::SourceLengthMismatch {
            expected: 343,
            actual: 125
        }
    );

    for engine in Engine::ALL {
        let err = engine
            .solve(&SolverConfig::new(5, 1, 0, 1.0), &source.data)
            .unwrap_err();
        assert_eq!(err, SolverError::InvalidThreadCount(0), "{}", engine.name());
    }
}

#[test]
fn test_stats_report_every_thread() {
    let source = Grid::impulse(5).unwrap();
    let config = SolverConfig::new(5, 3, 4, 1.0).with_verbose(true);
    let (grid, stats) = PoissonSolver::new(config, &source.data)
        .unwrap()
        .solve_with_stats()
        .unwrap();
    assert_eq!(grid.len(), 125);
    assert_eq!(stats.thread_elapsed.len(), 4);
    assert!(stats.thread_elapsed.iter().all(|t| *t <= stats.elapsed));
}
