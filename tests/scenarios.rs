use itertools::{iproduct, Itertools};
use rand::prelude::*;
use shopper_pathfinding::cost::manhattan;
use shopper_pathfinding::vision::Vec2;
use shopper_pathfinding::{
    cast_rays, cell, search, CellStatus, Heading, JourneyConfig, JourneyPlanner, SearchMode,
    SearchOptions, StoreGrid, WEIGHTED_CELL_COST,
};

/// Straight along an empty row: five moves, every one of them on the row.
#[test]
fn bfs_on_an_empty_row() {
    let mut grid = StoreGrid::with_endpoints(10, 10, cell(5, 2), cell(5, 7)).unwrap();
    let outcome = search(
        &mut grid,
        cell(5, 2),
        cell(5, 7),
        SearchMode::Bfs,
        &SearchOptions::default(),
    );
    assert!(outcome.success);
    // Five traversed cells counting the target, as `route` holds; `path()` drops the target.
    assert_eq!(outcome.route.len(), 5);
    assert_eq!(outcome.hop_count(), 5);
    assert_eq!(outcome.path().len(), 4);
    assert!(outcome.route.iter().all(|p| p.y == 5));
}

#[test]
fn full_wall_column_separates_endpoints() {
    let mut grid = StoreGrid::with_endpoints(8, 10, cell(4, 1), cell(4, 8)).unwrap();
    for row in 0..8 {
        grid.set_status(&cell(row, 5), CellStatus::Wall).unwrap();
    }
    grid.update();
    assert!(grid.unreachable(&cell(4, 1), &cell(4, 8)));
    for mode in SearchMode::ALL {
        let outcome = search(
            &mut grid,
            cell(4, 1),
            cell(4, 8),
            mode,
            &SearchOptions::default(),
        );
        assert!(!outcome.success, "{mode} crossed the wall");
        assert!(outcome.route.is_empty());
        // The whole left half was explored before giving up.
        assert_eq!(outcome.visited.len(), 8 * 5, "{mode}");
    }
}

#[test]
fn equidistant_stops_keep_listed_order() {
    let stops = [cell(0, 5), cell(5, 0)];
    for listed in [stops, [stops[1], stops[0]]] {
        let mut grid = StoreGrid::with_endpoints(6, 6, cell(0, 0), cell(5, 5)).unwrap();
        let record = JourneyPlanner::default()
            .plan_journey(&mut grid, cell(0, 0), &listed, cell(5, 5))
            .unwrap();
        assert_eq!(record.stop_order(), &listed);
        assert_eq!(record.legs().len(), 3);
        assert_eq!(record.legs()[2].to, cell(5, 5));
    }
}

#[test]
fn wall_blocks_the_view_east() {
    let mut grid = StoreGrid::with_endpoints(11, 11, cell(0, 0), cell(10, 0)).unwrap();
    grid.set_status(&cell(5, 8), CellStatus::Wall).unwrap();
    let cast = cast_rays(&grid, &cell(5, 5), Vec2::new(1.0, 0.0), 45.0, 5);
    assert_eq!(cast.hits_at(&cell(5, 9)), 0);
    assert_eq!(cast.hits_at(&cell(5, 10)), 0);
    assert!(cast.hits_at(&cell(5, 7)) > 0);
    grid.heatmap.record_vision(&cast);
    assert_eq!(grid.heatmap.intensity(&cell(5, 9)), 0.0);
    assert_eq!(grid.heatmap.intensity(&cell(5, 8)), 0.0);
    assert!(grid.heatmap.intensity(&cell(5, 6)) > 0.0);
}

#[test]
fn bfs_hops_equal_manhattan_without_walls() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut grid = StoreGrid::with_endpoints(7, 9, cell(0, 0), cell(6, 8)).unwrap();
    for _ in 0..200 {
        let a = cell(rng.gen_range(0..7), rng.gen_range(0..9));
        let b = cell(rng.gen_range(0..7), rng.gen_range(0..9));
        if a == b {
            continue;
        }
        let outcome = search(&mut grid, a, b, SearchMode::Bfs, &SearchOptions::default());
        assert!(outcome.success);
        assert_eq!(outcome.hop_count() as u32, manhattan(&a, &b));
    }
}

#[test]
fn exact_modes_never_lose_to_greedy() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let mut grid = StoreGrid::with_endpoints(9, 9, cell(0, 0), cell(8, 8)).unwrap();
        for p in grid.cells().collect::<Vec<_>>() {
            if p == grid.start() || p == grid.target() {
                continue;
            }
            match rng.gen_range(0..10) {
                0 | 1 => grid.set_status(&p, CellStatus::Wall).unwrap(),
                2 => grid.set_weight(&p, WEIGHTED_CELL_COST).unwrap(),
                _ => {}
            }
        }
        grid.update();
        if grid.unreachable(&cell(0, 0), &cell(8, 8)) {
            continue;
        }
        for heading in Heading::ALL {
            let options = SearchOptions::default().facing(heading);
            let mut run = |mode| search(&mut grid, cell(0, 0), cell(8, 8), mode, &options);
            let greedy = run(SearchMode::Greedy);
            let astar = run(SearchMode::Astar);
            let dijkstra = run(SearchMode::Dijkstra);
            assert!(greedy.success);
            assert!(astar.cost <= greedy.cost);
            assert!(dijkstra.cost <= greedy.cost);
        }
    }
}

#[test]
fn heatmap_never_cools_down() {
    let mut grid = StoreGrid::with_endpoints(8, 10, cell(1, 1), cell(6, 8)).unwrap();
    grid.add_stop(&cell(1, 7)).unwrap();
    grid.add_stop(&cell(6, 2)).unwrap();
    grid.set_status(&cell(3, 4), CellStatus::Wall).unwrap();
    let planner = JourneyPlanner::new(JourneyConfig {
        mode: SearchMode::Dijkstra,
        ..JourneyConfig::default()
    });
    let mut before: Vec<f64> = grid.cells().map(|p| grid.heatmap.intensity(&p)).collect();
    for _ in 0..3 {
        planner.plan_store_journey(&mut grid).unwrap();
        let after: Vec<f64> = grid.cells().map(|p| grid.heatmap.intensity(&p)).collect();
        assert!(before.iter().zip(&after).all(|(b, a)| a >= b));
        assert!(after.iter().zip(&before).any(|(a, b)| a > b));
        before = after;
    }
    assert!(before.iter().all(|i| (0.0..=1.0).contains(i)));
}

#[test]
fn reset_search_state_is_idempotent() {
    let mut grid = StoreGrid::create(6, 8).unwrap();
    let (start, target) = (grid.start(), grid.target());
    grid.heatmap.record_step(&cell(0, 0));
    let outcome = search(&mut grid, start, target, SearchMode::Astar, &SearchOptions::default());
    assert!(outcome.success);
    assert_eq!(grid.visited_order(), outcome.visited.as_slice());
    assert!(grid.search_record(&target).is_some());
    for _ in 0..2 {
        grid.reset_search_state();
        assert!(grid.visited_order().is_empty());
        assert!(iproduct!(0..6, 0..8).all(|(r, c)| grid.search_record(&cell(r, c)).is_none()));
    }
    // Sensor state survives a reset.
    assert!(grid.heatmap.intensity(&cell(0, 0)) > 0.0);
}

/// Each leg starts facing the way the previous one ended.
#[test]
fn legs_hand_over_their_heading() {
    let mut grid = StoreGrid::with_endpoints(7, 7, cell(3, 0), cell(6, 6)).unwrap();
    grid.add_stop(&cell(0, 3)).unwrap();
    let record = JourneyPlanner::default()
        .plan_store_journey(&mut grid)
        .unwrap();
    for (a, b) in record.legs().iter().tuple_windows() {
        let (_, arrival) = shopper_pathfinding::cost::trace_route(
            a.from,
            &a.traversed.iter().copied().chain([a.to]).collect::<Vec<_>>(),
            Heading::Up,
        )
        .unwrap();
        let replay = shopper_pathfinding::cost::trace_route(
            b.from,
            &b.traversed.iter().copied().chain([b.to]).collect::<Vec<_>>(),
            arrival,
        )
        .unwrap();
        assert_eq!(replay.0, b.maneuvers);
    }
}
