use grid_util::point::Point;
use shopper_pathfinding::{
    cell, CellStatus, JourneyConfig, JourneyPlanner, SearchMode, StoreGrid, StoreLayout,
    WEIGHTED_CELL_COST,
};

// In this example a shopper walks through a small store with shape
//  __________
// |..........|
// |.##..##.P.|
// |S.#..#~~..|
// |..#..X..T.|
// |.P........|
//  __________
// where
// - # marks a shelf wall
// - X marks a product on display that cannot be walked over
// - ~ marks a crowded (weighted) cell
// - P marks a product to pick up
// - S and T mark the entrance and the exit
//
// Every mode plans the same journey; the heatmap of the last one is printed along with the
// exported layout.

fn main() {
    let mut grid = StoreGrid::with_endpoints(5, 10, cell(2, 0), cell(3, 8)).unwrap();
    for p in [cell(1, 1), cell(1, 2), cell(2, 2), cell(3, 2), cell(1, 5), cell(1, 6), cell(2, 5)] {
        grid.set_status(&p, CellStatus::Wall).unwrap();
    }
    grid.set_status(&cell(3, 5), CellStatus::ObstacleProduct)
        .unwrap();
    grid.set_weight(&cell(2, 6), WEIGHTED_CELL_COST).unwrap();
    grid.set_weight(&cell(2, 7), WEIGHTED_CELL_COST).unwrap();
    grid.add_stop(&cell(1, 8)).unwrap();
    grid.add_stop(&cell(4, 1)).unwrap();
    grid.update();
    println!("{}", grid);

    for mode in SearchMode::ALL {
        grid.heatmap.restart();
        let planner = JourneyPlanner::new(JourneyConfig {
            mode,
            seed: 42,
            ..JourneyConfig::default()
        });
        match planner.plan_store_journey(&mut grid) {
            Ok(record) => {
                let stops: Vec<String> = record
                    .stop_order()
                    .iter()
                    .map(|p| format!("({}, {})", p.y, p.x))
                    .collect();
                println!(
                    "{:>18}: cost {:>3}, {} cells, stops {}",
                    mode.to_string(),
                    record.total_cost(),
                    record.walk().len(),
                    stops.join(" -> ")
                );
            }
            Err(err) => println!("{:>18}: {}", mode.to_string(), err),
        }
    }

    println!("\nHeatmap (tenths of full intensity):");
    for y in 0..grid.height() as i32 {
        let row: String = (0..grid.width() as i32)
            .map(|x| {
                let heat = grid.rendered_intensity(&Point::new(x, y));
                match (heat * 10.0).round() as u32 {
                    0 => '.',
                    n => char::from_digit(n.min(9), 10).unwrap_or('9'),
                }
            })
            .collect();
        println!("{}", row);
    }

    let planner = JourneyPlanner::default();
    if let Ok(record) = planner.plan_store_journey(&mut grid) {
        let layout = StoreLayout::from_grid(&grid).with_path(&record);
        match layout.to_json() {
            Ok(json) => println!("\n{}", json),
            Err(err) => eprintln!("export failed: {}", err),
        }
    }
}
