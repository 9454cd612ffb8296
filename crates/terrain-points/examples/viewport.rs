use std::time::Instant;

use image::{ImageBuffer, Rgb};
use terrain_points::{GridIndex, LinearScan, PointCloud, Viewport, ViewportFilter, VisibleSet};

fn main() {
    // A 2048x2048 synthetic terrain: a diagonal ramp for height, a checker for color.
    let size = 2048;
    let heightmap = ImageBuffer::from_fn(size, size, |x, y| Rgb([((x + y) / 16 % 256) as u8, 0, 0]));
    let color = ImageBuffer::from_fn(size, size, |x, y| {
        if (x / 64 + y / 64) % 2 == 0 {
            Rgb([40, 160, 60])
        } else {
            Rgb([200, 180, 120])
        }
    });

    let cloud = match PointCloud::from_rasters(&heightmap, &color) {
        Ok(cloud) => cloud,
        Err(e) => {
            eprintln!("Failed to build point cloud: {}", e);
            return;
        }
    };
    println!("Point cloud: {} points, bounds {}", cloud.len(), cloud.bounds());

    let started = Instant::now();
    let grid = match GridIndex::build(&cloud, 32.0) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Failed to build grid index: {}", e);
            return;
        }
    };
    println!("Grid index: {:?} cells, built in {:?}", grid.shape(), started.elapsed());

    // Same extent as the viewer at 1600x900
    let (view_width, view_height) = (1600.0 / 9.0, 900.0 / 9.0);
    let centers = [(1024.0, -1024.0), (10.0, -10.0), (2040.0, -5.0), (1e6, 0.0)];

    let mut from_scan = VisibleSet::new();
    let mut from_grid = VisibleSet::new();
    for (cx, cy) in centers {
        let viewport = Viewport::centered(cx, cy, view_width, view_height);

        let started = Instant::now();
        LinearScan.select(&cloud, &viewport, &mut from_scan);
        let scan_time = started.elapsed();

        let started = Instant::now();
        grid.select(&cloud, &viewport, &mut from_grid);
        let grid_time = started.elapsed();

        let range = terrain_points::normalize(&mut from_grid);
        println!(
            "Center ({:>8.1}, {:>8.1}): scan {:>6} points in {:>10?}, grid {:>6} points in {:>10?}, raw heights {:?}",
            cx,
            cy,
            from_scan.len(),
            scan_time,
            from_grid.len(),
            grid_time,
            range.map(|r| (r.min, r.max)),
        );
    }
}
