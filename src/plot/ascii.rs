//! ASCII plotting of O-C diagrams for terminal output.
//!
//! Fixed-size character grid, deterministic output (golden-tested).
//!
//! Plot elements:
//! - minima: `o`
//! - error bars: `|`
//! - the ephemeris (`O-C = 0`): `-` line

use crate::domain::OcPoint;

/// Render an O-C diagram of `points` on a `width` x `height` grid.
pub fn render_oc_plot(points: &[OcPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((t_min, t_max)) = time_range(points) else {
        return "O-C: no minima\n".to_string();
    };
    let (y_min, y_max) = oc_range(points).unwrap_or((-1.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let zero = map_y(0.0, y_min, y_max, height);
    draw_line(&mut grid, 0, zero, width - 1, zero, '-');

    for p in points {
        let x = map_x(p.time, t_min, t_max, width);
        if let Some(err) = p.error.filter(|e| *e > 0.0) {
            let top = map_y(p.oc + err, y_min, y_max, height);
            let bottom = map_y(p.oc - err, y_min, y_max, height);
            for row in grid.iter_mut().take(bottom + 1).skip(top) {
                row[x] = '|';
            }
        }
    }
    for p in points {
        let x = map_x(p.time, t_min, t_max, width);
        let y = map_y(p.oc, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "O-C: t=[{t_min:.3}, {t_max:.3}] | O-C=[{y_min:.5}, {y_max:.5}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn time_range(points: &[OcPoint]) -> Option<(f64, f64)> {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for p in points {
        min_t = min_t.min(p.time);
        max_t = max_t.max(p.time);
    }
    if !(min_t.is_finite() && max_t.is_finite()) {
        return None;
    }
    if max_t > min_t {
        Some((min_t, max_t))
    } else {
        Some((min_t - 0.5, max_t + 0.5))
    }
}

/// Range of O-C values and error bars, always including zero.
fn oc_range(points: &[OcPoint]) -> Option<(f64, f64)> {
    let mut min_y = 0.0_f64;
    let mut max_y = 0.0_f64;
    for p in points {
        let err = p.error.unwrap_or(0.0).abs();
        min_y = min_y.min(p.oc - err);
        max_y = max_y.max(p.oc + err);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
