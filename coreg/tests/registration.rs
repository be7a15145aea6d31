//! End-to-end registration scenarios over the full refinement loop.

use approx::assert_relative_eq;
use coreg::{refine_warp, ControlPoint, Degree, GcpMatch, RefineState, WarpModel};
use rand::Rng;
use rand_pcg::Pcg64;

fn matches_from(
    points: impl IntoIterator<Item = (f64, f64)>,
    map: impl Fn(f64, f64) -> (f64, f64),
) -> Vec<GcpMatch> {
    points
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| {
            let (sx, sy) = map(x, y);
            GcpMatch(
                ControlPoint::new(format!("p{i}"), x, y),
                ControlPoint::new(format!("p{i}"), sx, sy),
            )
        })
        .collect()
}

fn random_points(rng: &mut Pcg64, n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|_| (rng.gen_range(0.0..2000.0), rng.gen_range(0.0..2000.0)))
        .collect()
}

#[test]
fn six_pairs_recover_a_pure_translation() {
    let points = [
        (10.0, 20.0),
        (500.0, 40.0),
        (90.0, 700.0),
        (650.0, 800.0),
        (300.0, 350.0),
        (120.0, 520.0),
    ];
    let mut model = WarpModel::new(Degree::Linear, matches_from(points, |x, y| (2.0 + x, 3.0 + y)));
    let refinement = refine_warp(&mut model, 0.5, 20, false).unwrap();

    assert_eq!(refinement.state, RefineState::Converged);
    assert!(!model.insufficient_data);
    for (got, want) in model.x_coef.iter().zip([2.0, 1.0, 0.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-6);
    }
    for (got, want) in model.y_coef.iter().zip([3.0, 0.0, 1.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-6);
    }
    for r in &model.residuals {
        assert!(r.abs() < 1e-6);
    }
}

#[test]
fn gross_outlier_is_eliminated_within_two_passes() {
    let mut rng = Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7);
    let mut matches = matches_from(random_points(&mut rng, 20), |x, y| (x + 1.5, y - 0.75));
    // One correspondence deliberately offset by 50 pixels.
    matches[13].1.position.x += 50.0;

    let mut model = WarpModel::new(Degree::Quadratic, matches);
    let refinement = refine_warp(&mut model, 0.5, 20, false).unwrap();

    assert_eq!(refinement.state, RefineState::Converged);
    assert_eq!(model.matches.len(), 19);
    assert!(model.matches.iter().all(|m| m.master().name != "p13"));
    // The outlier must already be gone after the second pass.
    assert_eq!(refinement.reports[1].surviving(), 19);
    // And the surviving fit is clean.
    for r in &model.residuals {
        assert!(r.abs() < 1e-6);
    }
}

#[test]
fn zero_noise_cubic_polynomial_is_recovered_exactly() {
    let xc = [12.0, 1.05, -0.02, 1e-3, -2e-3, 5e-4, 1e-5, -3e-5, 2e-5, -1e-5];
    let yc = [-4.0, 0.01, 0.98, -1e-3, 3e-4, 2e-3, -2e-5, 1e-5, -1e-5, 3e-5];
    let eval = |c: &[f64; 10], x: f64, y: f64| {
        c[0] + c[1] * x
            + c[2] * y
            + c[3] * x * x
            + c[4] * x * y
            + c[5] * y * y
            + c[6] * x * x * x
            + c[7] * x * x * y
            + c[8] * x * y * y
            + c[9] * y * y * y
    };

    let mut rng = Pcg64::new(0x853c49e6748fea9b, 0xda3e39cb94b95bdb);
    let points: Vec<_> = (0..40)
        .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect();
    let matches = matches_from(points, |x, y| (eval(&xc, x, y), eval(&yc, x, y)));
    let mut model = WarpModel::new(Degree::Cubic, matches);
    let refinement = refine_warp(&mut model, 0.5, 20, false).unwrap();

    assert_eq!(refinement.state, RefineState::Converged);
    assert_eq!(model.matches.len(), 40);
    for (got, want) in model.x_coef.iter().zip(xc) {
        assert_relative_eq!(*got, want, max_relative = 1e-6, epsilon = 1e-6);
    }
    for (got, want) in model.y_coef.iter().zip(yc) {
        assert_relative_eq!(*got, want, max_relative = 1e-6, epsilon = 1e-6);
    }
}

#[test]
fn reports_tag_passes_and_thresholds() {
    let points = [
        (10.0, 20.0),
        (500.0, 40.0),
        (90.0, 700.0),
        (650.0, 800.0),
        (300.0, 350.0),
        (120.0, 520.0),
        (420.0, 180.0),
    ];
    let mut model = WarpModel::new(Degree::Linear, matches_from(points, |x, y| (x - 4.0, y + 9.0)));
    let refinement = refine_warp(&mut model, 0.5, 20, false).unwrap();

    let first = &refinement.reports[0];
    assert_eq!(first.iteration, 0);
    assert!(!first.append);
    assert_eq!(first.threshold, 0.0);
    assert!(first.coefficients.is_some());

    let last = refinement.reports.last().unwrap();
    assert!(last.append);
    assert!(last.threshold <= 0.5);
    assert_eq!(last.surviving(), model.matches.len());
}
