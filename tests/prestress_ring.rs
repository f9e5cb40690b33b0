use std::f64::consts::TAU;

use formfind::boundary::Support;
use formfind::error::ModelError;
use formfind::goals::prestress::HorizontalPrestress;
use formfind::goals::GoalResult;
use formfind::masses::LumpedMass;
use formfind::model::Model;
use formfind::solver::RunStatus;

#[test]
fn symmetric_ring_carries_equal_prestress() {
    let n = 8;
    let prestress = 2.;

    // Unit-radius ring in the horizontal plane.
    let ring: Vec<[f64; 3]> = (0..n)
        .map(|i| {
            let a = TAU * (i as f64) / (n as f64);
            [a.cos(), a.sin(), 0.]
        })
        .collect();

    let mut model = Model::new();
    let segments: Vec<usize> = (0..n)
        .map(|i| {
            model
                .add_goal(HorizontalPrestress::new(ring[i], ring[(i + 1) % n], prestress))
                .unwrap()
        })
        .collect();

    // Shared endpoints deduplicate: n segments, n nodes.
    assert_eq!(model.n_nodes(), n);

    model.add_boundary_condition(Support::pinned(&ring)).unwrap();
    model.add_mass(LumpedMass::new(&ring, 1.)).unwrap();

    let report = model.solve().unwrap();
    assert_eq!(report.status, RunStatus::Converged);

    let results: Vec<f64> = segments
        .iter()
        .map(|&s| match model.goal_result(s).unwrap() {
            GoalResult::Scalar(v) => v,
            other => panic!("unexpected goal result {other:?}"),
        })
        .collect();

    // Symmetric input, symmetric geometry: every segment carries the same
    // force, equal to the prescribed horizontal prestress.
    for &r in &results {
        assert!((r - results[0]).abs() < 1e-12);
        assert!((r - prestress).abs() < 1e-9);
    }
}

#[test]
fn vertical_prestress_segment_aborts_the_run() {
    let mut model = Model::new();
    model
        .add_goal(HorizontalPrestress::new([0., 0., 0.], [0., 0., 1.], 2.))
        .unwrap();
    model
        .add_mass(LumpedMass::new(&[[0., 0., 0.], [0., 0., 1.]], 1.))
        .unwrap();

    // The degenerate direction is only discoverable once forces are
    // evaluated; the run aborts instead of producing non-finite output.
    let err = model.solve().unwrap_err();
    assert!(matches!(err, ModelError::DegenerateGeometry { .. }));
}
