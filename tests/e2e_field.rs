//! End-to-end tests for receiver sweeps (`solve_all`).

use pretty_assertions::assert_eq;
use streetwave::{Error, FieldPoint, GridBuilder, Model, Network, SolverConfig, StreetRef};

fn network() -> Network {
    // 0 - 1 - 2
    // |   |   |
    // 3 - 4 - 5
    GridBuilder::new(2, 3, 100.0).build(10.0, 0.4, 0.0).unwrap()
}

fn sweep_model(config: SolverConfig, net: &Network) -> Model {
    let mut model = Model::with_config(config).unwrap();
    model.set_adjacency(net.adjacency.clone()).unwrap();
    model.set_source(0, 1).unwrap();
    model.set_threshold(1).unwrap();
    model
}

#[test]
fn test_receivers_exclude_source() {
    let net = network();
    let model = sweep_model(SolverConfig::default(), &net);
    let receivers = model.receivers().unwrap();
    assert_eq!(receivers.len(), 6);
    assert!(receivers.iter().all(|r| !r.same_street(&StreetRef::new(1, 0))));
}

#[test]
fn test_sweep_reports_midpoints() {
    let net = network();
    let model = sweep_model(SolverConfig::default(), &net);
    let field = model.solve_all(&net.positions).unwrap();

    assert_eq!(field.len(), 7);
    assert_eq!(field.last(), Some(&FieldPoint { x: 50.0, y: 0.0, power: 1.0 }));

    // receiver (0, 3) comes first in row order
    assert_eq!((field[0].x, field[0].y), (0.0, 50.0));
    for point in &field[..6] {
        assert!(point.power >= 0.0 && point.power < 1.0, "{point:?}");
    }
}

#[test]
fn test_sweep_matches_single_solves() {
    let net = network();
    let mut model = sweep_model(SolverConfig::default(), &net);
    let field = model.solve_all(&net.positions).unwrap();

    let receivers = model.receivers().unwrap();
    for (receiver, point) in receivers.iter().zip(&field) {
        model.set_receiver(receiver.a, receiver.b).unwrap();
        assert_eq!(model.solve().unwrap().power, point.power);
    }
}

#[test]
fn test_parallel_sweep_matches_sequential() {
    let net = GridBuilder::new(3, 3, 80.0).build(12.0, 0.3, 0.002).unwrap();
    let sequential = sweep_model(SolverConfig::default(), &net).solve_all(&net.positions).unwrap();
    let parallel = sweep_model(SolverConfig { parallel: true, ..Default::default() }, &net)
        .solve_all(&net.positions)
        .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_sweep_without_receiver_set() {
    let net = network();
    let mut model = Model::new();
    model.set_adjacency(net.adjacency.clone()).unwrap();
    model.set_source(0, 1).unwrap();
    assert!(matches!(model.solve_all(&net.positions), Err(Error::NotConfigured("threshold"))));
    model.set_threshold(0).unwrap();
    assert!(model.solve_all(&net.positions).is_ok());
}

#[test]
fn test_sweep_position_count_checked() {
    let net = network();
    let model = sweep_model(SolverConfig::default(), &net);
    assert!(matches!(model.solve_all(&net.positions[..3]), Err(Error::InvalidGraph(_))));
}

#[test]
fn test_disconnected_receivers_get_zero() {
    // Two separate 2x2 blocks: {0, 1, 4, 5} and {2, 3, 6, 7}.
    let net = GridBuilder::new(2, 4, 100.0)
        .remove_street(1, 2)
        .unwrap()
        .remove_street(5, 6)
        .unwrap()
        .build(10.0, 0.4, 0.0)
        .unwrap();
    let model = sweep_model(SolverConfig::default(), &net);
    let receivers = model.receivers().unwrap();
    let field = model.solve_all(&net.positions).unwrap();
    assert_eq!(field.len(), receivers.len() + 1);

    let left_block = [0, 1, 4, 5];
    for (receiver, point) in receivers.iter().zip(&field) {
        if left_block.contains(&receiver.a) {
            assert!(point.power > 0.0, "{receiver}: {point:?}");
        } else {
            assert_eq!(point.power, 0.0, "{receiver}");
        }
    }
}

#[test]
fn test_sweep_after_removal_leaves_straight_junction() {
    // Removing 1 - 4 from a 3x3 grid leaves junction 1 between 0 and 2 in
    // a straight line; it is merged away and junctions renumber to 0..8.
    let net = GridBuilder::new(3, 3, 100.0)
        .remove_street(1, 4)
        .unwrap()
        .build(10.0, 0.4, 0.0)
        .unwrap();
    assert_eq!(net.positions.len(), 8);

    let mut model = Model::new();
    model.set_adjacency(net.adjacency.clone()).unwrap();
    model.set_source(2, 3).unwrap();
    model.set_threshold(1).unwrap();
    let field = model.solve_all(&net.positions).unwrap();

    assert_eq!(field.len(), 10);
    for point in &field[..9] {
        assert!(point.power.is_finite() && (0.0..1.0).contains(&point.power), "{point:?}");
    }
    assert!(field[..9].iter().any(|p| p.power > 0.0));
}

#[test]
fn test_cancelled_sweep() {
    let net = network();
    let model = sweep_model(SolverConfig::default(), &net);
    model.cancellation_token().cancel();
    assert!(matches!(model.solve_all(&net.positions), Err(Error::Cancelled)));
}
