// Tests for numerical gradient checking using finite differences.
// These tests verify that analytical gradients from the backward pass match
// numerical approximations of the regularized cost.

use deep_classifier::cost::compute_cost_with_l2;
use deep_classifier::layers::DenseLayer;
use deep_classifier::parameters::ParameterSet;
use deep_classifier::propagation::{l_model_backward_with_l2, l_model_forward};
use deep_classifier::utils::SimpleRng;
use ndarray::{arr2, Array2};

const EPSILON: f64 = 1e-6;
const TOLERANCE: f64 = 1e-5;

fn cost(params: &ParameterSet, x: &Array2<f64>, y: &Array2<f64>, lambda: f64) -> f64 {
    let pass = l_model_forward(x, params).unwrap();
    compute_cost_with_l2(&pass.output, y, params, lambda).unwrap()
}

// Relative difference between analytical and numerical gradient vectors.
fn relative_difference(analytical: &[f64], numerical: &[f64]) -> f64 {
    let diff: f64 = analytical
        .iter()
        .zip(numerical)
        .map(|(a, n)| (a - n).powi(2))
        .sum::<f64>()
        .sqrt();
    let norm_a: f64 = analytical.iter().map(|a| a * a).sum::<f64>().sqrt();
    let norm_n: f64 = numerical.iter().map(|n| n * n).sum::<f64>().sqrt();
    diff / (norm_a + norm_n)
}

fn check_gradients(params: &ParameterSet, x: &Array2<f64>, y: &Array2<f64>, lambda: f64) {
    let pass = l_model_forward(x, params).unwrap();
    let grads = l_model_backward_with_l2(&pass.output, y, pass.caches, lambda).unwrap();

    let mut analytical = Vec::new();
    let mut numerical = Vec::new();
    let mut probe = params.clone();

    for l in 0..params.num_layers() {
        let layer_grads = &grads.layers()[l];

        for idx in 0..params.layers()[l].weight.len() {
            let cols = params.layers()[l].weight.ncols();
            let pos = [idx / cols, idx % cols];

            let original = probe.layers()[l].weight[pos];
            probe.layers_mut()[l].weight[pos] = original + EPSILON;
            let plus = cost(&probe, x, y, lambda);
            probe.layers_mut()[l].weight[pos] = original - EPSILON;
            let minus = cost(&probe, x, y, lambda);
            probe.layers_mut()[l].weight[pos] = original;

            numerical.push((plus - minus) / (2.0 * EPSILON));
            analytical.push(layer_grads.dw[pos]);
        }

        for row in 0..params.layers()[l].bias.nrows() {
            let pos = [row, 0];
            let original = probe.layers()[l].bias[pos];
            probe.layers_mut()[l].bias[pos] = original + EPSILON;
            let plus = cost(&probe, x, y, lambda);
            probe.layers_mut()[l].bias[pos] = original - EPSILON;
            let minus = cost(&probe, x, y, lambda);
            probe.layers_mut()[l].bias[pos] = original;

            numerical.push((plus - minus) / (2.0 * EPSILON));
            analytical.push(layer_grads.db[pos]);
        }
    }

    let difference = relative_difference(&analytical, &numerical);
    assert!(
        difference < TOLERANCE,
        "gradient check failed: relative difference {}",
        difference
    );
}

#[test]
fn test_gradient_check_single_layer() {
    let params = ParameterSet::new(vec![
        DenseLayer::new(arr2(&[[0.4, -0.3, 0.2]]), arr2(&[[0.1]])).unwrap(),
    ])
    .unwrap();
    let x = arr2(&[[1.0, -0.5, 0.3, 2.0], [0.2, 0.8, -1.2, 0.0], [-0.7, 0.1, 0.5, 1.1]]);
    let y = arr2(&[[1.0, 0.0, 0.0, 1.0]]);

    check_gradients(&params, &x, &y, 0.0);
}

#[test]
fn test_gradient_check_deep_network() {
    let mut rng = SimpleRng::new(12);
    let params = ParameterSet::initialize_he(&[4, 5, 3, 1], &mut rng).unwrap();
    let x = Array2::from_shape_simple_fn((4, 6), || rng.gen_range_f64(-1.0, 1.0));
    let y = arr2(&[[1.0, 0.0, 1.0, 1.0, 0.0, 0.0]]);

    check_gradients(&params, &x, &y, 0.0);
}

#[test]
fn test_gradient_check_with_l2() {
    let mut rng = SimpleRng::new(34);
    let params = ParameterSet::initialize_he(&[3, 4, 1], &mut rng).unwrap();
    let x = Array2::from_shape_simple_fn((3, 5), || rng.gen_range_f64(-1.0, 1.0));
    let y = arr2(&[[0.0, 1.0, 1.0, 0.0, 1.0]]);

    check_gradients(&params, &x, &y, 0.7);
}
