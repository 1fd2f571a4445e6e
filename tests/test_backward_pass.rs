// Tests for backward propagation: gradient shapes, key layout and the L2 term.

use approx::assert_relative_eq;
use deep_classifier::layers::{linear_backward_with_l2, linear_forward};
use deep_classifier::parameters::ParameterSet;
use deep_classifier::propagation::{l_model_backward_with_l2, l_model_forward};
use deep_classifier::utils::activations::{leaky_relu_backward, relu_backward, sigmoid_backward};
use deep_classifier::utils::SimpleRng;
use ndarray::{arr2, Array2};

fn random_matrix(rng: &mut SimpleRng, shape: (usize, usize)) -> Array2<f64> {
    Array2::from_shape_simple_fn(shape, || rng.next_normal())
}

// ============================================================================
// Linear backward
// ============================================================================

#[test]
fn test_linear_backward_shapes() {
    let mut rng = SimpleRng::new(17);
    for &(units, fan_in, m) in &[(1, 1, 1), (4, 3, 5), (2, 7, 16)] {
        let w = random_matrix(&mut rng, (units, fan_in));
        let b = random_matrix(&mut rng, (units, 1));
        let a = random_matrix(&mut rng, (fan_in, m));
        let dz = random_matrix(&mut rng, (units, m));

        let (_, cache) = linear_forward(a.clone(), w.view(), b.view()).unwrap();
        let grads = linear_backward_with_l2(&dz, &cache, 0.3).unwrap();

        assert_eq!(grads.da_prev.dim(), a.dim());
        assert_eq!(grads.dw.dim(), w.dim());
        assert_eq!(grads.db.dim(), b.dim());
    }
}

#[test]
fn test_linear_backward_rejects_wrong_dz() {
    let w = Array2::<f64>::zeros((2, 3));
    let b = Array2::<f64>::zeros((2, 1));
    let a = Array2::<f64>::zeros((3, 4));
    let (_, cache) = linear_forward(a, w.view(), b.view()).unwrap();

    assert!(linear_backward_with_l2(&Array2::zeros((2, 5)), &cache, 0.0).is_err());
}

#[test]
fn test_l2_term_scales_with_lambda() {
    let mut rng = SimpleRng::new(3);
    let w = random_matrix(&mut rng, (3, 2));
    let b = Array2::zeros((3, 1));
    let a = random_matrix(&mut rng, (2, 4));
    let dz = random_matrix(&mut rng, (3, 4));
    let (_, cache) = linear_forward(a, w.view(), b.view()).unwrap();

    let plain = linear_backward_with_l2(&dz, &cache, 0.0).unwrap();
    let regularized = linear_backward_with_l2(&dz, &cache, 2.0).unwrap();

    // (lambda / m) · W with m = 4
    for ((r, p), w) in regularized.dw.iter().zip(plain.dw.iter()).zip(w.iter()) {
        assert_relative_eq!(r - p, 0.5 * w, epsilon = 1e-12);
    }
    assert_eq!(regularized.db, plain.db);
    assert_eq!(regularized.da_prev, plain.da_prev);
}

// ============================================================================
// Activation derivatives
// ============================================================================

#[test]
fn test_relu_backward_zeroes_where_z_non_positive() {
    let mut rng = SimpleRng::new(8);
    let da = random_matrix(&mut rng, (4, 6));
    let z = random_matrix(&mut rng, (4, 6));

    let dz = relu_backward(&da, &z).unwrap();

    for ((&g, &d), &z) in dz.iter().zip(da.iter()).zip(z.iter()) {
        if z <= 0.0 {
            assert_eq!(g, 0.0);
        } else {
            assert_eq!(g, d);
        }
    }
}

#[test]
fn test_leaky_relu_backward_scales() {
    let da = arr2(&[[2.0, 2.0], [-4.0, -4.0]]);
    let z = arr2(&[[1.0, -1.0], [0.5, 0.0]]);
    let dz = leaky_relu_backward(&da, &z).unwrap();

    assert_relative_eq!(dz[[0, 0]], 2.0);
    assert_relative_eq!(dz[[0, 1]], 0.02, epsilon = 1e-12);
    assert_relative_eq!(dz[[1, 0]], -4.0);
    assert_relative_eq!(dz[[1, 1]], -0.04, epsilon = 1e-12);
}

#[test]
fn test_sigmoid_backward_peak_at_zero() {
    let da = Array2::<f64>::ones((1, 3));
    let z = arr2(&[[-2.0, 0.0, 2.0]]);
    let dz = sigmoid_backward(&da, &z).unwrap();

    assert_relative_eq!(dz[[0, 1]], 0.25, epsilon = 1e-12);
    assert!(dz[[0, 0]] < 0.25 && dz[[0, 2]] < 0.25);
    assert_relative_eq!(dz[[0, 0]], dz[[0, 2]], epsilon = 1e-12);
}

// ============================================================================
// Full network
// ============================================================================

#[test]
fn test_gradient_for_every_parameter() {
    let mut rng = SimpleRng::new(21);
    let params = ParameterSet::initialize_he(&[5, 4, 4, 3], &mut rng).unwrap();
    let x = random_matrix(&mut rng, (5, 9));
    let y = Array2::from_shape_fn((3, 9), |(r, c)| if c % 3 == r { 1.0 } else { 0.0 });

    let pass = l_model_forward(&x, &params).unwrap();
    let grads = l_model_backward_with_l2(&pass.output, &y, pass.caches, 0.5).unwrap();

    let param_keys: Vec<String> = params.to_named().into_iter().map(|(k, _)| k).collect();
    let grad_named = grads.to_named();
    for key in &param_keys {
        let grad_key = format!("d{}", key);
        let (_, grad) = grad_named
            .iter()
            .find(|(k, _)| *k == grad_key)
            .unwrap_or_else(|| panic!("missing gradient {}", grad_key));
        let (_, param) = params
            .to_named()
            .into_iter()
            .find(|(k, _)| k == key)
            .unwrap();
        assert_eq!(grad.dim(), param.dim(), "shape of {}", grad_key);
    }

    for l in 0..params.num_layers() {
        assert!(grads.da(l).is_some(), "missing dA{}", l);
    }
    assert!(grads.da(params.num_layers()).is_none());
}

#[test]
fn test_da_chain_links_layers() {
    let mut rng = SimpleRng::new(4);
    let params = ParameterSet::initialize_he(&[3, 5, 2], &mut rng).unwrap();
    let x = random_matrix(&mut rng, (3, 4));
    let y = arr2(&[[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0]]);

    let pass = l_model_forward(&x, &params).unwrap();
    let grads = l_model_backward_with_l2(&pass.output, &y, pass.caches, 0.0).unwrap();

    // dA1 = W2^T · dZ2, and dA0 = W1^T · dZ1.
    assert_eq!(grads.da(1).unwrap().dim(), (5, 4));
    assert_eq!(grads.da(0).unwrap().dim(), (3, 4));
}
