//! Parameter sets
//!
//! A [`ParameterSet`] is the ordered list of layers 1..L. Internally layers are
//! addressed by position; the string keys `W{l}` / `b{l}` only exist at the
//! serialization boundary ([`ParameterSet::to_named`], [`ParameterSet::from_named`]
//! and the JSON save/load helpers), where external tooling expects them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ensure_shape, EngineError};
use crate::layers::DenseLayer;
use crate::utils::SimpleRng;

/// String-keyed view of a parameter set (`"W1"`, `"b1"`, ...).
pub type NamedParameters = HashMap<String, Array2<f64>>;

pub fn weight_key(layer: usize) -> String {
    format!("W{}", layer)
}

pub fn bias_key(layer: usize) -> String {
    format!("b{}", layer)
}

/// Weights and biases of every layer, in forward order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    layers: Vec<DenseLayer>,
}

impl ParameterSet {
    /// Builds a parameter set, checking that every bias is a (units × 1) column
    /// and that consecutive layers chain (each layer's input size equals the
    /// previous layer's unit count).
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, EngineError> {
        for layer in &layers {
            ensure_shape("ParameterSet bias", (layer.output_size(), 1), layer.bias.dim())?;
        }
        for pair in layers.windows(2) {
            ensure_shape(
                "ParameterSet layer chaining",
                (pair[1].output_size(), pair[0].output_size()),
                pair[1].weight.dim(),
            )?;
        }
        Ok(Self { layers })
    }

    /// He initialization: `W_l ~ N(0, 1) · sqrt(2 / units_{l-1})`, `b_l = 0`.
    ///
    /// `layer_dims` lists the unit count of every layer including the input layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use deep_classifier::parameters::ParameterSet;
    /// use deep_classifier::utils::SimpleRng;
    ///
    /// let mut rng = SimpleRng::new(1);
    /// let params = ParameterSet::initialize_he(&[4, 3, 2], &mut rng).unwrap();
    /// assert_eq!(params.num_layers(), 2);
    /// assert_eq!(params.layer(1).unwrap().weight.dim(), (3, 4));
    /// ```
    pub fn initialize_he(layer_dims: &[usize], rng: &mut SimpleRng) -> Result<Self, EngineError> {
        Self::initialize_scaled(layer_dims, rng, |fan_in| (2.0 / fan_in as f64).sqrt())
    }

    /// Unscaled gaussian initialization: `W_l ~ N(0, 1)`, `b_l = 0`.
    pub fn initialize_deep(layer_dims: &[usize], rng: &mut SimpleRng) -> Result<Self, EngineError> {
        Self::initialize_scaled(layer_dims, rng, |_| 1.0)
    }

    fn initialize_scaled<F>(
        layer_dims: &[usize],
        rng: &mut SimpleRng,
        scale: F,
    ) -> Result<Self, EngineError>
    where
        F: Fn(usize) -> f64,
    {
        if layer_dims.len() < 2 {
            return Err(EngineError::InvalidInput(format!(
                "need at least an input and an output layer, got {} dimensions",
                layer_dims.len()
            )));
        }
        if layer_dims.contains(&0) {
            return Err(EngineError::InvalidInput(
                "layer dimensions must be positive".to_string(),
            ));
        }

        let layers = layer_dims
            .windows(2)
            .map(|dims| {
                let (fan_in, units) = (dims[0], dims[1]);
                let factor = scale(fan_in);
                let weight = Array2::from_shape_simple_fn((units, fan_in), || {
                    rng.next_normal() * factor
                });
                DenseLayer {
                    weight,
                    bias: Array2::zeros((units, 1)),
                }
            })
            .collect();

        debug!(?layer_dims, "initialized parameter set");
        Self::new(layers)
    }

    /// Number of layers L.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer `l`, counted from 1.
    pub fn layer(&self, l: usize) -> Option<&DenseLayer> {
        l.checked_sub(1).and_then(|i| self.layers.get(i))
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    /// Σ_l Σ W_l², the L2 penalty before scaling.
    pub fn weight_square_sum(&self) -> f64 {
        self.layers
            .iter()
            .map(|layer| layer.weight.iter().map(|w| w * w).sum::<f64>())
            .sum()
    }

    /// Exports `W1, b1, ..., WL, bL` in layer order.
    pub fn to_named(&self) -> Vec<(String, Array2<f64>)> {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(i, layer)| {
                [
                    (weight_key(i + 1), layer.weight.clone()),
                    (bias_key(i + 1), layer.bias.clone()),
                ]
            })
            .collect()
    }

    /// Rebuilds a parameter set from its named form.
    ///
    /// The layer count is half the number of entries. A missing `W{l}` or `b{l}`
    /// for any layer in range is reported as [`EngineError::MissingParameter`].
    pub fn from_named(named: &NamedParameters) -> Result<Self, EngineError> {
        let num_layers = named.len() / 2;
        let layers = (1..=num_layers)
            .map(|l| {
                let weight = lookup(named, &weight_key(l))?;
                let bias = lookup(named, &bias_key(l))?;
                DenseLayer::new(weight.clone(), bias.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(layers)
    }

    /// Serializes the named form as a JSON object of row lists, keys in layer order.
    pub fn to_json_string(&self) -> Result<String, EngineError> {
        let mut object = Map::new();
        for (key, matrix) in self.to_named() {
            let rows: Vec<Vec<f64>> = matrix.outer_iter().map(|row| row.to_vec()).collect();
            object.insert(key, serde_json::to_value(rows)?);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(object))?)
    }

    /// Parses the JSON produced by [`ParameterSet::to_json_string`].
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let raw: HashMap<String, Vec<Vec<f64>>> = serde_json::from_str(json)?;
        let named = raw
            .into_iter()
            .map(|(key, rows)| {
                let matrix = matrix_from_rows(&key, rows)?;
                Ok((key, matrix))
            })
            .collect::<Result<NamedParameters, EngineError>>()?;
        Self::from_named(&named)
    }

    /// Writes the parameter set to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Reads a parameter set previously written by [`ParameterSet::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

pub(crate) fn lookup<'a>(
    named: &'a NamedParameters,
    key: &str,
) -> Result<&'a Array2<f64>, EngineError> {
    named.get(key).ok_or_else(|| EngineError::MissingParameter {
        key: key.to_string(),
    })
}

fn matrix_from_rows(key: &str, rows: Vec<Vec<f64>>) -> Result<Array2<f64>, EngineError> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(EngineError::InvalidInput(format!(
            "{} has rows of different lengths",
            key
        )));
    }
    let data: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), data)
        .map_err(|e| EngineError::InvalidInput(format!("{}: {}", key, e)))
}
