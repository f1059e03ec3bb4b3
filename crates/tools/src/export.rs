//! Browser bundle writer (TensorFlow.js layers format).
//!
//! The bundle mirrors a Keras `Sequential` model: every hidden block becomes
//! `Dense(relu)`, `BatchNormalization`, `Dropout`, followed by a softmax `Dense`
//! head. Weights go to a single little-endian f32 shard in manifest order.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use burn_ndarray::NdArray;
use data_contracts::model::{LABEL_MAPPING_FILE, METADATA_FILE};
use data_contracts::{ContractError, ModelLayout};
use models::{HiddenBlock, ModelBundle, ModelLoadError, SignClassifier};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MODEL_JSON: &str = "model.json";
pub const WEIGHTS_SHARD: &str = "group1-shard1of1.bin";

type ExportBackend = NdArray<f32>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("model weights not found: {0}; train a model first")]
    MissingModel(PathBuf),
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not read weights of {name}: {msg}")]
    Weights { name: String, msg: String },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: &'static str,
}

#[derive(Debug, Serialize)]
struct WeightsGroup {
    paths: Vec<String>,
    weights: Vec<WeightSpec>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelJson {
    format: &'static str,
    generated_by: String,
    converted_by: String,
    model_topology: Value,
    weights_manifest: Vec<WeightsGroup>,
}

/// What [`export_model`] wrote.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub out_dir: PathBuf,
    pub layers: usize,
    pub weights: Vec<WeightSpec>,
    pub shard_bytes: usize,
}

/// Keras default layer naming: `dense`, `dense_1`, `dense_2`, ...
fn keras_name(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{base}_{index}")
    }
}

#[derive(Default)]
struct Shard {
    specs: Vec<WeightSpec>,
    bytes: Vec<u8>,
}

impl Shard {
    fn push<const D: usize>(
        &mut self,
        name: String,
        tensor: Tensor<ExportBackend, D>,
    ) -> Result<(), ExportError> {
        let shape = tensor.dims().to_vec();
        let values = tensor
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| ExportError::Weights {
                name: name.clone(),
                msg: format!("{e:?}"),
            })?;
        self.bytes.reserve(values.len() * 4);
        for v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        self.specs.push(WeightSpec {
            name,
            shape,
            dtype: "float32",
        });
        Ok(())
    }
}

fn dense_config(name: &str, units: usize, activation: &str, input_dim: Option<usize>) -> Value {
    let mut config = json!({
        "name": name,
        "trainable": true,
        "dtype": "float32",
        "units": units,
        "activation": activation,
        "use_bias": true,
        "kernel_initializer": {"class_name": "GlorotUniform", "config": {"seed": null}},
        "bias_initializer": {"class_name": "Zeros", "config": {}},
        "kernel_regularizer": null,
        "bias_regularizer": null,
        "activity_regularizer": null,
        "kernel_constraint": null,
        "bias_constraint": null
    });
    if let Some(dim) = input_dim {
        config["batch_input_shape"] = json!([null, dim]);
    }
    json!({"class_name": "Dense", "config": config})
}

fn hidden_block(
    block: &HiddenBlock<ExportBackend>,
    index: usize,
    input_dim: Option<usize>,
    layers: &mut Vec<Value>,
    shard: &mut Shard,
) -> Result<(), ExportError> {
    let dense = keras_name("dense", index);
    let linear = block.linear();
    let units = linear.weight.val().dims()[1];
    layers.push(dense_config(&dense, units, "relu", input_dim));
    shard.push(format!("{dense}/kernel"), linear.weight.val())?;
    if let Some(bias) = &linear.bias {
        shard.push(format!("{dense}/bias"), bias.val())?;
    }

    let bn = keras_name("batch_normalization", index);
    let norm = block.norm();
    layers.push(json!({
        "class_name": "BatchNormalization",
        "config": {
            "name": bn,
            "trainable": true,
            "dtype": "float32",
            "axis": [1],
            "momentum": 1.0 - norm.momentum,
            "epsilon": norm.epsilon,
            "center": true,
            "scale": true,
            "beta_initializer": {"class_name": "Zeros", "config": {}},
            "gamma_initializer": {"class_name": "Ones", "config": {}},
            "moving_mean_initializer": {"class_name": "Zeros", "config": {}},
            "moving_variance_initializer": {"class_name": "Ones", "config": {}}
        }
    }));
    shard.push(format!("{bn}/gamma"), norm.gamma.val())?;
    shard.push(format!("{bn}/beta"), norm.beta.val())?;
    shard.push(format!("{bn}/moving_mean"), norm.running_mean.value())?;
    shard.push(format!("{bn}/moving_variance"), norm.running_var.value())?;

    layers.push(json!({
        "class_name": "Dropout",
        "config": {
            "name": keras_name("dropout", index),
            "trainable": true,
            "dtype": "float32",
            "rate": block.dropout_prob(),
            "noise_shape": null,
            "seed": null
        }
    }));
    Ok(())
}

fn build_bundle(
    model: &SignClassifier<ExportBackend>,
) -> Result<(Value, Shard, usize), ExportError> {
    let mut layers = Vec::new();
    let mut shard = Shard::default();
    for (i, block) in model.blocks().iter().enumerate() {
        let input_dim = (i == 0).then_some(model.input_dim());
        hidden_block(block, i, input_dim, &mut layers, &mut shard)?;
    }

    let head_index = model.blocks().len();
    let head_name = keras_name("dense", head_index);
    let head = model.head();
    let head_input = model.blocks().is_empty().then_some(model.input_dim());
    layers.push(dense_config(
        &head_name,
        model.num_classes(),
        "softmax",
        head_input,
    ));
    shard.push(format!("{head_name}/kernel"), head.weight.val())?;
    if let Some(bias) = &head.bias {
        shard.push(format!("{head_name}/bias"), bias.val())?;
    }

    let layer_count = layers.len();
    let topology = json!({
        "class_name": "Sequential",
        "config": {"name": "sequential", "layers": layers},
        "keras_version": "2.15.0",
        "backend": "tensorflow"
    });
    Ok((topology, shard, layer_count))
}

fn copy_into(src: &Path, out_dir: &Path, name: &str) -> Result<(), ExportError> {
    let dest = out_dir.join(name);
    fs::copy(src, &dest).map_err(io_err(&dest))?;
    Ok(())
}

/// Convert a trained model directory into a browser bundle under `out_dir`.
///
/// Writes `model.json`, `group1-shard1of1.bin` and copies of the metadata and
/// label mapping. Nothing is written when the model cannot be loaded.
pub fn export_model(model_dir: &Path, out_dir: &Path) -> Result<ExportSummary, ExportError> {
    let layout = ModelLayout::new(model_dir);
    let weights = layout.model();
    if !weights.is_file() {
        return Err(ExportError::MissingModel(weights));
    }
    let device = <ExportBackend as Backend>::Device::default();
    let bundle = ModelBundle::<ExportBackend>::load(model_dir, &device)?;
    let (topology, shard, layers) = build_bundle(&bundle.model)?;

    fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;
    let shard_path = out_dir.join(WEIGHTS_SHARD);
    fs::write(&shard_path, &shard.bytes).map_err(io_err(&shard_path))?;

    let model_json = ModelJson {
        format: "layers-model",
        generated_by: format!("signforge {}", env!("CARGO_PKG_VERSION")),
        converted_by: "signforge_tools export_model".to_string(),
        model_topology: topology,
        weights_manifest: vec![WeightsGroup {
            paths: vec![WEIGHTS_SHARD.to_string()],
            weights: shard.specs.clone(),
        }],
    };
    let json_path = out_dir.join(MODEL_JSON);
    let text = serde_json::to_string_pretty(&model_json).map_err(|source| ExportError::Json {
        path: json_path.clone(),
        source,
    })?;
    fs::write(&json_path, text).map_err(io_err(&json_path))?;

    copy_into(&layout.metadata(), out_dir, METADATA_FILE)?;
    copy_into(&layout.label_mapping(), out_dir, LABEL_MAPPING_FILE)?;

    tracing::info!(
        out = %out_dir.display(),
        layers,
        tensors = shard.specs.len(),
        bytes = shard.bytes.len(),
        "exported browser model"
    );
    Ok(ExportSummary {
        out_dir: out_dir.to_path_buf(),
        layers,
        weights: shard.specs,
        shard_bytes: shard.bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::SignClassifierConfig;

    #[test]
    fn layer_names_follow_keras_defaults() {
        assert_eq!(keras_name("dense", 0), "dense");
        assert_eq!(keras_name("dense", 3), "dense_3");
    }

    #[test]
    fn manifest_lists_weights_in_layer_order() {
        let device = Default::default();
        let model =
            SignClassifier::<ExportBackend>::new(SignClassifierConfig::with_classes(4), &device);
        let (topology, shard, layers) = build_bundle(&model).unwrap();

        assert_eq!(layers, 10);
        assert_eq!(topology["config"]["layers"][0]["config"]["batch_input_shape"][1], 63);
        assert_eq!(topology["config"]["layers"][9]["config"]["activation"], "softmax");

        let names: Vec<&str> = shard.specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            &names[..6],
            &[
                "dense/kernel",
                "dense/bias",
                "batch_normalization/gamma",
                "batch_normalization/beta",
                "batch_normalization/moving_mean",
                "batch_normalization/moving_variance",
            ]
        );
        assert_eq!(shard.specs[0].shape, vec![63, 256]);
        assert_eq!(shard.specs.last().unwrap().shape, vec![4]);

        let floats: usize = shard
            .specs
            .iter()
            .map(|s| s.shape.iter().product::<usize>())
            .sum();
        assert_eq!(shard.bytes.len(), floats * 4);
    }
}
