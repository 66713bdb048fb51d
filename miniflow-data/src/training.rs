//! # Training loop
//!
//! Fits a one-hidden-layer regression network (`Linear -> Sigmoid -> Linear`
//! under a mean squared error loss) with mini-batch SGD.

use crate::datasets::{Dataset, TableDataset};
use crate::error::DataError;
use crate::samplers::RandomSampler;
use miniflow_core::{FeedDict, Graph, Matrix, NodeId, Optimizer, Sgd};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Hyperparameters of [`train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub hidden_units: usize,
    pub learning_rate: f64,
    /// Z-score the features before training.
    pub normalize: bool,
    /// Seed for weight initialisation and batch sampling; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            epochs: 10,
            batch_size: 11,
            hidden_units: 10,
            learning_rate: Sgd::DEFAULT_LEARNING_RATE,
            normalize: true,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_hidden_units(mut self, hidden_units: usize) -> Self {
        self.hidden_units = hidden_units;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self, records: usize) -> Result<(), DataError> {
        if records == 0 {
            return Err(DataError::EmptyDataset);
        }
        if self.batch_size == 0 || self.batch_size > records {
            return Err(DataError::InvalidArgument(format!(
                "batch size {} must be between 1 and the {} available records",
                self.batch_size, records
            )));
        }
        if self.hidden_units == 0 {
            return Err(DataError::InvalidArgument(
                "the hidden layer needs at least one unit".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a training run did, epoch by epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub examples: usize,
    pub steps_per_epoch: usize,
    /// Mean mini-batch loss of each epoch.
    pub epoch_losses: Vec<f64>,
    /// Trained parameters in the order `W1, b1, W2, b2`.
    pub parameters: Vec<Matrix>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

struct Network {
    graph: Graph,
    x: NodeId,
    y: NodeId,
    cost: NodeId,
    trainables: [NodeId; 4],
}

impl Network {
    fn build() -> Result<Self, DataError> {
        let mut graph = Graph::new();
        let (x, y) = (graph.input(), graph.input());
        let (w1, b1) = (graph.input(), graph.input());
        let (w2, b2) = (graph.input(), graph.input());

        let l1 = graph.linear(x, w1, b1)?;
        let s1 = graph.sigmoid(l1)?;
        let l2 = graph.linear(s1, w2, b2)?;
        let cost = graph.mse(y, l2)?;

        Ok(Network {
            graph,
            x,
            y,
            cost,
            trainables: [w1, b1, w2, b2],
        })
    }
}

/// Trains on `dataset` and reports the per-epoch loss.
///
/// Each epoch runs `records / batch_size` steps, each on a batch drawn
/// without replacement, followed by one SGD update of every weight and bias.
pub fn train(config: &TrainingConfig, dataset: &TableDataset) -> Result<TrainingReport, DataError> {
    config.validate(dataset.len())?;
    let data = if config.normalize {
        dataset.normalized()?
    } else {
        dataset.clone()
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (features, hidden) = (data.feature_count(), config.hidden_units);
    let outputs = data.target_count();

    let mut net = Network::build()?;
    let [w1, b1, w2, b2] = net.trainables;
    let mut feed = FeedDict::new();
    feed.bind("X", net.x, data.feature_matrix()?)?
        .bind("y", net.y, data.target_matrix()?)?
        .bind("W1", w1, Matrix::random_with_rng(features, hidden, &mut rng))?
        .bind("b1", b1, Matrix::zeros(1, hidden))?
        .bind("W2", w2, Matrix::random_with_rng(hidden, outputs, &mut rng))?
        .bind("b2", b2, Matrix::zeros(1, outputs))?;
    let order = net.graph.topological_sort(&feed)?;

    let examples = data.len();
    let steps_per_epoch = examples / config.batch_size;
    let sampler = RandomSampler::new(config.batch_size);
    let mut sgd = Sgd::new(net.trainables, config.learning_rate);
    log::info!("Total number of examples: {}", examples);

    let mut epoch_losses = Vec::with_capacity(config.epochs);
    for epoch in 0..config.epochs {
        let mut loss = 0.0;
        for _ in 0..steps_per_epoch {
            let batch = sampler.sample(&data, &mut rng)?;
            net.graph.set_value(net.x, batch.feature_matrix()?)?;
            net.graph.set_value(net.y, batch.target_matrix()?)?;

            let evaluated = net.graph.forward_backward(net.cost, &order)?;
            sgd.step(&mut net.graph)?;
            loss += evaluated.into_matrix().sum();
        }
        let mean = loss / steps_per_epoch as f64;
        log::info!("Epoch: {}, Loss: {:.3}", epoch + 1, mean);
        epoch_losses.push(mean);
    }

    let parameters = net
        .trainables
        .iter()
        .map(|&id| {
            net.graph
                .value(id)
                .cloned()
                .ok_or(miniflow_core::MiniflowError::MissingValue { node: id })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TrainingReport {
        examples,
        steps_per_epoch,
        epoch_losses,
        parameters,
    })
}

#[cfg(test)]
#[path = "training_test.rs"]
mod tests;
