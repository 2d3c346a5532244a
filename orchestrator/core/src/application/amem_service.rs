// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AmemService — Mixture-Seeded Associative Memory
//!
//! Application service combining the two leaf components:
//!
//! - **train**: fit a Gaussian mixture, then clear the memory and re-seed it
//!   with one entry per component (`key = mean`, `value = mean · weight`).
//! - **predict**: similarity-weighted blend of the top memory entries for a
//!   query, or the nearest component mean when memory is empty.
//! - **update_memory**: append raw points as self-referential entries,
//!   subject to the store's FIFO eviction.
//!
//! The service is trained once `train` has succeeded; the parameters of the
//! most recent fit are kept for the nearest-mean fallback.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::error::{AmemError, AmemResult, VectorRole};
use crate::domain::memory::MemoryState;
use crate::domain::model::ModelParameters;
use crate::domain::repository::{ExpectationMaximizer, MemoryStore};

/// Number of memory entries blended into a prediction.
pub const PREDICTION_NEIGHBOURS: usize = 3;

pub struct AmemService {
    memory_store: Arc<dyn MemoryStore>,
    expectation_maximizer: Arc<dyn ExpectationMaximizer>,
    // `Some` once a train call has succeeded
    model_parameters: RwLock<Option<ModelParameters>>,
}

impl AmemService {
    pub fn new(
        memory_store: Arc<dyn MemoryStore>,
        expectation_maximizer: Arc<dyn ExpectationMaximizer>,
    ) -> Self {
        Self {
            memory_store,
            expectation_maximizer,
            model_parameters: RwLock::new(None),
        }
    }

    /// Fit the mixture and re-seed memory from the fitted components.
    ///
    /// Component means become memory keys, so the data's feature count must
    /// match the store's embedding dimension; this is checked before fitting.
    pub fn train(&self, data: &DMatrix<f64>, n_components: usize) -> AmemResult<()> {
        if data.is_empty() {
            return Err(AmemError::InvalidInput(
                "Cannot train on empty data".to_string(),
            ));
        }
        if n_components == 0 {
            return Err(AmemError::InvalidInput(
                "Number of components must be positive".to_string(),
            ));
        }
        let embedding_dim = self.memory_store.embedding_dim();
        if data.ncols() != embedding_dim {
            return Err(AmemError::dimension(
                VectorRole::TrainingData,
                embedding_dim,
                data.ncols(),
            ));
        }

        let parameters = self.expectation_maximizer.fit(data, n_components)?;

        // Held while re-seeding so readers see either the old or the new model
        let mut current = self.model_parameters.write();
        self.memory_store.clear();
        for (mean, weight) in parameters.means.iter().zip(parameters.weights.iter()) {
            self.memory_store.store(mean, &(mean * *weight))?;
        }

        info!(
            n_samples = data.nrows(),
            n_components,
            converged = parameters.converged,
            n_iterations = parameters.n_iterations,
            memory_size = self.memory_store.size(),
            "Model trained and memory re-seeded"
        );
        *current = Some(parameters);

        Ok(())
    }

    /// Blend the closest memories for `query`, falling back to the nearest
    /// fitted mean when memory holds nothing.
    pub fn predict(&self, query: &DVector<f64>) -> AmemResult<DVector<f64>> {
        let current = self.model_parameters.read();
        let parameters = current.as_ref().ok_or(AmemError::NotTrained)?;

        let similar = self.memory_store.retrieve(query, PREDICTION_NEIGHBOURS)?;

        if similar.is_empty() {
            debug!("Memory is empty, falling back to nearest component mean");
            return Ok(parameters
                .nearest_mean(query)
                .map(|(_, mean)| mean.clone())
                .unwrap_or_else(|| DVector::zeros(query.len())));
        }

        let mut prediction = DVector::zeros(query.len());
        let mut total_weight = 0.0;
        for entry in &similar {
            prediction += &entry.value * entry.similarity;
            total_weight += entry.similarity;
        }

        // Non-positive total similarity leaves the raw sum
        if total_weight > 0.0 {
            prediction /= total_weight;
        }

        Ok(prediction)
    }

    /// Store every row of `new_data` as both key and value.
    pub fn update_memory(&self, new_data: &DMatrix<f64>) -> AmemResult<()> {
        let current = self.model_parameters.read();
        if current.is_none() {
            return Err(AmemError::NotTrained);
        }

        for row in new_data.row_iter() {
            let point = row.transpose();
            self.memory_store.store(&point, &point)?;
        }

        debug!(
            added = new_data.nrows(),
            memory_size = self.memory_store.size(),
            "Memory updated with new points"
        );

        Ok(())
    }

    /// Snapshot taken under the model lock, so it never observes a
    /// half-seeded memory during `train`.
    pub fn get_memory_state(&self) -> MemoryState {
        let current = self.model_parameters.read();
        MemoryState {
            size: self.memory_store.size(),
            capacity: self.memory_store.capacity(),
            embedding_dim: self.memory_store.embedding_dim(),
            is_trained: current.is_some(),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model_parameters.read().is_some()
    }

    /// Parameters of the most recent successful fit.
    pub fn model_parameters(&self) -> Option<ModelParameters> {
        self.model_parameters.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{GaussianMixtureFitter, InMemoryAssociativeStore};

    fn v(values: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(values)
    }

    /// Fitter returning fixed parameters, so memory contents are predictable.
    struct FixedFitter(ModelParameters);

    impl ExpectationMaximizer for FixedFitter {
        fn fit(&self, data: &DMatrix<f64>, n_components: usize) -> AmemResult<ModelParameters> {
            if data.is_empty() || n_components == 0 {
                return Err(AmemError::InvalidInput("fixed".to_string()));
            }
            Ok(self.0.clone())
        }

        fn expectation_step(&self, data: &DMatrix<f64>, parameters: &ModelParameters) -> DMatrix<f64> {
            DMatrix::zeros(data.nrows(), parameters.n_components())
        }

        fn maximization_step(&self, _data: &DMatrix<f64>, _responsibilities: &DMatrix<f64>) -> ModelParameters {
            self.0.clone()
        }

        fn log_likelihood(&self, _data: &DMatrix<f64>, _parameters: &ModelParameters) -> f64 {
            0.0
        }
    }

    fn fixed_params() -> ModelParameters {
        ModelParameters {
            means: vec![v(&[1.0, 0.0]), v(&[0.0, 2.0])],
            covariances: vec![DMatrix::identity(2, 2), DMatrix::identity(2, 2)],
            weights: v(&[0.25, 0.75]),
            converged: true,
            n_iterations: 3,
        }
    }

    fn fixed_service(capacity: usize) -> (AmemService, Arc<InMemoryAssociativeStore>) {
        let store = Arc::new(InMemoryAssociativeStore::new(capacity, 2));
        let service = AmemService::new(store.clone(), Arc::new(FixedFitter(fixed_params())));
        (service, store)
    }

    fn training_data() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 2, &[1.0, 0.1, 0.9, 0.0, 0.0, 2.0])
    }

    #[test]
    fn test_predict_before_train() {
        let (service, _) = fixed_service(10);
        assert_eq!(service.predict(&v(&[1.0, 0.0])).unwrap_err(), AmemError::NotTrained);
        assert!(!service.is_trained());
    }

    #[test]
    fn test_update_memory_before_train() {
        let (service, store) = fixed_service(10);
        let err = service.update_memory(&training_data()).unwrap_err();
        assert_eq!(err, AmemError::NotTrained);
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_train_rejects_invalid_input() {
        let (service, _) = fixed_service(10);
        assert!(matches!(
            service.train(&DMatrix::zeros(0, 2), 2),
            Err(AmemError::InvalidInput(_))
        ));
        assert!(matches!(
            service.train(&training_data(), 0),
            Err(AmemError::InvalidInput(_))
        ));
        assert!(!service.is_trained());
    }

    #[test]
    fn test_train_rejects_feature_mismatch() {
        let (service, _) = fixed_service(10);
        let data = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        assert_eq!(
            service.train(&data, 1).unwrap_err(),
            AmemError::dimension(VectorRole::TrainingData, 2, 3)
        );
    }

    #[test]
    fn test_train_reseeds_memory_from_components() {
        let (service, store) = fixed_service(10);
        store.store(&v(&[5.0, 5.0]), &v(&[5.0, 5.0])).unwrap();

        service.train(&training_data(), 2).unwrap();
        assert!(service.is_trained());
        assert_eq!(store.size(), 2);

        let first = store.retrieve(&v(&[1.0, 0.0]), 1).unwrap();
        assert_eq!(first[0].key, v(&[1.0, 0.0]));
        assert_eq!(first[0].value, v(&[0.25, 0.0]));

        let second = store.retrieve(&v(&[0.0, 1.0]), 1).unwrap();
        assert_eq!(second[0].key, v(&[0.0, 2.0]));
        assert_eq!(second[0].value, v(&[0.0, 1.5]));

        assert_eq!(service.model_parameters(), Some(fixed_params()));
    }

    #[test]
    fn test_predict_blends_top_entries() {
        let (service, _) = fixed_service(10);
        service.train(&training_data(), 2).unwrap();

        // (1,0) has similarity 1 with the first key and 0 with the second
        let prediction = service.predict(&v(&[1.0, 0.0])).unwrap();
        assert!((&prediction - v(&[0.25, 0.0])).norm() < 1e-12);

        // Equal similarity to both keys averages the values
        let prediction = service.predict(&v(&[1.0, 1.0])).unwrap();
        assert!((&prediction - v(&[0.125, 0.75])).norm() < 1e-12);
    }

    #[test]
    fn test_predict_zero_total_similarity_is_unnormalized() {
        let (service, _) = fixed_service(10);
        service.train(&training_data(), 2).unwrap();

        let prediction = service.predict(&v(&[0.0, 0.0])).unwrap();
        assert_eq!(prediction, v(&[0.0, 0.0]));
    }

    #[test]
    fn test_predict_falls_back_to_nearest_mean() {
        let (service, store) = fixed_service(10);
        service.train(&training_data(), 2).unwrap();
        store.clear();

        let prediction = service.predict(&v(&[0.1, 1.9])).unwrap();
        assert_eq!(prediction, v(&[0.0, 2.0]));
    }

    #[test]
    fn test_predict_checks_query_dimension() {
        let (service, _) = fixed_service(10);
        service.train(&training_data(), 2).unwrap();
        assert_eq!(
            service.predict(&v(&[1.0])).unwrap_err(),
            AmemError::dimension(VectorRole::Query, 2, 1)
        );
    }

    #[test]
    fn test_update_memory_stores_self_referential_entries() {
        let (service, store) = fixed_service(3);
        service.train(&training_data(), 2).unwrap();

        let new_data = DMatrix::from_row_slice(2, 2, &[3.0, 3.0, -1.0, 4.0]);
        service.update_memory(&new_data).unwrap();

        // Capacity 3: the oldest seeded component (1,0) was evicted
        assert_eq!(store.size(), 3);
        let hit = store.retrieve(&v(&[-1.0, 4.0]), 1).unwrap();
        assert_eq!(hit[0].key, v(&[-1.0, 4.0]));
        assert_eq!(hit[0].value, v(&[-1.0, 4.0]));

        let all = store.retrieve(&v(&[1.0, 0.0]), 3).unwrap();
        assert!(all.iter().all(|e| e.key != v(&[1.0, 0.0])));
    }

    #[test]
    fn test_memory_state_reports_store_configuration() {
        let (service, _) = fixed_service(7);
        let state = service.get_memory_state();
        assert_eq!(
            state,
            MemoryState {
                size: 0,
                capacity: 7,
                embedding_dim: 2,
                is_trained: false,
            }
        );

        service.train(&training_data(), 2).unwrap();
        let state = service.get_memory_state();
        assert_eq!(state.size, 2);
        assert!(state.is_trained);
    }

    #[test]
    fn test_train_with_real_fitter() {
        let store = Arc::new(InMemoryAssociativeStore::new(100, 2));
        let fitter = Arc::new(GaussianMixtureFitter::new(100, 1e-6).with_seed(9));
        let service = AmemService::new(store.clone(), fitter);

        service.train(&training_data(), 2).unwrap();
        assert_eq!(store.size(), 2);
        let params = service.model_parameters().unwrap();
        assert_eq!(params.n_components(), 2);

        let prediction = service.predict(&v(&[1.0, 0.0])).unwrap();
        assert_eq!(prediction.len(), 2);
        assert!(prediction.iter().all(|x| x.is_finite()));
    }
}
