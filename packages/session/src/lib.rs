#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! A process-owned session over one dataset file.
//!
//! The session memoizes the cleaned table by content fingerprint and the
//! trained predictor by table fingerprint. A cheap file stamp (length and
//! modification time) is compared first, so an unchanged file is neither
//! re-read nor re-hashed. When the file changes, the next request loads the
//! new snapshot and predictors trained on older snapshots are dropped.
//!
//! Each cache sits behind its own `Mutex`, held for the duration of a build,
//! so concurrent requests for the same entry wait for one build instead of
//! starting their own.

pub mod config;
pub mod registration;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use sasv_analytics::AnalyticsError;
use sasv_dataset::{CleanTable, DatasetError};
use sasv_incident_models::{NewIncident, RegistrationOptions};
use sasv_predict::progress::{ProgressCallback, null_progress};
use sasv_predict::{PredictError, Predictor, TrainError};
use sasv_predict_models::{PredictionInput, RankedStreet};
use thiserror::Error;

pub use config::{ConfigError, SessionConfig};
pub use registration::RegistrationError;

/// Errors surfaced at the session boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The dataset could not be loaded or written.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The predictor refused to train.
    #[error(transparent)]
    Train(#[from] TrainError),

    /// A prediction request was invalid.
    #[error(transparent)]
    Predict(#[from] PredictError),

    /// A statistics filter was invalid.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// A registration form was invalid.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn read(path: &Path) -> Result<Self, DatasetError> {
        let meta = std::fs::metadata(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct CachedTable {
    stamp: FileStamp,
    table: Arc<CleanTable>,
}

type TrainOutcome = Result<Arc<Predictor>, TrainError>;

/// Memoized access to one dataset and its predictor.
pub struct Session {
    config: SessionConfig,
    progress: Arc<dyn ProgressCallback>,
    table: Mutex<Option<CachedTable>>,
    predictors: Mutex<BTreeMap<String, TrainOutcome>>,
}

impl Session {
    /// Creates a session that reports training progress nowhere.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_progress(config, null_progress())
    }

    /// Creates a session that reports training progress to `progress`.
    #[must_use]
    pub fn with_progress(config: SessionConfig, progress: Arc<dyn ProgressCallback>) -> Self {
        Self {
            config,
            progress,
            table: Mutex::new(None),
            predictors: Mutex::new(BTreeMap::new()),
        }
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the cleaned table for the current file contents, loading it
    /// only when the contents changed since the last call.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Dataset`] if the file is missing or
    /// structurally invalid.
    pub fn table(&self) -> Result<Arc<CleanTable>, SessionError> {
        let path = self.config.data_path.as_path();
        let mut cache = self.table.lock().unwrap_or_else(PoisonError::into_inner);

        let stamp = FileStamp::read(path)?;
        if let Some(cached) = cache.as_ref()
            && cached.stamp == stamp
        {
            return Ok(cached.table.clone());
        }

        let bytes = std::fs::read(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let fingerprint = sasv_dataset::fingerprint(&bytes);

        if let Some(cached) = cache.as_mut()
            && cached.table.fingerprint == fingerprint
        {
            log::debug!("File stamp changed but contents did not; keeping cached table");
            cached.stamp = stamp;
            return Ok(cached.table.clone());
        }

        let table = Arc::new(sasv_dataset::load_bytes(&bytes)?);
        *cache = Some(CachedTable {
            stamp,
            table: table.clone(),
        });

        Ok(table)
    }

    /// Returns the predictor for the current table, training it on first
    /// use. A refusal to train is remembered just like a trained model.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Dataset`] if the table cannot be loaded, or
    /// [`SessionError::Train`] if training was refused.
    pub fn predictor(&self) -> Result<Arc<Predictor>, SessionError> {
        let table = self.table()?;
        let mut cache = self.predictors.lock().unwrap_or_else(PoisonError::into_inner);

        let before = cache.len();
        cache.retain(|fingerprint, _| *fingerprint == table.fingerprint);
        if cache.len() < before {
            log::info!("Dataset changed; dropped {} stale predictor(s)", before - cache.len());
        }

        let outcome = cache
            .entry(table.fingerprint.clone())
            .or_insert_with(|| {
                log::info!("Training predictor for dataset {}", &table.fingerprint[..12]);
                sasv_predict::train(&table, &self.config.forest, &self.progress).map(Arc::new)
            })
            .clone();

        Ok(outcome?)
    }

    /// Ranks the most probable streets for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the predictor is unavailable or the input
    /// is invalid.
    pub fn predict(&self, input: &PredictionInput) -> Result<Vec<RankedStreet>, SessionError> {
        Ok(self.predictor()?.predict(input)?)
    }

    /// Selector choices for the registration form. Falls back to built-in
    /// choices when the dataset cannot be loaded.
    #[must_use]
    pub fn registration_options(&self) -> RegistrationOptions {
        match self.table() {
            Ok(table) => registration::registration_options(Some(&table)),
            Err(e) => {
                log::warn!("Using default registration options: {e}");
                registration::registration_options(None)
            }
        }
    }

    /// Validates and appends a new incident, returning its identifier.
    ///
    /// The table lock is held while appending, so no load observes a
    /// partially written row. The new row is visible to the next
    /// [`Self::table`] call.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Registration`] if the form is invalid, or
    /// [`SessionError::Dataset`] if the file cannot be read or written.
    pub fn register(&self, incident: &NewIncident) -> Result<String, SessionError> {
        registration::validate(incident)?;

        let path = self.config.data_path.as_path();
        let _guard = self.table.lock().unwrap_or_else(PoisonError::into_inner);

        let id = sasv_dataset::next_incident_id(path)?;
        let row = registration::build_row(incident, &id);
        sasv_dataset::append_row(path, &row)?;

        log::info!("Registered incident {id} in {}", incident.province);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use sasv_incident_models::{TimeBucket, Weekday};
    use sasv_predict_models::ForestParams;

    use super::*;

    const HEADER: &str = "id_hecho;provincia_nombre;localidad_nombre;victima_tr_edad;latitud;longitud;anio;mes;fecha_hecho;hora_hecho;tipo_lugar;calle_nombre;victima_sexo;victima_vehiculo;inculpado_vehiculo;modo_produccion_hecho;tipo_persona;victima_18_años_o_mas";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sasv_session_{name}_{}.csv", uuid::Uuid::new_v4()))
    }

    fn write_dataset(path: &Path, rows: &[String]) {
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
    }

    fn training_rows() -> Vec<String> {
        let mut rows = Vec::new();
        let mut id = 1;
        for _ in 0..12 {
            rows.push(format!(
                "{id};Córdoba;Córdoba;30;-31.4;-64.2;2021;3;2021-03-01;08:00:00;Calle;Av. Colón;Masculino;Moto;Auto;Vuelco;Víctima;Sí"
            ));
            id += 1;
            rows.push(format!(
                "{id};Salta;Salta;40;-24.8;-65.4;2022;7;2022-07-02;22:00:00;Ruta;RN 9;Femenino;Auto;Camión;Colisión;Víctima;Sí"
            ));
            id += 1;
        }
        rows
    }

    fn session(path: &Path) -> Session {
        Session::new(SessionConfig {
            data_path: path.to_path_buf(),
            forest: ForestParams {
                n_trees: 5,
                min_classes: 2,
                ..ForestParams::default()
            },
            ..SessionConfig::default()
        })
    }

    fn form() -> NewIncident {
        NewIncident {
            date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            province: "Salta".to_string(),
            locality: "Cafayate".to_string(),
            latitude: None,
            longitude: None,
            place_type: "Ruta".to_string(),
            victim_age: 45,
            victim_sex: "Masculino".to_string(),
            production_mode: "Vuelco".to_string(),
            victim_vehicle: "Auto".to_string(),
            accused_vehicle: "Auto".to_string(),
        }
    }

    #[test]
    fn unchanged_file_is_not_reloaded() {
        let path = temp_path("memo");
        write_dataset(&path, &training_rows());
        let session = session(&path);

        let a = session.table().unwrap();
        let b = session.table().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 24);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_a_load_failure() {
        let session = session(&temp_path("missing"));
        assert!(matches!(
            session.table(),
            Err(SessionError::Dataset(DatasetError::Read { .. }))
        ));
    }

    #[test]
    fn predictor_is_trained_once_per_snapshot() {
        let path = temp_path("predictor");
        write_dataset(&path, &training_rows());
        let session = session(&path);

        let a = session.predictor().unwrap();
        let b = session.predictor().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.classes(), ["Av. Colón", "RN 9"]);

        let ranked = session
            .predict(&PredictionInput {
                province: "Salta".to_string(),
                month: 7,
                time_bucket: TimeBucket::Noche,
                weekday: Weekday::Saturday,
                place_type: "Ruta".to_string(),
            })
            .unwrap();
        assert_eq!(ranked[0].street, "RN 9");

        session.register(&form()).unwrap();
        let c = session.predictor().unwrap();
        assert!(!Arc::ptr_eq(&a, &c));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn refusal_is_remembered() {
        let path = temp_path("refusal");
        write_dataset(&path, &training_rows());
        let session = Session::new(SessionConfig {
            data_path: path.clone(),
            ..SessionConfig::default()
        });

        for _ in 0..2 {
            assert!(matches!(
                session.predictor(),
                Err(SessionError::Train(TrainError::InsufficientClasses {
                    qualifying: 2,
                    required: 10
                }))
            ));
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn registration_appends_one_row() {
        let path = temp_path("register");
        write_dataset(&path, &training_rows());
        let session = session(&path);

        let before = std::fs::read(&path).unwrap();
        let table = session.table().unwrap();

        let id = session.register(&form()).unwrap();
        assert_eq!(id, "25");

        let after = std::fs::read(&path).unwrap();
        assert!(after.starts_with(&before));

        let reloaded = session.table().unwrap();
        assert_eq!(table.len(), 24);
        assert_eq!(reloaded.len(), 25);
        assert_ne!(table.fingerprint, reloaded.fingerprint);

        let added = reloaded.records.last().unwrap();
        assert_eq!(added.province_name, "Salta");
        assert_eq!(added.incident_date.as_deref(), Some("17/05/2024"));
        assert_eq!(added.year, Some(2024.0));
        assert_eq!(added.month, Some(5.0));
        assert_eq!(added.victim_age, Some(45.0));
        assert_eq!(added.latitude, Some(-24.7821));
        assert_eq!(added.text("tipo_persona"), Some("Víctima"));
        assert_eq!(added.text("victima_18_años_o_mas"), Some("Sí"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_registration_leaves_file_untouched() {
        let path = temp_path("invalid");
        write_dataset(&path, &training_rows());
        let session = session(&path);
        let before = std::fs::read(&path).unwrap();

        let mut bad = form();
        bad.province = "Desconocido".to_string();
        assert!(matches!(
            session.register(&bad),
            Err(SessionError::Registration(RegistrationError::UnknownProvince(_)))
        ));
        assert_eq!(std::fs::read(&path).unwrap(), before);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn options_come_from_the_data() {
        let path = temp_path("options");
        write_dataset(&path, &training_rows());
        let session = session(&path);

        let options = session.registration_options();
        assert_eq!(options.place_types, ["Calle", "Ruta"]);
        assert_eq!(options.vehicles, ["Auto", "Moto"]);

        std::fs::remove_file(&path).ok();
    }
}
