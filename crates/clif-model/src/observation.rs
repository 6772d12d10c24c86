//! Respiratory support observations and the episode rows derived from them.

use chrono::NaiveDateTime;

/// One row of the respiratory support table as ingested.
///
/// `recorded_dttm` is kept as text so that an unparseable timestamp only
/// affects the hospitalization it belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    pub hospitalization_id: String,
    pub recorded_dttm: String,
    pub device_category: Option<String>,
    pub device_name: Option<String>,
    pub mode_category: Option<String>,
    pub mode_name: Option<String>,
    pub fio2_set: Option<f64>,
    pub lpm_set: Option<f64>,
    pub peep_set: Option<f64>,
    pub resp_rate_set: Option<f64>,
    pub resp_rate_obs: Option<f64>,
    pub tracheostomy: Option<bool>,
    /// Position in the source table, used as the final sort tie-break.
    pub ingest_order: usize,
}

impl RawObservation {
    pub fn new(hospitalization_id: impl Into<String>, recorded_dttm: impl Into<String>) -> Self {
        Self {
            hospitalization_id: hospitalization_id.into(),
            recorded_dttm: recorded_dttm.into(),
            ..Self::default()
        }
    }

    pub fn with_device(mut self, category: Option<&str>, name: Option<&str>) -> Self {
        self.device_category = category.map(str::to_string);
        self.device_name = name.map(str::to_string);
        self
    }

    pub fn with_mode(mut self, category: Option<&str>, name: Option<&str>) -> Self {
        self.mode_category = category.map(str::to_string);
        self.mode_name = name.map(str::to_string);
        self
    }

    pub fn with_order(mut self, ingest_order: usize) -> Self {
        self.ingest_order = ingest_order;
        self
    }
}

/// An observation after timestamp normalization, as carried through the waterfall.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub hospitalization_id: String,
    pub recorded_dttm: NaiveDateTime,
    pub device_category: Option<String>,
    pub device_name: Option<String>,
    pub mode_category: Option<String>,
    pub mode_name: Option<String>,
    pub fio2_set: Option<f64>,
    pub lpm_set: Option<f64>,
    pub peep_set: Option<f64>,
    pub resp_rate_set: Option<f64>,
    pub resp_rate_obs: Option<f64>,
    pub tracheostomy: Option<bool>,
    pub ingest_order: usize,
    pub device_cat_id: i64,
    pub device_id: i64,
    pub mode_cat_id: i64,
    pub mode_name_id: i64,
}

impl Observation {
    /// Builds a typed observation from its raw row and parsed timestamp.
    ///
    /// Segment ids start at zero and are assigned by the waterfall.
    pub fn from_raw(raw: RawObservation, recorded_dttm: NaiveDateTime) -> Self {
        Self {
            hospitalization_id: raw.hospitalization_id,
            recorded_dttm,
            device_category: raw.device_category,
            device_name: raw.device_name,
            mode_category: raw.mode_category,
            mode_name: raw.mode_name,
            fio2_set: raw.fio2_set,
            lpm_set: raw.lpm_set,
            peep_set: raw.peep_set,
            resp_rate_set: raw.resp_rate_set,
            resp_rate_obs: raw.resp_rate_obs,
            tracheostomy: raw.tracheostomy,
            ingest_order: raw.ingest_order,
            device_cat_id: 0,
            device_id: 0,
            mode_cat_id: 0,
            mode_name_id: 0,
        }
    }

    /// True when none of the device, mode or FiO2 fields carry a value.
    pub fn has_no_support_data(&self) -> bool {
        self.device_category.is_none()
            && self.device_name.is_none()
            && self.mode_category.is_none()
            && self.mode_name.is_none()
            && self.fio2_set.is_none()
    }
}

/// One row of the normalized episode table.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRow {
    pub hospitalization_id: String,
    pub recorded_dttm: NaiveDateTime,
    pub device_category: Option<String>,
    pub device_name: Option<String>,
    pub mode_category: Option<String>,
    pub mode_name: Option<String>,
    pub device_cat_id: i64,
    pub device_id: i64,
    pub mode_cat_id: i64,
    pub mode_name_id: i64,
    pub fio2_set: Option<f64>,
    pub lpm_set: Option<f64>,
    pub peep_set: Option<f64>,
    pub resp_rate_set: Option<f64>,
    pub tracheostomy: Option<bool>,
    pub resp_rate_obs: Option<f64>,
}

impl EpisodeRow {
    pub fn recorded_date(&self) -> chrono::NaiveDate {
        self.recorded_dttm.date()
    }

    pub fn recorded_hour(&self) -> u32 {
        chrono::Timelike::hour(&self.recorded_dttm)
    }

    /// Converts an episode row back into an input row, e.g. to re-run the waterfall.
    pub fn to_raw(&self, timestamp_format: &str, ingest_order: usize) -> RawObservation {
        RawObservation {
            hospitalization_id: self.hospitalization_id.clone(),
            recorded_dttm: self.recorded_dttm.format(timestamp_format).to_string(),
            device_category: self.device_category.clone(),
            device_name: self.device_name.clone(),
            mode_category: self.mode_category.clone(),
            mode_name: self.mode_name.clone(),
            fio2_set: self.fio2_set,
            lpm_set: self.lpm_set,
            peep_set: self.peep_set,
            resp_rate_set: self.resp_rate_set,
            resp_rate_obs: self.resp_rate_obs,
            tracheostomy: self.tracheostomy,
            ingest_order,
        }
    }
}

impl From<&Observation> for EpisodeRow {
    fn from(obs: &Observation) -> Self {
        Self {
            hospitalization_id: obs.hospitalization_id.clone(),
            recorded_dttm: obs.recorded_dttm,
            device_category: obs.device_category.clone(),
            device_name: obs.device_name.clone(),
            mode_category: obs.mode_category.clone(),
            mode_name: obs.mode_name.clone(),
            device_cat_id: obs.device_cat_id,
            device_id: obs.device_id,
            mode_cat_id: obs.mode_cat_id,
            mode_name_id: obs.mode_name_id,
            fio2_set: obs.fio2_set,
            lpm_set: obs.lpm_set,
            peep_set: obs.peep_set,
            resp_rate_set: obs.resp_rate_set,
            tracheostomy: obs.tracheostomy,
            resp_rate_obs: obs.resp_rate_obs,
        }
    }
}
