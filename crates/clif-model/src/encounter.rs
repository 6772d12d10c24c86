//! Hospitalizations, ADT transfers, and the encounter blocks built from them.

use chrono::NaiveDateTime;

/// One row of the hospitalization table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hospitalization {
    pub patient_id: String,
    pub hospitalization_id: String,
    pub admission_dttm: Option<NaiveDateTime>,
    pub discharge_dttm: Option<NaiveDateTime>,
    /// Position in the source table, used as the final sort tie-break.
    pub ingest_order: usize,
}

impl Hospitalization {
    pub fn new(
        patient_id: impl Into<String>,
        hospitalization_id: impl Into<String>,
        admission_dttm: Option<NaiveDateTime>,
        discharge_dttm: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            hospitalization_id: hospitalization_id.into(),
            admission_dttm,
            discharge_dttm,
            ingest_order: 0,
        }
    }

    pub fn with_order(mut self, ingest_order: usize) -> Self {
        self.ingest_order = ingest_order;
        self
    }

    /// Both admission and discharge are known, so the stay can be ordered and gapped.
    pub fn is_linkable(&self) -> bool {
        self.admission_dttm.is_some() && self.discharge_dttm.is_some()
    }
}

/// One row of the ADT (admission/discharge/transfer) table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdtRecord {
    pub hospitalization_id: String,
    pub in_dttm: Option<NaiveDateTime>,
    pub out_dttm: Option<NaiveDateTime>,
    pub location_category: Option<String>,
    pub hospital_id: Option<String>,
    pub ingest_order: usize,
}

impl AdtRecord {
    pub fn new(
        hospitalization_id: impl Into<String>,
        in_dttm: Option<NaiveDateTime>,
        out_dttm: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            hospitalization_id: hospitalization_id.into(),
            in_dttm,
            out_dttm,
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location_category: &str, hospital_id: &str) -> Self {
        self.location_category = Some(location_category.to_string());
        self.hospital_id = Some(hospital_id.to_string());
        self
    }

    pub fn with_order(mut self, ingest_order: usize) -> Self {
        self.ingest_order = ingest_order;
        self
    }
}

/// Hospitalizations of one patient merged by the linkage rule.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterBlock {
    pub patient_id: String,
    pub encounter_block: i64,
    /// Earliest member admission.
    pub admission_dttm: Option<NaiveDateTime>,
    /// Latest member discharge.
    pub discharge_dttm: Option<NaiveDateTime>,
    /// Hospital of the temporally last member.
    pub hospital_id: Option<String>,
    /// Sorted, unique member hospitalization ids.
    pub list_hospitalization_id: Vec<String>,
    /// Set when the block is a singleton that could not take part in linkage.
    pub unlinkable: bool,
}

impl EncounterBlock {
    pub fn contains(&self, hospitalization_id: &str) -> bool {
        self.list_hospitalization_id
            .binary_search_by(|id| id.as_str().cmp(hospitalization_id))
            .is_ok()
    }

    pub fn member_count(&self) -> usize {
        self.list_hospitalization_id.len()
    }
}

/// One row of the block membership table: a member hospitalization joined
/// with one of its transfer records and the block's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMember {
    pub patient_id: String,
    pub hospitalization_id: String,
    pub encounter_block: i64,
    pub location_category: Option<String>,
    pub in_dttm: Option<NaiveDateTime>,
    pub out_dttm: Option<NaiveDateTime>,
    pub admission_dttm: Option<NaiveDateTime>,
    pub discharge_dttm: Option<NaiveDateTime>,
    pub hospital_id: Option<String>,
    pub list_hospitalization_id: Vec<String>,
}
