//! Column names of the input and output tables.

pub const PATIENT_ID: &str = "patient_id";
pub const HOSPITALIZATION_ID: &str = "hospitalization_id";

pub const RECORDED_DTTM: &str = "recorded_dttm";
pub const RECORDED_DATE: &str = "recorded_date";
pub const RECORDED_HOUR: &str = "recorded_hour";
pub const DEVICE_CATEGORY: &str = "device_category";
pub const DEVICE_NAME: &str = "device_name";
pub const MODE_CATEGORY: &str = "mode_category";
pub const MODE_NAME: &str = "mode_name";
pub const DEVICE_CAT_ID: &str = "device_cat_id";
pub const DEVICE_ID: &str = "device_id";
pub const MODE_CAT_ID: &str = "mode_cat_id";
pub const MODE_NAME_ID: &str = "mode_name_id";
pub const FIO2_SET: &str = "fio2_set";
pub const LPM_SET: &str = "lpm_set";
pub const PEEP_SET: &str = "peep_set";
pub const RESP_RATE_SET: &str = "resp_rate_set";
pub const RESP_RATE_OBS: &str = "resp_rate_obs";
pub const TRACHEOSTOMY: &str = "tracheostomy";

pub const ADMISSION_DTTM: &str = "admission_dttm";
pub const DISCHARGE_DTTM: &str = "discharge_dttm";

pub const IN_DTTM: &str = "in_dttm";
pub const OUT_DTTM: &str = "out_dttm";
pub const LOCATION_CATEGORY: &str = "location_category";
pub const HOSPITAL_ID: &str = "hospital_id";

pub const ENCOUNTER_BLOCK: &str = "encounter_block";
pub const LIST_HOSPITALIZATION_ID: &str = "list_hospitalization_id";
pub const UNLINKABLE: &str = "unlinkable";

/// Required columns of the respiratory support input table.
pub const OBSERVATION_INPUT: &[&str] = &[
    HOSPITALIZATION_ID,
    RECORDED_DTTM,
    DEVICE_CATEGORY,
    DEVICE_NAME,
    MODE_CATEGORY,
    MODE_NAME,
    FIO2_SET,
    LPM_SET,
    PEEP_SET,
    RESP_RATE_SET,
    RESP_RATE_OBS,
    TRACHEOSTOMY,
];

/// Column order of the episode output table.
pub const EPISODE_OUTPUT: &[&str] = &[
    HOSPITALIZATION_ID,
    RECORDED_DTTM,
    RECORDED_DATE,
    RECORDED_HOUR,
    DEVICE_CATEGORY,
    DEVICE_NAME,
    MODE_CATEGORY,
    MODE_NAME,
    DEVICE_CAT_ID,
    DEVICE_ID,
    MODE_CAT_ID,
    MODE_NAME_ID,
    FIO2_SET,
    LPM_SET,
    PEEP_SET,
    RESP_RATE_SET,
    TRACHEOSTOMY,
    RESP_RATE_OBS,
];

/// Required columns of the hospitalization input table.
///
/// `age_at_admission` is part of the CLIF table but not read by the stitcher.
pub const HOSPITALIZATION_INPUT: &[&str] = &[
    PATIENT_ID,
    HOSPITALIZATION_ID,
    ADMISSION_DTTM,
    DISCHARGE_DTTM,
];

/// Required columns of the ADT input table.
pub const ADT_INPUT: &[&str] = &[
    HOSPITALIZATION_ID,
    IN_DTTM,
    OUT_DTTM,
    LOCATION_CATEGORY,
    HOSPITAL_ID,
];

/// Column order of the encounter block table.
pub const BLOCK_OUTPUT: &[&str] = &[
    PATIENT_ID,
    ENCOUNTER_BLOCK,
    ADMISSION_DTTM,
    DISCHARGE_DTTM,
    HOSPITAL_ID,
    LIST_HOSPITALIZATION_ID,
    UNLINKABLE,
];

/// Column order of the block membership table.
pub const MEMBER_OUTPUT: &[&str] = &[
    PATIENT_ID,
    HOSPITALIZATION_ID,
    ENCOUNTER_BLOCK,
    LOCATION_CATEGORY,
    IN_DTTM,
    OUT_DTTM,
    ADMISSION_DTTM,
    DISCHARGE_DTTM,
    HOSPITAL_ID,
    LIST_HOSPITALIZATION_ID,
];
