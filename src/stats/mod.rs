//! Stats module - sensor summaries for dashboard cards

mod summary;

pub use summary::{
    defect_rate, describe, numeric_values, summarize_sensors, DefectRate, SensorSummary,
    PASS_FAIL_COLUMN,
};
