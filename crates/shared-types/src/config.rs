//! # Property Configurations
//!
//! Returned by `getAllPropConfigs` / `getPropConfigs`. A full vehicle
//! configuration list is routinely larger than the inline threshold, so it
//! is the common case for shared-memory transport on the inbound side.

use serde::{Deserialize, Serialize};

use crate::property::{AreaId, PropId};

/// Read/write access of a property or area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehiclePropertyAccess {
    #[default]
    None,
    Read,
    Write,
    ReadWrite,
}

/// How a property's value changes over time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehiclePropertyChangeMode {
    #[default]
    Static,
    OnChange,
    Continuous,
}

/// Per-area limits of a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleAreaConfig {
    pub area_id: AreaId,
    pub min_int32_value: i32,
    pub max_int32_value: i32,
    pub min_int64_value: i64,
    pub max_int64_value: i64,
    pub min_float_value: f32,
    pub max_float_value: f32,
    pub access: VehiclePropertyAccess,
}

/// Static description of one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePropConfig {
    pub prop: PropId,
    pub access: VehiclePropertyAccess,
    pub change_mode: VehiclePropertyChangeMode,
    pub area_configs: Vec<VehicleAreaConfig>,
    pub config_array: Vec<i32>,
    pub config_string: String,
    pub min_sample_rate: f32,
    pub max_sample_rate: f32,
}

impl VehiclePropConfig {
    #[must_use]
    pub fn new(prop: PropId) -> Self {
        Self {
            prop,
            ..Self::default()
        }
    }

    /// Area ids covered by this config; a config without areas is global.
    #[must_use]
    pub fn area_ids(&self) -> Vec<AreaId> {
        if self.area_configs.is_empty() {
            return vec![0];
        }
        self.area_configs.iter().map(|a| a.area_id).collect()
    }
}
