use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::utils::kph_to_mps;

/// One tier of the acceleration model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearInformation {
    pub acceleration_rate_mps2: f32,
    pub max_speed_kph: f32,
}

impl GearInformation {
    pub fn new(acceleration_rate_mps2: f32, max_speed_kph: f32) -> Result<Self, ConfigError> {
        let gear = Self { acceleration_rate_mps2, max_speed_kph };
        gear.validate()?;
        Ok(gear)
    }

    pub fn max_speed_mps(&self) -> f32 {
        kph_to_mps(self.max_speed_kph)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.acceleration_rate_mps2.is_finite() && self.acceleration_rate_mps2 > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gear acceleration rate must be > 0, got {}",
                self.acceleration_rate_mps2
            )));
        }
        if !(self.max_speed_kph.is_finite() && self.max_speed_kph > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gear max speed must be > 0, got {}",
                self.max_speed_kph
            )));
        }
        Ok(())
    }
}

/// Ordered forward gears; index = gear number.
///
/// Gears are usually listed by increasing top speed, but nothing here relies
/// on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GearInformation>", into = "Vec<GearInformation>")]
pub struct GearTable {
    gears: Vec<GearInformation>,
}

impl GearTable {
    pub fn new(gears: Vec<GearInformation>) -> Result<Self, ConfigError> {
        if gears.is_empty() {
            return Err(ConfigError::Invalid("gear table must contain at least one gear".into()));
        }
        for gear in &gears {
            gear.validate()?;
        }
        Ok(Self { gears })
    }

    /// Look up a gear. An index outside the table is a programming error.
    pub fn gear(&self, index: usize) -> &GearInformation {
        match self.gears.get(index) {
            Some(gear) => gear,
            None => panic!("gear index {index} out of range for a {}-gear table", self.gears.len()),
        }
    }

    pub fn len(&self) -> usize {
        self.gears.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gears.is_empty()
    }

    pub fn top_gear(&self) -> usize {
        self.gears.len() - 1
    }
}

impl Default for GearTable {
    fn default() -> Self {
        Self {
            gears: vec![
                GearInformation { acceleration_rate_mps2: 0.7, max_speed_kph: 10.0 },
                GearInformation { acceleration_rate_mps2: 0.4, max_speed_kph: 25.0 },
                GearInformation { acceleration_rate_mps2: 0.2, max_speed_kph: 35.0 },
            ],
        }
    }
}

impl TryFrom<Vec<GearInformation>> for GearTable {
    type Error = ConfigError;

    fn try_from(gears: Vec<GearInformation>) -> Result<Self, Self::Error> {
        Self::new(gears)
    }
}

impl From<GearTable> for Vec<GearInformation> {
    fn from(table: GearTable) -> Self {
        table.gears
    }
}
