//! Linear adjustment `scale * value + offset` of uncertainty estimates.
//!
//! Values are adjusted in the family's native units: seconds for travel
//! time, degrees for azimuth, seconds/degree for slowness.

use rstt_core::{ConfigError, Properties};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UncertaintyFamily {
    TravelTime,
    Azimuth,
    Slowness,
}

impl UncertaintyFamily {
    fn key_stem(&self) -> &'static str {
        match self {
            UncertaintyFamily::TravelTime => "slbmTTModelUncertainty",
            UncertaintyFamily::Azimuth => "slbmAZModelUncertainty",
            UncertaintyFamily::Slowness => "slbmSHModelUncertainty",
        }
    }

    pub fn scale_key(&self) -> String {
        format!("{}Scale", self.key_stem())
    }

    pub fn offset_key(&self) -> String {
        format!("{}Offset", self.key_stem())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyScale {
    pub scale: f64,
    pub offset: f64,
}

impl Default for UncertaintyScale {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }
}

impl UncertaintyScale {
    pub fn apply(&self, value: f64) -> f64 {
        self.scale * value + self.offset
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Read the scale key (one value, or "scale, offset") and the offset
    /// key. A non-zero offset key overrides an offset given with the scale.
    pub fn from_properties(
        properties: &Properties,
        family: UncertaintyFamily,
    ) -> Result<Self, ConfigError> {
        let scale_key = family.scale_key();
        let offset_key = family.offset_key();

        let mut result = Self::default();
        if let Some(values) = properties.get_f64_list(&scale_key)? {
            match values.as_slice() {
                [scale] => result.scale = *scale,
                [scale, offset] => {
                    result.scale = *scale;
                    result.offset = *offset;
                }
                _ => {
                    return Err(ConfigError::Invalid {
                        key: scale_key.clone(),
                        value: properties.get(&scale_key).unwrap_or_default().to_string(),
                        reason: "expected 'scale' or 'scale, offset'".to_string(),
                    })
                }
            }
        }
        if let Some(offset) = properties.get_f64(&offset_key)? {
            if offset != 0.0 {
                result.offset = offset;
            }
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UncertaintyScales {
    pub travel_time: UncertaintyScale,
    pub azimuth: UncertaintyScale,
    pub slowness: UncertaintyScale,
}

impl UncertaintyScales {
    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        Ok(Self {
            travel_time: UncertaintyScale::from_properties(properties, UncertaintyFamily::TravelTime)?,
            azimuth: UncertaintyScale::from_properties(properties, UncertaintyFamily::Azimuth)?,
            slowness: UncertaintyScale::from_properties(properties, UncertaintyFamily::Slowness)?,
        })
    }

    pub fn get(&self, family: UncertaintyFamily) -> &UncertaintyScale {
        match family {
            UncertaintyFamily::TravelTime => &self.travel_time,
            UncertaintyFamily::Azimuth => &self.azimuth,
            UncertaintyFamily::Slowness => &self.slowness,
        }
    }
}
