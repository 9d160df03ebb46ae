use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auto_scroll::{ACCELERATION_LIMIT, MIN_SCROLL};
use crate::error::{Error, Result};

/// Tunables for a draggable list.
///
/// All lengths are in logical pixels. Missing fields fall back to their defaults, so
/// `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraggableConfig {
    /// Upper bound on how far auto-scroll moves the list in one frame.
    pub max_scroll_per_frame: f32,
    /// Time until auto-scroll reaches full speed.
    pub acceleration_limit_ms: u64,
    /// Press-and-hold time before a drag starts.
    pub long_press_ms: u64,
    /// Pointer travel that aborts a pending long press.
    pub touch_slop: f32,
    /// Keep the dragged item on the list's main axis.
    pub orientation_locked: bool,
    pub spring: SpringConfig,
}

impl Default for DraggableConfig {
    fn default() -> Self {
        Self {
            max_scroll_per_frame: 20.,
            acceleration_limit_ms: ACCELERATION_LIMIT.as_millis() as u64,
            long_press_ms: 400,
            touch_slop: 8.,
            orientation_locked: true,
            spring: SpringConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub visibility_threshold: f32,
}

impl SpringConfig {
    pub const STIFFNESS_HIGH: f32 = 10_000.;
    pub const STIFFNESS_MEDIUM: f32 = 1500.;
    pub const STIFFNESS_MEDIUM_LOW: f32 = 400.;
    pub const STIFFNESS_LOW: f32 = 200.;
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: Self::STIFFNESS_MEDIUM_LOW,
            visibility_threshold: 0.5,
        }
    }
}

impl DraggableConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_scroll_per_frame.is_finite() || self.max_scroll_per_frame < MIN_SCROLL {
            return Err(Error::InvalidConfig(
                "max_scroll_per_frame must be at least one pixel",
            ));
        }
        if self.acceleration_limit_ms == 0 {
            return Err(Error::InvalidConfig("acceleration_limit_ms must be non-zero"));
        }
        if !self.touch_slop.is_finite() || self.touch_slop < 0.0 {
            return Err(Error::InvalidConfig("touch_slop must not be negative"));
        }
        if !self.spring.stiffness.is_finite() || self.spring.stiffness <= 0.0 {
            return Err(Error::InvalidConfig("spring.stiffness must be positive"));
        }
        if !self.spring.visibility_threshold.is_finite() || self.spring.visibility_threshold <= 0.0
        {
            return Err(Error::InvalidConfig(
                "spring.visibility_threshold must be positive",
            ));
        }
        Ok(())
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn acceleration_limit(&self) -> Duration {
        Duration::from_millis(self.acceleration_limit_ms)
    }
}
