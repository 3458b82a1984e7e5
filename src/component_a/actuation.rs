//! actuation.rs
//! Maps raw light/soil ADC values to local actuator commands and defines the
//! narrow capability traits the acquisition loop drives every cycle.
//!
//! - Buzzer: on while raw soil ADC is below the dry threshold (raw value, not percentage).
//! - Lights: five ascending bands on raw light ADC; darker room lights more pixels.
//! - Display: six text lines (title, four readings, device IP).

use log::{debug, info};

use crate::component_a::sensor::Reading;
use crate::config::{BUZZER_DUTY_ON, BUZZER_FREQ_HZ, DISPLAY_CONTRAST, LED_COUNT, SOIL_DRY_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightBand {
    Bright,
    MediumBright,
    Medium,
    Dim,
    VeryDim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

const DEEP_BLUE: Rgb = Rgb::new(0, 0, 230);
const MEDIUM_BLUE: Rgb = Rgb::new(0, 0, 130);
const DIM_BLUE: Rgb = Rgb::new(0, 0, 50);

// Exclusive upper bounds, checked in ascending order
const BAND_LIMITS: [(u16, LightBand); 4] = [
    (41, LightBand::Bright),
    (819, LightBand::MediumBright),
    (2048, LightBand::Medium),
    (3277, LightBand::Dim),
];

impl LightBand {
    /// First matching band wins; anything at or above 3277 is `VeryDim`.
    pub fn from_raw(light_adc: u16) -> Self {
        BAND_LIMITS
            .iter()
            .find(|(limit, _)| light_adc < *limit)
            .map(|(_, band)| *band)
            .unwrap_or(LightBand::VeryDim)
    }

    pub fn lit_count(&self) -> usize {
        match self {
            LightBand::Bright => 12,
            LightBand::MediumBright => 10,
            LightBand::Medium => 8,
            LightBand::Dim => 5,
            LightBand::VeryDim => 2,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            LightBand::Bright => DEEP_BLUE,
            LightBand::MediumBright => MEDIUM_BLUE,
            LightBand::Medium | LightBand::Dim | LightBand::VeryDim => DIM_BLUE,
        }
    }
}

/// Recomputed and discarded every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationDecision {
    pub buzzer_on: bool,
    pub light_band: LightBand,
}

impl ActuationDecision {
    pub fn from_raw(light_adc: u16, soil_adc: u16) -> Self {
        Self {
            buzzer_on: soil_adc < SOIL_DRY_THRESHOLD,
            light_band: LightBand::from_raw(light_adc),
        }
    }
}

/// Text display capability (SH1106 OLED on the device).
pub trait Display: Send {
    fn render(&mut self, reading: &Reading, ip: Option<&str>);
    fn clear(&mut self);
}

/// Buzzer + addressable light capability.
pub trait Actuators: Send {
    fn set_buzzer(&mut self, on: bool);
    fn set_lights(&mut self, band: LightBand, color: Rgb);
}

/// Lines drawn on the display, top to bottom (one per 10-pixel row).
pub fn display_lines(reading: &Reading, ip: Option<&str>) -> [String; 6] {
    [
        "Digi Mola".to_string(),
        format!("Temperature: {:.1}C", reading.temperature_c),
        format!("Humidity: {:.1} %", reading.humidity_pct),
        format!("Light: {:.1} %", reading.light_pct),
        format!("Soil: {:.1} %", reading.soil_pct),
        ip.unwrap_or("None").to_string(),
    ]
}

/// Host adapter: writes the display frame to the log instead of an OLED.
pub struct LogDisplay {
    contrast: u8,
    frames: u64,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            contrast: DISPLAY_CONTRAST,
            frames: 0,
        }
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for LogDisplay {
    fn render(&mut self, reading: &Reading, ip: Option<&str>) {
        self.frames += 1;
        let lines = display_lines(reading, ip);
        info!(
            "[Display] frame {} (contrast {}): {}",
            self.frames,
            self.contrast,
            lines.join(" | ")
        );
    }

    fn clear(&mut self) {
        info!("[Display] cleared");
    }
}

/// Host adapter: logs PWM duty and pixel state changes.
pub struct LogActuators {
    buzzer_on: Option<bool>,
    lights: Option<(LightBand, Rgb)>,
}

impl LogActuators {
    pub fn new() -> Self {
        Self {
            buzzer_on: None,
            lights: None,
        }
    }
}

impl Default for LogActuators {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuators for LogActuators {
    fn set_buzzer(&mut self, on: bool) {
        if self.buzzer_on != Some(on) {
            let duty = if on { BUZZER_DUTY_ON } else { 0 };
            info!("[Buzzer] {} (freq {} Hz, duty {})", if on { "on" } else { "off" }, BUZZER_FREQ_HZ, duty);
        }
        self.buzzer_on = Some(on);
    }

    fn set_lights(&mut self, band: LightBand, color: Rgb) {
        if self.lights != Some((band, color)) {
            info!(
                "[Lights] {:?}: {}/{} pixels rgb({}, {}, {})",
                band,
                band.lit_count(),
                LED_COUNT,
                color.r,
                color.g,
                color.b
            );
        } else {
            debug!("[Lights] unchanged ({:?})", band);
        }
        self.lights = Some((band, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(LightBand::from_raw(0), LightBand::Bright);
        assert_eq!(LightBand::from_raw(40), LightBand::Bright);
        assert_eq!(LightBand::from_raw(41), LightBand::MediumBright);
        assert_eq!(LightBand::from_raw(818), LightBand::MediumBright);
        assert_eq!(LightBand::from_raw(819), LightBand::Medium);
        assert_eq!(LightBand::from_raw(2047), LightBand::Medium);
        assert_eq!(LightBand::from_raw(2048), LightBand::Dim);
        assert_eq!(LightBand::from_raw(3276), LightBand::Dim);
        assert_eq!(LightBand::from_raw(3277), LightBand::VeryDim);
        assert_eq!(LightBand::from_raw(u16::MAX), LightBand::VeryDim);
    }

    #[test]
    fn band_outputs() {
        assert_eq!(LightBand::from_raw(40).lit_count(), 12);
        assert_eq!(LightBand::from_raw(41).lit_count(), 10);
        assert_eq!(LightBand::from_raw(3276).lit_count(), 5);
        assert_eq!(LightBand::from_raw(3277).lit_count(), 2);
        assert_eq!(LightBand::Medium.lit_count(), 8);

        assert_eq!(LightBand::Bright.color(), Rgb::new(0, 0, 230));
        assert_eq!(LightBand::MediumBright.color(), Rgb::new(0, 0, 130));
        assert_eq!(LightBand::VeryDim.color(), Rgb::new(0, 0, 50));
    }

    #[test]
    fn buzzer_threshold_is_strict_on_raw_soil() {
        assert!(ActuationDecision::from_raw(0, 1299).buzzer_on);
        assert!(!ActuationDecision::from_raw(0, 1300).buzzer_on);
        assert!(!ActuationDecision::from_raw(0, 4095).buzzer_on);
    }

    #[test]
    fn display_lines_match_device_layout() {
        let r = Reading {
            temperature_c: 25.0,
            humidity_pct: 60.0,
            light_pct: 30.5,
            soil_pct: 40.2,
        };
        let lines = display_lines(&r, Some("192.168.4.1"));
        assert_eq!(lines[0], "Digi Mola");
        assert_eq!(lines[1], "Temperature: 25.0C");
        assert_eq!(lines[2], "Humidity: 60.0 %");
        assert_eq!(lines[3], "Light: 30.5 %");
        assert_eq!(lines[4], "Soil: 40.2 %");
        assert_eq!(lines[5], "192.168.4.1");
        assert_eq!(display_lines(&r, None)[5], "None");
    }

    proptest! {
        #[test]
        fn bands_partition_the_adc_range(raw in 0u16..=u16::MAX) {
            let matching = [
                raw < 41,
                (41..819).contains(&raw),
                (819..2048).contains(&raw),
                (2048..3277).contains(&raw),
                raw >= 3277,
            ];
            prop_assert_eq!(matching.iter().filter(|m| **m).count(), 1);

            let expected = match matching.iter().position(|m| *m) {
                Some(0) => LightBand::Bright,
                Some(1) => LightBand::MediumBright,
                Some(2) => LightBand::Medium,
                Some(3) => LightBand::Dim,
                _ => LightBand::VeryDim,
            };
            prop_assert_eq!(LightBand::from_raw(raw), expected);
        }
    }
}
