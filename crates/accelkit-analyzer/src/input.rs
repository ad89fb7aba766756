//! Analysis input: raw hits and their calibration.

use accelkit_core::error::{AccError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One raw hit: an ADC count on a channel of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Digi {
    /// Module id, indexes [`Calibration::gains`]
    pub module: u32,
    /// Channel within the module
    pub channel: u32,
    /// Raw ADC count
    pub adc: u16,
}

impl Digi {
    /// Creates a hit.
    pub fn new(module: u32, channel: u32, adc: u16) -> Self {
        Self {
            module,
            channel,
            adc,
        }
    }
}

/// Per-module gains and a common pedestal.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    /// Gain of each module, indexed by module id
    pub gains: Vec<f32>,
    /// ADC offset subtracted before applying the gain
    pub pedestal: f32,
}

impl Calibration {
    /// Creates a calibration.
    pub fn new(gains: Vec<f32>, pedestal: f32) -> Self {
        Self { gains, pedestal }
    }

    /// The same gain for `modules` modules.
    pub fn uniform(modules: usize, gain: f32, pedestal: f32) -> Self {
        Self::new(vec![gain; modules], pedestal)
    }

    /// Gain of `module`, if it is calibrated.
    pub fn gain(&self, module: u32) -> Option<f32> {
        self.gains.get(module as usize).copied()
    }

    /// Calibrated charge of an ADC count; never negative.
    pub fn charge(adc: u16, pedestal: f32, gain: f32) -> f32 {
        let q = (f32::from(adc) - pedestal) * gain;
        if q > 0.0 {
            q
        } else {
            0.0
        }
    }
}

/// Everything `analyze` reads.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Input {
    /// Raw hits, in any order
    pub digis: Vec<Digi>,
    /// Calibration constants
    pub calibration: Calibration,
}

impl Input {
    /// Creates an input.
    pub fn new(digis: Vec<Digi>, calibration: Calibration) -> Self {
        Self {
            digis,
            calibration,
        }
    }

    /// Number of hits.
    pub fn len(&self) -> usize {
        self.digis.len()
    }

    /// Whether there are no hits.
    pub fn is_empty(&self) -> bool {
        self.digis.is_empty()
    }

    /// Checks the preconditions `analyze` relies on.
    ///
    /// Every hit must reference a calibrated module, calibration constants
    /// must be finite, and hit counts must fit in 32 bits.
    pub fn validate(&self) -> Result<()> {
        if u32::try_from(self.digis.len()).is_err() {
            return Err(AccError::invalid_input(format!(
                "{} digis exceed the 32-bit hit index",
                self.digis.len()
            )));
        }
        let cal = &self.calibration;
        if !cal.pedestal.is_finite() {
            return Err(AccError::invalid_input(format!(
                "pedestal {} is not finite",
                cal.pedestal
            )));
        }
        if let Some(m) = cal.gains.iter().position(|g| !g.is_finite()) {
            return Err(AccError::invalid_input(format!(
                "gain of module {m} is not finite"
            )));
        }
        if let Some(d) = self.digis.iter().find(|d| cal.gain(d.module).is_none()) {
            return Err(AccError::invalid_input(format!(
                "module {} of channel {} has no gain ({} modules calibrated)",
                d.module,
                d.channel,
                cal.gains.len()
            )));
        }
        Ok(())
    }
}

/// Hits sorted by `(module, channel)` in structure-of-arrays form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HostDigis {
    pub(crate) modules: Vec<u32>,
    pub(crate) channels: Vec<u32>,
    pub(crate) adcs: Vec<u16>,
}

impl HostDigis {
    /// Layout order of hits: by module, then channel.
    pub(crate) fn key(d: &Digi) -> (u32, u32) {
        (d.module, d.channel)
    }

    /// Stable sort on the calling thread; duplicates keep their input order.
    pub(crate) fn sorted(digis: &[Digi]) -> Self {
        let mut hits = digis.to_vec();
        hits.sort_by_key(Self::key);
        Self::from_sorted(&hits)
    }

    /// Splits hits already in [`key`](Self::key) order into columns.
    pub(crate) fn from_sorted(hits: &[Digi]) -> Self {
        Self {
            modules: hits.iter().map(|d| d.module).collect(),
            channels: hits.iter().map(|d| d.channel).collect(),
            adcs: hits.iter().map(|d| d.adc).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.adcs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_clamped() {
        assert_eq!(Calibration::charge(10, 20.0, 2.0), 0.0);
        assert_eq!(Calibration::charge(30, 20.0, 2.0), 20.0);
    }

    #[test]
    fn test_missing_gain_rejected() {
        let input = Input::new(
            vec![Digi::new(0, 1, 5), Digi::new(3, 1, 5)],
            Calibration::uniform(2, 1.0, 0.0),
        );
        let err = input.validate().unwrap_err();
        assert!(matches!(err, AccError::InvalidInput { .. }));
        assert!(err.to_string().contains("module 3"));
    }

    #[test]
    fn test_non_finite_calibration_rejected() {
        let mut input = Input::new(vec![], Calibration::new(vec![1.0, f32::NAN], 0.0));
        assert!(input.validate().is_err());

        input.calibration = Calibration::new(vec![1.0], f32::INFINITY);
        assert!(input.validate().is_err());

        input.calibration = Calibration::uniform(1, 1.0, 0.5);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_sort_is_stable() {
        let digis = vec![
            Digi::new(1, 4, 1),
            Digi::new(0, 9, 2),
            Digi::new(1, 4, 3),
            Digi::new(0, 2, 4),
        ];
        let host = HostDigis::sorted(&digis);
        assert_eq!(host.modules, vec![0, 0, 1, 1]);
        assert_eq!(host.channels, vec![2, 9, 4, 4]);
        assert_eq!(host.adcs, vec![4, 2, 1, 3]);
        assert_eq!(host.len(), 4);
    }
}
