//! Cartridge temperature interlock (spec.md §4.7; threshold from
//! `original_source/inc/paChannel.h`).

pub const PA_MAX_ALLOWED_TEMP: f32 = 30.0;

/// True once any of a cartridge's sensors crosses the threshold; the
/// caller is expected to disable that cartridge's power amplifiers and
/// log the trip (spec.md §4.7).
pub fn temperature_trips_interlock(sensor_readings: &[f32]) -> bool {
    sensor_readings.iter().any(|&t| t >= PA_MAX_ALLOWED_TEMP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_does_not_trip() {
        assert!(!temperature_trips_interlock(&[10.0, 20.0, 29.9]));
    }

    #[test]
    fn at_or_above_threshold_trips() {
        assert!(temperature_trips_interlock(&[10.0, 30.0]));
        assert!(temperature_trips_interlock(&[35.0]));
    }
}
