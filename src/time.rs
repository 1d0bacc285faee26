//! UTC and BCD time fields (EN 300 468 Annex C).

use crate::encoding::{EncodingResult, Section};

/// Packs a value below 100 into two BCD digits.
pub fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// A UTC instant as carried in TDT, TOT and EIT: a Modified Julian Date
/// followed by hours, minutes and seconds in BCD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcTime {
    pub mjd: u16,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl UtcTime {
    /// Bytes taken on the wire.
    pub const LEN: usize = 5;

    pub fn new(mjd: u16, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            mjd,
            hour,
            minute,
            second,
        }
    }

    /// Builds a time from a calendar date.
    ///
    /// Returns `None` for dates before 1900-03-01 or past the 16-bit MJD
    /// range, and for out of range fields.
    pub fn from_ymd_hms(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }

        // Annex C: MJD = 14956 + D + int((Y - L) * 365.25) + int((M + 1 + L * 12) * 30.6001)
        let leap = u32::from(month <= 2);
        let y = u32::from(year).checked_sub(1900)?.checked_sub(leap)?;
        let m = u32::from(month) + 1 + leap * 12;
        let mjd = 14956 + u32::from(day) + y * 36525 / 100 + m * 306001 / 10000;

        Some(Self {
            mjd: u16::try_from(mjd).ok()?,
            hour,
            minute,
            second,
        })
    }

    /// Writes the 40-bit UTC_time field.
    pub fn write(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u16(self.mjd)?;
        section.write_u8(to_bcd(self.hour))?;
        section.write_u8(to_bcd(self.minute))?;
        section.write_u8(to_bcd(self.second))
    }
}

/// A duration as three BCD bytes (hours, minutes, seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BcdDuration {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl BcdDuration {
    /// Bytes taken on the wire.
    pub const LEN: usize = 3;

    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Splits a number of seconds; hours above 99 are clamped.
    pub fn from_secs(total: u32) -> Self {
        Self {
            hours: (total / 3600).min(99) as u8,
            minutes: (total / 60 % 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    pub fn write(&self, section: &mut Section) -> EncodingResult<()> {
        section.write_u8(to_bcd(self.hours))?;
        section.write_u8(to_bcd(self.minutes))?;
        section.write_u8(to_bcd(self.seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bcd() {
        assert_eq!(to_bcd(0), 0x00);
        assert_eq!(to_bcd(9), 0x09);
        assert_eq!(to_bcd(45), 0x45);
        assert_eq!(to_bcd(99), 0x99);
    }

    #[test]
    fn test_mjd_from_date() {
        // worked example from EN 300 468 Annex C
        let time = UtcTime::from_ymd_hms(1993, 10, 13, 12, 45, 0).unwrap();
        assert_eq!(time.mjd, 0xC079);

        // January uses the leap correction
        assert_eq!(UtcTime::from_ymd_hms(2000, 1, 1, 0, 0, 0).unwrap().mjd, 51544);
        assert_eq!(UtcTime::from_ymd_hms(2024, 2, 29, 0, 0, 0).unwrap().mjd, 60369);
    }

    #[test]
    fn test_invalid_dates() {
        assert!(UtcTime::from_ymd_hms(1899, 5, 1, 0, 0, 0).is_none());
        assert!(UtcTime::from_ymd_hms(2024, 13, 1, 0, 0, 0).is_none());
        assert!(UtcTime::from_ymd_hms(2024, 1, 1, 24, 0, 0).is_none());
        assert!(UtcTime::from_ymd_hms(2100, 1, 1, 0, 0, 0).is_none());
    }

    #[test]
    fn test_utc_time_layout() {
        let mut section = Section::new(8);
        UtcTime::new(0xC079, 12, 45, 0).write(&mut section).unwrap();
        assert_eq!(section.as_bytes(), &[0xC0, 0x79, 0x12, 0x45, 0x00]);
    }

    #[test]
    fn test_duration_layout() {
        let duration = BcdDuration::from_secs(5400 + 30);
        assert_eq!(duration, BcdDuration::new(1, 30, 30));

        let mut section = Section::new(3);
        duration.write(&mut section).unwrap();
        assert_eq!(section.as_bytes(), &[0x01, 0x30, 0x30]);
    }
}
