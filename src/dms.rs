use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.,
            Axis::Longitude => 180.,
        }
    }
}

impl Hemisphere {
    pub fn from_char(c: char) -> Result<Self, Error> {
        match c.to_ascii_uppercase() {
            'N' => Ok(Hemisphere::North),
            'S' => Ok(Hemisphere::South),
            'E' => Ok(Hemisphere::East),
            'W' => Ok(Hemisphere::West),
            _ => Err(Error::InvalidReference(c.to_string())),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    pub fn is_negative(self) -> bool {
        self == Hemisphere::South || self == Hemisphere::West
    }
}

impl FromStr for Hemisphere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Hemisphere::from_char(c),
            _ => Err(Error::InvalidReference(s.to_owned())),
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        };
        write!(f, "{}", c)
    }
}

/// Sexagesimal angle as stored in the EXIF GPS tags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Dms {
    pub fn from_slice(values: &[f64]) -> Result<Self, Error> {
        match *values {
            [degrees, minutes, seconds] => {
                let dms = Dms { degrees, minutes, seconds };
                dms.validate()?;
                Ok(dms)
            }
            _ => Err(Error::InvalidCoordinate(format!(
                "expected degrees, minutes and seconds, got {} values",
                values.len()
            ))),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        let parts = [self.degrees, self.minutes, self.seconds];
        if parts.iter().any(|v| !v.is_finite() || *v < 0.) {
            return Err(Error::InvalidCoordinate(format!("{:?} is not a non-negative angle", parts)));
        }
        Ok(())
    }

    pub fn unsigned_degrees(&self) -> f64 {
        self.degrees + self.minutes / 60. + self.seconds / 3600.
    }

    /// Signed decimal degrees, negative on the southern and western hemispheres.
    pub fn to_decimal(&self, reference: Hemisphere) -> Result<f64, Error> {
        let value = self.unsigned_degrees();
        let limit = reference.axis().limit();
        if value > limit {
            return Err(Error::InvalidCoordinate(format!(
                "{}{} exceeds {}",
                value, reference, limit
            )));
        }

        Ok(if reference.is_negative() { -value } else { value })
    }
}

pub fn to_decimal(values: &[f64], reference: Hemisphere) -> Result<f64, Error> {
    Dms::from_slice(values)?.to_decimal(reference)
}
