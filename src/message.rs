//! Message definitions for inter-module communication.
//!
//! Every value exchanged over the bus is a [`Message`]: an immutable payload
//! tagged with the simulated timestamp at which its producer wrote it.
//! Payload variants cover the state and sensor quantities exchanged in an
//! entry-trajectory simulation.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::types::SimTime;

/// A timestamped value on a bus channel.
///
/// Messages are overwritten in place on publish; a consumer always sees the
/// most recent one at or before its own step, never a future value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Simulated time at which the producer published this value
    pub time: SimTime,
    /// The value itself
    pub payload: MsgPayload,
}

impl Message {
    /// Creates a new message.
    pub fn new(time: SimTime, payload: MsgPayload) -> Self {
        Self { time, payload }
    }
}

/// The semantic content of a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MsgPayload {
    /// Translational state: inertial position and velocity vectors.
    State {
        /// Position in the inertial frame [m]
        pos: Vector3<f64>,
        /// Velocity in the inertial frame [m/s]
        vel: Vector3<f64>,
    },

    /// Inertial measurement: specific force and angular rate.
    Imu {
        /// Measured specific force [m/s^2]
        accel: Vector3<f64>,
        /// Measured angular rate [rad/s]
        omega: Vector3<f64>,
    },

    /// Attitude quaternion (scalar-first), e.g. a star-tracker output.
    Attitude {
        /// Quaternion [q0, q1, q2, q3], scalar first
        q: [f64; 4],
    },

    /// Atmosphere sample at the vehicle's current altitude.
    Atmo {
        /// Neutral density [kg/m^3]
        density: f64,
        /// Temperature [K]
        temperature: f64,
    },

    /// A bare scalar, for counters, test signals and the like.
    Scalar(f64),
}

impl MsgPayload {
    /// Returns the scalar value if this is a `Scalar` payload.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MsgPayload::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns position and velocity if this is a `State` payload.
    pub fn as_state(&self) -> Option<(&Vector3<f64>, &Vector3<f64>)> {
        match self {
            MsgPayload::State { pos, vel } => Some((pos, vel)),
            _ => None,
        }
    }

    /// Flattens the payload into a row of numbers, for CSV-style export.
    pub fn components(&self) -> Vec<f64> {
        match self {
            MsgPayload::State { pos, vel } => {
                vec![pos.x, pos.y, pos.z, vel.x, vel.y, vel.z]
            }
            MsgPayload::Imu { accel, omega } => {
                vec![accel.x, accel.y, accel.z, omega.x, omega.y, omega.z]
            }
            MsgPayload::Attitude { q } => q.to_vec(),
            MsgPayload::Atmo {
                density,
                temperature,
            } => vec![*density, *temperature],
            MsgPayload::Scalar(v) => vec![*v],
        }
    }

    /// A short name for the payload variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            MsgPayload::State { .. } => "state",
            MsgPayload::Imu { .. } => "imu",
            MsgPayload::Attitude { .. } => "attitude",
            MsgPayload::Atmo { .. } => "atmo",
            MsgPayload::Scalar(_) => "scalar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_accessor() {
        let p = MsgPayload::Scalar(42.0);
        assert_eq!(p.as_scalar(), Some(42.0));
        assert!(p.as_state().is_none());
    }

    #[test]
    fn test_state_components() {
        let p = MsgPayload::State {
            pos: Vector3::new(1.0, 2.0, 3.0),
            vel: Vector3::new(4.0, 5.0, 6.0),
        };
        assert_eq!(p.components(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(p.kind(), "state");
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(
            250_000_000,
            MsgPayload::Atmo {
                density: 1.225,
                temperature: 288.15,
            },
        );
        let json = serde_json::to_string(&msg).unwrap();
        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, restored);
    }
}
