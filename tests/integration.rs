//! End-to-end scenario test: an Earth arrival configuration driving a full
//! multi-rate module graph through the whole lifecycle.

use aerocap::config::{earth_aerocapture, mars_aerocapture, CentralBody};
use aerocap::message::MsgPayload;
use aerocap::modules::mock::{LastValueConsumer, ScalingConsumer, StatePublisher};
use aerocap::orbit::{cartesian_to_spherical, spherical_to_cartesian};
use aerocap::scheduler::{Scheduler, SchedulerState};
use aerocap::types::{nanos_to_sec, sec_to_nanos};

#[test]
fn test_earth_scenario_end_to_end() {
    let scenario = earth_aerocapture();
    assert_eq!(scenario.body, CentralBody::Earth);

    let (pos, vel) = spherical_to_cartesian(&scenario.initial_state);

    let mut sim = Scheduler::new();

    // Dynamics stands in as a constant-state publisher; the sensor chain
    // reads it at its own rates.
    let dynamics = sim
        .register(
            Box::new(StatePublisher::new("dynamics", "sc_states", pos, vel)),
            "dynamics",
            scenario.rate_group("dynamics").unwrap().period(),
        )
        .unwrap();
    let imu = sim
        .register(
            Box::new(LastValueConsumer::new("imu", "sc_states", "imu_meas")),
            "imu",
            scenario.rate_group("imu").unwrap().period(),
        )
        .unwrap();
    let str_ = sim
        .register(
            Box::new(LastValueConsumer::new("str", "sc_states", "str_meas")),
            "str",
            scenario.rate_group("str").unwrap().period(),
        )
        .unwrap();

    sim.declare_output(dynamics, "sc_states").unwrap();
    sim.declare_input(imu, "sc_states").unwrap();
    sim.declare_output(imu, "imu_meas").unwrap();
    sim.declare_input(str_, "sc_states").unwrap();
    sim.declare_output(str_, "str_meas").unwrap();

    sim.attach_recorder("sc_states", "dynamics").unwrap();
    sim.attach_recorder("str_meas", "str").unwrap();

    sim.finalize().unwrap();
    sim.initialize().unwrap();
    sim.run(scenario.stop_time()).unwrap();
    assert_eq!(sim.state(), SchedulerState::Stopped);

    // 60 s at 25 ms: samples at t = 0, 0.025, ..., 60.0.
    let states = sim.series("sc_states").unwrap();
    assert_eq!(states.len(), 2401);
    assert_eq!(states.entries()[0].0, 0);
    assert_eq!(states.last().unwrap().0, sec_to_nanos(60.0));

    // 60 s at 1 s: 61 star-tracker samples.
    let str_series = sim.series("str_meas").unwrap();
    assert_eq!(str_series.len(), 61);
    assert!((nanos_to_sec(str_series.entries()[1].0) - 1.0).abs() < 1e-12);

    // The state flowing through the bus reconstructs the configured entry
    // elements.
    let (rec_pos, rec_vel) = match &sim.read("sc_states").unwrap().payload {
        MsgPayload::State { pos, vel } => (*pos, *vel),
        other => panic!("unexpected payload: {:?}", other),
    };
    let back = cartesian_to_spherical(&rec_pos, &rec_vel);
    let entry = scenario.initial_state;
    assert!((back.radius - entry.radius).abs() < 1e-3);
    assert!((back.speed - entry.speed).abs() < 1e-6);
    assert!((back.flight_path_angle - entry.flight_path_angle).abs() < 1e-9);
    assert!((back.heading - entry.heading).abs() < 1e-9);

    // The entry point sits above the atmosphere table's usual span.
    let altitude = rec_pos.norm() - scenario.body.equatorial_radius();
    assert!(altitude > 100_000.0);
}

#[test]
fn test_mars_scenario_runs_with_shared_module_graph() {
    let scenario = mars_aerocapture();
    let (pos, vel) = spherical_to_cartesian(&scenario.initial_state);

    let mut sim = Scheduler::new();
    let dynamics = sim
        .register(
            Box::new(StatePublisher::new("dynamics", "sc_states", pos, vel)),
            "dynamics",
            scenario.rate_group("dynamics").unwrap().period(),
        )
        .unwrap();
    let str_ = sim
        .register(
            Box::new(LastValueConsumer::new("str", "sc_states", "str_meas")),
            "str",
            scenario.rate_group("str").unwrap().period(),
        )
        .unwrap();
    sim.declare_output(dynamics, "sc_states").unwrap();
    sim.declare_input(str_, "sc_states").unwrap();
    sim.declare_output(str_, "str_meas").unwrap();
    sim.attach_recorder("str_meas", "str").unwrap();

    sim.finalize().unwrap();
    sim.initialize().unwrap();
    sim.run(scenario.stop_time()).unwrap();

    // 400 s at 1 s: 401 samples.
    assert_eq!(sim.series("str_meas").unwrap().len(), 401);

    // Mars entry altitude is the configured 125 km.
    let altitude = pos.norm() - scenario.body.equatorial_radius();
    assert!((altitude - 125_000.0).abs() < 1e-3);
}

#[test]
fn test_config_driven_rate_groups() {
    let yaml = r#"
body: earth
stop_time_s: 2.0
initial_state:
  radius: 6503000.0
  longitude: 0.0
  latitude: 0.0
  speed: 11200.0
  flight_path_angle: -0.0899
  heading: 1.5707963267948966
rate_groups:
  - name: fast
    period_s: 0.25
  - name: slow
    period_s: 1.0
"#;
    let scenario = aerocap::config::ScenarioConfig::from_yaml(yaml).unwrap();
    let (pos, vel) = spherical_to_cartesian(&scenario.initial_state);

    let mut sim = Scheduler::new();
    let p = sim
        .register(
            Box::new(StatePublisher::new("dynamics", "sc_states", pos, vel)),
            &scenario.rate_groups[0].name,
            scenario.rate_groups[0].period(),
        )
        .unwrap();
    let c = sim
        .register(
            Box::new(ScalingConsumer::new("gauge", "radius_m", "radius_km", 1e-3)),
            &scenario.rate_groups[1].name,
            scenario.rate_groups[1].period(),
        )
        .unwrap();
    let r = sim
        .register(
            Box::new(RadiusExtractor::new("radius", "sc_states", "radius_m")),
            &scenario.rate_groups[0].name,
            scenario.rate_groups[0].period(),
        )
        .unwrap();
    sim.declare_output(p, "sc_states").unwrap();
    sim.declare_input(r, "sc_states").unwrap();
    sim.declare_output(r, "radius_m").unwrap();
    sim.declare_input(c, "radius_m").unwrap();
    sim.declare_output(c, "radius_km").unwrap();
    sim.attach_recorder("radius_km", "slow").unwrap();

    sim.finalize().unwrap();
    sim.initialize().unwrap();
    sim.run(scenario.stop_time()).unwrap();

    let series = sim.series("radius_km").unwrap();
    assert_eq!(series.len(), 3);
    for (_, msg) in series.entries() {
        let km = msg.payload.as_scalar().unwrap();
        assert!((km - 6503.0).abs() < 1e-6);
    }
}

/// Publishes the norm of an upstream state's position as a scalar.
struct RadiusExtractor {
    tag: String,
    input: String,
    output: String,
}

impl RadiusExtractor {
    fn new(tag: &str, input: &str, output: &str) -> Self {
        Self {
            tag: tag.to_string(),
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

impl aerocap::module::SimModule for RadiusExtractor {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn step(
        &mut self,
        time: aerocap::types::SimTime,
        bus: &mut aerocap::bus::MessageBus,
    ) -> Result<(), aerocap::error::ModuleError> {
        let radius = match &bus.read(&self.input)?.payload {
            MsgPayload::State { pos, .. } => pos.norm(),
            other => return Err(format!("expected a state payload, got {:?}", other.kind()).into()),
        };
        bus.publish(&self.output, MsgPayload::Scalar(radius), time)?;
        Ok(())
    }
}
