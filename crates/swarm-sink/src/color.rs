//! Colorized human-friendly stdout sink.
//!
//! Prints a one-shot configuration overview, then one ANSI-colored line per
//! row.  Mission ids are assigned stable colors from a small palette in
//! first-seen order.

use std::collections::HashMap;
use std::io::Write;

use swarm_core::SimulationConfig;
use swarm_enemy::DetectionRow;
use swarm_telemetry::{DroneStatus, SimulationStateRow, SwarmEventRow, TelemetryRow};

use crate::sink::EventSink;
use crate::SinkResult;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const GRAY: &str = "\x1b[90m";

const MISSION_PALETTE: [&str; 6] = [RED, GREEN, YELLOW, BLUE, MAGENTA, CYAN];

/// Prints telemetry, detections, swarm events, and state with ANSI colors.
pub struct ColorStdoutSink {
    cfg: SimulationConfig,
    out: Box<dyn Write + Send>,
    mission_colors: HashMap<String, &'static str>,
    color_idx: usize,
    overview_printed: bool,
}

impl ColorStdoutSink {
    pub fn new(cfg: SimulationConfig) -> Self {
        Self::with_writer(cfg, Box::new(std::io::stdout()))
    }

    /// Write to an arbitrary stream (used by tests).
    pub fn with_writer(cfg: SimulationConfig, out: Box<dyn Write + Send>) -> Self {
        Self {
            cfg,
            out,
            mission_colors: HashMap::new(),
            color_idx: 0,
            overview_printed: false,
        }
    }

    fn mission_color(&mut self, id: &str) -> &'static str {
        if let Some(c) = self.mission_colors.get(id) {
            return c;
        }
        let c = MISSION_PALETTE[self.color_idx % MISSION_PALETTE.len()];
        self.mission_colors.insert(id.to_owned(), c);
        self.color_idx += 1;
        c
    }

    fn print_overview(&mut self) -> std::io::Result<()> {
        if self.overview_printed {
            return Ok(());
        }
        self.overview_printed = true;

        writeln!(self.out, "Simulation Configuration:")?;
        writeln!(self.out, "  Follow Confidence:    {:.0}", self.cfg.follow_confidence)?;
        writeln!(self.out, "  Mission Criticality:  {}", self.cfg.mission_criticality)?;
        writeln!(self.out, "  Detection Radius (m): {:.0}", self.cfg.detection_radius_m)?;
        writeln!(self.out, "  Sensor Noise:         {:.2}", self.cfg.sensor_noise)?;
        writeln!(self.out, "  Terrain Occlusion:    {:.2}", self.cfg.terrain_occlusion)?;
        writeln!(self.out, "  Weather Impact:       {:.2}", self.cfg.weather_impact)?;
        writeln!(self.out, "  Communication Loss:   {:.2}", self.cfg.communication_loss)?;
        writeln!(self.out, "  Bandwidth Limit:      {}", self.cfg.bandwidth_limit)?;

        if !self.cfg.missions.is_empty() {
            writeln!(self.out, "\nMissions:")?;
            let missions = self.cfg.missions.clone();
            for m in &missions {
                let color = self.mission_color(&m.id);
                writeln!(
                    self.out,
                    "  {color}{}{RESET}  {}  {}",
                    m.id, m.name, m.description
                )?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }
}

impl EventSink for ColorStdoutSink {
    fn write_telemetry(&mut self, row: &TelemetryRow) -> SinkResult<()> {
        self.print_overview()?;
        let mission_color = self.mission_color(&row.mission_id);
        let status_color = match row.status {
            DroneStatus::Failed => RED,
            DroneStatus::LowBattery => YELLOW,
            DroneStatus::Ok => GREEN,
        };

        write!(
            self.out,
            "{GRAY}[{}]{RESET} {BLUE}cluster={}{RESET} {mission_color}mission={}{RESET} \
             {WHITE}drone={}{RESET} {GREEN}lat={:.5}{RESET} {YELLOW}lon={:.5}{RESET} \
             {MAGENTA}alt={:.1}{RESET} {CYAN}batt={:.1}{RESET} {BLUE}pattern={}{RESET} \
             {YELLOW}spd={:.1}{RESET} {CYAN}hdg={:.1}{RESET} \
             {GRAY}prev=({:.5},{:.5},{:.1}){RESET} {status_color}status={}{RESET}",
            row.ts.to_rfc3339(),
            row.cluster_id,
            row.mission_id,
            row.drone_id,
            row.lat,
            row.lon,
            row.alt,
            row.battery,
            row.movement_pattern,
            row.speed_mps,
            row.heading_deg,
            row.previous_position.lat,
            row.previous_position.lon,
            row.previous_position.alt,
            row.status.as_str(),
        )?;
        if row.follow {
            write!(self.out, " {MAGENTA}follow{RESET}")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_detection(&mut self, row: &DetectionRow) -> SinkResult<()> {
        self.print_overview()?;
        writeln!(
            self.out,
            "{GRAY}[{}]{RESET} {RED}DETECTION{RESET} drone={} enemy={} type={} \
             lat={:.5} lon={:.5} alt={:.1} dist={:.0} conf={:.2}",
            row.ts.to_rfc3339(),
            row.drone_id,
            row.enemy_id,
            row.enemy_type.as_str(),
            row.lat,
            row.lon,
            row.alt,
            row.distance_m,
            row.confidence,
        )?;
        Ok(())
    }

    fn write_swarm_event(&mut self, row: &SwarmEventRow) -> SinkResult<()> {
        self.print_overview()?;
        write!(
            self.out,
            "{GRAY}[{}]{RESET} {CYAN}SWARM{RESET} type={} drones={:?}",
            row.ts.to_rfc3339(),
            row.event_type.as_str(),
            row.drone_ids,
        )?;
        if !row.enemy_id.is_empty() {
            write!(self.out, " enemy={}", row.enemy_id)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_state(&mut self, row: &SimulationStateRow) -> SinkResult<()> {
        self.print_overview()?;
        writeln!(
            self.out,
            "{GRAY}[{}]{RESET} {BLUE}STATE{RESET} comm_loss={:.2} msgs={} \
             sensor_noise={:.2} weather={:.2} chaos={}",
            row.ts.to_rfc3339(),
            row.communication_loss,
            row.messages_sent,
            row.sensor_noise,
            row.weather_impact,
            row.chaos_mode,
        )?;
        Ok(())
    }

    fn close(&mut self) -> SinkResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
