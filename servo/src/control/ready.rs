use std::time::Duration;

use ferroservo_clients_io::ActivationMask;
use interface::print_info;

use super::{Completed, CycleReport, Ready, Rig, ServoLoop};
use crate::{
    collaborators::CoilDriver,
    pacing::FrameReport,
    Result, ServoError,
};

impl ServoLoop<Ready> {
    /// Runs one control cycle
    ///
    /// A coil driver failure is fatal: the loop attempts to turn all the coils
    /// off before returning [ServoError::Actuator].
    pub fn cycle(&mut self) -> Result<CycleReport> {
        let Rig {
            sensor: Some(sensor),
            driver: Some(driver),
            clock,
            input,
        } = &mut self.rig
        else {
            return Err(ServoError::Detached);
        };
        let controller = &mut self.controller;
        let cycle = self.report.cycles;
        let start = clock.now();

        let events = controller.edges.detect(&input.poll());
        controller.apply(events, sensor.as_mut(), start);
        if controller.quit {
            controller.set_recording(false, start);
            controller.mask = ActivationMask::OFF;
            shutdown(driver.as_mut())?;
            self.report.cycles += 1;
            return Ok(CycleReport {
                cycle,
                position: controller.position,
                command: controller.command,
                mask: controller.mask,
                frame: FrameReport {
                    compute: clock.now().saturating_sub(start),
                    pad: Duration::ZERO,
                    overrun: false,
                },
                quit: true,
            });
        }

        if controller.sense(sensor.as_mut(), start) {
            self.report.tracking_losses += 1;
        }
        let mask = controller.actuation(start);
        if let Err(e) = driver.write(mask) {
            log::error!("failed to write {mask} to the coil driver");
            controller.mask = ActivationMask::OFF;
            if let Err(e) = driver.all_off() {
                print_info("failed to turn the coils off", Some(&e));
            }
            controller.set_recording(false, start);
            return Err(ServoError::Actuator(e));
        }
        if mask != controller.mask {
            log::debug!("coils: {mask}");
        }
        controller.mask = mask;
        controller.record(start);

        let frame = self.pacer.pace(clock.as_mut(), start);
        if frame.overrun {
            self.report.overruns += 1;
        }
        self.report.cycles += 1;
        Ok(CycleReport {
            cycle,
            position: controller.position,
            command: controller.command,
            mask,
            frame,
            quit: false,
        })
    }
    /// Runs the loop until the operator quits or the cycle cap is reached
    pub fn run(mut self) -> Result<ServoLoop<Completed>> {
        let start = self.rig.clock.now();
        log::info!("servo loop started");
        loop {
            let report = self.cycle()?;
            if report.quit {
                break;
            }
            if self
                .config
                .max_cycles
                .is_some_and(|max_cycles| self.report.cycles >= max_cycles)
            {
                log::info!("{} cycles completed", self.report.cycles);
                self.controller.set_recording(false, self.rig.clock.now());
                self.controller.mask = ActivationMask::OFF;
                if let Some(driver) = self.rig.driver.as_mut() {
                    shutdown(driver.as_mut())?;
                }
                break;
            }
        }
        self.report.elapsed = self.rig.clock.now().saturating_sub(start);
        log::info!("servo loop completed: {}", self.report());
        Ok(self.into_state())
    }
}

/// Turns all the coils off and releases the coil driver
fn shutdown(driver: &mut dyn CoilDriver) -> Result<()> {
    driver.all_off()?;
    driver.shutdown()?;
    log::info!("coils off, driver released");
    Ok(())
}
