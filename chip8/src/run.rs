use std::io::{self, Write};
use std::time::Instant;

use chip8_vm::{Chip8, Chip8Error, Clock, Step};
use display::Display;

use crate::config::Config;

/// Moves the cursor to the top left so each frame overwrites the last
const HOME: &str = "\x1b[H";

/// What happened over a run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub cycles: u64,
    pub timer_ticks: u64,
    pub frames: u64,
}

/// Drives `chip8` until the configured cycle limit or the first error.
///
/// CPU cycles and timer ticks are paced independently by a `Clock`. In realtime mode
/// the clock follows the wall clock; otherwise every cycle counts as exactly one
/// clock period so runs are as fast as possible but keep the same timer behaviour.
pub fn run(chip8: &mut Chip8, config: &Config, out: &mut dyn Write) -> Result<Summary, Chip8Error> {
    let display = Display::new(config.display.on, config.display.off);
    let mut clock = Clock::new(config.clock_hz);
    let mut summary = Summary::default();
    let mut sounding = false;

    let mut last_cycle = Instant::now();
    loop {
        let ticks = if config.realtime {
            let now = Instant::now();
            let ticks = clock.advance(now - last_cycle);
            last_cycle = now;
            ticks
        } else {
            clock.advance(clock.cycle_time())
        };

        for _ in 0..ticks.cycles {
            if config.cycles.is_some_and(|limit| summary.cycles >= limit) {
                return Ok(summary);
            }
            if config.trace {
                eprintln!("{}", chip8.trace());
            }
            if let Step::AwaitingKey = chip8.step_instruction()? {
                if config.trace {
                    eprintln!("waiting for key");
                }
            }
            summary.cycles += 1;
        }

        for _ in 0..ticks.timer_ticks {
            chip8.tick_timers();
            summary.timer_ticks += 1;
        }

        if chip8.sound_active() != sounding {
            sounding = chip8.sound_active();
            if config.trace {
                eprintln!("sound {}", if sounding { "on" } else { "off" });
            }
        }

        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = chip8.take_frame() {
            summary.frames += 1;
            if config.watch {
                write!(out, "{}", HOME)?;
                display.render(&frame, out)?;
            }
        }

        // Handle timing
        if config.realtime {
            let elapsed_cycle_time = last_cycle.elapsed();
            if clock.cycle_time() > elapsed_cycle_time {
                std::thread::sleep(clock.cycle_time() - elapsed_cycle_time);
            }
        }
    }
}

/// Draws the final frame once a run is over
pub fn show(chip8: &Chip8, config: &Config, out: &mut dyn Write) -> io::Result<()> {
    Display::new(config.display.on, config.display.off).render(chip8.frame_buffer(), out)
}
