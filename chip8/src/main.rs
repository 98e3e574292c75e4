use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use chip8_vm::{disassemble, Chip8};

use config::Config;

mod config;
mod keymap;
mod run;

/// Runs a Chip-8 ROM in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The ROM to load
    rom: PathBuf,

    /// TOML file with run settings; flags take precedence
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Instructions per second
    #[arg(long, value_name = "HZ")]
    clock_hz: Option<u32>,

    /// Stop after N cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Seed for RND
    #[arg(long)]
    seed: Option<u64>,

    /// Print every instruction to stderr
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Run as fast as possible instead of at the clock rate
    #[arg(long, default_value_t = false)]
    fast: bool,

    /// Redraw the terminal whenever the frame changes
    #[arg(long, default_value_t = false)]
    watch: bool,

    /// Keys to hold down for the whole run, e.g. "qe"; they are never released
    #[arg(long, value_name = "KEYS")]
    keys: Option<String>,

    /// Print the ROM as instructions and exit
    #[arg(long, default_value_t = false)]
    disassemble: bool,
}

impl Args {
    fn config(&self) -> Result<Config, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml(path)?,
            None => Config::default(),
        };
        if let Some(clock_hz) = self.clock_hz {
            config.clock_hz = clock_hz;
        }
        if self.cycles.is_some() {
            config.cycles = self.cycles;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(keys) = &self.keys {
            config.keys = keys.clone();
        }
        config.trace |= self.trace;
        config.watch |= self.watch;
        config.realtime &= !self.fast;
        config.validate()
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let held_keys = match config.held_keys() {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.disassemble {
        return match std::fs::read(&args.rom) {
            Ok(rom) => {
                for line in disassemble(&rom, chip8_vm::constants::PROGRAM_START) {
                    println!("{}", line);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}: {}", args.rom.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    let mut chip8 = match config.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };

    // Load ROM
    let loaded = File::open(&args.rom)
        .map_err(chip8_vm::Chip8Error::from)
        .and_then(|file| chip8.load_rom(&mut BufReader::new(file)));
    if let Err(e) = loaded {
        eprintln!("error: {}: {}", args.rom.display(), e);
        return ExitCode::FAILURE;
    }
    if config.trace {
        eprintln!("loaded {}", args.rom.display());
    }

    for key in held_keys {
        chip8.key_press(key);
    }

    let mut stdout = io::stdout();
    let result = run::run(&mut chip8, &config, &mut stdout);
    if let Err(e) = run::show(&chip8, &config, &mut stdout) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }
    match result {
        Ok(summary) => {
            eprintln!(
                "ran {} cycles, {} timer ticks, {} frames",
                summary.cycles, summary.timer_ticks, summary.frames
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("{}", chip8.trace());
            ExitCode::FAILURE
        }
    }
}
