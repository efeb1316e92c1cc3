//! Hammer stepping driver.
//!
//! This binary drives the simulator the way a host script would. It performs:
//! 1. **Run:** Load an ELF, single-step a hart N times and print the PC, raw
//!    instruction, disassembly and commit log of every step, optionally stopping
//!    once a watched 32-bit word holds a sentinel value.
//! 2. **Disasm:** Disassemble raw instruction words given on the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hammer_core::isa::disasm::disassemble_any;
use hammer_core::{
    HammerError, MemoryRegionConfig, Simulator, SimulatorConfig, StepOutcome, Xlen,
};

#[derive(Parser, Debug)]
#[command(
    name = "hammer-run",
    author,
    version,
    about = "Single-step a RISC-V ELF and print what each instruction did",
    long_about = "Single-step a RISC-V ELF and print what each instruction did.\n\nExamples:\n  hammer-run run prog.elf --isa RV32IMC --steps 20\n  hammer-run run prog.elf --watch 0x80001000 --sentinel 1 --steps 100000 --quiet\n  hammer-run run --config sim.json\n  hammer-run disasm --xlen 32 0x00a00513 0x4505"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a binary and step it.
    Run(RunArgs),

    /// Disassemble instruction words (hex or decimal).
    Disasm {
        /// Register width used for shift amounts and RV32/RV64-only encodings.
        #[arg(long, value_enum, default_value_t = XlenArg::Rv64)]
        xlen: XlenArg,

        /// Instruction words; compressed parcels use their low 16 bits.
        #[arg(required = true, value_parser = parse_u32)]
        words: Vec<u32>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum XlenArg {
    #[value(name = "32")]
    Rv32,
    #[value(name = "64")]
    Rv64,
}

impl From<XlenArg> for Xlen {
    fn from(arg: XlenArg) -> Self {
        match arg {
            XlenArg::Rv32 => Self::Rv32,
            XlenArg::Rv64 => Self::Rv64,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// ELF to load. Required unless `--config` names one.
    binary: Option<PathBuf>,

    /// JSON configuration; command-line options below are ignored when set.
    #[arg(long, conflicts_with_all = ["isa", "privilege_levels", "harts", "memory", "start_pc"])]
    config: Option<PathBuf>,

    /// ISA string.
    #[arg(long, default_value = "RV64IMAC")]
    isa: String,

    /// Implemented privilege modes.
    #[arg(long = "priv", default_value = "msu")]
    privilege_levels: String,

    /// Hart id; repeat for more harts. Only the first hart is stepped.
    #[arg(long = "hart", default_values_t = [0usize])]
    harts: Vec<usize>,

    /// Memory region as BASE:SIZE; repeat for more regions.
    #[arg(long = "mem", value_parser = parse_region)]
    memory: Vec<MemoryRegionConfig>,

    /// Initial PC instead of the ELF entry point.
    #[arg(long, value_parser = parse_u64)]
    start_pc: Option<u64>,

    /// Maximum number of steps.
    #[arg(short = 'n', long, default_value_t = 10)]
    steps: u64,

    /// Stop once the 32-bit little-endian word at this virtual address equals `--sentinel`.
    #[arg(long, value_parser = parse_u64)]
    watch: Option<u64>,

    /// Value that ends the run when `--watch` is set.
    #[arg(long, default_value = "1", value_parser = parse_u32, requires = "watch")]
    sentinel: u32,

    /// Print only the final summary.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => match cmd_run(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Disasm { xlen, words } => {
            for word in words {
                println!("{word:#010x}  {}", disassemble_any(word, xlen.into()));
            }
            ExitCode::SUCCESS
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(args: &RunArgs) -> hammer_core::Result<SimulatorConfig> {
    if let Some(path) = &args.config {
        return SimulatorConfig::from_json_file(path);
    }
    let binary = args
        .binary
        .clone()
        .ok_or_else(|| HammerError::InvalidConfig("no target binary given".to_string()))?;

    let mut builder = SimulatorConfig::builder(binary)
        .isa(args.isa.as_str())
        .privilege_levels(args.privilege_levels.as_str())
        .hart_ids(args.harts.clone());
    if !args.memory.is_empty() {
        builder = builder.memory_layout(args.memory.clone());
    }
    if let Some(pc) = args.start_pc {
        builder = builder.start_pc(pc);
    }
    builder.build()
}

/// Steps the first configured hart until the step budget runs out or the
/// watched word reaches the sentinel.
///
/// Returns failure when a watch was requested and never satisfied.
fn cmd_run(args: &RunArgs) -> hammer_core::Result<ExitCode> {
    let config = build_config(args)?;
    let mut sim = Simulator::new(&config)?;
    let Some(&hart) = sim.hart_ids().first() else {
        return Err(HammerError::InvalidConfig("no harts".to_string()));
    };
    let width = if sim.xlen() == Xlen::Rv32 { 10 } else { 18 };

    info!(
        binary = %config.target_binary().display(),
        entry = sim.entry_point(),
        "loaded"
    );
    if !args.quiet {
        println!("initial pc: {:#0width$x}", sim.get_pc(hart)?);
    }

    let mut traps = 0u64;
    for step in 1..=args.steps {
        let pc = sim.get_pc(hart)?;
        // The PC may sit on an unmapped page once a trap vector is bogus.
        let listing = sim
            .get_insn_hex(hart, pc)
            .and_then(|raw| sim.get_insn_string(hart, pc).map(|text| (raw, text)));

        let outcome = sim.single_step(hart)?;
        if let StepOutcome::TrapTaken(trap) = outcome {
            traps += 1;
            debug!(step, %trap, "trap taken");
        }

        if !args.quiet {
            match &listing {
                Ok((raw, text)) => println!("{step:>6}: {pc:#0width$x} ({raw:#010x}) {text}"),
                Err(_) => println!("{step:>6}: {pc:#0width$x} (unmapped)"),
            }
            print_commit_log(&sim, hart, width, outcome)?;
        }

        if let Some(addr) = args.watch {
            let word = sim.get_memory_at_va(hart, addr, 1, 4)?.to_u64_le();
            if word == Some(u64::from(args.sentinel)) {
                println!(
                    "sentinel {:#x} at {addr:#x} after {step} steps ({traps} traps), pc {:#x}",
                    args.sentinel,
                    sim.get_pc(hart)?
                );
                return Ok(ExitCode::SUCCESS);
            }
        }
    }

    println!(
        "stopped after {} steps ({traps} traps), pc {:#x}",
        args.steps,
        sim.get_pc(hart)?
    );
    Ok(if args.watch.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_commit_log(
    sim: &Simulator,
    hart: usize,
    width: usize,
    outcome: StepOutcome,
) -> hammer_core::Result<()> {
    if let StepOutcome::TrapTaken(trap) = outcome {
        println!("        trap {trap}");
    }
    for (name, value) in sim.get_log_reg_writes(hart)? {
        println!("        {name:<5} <- {value:#0width$x}");
    }
    for (addr, value, size) in sim.get_log_mem_reads(hart)? {
        println!("        mem[{addr:#x}] -> {value:#x} ({size} bytes)");
    }
    for (addr, value, size) in sim.get_log_mem_writes(hart)? {
        println!("        mem[{addr:#x}] <- {value:#x} ({size} bytes)");
    }
    Ok(())
}

/// Parses a decimal or `0x`-prefixed integer, allowing `_` separators.
fn parse_u64(s: &str) -> Result<u64, String> {
    let s = s.replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}': {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| format!("{value:#x} does not fit in 32 bits"))
}

/// Parses `BASE:SIZE`, where SIZE may end in `K`, `M` or `G`.
fn parse_region(s: &str) -> Result<MemoryRegionConfig, String> {
    let (base, size) = s
        .split_once(':')
        .ok_or_else(|| format!("'{s}' is not BASE:SIZE"))?;
    let (digits, shift) = match size.as_bytes().last() {
        Some(b'K' | b'k') => (&size[..size.len() - 1], 10),
        Some(b'M' | b'm') => (&size[..size.len() - 1], 20),
        Some(b'G' | b'g') => (&size[..size.len() - 1], 30),
        _ => (size, 0),
    };
    let size = parse_u64(digits)?
        .checked_mul(1 << shift)
        .ok_or_else(|| format!("size '{size}' overflows"))?;
    Ok(MemoryRegionConfig::new(parse_u64(base)?, size))
}
