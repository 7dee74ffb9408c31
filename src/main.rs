//! Polyomino Packing and Circuit Wiring
//!
//! Reads puzzle input from stdin and prints the answers on stdout.
//! Diagnostics go to stderr; any malformed input exits non-zero.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

use polypack::circuits::{self, DEFAULT_CONNECTIONS};
use polypack::{count_tileable, solve_region, Fill, Puzzle, Result, SolverOptions};

/// Solves polyomino region tilings and junction-box wiring puzzles.
#[derive(Parser)]
#[command(name = "polypack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log detail on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Disable all logging.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count the regions that can be tiled by their demanded shapes.
    Regions(RegionsArgs),
    /// Wire junction boxes shortest-first and report both answers.
    Circuits(CircuitsArgs),
}

#[derive(Args, Debug, Default)]
struct RegionsArgs {
    /// Print a tiling of every tileable region before the count.
    #[arg(long)]
    render: bool,
    /// Allow uncovered cells; pieces only have to fit.
    #[arg(long)]
    pack: bool,
    /// Skip the checkerboard parity bound.
    #[arg(long)]
    no_parity: bool,
    /// Solve repeated regions again instead of reusing the verdict.
    #[arg(long)]
    no_cache: bool,
}

impl RegionsArgs {
    fn options(&self) -> SolverOptions {
        SolverOptions {
            fill: if self.pack { Fill::Pack } else { Fill::Exact },
            parity_prune: !self.no_parity,
            memoize: !self.no_cache,
        }
    }
}

#[derive(Args, Debug)]
struct CircuitsArgs {
    /// Number of shortest connections made for the circuit-size answer.
    #[arg(long, default_value_t = DEFAULT_CONNECTIONS)]
    connections: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    let outcome = match &cli.command {
        Command::Regions(args) => run_regions(stdin, &mut stdout, args),
        Command::Circuits(args) => run_circuits(stdin, &mut stdout, args),
    };

    match outcome.and_then(|()| stdout.flush().map_err(Into::into)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Installs a stderr subscriber at the level picked by `-v`/`-q`.
fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Prints an error and its whole source chain on one line.
fn report(error: &dyn std::error::Error) {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    eprintln!("error: {message}");
}

/// Solves every region and writes the tileable count.
fn run_regions(input: impl BufRead, out: &mut impl Write, args: &RegionsArgs) -> Result<()> {
    let puzzle = Puzzle::from_reader(input)?;
    let options = args.options();

    if !args.render {
        writeln!(out, "{}", count_tileable(&puzzle, &options)?)?;
        return Ok(());
    }

    let mut tileable = 0;
    for (index, region) in puzzle.regions.iter().enumerate() {
        if let Some(tiling) = solve_region(&puzzle.shapes, region, &options)? {
            writeln!(out, "{index}: {}x{}", region.width, region.height)?;
            write!(out, "{}", tiling.render())?;
            tileable += 1;
        }
    }
    writeln!(out, "{tileable}")?;
    Ok(())
}

/// Answers both wiring questions.
fn run_circuits(input: impl BufRead, out: &mut impl Write, args: &CircuitsArgs) -> Result<()> {
    let points = circuits::read_points(input)?;
    let answers = circuits::solve(&points, args.connections)?;
    writeln!(out, "Part1: {}", answers.part1)?;
    writeln!(out, "Part2: {}", answers.part2)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPES: &str = "\
0:
##

1:
#

2x2: 2 0
3x1: 1 1
2x2: 1 0
";

    fn regions_output(input: &str, args: &RegionsArgs) -> Result<String> {
        let mut out = Vec::new();
        run_regions(input.as_bytes(), &mut out, args)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_regions_prints_count_only() {
        let output = regions_output(SHAPES, &RegionsArgs::default()).unwrap();
        assert_eq!(output, "2\n");
    }

    #[test]
    fn test_regions_render_snapshot() {
        let args = RegionsArgs {
            render: true,
            ..RegionsArgs::default()
        };
        let output = regions_output(SHAPES, &args).unwrap();
        insta::assert_snapshot!(output, @r"
        0: 2x2
        AA
        BB
        1: 3x1
        AAB
        2
        ");
    }

    #[test]
    fn test_regions_pack_mode() {
        let args = RegionsArgs {
            pack: true,
            ..RegionsArgs::default()
        };
        assert_eq!(regions_output(SHAPES, &args).unwrap(), "3\n");
    }

    #[test]
    fn test_regions_reports_bad_input() {
        let err = regions_output("0:\n#?\n", &RegionsArgs::default()).unwrap_err();
        let mut message = String::new();
        let mut source: Option<&dyn std::error::Error> = Some(&err);
        while let Some(cause) = source {
            message.push_str(&cause.to_string());
            message.push('|');
            source = cause.source();
        }
        assert_eq!(
            message,
            "could not parse input|line 2: invalid glyph character '?' in '#?'|"
        );
    }

    #[test]
    fn test_circuits_output() {
        let input = "\
162,817,812
57,618,57
906,360,560
592,479,940
352,342,300
466,668,158
542,29,236
431,825,988
739,650,466
52,470,668
216,146,977
819,987,18
117,168,530
805,96,715
346,949,466
970,615,88
941,993,340
862,61,35
984,92,344
425,690,689
";
        let mut out = Vec::new();
        run_circuits(input.as_bytes(), &mut out, &CircuitsArgs { connections: 10 }).unwrap();
        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        Part1: 40
        Part2: 25272
        ");
    }

    #[test]
    fn test_circuits_rejects_single_point() {
        let mut out = Vec::new();
        let args = CircuitsArgs {
            connections: DEFAULT_CONNECTIONS,
        };
        assert!(run_circuits("1,2,3\n".as_bytes(), &mut out, &args).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["polypack", "-vv", "regions", "--render", "--no-parity"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Regions(args) = cli.command else {
            panic!("expected regions");
        };
        assert!(args.render && args.no_parity && !args.no_cache && !args.pack);

        let cli = Cli::try_parse_from(["polypack", "circuits"]).unwrap();
        let Command::Circuits(args) = cli.command else {
            panic!("expected circuits");
        };
        assert_eq!(args.connections, 1000);
    }
}
