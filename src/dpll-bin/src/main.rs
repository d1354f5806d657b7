/*****************************************************************************************[main.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

extern crate clap;
extern crate cpu_time;
extern crate dpll;
#[cfg(feature = "logging")]
extern crate env_logger;
extern crate flate2;
#[cfg(feature = "logging")]
#[macro_use]
extern crate log;

#[cfg(not(feature = "logging"))]
macro_rules! debug {
    ($( $x:expr ),*) => {};
}

use clap::{App, Arg, ArgMatches};
use dpll::{
    dimacs, Callbacks, CCMin, LBool, SimpOpts, SimpSolver, SolverInterface,
    SolverOpts, Verbose,
};
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::mem;
use std::process::exit;
use std::str::FromStr;
use std::time::Instant;

mod system;

const EXIT_SAT: i32 = 10;
const EXIT_UNSAT: i32 = 20;
const EXIT_UNKNOWN: i32 = 0;

type Solver = SimpSolver<Verbose>;

fn main() {
    #[cfg(feature = "logging")]
    env_logger::init();
    let exitcode = main2().unwrap_or_else(|err| {
        eprintln!("{}", err);
        exit(1)
    });
    exit(exitcode);
}

fn app() -> App<'static, 'static> {
    App::new("dpll")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CDCL SAT solver with a simplifying preprocessor")
        .arg(Arg::with_name("input-file").help("DIMACS input, possibly gzipped (default: stdin)"))
        .arg(Arg::with_name("result-output-file").help("File to write the result and model to"))
        .arg(
            Arg::with_name("verbosity")
                .long("verb")
                .help("Verbosity level (0=silent, 1=some, 2=more)")
                .default_value("1")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("cpu-lim")
                .long("cpu-lim")
                .help("Limit on CPU time allowed in seconds")
                .default_value("-1.0")
                .takes_value(true),
        )
        .arg(Arg::with_name("is-strict").long("strict")
             .help("Validate the DIMACS header during parsing"))
        .arg(Arg::with_name("no-solve").long("no-solve")
             .help("Only preprocess, do not search"))
        // preprocessing
        .arg(Arg::with_name("pre").long("pre")
             .conflicts_with("no-pre")
             .help("Completely turn on preprocessing [default]"))
        .arg(Arg::with_name("no-pre").long("no-pre")
             .help("Completely turn off preprocessing"))
        .arg(Arg::with_name("elim").long("elim")
             .conflicts_with("no-elim")
             .help("Perform variable elimination [default]"))
        .arg(Arg::with_name("no-elim").long("no-elim")
             .help("Do not perform variable elimination"))
        .arg(Arg::with_name("asymm").long("asymm")
             .help("Shrink clauses by asymmetric branching"))
        .arg(Arg::with_name("rcheck").long("rcheck")
             .help("Check if a clause is already implied (costly)"))
        .arg(Arg::with_name("grow").long("grow")
             .help("Allow a variable elimination step to grow by a number of clauses")
             .default_value("0")
             .takes_value(true))
        .arg(Arg::with_name("clause-lim").long("cl-lim")
             .help("Variables are not eliminated if it produces a resolvent with a length above this limit (-1 means no limit)")
             .default_value("20")
             .takes_value(true))
        .arg(Arg::with_name("subsumption-lim").long("sub-lim")
             .help("Do not check if subsumption against a clause larger than this (-1 means no limit)")
             .default_value("1000")
             .takes_value(true))
        .arg(Arg::with_name("simp-garbage-frac").long("simp-gc-frac")
             .help("The fraction of wasted memory allowed before a garbage collection is triggered during simplification")
             .default_value("0.5")
             .takes_value(true))
        // core
        .arg(Arg::with_name("var-decay").long("var-decay")
             .help("The variable activity decay factor")
             .default_value("0.95")
             .takes_value(true))
        .arg(Arg::with_name("clause-decay").long("cla-decay")
             .help("The clause activity decay factor")
             .default_value("0.999")
             .takes_value(true))
        .arg(Arg::with_name("random-var-freq").long("rnd-freq")
             .help("The frequency with which the decision heuristic tries to choose a random variable")
             .default_value("0.0")
             .takes_value(true))
        .arg(Arg::with_name("random-seed").long("rnd-seed")
             .help("Used by the random variable selection")
             .default_value("91648253.0")
             .takes_value(true))
        .arg(Arg::with_name("ccmin-mode").long("ccmin-mode")
             .help("Controls conflict clause minimization (0=none, 1=basic, 2=deep)")
             .default_value("2")
             .takes_value(true))
        .arg(Arg::with_name("phase-saving").long("phase-saving")
             .help("Controls the level of phase saving (0=none, 1=limited, 2=full)")
             .default_value("2")
             .takes_value(true))
        .arg(Arg::with_name("rnd-init").long("rnd-init")
             .conflicts_with("no-rnd-init")
             .help("Randomize the initial activity"))
        .arg(Arg::with_name("no-rnd-init").long("no-rnd-init")
             .help("Do not randomize the initial activity [default]"))
        .arg(Arg::with_name("luby-restart").long("luby")
             .conflicts_with("no-luby-restart")
             .help("Use the Luby restart sequence [default]"))
        .arg(Arg::with_name("no-luby-restart").long("no-luby")
             .help("Do not use the Luby restart sequence"))
        .arg(Arg::with_name("restart-first").long("rfirst")
             .help("The base restart interval")
             .default_value("100")
             .takes_value(true))
        .arg(Arg::with_name("restart-inc").long("rinc")
             .help("Restart interval increase factor")
             .default_value("2.0")
             .takes_value(true))
        .arg(Arg::with_name("garbage-frac").long("gc-frac")
             .help("The fraction of wasted memory allowed before a garbage collection is triggered")
             .default_value("0.20")
             .takes_value(true))
        .arg(Arg::with_name("min-learnts-lim").long("min-learnts")
             .help("Minimum learnt clause limit")
             .default_value("0")
             .takes_value(true))
}

/// Value of option `name`, or `default` if it is absent or malformed.
fn opt_value<T: FromStr>(matches: &ArgMatches, name: &str, default: T) -> T {
    matches
        .value_of(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn solver_opts(matches: &ArgMatches) -> SolverOpts {
    let mut opts = SolverOpts::default();
    opts.var_decay = opt_value(matches, "var-decay", opts.var_decay);
    opts.clause_decay = opt_value(matches, "clause-decay", opts.clause_decay);
    opts.random_var_freq = opt_value(matches, "random-var-freq", opts.random_var_freq);
    opts.random_seed = opt_value(matches, "random-seed", opts.random_seed);
    if let Some(mode) = matches
        .value_of("ccmin-mode")
        .and_then(|s| s.parse().ok())
        .and_then(CCMin::from_level)
    {
        opts.ccmin_mode = mode;
    }
    opts.phase_saving = opt_value(matches, "phase-saving", opts.phase_saving);
    opts.rnd_init_act = matches.is_present("rnd-init");
    opts.luby_restart = !matches.is_present("no-luby-restart");
    opts.restart_first = opt_value(matches, "restart-first", opts.restart_first);
    opts.restart_inc = opt_value(matches, "restart-inc", opts.restart_inc);
    opts.garbage_frac = opt_value(matches, "garbage-frac", opts.garbage_frac);
    opts.min_learnts_lim = opt_value(matches, "min-learnts-lim", opts.min_learnts_lim);
    opts
}

fn simp_opts(matches: &ArgMatches) -> SimpOpts {
    let mut opts = SimpOpts::default();
    opts.use_elim = !matches.is_present("no-elim");
    opts.use_asymm = matches.is_present("asymm");
    opts.use_rcheck = matches.is_present("rcheck");
    opts.grow = opt_value(matches, "grow", opts.grow);
    opts.clause_lim = opt_value(matches, "clause-lim", opts.clause_lim);
    opts.subsumption_lim = opt_value(matches, "subsumption-lim", opts.subsumption_lim);
    opts.simp_garbage_frac = opt_value(matches, "simp-garbage-frac", opts.simp_garbage_frac);
    opts
}

fn main2() -> io::Result<i32> {
    let resource = system::ResourceMeasure::new();
    let matches = app().get_matches();

    let opts = solver_opts(&matches);
    let sopts = simp_opts(&matches);
    if !opts.check() || !sopts.check() {
        eprintln!("Invalid option value");
        exit(1);
    }

    let verbosity: i32 = opt_value(&matches, "verbosity", 0);
    if verbosity < 0 || verbosity > 2 {
        eprintln!(
            "ERROR! value <{}> is out of range for option \"verb\".",
            verbosity
        );
        exit(1);
    }
    let is_strict = matches.is_present("is-strict");
    let pre = !matches.is_present("no-pre");
    let cpu_lim = Some(opt_value(&matches, "cpu-lim", -1.0f64)).filter(|x| *x > 0.);

    let mut cb = Verbose::new(verbosity as u32);
    // setup timeout handler, if any
    if let Some(max_cpu) = cpu_lim {
        let r = system::ResourceMeasure::new();
        cb.set_stop(move || r.cpu_time() > max_cpu);
    }
    let mut solver = Solver::new(opts, sopts, cb);

    if !pre {
        solver.eliminate(true);
    }

    let initial_time = Instant::now();
    if let Some(input_file) = matches.value_of("input-file") {
        debug!("solve file {}", input_file);
        let file = BufReader::new(File::open(input_file)?);
        read_input_autogz(file, &mut solver, is_strict)?;
    } else {
        println!("c Reading from standard input... Use '--help' for help.");
        let stdin = io::stdin();
        read_input_autogz(stdin.lock(), &mut solver, is_strict)?;
    }

    let mut resfile = match matches.value_of("result-output-file") {
        Some(f) => Some(BufWriter::new(File::create(f)?)),
        None => None,
    };

    let parsed_time = Instant::now();
    if verbosity > 0 {
        println!(
            "c |  Number of variables:  {:12}                                         |",
            solver.num_vars()
        );
        println!(
            "c |  Number of clauses:    {:12}                                         |",
            solver.num_clauses()
        );
        let duration = parsed_time - initial_time;
        println!(
            "c |  Parse time:           {:9}.{:02} s                                       |",
            duration.as_secs(),
            duration.subsec_millis() / 10
        );
    }

    solver.eliminate(true);
    if verbosity > 0 {
        let duration = Instant::now() - parsed_time;
        println!(
            "c |  Simplification time:  {:9}.{:02} s                                       |",
            duration.as_secs(),
            duration.subsec_millis() / 10
        );
        println!("c |                                                                             |");
    }

    if !solver.is_ok() {
        if let Some(resfile) = resfile.as_mut() {
            writeln!(resfile, "s UNSAT")?;
            resfile.flush()?;
        }
        mem::drop(resfile);
        if verbosity > 0 {
            println!(
                "c ==============================================================================="
            );
            println!("c Solved by simplification");
            solver.print_stats();
        }
        println!("s UNSATISFIABLE");
        exit(EXIT_UNSAT);
    }

    let ret = if matches.is_present("no-solve") {
        if verbosity > 0 {
            println!("c Simplification did not yield a result, no solution attempted.");
        }
        LBool::UNDEF
    } else {
        solver.solve_limited(&[])
    };

    if verbosity > 0 {
        solver.print_stats();
        println!("c CPU time              : {:.3}s", resource.cpu_time());
    }
    if ret == LBool::TRUE {
        println!("s SATISFIABLE");
        if resfile.is_none() && verbosity > 1 {
            print!("{}", solver.dimacs_model());
        }
    } else if ret == LBool::FALSE {
        println!("s UNSATISFIABLE");
    } else {
        println!("s INDETERMINATE");
    }

    if let Some(resfile) = resfile.as_mut() {
        if ret == LBool::TRUE {
            writeln!(resfile, "s SAT")?;
            write!(resfile, "{}", solver.dimacs_model())?;
        } else if ret == LBool::FALSE {
            writeln!(resfile, "s UNSAT")?;
        } else {
            writeln!(resfile, "s INDET")?;
        }
        resfile.flush()?;
    }
    mem::drop(resfile);

    let exitcode = if ret == LBool::TRUE {
        EXIT_SAT
    } else if ret == LBool::FALSE {
        EXIT_UNSAT
    } else {
        EXIT_UNKNOWN
    };
    Ok(exitcode)
}

fn read_input_autogz<R: BufRead, Cb: Callbacks>(
    mut input: R,
    solver: &mut SimpSolver<Cb>,
    is_strict: bool,
) -> io::Result<()> {
    let is_gz = input.fill_buf()?.starts_with(b"\x1F\x8B");
    if is_gz {
        read_input(BufReader::new(GzDecoder::new(input)), solver, is_strict)
    } else {
        read_input(input, solver, is_strict)
    }
}

fn read_input<R: BufRead, S: SolverInterface>(
    mut input: R,
    solver: &mut S,
    is_strict: bool,
) -> io::Result<()> {
    dimacs::parse(&mut input, solver, is_strict)?;
    Ok(())
}
