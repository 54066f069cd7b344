// Copyright (c) 2016-2021 Fabian Schuiki

//! A Verilog and SystemVerilog front end.

extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, Arg, ArgMatches};
use log::LevelFilter;
use std::path::Path;
use svfront::errors::*;
use svfront::syntax::dump::dump_ast;
use svfront::*;

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("A Verilog and SystemVerilog front end.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output"),
        )
        .arg(
            Arg::with_name("sv")
                .long("sv")
                .help("Accept SystemVerilog constructs in all input files"),
        )
        .arg(
            Arg::with_name("formal")
                .long("formal")
                .help("Accept the formal verification keywords in Verilog mode"),
        )
        .arg(
            Arg::with_name("lib")
                .long("lib")
                .help("Library mode; do not warn about tri-state constants"),
        )
        .arg(
            Arg::with_name("specify")
                .long("specify")
                .help("Turn specify blocks into timing cells instead of dropping them"),
        )
        .arg(
            Arg::with_name("noassert")
                .long("noassert")
                .help("Drop assert statements"),
        )
        .arg(
            Arg::with_name("noassume")
                .long("noassume")
                .help("Drop assume statements"),
        )
        .arg(
            Arg::with_name("norestrict")
                .long("norestrict")
                .help("Drop restrict statements"),
        )
        .arg(
            Arg::with_name("assume_asserts")
                .long("assume-asserts")
                .help("Treat assert statements as assume"),
        )
        .arg(
            Arg::with_name("assert_assumes")
                .long("assert-assumes")
                .help("Treat assume statements as assert"),
        )
        .arg(
            Arg::with_name("dump_ast")
                .long("dump-ast")
                .help("Dump the parsed abstract syntax tree"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The input files to parse")
                .multiple(true)
                .required(true),
        )
        .get_matches();

    // Configure the logger.
    let level = if matches.is_present("quiet") {
        LevelFilter::Off
    } else {
        match matches.occurrences_of("verbosity") {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    let opts = parse_options(&matches);
    if !parse_files(&opts, &matches) {
        std::process::exit(1);
    }
}

/// Assemble the parser options from the command line.
fn parse_options(matches: &ArgMatches) -> ParseOptions {
    ParseOptions {
        sv: matches.is_present("sv"),
        formal: matches.is_present("formal"),
        lib: matches.is_present("lib"),
        specify: matches.is_present("specify"),
        noassert: matches.is_present("noassert"),
        noassume: matches.is_present("noassume"),
        norestrict: matches.is_present("norestrict"),
        assume_asserts: matches.is_present("assume_asserts"),
        assert_assumes: matches.is_present("assert_assumes"),
    }
}

/// Parse every input file, dumping the trees if requested. Returns whether
/// all files were parsed successfully.
fn parse_files(opts: &ParseOptions, matches: &ArgMatches) -> bool {
    let sm = source::get_source_manager();
    let emitter = StderrEmitter;
    let mut failed = false;
    for filename in matches.values_of("INPUT").into_iter().flatten() {
        // Files with a SystemVerilog extension are always parsed as such.
        let mut opts = opts.clone();
        match Path::new(filename).extension().and_then(|s| s.to_str()) {
            Some("sv") | Some("svh") => opts.sv = true,
            _ => (),
        }

        let source = match sm.open(filename) {
            Some(s) => s,
            None => {
                emitter.emit(DiagBuilder2::fatal(format!(
                    "unable to open input file `{}`",
                    filename
                )));
                failed = true;
                continue;
            }
        };

        info!("parsing `{}`", filename);
        match parse_source(source, &opts, &emitter) {
            Ok(root) => {
                if matches.is_present("dump_ast") {
                    print!("{}", dump_ast(&root));
                }
            }
            Err(()) => failed = true,
        }
    }
    !failed
}
