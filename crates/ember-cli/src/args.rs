//! Command-line argument parsing.
//!
//! The surface is a fixed set of single-dash flags; anything unrecognized
//! exits with code 1 naming the flag. Flags taking a parameter (`-o`,
//! `-O`) consume the following argument.

/// The closed set of recognized options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg {
    Check,
    CompileToObj,
    CompileAndRun,
    EmitIr,
    Eval,
    Help,
    Lib,
    NoColor,
    OptLvl,
    OutputName,
    Parse,
    Time,
}

fn lookup_flag(flag: &str) -> Option<Arg> {
    match flag {
        "-check" => Some(Arg::Check),
        "-c" => Some(Arg::CompileToObj),
        "-r" => Some(Arg::CompileAndRun),
        "-emit-llvm" => Some(Arg::EmitIr),
        "-e" => Some(Arg::Eval),
        "-help" => Some(Arg::Help),
        "-lib" => Some(Arg::Lib),
        "-no-color" => Some(Arg::NoColor),
        "-O" => Some(Arg::OptLvl),
        "-o" => Some(Arg::OutputName),
        "-p" => Some(Arg::Parse),
        "-time" => Some(Arg::Time),
        _ => None,
    }
}

/// Whether an option requires a following parameter, and of which kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParamKind {
    None,
    Str,
    Int,
}

fn required_param(arg: Arg) -> ParamKind {
    match arg {
        Arg::OutputName => ParamKind::Str,
        Arg::OptLvl => ParamKind::Int,
        _ => ParamKind::None,
    }
}

fn param_kind_name(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Str => "string",
        ParamKind::Int => "integer",
        ParamKind::None => "none",
    }
}

/// One parsed option with its parameter, if any.
#[derive(Clone, Debug)]
pub struct Argument {
    pub arg: Arg,
    pub value: String,
}

/// The parsed command line.
#[derive(Clone, Debug, Default)]
pub struct CompilerArgs {
    pub args: Vec<Argument>,
    pub input_files: Vec<String>,
}

impl CompilerArgs {
    pub fn has_arg(&self, arg: Arg) -> bool {
        self.args.iter().any(|a| a.arg == arg)
    }

    pub fn get_arg(&self, arg: Arg) -> Option<&Argument> {
        self.args.iter().find(|a| a.arg == arg)
    }

    /// True when no `-option` arguments were given; input files are
    /// ignored.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The requested optimization level (0..=3), defaulting to 0.
    pub fn opt_level(&self) -> u8 {
        self.get_arg(Arg::OptLvl)
            .and_then(|a| a.value.parse().ok())
            .unwrap_or(0)
    }
}

/// Parse `argv[1..]`. Errors are user-facing messages; the caller prints
/// them and exits with code 1.
pub fn parse_args(argv: &[String]) -> Result<CompilerArgs, String> {
    let mut parsed = CompilerArgs::default();
    let mut iter = argv.iter().peekable();

    while let Some(raw) = iter.next() {
        if !raw.starts_with('-') {
            // Anything not starting with '-' is an input file.
            parsed.input_files.push(raw.clone());
            continue;
        }

        let arg = lookup_flag(raw).ok_or_else(|| {
            format!(
                "ember: argument '{raw}' was not recognized.\n      try -help for a list of options"
            )
        })?;

        let kind = required_param(arg);
        let value = if kind == ParamKind::None {
            String::new()
        } else {
            match iter.peek() {
                Some(next) if !next.starts_with('-') => iter.next().unwrap().clone(),
                _ => {
                    return Err(format!(
                        "Argument '{raw}' requires a {} parameter.",
                        param_kind_name(kind)
                    ));
                }
            }
        };

        if kind == ParamKind::Int {
            let level: i64 = value
                .parse()
                .map_err(|_| format!("Argument '{raw}' requires an integer parameter."))?;
            if !(0..=3).contains(&level) {
                return Err(format!("Argument '{raw}' must be between 0 and 3."));
            }
        }

        parsed.args.push(Argument { arg, value });
    }
    Ok(parsed)
}
