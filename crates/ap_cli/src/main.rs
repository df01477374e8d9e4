// crates/ap_cli/src/main.rs
//
// Exit-code table, typed error mapping, validate-only short-circuit, and the
// full run path (load → apportion → write result.json atomically).

#![forbid(unsafe_code)]

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Bundle shape/domain failures (bad JSON, bad tokens, bad percents).
    pub const VALIDATION: i32 = 2;
    /// Filesystem errors (read/write/path).
    pub const IO: i32 = 4;
    /// Engine failures (incompatible strategy, malformed votes, no eligible
    /// candidacies, zero seats).
    pub const ENGINE: i32 = 5;
}

use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args};

use ap_io::canonical_json::{write_bytes_atomic, write_canonical_file};
use ap_io::loader::load_bundle_from_path;
use ap_io::IoError;
use ap_pipeline::{run_apportionment, ApportionCtx, EngineMeta, PipelineError};

#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
    Engine(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("apportion: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    let rc = match run_once(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            let (code, msg) = match &e {
                MainError::Validation(m) => (exitcodes::VALIDATION, m),
                MainError::Io(m) => (exitcodes::IO, m),
                MainError::Engine(m) => (exitcodes::ENGINE, m),
            };
            eprintln!("apportion: error: {msg}");
            code
        }
    };
    ExitCode::from(rc as u8)
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let loaded = load_bundle_from_path(&args.bundle).map_err(map_io_err)?;

    if args.validate_only {
        if !args.quiet {
            eprintln!("validate-only: bundle OK ({})", loaded.digest_hex);
        }
        return Ok(());
    }

    let ctx = ApportionCtx { loaded, engine_meta: EngineMeta::default() };
    let doc = run_apportionment(&ctx).map_err(map_pipeline_err)?;

    let out_path = args.out.join("result.json");
    if args.pretty {
        let bytes = serde_json::to_vec_pretty(&doc)
            .map_err(|e| MainError::Validation(format!("serialize result: {e}")))?;
        write_bytes_atomic(&out_path, &bytes).map_err(map_io_err)?;
    } else {
        write_canonical_file(&out_path, &doc).map_err(map_io_err)?;
    }

    if !args.quiet {
        println!("{}", doc.id);
    }
    Ok(())
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Invalid(m) => MainError::Validation(m),
        IoError::Path(m) => MainError::Io(m),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Bundle(e) => map_io_err(e),
        PipelineError::Engine(e) => MainError::Engine(e.to_string()),
        // Result construction failures surface as I/O: the run succeeded but
        // the artifact could not be built.
        PipelineError::Build(m) => MainError::Io(m),
    }
}
