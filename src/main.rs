use mica_lang::diagnostics::{emit_check_diagnostics, emit_syntax_errors};
use mica_lang::language::compile::compile;
use std::{env, fs, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: ./mica-lang [build|check] <filename.mica>");
        process::exit(1);
    }

    let command = &args[1];
    let filename = &args[2];

    if !filename.ends_with(".mica") {
        eprintln!("Invalid file extension. Only .mica files are allowed.");
        process::exit(1);
    }

    let source = match fs::read_to_string(filename) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read {}: {}", filename, err);
            process::exit(1);
        }
    };

    let output = match compile(&source) {
        Ok(output) => output,
        Err(errors) => {
            emit_syntax_errors(filename, &source, &errors);
            process::exit(1);
        }
    };

    if !output.diagnostics.is_empty() {
        emit_check_diagnostics(filename, &source, &output.diagnostics);
        process::exit(1);
    }

    match command.as_str() {
        "check" => {
            println!("{}: no errors", filename);
        }
        "build" => {
            let out_path = format!("{}.js", filename.trim_end_matches(".mica"));
            if let Err(err) = fs::write(&out_path, format!("{}\n", output.js)) {
                eprintln!("Failed to write {}: {}", out_path, err);
                process::exit(1);
            }
            println!("Wrote {}", out_path);
        }
        _ => {
            eprintln!("Invalid command. Usage: ./mica-lang [build|check] <filename.mica>");
            process::exit(1);
        }
    }
}
