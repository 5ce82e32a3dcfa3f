use anyhow::{bail, Context, Result};
mod ast;
use ast::Value;
mod convert;
use convert::FromValue;
mod error;
mod formatter;
use formatter::{FormatOptions, Formatter};
mod logging;
mod parser;
use parser::Parser;
mod sample;
use sample::TestScriptConfig;
use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

#[macro_use]
extern crate clap;
use clap::App;

fn main() -> Result<()> {
    logging::init()?;
    let yaml = load_yaml!("main.yml");
    let matches = App::from_yaml(yaml).get_matches();
    let options = FormatOptions {
        indent_width: value_t!(matches, "indent", usize).unwrap_or_else(|e| e.exit()),
        sort_keys: !matches.is_present("preserve_order"),
        ensure_ascii: matches.is_present("ensure_ascii"),
        ..FormatOptions::default()
    };
    let check = matches.is_present("check");
    debug!(?options, check, "format options");
    match matches.value_of_os("json_file") {
        Some(path) if path == "-" => {
            if matches.is_present("in_place") {
                bail!("--in-place needs a file, not stdin");
            }
            let stdin = stdin();
            let result = format(stdin.lock(), options, check)?;
            println!("{}", result);
        }
        Some(path) => {
            debug!(path = ?path, "reading input file");
            let f = File::open(path)
                .with_context(|| format!("failed to open {}", path.to_string_lossy()))?;
            let reader = BufReader::new(f);
            let result = format(reader, options, check)
                .with_context(|| format!("failed to format {}", path.to_string_lossy()))?;
            if matches.is_present("in_place") {
                write_file(Path::new(path), &result)?;
            } else {
                println!("{}", result);
            }
        }
        None => {
            debug!("dumping built-in config");
            let doc = sample::test_script();
            if check {
                check_config(&Value::from(doc.clone()))?;
            }
            let result = Formatter::new(options).format_document(&doc)?;
            println!("{}", result);
        }
    }
    Ok(())
}

fn format<R: BufRead>(reader: R, options: FormatOptions, check: bool) -> Result<String> {
    let v = Parser::new(reader)?.parse_document()?;
    if check {
        check_config(&v)?;
    }
    let result = Formatter::new(options).format(&v)?;
    debug!(bytes = result.len(), "formatted");
    Ok(result)
}

fn check_config(v: &Value) -> Result<()> {
    let config = TestScriptConfig::from_value(v).context("config check failed")?;
    debug!(
        number = config.number,
        animal = %config.animal,
        mylist = config.mylist.len(),
        mydict = config.mydict.len(),
        complex_dict = config.conf.complex.dict.len(),
        complex_list = config.conf.complex.list.len(),
        rlist = config.rlist.len(),
        "config check passed"
    );
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let mut f =
        File::create(path).with_context(|| format!("failed to write {}", path.display()))?;
    writeln!(f, "{}", contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
